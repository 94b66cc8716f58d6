// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use asic_container::{ContainerWriter, MimeType, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

#[allow(unused_macros)]
macro_rules! assert_err {
    ($expression:expr, $($pattern:tt)+) => {
        match $expression {
            $($pattern)+ => (),
            ref e => panic!("expected `{}` but got `{:?}`", stringify!($($pattern)+), e),
        }
    }
}
#[allow(unused_imports)]
pub(super) use assert_err;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const ASICE: &str = "application/vnd.etsi.asic-e+zip";

/// An OpenDocument `manifest.xml` listing `files`.
pub fn odf_manifest(media_type: &str, files: &[&str]) -> Vec<u8> {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
"#,
    );
    xml.push_str(&format!(
        "  <manifest:file-entry manifest:full-path=\"/\" manifest:media-type=\"{media_type}\"/>\n"
    ));
    for file in files {
        xml.push_str(&format!(
            "  <manifest:file-entry manifest:full-path=\"{file}\" manifest:media-type=\"text/plain\"/>\n"
        ));
    }
    xml.push_str("</manifest:manifest>\n");
    xml.into_bytes()
}

/// An `ASiCManifest` bound to `sig_reference`, with a SHA-256 digest for each
/// referenced entry whose content is given.
pub fn asic_manifest(sig_reference: &str, references: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<asic:ASiCManifest xmlns:asic="http://uri.etsi.org/02918/v1.2.1#" xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
"#,
    );
    xml.push_str(&format!("  <asic:SigReference URI=\"{sig_reference}\"/>\n"));
    for (uri, content) in references {
        match content {
            Some(content) => {
                let digest = STANDARD.encode(Sha256::digest(content));
                xml.push_str(&format!(
                    "  <asic:DataObjectReference URI=\"{uri}\">\n    <ds:DigestMethod Algorithm=\"http://www.w3.org/2001/04/xmlenc#sha256\"/>\n    <ds:DigestValue>{digest}</ds:DigestValue>\n  </asic:DataObjectReference>\n"
                ));
            }
            None => xml.push_str(&format!("  <asic:DataObjectReference URI=\"{uri}\"/>\n")),
        }
    }
    xml.push_str("</asic:ASiCManifest>\n");
    xml.into_bytes()
}

/// Writes a well-formed container of type `mime_type`.
pub fn container(mime_type: MimeType, entries: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let writer = entries
        .iter()
        .fold(ContainerWriter::new(mime_type), |w, (name, data)| {
            w.add(*name, data.to_vec())
        });
    writer.finish()
}

/// Writes a ZIP archive exactly as described, including `mimetype` if listed.
pub fn raw_zip(entries: &[(&str, &[u8], CompressionMethod)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data, method) in entries {
        zip.start_file(*name, SimpleFileOptions::default().compression_method(*method))
            .unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Replaces every occurrence of `from` by `to` (of the same length), which
/// renames entries in both the local headers and the central directory.
pub fn rename_entry(mut bytes: Vec<u8>, from: &str, to: &str) -> Vec<u8> {
    assert_eq!(from.len(), to.len());
    let (from, to) = (from.as_bytes(), to.as_bytes());
    let mut i = 0;
    while i + from.len() <= bytes.len() {
        if &bytes[i..i + from.len()] == from {
            bytes[i..i + from.len()].copy_from_slice(to);
            i += from.len();
        } else {
            i += 1;
        }
    }
    bytes
}
