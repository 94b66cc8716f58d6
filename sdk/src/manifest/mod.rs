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

//! Manifest documents that scope signatures to container entries.
//!
//! Two XML dialects exist: the ETSI `ASiCManifest` used by CAdES signatures,
//! timestamps and evidence records, and the OpenDocument `manifest.xml` shared
//! by XAdES signatures. The dialect is chosen by looking at the root element,
//! and both parsers match elements and attributes by local name so that any
//! namespace prefix (or none) is accepted.

use std::fmt::Display;

use quick_xml::{events::Event, name::ResolveResult, NsReader};
use serde::Serialize;

use crate::{Error, Result};

mod asic;
mod digest;
mod open_document;

pub use digest::DigestAlgorithm;

pub const ASIC_NAMESPACE: &str = "http://uri.etsi.org/02918/v1.2.1#";
pub const OPEN_DOCUMENT_NAMESPACE: &str = "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0";

/// The manifest XML dialects.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum ManifestDialect {
    Asic,
    OpenDocument,
}

impl ManifestDialect {
    /// Picks the dialect from the local name of the root element.
    pub fn sniff(data: &[u8]) -> Option<ManifestDialect> {
        let xml = as_xml_str(data).ok()?;
        let mut reader = NsReader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    return match e.local_name().as_ref() {
                        b"ASiCManifest" => Some(ManifestDialect::Asic),
                        b"manifest" => Some(ManifestDialect::OpenDocument),
                        _ => None,
                    };
                }
                Ok(Event::Eof) | Err(_) => return None,
                Ok(_) => {}
            }
        }
    }

    pub fn parse(&self, filename: &str, data: &[u8]) -> Result<ParsedManifest> {
        let xml = as_xml_str(data).map_err(|e| parse_error(filename, e))?;
        match self {
            ManifestDialect::Asic => asic::parse(filename, xml),
            ManifestDialect::OpenDocument => open_document::parse(filename, xml),
        }
    }
}

/// Digest declared for a manifest entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EntryDigest {
    pub algorithm_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<DigestAlgorithm>,
    /// Base64 text as written in the manifest.
    pub value: String,
}

/// One reference read from a manifest, before it is matched to the container.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedEntry {
    pub uri: String,
    pub mime_type: Option<String>,
    pub digest: Option<EntryDigest>,
    pub root_file: bool,
}

/// The content of a manifest document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedManifest {
    pub dialect: ManifestDialect,
    /// Namespace of the root element, if it has one.
    pub root_namespace: Option<String>,
    /// Tokens the manifest declares itself bound to (`SigReference/@URI`).
    pub sig_references: Vec<String>,
    pub entries: Vec<ParsedEntry>,
}

impl ParsedManifest {
    fn new(dialect: ManifestDialect) -> Self {
        ParsedManifest {
            dialect,
            root_namespace: None,
            sig_references: Vec::new(),
            entries: Vec::new(),
        }
    }
}

/// A manifest entry matched against the container content.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ManifestEntry {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<EntryDigest>,
    /// The referenced entry exists in the container.
    pub found: bool,
    /// Result of recomputing the digest, when one was declared and checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intact: Option<bool>,
    pub root_file: bool,
}

/// A manifest as described in the container diagnostic data.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ManifestFile {
    pub filename: String,
    /// Token the manifest is bound to.
    pub signature_filename: Option<String>,
    pub entries: Vec<ManifestEntry>,
    pub archive_manifest: bool,
    pub timestamp_manifest: bool,
    pub evidence_record_manifest: bool,
}

impl ManifestFile {
    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.uri.as_str()).collect()
    }

    /// Returns `true` if the manifest references `name`.
    pub fn covers(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.uri == name)
    }
}

/// Maps a manifest URI onto a container entry name.
///
/// Relative prefixes are dropped; no percent-decoding is applied.
pub fn normalize_uri(uri: &str) -> &str {
    let uri = uri.trim();
    let uri = uri.strip_prefix("./").unwrap_or(uri);
    match uri.strip_prefix('/') {
        Some(rest) if !rest.is_empty() => rest,
        _ => uri,
    }
}

fn as_xml_str(data: &[u8]) -> std::result::Result<&str, std::str::Utf8Error> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    std::str::from_utf8(data)
}

fn parse_error<E: Display>(filename: &str, err: E) -> Error {
    Error::ManifestParse {
        file: filename.to_string(),
        reason: err.to_string(),
    }
}

fn namespace_of(result: ResolveResult<'_>) -> Option<String> {
    match result {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn sniffs_dialects() {
        assert_eq!(
            ManifestDialect::sniff(
                br#"<?xml version="1.0"?><asic:ASiCManifest xmlns:asic="http://uri.etsi.org/02918/v1.2.1#"/>"#
            ),
            Some(ManifestDialect::Asic)
        );
        assert_eq!(
            ManifestDialect::sniff(br#"<ASiCManifest xmlns="urn:other"></ASiCManifest>"#),
            Some(ManifestDialect::Asic)
        );
        assert_eq!(
            ManifestDialect::sniff(
                b"\xEF\xBB\xBF<manifest:manifest xmlns:manifest=\"urn:oasis:names:tc:opendocument:xmlns:manifest:1.0\"/>"
            ),
            Some(ManifestDialect::OpenDocument)
        );
        assert_eq!(ManifestDialect::sniff(b"<root/>"), None);
        assert_eq!(ManifestDialect::sniff(b"\xff\xfe"), None);
        assert_eq!(ManifestDialect::sniff(b"not xml"), None);
    }

    #[test]
    fn normalizes_uris() {
        assert_eq!(normalize_uri("hello.txt"), "hello.txt");
        assert_eq!(normalize_uri("./hello.txt"), "hello.txt");
        assert_eq!(normalize_uri("/dir/hello.txt"), "dir/hello.txt");
        assert_eq!(normalize_uri("/"), "/");
        assert_eq!(normalize_uri("hello%20world.txt"), "hello%20world.txt");
    }

    #[test]
    fn covers() {
        let manifest = ManifestFile {
            filename: "META-INF/manifest.xml".into(),
            signature_filename: None,
            entries: vec![ManifestEntry {
                uri: "hello.txt".into(),
                mime_type: None,
                digest: None,
                found: true,
                intact: None,
                root_file: false,
            }],
            archive_manifest: false,
            timestamp_manifest: false,
            evidence_record_manifest: false,
        };
        assert!(manifest.covers("hello.txt"));
        assert!(!manifest.covers("other.txt"));
        assert_eq!(manifest.entry_names(), vec!["hello.txt"]);
    }
}
