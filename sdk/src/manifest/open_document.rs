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

use quick_xml::{events::Event, NsReader};

use super::{
    namespace_of, normalize_uri, parse_error, ManifestDialect, ParsedEntry, ParsedManifest,
};
use crate::Result;

pub(super) fn parse(filename: &str, xml: &str) -> Result<ParsedManifest> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut manifest = ParsedManifest::new(ManifestDialect::OpenDocument);
    let mut seen_root = false;

    loop {
        let e = match reader.read_event().map_err(|e| parse_error(filename, e))? {
            Event::Start(e) | Event::Empty(e) => e,
            Event::Eof => break,
            _ => continue,
        };

        if !seen_root {
            if e.local_name().as_ref() != b"manifest" {
                return Err(parse_error(filename, "root element is not manifest"));
            }
            manifest.root_namespace = namespace_of(reader.resolve_element(e.name()).0);
            seen_root = true;
            continue;
        }
        if e.local_name().as_ref() != b"file-entry" {
            continue;
        }

        let mut full_path = None;
        let mut media_type = None;
        for attr in e.attributes() {
            let attr = attr.map_err(|err| parse_error(filename, err))?;
            let value = attr
                .unescape_value()
                .map_err(|err| parse_error(filename, err))?;
            match attr.key.local_name().as_ref() {
                b"full-path" => full_path = Some(value.into_owned()),
                b"media-type" => media_type = Some(value.into_owned()),
                _ => {}
            }
        }

        let Some(full_path) = full_path else {
            return Err(parse_error(filename, "file-entry without full-path"));
        };
        // the package root and folders are not signable content
        if full_path == "/" || full_path.ends_with('/') {
            continue;
        }
        manifest.entries.push(ParsedEntry {
            uri: normalize_uri(&full_path).to_string(),
            mime_type: media_type.filter(|m| !m.is_empty()),
            digest: None,
            root_file: false,
        });
    }

    if !seen_root {
        return Err(parse_error(filename, "empty document"));
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::manifest::OPEN_DOCUMENT_NAMESPACE;

    #[test]
    fn parses_asic_e_manifest() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
    <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.etsi.asic-e+zip"/>
    <manifest:file-entry manifest:full-path="hello.txt" manifest:media-type="text/plain"/>
    <manifest:file-entry manifest:full-path="Pictures/" manifest:media-type=""/>
    <manifest:file-entry manifest:full-path="Pictures/a&amp;b.png" manifest:media-type="image/png"/>
</manifest:manifest>"#;

        let manifest = parse("META-INF/manifest.xml", xml).unwrap();

        assert_eq!(manifest.dialect, ManifestDialect::OpenDocument);
        assert_eq!(
            manifest.root_namespace.as_deref(),
            Some(OPEN_DOCUMENT_NAMESPACE)
        );
        let uris: Vec<&str> = manifest.entries.iter().map(|e| e.uri.as_str()).collect();
        assert_eq!(uris, vec!["hello.txt", "Pictures/a&b.png"]);
        assert_eq!(manifest.entries[0].mime_type.as_deref(), Some("text/plain"));
        assert!(manifest.sig_references.is_empty());
    }

    #[test]
    fn tolerates_other_prefixes() {
        let xml = r#"<m:manifest xmlns:m="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0">
            <m:file-entry m:full-path="content.xml" m:media-type="text/xml">
                <m:encryption-data/>
            </m:file-entry>
        </m:manifest>"#;
        let manifest = parse("META-INF/manifest.xml", xml).unwrap();
        assert_eq!(manifest.entries.len(), 1);
        assert_eq!(manifest.entries[0].uri, "content.xml");

        let bare = parse("x", "<manifest><file-entry full-path=\"a\"/></manifest>").unwrap();
        assert!(bare.root_namespace.is_none());
        assert_eq!(bare.entries[0].uri, "a");
    }

    #[test]
    fn rejects_broken_documents() {
        assert!(parse("x", "<ASiCManifest/>").is_err());
        assert!(parse("x", "<manifest><file-entry/></manifest>").is_err());
        assert!(parse("x", "<manifest><file-entry full-path=\"a\"></manifest>").is_err());
    }
}
