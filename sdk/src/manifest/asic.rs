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

use log::debug;
use quick_xml::{
    events::{BytesStart, Event},
    NsReader,
};

use super::{
    namespace_of, normalize_uri, parse_error, DigestAlgorithm, EntryDigest, ManifestDialect,
    ParsedEntry, ParsedManifest, ASIC_NAMESPACE,
};
use crate::Result;

struct AsicManifestParser<'a> {
    filename: &'a str,
    manifest: ParsedManifest,
    current: Option<ParsedEntry>,
    digest_algorithm: Option<String>,
    in_digest_value: bool,
    digest_value: String,
    seen_root: bool,
}

impl<'a> AsicManifestParser<'a> {
    fn start(&mut self, reader: &NsReader<&[u8]>, e: &BytesStart, empty: bool) -> Result<()> {
        let local = e.local_name();
        if !self.seen_root {
            if local.as_ref() != b"ASiCManifest" {
                return Err(parse_error(self.filename, "root element is not ASiCManifest"));
            }
            let (ns, _) = reader.resolve_element(e.name());
            self.manifest.root_namespace = namespace_of(ns);
            if self.manifest.root_namespace.as_deref() != Some(ASIC_NAMESPACE) {
                debug!(
                    "{}: ASiCManifest in namespace {:?}",
                    self.filename, self.manifest.root_namespace
                );
            }
            self.seen_root = true;
            return Ok(());
        }

        match local.as_ref() {
            b"SigReference" => {
                if let Some(uri) = self.attribute(e, b"URI")? {
                    self.manifest
                        .sig_references
                        .push(normalize_uri(&uri).to_string());
                }
            }
            b"DataObjectReference" => {
                let uri = self.attribute(e, b"URI")?.ok_or_else(|| {
                    parse_error(self.filename, "DataObjectReference without URI")
                })?;
                let root_file = matches!(
                    self.attribute(e, b"Rootfile")?.as_deref(),
                    Some("true") | Some("1")
                );
                let entry = ParsedEntry {
                    uri: normalize_uri(&uri).to_string(),
                    mime_type: self.attribute(e, b"MimeType")?,
                    digest: None,
                    root_file,
                };
                if empty {
                    self.manifest.entries.push(entry);
                } else {
                    self.current = Some(entry);
                    self.digest_algorithm = None;
                    self.digest_value.clear();
                }
            }
            b"DigestMethod" if self.current.is_some() => {
                self.digest_algorithm = self.attribute(e, b"Algorithm")?;
            }
            b"DigestValue" if self.current.is_some() && !empty => {
                self.in_digest_value = true;
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, local: &[u8]) {
        match local {
            b"DigestValue" => self.in_digest_value = false,
            b"DataObjectReference" => {
                if let Some(mut entry) = self.current.take() {
                    if let Some(algorithm_uri) = self.digest_algorithm.take() {
                        entry.digest = Some(EntryDigest {
                            algorithm: DigestAlgorithm::from_uri(&algorithm_uri),
                            algorithm_uri,
                            value: std::mem::take(&mut self.digest_value),
                        });
                    }
                    self.manifest.entries.push(entry);
                }
            }
            _ => {}
        }
    }

    fn attribute(&self, e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
        for attr in e.attributes() {
            let attr = attr.map_err(|err| parse_error(self.filename, err))?;
            if attr.key.local_name().as_ref() == name {
                let value = attr
                    .unescape_value()
                    .map_err(|err| parse_error(self.filename, err))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }
}

pub(super) fn parse(filename: &str, xml: &str) -> Result<ParsedManifest> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parser = AsicManifestParser {
        filename,
        manifest: ParsedManifest::new(ManifestDialect::Asic),
        current: None,
        digest_algorithm: None,
        in_digest_value: false,
        digest_value: String::new(),
        seen_root: false,
    };

    loop {
        match reader.read_event().map_err(|e| parse_error(filename, e))? {
            Event::Start(e) => parser.start(&reader, &e, false)?,
            Event::Empty(e) => parser.start(&reader, &e, true)?,
            Event::Text(t) if parser.in_digest_value => {
                let text = t.unescape().map_err(|e| parse_error(filename, e))?;
                parser
                    .digest_value
                    .extend(text.chars().filter(|c| !c.is_whitespace()));
            }
            Event::End(e) => parser.end(e.local_name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
    }

    if !parser.seen_root {
        return Err(parse_error(filename, "empty document"));
    }
    Ok(parser.manifest)
}
