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

use serde::Serialize;

use crate::{container::ContainerType, manifest::ManifestFile, resolver::ResolvedContainer};

/// Diagnostic description of a container.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ContainerInfo {
    /// `None` when the type could not be determined.
    pub container_type: Option<ContainerType>,
    pub zip_comment: Option<String>,
    pub mime_type_file_present: bool,
    pub mime_type_content: Option<String>,
    /// One description per token bound to a manifest, followed by manifests
    /// no token is bound to.
    pub manifest_files: Vec<ManifestFile>,
    pub content_filenames: Vec<String>,
}

impl ContainerInfo {
    pub fn from_resolved(resolved: &ResolvedContainer) -> Self {
        let mut manifest_files = Vec::new();
        let mut bound = vec![false; resolved.manifests.len()];

        for token in &resolved.tokens {
            let Some(idx) = token.manifest else {
                continue;
            };
            if let Some(record) = resolved.manifests.get(idx) {
                bound[idx] = true;
                let mut file = record.file.clone();
                file.signature_filename = Some(token.filename.clone());
                manifest_files.push(file);
            }
        }
        manifest_files.extend(
            resolved
                .manifests
                .iter()
                .zip(bound)
                .filter(|(_, bound)| !bound)
                .map(|(record, _)| record.file.clone()),
        );

        ContainerInfo {
            container_type: resolved.container_type,
            zip_comment: resolved.zip_comment.clone(),
            mime_type_file_present: resolved.mime_type_file_present(),
            mime_type_content: resolved.mime_type_content.clone(),
            manifest_files,
            content_filenames: resolved.documents().into_iter().map(String::from).collect(),
        }
    }

    /// Returns the manifest description bound to `signature_filename`.
    pub fn manifest_for(&self, signature_filename: &str) -> Option<&ManifestFile> {
        self.manifest_files
            .iter()
            .find(|m| m.signature_filename.as_deref() == Some(signature_filename))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::{
        container::{ContainerEntry, ExtractedContainer},
        resolver::ContainerResolver,
        settings::Settings,
    };

    #[test]
    fn one_description_per_binding() {
        let manifest = br#"<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0">
            <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.etsi.asic-e+zip"/>
            <manifest:file-entry manifest:full-path="hello.txt" manifest:media-type="text/plain"/>
        </manifest:manifest>"#;
        let entries: [(&str, &[u8]); 5] = [
            ("mimetype", b"application/vnd.etsi.asic-e+zip"),
            ("hello.txt", b"Hello world"),
            ("META-INF/manifest.xml", manifest),
            ("META-INF/signatures-1.xml", b"<sig/>"),
            ("META-INF/signatures-2.xml", b"<sig/>"),
        ];
        let extracted = ExtractedContainer {
            entries: entries
                .iter()
                .enumerate()
                .map(|(index, (name, data))| ContainerEntry {
                    name: name.to_string(),
                    data: data.to_vec(),
                    declared_size: data.len() as u64,
                    compressed_size: data.len() as u64,
                    index,
                    stored: true,
                    comment: None,
                })
                .collect(),
            ..Default::default()
        };
        let settings = Settings::default();
        let resolved = ContainerResolver::new(&settings).resolve(extracted, None).unwrap();

        let info = ContainerInfo::from_resolved(&resolved);
        assert_eq!(info.container_type, Some(ContainerType::AsicE));
        assert!(info.mime_type_file_present);
        assert_eq!(info.content_filenames, vec!["hello.txt"]);
        assert_eq!(info.manifest_files.len(), 2);
        for signature in ["META-INF/signatures-1.xml", "META-INF/signatures-2.xml"] {
            let file = info.manifest_for(signature).unwrap();
            assert_eq!(file.filename, "META-INF/manifest.xml");
            assert_eq!(file.entry_names(), vec!["hello.txt"]);
        }

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["container_type"], "ASiC-E");
    }
}
