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

//! Associates signatures, timestamps and evidence records with the manifests
//! and documents they cover.

use std::collections::BTreeSet;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};

use crate::{
    container::{
        classify::{is_root_document, MIMETYPE, ODF_MANIFEST, PACKAGE_ZIP},
        ContainerEntry, ContainerType, EntryKind, ExtractedContainer, ManifestKind,
        SecureContainerExtractor, SignatureFormat,
    },
    log_item,
    manifest::{ManifestDialect, ManifestEntry, ManifestFile, ParsedManifest},
    mime_type::MimeType,
    settings::Settings,
    status_tracker::StatusTracker,
    validation_status, Error, Result,
};

/// A container entry together with its classification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassifiedEntry {
    pub entry: ContainerEntry,
    pub kind: EntryKind,
}

/// A parsed manifest held in the manifest arena of a [`ResolvedContainer`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManifestRecord {
    pub file: ManifestFile,
    pub kind: ManifestKind,
    pub dialect: ManifestDialect,
    /// Tokens named by `SigReference` elements.
    pub sig_references: Vec<String>,
}

/// How one signature, timestamp or evidence record is tied to the container.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenBinding {
    pub filename: String,
    pub kind: EntryKind,
    /// Index of the bound manifest in [`ResolvedContainer::manifests`].
    pub manifest: Option<usize>,
    /// Manifests that all claim this token. Non-empty only when the binding is
    /// ambiguous, in which case `manifest` is `None`.
    pub ambiguous_manifests: Vec<usize>,
    /// The token filename occurs more than once in the container.
    pub duplicated: bool,
    /// Covered documents present in the container.
    pub signer_documents: Vec<String>,
    /// Covered documents listed by the manifest but absent from the container.
    pub missing_documents: Vec<String>,
}

impl TokenBinding {
    pub fn is_signature(&self) -> bool {
        self.kind.is_signature()
    }
}

/// The outcome of resolving one container. Read-only once built.
#[derive(Clone, Debug, Default)]
pub struct ResolvedContainer {
    pub container_type: Option<ContainerType>,
    /// Type announced by the document, the `mimetype` entry or the zip comment.
    pub declared_type: Option<ContainerType>,
    /// Type implied by the entry layout.
    pub structural_type: Option<ContainerType>,
    pub mime_type_content: Option<String>,
    pub mimetype_first: bool,
    pub mimetype_stored: bool,
    pub zip_comment: Option<String>,
    pub zip_comment_lossy: bool,
    pub entries: Vec<ClassifiedEntry>,
    pub manifests: Vec<ManifestRecord>,
    pub tokens: Vec<TokenBinding>,
    /// Archive manifests, oldest first.
    pub archive_chain: Vec<usize>,
    pub archive_chain_ordered: bool,
    pub last_archive_manifest: Option<usize>,
    /// Entries the last archive manifest should cover but does not.
    pub last_archive_uncovered: Vec<String>,
    /// Entry names of a `package.zip` nested in an ASiC-S container.
    pub nested_entries: Vec<String>,
    pub duplicate_names: Vec<String>,
    pub malformed_entries: usize,
    /// Findings made during resolution.
    pub status: StatusTracker,
}

impl ResolvedContainer {
    pub fn mime_type_file_present(&self) -> bool {
        self.entry(MIMETYPE).is_some()
    }

    pub fn entry(&self, name: &str) -> Option<&ClassifiedEntry> {
        self.entries.iter().find(|e| e.entry.name == name)
    }

    pub fn token(&self, filename: &str) -> Option<&TokenBinding> {
        self.tokens.iter().find(|t| t.filename == filename)
    }

    pub fn signatures(&self) -> impl Iterator<Item = &TokenBinding> {
        self.tokens.iter().filter(|t| t.is_signature())
    }

    pub fn manifest_of(&self, token: &TokenBinding) -> Option<&ManifestRecord> {
        token.manifest.and_then(|idx| self.manifests.get(idx))
    }

    /// Names of the documents carried by the container, in archive order.
    pub fn documents(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| matches!(e.kind, EntryKind::SignedContent | EntryKind::NestedContainer))
            .map(|e| e.entry.name.as_str())
            .collect()
    }

    /// Documents not covered by any token.
    pub fn uncovered_documents(&self) -> Vec<&str> {
        let covered: BTreeSet<&str> = self
            .tokens
            .iter()
            .flat_map(|t| t.signer_documents.iter().map(|s| s.as_str()))
            .collect();
        self.documents()
            .into_iter()
            .filter(|d| !covered.contains(d))
            .collect()
    }
}

/// Binds the tokens of an extracted container to manifests and documents.
#[derive(Clone, Debug)]
pub struct ContainerResolver<'a> {
    settings: &'a Settings,
    file_name: Option<&'a str>,
}

impl<'a> ContainerResolver<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        ContainerResolver {
            settings,
            file_name: None,
        }
    }

    /// Uses the extension of `file_name` as the weakest container type hint.
    #[must_use]
    pub fn with_file_name(mut self, file_name: Option<&'a str>) -> Self {
        self.file_name = file_name;
        self
    }

    /// Resolves `extracted`.
    ///
    /// `declared` is the media type announced for the document by the caller,
    /// if any. Returns [`Error::FormatNotRecognized`] when the archive is not a
    /// signature container, or when every signature it holds is in a format
    /// that is not enabled.
    pub fn resolve(
        &self,
        extracted: ExtractedContainer,
        declared: Option<&MimeType>,
    ) -> Result<ResolvedContainer> {
        let mut resolved = ResolvedContainer {
            zip_comment: extracted.zip_comment,
            zip_comment_lossy: extracted.zip_comment_lossy,
            duplicate_names: extracted.duplicate_names,
            malformed_entries: extracted.malformed_entries,
            archive_chain_ordered: true,
            ..Default::default()
        };
        resolved.entries = extracted
            .entries
            .into_iter()
            .map(|entry| ClassifiedEntry {
                kind: EntryKind::classify(&entry.name),
                entry,
            })
            .collect();

        self.read_mimetype(&mut resolved);
        self.determine_type(&mut resolved, declared);
        self.ensure_recognized(&resolved)?;
        self.open_nested(&mut resolved)?;
        self.parse_manifests(&mut resolved);
        self.bind_tokens(&mut resolved);
        self.order_archive_manifests(&mut resolved);
        self.log_container_findings(&mut resolved);

        Ok(resolved)
    }

    fn read_mimetype(&self, resolved: &mut ResolvedContainer) {
        let first = resolved
            .entries
            .first()
            .is_some_and(|e| e.entry.name == MIMETYPE);
        if let Some(mimetype) = resolved.entry(MIMETYPE) {
            let content = String::from_utf8_lossy(&mimetype.entry.data)
                .trim()
                .to_string();
            let stored = mimetype.entry.stored;
            resolved.mime_type_content = Some(content).filter(|c| !c.is_empty());
            resolved.mimetype_first = first;
            resolved.mimetype_stored = stored;
        }
    }

    fn determine_type(&self, resolved: &mut ResolvedContainer, declared: Option<&MimeType>) {
        let from_document = declared.and_then(|m| m.container_type());
        let from_mimetype = resolved
            .mime_type_content
            .as_deref()
            .and_then(|m| MimeType::from_mime_type_str(m).container_type());
        let from_comment = resolved
            .zip_comment
            .as_deref()
            .and_then(|c| c.trim().strip_prefix("mimetype="))
            .and_then(|m| MimeType::from_mime_type_str(m).container_type());
        let from_name = self
            .file_name
            .and_then(MimeType::from_file_name)
            .and_then(|m| m.container_type());
        resolved.declared_type = from_document
            .or(from_mimetype)
            .or(from_comment)
            .or(from_name);

        let documents = resolved
            .entries
            .iter()
            .filter(|e| e.kind == EntryKind::SignedContent)
            .count();
        let root_documents = resolved
            .entries
            .iter()
            .filter(|e| e.kind == EntryKind::SignedContent && is_root_document(&e.entry.name))
            .count();
        let scoping_manifest = resolved.entries.iter().any(|e| {
            matches!(
                e.kind,
                EntryKind::Manifest(ManifestKind::OpenDocument | ManifestKind::Asic)
            )
        });
        resolved.structural_type = match (documents, root_documents) {
            (0, _) => None,
            (_, 1) if documents == 1 && !scoping_manifest => Some(ContainerType::AsicS),
            _ => Some(ContainerType::AsicE),
        };
        resolved.container_type = resolved.declared_type.or(resolved.structural_type);
        debug!(
            "container type {:?} (declared {:?}, structure {:?})",
            resolved.container_type, resolved.declared_type, resolved.structural_type
        );
    }

    fn ensure_recognized(&self, resolved: &ResolvedContainer) -> Result<()> {
        let mut signatures = 0;
        let mut supported = 0;
        let mut container_parts = false;
        for e in &resolved.entries {
            match e.kind {
                EntryKind::Signature(format) => {
                    signatures += 1;
                    if self.supports(format) {
                        supported += 1;
                    }
                }
                EntryKind::Timestamp | EntryKind::EvidenceRecord | EntryKind::Manifest(_) => {
                    container_parts = true;
                }
                _ => {}
            }
        }

        if signatures > 0 && supported == 0 {
            debug!("no enabled signature format in container");
            return Err(Error::FormatNotRecognized);
        }
        if signatures == 0 && !container_parts && resolved.declared_type.is_none() {
            return Err(Error::FormatNotRecognized);
        }
        Ok(())
    }

    fn supports(&self, format: SignatureFormat) -> bool {
        match format {
            SignatureFormat::XAdES => self.settings.verify.xades,
            SignatureFormat::CAdES => self.settings.verify.cades,
        }
    }

    fn open_nested(&self, resolved: &mut ResolvedContainer) -> Result<()> {
        if resolved.container_type != Some(ContainerType::AsicS)
            || !self.settings.verify.open_nested_container
        {
            return Ok(());
        }
        let roots: Vec<usize> = resolved
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind == EntryKind::SignedContent && is_root_document(&e.entry.name))
            .map(|(i, _)| i)
            .collect();
        let [idx] = roots[..] else {
            return Ok(());
        };
        if resolved.entries[idx].entry.name != PACKAGE_ZIP {
            return Ok(());
        }

        let extractor = SecureContainerExtractor::new(self.settings.extract.clone());
        match extractor.extract(&resolved.entries[idx].entry.data) {
            Ok(nested) => {
                resolved.entries[idx].kind = EntryKind::NestedContainer;
                resolved.nested_entries = nested.entries.into_iter().map(|e| e.name).collect();
            }
            Err(e) if e.is_zip_bomb() => return Err(e),
            Err(e) => {
                log_item!(PACKAGE_ZIP, format!("nested container unreadable: {e}"), "open_nested")
                    .validation_status(validation_status::CONTAINER_NESTED_UNREADABLE)
                    .warning(&mut resolved.status);
            }
        }
        Ok(())
    }

    fn parse_manifests(&self, resolved: &mut ResolvedContainer) {
        let mut records = Vec::new();
        for e in &resolved.entries {
            let named_kind = match e.kind {
                EntryKind::Manifest(kind) => Some(kind),
                EntryKind::Other if e.entry.name.ends_with(".xml") => None,
                _ => continue,
            };

            let Some(dialect) = ManifestDialect::sniff(&e.entry.data) else {
                if named_kind.is_some() {
                    log_item!(
                        e.entry.name.clone(),
                        "manifest root element not recognized",
                        "parse_manifests"
                    )
                    .validation_status(validation_status::MANIFEST_UNPARSEABLE)
                    .failure_no_throw(&mut resolved.status, "unknown manifest dialect");
                }
                continue;
            };

            let parsed = match dialect.parse(&e.entry.name, &e.entry.data) {
                Ok(parsed) => parsed,
                Err(err) => {
                    log_item!(e.entry.name.clone(), err.to_string(), "parse_manifests")
                        .validation_status(validation_status::MANIFEST_UNPARSEABLE)
                        .failure_no_throw(&mut resolved.status, err);
                    continue;
                }
            };

            let kind = named_kind.unwrap_or(match dialect {
                ManifestDialect::OpenDocument => ManifestKind::OpenDocument,
                ManifestDialect::Asic => ManifestKind::Asic,
            });
            if named_kind.is_none() {
                debug!("{} is a manifest in disguise", e.entry.name);
            }
            records.push(self.build_record(resolved, &e.entry.name, kind, parsed));
        }
        resolved.manifests = records;
    }

    fn build_record(
        &self,
        resolved: &ResolvedContainer,
        filename: &str,
        kind: ManifestKind,
        parsed: ParsedManifest,
    ) -> ManifestRecord {
        let entries = parsed
            .entries
            .into_iter()
            .map(|p| {
                let target = resolved.entry(&p.uri);
                let intact = match (&p.digest, target) {
                    (Some(digest), Some(target)) if self.settings.verify.check_manifest_digests => {
                        digest.algorithm.map(|alg| {
                            STANDARD
                                .decode(&digest.value)
                                .map(|expected| alg.digest(&target.entry.data) == expected)
                                .unwrap_or(false)
                        })
                    }
                    _ => None,
                };
                ManifestEntry {
                    found: target.is_some(),
                    uri: p.uri,
                    mime_type: p.mime_type,
                    digest: p.digest,
                    intact,
                    root_file: p.root_file,
                }
            })
            .collect();

        let timestamp_manifest = kind == ManifestKind::Archive
            || (kind == ManifestKind::Asic
                && parsed
                    .sig_references
                    .iter()
                    .any(|r| EntryKind::classify(r) == EntryKind::Timestamp));

        ManifestRecord {
            file: ManifestFile {
                filename: filename.to_string(),
                signature_filename: parsed.sig_references.first().cloned(),
                entries,
                archive_manifest: kind == ManifestKind::Archive,
                timestamp_manifest,
                evidence_record_manifest: kind == ManifestKind::EvidenceRecord,
            },
            kind,
            dialect: parsed.dialect,
            sig_references: parsed.sig_references,
        }
    }

    fn manifest_candidates(
        &self,
        resolved: &ResolvedContainer,
        filename: &str,
        kind: EntryKind,
    ) -> Vec<usize> {
        let referencing = |accepted: &[ManifestKind]| -> Vec<usize> {
            resolved
                .manifests
                .iter()
                .enumerate()
                .filter(|(_, m)| {
                    accepted.contains(&m.kind) && m.sig_references.iter().any(|r| r == filename)
                })
                .map(|(i, _)| i)
                .collect()
        };

        match kind {
            EntryKind::Signature(SignatureFormat::XAdES) => {
                if resolved.container_type != Some(ContainerType::AsicE) {
                    return Vec::new();
                }
                let odf: Vec<usize> = resolved
                    .manifests
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| m.kind == ManifestKind::OpenDocument)
                    .map(|(i, _)| i)
                    .collect();
                let shared = odf
                    .iter()
                    .copied()
                    .find(|&i| resolved.manifests[i].file.filename == ODF_MANIFEST);
                let mut candidates = match shared {
                    Some(i) => vec![i],
                    None => odf,
                };
                candidates.extend(referencing(&[ManifestKind::Asic]));
                candidates
            }
            EntryKind::Signature(SignatureFormat::CAdES) => referencing(&[ManifestKind::Asic]),
            EntryKind::Timestamp => referencing(&[ManifestKind::Asic, ManifestKind::Archive]),
            EntryKind::EvidenceRecord => referencing(&[ManifestKind::EvidenceRecord]),
            _ => Vec::new(),
        }
    }

    fn bind_tokens(&self, resolved: &mut ResolvedContainer) {
        let root_documents: Vec<String> = resolved
            .entries
            .iter()
            .filter(|e| {
                matches!(e.kind, EntryKind::SignedContent | EntryKind::NestedContainer)
                    && is_root_document(&e.entry.name)
            })
            .map(|e| e.entry.name.clone())
            .collect();

        let mut seen = BTreeSet::new();
        let mut tokens: Vec<TokenBinding> = Vec::new();
        for e in &resolved.entries {
            if !e.kind.is_token() {
                continue;
            }
            if let EntryKind::Signature(format) = e.kind {
                if !self.supports(format) {
                    debug!("skipping {}: format not enabled", e.entry.name);
                    continue;
                }
            }
            if !seen.insert(e.entry.name.clone()) {
                // repeated names share one binding
                if let Some(first) = tokens.iter_mut().find(|t| t.filename == e.entry.name) {
                    first.duplicated = true;
                }
                continue;
            }

            let filename = e.entry.name.clone();
            let candidates = self.manifest_candidates(resolved, &filename, e.kind);
            let mut binding = TokenBinding {
                duplicated: resolved.duplicate_names.contains(&filename),
                filename,
                kind: e.kind,
                manifest: None,
                ambiguous_manifests: Vec::new(),
                signer_documents: Vec::new(),
                missing_documents: Vec::new(),
            };

            match candidates.len() {
                0 if resolved.container_type == Some(ContainerType::AsicS) => {
                    binding.signer_documents = root_documents.clone();
                }
                0 => {}
                1 => {
                    let idx = candidates[0];
                    binding.manifest = Some(idx);
                    for entry in &resolved.manifests[idx].file.entries {
                        if entry.found {
                            binding.signer_documents.push(entry.uri.clone());
                        } else {
                            binding.missing_documents.push(entry.uri.clone());
                        }
                    }
                }
                _ => binding.ambiguous_manifests = candidates,
            }
            debug!(
                "{} bound to {:?}, {} document(s)",
                binding.filename,
                binding.manifest.map(|i| resolved.manifests[i].file.filename.as_str()),
                binding.signer_documents.len()
            );
            tokens.push(binding);
        }
        resolved.tokens = tokens;
    }

    fn order_archive_manifests(&self, resolved: &mut ResolvedContainer) {
        let archives: Vec<usize> = resolved
            .manifests
            .iter()
            .enumerate()
            .filter(|(_, m)| m.kind == ManifestKind::Archive)
            .map(|(i, _)| i)
            .collect();
        if archives.is_empty() {
            return;
        }

        // covers[i] holds the positions in `archives` that archives[i] protects,
        // through either the manifest itself or its timestamp
        let covers: Vec<Vec<usize>> = archives
            .iter()
            .map(|&a| {
                let record = &resolved.manifests[a].file;
                (0..archives.len())
                    .filter(|&j| {
                        let other = &resolved.manifests[archives[j]];
                        archives[j] != a
                            && (record.covers(&other.file.filename)
                                || other.sig_references.iter().any(|r| record.covers(r)))
                    })
                    .collect()
            })
            .collect();

        let mut placed: Vec<usize> = Vec::new();
        let mut remaining: Vec<usize> = (0..archives.len()).collect();
        while !remaining.is_empty() {
            let ready: Vec<usize> = remaining
                .iter()
                .copied()
                .filter(|&r| covers[r].iter().all(|c| placed.contains(c)))
                .collect();
            if ready.is_empty() {
                break;
            }
            placed.extend(ready.iter().copied());
            remaining.retain(|r| !ready.contains(r));
        }
        let cycle = !remaining.is_empty();

        let last_candidates: Vec<usize> = (0..archives.len())
            .filter(|i| !covers.iter().any(|c| c.contains(i)))
            .map(|i| archives[i])
            .collect();

        resolved.archive_chain = placed.iter().map(|&p| archives[p]).collect();
        resolved.archive_chain_ordered = !cycle && last_candidates.len() == 1;
        if !resolved.archive_chain_ordered {
            let names: Vec<&str> = archives
                .iter()
                .map(|&a| resolved.manifests[a].file.filename.as_str())
                .collect();
            warn!("Archive manifests do not form a single chain: {names:?}");
            return;
        }

        let last = last_candidates[0];
        resolved.last_archive_manifest = Some(last);

        let record = &resolved.manifests[last];
        let uncovered: Vec<String> = resolved
            .entries
            .iter()
            .map(|e| e.entry.name.as_str())
            .filter(|name| {
                *name != MIMETYPE
                    && *name != record.file.filename
                    && !record.sig_references.iter().any(|r| r == name)
                    && !record.file.covers(name)
            })
            .map(|name| name.to_string())
            .collect();
        resolved.last_archive_uncovered = uncovered;
    }

    fn log_container_findings(&self, resolved: &mut ResolvedContainer) {
        if resolved.zip_comment_lossy {
            log_item!("", "zip comment is not valid UTF-8", "resolve")
                .validation_status(validation_status::CONTAINER_ZIP_COMMENT_INVALID_ENCODING)
                .informational(&mut resolved.status);
        }
        for name in resolved.duplicate_names.clone() {
            log_item!(name, "entry name occurs more than once", "resolve")
                .validation_status(validation_status::CONTAINER_ENTRY_DUPLICATED)
                .warning(&mut resolved.status);
        }
        if resolved.malformed_entries > 0 {
            log_item!(
                "",
                format!("{} unreadable entries skipped", resolved.malformed_entries),
                "resolve"
            )
            .validation_status(validation_status::CONTAINER_ENTRY_MALFORMED)
            .warning(&mut resolved.status);
        }
        if resolved.signatures().next().is_none() {
            log_item!("", "no signature found", "resolve")
                .validation_status(validation_status::CONTAINER_NO_SIGNATURE)
                .informational(&mut resolved.status);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn entry(name: &str, data: &[u8], index: usize) -> ContainerEntry {
        ContainerEntry {
            name: name.to_string(),
            data: data.to_vec(),
            declared_size: data.len() as u64,
            compressed_size: data.len() as u64,
            index,
            stored: true,
            comment: None,
        }
    }

    fn extracted(entries: &[(&str, &[u8])]) -> ExtractedContainer {
        ExtractedContainer {
            entries: entries
                .iter()
                .enumerate()
                .map(|(i, (n, d))| entry(n, d, i))
                .collect(),
            ..Default::default()
        }
    }

    const ODF_MANIFEST_XML: &[u8] = br#"<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0">
        <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.etsi.asic-e+zip"/>
        <manifest:file-entry manifest:full-path="hello.txt" manifest:media-type="text/plain"/>
    </manifest:manifest>"#;

    #[test]
    fn xades_signatures_share_manifest() {
        let settings = Settings::default();
        let resolved = ContainerResolver::new(&settings)
            .resolve(
                extracted(&[
                    ("mimetype", b"application/vnd.etsi.asic-e+zip"),
                    ("hello.txt", b"Hello world"),
                    ("META-INF/manifest.xml", ODF_MANIFEST_XML),
                    ("META-INF/signatures-1.xml", b"<sig/>"),
                    ("META-INF/signatures-2.xml", b"<sig/>"),
                ]),
                None,
            )
            .unwrap();

        assert_eq!(resolved.container_type, Some(ContainerType::AsicE));
        assert_eq!(resolved.manifests.len(), 1);
        assert_eq!(resolved.tokens.len(), 2);
        for token in &resolved.tokens {
            assert_eq!(token.manifest, Some(0));
            assert_eq!(token.signer_documents, vec!["hello.txt"]);
            assert!(token.missing_documents.is_empty());
        }
        assert!(resolved.uncovered_documents().is_empty());
        assert!(resolved.mimetype_first && resolved.mimetype_stored);
    }

    #[test]
    fn repeated_token_name_is_flagged() {
        let settings = Settings::default();
        // duplicate_names left empty, as when the central directory is unreadable
        let resolved = ContainerResolver::new(&settings)
            .resolve(
                extracted(&[
                    ("mimetype", b"application/vnd.etsi.asic-e+zip"),
                    ("hello.txt", b"Hello world"),
                    ("META-INF/manifest.xml", ODF_MANIFEST_XML),
                    ("META-INF/signatures-1.xml", b"<sig/>"),
                    ("META-INF/signatures-1.xml", b"<sig/>"),
                ]),
                None,
            )
            .unwrap();

        assert_eq!(resolved.tokens.len(), 1);
        assert!(resolved.tokens[0].duplicated);
    }

    #[test]
    fn asic_s_binds_root_document() {
        let settings = Settings::default();
        let resolved = ContainerResolver::new(&settings)
            .resolve(
                extracted(&[
                    ("mimetype", b"application/vnd.etsi.asic-s+zip"),
                    ("doc.pdf", b"%PDF"),
                    ("META-INF/signature.p7s", b"cms"),
                ]),
                None,
            )
            .unwrap();

        assert_eq!(resolved.container_type, Some(ContainerType::AsicS));
        assert_eq!(resolved.structural_type, Some(ContainerType::AsicS));
        let token = resolved.token("META-INF/signature.p7s").unwrap();
        assert_eq!(token.manifest, None);
        assert_eq!(token.signer_documents, vec!["doc.pdf"]);
    }

    #[test]
    fn unrelated_zip_is_not_recognized() {
        let settings = Settings::default();
        let err = ContainerResolver::new(&settings)
            .resolve(extracted(&[("a.txt", b"a"), ("b/c.txt", b"c")]), None)
            .unwrap_err();
        assert!(matches!(err, Error::FormatNotRecognized));
    }

    #[test]
    fn unsupported_formats_are_not_recognized() {
        let settings = Settings::default().with_value("verify.cades", false).unwrap();
        let err = ContainerResolver::new(&settings)
            .resolve(
                extracted(&[
                    ("mimetype", b"application/vnd.etsi.asic-s+zip"),
                    ("doc.pdf", b"%PDF"),
                    ("META-INF/signature.p7s", b"cms"),
                ]),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, Error::FormatNotRecognized));
    }

    #[test]
    fn declared_type_wins_over_layout() {
        let settings = Settings::default();
        let resolved = ContainerResolver::new(&settings)
            .resolve(
                extracted(&[("doc.pdf", b"%PDF"), ("META-INF/signature.p7s", b"cms")]),
                Some(&MimeType::AsicE),
            )
            .unwrap();
        assert_eq!(resolved.declared_type, Some(ContainerType::AsicE));
        assert_eq!(resolved.structural_type, Some(ContainerType::AsicS));
        assert_eq!(resolved.container_type, Some(ContainerType::AsicE));
        // ASiC-E CAdES without a manifest has no documents
        assert!(resolved.tokens[0].signer_documents.is_empty());
    }

    #[test]
    fn file_name_is_the_weakest_hint() {
        let settings = Settings::default();
        let layout = || extracted(&[("doc.pdf", b"%PDF"), ("META-INF/signature.p7s", b"cms")]);

        let resolved = ContainerResolver::new(&settings)
            .with_file_name(Some("signed.asice"))
            .resolve(layout(), None)
            .unwrap();
        assert_eq!(resolved.declared_type, Some(ContainerType::AsicE));
        assert_eq!(resolved.container_type, Some(ContainerType::AsicE));

        let resolved = ContainerResolver::new(&settings)
            .with_file_name(Some("signed.asice"))
            .resolve(layout(), Some(&MimeType::AsicS))
            .unwrap();
        assert_eq!(resolved.container_type, Some(ContainerType::AsicS));

        let resolved = ContainerResolver::new(&settings)
            .with_file_name(Some("signed.zip"))
            .resolve(layout(), None)
            .unwrap();
        assert_eq!(resolved.declared_type, None);
        assert_eq!(resolved.container_type, Some(ContainerType::AsicS));
    }

    #[test]
    fn zip_comment_hint() {
        let settings = Settings::default();
        let mut container = extracted(&[("doc.pdf", b"%PDF")]);
        container.zip_comment = Some("mimetype=application/vnd.etsi.asic-s+zip".into());

        let resolved = ContainerResolver::new(&settings).resolve(container, None).unwrap();
        assert_eq!(resolved.declared_type, Some(ContainerType::AsicS));
        assert!(resolved.tokens.is_empty());
        assert!(resolved.status.has_status(validation_status::CONTAINER_NO_SIGNATURE));
    }

    #[test]
    fn archive_chain_finds_last_manifest() {
        let first = br#"<ASiCManifest>
            <SigReference URI="META-INF/timestamp001.tst"/>
            <DataObjectReference URI="doc.txt"/>
        </ASiCManifest>"#;
        let second = br#"<ASiCManifest>
            <SigReference URI="META-INF/timestamp002.tst"/>
            <DataObjectReference URI="doc.txt"/>
            <DataObjectReference URI="META-INF/timestamp001.tst"/>
            <DataObjectReference URI="META-INF/ASiCArchiveManifest001.xml"/>
        </ASiCManifest>"#;
        let settings = Settings::default();
        let resolved = ContainerResolver::new(&settings)
            .resolve(
                extracted(&[
                    ("mimetype", b"application/vnd.etsi.asic-e+zip"),
                    ("doc.txt", b"doc"),
                    ("META-INF/ASiCArchiveManifest.xml", second),
                    ("META-INF/ASiCArchiveManifest001.xml", first),
                    ("META-INF/timestamp001.tst", b"tst"),
                    ("META-INF/timestamp002.tst", b"tst"),
                ]),
                None,
            )
            .unwrap();

        assert!(resolved.archive_chain_ordered);
        let last = resolved.last_archive_manifest.unwrap();
        assert_eq!(
            resolved.manifests[last].file.filename,
            "META-INF/ASiCArchiveManifest.xml"
        );
        let chain: Vec<&str> = resolved
            .archive_chain
            .iter()
            .map(|&i| resolved.manifests[i].file.filename.as_str())
            .collect();
        assert_eq!(
            chain,
            vec!["META-INF/ASiCArchiveManifest001.xml", "META-INF/ASiCArchiveManifest.xml"]
        );
        assert!(resolved.last_archive_uncovered.is_empty());
        assert!(resolved.manifests[last].file.timestamp_manifest);

        let ts = resolved.token("META-INF/timestamp002.tst").unwrap();
        assert_eq!(ts.manifest, Some(last));
    }

    #[test]
    fn two_unrelated_archive_manifests_are_not_ordered() {
        let a = br#"<ASiCManifest><SigReference URI="META-INF/timestamp1.tst"/><DataObjectReference URI="doc.txt"/></ASiCManifest>"#;
        let b = br#"<ASiCManifest><SigReference URI="META-INF/timestamp2.tst"/><DataObjectReference URI="doc.txt"/></ASiCManifest>"#;
        let settings = Settings::default();
        let resolved = ContainerResolver::new(&settings)
            .resolve(
                extracted(&[
                    ("doc.txt", b"doc"),
                    ("META-INF/ASiCArchiveManifest1.xml", a),
                    ("META-INF/ASiCArchiveManifest2.xml", b),
                    ("META-INF/timestamp1.tst", b"tst"),
                    ("META-INF/timestamp2.tst", b"tst"),
                ]),
                None,
            )
            .unwrap();

        assert!(!resolved.archive_chain_ordered);
        assert!(resolved.last_archive_manifest.is_none());
    }

    #[test]
    fn digests_are_checked() {
        let manifest = br#"<asic:ASiCManifest xmlns:asic="http://uri.etsi.org/02918/v1.2.1#" xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
            <asic:SigReference URI="META-INF/signature.p7s"/>
            <asic:DataObjectReference URI="hello.txt">
                <ds:DigestMethod Algorithm="http://www.w3.org/2001/04/xmlenc#sha256"/>
                <ds:DigestValue>ZOyIygCyaOW6GjVnihtTFtIS9PNmskdyMlNKiuyjfzw=</ds:DigestValue>
            </asic:DataObjectReference>
            <asic:DataObjectReference URI="other.txt">
                <ds:DigestMethod Algorithm="http://www.w3.org/2001/04/xmlenc#sha256"/>
                <ds:DigestValue>ZOyIygCyaOW6GjVnihtTFtIS9PNmskdyMlNKiuyjfzw=</ds:DigestValue>
            </asic:DataObjectReference>
        </asic:ASiCManifest>"#;
        let settings = Settings::default();
        let resolved = ContainerResolver::new(&settings)
            .resolve(
                extracted(&[
                    ("mimetype", b"application/vnd.etsi.asic-e+zip"),
                    ("hello.txt", b"Hello world"),
                    ("other.txt", b"tampered"),
                    ("META-INF/ASiCManifest.xml", manifest),
                    ("META-INF/signature.p7s", b"cms"),
                ]),
                None,
            )
            .unwrap();

        let record = &resolved.manifests[0];
        assert_eq!(record.file.signature_filename.as_deref(), Some("META-INF/signature.p7s"));
        assert_eq!(record.file.entries[0].intact, Some(true));
        assert_eq!(record.file.entries[1].intact, Some(false));
        assert_eq!(
            resolved.token("META-INF/signature.p7s").unwrap().manifest,
            Some(0)
        );
    }

    #[test]
    fn unparseable_manifest_is_a_finding() {
        let settings = Settings::default();
        let resolved = ContainerResolver::new(&settings)
            .resolve(
                extracted(&[
                    ("mimetype", b"application/vnd.etsi.asic-e+zip"),
                    ("hello.txt", b"Hello world"),
                    ("META-INF/ASiCManifest.xml", b"<ASiCManifest><oops></ASiCManifest>"),
                    ("META-INF/signature.p7s", b"cms"),
                ]),
                None,
            )
            .unwrap();

        assert!(resolved.manifests.is_empty());
        assert!(resolved
            .status
            .has_status_for("META-INF/ASiCManifest.xml", validation_status::MANIFEST_UNPARSEABLE));
        assert_eq!(resolved.token("META-INF/signature.p7s").unwrap().manifest, None);
    }
}
