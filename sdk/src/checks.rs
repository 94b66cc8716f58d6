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

//! Format checks that turn a [`ResolvedContainer`] into per-token verdicts.
//!
//! Each check is governed by a [`ConstraintLevel`]. A check at
//! [`ConstraintLevel::Fail`] degrades the verdict of the tokens it concerns;
//! at `Warn` or `Inform` it only leaves a finding.

use log::debug;
use serde::Serialize;

use crate::{
    container::{
        classify::{is_root_document, LAST_ARCHIVE_MANIFEST, META_INF, ODF_MANIFEST},
        ContainerType, EntryKind, ManifestKind, SignatureFormat,
    },
    log_current_item, log_item,
    resolver::{ResolvedContainer, TokenBinding},
    settings::{ConstraintLevel, FormatConstraints, VerifySettings},
    status_tracker::{LogItem, StatusTracker},
    validation_status::*,
};

/// Main verdict for a token.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Indication {
    #[default]
    Passed,
    Indeterminate,
    Failed,
}

/// Reason for a verdict other than [`Indication::Passed`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubIndication {
    FormatFailure,
    SignedDataNotFound,
    HashFailure,
}

/// An indication with its sub-indication.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Verdict {
    pub indication: Indication,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_indication: Option<SubIndication>,
}

impl Verdict {
    pub fn new(indication: Indication, sub_indication: SubIndication) -> Self {
        Verdict {
            indication,
            sub_indication: Some(sub_indication),
        }
    }

    /// Keeps the more severe of the two verdicts. `Failed` outranks
    /// `Indeterminate`, which outranks `Passed`; on a tie the first reason
    /// stays.
    pub fn degrade(&mut self, other: Verdict) {
        if other.indication > self.indication {
            *self = other;
        }
    }

    pub fn is_passed(&self) -> bool {
        self.indication == Indication::Passed
    }
}

fn format_failure() -> Verdict {
    Verdict::new(Indication::Failed, SubIndication::FormatFailure)
}

/// Verdict and findings for one token.
#[derive(Clone, Debug)]
pub struct TokenVerdict {
    pub filename: String,
    pub verdict: Verdict,
    pub status: StatusTracker,
}

/// Everything the format checks produced for a container.
#[derive(Clone, Debug, Default)]
pub struct FormatCheckResult {
    /// Findings about the container as a whole.
    pub container: StatusTracker,
    /// Verdict contributed by container-level checks to every token.
    pub container_verdict: Verdict,
    pub tokens: Vec<TokenVerdict>,
}

impl FormatCheckResult {
    pub fn token(&self, filename: &str) -> Option<&TokenVerdict> {
        self.tokens.iter().find(|t| t.filename == filename)
    }
}

/// Runs the configured format checks.
#[derive(Clone, Debug)]
pub struct FormatChecker<'a> {
    constraints: &'a FormatConstraints,
}

impl<'a> FormatChecker<'a> {
    pub fn new(settings: &'a VerifySettings) -> Self {
        FormatChecker {
            constraints: &settings.constraints,
        }
    }

    pub fn check(&self, resolved: &ResolvedContainer) -> FormatCheckResult {
        let mut result = FormatCheckResult::default();
        self.check_container(resolved, &mut result);

        for token in &resolved.tokens {
            let mut status = StatusTracker::default();
            status.push_current_uri(token.filename.clone());
            let mut verdict = result.container_verdict;
            self.check_token(resolved, token, &mut verdict, &mut status);
            status.pop_current_uri();

            debug!("{}: {:?}", token.filename, verdict);
            result.tokens.push(TokenVerdict {
                filename: token.filename.clone(),
                verdict,
                status,
            });
        }
        result
    }

    // Records `item` at `level`; a `Fail` level also degrades `verdict`.
    fn apply(
        &self,
        level: ConstraintLevel,
        item: LogItem,
        on_fail: Verdict,
        verdict: &mut Verdict,
        status: &mut StatusTracker,
    ) {
        match level {
            ConstraintLevel::Fail => {
                let description = item.description.to_string();
                item.failure_no_throw(status, description);
                verdict.degrade(on_fail);
            }
            ConstraintLevel::Warn => item.warning(status),
            ConstraintLevel::Inform => item.informational(status),
            ConstraintLevel::Ignore => {}
        }
    }

    fn check_container(&self, resolved: &ResolvedContainer, result: &mut FormatCheckResult) {
        let c = self.constraints;
        let verdict = &mut result.container_verdict;
        let status = &mut result.container;

        if !resolved.mime_type_file_present() {
            self.apply(
                c.mimetype_present,
                log_item!("", "container has no mimetype entry", "check_container")
                    .validation_status(CONTAINER_MIMETYPE_MISSING),
                format_failure(),
                verdict,
                status,
            );
        } else {
            if !resolved.mimetype_first {
                self.apply(
                    c.mimetype_first_and_stored,
                    log_item!("mimetype", "mimetype is not the first entry", "check_container")
                        .validation_status(CONTAINER_MIMETYPE_NOT_FIRST),
                    format_failure(),
                    verdict,
                    status,
                );
            }
            if !resolved.mimetype_stored {
                self.apply(
                    c.mimetype_first_and_stored,
                    log_item!("mimetype", "mimetype is compressed", "check_container")
                        .validation_status(CONTAINER_MIMETYPE_COMPRESSED),
                    format_failure(),
                    verdict,
                    status,
                );
            }
        }

        if let (Some(declared), Some(structural)) =
            (resolved.declared_type, resolved.structural_type)
        {
            if declared != structural {
                self.apply(
                    c.mimetype_matches_structure,
                    log_item!(
                        "",
                        format!("declared {declared} but structure is {structural}"),
                        "check_container"
                    )
                    .validation_status(CONTAINER_MIMETYPE_MISMATCH),
                    format_failure(),
                    verdict,
                    status,
                );
            }
        }

        if !resolved.tokens.is_empty() {
            let uncovered = resolved.uncovered_documents();
            if !uncovered.is_empty() {
                self.apply(
                    c.all_files_signed,
                    log_item!(
                        "",
                        format!(
                            "not covered by any signature or timestamp: {}",
                            uncovered.join(", ")
                        ),
                        "check_container"
                    )
                    .validation_status(CONTAINER_FILES_NOT_COVERED),
                    format_failure(),
                    verdict,
                    status,
                );
            }
        }
    }

    fn check_token(
        &self,
        resolved: &ResolvedContainer,
        token: &TokenBinding,
        verdict: &mut Verdict,
        status: &mut StatusTracker,
    ) {
        let c = self.constraints;
        let manifest = resolved.manifest_of(token);

        if token.duplicated {
            self.apply(
                c.signature_not_duplicated,
                log_current_item!("filename occurs more than once", "check_token")
                    .validation_status(SIGNATURE_DUPLICATED),
                format_failure(),
                verdict,
                status,
            );
        }

        if !token.ambiguous_manifests.is_empty() {
            let names: Vec<&str> = token
                .ambiguous_manifests
                .iter()
                .filter_map(|&i| resolved.manifests.get(i))
                .map(|m| m.file.filename.as_str())
                .collect();
            self.apply(
                c.manifest_unambiguous,
                log_current_item!(
                    format!("claimed by several manifests: {}", names.join(", ")),
                    "check_token"
                )
                .validation_status(SIGNATURE_MANIFEST_AMBIGUOUS),
                format_failure(),
                verdict,
                status,
            );
        } else if manifest.is_none() && resolved.container_type == Some(ContainerType::AsicE) {
            let code = match token.kind {
                EntryKind::EvidenceRecord => EVIDENCE_RECORD_MANIFEST_MISSING,
                _ => SIGNATURE_MANIFEST_MISSING,
            };
            self.apply(
                c.manifest_present,
                log_current_item!("no manifest found", "check_token").validation_status(code),
                format_failure(),
                verdict,
                status,
            );
        }

        if let Some(record) = manifest {
            log_current_item!(format!("bound to {}", record.file.filename), "check_token")
                .validation_status(SIGNATURE_MANIFEST_BOUND)
                .success(status);
        }

        self.check_filenames(resolved, token, verdict, status);
        self.check_documents(resolved, token, verdict, status);
        self.check_timestamp_scope(resolved, token, verdict, status);
    }

    fn check_filenames(
        &self,
        resolved: &ResolvedContainer,
        token: &TokenBinding,
        verdict: &mut Verdict,
        status: &mut StatusTracker,
    ) {
        let level = self.constraints.filename_adherence;
        let mismatch = |reason: String,
                        code: &'static str,
                        verdict: &mut Verdict,
                        status: &mut StatusTracker| {
            self.apply(
                level,
                log_current_item!(reason, "check_filenames").validation_status(code),
                format_failure(),
                verdict,
                status,
            );
        };

        if resolved.container_type == Some(ContainerType::AsicS) {
            let expected = match token.kind {
                EntryKind::Signature(SignatureFormat::CAdES) => Some("META-INF/signature.p7s"),
                EntryKind::Signature(SignatureFormat::XAdES) => Some("META-INF/signatures.xml"),
                _ => None,
            };
            if let Some(expected) = expected {
                if token.filename != expected {
                    mismatch(
                        format!("ASiC-S signature should be named {expected}"),
                        SIGNATURE_MANIFEST_FILENAME_MISMATCH,
                        verdict,
                        status,
                    );
                }
            }
            return;
        }

        let Some(record) = resolved.manifest_of(token) else {
            return;
        };
        let name = record.file.filename.as_str();
        let named_like = |prefix: &str| {
            name.strip_prefix(META_INF)
                .is_some_and(|rest| rest.starts_with(prefix) && !rest.contains('/'))
                && name.ends_with(".xml")
        };

        match token.kind {
            EntryKind::Signature(SignatureFormat::XAdES) if name != ODF_MANIFEST => mismatch(
                format!("XAdES manifest should be {ODF_MANIFEST}, found {name}"),
                SIGNATURE_MANIFEST_FILENAME_MISMATCH,
                verdict,
                status,
            ),
            EntryKind::Signature(SignatureFormat::CAdES) if !named_like("ASiCManifest") => mismatch(
                format!("CAdES manifest {name} is not named META-INF/ASiCManifest*.xml"),
                SIGNATURE_MANIFEST_FILENAME_MISMATCH,
                verdict,
                status,
            ),
            EntryKind::Timestamp => {
                if !named_like("ASiCManifest") && !named_like("ASiCArchiveManifest") {
                    mismatch(
                        format!("timestamp manifest {name} has an invalid name"),
                        TIMESTAMP_MANIFEST_FILENAME_MISMATCH,
                        verdict,
                        status,
                    );
                } else if token.manifest == resolved.last_archive_manifest
                    && record.kind == ManifestKind::Archive
                    && name != LAST_ARCHIVE_MANIFEST
                {
                    mismatch(
                        format!(
                            "last archive manifest should be {LAST_ARCHIVE_MANIFEST}, found {name}"
                        ),
                        TIMESTAMP_MANIFEST_FILENAME_MISMATCH,
                        verdict,
                        status,
                    );
                }
            }
            EntryKind::EvidenceRecord if !named_like("ASiCEvidenceRecordManifest") => mismatch(
                format!("evidence record manifest {name} has an invalid name"),
                SIGNATURE_MANIFEST_FILENAME_MISMATCH,
                verdict,
                status,
            ),
            _ => {}
        }
    }

    fn check_documents(
        &self,
        resolved: &ResolvedContainer,
        token: &TokenBinding,
        verdict: &mut Verdict,
        status: &mut StatusTracker,
    ) {
        let c = self.constraints;

        if resolved.container_type == Some(ContainerType::AsicS) && token.manifest.is_none() {
            let roots = resolved
                .documents()
                .into_iter()
                .filter(|d| is_root_document(d))
                .count();
            if roots != 1 {
                self.apply(
                    c.signed_files_present,
                    log_current_item!(
                        format!("ASiC-S container needs one root document, found {roots}"),
                        "check_documents"
                    )
                    .validation_status(CONTAINER_ROOT_DOCUMENT_MISSING),
                    format_failure(),
                    verdict,
                    status,
                );
                return;
            }
        }

        // entries named but absent are reported below as not found
        if token.signer_documents.is_empty() && token.missing_documents.is_empty() {
            self.apply(
                c.signed_files_present,
                log_current_item!("no signed document found", "check_documents")
                    .validation_status(SIGNATURE_SIGNER_DOCUMENTS_MISSING),
                format_failure(),
                verdict,
                status,
            );
        }

        for missing in &token.missing_documents {
            self.apply(
                c.manifest_entries_found,
                log_current_item!(format!("data not found: {missing}"), "check_documents")
                    .validation_status(MANIFEST_ENTRY_NOT_FOUND),
                Verdict::new(Indication::Indeterminate, SubIndication::SignedDataNotFound),
                verdict,
                status,
            );
        }

        let Some(record) = resolved.manifest_of(token) else {
            return;
        };
        let broken: Vec<&str> = record
            .file
            .entries
            .iter()
            .filter(|e| e.intact == Some(false))
            .map(|e| e.uri.as_str())
            .collect();
        for uri in &broken {
            self.apply(
                c.manifest_entries_intact,
                log_current_item!(format!("digest mismatch for {uri}"), "check_documents")
                    .validation_status(MANIFEST_ENTRY_DIGEST_MISMATCH),
                Verdict::new(Indication::Failed, SubIndication::HashFailure),
                verdict,
                status,
            );
        }
        if broken.is_empty()
            && token.missing_documents.is_empty()
            && !record.file.entries.is_empty()
        {
            log_current_item!(
                format!("{} entries intact", record.file.filename),
                "check_documents"
            )
            .validation_status(MANIFEST_ENTRIES_INTACT)
            .success(status);
        }
    }

    fn check_timestamp_scope(
        &self,
        resolved: &ResolvedContainer,
        token: &TokenBinding,
        verdict: &mut Verdict,
        status: &mut StatusTracker,
    ) {
        if token.kind != EntryKind::Timestamp {
            return;
        }
        let c = self.constraints;
        let Some(record) = resolved.manifest_of(token) else {
            return;
        };

        if record.kind == ManifestKind::Asic {
            let tokens: Vec<&str> = record
                .file
                .entries
                .iter()
                .map(|e| e.uri.as_str())
                .filter(|uri| EntryKind::classify(uri).is_token())
                .collect();
            if !tokens.is_empty() {
                self.apply(
                    c.timestamp_coverage,
                    log_current_item!(
                        format!("content timestamp covers {}", tokens.join(", ")),
                        "check_timestamp_scope"
                    )
                    .validation_status(TIMESTAMP_COVERAGE_INVALID),
                    format_failure(),
                    verdict,
                    status,
                );
            }
            return;
        }

        if record.kind != ManifestKind::Archive {
            return;
        }
        if !resolved.archive_chain_ordered {
            self.apply(
                c.archive_manifest_chain,
                log_current_item!("archive manifests are not ordered", "check_timestamp_scope")
                    .validation_status(ARCHIVE_MANIFEST_CHAIN_NOT_ORDERED),
                format_failure(),
                verdict,
                status,
            );
        } else if token.manifest == resolved.last_archive_manifest
            && !resolved.last_archive_uncovered.is_empty()
        {
            self.apply(
                c.archive_manifest_chain,
                log_current_item!(
                    format!(
                        "last archive manifest does not cover {}",
                        resolved.last_archive_uncovered.join(", ")
                    ),
                    "check_timestamp_scope"
                )
                .validation_status(ARCHIVE_MANIFEST_INCOMPLETE),
                format_failure(),
                verdict,
                status,
            );
        }
    }
}
