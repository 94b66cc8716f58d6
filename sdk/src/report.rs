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

//! The report produced by [`ContainerValidator::validate`](crate::ContainerValidator::validate).

use serde::Serialize;

use crate::{
    checks::{FormatCheckResult, Indication, SubIndication, Verdict},
    container::EntryKind,
    container_info::ContainerInfo,
    resolver::ResolvedContainer,
    status_tracker::StatusTracker,
    validation_status::{self, ValidationStatus},
    Result,
};

/// Findings and verdict for one signature, timestamp or evidence record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TokenReport {
    pub filename: String,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    pub signer_documents: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_documents: Vec<String>,
    pub duplicated: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ambiguous_manifests: Vec<String>,
    #[serde(flatten)]
    pub verdict: Verdict,
    pub findings: Vec<ValidationStatus>,
}

impl TokenReport {
    pub fn indication(&self) -> Indication {
        self.verdict.indication
    }

    pub fn sub_indication(&self) -> Option<SubIndication> {
        self.verdict.sub_indication
    }

    /// Returns `true` if a finding carries `code`.
    pub fn has_finding(&self, code: &str) -> bool {
        self.findings.iter().any(|f| f.code() == code)
    }
}

/// Outcome of validating one container.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    pub container: ContainerInfo,
    pub no_signature_found: bool,
    pub tokens: Vec<TokenReport>,
    /// Findings about the container as a whole.
    pub findings: Vec<ValidationStatus>,
}

impl ValidationReport {
    pub(crate) fn new(
        document_name: Option<String>,
        resolved: &ResolvedContainer,
        checks: FormatCheckResult,
    ) -> Self {
        let manifest_name = |idx: usize| {
            resolved
                .manifests
                .get(idx)
                .map(|m| m.file.filename.clone())
        };

        let mut tokens = Vec::with_capacity(resolved.tokens.len());
        for (binding, checked) in resolved.tokens.iter().zip(checks.tokens) {
            tokens.push(TokenReport {
                filename: binding.filename.clone(),
                kind: binding.kind,
                manifest: binding.manifest.and_then(manifest_name),
                signer_documents: binding.signer_documents.clone(),
                missing_documents: binding.missing_documents.clone(),
                duplicated: binding.duplicated,
                ambiguous_manifests: binding
                    .ambiguous_manifests
                    .iter()
                    .filter_map(|&i| manifest_name(i))
                    .collect(),
                verdict: checked.verdict,
                findings: validation_status::statuses(&checked.status),
            });
        }

        let mut container_status = StatusTracker::default();
        container_status.append(&resolved.status);
        container_status.append(&checks.container);

        ValidationReport {
            document_name,
            container: ContainerInfo::from_resolved(resolved),
            no_signature_found: resolved.signatures().next().is_none(),
            tokens,
            findings: validation_status::statuses(&container_status),
        }
    }

    pub fn token(&self, filename: &str) -> Option<&TokenReport> {
        self.tokens.iter().find(|t| t.filename == filename)
    }

    pub fn signatures(&self) -> impl Iterator<Item = &TokenReport> {
        self.tokens.iter().filter(|t| t.kind.is_signature())
    }

    /// Returns `true` if every token passed.
    pub fn is_valid(&self) -> bool {
        self.tokens.iter().all(|t| t.verdict.is_passed())
    }

    /// Returns `true` if a container finding carries `code`.
    pub fn has_finding(&self, code: &str) -> bool {
        self.findings.iter().any(|f| f.code() == code)
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Prints the report as JSON.
impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = self.to_json().map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}
