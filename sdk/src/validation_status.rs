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

//! Status codes attached to container findings.

#![deny(missing_docs)]

use serde::Serialize;

use crate::status_tracker::{LogItem, LogKind, StatusTracker};

// -- success codes --

/// The token is bound to exactly one manifest.
///
/// Any corresponding URL is the token filename.
pub const SIGNATURE_MANIFEST_BOUND: &str = "signature.manifest.bound";

/// Every entry the manifest references exists and, where a digest is
/// declared, matches it.
///
/// Any corresponding URL is the manifest filename.
pub const MANIFEST_ENTRIES_INTACT: &str = "manifest.entries.intact";

// -- container codes --

/// The container has no `mimetype` entry.
pub const CONTAINER_MIMETYPE_MISSING: &str = "container.mimetype.missing";

/// The `mimetype` entry is not the first entry of the archive.
pub const CONTAINER_MIMETYPE_NOT_FIRST: &str = "container.mimetype.notFirst";

/// The `mimetype` entry is compressed.
pub const CONTAINER_MIMETYPE_COMPRESSED: &str = "container.mimetype.compressed";

/// The declared media type disagrees with the entry layout.
pub const CONTAINER_MIMETYPE_MISMATCH: &str = "container.mimetype.mismatch";

/// The zip comment is not valid UTF-8 and was decoded lossily.
pub const CONTAINER_ZIP_COMMENT_INVALID_ENCODING: &str = "container.zipComment.invalidEncoding";

/// Two central directory records carry the same name.
///
/// Any corresponding URL is the duplicated name.
pub const CONTAINER_ENTRY_DUPLICATED: &str = "container.entry.duplicated";

/// Unreadable entries were skipped during extraction.
pub const CONTAINER_ENTRY_MALFORMED: &str = "container.entry.malformed";

/// The container holds no signature.
pub const CONTAINER_NO_SIGNATURE: &str = "container.noSignature";

/// Some documents are not covered by any token.
pub const CONTAINER_FILES_NOT_COVERED: &str = "container.files.notCovered";

/// An ASiC-S container has no single document at its root.
pub const CONTAINER_ROOT_DOCUMENT_MISSING: &str = "container.rootDocument.missing";

/// The `package.zip` of an ASiC-S container cannot be opened.
pub const CONTAINER_NESTED_UNREADABLE: &str = "container.nested.unreadable";

// -- token codes --

/// The signature filename occurs more than once.
pub const SIGNATURE_DUPLICATED: &str = "signature.duplicated";

/// No manifest scopes the token.
pub const SIGNATURE_MANIFEST_MISSING: &str = "signature.manifest.missing";

/// The manifest or signature filename breaks the naming rules.
pub const SIGNATURE_MANIFEST_FILENAME_MISMATCH: &str = "signature.manifest.filenameMismatch";

/// Several manifests claim the same token.
pub const SIGNATURE_MANIFEST_AMBIGUOUS: &str = "signature.manifest.ambiguous";

/// The token covers no document.
pub const SIGNATURE_SIGNER_DOCUMENTS_MISSING: &str = "signature.signerDocuments.missing";

/// A timestamp manifest has an invalid name.
pub const TIMESTAMP_MANIFEST_FILENAME_MISMATCH: &str = "timestamp.manifest.filenameMismatch";

/// A content timestamp manifest covers signatures or other timestamps.
pub const TIMESTAMP_COVERAGE_INVALID: &str = "timestamp.manifest.coverageInvalid";

/// An evidence record has no manifest.
pub const EVIDENCE_RECORD_MANIFEST_MISSING: &str = "evidenceRecord.manifest.missing";

// -- manifest codes --

/// A manifest references an entry that is not in the container.
///
/// Any corresponding URL is the manifest filename.
pub const MANIFEST_ENTRY_NOT_FOUND: &str = "manifest.entry.notFound";

/// A manifest entry digest does not match the entry content.
pub const MANIFEST_ENTRY_DIGEST_MISMATCH: &str = "manifest.entry.digestMismatch";

/// A manifest cannot be parsed.
pub const MANIFEST_UNPARSEABLE: &str = "manifest.unparseable";

/// Archive manifests do not form a single chain.
pub const ARCHIVE_MANIFEST_CHAIN_NOT_ORDERED: &str = "archiveManifest.chain.notOrdered";

/// The last archive manifest leaves container entries uncovered.
pub const ARCHIVE_MANIFEST_INCOMPLETE: &str = "archiveManifest.incomplete";

/// Returns `true` if the status code is a success code.
pub fn is_success(status_code: &str) -> bool {
    matches!(
        status_code,
        SIGNATURE_MANIFEST_BOUND | MANIFEST_ENTRIES_INTACT
    )
}

/// A status code with the entry it refers to, as reported to callers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidationStatus {
    code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,

    kind: LogKind,
}

impl ValidationStatus {
    pub(crate) fn new<S: Into<String>>(code: S) -> Self {
        Self {
            code: code.into(),
            url: None,
            explanation: None,
            kind: LogKind::Success,
        }
    }

    /// Returns the status code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the container entry the status refers to.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns a human-readable description of the finding.
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Returns the kind of the finding.
    pub fn kind(&self) -> LogKind {
        self.kind
    }

    /// Returns `true` if this has a successful status code.
    pub fn passed(&self) -> bool {
        is_success(&self.code)
    }

    /// Creates a `ValidationStatus` from a log item that carries a status code.
    pub(crate) fn from_log_item(item: &LogItem) -> Option<Self> {
        let code = item.validation_status.as_ref()?;
        let mut status = Self::new(code.to_string());
        if !item.label.is_empty() {
            status.url = Some(item.label.to_string());
        }
        if !item.description.is_empty() {
            status.explanation = Some(item.description.to_string());
        }
        status.kind = item.kind;
        Some(status)
    }
}

/// Collects the status codes of every logged item, in logging order.
pub fn statuses(tracker: &StatusTracker) -> Vec<ValidationStatus> {
    tracker
        .logged_items()
        .iter()
        .filter_map(ValidationStatus::from_log_item)
        .collect()
}
