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

use log::{debug, info};

use crate::{
    checks::FormatChecker,
    container::{ExtractedContainer, SecureContainerExtractor},
    container_info::ContainerInfo,
    document::Document,
    report::ValidationReport,
    resolver::{ContainerResolver, ResolvedContainer},
    settings::{IntoSettings, Settings},
    Error, Result,
};

/// Entry point for examining signature containers.
///
/// A validator owns its [`Settings`] and holds no other state, so a single
/// instance can be shared between threads, and instances with different
/// settings never interfere.
///
/// # Example
///
/// ```
/// # use asic_container::{ContainerValidator, ContainerWriter, Document, MimeType};
/// # fn main() -> asic_container::Result<()> {
/// let bytes = ContainerWriter::new(MimeType::AsicS)
///     .add("doc.txt", b"hello".to_vec())
///     .add("META-INF/signature.p7s", b"cms".to_vec())
///     .finish()?;
///
/// let validator = ContainerValidator::with_settings(r#"{"extract": {"max_entries": 10}}"#)?;
/// let report = validator.validate(&Document::new(bytes))?;
/// assert_eq!(report.tokens.len(), 1);
/// assert_eq!(report.tokens[0].signer_documents, vec!["doc.txt"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct ContainerValidator {
    settings: Settings,
}

impl ContainerValidator {
    pub fn new(settings: Settings) -> Self {
        ContainerValidator { settings }
    }

    /// Creates a validator from anything that converts into [`Settings`],
    /// such as a JSON or TOML string.
    pub fn with_settings(settings: impl IntoSettings) -> Result<Self> {
        Ok(Self::new(settings.into_settings()?))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Extracts the entries of `document` within the configured limits.
    pub fn extract(&self, document: &Document) -> Result<ExtractedContainer> {
        if !document.looks_like_zip() {
            debug!("{:?} is not a ZIP archive", document.name());
            return Err(Error::FormatNotRecognized);
        }
        SecureContainerExtractor::new(self.settings.extract.clone()).extract(document.bytes())
    }

    /// Extracts and resolves `document` without running the format checks.
    pub fn resolve(&self, document: &Document) -> Result<ResolvedContainer> {
        let extracted = self.extract(document)?;
        ContainerResolver::new(&self.settings)
            .with_file_name(document.name())
            .resolve(extracted, document.mime_type())
    }

    pub fn container_info(&self, document: &Document) -> Result<ContainerInfo> {
        Ok(ContainerInfo::from_resolved(&self.resolve(document)?))
    }

    /// Extracts, resolves and checks `document`.
    ///
    /// Structural failures, zip bombs and unrecognized formats are returned as
    /// errors. Everything else is reported in the [`ValidationReport`].
    pub fn validate(&self, document: &Document) -> Result<ValidationReport> {
        let resolved = self.resolve(document)?;
        let checks = FormatChecker::new(&self.settings.verify).check(&resolved);
        let report = ValidationReport::new(document.name().map(String::from), &resolved, checks);

        info!(
            "{}: {} token(s), valid: {}",
            document.name().unwrap_or("<bytes>"),
            report.tokens.len(),
            report.is_valid()
        );
        Ok(report)
    }
}
