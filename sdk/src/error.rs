// Copyright 2022 Adobe. All rights reserved.
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

use std::fmt;

use thiserror::Error;

/// Identifies which extraction guard stopped a container from being read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ZipBombGuard {
    /// The decompressed output grew beyond the allowed compression ratio.
    CompressionRatio,

    /// The decompressed output grew beyond the absolute size cap.
    ExtractedSize,

    /// The archive declares more entries than allowed.
    EntryCount,
}

impl fmt::Display for ZipBombGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZipBombGuard::CompressionRatio | ZipBombGuard::ExtractedSize => {
                write!(
                    f,
                    "Zip Bomb detected in the ZIP container. Validation is interrupted."
                )
            }
            ZipBombGuard::EntryCount => write!(
                f,
                "Too many files detected. Cannot extract ASiC content from the file."
            ),
        }
    }
}

/// `Error` enumerates errors returned by container extraction and validation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // --- extraction errors ---
    /// An extraction guard was tripped. Nothing extracted so far is returned.
    #[error("{guard}")]
    ZipBomb { guard: ZipBombGuard },

    /// The archive structure could not be read at all.
    #[error("Unable to extract content from zip archive: {reason}")]
    UnreadableArchive { reason: String },

    /// Too many entries could not be read.
    #[error("Unable to retrieve a valid ZipEntry ({tries} tries)")]
    MalformedEntries { tries: usize },

    // --- resolution errors ---
    /// The document is not a container this crate understands, or it only
    /// carries signature formats that are not enabled.
    #[error("Document format not recognized/handled")]
    FormatNotRecognized,

    #[error("manifest could not be parsed: {file}: {reason}")]
    ManifestParse { file: String, reason: String },

    // --- general errors ---
    #[error("bad parameter: {0}")]
    BadParam(String),

    #[error("settings version too new: {0}")]
    VersionCompatibility(String),

    #[error("type is unsupported")]
    UnsupportedType,

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    OtherError(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Returns `true` if this error was raised by one of the extraction guards.
    pub fn is_zip_bomb(&self) -> bool {
        matches!(self, Error::ZipBomb { .. })
    }

    /// Returns `true` if the archive itself could not be read.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::UnreadableArchive { .. } | Error::MalformedEntries { .. }
        )
    }
}

/// A specialized `Result` type for container operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::IoError(e),
            other => Error::UnreadableArchive {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_messages() {
        let ratio = Error::ZipBomb {
            guard: ZipBombGuard::CompressionRatio,
        };
        assert_eq!(
            ratio.to_string(),
            "Zip Bomb detected in the ZIP container. Validation is interrupted."
        );
        assert!(ratio.is_zip_bomb());
        assert!(!ratio.is_structural());

        let count = Error::ZipBomb {
            guard: ZipBombGuard::EntryCount,
        };
        assert_eq!(
            count.to_string(),
            "Too many files detected. Cannot extract ASiC content from the file."
        );
    }

    #[test]
    fn structural_errors() {
        let err = Error::MalformedEntries { tries: 101 };
        assert_eq!(
            err.to_string(),
            "Unable to retrieve a valid ZipEntry (101 tries)"
        );
        assert!(err.is_structural());
        assert!(!Error::FormatNotRecognized.is_structural());
    }
}
