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

use std::fmt;

use serde::{Serialize, Serializer};

use crate::container::ContainerType;

const ASICS: &str = "application/vnd.etsi.asic-s+zip";
const ASICE: &str = "application/vnd.etsi.asic-e+zip";
const ODT: &str = "application/vnd.oasis.opendocument.text";
const ODS: &str = "application/vnd.oasis.opendocument.spreadsheet";
const ODP: &str = "application/vnd.oasis.opendocument.presentation";
const ODG: &str = "application/vnd.oasis.opendocument.graphics";

/// Media types relevant to signature containers.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MimeType {
    AsicS,
    AsicE,
    OpenDocumentText,
    OpenDocumentSpreadsheet,
    OpenDocumentPresentation,
    OpenDocumentGraphics,
    Other(String),
}

impl MimeType {
    /// Parses a media type string. Parameters after `;` and surrounding
    /// whitespace are ignored.
    pub fn from_mime_type_str(value: &str) -> MimeType {
        let value = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match value.as_str() {
            ASICS => MimeType::AsicS,
            ASICE => MimeType::AsicE,
            ODT => MimeType::OpenDocumentText,
            ODS => MimeType::OpenDocumentSpreadsheet,
            ODP => MimeType::OpenDocumentPresentation,
            ODG => MimeType::OpenDocumentGraphics,
            _ => MimeType::Other(value),
        }
    }

    /// Guesses a container media type from a file name extension.
    pub fn from_file_name(name: &str) -> Option<MimeType> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "asics" | "scs" => Some(MimeType::AsicS),
            "asice" | "sce" | "bdoc" => Some(MimeType::AsicE),
            "odt" => Some(MimeType::OpenDocumentText),
            "ods" => Some(MimeType::OpenDocumentSpreadsheet),
            "odp" => Some(MimeType::OpenDocumentPresentation),
            "odg" => Some(MimeType::OpenDocumentGraphics),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MimeType::AsicS => ASICS,
            MimeType::AsicE => ASICE,
            MimeType::OpenDocumentText => ODT,
            MimeType::OpenDocumentSpreadsheet => ODS,
            MimeType::OpenDocumentPresentation => ODP,
            MimeType::OpenDocumentGraphics => ODG,
            MimeType::Other(s) => s,
        }
    }

    /// Returns `true` for the OpenDocument media types.
    pub fn is_open_document(&self) -> bool {
        matches!(
            self,
            MimeType::OpenDocumentText
                | MimeType::OpenDocumentSpreadsheet
                | MimeType::OpenDocumentPresentation
                | MimeType::OpenDocumentGraphics
        )
    }

    /// Returns the container type implied by this media type, if any.
    ///
    /// OpenDocument packages follow the ASiC-E layout.
    pub fn container_type(&self) -> Option<ContainerType> {
        match self {
            MimeType::AsicS => Some(ContainerType::AsicS),
            MimeType::AsicE => Some(ContainerType::AsicE),
            m if m.is_open_document() => Some(ContainerType::AsicE),
            _ => None,
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MimeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_container_media_types() {
        assert_eq!(
            MimeType::from_mime_type_str("application/vnd.etsi.asic-e+zip"),
            MimeType::AsicE
        );
        assert_eq!(
            MimeType::from_mime_type_str(" Application/Vnd.Etsi.Asic-S+Zip ;charset=utf-8"),
            MimeType::AsicS
        );
        assert_eq!(
            MimeType::from_mime_type_str("application/x-custom"),
            MimeType::Other("application/x-custom".to_string())
        );
    }

    #[test]
    fn container_type_from_media_type() {
        assert_eq!(MimeType::AsicS.container_type(), Some(ContainerType::AsicS));
        assert_eq!(
            MimeType::OpenDocumentSpreadsheet.container_type(),
            Some(ContainerType::AsicE)
        );
        assert_eq!(
            MimeType::from_mime_type_str("application/zip").container_type(),
            None
        );
    }

    #[test]
    fn guesses_from_extension() {
        assert_eq!(MimeType::from_file_name("hello.ASiCE"), Some(MimeType::AsicE));
        assert_eq!(
            MimeType::from_file_name("doc.odt"),
            Some(MimeType::OpenDocumentText)
        );
        assert_eq!(MimeType::from_file_name("noext"), None);
        assert_eq!(MimeType::from_file_name("archive.zip"), None);
    }
}
