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

#[cfg(feature = "file_io")]
use std::path::Path;

use crate::mime_type::MimeType;
#[cfg(feature = "file_io")]
use crate::Result;

/// An in-memory document submitted for validation.
#[derive(Clone, Debug, Default)]
pub struct Document {
    name: Option<String>,
    bytes: Vec<u8>,
    mime_type: Option<MimeType>,
}

impl Document {
    pub fn new<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Document {
            bytes: bytes.into(),
            ..Default::default()
        }
    }

    /// Loads a document from disk, taking its name from the file name.
    #[cfg(feature = "file_io")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(Document {
            name,
            bytes,
            mime_type: None,
        })
    }

    #[must_use]
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets an explicit media type. It takes precedence over every hint found
    /// inside the container.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: MimeType) -> Self {
        self.mime_type = Some(mime_type);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the declared media type, if one was set.
    pub fn mime_type(&self) -> Option<&MimeType> {
        self.mime_type.as_ref()
    }

    /// Returns `true` if the content starts with a ZIP local file header or
    /// end of central directory record.
    pub fn looks_like_zip(&self) -> bool {
        self.bytes.starts_with(b"PK\x03\x04") || self.bytes.starts_with(b"PK\x05\x06")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn zip_sniffing() {
        assert!(Document::new(b"PK\x03\x04rest".to_vec()).looks_like_zip());
        assert!(!Document::new(b"<xml/>".to_vec()).looks_like_zip());
        assert!(!Document::default().looks_like_zip());
    }

    #[test]
    fn builder() {
        let doc = Document::new(vec![1, 2, 3])
            .with_name("a.asice")
            .with_mime_type(MimeType::AsicE);
        assert_eq!(doc.name(), Some("a.asice"));
        assert_eq!(doc.mime_type(), Some(&MimeType::AsicE));
        assert_eq!(doc.bytes(), &[1, 2, 3]);
    }

    #[cfg(feature = "file_io")]
    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("container.asics");
        std::fs::write(&path, b"PK\x05\x06").unwrap();

        let doc = Document::from_file(&path).unwrap();
        assert_eq!(doc.name(), Some("container.asics"));
        assert!(doc.mime_type().is_none());
        assert!(doc.looks_like_zip());
    }
}
