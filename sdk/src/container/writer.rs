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

use std::io::{Cursor, Write};

use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{container::classify::MIMETYPE, error::Result, mime_type::MimeType, Error};

/// Assembles a container with the layout readers expect: `mimetype` first and
/// stored, every other entry deflated.
///
/// ```
/// # use asic_container::{container::ContainerWriter, MimeType};
/// # fn main() -> asic_container::Result<()> {
/// let bytes = ContainerWriter::new(MimeType::AsicS)
///     .with_zip_comment(true)
///     .add("hello.txt", b"Hello world".to_vec())
///     .finish()?;
/// assert!(bytes.starts_with(b"PK\x03\x04"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ContainerWriter {
    mime_type: Option<MimeType>,
    zip_comment: bool,
    entries: Vec<(String, Vec<u8>)>,
}

impl ContainerWriter {
    pub fn new(mime_type: MimeType) -> Self {
        ContainerWriter {
            mime_type: Some(mime_type),
            zip_comment: false,
            entries: Vec::new(),
        }
    }

    /// A writer that emits no `mimetype` entry.
    pub fn without_mimetype() -> Self {
        ContainerWriter {
            mime_type: None,
            zip_comment: false,
            entries: Vec::new(),
        }
    }

    /// Adds a `mimetype=<type>` archive comment.
    #[must_use]
    pub fn with_zip_comment(mut self, enabled: bool) -> Self {
        self.zip_comment = enabled;
        self
    }

    #[must_use]
    pub fn add<S: Into<String>>(mut self, name: S, data: Vec<u8>) -> Self {
        self.entries.push((name.into(), data));
        self
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        if let Some(mime_type) = &self.mime_type {
            zip.start_file(MIMETYPE, stored)?;
            zip.write_all(mime_type.as_str().as_bytes())?;
            if self.zip_comment {
                zip.set_comment(format!("mimetype={mime_type}"));
            }
        }

        for (name, data) in &self.entries {
            if name == MIMETYPE {
                return Err(Error::BadParam("mimetype is written by the container writer".into()));
            }
            zip.start_file(name.as_str(), deflated)?;
            zip.write_all(data)?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::container::SecureContainerExtractor;

    #[test]
    fn mimetype_is_first_and_stored() {
        let bytes = ContainerWriter::new(MimeType::AsicE)
            .with_zip_comment(true)
            .add("a.txt", b"aaaa".to_vec())
            .add("META-INF/manifest.xml", b"<manifest/>".to_vec())
            .finish()
            .unwrap();

        let extracted = SecureContainerExtractor::default().extract(&bytes).unwrap();
        let first = &extracted.entries[0];
        assert_eq!(first.name, "mimetype");
        assert!(first.stored);
        assert_eq!(first.data, b"application/vnd.etsi.asic-e+zip");
        assert!(!extracted.entry("a.txt").unwrap().stored);
        assert_eq!(
            extracted.zip_comment.as_deref(),
            Some("mimetype=application/vnd.etsi.asic-e+zip")
        );
    }

    #[test]
    fn rejects_explicit_mimetype() {
        let result = ContainerWriter::new(MimeType::AsicS)
            .add("mimetype", b"x".to_vec())
            .finish();
        assert!(matches!(result, Err(Error::BadParam(_))));
    }

    #[test]
    fn without_mimetype() {
        let bytes = ContainerWriter::without_mimetype()
            .add("a.txt", b"a".to_vec())
            .finish()
            .unwrap();
        let extracted = SecureContainerExtractor::default().extract(&bytes).unwrap();
        assert!(extracted.entry("mimetype").is_none());
    }
}
