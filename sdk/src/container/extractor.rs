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

use std::io::{Cursor, Read};

use log::{debug, warn};
use zip::{CompressionMethod, ZipArchive};

use crate::{
    container::central_directory,
    error::{Error, Result, ZipBombGuard},
    settings::ExtractSettings,
};

const CHUNK_SIZE: usize = 8 * 1024;

/// A single file materialized from a container.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContainerEntry {
    pub name: String,
    pub data: Vec<u8>,
    /// Uncompressed size recorded in the archive.
    pub declared_size: u64,
    pub compressed_size: u64,
    /// Position of the entry in the archive.
    pub index: usize,
    pub stored: bool,
    pub comment: Option<String>,
}

impl ContainerEntry {
    /// Number of bytes actually produced by decompression.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Everything read from a container by [`SecureContainerExtractor`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExtractedContainer {
    /// File entries in archive order. Directory entries are not included.
    pub entries: Vec<ContainerEntry>,
    pub zip_comment: Option<String>,
    /// Set when the archive comment was not valid UTF-8 and had to be decoded
    /// lossily.
    pub zip_comment_lossy: bool,
    /// Entry names that occur more than once in the central directory.
    pub duplicate_names: Vec<String>,
    /// Number of entries that could not be read and were skipped.
    pub malformed_entries: usize,
    pub container_size: u64,
    pub extracted_size: u64,
}

impl ExtractedContainer {
    pub fn entry(&self, name: &str) -> Option<&ContainerEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

// Running totals for one extraction.
struct ByteBudget<'a> {
    limits: &'a ExtractSettings,
    container_size: u64,
    total: u64,
}

impl<'a> ByteBudget<'a> {
    fn new(limits: &'a ExtractSettings, container_size: u64) -> Self {
        ByteBudget {
            limits,
            container_size,
            total: 0,
        }
    }

    fn exceeds_ratio(&self, produced: u64, compressed: u64) -> bool {
        let Some(ratio) = self.limits.max_compression_ratio else {
            return false;
        };
        let allowed = u128::from(compressed).saturating_mul(u128::from(ratio));
        produced > self.limits.threshold && u128::from(produced) > allowed
    }

    fn check(&self, total: u64, entry_bytes: u64, entry_compressed: u64) -> Result<()> {
        if let Some(max) = self.limits.max_extracted_size {
            if total > max {
                return Err(Error::ZipBomb {
                    guard: ZipBombGuard::ExtractedSize,
                });
            }
        }
        if self.exceeds_ratio(total, self.container_size)
            || self.exceeds_ratio(entry_bytes, entry_compressed)
        {
            return Err(Error::ZipBomb {
                guard: ZipBombGuard::CompressionRatio,
            });
        }
        Ok(())
    }

    // Decompresses one entry in chunks, stopping as soon as a guard trips.
    fn copy<R: Read>(&mut self, reader: &mut R, compressed: u64) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut buf = [0_u8; CHUNK_SIZE];
        let mut entry_bytes = 0_u64;
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            entry_bytes = entry_bytes.saturating_add(n as u64);
            let total = self.total.saturating_add(n as u64);
            self.check(total, entry_bytes, compressed)?;
            self.total = total;
            out.extend_from_slice(&buf[..n]);
        }
        Ok(out)
    }
}

fn check_entry_count(limits: &ExtractSettings, count: usize) -> Result<()> {
    match limits.max_entries {
        Some(max) if count > max => Err(Error::ZipBomb {
            guard: ZipBombGuard::EntryCount,
        }),
        _ => Ok(()),
    }
}

/// Reads ZIP-based containers while defending against decompression bombs and
/// oversized entry lists.
///
/// The extractor owns its limits; each instance can be configured
/// independently and used from any thread.
#[derive(Clone, Debug, Default)]
pub struct SecureContainerExtractor {
    limits: ExtractSettings,
}

impl SecureContainerExtractor {
    pub fn new(limits: ExtractSettings) -> Self {
        SecureContainerExtractor { limits }
    }

    pub fn limits(&self) -> &ExtractSettings {
        &self.limits
    }

    /// Extracts every file entry of `bytes`.
    ///
    /// Nothing is written to disk. The same bytes and limits always give the
    /// same result.
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractedContainer> {
        let container_size = bytes.len() as u64;

        let mut extracted = match ZipArchive::new(Cursor::new(bytes)) {
            Ok(mut archive) => self.extract_indexed(&mut archive, container_size)?,
            Err(e) => {
                debug!("central directory unreadable ({e}), reading local headers");
                self.extract_streamed(bytes, container_size)?
            }
        };

        // the raw directory is gone when extraction fell back to local headers
        let mut duplicates =
            central_directory::duplicate_names(&central_directory::entry_names(bytes));
        let extracted_names: Vec<String> = extracted.names().map(String::from).collect();
        for name in central_directory::duplicate_names(&extracted_names) {
            if !duplicates.contains(&name) {
                duplicates.push(name);
            }
        }
        extracted.duplicate_names = duplicates;
        for name in &extracted.duplicate_names {
            warn!("Duplicate entry name in container: {name}");
        }

        if let Some(raw) = central_directory::zip_comment(bytes) {
            match String::from_utf8(raw) {
                Ok(comment) => extracted.zip_comment = Some(comment),
                Err(e) => {
                    warn!("Zip comment is not valid UTF-8");
                    extracted.zip_comment =
                        Some(String::from_utf8_lossy(e.as_bytes()).into_owned());
                    extracted.zip_comment_lossy = true;
                }
            }
        }

        Ok(extracted)
    }

    fn extract_indexed(
        &self,
        archive: &mut ZipArchive<Cursor<&[u8]>>,
        container_size: u64,
    ) -> Result<ExtractedContainer> {
        check_entry_count(&self.limits, archive.len())?;

        // declared sizes are checked before anything is inflated
        let declared = ByteBudget::new(&self.limits, container_size);
        let mut declared_total = 0_u64;
        for index in 0..archive.len() {
            if let Ok(file) = archive.by_index_raw(index) {
                declared_total = declared_total.saturating_add(file.size());
                declared.check(declared_total, file.size(), file.compressed_size())?;
            }
        }

        let mut budget = ByteBudget::new(&self.limits, container_size);
        let mut extracted = ExtractedContainer {
            container_size,
            ..Default::default()
        };

        for index in 0..archive.len() {
            let mut file = match archive.by_index(index) {
                Ok(file) => file,
                Err(e) => {
                    self.skip_malformed(&mut extracted, index, &e.to_string())?;
                    continue;
                }
            };
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let compressed_size = file.compressed_size();
            let declared_size = file.size();
            let stored = file.compression() == CompressionMethod::Stored;
            let comment = if self.limits.extract_comments && !file.comment().is_empty() {
                Some(file.comment().to_string())
            } else {
                None
            };

            let data = match budget.copy(&mut file, compressed_size) {
                Ok(data) => data,
                Err(Error::IoError(e)) => {
                    self.skip_malformed(&mut extracted, index, &e.to_string())?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            debug!("extracted {name}: {} bytes", data.len());

            extracted.entries.push(ContainerEntry {
                name,
                data,
                declared_size,
                compressed_size,
                index,
                stored,
                comment,
            });
        }

        extracted.extracted_size = budget.total;
        Ok(extracted)
    }

    fn extract_streamed(&self, bytes: &[u8], container_size: u64) -> Result<ExtractedContainer> {
        let mut cursor = Cursor::new(bytes);
        let mut budget = ByteBudget::new(&self.limits, container_size);
        let mut extracted = ExtractedContainer {
            container_size,
            ..Default::default()
        };

        let mut index = 0_usize;
        loop {
            let mut file = match zip::read::read_zipfile_from_stream(&mut cursor) {
                Ok(Some(file)) => file,
                Ok(None) => break,
                Err(e) => {
                    // the stream cannot be resynchronized after a bad header
                    warn!("Unable to read local header {index}: {e}");
                    extracted.malformed_entries += 1;
                    break;
                }
            };
            index += 1;
            check_entry_count(&self.limits, index)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let compressed_size = file.compressed_size();
            let declared_size = file.size();
            let stored = file.compression() == CompressionMethod::Stored;

            let data = match budget.copy(&mut file, compressed_size) {
                Ok(data) => data,
                Err(Error::IoError(e)) => {
                    warn!("Unable to read entry {name}: {e}");
                    extracted.malformed_entries += 1;
                    break;
                }
                Err(e) => return Err(e),
            };

            extracted.entries.push(ContainerEntry {
                name,
                data,
                declared_size,
                compressed_size,
                index: index - 1,
                stored,
                comment: None,
            });
        }

        if extracted.entries.is_empty() {
            return Err(Error::UnreadableArchive {
                reason: "no readable entry".into(),
            });
        }

        extracted.extracted_size = budget.total;
        Ok(extracted)
    }

    fn skip_malformed(
        &self,
        extracted: &mut ExtractedContainer,
        index: usize,
        reason: &str,
    ) -> Result<()> {
        extracted.malformed_entries += 1;
        warn!("Skipping malformed entry {index}: {reason}");
        if extracted.malformed_entries > self.limits.max_malformed_entries {
            return Err(Error::MalformedEntries {
                tries: extracted.malformed_entries,
            });
        }
        Ok(())
    }
}
