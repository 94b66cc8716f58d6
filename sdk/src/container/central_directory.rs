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

//! Raw reads of the ZIP end of central directory record and central
//! directory headers.
//!
//! These work directly on the container bytes so that they still give an
//! answer for archives the `zip` crate refuses or normalizes (spoofed comment
//! lengths, duplicated entry names).

use std::collections::HashMap;

use log::warn;

const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];
const CDH_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];
const EOCD_MIN_LEN: usize = 22;
const CDH_MIN_LEN: usize = 46;
const MAX_COMMENT_LEN: usize = u16::MAX as usize;

fn read_u16(bytes: &[u8], pos: usize) -> Option<u16> {
    let b = bytes.get(pos..pos + 2)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(bytes: &[u8], pos: usize) -> Option<u32> {
    let b = bytes.get(pos..pos + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Returns the offset of the last end of central directory record.
pub(crate) fn find_eocd(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < EOCD_MIN_LEN {
        return None;
    }
    let last = bytes.len() - EOCD_MIN_LEN;
    let first = last.saturating_sub(MAX_COMMENT_LEN);
    (first..=last)
        .rev()
        .find(|&pos| bytes[pos..pos + 4] == EOCD_SIGNATURE)
}

/// Returns the raw archive comment, or `None` if there is none.
///
/// When the declared comment length disagrees with the bytes actually
/// remaining after the record, the remaining bytes win.
pub(crate) fn zip_comment(bytes: &[u8]) -> Option<Vec<u8>> {
    let eocd = find_eocd(bytes)?;
    let declared = read_u16(bytes, eocd + 20)? as usize;
    let start = eocd + EOCD_MIN_LEN;
    let real = bytes.len() - start;
    if declared != real {
        warn!("Zip comment length mismatch: declared {declared}, found {real}");
    }
    if real == 0 {
        return None;
    }
    Some(bytes[start..].to_vec())
}

/// Lists entry names in central directory order.
///
/// Unreadable or ZIP64 directories yield an empty list.
pub(crate) fn entry_names(bytes: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let Some(eocd) = find_eocd(bytes) else {
        return names;
    };
    let (Some(count), Some(offset)) = (read_u16(bytes, eocd + 10), read_u32(bytes, eocd + 16))
    else {
        return names;
    };
    if offset == u32::MAX {
        return names;
    }

    let mut pos = offset as usize;
    for _ in 0..count {
        if bytes.get(pos..pos + 4) != Some(&CDH_SIGNATURE[..]) {
            break;
        }
        let (Some(name_len), Some(extra_len), Some(comment_len)) = (
            read_u16(bytes, pos + 28),
            read_u16(bytes, pos + 30),
            read_u16(bytes, pos + 32),
        ) else {
            break;
        };
        let name_start = pos + CDH_MIN_LEN;
        let Some(name) = bytes.get(name_start..name_start + name_len as usize) else {
            break;
        };
        names.push(String::from_utf8_lossy(name).into_owned());
        pos = name_start + name_len as usize + extra_len as usize + comment_len as usize;
    }
    names
}

/// Returns every name that occurs more than once, in first-seen order.
pub(crate) fn duplicate_names(names: &[String]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name.as_str()).or_default() += 1;
    }
    let mut duplicates: Vec<String> = Vec::new();
    for name in names {
        if counts.get(name.as_str()).copied().unwrap_or_default() > 1
            && !duplicates.contains(name)
        {
            duplicates.push(name.clone());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::{Cursor, Write};

    use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

    use super::*;

    fn archive(names: &[&str], comment: Option<&str>) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for name in names {
            zip.start_file(*name, options).unwrap();
            zip.write_all(b"content").unwrap();
        }
        if let Some(comment) = comment {
            zip.set_comment(comment);
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn reads_comment() {
        let bytes = archive(&["a.txt"], Some("mimetype=application/vnd.etsi.asic-s+zip"));
        assert_eq!(
            zip_comment(&bytes).unwrap(),
            b"mimetype=application/vnd.etsi.asic-s+zip".to_vec()
        );
        assert!(zip_comment(&archive(&["a.txt"], None)).is_none());
    }

    #[test]
    fn tolerates_spoofed_comment_length() {
        let mut bytes = archive(&["a.txt"], Some("abc"));
        let eocd = find_eocd(&bytes).unwrap();
        bytes[eocd + 20] = 200;
        assert_eq!(zip_comment(&bytes).unwrap(), b"abc".to_vec());

        bytes.truncate(bytes.len() - 3);
        assert!(zip_comment(&bytes).is_none());
    }

    #[test]
    fn lists_names_in_order() {
        let bytes = archive(&["mimetype", "META-INF/manifest.xml", "hello.txt"], None);
        assert_eq!(
            entry_names(&bytes),
            vec!["mimetype", "META-INF/manifest.xml", "hello.txt"]
        );
        assert!(entry_names(b"not a zip").is_empty());
    }

    #[test]
    fn finds_duplicates() {
        let names: Vec<String> = ["a", "b", "a", "c", "a", "b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(duplicate_names(&names), vec!["a", "b"]);
        assert!(duplicate_names(&names[..2]).is_empty());
    }
}
