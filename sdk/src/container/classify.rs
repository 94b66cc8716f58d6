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

//! Classification of container entries by name.

use serde::Serialize;

pub const META_INF: &str = "META-INF/";
pub const MIMETYPE: &str = "mimetype";
pub const ODF_MANIFEST: &str = "META-INF/manifest.xml";
pub const ODF_SIGNATURE: &str = "META-INF/documentsignatures.xml";
pub const PACKAGE_ZIP: &str = "package.zip";
pub const ASIC_MANIFEST: &str = "ASiCManifest";
pub const ASIC_ARCHIVE_MANIFEST: &str = "ASiCArchiveManifest";
pub const ASIC_EVIDENCE_RECORD_MANIFEST: &str = "ASiCEvidenceRecordManifest";
/// Name required for the most recent archive manifest.
pub const LAST_ARCHIVE_MANIFEST: &str = "META-INF/ASiCArchiveManifest.xml";

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum SignatureFormat {
    XAdES,
    CAdES,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ManifestKind {
    /// `META-INF/manifest.xml`, shared by XAdES signatures and OpenDocument.
    OpenDocument,
    /// `ASiCManifest*.xml`, bound to a CAdES signature or a content timestamp.
    Asic,
    /// `ASiCArchiveManifest*.xml`, bound to an archive timestamp.
    Archive,
    /// `ASiCEvidenceRecordManifest*.xml`, bound to an evidence record.
    EvidenceRecord,
}

/// What a container entry is, judged from its name.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    Mimetype,
    Signature(SignatureFormat),
    Timestamp,
    EvidenceRecord,
    Manifest(ManifestKind),
    SignedContent,
    /// `package.zip` carried as the single document of an ASiC-S container.
    NestedContainer,
    Other,
}

impl EntryKind {
    pub fn classify(name: &str) -> EntryKind {
        if name == MIMETYPE {
            return EntryKind::Mimetype;
        }
        if !name.starts_with(META_INF) {
            if name.ends_with('/') {
                return EntryKind::Other;
            }
            return EntryKind::SignedContent;
        }
        if let Some(format) = signature_format(name) {
            return EntryKind::Signature(format);
        }
        if is_timestamp(name) {
            return EntryKind::Timestamp;
        }
        if is_evidence_record(name) {
            return EntryKind::EvidenceRecord;
        }
        match manifest_kind(name) {
            Some(kind) => EntryKind::Manifest(kind),
            None => EntryKind::Other,
        }
    }

    pub fn is_signature(&self) -> bool {
        matches!(self, EntryKind::Signature(_))
    }

    /// Returns `true` for the entries a signature, timestamp or evidence
    /// record is applied to.
    pub fn is_token(&self) -> bool {
        matches!(
            self,
            EntryKind::Signature(_) | EntryKind::Timestamp | EntryKind::EvidenceRecord
        )
    }
}

fn signature_format(name: &str) -> Option<SignatureFormat> {
    if !(name.contains("signature") && !name.contains("Manifest")) {
        return None;
    }
    if name.ends_with(".xml") {
        Some(SignatureFormat::XAdES)
    } else if name.ends_with(".p7s") {
        Some(SignatureFormat::CAdES)
    } else {
        None
    }
}

fn is_timestamp(name: &str) -> bool {
    name.contains("timestamp") && name.ends_with(".tst")
}

fn is_evidence_record(name: &str) -> bool {
    name.contains("evidencerecord") && (name.ends_with(".xml") || name.ends_with(".ers"))
}

fn manifest_kind(name: &str) -> Option<ManifestKind> {
    if name == ODF_MANIFEST {
        return Some(ManifestKind::OpenDocument);
    }
    if !name.ends_with(".xml") {
        return None;
    }
    if name.contains(ASIC_ARCHIVE_MANIFEST) {
        Some(ManifestKind::Archive)
    } else if name.contains(ASIC_EVIDENCE_RECORD_MANIFEST) {
        Some(ManifestKind::EvidenceRecord)
    } else if name.contains(ASIC_MANIFEST) {
        Some(ManifestKind::Asic)
    } else {
        None
    }
}

/// Returns `true` for documents placed at the container root.
pub fn is_root_document(name: &str) -> bool {
    !name.contains('/') && name != MIMETYPE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_signatures() {
        assert_eq!(
            EntryKind::classify("META-INF/signatures001.xml"),
            EntryKind::Signature(SignatureFormat::XAdES)
        );
        assert_eq!(
            EntryKind::classify("META-INF/signature.p7s"),
            EntryKind::Signature(SignatureFormat::CAdES)
        );
        assert_eq!(
            EntryKind::classify(ODF_SIGNATURE),
            EntryKind::Signature(SignatureFormat::XAdES)
        );
        // signatures live in META-INF only
        assert_eq!(EntryKind::classify("signatures.xml"), EntryKind::SignedContent);
        assert_eq!(EntryKind::classify("META-INF/signature.txt"), EntryKind::Other);
    }

    #[test]
    fn classifies_manifests() {
        assert_eq!(
            EntryKind::classify("META-INF/manifest.xml"),
            EntryKind::Manifest(ManifestKind::OpenDocument)
        );
        assert_eq!(
            EntryKind::classify("META-INF/ASiCManifest001.xml"),
            EntryKind::Manifest(ManifestKind::Asic)
        );
        assert_eq!(
            EntryKind::classify("META-INF/ASiCArchiveManifest.xml"),
            EntryKind::Manifest(ManifestKind::Archive)
        );
        assert_eq!(
            EntryKind::classify("META-INF/ASiCEvidenceRecordManifest1.xml"),
            EntryKind::Manifest(ManifestKind::EvidenceRecord)
        );
        // "Manifest" in the name keeps it from being taken for a signature
        assert_eq!(
            EntryKind::classify("META-INF/signatureManifest.xml"),
            EntryKind::Other
        );
    }

    #[test]
    fn classifies_timestamps_and_records() {
        assert_eq!(EntryKind::classify("META-INF/timestamp.tst"), EntryKind::Timestamp);
        assert_eq!(EntryKind::classify("META-INF/timestamp.xml"), EntryKind::Other);
        assert_eq!(
            EntryKind::classify("META-INF/evidencerecord.ers"),
            EntryKind::EvidenceRecord
        );
        assert_eq!(
            EntryKind::classify("META-INF/evidencerecord.xml"),
            EntryKind::EvidenceRecord
        );
    }

    #[test]
    fn classifies_content() {
        assert_eq!(EntryKind::classify("mimetype"), EntryKind::Mimetype);
        assert_eq!(EntryKind::classify("hello.txt"), EntryKind::SignedContent);
        assert_eq!(EntryKind::classify("dir/a.txt"), EntryKind::SignedContent);
        assert_eq!(EntryKind::classify("dir/"), EntryKind::Other);
        assert_eq!(EntryKind::classify("META-INF/container.xml"), EntryKind::Other);

        assert!(is_root_document("hello.txt"));
        assert!(!is_root_document("dir/a.txt"));
        assert!(!is_root_document("mimetype"));
    }
}
