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

//! Reading and writing ZIP-based signature containers.

use std::fmt;

use serde::Serialize;

pub(crate) mod central_directory;
pub mod classify;
mod extractor;
mod writer;

pub use classify::{EntryKind, ManifestKind, SignatureFormat};
pub use extractor::{ContainerEntry, ExtractedContainer, SecureContainerExtractor};
pub use writer::ContainerWriter;

/// The two ASiC layouts.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum ContainerType {
    /// A single signed document, with signatures applying to it alone.
    #[serde(rename = "ASiC-S")]
    AsicS,
    /// Any number of signed documents, scoped by manifests.
    #[serde(rename = "ASiC-E")]
    AsicE,
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerType::AsicS => f.write_str("ASiC-S"),
            ContainerType::AsicE => f.write_str("ASiC-E"),
        }
    }
}
