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

#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]

//! This library opens ASiC-S, ASiC-E and OpenDocument signature containers,
//! extracts their entries behind zip-bomb guards, and works out which
//! signatures, timestamps and evidence records cover which documents.
//!
//! Signature cryptography is out of scope: the result is a description of the
//! container and a format verdict for each token.
//!
//! # Example: Validating a container
//!
//! ```
//! # use asic_container::Result;
//! use asic_container::{ContainerValidator, ContainerWriter, Document, MimeType};
//!
//! # fn main() -> Result<()> {
//! let manifest = r#"<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0">
//!     <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.etsi.asic-e+zip"/>
//!     <manifest:file-entry manifest:full-path="hello.txt" manifest:media-type="text/plain"/>
//! </manifest:manifest>"#;
//!
//! let bytes = ContainerWriter::new(MimeType::AsicE)
//!     .add("hello.txt", b"Hello world".to_vec())
//!     .add("META-INF/manifest.xml", manifest.as_bytes().to_vec())
//!     .add("META-INF/signatures-1.xml", b"<XAdESSignatures/>".to_vec())
//!     .finish()?;
//!
//! let report = ContainerValidator::default().validate(&Document::new(bytes))?;
//! let manifest = report.container.manifest_for("META-INF/signatures-1.xml").unwrap();
//! assert_eq!(manifest.filename, "META-INF/manifest.xml");
//! assert_eq!(manifest.entry_names(), vec!["hello.txt"]);
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Tightening the extraction limits
//!
//! ```
//! use asic_container::{settings::Settings, ContainerValidator};
//!
//! # fn main() -> asic_container::Result<()> {
//! let settings = Settings::new().with_toml(
//!     r#"
//!         [extract]
//!         max_entries = 50
//!         max_compression_ratio = 20
//!     "#,
//! )?;
//! let validator = ContainerValidator::new(settings);
//! assert_eq!(validator.settings().extract.max_entries, Some(50));
//! # Ok(())
//! # }
//! ```

pub mod checks;
pub mod container;
pub use container::{ContainerType, ContainerWriter};

mod container_info;
pub use container_info::ContainerInfo;

mod document;
pub use document::Document;

mod error;
pub use error::{Error, Result, ZipBombGuard};

pub mod manifest;

mod mime_type;
pub use mime_type::MimeType;

mod report;
pub use report::{TokenReport, ValidationReport};

pub mod resolver;
pub mod settings;
pub mod status_tracker;
pub mod validation_status;

mod validator;
pub use validator::ContainerValidator;

pub const NAME: &str = "asic-container";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
