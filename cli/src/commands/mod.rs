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

mod info;
mod pack;
mod validate;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use asic_container::{settings::Settings, ContainerValidator, Document, Error};
use clap::{ArgAction, Parser, Subcommand};

pub use self::{info::Info, pack::Pack, validate::Validate};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Use verbose output (-vv very verbose output).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Describe the layout of a container in .json format.
    Info(Info),
    /// Check a container and report a verdict for every signature.
    Validate(Validate),
    /// Build a container from files.
    Pack(Pack),
}

/// Options controlling how containers are opened.
#[derive(Debug, Default, Parser)]
pub struct Limits {
    /// Path to a settings file in .json or .toml format.
    #[clap(long, env = "ASICTOOL_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Maximum number of entries in a container.
    #[clap(long)]
    pub max_entries: Option<i64>,

    /// Maximum ratio between decompressed and compressed sizes.
    #[clap(long)]
    pub max_compression_ratio: Option<i64>,

    /// Maximum number of decompressed bytes.
    #[clap(long)]
    pub max_extracted_size: Option<i64>,
}

impl Limits {
    /// Builds settings from the settings file, then applies the overrides.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::new()
                .with_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::new(),
        };

        let overrides = [
            ("extract.max_entries", self.max_entries),
            ("extract.max_compression_ratio", self.max_compression_ratio),
            ("extract.max_extracted_size", self.max_extracted_size),
        ];
        for (path, value) in overrides {
            if let Some(value) = value {
                settings.set_value(path, value)?;
            }
        }
        Ok(settings)
    }

    pub fn validator(&self) -> Result<ContainerValidator> {
        Ok(ContainerValidator::new(self.settings()?))
    }
}

pub(crate) fn load_document(path: &Path) -> Result<Document> {
    if !path.is_file() {
        bail!("Input path must be a file");
    }
    Ok(Document::from_file(path)?)
}

// Maps library errors to messages meant for people.
pub(crate) fn explain(err: Error) -> anyhow::Error {
    match err {
        Error::FormatNotRecognized => anyhow!("Not a signature container"),
        e if e.is_zip_bomb() => anyhow!("{e}"),
        e if e.is_structural() => anyhow!("Unreadable container: {e}"),
        e => e.into(),
    }
}
