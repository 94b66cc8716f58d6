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

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use asic_container::{ContainerWriter, MimeType};
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Layout {
    Asics,
    Asice,
}

impl From<Layout> for MimeType {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Asics => MimeType::AsicS,
            Layout::Asice => MimeType::AsicE,
        }
    }
}

#[derive(Debug, Parser)]
pub struct Pack {
    /// Entries to add, as NAME=PATH or PATH (stored under its file name).
    #[clap(required = true, value_parser = parse_entry)]
    pub entries: Vec<(String, PathBuf)>,

    /// Path to output file.
    #[clap(short, long)]
    pub output: PathBuf,

    /// Container layout.
    #[clap(long = "type", value_enum, default_value = "asice")]
    pub layout: Layout,

    /// Media type written to the mimetype entry, overriding --type.
    #[clap(long)]
    pub mime_type: Option<String>,

    /// Add a mimetype=<type> archive comment.
    #[clap(long)]
    pub zip_comment: bool,

    /// Overwrite the output file if it exists.
    #[clap(short, long)]
    pub force: bool,
}

fn parse_entry(s: &str) -> Result<(String, PathBuf)> {
    match s.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        Some(_) => bail!("Entry must be NAME=PATH"),
        None => {
            let path = PathBuf::from(s);
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .context("Entry path has no file name")?
                .to_string();
            Ok((name, path))
        }
    }
}

impl Pack {
    pub fn execute(&self) -> Result<()> {
        if self.output.exists() && !self.force {
            bail!("Output already exists; use --force to overwrite");
        }

        let mime_type = match &self.mime_type {
            Some(m) => MimeType::from_mime_type_str(m),
            None => self.layout.into(),
        };
        let mut writer = ContainerWriter::new(mime_type).with_zip_comment(self.zip_comment);
        for (name, path) in &self.entries {
            let data =
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            writer = writer.add(name.clone(), data);
        }

        fs::write(&self.output, writer.finish()?)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;
        println!("Wrote {}", self.output.display());
        Ok(())
    }
}
