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

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use log::info;

use crate::commands::{explain, load_document, Limits};

#[derive(Debug, Parser)]
pub struct Validate {
    /// Input path to container.
    pub path: PathBuf,

    /// Exit with an error when any signature does not pass.
    #[clap(long)]
    pub strict: bool,

    #[clap(flatten)]
    pub limits: Limits,
}

impl Validate {
    pub fn execute(&self) -> Result<()> {
        let document = load_document(&self.path)?;
        let report = self
            .limits
            .validator()?
            .validate(&document)
            .map_err(explain)?;
        println!("{report}");

        if report.no_signature_found {
            info!("{}: no signature found", self.path.display());
        }
        if self.strict && !report.is_valid() {
            bail!("Container did not pass validation");
        }
        Ok(())
    }
}
