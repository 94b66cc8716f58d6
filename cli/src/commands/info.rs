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

use anyhow::Result;
use clap::Parser;

use crate::commands::{explain, load_document, Limits};

#[derive(Debug, Parser)]
pub struct Info {
    /// Input path to container.
    pub path: PathBuf,

    #[clap(flatten)]
    pub limits: Limits,
}

impl Info {
    pub fn execute(&self) -> Result<()> {
        let document = load_document(&self.path)?;
        let info = self
            .limits
            .validator()?
            .container_info(&document)
            .map_err(explain)?;
        println!("{}", serde_json::to_string_pretty(&info)?);
        Ok(())
    }
}
