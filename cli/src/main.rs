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

//! Tool for inspecting, validating and packing signature containers.

use anyhow::Result;
use clap::Parser;
use commands::{CliArgs, Commands};
use env_logger::Env;

mod commands;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // RUST_LOG takes precedence over -v
    let level = match args.verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match args.command {
        Commands::Info(info) => info.execute(),
        Commands::Validate(validate) => validate.execute(),
        Commands::Pack(pack) => pack.execute(),
    }
}
