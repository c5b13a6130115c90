// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{Args, Parser, Subcommand};
use mmfetch::commands::install::InstallCommand;
use mmfetch::commands::probe::ProbeCommand;
use mmfetch::commands::releases::ReleasesCommand;
use mmfetch::config::new_mm_config;
use mmfetch::error::{Result, format_error_chain, get_exit_code};
use mmfetch::logging;
use mmfetch::platform::TargetPlatform;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mmfetch")]
#[command(
    author,
    version,
    about = "Install Micro-Manager device adapter libraries",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    install: InstallArgs,
}

/// Install the adapter libraries (default when no subcommand is given)
#[derive(Args)]
struct InstallArgs {
    /// Directory to install the libraries into
    #[arg(value_name = "DEST")]
    destination: Option<PathBuf>,

    /// Release to install: a date such as 20240501, or "latest"
    #[arg(short, long, value_name = "TOKEN", default_value = "latest")]
    release: String,

    /// Disable progress indicators
    #[arg(long)]
    no_progress: bool,

    /// Skip reading the device interface version after installing
    #[arg(long)]
    no_probe: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List releases available for download
    #[command(visible_alias = "ls")]
    Releases {
        /// Platform whose releases to list (defaults to this host)
        #[arg(long, value_parser = parse_platform)]
        platform: Option<TargetPlatform>,

        /// Show at most this many releases
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the device interface version of installed libraries
    Probe {
        /// Directory holding the adapter libraries
        directory: PathBuf,
    },
}

fn parse_platform(value: &str) -> std::result::Result<TargetPlatform, String> {
    value.parse().map_err(|e: mmfetch::error::MmError| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    logging::setup_logger(cli.verbose);

    let result: Result<()> = (|| {
        let config = new_mm_config()?;

        match cli.command {
            Some(Commands::Releases {
                platform,
                limit,
                json,
            }) => {
                let command = ReleasesCommand::new(&config)?;
                command.execute(platform, limit, json)
            }
            Some(Commands::Probe { directory }) => {
                let command = ProbeCommand::new()?;
                command.execute(&directory)
            }
            None => {
                let args = cli.install;
                let command = InstallCommand::new(&config)?;
                command.execute(
                    args.destination.as_deref(),
                    &args.release,
                    args.no_progress,
                    args.no_probe,
                )
            }
        }
    })();

    if let Err(e) = result {
        eprintln!("{}", format_error_chain(&e));
        std::process::exit(get_exit_code(&e));
    }
}
