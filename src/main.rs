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

use clap::{Parser, Subcommand};
use kubepkg::commands::config::ConfigCommand;
use kubepkg::commands::fetch::FetchVersionCommand;
use kubepkg::commands::resolve::ResolveCommand;
use kubepkg::config::new_kubepkg_config;
use kubepkg::error::{KubepkgError, Result, format_error, get_exit_code};
use kubepkg::logging;
use kubepkg::models::package::{ChannelType, PackageDefinition};
use kubepkg::models::platform::Architecture;
use std::io::IsTerminal;

#[derive(Parser)]
#[command(name = "kubepkg")]
#[command(author, version, about = "Resolve versions and download links for Kubernetes packages", long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the version, dependencies and download link of a package
    #[command(visible_alias = "r")]
    Resolve {
        /// Package name (kubelet, kubectl, kubeadm, kubernetes-cni, cri-tools)
        name: String,

        /// Explicit package version
        #[arg(long = "version", value_name = "VERSION")]
        package_version: Option<String>,

        /// Target Kubernetes version (looked up from the channel when omitted)
        #[arg(long, value_name = "VERSION")]
        kube_version: Option<String>,

        /// Release channel: release, testing or nightly
        #[arg(long, default_value = "release")]
        channel: ChannelType,

        /// Target architecture
        #[arg(long, default_value = "amd64")]
        arch: Architecture,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the version a channel index currently points at
    FetchVersion {
        /// Release channel: release, testing or nightly
        #[arg(long, default_value = "release")]
        channel: ChannelType,

        /// Restrict to a minor line (e.g., "1.14")
        #[arg(long)]
        minor: Option<String>,
    },

    /// Show or initialise the kubepkg configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write config.toml with the default endpoints
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn report(error: &KubepkgError) -> ! {
    eprint!(
        "{}",
        format_error(error, std::io::stderr().is_terminal())
    );
    std::process::exit(get_exit_code(error));
}

fn main() {
    let cli = Cli::parse();

    logging::setup_logger(cli.verbose);

    // Load configuration once at startup
    let config = match new_kubepkg_config() {
        Ok(config) => config,
        Err(e) => report(&e),
    };

    let result: Result<()> = (|| match cli.command {
        Commands::Resolve {
            name,
            package_version,
            kube_version,
            channel,
            arch,
            json,
        } => {
            let mut def = PackageDefinition::new(name).with_channel(channel);
            def.version = package_version;
            def.kubernetes_version = kube_version;

            let command = ResolveCommand::new(&config)?;
            command.execute(&def, arch, json)
        }
        Commands::FetchVersion { channel, minor } => {
            let command = FetchVersionCommand::new(&config)?;
            command.execute(channel, minor.as_deref())
        }
        Commands::Config { action } => {
            let command = ConfigCommand::new(&config)?;
            match action {
                ConfigAction::Show => command.show(),
                ConfigAction::Init { force } => command.init(force),
            }
        }
    })();

    if let Err(e) = result {
        report(&e);
    }
}
