// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Brigade - real-time order sync for restaurant floors.
//!
//! This is the binary entry point for the Brigade hub.

use clap::{Parser, Subcommand};

mod serve;

/// Brigade - real-time order sync for restaurant floors.
#[derive(Parser, Debug)]
#[command(name = "brigade", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Brigade hub server.
    Serve,
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match brigade_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            brigade_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("brigade serve: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("brigade config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("brigade: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config = brigade_config::load_and_validate()
            .expect("default config should be valid");
        assert_eq!(config.service.name, "brigade");
    }
}
