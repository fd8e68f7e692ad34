use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "attbx")]
#[command(about = "AttestBridge - synchronous HTTP facade over instrumented app targets")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Log output format (pretty, json, compact)
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the bridge with the given configuration
    Start {
        /// Path to the configuration file
        #[arg(short, long, default_value = "bridge.yaml")]
        config: PathBuf,

        /// Override the gateway HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate configuration without starting the bridge
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "bridge.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "bridge.yaml")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_parses_with_defaults() {
        let cli = Cli::try_parse_from(["attbx", "start"]).unwrap();
        match cli.command {
            Commands::Start { config, port } => {
                assert_eq!(config, PathBuf::from("bridge.yaml"));
                assert!(port.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.log_format, "pretty");
    }

    #[test]
    fn port_override_and_log_format_parse() {
        let cli =
            Cli::try_parse_from(["attbx", "--log-format", "json", "start", "--port", "9000"])
                .unwrap();
        assert_eq!(cli.log_format, "json");
        match cli.command {
            Commands::Start { port, .. } => assert_eq!(port, Some(9000)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn init_takes_an_output_path() {
        let cli = Cli::try_parse_from(["attbx", "init", "--output", "out.yaml"]).unwrap();
        match cli.command {
            Commands::Init { output } => assert_eq!(output, PathBuf::from("out.yaml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
