use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crc_prefixer::batch::solve_lines;
use crc_prefixer::crc::crc16;
use crc_prefixer::frame::{format_prefix, parse_hex, to_hex, Frame};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Args {
    /// Hex message whose last two bytes are its CRC (same as `solve`)
    #[arg(value_name = "HEXMESSAGE")]
    message: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recover the CRC prefix of a message whose last two bytes are its CRC
    Solve {
        #[arg(value_name = "HEXMESSAGE")]
        message: String,
    },
    /// Compute the CRC of a hex message
    Checksum {
        #[arg(value_name = "HEXMESSAGE")]
        message: String,

        /// Initial register value
        #[arg(
            long,
            value_name = "HEX16",
            env = "CRC_PREFIXER_SEED",
            default_value = "0",
            value_parser = parse_u16_hex
        )]
        seed: u16,
    },
    /// Append the CRC computed from a given prefix to a hex message
    Seal {
        #[arg(value_name = "HEXMESSAGE")]
        message: String,

        /// Initial register value used for the appended CRC
        #[arg(long, value_name = "HEX16", env = "CRC_PREFIXER_PREFIX", value_parser = parse_u16_hex)]
        prefix: u16,
    },
    /// Recover prefixes for one hex message per line (stdin if no file)
    Batch {
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },
}

fn parse_u16_hex(text: &str) -> std::result::Result<u16, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u16::from_str_radix(digits, 16).map_err(|e| format!("'{}' is not a 16-bit hex value: {}", text, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let command = match (args.command, args.message) {
        (Some(cmd), _) => cmd,
        (None, Some(message)) => Commands::Solve { message },
        (None, None) => bail!("Usage: crc-prefixer <HEXMESSAGE> (see --help)"),
    };

    match command {
        Commands::Solve { message } => {
            let frame = Frame::from_hex(&message).context("Failed to parse message")?;
            let prefix = frame.recover_prefix()?;
            if !frame.verify(prefix) {
                warn!("Recovered prefix {} does not reproduce the checksum", format_prefix(prefix));
            }
            println!("prefix = {}", format_prefix(prefix));
        }
        Commands::Checksum { message, seed } => {
            let body = parse_hex(&message).context("Failed to parse message")?;
            println!("crc = {}", format_prefix(crc16(seed, &body)));
        }
        Commands::Seal { message, prefix } => {
            let body = parse_hex(&message).context("Failed to parse message")?;
            let frame = Frame::seal(prefix, &body);
            info!("Sealed {} bytes with prefix {}", body.len(), format_prefix(prefix));
            println!("{}", to_hex(&frame.to_bytes()));
        }
        Commands::Batch { input } => {
            let reader: Box<dyn BufRead + Send> = match input {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("Failed to open {}", path.display()))?;
                    Box::new(BufReader::new(file))
                }
                None => Box::new(BufReader::new(io::stdin())),
            };

            let mut outcomes = std::pin::pin!(solve_lines(reader));
            let mut failures = 0usize;
            while let Some(outcome) = outcomes.next().await {
                match outcome.result {
                    Ok(prefix) => println!("{}: prefix = {}", outcome.line, format_prefix(prefix)),
                    Err(e) => {
                        failures += 1;
                        println!("{}: error: {}", outcome.line, e);
                    }
                }
            }

            if failures > 0 {
                bail!("{} line(s) failed", failures);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_u16_hex_accepts_optional_prefix() {
        assert_eq!(parse_u16_hex("1d0f"), Ok(0x1D0F));
        assert_eq!(parse_u16_hex("0xFFFF"), Ok(0xFFFF));
        assert_eq!(parse_u16_hex("0"), Ok(0));
        assert!(parse_u16_hex("10000").is_err());
        assert!(parse_u16_hex("xyz").is_err());
    }

    #[test]
    fn bare_message_parses_without_subcommand() {
        let args = Args::try_parse_from(["crc-prefixer", "12340000"]).unwrap();
        assert_eq!(args.message.as_deref(), Some("12340000"));
        assert!(args.command.is_none());
    }

    #[test]
    fn seal_requires_prefix() {
        let args = Args::try_parse_from(["crc-prefixer", "seal", "1234", "--prefix", "0x1d0f"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Seal { prefix: 0x1D0F, .. })));
    }
}
