//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};

use crate::extensions;

/// Parse a string as a hex or decimal u32
pub fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Generate dynamic help text for the -x argument
fn extension_help() -> String {
    format!(
        "Load an extension node, name:pinBase:params [available: {}]",
        extensions::extension_names_short()
    )
}

#[derive(Parser)]
#[command(name = "pinwire")]
#[command(author, version, about = "GPIO control for Khadas VIM and Edge boards", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Board to drive (vim1, vim2, vim3, edge, dummy); auto-detected from
    /// the device tree if not given
    #[arg(long, global = true)]
    pub board: Option<String>,

    /// Use native SoC GPIO numbering
    #[arg(short = 'g', long = "gpio", global = true, conflicts_with_all = ["phys", "sysfs"])]
    pub native: bool,

    /// Use physical header pin numbering
    #[arg(short = 'p', long = "phys", global = true, conflicts_with = "sysfs")]
    pub phys: bool,

    /// Use sysfs GPIO numbering (no /dev/mem access)
    #[arg(short = 's', long = "sysfs", global = true)]
    pub sysfs: bool,

    /// Extension nodes to load before running the command
    #[arg(short = 'x', long = "extension", global = true, help = extension_help())]
    pub extensions: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Argument to `mode`: pin function or pull shorthand, like the classic
/// `gpio mode` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Input
    In,
    /// Output
    Out,
    /// Software PWM
    Pwm,
    /// Software tone
    Tone,
    /// Pull-up
    Up,
    /// Pull-down
    Down,
    /// No pull (tri-state)
    Tri,
}

/// Edge argument for `edge` and `wfi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EdgeArg {
    /// Trigger on rising edges
    Rising,
    /// Trigger on falling edges
    Falling,
    /// Trigger on both edges
    Both,
    /// Keep the already configured edge
    None,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set a pin's mode or pull
    Mode {
        /// Pin number (in the selected numbering)
        pin: u32,
        /// Function or pull to apply
        #[arg(value_enum)]
        mode: ModeArg,
    },

    /// Read a pin's level
    Read {
        /// Pin number
        pin: u32,
    },

    /// Drive a pin
    Write {
        /// Pin number
        pin: u32,
        /// 0 or 1
        value: u8,
    },

    /// Invert a pin's level
    Toggle {
        /// Pin number
        pin: u32,
    },

    /// Show a pin's current function
    Alt {
        /// Pin number
        pin: u32,
    },

    /// Show a pin's pull configuration
    Pull {
        /// Pin number
        pin: u32,
    },

    /// Set the duty value of a soft-PWM pin (set up with `mode <pin> pwm`)
    Pwm {
        /// Pin number
        pin: u32,
        /// Duty value, clamped to the PWM range
        value: u32,
    },

    /// Read an analog input channel
    Aread {
        /// Channel/pin number
        pin: u32,
    },

    /// Print the state of every header pin
    Readall,

    /// Show the detected board and the backends in this build
    Boards,

    /// List pins currently exported through sysfs
    Exports,

    /// Configure a pin's sysfs edge attribute (exports the pin first)
    Edge {
        /// Pin number
        pin: u32,
        /// Edge to trigger on
        #[arg(value_enum)]
        edge: EdgeArg,
    },

    /// Wait for an interrupt edge on a pin
    Wfi {
        /// Pin number
        pin: u32,
        /// Edge to wait for
        #[arg(value_enum)]
        edge: EdgeArg,
        /// Give up after this many milliseconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_write_with_numbering_flag() {
        let cli = Cli::parse_from(["pinwire", "-g", "write", "433", "1"]);
        assert!(cli.native);
        match cli.command {
            Commands::Write { pin, value } => {
                assert_eq!(pin, 433);
                assert_eq!(value, 1);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn numbering_flags_conflict() {
        assert!(Cli::try_parse_from(["pinwire", "-g", "-p", "read", "0"]).is_err());
    }

    #[test]
    fn extension_flag_repeats() {
        let cli = Cli::parse_from([
            "pinwire",
            "-x",
            "mcp23017:100:0x20",
            "-x",
            "mcp23017:120:0x21",
            "readall",
        ]);
        assert_eq!(cli.extensions.len(), 2);
    }

    #[test]
    fn hex_parser_accepts_both_radixes() {
        assert_eq!(parse_hex_u32("0x20"), Ok(0x20));
        assert_eq!(parse_hex_u32("33"), Ok(33));
        assert!(parse_hex_u32("zz").is_err());
    }
}
