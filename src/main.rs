//! pinwire - GPIO control for Khadas single-board computers
//!
//! Command-line front-end over the pinwire crates: board detection and
//! register-level backends (VIM1/VIM2/VIM3 on Amlogic, Edge on Rockchip),
//! wiringPi-style pin numbering, sysfs export/interrupt plumbing and
//! extension nodes for off-chip expanders.

mod boards;
mod cli;
mod commands;
mod extensions;

use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Commands};
use pinwire_core::types::NumberingMode;
use pinwire_core::{setup_with, Gpio};
use pinwire_sysfs::{IsrRegistry, SysfsGpio};

/// Default log filter for a `-v` count; `RUST_LOG` still overrides it.
fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.verbose)),
    )
    .init();

    let sysfs = SysfsGpio::new();

    // These never touch pin hardware, so they work without root and
    // without a supported board.
    match &cli.command {
        Commands::Boards => {
            commands::info::run_boards();
            return Ok(());
        }
        Commands::Exports => {
            commands::interrupts::run_exports(&sysfs);
            return Ok(());
        }
        _ => {}
    }

    let numbering = if cli.native {
        NumberingMode::Native
    } else if cli.phys {
        NumberingMode::Physical
    } else if cli.sysfs {
        NumberingMode::Sysfs
    } else {
        NumberingMode::Logical
    };

    let gpio = match setup_with(numbering, || {
        let model = boards::select_board(cli.board.as_deref())?;
        boards::open_driver(model)
    }) {
        Ok(gpio) => gpio,
        Err(e) => {
            eprintln!("pinwire: {e}");
            std::process::exit(1);
        }
    };

    if gpio.numbering() == NumberingMode::Sysfs {
        // Sysfs numbering reads and writes go through cached `value`
        // descriptors; open one for every pin already exported.
        let cached = sysfs.open_exported_values(gpio.sysfs());
        log::debug!("cached {cached} exported value descriptors");
    }

    for spec in &cli.extensions {
        if let Err(e) = extensions::load(gpio, spec) {
            eprintln!("pinwire: {e}");
            std::process::exit(1);
        }
    }

    run_command(gpio, &sysfs, cli.command)
}

fn run_command(
    gpio: &Gpio,
    sysfs: &SysfsGpio,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Mode { pin, mode } => commands::pin::run_mode(gpio, pin, mode),
        Commands::Read { pin } => commands::pin::run_read(gpio, pin),
        Commands::Write { pin, value } => commands::pin::run_write(gpio, pin, value),
        Commands::Toggle { pin } => commands::pin::run_toggle(gpio, pin),
        Commands::Alt { pin } => commands::pin::run_alt(gpio, pin),
        Commands::Pull { pin } => commands::pin::run_pull(gpio, pin),
        Commands::Pwm { pin, value } => commands::pin::run_pwm(gpio, pin, value),
        Commands::Aread { pin } => commands::pin::run_aread(gpio, pin),
        Commands::Readall => commands::readall::run_readall(gpio),
        Commands::Edge { pin, edge } => commands::interrupts::run_edge(gpio, sysfs, pin, edge)?,
        Commands::Wfi { pin, edge, timeout } => {
            let registry = IsrRegistry::new(sysfs.clone(), Arc::clone(gpio.sysfs()));
            commands::interrupts::run_wfi(gpio, &registry, pin, edge, timeout)?;
        }
        // Handled before setup.
        Commands::Boards | Commands::Exports => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_filter() {
        assert_eq!(log_filter(0), "warn");
        assert_eq!(log_filter(1), "debug");
        assert_eq!(log_filter(5), "trace");
    }
}
