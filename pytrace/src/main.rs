//! # pytrace-probes - Main Entry Point
//!
//! Helper for wiring external tracers to the pytrace attachment points:
//! - `symbols` - verify a built library still exports both probe symbols
//! - `perf` - print `perf probe` definitions for them
//! - `bpftrace` - print a ready-to-run bpftrace program
//!
//! Generated definitions go to stdout, everything else to stderr, so the
//! output can be fed straight into a shell or `bpftrace -e`.

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::{Path, PathBuf};

use pytrace::cli::{Args, Command};
use pytrace::domain::Probe;
use pytrace::probe_spec::{bpftrace_program, perf_probe_command, Arch};
use pytrace::symbols::find_probe_symbols;

// Exit codes (usage errors exit with 2 from clap)
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    match args.command {
        Command::Symbols { binary } => check_symbols(&resolve_binary(&binary)?, quiet),
        Command::Perf { binary, arch } => {
            let arch = match arch {
                Some(name) => name.parse::<Arch>()?,
                None => Arch::host()?,
            };
            print_perf_commands(&resolve_binary(&binary)?, arch, quiet);
            Ok(())
        }
        Command::Bpftrace { binary } => {
            print!("{}", bpftrace_program(&resolve_binary(&binary)?));
            Ok(())
        }
    }
}

/// Absolute path of the library, uprobe definitions must not depend on the cwd
fn resolve_binary(binary: &Path) -> Result<PathBuf> {
    let resolved = std::fs::canonicalize(binary)
        .with_context(|| format!("Failed to resolve path: {}", binary.display()))?;
    debug!("Resolved {} to {}", binary.display(), resolved.display());
    Ok(resolved)
}

fn check_symbols(binary: &Path, quiet: bool) -> Result<()> {
    let symbols = find_probe_symbols(binary)
        .with_context(|| format!("Attachment points unavailable in {}", binary.display()))?;

    for symbol in &symbols {
        if !symbol.dynamic {
            info!("{} is only in the static symbol table", symbol.probe);
        }
        if !quiet {
            let table = if symbol.dynamic { "dynamic" } else { "static" };
            println!("✓ {:<24} {:#018x} ({table})", symbol.probe.symbol(), symbol.address);
        }
    }
    Ok(())
}

fn print_perf_commands(binary: &Path, arch: Arch, quiet: bool) {
    if !quiet {
        eprintln!("# uprobes for {} ({arch:?})", binary.display());
    }
    for probe in Probe::ALL {
        println!("{}", perf_probe_command(binary, probe, arch));
    }
    if !quiet {
        let group = binary
            .file_stem()
            .map(|s| s.to_string_lossy().replace(|c: char| !c.is_ascii_alphanumeric(), "_"))
            .unwrap_or_default();
        eprintln!(
            "# then: perf record -e probe_{group}:{} -e probe_{group}:{} -- python ...",
            Probe::Entry.symbol(),
            Probe::Return.symbol()
        );
    }
}
