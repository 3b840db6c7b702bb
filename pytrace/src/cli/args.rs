//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pytrace-probes",
    about = "Inspect and attach to the pytrace attachment points",
    after_help = "\
EXAMPLES:
    pytrace-probes symbols ./pytrace.so                 Verify both probe symbols are exported
    sudo sh -c \"$(pytrace-probes perf ./pytrace.so)\"   Define perf uprobes
    sudo bpftrace -e \"$(pytrace-probes bpftrace ./pytrace.so)\""
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that the attachment points are exported by a built library
    Symbols {
        /// Shared object or executable linking pytrace
        #[arg(value_name = "LIB")]
        binary: PathBuf,
    },

    /// Print `perf probe` commands defining uprobes on the attachment points
    Perf {
        #[arg(value_name = "LIB")]
        binary: PathBuf,

        /// Target architecture (x86_64, aarch64); defaults to this machine
        #[arg(long)]
        arch: Option<String>,
    },

    /// Print a bpftrace program that logs every entry and return event
    Bpftrace {
        #[arg(value_name = "LIB")]
        binary: PathBuf,
    },
}
