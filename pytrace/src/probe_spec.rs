//! Probe definitions for external tracers
//!
//! Renders the uprobe definitions an external tool needs to read the
//! attachment-point arguments:
//!
//! - `perf probe` event definitions (register fetch syntax)
//! - a `bpftrace` program printing one line per event
//!
//! Argument order and types come from [`pytrace_common::PROBE_ARGS`].

use pytrace_common::{ArgType, PROBE_ARGS};
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use crate::domain::{Probe, ProbeError};

/// Target architecture, selects the argument registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Aarch64,
}

impl Arch {
    /// Architecture this binary was built for
    ///
    /// # Errors
    /// Returns `UnsupportedArch` when probe definitions are not known for it
    pub fn host() -> Result<Self, ProbeError> {
        std::env::consts::ARCH.parse()
    }

    /// Register holding integer/pointer argument `index` (`SysV` / AAPCS64)
    fn arg_register(self, index: usize) -> &'static str {
        const X86_64: [&str; 4] = ["%di", "%si", "%dx", "%cx"];
        const AARCH64: [&str; 4] = ["%x0", "%x1", "%x2", "%x3"];
        match self {
            Self::X86_64 => X86_64[index],
            Self::Aarch64 => AARCH64[index],
        }
    }
}

impl FromStr for Arch {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "aarch64" | "arm64" => Ok(Self::Aarch64),
            other => Err(ProbeError::UnsupportedArch(other.to_string())),
        }
    }
}

/// `perf probe` event definition for one attachment point
///
/// Example (x86_64):
/// `pytrace_function_entry filename=+0(%di):string funcname=+0(%si):string lineno=%dx:s32 what=%cx:s32`
#[must_use]
pub fn perf_probe_definition(probe: Probe, arch: Arch) -> String {
    let mut def = probe.symbol().to_string();
    for arg in PROBE_ARGS {
        let reg = arch.arg_register(arg.index);
        let _ = match arg.ty {
            ArgType::CString => write!(def, " {}=+0({reg}):string", arg.name),
            ArgType::S32 => write!(def, " {}={reg}:s32", arg.name),
        };
    }
    def
}

/// Full `perf probe` command adding the uprobe for `probe` in `binary`
#[must_use]
pub fn perf_probe_command(binary: &Path, probe: Probe, arch: Arch) -> String {
    format!("perf probe -x {} '{}'", binary.display(), perf_probe_definition(probe, arch))
}

/// `bpftrace` program printing every entry and return event of `binary`
#[must_use]
pub fn bpftrace_program(binary: &Path) -> String {
    let mut program = String::new();
    for probe in Probe::ALL {
        let label = match probe {
            Probe::Entry => "entry",
            Probe::Return => "return",
        };
        let _ = writeln!(
            program,
            "uprobe:{}:{}\n{{\n    printf(\"{label} %s (%s:%d) what=%d\\n\", str(arg1), str(arg0), arg2, arg3);\n}}",
            binary.display(),
            probe.symbol(),
        );
    }
    program
}
