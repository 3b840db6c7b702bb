//! Exported symbol verification
//!
//! Confirms that a built artifact still carries both attachment points.
//! A symbol that was inlined away or stripped cannot be probed.

use object::{Object, ObjectSymbol};
use std::fs;
use std::path::Path;

use crate::domain::{Probe, ProbeError};

/// Attachment point found in a binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSymbol {
    pub probe: Probe,
    pub address: u64,
    /// Found in the dynamic symbol table (visible to the dynamic linker)
    pub dynamic: bool,
}

/// Locate both attachment points in the ELF object at `binary`
///
/// The dynamic symbol table is searched first, then the static one.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or if either
/// attachment point is not defined in it
pub fn find_probe_symbols(binary: &Path) -> Result<Vec<ProbeSymbol>, ProbeError> {
    let data = fs::read(binary)?;
    let file = object::File::parse(&*data)?;

    Probe::ALL
        .into_iter()
        .map(|probe| {
            lookup(&file, probe).ok_or_else(|| ProbeError::SymbolNotFound {
                symbol: probe.symbol(),
                binary: binary.to_path_buf(),
            })
        })
        .collect()
}

fn lookup(file: &object::File<'_>, probe: Probe) -> Option<ProbeSymbol> {
    let name = probe.symbol();

    file.dynamic_symbols()
        .find(|sym| defines(sym, name))
        .map(|sym| ProbeSymbol { probe, address: sym.address(), dynamic: true })
        .or_else(|| {
            file.symbols()
                .find(|sym| defines(sym, name))
                .map(|sym| ProbeSymbol { probe, address: sym.address(), dynamic: false })
        })
}

fn defines(sym: &object::Symbol<'_, '_>, name: &str) -> bool {
    sym.is_definition() && sym.name().is_ok_and(|n| n == name)
}
