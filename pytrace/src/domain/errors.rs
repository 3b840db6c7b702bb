//! Structured error types for pytrace
//!
//! Only the tooling around the attachment points can fail. The event path
//! (translator, probes, start/stop) has no error type on purpose: failures
//! there are swallowed.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Symbol {symbol} not found in {}", binary.display())]
    SymbolNotFound { symbol: &'static str, binary: PathBuf },

    #[error("Unsupported architecture for probe definitions: {0}")]
    UnsupportedArch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Object(#[from] object::Error),
}
