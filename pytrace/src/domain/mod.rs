//! Domain model for pytrace
//!
//! This module contains the event types handed to the attachment points and
//! the errors of the probe tooling.

pub mod errors;
pub mod types;

pub use types::{EventKind, LineNumber, Probe, SourceLocation, TraceEvent};

pub use errors::ProbeError;
