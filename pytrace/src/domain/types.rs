//! Domain types for translated profiling events
//!
//! A [`TraceEvent`] only lives for the duration of one attachment-point call:
//! it borrows its strings from the host frame and is dropped as soon as the
//! probe returns.

use pytrace_common::{
    ENTRY_PROBE_SYMBOL, LINE_UNKNOWN, PYTRACE_CALL, PYTRACE_C_CALL, PYTRACE_C_RETURN,
    PYTRACE_RETURN, RETURN_PROBE_SYMBOL,
};
use std::ffi::CStr;
use std::fmt;

/// Profiling event kinds forwarded to an attachment point
///
/// Host kinds not listed here (exception, line, opcode, ...) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Call,
    NativeCall,
    Return,
    NativeReturn,
}

impl EventKind {
    /// Map a host event code to a forwarded kind, `None` for ignored codes
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            PYTRACE_CALL => Some(Self::Call),
            PYTRACE_C_CALL => Some(Self::NativeCall),
            PYTRACE_RETURN => Some(Self::Return),
            PYTRACE_C_RETURN => Some(Self::NativeReturn),
            _ => None,
        }
    }

    /// Host event code, as passed through to the attachment point
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Call => PYTRACE_CALL,
            Self::NativeCall => PYTRACE_C_CALL,
            Self::Return => PYTRACE_RETURN,
            Self::NativeReturn => PYTRACE_C_RETURN,
        }
    }

    /// Attachment point this kind is dispatched to
    #[must_use]
    pub fn probe(self) -> Probe {
        match self {
            Self::Call | Self::NativeCall => Probe::Entry,
            Self::Return | Self::NativeReturn => Probe::Return,
        }
    }
}

/// The two attachment points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    Entry,
    Return,
}

impl Probe {
    pub const ALL: [Probe; 2] = [Probe::Entry, Probe::Return];

    /// Exported symbol name external tools attach to
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Entry => ENTRY_PROBE_SYMBOL,
            Self::Return => RETURN_PROBE_SYMBOL,
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Source line number, or [`LINE_UNKNOWN`] when the host has none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineNumber(pub i32);

impl LineNumber {
    pub const UNKNOWN: LineNumber = LineNumber(LINE_UNKNOWN);

    /// Returns true unless this is the unknown-line sentinel
    #[must_use]
    pub fn is_known(self) -> bool {
        self.0 >= 0
    }
}

impl From<i32> for LineNumber {
    fn from(line: i32) -> Self {
        // Any negative value from the host means "unknown"
        if line < 0 {
            Self::UNKNOWN
        } else {
            Self(line)
        }
    }
}

impl fmt::Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("?")
        }
    }
}

/// Source location resolved from the frame active at the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation<'a> {
    pub filename: Option<&'a CStr>,
    pub function_name: Option<&'a CStr>,
    pub line: LineNumber,
}

/// One translated event, borrowed for a single attachment-point call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent<'a> {
    pub location: SourceLocation<'a>,
    pub kind: EventKind,
}
