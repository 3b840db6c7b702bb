//! # Shared ABI Constants (Interpreter ↔ Probe Programs)
//!
//! Defines the constants that make up the attachment-point contract. They are
//! shared between the adapter that fires the attachment points and any
//! external program (uprobe definition, eBPF program, bpftrace script) that
//! binds against them, so both sides agree on names, argument order, and
//! event-kind codes.
//!
//! ## Key Items
//!
//! - [`ENTRY_PROBE_SYMBOL`] / [`RETURN_PROBE_SYMBOL`] - exported symbol names
//! - [`PROBE_ARGS`] - argument layout of both attachment points
//! - `PYTRACE_*` - host profiling event codes, passed through unmodified

#![no_std]

// ============================================================================
// Host Event Codes
// ============================================================================
// Values of CPython's `PyTrace_*` enumeration (`Include/cpython/pystate.h`).
// The adapter forwards them to the attachment points as-is.

/// Interpreted function call
///
/// Fires: entry attachment point
pub const PYTRACE_CALL: i32 = 0;

/// Exception raised (ignored by the adapter)
pub const PYTRACE_EXCEPTION: i32 = 1;

/// New source line executed (ignored by the adapter)
pub const PYTRACE_LINE: i32 = 2;

/// Interpreted function return
///
/// Fires: return attachment point
pub const PYTRACE_RETURN: i32 = 3;

/// Native (C) function call
///
/// Fires: entry attachment point
pub const PYTRACE_C_CALL: i32 = 4;

/// Native (C) function raised (ignored by the adapter)
pub const PYTRACE_C_EXCEPTION: i32 = 5;

/// Native (C) function return
///
/// Fires: return attachment point
pub const PYTRACE_C_RETURN: i32 = 6;

/// Opcode executed (ignored by the adapter)
pub const PYTRACE_OPCODE: i32 = 7;

/// Line number reported when the host cannot resolve one
pub const LINE_UNKNOWN: i32 = -1;

// ============================================================================
// Attachment Points
// ============================================================================

/// Exported symbol fired on every call-kind event
///
/// Signature: `void(const char *filename, const char *funcname, int lineno, int what)`
pub const ENTRY_PROBE_SYMBOL: &str = "pytrace_function_entry";

/// Exported symbol fired on every return-kind event
///
/// Same signature as [`ENTRY_PROBE_SYMBOL`].
pub const RETURN_PROBE_SYMBOL: &str = "pytrace_function_return";

/// Both attachment-point symbols, entry first
pub const PROBE_SYMBOLS: [&str; 2] = [ENTRY_PROBE_SYMBOL, RETURN_PROBE_SYMBOL];

/// How a probe program should read an attachment-point argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    /// Pointer to NUL-terminated UTF-8, may be null
    CString,
    /// 32-bit signed integer
    S32,
}

/// One positional argument of the attachment-point ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeArg {
    /// Name used for the fetched argument in probe definitions
    pub name: &'static str,
    /// Zero-based position in the C calling convention
    pub index: usize,
    pub ty: ArgType,
}

/// Argument layout shared by both attachment points, in call order
pub const PROBE_ARGS: [ProbeArg; 4] = [
    ProbeArg { name: "filename", index: 0, ty: ArgType::CString },
    ProbeArg { name: "funcname", index: 1, ty: ArgType::CString },
    ProbeArg { name: "lineno", index: 2, ty: ArgType::S32 },
    ProbeArg { name: "what", index: 3, ty: ArgType::S32 },
];
