//! # Attachment Points
//!
//! Two exported, intentionally empty functions that external tools attach
//! uprobes to:
//!
//! - `pytrace_function_entry` - fired for call and C-call events
//! - `pytrace_function_return` - fired for return and C-return events
//!
//! Both take `(const char *filename, const char *funcname, int lineno, int what)`.
//! Their names and signature are the compatibility contract with the probe
//! side (see `pytrace_common`), so they must not change.
//!
//! Dispatch goes through the [`ProbeSink`] trait. [`NativeProbes`] is the
//! production sink that calls the exported symbols; embedders and tests can
//! inject their own sink instead.

use std::ffi::{c_char, c_int, CStr};
use std::ptr;

use crate::domain::TraceEvent;

/// Receiver of translated events
///
/// Implementations run synchronously on the interpreter thread that
/// produced the event and must not retain the borrowed strings.
pub trait ProbeSink: Send + Sync {
    /// Called for call-kind events
    fn entry(&self, event: &TraceEvent<'_>);

    /// Called for return-kind events
    fn ret(&self, event: &TraceEvent<'_>);
}

/// Sink that fires the exported attachment-point symbols
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProbes;

impl ProbeSink for NativeProbes {
    fn entry(&self, event: &TraceEvent<'_>) {
        let (filename, funcname, lineno, what) = abi_args(event);
        pytrace_function_entry(filename, funcname, lineno, what);
    }

    fn ret(&self, event: &TraceEvent<'_>) {
        let (filename, funcname, lineno, what) = abi_args(event);
        pytrace_function_return(filename, funcname, lineno, what);
    }
}

fn abi_args(event: &TraceEvent<'_>) -> (*const c_char, *const c_char, c_int, c_int) {
    let location = &event.location;
    (
        location.filename.map_or(ptr::null(), CStr::as_ptr),
        location.function_name.map_or(ptr::null(), CStr::as_ptr),
        location.line.0,
        event.kind.code(),
    )
}

// The arguments go through black_box so the optimizer keeps both the calls
// and the argument registers intact for the uprobe to read.

/// Entry attachment point (empty, probe target)
#[allow(unsafe_code)]
#[no_mangle]
#[inline(never)]
pub extern "C" fn pytrace_function_entry(
    filename: *const c_char,
    funcname: *const c_char,
    lineno: c_int,
    what: c_int,
) {
    std::hint::black_box((filename, funcname, lineno, what));
}

/// Return attachment point (empty, probe target)
#[allow(unsafe_code)]
#[no_mangle]
#[inline(never)]
pub extern "C" fn pytrace_function_return(
    filename: *const c_char,
    funcname: *const c_char,
    lineno: c_int,
    what: c_int,
) {
    std::hint::black_box((filename, funcname, lineno, what));
}
