//! # pytrace - Interpreter Call/Return Probes
//!
//! pytrace lets an external, low-overhead tracer observe Python function
//! calls and returns. It registers a profiling callback with the
//! interpreter and turns every call or return event into a call of one of
//! two empty, exported native functions. Uprobes (`perf probe`, bpftrace,
//! eBPF) attach to those functions at runtime; the observed program is
//! neither modified nor recompiled.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────┐
//! │      Python interpreter      │
//! │  (PyEval_SetProfile slot)    │
//! └──────────────┬───────────────┘
//!                │ (frame, what) on every profiled event
//!                ▼
//! ┌──────────────────────────────┐     ┌──────────────────────────────┐
//! │       EventTranslator        │────▶│          ProbeSink           │
//! │ call/c_call -> entry         │     │ NativeProbes:                │
//! │ return/c_return -> return    │     │  pytrace_function_entry()    │
//! │ everything else ignored      │     │  pytrace_function_return()   │
//! └──────────────────────────────┘     └──────────────┬───────────────┘
//!                                                     │ uprobe
//!                                                     ▼
//!                                          external tracer (perf, bpftrace)
//! ```
//!
//! ## Module Structure
//!
//! - [`domain`]: event types ([`TraceEvent`], [`EventKind`], [`Probe`]) and errors
//! - [`probes`]: the exported attachment points and the [`ProbeSink`] seam
//! - [`translator`]: [`EventTranslator`], the profiling callback body
//! - [`tracer`]: [`Tracer`], the start/stop handle over a [`ProfileHost`]
//! - [`probe_spec`]: `perf probe` / bpftrace definitions for the attachment points
//! - [`symbols`]: verify a built artifact exports the attachment points
//! - [`cli`]: arguments of the `pytrace-probes` binary
//! - `python` (feature `python`): the CPython extension module
//!
//! ## Typical Usage
//!
//! ```bash
//! # Define uprobes on the built extension and record
//! sudo sh -c "$(pytrace-probes perf ./pytrace.so)"
//! sudo perf record -e 'probe_pytrace:*' -- python -c 'import pytrace; pytrace.start(); work()'
//! ```

pub mod cli;
pub mod domain;
pub mod probe_spec;
pub mod probes;
#[cfg(feature = "python")]
pub mod python;
pub mod symbols;
pub mod tracer;
pub mod translator;

pub use domain::{EventKind, LineNumber, Probe, SourceLocation, TraceEvent};
pub use probes::{NativeProbes, ProbeSink};
pub use tracer::{ProfileHost, Tracer, TracerState};
pub use translator::{EventTranslator, FrameInfo, Registration};
