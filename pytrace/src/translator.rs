//! # Event Translator
//!
//! Converts host profiling notifications into [`TraceEvent`]s and forwards
//! them to a [`ProbeSink`]:
//!
//! - call / C-call -> [`ProbeSink::entry`]
//! - return / C-return -> [`ProbeSink::ret`]
//! - anything else -> ignored, the frame is never inspected
//!
//! The translator is stateless apart from the sink it forwards to, and it
//! always reports success to the host. A panic while resolving the frame or
//! inside the sink is caught here: unwinding into the interpreter's dispatch
//! loop would abort the observed program.

use std::ffi::{c_int, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use crate::domain::{EventKind, LineNumber, Probe, SourceLocation, TraceEvent};
use crate::probes::{NativeProbes, ProbeSink};

/// Status returned to the host for every notification
pub const CALLBACK_OK: c_int = 0;

/// Best-effort view of the execution frame active at an event
///
/// Every accessor may come up empty; the translator forwards `None` (null at
/// the ABI) and [`LineNumber::UNKNOWN`] instead of failing.
pub trait FrameInfo {
    fn filename(&self) -> Option<&CStr>;
    fn function_name(&self) -> Option<&CStr>;
    fn line_number(&self) -> LineNumber;

    /// Snapshot of all three fields, borrowed from the frame
    fn location(&self) -> SourceLocation<'_> {
        SourceLocation {
            filename: self.filename(),
            function_name: self.function_name(),
            line: self.line_number(),
        }
    }
}

/// The profiling callback installed into the host
///
/// Clones share one registration: the [`Registration`] handed out by
/// [`EventTranslator::registration`] stays live until the host drops its
/// last copy.
#[derive(Clone)]
pub struct EventTranslator {
    sink: Arc<dyn ProbeSink>,
    token: Arc<()>,
}

impl EventTranslator {
    pub fn new(sink: Arc<dyn ProbeSink>) -> Self {
        Self { sink, token: Arc::new(()) }
    }

    /// Handle telling whether this translator is still held by the host
    #[must_use]
    pub fn registration(&self) -> Registration {
        Registration(Arc::downgrade(&self.token))
    }

    /// Translator firing the exported attachment points
    #[must_use]
    pub fn native() -> Self {
        Self::new(Arc::new(NativeProbes))
    }

    /// Handle one host notification
    ///
    /// `resolve` is only called for forwarded kinds, so ignored events cost
    /// a single comparison. Always returns [`CALLBACK_OK`].
    pub fn on_event<F, R>(&self, what: c_int, resolve: R) -> c_int
    where
        F: FrameInfo,
        R: FnOnce() -> F,
    {
        let Some(kind) = EventKind::from_code(what) else {
            return CALLBACK_OK;
        };

        // A panic is swallowed like any other failure
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let frame = resolve();
            self.dispatch(kind, &frame);
        }));

        CALLBACK_OK
    }

    /// Forward an already classified event resolved from `frame`
    pub fn dispatch<F: FrameInfo + ?Sized>(&self, kind: EventKind, frame: &F) {
        let event = TraceEvent { location: frame.location(), kind };
        match kind.probe() {
            Probe::Entry => self.sink.entry(&event),
            Probe::Return => self.sink.ret(&event),
        }
    }
}

/// Weak handle on an installed translator
///
/// Goes dead once the host releases the translator, either because it was
/// cleared or because another registration replaced it.
#[derive(Debug, Clone)]
pub struct Registration(Weak<()>);

impl Registration {
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl std::fmt::Debug for EventTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTranslator").finish_non_exhaustive()
    }
}
