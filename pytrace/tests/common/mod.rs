//! Simulated interpreter used to drive the translator in tests
//!
//! The interpreter keeps a frame stack and a single profiling slot, and emits
//! events with the same frame conventions as CPython: call/return carry the
//! callee frame, C calls carry the calling frame.

#![allow(dead_code)]

use pytrace::{EventTranslator, FrameInfo, LineNumber, Probe, ProbeSink, ProfileHost, TraceEvent};
use pytrace_common::{
    PYTRACE_CALL, PYTRACE_C_CALL, PYTRACE_C_RETURN, PYTRACE_EXCEPTION, PYTRACE_LINE, PYTRACE_RETURN,
};
use std::cell::{Cell, RefCell};
use std::ffi::{CStr, CString};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type Slot = Rc<RefCell<Option<EventTranslator>>>;

#[derive(Debug, Clone)]
pub struct SimFrame {
    filename: Option<CString>,
    function: Option<CString>,
    line: i32,
}

impl FrameInfo for SimFrame {
    fn filename(&self) -> Option<&CStr> {
        self.filename.as_deref()
    }

    fn function_name(&self) -> Option<&CStr> {
        self.function.as_deref()
    }

    fn line_number(&self) -> LineNumber {
        LineNumber::from(self.line)
    }
}

/// Handle on the interpreter's profiling slot, given to a `Tracer`
#[derive(Debug, Clone)]
pub struct SimHost {
    slot: Slot,
    installs: Rc<Cell<usize>>,
}

impl SimHost {
    pub fn installs(&self) -> usize {
        self.installs.get()
    }
}

impl ProfileHost for SimHost {
    fn install(&mut self, translator: EventTranslator) -> bool {
        *self.slot.borrow_mut() = Some(translator);
        self.installs.set(self.installs.get() + 1);
        true
    }

    fn clear(&mut self) {
        *self.slot.borrow_mut() = None;
    }
}

pub struct Interpreter {
    slot: Slot,
    installs: Rc<Cell<usize>>,
    stack: Vec<SimFrame>,
}

impl Interpreter {
    /// Interpreter executing `<module>` of `main.src`
    pub fn new() -> Self {
        let module = SimFrame {
            filename: Some(CString::new("main.src").unwrap()),
            function: Some(CString::new("<module>").unwrap()),
            line: 1,
        };
        Self {
            slot: Rc::new(RefCell::new(None)),
            installs: Rc::new(Cell::new(0)),
            stack: vec![module],
        }
    }

    pub fn host(&self) -> SimHost {
        SimHost { slot: Rc::clone(&self.slot), installs: Rc::clone(&self.installs) }
    }

    pub fn has_callback(&self) -> bool {
        self.slot.borrow().is_some()
    }

    pub fn call(&mut self, filename: &str, function: &str, line: i32) {
        self.call_frame(Some(filename), Some(function), line);
    }

    /// Call a function whose code object lacks some fields
    pub fn call_frame(&mut self, filename: Option<&str>, function: Option<&str>, line: i32) {
        self.stack.push(SimFrame {
            filename: filename.map(|f| CString::new(f).unwrap()),
            function: function.map(|f| CString::new(f).unwrap()),
            line,
        });
        self.emit(PYTRACE_CALL);
    }

    pub fn line(&mut self, line: i32) {
        self.current().line = line;
        self.emit(PYTRACE_LINE);
    }

    pub fn raise(&mut self) {
        self.emit(PYTRACE_EXCEPTION);
    }

    pub fn ret(&mut self) {
        self.emit(PYTRACE_RETURN);
        self.stack.pop();
    }

    pub fn c_call(&mut self) {
        self.emit(PYTRACE_C_CALL);
    }

    pub fn c_return(&mut self) {
        self.emit(PYTRACE_C_RETURN);
    }

    fn current(&mut self) -> &mut SimFrame {
        self.stack.last_mut().unwrap()
    }

    fn emit(&self, what: i32) {
        let translator = self.slot.borrow().clone();
        if let Some(translator) = translator {
            let frame = self.stack.last().cloned().unwrap();
            assert_eq!(translator.on_event(what, || frame), 0, "callback must report success");
        }
    }
}

/// One attachment-point invocation, with owned copies of the strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub probe: Probe,
    pub filename: Option<String>,
    pub function: Option<String>,
    pub line: i32,
    pub what: i32,
}

impl Recorded {
    pub fn new(probe: Probe, filename: &str, function: &str, line: i32, what: i32) -> Self {
        Self {
            probe,
            filename: Some(filename.to_string()),
            function: Some(function.to_string()),
            line,
            what,
        }
    }
}

/// Sink recording every invocation and checking they never overlap
#[derive(Debug, Default)]
pub struct Recorder {
    calls: Mutex<Vec<Recorded>>,
    in_flight: AtomicBool,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, probe: Probe) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.probe == probe).count()
    }

    fn record(&self, probe: Probe, event: &TraceEvent<'_>) {
        assert!(!self.in_flight.swap(true, Ordering::SeqCst), "attachment point calls overlap");
        let owned = |s: Option<&CStr>| s.map(|s| s.to_string_lossy().into_owned());
        self.calls.lock().unwrap().push(Recorded {
            probe,
            filename: owned(event.location.filename),
            function: owned(event.location.function_name),
            line: event.location.line.0,
            what: event.kind.code(),
        });
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

impl ProbeSink for Recorder {
    fn entry(&self, event: &TraceEvent<'_>) {
        self.record(Probe::Entry, event);
    }

    fn ret(&self, event: &TraceEvent<'_>) {
        self.record(Probe::Return, event);
    }
}
