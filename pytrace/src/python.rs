//! # CPython Binding
//!
//! Exposes the `pytrace` extension module:
//!
//! - `pytrace.start()` / `pytrace.stop()` - install or clear the profile function
//! - `pytrace.Tracer` - explicit handle, usable as a context manager
//!
//! The translator is handed to the interpreter inside a capsule passed as
//! the `obj` argument of `PyEval_SetProfile`. The interpreter holds the only
//! long-lived reference and releases it (dropping the translator) when the
//! profile function is cleared or replaced, so no global state lives on the
//! Rust side.
//!
//! `PyEval_SetProfile` acts on the calling thread's state; other threads are
//! not traced.

// Raw FFI with the interpreter, which hands us borrowed frame pointers
#![allow(unsafe_code)]

use log::{debug, warn};
use pyo3::ffi;
use pyo3::prelude::*;
use pyo3::types::PyCapsule;
use std::ffi::{c_int, CStr};
use std::ptr;

use crate::domain::LineNumber;
use crate::tracer::{ProfileHost, Tracer};
use crate::translator::{EventTranslator, FrameInfo, CALLBACK_OK};

const CAPSULE_NAME: &CStr = c"pytrace.translator";

/// Profile slot of the current interpreter thread
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonHost;

impl ProfileHost for PythonHost {
    fn install(&mut self, translator: EventTranslator) -> bool {
        Python::with_gil(|py| match PyCapsule::new(py, translator, Some(CAPSULE_NAME.to_owned())) {
            Ok(capsule) => {
                // The interpreter takes its own reference; ours drops with `capsule`
                unsafe { ffi::PyEval_SetProfile(Some(profile_callback), capsule.as_ptr()) };
                true
            }
            Err(e) => {
                warn!("Failed to allocate translator capsule, tracing not started: {e}");
                false
            }
        })
    }

    fn clear(&mut self) {
        Python::with_gil(|_py| unsafe { ffi::PyEval_SetProfile(None, ptr::null_mut()) });
    }
}

unsafe extern "C" fn profile_callback(
    obj: *mut ffi::PyObject,
    frame: *mut ffi::PyFrameObject,
    what: c_int,
    _arg: *mut ffi::PyObject,
) -> c_int {
    let translator =
        unsafe { ffi::PyCapsule_GetPointer(obj, CAPSULE_NAME.as_ptr()) }.cast::<EventTranslator>();
    if translator.is_null() || frame.is_null() {
        unsafe { ffi::PyErr_Clear() };
        return CALLBACK_OK;
    }

    // SAFETY: the capsule keeps the translator alive for as long as it is
    // the registered profile object, and the GIL is held during the callback
    let translator = unsafe { &*translator };
    translator.on_event(what, || unsafe { PyFrameView::resolve(frame) })
}

/// Strong references to the code object fields of one frame
///
/// Only built inside the profile callback, with the GIL held. The UTF-8
/// buffers handed out are cached by the string objects and stay valid until
/// the view is dropped.
struct PyFrameView {
    code: *mut ffi::PyObject,
    filename: *mut ffi::PyObject,
    name: *mut ffi::PyObject,
    line: c_int,
}

impl PyFrameView {
    unsafe fn resolve(frame: *mut ffi::PyFrameObject) -> Self {
        unsafe {
            let code = getattr(frame.cast(), c"f_code");
            let (filename, name) = if code.is_null() {
                (ptr::null_mut(), ptr::null_mut())
            } else {
                (getattr(code, c"co_filename"), getattr(code, c"co_name"))
            };
            let line = ffi::PyFrame_GetLineNumber(frame);
            Self { code, filename, name, line }
        }
    }
}

impl FrameInfo for PyFrameView {
    fn filename(&self) -> Option<&CStr> {
        unsafe { utf8(self.filename) }
    }

    fn function_name(&self) -> Option<&CStr> {
        unsafe { utf8(self.name) }
    }

    fn line_number(&self) -> LineNumber {
        LineNumber::from(self.line)
    }
}

impl Drop for PyFrameView {
    fn drop(&mut self) {
        unsafe {
            ffi::Py_XDECREF(self.name);
            ffi::Py_XDECREF(self.filename);
            ffi::Py_XDECREF(self.code);
        }
    }
}

/// New reference to `obj.name`, or null with the error cleared
unsafe fn getattr(obj: *mut ffi::PyObject, name: &CStr) -> *mut ffi::PyObject {
    unsafe {
        let attr = ffi::PyObject_GetAttrString(obj, name.as_ptr());
        if attr.is_null() {
            ffi::PyErr_Clear();
        }
        attr
    }
}

unsafe fn utf8<'a>(obj: *mut ffi::PyObject) -> Option<&'a CStr> {
    if obj.is_null() {
        return None;
    }
    unsafe {
        let data = ffi::PyUnicode_AsUTF8AndSize(obj, ptr::null_mut());
        if data.is_null() {
            ffi::PyErr_Clear();
            None
        } else {
            Some(CStr::from_ptr(data))
        }
    }
}

/// Start tracing the current thread
#[pyfunction]
fn start() {
    let mut host = PythonHost;
    if host.install(EventTranslator::native()) {
        debug!("Tracing started");
    }
}

/// Stop tracing the current thread, whoever installed the profile function
#[pyfunction]
fn stop() {
    let mut host = PythonHost;
    host.clear();
    debug!("Tracing stopped");
}

/// Explicit tracing handle
///
/// ```python
/// with pytrace.Tracer():
///     work()
/// ```
#[pyclass(name = "Tracer", module = "pytrace")]
struct PyTracer {
    inner: Tracer<PythonHost>,
}

#[pymethods]
impl PyTracer {
    #[new]
    fn new() -> Self {
        Self { inner: Tracer::new(PythonHost) }
    }

    fn start(&mut self) {
        self.inner.start();
    }

    fn stop(&mut self) {
        self.inner.stop();
    }

    #[getter]
    fn active(&self) -> bool {
        self.inner.is_active()
    }

    fn __enter__(mut slf: PyRefMut<'_, Self>) -> PyRefMut<'_, Self> {
        slf.inner.start();
        slf
    }

    #[pyo3(signature = (_exc_type=None, _exc_value=None, _traceback=None))]
    fn __exit__(
        &mut self,
        _exc_type: Option<&Bound<'_, PyAny>>,
        _exc_value: Option<&Bound<'_, PyAny>>,
        _traceback: Option<&Bound<'_, PyAny>>,
    ) -> bool {
        self.inner.stop();
        false
    }

    fn __repr__(&self) -> String {
        format!("<pytrace.Tracer active={}>", if self.inner.is_active() { "True" } else { "False" })
    }
}

#[pymodule]
fn pytrace(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Another extension may already own the global logger
    let _ = env_logger::try_init();
    m.add_function(wrap_pyfunction!(start, m)?)?;
    m.add_function(wrap_pyfunction!(stop, m)?)?;
    m.add_class::<PyTracer>()?;
    Ok(())
}
