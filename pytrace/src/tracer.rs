//! # Tracing Control Surface
//!
//! [`Tracer`] is the explicit handle an embedding program uses to start and
//! stop tracing. It owns a [`ProfileHost`], the seam to the interpreter's
//! profiling-callback slot, and the [`ProbeSink`] the installed translator
//! forwards to.
//!
//! ## State Machine
//!
//! ```text
//!            start (installs translator)
//!   Inactive ───────────────────────────▶ Active ──┐ start (re-registers,
//!      ▲                                    │  ◀───┘  last one wins)
//!      └──────────── stop (clears) ─────────┘
//! ```
//!
//! A tracer is only active while the host still holds its translator. Once
//! another registration replaces it (or the slot is cleared behind its
//! back) the tracer reports [`TracerState::Inactive`], and `stop` leaves the
//! host slot untouched, so it cannot clobber a profiler somebody else
//! installed.

use log::{debug, warn};
use std::sync::Arc;

use crate::probes::{NativeProbes, ProbeSink};
use crate::translator::{EventTranslator, Registration};

/// The host runtime's profiling-callback slot
///
/// The slot holds at most one translator. Installing replaces whatever was
/// registered before and must drop the replaced translator; clearing an
/// empty slot is harmless.
pub trait ProfileHost {
    /// Returns false if the host could not take the translator
    fn install(&mut self, translator: EventTranslator) -> bool;
    fn clear(&mut self);
}

/// Whether a [`Tracer`] currently has its translator installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracerState {
    #[default]
    Inactive,
    Active,
}

pub struct Tracer<H: ProfileHost> {
    host: H,
    sink: Arc<dyn ProbeSink>,
    registration: Option<Registration>,
}

impl<H: ProfileHost> Tracer<H> {
    /// Tracer firing the exported attachment points
    pub fn new(host: H) -> Self {
        Self::with_sink(host, Arc::new(NativeProbes))
    }

    pub fn with_sink(host: H, sink: Arc<dyn ProbeSink>) -> Self {
        Self { host, sink, registration: None }
    }

    /// Install the translator as the host's profiling callback
    pub fn start(&mut self) {
        if self.is_active() {
            debug!("Tracer already active, re-registering translator");
        }
        let translator = EventTranslator::new(Arc::clone(&self.sink));
        let registration = translator.registration();
        if self.host.install(translator) {
            self.registration = Some(registration);
            debug!("Tracing started");
        } else {
            warn!("Host rejected the translator, tracing state unchanged");
        }
    }

    /// Remove this tracer's translator; a no-op when it is not installed
    pub fn stop(&mut self) {
        match self.registration.take() {
            Some(registration) if registration.is_live() => {
                self.host.clear();
                debug!("Tracing stopped");
            }
            Some(_) => debug!("Translator already replaced, leaving host slot alone"),
            None => debug!("Tracer not active, nothing to stop"),
        }
    }

    #[must_use]
    pub fn state(&self) -> TracerState {
        match &self.registration {
            Some(registration) if registration.is_live() => TracerState::Active,
            _ => TracerState::Inactive,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == TracerState::Active
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: ProfileHost + std::fmt::Debug> std::fmt::Debug for Tracer<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("host", &self.host)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct CountingHost {
        slot: Option<EventTranslator>,
        installs: usize,
        clears: usize,
        reject: bool,
    }

    impl ProfileHost for CountingHost {
        fn install(&mut self, translator: EventTranslator) -> bool {
            if self.reject {
                return false;
            }
            self.slot = Some(translator);
            self.installs += 1;
            true
        }

        fn clear(&mut self) {
            self.slot = None;
            self.clears += 1;
        }
    }

    #[test]
    fn test_start_stop_transitions() {
        let mut tracer = Tracer::new(CountingHost::default());
        assert_eq!(tracer.state(), TracerState::Inactive);

        tracer.start();
        assert!(tracer.is_active());
        assert!(tracer.host().slot.is_some());

        tracer.stop();
        assert_eq!(tracer.state(), TracerState::Inactive);
        assert!(tracer.host().slot.is_none());
    }

    #[test]
    fn test_start_twice_reregisters() {
        let mut tracer = Tracer::new(CountingHost::default());
        tracer.start();
        tracer.start();

        assert!(tracer.is_active());
        assert_eq!(tracer.host().installs, 2);
        assert!(tracer.host().slot.is_some());
    }

    #[test]
    fn test_stop_while_inactive_leaves_host_alone() {
        let mut tracer = Tracer::new(CountingHost::default());
        tracer.stop();
        tracer.stop();

        assert_eq!(tracer.state(), TracerState::Inactive);
        assert_eq!(tracer.host().clears, 0);
    }

    #[test]
    fn test_rejected_install_stays_inactive() {
        let mut tracer = Tracer::new(CountingHost { reject: true, ..CountingHost::default() });
        tracer.start();

        assert_eq!(tracer.state(), TracerState::Inactive);
        tracer.stop();
        assert_eq!(tracer.host().clears, 0);
    }

    #[test]
    fn test_cleared_behind_back_reports_inactive() {
        let mut tracer = Tracer::new(CountingHost::default());
        tracer.start();
        tracer.host.clear();

        assert_eq!(tracer.state(), TracerState::Inactive);
        tracer.stop();
        assert_eq!(tracer.host().clears, 1);
    }
}
