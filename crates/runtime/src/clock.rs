//! Cooperative cancellation and pacing between simulation ticks.
//!
//! The engine keeps its own logical clock. What happens between two ticks is decided by a [TickDelay]:
//! tests and batch experiments use [NoDelay], interactive runs use [RealTimeDelay].

use std::{
    sync::{Arc, Condvar, Mutex, PoisonError},
    time::Duration,
};

/// A flag any thread can raise to ask running simulations to stop at the next tick boundary.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        let (stopped, condvar) = &*self.inner;
        *stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        condvar.notify_all();
    }

    pub fn is_requested(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `timeout` or until a stop is requested. Returns whether a stop was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (stopped, condvar) = &*self.inner;
        let guard = stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = condvar
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Wait performed between two ticks of `interval` logical time units.
pub trait TickDelay: Send {
    fn wait(&mut self, interval: f64, stop: &StopSignal);
}

/// Advance the logical clock without waiting.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelay;

impl TickDelay for NoDelay {
    fn wait(&mut self, _interval: f64, _stop: &StopSignal) {}
}

/// Wait `interval * seconds_per_unit` seconds of wall time, returning early on stop.
#[derive(Clone, Copy, Debug)]
pub struct RealTimeDelay {
    seconds_per_unit: f64,
}

impl RealTimeDelay {
    pub fn new(seconds_per_unit: f64) -> Self {
        Self { seconds_per_unit }
    }
}

impl TickDelay for RealTimeDelay {
    fn wait(&mut self, interval: f64, stop: &StopSignal) {
        let timeout = Duration::try_from_secs_f64(interval * self.seconds_per_unit).unwrap_or(Duration::ZERO);
        stop.wait_timeout(timeout);
    }
}
