//! The contract a caller of [`crate::cpu::Kenbak`] must satisfy: a way to ask
//! for an early stop, and a way to pace instruction throughput.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Consumed once per instruction by the fetch/execute loop.
pub trait Host {
    /// Checked at the top of the loop, before fetching the next opcode.
    fn stop_requested(&self) -> bool;

    /// Called once per instruction, after dispatch. Advisory only; it never
    /// affects program-observable state.
    fn throttle(&mut self);
}

/// Never stops on its own and never sleeps. Used by `step()`-driven callers
/// and by tests, where a real host isn't in the loop.
#[derive(Debug, Default)]
pub struct NullHost;

impl Host for NullHost {
    fn stop_requested(&self) -> bool {
        false
    }

    fn throttle(&mut self) {}
}

/// Paces execution to roughly the KENBAK-1's historical throughput
/// (~1000 instructions/sec) and honors an externally-settable stop flag, so
/// a terminal host can wire a Ctrl-C handler or a "stop" button to
/// [`RealTimeHost::stop_handle`] without holding a `&mut` reference into the
/// running loop.
pub struct RealTimeHost {
    stop: Arc<AtomicBool>,
    period: Duration,
}

impl RealTimeHost {
    pub fn new() -> RealTimeHost {
        RealTimeHost {
            stop: Arc::new(AtomicBool::new(false)),
            period: Duration::from_millis(1),
        }
    }

    /// A clonable handle an external signal handler can use to request a
    /// stop without touching the host itself.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }
}

impl Default for RealTimeHost {
    fn default() -> RealTimeHost {
        RealTimeHost::new()
    }
}

impl Host for RealTimeHost {
    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn throttle(&mut self) {
        std::thread::sleep(self.period);
    }
}
