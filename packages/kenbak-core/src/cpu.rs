//! The fetch/decode/execute loop, tying `decode`, `ops` and `memory`
//! together behind the host↔core API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::decode::{classify, OpClass};
use crate::host::Host;
use crate::memory::{Memory, P_ADDR, PROGRAM_START};
use crate::ops;

/// What a single `step()` accomplished. Callers that only care about "is the
/// machine still running" can match on this without reaching into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continued,
    /// The machine hit a halt opcode, or an opcode that matched no
    /// instruction class (treated identically, per the documented policy).
    Halted,
}

/// A KENBAK-1 processor: the 256-byte memory plus an out-of-band stop flag a
/// host can set from outside the fetch/execute loop.
pub struct Kenbak {
    mem: Memory,
    stop: Arc<AtomicBool>,
}

impl Kenbak {
    pub fn new() -> Kenbak {
        Kenbak {
            mem: Memory::new(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Zeroes memory and sets P to 0.
    pub fn reset(&mut self) {
        self.mem.clear();
        self.mem.set_p(0);
        self.stop.store(false, Ordering::Relaxed);
    }

    /// Loads a 256-byte image verbatim, replacing the entire address space.
    pub fn load(&mut self, image: &[u8; 256]) {
        self.mem.load(image);
    }

    pub fn peek(&self, addr: u8) -> u8 {
        self.mem.read(addr)
    }

    pub fn poke(&mut self, addr: u8, value: u8) {
        self.mem.write(addr, value);
    }

    /// A read-only view of the whole address space, e.g. for a host to dump
    /// state or snapshot a program.
    pub fn memory(&self) -> &[u8; 256] {
        self.mem.as_bytes()
    }

    /// Named register reads, for a host that wants to report "A is 0x08"
    /// without reaching for the raw address constants itself.
    pub fn a(&self) -> u8 {
        self.mem.a()
    }

    pub fn b(&self) -> u8 {
        self.mem.b()
    }

    pub fn x(&self) -> u8 {
        self.mem.x()
    }

    pub fn p(&self) -> u8 {
        self.mem.p()
    }

    pub fn output(&self) -> u8 {
        self.mem.output()
    }

    /// Requests a halt that takes effect at the next loop check, from inside
    /// or outside the running thread.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// A clonable handle to this processor's stop flag, for a host that
    /// wants to request a stop without holding `&Kenbak` (e.g. a signal
    /// handler).
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Sets P to 4 (the reset vector) and executes until halt or a stop
    /// request, from either the processor's own flag or the host's.
    pub fn run(&mut self, host: &mut impl Host) {
        self.mem.set_p(PROGRAM_START);
        log::info!("run: starting at {:#04x}", PROGRAM_START);
        loop {
            if self.stop.load(Ordering::Relaxed) || host.stop_requested() {
                log::info!("run: stop requested at P={:#04x}", self.mem.p());
                break;
            }
            if let StepOutcome::Halted = self.step(host) {
                break;
            }
        }
    }

    /// Executes exactly one instruction from the current P. Intended for
    /// tests and debuggers; `run` is built on top of repeated calls to this.
    pub fn step(&mut self, host: &mut impl Host) -> StepOutcome {
        let p = self.mem.p();
        let opcode = self.mem.read(p);
        self.mem.set_p(p.wrapping_add(1));

        let class = classify(opcode);
        log::debug!("step: P={:#04x} opcode={:#04x} class={:?}", p, opcode, class);

        let outcome = match class {
            OpClass::Halt => {
                log::info!("halt at {:#04x}", p);
                StepOutcome::Halted
            }
            OpClass::NoOp => {
                ops::nop(&mut self.mem);
                StepOutcome::Continued
            }
            OpClass::ShiftRotate => {
                ops::shift_rotate(&mut self.mem, opcode);
                StepOutcome::Continued
            }
            OpClass::SetBit => {
                ops::set_bit(&mut self.mem, opcode);
                StepOutcome::Continued
            }
            OpClass::Skip => {
                ops::skip(&mut self.mem, opcode);
                StepOutcome::Continued
            }
            OpClass::Or => {
                ops::or(&mut self.mem, opcode);
                StepOutcome::Continued
            }
            OpClass::And => {
                ops::and(&mut self.mem, opcode);
                StepOutcome::Continued
            }
            OpClass::LoadComplement => {
                ops::load_complement(&mut self.mem, opcode);
                StepOutcome::Continued
            }
            OpClass::Store => {
                ops::store(&mut self.mem, opcode);
                StepOutcome::Continued
            }
            OpClass::Load => {
                ops::load(&mut self.mem, opcode);
                StepOutcome::Continued
            }
            OpClass::Subtract => {
                ops::sub(&mut self.mem, opcode);
                StepOutcome::Continued
            }
            OpClass::Add => {
                ops::add(&mut self.mem, opcode);
                StepOutcome::Continued
            }
            OpClass::Jump => {
                ops::jump(&mut self.mem, opcode);
                StepOutcome::Continued
            }
        };

        host.throttle();
        outcome
    }
}

impl Default for Kenbak {
    fn default() -> Kenbak {
        Kenbak::new()
    }
}
