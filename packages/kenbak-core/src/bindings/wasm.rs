//! WASM front-end for the emulator core.

use js_sys::Uint8Array;
use std::panic;
use wasm_bindgen::prelude::*;

use crate::cpu::{Kenbak, StepOutcome};
use crate::host::NullHost;

/// A processor exposed to JS. Pacing is the browser's job (e.g. a
/// `requestAnimationFrame` loop calling `step` repeatedly), so this wraps
/// `step`/`peek`/`poke` rather than `run`, which would block the JS thread.
#[wasm_bindgen]
pub struct KenbakEmulator {
    cpu: Kenbak,
    host: NullHost,
}

#[wasm_bindgen]
impl KenbakEmulator {
    #[wasm_bindgen(constructor)]
    pub fn new(image: &[u8]) -> Result<KenbakEmulator, JsValue> {
        let mut bytes = [0u8; 256];
        if image.len() > bytes.len() {
            return Err(JsValue::from_str(&format!(
                "program image is {} bytes, but memory only holds 256",
                image.len()
            )));
        }
        bytes[..image.len()].copy_from_slice(image);

        let mut cpu = Kenbak::new();
        cpu.load(&bytes);
        Ok(KenbakEmulator {
            cpu,
            host: NullHost,
        })
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Executes one instruction. Returns `true` if the machine halted.
    #[wasm_bindgen]
    pub fn step(&mut self) -> bool {
        matches!(self.cpu.step(&mut self.host), StepOutcome::Halted)
    }

    #[wasm_bindgen]
    pub fn peek(&self, addr: u8) -> u8 {
        self.cpu.peek(addr)
    }

    #[wasm_bindgen]
    pub fn poke(&mut self, addr: u8, value: u8) {
        self.cpu.poke(addr, value);
    }

    /// A snapshot of the whole 256-byte address space, for a debugger view.
    #[wasm_bindgen]
    pub fn dump_memory(&self) -> Uint8Array {
        Uint8Array::from(self.cpu.memory().as_slice())
    }
}

/// Installs a panic hook that reports Rust panics to the JS console instead
/// of a silent abort.
#[wasm_bindgen]
pub fn init_debug_hooks() {
    panic::set_hook(Box::new(console_error_panic_hook::hook));
}
