#[macro_use]
extern crate bitflags;

pub mod bindings;
pub mod bits;
pub mod cpu;
pub mod decode;
pub mod error;
pub mod host;
pub mod memory;
pub mod operand;
pub mod ops;

pub use cpu::{Kenbak, StepOutcome};
pub use error::KenbakError;
pub use host::{Host, NullHost, RealTimeHost};
