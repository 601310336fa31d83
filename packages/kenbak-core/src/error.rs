//! Errors from the layer above the processor: loading a memory image. The
//! fetch/execute loop itself never fails — invalid opcodes, register fields
//! and jump conditions are absorbed into defined machine states (see
//! `ops` and `decode`) rather than surfaced here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KenbakError {
    #[error("program image is {len} bytes, but memory only holds 256")]
    ImageTooLarge { len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
