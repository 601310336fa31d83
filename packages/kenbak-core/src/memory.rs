//! The KENBAK-1's memory: a flat 256-byte array that doubles as the
//! register file and the I/O ports. There is no separate register bank —
//! every architectural register is an ordinary memory cell, and the
//! processor never caches one across an instruction boundary.

/// Address of the A accumulator.
pub const A_ADDR: u8 = 0x00;
/// Address of the B register.
pub const B_ADDR: u8 = 0x01;
/// Address of the X index register.
pub const X_ADDR: u8 = 0x02;
/// Address of the program counter.
pub const P_ADDR: u8 = 0x03;
/// First byte of program code by convention; the reset vector for `run()`.
pub const PROGRAM_START: u8 = 0x04;
/// Address the host reads to observe the machine's output lamps.
pub const OUTPUT_ADDR: u8 = 0x80;
/// Address the host writes to deliver input bits.
pub const INPUT_ADDR: u8 = 0xFF;

/// Overflow bit (bit 0) and carry bit (bit 1) within a register's flag cell.
pub const OVERFLOW_BIT: u8 = 0;
pub const CARRY_BIT: u8 = 1;

bitflags! {
    /// The two architecturally meaningful bits of a register's flag cell.
    /// Other bits of the cell are unused by any instruction but are
    /// preserved byte-for-byte across reads and writes regardless.
    pub struct Flags: u8 {
        const OVERFLOW = 1 << OVERFLOW_BIT;
        const CARRY = 1 << CARRY_BIT;
    }
}

/// Given a register's own address (0, 1 or 2), returns the address of its
/// carry/overflow flag cell (0x81, 0x82, 0x83 respectively).
///
/// This embeds the A/B/X ordering at addresses 0-2 into the flag cell
/// addresses; it's load-bearing for binary compatibility with the original
/// machine and must not be "cleaned up" into a lookup table that reorders it.
pub fn flag_addr(register_addr: u8) -> u8 {
    register_addr + 0x81
}

/// The flat, single-owner 256-byte address space of a KENBAK-1.
#[derive(Clone)]
pub struct Memory {
    cells: [u8; 256],
}

impl Memory {
    /// A freshly zeroed 256-byte memory, as at machine reset.
    pub fn new() -> Memory {
        Memory { cells: [0u8; 256] }
    }

    pub fn read(&self, addr: u8) -> u8 {
        self.cells[addr as usize]
    }

    pub fn write(&mut self, addr: u8, value: u8) {
        self.cells[addr as usize] = value;
    }

    /// Zeroes every cell. Used by `reset()`; does not touch the program
    /// counter itself, since P is cell 3 and is zeroed along with everything
    /// else.
    pub fn clear(&mut self) {
        self.cells = [0u8; 256];
    }

    /// A read-only view of the whole image, e.g. for a host to dump state.
    pub fn as_bytes(&self) -> &[u8; 256] {
        &self.cells
    }

    /// Overwrites the whole image at once, e.g. when a host loads a program.
    pub fn load(&mut self, image: &[u8; 256]) {
        self.cells = *image;
    }

    /// Named accessors for the architectural registers, built on `read`/
    /// `write`. These carry no semantics beyond the address table above —
    /// they exist so callers that mean "the A register" can say so instead
    /// of spelling out `A_ADDR` at every call site.
    pub fn a(&self) -> u8 {
        self.read(A_ADDR)
    }

    pub fn set_a(&mut self, value: u8) {
        self.write(A_ADDR, value);
    }

    pub fn b(&self) -> u8 {
        self.read(B_ADDR)
    }

    pub fn set_b(&mut self, value: u8) {
        self.write(B_ADDR, value);
    }

    pub fn x(&self) -> u8 {
        self.read(X_ADDR)
    }

    pub fn set_x(&mut self, value: u8) {
        self.write(X_ADDR, value);
    }

    pub fn p(&self) -> u8 {
        self.read(P_ADDR)
    }

    pub fn set_p(&mut self, value: u8) {
        self.write(P_ADDR, value);
    }

    pub fn output(&self) -> u8 {
        self.read(OUTPUT_ADDR)
    }

    pub fn set_output(&mut self, value: u8) {
        self.write(OUTPUT_ADDR, value);
    }

    pub fn input(&self) -> u8 {
        self.read(INPUT_ADDR)
    }

    pub fn set_input(&mut self, value: u8) {
        self.write(INPUT_ADDR, value);
    }

    /// The carry/overflow flags for the register at `register_addr` (one of
    /// `A_ADDR`/`B_ADDR`/`X_ADDR`), read through `flag_addr`.
    pub fn flags(&self, register_addr: u8) -> Flags {
        Flags::from_bits_truncate(self.read(flag_addr(register_addr)))
    }

    pub fn set_flags(&mut self, register_addr: u8, flags: Flags) {
        self.write(flag_addr(register_addr), flags.bits());
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}
