//! Operation handlers: one function per [`OpClass`](crate::decode::OpClass).
//!
//! Each handler owns the whole instruction, including reading its operand
//! byte(s) and advancing P past them — this mirrors how
//! `original_source/processor.c` structures its handlers, each indexing
//! `PROGRAM_COUNTER_VALUE` directly rather than having a caller pass operands
//! in. `cpu::Kenbak::step` only fetches the opcode byte and dispatches; P's
//! movement past that point is each handler's responsibility.

use crate::decode::{
    addressing_mode, bit_test_fields, jump_fields, jump_register, register_select,
    shift_rotate_fields, Register,
};
use crate::memory::{flag_addr, Flags, Memory, P_ADDR};
use crate::operand::{effective_address, effective_value};

/// Reads the byte P points to and advances P by one. Used by every
/// operand-bearing instruction to fetch its operand.
fn read_operand(mem: &mut Memory) -> u8 {
    let p = mem.read(P_ADDR);
    let operand = mem.read(p);
    mem.write(P_ADDR, p.wrapping_add(1));
    operand
}

/// `ADD`: `reg += value`; carry/overflow on the register's flag cell reflect
/// the 9-bit sum of the pre-state register and the fetched value.
pub fn add(mem: &mut Memory, opcode: u8) {
    let reg = register_select(opcode).addr();
    let mode = addressing_mode(opcode);
    let operand = read_operand(mem);
    let value = effective_value(mem, mode, operand);

    let before = mem.read(reg);
    let sum = u16::from(before) + u16::from(value);

    mem.write(reg, before.wrapping_add(value));

    let flags_addr = flag_addr(reg);
    let mut flags = Flags::from_bits_truncate(mem.read(flags_addr));
    flags.set(Flags::CARRY, sum > 0xFF);
    flags.set(Flags::OVERFLOW, sum > 0x7F);
    mem.write(flags_addr, flags.bits());
}

/// `SUB`: `reg -= value`. The carry/overflow computation reuses the same
/// `reg + value` sum the original firmware used, even though the operation
/// performed is subtraction — so the flags after a subtract do not mean what
/// their names suggest. This is a faithfully preserved quirk, not a bug to
/// fix here.
pub fn sub(mem: &mut Memory, opcode: u8) {
    let reg = register_select(opcode).addr();
    let mode = addressing_mode(opcode);
    let operand = read_operand(mem);
    let value = effective_value(mem, mode, operand);

    let before = mem.read(reg);
    let sum = u16::from(before) + u16::from(value);

    mem.write(reg, before.wrapping_sub(value));

    log::debug!(
        "sub: flags computed from {before:#04x} + {value:#04x}, not the subtraction actually performed"
    );

    let flags_addr = flag_addr(reg);
    let mut flags = Flags::from_bits_truncate(mem.read(flags_addr));
    flags.set(Flags::CARRY, sum > 0xFF);
    flags.set(Flags::OVERFLOW, sum > 0x7F);
    mem.write(flags_addr, flags.bits());
}

/// `LOAD`: `reg ← value`.
pub fn load(mem: &mut Memory, opcode: u8) {
    let reg = register_select(opcode).addr();
    let mode = addressing_mode(opcode);
    let operand = read_operand(mem);
    let value = effective_value(mem, mode, operand);
    mem.write(reg, value);
}

/// `STORE`: `memory[effective_address] ← reg`.
pub fn store(mem: &mut Memory, opcode: u8) {
    let reg = register_select(opcode).addr();
    let mode = addressing_mode(opcode);
    let operand = read_operand(mem);
    let addr = effective_address(mem, mode, operand);
    let value = mem.read(reg);
    mem.write(addr, value);
}

/// `AND`: `A &= value`. Always operates on A regardless of the register
/// field, which this class repurposes as part of the opcode's top bits.
pub fn and(mem: &mut Memory, opcode: u8) {
    let mode = addressing_mode(opcode);
    let operand = read_operand(mem);
    let value = effective_value(mem, mode, operand);
    let a = mem.read(Register::A.addr());
    mem.write(Register::A.addr(), a & value);
}

/// `OR`: `A |= value`.
pub fn or(mem: &mut Memory, opcode: u8) {
    let mode = addressing_mode(opcode);
    let operand = read_operand(mem);
    let value = effective_value(mem, mode, operand);
    let a = mem.read(Register::A.addr());
    mem.write(Register::A.addr(), a | value);
}

/// `LOAD COMPLEMENT`: `A ← 0 - value` (two's-complement negation, mod 256).
pub fn load_complement(mem: &mut Memory, opcode: u8) {
    let mode = addressing_mode(opcode);
    let operand = read_operand(mem);
    let value = effective_value(mem, mode, operand);
    mem.write(Register::A.addr(), 0u8.wrapping_sub(value));
}

/// `JUMP`, with the mark-and-link and indirect variants. If the condition
/// doesn't hold, P is simply left at the byte after the operand (the
/// `read_operand` advance already did that).
pub fn jump(mem: &mut Memory, opcode: u8) {
    let pre_operand_p = mem.read(P_ADDR);
    let operand = read_operand(mem);
    let fields = jump_fields(opcode);

    let condition = match fields.condition {
        Some(c) => c,
        None => {
            log::warn!("opcode {opcode:#04x} has an invalid jump condition field; treating as no-op");
            return;
        }
    };

    let reg_value = match jump_register(opcode) {
        Some(r) => mem.read(r.addr()),
        None => 0,
    };

    if !condition.holds(reg_value) {
        return;
    }

    let mut target = if fields.indirect { mem.read(operand) } else { operand };

    if fields.mark_link {
        mem.write(target, pre_operand_p);
        target = target.wrapping_add(1);
    }

    mem.write(P_ADDR, target);
}

/// `SKIP`: tests a bit of `memory[operand]` directly (not through an
/// addressing mode — skip/set-bit only ever address memory directly). On a
/// match, P advances two bytes past where it already stands, skipping the
/// two-byte instruction that follows.
pub fn skip(mem: &mut Memory, opcode: u8) {
    let fields = bit_test_fields(opcode);
    let operand = read_operand(mem);
    let bit = crate::bits::get_bit(mem.read(operand), fields.bit_index);
    let matched = if fields.polarity_one { bit == 1 } else { bit == 0 };
    if matched {
        let p = mem.read(P_ADDR);
        mem.write(P_ADDR, p.wrapping_add(2));
    }
}

/// `SET-BIT`: sets or clears a bit of `memory[operand]` directly.
pub fn set_bit(mem: &mut Memory, opcode: u8) {
    let fields = bit_test_fields(opcode);
    let operand = read_operand(mem);
    let mut cell = mem.read(operand);
    crate::bits::set_bit(&mut cell, fields.bit_index, fields.polarity_one as u8);
    mem.write(operand, cell);
}

/// `SHIFT`/`ROTATE`: a one-byte instruction operating directly on register A
/// or B's cell, in place. Flags are not affected.
pub fn shift_rotate(mem: &mut Memory, opcode: u8) {
    let fields = shift_rotate_fields(opcode);
    let addr = fields.register.addr();
    let v = mem.read(addr);
    let result = match (fields.left, fields.rotate) {
        (true, false) => v.wrapping_shl(u32::from(fields.places)),
        (false, false) => v.wrapping_shr(u32::from(fields.places)),
        (true, true) => crate::bits::rotate_left(v, fields.places),
        (false, true) => crate::bits::rotate_right(v, fields.places),
    };
    mem.write(addr, result);
}

/// `NOP`: a two-byte instruction whose second byte is ignored.
pub fn nop(mem: &mut Memory) {
    let p = mem.read(P_ADDR);
    mem.write(P_ADDR, p.wrapping_add(1));
}
