//! The opcode decode table.
//!
//! Maps each of the 151 documented 6502 opcodes to an (instruction,
//! addressing mode) pair. Opcode `0x02` is deliberately absent: it is
//! reserved by [`crate::kernel`] as the native-hook sentinel and is
//! intercepted by `Cpu::step` before it ever reaches this table. Any other
//! byte not covered here is an undocumented opcode, left unemulated:
//! `decode_opcode` reports it as unrecognised and the run loop halts.

use super::state::{AddressingMode, Instruction};

use AddressingMode::*;
use Instruction::*;

pub fn decode_opcode(opcode: u8) -> Option<(Instruction, AddressingMode)> {
    Some(match opcode {
        0x69 => (ADC, Imm),
        0x65 => (ADC, ZP),
        0x75 => (ADC, ZPX),
        0x6D => (ADC, Abs),
        0x7D => (ADC, AbsX),
        0x79 => (ADC, AbsY),
        0x61 => (ADC, IndX),
        0x71 => (ADC, IndY),

        0x29 => (AND, Imm),
        0x25 => (AND, ZP),
        0x35 => (AND, ZPX),
        0x2D => (AND, Abs),
        0x3D => (AND, AbsX),
        0x39 => (AND, AbsY),
        0x21 => (AND, IndX),
        0x31 => (AND, IndY),

        0x0A => (ASL, Accum),
        0x06 => (ASL, ZP),
        0x16 => (ASL, ZPX),
        0x0E => (ASL, Abs),
        0x1E => (ASL, AbsX),

        0x24 => (BIT, ZP),
        0x2C => (BIT, Abs),

        0x10 => (BPL, Rel),
        0x30 => (BMI, Rel),
        0x50 => (BVC, Rel),
        0x70 => (BVS, Rel),
        0x90 => (BCC, Rel),
        0xB0 => (BCS, Rel),
        0xD0 => (BNE, Rel),
        0xF0 => (BEQ, Rel),

        0x00 => (BRK, Impl),

        0xC9 => (CMP, Imm),
        0xC5 => (CMP, ZP),
        0xD5 => (CMP, ZPX),
        0xCD => (CMP, Abs),
        0xDD => (CMP, AbsX),
        0xD9 => (CMP, AbsY),
        0xC1 => (CMP, IndX),
        0xD1 => (CMP, IndY),

        0xE0 => (CPX, Imm),
        0xE4 => (CPX, ZP),
        0xEC => (CPX, Abs),

        0xC0 => (CPY, Imm),
        0xC4 => (CPY, ZP),
        0xCC => (CPY, Abs),

        0xC6 => (DEC, ZP),
        0xD6 => (DEC, ZPX),
        0xCE => (DEC, Abs),
        0xDE => (DEC, AbsX),

        0x49 => (EOR, Imm),
        0x45 => (EOR, ZP),
        0x55 => (EOR, ZPX),
        0x4D => (EOR, Abs),
        0x5D => (EOR, AbsX),
        0x59 => (EOR, AbsY),
        0x41 => (EOR, IndX),
        0x51 => (EOR, IndY),

        0x18 => (CLC, Impl),
        0x38 => (SEC, Impl),
        0x58 => (CLI, Impl),
        0x78 => (SEI, Impl),
        0xB8 => (CLV, Impl),
        0xD8 => (CLD, Impl),
        0xF8 => (SED, Impl),

        0xE6 => (INC, ZP),
        0xF6 => (INC, ZPX),
        0xEE => (INC, Abs),
        0xFE => (INC, AbsX),

        0x4C => (JMP, Abs),
        0x6C => (JMP, AbsInd),
        0x20 => (JSR, Abs),

        0xA9 => (LDA, Imm),
        0xA5 => (LDA, ZP),
        0xB5 => (LDA, ZPX),
        0xAD => (LDA, Abs),
        0xBD => (LDA, AbsX),
        0xB9 => (LDA, AbsY),
        0xA1 => (LDA, IndX),
        0xB1 => (LDA, IndY),

        0xA2 => (LDX, Imm),
        0xA6 => (LDX, ZP),
        0xB6 => (LDX, ZPY),
        0xAE => (LDX, Abs),
        0xBE => (LDX, AbsY),

        0xA0 => (LDY, Imm),
        0xA4 => (LDY, ZP),
        0xB4 => (LDY, ZPX),
        0xAC => (LDY, Abs),
        0xBC => (LDY, AbsX),

        0x4A => (LSR, Accum),
        0x46 => (LSR, ZP),
        0x56 => (LSR, ZPX),
        0x4E => (LSR, Abs),
        0x5E => (LSR, AbsX),

        0xEA => (NOP, Impl),

        0x09 => (ORA, Imm),
        0x05 => (ORA, ZP),
        0x15 => (ORA, ZPX),
        0x0D => (ORA, Abs),
        0x1D => (ORA, AbsX),
        0x19 => (ORA, AbsY),
        0x01 => (ORA, IndX),
        0x11 => (ORA, IndY),

        0x48 => (PHA, Impl),
        0x08 => (PHP, Impl),
        0x68 => (PLA, Impl),
        0x28 => (PLP, Impl),

        0x2A => (ROL, Accum),
        0x26 => (ROL, ZP),
        0x36 => (ROL, ZPX),
        0x2E => (ROL, Abs),
        0x3E => (ROL, AbsX),

        0x6A => (ROR, Accum),
        0x66 => (ROR, ZP),
        0x76 => (ROR, ZPX),
        0x6E => (ROR, Abs),
        0x7E => (ROR, AbsX),

        0x40 => (RTI, Impl),
        0x60 => (RTS, Impl),

        0xE9 => (SBC, Imm),
        0xE5 => (SBC, ZP),
        0xF5 => (SBC, ZPX),
        0xED => (SBC, Abs),
        0xFD => (SBC, AbsX),
        0xF9 => (SBC, AbsY),
        0xE1 => (SBC, IndX),
        0xF1 => (SBC, IndY),

        0x85 => (STA, ZP),
        0x95 => (STA, ZPX),
        0x8D => (STA, Abs),
        0x9D => (STA, AbsX),
        0x99 => (STA, AbsY),
        0x81 => (STA, IndX),
        0x91 => (STA, IndY),

        0x86 => (STX, ZP),
        0x96 => (STX, ZPY),
        0x8E => (STX, Abs),

        0x84 => (STY, ZP),
        0x94 => (STY, ZPX),
        0x8C => (STY, Abs),

        0xAA => (TAX, Impl),
        0x8A => (TXA, Impl),
        0xCA => (DEX, Impl),
        0xE8 => (INX, Impl),
        0xA8 => (TAY, Impl),
        0x98 => (TYA, Impl),
        0x88 => (DEY, Impl),
        0xC8 => (INY, Impl),

        0x9A => (TXS, Impl),
        0xBA => (TSX, Impl),

        _ => return None,
    })
}
