//! Synthesizes the 4096-byte ROM image (`CODE`/`JUMPS`/`VECS`) that backs
//! the native kernel. The monitor is reimplemented in Rust rather than
//! assembled, but the ROM it appears to live in is still byte-exact:
//! `JUMPS` holds six real `JMP abs` opcodes, `CODE` is real 6502 NOPs
//! apart from a handful of hook addresses, and `VECS` points at the hooks
//! that give the reset, NMI, and IRQ vectors somewhere sane to land.

use super::hooks::*;
use crate::devices::cpu::HOOK_SENTINEL;
use crate::rom::{RomImage, CODE, JUMPS, VECS};

/// Real NOP (`0xEA`); fills every CODE byte that isn't a hook.
const NOP: u8 = 0xEA;
/// Real `JMP abs`; used to build the six entries of the jump table.
const JMP_ABS: u8 = 0x4C;

const CODE_START: u16 = 0xF000;
const CODE_SIZE: usize = 0x0F00;
const JUMPS_START: u16 = 0xFF00;
const VECS_START: u16 = 0xFFFA;

/// The six jump-table entries, in `$FF00`-ascending order.
const JUMP_TARGETS: [u16; 6] = [
    HOOK_PRINT_CHAR,
    HOOK_PRINT_STR,
    HOOK_NEWLINE,
    HOOK_WAIT_KEY,
    HOOK_CLEAR,
    HOOK_RAND,
];

/// Hook addresses that must be marked with [`HOOK_SENTINEL`] inside the
/// synthesized CODE segment.
const HOOK_ADDRS: [u16; 8] = [
    HOOK_PRINT_CHAR,
    HOOK_PRINT_STR,
    HOOK_NEWLINE,
    HOOK_WAIT_KEY,
    HOOK_CLEAR,
    HOOK_RAND,
    HOOK_NMI_STUB,
    HOOK_MONITOR_LOOP,
];

/// Build the synthesized kernel ROM: a real `CODE`/`JUMPS`/`VECS` layout
/// with the monitor's native hook routines standing in for 6502 machine
/// code.
pub fn synthesized() -> RomImage {
    let mut code = vec![NOP; CODE_SIZE];
    for &addr in &HOOK_ADDRS {
        code[usize::from(addr - CODE_START)] = HOOK_SENTINEL;
    }

    let mut jumps = Vec::with_capacity(18);
    for target in JUMP_TARGETS {
        jumps.push(JMP_ABS);
        jumps.extend_from_slice(&target.to_le_bytes());
    }

    let mut vecs = Vec::with_capacity(6);
    vecs.extend_from_slice(&HOOK_NMI_STUB.to_le_bytes());
    vecs.extend_from_slice(&HOOK_MONITOR_LOOP.to_le_bytes());
    vecs.extend_from_slice(&HOOK_NMI_STUB.to_le_bytes());

    RomImage::from_segments(vec![
        (CODE, CODE_START, code),
        (JUMPS, JUMPS_START, jumps),
        (VECS, VECS_START, vecs),
    ])
}
