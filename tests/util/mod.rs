//! Shared black-box test helpers: an in-memory file store and a
//! `type_str` helper that feeds a string through the PIA key FIFO one
//! byte at a time, mirroring the teacher's `tests/util/provider.rs`
//! helper-module convention.

use monitor65::filestore::InMemoryFileStore;
use monitor65::kernel::rom_image;
use monitor65::Machine;

/// Boot a `Machine` on the synthesized native kernel with an empty file
/// store, ready for a scenario to drive through the monitor.
pub fn booted_machine() -> Machine {
    let mut machine = Machine::new(Box::new(InMemoryFileStore::new()));
    machine
        .power_on(&rom_image::synthesized())
        .expect("synthesized ROM must power on cleanly");
    machine
}

/// Type `s` into the keyboard FIFO one byte at a time, running the
/// machine one step between each key so the monitor loop drains it
/// before the next arrives.
pub fn type_str(machine: &mut Machine, s: &str) {
    for &b in s.as_bytes() {
        machine.cpu.bus.pia_mut().enqueue_key(b);
        machine.run(1);
    }
}

pub fn screen_text(machine: &Machine) -> String {
    use monitor65::devices::screen::{COLUMNS, ROWS};
    let screen = machine.cpu.bus.screen();
    let mut out = String::with_capacity(COLUMNS * ROWS);
    for row in 0..ROWS as u8 {
        for col in 0..COLUMNS as u8 {
            out.push(screen.char_at(col, row) as char);
        }
    }
    out
}
