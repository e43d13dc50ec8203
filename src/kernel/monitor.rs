//! The interactive command-line monitor: the externally observable
//! behaviour of the ROM-resident kernel's `W`/`R`/`G`/`L`/`F`/`M`/`K`/`S`/
//! `Z`/`T`/`H` command surface.
//!
//! This is ticked once per call to [`Monitor::tick`], from the
//! `HOOK_MONITOR_LOOP` native hook. It never itself decides to "return"
//! to a caller: the monitor's own command loop never returns. A command
//! line is assembled a key at a time as the PIA's key FIFO is drained,
//! and dispatched once Enter (`0x0D`) arrives.

use super::editor::ScreenEditor;
use crate::devices::bus::{Bus, PIA_START};
use crate::devices::pia::reg;

/// Scratch buffer the monitor stages a requested filename into before
/// arming a PIA file-load request. `L:` is the only command that writes
/// here; nothing else in the kernel contract claims this address.
const FILENAME_SCRATCH: u16 = 0x0200;
const FILENAME_SCRATCH_CAP: usize = 64;

const ENTER: u8 = 0x0D;
const BACKSPACE: u8 = 0x08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Awaiting a new `letter:args` command line.
    Command,
    /// `W:AAAA` armed with no inline byte; the next non-command line is a
    /// whitespace-separated byte list written starting at `write_addr`.
    Write,
    /// `L:AAAA` armed; the next non-command line is the filename.
    Load,
}

/// What the monitor asked the machine to do in response to one [`Monitor::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No machine-level side effect beyond what `tick` already applied to
    /// the bus (screen/PIA writes).
    None,
    /// `G:AAAA`: yield control to user code at `AAAA`. The caller is
    /// responsible for pushing a return address and setting `pc`.
    Jump(u16),
}

pub struct Monitor {
    editor: ScreenEditor,
    mode: Mode,
    line: Vec<u8>,
    /// The address shown in the `AAAA>` prompt; also the anchor most
    /// commands leave behind for `T:`.
    target: u16,
    write_addr: u16,
    load_target: u16,
    awaiting_file: bool,
    greeted: bool,
}

impl Monitor {
    pub fn new() -> Monitor {
        Monitor {
            editor: ScreenEditor::new(),
            mode: Mode::Command,
            line: Vec::new(),
            target: 0,
            write_addr: 0,
            load_target: 0,
            awaiting_file: false,
            greeted: false,
        }
    }

    /// Advance one tick: print the boot banner on the very first call,
    /// report a completed file load if one is pending, then consume at
    /// most one key from the PIA FIFO.
    pub fn tick(&mut self, bus: &mut Bus) -> Action {
        if !self.greeted {
            self.println(bus, "6502 MONITOR V1.0");
            self.print_prompt(bus);
            self.greeted = true;
        }
        self.maybe_report_file_result(bus);

        if !bus.pia().key_ready() {
            return Action::None;
        }
        let key = bus.read(PIA_START + reg::KEY_DATA);
        if key == BACKSPACE {
            if self.line.pop().is_some() {
                self.editor.backspace(bus);
            }
            return Action::None;
        }

        self.editor.print_char(bus, key);
        if key == ENTER {
            let line = std::mem::take(&mut self.line);
            return self.process_line(bus, &line);
        }
        self.line.push(key);
        Action::None
    }

    fn println(&mut self, bus: &mut Bus, text: &str) {
        self.editor.print_str(bus, text.as_bytes());
        self.editor.newline(bus);
    }

    fn print_prompt(&mut self, bus: &mut Bus) {
        let text = format!("{:04X}>", self.target);
        self.println(bus, &text);
    }

    fn print_error(&mut self, bus: &mut Bus, msg: &str) {
        self.println(bus, msg);
    }

    fn looks_like_command(trimmed: &str) -> bool {
        let mut chars = trimmed.chars();
        matches!((chars.next(), chars.next()), (Some(c), Some(':')) if c.is_ascii_alphabetic())
    }

    fn process_line(&mut self, bus: &mut Bus, line: &[u8]) -> Action {
        let text = String::from_utf8_lossy(line);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.print_prompt(bus);
            return Action::None;
        }

        if Self::looks_like_command(trimmed) {
            let letter = trimmed.chars().next().unwrap().to_ascii_uppercase();
            let args = trimmed[1..].trim_start_matches(':').trim();
            let action = self.dispatch(bus, letter, args);
            if action == Action::None {
                self.print_prompt(bus);
            }
            return action;
        }

        match self.mode {
            Mode::Write => {
                self.cmd_write_continuation(bus, trimmed);
                self.print_prompt(bus);
            }
            Mode::Load => {
                self.cmd_load_filename(bus, trimmed);
                // No prompt yet: we're waiting on the file service.
            }
            Mode::Command => {
                self.print_error(bus, "?");
                self.print_prompt(bus);
            }
        }
        Action::None
    }

    fn dispatch(&mut self, bus: &mut Bus, letter: char, args: &str) -> Action {
        match letter {
            'W' => {
                self.cmd_write(bus, args);
                Action::None
            }
            'R' => {
                self.cmd_read(bus, args);
                Action::None
            }
            'G' => self.cmd_go(bus, args),
            'L' => {
                self.cmd_load(bus, args);
                Action::None
            }
            'F' => {
                self.cmd_fill(bus, args);
                Action::None
            }
            'M' => {
                self.cmd_copy_move(bus, args);
                Action::None
            }
            'K' => {
                self.mode = Mode::Command;
                self.editor.clear(bus);
                Action::None
            }
            'S' => {
                self.cmd_dump(bus, 0x0100);
                Action::None
            }
            'Z' => {
                self.cmd_dump(bus, 0x0000);
                Action::None
            }
            'T' => {
                let byte = bus.read(self.target);
                let msg = format!("{:04X}: {:02X}", self.target, byte);
                self.println(bus, &msg);
                Action::None
            }
            'H' => {
                self.cmd_help(bus);
                Action::None
            }
            'X' => {
                self.mode = Mode::Command;
                Action::None
            }
            _ => {
                self.print_error(bus, "?CMD");
                Action::None
            }
        }
    }

    fn cmd_write(&mut self, bus: &mut Bus, args: &str) {
        let mut parts = args.split_whitespace();
        let Some(addr) = parts.next().and_then(parse_hex_u16) else {
            self.print_error(bus, "?ADDR");
            return;
        };
        self.target = addr;
        let rest: Vec<&str> = parts.collect();
        if rest.is_empty() {
            self.mode = Mode::Write;
            self.write_addr = addr;
            let cur = bus.read(addr);
            let msg = format!("{:04X}: {:02X}", addr, cur);
            self.println(bus, &msg);
        } else {
            self.mode = Mode::Command;
            self.apply_write_line(bus, addr, &rest);
        }
    }

    fn cmd_write_continuation(&mut self, bus: &mut Bus, line: &str) {
        let values: Vec<&str> = line.split_whitespace().collect();
        if values.is_empty() {
            return;
        }
        self.apply_write_line(bus, self.write_addr, &values);
    }

    fn apply_write_line(&mut self, bus: &mut Bus, start: u16, byte_strs: &[&str]) {
        let mut bytes = Vec::with_capacity(byte_strs.len());
        for s in byte_strs {
            let Some(b) = parse_hex_u8(s) else {
                self.print_error(bus, "?BYTE");
                return;
            };
            bytes.push(b);
        }
        let old: Vec<u8> = (0..bytes.len() as u16)
            .map(|i| bus.read(start.wrapping_add(i)))
            .collect();
        self.println(bus, &format_hex_line(start, &old));
        for (i, &b) in bytes.iter().enumerate() {
            bus.write(start.wrapping_add(i as u16), b);
        }
        self.println(bus, &format_hex_line(start, &bytes));
        self.write_addr = start.wrapping_add(bytes.len() as u16);
        self.target = self.write_addr;
    }

    fn cmd_read(&mut self, bus: &mut Bus, args: &str) {
        if let Some((lo, hi)) = args.split_once('-') {
            let (Some(start), Some(end)) = (parse_hex_u16(lo.trim()), parse_hex_u16(hi.trim()))
            else {
                self.print_error(bus, "?ADDR");
                return;
            };
            if start > end {
                self.print_error(bus, "?RANGE");
                return;
            }
            self.target = start;
            let mut addr = start;
            loop {
                let line_end = addr.saturating_add(7).min(end);
                let mut bytes = Vec::new();
                let mut a = addr;
                loop {
                    bytes.push(bus.read(a));
                    if a == line_end {
                        break;
                    }
                    a += 1;
                }
                let text = format_hex_line(addr, &bytes);
                self.println(bus, &text);
                if line_end == end {
                    break;
                }
                addr = line_end + 1;
            }
        } else {
            let Some(addr) = parse_hex_u16(args.trim()) else {
                self.print_error(bus, "?ADDR");
                return;
            };
            self.target = addr;
            let byte = bus.read(addr);
            let text = format!("{:04X}: {:02X}", addr, byte);
            self.println(bus, &text);
        }
    }

    fn cmd_go(&mut self, bus: &mut Bus, args: &str) -> Action {
        let Some(addr) = parse_hex_u16(args.trim()) else {
            self.print_error(bus, "?ADDR");
            return Action::None;
        };
        Action::Jump(addr)
    }

    fn cmd_load(&mut self, bus: &mut Bus, args: &str) {
        let Some(addr) = parse_hex_u16(args.trim()) else {
            self.print_error(bus, "?ADDR");
            return;
        };
        self.load_target = addr;
        self.mode = Mode::Load;
        self.println(bus, "FILE?");
    }

    fn cmd_load_filename(&mut self, bus: &mut Bus, filename: &str) {
        let name = filename.trim();
        let bytes: Vec<u8> = name.bytes().take(FILENAME_SCRATCH_CAP - 1).collect();
        for (i, &b) in bytes.iter().enumerate() {
            bus.write(FILENAME_SCRATCH + i as u16, b);
        }
        bus.write(FILENAME_SCRATCH + bytes.len() as u16, 0);

        let ptr_bytes = FILENAME_SCRATCH.to_le_bytes();
        bus.write(PIA_START + reg::FILENAME_PTR_LO, ptr_bytes[0]);
        bus.write(PIA_START + reg::FILENAME_PTR_HI, ptr_bytes[1]);
        let addr_bytes = self.load_target.to_le_bytes();
        bus.write(PIA_START + reg::FILE_ADDR_LO, addr_bytes[0]);
        bus.write(PIA_START + reg::FILE_ADDR_HI, addr_bytes[1]);
        bus.write(PIA_START + reg::FILE_CMD, 1);

        self.mode = Mode::Command;
        self.awaiting_file = true;
    }

    fn maybe_report_file_result(&mut self, bus: &mut Bus) {
        if !self.awaiting_file {
            return;
        }
        let complete = bus.read(PIA_START + reg::FILE_COMPLETE) & 0x01 != 0;
        if !complete {
            return;
        }
        self.awaiting_file = false;
        let result = bus.read(PIA_START + reg::FILE_RESULT);
        if result == 0 {
            let lo = bus.read(PIA_START + reg::FILE_LEN_LO);
            let hi = bus.read(PIA_START + reg::FILE_LEN_HI);
            let len = u16::from_le_bytes([lo, hi]);
            let msg = format!("{} BYTES LOADED", len);
            self.println(bus, &msg);
            self.println(bus, "OK");
        } else {
            self.println(bus, "ERROR");
        }
        self.print_prompt(bus);
    }

    fn cmd_fill(&mut self, bus: &mut Bus, args: &str) {
        let Some((range, val)) = args.rsplit_once(',') else {
            self.print_error(bus, "?SYNTAX");
            return;
        };
        let Some((lo, hi)) = range.split_once('-') else {
            self.print_error(bus, "?SYNTAX");
            return;
        };
        let (Some(start), Some(end), Some(value)) = (
            parse_hex_u16(lo.trim()),
            parse_hex_u16(hi.trim()),
            parse_hex_u8(val.trim()),
        ) else {
            self.print_error(bus, "?ARG");
            return;
        };
        if start > end {
            self.print_error(bus, "?RANGE");
            return;
        }
        let mut addr = start;
        loop {
            bus.write(addr, value);
            if addr == end {
                break;
            }
            addr += 1;
        }
        self.target = start;
        self.println(bus, "OK");
    }

    fn cmd_copy_move(&mut self, bus: &mut Bus, args: &str) {
        let parts: Vec<&str> = args.split(',').collect();
        if parts.len() != 3 {
            self.print_error(bus, "?SYNTAX");
            return;
        }
        let Some((lo, hi)) = parts[0].split_once('-') else {
            self.print_error(bus, "?SYNTAX");
            return;
        };
        let (Some(start), Some(end), Some(dest)) = (
            parse_hex_u16(lo.trim()),
            parse_hex_u16(hi.trim()),
            parse_hex_u16(parts[1].trim()),
        ) else {
            self.print_error(bus, "?ARG");
            return;
        };
        if start > end {
            self.print_error(bus, "?RANGE");
            return;
        }
        let move_mode = match parts[2].trim() {
            "0" => false,
            "1" => true,
            _ => {
                self.print_error(bus, "?MODE");
                return;
            }
        };

        let bytes: Vec<u8> = (start..=end).map(|a| bus.read(a)).collect();
        for (i, &b) in bytes.iter().enumerate() {
            bus.write(dest.wrapping_add(i as u16), b);
        }
        if move_mode {
            let mut addr = start;
            loop {
                bus.write(addr, 0x00);
                if addr == end {
                    break;
                }
                addr += 1;
            }
        }
        self.target = dest;
        self.println(bus, "OK");
    }

    fn cmd_dump(&mut self, bus: &mut Bus, base: u16) {
        self.target = base;
        for row in 0..16u16 {
            let addr = base.wrapping_add(row * 16);
            let bytes: Vec<u8> = (0..16u16).map(|i| bus.read(addr.wrapping_add(i))).collect();
            let text = format_hex_line(addr, &bytes);
            self.println(bus, &text);
        }
    }

    fn cmd_help(&mut self, bus: &mut Bus) {
        for line in [
            "6502 MONITOR COMMANDS:",
            "W:AAAA   WRITE",
            "R:AAAA   READ",
            "G:AAAA   GO",
            "L:AAAA   LOAD",
            "F:LO-HI,VV FILL",
            "M:LO-HI,DST,M COPY/MOVE",
            "K:       CLEAR",
            "S:       STACK",
            "Z:       ZERO PAGE",
            "T:       TARGET",
            "X:       EXIT MODE",
        ] {
            self.println(bus, line);
        }
    }

    /// Used only by `kernel::hooks`'s string-pointer variants, which print
    /// through the same editor the monitor owns. Exposed so the hook
    /// dispatcher doesn't need a second `ScreenEditor` instance.
    pub fn editor_mut(&mut self) -> &mut ScreenEditor {
        &mut self.editor
    }
}

impl Default for Monitor {
    fn default() -> Monitor {
        Monitor::new()
    }
}

fn parse_hex_u16(s: &str) -> Option<u16> {
    u16::from_str_radix(s.trim(), 16).ok()
}

fn parse_hex_u8(s: &str) -> Option<u8> {
    u8::from_str_radix(s.trim(), 16).ok()
}

fn format_hex_line(addr: u16, bytes: &[u8]) -> String {
    let body: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
    format!("{:04X}: {}", addr, body.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(bus: &mut Bus, monitor: &mut Monitor, s: &str) -> Action {
        let mut last = Action::None;
        for &b in s.as_bytes() {
            bus.pia_mut().enqueue_key(b);
            last = monitor.tick(bus);
        }
        last
    }

    #[test]
    fn boot_banner_contains_monitor() {
        let mut bus = Bus::new();
        let mut monitor = Monitor::new();
        // First tick (with no key pending) prints the banner.
        monitor.tick(&mut bus);
        assert!(screen_text(&bus).contains("MONITOR"));
    }

    #[test]
    fn help_command_mentions_monitor() {
        let mut bus = Bus::new();
        let mut monitor = Monitor::new();
        type_str(&mut bus, &mut monitor, "H:\r");
        assert!(screen_text(&bus).contains("MONITOR"));
    }

    #[test]
    fn fill_then_read_shows_the_filled_bytes() {
        let mut bus = Bus::new();
        let mut monitor = Monitor::new();
        type_str(&mut bus, &mut monitor, "F:8000-8007,BB\r");
        type_str(&mut bus, &mut monitor, "R:8000-8007\r");
        let text = screen_text(&bus);
        assert!(text.contains("8000:"));
        assert!(text.contains("BB BB BB BB BB BB BB BB"));
    }

    #[test]
    fn copy_leaves_the_source_untouched() {
        let mut bus = Bus::new();
        let mut monitor = Monitor::new();
        type_str(&mut bus, &mut monitor, "F:8010-8017,CC\r");
        type_str(&mut bus, &mut monitor, "M:8010-8017,8020,0\r");
        for a in 0x8010u16..=0x8017 {
            assert_eq!(bus.read(a), 0xCC);
        }
        for a in 0x8020u16..=0x8027 {
            assert_eq!(bus.read(a), 0xCC);
        }
    }

    #[test]
    fn move_clears_the_source() {
        let mut bus = Bus::new();
        let mut monitor = Monitor::new();
        type_str(&mut bus, &mut monitor, "F:8030-8033,DD\r");
        type_str(&mut bus, &mut monitor, "M:8030-8033,8040,1\r");
        for a in 0x8030u16..=0x8033 {
            assert_eq!(bus.read(a), 0x00);
        }
        for a in 0x8040u16..=0x8043 {
            assert_eq!(bus.read(a), 0xDD);
        }
    }

    #[test]
    fn write_mode_then_continuation_line_writes_sequential_bytes() {
        let mut bus = Bus::new();
        let mut monitor = Monitor::new();
        type_str(&mut bus, &mut monitor, "W:8050\r");
        type_str(&mut bus, &mut monitor, "AB CD EF 12\r");
        assert_eq!(bus.read(0x8050), 0xAB);
        assert_eq!(bus.read(0x8051), 0xCD);
        assert_eq!(bus.read(0x8052), 0xEF);
        assert_eq!(bus.read(0x8053), 0x12);
    }

    #[test]
    fn go_command_requests_a_jump() {
        let mut bus = Bus::new();
        let mut monitor = Monitor::new();
        let action = type_str(&mut bus, &mut monitor, "G:0800\r");
        assert_eq!(action, Action::Jump(0x0800));
    }

    #[test]
    fn malformed_command_leaves_target_unchanged() {
        let mut bus = Bus::new();
        let mut monitor = Monitor::new();
        type_str(&mut bus, &mut monitor, "R:1000\r");
        assert_eq!(monitor.target, 0x1000);
        type_str(&mut bus, &mut monitor, "Q:nonsense\r");
        assert_eq!(monitor.target, 0x1000);
    }

    fn screen_text(bus: &Bus) -> String {
        let mut out = String::new();
        for row in 0..crate::devices::screen::ROWS as u8 {
            for col in 0..crate::devices::screen::COLUMNS as u8 {
                out.push(bus.screen().char_at(col, row) as char);
            }
        }
        out
    }
}
