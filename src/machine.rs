//! Wires a [`Cpu`] to the native kernel: power-on sequencing, the run
//! loop's hook dispatch table, and the PIA file-load service that backs
//! the `L:` command.

use log::{debug, trace};
use rand::Rng;

use crate::devices::cpu::{Cpu, StepOutcome};
use crate::devices::pia::FileRequest;
use crate::error::CoreError;
use crate::filestore::{FileLoadErrorKind, FileStore};
use crate::kernel::hooks::{self, HookOutcome};
use crate::kernel::monitor::Action;
use crate::kernel::Monitor;
use crate::reset;
use crate::rom::RomImage;

/// `FILE_RESULT` value reported back through the PIA once a request is
/// serviced: 0 is OK, anything else names an error kind.
mod file_result {
    pub const OK: u8 = 0x00;
    pub const NOT_FOUND: u8 = 0x01;
    pub const READ_ERROR: u8 = 0x02;
}

/// Everything needed to run the core: the CPU, the shared screen-editor
/// cursor state the monitor and the jump table both write through, the
/// monitor's own command-line state, and the host-side file backend.
pub struct Machine {
    pub cpu: Cpu,
    monitor: Monitor,
    file_store: Box<dyn FileStore>,
}

impl Machine {
    pub fn new(file_store: Box<dyn FileStore>) -> Machine {
        Machine {
            cpu: Cpu::new(),
            monitor: Monitor::new(),
            file_store,
        }
    }

    /// Cold start: clear everything, load `rom`, then latch the reset
    /// vector the ROM just populated. Mirrors the order `reset.rs`'s test
    /// suite documents: a loader that ran before `power_on_reset` would
    /// have its vector wiped right back out.
    pub fn power_on(&mut self, rom: &RomImage) -> Result<(), CoreError> {
        reset::power_on_reset(&mut self.cpu);
        rom.load(&mut self.cpu.bus)?;
        reset::trigger_reset(&mut self.cpu);
        Ok(())
    }

    /// Run up to `budget` instructions/hooks, stopping early if the CPU
    /// hits an unrecognized opcode. Returns the number actually run.
    pub fn run(&mut self, budget: u32) -> u32 {
        let mut ran = 0;
        for _ in 0..budget {
            self.service_file_request();
            match self.cpu.step() {
                StepOutcome::Recognized => {}
                StepOutcome::Hook(addr) => self.dispatch_hook(addr),
                StepOutcome::Unrecognized => {
                    debug!("halting: unrecognized opcode at {:#06x}", self.cpu.state.pc);
                    break;
                }
            }
            ran += 1;
        }
        ran
    }

    fn dispatch_hook(&mut self, addr: u16) {
        trace!("hook fired at {:#06x}", addr);
        let outcome = match addr {
            hooks::HOOK_PRINT_CHAR => self.hook_print_char(),
            hooks::HOOK_PRINT_STR => self.hook_print_str(),
            hooks::HOOK_NEWLINE => {
                self.monitor.editor_mut().newline(&mut self.cpu.bus);
                HookOutcome::Return
            }
            hooks::HOOK_WAIT_KEY => self.hook_wait_key(),
            hooks::HOOK_CLEAR => {
                self.monitor.editor_mut().clear(&mut self.cpu.bus);
                HookOutcome::Return
            }
            hooks::HOOK_RAND => self.hook_rand(),
            hooks::HOOK_NMI_STUB => {
                self.cpu.native_rti();
                HookOutcome::Handled
            }
            hooks::HOOK_MONITOR_LOOP => self.hook_monitor_loop(),
            other => {
                debug!("unmapped hook address {:#06x}, treating as a no-op return", other);
                HookOutcome::Return
            }
        };
        match outcome {
            HookOutcome::Return => self.cpu.native_return(),
            HookOutcome::Continue | HookOutcome::Handled => {}
        }
    }

    /// `K_PRINT_CHAR`: the character to print is in the accumulator.
    fn hook_print_char(&mut self) -> HookOutcome {
        let byte = self.cpu.state.acc;
        self.monitor.editor_mut().print_char(&mut self.cpu.bus, byte);
        HookOutcome::Return
    }

    /// `K_PRINT_STR`: carry clear reads the string pointer from the fixed
    /// zero-page cell the default calling convention uses; carry set takes
    /// the pointer directly from X (low) / Y (high), letting a caller
    /// avoid a zero-page round trip when it already has the address in
    /// registers.
    fn hook_print_str(&mut self) -> HookOutcome {
        use crate::devices::cpu::state::Status;
        let ptr = if self.cpu.state.status.contains(Status::CARRY) {
            u16::from_le_bytes([self.cpu.state.x, self.cpu.state.y])
        } else {
            self.cpu.bus.read_word(hooks::ZP_STR_PTR_LO)
        };
        let text = hooks::read_cstr(&mut self.cpu.bus, ptr);
        self.monitor.editor_mut().print_str(&mut self.cpu.bus, &text);
        HookOutcome::Return
    }

    /// `K_WAIT_KEY`: block the native routine, by leaving `pc` parked on
    /// the hook, until the PIA's key FIFO has something, then consume it
    /// into the accumulator exactly like a real polling loop would.
    fn hook_wait_key(&mut self) -> HookOutcome {
        if !self.cpu.bus.pia().key_ready() {
            return HookOutcome::Continue;
        }
        self.cpu.state.acc = self.cpu.bus.pia_mut().read(crate::devices::pia::reg::KEY_DATA);
        HookOutcome::Return
    }

    /// `K_RAND`: inclusive upper bound in a fixed zero-page cell, result
    /// in the accumulator. A bound of zero has no well-defined range, so
    /// it reports zero rather than panicking on an empty `gen_range`.
    fn hook_rand(&mut self) -> HookOutcome {
        let bound = self.cpu.bus.read(hooks::ZP_RAND_BOUND);
        self.cpu.state.acc = if bound == 0 {
            0
        } else {
            rand::thread_rng().gen_range(1..=bound)
        };
        HookOutcome::Return
    }

    fn hook_monitor_loop(&mut self) -> HookOutcome {
        match self.monitor.tick(&mut self.cpu.bus) {
            Action::None => HookOutcome::Continue,
            Action::Jump(addr) => {
                self.cpu.push_return_address(hooks::HOOK_MONITOR_LOOP);
                self.cpu.set_pc(addr);
                HookOutcome::Handled
            }
        }
    }

    /// Service at most one armed PIA file request per call: the monitor
    /// arms a request and polls `FILE_COMPLETE`, the machine resolves it
    /// out-of-band via the file store.
    fn service_file_request(&mut self) {
        let Some(request) = self.cpu.bus.pia_mut().take_pending_request() else {
            return;
        };
        self.resolve_file_request(request);
    }

    fn resolve_file_request(&mut self, request: FileRequest) {
        let name_bytes = hooks::read_cstr(&mut self.cpu.bus, request.filename_ptr);
        let name = String::from_utf8_lossy(&name_bytes).into_owned();
        match self.file_store.open_read(&name) {
            Ok(bytes) => {
                self.cpu.bus.load(&bytes, request.target_addr);
                self.cpu
                    .bus
                    .pia_mut()
                    .complete_file_request(file_result::OK, bytes.len() as u16);
            }
            Err(FileLoadErrorKind::NotFound) => {
                self.cpu
                    .bus
                    .pia_mut()
                    .complete_file_request(file_result::NOT_FOUND, 0);
            }
            Err(FileLoadErrorKind::ReadError) => {
                self.cpu
                    .bus
                    .pia_mut()
                    .complete_file_request(file_result::READ_ERROR, 0);
            }
        }
    }
}
