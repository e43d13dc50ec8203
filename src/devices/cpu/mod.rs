//! Emulator for the MOS 6502.
//!
//! Decimal-mode ADC/SBC is not implemented: only Z/N are set from the
//! binary result when the D flag happens to be set. Sub-cycle bus timing
//! (page-crossing penalties, read-modify-write double writes) is likewise
//! not reproduced: every instruction completes atomically inside one
//! [`Cpu::step`] call.

mod decode;
pub mod state;

use crate::devices::bus::Bus;
use state::{AddressingMode, CpuState, Instruction, Status};

/// The reserved/illegal opcode repurposed by [`crate::kernel`] as the
/// native-hook sentinel. Never emulated as `JAM`/`KIL`.
pub const HOOK_SENTINEL: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A real opcode was decoded and executed.
    Recognized,
    /// The byte at `pc` was the native-hook sentinel; `pc` is left
    /// pointing at it so a caller that chooses not to advance can see
    /// the same hook fire again next `step`.
    Hook(u16),
    /// No known opcode or hook matched; the run loop should halt.
    Unrecognized,
}

#[derive(Debug, Clone, Copy)]
enum Operand {
    Address(u16),
    Accumulator,
    Immediate(u8),
    Implied,
}

pub struct Cpu {
    pub state: CpuState,
    pub bus: Bus,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            state: CpuState::new(),
            bus: Bus::new(),
        }
    }

    fn fetch_u8(&mut self) -> u8 {
        let v = self.bus.read(self.state.pc);
        self.state.pc = self.state.pc.wrapping_add(1);
        v
    }

    fn fetch_u16(&mut self) -> u16 {
        let lo = self.fetch_u8();
        let hi = self.fetch_u8();
        u16::from_le_bytes([lo, hi])
    }

    /// Fetch, decode, and execute one instruction.
    pub fn step(&mut self) -> StepOutcome {
        let opcode_addr = self.state.pc;
        let opcode = self.fetch_u8();

        if opcode == HOOK_SENTINEL {
            self.state.pc = opcode_addr;
            return StepOutcome::Hook(opcode_addr);
        }

        let Some((instr, mode)) = decode::decode_opcode(opcode) else {
            self.state.pc = opcode_addr;
            return StepOutcome::Unrecognized;
        };

        let operand = self.resolve(mode);
        self.execute(instr, mode, operand);
        self.state.tot_instructions += 1;
        StepOutcome::Recognized
    }

    /// Program-counter-only jump, for test automation and the monitor's
    /// `G:` command.
    pub fn set_pc(&mut self, addr: u16) {
        self.state.pc = addr;
    }

    fn resolve(&mut self, mode: AddressingMode) -> Operand {
        match mode {
            AddressingMode::Impl => Operand::Implied,
            AddressingMode::Accum => Operand::Accumulator,
            AddressingMode::Imm => Operand::Immediate(self.fetch_u8()),
            AddressingMode::ZP => Operand::Address(u16::from(self.fetch_u8())),
            AddressingMode::ZPX => {
                let zp = self.fetch_u8().wrapping_add(self.state.x);
                Operand::Address(u16::from(zp))
            }
            AddressingMode::ZPY => {
                let zp = self.fetch_u8().wrapping_add(self.state.y);
                Operand::Address(u16::from(zp))
            }
            AddressingMode::Abs => Operand::Address(self.fetch_u16()),
            AddressingMode::AbsX => {
                let base = self.fetch_u16();
                Operand::Address(base.wrapping_add(u16::from(self.state.x)))
            }
            AddressingMode::AbsY => {
                let base = self.fetch_u16();
                Operand::Address(base.wrapping_add(u16::from(self.state.y)))
            }
            AddressingMode::AbsInd => {
                let ptr = self.fetch_u16();
                // The classic 6502 bug: the high byte wraps within the
                // same page instead of crossing into the next one.
                let hi_ptr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let lo = self.bus.read(ptr);
                let hi = self.bus.read(hi_ptr);
                Operand::Address(u16::from_le_bytes([lo, hi]))
            }
            AddressingMode::IndX => {
                let ptr = self.fetch_u8().wrapping_add(self.state.x);
                let lo = self.bus.read(u16::from(ptr));
                let hi = self.bus.read(u16::from(ptr.wrapping_add(1)));
                Operand::Address(u16::from_le_bytes([lo, hi]))
            }
            AddressingMode::IndY => {
                let zp = self.fetch_u8();
                let lo = self.bus.read(u16::from(zp));
                let hi = self.bus.read(u16::from(zp.wrapping_add(1)));
                let base = u16::from_le_bytes([lo, hi]);
                Operand::Address(base.wrapping_add(u16::from(self.state.y)))
            }
            AddressingMode::Rel => {
                let offset = self.fetch_u8() as i8;
                // Wrapping add of the sign-extended offset reproduces
                // `(PC_after_operand + d) mod 65536` exactly.
                Operand::Address(self.state.pc.wrapping_add(offset as i16 as u16))
            }
        }
    }

    fn read_operand(&mut self, operand: Operand) -> u8 {
        match operand {
            Operand::Address(addr) => self.bus.read(addr),
            Operand::Accumulator => self.state.acc,
            Operand::Immediate(v) => v,
            Operand::Implied => 0,
        }
    }

    fn write_operand(&mut self, operand: Operand, data: u8) {
        match operand {
            Operand::Address(addr) => self.bus.write(addr, data),
            Operand::Accumulator => self.state.acc = data,
            Operand::Immediate(_) | Operand::Implied => {}
        }
    }

    fn set_zn(&mut self, value: u8) {
        self.state.status.set(Status::ZERO, value == 0);
        self.state.status.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    fn push(&mut self, data: u8) {
        let addr = 0x0100u16 + u16::from(self.state.stack);
        self.bus.write(addr, data);
        self.state.stack = self.state.stack.wrapping_sub(1);
    }

    fn pop(&mut self) -> u8 {
        self.state.stack = self.state.stack.wrapping_add(1);
        let addr = 0x0100u16 + u16::from(self.state.stack);
        self.bus.read(addr)
    }

    /// The processor status as it reads on the bus: bit 5 is always 1.
    pub fn status_byte(&self) -> u8 {
        self.state.status.bits() | Status::UNUSED.bits()
    }

    fn dispatch_interrupt(&mut self, vector: u16, set_break: bool) {
        let pc_bytes = self.state.pc.to_be_bytes();
        self.push(pc_bytes[0]);
        self.push(pc_bytes[1]);
        let mut pushed = self.state.status;
        pushed.set(Status::BREAK, set_break);
        pushed.insert(Status::UNUSED);
        self.push(pushed.bits());
        self.state.status.insert(Status::IRQ_DISABLE);
        self.state.pc = self.bus.read_word(vector);
    }

    /// Software-triggered NMI. Nothing in this crate calls this
    /// automatically (the machine has no periphery that raises interrupts
    /// of its own accord), but it is exposed for drivers or tests that
    /// want to model one.
    pub fn trigger_nmi(&mut self) {
        self.dispatch_interrupt(0xFFFA, false);
    }

    /// Software-triggered IRQ; ignored while the I flag is set.
    pub fn trigger_irq(&mut self) {
        if self.state.status.contains(Status::IRQ_DISABLE) {
            return;
        }
        self.dispatch_interrupt(0xFFFE, false);
    }

    /// Push a return address exactly as `JSR` would, so a later real `RTS`
    /// (or [`Cpu::native_return`]) lands on `addr`. Used by the kernel's
    /// native hooks, which are called from ordinary 6502 `JSR`s into the
    /// jump table but aren't decoded as 6502 opcodes themselves.
    pub(crate) fn push_return_address(&mut self, addr: u16) {
        let ret = addr.wrapping_sub(1).to_be_bytes();
        self.push(ret[0]);
        self.push(ret[1]);
    }

    /// Pop a return address pushed by [`Cpu::push_return_address`] (or a
    /// real `JSR`) and resume there, mirroring `RTS`.
    pub(crate) fn native_return(&mut self) {
        let lo = self.pop();
        let hi = self.pop();
        self.state.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
    }

    /// Native `RTI`, for the NMI/IRQ vector stub.
    pub(crate) fn native_rti(&mut self) {
        let status_bits = self.pop();
        self.state.status = Status::from_bits_truncate(status_bits);
        self.state.status.insert(Status::UNUSED);
        let lo = self.pop();
        let hi = self.pop();
        self.state.pc = u16::from_le_bytes([lo, hi]);
    }

    fn execute(&mut self, instr: Instruction, mode: AddressingMode, operand: Operand) {
        match instr {
            Instruction::ADC => {
                let op = self.read_operand(operand);
                let a = self.state.acc;
                let carry_in: u16 = self.state.status.contains(Status::CARRY) as u16;
                let sum = u16::from(a) + u16::from(op) + carry_in;
                let result = sum as u8;
                self.state.status.set(Status::CARRY, sum >= 0x100);
                self.state
                    .status
                    .set(Status::OVERFLOW, (a ^ result) & (op ^ result) & 0x80 != 0);
                self.state.acc = result;
                self.set_zn(result);
            }
            Instruction::SBC => {
                let op = self.read_operand(operand);
                let a = self.state.acc;
                let borrow: u8 = if self.state.status.contains(Status::CARRY) {
                    0
                } else {
                    1
                };
                let subtrahend = u16::from(op) + u16::from(borrow);
                let no_borrow = u16::from(a) >= subtrahend;
                let result = a.wrapping_sub(op).wrapping_sub(borrow);
                self.state.status.set(Status::CARRY, no_borrow);
                self.state
                    .status
                    .set(Status::OVERFLOW, (a ^ op) & (a ^ result) & 0x80 != 0);
                self.state.acc = result;
                self.set_zn(result);
            }
            Instruction::AND => {
                let op = self.read_operand(operand);
                self.state.acc &= op;
                self.set_zn(self.state.acc);
            }
            Instruction::ORA => {
                let op = self.read_operand(operand);
                self.state.acc |= op;
                self.set_zn(self.state.acc);
            }
            Instruction::EOR => {
                let op = self.read_operand(operand);
                self.state.acc ^= op;
                self.set_zn(self.state.acc);
            }
            Instruction::BIT => {
                let op = self.read_operand(operand);
                let res = self.state.acc & op;
                self.state.status.set(Status::ZERO, res == 0);
                self.state.status.set(Status::NEGATIVE, op & 0x80 != 0);
                self.state.status.set(Status::OVERFLOW, op & 0x40 != 0);
            }
            Instruction::ASL => {
                let op = self.read_operand(operand);
                self.state.status.set(Status::CARRY, op & 0x80 != 0);
                let result = op << 1;
                self.set_zn(result);
                self.write_operand(operand, result);
            }
            Instruction::LSR => {
                let op = self.read_operand(operand);
                self.state.status.set(Status::CARRY, op & 0x01 != 0);
                let result = op >> 1;
                self.set_zn(result);
                self.write_operand(operand, result);
            }
            Instruction::ROL => {
                let op = self.read_operand(operand);
                let carry_in = self.state.status.contains(Status::CARRY) as u8;
                self.state.status.set(Status::CARRY, op & 0x80 != 0);
                let result = (op << 1) | carry_in;
                self.set_zn(result);
                self.write_operand(operand, result);
            }
            Instruction::ROR => {
                let op = self.read_operand(operand);
                let carry_in = self.state.status.contains(Status::CARRY) as u8;
                self.state.status.set(Status::CARRY, op & 0x01 != 0);
                let result = (op >> 1) | (carry_in << 7);
                self.set_zn(result);
                self.write_operand(operand, result);
            }
            Instruction::CMP => {
                let op = self.read_operand(operand);
                self.state.status.set(Status::CARRY, self.state.acc >= op);
                self.set_zn(self.state.acc.wrapping_sub(op));
            }
            Instruction::CPX => {
                let op = self.read_operand(operand);
                self.state.status.set(Status::CARRY, self.state.x >= op);
                self.set_zn(self.state.x.wrapping_sub(op));
            }
            Instruction::CPY => {
                let op = self.read_operand(operand);
                self.state.status.set(Status::CARRY, self.state.y >= op);
                self.set_zn(self.state.y.wrapping_sub(op));
            }
            Instruction::INC => {
                let result = self.read_operand(operand).wrapping_add(1);
                self.write_operand(operand, result);
                self.set_zn(result);
            }
            Instruction::DEC => {
                let result = self.read_operand(operand).wrapping_sub(1);
                self.write_operand(operand, result);
                self.set_zn(result);
            }
            Instruction::INX => {
                self.state.x = self.state.x.wrapping_add(1);
                self.set_zn(self.state.x);
            }
            Instruction::DEX => {
                self.state.x = self.state.x.wrapping_sub(1);
                self.set_zn(self.state.x);
            }
            Instruction::INY => {
                self.state.y = self.state.y.wrapping_add(1);
                self.set_zn(self.state.y);
            }
            Instruction::DEY => {
                self.state.y = self.state.y.wrapping_sub(1);
                self.set_zn(self.state.y);
            }
            Instruction::LDA => {
                self.state.acc = self.read_operand(operand);
                self.set_zn(self.state.acc);
            }
            Instruction::LDX => {
                self.state.x = self.read_operand(operand);
                self.set_zn(self.state.x);
            }
            Instruction::LDY => {
                self.state.y = self.read_operand(operand);
                self.set_zn(self.state.y);
            }
            Instruction::STA => self.write_operand(operand, self.state.acc),
            Instruction::STX => self.write_operand(operand, self.state.x),
            Instruction::STY => self.write_operand(operand, self.state.y),
            Instruction::TAX => {
                self.state.x = self.state.acc;
                self.set_zn(self.state.x);
            }
            Instruction::TXA => {
                self.state.acc = self.state.x;
                self.set_zn(self.state.acc);
            }
            Instruction::TAY => {
                self.state.y = self.state.acc;
                self.set_zn(self.state.y);
            }
            Instruction::TYA => {
                self.state.acc = self.state.y;
                self.set_zn(self.state.acc);
            }
            Instruction::TSX => {
                self.state.x = self.state.stack;
                self.set_zn(self.state.x);
            }
            Instruction::TXS => self.state.stack = self.state.x,
            Instruction::PHA => self.push(self.state.acc),
            Instruction::PLA => {
                self.state.acc = self.pop();
                self.set_zn(self.state.acc);
            }
            Instruction::PHP => {
                let bits = self.state.status.bits() | Status::BREAK.bits() | Status::UNUSED.bits();
                self.push(bits);
            }
            Instruction::PLP => {
                let bits = self.pop();
                self.state.status = Status::from_bits_truncate(bits);
                self.state.status.insert(Status::UNUSED);
            }
            Instruction::CLC => self.state.status.remove(Status::CARRY),
            Instruction::SEC => self.state.status.insert(Status::CARRY),
            Instruction::CLI => self.state.status.remove(Status::IRQ_DISABLE),
            Instruction::SEI => self.state.status.insert(Status::IRQ_DISABLE),
            Instruction::CLV => self.state.status.remove(Status::OVERFLOW),
            Instruction::CLD => self.state.status.remove(Status::DECIMAL),
            Instruction::SED => self.state.status.insert(Status::DECIMAL),
            Instruction::NOP => {}
            Instruction::JMP => {
                if let Operand::Address(addr) = operand {
                    self.state.pc = addr;
                }
            }
            Instruction::JSR => {
                if let Operand::Address(addr) = operand {
                    let return_addr = self.state.pc.wrapping_sub(1).to_be_bytes();
                    self.push(return_addr[0]);
                    self.push(return_addr[1]);
                    self.state.pc = addr;
                }
            }
            Instruction::RTS => {
                let lo = self.pop();
                let hi = self.pop();
                self.state.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
            }
            Instruction::RTI => {
                let status_bits = self.pop();
                self.state.status = Status::from_bits_truncate(status_bits);
                self.state.status.insert(Status::UNUSED);
                let lo = self.pop();
                let hi = self.pop();
                self.state.pc = u16::from_le_bytes([lo, hi]);
            }
            Instruction::BRK => {
                self.dispatch_interrupt(0xFFFE, true);
            }
            Instruction::BPL => self.branch(!self.state.status.contains(Status::NEGATIVE), operand),
            Instruction::BMI => self.branch(self.state.status.contains(Status::NEGATIVE), operand),
            Instruction::BVC => self.branch(!self.state.status.contains(Status::OVERFLOW), operand),
            Instruction::BVS => self.branch(self.state.status.contains(Status::OVERFLOW), operand),
            Instruction::BCC => self.branch(!self.state.status.contains(Status::CARRY), operand),
            Instruction::BCS => self.branch(self.state.status.contains(Status::CARRY), operand),
            Instruction::BNE => self.branch(!self.state.status.contains(Status::ZERO), operand),
            Instruction::BEQ => self.branch(self.state.status.contains(Status::ZERO), operand),
        }
        let _ = mode;
    }

    fn branch(&mut self, take: bool, operand: Operand) {
        if !take {
            return;
        }
        if let Operand::Address(target) = operand {
            self.state.pc = target;
        }
    }
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu::new()
    }
}
