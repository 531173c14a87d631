//! The fetch-decode-execute loop: one [`Hart::step`] call retires at most
//! one instruction, applying the full RV32IMA dispatch, trap policy, and
//! counter bookkeeping.

use rv32_core::error::FatalError;
use rv32_core::memmap::MemoryMap;

use crate::csr::{self, CsrFile};
use crate::decode::{decode, Decoded, Op};
use crate::registers::GprFile;
use crate::sbi::{self, HostIo};
use crate::sv32::{translate, Access, Privilege};
use crate::trap::{deliver_exception, deliver_interrupt, pending_interrupt, ExceptionCode};

/// Source of wall-clock nanoseconds for the `time`/`timeh` CSR pair.
/// Abstracted so tests can drive it deterministically instead of reading
/// the real clock.
pub trait Clock {
    fn now_nanos(&mut self) -> u64;
}

/// Real monotonic clock, anchored at construction time.
pub struct SystemClock {
    start: std::time::Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_nanos(&mut self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
}

pub struct Hart<IO: HostIo, C: Clock> {
    pub gpr: GprFile,
    pub csr: CsrFile,
    pub pc: u32,
    pub privilege: Privilege,
    reservation_valid: bool,
    time_compare: u64,
    last_tick_nanos: u64,
    timebase_period_nanos: u64,
    io: IO,
    clock: C,
}

impl<IO: HostIo, C: Clock> Hart<IO, C> {
    #[must_use]
    pub fn new(timebase_freq_hz: u64, io: IO, mut clock: C) -> Self {
        let timebase_period_nanos = if timebase_freq_hz == 0 { 0 } else { 1_000_000_000 / timebase_freq_hz };
        let last_tick_nanos = clock.now_nanos();
        Self {
            gpr: GprFile::default(),
            csr: CsrFile::default(),
            pc: 0,
            privilege: Privilege::Supervisor,
            reservation_valid: false,
            time_compare: 0,
            last_tick_nanos,
            timebase_period_nanos,
            io,
            clock,
        }
    }

    /// Set up the initial boot state described in the machine's external
    /// interfaces: PC at the kernel entry point, Supervisor mode, DTB
    /// pointer in `a1`.
    pub fn boot(&mut self, entry_pc: u32, dtb_addr: u32) {
        self.pc = entry_pc;
        self.privilege = Privilege::Supervisor;
        self.gpr.set(crate::registers::A1, dtb_addr);
    }

    fn raise_exception(&mut self, code: ExceptionCode, stval: u32) {
        let faulting_pc = self.pc;
        let new_pc = deliver_exception(code, stval, self.pc, &mut self.privilege, &mut self.csr);
        log::trace!(
            "trap code={code:?} stval={stval:#x} pc={faulting_pc:#x} -> {new_pc:#x}; gpr: {}",
            self.gpr
        );
        self.pc = new_pc;
    }

    pub fn step(&mut self, mem: &mut MemoryMap) -> Result<(), FatalError> {
        let should_increment_pc = self.step_inner(mem)?;
        if should_increment_pc {
            self.pc = self.pc.wrapping_add(4);
        }
        self.tick_counters();
        Ok(())
    }

    fn tick_counters(&mut self) {
        if self.timebase_period_nanos == 0 {
            self.csr.tick(0, self.time_compare);
            return;
        }
        let now = self.clock.now_nanos();
        let elapsed = now.saturating_sub(self.last_tick_nanos);
        let ticks = elapsed / self.timebase_period_nanos;
        if ticks > 0 {
            self.last_tick_nanos += ticks * self.timebase_period_nanos;
        }
        self.csr.tick(ticks, self.time_compare);
    }

    fn step_inner(&mut self, mem: &mut MemoryMap) -> Result<bool, FatalError> {
        if self.pc & 0b11 != 0 {
            self.raise_exception(ExceptionCode::InstructionMisaligned, self.pc);
            return Ok(false);
        }

        if let Some(code) = pending_interrupt(&self.csr, self.privilege) {
            let new_pc = deliver_interrupt(code, self.pc, &mut self.privilege, &mut self.csr);
            self.pc = new_pc;
            return Ok(false);
        }

        let fetch = translate(self.pc, Access::Execute, self.privilege, &self.csr, mem)?;
        let phys_pc = match fetch {
            Ok(addr) => addr,
            Err(_) => {
                let faulting_pc = self.pc;
                self.raise_exception(ExceptionCode::InstructionPageFault, faulting_pc);
                let refetch = translate(self.pc, Access::Execute, self.privilege, &self.csr, mem)?;
                if refetch.is_err() {
                    log::error!("double fault refetching trap handler entry at {:#x}", self.pc);
                    return Err(FatalError::DoubleFaultOnTrapEntry { address: self.pc });
                }
                return Ok(false);
            }
        };

        let word = mem.read_word(phys_pc)?;
        let decoded = match decode(word) {
            Ok(d) => d,
            Err(_) => {
                self.raise_exception(ExceptionCode::IllegalInstruction, word);
                return Ok(false);
            }
        };

        self.execute(decoded, mem)
    }

    #[allow(clippy::too_many_lines)]
    fn execute(&mut self, d: Decoded, mem: &mut MemoryMap) -> Result<bool, FatalError> {
        use Op::*;
        match d.op {
            Lb | Lh | Lw | Lbu | Lhu => self.load(d, mem),
            Sb | Sh | Sw => self.store(d, mem),
            Beq | Bne | Blt | Bge | Bltu | Bgeu => Ok(self.branch(d)),
            Jal => {
                self.gpr.set(d.rd, self.pc.wrapping_add(4));
                self.pc = self.pc.wrapping_add(d.imm);
                Ok(false)
            }
            Jalr => {
                let target = self.gpr.get(d.rs1).wrapping_add(d.imm) & !1;
                self.gpr.set(d.rd, self.pc.wrapping_add(4));
                self.pc = target;
                Ok(false)
            }
            Lui => {
                self.gpr.set(d.rd, d.imm);
                Ok(true)
            }
            Auipc => {
                self.gpr.set(d.rd, self.pc.wrapping_add(d.imm));
                Ok(true)
            }
            Fence | FenceI => Ok(true),
            Addi => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1).wrapping_add(d.imm));
                Ok(true)
            }
            Slti => {
                let v = (self.gpr.get(d.rs1) as i32) < (d.imm as i32);
                self.gpr.set(d.rd, v as u32);
                Ok(true)
            }
            Sltiu => {
                let v = self.gpr.get(d.rs1) < d.imm;
                self.gpr.set(d.rd, v as u32);
                Ok(true)
            }
            Xori => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1) ^ d.imm);
                Ok(true)
            }
            Ori => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1) | d.imm);
                Ok(true)
            }
            Andi => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1) & d.imm);
                Ok(true)
            }
            Slli => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1) << (d.imm & 0x1F));
                Ok(true)
            }
            Srli => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1) >> (d.imm & 0x1F));
                Ok(true)
            }
            Srai => {
                let v = (self.gpr.get(d.rs1) as i32) >> (d.imm & 0x1F);
                self.gpr.set(d.rd, v as u32);
                Ok(true)
            }
            Add => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1).wrapping_add(self.gpr.get(d.rs2)));
                Ok(true)
            }
            Sub => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1).wrapping_sub(self.gpr.get(d.rs2)));
                Ok(true)
            }
            Sll => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1) << (self.gpr.get(d.rs2) & 0x1F));
                Ok(true)
            }
            Slt => {
                let v = (self.gpr.get(d.rs1) as i32) < (self.gpr.get(d.rs2) as i32);
                self.gpr.set(d.rd, v as u32);
                Ok(true)
            }
            Sltu => {
                let v = self.gpr.get(d.rs1) < self.gpr.get(d.rs2);
                self.gpr.set(d.rd, v as u32);
                Ok(true)
            }
            Xor => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1) ^ self.gpr.get(d.rs2));
                Ok(true)
            }
            Srl => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1) >> (self.gpr.get(d.rs2) & 0x1F));
                Ok(true)
            }
            Sra => {
                let v = (self.gpr.get(d.rs1) as i32) >> (self.gpr.get(d.rs2) & 0x1F);
                self.gpr.set(d.rd, v as u32);
                Ok(true)
            }
            Or => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1) | self.gpr.get(d.rs2));
                Ok(true)
            }
            And => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1) & self.gpr.get(d.rs2));
                Ok(true)
            }
            Mul => {
                self.gpr.set(d.rd, self.gpr.get(d.rs1).wrapping_mul(self.gpr.get(d.rs2)));
                Ok(true)
            }
            Mulh => {
                let a = i64::from(self.gpr.get(d.rs1) as i32);
                let b = i64::from(self.gpr.get(d.rs2) as i32);
                self.gpr.set(d.rd, ((a * b) >> 32) as u32);
                Ok(true)
            }
            Mulhsu => {
                let a = i64::from(self.gpr.get(d.rs1) as i32);
                let b = i64::from(self.gpr.get(d.rs2));
                self.gpr.set(d.rd, ((a * b) >> 32) as u32);
                Ok(true)
            }
            Mulhu => {
                let a = u64::from(self.gpr.get(d.rs1));
                let b = u64::from(self.gpr.get(d.rs2));
                self.gpr.set(d.rd, ((a * b) >> 32) as u32);
                Ok(true)
            }
            Div => {
                let a = self.gpr.get(d.rs1) as i32;
                let b = self.gpr.get(d.rs2) as i32;
                let v = if b == 0 {
                    -1i32
                } else if a == i32::MIN && b == -1 {
                    a
                } else {
                    a.wrapping_div(b)
                };
                self.gpr.set(d.rd, v as u32);
                Ok(true)
            }
            Divu => {
                let a = self.gpr.get(d.rs1);
                let b = self.gpr.get(d.rs2);
                let v = if b == 0 { u32::MAX } else { a / b };
                self.gpr.set(d.rd, v);
                Ok(true)
            }
            Rem => {
                let a = self.gpr.get(d.rs1) as i32;
                let b = self.gpr.get(d.rs2) as i32;
                let v = if b == 0 {
                    a
                } else if a == i32::MIN && b == -1 {
                    0
                } else {
                    a.wrapping_rem(b)
                };
                self.gpr.set(d.rd, v as u32);
                Ok(true)
            }
            Remu => {
                let a = self.gpr.get(d.rs1);
                let b = self.gpr.get(d.rs2);
                let v = if b == 0 { a } else { a % b };
                self.gpr.set(d.rd, v);
                Ok(true)
            }
            Ecall => self.ecall(),
            Ebreak => Ok(true),
            Sret => {
                self.privilege = if self.csr.spp_bit() { Privilege::Supervisor } else { Privilege::User };
                self.csr.set_sie_bit(self.csr.spie_bit());
                self.csr.set_spie_bit(true);
                self.csr.set_spp_bit(false);
                self.pc = self.csr.sepc();
                Ok(false)
            }
            Wfi | SfenceVma => Ok(true),
            Csrrw | Csrrs | Csrrc | Csrrwi | Csrrsi | Csrrci => self.csr_op(d),
            LrW | ScW | AmoswapW | AmoaddW | AmoxorW | AmoandW | AmoorW | AmominW | AmomaxW
            | AmominuW | AmomaxuW => self.amo(d, mem),
        }
    }

    fn load(&mut self, d: Decoded, mem: &mut MemoryMap) -> Result<bool, FatalError> {
        let vaddr = self.gpr.get(d.rs1).wrapping_add(d.imm);
        let width_needs_align = matches!(d.op, Op::Lh | Op::Lhu | Op::Lw);
        let align = if matches!(d.op, Op::Lw) { 4 } else { 2 };
        if width_needs_align && vaddr % align != 0 {
            self.raise_exception(ExceptionCode::LoadMisaligned, vaddr);
            return Ok(false);
        }
        let resolved = translate(vaddr, Access::Read, self.privilege, &self.csr, mem)?;
        let phys = match resolved {
            Ok(p) => p,
            Err(_) => {
                self.raise_exception(ExceptionCode::LoadPageFault, vaddr);
                return Ok(false);
            }
        };
        let value = match d.op {
            Op::Lb => {
                let b = mem.read_byte(phys)?;
                (b as i8) as i32 as u32
            }
            Op::Lbu => u32::from(mem.read_byte(phys)?),
            Op::Lh => {
                let h = mem.read_halfword(phys)?;
                (h as i16) as i32 as u32
            }
            Op::Lhu => u32::from(mem.read_halfword(phys)?),
            Op::Lw => mem.read_word(phys)?,
            _ => unreachable!(),
        };
        self.gpr.set(d.rd, value);
        Ok(true)
    }

    fn store(&mut self, d: Decoded, mem: &mut MemoryMap) -> Result<bool, FatalError> {
        let vaddr = self.gpr.get(d.rs1).wrapping_add(d.imm);
        let align = match d.op {
            Op::Sw => 4,
            Op::Sh => 2,
            _ => 1,
        };
        if vaddr % align != 0 {
            self.raise_exception(ExceptionCode::StoreAmoMisaligned, vaddr);
            return Ok(false);
        }
        let resolved = translate(vaddr, Access::Write, self.privilege, &self.csr, mem)?;
        let phys = match resolved {
            Ok(p) => p,
            Err(_) => {
                self.raise_exception(ExceptionCode::StoreAmoPageFault, vaddr);
                return Ok(false);
            }
        };
        let value = self.gpr.get(d.rs2);
        match d.op {
            Op::Sb => mem.write_byte(phys, value as u8)?,
            Op::Sh => mem.write_halfword(phys, value as u16)?,
            Op::Sw => mem.write_word(phys, value)?,
            _ => unreachable!(),
        }
        Ok(true)
    }

    fn branch(&mut self, d: Decoded) -> bool {
        let a = self.gpr.get(d.rs1);
        let b = self.gpr.get(d.rs2);
        let taken = match d.op {
            Op::Beq => a == b,
            Op::Bne => a != b,
            Op::Blt => (a as i32) < (b as i32),
            Op::Bge => (a as i32) >= (b as i32),
            Op::Bltu => a < b,
            Op::Bgeu => a >= b,
            _ => unreachable!(),
        };
        if taken {
            self.pc = self.pc.wrapping_add(d.imm);
            false
        } else {
            true
        }
    }

    fn amo(&mut self, d: Decoded, mem: &mut MemoryMap) -> Result<bool, FatalError> {
        let vaddr = self.gpr.get(d.rs1);
        if vaddr % 4 != 0 {
            let code =
                if d.op == Op::LrW { ExceptionCode::LoadMisaligned } else { ExceptionCode::StoreAmoMisaligned };
            self.raise_exception(code, vaddr);
            return Ok(false);
        }
        let access = if d.op == Op::LrW { Access::Read } else { Access::Write };
        let resolved = translate(vaddr, access, self.privilege, &self.csr, mem)?;
        let phys = match resolved {
            Ok(p) => p,
            Err(_) => {
                let code =
                    if d.op == Op::LrW { ExceptionCode::LoadPageFault } else { ExceptionCode::StoreAmoPageFault };
                self.raise_exception(code, vaddr);
                return Ok(false);
            }
        };

        match d.op {
            Op::LrW => {
                let v = mem.read_word(phys)?;
                self.gpr.set(d.rd, v);
                self.reservation_valid = true;
            }
            Op::ScW => {
                if self.reservation_valid {
                    mem.write_word(phys, self.gpr.get(d.rs2))?;
                    self.gpr.set(d.rd, 0);
                    self.reservation_valid = false;
                } else {
                    self.gpr.set(d.rd, 1);
                }
            }
            _ => {
                let old = mem.read_word(phys)?;
                let rs2v = self.gpr.get(d.rs2);
                let new = match d.op {
                    Op::AmoswapW => rs2v,
                    Op::AmoaddW => old.wrapping_add(rs2v),
                    Op::AmoxorW => old ^ rs2v,
                    Op::AmoandW => old & rs2v,
                    Op::AmoorW => old | rs2v,
                    Op::AmominW => ((old as i32).min(rs2v as i32)) as u32,
                    Op::AmomaxW => ((old as i32).max(rs2v as i32)) as u32,
                    Op::AmominuW => old.min(rs2v),
                    Op::AmomaxuW => old.max(rs2v),
                    _ => unreachable!(),
                };
                mem.write_word(phys, new)?;
                self.gpr.set(d.rd, old);
            }
        }
        Ok(true)
    }

    fn ecall(&mut self) -> Result<bool, FatalError> {
        if self.privilege == Privilege::User {
            self.raise_exception(ExceptionCode::UserEcall, 0);
            return Ok(false);
        }
        let selector = self.gpr.get(crate::registers::A7);
        match selector {
            sbi::SET_TIMER => {
                let a0 = u64::from(self.gpr.get(crate::registers::A0));
                let a1 = u64::from(self.gpr.get(crate::registers::A1));
                self.time_compare = (a1 << 32) | a0;
                self.csr.set_stip(false);
            }
            sbi::CONSOLE_PUTCHAR => {
                let byte = self.gpr.get(crate::registers::A0) as u8;
                self.io.putchar(byte);
            }
            sbi::CONSOLE_GETCHAR => {
                let v = self.io.getchar();
                self.gpr.set(crate::registers::A0, v as u32);
            }
            sbi::SHUTDOWN => {
                self.io.shutdown();
                self.gpr.set(crate::registers::A0, 0);
            }
            other => {
                log::error!("unknown SBI call selector {other:#x} (a7); gpr: {}", self.gpr);
                return Err(FatalError::UnknownSbiCall { selector: other });
            }
        }
        Ok(true)
    }

    fn csr_op(&mut self, d: Decoded) -> Result<bool, FatalError> {
        let addr = d.imm;
        let is_immediate = matches!(d.op, Op::Csrrwi | Op::Csrrsi | Op::Csrrci);
        let source = if is_immediate { d.rs1 } else { self.gpr.get(d.rs1) };
        let is_write = matches!(d.op, Op::Csrrw | Op::Csrrwi) || source != 0;

        if let Some(bit) = csr::counter_enable_bit(addr) {
            if self.privilege == Privilege::User && !self.csr.counter_enabled(bit) {
                self.raise_exception(ExceptionCode::IllegalInstruction, 0);
                return Ok(false);
            }
        }

        let Some(class) = csr::access_class(addr) else {
            self.raise_exception(ExceptionCode::IllegalInstruction, 0);
            return Ok(false);
        };

        if self.privilege == Privilege::User && class == csr::AccessClass::Srw {
            self.raise_exception(ExceptionCode::IllegalInstruction, 0);
            return Ok(false);
        }

        if is_write && class == csr::AccessClass::Uro {
            self.raise_exception(ExceptionCode::IllegalInstruction, 0);
            return Ok(false);
        }

        let old = self.csr.read(addr);
        if is_write {
            let new = match d.op {
                Op::Csrrw | Op::Csrrwi => source,
                Op::Csrrs | Op::Csrrsi => old | source,
                Op::Csrrc | Op::Csrrci => old & !source,
                _ => unreachable!(),
            };
            self.csr.write(addr, new);
        }
        self.gpr.set(d.rd, old);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv32_core::memmap::FlatMemory;

    struct NullIo;
    impl HostIo for NullIo {
        fn putchar(&mut self, _byte: u8) {}
        fn getchar(&mut self) -> i32 {
            -1
        }
        fn shutdown(&mut self) {}
    }

    struct ManualClock(u64);
    impl Clock for ManualClock {
        fn now_nanos(&mut self) -> u64 {
            self.0
        }
    }

    fn harness() -> (Hart<NullIo, ManualClock>, MemoryMap) {
        let hart = Hart::new(0, NullIo, ManualClock(0));
        let mut mem = MemoryMap::new();
        mem.register(Box::new(FlatMemory::new(0x8000_0000, 0x10_0000)));
        (hart, mem)
    }

    fn addi(rd: u32, rs1: u32, imm: u32) -> u32 {
        ((imm & 0xFFF) << 20) | (rs1 << 15) | (rd << 7) | 0b001_0011
    }

    #[test]
    fn addi_increments_pc_and_retires_once() {
        let (mut hart, mut mem) = harness();
        hart.pc = 0x8040_0000;
        mem.write_word(0x8040_0000, addi(1, 0, 7)).unwrap();
        hart.step(&mut mem).unwrap();
        assert_eq!(hart.gpr.get(1), 7);
        assert_eq!(hart.pc, 0x8040_0004);
        assert_eq!(hart.csr.read(csr::INSTRET), 1);
    }

    #[test]
    fn store_then_load_roundtrips() {
        let (mut hart, mut mem) = harness();
        hart.pc = 0x8040_0000;
        hart.gpr.set(1, 0xDEAD_BEEF);
        hart.gpr.set(2, 0x8000_0100);
        let sw = (0u32 << 25) | (1 << 20) | (2 << 15) | (0b010 << 12) | (0 << 7) | 0b010_0011;
        let lw = (0u32 << 20) | (2 << 15) | (0b010 << 12) | (3 << 7) | 0b000_0011;
        mem.write_word(0x8040_0000, sw).unwrap();
        mem.write_word(0x8040_0004, lw).unwrap();
        hart.step(&mut mem).unwrap();
        hart.step(&mut mem).unwrap();
        assert_eq!(hart.gpr.get(3), 0xDEAD_BEEF);
        assert_eq!(hart.pc, 0x8040_0008);
    }

    #[test]
    fn lr_sc_round_trip() {
        let (mut hart, mut mem) = harness();
        hart.gpr.set(2, 0x8000_0100);
        hart.gpr.set(4, 0x42);
        let lr = (0b00010 << 27) | (0 << 20) | (2 << 15) | (0b010 << 12) | (1 << 7) | 0b010_1111;
        let sc = (0b00011 << 27) | (4 << 20) | (2 << 15) | (0b010 << 12) | (3 << 7) | 0b010_1111;
        hart.pc = 0x8040_0000;
        mem.write_word(0x8040_0000, lr).unwrap();
        mem.write_word(0x8040_0004, sc).unwrap();
        hart.step(&mut mem).unwrap();
        hart.step(&mut mem).unwrap();
        assert_eq!(hart.gpr.get(3), 0);
        assert_eq!(mem.read_word(0x8000_0100).unwrap(), 0x42);

        // a second SC without a fresh LR must fail.
        hart.pc = 0x8040_0004;
        hart.step(&mut mem).unwrap();
        assert_eq!(hart.gpr.get(3), 1);
    }

    #[test]
    fn user_ecall_traps_to_supervisor() {
        let (mut hart, mut mem) = harness();
        hart.privilege = Privilege::User;
        hart.csr.write(csr::STVEC, 0x8000_8000);
        hart.pc = 0x8040_1000;
        let ecall = 0b111_0011u32;
        mem.write_word(0x8040_1000, ecall).unwrap();
        hart.step(&mut mem).unwrap();
        assert_eq!(hart.csr.read(csr::SCAUSE), 8);
        assert_eq!(hart.csr.sepc(), 0x8040_1000);
        assert_eq!(hart.pc, 0x8000_8000);
        assert_eq!(hart.privilege, Privilege::Supervisor);
    }

    #[test]
    fn divide_by_zero_follows_rv32m_table() {
        let (mut hart, mut mem) = harness();
        hart.gpr.set(1, 10);
        hart.gpr.set(2, 0);
        let div = (0b0000001 << 25) | (2 << 20) | (1 << 15) | (0b100 << 12) | (3 << 7) | 0b011_0011;
        let rem = (0b0000001 << 25) | (2 << 20) | (1 << 15) | (0b110 << 12) | (4 << 7) | 0b011_0011;
        hart.pc = 0x8040_0000;
        mem.write_word(0x8040_0000, div).unwrap();
        mem.write_word(0x8040_0004, rem).unwrap();
        hart.step(&mut mem).unwrap();
        hart.step(&mut mem).unwrap();
        assert_eq!(hart.gpr.get(3), 0xFFFF_FFFF);
        assert_eq!(hart.gpr.get(4), 10);
    }

    #[test]
    fn ebreak_is_a_nop() {
        let (mut hart, mut mem) = harness();
        hart.pc = 0x8040_0000;
        let ebreak = (0b000000000001 << 20) | (0b000 << 12) | 0b111_0011;
        mem.write_word(0x8040_0000, ebreak).unwrap();
        hart.step(&mut mem).unwrap();
        assert_eq!(hart.pc, 0x8040_0004);
        assert_eq!(hart.privilege, Privilege::Supervisor);
        assert_eq!(hart.csr.read(csr::SCAUSE), 0);
    }
}
