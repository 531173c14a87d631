//! Exception/interrupt codes and the shared trap-delivery prologue.

use crate::csr::CsrFile;
use crate::sv32::Privilege;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionCode {
    InstructionMisaligned = 0,
    InstructionAccessFault = 1,
    IllegalInstruction = 2,
    Breakpoint = 3,
    LoadMisaligned = 4,
    LoadAccessFault = 5,
    StoreAmoMisaligned = 6,
    StoreAmoAccessFault = 7,
    UserEcall = 8,
    SupervisorEcall = 9,
    InstructionPageFault = 12,
    LoadPageFault = 13,
    StoreAmoPageFault = 15,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptCode {
    SupervisorSoftware = 1,
    SupervisorTimer = 5,
    SupervisorExternal = 9,
}

/// Deliver an exception, mutating `csr` and `privilege` per the standard
/// prologue, and returning the new PC.
pub fn deliver_exception(
    code: ExceptionCode,
    stval: u32,
    pc: u32,
    privilege: &mut Privilege,
    csr: &mut CsrFile,
) -> u32 {
    let pre_trap_supervisor = *privilege == Privilege::Supervisor;
    csr.set_spp_bit(pre_trap_supervisor);
    csr.set_spie_bit(csr.sie_bit());
    csr.set_sie_bit(false);
    csr.set_sepc(pc);
    csr.set_scause(false, code as u32);
    csr.set_stval(stval);
    *privilege = Privilege::Supervisor;
    csr.stvec_base()
}

/// Check whether an interrupt is pending and enabled, returning its code.
/// Only consulted when `privilege == User` or `sstatus.SIE == 1`, per the
/// global interrupt-enable rule.
#[must_use]
pub fn pending_interrupt(csr: &CsrFile, privilege: Privilege) -> Option<InterruptCode> {
    let globally_enabled = privilege == Privilege::User || csr.sie_bit();
    if !globally_enabled {
        return None;
    }
    if csr.ssip() && csr.ssie() {
        Some(InterruptCode::SupervisorSoftware)
    } else if csr.stip() && csr.stie() {
        Some(InterruptCode::SupervisorTimer)
    } else if csr.seip() && csr.seie() {
        Some(InterruptCode::SupervisorExternal)
    } else {
        None
    }
}

/// Deliver a pending interrupt, returning the new PC. Vectored mode
/// (`stvec.mode == 1`) offsets the target by `4 * code`.
pub fn deliver_interrupt(
    code: InterruptCode,
    pc: u32,
    privilege: &mut Privilege,
    csr: &mut CsrFile,
) -> u32 {
    let pre_trap_supervisor = *privilege == Privilege::Supervisor;
    csr.set_spp_bit(pre_trap_supervisor);
    csr.set_spie_bit(csr.sie_bit());
    csr.set_sie_bit(false);
    csr.set_sepc(pc);
    csr.set_scause(true, code as u32);
    csr.set_stval(0);
    *privilege = Privilege::Supervisor;
    let base = csr.stvec_base();
    if csr.stvec_mode() == 1 {
        base + 4 * (code as u32)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_prologue_stacks_sstatus_and_sets_sepc() {
        let mut csr = CsrFile::default();
        csr.set_sie_bit(true);
        let mut priv_ = Privilege::User;
        let new_pc =
            deliver_exception(ExceptionCode::IllegalInstruction, 0, 0x8040_1000, &mut priv_, &mut csr);
        assert!(!csr.spp_bit());
        assert!(csr.spie_bit());
        assert!(!csr.sie_bit());
        assert_eq!(csr.sepc(), 0x8040_1000);
        assert_eq!(priv_, Privilege::Supervisor);
        assert_eq!(new_pc, csr.stvec_base());
    }

    #[test]
    fn interrupt_priority_prefers_software_over_timer() {
        let mut csr = CsrFile::default();
        csr.set_sie_bit(true);
        csr.write(crate::csr::SIE, 0b11 << 1 | 1 << 5);
        csr.write(crate::csr::SIP, 0b10 | 1 << 5);
        let code = pending_interrupt(&csr, Privilege::Supervisor).unwrap();
        assert_eq!(code, InterruptCode::SupervisorSoftware);
    }
}
