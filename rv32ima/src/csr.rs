//! The control/status register file: every address this profile recognizes,
//! its access class, and the bit-field views the hart executor needs.

use rv32_core::bits::{get, with};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessClass {
    /// User-read-only.
    Uro,
    /// Supervisor-read-write; illegal to touch from User mode.
    Srw,
}

pub const CYCLE: u32 = 0xC00;
pub const TIME: u32 = 0xC01;
pub const INSTRET: u32 = 0xC02;
pub const CYCLEH: u32 = 0xC80;
pub const TIMEH: u32 = 0xC81;
pub const INSTRETH: u32 = 0xC82;
pub const SSTATUS: u32 = 0x100;
pub const SIE: u32 = 0x104;
pub const STVEC: u32 = 0x105;
pub const SCOUNTEREN: u32 = 0x106;
pub const SSCRATCH: u32 = 0x140;
pub const SEPC: u32 = 0x141;
pub const SCAUSE: u32 = 0x142;
pub const STVAL: u32 = 0x143;
pub const SIP: u32 = 0x144;
pub const SATP: u32 = 0x180;

/// Returns `None` for any address this profile does not recognize.
#[must_use]
pub fn access_class(addr: u32) -> Option<AccessClass> {
    match addr {
        CYCLE | TIME | INSTRET | CYCLEH | TIMEH | INSTRETH => Some(AccessClass::Uro),
        SSTATUS | SIE | STVEC | SCOUNTEREN | SSCRATCH | SEPC | SCAUSE | STVAL | SIP | SATP => {
            Some(AccessClass::Srw)
        }
        _ => None,
    }
}

/// The `scounteren` bit gating a User-mode read of a performance counter,
/// `None` if `addr` does not name one.
#[must_use]
pub fn counter_enable_bit(addr: u32) -> Option<u32> {
    match addr {
        CYCLE | CYCLEH => Some(0),
        TIME | TIMEH => Some(1),
        INSTRET | INSTRETH => Some(2),
        _ => None,
    }
}

#[derive(Debug, Default, Clone)]
pub struct CsrFile {
    cycle: u64,
    time: u64,
    instret: u64,
    sstatus: u32,
    sie: u32,
    stvec: u32,
    scounteren: u32,
    sscratch: u32,
    sepc: u32,
    scause: u32,
    stval: u32,
    sip: u32,
    satp: u32,
}

impl CsrFile {
    #[must_use]
    pub fn read(&self, addr: u32) -> u32 {
        match addr {
            CYCLE => self.cycle as u32,
            CYCLEH => (self.cycle >> 32) as u32,
            TIME => self.time as u32,
            TIMEH => (self.time >> 32) as u32,
            INSTRET => self.instret as u32,
            INSTRETH => (self.instret >> 32) as u32,
            SSTATUS => self.sstatus,
            SIE => self.sie,
            STVEC => self.stvec,
            SCOUNTEREN => self.scounteren,
            SSCRATCH => self.sscratch,
            SEPC => self.sepc,
            SCAUSE => self.scause,
            STVAL => self.stval,
            SIP => self.sip,
            SATP => self.satp,
            _ => 0,
        }
    }

    pub fn write(&mut self, addr: u32, value: u32) {
        match addr {
            SSTATUS => self.sstatus = value,
            SIE => self.sie = value,
            STVEC => self.stvec = value,
            SCOUNTEREN => self.scounteren = value,
            SSCRATCH => self.sscratch = value,
            SEPC => self.sepc = value,
            SCAUSE => self.scause = value,
            STVAL => self.stval = value,
            SIP => self.sip = value,
            SATP => self.satp = value,
            _ => {}
        }
    }

    // --- sstatus ---
    #[must_use]
    pub fn sie_bit(&self) -> bool {
        get(self.sstatus, 1, 1) != 0
    }
    pub fn set_sie_bit(&mut self, v: bool) {
        self.sstatus = with(self.sstatus, 1, 1, v as u32);
    }
    #[must_use]
    pub fn spie_bit(&self) -> bool {
        get(self.sstatus, 5, 5) != 0
    }
    pub fn set_spie_bit(&mut self, v: bool) {
        self.sstatus = with(self.sstatus, 5, 5, v as u32);
    }
    #[must_use]
    pub fn spp_bit(&self) -> bool {
        get(self.sstatus, 8, 8) != 0
    }
    pub fn set_spp_bit(&mut self, v: bool) {
        self.sstatus = with(self.sstatus, 8, 8, v as u32);
    }
    #[must_use]
    pub fn sum_bit(&self) -> bool {
        get(self.sstatus, 18, 18) != 0
    }
    #[must_use]
    pub fn mxr_bit(&self) -> bool {
        get(self.sstatus, 19, 19) != 0
    }

    // --- sie / sip ---
    #[must_use]
    pub fn ssie(&self) -> bool {
        get(self.sie, 1, 1) != 0
    }
    #[must_use]
    pub fn stie(&self) -> bool {
        get(self.sie, 5, 5) != 0
    }
    #[must_use]
    pub fn seie(&self) -> bool {
        get(self.sie, 9, 9) != 0
    }
    #[must_use]
    pub fn ssip(&self) -> bool {
        get(self.sip, 1, 1) != 0
    }
    #[must_use]
    pub fn stip(&self) -> bool {
        get(self.sip, 5, 5) != 0
    }
    #[must_use]
    pub fn seip(&self) -> bool {
        get(self.sip, 9, 9) != 0
    }
    pub fn set_stip(&mut self, v: bool) {
        self.sip = with(self.sip, 5, 5, v as u32);
    }

    // --- stvec ---
    #[must_use]
    pub fn stvec_mode(&self) -> u32 {
        get(self.stvec, 1, 0)
    }
    #[must_use]
    pub fn stvec_base(&self) -> u32 {
        get(self.stvec, 31, 2) << 2
    }

    // --- scounteren ---
    #[must_use]
    pub fn counter_enabled(&self, bit: u32) -> bool {
        get(self.scounteren, bit, bit) != 0
    }

    // --- scause ---
    pub fn set_scause(&mut self, interrupt: bool, code: u32) {
        self.scause = with(with(0, 30, 0, code), 31, 31, interrupt as u32);
    }

    // --- satp ---
    #[must_use]
    pub fn satp_mode(&self) -> u32 {
        get(self.satp, 31, 31)
    }
    #[must_use]
    pub fn satp_ppn(&self) -> u32 {
        get(self.satp, 21, 0)
    }

    // --- plain accessors used directly by the hart ---
    #[must_use]
    pub fn sepc(&self) -> u32 {
        self.sepc
    }
    pub fn set_sepc(&mut self, v: u32) {
        self.sepc = v;
    }
    pub fn set_stval(&mut self, v: u32) {
        self.stval = v;
    }
    #[must_use]
    pub fn stval(&self) -> u32 {
        self.stval
    }

    /// Advance `cycle`/`instret` by one retired step, and `time` by the
    /// number of timebase ticks elapsed since the previous call. Sets
    /// `sip.stip` (never clears it) once `time` reaches `time_compare`.
    pub fn tick(&mut self, elapsed_ticks: u64, time_compare: u64) {
        self.cycle = self.cycle.wrapping_add(1);
        self.instret = self.instret.wrapping_add(1);
        self.time = self.time.wrapping_add(elapsed_ticks);
        if self.time >= time_compare {
            self.set_stip(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uro_counters_are_not_individually_writable_via_write() {
        // write() is only reachable for SRW csrs from the executor; direct
        // calls are a test-only shortcut and intentionally a no-op here.
        let mut csr = CsrFile::default();
        csr.write(CYCLE, 0xFFFF_FFFF);
        assert_eq!(csr.read(CYCLE), 0);
    }

    #[test]
    fn sstatus_bitfields_roundtrip() {
        let mut csr = CsrFile::default();
        csr.set_sie_bit(true);
        csr.set_spp_bit(true);
        assert!(csr.sie_bit());
        assert!(csr.spp_bit());
        csr.set_spp_bit(false);
        assert!(!csr.spp_bit());
        assert!(csr.sie_bit());
    }

    #[test]
    fn tick_sets_stip_once_time_reaches_compare() {
        let mut csr = CsrFile::default();
        csr.tick(5, 10);
        assert!(!csr.stip());
        csr.tick(5, 10);
        assert!(csr.stip());
    }
}
