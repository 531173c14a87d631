//! The Sv32 two-level page-table walker.

use rv32_core::bits::get;
use rv32_core::error::FatalError;
use rv32_core::memmap::MemoryMap;

use crate::csr::CsrFile;
use crate::trap::ExceptionCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    Execute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    User,
    Supervisor,
}

/// A translation failure becomes a guest page-fault exception; the caller
/// is responsible for raising it with the faulting virtual address as
/// `stval`.
pub struct PageFault(pub ExceptionCode);

/// Walk `satp`/the page tables to translate `vaddr`, or return a page
/// fault. Returns the physical address unchanged when `satp.mode == 0`
/// (bare, identity-mapped).
pub fn translate(
    vaddr: u32,
    access: Access,
    privilege: Privilege,
    csr: &CsrFile,
    mem: &mut MemoryMap,
) -> Result<Result<u32, PageFault>, FatalError> {
    if csr.satp_mode() == 0 {
        return Ok(Ok(vaddr));
    }

    let fault_code = match access {
        Access::Read => ExceptionCode::LoadPageFault,
        Access::Write => ExceptionCode::StoreAmoPageFault,
        Access::Execute => ExceptionCode::InstructionPageFault,
    };

    let vpn = [get(vaddr, 21, 12), get(vaddr, 31, 22)];
    let mut base = csr.satp_ppn() * 4096;

    for i in (0..=1).rev() {
        let pte_addr = base + vpn[i as usize] * 4;
        let pte = mem.read_word(pte_addr)?;

        let valid = get(pte, 0, 0) != 0;
        let readable = get(pte, 1, 1) != 0;
        let writable = get(pte, 2, 2) != 0;
        let executable = get(pte, 3, 3) != 0;
        let user = get(pte, 4, 4) != 0;
        let accessed = get(pte, 6, 6) != 0;
        let dirty = get(pte, 7, 7) != 0;
        let ppn0 = get(pte, 19, 10);
        let ppn1 = get(pte, 31, 20);

        if !valid || (!readable && writable) {
            return Ok(Err(PageFault(fault_code)));
        }

        if readable || executable {
            if privilege == Privilege::User && !user {
                return Ok(Err(PageFault(fault_code)));
            }
            match access {
                Access::Write if !writable => return Ok(Err(PageFault(fault_code))),
                Access::Execute if !executable => return Ok(Err(PageFault(fault_code))),
                Access::Read if !(readable || (csr.mxr_bit() && executable)) => {
                    return Ok(Err(PageFault(fault_code)));
                }
                _ => {}
            }
            if privilege == Privilege::Supervisor && user {
                let blocked = match access {
                    Access::Execute => true,
                    Access::Read | Access::Write => !csr.sum_bit(),
                };
                if blocked {
                    return Ok(Err(PageFault(fault_code)));
                }
            }

            // Superpage: a level-1 leaf must have ppn0 == 0.
            if i == 1 && ppn0 != 0 {
                return Ok(Err(PageFault(fault_code)));
            }

            if !accessed || (access == Access::Write && !dirty) {
                return Ok(Err(PageFault(fault_code)));
            }

            let page_offset = get(vaddr, 11, 0);
            let (out_ppn0, out_ppn1) = if i == 1 { (vpn[0], ppn1) } else { (ppn0, ppn1) };
            let phys: u64 =
                u64::from(page_offset) | (u64::from(out_ppn0) << 12) | (u64::from(out_ppn1) << 22);
            if phys & !0xFFFF_FFFFu64 != 0 {
                return Err(FatalError::PhysicalAddressOverflow { bits: phys });
            }
            return Ok(Ok(phys as u32));
        }

        // Non-leaf: descend.
        base = ((ppn1 << 10) | ppn0) * 4096;
    }

    Ok(Err(PageFault(fault_code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv32_core::memmap::FlatMemory;

    fn mem_with_identity_leaf(vpn1: u32, vpn0: u32, ppn1: u32, ppn0: u32, flags: u32) -> MemoryMap {
        let mut mem = MemoryMap::new();
        mem.register(Box::new(FlatMemory::new(0, 0x10_0000)));
        // root table at physical 0, one entry at vpn1 pointing to a leaf
        // table at physical 0x2000, whose vpn0 entry is the actual leaf.
        let leaf_table_ppn = 0x2000 / 4096;
        let root_pte = (leaf_table_ppn << 10) | 0b0000_0001; // V=1, non-leaf
        mem.write_word(vpn1 * 4, root_pte).unwrap();
        let leaf_pte = (ppn1 << 20) | (ppn0 << 10) | flags;
        mem.write_word(0x2000 + vpn0 * 4, leaf_pte).unwrap();
        mem
    }

    #[test]
    fn bare_mode_is_identity() {
        let csr = CsrFile::default();
        let mut mem = MemoryMap::new();
        mem.register(Box::new(FlatMemory::new(0, 0x1000)));
        let r = translate(0x1234, Access::Read, Privilege::Supervisor, &csr, &mut mem).unwrap();
        assert_eq!(r.ok(), Some(0x1234));
    }

    #[test]
    fn two_level_walk_resolves_leaf() {
        let mut csr = CsrFile::default();
        csr.write(crate::csr::SATP, 1 << 31);
        // V R W X U A D = 1 1 1 0 1 1 1  -> bits 0,1,2,4,6,7
        let flags = 0b1101_0111;
        let vaddr = (3u32 << 22) | (5u32 << 12) | 0x10;
        let mut mem = mem_with_identity_leaf(3, 5, 0, 0x42, flags);
        let r = translate(vaddr, Access::Read, Privilege::Supervisor, &csr, &mut mem).unwrap();
        let phys = r.ok().unwrap();
        assert_eq!(phys, (0x42 << 12) | 0x10);
    }

    #[test]
    fn write_without_dirty_bit_faults() {
        let mut csr = CsrFile::default();
        csr.write(crate::csr::SATP, 1 << 31);
        // V R W X U A D = 1 1 1 0 1 1 0 (no dirty)
        let flags = 0b0101_0111;
        let vaddr = (3u32 << 22) | (5u32 << 12);
        let mut mem = mem_with_identity_leaf(3, 5, 0, 0x42, flags);
        let r = translate(vaddr, Access::Write, Privilege::Supervisor, &csr, &mut mem).unwrap();
        assert!(r.is_err());
    }
}
