//! A 4-level, 4 KiB-granule VMSAv8-64 stage-2 translation table.
//!
//! Used purely as an identity-mapping backing store: the DMA façade always maps a device address
//! equal to its host physical address, but [`Stage2Table::update_mapping`] takes separate VA/PA
//! parameters for generality, matching the original table-walk code this is ported from.

use memory_addr::{PhysAddr, PAGE_SIZE_4K};

use crate::error::{Error, Result};
use crate::hal::PagingHandler;

/// Number of levels walked from the root to a leaf.
pub const PAGE_TABLE_DEPTH: u8 = 4;
/// Entries per level: a 4 KiB page of 64-bit descriptors, indexed by a 9-bit VA slice.
const ENTRIES_PER_TABLE: usize = 512;

const ADDR_MASK: u64 = !0xFFF;

/// Bit 0: entry is valid and participates in translation.
const PTE_VALID: u64 = 1 << 0;
/// Bit 1: table/page descriptor select. Always set by this engine (no block descriptors).
const PTE_TABLE: u64 = 1 << 1;
/// Bit 10: access flag. Set on every populated entry.
const PTE_AF: u64 = 1 << 10;

/// Base leaf flags: access flag set, page descriptor. OR in a permission field before use.
pub const LEAF_FLAGS_BASE: u64 = PTE_AF | PTE_TABLE;
/// AP\[2:1\] = read-only.
pub const LEAF_FLAGS_READ_ONLY: u64 = 1 << 6;
/// AP\[2:1\] = write-only.
pub const LEAF_FLAGS_WRITE_ONLY: u64 = 2 << 6;
/// AP\[2:1\] = read-write.
pub const LEAF_FLAGS_READ_WRITE: u64 = 3 << 6;

fn table_index(va: u64, level: u8) -> usize {
    ((va >> (12 + 9 * (PAGE_TABLE_DEPTH as u64 - 1 - level as u64))) & 0x1FF) as usize
}

/// Owns the root of a 4-level translation tree and mutates it in place.
///
/// There is no in-process concurrency in the firmware boot phase this driver targets, so
/// mutation is unsynchronized; a port to a preemptive runtime should guard `update_mapping` and
/// `deinit` with a single mutex shared with the Command queue driver.
pub struct Stage2Table<H: PagingHandler> {
    root: PhysAddr,
    _marker: core::marker::PhantomData<H>,
}

impl<H: PagingHandler> Stage2Table<H> {
    /// Allocates and zeroes the root page (level 0).
    pub fn init() -> Result<Self> {
        let root = alloc_zeroed_page::<H>()?;
        Ok(Self {
            root,
            _marker: core::marker::PhantomData,
        })
    }

    pub fn root_addr(&self) -> PhysAddr {
        self.root
    }

    /// Wraps an already-initialized root, e.g. the one [`crate::SMMUv3::bring_up`] installed into
    /// `STRTAB_BASE`'s Stream Table Entries. The caller must ensure `root` is a live, zeroed (or
    /// previously populated) table of this shape — this does not allocate or touch memory.
    pub unsafe fn from_root(root: PhysAddr) -> Self {
        Self {
            root,
            _marker: core::marker::PhantomData,
        }
    }

    fn entries(&self, table: PhysAddr) -> &'static mut [u64; ENTRIES_PER_TABLE] {
        let va = H::phys_to_virt(table);
        unsafe { &mut *(va.as_usize() as *mut [u64; ENTRIES_PER_TABLE]) }
    }

    /// Descends levels 0..=2, allocating intermediate tables on demand, then writes the level-3
    /// leaf entry. Idempotent: remapping the same `(va, pa, flags, valid)` yields the same leaf.
    pub fn update_mapping(&self, va: u64, pa: u64, flags: u64, valid: bool) -> Result<()> {
        let mut current = self.root;

        for level in 0..PAGE_TABLE_DEPTH - 1 {
            let index = table_index(va, level);
            let entries = self.entries(current);

            if entries[index] == 0 {
                let next = alloc_zeroed_page::<H>()?;
                entries[index] = next.as_usize() as u64;
            }

            if valid {
                entries[index] |= PTE_VALID;
            }
            entries[index] |= flags;

            current = PhysAddr::from((entries[index] & ADDR_MASK) as usize);
        }

        let index = table_index(va, PAGE_TABLE_DEPTH - 1);
        let entries = self.entries(current);

        entries[index] = (pa & ADDR_MASK) | flags;
        if valid {
            entries[index] |= PTE_VALID;
        } else {
            entries[index] &= !PTE_VALID;
        }

        Ok(())
    }

    /// Depth-first teardown: frees every page reachable from the root, then the root itself.
    pub fn deinit(self) {
        free_subtree::<H>(self.root, 0);
    }
}

fn alloc_zeroed_page<H: PagingHandler>() -> Result<PhysAddr> {
    let page = H::alloc_pages(1).ok_or(Error::OutOfResources)?;
    let va = H::phys_to_virt(page);
    unsafe {
        core::ptr::write_bytes(va.as_usize() as *mut u8, 0, PAGE_SIZE_4K);
    }
    Ok(page)
}

fn free_subtree<H: PagingHandler>(table: PhysAddr, level: u8) {
    if level < PAGE_TABLE_DEPTH - 1 {
        let va = H::phys_to_virt(table);
        let entries = unsafe { &*(va.as_usize() as *const [u64; ENTRIES_PER_TABLE]) };
        for &entry in entries.iter() {
            if entry != 0 {
                free_subtree::<H>(PhysAddr::from((entry & ADDR_MASK) as usize), level + 1);
            }
        }
    }
    H::dealloc_pages(table, 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_addr::{pa, va, VirtAddr};
    use std::alloc::{alloc_zeroed, dealloc, Layout};

    struct TestHandler;

    impl PagingHandler for TestHandler {
        const SID_BITS_SET: u32 = 4;
        const CMDQ_LOG2SIZE_CAP: u32 = 8;
        const EVENTQ_LOG2SIZE_CAP: u32 = 7;

        fn alloc_pages(num_pages: usize) -> Option<PhysAddr> {
            let layout = Layout::from_size_align(num_pages * PAGE_SIZE_4K, PAGE_SIZE_4K).ok()?;
            let ptr = unsafe { alloc_zeroed(layout) };
            if ptr.is_null() {
                None
            } else {
                Some(pa!(ptr as usize))
            }
        }

        fn dealloc_pages(paddr: PhysAddr, num_pages: usize) {
            let layout = Layout::from_size_align(num_pages * PAGE_SIZE_4K, PAGE_SIZE_4K).unwrap();
            unsafe { dealloc(paddr.as_usize() as *mut u8, layout) };
        }

        fn phys_to_virt(paddr: PhysAddr) -> VirtAddr {
            va!(paddr.as_usize())
        }

        fn flush(_start: usize, _len: usize) {}

        fn udelay(_usec: u64) {}
    }

    #[test]
    fn map_then_unmap_clears_valid_bit() {
        let table = Stage2Table::<TestHandler>::init().unwrap();
        let host = 0x4000_0000u64;
        let flags = LEAF_FLAGS_BASE | LEAF_FLAGS_READ_ONLY;

        table.update_mapping(host, host, flags, true).unwrap();
        let leaf = read_leaf::<TestHandler>(&table, host);
        assert_eq!(leaf, (host & !0xFFF) | flags | 1);

        table.update_mapping(host, host, 0, false).unwrap();
        let leaf = read_leaf::<TestHandler>(&table, host);
        assert_eq!(leaf & 1, 0);
    }

    #[test]
    fn remapping_same_inputs_is_idempotent() {
        let table = Stage2Table::<TestHandler>::init().unwrap();
        let host = 0x8000_1000u64;
        let flags = LEAF_FLAGS_BASE | LEAF_FLAGS_READ_WRITE;

        table.update_mapping(host, host, flags, true).unwrap();
        let first = read_leaf::<TestHandler>(&table, host);
        table.update_mapping(host, host, flags, true).unwrap();
        let second = read_leaf::<TestHandler>(&table, host);
        assert_eq!(first, second);
    }

    fn read_leaf<H: PagingHandler>(table: &Stage2Table<H>, va: u64) -> u64 {
        let mut current = table.root_addr();
        for level in 0..PAGE_TABLE_DEPTH - 1 {
            let index = table_index(va, level);
            let entries = table.entries(current);
            current = PhysAddr::from((entries[index] & ADDR_MASK) as usize);
        }
        let index = table_index(va, PAGE_TABLE_DEPTH - 1);
        table.entries(current)[index]
    }
}
