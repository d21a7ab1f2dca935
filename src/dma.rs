//! DMA mapping façade: `AllocateBuffer`/`FreeBuffer`/`Map`/`Unmap`/`SetAttribute`.
//!
//! Kept independent of the Command Queue type so it can be unit-tested without a live controller:
//! [`DmaMapper::unmap`] takes the TLB-invalidation step as a caller-supplied closure, which
//! [`crate::SMMUv3::unmap`] wires to its own `send_command`.

use alloc::boxed::Box;

use memory_addr::PAGE_SIZE_4K;

use crate::error::{Error, Result};
use crate::hal::PagingHandler;
use crate::page_table::{Stage2Table, LEAF_FLAGS_BASE, LEAF_FLAGS_READ_ONLY, LEAF_FLAGS_READ_WRITE, LEAF_FLAGS_WRITE_ONLY};

/// The permission a mapping grants to the device side of the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    CommonBuffer,
}

impl Operation {
    /// Maps an operation to the leaf flags used when writing stage-2 page-table entries.
    fn leaf_flags(self) -> u64 {
        let perm = match self {
            Operation::Read => LEAF_FLAGS_READ_ONLY,
            Operation::Write => LEAF_FLAGS_WRITE_ONLY,
            Operation::CommonBuffer => LEAF_FLAGS_READ_WRITE,
        };
        LEAF_FLAGS_BASE | perm
    }

    /// Decodes the wire-level operation code used by [`DmaMapper::map`]'s callers. Any value
    /// outside 0..=2 is rejected with `InvalidParameter`.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Operation::Read),
            1 => Ok(Operation::Write),
            2 => Ok(Operation::CommonBuffer),
            _ => Err(Error::InvalidParameter),
        }
    }
}

/// One active DMA mapping. Opaque to callers outside this module; destroyed by
/// [`DmaMapper::unmap`].
pub struct Mapping {
    bytes: usize,
    device_addr: u64,
    host_addr: u64,
}

impl Mapping {
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn device_addr(&self) -> u64 {
        self.device_addr
    }

    pub fn host_addr(&self) -> u64 {
        self.host_addr
    }
}

/// Owns the stage-2 table that backs every mapping created through it.
pub struct DmaMapper<H: PagingHandler> {
    table: Stage2Table<H>,
}

fn page_range(host: u64, bytes: usize) -> impl Iterator<Item = u64> {
    let start_page = host & !(PAGE_SIZE_4K as u64 - 1);
    let end = host + bytes as u64;
    let page_count = ((end - start_page) as usize).div_ceil(PAGE_SIZE_4K).max(1);
    (0..page_count as u64).map(move |i| start_page + i * PAGE_SIZE_4K as u64)
}

impl<H: PagingHandler> DmaMapper<H> {
    pub fn new(table: Stage2Table<H>) -> Self {
        Self { table }
    }

    /// **AllocateBuffer(type, memory-type, pages, &out)**: delegates straight to the system page
    /// allocator; the DMA façade itself has no buffer-pool policy.
    pub fn allocate_buffer(&self, pages: usize) -> Result<u64> {
        H::alloc_pages(pages)
            .map(|pa| pa.as_usize() as u64)
            .ok_or(Error::OutOfResources)
    }

    /// **FreeBuffer(pages, host_addr)**.
    pub fn free_buffer(&self, host_addr: u64, pages: usize) {
        H::dealloc_pages(memory_addr::PhysAddr::from(host_addr as usize), pages);
    }

    /// **Map(op, host, bytes, &device_addr, &mapping)**: identity-maps every 4 KiB page covering
    /// `[host, host+bytes)` with permissions derived from `op`, and returns the opaque mapping
    /// record. If a page-table allocation fails partway through, the leaves already written are
    /// left in place; the caller must still invoke [`Self::unmap`] to clean up.
    pub fn map(&self, op_code: u32, host: u64, bytes: usize) -> Result<(u64, Box<Mapping>)> {
        let op = Operation::from_code(op_code)?;
        let flags = op.leaf_flags();

        for page in page_range(host, bytes) {
            self.table.update_mapping(page, page, flags, true)?;
        }

        let mapping = Box::new(Mapping {
            bytes,
            device_addr: host,
            host_addr: host,
        });
        Ok((host, mapping))
    }

    /// **Unmap(mapping)**: clears the valid bit on every leaf the mapping covers, then invokes
    /// `invalidate_tlb` — expected to issue `TLBI_NSNH_ALL` → `TLBI_EL2_ALL` → `SYNC` in that
    /// order — before the mapping record is dropped.
    pub fn unmap(
        &self,
        mapping: Box<Mapping>,
        mut invalidate_tlb: impl FnMut() -> Result<()>,
    ) -> Result<()> {
        for page in page_range(mapping.host_addr, mapping.bytes) {
            self.table.update_mapping(page, page, 0, false)?;
        }
        invalidate_tlb()
    }

    /// **SetAttribute(device_handle, mapping, access)**: reserved for future per-mapping
    /// attribute changes; currently a no-op.
    pub fn set_attribute(&self, _mapping: &Mapping, _access: u32) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_addr::{pa, va, PhysAddr, VirtAddr};
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

    fn mapper() -> DmaMapper<TestHandler> {
        DmaMapper::new(Stage2Table::init().unwrap())
    }

    #[test]
    fn map_single_page_returns_identity_device_address() {
        let mapper = mapper();
        let (device_addr, mapping) = mapper.map(0, 0x4000_0000, 0x1000).unwrap();
        assert_eq!(device_addr, 0x4000_0000);
        assert_eq!(mapping.device_addr(), 0x4000_0000);
        assert_eq!(mapping.host_addr(), 0x4000_0000);
    }

    #[test]
    fn map_cross_page_write_touches_two_pages() {
        let mapper = mapper();
        let pages: alloc::vec::Vec<u64> = page_range(0x8000_0FF0, 0x20).collect();
        assert_eq!(pages, alloc::vec![0x8000_0000u64, 0x8000_1000u64]);
    }

    #[test]
    fn map_rejects_unknown_operation_code() {
        let mapper = mapper();
        let result = mapper.map(99, 0x4000_0000, 0x1000);
        assert_eq!(result.err(), Some(Error::InvalidParameter));
    }

    #[test]
    fn unmap_runs_invalidation_callback_exactly_once() {
        let mapper = mapper();
        let (_, mapping) = mapper.map(2, 0x1000_0000, 0x1000).unwrap();
        let mut calls = 0;
        mapper
            .unmap(mapping, || {
                calls += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(calls, 1);
    }
}
