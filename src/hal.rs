use memory_addr::{PhysAddr, VirtAddr};

/// The low-level **OS-dependent** helpers that must be provided for
/// [`crate::SMMUv3`].
pub trait PagingHandler: Sized {
    /// 6.3.24 SMMU_STRTAB_BASE
    /// • When a Linear Stream table is used, that is when SMMU_STRTAB_BASE_CFG.FMT == 0b00, the
    /// effective base address is aligned by the SMMU to the table size, ignoring the least-significant bits in the
    /// ADDR range as required to do so:
    /// ADDR[LOG2SIZE + 5:0] = 0.
    /// • When a 2-level Stream table is used, that is when SMMU_STRTAB_BASE_CFG.FMT == 0b01, the
    /// effective base address is aligned by the SMMU to the larger of 64 bytes or the first-level table size:
    /// ADDR[MAX(5, (LOG2SIZE - SPLIT - 1 + 3)):0] = 0.
    /// The alignment of ADDR is affected by the literal value of the respective
    /// SMMU_STRTAB_BASE_CFG.LOG2SIZE field and is not limited by SIDSIZE.
    /// Note: This means that configuring a table that is larger than required by the incoming StreamID span results
    /// in some entries being unreachable, but the table is still aligned to the configured size.
    /// For example, SID_BITS_SET = 16, when alloc page alignment is to 2^(16 + 6) = 2^22 = 4MB.
    const SID_BITS_SET: u32;

    /// OS-imposed cap on the Command queue size, in log2(entries). Keeping this at 8 bounds the
    /// queue to one 4 KiB page at 16 bytes/entry.
    const CMDQ_LOG2SIZE_CAP: u32;

    /// OS-imposed cap on the Event queue size, in log2(entries). Keeping this at 7 bounds the
    /// queue to one 4 KiB page at 32 bytes/entry.
    const EVENTQ_LOG2SIZE_CAP: u32;

    /// Request to allocate `num_pages` contiguous, naturally-aligned 4 KiB pages.
    fn alloc_pages(num_pages: usize) -> Option<PhysAddr>;
    /// Request to free allocated physical pages.
    fn dealloc_pages(paddr: PhysAddr, num_pages: usize);
    /// Returns a virtual address that maps to the given physical address.
    ///
    /// Used to access the physical memory directly in page table and queue implementations.
    fn phys_to_virt(paddr: PhysAddr) -> VirtAddr;
    /// Flush the memory range `[start, start+len)` so it is visible to the device.
    fn flush(start: usize, len: usize);
    /// Busy-wait for approximately `usec` microseconds.
    ///
    /// There is no scheduler to block on at this boot stage, so register-poll loops spin on this
    /// directly; it must be calibrated against a platform timer by the caller.
    fn udelay(usec: u64);
}
