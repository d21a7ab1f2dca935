use core::mem::size_of;

use memory_addr::{align_up_4k, pa, va, PhysAddr, VirtAddr, PAGE_SIZE_4K};

use crate::error::{Error, Result};
use crate::hal::PagingHandler;
use crate::ring;

/// According to the SMMUv3 spec, Chapter 3. Operation 3.5. Command and Event queues.
///
/// Each circular buffer is 2^n-items in size, where 0 <= n <= 19.
/// An implementation might support fewer than 19 bits of index.
/// Each PROD and CONS register is 20 bits to accommodate the maximum 19-bit index plus the wrap bit.
pub const MAX_CMD_EVENT_QS: u32 = 19;

/// Chapter 4.
/// Commands 4.1. Commands overview
/// 4.1 Commands overview
/// 4.1.1 Command opcodes
const CMD_CFGI_STE: u64 = 0x03;
const CMD_CFGI_ALL: u64 = 0x04;
const CMD_TLBI_EL2_ALL: u64 = 0x20;
const CMD_TLBI_NSNH_ALL: u64 = 0x30;
const CMD_SYNC: u64 = 0x46;

const CMDQ_ENT_DWORDS: usize = 2;

#[derive(Default)]
#[repr(C)]
pub struct Cmd([u64; CMDQ_ENT_DWORDS]);

impl Cmd {
    /// 4.3.1 CMD_CFGI_STE(StreamID, SSec, Leaf)
    ///
    /// Invalidate the STE indicated by StreamID and SSec.
    pub fn cmd_cfgi_ste(stream_id: u32) -> Self {
        const CMD_CFGI_STE_SID_OFFSET: u64 = 32;
        const CMDQ_CFGI_1_LEAF: u64 = 1;

        let mut cmd = Self::default();
        cmd.0[0] |= CMD_CFGI_STE;
        cmd.0[0] |= (stream_id as u64) << CMD_CFGI_STE_SID_OFFSET;
        // Leaf == 1
        cmd.0[1] |= CMDQ_CFGI_1_LEAF;
        info!("CMD: 0x{:x}, 0x{:x}", cmd.0[0], cmd.0[1]);
        cmd
    }

    /// 4.3.2 CMD_CFGI_ALL()
    ///
    /// Invalidate all cached configuration data, regardless of StreamID or SubstreamID. Used
    /// during bring-up once every Stream Table Entry has been written, instead of issuing one
    /// CMD_CFGI_STE per entry.
    pub fn cmd_cfgi_all() -> Self {
        let mut cmd = Self::default();
        cmd.0[0] |= CMD_CFGI_ALL;
        // Range = 0x1F covers the full StreamID space regardless of SID_BITS_SET.
        cmd.0[1] |= 0x1F << 0;
        cmd
    }

    /// 4.7.1 CMD_TLBI_EL2_ALL()
    ///
    /// Invalidate all EL2 stage-1 TLB entries. Issued during bring-up so a stale hypervisor
    /// translation cannot outlive this driver's own (re-)initialization.
    pub fn cmd_tlbi_el2_all() -> Self {
        let mut cmd = Self::default();
        cmd.0[0] |= CMD_TLBI_EL2_ALL;
        cmd
    }

    /// 4.6.5 CMD_TLBI_NSNH_ALL()
    ///
    /// Invalidate all Non-secure, Non-hyp TLB entries, across every VMID. Issued after any stage-2
    /// mapping change since a single stage-2 leaf invalidation command is not defined; the driver
    /// always invalidates the whole TLB and waits on a CMD_SYNC before reporting the unmap done.
    pub fn cmd_tlbi_nsnh_all() -> Self {
        let mut cmd = Self::default();
        cmd.0[0] |= CMD_TLBI_NSNH_ALL;
        cmd
    }

    /// 4.7.3 CMD_SYNC(ComplSignal, MSIAddress, MSIData, MSIWriteAttributes)
    ///
    /// This command provides a synchronization mechanism for the following:
    /// - Preceding commands that were issued to the same Command queue as the CMD_SYNC.
    /// - Visibility of event records for client transactions terminated before the CMD_SYNC.
    /// - HTTU updates caused by completed translations.
    pub fn cmd_sync() -> Self {
        let mut cmd = Self::default();
        cmd.0[0] |= CMD_SYNC;
        cmd
    }
}

/// 3.5 Command and Event queues
pub struct Queue<H: PagingHandler> {
    base: VirtAddr,
    base_pa: PhysAddr,
    num_pages: usize,
    queue_size: u32,
    qs: u32, //log2(queue_size),
    prod: u32,
    cons: u32,
    _marker: core::marker::PhantomData<H>,
}

impl<H: PagingHandler> Queue<H> {
    pub const fn uninit() -> Self {
        Self {
            base: va!(0xdead_beef),
            base_pa: pa!(0xdead_beef),
            num_pages: 0,
            queue_size: 0,
            qs: 0,
            prod: 0,
            cons: 0,
            _marker: core::marker::PhantomData,
        }
    }

    /// Allocates the backing pages for a `2^qs`-entry ring. Fails with [`Error::OutOfResources`]
    /// if the underlying page allocator is exhausted; the caller is responsible for unwinding any
    /// other bring-up allocations already made.
    pub fn init(&mut self, qs: u32) -> Result<()> {
        assert_eq!(size_of::<Cmd>(), CMDQ_ENT_DWORDS << 3);

        let qs = u32::min(qs, MAX_CMD_EVENT_QS);
        self.qs = qs;
        self.queue_size = 1 << qs;

        let num_pages = align_up_4k(self.queue_size as usize * size_of::<Cmd>()) / PAGE_SIZE_4K;
        let base_pa = H::alloc_pages(num_pages).ok_or(Error::OutOfResources)?;
        self.num_pages = num_pages;
        self.base_pa = base_pa;
        self.base = H::phys_to_virt(base_pa);
        Ok(())
    }

    /// Frees the backing pages allocated by [`Self::init`]. No-op on a never-initialized queue.
    pub fn deinit(&mut self) {
        if self.num_pages != 0 {
            H::dealloc_pages(self.base_pa, self.num_pages);
            self.num_pages = 0;
        }
    }

    pub fn base_addr(&self) -> VirtAddr {
        self.base
    }

    pub fn prod_value(&self) -> u32 {
        self.prod
    }

    pub fn cons_value(&self) -> u32 {
        self.cons
    }

    pub fn set_cons_value(&mut self, cons: u32) {
        if cons & !((1 << self.qs) - 1) != 0 {
            warn!("Invalid cons value {}", cons);
        }
        self.cons = cons;
    }

    pub fn full(&self) -> bool {
        ring::is_full(self.prod, self.cons, self.qs)
    }

    pub fn empty(&self) -> bool {
        ring::is_empty(self.prod, self.cons, self.qs)
    }

    /// Writes `cmd` at the current producer slot and advances the local producer index. Callers
    /// must check [`Self::full`] first and must publish the updated [`Self::prod_value`] to
    /// `SMMU_CMDQ_PROD` themselves, after a memory barrier.
    pub fn cmd_insert(&mut self, cmd: Cmd) {
        let idx = ring::slot(self.prod, self.qs) as usize;
        let base = self.base.as_mut_ptr() as *mut Cmd;
        unsafe {
            base.add(idx).write(cmd);
        }
        self.prod = ring::advance(self.prod, self.qs);
    }
}

#[cfg(test)]
mod test {
    use memory_addr::{pa, va, PhysAddr, VirtAddr, PAGE_SIZE_4K};

    use crate::queue::Queue;

    static mut DUMMY_PAGE: [u8; PAGE_SIZE_4K] = [0; PAGE_SIZE_4K];

    struct DummyPagingHandler {}

    impl crate::hal::PagingHandler for DummyPagingHandler {
        const SID_BITS_SET: u32 = 4;
        const CMDQ_LOG2SIZE_CAP: u32 = 8;
        const EVENTQ_LOG2SIZE_CAP: u32 = 7;

        fn alloc_pages(pages: usize) -> Option<PhysAddr> {
            assert!(pages == 1);
            Some(pa!(unsafe { DUMMY_PAGE.as_mut_ptr() } as usize))
        }

        fn phys_to_virt(addr: PhysAddr) -> VirtAddr {
            va!(addr.as_usize())
        }

        fn dealloc_pages(paddr: PhysAddr, _num_pages: usize) {
            assert!(paddr == pa!(unsafe { DUMMY_PAGE.as_mut_ptr() } as usize));
        }

        fn flush(_start: usize, _len: usize) {}

        fn udelay(_usec: u64) {}
    }

    #[test]
    fn test_queue() {
        let mut queue = Queue::<DummyPagingHandler>::uninit();
        queue.init(7).unwrap();

        assert_eq!(
            queue.base_addr(),
            va!(unsafe { DUMMY_PAGE.as_mut_ptr() } as usize)
        );
        assert_eq!(queue.prod_value(), 0);
        assert_eq!(queue.cons_value(), 0);

        assert_eq!(queue.full(), false);
        assert_eq!(queue.empty(), true);

        for i in 0..64 {
            queue.cmd_insert(crate::queue::Cmd::cmd_cfgi_ste(i));
        }

        assert_eq!(queue.full(), false);
        assert_eq!(queue.empty(), false);
        assert_eq!(queue.prod_value(), 64);

        for i in 64..128 {
            queue.cmd_insert(crate::queue::Cmd::cmd_cfgi_ste(i));
        }

        assert_eq!(queue.full(), true);
        assert_eq!(queue.empty(), false);
        assert_eq!(queue.prod_value(), 1 << 7);
    }

    #[test]
    fn cfgi_all_and_tlbi_commands_carry_expected_opcodes() {
        let cfgi_all = crate::queue::Cmd::cmd_cfgi_all();
        let tlbi_el2 = crate::queue::Cmd::cmd_tlbi_el2_all();
        let tlbi_nsnh = crate::queue::Cmd::cmd_tlbi_nsnh_all();
        assert_eq!(cfgi_all.0[0] & 0xFF, 0x04);
        assert_eq!(tlbi_el2.0[0] & 0xFF, 0x20);
        assert_eq!(tlbi_nsnh.0[0] & 0xFF, 0x30);
    }
}
