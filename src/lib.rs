//! ARM System Memory Management Unit (SMMU) v3 driver written in Rust.
//!
//! Covers controller bring-up, a 4-level stage-2 page-table engine, the Command
//! and Event queues, the Stream Table builder, and a DMA mapping façade
//! on top of those, plus IORT publication and handoff-blob consumption.

#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate log;
extern crate alloc;

use core::ptr::NonNull;

use alloc::boxed::Box;
use memory_addr::PhysAddr;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::register_structs;
use tock_registers::registers::{ReadOnly, ReadWrite};

mod addr_width;
pub mod dma;
mod error;
mod event_queue;
pub mod handoff;
mod hal;
pub mod iort;
mod page_table;
mod queue;
mod regs;
mod ring;
mod stream_table;

pub use error::{Error, Result};
pub use hal::PagingHandler;
pub use regs::*;

pub use dma::{DmaMapper, Mapping, Operation};
pub use event_queue::{EventQueue, FaultRecord};
pub use page_table::Stage2Table;
pub use queue::{Cmd, Queue};
pub use stream_table::{LinearStreamTable, Stage2Config, StreamTableEntry};

register_structs! {
    /// Chapter 6. Memory map and registers 6.2.
    /// SMMU registers occupy two consecutive 64KB pages starting from an at least 64KB-aligned boundary.
    /// The following registers are accessible from the SMMU page 0 and page 1 region.
    /// - 0x00000-0x0FFFF SMMU registers, Page 0
    /// - 0x10000-0x1FFFF SMMU registers, Page 1
    #[allow(non_snake_case)]
    pub SMMUv3Regs  {
        (0x0000 => IDR0: IDR0Reg),
        (0x0004 => IDR1: IDR1Reg),
        (0x0008 => IDR2: ReadOnly<u32>),
        (0x000C => IDR3: ReadOnly<u32>),
        (0x0010 => IDR4: ReadOnly<u32>),
        (0x0014 => IDR5: IDR5Reg),
        (0x0018 => IIDR: ReadOnly<u32>),
        (0x001C => AIDR: AIDRReg),
        (0x0020 => CR0: Cr0Reg),
        (0x0024 => CR0ACK: Cr0AckReg),
        (0x0028 => CR1: Cr1Reg),
        (0x002c => CR2: Cr2Reg),
        (0x0030 => _reserved0),
        (0x0044 => GBPA: GbpaReg),
        (0x0048 => _reserved0b),
        (0x0050 => IRQ_CTRL: IrqCtrlReg),
        (0x0054 => IRQ_CTRLACK: IrqCtrlAckReg),
        (0x0058 => _reserved1),
        (0x0060 => GERROR: GerrorReg),
        (0x0064 => GERRORN: ReadWrite<u32>),
        (0x0068 => GERROR_IRQ_CFG0: ReadWrite<u64>),
        (0x0070 => _reserved2),
        (0x0080 => STRTAB_BASE: StrtabBaseReg),
        (0x0088 => STRTAB_BASE_CFG: StrtabBaseCfgReg),
        (0x008c => _reserved3),
        (0x0090 => CMDQ_BASE: CmdQBaseReg),
        (0x0098 => CMDQ_PROD: CmdQProdReg),
        (0x009c => CMDQ_CONS: CmdQConsReg),
        (0x00a0 => EVENTQ_BASE: EventQBaseReg),
        (0x00a8 => _reserved4),
        (0x00b0 => EVENTQ_IRQ_CFG0: ReadWrite<u64>),
        (0x00b8 => EVENTQ_IRQ_CFG1: ReadWrite<u32>),
        (0x00bc => EVENTQ_IRQ_CFG2: ReadWrite<u32>),
        (0x00c0 => _reserved5),
        (0x100a8 => EVENTQ_PROD: EventQProdReg),
        (0x100ac => EVENTQ_CONS: EventQConsReg),
        (0x100b0 => _reserved6),
        (0x20000 => @END),
    }
}

/// Ceiling on a single MMIO poll: 10 attempts at 100 µs each.
const POLL_ATTEMPTS: u32 = 10;
const POLL_DELAY_US: u64 = 100;

/// SMMUv3 driver with a linear stream table and a single stage-2 translation tree.
///
/// All fields are immutable after [`Self::bring_up`] returns `Ok`, except the page-table tree
/// (mutated by [`DmaMapper`]) and the Command Queue (mutated by every [`Self::send_command`]).
pub struct SMMUv3<H: PagingHandler> {
    base: NonNull<SMMUv3Regs>,
    stream_table: LinearStreamTable<H>,
    cmd_queue: Queue<H>,
    event_queue: EventQueue<H>,
}

unsafe impl<H: PagingHandler> Send for SMMUv3<H> {}
unsafe impl<H: PagingHandler> Sync for SMMUv3<H> {}

impl<H: PagingHandler> SMMUv3<H> {
    /// Construct a new SMMUv3 instance from the base address. Does not touch hardware; call
    /// [`Self::bring_up`] before using it.
    pub const fn new(base: *mut u8) -> Self {
        Self {
            base: NonNull::new(base).unwrap().cast(),
            stream_table: LinearStreamTable::uninit(),
            cmd_queue: Queue::uninit(),
            event_queue: EventQueue::uninit(),
        }
    }

    /// Get the SMMUv3 registers.
    pub const fn regs(&self) -> &SMMUv3Regs {
        unsafe { self.base.as_ref() }
    }

    /// Get the SMMUv3 version.
    pub fn version(&self) -> &'static str {
        match self.regs().AIDR.read_as_enum(AIDR::ArchMinorRev) {
            Some(AIDR::ArchMinorRev::Value::SMMUv3_0) => "SMMUv3.0",
            Some(AIDR::ArchMinorRev::Value::SMMUv3_1) => "SMMUv3.1",
            Some(AIDR::ArchMinorRev::Value::SMMUv3_2) => "SMMUv3.2",
            Some(AIDR::ArchMinorRev::Value::SMMUv3_3) => "SMMUv3.3",
            Some(AIDR::ArchMinorRev::Value::SMMUv3_4) => "SMMUv3.4",
            _ => "Unknown",
        }
    }

    /// Polls until `(read & mask) == value`, waiting `POLL_DELAY_US` between
    /// up to `POLL_ATTEMPTS` reads.
    fn poll(&self, mut read: impl FnMut() -> u32, mask: u32, value: u32) -> Result<()> {
        for attempt in 0..POLL_ATTEMPTS {
            let current = read();
            if current & mask == value {
                return Ok(());
            }
            if attempt + 1 < POLL_ATTEMPTS {
                H::udelay(POLL_DELAY_US);
            }
        }
        Err(Error::Timeout)
    }

    /// Runs the full bring-up sequence of steps 1–15.
    ///
    /// `config` supplies the Stage-2 translation parameters derived from the handoff blob and ID
    /// registers; `sid_bits` is `log2` of the Stream ID range to size the Stream Table for.
    pub fn bring_up(&mut self, sid_bits: u32, vmid: u64, config: Stage2Config) -> Result<PhysAddr> {
        // Step 1: GERROR must be clear on entry.
        if self.regs().GERROR.get() != 0 {
            return Err(Error::Timeout);
        }

        // Step 2: disable translation if any enable bit is set.
        let cr0 = self.regs().CR0.get();
        if cr0 & 0xF != 0 {
            self.regs().CR0.set(0);
            self.poll(|| self.regs().CR0ACK.get(), 0xF, 0)?;
        }

        // Step 3: disable IRQs.
        self.regs().IRQ_CTRL.set(0);
        self.poll(|| self.regs().IRQ_CTRLACK.get(), 0x7, 0)?;
        self.regs().GERRORN.set(self.regs().GERROR.get());

        // Step 4: page-table root.
        let table = page_table::Stage2Table::<H>::init()?;
        let root_pa = table.root_addr();

        // Step 5: Stream Table. Any failure from here unwinds the allocations already made,
        // per §4.7's "any allocation failure during steps 2-14 ... unwinds allocations made so
        // far and returns the error upward".
        if let Err(e) = self.stream_table.init(sid_bits) {
            table.deinit();
            return Err(e);
        }
        self.stream_table
            .fill_s2_translated(vmid as usize, root_pa, &config);

        // Step 6/7: Command and Event queues, capped by the HAL.
        let cmdq_log2 = self
            .regs()
            .IDR1
            .read(IDR1::CMDQS)
            .min(H::CMDQ_LOG2SIZE_CAP);
        if let Err(e) = self.cmd_queue.init(cmdq_log2) {
            self.stream_table.deinit();
            table.deinit();
            return Err(e);
        }
        let eventq_log2 = self
            .regs()
            .IDR1
            .read(IDR1::EVENTQS)
            .min(H::EVENTQ_LOG2SIZE_CAP);
        if let Err(e) = self.event_queue.init(eventq_log2) {
            self.cmd_queue.deinit();
            self.stream_table.deinit();
            table.deinit();
            return Err(e);
        }

        // Steps 8-14: register programming, interrupt/queue enable, invalidation, translation
        // enable. Any timeout here unwinds every allocation this call made before surfacing the
        // error, per §4.7/§7.
        if let Err(e) = self.finish_bring_up(sid_bits, cmdq_log2, eventq_log2, &config) {
            self.event_queue.deinit();
            self.cmd_queue.deinit();
            self.stream_table.deinit();
            table.deinit();
            return Err(e);
        }

        info!("SMMUv3 {} bring-up complete", self.version());
        Ok(root_pa)
    }

    fn finish_bring_up(
        &mut self,
        sid_bits: u32,
        cmdq_log2: u32,
        eventq_log2: u32,
        config: &Stage2Config,
    ) -> Result<()> {
        // Step 8: program base/config registers, reset producer/consumer indices.
        self.regs().STRTAB_BASE_CFG.write(
            STRTAB_BASE_CFG::FMT::Linear + STRTAB_BASE_CFG::LOG2SIZE.val(sid_bits),
        );
        self.regs().STRTAB_BASE.write(
            STRTAB_BASE::RA::Enable
                + STRTAB_BASE::ADDR.val(self.stream_table.base_addr().as_usize() as u64 >> 6),
        );
        self.regs().CMDQ_BASE.write(
            CMDQ_BASE::RA::ReadAllocate
                + CMDQ_BASE::ADDR.val(self.cmd_queue.base_addr().as_usize() as u64 >> 5)
                + CMDQ_BASE::LOG2SIZE.val(cmdq_log2 as _),
        );
        self.regs().CMDQ_PROD.write(CMDQ_PROD::WR.val(0));
        self.regs().CMDQ_CONS.write(CMDQ_CONS::RD.val(0));
        self.regs().EVENTQ_BASE.write(
            EVENTQ_BASE::WA::WriteAllocate
                + EVENTQ_BASE::ADDR.val(self.event_queue.base_addr().as_usize() as u64 >> 5)
                + EVENTQ_BASE::LOG2SIZE.val(eventq_log2 as _),
        );
        self.regs().EVENTQ_PROD.write(EVENTQ_PROD::WR.val(0));
        self.regs().EVENTQ_CONS.write(EVENTQ_CONS::RD.val(0));

        // Step 9: enable global-error and event-queue IRQs.
        self.regs()
            .IRQ_CTRL
            .write(IRQ_CTRL::GERROR_IRQEN::Enable + IRQ_CTRL::EVENTQ_IRQEN::Enable);
        self.poll(|| self.regs().IRQ_CTRLACK.get(), 0x5, 0x5)?;

        // Step 10: queue-walk cacheability/shareability.
        if config.cohacc {
            self.regs().CR1.write(
                CR1::QUEUE_IC::WriteBackCacheable
                    + CR1::QUEUE_OC::WriteBackCacheable
                    + CR1::QUEUE_SH::InnerShareable,
            );
        } else {
            self.regs().CR1.set(0);
        }

        // Step 11: CR2. E2H=0, RecInvSid=1, Ptm iff IDR0.BTM.
        const CR2_RECINVSID: u32 = 1 << 1;
        const CR2_PTM: u32 = 1 << 2;
        let mut cr2 = CR2_RECINVSID;
        if self.regs().IDR0.is_set(IDR0::BTM) {
            cr2 |= CR2_PTM;
        }
        self.regs().CR2.set(cr2);

        // Step 12: DSB, enable queues.
        aarch64_cpu::asm::barrier::dsb(aarch64_cpu::asm::barrier::SY);
        self.regs()
            .CR0
            .write(CR0::EVENTQEN::Enable + CR0::CMDQEN::Enable);
        self.poll(|| self.regs().CR0ACK.get(), 0xC, 0xC)?;

        // Step 13: invalidate any stale configuration/TLB state.
        self.send_command(Cmd::cmd_cfgi_all())?;
        self.send_command(Cmd::cmd_tlbi_nsnh_all())?;
        self.send_command(Cmd::cmd_tlbi_el2_all())?;
        self.send_command(Cmd::cmd_sync())?;

        // Step 14: DSB, enable translation.
        aarch64_cpu::asm::barrier::dsb(aarch64_cpu::asm::barrier::SY);
        let mut cr0_final = 0b0000_0001 | (1 << 2) | (1 << 3); // SmmuEn | EventQEn | CmdQEn
        if self.regs().IDR0.read(IDR0::ATS) != 0 {
            cr0_final |= 1 << 4; // AtsChk
        }
        self.regs().CR0.set(cr0_final);
        self.poll(|| self.regs().CR0ACK.get(), 0x1, 0x1)?;

        // Step 15: DSB.
        aarch64_cpu::asm::barrier::dsb(aarch64_cpu::asm::barrier::SY);

        Ok(())
    }

    /// Command Queue driver: inserts `cmd`, publishes the new producer index, and waits for the
    /// consumer to catch up.
    pub fn send_command(&mut self, cmd: Cmd) -> Result<()> {
        let mut attempts = 0;
        while self.cmd_queue.full() {
            attempts += 1;
            if attempts >= POLL_ATTEMPTS {
                return Err(Error::Timeout);
            }
            H::udelay(POLL_DELAY_US);
            let cons = self.regs().CMDQ_CONS.get() & (CMDQ_CONS::RD.mask << CMDQ_CONS::RD.shift);
            self.cmd_queue.set_cons_value(cons);
        }

        self.cmd_queue.cmd_insert(cmd);
        aarch64_cpu::asm::barrier::dsb(aarch64_cpu::asm::barrier::SY);

        let prod_before = self.cmd_queue.prod_value();
        self.regs().CMDQ_PROD.write(CMDQ_PROD::WR.val(prod_before));

        for attempt in 0..POLL_ATTEMPTS {
            let cons = self.regs().CMDQ_CONS.get() & (CMDQ_CONS::RD.mask << CMDQ_CONS::RD.shift);
            self.cmd_queue.set_cons_value(cons);
            if self.cmd_queue.empty() {
                return Ok(());
            }
            if attempt + 1 < POLL_ATTEMPTS {
                H::udelay(POLL_DELAY_US);
            }
        }
        Err(Error::Timeout)
    }

    /// Drains every currently-available fault record, logging each at `warn!` and writing the new
    /// consumer index back to MMIO.
    pub fn consume_events(&mut self) -> u32 {
        let prod = self.regs().EVENTQ_PROD.read(EVENTQ_PROD::WR);
        let drained = self.event_queue.drain(prod, |record| {
            warn!(
                "SMMUv3 event: type=0x{:x} sid={}",
                record.event_type(),
                record.stream_id()
            );
        });
        aarch64_cpu::asm::barrier::dsb(aarch64_cpu::asm::barrier::SY);
        self.regs()
            .EVENTQ_CONS
            .write(EVENTQ_CONS::RD.val(self.event_queue.cons()));
        drained
    }

    /// Wires [`DmaMapper::unmap`]'s TLB-invalidation callback to this controller's Command Queue:
    /// `TLBI_NSNH_ALL` → `TLBI_EL2_ALL` → `SYNC`, in that order, must complete before the unmap is
    /// observable to devices.
    pub fn unmap(&mut self, mapper: &DmaMapper<H>, mapping: Box<Mapping>) -> Result<()> {
        mapper.unmap(mapping, || {
            self.send_command(Cmd::cmd_tlbi_nsnh_all())?;
            self.send_command(Cmd::cmd_tlbi_el2_all())?;
            self.send_command(Cmd::cmd_sync())
        })
    }
}
