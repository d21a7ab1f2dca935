//! Handoff consumer + bootstrap.
//!
//! Mirrors the entry point of the firmware phase this driver runs in: a prior phase hands off an
//! IORT skeleton through some platform-specific side channel — out of scope here —
//! and this module pulls the fields bring-up needs out of it, drives [`crate::SMMUv3::bring_up`],
//! publishes the IORT table through an injected ACPI table installer, and returns a
//! [`DmaMapper`] ready to be installed as the platform's DMA-mapping interface.

use tock_registers::interfaces::Readable;

use crate::addr_width;
use crate::dma::DmaMapper;
use crate::error::{Error, Result};
use crate::hal::PagingHandler;
use crate::iort::{
    IortTable, ItsNode, RcNode, SmmuIdMap, SmmuV3Node, SMMUV3_FLAG_COHACC_OVERRIDE,
};
use crate::page_table::Stage2Table;
use crate::stream_table::Stage2Config;
use crate::{SMMUv3, IDR0, IDR1, IDR5};

/// The subset of the prior boot phase's IORT skeleton this driver reads: the SMMUv3
/// node's base and COHACC flag, the Root Complex node's coherence/memory-access hints, and the
/// Stream ID range the SMMU ID map publishes for this platform.
#[derive(Debug, Clone, Copy)]
pub struct HandoffBlob {
    /// SMMUv3 node `Base`.
    pub smmu_base: usize,
    /// SMMUv3 node `Flags & COHACC_OVERRIDE`.
    pub cohacc_override: bool,
    /// Interrupt numbers the SMMUv3 node carries; forwarded unmodified into the published IORT
    /// table. This driver's own bring-up only enables the corresponding IRQ lines,
    /// it does not route them anywhere.
    pub event_gsiv: u32,
    pub gerr_gsiv: u32,
    pub sync_gsiv: u32,
    /// Root Complex node `CacheCoherent`.
    pub rc_cache_coherent: bool,
    /// Root Complex node `MemoryAccessFlags`: bit 0 = CPM, bit 1 = DACS.
    pub rc_memory_access_flags: u8,
    /// SMMU ID map `OutputBase`.
    pub stream_id_output_base: u32,
    /// SMMU ID map `NumIds`.
    pub stream_id_num_ids: u32,
}

impl HandoffBlob {
    fn cache_prefetch_memory(&self) -> bool {
        self.rc_memory_access_flags & 0b01 != 0
    }

    fn dacs(&self) -> bool {
        self.rc_memory_access_flags & 0b10 != 0
    }

    /// `MaxStreamID = OutputBase + NumIds`.
    pub fn max_stream_id(&self) -> u32 {
        self.stream_id_output_base + self.stream_id_num_ids
    }

    /// `L = floor(log2(MaxStreamID)) + 1`, the Stream Table's linear size exponent. A
    /// platform that publishes no Stream IDs at all still gets a single-entry table.
    pub fn stream_table_log2_size(&self) -> u32 {
        let max_sid = self.max_stream_id();
        if max_sid <= 1 {
            0
        } else {
            32 - max_sid.leading_zeros()
        }
    }
}

/// Publishes a fully serialized ACPI table. The ACPI table installer itself is an external
/// collaborator; callers provide an implementation that forwards `bytes` to it.
pub trait AcpiPublisher {
    fn publish_table(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Fixed non-zero VMID: a single stage-2 translation domain is shared by every Stream ID,
/// so any non-zero value works; this driver always uses 1.
const STAGE2_VMID: u64 = 1;

/// Builds the Stage-2 configuration template from controller ID registers and the handoff
/// blob, ahead of [`SMMUv3::bring_up`].
fn stage2_config<H: PagingHandler>(smmu: &SMMUv3<H>, blob: &HandoffBlob) -> Stage2Config {
    let idr0 = smmu.regs().IDR0.extract();
    let idr1 = smmu.regs().IDR1.extract();
    let idr5 = smmu.regs().IDR5.extract();

    let oas_code = idr5.read(IDR5::OAS);
    let input_size = addr_width::decode(oas_code);
    let output_size = input_size.min(48);

    Stage2Config {
        input_size,
        output_size,
        both_stages_implemented: idr0.is_set(IDR0::S1P) && idr0.is_set(IDR0::S2P),
        cohacc: blob.cohacc_override,
        attr_types_ovr: idr1.is_set(IDR1::ATTR_TYPES_OVR),
        cache_coherent: blob.rc_cache_coherent,
        cache_prefetch_memory: blob.cache_prefetch_memory(),
        dacs: blob.dacs(),
    }
}

/// Serializes the IORT table this driver publishes: a generic header followed by an ITS
/// group node, the SMMUv3 node, and the Root Complex node, each sharing the blob's Stream ID
/// range in their ID maps.
fn build_iort_table(blob: &HandoffBlob) -> IortTable {
    // The Root Complex's Stream ID map routes through the SMMUv3 node; the SMMUv3 node's own map
    // routes through the ITS group (for MSI-signaled completion), mirroring the original driver's
    // `AddIortTable` node layout.
    let rc_id_map = SmmuIdMap {
        input_base: 0,
        num_ids: blob.stream_id_num_ids,
        output_base: blob.stream_id_output_base,
        output_reference: IortTable::SMMU_OFFSET as u32,
        flags: 0,
    };
    let smmu_id_map = SmmuIdMap {
        input_base: 0,
        num_ids: blob.stream_id_num_ids,
        output_base: 0,
        output_reference: IortTable::ITS_OFFSET as u32,
        flags: 0,
    };

    let flags = if blob.cohacc_override {
        SMMUV3_FLAG_COHACC_OVERRIDE
    } else {
        0
    };

    IortTable {
        its: ItsNode::new(),
        smmu: SmmuV3Node::new(
            blob.smmu_base as u64,
            flags,
            blob.event_gsiv,
            blob.gerr_gsiv,
            blob.sync_gsiv,
            smmu_id_map,
        ),
        rc: RcNode::new(blob.rc_cache_coherent, blob.rc_memory_access_flags, rc_id_map),
    }
}

/// The handoff→bring-up→publish sequence, mirroring the original driver's entry point:
/// fetch the handoff blob, fail fast with [`Error::NotFound`] if it is absent, publish the IORT
/// table, bring the controller up to a translating state, and hand back a [`DmaMapper`] over the
/// freshly-installed stage-2 tree.
///
/// `blob` is `None` when the prior boot phase never published its configuration; this driver has
/// no fallback and aborts.
pub fn bootstrap<H: PagingHandler>(
    blob: Option<&HandoffBlob>,
    acpi: &mut impl AcpiPublisher,
) -> Result<(SMMUv3<H>, DmaMapper<H>)> {
    let blob = blob.ok_or(Error::NotFound)?;

    let table = build_iort_table(blob);
    acpi.publish_table(&table.to_bytes())?;

    let mut smmu = SMMUv3::<H>::new(blob.smmu_base as *mut u8);
    let config = stage2_config(&smmu, blob);
    let sid_bits = blob.stream_table_log2_size();

    let root_pa = smmu.bring_up(sid_bits, STAGE2_VMID, config)?;
    let table = unsafe { Stage2Table::<H>::from_root(root_pa) };
    let mapper = DmaMapper::new(table);

    Ok((smmu, mapper))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(output_base: u32, num_ids: u32) -> HandoffBlob {
        HandoffBlob {
            smmu_base: 0x4000_0000,
            cohacc_override: false,
            event_gsiv: 100,
            gerr_gsiv: 101,
            sync_gsiv: 102,
            rc_cache_coherent: true,
            rc_memory_access_flags: 0b01,
            stream_id_output_base: output_base,
            stream_id_num_ids: num_ids,
        }
    }

    #[test]
    fn stream_table_log2_size_covers_full_16_bit_range() {
        let b = blob(0, 0xFFFF);
        assert_eq!(b.max_stream_id(), 0xFFFF);
        assert_eq!(b.stream_table_log2_size(), 16);
    }

    #[test]
    fn stream_table_log2_size_is_zero_for_a_single_stream_id() {
        let b = blob(0, 1);
        assert_eq!(b.stream_table_log2_size(), 0);
    }

    #[test]
    fn memory_access_flags_decode_cpm_and_dacs_independently() {
        let b = blob(0, 1);
        assert!(b.cache_prefetch_memory());
        assert!(!b.dacs());

        let mut b2 = b;
        b2.rc_memory_access_flags = 0b10;
        assert!(!b2.cache_prefetch_memory());
        assert!(b2.dacs());
    }

    struct NullPublisher {
        published: Option<usize>,
    }

    impl AcpiPublisher for NullPublisher {
        fn publish_table(&mut self, bytes: &[u8]) -> Result<()> {
            self.published = Some(bytes.len());
            Ok(())
        }
    }

    #[test]
    fn missing_blob_aborts_with_not_found() {
        struct Handler;
        impl PagingHandler for Handler {
            const SID_BITS_SET: u32 = 4;
            const CMDQ_LOG2SIZE_CAP: u32 = 8;
            const EVENTQ_LOG2SIZE_CAP: u32 = 7;
            fn alloc_pages(_: usize) -> Option<memory_addr::PhysAddr> {
                unreachable!()
            }
            fn dealloc_pages(_: memory_addr::PhysAddr, _: usize) {}
            fn phys_to_virt(paddr: memory_addr::PhysAddr) -> memory_addr::VirtAddr {
                memory_addr::VirtAddr::from(paddr.as_usize())
            }
            fn flush(_: usize, _: usize) {}
            fn udelay(_: u64) {}
        }

        let mut publisher = NullPublisher { published: None };
        let result = bootstrap::<Handler>(None, &mut publisher);
        assert_eq!(result.err(), Some(Error::NotFound));
        assert_eq!(publisher.published, None);
    }
}
