//! IORT (I/O Remapping Table) serialization.
//!
//! Layout and checksum convention ported from the firmware's `AddIortTable`/
//! `AcpiPlatformChecksum`: the table is a concatenation of a generic ACPI description header
//! followed by three IORT nodes (ITS group, SMMUv3, Root Complex), and the header's checksum is
//! computed over the whole buffer after zeroing the checksum byte.

use core::mem::size_of;

/// Generic ACPI System Description Table Header, common to every ACPI table.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct TableHeader {
    pub signature: [u8; 4],
    pub length: u32,
    pub revision: u8,
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub oem_table_id: [u8; 8],
    pub oem_revision: u32,
    pub creator_id: [u8; 4],
    pub creator_revision: u32,
    /// Number of IORT nodes following the header. Fixed at 3 (ITS, SMMUv3, RC) by this driver.
    pub num_nodes: u32,
    /// Byte offset from the start of the table to the first node.
    pub node_offset: u32,
}

impl TableHeader {
    pub const SIGNATURE: [u8; 4] = *b"IORT";

    pub fn new(length: u32) -> Self {
        Self {
            signature: Self::SIGNATURE,
            length,
            revision: 3,
            checksum: 0,
            oem_id: *b"SMMUV3",
            oem_table_id: *b"SMMUDRV\0",
            oem_revision: 1,
            creator_id: *b"SMMU",
            creator_revision: 1,
            num_nodes: 3,
            node_offset: size_of::<TableHeader>() as u32,
        }
    }
}

/// ITS Group node. The driver never reads back ITS identifiers; one entry is always published
/// pointing at GIC ITS identifier 0.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct ItsNode {
    pub node_type: u8,
    pub length: u16,
    pub revision: u8,
    pub identifier: u32,
    pub mapping_count: u32,
    pub mapping_offset: u32,
    pub its_count: u32,
    pub its_identifier: u32,
}

impl ItsNode {
    const NODE_TYPE_ITS_GROUP: u8 = 0x00;

    pub fn new() -> Self {
        Self {
            node_type: Self::NODE_TYPE_ITS_GROUP,
            length: size_of::<Self>() as u16,
            revision: 0,
            identifier: 0,
            mapping_count: 0,
            mapping_offset: 0,
            its_count: 1,
            its_identifier: 0,
        }
    }
}

impl Default for ItsNode {
    fn default() -> Self {
        Self::new()
    }
}

/// `COHACC_OVERRIDE` bit of [`SmmuV3Node::flags`] — coherent access override, consumed by the
/// Stream Table builder and the controller's CR1/COHACC-dependent bring-up programming.
pub const SMMUV3_FLAG_COHACC_OVERRIDE: u32 = 1 << 0;

/// SMMUv3 IORT node. Carries the MMIO base and the subset of fields this driver's bring-up reads
/// back from the handoff blob.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct SmmuV3Node {
    pub node_type: u8,
    pub length: u16,
    pub revision: u8,
    pub identifier: u32,
    pub mapping_count: u32,
    pub mapping_offset: u32,
    /// MMIO base address of the SMMUv3 register set.
    pub base: u64,
    pub flags: u32,
    pub reserved: u32,
    pub vatos_address: u64,
    pub model: u32,
    pub event_gsiv: u32,
    pub pri_gsiv: u32,
    pub gerr_gsiv: u32,
    pub sync_gsiv: u32,
    /// Stream ID map entry: `{input_base, num_ids, output_base, output_reference, flags}`.
    pub id_map: SmmuIdMap,
}

impl SmmuV3Node {
    const NODE_TYPE_SMMUV3: u8 = 0x04;

    pub fn new(base: u64, flags: u32, event_gsiv: u32, gerr_gsiv: u32, sync_gsiv: u32, id_map: SmmuIdMap) -> Self {
        Self {
            node_type: Self::NODE_TYPE_SMMUV3,
            length: size_of::<Self>() as u16,
            revision: 4,
            identifier: 0,
            mapping_count: 1,
            mapping_offset: (size_of::<Self>() - size_of::<SmmuIdMap>()) as u32,
            base,
            flags,
            reserved: 0,
            vatos_address: 0,
            model: 0,
            event_gsiv,
            pri_gsiv: 0,
            gerr_gsiv,
            sync_gsiv,
            id_map,
        }
    }
}

/// Root Complex IORT node. Carries the cache-coherence and memory-access-hint fields that
/// condition the Stream Table Entry and `CR1` programming.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct RcNode {
    pub node_type: u8,
    pub length: u16,
    pub revision: u8,
    pub identifier: u32,
    pub mapping_count: u32,
    pub mapping_offset: u32,
    pub cache_coherent: u32,
    /// Bit 0: CPM (cache-prefetch-memory). Bit 1: DACS (device-attribute-coherency-supported is
    /// NOT what DACS expands to here; kept as an opaque flags word per the handoff contract).
    pub memory_access_flags: u8,
    pub ats_attribute: u32,
    pub pci_segment_number: u32,
    pub id_map: SmmuIdMap,
}

impl RcNode {
    const NODE_TYPE_ROOT_COMPLEX: u8 = 0x02;
    /// ATS is never advertised by this driver.
    const ATS_UNSUPPORTED: u32 = 0;

    pub fn new(cache_coherent: bool, memory_access_flags: u8, id_map: SmmuIdMap) -> Self {
        Self {
            node_type: Self::NODE_TYPE_ROOT_COMPLEX,
            length: size_of::<Self>() as u16,
            revision: 3,
            identifier: 0,
            mapping_count: 1,
            mapping_offset: (size_of::<Self>() - size_of::<SmmuIdMap>()) as u32,
            cache_coherent: cache_coherent as u32,
            memory_access_flags,
            ats_attribute: Self::ATS_UNSUPPORTED,
            pci_segment_number: 0,
            id_map,
        }
    }
}

/// Stream ID map entry shared by [`SmmuV3Node`] and [`RcNode`]: `[input_base, input_base+num_ids)`
/// maps to `[output_base, output_base+num_ids)` on the node referenced by `output_reference`.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SmmuIdMap {
    pub input_base: u32,
    pub num_ids: u32,
    pub output_base: u32,
    pub output_reference: u32,
    pub flags: u32,
}

/// Full IORT table: header followed by the three nodes, in the order the firmware publishes
/// them. `bytes()` serializes it and patches in `Length` and the header checksum.
pub struct IortTable {
    pub its: ItsNode,
    pub smmu: SmmuV3Node,
    pub rc: RcNode,
}

impl IortTable {
    /// Byte offset of the ITS node from the start of the serialized table.
    pub const ITS_OFFSET: usize = size_of::<TableHeader>();
    /// Byte offset of the SMMUv3 node from the start of the serialized table.
    pub const SMMU_OFFSET: usize = Self::ITS_OFFSET + size_of::<ItsNode>();
    /// Byte offset of the Root Complex node from the start of the serialized table.
    pub const RC_OFFSET: usize = Self::SMMU_OFFSET + size_of::<SmmuV3Node>();

    const TOTAL_LEN: usize = size_of::<TableHeader>()
        + size_of::<ItsNode>()
        + size_of::<SmmuV3Node>()
        + size_of::<RcNode>();

    /// Serializes the table and fixes up `Length` and the checksum (`-sum(bytes) mod 256`,
    /// computed with the checksum byte zeroed).
    pub fn to_bytes(&self) -> [u8; Self::TOTAL_LEN] {
        let mut out = [0u8; Self::TOTAL_LEN];
        let header = TableHeader::new(Self::TOTAL_LEN as u32);

        let mut offset = 0;
        write_struct(&mut out, &mut offset, &header);
        write_struct(&mut out, &mut offset, &self.its);
        write_struct(&mut out, &mut offset, &self.smmu);
        write_struct(&mut out, &mut offset, &self.rc);

        let checksum_offset = core::mem::offset_of!(TableHeader, checksum);
        out[checksum_offset] = 0;
        let sum: u8 = out.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        out[checksum_offset] = (0u8).wrapping_sub(sum);
        out
    }
}

fn write_struct<T: Copy>(out: &mut [u8], offset: &mut usize, value: &T) {
    let size = size_of::<T>();
    let bytes = unsafe { core::slice::from_raw_parts(value as *const T as *const u8, size) };
    out[*offset..*offset + size].copy_from_slice(bytes);
    *offset += size;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_makes_full_table_sum_to_zero() {
        let table = IortTable {
            its: ItsNode::new(),
            smmu: SmmuV3Node::new(0x4000_0000, SMMUV3_FLAG_COHACC_OVERRIDE, 100, 101, 102, SmmuIdMap {
                input_base: 0,
                num_ids: 0xFFFF,
                output_base: 0,
                output_reference: size_of::<TableHeader>() as u32,
                flags: 0,
            }),
            rc: RcNode::new(true, 0b01, SmmuIdMap {
                input_base: 0,
                num_ids: 0xFFFF,
                output_base: 0,
                output_reference: size_of::<TableHeader>() as u32,
                flags: 0,
            }),
        };
        let bytes = table.to_bytes();
        let sum: u8 = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        assert_eq!(sum, 0);
    }

    #[test]
    fn length_field_matches_serialized_size() {
        let table = IortTable {
            its: ItsNode::new(),
            smmu: SmmuV3Node::new(0, 0, 0, 0, 0, SmmuIdMap::default()),
            rc: RcNode::new(false, 0, SmmuIdMap::default()),
        };
        let bytes = table.to_bytes();
        let length = u32::from_ne_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(length as usize, bytes.len());
    }
}
