use core::marker::PhantomData;

use memory_addr::{pa, PhysAddr, PAGE_SIZE_4K};

use crate::addr_width;
use crate::error::{Error, Result};
use crate::hal::PagingHandler;

const STRTAB_STE_DWORDS_BITS: usize = 3;
const STRTAB_STE_DWORDS: usize = 1 << STRTAB_STE_DWORDS_BITS;
const STRTAB_STE_SIZE: usize = STRTAB_STE_DWORDS << 3;

/// V, bit [0]
/// STE Valid.
///
/// - 0b0 Structure contents are invalid. Other STE fields are IGNORED.
/// - 0b1 Structure contents are valid. Other STE fields behave as described.
const STRTAB_STE_0_V: u64 = 0b1 << 0;
/// Config, bits [3:1]
/// Stream configuration.
///
/// | Value | Traffic can pass? | Stage 1 | Stage 2 | Notes |
///
/// * 0b000 No   –            –           Report abort to device, no event recorded.
/// * 0b0xx No   –            –           Reserved (behaves as 0b000)
/// * 0b100 Yes  Bypass       Bypass      STE.EATS value effectively 0b00
/// * 0b101 Yes  Translate    Bypass      S1* valid
/// * 0b110 Yes  Bypass       Translate   S2* valid
/// * 0b111 Yes  Translate    Translate   S1* and S2* valid.
const STRTAB_STE_0_CFG_S1_BYPASS_S2_BYPASS: u64 = 0b100 << 1;
const STRTAB_STE_0_CFG_S1_BYPASS_S2_TRANS: u64 = 0b110 << 1;

/// EATS, bits [92:91] (dword1 local offset [28:27])
/// ATS support. `0b00` selects "ATS not supported"; this driver never advertises ATS.
const STRTAB_STE_1_EATS_UNSUPPORTED: u64 = 0b00 << 27;

/// MemAttr, bits [119:116] (dword1 local offset [56:53])
/// Memory type/cacheability override applied to translated transactions, used only when
/// `Mtcfg` is set.
const STRTAB_STE_1_MEMATTR_OFFSET: u64 = 52; // 52 = 116 - 64

/// Mtcfg, bit [127] (dword1 local offset 63)
/// Memory type override enable; when clear, `MemAttr`/`ShCfg` fall back to the incoming
/// transaction's own attributes.
const STRTAB_STE_1_MTCFG: u64 = 1 << 63;

/// SHCFG, bits [109:108] (dword1 local offset [45:44])
/// Shareability configuration of the overall translated transaction.
///
/// - 0b00 Non-shareable
/// - 0b01 Use incoming Shareability attribute
/// - 0b10 Outer shareable
/// - 0b11 Inner shareable
const STRTAB_STE_1_SHCFG_INCOMING: u64 = 0b01 << 44; // 44 = 108 - 64
const STRTAB_STE_1_SHCFG_INNER: u64 = 0b11 << 44;

/// S2VMID, bits [143:128] (dword2 local offset 0)
/// Virtual Machine Identifier.
///
/// Marks TLB entries inserted because of translations located through this STE, differentiating
/// them from translations belonging to different virtual machines.
const STRTAB_STE_2_S2VMID_OFFSET: u64 = 0; // 0 = 128 - 128

/// S2T0SZ, bits [165:160] (dword2 local offset [37:32])
/// Size of IPA input region covered by stage 2 translation table. Equivalent to
/// `VTCR_EL2.T0SZ` in the A-profile architecture.
const STRTAB_STE_2_S2T0SZ_OFFSET: u64 = 32; // 32 = 160 - 128
/// S2SL0, bits [167:166] (local offset [39:38])
/// Starting level of the stage 2 translation table walk.
const STRTAB_STE_2_S2SL0_OFFSET: u64 = 38; // 38 = 166 - 128
/// S2IR0, bits [169:168] (local offset [41:40])
/// Inner cacheability for stage 2 translation table walks.
const STRTAB_STE_2_S2IR0_OFFSET: u64 = 40; // 40 = 168 - 128
/// S2OR0, bits [171:170] (local offset [43:42])
/// Outer cacheability for stage 2 translation table walks.
const STRTAB_STE_2_S2OR0_OFFSET: u64 = 42; // 42 = 170 - 128
/// S2SH0, bits [173:172] (local offset [45:44])
/// Shareability for stage 2 translation table walks.
const STRTAB_STE_2_S2SH0_OFFSET: u64 = 44; // 44 = 172 - 128
/// S2TG, bits [175:174] (local offset [47:46])
/// Stage 2 translation granule. `0b00` selects 4 KiB.
const STRTAB_STE_2_S2TG_OFFSET: u64 = 46; // 46 = 174 - 128
/// S2PS, bits [178:176] (local offset [50:48])
/// Stage 2 output/physical address size, in the same 3-bit encoding as `SMMU_IDR5.OAS`.
const STRTAB_STE_2_S2PS_OFFSET: u64 = 48; // 48 = 176 - 128

/// S2AA64, bit [179] (local offset 51)
///
/// Stage 2 translation table format for S2TTB0, and S_S2TTB0 if appropriate.
///
/// - 0b0 Use VMSAv8-32 LPAE descriptor formats. SMMU_IDR0.TTF[0] == 1
/// - 0b0 Use VMSAv9-128 descriptor formats. SMMU_IDR5.D128 == 1
/// - 0b1 Use VMSAv8-64 descriptor formats.
///
/// If stage 2 is not implemented, that is when SMMU_IDR0.S2P == 0, this field is RES0.
const STRTAB_STE_2_S2AA64: u64 = 1 << 51; // 51 = 179 - 128
/// S2PTW, bit [182] (local offset 54)
/// Protected Table Walk.
///
/// For an STE configured for translation at both stages, a stage 1 translation table walk access
/// or CD fetch access made to a stage 2 page with any Device type is terminated and recorded as a
/// stage 2 Permission fault if this field is set.
const STRTAB_STE_2_S2PTW: u64 = 1 << 54; // 54 = 182 - 128

/// S2S, bit [185] (local offset 57)
/// Stage 2 fault behavior - Stall.
const STRTAB_STE_2_S2S: u64 = 1 << 57; // 57 = 185 - 128
/// S2R, bit [186] (local offset 58)
/// Stage 2 fault behavior - Record.
const STRTAB_STE_2_S2R: u64 = 1 << 58; // 58 = 186 - 128

/// S2TTB, bits [247:196]
/// Address of the Stage 2 Translation Table base, bits[51:4]; the low 4 bits of the field are
/// RES0 (the table is always at least 16-byte aligned, and in practice 4 KiB aligned).
const STRTAB_STE_3_S2TTB_OFF: u64 = 4;
const STRTAB_STE_3_S2TTB_LEN: u64 = 48;

const fn extract_bits(value: u64, start: u64, length: u64) -> u64 {
    let mask = (1 << length) - 1;
    (value >> start) & mask
}

/// Non-cacheable / noncacheable walk attribute, used outside COHACC.
const WALK_ATTR_NONCACHEABLE: u64 = 0b00;
/// Normal write-back, write-allocate walk attribute, used under COHACC.
const WALK_ATTR_WRITEBACK_WRITE_ALLOCATE: u64 = 0b01;
/// Outer-shareable walk attribute, used outside COHACC.
const WALK_SHARE_OUTER: u64 = 0b10;
/// Inner-shareable walk attribute, used under COHACC.
const WALK_SHARE_INNER: u64 = 0b11;

/// `S2SL0 = 2`: start the stage-2 walk at level 0, for a 4 KiB granule with up to a 48-bit input
/// address.
const S2SL0_START_LEVEL_0: u64 = 2;
/// `S2TG = 0`: 4 KiB translation granule.
const S2TG_4KIB: u64 = 0;

/// Runtime inputs that parameterize the default Stream Table Entry template, distilled from the
/// controller's ID registers and the handoff configuration blob.
#[derive(Debug, Clone, Copy)]
pub struct Stage2Config {
    /// Input address size in bits covered by the stage-2 tree, e.g. 48.
    pub input_size: u32,
    /// Output/physical address size in bits, decoded from `IDR5.OAS` (capped at 48 by the caller,
    /// since no non-4 KiB granule is used).
    pub output_size: u32,
    /// `IDR0.S1P && IDR0.S2P`: both translation stages implemented.
    pub both_stages_implemented: bool,
    /// Platform config's COHACC override (`SmmuV3Node.Flags & COHACC_OVERRIDE`).
    pub cohacc: bool,
    /// `IDR1.AttrTypesOvr`: the controller supports per-stream memory-attribute override.
    pub attr_types_ovr: bool,
    /// Root-Complex node `CacheCoherent`.
    pub cache_coherent: bool,
    /// Root-Complex node `MemoryAccessFlags` bit 0 (CPM, cache-prefetch-memory).
    pub cache_prefetch_memory: bool,
    /// Root-Complex node `MemoryAccessFlags` bit 1 (DACS).
    pub dacs: bool,
}

impl Stage2Config {
    fn attr_override_active(&self) -> bool {
        self.attr_types_ovr && self.cache_coherent && self.cache_prefetch_memory && !self.dacs
    }
}

#[allow(unused)]
pub struct StreamTableEntry([u64; STRTAB_STE_DWORDS]);

impl StreamTableEntry {
    pub const fn bypass_entry() -> Self {
        Self([
            STRTAB_STE_0_V | STRTAB_STE_0_CFG_S1_BYPASS_S2_BYPASS,
            STRTAB_STE_1_SHCFG_INCOMING,
            0,
            0,
            0,
            0,
            0,
            0,
        ])
    }

    /// Builds the default translating template: stage-1 bypass, stage-2 translate, ATS
    /// unsupported, fixed VMID, 4 KiB granule, AArch64 descriptor format, with
    /// cacheability/shareability and memory-attribute-override fields derived from `config`.
    pub fn s2_translated_entry(vmid: u64, s2pt_base: PhysAddr, config: &Stage2Config) -> Self {
        let s2ps = addr_width::encode(config.output_size.min(48)) as u64;
        let s2t0sz = (64 - config.input_size) as u64;

        let (walk_cacheable, walk_shareable) = if config.cohacc {
            (WALK_ATTR_WRITEBACK_WRITE_ALLOCATE, WALK_SHARE_INNER)
        } else {
            (WALK_ATTR_NONCACHEABLE, WALK_SHARE_OUTER)
        };

        let mut dword1 = STRTAB_STE_1_EATS_UNSUPPORTED
            | if config.attr_types_ovr {
                STRTAB_STE_1_SHCFG_INCOMING
            } else {
                0
            };
        if config.attr_override_active() {
            dword1 = STRTAB_STE_1_EATS_UNSUPPORTED
                | STRTAB_STE_1_SHCFG_INNER
                | STRTAB_STE_1_MTCFG
                | (0xF << STRTAB_STE_1_MEMATTR_OFFSET);
        }

        let mut dword2 = (vmid << STRTAB_STE_2_S2VMID_OFFSET)
            | (s2t0sz << STRTAB_STE_2_S2T0SZ_OFFSET)
            | (S2SL0_START_LEVEL_0 << STRTAB_STE_2_S2SL0_OFFSET)
            | (walk_cacheable << STRTAB_STE_2_S2IR0_OFFSET)
            | (walk_cacheable << STRTAB_STE_2_S2OR0_OFFSET)
            | (walk_shareable << STRTAB_STE_2_S2SH0_OFFSET)
            | (S2TG_4KIB << STRTAB_STE_2_S2TG_OFFSET)
            | (s2ps << STRTAB_STE_2_S2PS_OFFSET)
            | STRTAB_STE_2_S2AA64
            // S2RS = 0b10: record faults, do not stall (S2R=1, S2S=0).
            | STRTAB_STE_2_S2R;
        if config.both_stages_implemented {
            dword2 |= STRTAB_STE_2_S2PTW;
        }

        let dword3 = extract_bits(
            s2pt_base.as_usize() as u64,
            STRTAB_STE_3_S2TTB_OFF,
            STRTAB_STE_3_S2TTB_LEN,
        ) << STRTAB_STE_3_S2TTB_OFF;

        Self([
            STRTAB_STE_0_V | STRTAB_STE_0_CFG_S1_BYPASS_S2_TRANS,
            dword1,
            dword2,
            dword3,
            0,
            0,
            0,
            0,
        ])
    }
}

pub struct LinearStreamTable<H: PagingHandler> {
    base: PhysAddr,
    num_pages: usize,
    entry_count: usize,
    _phantom: PhantomData<H>,
}

impl<H: PagingHandler> LinearStreamTable<H> {
    pub const fn uninit() -> Self {
        Self {
            base: pa!(0xdead_beef),
            num_pages: 0,
            entry_count: 0,
            _phantom: PhantomData,
        }
    }

    /// Allocates a `2^sid_bits`-entry linear table, rounded up to whole 4 KiB pages, and fills
    /// every entry with the bypass template. Fails with [`Error::OutOfResources`] if the page
    /// allocator is exhausted.
    pub fn init(&mut self, sid_bits: u32) -> Result<()> {
        self.entry_count = 1 << sid_bits;
        let size = self.entry_count * STRTAB_STE_SIZE;
        let num_pages = size.div_ceil(PAGE_SIZE_4K).max(1);
        let base = H::alloc_pages(num_pages).ok_or(Error::OutOfResources)?;
        self.base = base;
        self.num_pages = num_pages;
        info!(
            "Stream table base address: {:?}, entry_count: {}, size: {}",
            self.base, self.entry_count, size
        );
        // First we just mark all entries as bypass.
        for sid in 0..self.entry_count {
            self.set_bypass_ste(sid);
        }
        Ok(())
    }

    /// Frees the backing pages allocated by [`Self::init`]. No-op on a never-initialized table.
    pub fn deinit(&mut self) {
        if self.num_pages != 0 {
            H::dealloc_pages(self.base, self.num_pages);
            self.num_pages = 0;
        }
    }

    pub fn base_addr(&self) -> PhysAddr {
        self.base
    }

    fn ste(&self, sid: usize) -> &mut StreamTableEntry {
        let base = self.base + sid * STRTAB_STE_SIZE;
        unsafe { &mut *(base.as_usize() as *mut StreamTableEntry) }
    }

    fn set_bypass_ste(&self, sid: usize) {
        let tab = self.ste(sid);
        *tab = StreamTableEntry::bypass_entry();
    }

    /// Fills every entry with the stage-2 translating template (all Stream IDs translate through
    /// the same stage-2 tree).
    pub fn fill_s2_translated(&self, vmid: usize, s2pt_base: PhysAddr, config: &Stage2Config) {
        for sid in 0..self.entry_count {
            let entry = self.ste(sid);
            *entry = StreamTableEntry::s2_translated_entry(vmid as _, s2pt_base, config);
        }
    }

    pub(crate) fn set_s2_translated_ste(
        &self,
        sid: usize,
        vmid: usize,
        s2pt_base: PhysAddr,
        config: &Stage2Config,
    ) {
        let entry = self.ste(sid);
        *entry = StreamTableEntry::s2_translated_entry(vmid as _, s2pt_base, config);
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Stage2Config {
        Stage2Config {
            input_size: 48,
            output_size: 48,
            both_stages_implemented: false,
            cohacc: false,
            attr_types_ovr: false,
            cache_coherent: false,
            cache_prefetch_memory: false,
            dacs: false,
        }
    }

    #[test]
    fn valid_bit_and_translate_config_are_set() {
        let ste = StreamTableEntry::s2_translated_entry(1, pa!(0x1000), &config());
        assert_eq!(ste.0[0] & 0b1, 1);
        assert_eq!((ste.0[0] >> 1) & 0b111, 0b110);
    }

    #[test]
    fn s2t0sz_reflects_input_size() {
        let ste = StreamTableEntry::s2_translated_entry(1, pa!(0x1000), &config());
        let s2t0sz = (ste.0[2] >> 32) & 0x3F;
        assert_eq!(s2t0sz, 64 - 48);
    }

    #[test]
    fn attr_override_requires_all_four_conditions() {
        let mut cfg = config();
        cfg.attr_types_ovr = true;
        cfg.cache_coherent = true;
        cfg.cache_prefetch_memory = true;
        cfg.dacs = false;
        let ste = StreamTableEntry::s2_translated_entry(1, pa!(0x1000), &cfg);
        assert_ne!(ste.0[1] & STRTAB_STE_1_MTCFG, 0);
        assert_eq!((ste.0[1] >> 52) & 0xF, 0xF);

        cfg.dacs = true;
        let ste = StreamTableEntry::s2_translated_entry(1, pa!(0x1000), &cfg);
        assert_eq!(ste.0[1] & STRTAB_STE_1_MTCFG, 0);
    }

    #[test]
    fn cohacc_selects_writeback_and_inner_shareable_walks() {
        let mut cfg = config();
        cfg.cohacc = true;
        let ste = StreamTableEntry::s2_translated_entry(1, pa!(0x1000), &cfg);
        let s2ir0 = (ste.0[2] >> 40) & 0b11;
        let s2sh0 = (ste.0[2] >> 44) & 0b11;
        assert_eq!(s2ir0, WALK_ATTR_WRITEBACK_WRITE_ALLOCATE);
        assert_eq!(s2sh0, WALK_SHARE_INNER);
    }

    #[test]
    fn s2ttb_carries_root_address_shifted_right_by_4() {
        let root = pa!(0x1_2345_6000usize);
        let ste = StreamTableEntry::s2_translated_entry(1, root, &config());
        let s2ttb = (ste.0[3] >> 4) & ((1 << 48) - 1);
        assert_eq!(s2ttb, (root.as_usize() as u64) >> 4);
    }
}
