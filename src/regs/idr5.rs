//! Chapter 6. Memory map and registers
//! 6.3. Register formats
//! 6.3.6 SMMU_IDR5
//!
//! The SMMU_IDR5 characteristics are:
//! ## Purpose
//! Provides information about the stage 2 translation and queue features implemented.
//! ## Attributes
//! SMMU_IDR5 is a 32-bit register.
//! This register is part of the SMMUv3_PAGE_0 block.

use tock_registers::register_bitfields;
use tock_registers::registers::ReadOnly;

register_bitfields! {u32,
    pub IDR5 [
        /// VAX, bits [11:10]
        /// Virtual Address eXtend. Indicates the maximum Input Address size for stage 1.
        VAX OFFSET(10) NUMBITS(2) [
            FortyEightBits = 0b00,
            FiftyTwoBits = 0b10
        ],
        /// STALL_MAX, bits [9:8]
        /// Reserved in SMMUv3.0, see architecture errata.
        STALL_MAX OFFSET(8) NUMBITS(2) [],
        /// GRAN64K, bit [6]
        /// 64KB translation granule supported.
        GRAN64K OFFSET(6) NUMBITS(1) [
            NotSupported = 0,
            Supported = 1
        ],
        /// GRAN16K, bit [5]
        /// 16KB translation granule supported.
        GRAN16K OFFSET(5) NUMBITS(1) [
            NotSupported = 0,
            Supported = 1
        ],
        /// GRAN4K, bit [4]
        /// 4KB translation granule supported.
        GRAN4K OFFSET(4) NUMBITS(1) [
            NotSupported = 0,
            Supported = 1
        ],
        /// OAS, bits [2:0]
        /// Output Address Size. The maximum size of any Physical Address that the SMMU
        /// may output as a result of a translation, in the same 3-bit encoding used by
        /// `STE.S2PS`: 0b000=32 bits, 0b001=36, 0b010=40, 0b011=42, 0b100=44, 0b101=48,
        /// 0b110=52.
        OAS OFFSET(0) NUMBITS(3) [
            ThirtyTwoBits = 0b000,
            ThirtySixBits = 0b001,
            FortyBits = 0b010,
            FortyTwoBits = 0b011,
            FortyFourBits = 0b100,
            FortyEightBits = 0b101,
            FiftyTwoBits = 0b110
        ],
    ]
}

/// SMMU_IDR5 register, read-only.
pub type IDR5Reg = ReadOnly<u32, IDR5::Register>;
