//! Chapter 6. Memory map and registers
//! 6.3. Register formats
//! 6.3.29 SMMU_EVENTQ_BASE
//!
//! ## Purpose
//! Configuration of the Event queue base address.
//! ## Attributes
//! SMMU_EVENTQ_BASE is a 64-bit register.
//! This register is part of the SMMUv3_PAGE_0 block.

use tock_registers::register_bitfields;
use tock_registers::registers::ReadWrite;

register_bitfields! {u64,
    pub EVENTQ_BASE [
        /// Bit [63] Reserved, RES0.
        Reserved63 OFFSET(63) NUMBITS(1) [],
        /// WA, bit [62] Write-Allocate hint.
        WA OFFSET(62) NUMBITS(1) [
            NoWriteAllocate = 0,
            WriteAllocate = 1
        ],
        /// Bits [61:56] Reserved, RES0.
        Reserved56 OFFSET(56) NUMBITS(6) [],
        /// ADDR, bits [55:5] PA of Event queue base, bits [55:5].
        ADDR OFFSET(5) NUMBITS(51) [],
        /// LOG2SIZE, bits [4:0] Queue size as log2(entries).
        LOG2SIZE OFFSET(0) NUMBITS(5) [],
    ]
}

/// SMMU_EVENTQ_BASE register, read-write. Guarded by `SMMU_CR0.EVENTQEN` and must only be
/// modified when it is 0.
pub type EventQBaseReg = ReadWrite<u64, EVENTQ_BASE::Register>;
