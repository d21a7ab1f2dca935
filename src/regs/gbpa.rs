//! Chapter 6. Memory map and registers
//! 6.3. Register formats
//! 6.3.15 SMMU_GBPA
//!
//! ## Purpose
//! Global Bypass Attributes: attributes applied to streams that bypass the SMMU (when
//! `SMMU_CR0.SMMUEN == 0`).
//! ## Attributes
//! SMMU_GBPA is a 32-bit register.
//! This register is part of the SMMUv3_PAGE_0 block.

use tock_registers::register_bitfields;
use tock_registers::registers::ReadWrite;

register_bitfields! {u32,
    pub GBPA [
        /// UPDATE, bit [31] Start an Update of the fields in this register.
        UPDATE OFFSET(31) NUMBITS(1) [],
        /// Bits [30:13] Reserved, RES0.
        Reserved13 OFFSET(13) NUMBITS(18) [],
        /// ABORT, bit [12] Abort all incoming transactions for streams that bypass the SMMU.
        ABORT OFFSET(12) NUMBITS(1) [
            DoNotAbort = 0,
            Abort = 1
        ],
    ]
}

/// SMMU_GBPA register, read-write; writes take effect only after the `UPDATE` bit is set and the
/// write completes, acknowledged by the same bit self-clearing on readback.
pub type GbpaReg = ReadWrite<u32, GBPA::Register>;
