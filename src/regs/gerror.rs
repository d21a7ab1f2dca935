//! Chapter 6. Memory map and registers
//! 6.3. Register formats
//! 6.3.12 SMMU_GERROR
//!
//! The SMMU_GERROR characteristics are:
//! ## Purpose
//! Shows whether the 8 categories of top-level global error are active.
//! ## Attributes
//! SMMU_GERROR is a 32-bit register.
//! This register is part of the SMMUv3_PAGE_0 block.

use tock_registers::register_bitfields;
use tock_registers::registers::ReadOnly;

register_bitfields! {u32,
    pub GERROR [
        /// Bits [31:8] Reserved, RES0.
        Reserved8 OFFSET(8) NUMBITS(24) [],
        /// MSI_ABT_ERR, bit [7] An MSI write issued by the SMMU aborted.
        MSI_ABT_ERR OFFSET(7) NUMBITS(1) [],
        /// MSI_PRIQ_ABT_ERR, bit [6] The MSI write triggered by a PRI queue insertion aborted.
        MSI_PRIQ_ABT_ERR OFFSET(6) NUMBITS(1) [],
        /// MSI_EVENTQ_ABT_ERR, bit [5] The MSI write triggered by an Event queue insertion aborted.
        MSI_EVENTQ_ABT_ERR OFFSET(5) NUMBITS(1) [],
        /// MSI_CMDQ_ABT_ERR, bit [4] The MSI write triggered by a CMD_SYNC completion aborted.
        MSI_CMDQ_ABT_ERR OFFSET(4) NUMBITS(1) [],
        /// PRIQ_ABT_ERR, bit [3] A PRI queue access triggered an external abort.
        PRIQ_ABT_ERR OFFSET(3) NUMBITS(1) [],
        /// EVENTQ_ABT_ERR, bit [2] An Event queue access triggered an external abort.
        EVENTQ_ABT_ERR OFFSET(2) NUMBITS(1) [],
        /// CMDQ_ERR, bit [1] An error was encountered executing a command from the Command queue.
        CMDQ_ERR OFFSET(1) NUMBITS(1) [],
        /// SFM_ERR, bit [0] The SMMU has entered Service Failure Mode.
        SFM_ERR OFFSET(0) NUMBITS(1) [],
    ]
}

/// SMMU_GERROR register, read-only; acknowledged by writing the observed value to
/// `SMMU_GERRORN`.
pub type GerrorReg = ReadOnly<u32, GERROR::Register>;
