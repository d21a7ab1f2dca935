//! Chapter 6. Memory map and registers
//! 6.3. Register formats
//! 6.3.31 SMMU_EVENTQ_CONS
//!
//! ## Purpose
//! Event queue consumer read index, written by firmware after draining records.
//! ## Attributes
//! SMMU_EVENTQ_CONS is a 32-bit register, accessed at `base + 0x10000`.

use tock_registers::register_bitfields;
use tock_registers::registers::ReadWrite;

register_bitfields! {u32,
    pub EVENTQ_CONS [
        /// Bits [31:20] Reserved, RES0.
        Reserved20 OFFSET(20) NUMBITS(12) [],
        /// RD, bits [19:0] Event queue read index.
        ///
        /// Treated as two sub-fields exactly as `SMMU_CMDQ_CONS.RD`:
        /// - **Bit [QS]: RD_WRAP**
        /// - **Bits [QS-1:0]: RD**
        RD OFFSET(0) NUMBITS(20) [],
    ]
}

/// SMMU_EVENTQ_CONS register, read-write.
pub type EventQConsReg = ReadWrite<u32, EVENTQ_CONS::Register>;
