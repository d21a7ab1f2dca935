//! Chapter 6. Memory map and registers
//! 6.3. Register formats
//! 6.3.13/6.3.14 SMMU_IRQ_CTRL / SMMU_IRQ_CTRLACK
//!
//! ## Purpose
//! Enables and disables SMMU interrupts and provides acknowledgment that an enable/disable has
//! taken effect. Same field layout in both registers.
//! ## Attributes
//! Each is a 32-bit register, part of the SMMUv3_PAGE_0 block.

use tock_registers::register_bitfields;
use tock_registers::registers::{ReadOnly, ReadWrite};

register_bitfields! {u32,
    pub IRQ_CTRL [
        /// Bits [31:3] Reserved, RES0.
        Reserved3 OFFSET(3) NUMBITS(29) [],
        /// PRIQ_IRQEN, bit [2] PRI queue interrupt enable.
        PRIQ_IRQEN OFFSET(2) NUMBITS(1) [
            Disable = 0,
            Enable = 1
        ],
        /// EVENTQ_IRQEN, bit [1] Event queue interrupt enable.
        EVENTQ_IRQEN OFFSET(1) NUMBITS(1) [
            Disable = 0,
            Enable = 1
        ],
        /// GERROR_IRQEN, bit [0] Global Error interrupt enable.
        GERROR_IRQEN OFFSET(0) NUMBITS(1) [
            Disable = 0,
            Enable = 1
        ],
    ]
}

register_bitfields! {u32,
    pub IRQ_CTRLACK [
        /// Bits [31:3] Reserved, RES0.
        Reserved3 OFFSET(3) NUMBITS(29) [],
        /// PRIQ_IRQEN, bit [2] See [`IRQ_CTRL::PRIQ_IRQEN`].
        PRIQ_IRQEN OFFSET(2) NUMBITS(1) [
            Disable = 0,
            Enable = 1
        ],
        /// EVENTQ_IRQEN, bit [1] See [`IRQ_CTRL::EVENTQ_IRQEN`].
        EVENTQ_IRQEN OFFSET(1) NUMBITS(1) [
            Disable = 0,
            Enable = 1
        ],
        /// GERROR_IRQEN, bit [0] See [`IRQ_CTRL::GERROR_IRQEN`].
        GERROR_IRQEN OFFSET(0) NUMBITS(1) [
            Disable = 0,
            Enable = 1
        ],
    ]
}

/// SMMU_IRQ_CTRL register, read-write.
pub type IrqCtrlReg = ReadWrite<u32, IRQ_CTRL::Register>;
/// SMMU_IRQ_CTRLACK register, read-only.
pub type IrqCtrlAckReg = ReadOnly<u32, IRQ_CTRLACK::Register>;
