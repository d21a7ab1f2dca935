//! Chapter 6. Memory map and registers.
//!
//! One file per named register (or tightly related pair), each defining its bitfields via
//! `tock_registers::register_bitfields!` and a type alias used by [`crate::SMMUv3Regs`].

mod aidr;
mod cmdq_base;
mod cmdq_cons;
mod cmdq_prod;
mod cr0;
mod cr0ack;
mod cr1;
mod cr2;
mod eventq_base;
mod eventq_cons;
mod gbpa;
mod gerror;
mod idr0;
mod idr1;
mod idr5;
mod irq_ctrl;
mod strtab_base;
mod strtab_base_cfg;

pub use aidr::*;
pub use cmdq_base::*;
pub use cmdq_cons::*;
pub use cmdq_prod::*;
pub use cr0::*;
pub use cr0ack::*;
pub use cr1::*;
pub use cr2::*;
pub use eventq_base::*;
pub use eventq_cons::*;
pub use gbpa::*;
pub use gerror::*;
pub use idr0::*;
pub use idr1::*;
pub use idr5::*;
pub use irq_ctrl::*;
pub use strtab_base::*;
pub use strtab_base_cfg::*;
