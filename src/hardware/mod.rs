//! Transport implementations for attaching the simulator to real or
//! virtual diagnostic buses
//!
//! The CAN driver and the ISO-TP segmentation layer live below these
//! types; a channel only moves fully assembled UDS payloads.

pub mod simulation;

#[cfg(all(target_os = "linux", feature = "socketcan"))]
pub mod socketcan;

#[cfg(all(target_os = "linux", feature = "socketcan"))]
pub use socketcan::SocketCanIsoTpChannel;
