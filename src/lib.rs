#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_imports,
    unused_import_braces,
    unused_qualifications
)]

//! A crate which simulates an automotive ECU speaking the UDS (ISO14229)
//! diagnostic protocol over an ISO-TP (ISO15765-2) transport.
//!
//! The simulator answers requests from a diagnostic tester the way a real
//! ECU on a vehicle CAN network would: it decodes the incoming service
//! request, mutates its in-memory state (diagnostic session, security level,
//! data identifiers, diagnostic trouble codes, firmware download session),
//! and replies with either a positive response or a standardized negative
//! response code.
//!
//! ## Supported services
//!
//! * DiagnosticSessionControl (0x10)
//! * ECUReset (0x11)
//! * ClearDiagnosticInformation (0x14)
//! * ReadDTCInformation (0x19, reportDTCByStatusMask)
//! * ReadDataByIdentifier (0x22)
//! * SecurityAccess (0x27)
//! * CommunicationControl (0x28)
//! * WriteDataByIdentifier (0x2E)
//! * RoutineControl (0x31)
//! * RequestDownload (0x34)
//! * RequestUpload (0x35, rejected)
//! * TransferData (0x36)
//! * RequestTransferExit (0x37)
//! * TesterPresent (0x3E)
//! * ControlDTCSetting (0x85)
//!
//! ## Transports
//!
//! The simulator talks to the outside world through the channel traits in
//! [channel]. Two implementations ship with the crate:
//!
//! * [hardware::simulation::SimulationIsoTpChannel] - an in-memory loopback
//!   for unit testing without any bus hardware
//! * `SocketCanIsoTpChannel` (Linux, `socketcan` feature) - binds the
//!   simulator to a real or virtual SocketCAN interface using the kernel's
//!   ISO-TP stack
//!
//! ## Example
//!
//! ```
//! use ecu_sim::hardware::simulation::SimulationIsoTpChannel;
//! use ecu_sim::sim::{EcuSimServer, EcuSimulator, SimServerOptions};
//!
//! let channel = SimulationIsoTpChannel::new();
//! let tester = channel.clone();
//! let mut server = EcuSimServer::launch(
//!     EcuSimulator::new(),
//!     Box::new(channel),
//!     SimServerOptions::default(),
//! )
//! .unwrap();
//!
//! // TesterPresent
//! tester.inject_request(&[0x3E, 0x00]);
//! # let mut resp = None;
//! # for _ in 0..500 {
//! #     resp = tester.take_response();
//! #     if resp.is_some() { break; }
//! #     std::thread::sleep(std::time::Duration::from_millis(10));
//! # }
//! # assert_eq!(resp, Some(vec![0x7E, 0x00]));
//! server.stop();
//! ```

use crate::channel::ChannelError;

pub mod channel;
pub mod did;
pub mod dtc;
pub mod flash;
pub mod hardware;
pub mod response;
pub mod services;
pub mod sim;

/// Simulator result
pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, thiserror::Error)]
/// Simulator error
pub enum SimError {
    /// Error with the underlying communication channel
    #[error("underlying channel error: {0}")]
    ChannelError(#[from] ChannelError),
}
