//! Provides the ECUReset (SID 0x11) service of the simulated ECU
//!
//! No actual reset is performed; the simulator only mimics the wire
//! exchange a real ECU would produce.

use strum_macros::FromRepr;

use crate::response::ResponseCode;
use crate::services::{UdsService, split_sub_function};

/// Minimum stand-by time (seconds) reported when a rapid power shutdown is
/// enabled
pub const POWER_DOWN_TIME: u8 = 0x3B;

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromRepr)]
#[repr(u8)]
/// Reset modes handled by SID 0x11
pub enum ResetKind {
    /// Reserved by ISO14229
    IsoSaeReserved = 0x00,
    /// Simulated forceful power off/on cycle
    HardReset = 0x01,
    /// Simulated key off/on cycle
    KeyOffOnReset = 0x02,
    /// Restart of the application without a power cycle
    SoftReset = 0x03,
    /// Arms a rapid power shutdown during the next key-off cycle
    EnableRapidPowerShutDown = 0x04,
    /// Disarms a previously enabled rapid power shutdown
    DisableRapidPowerShutDown = 0x05,
}

#[derive(Debug, Copy, Clone, Default)]
/// Handler for the ECUReset service
///
/// An unknown reset type is logged but still answered positively. Strict
/// ISO conformance would reject it with SubFunctionNotSupported; the
/// simulator deliberately stays lenient so fuzzing testers always get an
/// echo to latch onto
pub struct EcuReset;

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[ResponseCode::RequestOutOfRange];

impl EcuReset {
    /// Service ID
    pub const SID: u8 = 0x11;
}

impl UdsService for EcuReset {
    fn sid(&self) -> u8 {
        Self::SID
    }

    fn supported_negative_responses(&self) -> &'static [ResponseCode] {
        SUPPORTED_NEGATIVE_RESPONSES
    }

    fn process(&mut self, req: &[u8]) -> Option<Vec<u8>> {
        if !self.claims(req) {
            return None;
        }
        if req.len() < 2 {
            log::error!("ECUReset request {req:02X?} is missing the reset type");
            return None;
        }
        let (reset_type, suppress) = split_sub_function(req[1]);
        if ResetKind::from_repr(reset_type).is_none() {
            log::info!("reset type {reset_type} is not defined");
        }
        if suppress {
            return None;
        }
        if reset_type == ResetKind::EnableRapidPowerShutDown as u8 {
            Some(vec![self.response_sid(), reset_type, POWER_DOWN_TIME])
        } else {
            Some(vec![self.response_sid(), reset_type])
        }
    }
}
