//! Provides the DiagnosticSessionControl (SID 0x10) service of the
//! simulated ECU

use strum_macros::FromRepr;

use crate::response::ResponseCode;
use crate::services::{UdsService, split_sub_function};

/// P2 server max timing advertised to the tester (milliseconds)
pub const P2_SERVER_MAX_MS: u16 = 5000;
/// P2* server max timing advertised to the tester (milliseconds). Carried
/// on the wire in units of 10 ms
pub const P2_STAR_SERVER_MAX_MS: u16 = 2000;

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromRepr)]
#[repr(u8)]
/// UDS diagnostic session modes handled by SID 0x10
pub enum SessionKind {
    /// Reserved by ISO14229
    IsoSaeReserved = 0x00,
    /// Default diagnostic session mode (ECU is normally in this mode on
    /// startup)
    Default = 0x01,
    /// Session mode enabling all diagnostic services related to flashing or
    /// programming the ECU
    Programming = 0x02,
    /// Session mode enabling all diagnostic services and adjustment of ECU
    /// values
    Extended = 0x03,
    /// Session mode enabling the services required to support safety
    /// system-related functions
    SafetySystem = 0x04,
}

#[derive(Debug, Copy, Clone, Default)]
/// Handler for the DiagnosticSessionControl service
///
/// The simulator is permissive: every defined session type is accepted,
/// and the fixed P2/P2* server timings are returned
pub struct DiagnosticSessionControl;

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[
    ResponseCode::SubFunctionNotSupported,
    ResponseCode::IncorrectMessageLengthOrInvalidFormat,
    ResponseCode::ConditionsNotCorrect,
    ResponseCode::RequestOutOfRange,
];

impl DiagnosticSessionControl {
    /// Service ID
    pub const SID: u8 = 0x10;
}

impl UdsService for DiagnosticSessionControl {
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
            log::error!("DiagnosticSessionControl request {req:02X?} is missing the session type");
            return None;
        }
        let (session_type, suppress) = split_sub_function(req[1]);
        if SessionKind::from_repr(session_type).is_none() {
            log::info!("diagnostic session type {session_type} is not defined");
            return Some(self.negative_response(ResponseCode::RequestOutOfRange));
        }
        if suppress {
            return None;
        }
        let mut resp = vec![self.response_sid(), session_type];
        resp.extend_from_slice(&P2_SERVER_MAX_MS.to_be_bytes());
        resp.extend_from_slice(&(P2_STAR_SERVER_MAX_MS / 10).to_be_bytes());
        Some(resp)
    }
}
