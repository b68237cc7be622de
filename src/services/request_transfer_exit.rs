//! Provides the RequestTransferExit (SID 0x37) service of the simulated
//! ECU
//!
//! The simulator keeps the received firmware image and the transfer
//! statistics around after the exit, so a test can inspect what the tester
//! uploaded.

use crate::response::ResponseCode;
use crate::services::UdsService;

#[derive(Debug, Copy, Clone, Default)]
/// Handler for the RequestTransferExit service
pub struct RequestTransferExit;

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] =
    &[ResponseCode::IncorrectMessageLengthOrInvalidFormat];

impl RequestTransferExit {
    /// Service ID
    pub const SID: u8 = 0x37;
}

impl UdsService for RequestTransferExit {
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
        log::debug!("transfer exit acknowledged");
        Some(vec![self.response_sid()])
    }
}
