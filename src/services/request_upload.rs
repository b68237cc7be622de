//! Provides the RequestUpload (SID 0x35) service of the simulated ECU
//!
//! Reading firmware back out of the ECU is not supported; the service
//! exists only to reject the request instead of leaving the tester without
//! any answer.

use crate::response::ResponseCode;
use crate::services::UdsService;

#[derive(Debug, Copy, Clone, Default)]
/// Handler for the RequestUpload service. Always rejects
pub struct RequestUpload;

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[
    ResponseCode::RequestSequenceError,
    ResponseCode::TransferDataSuspended,
];

impl RequestUpload {
    /// Service ID
    pub const SID: u8 = 0x35;
}

impl UdsService for RequestUpload {
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
        Some(self.negative_response(ResponseCode::GeneralReject))
    }
}
