//! Provides the TesterPresent (SID 0x3E) service of the simulated ECU

use crate::response::ResponseCode;
use crate::services::{UdsService, split_sub_function};

#[derive(Debug, Copy, Clone, Default)]
/// Handler for the TesterPresent service
///
/// The zeroSubFunction byte is not validated; the heartbeat is simply
/// acknowledged unless the suppress bit asks for silence
pub struct TesterPresent;

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[ResponseCode::RequestOutOfRange];

impl TesterPresent {
    /// Service ID
    pub const SID: u8 = 0x3E;
}

impl UdsService for TesterPresent {
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
            log::error!("TesterPresent request {req:02X?} is missing the zeroSubFunction byte");
            return None;
        }
        let (_, suppress) = split_sub_function(req[1]);
        if suppress {
            return None;
        }
        Some(vec![self.response_sid(), 0x00])
    }
}
