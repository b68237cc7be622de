//! Provides the SecurityAccess (SID 0x27) service of the simulated ECU
//!
//! The seed/key exchange is not cryptographically meaningful: the same
//! fixed seed is handed out for every security level and any key is
//! accepted. The handler only records the requested level so the key
//! response echoes the matching even sub-function.

use crate::response::ResponseCode;
use crate::services::{UdsService, split_sub_function};

/// Seed returned for every requestSeed sub-function
pub const FIXED_SEED: [u8; 4] = [0x01, 0x02, 0x03, 0x04];

#[derive(Debug, Copy, Clone, Default)]
/// Handler for the SecurityAccess service
///
/// Odd sub-functions 1/3/5/7 request the seed for security levels 1-4,
/// the following even sub-function submits the key. The recorded unlock
/// level is never enforced on other services - this is a simulator.
pub struct SecurityAccess {
    unlock_level: u8,
}

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[ResponseCode::RequestOutOfRange];

impl SecurityAccess {
    /// Service ID
    pub const SID: u8 = 0x27;

    /// Creates the handler with no security level unlocked
    pub fn new() -> Self {
        Self::default()
    }
}

impl UdsService for SecurityAccess {
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
            log::error!("SecurityAccess request {req:02X?} is missing the access type");
            return None;
        }
        let (access_type, suppress) = split_sub_function(req[1]);
        match access_type {
            // requestSeed, levels 1-4
            0x01 | 0x03 | 0x05 | 0x07 => {
                self.unlock_level = access_type;
                log::debug!("handing out seed for security level sub-function {access_type}");
                if suppress {
                    return None;
                }
                let mut resp = vec![self.response_sid(), access_type];
                resp.extend_from_slice(&FIXED_SEED);
                Some(resp)
            }
            // sendKey, levels 1-4
            0x02 | 0x04 | 0x06 | 0x08 => {
                log::debug!(
                    "accepting key for security level sub-function {}",
                    self.unlock_level + 1
                );
                if suppress {
                    return None;
                }
                Some(vec![self.response_sid(), self.unlock_level + 1])
            }
            _ => {
                log::info!("security access type {access_type} is not defined");
                Some(self.negative_response(ResponseCode::RequestOutOfRange))
            }
        }
    }
}
