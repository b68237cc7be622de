//! Provides the ClearDiagnosticInformation (SID 0x14) service of the
//! simulated ECU

use std::sync::Arc;

use crate::dtc::DtcStore;
use crate::response::ResponseCode;
use crate::services::UdsService;

/// groupOfDTC value addressing every stored trouble code
pub const GROUP_ALL_DTCS: u32 = 0xFF_FFFF;

#[derive(Debug, Clone)]
/// Handler for the ClearDiagnosticInformation service
///
/// Only the all-groups selector wipes the error memory; clearing specific
/// DTC groups is acknowledged without touching the store
pub struct ClearDiagnosticInformation {
    store: Arc<DtcStore>,
}

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[];

impl ClearDiagnosticInformation {
    /// Service ID
    pub const SID: u8 = 0x14;

    /// Creates the handler over the shared error memory
    pub fn new(store: Arc<DtcStore>) -> Self {
        Self { store }
    }
}

impl UdsService for ClearDiagnosticInformation {
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
        if req.len() < 4 {
            log::info!("ClearDiagnosticInformation request {req:02X?} is missing the groupOfDTC");
            return Some(self.negative_response(ResponseCode::GeneralReject));
        }
        let group = u32::from(req[1]) << 16 | u32::from(req[2]) << 8 | u32::from(req[3]);
        if group == GROUP_ALL_DTCS {
            self.store.clear_all();
            log::info!("error memory cleared");
        } else {
            log::debug!("clear request for DTC group 0x{group:06X} acknowledged without effect");
        }
        Some(vec![self.response_sid()])
    }
}
