//! Provides the CommunicationControl (SID 0x28) service of the simulated
//! ECU
//!
//! The simulator acknowledges the request without actually gating any
//! communication; normal and network management traffic are unaffected.

use strum_macros::FromRepr;

use crate::response::ResponseCode;
use crate::services::{UdsService, split_sub_function};

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromRepr)]
#[repr(u8)]
/// Communication control modes handled by SID 0x28
pub enum ControlKind {
    /// Enable both reception and transmission
    EnableRxAndTx = 0x00,
    /// Enable reception, disable transmission
    EnableRxAndDisableTx = 0x01,
    /// Disable reception, enable transmission
    DisableRxAndEnableTx = 0x02,
    /// Disable both reception and transmission
    DisableRxAndTx = 0x03,
}

#[derive(Debug, Copy, Clone, Default)]
/// Handler for the CommunicationControl service
pub struct CommunicationControl;

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[ResponseCode::RequestOutOfRange];

impl CommunicationControl {
    /// Service ID
    pub const SID: u8 = 0x28;
}

impl UdsService for CommunicationControl {
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
        if req.len() < 3 {
            log::error!("CommunicationControl request {req:02X?} is missing control/communication type");
            return None;
        }
        let (control_type, suppress) = split_sub_function(req[1]);
        if ControlKind::from_repr(control_type).is_none() {
            log::info!("communication control type {control_type} is not defined");
            return Some(self.negative_response(ResponseCode::RequestOutOfRange));
        }
        if suppress {
            return None;
        }
        Some(vec![self.response_sid(), control_type])
    }
}
