//! Provides the ControlDTCSetting (SID 0x85) service of the simulated ECU
//!
//! The simulator keeps updating its error memory regardless of the
//! requested setting; only the acknowledgement is produced.

use strum_macros::FromRepr;

use crate::response::ResponseCode;
use crate::services::{UdsService, split_sub_function};

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromRepr)]
#[repr(u8)]
/// DTC setting types handled by SID 0x85
pub enum DtcSettingKind {
    /// Reserved by ISO14229
    IsoSaeReserved = 0x00,
    /// Resume updating of DTC status bits
    On = 0x01,
    /// Stop updating of DTC status bits
    Off = 0x02,
}

#[derive(Debug, Copy, Clone, Default)]
/// Handler for the ControlDTCSetting service
pub struct ControlDtcSetting;

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[ResponseCode::RequestOutOfRange];

impl ControlDtcSetting {
    /// Service ID
    pub const SID: u8 = 0x85;
}

impl UdsService for ControlDtcSetting {
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
            log::error!("ControlDTCSetting request {req:02X?} is missing the setting type");
            return None;
        }
        let (setting_type, suppress) = split_sub_function(req[1]);
        if DtcSettingKind::from_repr(setting_type).is_none() {
            log::info!("DTC setting type {setting_type} is not defined");
            return Some(self.negative_response(ResponseCode::RequestOutOfRange));
        }
        if suppress {
            return None;
        }
        Some(vec![self.response_sid(), setting_type])
    }
}
