//! Module for the UDS service handlers of the simulated ECU
//!
//! One handler exists per supported service ID. A handler parses its
//! request bytes, updates the simulator state it was constructed with, and
//! produces the response frame to transmit - or nothing at all, when the
//! tester set the suppressPosRspMsgIndicationBit on a sub-function service.

use crate::response::{ALWAYS_VALID_NEGATIVE_RESPONSES, NEGATIVE_RESPONSE_SID, ResponseCode};

pub mod clear_diagnostic_information;
pub mod communication_control;
pub mod control_dtc_setting;
pub mod diagnostic_session_control;
pub mod ecu_reset;
pub mod read_data_by_identifier;
pub mod read_dtc_information;
pub mod request_download;
pub mod request_transfer_exit;
pub mod request_upload;
pub mod routine_control;
pub mod security_access;
pub mod tester_present;
pub mod transfer_data;
pub mod write_data_by_identifier;

#[cfg(test)]
mod test;

pub use clear_diagnostic_information::*;
pub use communication_control::*;
pub use control_dtc_setting::*;
pub use diagnostic_session_control::*;
pub use ecu_reset::*;
pub use read_data_by_identifier::*;
pub use read_dtc_information::*;
pub use request_download::*;
pub use request_transfer_exit::*;
pub use request_upload::*;
pub use routine_control::*;
pub use security_access::*;
pub use tester_present::*;
pub use transfer_data::*;
pub use write_data_by_identifier::*;

/// Offset added to a request SID to form the matching positive response SID
pub const POSITIVE_RESPONSE_OFFSET: u8 = 0x40;

/// Splits a sub-function byte into its 7 bit sub-function value and the
/// suppressPosRspMsgIndicationBit (bit 7).
///
/// Enumerated sub-function values must always be matched against the masked
/// low 7 bits; a positive response to a valid request with the bit set is
/// never transmitted.
pub fn split_sub_function(byte: u8) -> (u8, bool) {
    (byte & 0x7F, byte & 0x80 != 0)
}

/// Common interface of every UDS service handler.
///
/// Handlers execute serially on the simulator's receive task and complete
/// synchronously; they never perform I/O of their own.
pub trait UdsService: Send {
    /// Service ID this handler answers to
    fn sid(&self) -> u8;

    /// Negative response codes this service may emit in addition to
    /// [ALWAYS_VALID_NEGATIVE_RESPONSES]
    fn supported_negative_responses(&self) -> &'static [ResponseCode];

    /// Processes one request frame addressed to this service.
    ///
    /// A return value of `None` means nothing is transmitted back to the
    /// tester. Negative responses are always transmitted, even when the
    /// request carried the suppress bit.
    fn process(&mut self, req: &[u8]) -> Option<Vec<u8>>;

    /// SID carried by this service's positive responses
    fn response_sid(&self) -> u8 {
        self.sid() + POSITIVE_RESPONSE_OFFSET
    }

    /// Builds a `[0x7F, SID, NRC]` negative response message.
    ///
    /// Panics when the handler tries to emit a code that is neither in its
    /// supported table nor always valid - emitting such a code is a
    /// programming error, not a protocol condition.
    fn negative_response(&self, code: ResponseCode) -> Vec<u8> {
        if !ALWAYS_VALID_NEGATIVE_RESPONSES.contains(&code)
            && !self.supported_negative_responses().contains(&code)
        {
            panic!(
                "service 0x{:02X} must not emit negative response code {:?}",
                self.sid(),
                code
            );
        }
        log::info!(
            "service 0x{:02X} answering negatively with {}",
            self.sid(),
            ResponseCode::name_of(code as u8)
        );
        vec![NEGATIVE_RESPONSE_SID, self.sid(), code as u8]
    }

    /// Verifies the dispatcher handed this handler a frame bearing its own
    /// SID. A mismatch indicates a dispatch table bug
    fn claims(&self, req: &[u8]) -> bool {
        match req.first() {
            Some(&sid) if sid == self.sid() => true,
            _ => {
                debug_assert!(
                    false,
                    "frame {:02X?} routed to service 0x{:02X}",
                    req,
                    self.sid()
                );
                log::error!(
                    "frame {:02X?} does not belong to service 0x{:02X}, dropping it",
                    req,
                    self.sid()
                );
                false
            }
        }
    }
}
