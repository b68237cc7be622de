//! Provides the RequestDownload (SID 0x34) service of the simulated ECU
//!
//! Accepting a download arms the transfer state machine; the positive
//! response announces the largest TransferData block the simulator will
//! take.

use std::sync::{Arc, Mutex};

use crate::flash::FlashTransfer;
use crate::response::ResponseCode;
use crate::services::UdsService;

/// lengthFormatIdentifier of the positive response: maxNumberOfBlockLength
/// is transmitted as 2 bytes
pub const LENGTH_FORMAT_IDENTIFIER: u8 = 0x20;

#[derive(Debug, Clone)]
/// Handler for the RequestDownload service
///
/// The addressAndLengthFormatIdentifier packs the width of the memory
/// address field into its low nibble and the width of the memory size
/// field into its high nibble; both fields are big endian.
pub struct RequestDownload {
    flash: Arc<Mutex<FlashTransfer>>,
}

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[
    ResponseCode::RequestSequenceError,
    ResponseCode::TransferDataSuspended,
];

impl RequestDownload {
    /// Service ID
    pub const SID: u8 = 0x34;

    /// Creates the handler over the shared download session state
    pub fn new(flash: Arc<Mutex<FlashTransfer>>) -> Self {
        Self { flash }
    }
}

fn be_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, b| acc << 8 | u64::from(*b))
}

impl UdsService for RequestDownload {
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
            log::info!("RequestDownload request {req:02X?} is too short");
            self.flash.lock().unwrap().reset();
            return Some(self.negative_response(ResponseCode::GeneralReject));
        }
        let alfi = req[2];
        let address_len = (alfi & 0x0F) as usize;
        let size_len = (alfi >> 4) as usize;
        // Wider than u64 cannot be represented, and such an ALFI never
        // occurs on a real bus
        if address_len > 8 || size_len > 8 || req.len() < 3 + address_len + size_len {
            log::info!("RequestDownload request {req:02X?} does not match its ALFI 0x{alfi:02X}");
            self.flash.lock().unwrap().reset();
            return Some(self.negative_response(ResponseCode::GeneralReject));
        }
        let address = be_uint(&req[3..3 + address_len]);
        let size = be_uint(&req[3 + address_len..3 + address_len + size_len]);

        let mut flash = self.flash.lock().unwrap();
        flash.active = true;
        flash.start_address = address;
        flash.transferred_size = size;
        log::info!("download of {size} bytes to 0x{address:08X} accepted");

        let mut resp = vec![self.response_sid(), LENGTH_FORMAT_IDENTIFIER];
        resp.extend_from_slice(&flash.max_block_length.to_be_bytes());
        Some(resp)
    }
}
