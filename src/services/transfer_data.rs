//! Provides the TransferData (SID 0x36) service of the simulated ECU
//!
//! Firmware blocks arrive with a wrapping blockSequenceCounter. A counter
//! that does not follow the previous one aborts the whole download and the
//! tester has to start over with a fresh RequestDownload.

use std::sync::{Arc, Mutex};

use crate::flash::FlashTransfer;
use crate::response::ResponseCode;
use crate::services::UdsService;

#[derive(Debug, Clone)]
/// Handler for the TransferData service
pub struct TransferData {
    flash: Arc<Mutex<FlashTransfer>>,
}

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[
    ResponseCode::RequestSequenceError,
    ResponseCode::TransferDataSuspended,
];

impl TransferData {
    /// Service ID
    pub const SID: u8 = 0x36;

    /// Creates the handler over the shared download session state
    pub fn new(flash: Arc<Mutex<FlashTransfer>>) -> Self {
        Self { flash }
    }
}

impl UdsService for TransferData {
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
            log::error!("TransferData request {req:02X?} is missing the blockSequenceCounter");
            return None;
        }
        let counter = req[1];
        let data = &req[2..];

        let mut flash = self.flash.lock().unwrap();
        if flash.active && counter != flash.block_counter.wrapping_add(1) {
            log::warn!(
                "blockSequenceCounter 0x{counter:02X} does not follow 0x{:02X}, aborting the download",
                flash.block_counter
            );
            flash.reset();
            return Some(self.negative_response(ResponseCode::RequestSequenceError));
        }
        if 2 + data.len() <= flash.max_block_length as usize {
            flash.buffer.extend_from_slice(data);
            flash.bytes_received += data.len() as u64;
            flash.block_counter = flash.block_counter.wrapping_add(1);
            log::debug!(
                "accepted block 0x{counter:02X}, {} bytes received in total",
                flash.bytes_received
            );
            Some(vec![self.response_sid(), counter])
        } else {
            log::error!(
                "TransferData block of {} bytes exceeds maxNumberOfBlockLength {}",
                data.len(),
                flash.max_block_length
            );
            None
        }
    }
}
