//! Provides the WriteDataByIdentifier (SID 0x2E) service of the simulated
//! ECU

use std::sync::Arc;

use crate::did::DidTable;
use crate::response::ResponseCode;
use crate::services::UdsService;

#[derive(Debug, Clone)]
/// Handler for the WriteDataByIdentifier service
///
/// The codec bound to the addressed DID decodes exactly its declared byte
/// count from the data record; surplus bytes are ignored. The decoded
/// physical value replaces the stored one.
pub struct WriteDataByIdentifier {
    table: Arc<DidTable>,
}

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[ResponseCode::RequestOutOfRange];

impl WriteDataByIdentifier {
    /// Service ID
    pub const SID: u8 = 0x2E;

    /// Creates the handler over the shared data identifier table
    pub fn new(table: Arc<DidTable>) -> Self {
        Self { table }
    }
}

impl UdsService for WriteDataByIdentifier {
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
        let payload = &req[1..];
        // DID plus at least one data byte
        if payload.len() <= 2 {
            log::info!("WriteDataByIdentifier request {req:02X?} is too short");
            return Some(self.negative_response(ResponseCode::RequestOutOfRange));
        }
        let did = u16::from_be_bytes([payload[0], payload[1]]);
        let Some(codec) = self.table.codec(did) else {
            log::info!("data identifier 0x{did:04X} is not defined");
            return Some(self.negative_response(ResponseCode::RequestOutOfRange));
        };
        let data = &payload[2..];
        if data.len() < codec.len() {
            log::info!(
                "data record of {} bytes is shorter than the {} bytes DID 0x{did:04X} requires",
                data.len(),
                codec.len()
            );
            return Some(self.negative_response(ResponseCode::RequestOutOfRange));
        }
        match codec.decode(&data[..codec.len()]) {
            Ok(value) => {
                log::debug!("data identifier 0x{did:04X} written: {value:?}");
                self.table.set_value(did, value);
                Some(vec![self.response_sid(), payload[0], payload[1]])
            }
            Err(e) => {
                log::error!("decoding data identifier 0x{did:04X} failed: {e}");
                None
            }
        }
    }
}
