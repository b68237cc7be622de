//! Provides the ReadDataByIdentifier (SID 0x22) service of the simulated
//! ECU

use std::sync::Arc;

use crate::did::DidTable;
use crate::response::ResponseCode;
use crate::services::UdsService;

#[derive(Debug, Clone)]
/// Handler for the ReadDataByIdentifier service
///
/// A single request may carry several data identifiers; the response
/// concatenates `(DID, encoded value)` records in request order. Any
/// malformed DID list, or a DID the table does not define, rejects the
/// whole request with RequestOutOfRange.
pub struct ReadDataByIdentifier {
    table: Arc<DidTable>,
}

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[ResponseCode::RequestOutOfRange];

impl ReadDataByIdentifier {
    /// Service ID
    pub const SID: u8 = 0x22;

    /// Creates the handler over the shared data identifier table
    pub fn new(table: Arc<DidTable>) -> Self {
        Self { table }
    }
}

impl UdsService for ReadDataByIdentifier {
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
        let did_list = &req[1..];
        if did_list.is_empty() || did_list.len() % 2 != 0 {
            log::info!("ReadDataByIdentifier carries a malformed DID list of {} bytes", did_list.len());
            return Some(self.negative_response(ResponseCode::RequestOutOfRange));
        }

        let mut resp = vec![self.response_sid()];
        for chunk in did_list.chunks_exact(2) {
            let did = u16::from_be_bytes([chunk[0], chunk[1]]);
            let Some(codec) = self.table.codec(did) else {
                log::info!("data identifier 0x{did:04X} is not defined");
                return Some(self.negative_response(ResponseCode::RequestOutOfRange));
            };
            let Some(value) = self.table.value(did) else {
                log::info!("data identifier 0x{did:04X} has no stored value");
                return Some(self.negative_response(ResponseCode::RequestOutOfRange));
            };
            match codec.encode(&value) {
                Ok(encoded) => {
                    resp.extend_from_slice(&did.to_be_bytes());
                    resp.extend_from_slice(&encoded);
                }
                Err(e) => {
                    log::error!("encoding data identifier 0x{did:04X} failed: {e}");
                    return None;
                }
            }
        }
        Some(resp)
    }
}
