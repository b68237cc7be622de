//! Provides the ReadDTCInformation (SID 0x19) service of the simulated ECU
//!
//! Of the many report types ISO14229 defines, the simulator answers
//! reportDTCByStatusMask only; every other sub-function is rejected with
//! RequestOutOfRange.

use std::sync::Arc;

use strum_macros::FromRepr;

use crate::dtc::DtcStore;
use crate::response::ResponseCode;
use crate::services::{UdsService, split_sub_function};

/// DTCStatusAvailabilityMask reported to the tester: the simulator supports
/// every status bit
pub const DTC_STATUS_AVAILABILITY_MASK: u8 = 0xFF;

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromRepr)]
#[repr(u8)]
/// ReadDTCInformation sub-function definitions
pub enum DtcSubFunction {
    /// This function takes a 1 byte DTCStatusMask
    ReportNumberOfDtcByStatusMask = 0x01,
    /// This function takes a 1 byte DTCStatusMask
    ReportDtcByStatusMask = 0x02,
    /// This function takes a 3 byte DTCMaskRecord and a 1 byte DTCSnapshotRecordNumber
    ReportDtcSnapshotIdentification = 0x03,
    /// This function takes a 3 byte DTCMaskRecord and a 1 byte DTCSnapshotRecordNumber
    ReportDtcSnapshotRecordByDtcNumber = 0x04,
    /// This function takes a 1 byte DTCSnapshotRecordNumber
    ReportDtcSnapshotRecordByRecordNumber = 0x05,
    /// This function takes a 3 byte DTCMaskRecord and a 1 byte DTCExtendedDataRecordNumber
    ReportDtcExtendedDataRecordByDtcNumber = 0x06,
    /// This function takes a 1 byte DTCSeverityMask and a 1 byte DTCStatusMask
    ReportNumberOfDtcBySeverityMaskRecord = 0x07,
    /// This function takes a 1 byte DTCSeverityMask and a 1 byte DTCStatusMask
    ReportDtcBySeverityMaskRecord = 0x08,
    /// This function takes a 3 byte DTCMaskRecord
    ReportSeverityInformationOfDtc = 0x09,
    /// This function takes no additional arguments
    ReportSupportedDtc = 0x0A,
    /// This function takes no additional arguments
    ReportFirstTestFailedDtc = 0x0B,
    /// This function takes no additional arguments
    ReportFirstConfirmedDtc = 0x0C,
    /// This function takes no additional arguments
    ReportMostRecentTestFailedDtc = 0x0D,
    /// This function takes no additional arguments
    ReportMostRecentConfirmedDtc = 0x0E,
    /// This function takes a 1 byte DTCStatusMask
    ReportMirrorMemoryDtcByStatusMask = 0x0F,
    /// This function takes a 3 byte DTCMaskRecord and a 1 byte DTCExtendedDataRecordNumber
    ReportMirrorMemoryDtcExtendedDataRecordByDtcNumber = 0x10,
    /// This function takes a 1 byte DTCStatusMask
    ReportNumberOfMirrorMemoryDtcByStatusMask = 0x11,
    /// This function takes a 1 byte DTCStatusMask
    ReportNumberOfEmissionsRelatedObdDtcByStatusMask = 0x12,
    /// This function takes a 1 byte DTCStatusMask
    ReportEmissionsRelatedObdDtcByStatusMask = 0x13,
    /// This function takes no additional arguments
    ReportDtcFaultDetectionCounter = 0x14,
    /// This function takes no additional arguments
    ReportDtcWithPermanentStatus = 0x15,
}

#[derive(Debug, Clone)]
/// Handler for the ReadDTCInformation service
pub struct ReadDtcInformation {
    store: Arc<DtcStore>,
}

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[ResponseCode::RequestOutOfRange];

impl ReadDtcInformation {
    /// Service ID
    pub const SID: u8 = 0x19;

    /// Creates the handler over the shared error memory
    pub fn new(store: Arc<DtcStore>) -> Self {
        Self { store }
    }
}

impl UdsService for ReadDtcInformation {
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
            log::info!("ReadDTCInformation request {req:02X?} is too short");
            return Some(self.negative_response(ResponseCode::GeneralReject));
        }
        let (sub_function, suppress) = split_sub_function(req[1]);
        match DtcSubFunction::from_repr(sub_function) {
            Some(DtcSubFunction::ReportDtcByStatusMask) => {
                let mask = req[2];
                let matches = self.store.query_by_mask(mask);
                log::debug!(
                    "reportDTCByStatusMask 0x{mask:02X} matched {} trouble codes",
                    matches.len()
                );
                if suppress {
                    return None;
                }
                let mut resp = vec![
                    self.response_sid(),
                    DtcSubFunction::ReportDtcByStatusMask as u8,
                    DTC_STATUS_AVAILABILITY_MASK,
                ];
                for dtc in matches {
                    resp.extend_from_slice(&dtc.value.encode());
                    resp.push(dtc.status.bits());
                }
                Some(resp)
            }
            _ => {
                log::info!("ReadDTCInformation sub-function {sub_function} is not handled");
                Some(self.negative_response(ResponseCode::RequestOutOfRange))
            }
        }
    }
}
