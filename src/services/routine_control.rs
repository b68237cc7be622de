//! Provides the RoutineControl (SID 0x31) service of the simulated ECU
//!
//! Two routines exist: EraseFlash, which arms the firmware download state
//! machine, and CheckMemory, which succeeds without side effects. Stopping
//! a routine or requesting results is silently ignored, as is an unknown
//! routine identifier.

use std::sync::{Arc, Mutex};

use strum_macros::FromRepr;

use crate::flash::FlashTransfer;
use crate::response::ResponseCode;
use crate::services::{UdsService, split_sub_function};

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromRepr)]
#[repr(u8)]
/// Routine control sub-functions
pub enum RoutineOperation {
    /// Launch a routine
    StartRoutine = 0x01,
    /// Stop a running routine
    StopRoutine = 0x02,
    /// Query the results of a routine
    RequestRoutineResults = 0x03,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromRepr)]
#[repr(u16)]
/// Routine identifiers known to the simulator
pub enum RoutineId {
    /// Erases the flash region a subsequent download will rewrite
    EraseFlash = 0x1122,
    /// Verifies a previously flashed memory region
    CheckMemory = 0x3344,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
/// Routine completion status transmitted in the positive response
pub enum RoutineStatus {
    /// Routine finished successfully
    Succeed = 0x01,
    /// Routine failed
    Failed = 0xFF,
}

#[derive(Debug, Clone)]
/// Handler for the RoutineControl service
pub struct RoutineControl {
    flash: Arc<Mutex<FlashTransfer>>,
}

const SUPPORTED_NEGATIVE_RESPONSES: &[ResponseCode] = &[];

impl RoutineControl {
    /// Service ID
    pub const SID: u8 = 0x31;

    /// Creates the handler over the shared download session state
    pub fn new(flash: Arc<Mutex<FlashTransfer>>) -> Self {
        Self { flash }
    }
}

impl UdsService for RoutineControl {
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
            log::error!("RoutineControl request {req:02X?} is missing the routine identifier");
            return None;
        }
        let (sub_function, suppress) = split_sub_function(req[1]);
        if RoutineOperation::from_repr(sub_function) != Some(RoutineOperation::StartRoutine) {
            log::debug!("routine control sub-function {sub_function} is ignored");
            return None;
        }
        let routine_id = u16::from_be_bytes([req[2], req[3]]);
        match RoutineId::from_repr(routine_id) {
            Some(RoutineId::EraseFlash) => {
                let option_record = &req[4..];
                if option_record.len() < 8 {
                    log::error!(
                        "erase flash option record {option_record:02X?} is too short for address and size"
                    );
                    return None;
                }
                let mut flash = self.flash.lock().unwrap();
                flash.reset();
                flash.erase_start_address = u32::from_be_bytes([
                    option_record[0],
                    option_record[1],
                    option_record[2],
                    option_record[3],
                ]);
                flash.erase_size = u32::from_be_bytes([
                    option_record[4],
                    option_record[5],
                    option_record[6],
                    option_record[7],
                ]);
                log::info!(
                    "erase flash requested for 0x{:08X} (+{} bytes)",
                    flash.erase_start_address,
                    flash.erase_size
                );
            }
            Some(RoutineId::CheckMemory) => {
                log::debug!("check memory routine started");
            }
            None => {
                log::info!("routine 0x{routine_id:04X} is not defined");
                return None;
            }
        }
        if suppress {
            return None;
        }
        Some(vec![
            self.response_sid(),
            RoutineOperation::StartRoutine as u8,
            req[2],
            req[3],
            RoutineStatus::Succeed as u8,
        ])
    }
}
