//! Module for the firmware download (end-of-line programming) session state
//!
//! The RoutineControl erase routine, RequestDownload, TransferData and
//! RequestTransferExit handlers drive this record through the standard UDS
//! flashing sequence. Any error detected while a download is in flight
//! resets the record to its initial state.

/// Largest ISO-TP payload the simulator accepts in one TransferData block,
/// announced to the tester in the RequestDownload response
pub const MAX_BLOCK_LENGTH: u16 = 0x0FFF;

#[derive(Debug, Clone)]
/// State of the firmware transfer currently in progress
pub struct FlashTransfer {
    /// True between an accepted RequestDownload and the transfer being
    /// aborted by an error
    pub active: bool,
    /// Memory address the download targets
    pub start_address: u64,
    /// Total byte count announced by the tester in RequestDownload
    pub transferred_size: u64,
    /// Bytes received via TransferData so far
    pub bytes_received: u64,
    /// blockSequenceCounter of the last accepted TransferData block.
    /// Wraps modulo 256: after block 0xFF the next expected counter is 0x00
    pub block_counter: u8,
    /// Largest block length accepted from the tester
    pub max_block_length: u16,
    /// Firmware bytes received so far
    pub buffer: Vec<u8>,
    /// Start address parsed from the erase flash routine
    pub erase_start_address: u32,
    /// Region size parsed from the erase flash routine
    pub erase_size: u32,
}

impl Default for FlashTransfer {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashTransfer {
    /// Creates an idle transfer state
    pub fn new() -> Self {
        Self {
            active: false,
            start_address: 0,
            transferred_size: 0,
            bytes_received: 0,
            block_counter: 0,
            max_block_length: MAX_BLOCK_LENGTH,
            buffer: Vec::new(),
            erase_start_address: 0,
            erase_size: 0,
        }
    }

    /// Restores every field to its initial value
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_initial_state() {
        let mut state = FlashTransfer::new();
        state.active = true;
        state.start_address = 0x0001_0000;
        state.transferred_size = 0x1000;
        state.bytes_received = 42;
        state.block_counter = 7;
        state.buffer = vec![0xAA; 42];
        state.erase_start_address = 0x0001_0000;
        state.erase_size = 0x1000;

        state.reset();

        assert!(!state.active);
        assert_eq!(state.start_address, 0);
        assert_eq!(state.transferred_size, 0);
        assert_eq!(state.bytes_received, 0);
        assert_eq!(state.block_counter, 0);
        assert_eq!(state.max_block_length, MAX_BLOCK_LENGTH);
        assert!(state.buffer.is_empty());
        assert_eq!(state.erase_start_address, 0);
        assert_eq!(state.erase_size, 0);
    }

    #[test]
    fn block_counter_wraps_modulo_256() {
        let mut state = FlashTransfer::new();
        state.block_counter = 0xFF;
        state.block_counter = state.block_counter.wrapping_add(1);
        assert_eq!(state.block_counter, 0x00);
    }
}
