//! Simulation transport for unit testing the simulator without bus
//! hardware

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::channel::{ChannelError, ChannelResult, IsoTPChannel, IsoTPSettings, PayloadChannel};

/// In-memory ISO-TP channel
///
/// Cloning yields a handle to the same queues, so a test keeps one clone as
/// the tester side while the server owns the other: requests injected
/// through [SimulationIsoTpChannel::inject_request] surface in the
/// simulator's receive loop, and everything the simulator transmits can be
/// popped with [SimulationIsoTpChannel::take_response].
#[derive(Debug, Clone, Default)]
pub struct SimulationIsoTpChannel {
    rx_queue: Arc<RwLock<VecDeque<Vec<u8>>>>,
    tx_queue: Arc<RwLock<VecDeque<Vec<u8>>>>,
}

impl SimulationIsoTpChannel {
    /// Creates a channel with empty queues
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a request frame as if a tester had transmitted it
    pub fn inject_request(&self, frame: &[u8]) {
        self.rx_queue.write().unwrap().push_back(frame.to_vec());
    }

    /// Pops the next response frame the ECU transmitted, if any
    pub fn take_response(&self) -> Option<Vec<u8>> {
        self.tx_queue.write().unwrap().pop_front()
    }
}

impl PayloadChannel for SimulationIsoTpChannel {
    fn open(&mut self) -> ChannelResult<()> {
        Ok(())
    }

    fn close(&mut self) -> ChannelResult<()> {
        Ok(())
    }

    fn set_ids(&mut self, _rx: u32, _tx: u32) -> ChannelResult<()> {
        Ok(())
    }

    fn read_bytes(&mut self, timeout_ms: u32) -> ChannelResult<Vec<u8>> {
        let start = Instant::now();
        loop {
            if let Some(frame) = self.rx_queue.write().unwrap().pop_front() {
                return Ok(frame);
            }
            if start.elapsed().as_millis() >= u128::from(timeout_ms) {
                return Err(if timeout_ms == 0 {
                    ChannelError::BufferEmpty
                } else {
                    ChannelError::ReadTimeout
                });
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn write_bytes(&mut self, buffer: &[u8], _timeout_ms: u32) -> ChannelResult<()> {
        self.tx_queue.write().unwrap().push_back(buffer.to_vec());
        Ok(())
    }

    fn clear_rx_buffer(&mut self) -> ChannelResult<()> {
        self.rx_queue.write().unwrap().clear();
        Ok(())
    }

    fn clear_tx_buffer(&mut self) -> ChannelResult<()> {
        self.tx_queue.write().unwrap().clear();
        Ok(())
    }
}

impl IsoTPChannel for SimulationIsoTpChannel {
    fn set_iso_tp_cfg(&mut self, _cfg: IsoTPSettings) -> ChannelResult<()> {
        Ok(())
    }
}
