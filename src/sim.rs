//! Module for the simulator core: the service dispatch table and the
//! background receive loop binding it to a transport

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use automotive_diag::ByteWrapper;
use automotive_diag::uds::UdsCommandByte;

use crate::SimResult;
use crate::channel::{ChannelError, IsoTPChannel, IsoTPSettings};
use crate::did::DidTable;
use crate::dtc::DtcStore;
use crate::flash::FlashTransfer;
use crate::services::{
    ClearDiagnosticInformation, CommunicationControl, ControlDtcSetting,
    DiagnosticSessionControl, EcuReset, ReadDataByIdentifier, ReadDtcInformation,
    RequestDownload, RequestTransferExit, RequestUpload, RoutineControl, SecurityAccess,
    TesterPresent, TransferData, UdsService, WriteDataByIdentifier,
};

/// UDS ECU simulator
///
/// Owns the simulated ECU state (error memory, data identifier table,
/// download session) and a dispatch table mapping each supported service ID
/// to its handler. Handlers receive the shared state at construction, so a
/// fresh simulator per test is fully isolated.
pub struct EcuSimulator {
    services: HashMap<u8, Box<dyn UdsService>>,
    dtc_store: Arc<DtcStore>,
    did_table: Arc<DidTable>,
    flash: Arc<Mutex<FlashTransfer>>,
}

impl std::fmt::Debug for EcuSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcuSimulator")
            .field("services", &self.services.len())
            .field("dtc_store", &self.dtc_store)
            .field("flash", &self.flash)
            .finish()
    }
}

impl Default for EcuSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl EcuSimulator {
    /// Creates a simulator with its factory state: the default DID table,
    /// three pre-seeded trouble codes and an idle download session
    pub fn new() -> Self {
        let dtc_store = Arc::new(DtcStore::new());
        dtc_store.add(0x0001, 0x02, 0xCD);
        dtc_store.add(0x0235, 0x0C, 0xFE);
        dtc_store.add(0xD982, 0x0F, 0x2E);

        let did_table = Arc::new(DidTable::new());
        let flash = Arc::new(Mutex::new(FlashTransfer::new()));

        let handlers: Vec<Box<dyn UdsService>> = vec![
            Box::new(DiagnosticSessionControl),
            Box::new(EcuReset),
            Box::new(ClearDiagnosticInformation::new(dtc_store.clone())),
            Box::new(ReadDtcInformation::new(dtc_store.clone())),
            Box::new(ReadDataByIdentifier::new(did_table.clone())),
            Box::new(SecurityAccess::new()),
            Box::new(CommunicationControl),
            Box::new(WriteDataByIdentifier::new(did_table.clone())),
            Box::new(RoutineControl::new(flash.clone())),
            Box::new(RequestDownload::new(flash.clone())),
            Box::new(RequestUpload),
            Box::new(TransferData::new(flash.clone())),
            Box::new(RequestTransferExit),
            Box::new(TesterPresent),
            Box::new(ControlDtcSetting),
        ];
        let mut services: HashMap<u8, Box<dyn UdsService>> = HashMap::new();
        for handler in handlers {
            services.insert(handler.sid(), handler);
        }

        Self {
            services,
            dtc_store,
            did_table,
            flash,
        }
    }

    /// Shared handle to the simulated error memory, for injecting or
    /// inspecting trouble codes from outside the receive task
    pub fn dtc_store(&self) -> Arc<DtcStore> {
        self.dtc_store.clone()
    }

    /// Shared handle to the data identifier table
    pub fn did_table(&self) -> Arc<DidTable> {
        self.did_table.clone()
    }

    /// Shared handle to the firmware download session state
    pub fn flash_state(&self) -> Arc<Mutex<FlashTransfer>> {
        self.flash.clone()
    }

    /// Routes one request frame to its service handler and returns the
    /// response frame to transmit.
    ///
    /// `None` means nothing goes back on the wire: the SID is unknown, the
    /// request was suppressed, or the handler dropped a malformed frame. A
    /// panicking handler is caught and logged so the receive loop survives.
    pub fn handle_request(&mut self, frame: &[u8]) -> Option<Vec<u8>> {
        let Some(&sid) = frame.first() else {
            log::error!("transport delivered an empty frame");
            return None;
        };
        let Some(service) = self.services.get_mut(&sid) else {
            match UdsCommandByte::from(sid) {
                ByteWrapper::Standard(cmd) => {
                    log::error!("receive request SID 0x{sid:02X} ({cmd:?}) is not supported, there is no handler here");
                }
                ByteWrapper::Extended(_) => {
                    log::error!("receive request SID 0x{sid:02X} is not a UDS service");
                }
            }
            return None;
        };
        match catch_unwind(AssertUnwindSafe(|| service.process(frame))) {
            Ok(response) => response,
            Err(_) => {
                log::error!("service 0x{sid:02X} panicked while processing {frame:02X?}");
                None
            }
        }
    }
}

#[derive(Debug, Copy, Clone)]
/// Options for the simulator's receive loop
pub struct SimServerOptions {
    /// CAN ID the ECU receives requests on
    pub rx_id: u32,
    /// CAN ID the ECU transmits responses with
    pub tx_id: u32,
    /// Poll timeout of one receive attempt (milliseconds)
    pub poll_interval_ms: u32,
    /// Send timeout when writing responses (milliseconds)
    pub write_timeout_ms: u32,
    /// ISO-TP layer configuration
    pub isotp: IsoTPSettings,
}

impl Default for SimServerOptions {
    fn default() -> Self {
        Self {
            rx_id: 0x7E0,
            tx_id: 0x7E8,
            poll_interval_ms: 10,
            write_timeout_ms: 5000,
            isotp: IsoTPSettings::default(),
        }
    }
}

#[derive(Debug)]
/// Background receive loop binding an [EcuSimulator] to a transport
///
/// One dedicated task polls the transport, dispatches each request and
/// writes the response back. UDS is a strict request/response protocol, so
/// a single worker is all the concurrency the simulator ever needs.
pub struct EcuSimServer {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EcuSimServer {
    /// Configures the channel and launches the receive task.
    ///
    /// The channel is configured with the ISO-TP settings and address pair
    /// from `options` before the task starts; a configuration failure is
    /// returned synchronously.
    pub fn launch(
        mut simulator: EcuSimulator,
        mut channel: Box<dyn IsoTPChannel>,
        options: SimServerOptions,
    ) -> SimResult<Self> {
        channel.set_iso_tp_cfg(options.isotp)?;
        channel.set_ids(options.rx_id, options.tx_id)?;
        channel.open()?;

        let running = Arc::new(AtomicBool::new(true));
        let running_t = running.clone();

        let handle = std::thread::spawn(move || {
            log::info!(
                "ECU simulator listening on 0x{:03X}, responding from 0x{:03X}",
                options.rx_id,
                options.tx_id
            );
            while running_t.load(Ordering::Relaxed) {
                let frame = match channel.read_bytes(options.poll_interval_ms) {
                    Ok(frame) => frame,
                    Err(ChannelError::ReadTimeout) | Err(ChannelError::BufferEmpty) => continue,
                    Err(e) => {
                        log::error!("reading from the transport failed: {e}");
                        std::thread::sleep(Duration::from_millis(u64::from(
                            options.poll_interval_ms,
                        )));
                        continue;
                    }
                };
                if frame.is_empty() {
                    continue;
                }
                log::debug!("request frame {frame:02X?}");
                if let Some(response) = simulator.handle_request(&frame) {
                    log::debug!("response frame {response:02X?}");
                    if let Err(e) = channel.write_bytes(&response, options.write_timeout_ms) {
                        log::error!("transmitting response failed: {e}");
                    }
                }
            }
            if let Err(e) = channel.close() {
                log::warn!("closing the transport failed: {e}");
            }
        });

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Returns true while the receive task is alive
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the receive task and waits for it to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EcuSimServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::simulation::SimulationIsoTpChannel;
    use crate::response::ResponseCode;

    struct Panicker;

    impl UdsService for Panicker {
        fn sid(&self) -> u8 {
            0x2F
        }

        fn supported_negative_responses(&self) -> &'static [ResponseCode] {
            &[]
        }

        fn process(&mut self, _req: &[u8]) -> Option<Vec<u8>> {
            panic!("handler blew up");
        }
    }

    #[test]
    fn unknown_sid_yields_no_response() {
        let mut sim = EcuSimulator::new();
        // Enumerated UDS service without a handler
        assert_eq!(sim.handle_request(&[0x2C, 0x01]), None);
        // Byte that is not a UDS service at all
        assert_eq!(sim.handle_request(&[0xBA, 0x01]), None);
    }

    #[test]
    fn empty_frame_yields_no_response() {
        let mut sim = EcuSimulator::new();
        assert_eq!(sim.handle_request(&[]), None);
    }

    #[test]
    fn handler_panic_is_contained() {
        let _ = env_logger::try_init();
        let mut sim = EcuSimulator::new();
        sim.services.insert(0x2F, Box::new(Panicker));
        assert_eq!(sim.handle_request(&[0x2F, 0x00]), None);
        // The dispatcher keeps working afterwards
        assert_eq!(sim.handle_request(&[0x3E, 0x00]), Some(vec![0x7E, 0x00]));
    }

    fn poll_response(tester: &SimulationIsoTpChannel) -> Option<Vec<u8>> {
        for _ in 0..500 {
            if let Some(resp) = tester.take_response() {
                return Some(resp);
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        None
    }

    #[test]
    fn server_loop_answers_over_the_channel() {
        let _ = env_logger::try_init();
        let channel = SimulationIsoTpChannel::new();
        let tester = channel.clone();
        let mut server = EcuSimServer::launch(
            EcuSimulator::new(),
            Box::new(channel),
            SimServerOptions::default(),
        )
        .unwrap();
        assert!(server.is_running());

        tester.inject_request(&[0x3E, 0x00]);
        assert_eq!(poll_response(&tester), Some(vec![0x7E, 0x00]));

        // Suppressed request produces nothing; the next response belongs to
        // the session control request that follows it
        tester.inject_request(&[0x3E, 0x80]);
        tester.inject_request(&[0x10, 0x03]);
        assert_eq!(
            poll_response(&tester),
            Some(vec![0x50, 0x03, 0x13, 0x88, 0x00, 0xC8])
        );

        server.stop();
        assert!(!server.is_running());
    }
}
