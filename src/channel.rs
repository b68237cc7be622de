//! Module for logical communication channels between the simulated ECU and
//! a diagnostic tester
//!
//! Currently, the following channel types are defined:
//! * [PayloadChannel] - Basic channel, all channels inherit this trait
//! * [IsoTPChannel] - IsoTP (ISO15765) channel

/// Communication channel result
pub type ChannelResult<T> = Result<T, ChannelError>;

#[derive(Debug, thiserror::Error)]
/// Error produced by a communication channel
pub enum ChannelError {
    /// Underlying IO Error with channel
    #[error("IO error")]
    IOError(
        #[from]
        #[source]
        std::io::Error,
    ),
    /// Timeout when writing data to the channel
    #[error("timeout writing to channel")]
    WriteTimeout,
    /// Timeout when reading from the channel
    #[error("timeout reading from channel")]
    ReadTimeout,
    /// The channel's Rx buffer is empty. Only applies when read timeout is 0
    #[error("channel's receive buffer is empty")]
    BufferEmpty,
    /// The channels Tx buffer is full
    #[error("channel's transmit buffer is full")]
    BufferFull,
    /// Unsupported channel request
    #[error("unsupported channel request")]
    UnsupportedRequest,
    /// The interface is not open
    #[error("channel's interface is not open")]
    InterfaceNotOpen,
    /// Underlying API error with hardware
    #[error("underlying {api_name} API error ({code}): {desc}")]
    APIError {
        /// Name of the API EG: 'socketCAN'
        api_name: String,
        /// Internal API error code
        code: u8,
        /// API error description
        desc: String,
    },
}

/// Base trait for a transport which hands fully assembled UDS payloads to
/// the simulator and transmits its responses back to the tester.
///
/// Segmentation and reassembly happen below this trait; a frame read from
/// [PayloadChannel::read_bytes] is one complete application-layer request.
pub trait PayloadChannel: Send + Sync {
    /// This function opens the interface.
    /// It is ONLY called after [PayloadChannel::set_ids] and any other
    /// configuration function
    fn open(&mut self) -> ChannelResult<()>;

    /// Closes and destroys the channel
    fn close(&mut self) -> ChannelResult<()>;

    /// Configures the addresses the simulated ECU occupies on the network
    ///
    /// ## Parameters
    /// * rx - Receive ID (the tester addresses its requests to this ID)
    /// * tx - Transmit ID (the ECU sends its responses with this ID)
    fn set_ids(&mut self, rx: u32, tx: u32) -> ChannelResult<()>;

    /// Attempts to read a request frame from the channel.
    ///
    /// ## Parameters
    /// * timeout_ms - Timeout for reading bytes. If a value of 0 is used, it
    ///   instructs the channel to immediately return with whatever was in
    ///   its receiving buffer
    fn read_bytes(&mut self, timeout_ms: u32) -> ChannelResult<Vec<u8>>;

    /// Attempts to write a response frame to the channel
    ///
    /// ## Parameters
    /// * buffer - The buffer of bytes to write to the channel
    /// * timeout_ms - Timeout for writing bytes. If a value of 0 is used, it
    ///   tells the channel to write without checking if data was actually
    ///   written.
    fn write_bytes(&mut self, buffer: &[u8], timeout_ms: u32) -> ChannelResult<()>;

    /// Tells the channel to clear its Rx buffer
    fn clear_rx_buffer(&mut self) -> ChannelResult<()>;

    /// Tells the channel to clear its Tx buffer
    fn clear_tx_buffer(&mut self) -> ChannelResult<()>;
}

/// Extended trait for [PayloadChannel] when utilizing ISO-TP to talk to the
/// diagnostic tester
pub trait IsoTPChannel: PayloadChannel {
    /// Sets the ISO-TP specific configuration for the Channel
    ///
    /// ## Parameters
    /// * cfg - The configuration of the ISO-TP Channel
    fn set_iso_tp_cfg(&mut self, cfg: IsoTPSettings) -> ChannelResult<()>;
}

#[derive(Debug, Copy, Clone)]
/// ISO-TP configuration options
pub struct IsoTPSettings {
    /// Block size
    pub block_size: u8,
    /// Minimum separation time between CAN Frames (In milliseconds)
    pub st_min: u8,
    /// Pad frames over ISO-TP if data size < 8
    pub pad_frame: bool,
    /// Baud rate of the CAN Network
    pub can_speed: u32,
    /// Does the CAN Network support extended addressing (29bit) or standard
    /// addressing (11bit)
    pub can_use_ext_addr: bool,
    /// Timeout waiting for the tester's flow control frame (In milliseconds)
    pub rx_flowcontrol_timeout_ms: u32,
    /// Timeout waiting for the tester's next consecutive frame (In milliseconds)
    pub rx_consecutive_frame_timeout_ms: u32,
}

impl Default for IsoTPSettings {
    fn default() -> Self {
        Self {
            block_size: 8,
            st_min: 20,
            pad_frame: true,
            can_speed: 500_000,
            can_use_ext_addr: false,
            rx_flowcontrol_timeout_ms: 5000,
            rx_consecutive_frame_timeout_ms: 5000,
        }
    }
}
