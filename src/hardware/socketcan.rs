//! SocketCAN ISO-TP transport (Linux only)
//!
//! Binds the simulator to the kernel's ISO-TP stack on a socketCAN
//! interface (EG: `can0` or `vcan0`). The kernel performs segmentation,
//! flow control and reassembly; this channel only moves complete UDS
//! payloads.

use std::time::{Duration, Instant};

use socketcan_isotp::{
    ExtendedId, FlowControlOptions, Id, IsoTpBehaviour, IsoTpOptions, LinkLayerOptions, StandardId,
};

use crate::channel::{ChannelError, ChannelResult, IsoTPChannel, IsoTPSettings, PayloadChannel};

/// SocketCAN ISO-TP channel
pub struct SocketCanIsoTpChannel {
    if_name: String,
    channel: Option<socketcan_isotp::IsoTpSocket>,
    /// Rx ID, Tx ID
    ids: (u32, u32),
    cfg: IsoTPSettings,
}

impl SocketCanIsoTpChannel {
    /// Creates a channel bound to a named socketCAN interface.
    ///
    /// The default address pair is the conventional physical addressing of
    /// a powertrain ECU (receive on 0x7E0, respond from 0x7E8); it can be
    /// changed with [PayloadChannel::set_ids] before opening.
    pub fn new(if_name: &str) -> Self {
        Self {
            if_name: if_name.to_string(),
            channel: None,
            ids: (0x7E0, 0x7E8),
            cfg: IsoTPSettings::default(),
        }
    }

    fn safe_with_iface<X, T: FnOnce(&mut socketcan_isotp::IsoTpSocket) -> ChannelResult<X>>(
        &mut self,
        function: T,
    ) -> ChannelResult<X> {
        match self.channel.as_mut() {
            Some(channel) => function(channel),
            None => Err(ChannelError::InterfaceNotOpen),
        }
    }
}

impl std::fmt::Debug for SocketCanIsoTpChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketCanIsoTpChannel")
            .field("if_name", &self.if_name)
            .field("ids", &self.ids)
            .finish()
    }
}

impl PayloadChannel for SocketCanIsoTpChannel {
    fn open(&mut self) -> ChannelResult<()> {
        if self.channel.is_some() {
            // Already open
            return Ok(());
        }
        let mut flags: IsoTpBehaviour = IsoTpBehaviour::empty();
        if self.cfg.pad_frame {
            flags |= IsoTpBehaviour::CAN_ISOTP_TX_PADDING;
        }

        let opts: IsoTpOptions = IsoTpOptions::new(
            flags,
            Duration::from_millis(0),
            0,
            0xCC,
            0xCC,
            0,
        )
        .unwrap();
        let link_opts: LinkLayerOptions = LinkLayerOptions::default();
        let fc_opts = FlowControlOptions::new(self.cfg.block_size, self.cfg.st_min, 0);

        let (rx_id, tx_id) = match self.cfg.can_use_ext_addr {
            true => (
                Id::Extended(unsafe { ExtendedId::new_unchecked(self.ids.0) }),
                Id::Extended(unsafe { ExtendedId::new_unchecked(self.ids.1) }),
            ),
            false => (
                Id::Standard(unsafe { StandardId::new_unchecked(self.ids.0 as u16) }),
                Id::Standard(unsafe { StandardId::new_unchecked(self.ids.1 as u16) }),
            ),
        };

        let socket = socketcan_isotp::IsoTpSocket::open_with_opts(
            &self.if_name,
            rx_id,
            tx_id,
            Some(opts),
            Some(fc_opts),
            Some(link_opts),
        )?;
        socket.set_nonblocking(true)?;
        self.channel = Some(socket);
        Ok(())
    }

    fn close(&mut self) -> ChannelResult<()> {
        // Dropping the socket closes it
        self.channel = None;
        Ok(())
    }

    fn set_ids(&mut self, rx: u32, tx: u32) -> ChannelResult<()> {
        self.ids = (rx, tx);
        Ok(())
    }

    fn read_bytes(&mut self, timeout_ms: u32) -> ChannelResult<Vec<u8>> {
        let timeout = std::cmp::max(1, timeout_ms);
        let start = Instant::now();
        self.safe_with_iface(|socket| {
            while start.elapsed().as_millis() <= u128::from(timeout) {
                if let Ok(data) = socket.read() {
                    return Ok(data.to_vec());
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            // Timeout
            if timeout_ms == 0 {
                Err(ChannelError::BufferEmpty)
            } else {
                Err(ChannelError::ReadTimeout)
            }
        })
    }

    fn write_bytes(&mut self, buffer: &[u8], _timeout_ms: u32) -> ChannelResult<()> {
        self.safe_with_iface(|socket| {
            socket.write(buffer)?;
            Ok(())
        })
    }

    fn clear_rx_buffer(&mut self) -> ChannelResult<()> {
        self.safe_with_iface(|socket| {
            while socket.read().is_ok() {}
            Ok(())
        })
    }

    fn clear_tx_buffer(&mut self) -> ChannelResult<()> {
        Ok(())
    }
}

impl IsoTPChannel for SocketCanIsoTpChannel {
    fn set_iso_tp_cfg(&mut self, cfg: IsoTPSettings) -> ChannelResult<()> {
        self.cfg = cfg;
        Ok(())
    }
}

impl Drop for SocketCanIsoTpChannel {
    #[allow(unused_must_use)]
    fn drop(&mut self) {
        self.close();
    }
}

impl From<socketcan_isotp::Error> for ChannelError {
    fn from(e: socketcan_isotp::Error) -> Self {
        Self::APIError {
            api_name: "SocketCAN".to_string(),
            code: 99,
            desc: e.to_string(),
        }
    }
}
