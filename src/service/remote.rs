//! Client side of the authoritative server.
//!
//! ```text
//! Inactive --activate--> Connecting --open--> Open --close--> Closed
//!                            ^                                  |
//!                            +------ one retry after delay -----+
//! any --deactivate--> Inactive
//! ```
//!
//! Transport callbacks only queue [`TransportEvent`]s. They are applied in
//! [`tick`](SimulationService::tick), which is also where the reconnect
//! timer runs. Each close schedules exactly one retry; a retry that fails to
//! open does not schedule another.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::bodies::SpawnRequest;
use crate::error::ConnectionError;
use crate::protocol::{decode_frame, encode_spawn, Frame};
use crate::service::SimulationService;
use crate::transport::{TcpTransport, Transport, TransportEvent, TransportState};

pub const DEFAULT_RECONNECT_DELAY: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub address: String,
    /// Seconds of tick time between a close and the retry
    pub reconnect_delay: f32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8080".into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Inactive,
    Connecting,
    Open,
    Closing,
    Closed,
}

pub struct ConnectionManager {
    transport: Box<dyn Transport>,
    events: flume::Receiver<TransportEvent>,
    config: RemoteConfig,
    state: ConnectionState,
    frame: Arc<Frame>,
    player_count: u16,
    object_count: usize,
    error: Option<ConnectionError>,
    reconnect_in: Option<f32>,
    status_changed: bool,
}

impl ConnectionManager {
    pub fn new(transport: Box<dyn Transport>, config: RemoteConfig) -> Self {
        let events = transport.events();
        Self {
            transport,
            events,
            config,
            state: ConnectionState::Inactive,
            frame: Arc::new(Frame::empty(1)),
            player_count: 1,
            object_count: 0,
            error: None,
            reconnect_in: None,
            status_changed: false,
        }
    }

    pub fn connect_tcp(config: RemoteConfig) -> Self {
        let transport = TcpTransport::new(config.address.clone());
        Self::new(Box::new(transport), config)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_in.is_some()
    }

    /// Starts a connect, or adopts the transport's connection when it is
    /// already open (no Open event will follow in that case).
    fn connect(&mut self) {
        let transport_state = self.transport.state();
        debug!("connect with transport {:?}", transport_state);
        if transport_state == TransportState::Open {
            if self.state != ConnectionState::Open {
                info!("transport already open");
                self.state = ConnectionState::Open;
                self.status_changed = true;
            }
            return;
        }
        self.transport.connect();
        self.state = ConnectionState::Connecting;
    }

    fn discard_pending_events(&self) {
        let stale = self.events.drain().count();
        if stale > 0 {
            debug!("discarded {} stale transport events", stale);
        }
    }

    fn reset_cache(&mut self, player_count: u16) {
        self.frame = Arc::new(Frame::empty(player_count));
        self.player_count = player_count;
        self.object_count = 0;
    }

    fn schedule_retry(&mut self) {
        debug!("retry in {}s", self.config.reconnect_delay);
        self.reconnect_in = Some(self.config.reconnect_delay);
    }

    fn fire_retry(&mut self) {
        if self.transport.state() == TransportState::Open {
            info!("skipping retry, already connected");
        } else {
            info!("retrying connection to {}", self.config.address);
        }
        self.connect();
    }

    fn handle(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Open => {
                info!("connection open");
                self.state = ConnectionState::Open;
                self.status_changed = true;
            }
            TransportEvent::Close(code) => {
                info!("connection closed ({:?})", code);
                self.state = ConnectionState::Closed;
                self.status_changed = true;
                self.schedule_retry();
            }
            TransportEvent::Error(message) => {
                warn!("transport error: {}", message);
                self.error = Some(ConnectionError::transport(message));
                if self.state == ConnectionState::Connecting && self.transport.state() == TransportState::Closed {
                    self.state = ConnectionState::Closed;
                    self.status_changed = true;
                }
            }
            TransportEvent::Message(bytes) => match decode_frame(&bytes) {
                Ok(frame) => {
                    self.player_count = frame.player_count;
                    self.object_count = frame.len();
                    self.frame = Arc::new(frame);
                    self.error = None;
                }
                Err(e) => {
                    warn!("dropping inbound frame: {}", e);
                    self.error = Some(ConnectionError::decode(&e));
                }
            },
        }
    }
}

impl SimulationService for ConnectionManager {
    fn activate(&mut self) {
        info!("activating remote simulation at {}", self.config.address);
        self.discard_pending_events();
        self.state = ConnectionState::Connecting;
        self.status_changed = true;
        self.connect();
    }

    fn deactivate(&mut self) {
        info!("deactivating remote simulation");
        if matches!(self.transport.state(), TransportState::Open | TransportState::Connecting) {
            self.transport.close();
        }
        self.reconnect_in = None;
        self.discard_pending_events();
        self.reset_cache(1);
        self.state = ConnectionState::Inactive;
        self.status_changed = true;
    }

    fn reactivate(&mut self) {
        self.reset_cache(0);
        if self.state == ConnectionState::Inactive {
            self.discard_pending_events();
            self.state = ConnectionState::Connecting;
        }
        if self.transport.state() == TransportState::Closed {
            self.connect();
        } else {
            self.schedule_retry();
        }
    }

    fn is_ready(&self) -> bool {
        self.state == ConnectionState::Open && self.transport.state() == TransportState::Open
    }

    fn add_body(&mut self, spawn: SpawnRequest) {
        if !self.is_ready() {
            debug!("spawn dropped while {:?}", self.state);
            return;
        }
        self.transport.send(encode_spawn(&spawn));
    }

    fn read_bodies(&self) -> Arc<Frame> {
        self.frame.clone()
    }

    fn player_count(&self) -> u16 {
        self.player_count
    }

    fn object_count(&self) -> usize {
        self.object_count
    }

    fn try_get_connection_error(&self) -> Option<ConnectionError> {
        self.error.clone()
    }

    fn take_status_changed(&mut self) -> bool {
        std::mem::take(&mut self.status_changed)
    }

    fn tick(&mut self, dt: f32) {
        if self.state == ConnectionState::Inactive {
            self.discard_pending_events();
            return;
        }

        if let Some(remaining) = self.reconnect_in {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.reconnect_in = None;
                self.fire_retry();
            } else {
                self.reconnect_in = Some(remaining);
            }
        }

        let events = self.events.clone();
        for event in events.try_iter() {
            self.handle(event);
        }

        if self.state == ConnectionState::Open && self.transport.state() == TransportState::Closing {
            self.state = ConnectionState::Closing;
        }
    }
}
