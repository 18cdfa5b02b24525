//! TCP implementation of [`Transport`].
//!
//! Each connection gets a reader thread (which also performs the connect)
//! and a writer thread fed through a `flume` queue, so `send` never blocks
//! the caller.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::transport::framing::{read_message, write_message};
use crate::transport::{CloseCode, Transport, TransportEvent, TransportState};

struct Link {
    control: TcpStream,
    outgoing: flume::Sender<Vec<u8>>,
}

struct Shared {
    state: Mutex<TransportState>,
    link: Mutex<Option<Link>>,
}

pub struct TcpTransport {
    address: String,
    shared: Arc<Shared>,
    events_tx: flume::Sender<TransportEvent>,
    events_rx: flume::Receiver<TransportEvent>,
}

impl TcpTransport {
    pub fn new(address: impl Into<String>) -> Self {
        let (events_tx, events_rx) = flume::unbounded();
        Self {
            address: address.into(),
            shared: Arc::new(Shared {
                state: Mutex::new(TransportState::Closed),
                link: Mutex::new(None),
            }),
            events_tx,
            events_rx,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) {
        {
            let mut state = self.shared.state.lock();
            if *state != TransportState::Closed {
                debug!("connect ignored, transport is {:?}", *state);
                return;
            }
            *state = TransportState::Connecting;
        }

        let address = self.address.clone();
        let shared = self.shared.clone();
        let events = self.events_tx.clone();
        let spawned = thread::Builder::new()
            .name("gso-tcp-reader".into())
            .spawn(move || run_connection(address, shared, events));

        if let Err(e) = spawned {
            *self.shared.state.lock() = TransportState::Closed;
            let _ = self.events_tx.send(TransportEvent::Error(format!("failed to spawn reader: {}", e)));
        }
    }

    fn close(&mut self) {
        let mut state = self.shared.state.lock();
        match *state {
            TransportState::Open | TransportState::Connecting => *state = TransportState::Closing,
            _ => return,
        }
        if let Some(link) = self.shared.link.lock().as_ref() {
            let _ = link.control.shutdown(Shutdown::Both);
        }
    }

    fn send(&mut self, bytes: Vec<u8>) {
        if let Some(link) = self.shared.link.lock().as_ref() {
            let _ = link.outgoing.send(bytes);
        }
    }

    fn state(&self) -> TransportState {
        *self.shared.state.lock()
    }

    fn events(&self) -> flume::Receiver<TransportEvent> {
        self.events_rx.clone()
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn fail(shared: &Shared, events: &flume::Sender<TransportEvent>, message: String) {
    warn!("{}", message);
    *shared.state.lock() = TransportState::Closed;
    let _ = events.send(TransportEvent::Error(message));
}

fn run_connection(address: String, shared: Arc<Shared>, events: flume::Sender<TransportEvent>) {
    let stream = match TcpStream::connect(&address) {
        Ok(stream) => stream,
        Err(e) => return fail(&shared, &events, format!("connect to {} failed: {}", address, e)),
    };
    let _ = stream.set_nodelay(true);
    let (writer, control) = match (stream.try_clone(), stream.try_clone()) {
        (Ok(writer), Ok(control)) => (writer, control),
        (Err(e), _) | (_, Err(e)) => return fail(&shared, &events, format!("socket clone failed: {}", e)),
    };

    let (outgoing, queue) = flume::unbounded::<Vec<u8>>();
    {
        let mut state = shared.state.lock();
        if *state == TransportState::Closing {
            // Closed while the connect was in flight
            let _ = stream.shutdown(Shutdown::Both);
            *state = TransportState::Closed;
            return;
        }
        *state = TransportState::Open;
        *shared.link.lock() = Some(Link { control, outgoing });
    }
    info!("connected to {}", address);
    let _ = events.send(TransportEvent::Open);

    let writer_thread = thread::Builder::new().name("gso-tcp-writer".into()).spawn(move || {
        let mut writer = BufWriter::new(writer);
        for bytes in queue.iter() {
            if let Err(e) = write_message(&mut writer, &bytes) {
                warn!("write failed: {}", e);
                let _ = writer.get_ref().shutdown(Shutdown::Both);
                break;
            }
        }
    });
    if let Err(e) = writer_thread {
        let _ = stream.shutdown(Shutdown::Both);
        warn!("failed to spawn writer: {}", e);
    }

    let mut reader = BufReader::new(stream);
    let code = loop {
        match read_message(&mut reader) {
            Ok(Some(bytes)) => {
                let _ = events.send(TransportEvent::Message(bytes));
            }
            Ok(None) => break CloseCode::Remote,
            Err(e) => {
                if *shared.state.lock() == TransportState::Closing {
                    break CloseCode::Normal;
                }
                let _ = events.send(TransportEvent::Error(e.to_string()));
                break CloseCode::Abnormal;
            }
        }
    };

    let code = if *shared.state.lock() == TransportState::Closing { CloseCode::Normal } else { code };
    // Dropping the link ends the writer thread
    *shared.link.lock() = None;
    *shared.state.lock() = TransportState::Closed;
    info!("connection to {} closed ({:?})", address, code);
    let _ = events.send(TransportEvent::Close(code));
}
