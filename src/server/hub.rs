//! TCP front end for [`SimulationServer`].
//!
//! One acceptor thread, one reader and one writer thread per client. Readers
//! forward inbound messages over a `flume` channel; the tick loop is the only
//! code that touches the simulation.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::error::ServerError;
use crate::server::SimulationServer;
use crate::settings::SimulationSettings;
use crate::transport::framing::{read_message, write_message};

/// Frames queued per client before new ones are skipped for it.
const CLIENT_QUEUE: usize = 4;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub max_clients: usize,
    pub max_bodies: usize,
    pub tick: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8080".into(),
            max_clients: 50,
            max_bodies: 512,
            tick: Duration::from_millis(16),
        }
    }
}

enum Inbound {
    Command(Vec<u8>),
    Left(u64),
}

struct Client {
    id: u64,
    peer: SocketAddr,
    outgoing: flume::Sender<Arc<Vec<u8>>>,
}

type Clients = Arc<Mutex<Vec<Client>>>;

/// Binds and runs the server loop. Only returns on a startup error.
pub fn serve(config: ServerConfig, settings: SimulationSettings) -> Result<(), ServerError> {
    let mut server = SimulationServer::new(settings, config.max_bodies)?;
    let listener = TcpListener::bind(&config.address)?;
    info!("listening on {}", listener.local_addr()?);

    let clients: Clients = Arc::new(Mutex::new(Vec::new()));
    let (inbound_tx, inbound_rx) = flume::unbounded();

    {
        let clients = clients.clone();
        let max_clients = config.max_clients;
        thread::Builder::new()
            .name("gso-acceptor".into())
            .spawn(move || accept_loop(listener, clients, inbound_tx, max_clients))?;
    }

    let dt = config.tick.as_secs_f32();
    loop {
        let started = Instant::now();

        for message in inbound_rx.try_iter() {
            match message {
                Inbound::Command(bytes) => {
                    if let Err(e) = server.ingest(&bytes) {
                        warn!("bad spawn command: {}", e);
                    }
                }
                Inbound::Left(id) => {
                    info!("client {} left", id);
                    clients.lock().retain(|c| c.id != id);
                }
            }
        }

        server.step(dt);

        let mut connected = clients.lock();
        let frame = Arc::new(server.encoded_frame(connected.len().min(u16::MAX as usize) as u16));
        connected.retain(|client| match client.outgoing.try_send(frame.clone()) {
            Ok(()) => true,
            Err(flume::TrySendError::Full(_)) => {
                debug!("client {} is behind, skipping frame", client.id);
                true
            }
            Err(flume::TrySendError::Disconnected(_)) => {
                info!("client {} ({}) dropped", client.id, client.peer);
                false
            }
        });
        drop(connected);

        thread::sleep(config.tick.saturating_sub(started.elapsed()));
    }
}

fn accept_loop(listener: TcpListener, clients: Clients, inbound: flume::Sender<Inbound>, max_clients: usize) {
    let mut next_id = 0u64;
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!("accept failed: {}", e);
                continue;
            }
        };
        if clients.lock().len() >= max_clients {
            warn!("refusing connection, {} clients connected", max_clients);
            let _ = stream.shutdown(Shutdown::Both);
            continue;
        }
        next_id += 1;
        if let Err(e) = register(next_id, stream, &clients, inbound.clone()) {
            warn!("failed to register client {}: {}", next_id, e);
        }
    }
}

fn register(id: u64, stream: TcpStream, clients: &Clients, inbound: flume::Sender<Inbound>) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    let _ = stream.set_nodelay(true);
    let reader = stream.try_clone()?;
    let (outgoing, queue) = flume::bounded::<Arc<Vec<u8>>>(CLIENT_QUEUE);

    thread::Builder::new().name(format!("gso-client-{}-writer", id)).spawn(move || {
        let mut writer = BufWriter::new(stream);
        for frame in queue.iter() {
            if let Err(e) = write_message(&mut writer, &frame) {
                debug!("client {} write failed: {}", id, e);
                break;
            }
        }
        let _ = writer.get_ref().shutdown(Shutdown::Both);
    })?;

    thread::Builder::new().name(format!("gso-client-{}-reader", id)).spawn(move || {
        let mut reader = BufReader::new(reader);
        while let Ok(Some(bytes)) = read_message(&mut reader) {
            if inbound.send(Inbound::Command(bytes)).is_err() {
                return;
            }
        }
        let _ = inbound.send(Inbound::Left(id));
    })?;

    clients.lock().push(Client { id, peer, outgoing });
    info!("client {} joined from {}", id, peer);
    Ok(())
}
