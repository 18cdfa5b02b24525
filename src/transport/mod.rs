//! Socket transport seam.
//!
//! A transport delivers its callbacks (open, close, error, message) as
//! [`TransportEvent`] values on a `flume` channel instead of invoking user
//! code from its own threads. The owner drains that channel from its tick.

pub mod framing;
pub mod tcp;

pub use tcp::TcpTransport;

/// Raw connection state as seen by the transport itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Connecting,
    Open,
    Closing,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    /// An established connection ended. Never sent for a connect attempt
    /// that did not reach `Open`; those report `Error` only.
    Close(CloseCode),
    Error(String),
    Message(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseCode {
    /// Closed from this side
    Normal,
    /// The peer hung up
    Remote,
    /// Read or write failed
    Abnormal,
}

pub trait Transport: Send {
    /// Starts connecting unless already open or connecting. Returns at once;
    /// the outcome arrives as an event.
    fn connect(&mut self);

    fn close(&mut self);

    /// Fire-and-forget. Dropped silently when not open.
    fn send(&mut self, bytes: Vec<u8>);

    fn state(&self) -> TransportState;

    /// The channel all callbacks are delivered on.
    fn events(&self) -> flume::Receiver<TransportEvent>;
}
