//! Wire protocol between the authoritative server and clients.
//!
//! Frames go server -> client, spawn commands go client -> server. Both are
//! built from the same fixed-size body record, see [`codec`].

pub mod codec;
pub mod frame;

pub use codec::{decode_frame, decode_spawn, encode_frame, encode_spawn, frame_len, BODY_RECORD_LEN, FRAME_HEADER_LEN};
pub use frame::Frame;
