//! Binary codec for frames and spawn commands.
//!
//! All numbers are little-endian regardless of host.
//!
//! Frame (server -> client):
//! ```text
//! u16 player_count
//! BodyRecord * n          n = (len - 2) / 27, remainder is an error
//! ```
//!
//! BodyRecord (27 bytes, no padding, same as the Go server's packet):
//! ```text
//! u16 id | f32 pos_x | f32 pos_y | f32 vel_x | f32 vel_y | f32 mass | f32 radius | u8 texture
//! ```
//!
//! A spawn command (client -> server) is a single BodyRecord. Its `id` and
//! `mass` are written as zero and ignored on decode.

use bytemuck::{ AnyBitPattern, NoUninit };
use ultraviolet::Vec2;

use crate::bodies::{Body, SpawnRequest, WHITE};
use crate::error::CodecError;
use crate::protocol::Frame;

pub const FRAME_HEADER_LEN: usize = 2;
pub const BODY_RECORD_LEN: usize = std::mem::size_of::<BodyRecord>();

/// Wire image of one body. Fields hold little-endian bit patterns so the
/// byte view is identical on every host.
#[derive(Clone, Copy, NoUninit, AnyBitPattern)]
#[repr(C, packed)]
struct BodyRecord {
    id: u16,
    pos_x: u32,
    pos_y: u32,
    vel_x: u32,
    vel_y: u32,
    mass: u32,
    radius: u32,
    texture: u8,
}

const _: () = assert!(BODY_RECORD_LEN == 27);

fn put_f32(value: f32) -> u32 {
    value.to_bits().to_le()
}

fn get_f32(raw: u32) -> f32 {
    f32::from_bits(u32::from_le(raw))
}

impl BodyRecord {
    fn from_body(body: &Body) -> Self {
        Self {
            id: body.id.to_le(),
            pos_x: put_f32(body.pos.x),
            pos_y: put_f32(body.pos.y),
            vel_x: put_f32(body.vel.x),
            vel_y: put_f32(body.vel.y),
            mass: put_f32(body.mass()),
            radius: put_f32(body.radius()),
            texture: body.texture,
        }
    }

    fn from_spawn(spawn: &SpawnRequest) -> Self {
        Self {
            id: 0,
            pos_x: put_f32(spawn.pos.x),
            pos_y: put_f32(spawn.pos.y),
            vel_x: put_f32(spawn.vel.x),
            vel_y: put_f32(spawn.vel.y),
            mass: put_f32(0.0),
            radius: put_f32(spawn.radius),
            texture: spawn.texture,
        }
    }

    fn read(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(bytes)
    }

    fn pos(&self) -> Vec2 {
        Vec2::new(get_f32(self.pos_x), get_f32(self.pos_y))
    }

    fn vel(&self) -> Vec2 {
        Vec2::new(get_f32(self.vel_x), get_f32(self.vel_y))
    }

    fn into_body(self) -> Body {
        Body::from_wire(
            u16::from_le(self.id),
            self.pos(),
            self.vel(),
            get_f32(self.mass),
            get_f32(self.radius),
            self.texture,
        )
    }

    fn into_spawn(self) -> SpawnRequest {
        SpawnRequest {
            pos: self.pos(),
            vel: self.vel(),
            radius: get_f32(self.radius),
            color: WHITE,
            texture: self.texture,
        }
    }
}

/// Exact encoded size of a frame with `bodies` records.
pub fn frame_len(bodies: usize) -> usize {
    FRAME_HEADER_LEN + bodies * BODY_RECORD_LEN
}

pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame_len(frame.bodies.len()));
    out.extend_from_slice(&frame.player_count.to_le_bytes());
    for body in &frame.bodies {
        out.extend_from_slice(bytemuck::bytes_of(&BodyRecord::from_body(body)));
    }
    out
}

pub fn decode_frame(bytes: &[u8]) -> Result<Frame, CodecError> {
    if bytes.len() < FRAME_HEADER_LEN || (bytes.len() - FRAME_HEADER_LEN) % BODY_RECORD_LEN != 0 {
        return Err(CodecError::MalformedFrame { len: bytes.len() });
    }
    let (header, records) = bytes.split_at(FRAME_HEADER_LEN);
    let player_count = u16::from_le_bytes([header[0], header[1]]);
    let bodies = records
        .chunks_exact(BODY_RECORD_LEN)
        .map(|chunk| BodyRecord::read(chunk).into_body())
        .collect();
    Ok(Frame::new(player_count, bodies))
}

pub fn encode_spawn(spawn: &SpawnRequest) -> Vec<u8> {
    bytemuck::bytes_of(&BodyRecord::from_spawn(spawn)).to_vec()
}

pub fn decode_spawn(bytes: &[u8]) -> Result<SpawnRequest, CodecError> {
    if bytes.len() != BODY_RECORD_LEN {
        return Err(CodecError::MalformedCommand { len: bytes.len() });
    }
    Ok(BodyRecord::read(bytes).into_spawn())
}
