use palette::Srgb;
use ultraviolet::Vec2;

/// Identity of a live body. Unique among live bodies, recycled after release.
pub type BodyId = u16;

pub const WHITE: Srgb<u8> = Srgb::new(255, 255, 255);

/// Smallest radius a spawn may have; smaller or NaN requests get this.
pub const MIN_SPAWN_RADIUS: f32 = 0.25;
pub const MAX_SPAWN_RADIUS: f32 = 4.0;

/// Mass is never stored independently of radius: `(1 + radius) ^ exponent`.
pub fn mass_for_radius(radius: f32, mass_exponent: f32) -> f32 {
    (1.0 + radius).powf(mass_exponent)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub pos: Vec2,
    pub vel: Vec2,
    mass: f32,
    radius: f32,
    pub color: Srgb<u8>,
    pub texture: u8,
}

impl Body {
    pub fn new(id: BodyId, spawn: &SpawnRequest, mass_exponent: f32) -> Self {
        Self {
            id,
            pos: spawn.pos,
            vel: spawn.vel,
            mass: mass_for_radius(spawn.radius, mass_exponent),
            radius: spawn.radius,
            color: spawn.color,
            texture: spawn.texture,
        }
    }

    /// Rebuilds a body exactly as it was observed on the wire. Mass is taken
    /// as given; the authoritative side owns the radius/mass relationship.
    pub(crate) fn from_wire(id: BodyId, pos: Vec2, vel: Vec2, mass: f32, radius: f32, texture: u8) -> Self {
        Self {
            id,
            pos,
            vel,
            mass,
            radius,
            color: WHITE,
            texture,
        }
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Adds `amount` to the radius and re-derives mass.
    pub fn grow(&mut self, amount: f32, mass_exponent: f32) {
        self.radius += amount;
        self.mass = mass_for_radius(self.radius, mass_exponent);
    }
}

/// What an input collaborator asks for. The id is always assigned by the
/// store (local) or the server (remote).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Srgb<u8>,
    pub texture: u8,
}

impl SpawnRequest {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            color: WHITE,
            texture: 0,
        }
    }

    pub fn with_color(mut self, color: Srgb<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn with_texture(mut self, texture: u8) -> Self {
        self.texture = texture;
        self
    }

    /// Clamps the radius into `[MIN_SPAWN_RADIUS, MAX_SPAWN_RADIUS]` and
    /// zeroes non-finite position or velocity components, so the derived
    /// mass is always finite and positive.
    pub fn sanitized(mut self) -> Self {
        self.radius = if self.radius.is_nan() {
            MIN_SPAWN_RADIUS
        } else {
            self.radius.clamp(MIN_SPAWN_RADIUS, MAX_SPAWN_RADIUS)
        };
        self.pos = finite_or_zero(self.pos);
        self.vel = finite_or_zero(self.vel);
        self
    }
}

fn finite_or_zero(v: Vec2) -> Vec2 {
    Vec2::new(
        if v.x.is_finite() { v.x } else { 0.0 },
        if v.y.is_finite() { v.y } else { 0.0 },
    )
}
