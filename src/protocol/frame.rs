use crate::bodies::Body;

/// Complete snapshot of the live bodies plus the connected player count.
/// Each frame replaces the previous one; frames are never diffed here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub player_count: u16,
    pub bodies: Vec<Body>,
}

impl Frame {
    pub fn new(player_count: u16, bodies: Vec<Body>) -> Self {
        Self { player_count, bodies }
    }

    pub fn empty(player_count: u16) -> Self {
        Self::new(player_count, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
