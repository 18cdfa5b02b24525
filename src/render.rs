//! Boundary helpers for a render collaborator.
//!
//! Frames are full snapshots, so a renderer keeps its own view of which
//! bodies it has display objects for and reconciles each frame against it.

use std::collections::HashMap;

use palette::Srgb;

use crate::bodies::{Body, BodyId, WHITE};
use crate::protocol::Frame;

/// What changed between the previously applied frame and this one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameDelta {
    pub created: Vec<Body>,
    pub updated: Vec<Body>,
    pub destroyed: Vec<BodyId>,
}

/// Tracks the bodies a renderer currently displays.
#[derive(Debug, Default)]
pub struct RenderTracker {
    shown: HashMap<BodyId, Body>,
    counts: HashMap<BodyId, i32>,
}

impl RenderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.shown.get(&id)
    }

    /// Reconciles against `frame` in O(n). Every id in the frame counts +1,
    /// every id already shown counts -1: 1 means new, 0 means still present,
    /// and a shown id missing from the frame is destroyed.
    pub fn apply(&mut self, frame: &Frame) -> FrameDelta {
        let mut delta = FrameDelta::default();

        self.counts.clear();
        for body in &frame.bodies {
            self.counts.insert(body.id, 1);
        }

        for id in self.shown.keys() {
            match self.counts.get_mut(id) {
                Some(count) => *count -= 1,
                None => delta.destroyed.push(*id),
            }
        }
        for id in &delta.destroyed {
            self.shown.remove(id);
        }
        delta.destroyed.sort_unstable();

        for body in &frame.bodies {
            match self.counts.get(&body.id) {
                Some(0) => delta.updated.push(*body),
                _ => delta.created.push(*body),
            }
            self.shown.insert(body.id, *body);
        }
        delta
    }
}

/// Parses `#rrggbb` (or `rrggbb`), falling back to white.
pub fn parse_color(hex: &str) -> Srgb<u8> {
    hex.trim().parse().unwrap_or(WHITE)
}
