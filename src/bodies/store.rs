//! The live body table.
//!
//! `BodyStore` exclusively owns every live [`Body`] and the [`IdPool`] that
//! names them. Physics borrows the table mutably for a step and hands back
//! a removal mask; nothing else removes bodies.

use log::debug;
use ultraviolet::Vec2;

use crate::bodies::{Body, BodyId, IdPool, SpawnRequest};
use crate::error::StoreError;

/// Pool size used when nothing else is configured.
pub const DEFAULT_POOL_SIZE: usize = 256;

#[derive(Debug, Clone)]
pub struct BodyStore {
    bodies: Vec<Body>,
    ids: IdPool,
}

impl Default for BodyStore {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl BodyStore {
    pub fn new(pool_size: usize) -> Self {
        Self::with_pool(IdPool::new(pool_size))
    }

    pub fn with_pool(ids: IdPool) -> Self {
        Self {
            bodies: Vec::with_capacity(ids.capacity()),
            ids,
        }
    }

    pub fn allocate(&mut self) -> Result<BodyId, StoreError> {
        self.ids.allocate()
    }

    pub fn release(&mut self, id: BodyId) -> Result<(), StoreError> {
        self.ids.release(id)
    }

    /// Inserts a body whose id was obtained from [`allocate`](Self::allocate).
    pub fn insert(&mut self, body: Body) -> Result<(), StoreError> {
        if !self.ids.is_live(body.id) {
            return Err(StoreError::InvalidId(body.id));
        }
        if self.bodies.iter().any(|b| b.id == body.id) {
            return Err(StoreError::DuplicateId(body.id));
        }
        self.bodies.push(body);
        Ok(())
    }

    /// Allocates an id and inserts the requested body in one go. The request
    /// is [`sanitized`](SpawnRequest::sanitized) first.
    pub fn spawn(&mut self, request: &SpawnRequest, mass_exponent: f32) -> Result<BodyId, StoreError> {
        let request = request.sanitized();
        let id = self.allocate()?;
        self.bodies.push(Body::new(id, &request, mass_exponent));
        debug!("spawned body {} (r={})", id, request.radius);
        Ok(id)
    }

    /// Removes a body and returns its id to the pool.
    pub fn remove(&mut self, id: BodyId) -> Result<Body, StoreError> {
        let index = self
            .bodies
            .iter()
            .position(|b| b.id == id)
            .ok_or(StoreError::InvalidId(id))?;
        let body = self.bodies.remove(index);
        self.ids.release(id)?;
        Ok(body)
    }

    /// Drops every body whose `marked[index]` is set, in one pass, releasing
    /// their ids. Returns the removed ids in table order.
    pub fn remove_marked(&mut self, marked: &[bool]) -> Vec<BodyId> {
        let mut removed = Vec::new();
        let mut index = 0;
        self.bodies.retain(|body| {
            let drop = marked.get(index).copied().unwrap_or(false);
            index += 1;
            if drop {
                removed.push(body.id);
            }
            !drop
        });
        for id in &removed {
            // Ids in the table are always live
            let _ = self.ids.release(*id);
        }
        removed
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Physics needs the whole table; ids must stay untouched.
    pub(crate) fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn set_velocity(&mut self, id: BodyId, vel: Vec2) -> Result<(), StoreError> {
        let body = self
            .bodies
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::InvalidId(id))?;
        body.vel = vel;
        Ok(())
    }

    /// Full copy in table (insertion) order.
    pub fn snapshot(&self) -> Vec<Body> {
        self.bodies.clone()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.ids.capacity()
    }

    /// A spawn request can be accepted right now.
    pub fn is_ready(&self) -> bool {
        self.ids.has_free()
    }

    /// Clears all bodies and refills the id pool.
    pub fn reset(&mut self) {
        self.bodies.clear();
        self.ids.reset();
    }
}
