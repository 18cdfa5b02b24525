use std::collections::VecDeque;

use crate::bodies::BodyId;
use crate::error::StoreError;

/// Highest number of ids a pool can ever hold (the whole `u16` range).
const MAX_IDS: usize = BodyId::MAX as usize + 1;

/// Free-list of recyclable body ids.
///
/// Starts full with `0..size`. Ids are handed out lowest-first and released
/// ids go to the back of the queue, so a just-released id is not immediately
/// reused while others are free. Growth is off unless a step is given.
#[derive(Debug, Clone)]
pub struct IdPool {
    free: VecDeque<BodyId>,
    live: Vec<bool>,
    size: usize,
    initial_size: usize,
    growth_step: Option<usize>,
}

impl IdPool {
    pub fn new(size: usize) -> Self {
        let size = size.min(MAX_IDS);
        Self {
            free: (0..size).map(|i| i as BodyId).collect(),
            live: vec![false; size],
            size,
            initial_size: size,
            growth_step: None,
        }
    }

    /// A pool that adds `step` fresh ids whenever it runs dry.
    pub fn with_growth(size: usize, step: usize) -> Self {
        let mut pool = Self::new(size);
        pool.growth_step = Some(step).filter(|s| *s > 0);
        pool
    }

    pub fn allocate(&mut self) -> Result<BodyId, StoreError> {
        if self.free.is_empty() {
            self.grow();
        }
        let id = self.free.pop_front().ok_or(StoreError::PoolExhausted)?;
        self.live[id as usize] = true;
        Ok(id)
    }

    pub fn release(&mut self, id: BodyId) -> Result<(), StoreError> {
        if !self.is_live(id) {
            return Err(StoreError::InvalidId(id));
        }
        self.live[id as usize] = false;
        self.free.push_back(id);
        Ok(())
    }

    pub fn is_live(&self, id: BodyId) -> bool {
        self.live.get(id as usize).copied().unwrap_or(false)
    }

    /// True while at least one id can be handed out.
    pub fn has_free(&self) -> bool {
        !self.free.is_empty() || (self.growth_step.is_some() && self.size < MAX_IDS)
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Back to the initial full state, dropping any grown ids.
    pub fn reset(&mut self) {
        self.size = self.initial_size;
        self.free = (0..self.size).map(|i| i as BodyId).collect();
        self.live = vec![false; self.size];
    }

    fn grow(&mut self) {
        let Some(step) = self.growth_step else {
            return;
        };
        let new_size = (self.size + step).min(MAX_IDS);
        self.free.extend((self.size..new_size).map(|i| i as BodyId));
        self.live.resize(new_size, false);
        self.size = new_size;
    }
}
