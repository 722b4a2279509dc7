//! Hash-consing table for patterns
//!
//! An open-addressing table keyed by each pattern's precomputed structural
//! hash. Slots hold handles into the shared [`PatternArena`]; a candidate is
//! only allocated in the arena when no structurally equal node is found.
//!
//! A child interner starts from a snapshot of its parent's table. The table is
//! shared until either side inserts, at which point that side takes a private
//! copy, so neither ever sees the other's later entries.

use crate::arena::PatternArena;
use crate::config::InternerConfig;
use crate::pattern::{Pattern, PatternId};
use crate::Result;
use std::rc::Rc;
use tracing::trace;

/// Canonicalizing table for one scope of pattern construction
#[derive(Debug, Clone)]
pub struct Interner {
    table: Rc<Vec<Option<PatternId>>>,
    used: usize,
    used_limit: usize,
    load_factor: f64,
}

impl Interner {
    /// Create an interner with the default configuration
    pub fn new() -> Self {
        let config = InternerConfig::default();
        Self::sized(config.initial_capacity, config.load_factor)
    }

    /// Create an interner with explicit sizing
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if the configuration is rejected
    /// by [`InternerConfig::validate`].
    pub fn with_config(config: &InternerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::sized(config.initial_capacity, config.load_factor))
    }

    fn sized(capacity: usize, load_factor: f64) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        Self {
            table: Rc::new(vec![None; capacity]),
            used: 0,
            used_limit: Self::limit_for(capacity, load_factor),
            load_factor,
        }
    }

    /// A child interner that sees every entry of `self` as of now.
    #[must_use]
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// Number of canonical patterns known to this interner
    pub fn len(&self) -> usize {
        self.used
    }

    /// Whether nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Current number of slots
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    /// Return the canonical handle for `pattern`, storing it in `arena` if no
    /// structurally equal node is known yet.
    pub fn intern(&mut self, arena: &mut PatternArena, pattern: Pattern) -> PatternId {
        if let Some(existing) = self.lookup(arena, &pattern) {
            return existing;
        }
        if self.used >= self.used_limit {
            self.rehash(arena);
        }
        let slot = self.free_slot(pattern.hash_code());
        let id = arena.alloc(pattern);
        Rc::make_mut(&mut self.table)[slot] = Some(id);
        self.used += 1;
        id
    }

    /// The canonical handle for `pattern`, if one exists.
    pub fn lookup(&self, arena: &PatternArena, pattern: &Pattern) -> Option<PatternId> {
        let mut h = self.first_index(pattern.hash_code());
        while let Some(existing) = self.table[h] {
            if arena[existing].same_pattern(pattern) {
                return Some(existing);
            }
            h = self.next_index(h);
        }
        None
    }

    fn free_slot(&self, hash: u32) -> usize {
        let mut h = self.first_index(hash);
        while self.table[h].is_some() {
            h = self.next_index(h);
        }
        h
    }

    fn rehash(&mut self, arena: &PatternArena) {
        let capacity = self.table.len() * 2;
        trace!(
            "Growing pattern interner from {} to {} slots ({} entries)",
            self.table.len(),
            capacity,
            self.used
        );
        let old = std::mem::replace(&mut self.table, Rc::new(vec![None; capacity]));
        self.used_limit = Self::limit_for(capacity, self.load_factor);
        let table = Rc::make_mut(&mut self.table);
        for id in old.iter().flatten() {
            let mut h = (arena[*id].hash_code() as usize) & (capacity - 1);
            while table[h].is_some() {
                h = if h == 0 { capacity - 1 } else { h - 1 };
            }
            table[h] = Some(*id);
        }
    }

    fn first_index(&self, hash: u32) -> usize {
        (hash as usize) & (self.table.len() - 1)
    }

    fn next_index(&self, h: usize) -> usize {
        if h == 0 { self.table.len() - 1 } else { h - 1 }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn limit_for(capacity: usize, load_factor: f64) -> usize {
        // Keep at least one slot free so probing always terminates.
        ((capacity as f64 * load_factor) as usize).clamp(1, capacity - 1)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
