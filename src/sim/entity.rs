//! Spawned entities and the live entity collection
//!
//! The store hands out monotonic ids and keeps entities in insertion order,
//! which is also the order effects are applied in.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Hitbox;

/// Entity identifier, unique among live entities and never reused
pub type EntityId = u32;

/// What happens when an entity reaches the play bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Boundary {
    /// Bounce off the walls (free-floating entities)
    Reflect,
    /// Removed once fully outside (falling/scrolling entities)
    DeleteOnExit,
    /// Held inside the bounds
    Clamp,
}

/// A spawned, positioned object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity<K> {
    pub id: EntityId,
    pub kind: K,
    pub pos: Vec2,
    /// Units per second
    pub vel: Vec2,
    pub hitbox: Hitbox,
    /// Tick the entity was spawned on
    pub born_tick: u64,
    /// Ticks left before expiry (`None` lives until consumed or out of bounds)
    pub ttl_ticks: Option<u32>,
}

impl<K> Entity<K> {
    /// Move along the velocity
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Count the ttl down; returns true once it has run out
    pub fn age(&mut self) -> bool {
        match self.ttl_ticks.as_mut() {
            Some(ttl) => {
                *ttl = ttl.saturating_sub(1);
                *ttl == 0
            }
            None => false,
        }
    }
}

/// Parameters for a new entity
#[derive(Debug, Clone)]
pub struct EntitySpec<K> {
    pub kind: K,
    pub pos: Vec2,
    pub vel: Vec2,
    pub hitbox: Hitbox,
    pub ttl_ticks: Option<u32>,
}

impl<K> EntitySpec<K> {
    /// Stationary point entity at `pos`
    pub fn at(kind: K, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            vel: Vec2::ZERO,
            hitbox: Hitbox::POINT,
            ttl_ticks: None,
        }
    }

    pub fn with_vel(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_hitbox(mut self, hitbox: Hitbox) -> Self {
        self.hitbox = hitbox;
        self
    }

    pub fn with_ttl(mut self, ticks: u32) -> Self {
        self.ttl_ticks = Some(ticks.max(1));
        self
    }
}

/// Live entities of one game instance (insertion ordered)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore<K> {
    entities: Vec<Entity<K>>,
    next_id: EntityId,
}

impl<K> Default for EntityStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EntityStore<K> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Add an entity, returning its fresh id
    pub fn spawn(&mut self, spec: EntitySpec<K>, now: u64) -> EntityId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.entities.push(Entity {
            id,
            kind: spec.kind,
            pos: spec.pos,
            vel: spec.vel,
            hitbox: spec.hitbox,
            born_tick: now,
            ttl_ticks: spec.ttl_ticks,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity<K>> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity<K>> {
        self.entities.iter_mut()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity<K>> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Remove an entity by id
    pub fn remove(&mut self, id: EntityId) -> Option<Entity<K>> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    /// Keep entities for which `keep` returns true, visiting in insertion order
    pub fn retain_mut<F>(&mut self, keep: F)
    where
        F: FnMut(&mut Entity<K>) -> bool,
    {
        self.entities.retain_mut(keep);
    }

    /// Topmost entity (latest spawned) under a point
    pub fn pick(&self, point: Vec2) -> Option<EntityId> {
        self.entities
            .iter()
            .rev()
            .find(|e| e.hitbox.contains(e.pos, point))
            .map(|e| e.id)
    }

    /// Drop every live entity; ids keep counting up
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Count live entities matching a predicate
    pub fn count_where<F>(&self, pred: F) -> usize
    where
        F: Fn(&K) -> bool,
    {
        self.entities.iter().filter(|e| pred(&e.kind)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_monotonic_across_clear() {
        let mut store: EntityStore<u8> = EntityStore::new();
        let a = store.spawn(EntitySpec::at(0, Vec2::ZERO), 0);
        let b = store.spawn(EntitySpec::at(0, Vec2::ZERO), 0);
        store.clear();
        let c = store.spawn(EntitySpec::at(0, Vec2::ZERO), 5);
        assert!(a < b && b < c);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(c).map(|e| e.born_tick), Some(5));
    }

    #[test]
    fn test_ttl_expires() {
        let mut store: EntityStore<u8> = EntityStore::new();
        store.spawn(EntitySpec::at(0, Vec2::ZERO).with_ttl(2), 0);
        let e = store.iter_mut().next().unwrap();
        assert!(!e.age());
        assert!(e.age());
    }

    #[test]
    fn test_pick_prefers_latest() {
        let mut store: EntityStore<u8> = EntityStore::new();
        let hit = Hitbox::aabb(10.0, 10.0);
        store.spawn(EntitySpec::at(1, Vec2::new(50.0, 50.0)).with_hitbox(hit), 0);
        let top = store.spawn(EntitySpec::at(2, Vec2::new(52.0, 50.0)).with_hitbox(hit), 1);
        assert_eq!(store.pick(Vec2::new(51.0, 50.0)), Some(top));
        assert_eq!(store.pick(Vec2::new(90.0, 90.0)), None);
    }

    proptest! {
        #[test]
        fn prop_live_ids_unique(ops in prop::collection::vec(any::<bool>(), 1..200)) {
            let mut store: EntityStore<u8> = EntityStore::new();
            let mut tick = 0u64;
            for spawn in ops {
                tick += 1;
                let first = store.iter().next().map(|e| e.id);
                if spawn {
                    store.spawn(EntitySpec::at(0, Vec2::ZERO), tick);
                } else if let Some(first) = first {
                    store.remove(first);
                }
                let ids: HashSet<_> = store.iter().map(|e| e.id).collect();
                prop_assert_eq!(ids.len(), store.len());
            }
        }
    }
}
