//! Uniform grid spatial index (§4.2).
//!
//! Buckets entity ids by `(floor(x/TILE), floor(y/TILE))`. Rebuilt once per
//! tick before entity updates, and again after production so newly spawned
//! entities are visible to the rest of the tick (§4.2). Queries return an
//! unordered candidate set; callers re-check precise distance themselves.

use std::collections::HashMap;

use crate::entities::{EntityId, EntityStorage};
use crate::math::{Fixed, Vec2Fixed};

/// Tile edge length in world units.
pub const TILE: i32 = 100;

/// A grid cell coordinate.
type Cell = (i32, i32);

/// Uniform-grid spatial index over entity positions.
#[derive(Debug, Clone, Default)]
pub struct SpatialGrid {
    buckets: HashMap<Cell, Vec<EntityId>>,
}

impl SpatialGrid {
    /// Create an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn cell_of(position: Vec2Fixed) -> Cell {
        let tile = Fixed::from_num(TILE);
        (
            (position.x / tile).floor().to_num::<i32>(),
            (position.y / tile).floor().to_num::<i32>(),
        )
    }

    /// Clear and refill from the current entity set. Allocated once, reused
    /// across ticks (Design Notes: "allocate once, reuse across ticks").
    pub fn rebuild(&mut self, entities: &EntityStorage) {
        self.buckets.clear();
        for (&id, entity) in entities.iter() {
            self.buckets
                .entry(Self::cell_of(entity.position.value))
                .or_default()
                .push(id);
        }
    }

    fn cells_in_radius(center: Vec2Fixed, radius: Fixed) -> impl Iterator<Item = Cell> {
        let (cx, cy) = Self::cell_of(center);
        let span = (radius.to_num::<i32>() / TILE) + 1;
        (-span..=span).flat_map(move |dx| (-span..=span).map(move |dy| (cx + dx, cy + dy)))
    }

    /// All entity ids whose bucket lies within `radius` of `center`. The
    /// caller must re-check exact distance (§4.2).
    #[must_use]
    pub fn query_radius(&self, center: Vec2Fixed, radius: Fixed) -> Vec<EntityId> {
        Self::cells_in_radius(center, radius)
            .filter_map(|cell| self.buckets.get(&cell))
            .flatten()
            .copied()
            .collect()
    }

    /// Candidates within `radius` of `center` matching `predicate`, re-checking
    /// exact distance against `entities` before the predicate is consulted.
    pub fn query_radius_filtered(
        &self,
        entities: &EntityStorage,
        center: Vec2Fixed,
        radius: Fixed,
        mut predicate: impl FnMut(EntityId) -> bool,
    ) -> Vec<EntityId> {
        self.query_radius(center, radius)
            .into_iter()
            .filter(|&id| {
                entities
                    .get(id)
                    .is_some_and(|e| e.position.value.distance(center) <= radius)
                    && predicate(id)
            })
            .collect()
    }

    /// Enemy entities (different `player`, both owned) within `radius` of `center`.
    #[must_use]
    pub fn query_enemies_in_radius(
        &self,
        entities: &EntityStorage,
        center: Vec2Fixed,
        radius: Fixed,
        owner: u8,
    ) -> Vec<EntityId> {
        self.query_radius_filtered(entities, center, radius, |id| {
            entities
                .get(id)
                .and_then(|e| e.owner)
                .is_some_and(|o| o.player != owner)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Entity, EntityKind};

    #[test]
    fn query_radius_finds_nearby_entity() {
        let mut storage = EntityStorage::new();
        let near = storage.insert(Entity::new(
            Vec2Fixed::new(Fixed::from_num(10), Fixed::from_num(10)),
            EntityKind::Rock,
        ));
        let far = storage.insert(Entity::new(
            Vec2Fixed::new(Fixed::from_num(5000), Fixed::from_num(5000)),
            EntityKind::Rock,
        ));

        let mut grid = SpatialGrid::new();
        grid.rebuild(&storage);

        let hits = grid.query_radius(Vec2Fixed::ZERO, Fixed::from_num(200));
        assert!(hits.contains(&near));
        assert!(!hits.contains(&far));
    }

    #[test]
    fn query_enemies_excludes_same_owner() {
        use crate::components::{Movement, Owned, UnitType};
        use crate::factions::FactionId;

        let mut storage = EntityStorage::new();
        let mine = storage.insert(
            Entity::new(
                Vec2Fixed::ZERO,
                EntityKind::Unit {
                    unit_type: UnitType::Infantry,
                    combat: None,
                    attack_target: Default::default(),
                    movement: Movement::default(),
                    patrol: None,
                    path: None,
                    harvester: None,
                    engineer: None,
                    demo_charge: None,
                    air_slot: None,
                    is_mcv: false,
                },
            )
            .with_owner(Owned {
                faction: FactionId::Continuity,
                player: 0,
            }),
        );
        let theirs = storage.insert(
            Entity::new(
                Vec2Fixed::new(Fixed::from_num(10), Fixed::ZERO),
                EntityKind::Unit {
                    unit_type: UnitType::Infantry,
                    combat: None,
                    attack_target: Default::default(),
                    movement: Movement::default(),
                    patrol: None,
                    path: None,
                    harvester: None,
                    engineer: None,
                    demo_charge: None,
                    air_slot: None,
                    is_mcv: false,
                },
            )
            .with_owner(Owned {
                faction: FactionId::Continuity,
                player: 1,
            }),
        );

        let mut grid = SpatialGrid::new();
        grid.rebuild(&storage);
        let enemies = grid.query_enemies_in_radius(&storage, Vec2Fixed::ZERO, Fixed::from_num(200), 0);
        assert!(enemies.contains(&theirs));
        assert!(!enemies.contains(&mine));
    }
}
