//! # RTS Core
//!
//! Deterministic game simulation core for Post-Scarcity RTS.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Lockstep multiplayer (identical simulation across clients)
//! - Headless server builds
//! - Replay systems
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`entities`] - Tagged-union entity model and storage
//! - [`components`] - Shared value types composed into entities
//! - [`rules`] - Read-only per-kind rule catalog
//! - [`combat`] - Resistance-based damage resolution
//! - [`production`] - Per-player, per-category production queues
//! - [`factions`] - Faction definitions and mechanics
//! - [`simulation`] - Core simulation loop
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ai;
pub mod buildings;
pub mod collision;
pub mod combat;
pub mod components;
pub mod damage;
pub mod data;
pub mod engineer;
pub mod entities;
pub mod error;
pub mod factions;
pub mod map_generation;
pub mod math;
pub mod pathfinding;
pub mod players;
pub mod production;
pub mod projectiles;
pub mod reducers;
pub mod replay;
pub mod rules;
pub mod simulation;
pub mod spatial;
pub mod steering;
pub mod unit_kind;
pub mod victory;
pub mod wells;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::{Action, ActionError, AIPlayerState, AIWorld, Personality, Strategy};
    pub use crate::buildings::{
        AirBase, BuildingFootprint, PlacementGrid, PlacementResult, TurretCandidate,
    };
    pub use crate::combat::{
        calculate_resistance_damage, splash_damage, ArmorClass, DamageType, ResistanceStats,
        WeaponSize, WeaponStats, WeaponType, MAX_RESISTANCE, MIN_DAMAGE,
    };
    pub use crate::components::*;
    pub use crate::data::{
        BuildingData, FactionData, TechData, TechEffect, TechEffectType, UnitData,
    };
    pub use crate::entities::{Entity, EntityId, EntityKind, EntityStorage};
    pub use crate::error::{GameError, Result};
    pub use crate::factions::FactionId;
    pub use crate::map_generation::{
        generate_map, GeneratedMap, MapConfig, ResourcePlacement, SpawnPoint, SymmetryMode,
        TerrainCell,
    };
    pub use crate::math::Fixed;
    pub use crate::pathfinding::NavGrid;
    pub use crate::players::{Difficulty, PlayerState};
    pub use crate::production::{
        cancel_production, queue_production, CategoryQueue, PlayerProduction, ProductionItem,
        ProductionRefusal,
    };
    pub use crate::reducers::{apply_action, ReducerState};
    pub use crate::replay::{Replay, ReplayCommand, ReplayPlayer, REPLAY_VERSION};
    pub use crate::rules::{Category, RuleCatalog, RuleEntry, RuleKey};
    pub use crate::simulation::{EntitySpawnParams, Simulation};
    pub use crate::spatial::SpatialGrid;
    pub use crate::unit_kind::{UnitKindId, UnitKindInfo, UnitKindRegistry, UnitRole};
    pub use crate::victory::VictoryState;
}
