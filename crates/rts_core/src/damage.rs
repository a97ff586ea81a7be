//! Damage application and explosion chain reactions (§4.10).

use std::collections::VecDeque;

use crate::combat::{splash_damage, WeaponStats};
use crate::components::EntityId;
use crate::math::{Fixed, Vec2Fixed};

/// A single damage application to resolve against one entity.
#[derive(Debug, Clone, Copy)]
pub struct DamageEvent {
    /// Entity that caused the damage (attacker or detonating demo charge).
    pub attacker: EntityId,
    /// Entity receiving damage.
    pub target: EntityId,
    /// Damage amount, already resolved through resistance (§4.10 applies this
    /// directly to health; splash falloff is computed by [`splash_damage_events`]
    /// before this event is created).
    pub amount: u32,
}

/// Build direct-hit and splash damage events for one detonation.
///
/// `origin` is where the explosion/impact occurred; `weapon` carries splash
/// radius and damage-type data. `candidates` are (id, position, resistance)
/// triples for entities within splash range, provided by the caller's
/// spatial query.
pub fn splash_damage_events(
    attacker: EntityId,
    origin: Vec2Fixed,
    weapon: &WeaponStats,
    candidates: &[(EntityId, Vec2Fixed, crate::combat::ResistanceStats)],
) -> Vec<DamageEvent> {
    if !weapon.has_splash() {
        return Vec::new();
    }

    candidates
        .iter()
        .filter_map(|&(id, position, resistance)| {
            let distance = origin.distance(position);
            if distance > weapon.splash_radius {
                return None;
            }
            let amount = splash_damage(weapon, &resistance, distance);
            (amount > 0).then_some(DamageEvent {
                attacker,
                target: id,
                amount,
            })
        })
        .collect()
}

/// An entity eligible to be swept into a demo-truck chain reaction: it still
/// carries its own un-detonated demo charge and sits within a prior
/// explosion's blast radius.
#[derive(Debug, Clone, Copy)]
pub struct ChainCandidate {
    /// Entity id of the demo-carrying unit.
    pub id: EntityId,
    /// Its position.
    pub position: Vec2Fixed,
    /// Its own blast radius, used to test whether it reaches further chain members.
    pub radius: Fixed,
}

/// Breadth-first chain-reaction expansion: starting from `origin` entities that
/// have just detonated, finds every other un-detonated demo charge within
/// blast range (directly or transitively) and returns them in detonation
/// order, each detonating at most once (§4.10).
pub fn run_explosions(
    origins: &[(EntityId, Vec2Fixed, Fixed)],
    candidates: &[ChainCandidate],
) -> Vec<EntityId> {
    let mut detonated: Vec<EntityId> = origins.iter().map(|(id, ..)| *id).collect();
    let mut queue: VecDeque<(Vec2Fixed, Fixed)> =
        origins.iter().map(|(_, pos, radius)| (*pos, *radius)).collect();

    while let Some((blast_center, blast_radius)) = queue.pop_front() {
        for candidate in candidates {
            if detonated.contains(&candidate.id) {
                continue;
            }
            if blast_center.distance(candidate.position) <= blast_radius {
                detonated.push(candidate.id);
                queue.push_back((candidate.position, candidate.radius));
            }
        }
    }

    detonated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{ArmorClass, DamageType, ResistanceStats, WeaponSize, WeaponType};

    #[test]
    fn splash_damage_falls_off_with_distance() {
        let weapon = WeaponStats::new(100, DamageType::Explosive, WeaponType::Explosion)
            .with_splash_radius(Fixed::from_num(10))
            .with_size(WeaponSize::Heavy);
        let resistance = ResistanceStats::new(ArmorClass::Light, 0);
        let candidates = vec![
            (1, Vec2Fixed::ZERO, resistance),
            (2, Vec2Fixed::new(Fixed::from_num(5), Fixed::ZERO), resistance),
        ];
        let events = splash_damage_events(99, Vec2Fixed::ZERO, &weapon, &candidates);
        let center_dmg = events.iter().find(|e| e.target == 1).unwrap().amount;
        let edge_dmg = events.iter().find(|e| e.target == 2).unwrap().amount;
        assert!(center_dmg >= edge_dmg);
    }

    #[test]
    fn chain_reaction_detonates_nearby_demo_trucks() {
        let origins = vec![(1, Vec2Fixed::ZERO, Fixed::from_num(20))];
        let candidates = vec![
            ChainCandidate {
                id: 2,
                position: Vec2Fixed::new(Fixed::from_num(15), Fixed::ZERO),
                radius: Fixed::from_num(20),
            },
            ChainCandidate {
                id: 3,
                position: Vec2Fixed::new(Fixed::from_num(30), Fixed::ZERO),
                radius: Fixed::from_num(20),
            },
            ChainCandidate {
                id: 4,
                position: Vec2Fixed::new(Fixed::from_num(5000), Fixed::ZERO),
                radius: Fixed::from_num(20),
            },
        ];
        let detonated = run_explosions(&origins, &candidates);
        assert!(detonated.contains(&1));
        assert!(detonated.contains(&2));
        assert!(detonated.contains(&3));
        assert!(!detonated.contains(&4));
    }

    #[test]
    fn each_entity_detonates_at_most_once() {
        let origins = vec![(1, Vec2Fixed::ZERO, Fixed::from_num(50))];
        let candidates = vec![ChainCandidate {
            id: 2,
            position: Vec2Fixed::new(Fixed::from_num(10), Fixed::ZERO),
            radius: Fixed::from_num(50),
        }];
        let detonated = run_explosions(&origins, &candidates);
        assert_eq!(detonated.iter().filter(|&&id| id == 2).count(), 1);
    }
}
