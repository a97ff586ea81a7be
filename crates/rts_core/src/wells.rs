//! Ore well growth, harvesting, and induction-rig income (§4.8).
//!
//! Resolves the naming collision between [`crate::components::Harvester`]
//! (unit cargo/assignment state) and this module's resource-node lifecycle:
//! a "well" is the resource-producing entity, a "harvester" is the unit that
//! collects from it.

use crate::math::{fold_seed, seeded_index, seeded_range, Fixed, Vec2Fixed};

/// Ore regrowth applied per tick while `remaining < capacity`.
pub const REGROWTH_PER_TICK: u32 = 1;

/// Jittered ring of candidate spawn offsets around a well, tried in order
/// until one lands on unblocked ground (§4.8: "up to 8 jittered positions").
pub const SPAWN_CANDIDATE_COUNT: u32 = 8;

/// Radius of the jitter ring around a well's center.
pub const SPAWN_JITTER_RADIUS: Fixed = Fixed::from_bits(30 << 32);

/// Ore harvested per unit of harvester action (one "scoop").
pub const HARVEST_AMOUNT: u32 = 25;

/// Credits produced per tick by a deployed induction rig.
pub const INDUCTION_RIG_INCOME: u32 = 5;

/// Advance ore regrowth for one well by one tick.
pub fn tick_regrowth(remaining: &mut u32, capacity: u32) {
    if *remaining < capacity {
        *remaining = (*remaining + REGROWTH_PER_TICK).min(capacity);
    }
}

/// Take up to `HARVEST_AMOUNT` ore from a well, returning the amount actually
/// taken (may be less if the well is nearly depleted).
pub fn harvest(remaining: &mut u32) -> u32 {
    let taken = HARVEST_AMOUNT.min(*remaining);
    *remaining -= taken;
    taken
}

/// Deterministic jittered candidate position for a new ore patch spawn near
/// `well_center`, per Design Notes' `(tick, entity id, salt)` PRNG.
#[must_use]
pub fn spawn_candidate(well_center: Vec2Fixed, well_id: u64, tick: u64, attempt: u32) -> Vec2Fixed {
    let seed = fold_seed(tick, well_id, u64::from(attempt) ^ 0xF00D);
    let angle_bucket = seeded_index(seed, 360);
    let angle = Fixed::from_num(angle_bucket);
    // Deterministic fixed-point direction without trig: map the angle bucket
    // onto one of 8 compass offsets, jittered radially.
    let octant = angle_bucket / 45;
    let (dir_x, dir_y): (Fixed, Fixed) = match octant {
        0 => (Fixed::ONE, Fixed::ZERO),
        1 => (Fixed::ONE, Fixed::ONE),
        2 => (Fixed::ZERO, Fixed::ONE),
        3 => (-Fixed::ONE, Fixed::ONE),
        4 => (-Fixed::ONE, Fixed::ZERO),
        5 => (-Fixed::ONE, -Fixed::ONE),
        6 => (Fixed::ZERO, -Fixed::ONE),
        _ => (Fixed::ONE, -Fixed::ONE),
    };
    let radius = seeded_range(seed.rotate_left(13), Fixed::from_num(10), SPAWN_JITTER_RADIUS);
    well_center + Vec2Fixed::new(dir_x, dir_y).normalize_to(radius)
}

/// Whether a new ore patch should spawn near a well this tick: once the well
/// has regrown to capacity and a deterministic roll (1-in-`chance`) succeeds.
#[must_use]
pub fn should_spawn_patch(remaining: u32, capacity: u32, well_id: u64, tick: u64, chance: u64) -> bool {
    remaining >= capacity && seeded_index(fold_seed(tick, well_id, 0xABCD), chance) == 0
}

/// Credits produced this tick by a deployed induction rig.
#[must_use]
pub const fn induction_rig_tick(active: bool) -> u32 {
    if active {
        INDUCTION_RIG_INCOME
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regrowth_stops_at_capacity() {
        let mut remaining = 998;
        tick_regrowth(&mut remaining, 1000);
        tick_regrowth(&mut remaining, 1000);
        tick_regrowth(&mut remaining, 1000);
        assert_eq!(remaining, 1000);
    }

    #[test]
    fn harvest_caps_at_remaining() {
        let mut remaining = 10;
        let taken = harvest(&mut remaining);
        assert_eq!(taken, 10);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn spawn_candidates_are_deterministic() {
        let a = spawn_candidate(Vec2Fixed::ZERO, 1, 100, 0);
        let b = spawn_candidate(Vec2Fixed::ZERO, 1, 100, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn spawn_candidates_vary_by_attempt() {
        let a = spawn_candidate(Vec2Fixed::ZERO, 1, 100, 0);
        let b = spawn_candidate(Vec2Fixed::ZERO, 1, 100, 1);
        assert_ne!(a, b);
    }
}
