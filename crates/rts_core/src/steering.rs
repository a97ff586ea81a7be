//! Per-entity movement steering (§4.4).
//!
//! Flying units steer directly toward their target each tick. Ground units
//! follow a waypoint path computed over [`crate::pathfinding::NavGrid`],
//! blended with whisker avoidance and separation from nearby entities, and
//! fall back to an unstuck random-walk mode when progress stalls.

use crate::components::{Movement, UnitPath};
use crate::math::{fold_seed, Fixed, Vec2Fixed};
use crate::pathfinding::{find_path, smooth_path, NavGrid};

/// Squared distance under which a waypoint/target is considered reached.
const ARRIVAL_THRESHOLD_SQ: Fixed = Fixed::from_bits(4 << 32);

/// Ticks of near-zero displacement before a unit is declared stuck.
const STUCK_THRESHOLD_TICKS: u32 = 30;

/// Ticks spent in random-walk unstuck mode before retrying the real path.
const UNSTUCK_DURATION_TICKS: u32 = 20;

/// Whisker avoidance probe angle offset, in the same units as [`Vec2Fixed`] rotation.
const WHISKER_BLEND: Fixed = Fixed::from_bits(3 << 29); // 0.375

/// Steer a flying unit directly toward `target`, ignoring terrain.
fn steer_flying(position: Vec2Fixed, target: Vec2Fixed, speed: Fixed) -> Vec2Fixed {
    let diff = target - position;
    if diff.length_squared() <= ARRIVAL_THRESHOLD_SQ {
        Vec2Fixed::ZERO
    } else {
        diff.normalize_to(speed)
    }
}

/// Recompute a ground unit's path toward `target` over `grid`.
fn repath(grid: &NavGrid, position: Vec2Fixed, target: Vec2Fixed, tick: u64) -> UnitPath {
    let waypoints = find_path(grid, position, target)
        .map(|path| smooth_path(grid, path))
        .unwrap_or_default();
    UnitPath {
        waypoints,
        index: 0,
        last_repath_tick: tick,
    }
}

/// How often a stalled ground unit will attempt to recompute its path.
const REPATH_INTERVAL_TICKS: u64 = 40;

/// Nearby obstacle used for whisker avoidance and separation.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    /// Neighbor position.
    pub position: Vec2Fixed,
    /// Neighbor collision radius.
    pub radius: Fixed,
}

/// Compute the desired velocity for one ground or airborne unit this tick.
///
/// `path` and `movement` are updated in place (waypoint consumption, stuck
/// detection, unstuck mode). Returns the velocity to apply this tick.
#[allow(clippy::too_many_arguments)]
pub fn move_toward(
    position: Vec2Fixed,
    is_airborne: bool,
    movement: &mut Movement,
    path: &mut Option<UnitPath>,
    target: Vec2Fixed,
    grid: &NavGrid,
    neighbors: &[Neighbor],
    entity_id: u64,
    tick: u64,
) -> Vec2Fixed {
    let desired = if is_airborne {
        steer_flying(position, target, movement.speed)
    } else {
        let needs_path = match path.as_ref() {
            None => true,
            Some(p) => p.is_empty() && position.distance_squared(target) > ARRIVAL_THRESHOLD_SQ,
        };
        if needs_path {
            *path = Some(repath(grid, position, target, tick));
        }

        let unit_path = path.as_mut().expect("path populated above");
        if let Some(waypoint) = unit_path.current_waypoint() {
            if position.distance_squared(waypoint) <= ARRIVAL_THRESHOLD_SQ {
                unit_path.advance();
            }
        }

        match unit_path.current_waypoint() {
            Some(waypoint) => steer_flying(position, waypoint, movement.speed),
            None => {
                if position.distance_squared(target) <= ARRIVAL_THRESHOLD_SQ {
                    Vec2Fixed::ZERO
                } else {
                    steer_flying(position, target, movement.speed)
                }
            }
        }
    };

    let blended = apply_avoidance(position, desired, movement.speed, neighbors, entity_id, tick);

    update_stuck_state(movement, blended, target, position);

    if movement.unstuck_mode {
        unstuck_velocity(movement, position, entity_id, tick)
    } else {
        blended
    }
}

/// Blend whisker avoidance (steer away from the nearest blocking neighbor)
/// and separation (steer away from all nearby neighbors) into `desired`.
fn apply_avoidance(
    position: Vec2Fixed,
    desired: Vec2Fixed,
    speed: Fixed,
    neighbors: &[Neighbor],
    _entity_id: u64,
    _tick: u64,
) -> Vec2Fixed {
    if desired == Vec2Fixed::ZERO || neighbors.is_empty() {
        return desired;
    }

    let mut separation = Vec2Fixed::ZERO;
    let mut closest: Option<(Vec2Fixed, Fixed)> = None;

    for neighbor in neighbors {
        let offset = position - neighbor.position;
        let dist_sq = offset.length_squared();
        let threshold = (neighbor.radius + Fixed::from_num(20)) * (neighbor.radius + Fixed::from_num(20));
        if dist_sq > threshold || dist_sq == Fixed::ZERO {
            continue;
        }
        let dist = crate::math::fixed_sqrt(dist_sq);
        separation = separation + offset.normalize_to(Fixed::ONE) * (Fixed::ONE / dist.max(Fixed::from_num(1)));

        match closest {
            Some((_, best_dist)) if best_dist <= dist_sq => {}
            _ => closest = Some((offset, dist_sq)),
        }
    }

    let mut blended = desired;
    if separation != Vec2Fixed::ZERO {
        blended = (blended * Fixed::from_num(7) + separation.normalize_to(speed) * Fixed::from_num(3))
            * (Fixed::ONE / Fixed::from_num(10));
    }

    if let Some((offset, dist_sq)) = closest {
        let close_threshold = Fixed::from_num(12) * Fixed::from_num(12);
        if dist_sq < close_threshold {
            let whisker = offset.perpendicular().normalize_to(speed);
            blended = blended * (Fixed::ONE - WHISKER_BLEND) + whisker * WHISKER_BLEND;
        }
    }

    if blended.length_squared() > Fixed::ZERO {
        blended.normalize_to(speed)
    } else {
        blended
    }
}

/// Track stuck/unstuck transitions via an EMA of recent velocity.
fn update_stuck_state(movement: &mut Movement, velocity: Vec2Fixed, target: Vec2Fixed, position: Vec2Fixed) {
    let has_target = position.distance_squared(target) > ARRIVAL_THRESHOLD_SQ;

    movement.avg_velocity = (movement.avg_velocity * Fixed::from_num(7) + velocity * Fixed::from_num(3))
        * (Fixed::ONE / Fixed::from_num(10));

    if !has_target {
        movement.stuck_ticks = 0;
        movement.unstuck_mode = false;
        return;
    }

    let moving_threshold = movement.speed * Fixed::from_num(1) / Fixed::from_num(4);
    if movement.avg_velocity.length_squared() < moving_threshold * moving_threshold {
        movement.stuck_ticks += 1;
    } else {
        movement.stuck_ticks = 0;
    }

    if movement.unstuck_mode {
        if movement.stuck_ticks == 0 {
            movement.unstuck_mode = false;
        }
    } else if movement.stuck_ticks >= STUCK_THRESHOLD_TICKS {
        movement.unstuck_mode = true;
        movement.stuck_ticks = 0;
    }
}

/// A deterministic random-walk velocity, used while `unstuck_mode` is active.
fn unstuck_velocity(movement: &mut Movement, _position: Vec2Fixed, entity_id: u64, tick: u64) -> Vec2Fixed {
    movement.stuck_ticks += 1;
    if movement.stuck_ticks >= UNSTUCK_DURATION_TICKS {
        movement.unstuck_mode = false;
        movement.stuck_ticks = 0;
        return Vec2Fixed::ZERO;
    }

    let seed = fold_seed(tick, entity_id, 0xA17E);
    let x = crate::math::seeded_range(seed, Fixed::from_num(-1), Fixed::from_num(1));
    let y = crate::math::seeded_range(seed.rotate_left(17), Fixed::from_num(-1), Fixed::from_num(1));
    Vec2Fixed::new(x, y).normalize_to(movement.speed)
}

/// Ensure a ground unit repaths if it hasn't moved toward its goal in
/// [`REPATH_INTERVAL_TICKS`] ticks (called from the tick loop before steering
/// when a unit's path has gone stale).
#[must_use]
pub fn path_is_stale(path: &UnitPath, tick: u64) -> bool {
    path.is_empty() && tick.saturating_sub(path.last_repath_tick) >= REPATH_INTERVAL_TICKS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flying_unit_steers_directly() {
        let position = Vec2Fixed::ZERO;
        let target = Vec2Fixed::new(Fixed::from_num(100), Fixed::ZERO);
        let velocity = steer_flying(position, target, Fixed::from_num(5));
        assert_eq!(velocity.y, Fixed::ZERO);
        assert!(velocity.x > Fixed::ZERO);
    }

    #[test]
    fn flying_unit_stops_on_arrival() {
        let position = Vec2Fixed::ZERO;
        let target = Vec2Fixed::new(Fixed::from_num(1), Fixed::ZERO);
        let velocity = steer_flying(position, target, Fixed::from_num(5));
        assert_eq!(velocity, Vec2Fixed::ZERO);
    }

    #[test]
    fn ground_unit_builds_path_toward_target() {
        let grid = NavGrid::new(50, 50, Fixed::from_num(10));
        let mut movement = Movement::default();
        let mut path = None;
        let velocity = move_toward(
            Vec2Fixed::ZERO,
            false,
            &mut movement,
            &mut path,
            Vec2Fixed::new(Fixed::from_num(200), Fixed::from_num(0)),
            &grid,
            &[],
            1,
            0,
        );
        assert!(path.is_some());
        assert!(velocity.length_squared() > Fixed::ZERO);
    }

    #[test]
    fn stuck_ticks_trigger_unstuck_mode() {
        let mut movement = Movement {
            speed: Fixed::from_num(4),
            ..Movement::default()
        };
        let position = Vec2Fixed::ZERO;
        let target = Vec2Fixed::new(Fixed::from_num(100), Fixed::ZERO);
        for _ in 0..STUCK_THRESHOLD_TICKS + 1 {
            update_stuck_state(&mut movement, Vec2Fixed::ZERO, target, position);
        }
        assert!(movement.unstuck_mode);
    }
}
