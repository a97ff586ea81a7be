//! Projectile flight (§4.9).
//!
//! A [`WeaponType::Missile`] projectile re-aims toward its live target entity
//! every tick (true homing); every other weapon type keeps flying toward the
//! `target_position` it was launched with, even if that entity has since
//! moved or died (Scenario 1/2).

use crate::components::{EntityId, Projectile};
use crate::math::Vec2Fixed;

/// Distance under which a projectile is considered to have reached its target.
const IMPACT_THRESHOLD: crate::math::Fixed = crate::math::Fixed::from_bits(3 << 32);

/// Result of advancing one projectile by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOutcome {
    /// Still flying; position updated.
    Flying(Vec2Fixed),
    /// Reached its target (or target position); should deal damage and despawn.
    Impact(Vec2Fixed),
    /// Flew outside the playable bounds without hitting anything; despawn silently.
    Expired,
}

/// Advance one projectile by one tick.
///
/// `live_target_position` is `Some` only if the projectile's `target` entity
/// still exists this tick; used for homing re-aim.
pub fn tick_projectile(
    projectile: &mut Projectile,
    position: Vec2Fixed,
    live_target_position: Option<Vec2Fixed>,
    world_bounds: Vec2Fixed,
) -> ProjectileOutcome {
    if projectile.is_homing() {
        if let Some(live) = live_target_position {
            projectile.target_position = live;
        }
    }

    let aim_point = projectile.target_position;
    let to_target = aim_point - position;

    if to_target.length_squared() <= IMPACT_THRESHOLD * IMPACT_THRESHOLD {
        return ProjectileOutcome::Impact(aim_point);
    }

    let step = to_target.normalize_to(projectile.speed);
    let new_position = position + step;

    if new_position.x < -world_bounds.x
        || new_position.y < -world_bounds.y
        || new_position.x > world_bounds.x
        || new_position.y > world_bounds.y
    {
        return ProjectileOutcome::Expired;
    }

    ProjectileOutcome::Flying(new_position)
}

/// The entity a freshly fired projectile should home in on, if any.
#[must_use]
pub fn homing_target(projectile: &Projectile) -> Option<EntityId> {
    projectile.is_homing().then_some(projectile.target).flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{DamageType, WeaponType};

    fn bullet(target_position: Vec2Fixed) -> Projectile {
        Projectile::new(1, None, target_position, 10, DamageType::Kinetic, WeaponType::Bullet, crate::math::Fixed::ZERO, 0)
    }

    fn missile(target: EntityId, target_position: Vec2Fixed) -> Projectile {
        Projectile::new(1, Some(target), target_position, 40, DamageType::Explosive, WeaponType::Missile, crate::math::Fixed::ZERO, 0)
    }

    #[test]
    fn bullet_keeps_launch_trajectory_even_if_target_moves() {
        let mut p = bullet(Vec2Fixed::new(crate::math::Fixed::from_num(100), crate::math::Fixed::ZERO));
        let position = Vec2Fixed::ZERO;
        let moved_target = Vec2Fixed::new(crate::math::Fixed::from_num(100), crate::math::Fixed::from_num(50));
        let outcome = tick_projectile(&mut p, position, Some(moved_target), Vec2Fixed::new(crate::math::Fixed::from_num(1000), crate::math::Fixed::from_num(1000)));
        match outcome {
            ProjectileOutcome::Flying(new_pos) => assert_eq!(new_pos.y, crate::math::Fixed::ZERO),
            other => panic!("expected Flying, got {other:?}"),
        }
    }

    #[test]
    fn missile_reaims_toward_moved_target() {
        let mut p = missile(99, Vec2Fixed::new(crate::math::Fixed::from_num(100), crate::math::Fixed::ZERO));
        let position = Vec2Fixed::ZERO;
        let moved_target = Vec2Fixed::new(crate::math::Fixed::from_num(100), crate::math::Fixed::from_num(50));
        let outcome = tick_projectile(&mut p, position, Some(moved_target), Vec2Fixed::new(crate::math::Fixed::from_num(1000), crate::math::Fixed::from_num(1000)));
        assert_eq!(p.target_position, moved_target);
        match outcome {
            ProjectileOutcome::Flying(new_pos) => assert!(new_pos.y > crate::math::Fixed::ZERO),
            other => panic!("expected Flying, got {other:?}"),
        }
    }

    #[test]
    fn projectile_impacts_near_target() {
        let mut p = bullet(Vec2Fixed::new(crate::math::Fixed::from_num(1), crate::math::Fixed::ZERO));
        let outcome = tick_projectile(&mut p, Vec2Fixed::ZERO, None, Vec2Fixed::new(crate::math::Fixed::from_num(1000), crate::math::Fixed::from_num(1000)));
        assert!(matches!(outcome, ProjectileOutcome::Impact(_)));
    }

    #[test]
    fn projectile_expires_out_of_bounds() {
        let mut p = bullet(Vec2Fixed::new(crate::math::Fixed::from_num(5000), crate::math::Fixed::ZERO));
        let outcome = tick_projectile(&mut p, Vec2Fixed::ZERO, None, Vec2Fixed::new(crate::math::Fixed::from_num(10), crate::math::Fixed::from_num(10)));
        assert_eq!(outcome, ProjectileOutcome::Expired);
    }
}
