//! Two-pass entity separation / collision relaxation (§4.5).
//!
//! Overlapping entities are pushed apart over two passes per tick: the first
//! pass resolves the bulk of the overlap, the second catches residual
//! overlap the first pass's ordering left behind. Stationary entities (zero
//! velocity) push back half as hard as moving ones, and a small perpendicular
//! component is blended in so entities queued head-on slide past each other
//! instead of locking.

use crate::math::{fixed_sqrt, Fixed};
use crate::math::Vec2Fixed;

/// Maximum distance a single relaxation pass will push an entity.
const MAX_PUSH_PER_PASS: Fixed = Fixed::from_bits(5 << 31); // 2.5

/// A body participating in collision relaxation.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    /// Current position.
    pub position: Vec2Fixed,
    /// Collision radius.
    pub radius: Fixed,
    /// Whether this body is moving this tick (affects push weighting).
    pub moving: bool,
}

/// Resolve overlaps among `bodies` in place, over two relaxation passes.
pub fn resolve(bodies: &mut [Body]) {
    for _ in 0..2 {
        relax_pass(bodies);
    }
}

fn relax_pass(bodies: &mut [Body]) {
    let n = bodies.len();
    let mut pushes = vec![Vec2Fixed::ZERO; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let a = bodies[i];
            let b = bodies[j];
            let min_dist = a.radius + b.radius;
            let offset = a.position - b.position;
            let dist_sq = offset.length_squared();
            if dist_sq >= min_dist * min_dist || dist_sq == Fixed::ZERO {
                continue;
            }
            let dist = fixed_sqrt(dist_sq).max(Fixed::from_num(1) / Fixed::from_num(100));
            let overlap = min_dist - dist;
            let normal = offset.normalize_to(Fixed::ONE);
            let perp = normal.perpendicular() * (Fixed::from_num(15) / Fixed::from_num(100));

            let (a_weight, b_weight) = match (a.moving, b.moving) {
                (true, true) => (Fixed::from_num(8) / Fixed::from_num(10), Fixed::from_num(2) / Fixed::from_num(10)),
                (true, false) => (Fixed::ONE, Fixed::ZERO),
                (false, true) => (Fixed::ZERO, Fixed::ONE),
                (false, false) => {
                    (Fixed::from_num(1) / Fixed::from_num(2), Fixed::from_num(1) / Fixed::from_num(2))
                }
            };

            let push_a = ((normal + perp).normalize_to(overlap) * a_weight)
                .clamp(-MAX_PUSH_PER_PASS, MAX_PUSH_PER_PASS);
            let push_b = ((normal + perp).normalize_to(overlap) * (-b_weight))
                .clamp(-MAX_PUSH_PER_PASS, MAX_PUSH_PER_PASS);

            pushes[i] = pushes[i] + push_a;
            pushes[j] = pushes[j] + push_b;
        }
    }

    for (body, push) in bodies.iter_mut().zip(pushes) {
        body.position = body.position + push;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_bodies_separate() {
        let mut bodies = vec![
            Body {
                position: Vec2Fixed::ZERO,
                radius: Fixed::from_num(10),
                moving: true,
            },
            Body {
                position: Vec2Fixed::new(Fixed::from_num(5), Fixed::ZERO),
                radius: Fixed::from_num(10),
                moving: true,
            },
        ];

        let initial = bodies[0].position.distance(bodies[1].position);
        resolve(&mut bodies);
        let resolved = bodies[0].position.distance(bodies[1].position);
        assert!(resolved > initial);
    }

    #[test]
    fn non_overlapping_bodies_unaffected() {
        let mut bodies = vec![
            Body {
                position: Vec2Fixed::ZERO,
                radius: Fixed::from_num(5),
                moving: true,
            },
            Body {
                position: Vec2Fixed::new(Fixed::from_num(1000), Fixed::ZERO),
                radius: Fixed::from_num(5),
                moving: true,
            },
        ];
        resolve(&mut bodies);
        assert_eq!(bodies[0].position, Vec2Fixed::ZERO);
    }

    #[test]
    fn stationary_body_pushed_less() {
        let mut moving_pair = vec![
            Body { position: Vec2Fixed::ZERO, radius: Fixed::from_num(10), moving: true },
            Body { position: Vec2Fixed::new(Fixed::from_num(5), Fixed::ZERO), radius: Fixed::from_num(10), moving: false },
        ];
        resolve(&mut moving_pair);
        assert_eq!(moving_pair[1].position, Vec2Fixed::new(Fixed::from_num(5), Fixed::ZERO));
        assert_ne!(moving_pair[0].position, Vec2Fixed::ZERO);
    }
}
