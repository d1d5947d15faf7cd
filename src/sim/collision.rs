//! Collision queries and targeting
//!
//! Everything is circle-vs-circle. Queries never mutate; the combat pass
//! decides what to do with the results.

use glam::Vec2;

use super::state::Enemy;
use crate::consts::ARMOR_FACTOR;
use crate::{angle_to_dir, circles_overlap, dist_sq};

/// Enemies within `range` of `origin`, nearest first (ties broken by id)
pub fn nearest_targets(enemies: &[Enemy], origin: Vec2, range: f32, max: usize) -> Vec<(u32, Vec2)> {
    let range_sq = range * range;
    let mut hits: Vec<(f32, u32, Vec2)> = enemies
        .iter()
        .filter(|e| !e.is_dead())
        .map(|e| (dist_sq(e.pos, origin), e.id, e.pos))
        .filter(|(d, _, _)| *d <= range_sq)
        .collect();
    hits.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });
    hits.into_iter().take(max).map(|(_, id, pos)| (id, pos)).collect()
}

/// Index of the first live enemy overlapping the circle, skipping `exclude`
pub fn first_overlap(enemies: &[Enemy], pos: Vec2, radius: f32, exclude: &[u32]) -> Option<usize> {
    enemies.iter().position(|e| {
        !e.is_dead() && !exclude.contains(&e.id) && circles_overlap(pos, radius, e.pos, e.radius)
    })
}

/// World positions of `count` blades evenly spaced on a ring
pub fn blade_positions(center: Vec2, angle: f32, count: u32, ring_radius: f32) -> Vec<Vec2> {
    let step = std::f32::consts::TAU / count.max(1) as f32;
    (0..count)
        .map(|i| center + angle_to_dir(angle + step * i as f32) * ring_radius)
        .collect()
}

/// Contact damage after armor, never below 1
pub fn mitigated_damage(raw: f32, armor: f32) -> f32 {
    (raw - armor.max(0.0) * ARMOR_FACTOR).max(1.0)
}

/// Move `pos` toward `target` by at most `speed * dt`, without overshooting
pub fn step_toward(pos: Vec2, target: Vec2, speed: f32, dt: f32) -> Vec2 {
    let delta = target - pos;
    let dist = delta.length();
    let max_step = speed * dt;
    if dist <= max_step || dist <= f32::EPSILON {
        target
    } else {
        pos + delta / dist * max_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EnemyKind;

    fn enemy(id: u32, x: f32, y: f32) -> Enemy {
        Enemy {
            id,
            kind: EnemyKind::Slime,
            pos: Vec2::new(x, y),
            hp: 10.0,
            max_hp: 10.0,
            speed: 50.0,
            damage: 5.0,
            radius: 10.0,
            contact_cd: 0.0,
            orbit_cd: 0.0,
        }
    }

    #[test]
    fn test_nearest_targets_sorted_and_ranged() {
        let enemies = vec![enemy(1, 300.0, 0.0), enemy(2, 100.0, 0.0), enemy(3, 900.0, 0.0)];
        let targets = nearest_targets(&enemies, Vec2::ZERO, 420.0, 5);
        let ids: Vec<u32> = targets.iter().map(|t| t.0).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_nearest_targets_tie_breaks_by_id() {
        let enemies = vec![enemy(9, 0.0, 100.0), enemy(4, 100.0, 0.0)];
        let targets = nearest_targets(&enemies, Vec2::ZERO, 420.0, 2);
        assert_eq!(targets[0].0, 4);
    }

    #[test]
    fn test_first_overlap_respects_exclusion() {
        let enemies = vec![enemy(1, 5.0, 0.0), enemy(2, 8.0, 0.0)];
        assert_eq!(first_overlap(&enemies, Vec2::ZERO, 4.0, &[]), Some(0));
        assert_eq!(first_overlap(&enemies, Vec2::ZERO, 4.0, &[1]), Some(1));
        assert_eq!(first_overlap(&enemies, Vec2::ZERO, 4.0, &[1, 2]), None);
    }

    #[test]
    fn test_mitigated_damage_floor() {
        assert_eq!(mitigated_damage(50.0, 0.0), 50.0);
        assert_eq!(mitigated_damage(5.0, 60.0), 1.0);
    }

    #[test]
    fn test_blades_on_ring() {
        let blades = blade_positions(Vec2::new(10.0, 10.0), 0.0, 4, 50.0);
        assert_eq!(blades.len(), 4);
        for b in blades {
            assert!(((b - Vec2::new(10.0, 10.0)).length() - 50.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_step_toward_no_overshoot() {
        let p = step_toward(Vec2::ZERO, Vec2::new(1.0, 0.0), 100.0, 1.0);
        assert_eq!(p, Vec2::new(1.0, 0.0));
        let p = step_toward(Vec2::ZERO, Vec2::new(100.0, 0.0), 10.0, 1.0);
        assert!((p.x - 10.0).abs() < 1e-4);
    }
}
