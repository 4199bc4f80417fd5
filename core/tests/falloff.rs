use castle_defence_core::geometry::{damage_falloff, move_angle, normalise_angle};
use proptest::prelude::*;

proptest! {
    #[test]
    fn falloff_stays_within_unit_interval(
        distance_sq in 0.0f32..1.0e7,
        range in 0.0f32..2_000.0,
        hits in 0u32..64,
    ) {
        let falloff = damage_falloff(distance_sq, range, hits);
        prop_assert!((0.0..=1.0).contains(&falloff), "falloff {falloff} escaped [0, 1]");
    }

    #[test]
    fn first_hit_uses_the_pure_distance_term(
        distance_sq in 0.0f32..1.0e6,
        range in 1.0f32..2_000.0,
    ) {
        let expected = (1.0 - distance_sq / (range * range)).clamp(0.0, 1.0);
        let falloff = damage_falloff(distance_sq, range, 0);
        prop_assert!((falloff - expected).abs() < 1.0e-5);
    }

    #[test]
    fn additional_hits_never_increase_damage(
        distance_sq in 0.0f32..1.0e6,
        range in 0.0f32..2_000.0,
        hits in 0u32..63,
    ) {
        let current = damage_falloff(distance_sq, range, hits);
        let next = damage_falloff(distance_sq, range, hits + 1);
        prop_assert!(next <= current);
    }

    #[test]
    fn rotation_remains_normalised(
        current in -1_000.0f32..1_000.0,
        target in -1_000.0f32..1_000.0,
        step in 0.0f32..45.0,
    ) {
        let rotated = move_angle(normalise_angle(current), target, step);
        prop_assert!((0.0..360.0).contains(&rotated), "rotation {rotated} escaped [0, 360)");
    }
}
