//! Configuration for Stardust Studio RS
//! Engine tuning, emitter tuning, variant policies and named themes

use serde::{Deserialize, Serialize};

// ============================================================================
// Enums
// ============================================================================

/// How a freshly spawned trail particle picks its initial velocity.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum VelocityModel {
    /// Each axis drawn uniformly from [-1, 1), independent of direction.
    AxisUniform,
    /// Uniform random direction with bounded speed.
    AngleUniform,
}

// ============================================================================
// Variant Policies
// ============================================================================

/// Behaviour switches that differ between observed evolutions of the effect.
///
/// The defaults select the richest variant: angle-based velocities, spark
/// bursts on pointer movement, batched move points and queue re-seeding
/// while the pointer is held still.
#[derive(Clone, Copy, Serialize, Deserialize, Debug)]
pub struct PolicySet {
    pub velocity_model: VelocityModel,
    /// Re-seed the target queue with the held pointer position when the
    /// queue runs dry while the pointer is still down.
    pub idle_hold_reseed: bool,
    /// Spawn a small spark burst directly at every pointer-move sample.
    pub spark_burst_on_move: bool,
    /// Accept every point of a batched pointer-move event (off = last only).
    pub batched_move_points: bool,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self {
            velocity_model: VelocityModel::AngleUniform,
            idle_hold_reseed: true,
            spark_burst_on_move: true,
            batched_move_points: true,
        }
    }
}

// ============================================================================
// Emitter Configuration
// ============================================================================

#[derive(Clone, Copy, Serialize, Deserialize, Debug)]
pub struct EmitterConfig {
    /// Fraction of the remaining distance to the current target closed per
    /// frame (exponential easing).
    pub ease: f32,
    /// World-distance between particles spawned along a travelled segment.
    pub density: f32,
    /// Distance below which the emitter snaps onto the target and pops it.
    pub epsilon: f32,
    /// Travelled distance below which no particles are spawned this frame.
    pub min_travel: f32,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            ease: 0.25,
            density: 4.0,
            epsilon: 0.5,
            min_travel: 0.1,
        }
    }
}

// ============================================================================
// Engine Configuration
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct EngineConfig {
    /// Size of the ambient stardust population.
    pub stardust_count: usize,
    /// Hard cap on live trail particles; spawns beyond it are dropped.
    pub max_particles: usize,
    /// Sparks spawned per pointer-move sample when the policy is on.
    pub spark_burst_size: usize,
    pub emitter: EmitterConfig,
    pub policies: PolicySet,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stardust_count: 70,
            max_particles: 250,
            spark_burst_size: 3,
            emitter: EmitterConfig::default(),
            policies: PolicySet::default(),
        }
    }
}

// ============================================================================
// Themes
// ============================================================================

/// Named color set: background, stardust tint, trail palette, spark palette.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Theme {
    pub name: String,
    pub background: [u8; 3],
    pub stardust: [u8; 3],
    pub particles: Vec<[u8; 3]>,
    pub sparks: Vec<[u8; 3]>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::midnight()
    }
}

impl Theme {
    pub fn midnight() -> Self {
        Self {
            name: "Midnight".to_string(),
            background: [5, 5, 15],
            stardust: [255, 255, 255],
            particles: vec![
                [160, 231, 250],
                [247, 168, 184],
                [255, 255, 255],
                [255, 107, 157],
            ],
            sparks: vec![[255, 255, 255], [255, 209, 102]],
        }
    }

    pub fn dawn() -> Self {
        Self {
            name: "Dawn".to_string(),
            background: [25, 12, 20],
            stardust: [255, 230, 200],
            particles: vec![
                [255, 183, 120],
                [255, 120, 120],
                [255, 220, 180],
                [200, 140, 255],
            ],
            sparks: vec![[255, 240, 200], [255, 150, 80]],
        }
    }

    pub fn neon() -> Self {
        Self {
            name: "Neon".to_string(),
            background: [0, 0, 0],
            stardust: [0, 255, 255],
            particles: vec![[255, 0, 255], [0, 255, 255], [255, 255, 0], [0, 255, 0]],
            sparks: vec![[255, 255, 255], [0, 255, 255]],
        }
    }

    pub fn ocean() -> Self {
        Self {
            name: "Ocean".to_string(),
            background: [0, 10, 20],
            stardust: [150, 220, 255],
            particles: vec![
                [50, 150, 255],
                [0, 200, 200],
                [100, 255, 200],
                [0, 100, 150],
            ],
            sparks: vec![[200, 255, 255], [100, 200, 255]],
        }
    }

    pub fn all_themes() -> Vec<Theme> {
        vec![Self::midnight(), Self::dawn(), Self::neon(), Self::ocean()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_expected_tuning() {
        let config = EngineConfig::default();
        assert_eq!(config.stardust_count, 70);
        assert_eq!(config.max_particles, 250);
        assert!(config.emitter.ease > 0.0 && config.emitter.ease < 1.0);
        assert!(config.emitter.density > 0.0);
    }

    #[test]
    fn themes_always_carry_a_palette() {
        for theme in Theme::all_themes() {
            assert!(!theme.particles.is_empty(), "{} has no palette", theme.name);
            assert!(!theme.sparks.is_empty(), "{} has no spark palette", theme.name);
        }
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stardust_count, config.stardust_count);
        assert_eq!(
            back.policies.idle_hold_reseed,
            config.policies.idle_hold_reseed
        );
    }
}
