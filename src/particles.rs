//! Particle engine for Stardust Studio RS
//! Two populations: ambient drifting stardust and pointer-spawned trail
//! particles (with a short-lived "spark" variant for burst effects).

use crate::config::{EngineConfig, Theme, VelocityModel};
use crate::surface::FrameSurface;
use egui::{Color32, Vec2};
use rand::Rng;
use std::f32::consts::TAU;

/// Below this radius a trail particle counts as invisible and is removed.
pub const SIZE_FLOOR: f32 = 0.2;
/// Radius shrink per frame for trail particles.
const SIZE_SHRINK: f32 = 0.08;
/// Life lost per frame.
const DECAY: f32 = 0.015;
const SPARK_DECAY: f32 = 0.03;
const SPARK_SPEED_SCALE: f32 = 2.5;

// ============================================================================
// Trail particle
// ============================================================================

/// Pointer-spawned particle with finite life, shrinking size and fade-out.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Remaining life fraction; drawn alpha is `life` clamped to 1.
    pub life: f32,
    pub decay: f32,
    pub color: Color32,
    pub spark: bool,
}

impl Particle {
    pub fn new(
        pos: Vec2,
        model: VelocityModel,
        palette: &[Color32],
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            pos,
            vel: random_velocity(model, 1.0, rng),
            size: rng.gen::<f32>() * 3.5 + 1.5,
            life: rng.gen::<f32>() * 0.8 + 0.5,
            decay: DECAY,
            color: pick(palette, rng),
            spark: false,
        }
    }

    /// Spark variant: faster, smaller, shorter-lived, separate palette.
    pub fn new_spark(
        pos: Vec2,
        model: VelocityModel,
        palette: &[Color32],
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            pos,
            vel: random_velocity(model, SPARK_SPEED_SCALE, rng),
            size: rng.gen::<f32>() * 2.0 + 1.0,
            life: rng.gen::<f32>() * 0.5 + 0.3,
            decay: SPARK_DECAY,
            color: pick(palette, rng),
            spark: true,
        }
    }

    /// Integrate one frame: unit timestep, linear motion, fixed decay.
    pub fn advance(&mut self) {
        self.pos += self.vel;
        self.life -= self.decay;
        if self.size > SIZE_FLOOR {
            self.size -= SIZE_SHRINK;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.life > 0.0 && self.size > SIZE_FLOOR
    }
}

fn random_velocity(model: VelocityModel, speed_scale: f32, rng: &mut impl Rng) -> Vec2 {
    match model {
        VelocityModel::AxisUniform => Vec2::new(
            (rng.gen::<f32>() * 2.0 - 1.0) * speed_scale,
            (rng.gen::<f32>() * 2.0 - 1.0) * speed_scale,
        ),
        VelocityModel::AngleUniform => {
            let angle = rng.gen::<f32>() * TAU;
            let speed = (rng.gen::<f32>() + 0.2) * speed_scale;
            Vec2::angled(angle) * speed
        }
    }
}

fn pick(palette: &[Color32], rng: &mut impl Rng) -> Color32 {
    if palette.is_empty() {
        return Color32::WHITE;
    }
    palette[rng.gen_range(0..palette.len())]
}

// ============================================================================
// Stardust
// ============================================================================

/// Ambient particle drifting vertically with wraparound.
#[derive(Clone, Copy, Debug)]
pub struct Stardust {
    pub pos: Vec2,
    pub size: f32,
    pub speed_y: f32,
    pub opacity: f32,
}

impl Stardust {
    pub fn new(width: f32, height: f32, rng: &mut impl Rng) -> Self {
        let sign = if rng.gen::<f32>() < 0.5 { 1.0 } else { -1.0 };
        Self {
            pos: Vec2::new(rng.gen::<f32>() * width, rng.gen::<f32>() * height),
            size: rng.gen::<f32>() * 2.0 + 0.5,
            speed_y: (rng.gen::<f32>() * 0.5 + 0.2) * sign,
            opacity: rng.gen::<f32>() * 0.5 + 0.2,
        }
    }

    /// Drift one frame; crossing a vertical bound teleports to the opposite
    /// edge with a fresh random horizontal position.
    pub fn advance(&mut self, width: f32, height: f32, rng: &mut impl Rng) {
        self.pos.y += self.speed_y;
        if self.pos.y > height {
            self.pos.y = 0.0;
            self.pos.x = rng.gen::<f32>() * width;
        } else if self.pos.y < 0.0 {
            self.pos.y = height;
            self.pos.x = rng.gen::<f32>() * width;
        }
    }
}

/// Fixed-size stardust population, fully regenerated on init and resize.
#[derive(Default)]
pub struct StardustField {
    stars: Vec<Stardust>,
}

impl StardustField {
    pub fn regenerate(&mut self, count: usize, width: f32, height: f32, rng: &mut impl Rng) {
        self.stars.clear();
        self.stars
            .extend((0..count).map(|_| Stardust::new(width, height, rng)));
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stardust> {
        self.stars.iter()
    }

    pub fn advance_and_render(
        &mut self,
        width: f32,
        height: f32,
        color: Color32,
        surface: &mut FrameSurface,
        rng: &mut impl Rng,
    ) {
        for star in &mut self.stars {
            star.advance(width, height, rng);
            surface.draw_circle(star.pos.x, star.pos.y, star.size, color, star.opacity);
        }
    }
}

// ============================================================================
// Particle Engine
// ============================================================================

/// Owns both particle populations and the cached theme colors.
pub struct ParticleEngine {
    pub particles: Vec<Particle>,
    pub stardust: StardustField,
    width: f32,
    height: f32,

    // Palette caches, refreshed by `update_palette`
    palette: Vec<Color32>,
    spark_palette: Vec<Color32>,
    stardust_color: Color32,
}

impl ParticleEngine {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            particles: Vec::new(),
            stardust: StardustField::default(),
            width,
            height,
            palette: vec![Color32::WHITE],
            spark_palette: vec![Color32::WHITE],
            stardust_color: Color32::WHITE,
        }
    }

    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn update_palette(&mut self, theme: &Theme) {
        self.palette = theme
            .particles
            .iter()
            .map(|c| Color32::from_rgb(c[0], c[1], c[2]))
            .collect();
        self.spark_palette = theme
            .sparks
            .iter()
            .map(|c| Color32::from_rgb(c[0], c[1], c[2]))
            .collect();
        if self.palette.is_empty() {
            self.palette.push(Color32::WHITE);
        }
        if self.spark_palette.is_empty() {
            self.spark_palette.push(Color32::WHITE);
        }
        self.stardust_color =
            Color32::from_rgb(theme.stardust[0], theme.stardust[1], theme.stardust[2]);
    }

    pub fn stardust_color(&self) -> Color32 {
        self.stardust_color
    }

    /// Throw away the whole ambient population and reseed it across the
    /// current bounds.
    pub fn regenerate_stardust(&mut self, count: usize) {
        let mut rng = rand::thread_rng();
        self.stardust
            .regenerate(count, self.width, self.height, &mut rng);
    }

    /// Spawn one trail particle at `pos`, dropped silently at the cap.
    /// Returns whether the particle was actually added.
    pub fn spawn_at(&mut self, pos: Vec2, spark: bool, config: &EngineConfig) -> bool {
        if self.particles.len() >= config.max_particles {
            return false;
        }
        let mut rng = rand::thread_rng();
        let model = config.policies.velocity_model;
        let particle = if spark {
            Particle::new_spark(pos, model, &self.spark_palette, &mut rng)
        } else {
            Particle::new(pos, model, &self.palette, &mut rng)
        };
        self.particles.push(particle);
        true
    }

    pub fn advance_and_render_stardust(&mut self, surface: &mut FrameSurface) {
        let mut rng = rand::thread_rng();
        self.stardust.advance_and_render(
            self.width,
            self.height,
            self.stardust_color,
            surface,
            &mut rng,
        );
    }

    /// Single-pass update + draw + removal: a particle whose visibility
    /// check fails after advancing is dropped the same frame, never drawn.
    pub fn advance_and_render_particles(&mut self, surface: &mut FrameSurface) {
        self.particles.retain_mut(|p| {
            p.advance();
            if !p.is_visible() {
                return false;
            }
            surface.draw_circle(p.pos.x, p.pos.y, p.size, p.color, p.life.min(1.0));
            true
        });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn life_decreases_by_fixed_decay_each_frame() {
        let mut rng = rng();
        let mut p = Particle::new(
            Vec2::ZERO,
            VelocityModel::AngleUniform,
            &[Color32::WHITE],
            &mut rng,
        );
        let mut previous = p.life;
        for _ in 0..20 {
            p.advance();
            assert!((previous - p.life - DECAY).abs() < 1e-6);
            assert!(p.life < previous);
            previous = p.life;
        }
    }

    #[test]
    fn particle_invisible_once_life_runs_out() {
        let mut rng = rng();
        let mut p = Particle::new(
            Vec2::ZERO,
            VelocityModel::AxisUniform,
            &[Color32::WHITE],
            &mut rng,
        );
        p.life = 0.01;
        p.advance();
        assert!(p.life <= 0.0);
        assert!(!p.is_visible());
    }

    #[test]
    fn particle_invisible_once_size_hits_floor() {
        let mut rng = rng();
        let mut p = Particle::new(
            Vec2::ZERO,
            VelocityModel::AxisUniform,
            &[Color32::WHITE],
            &mut rng,
        );
        p.life = 100.0; // keep life out of the way
        while p.size > SIZE_FLOOR {
            p.advance();
        }
        assert!(!p.is_visible());
    }

    #[test]
    fn sparks_decay_faster_and_live_shorter() {
        let mut rng = rng();
        for _ in 0..50 {
            let spark = Particle::new_spark(
                Vec2::ZERO,
                VelocityModel::AngleUniform,
                &[Color32::WHITE],
                &mut rng,
            );
            assert!(spark.spark);
            assert!(spark.decay > DECAY);
            assert!(spark.life < 0.8);
            assert!(spark.size < 3.0 + 1e-3);
        }
    }

    #[test]
    fn axis_uniform_velocity_stays_in_unit_square() {
        let mut rng = rng();
        for _ in 0..200 {
            let v = random_velocity(VelocityModel::AxisUniform, 1.0, &mut rng);
            assert!(v.x >= -1.0 && v.x < 1.0);
            assert!(v.y >= -1.0 && v.y < 1.0);
        }
    }

    #[test]
    fn stardust_wraps_and_rerolls_x() {
        let mut rng = rng();
        let (w, h) = (200.0, 100.0);

        let mut falling = Stardust::new(w, h, &mut rng);
        falling.speed_y = 0.5;
        falling.pos.y = h - 0.1;
        falling.advance(w, h, &mut rng);
        assert_eq!(falling.pos.y, 0.0);
        assert!(falling.pos.x >= 0.0 && falling.pos.x < w);

        let mut rising = Stardust::new(w, h, &mut rng);
        rising.speed_y = -0.5;
        rising.pos.y = 0.1;
        rising.advance(w, h, &mut rng);
        assert_eq!(rising.pos.y, h);
        assert!(rising.pos.x >= 0.0 && rising.pos.x < w);
    }

    #[test]
    fn field_regenerates_exact_population_within_bounds() {
        let mut rng = rng();
        let mut field = StardustField::default();
        field.regenerate(70, 400.0, 300.0, &mut rng);
        assert_eq!(field.len(), 70);
        for star in field.iter() {
            assert!(star.pos.x >= 0.0 && star.pos.x < 400.0);
            assert!(star.pos.y >= 0.0 && star.pos.y < 300.0);
            assert!(star.opacity >= 0.2 && star.opacity < 0.7);
        }
    }

    #[test]
    fn spawn_respects_cap() {
        let config = EngineConfig::default();
        let mut engine = ParticleEngine::new(800.0, 600.0);
        let mut accepted = 0;
        for _ in 0..config.max_particles * 4 {
            if engine.spawn_at(Vec2::new(10.0, 10.0), false, &config) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, config.max_particles);
        assert_eq!(engine.particles.len(), config.max_particles);
    }

    #[test]
    fn dead_particles_are_absent_the_following_frame() {
        let config = EngineConfig::default();
        let mut engine = ParticleEngine::new(64.0, 64.0);
        let mut surface = FrameSurface::new(64, 64);

        engine.spawn_at(Vec2::new(32.0, 32.0), false, &config);
        engine.particles[0].life = 0.001;
        engine.advance_and_render_particles(&mut surface);
        assert!(engine.particles.is_empty());
    }

    #[test]
    fn healthy_particles_survive_the_frame() {
        let config = EngineConfig::default();
        let mut engine = ParticleEngine::new(64.0, 64.0);
        let mut surface = FrameSurface::new(64, 64);

        for _ in 0..10 {
            engine.spawn_at(Vec2::new(32.0, 32.0), false, &config);
        }
        engine.advance_and_render_particles(&mut surface);
        assert_eq!(engine.particles.len(), 10);
    }
}
