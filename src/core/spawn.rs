use rand::Rng;

use crate::{
    config,
    core::store::ParticleSpec,
    types::{FrameInputs, Tone, Vec2},
};

/// Cooldown counter that releases one energetic particle per expiry.
#[derive(Debug)]
pub struct Spawner {
    cooldown: i32,
}

impl Spawner {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        Self {
            cooldown: next_cooldown(rng),
        }
    }

    pub fn cooldown(&self) -> i32 {
        self.cooldown
    }

    /// Advances one tick; true when a particle is due this tick.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> bool {
        self.cooldown -= 1;
        if self.cooldown <= 0 {
            self.cooldown = next_cooldown(rng);
            true
        } else {
            false
        }
    }
}

fn next_cooldown<R: Rng>(rng: &mut R) -> i32 {
    config::SPAWN_BASE_TICKS + rng.gen_range(0..=config::SPAWN_JITTER_TICKS)
}

/// A particle for the initial population: anywhere on the canvas, slow, mostly dim.
pub fn ambient<R: Rng>(rng: &mut R, inputs: &FrameInputs) -> ParticleSpec {
    let scale = inputs.device_scale;
    let pos = Vec2::new(
        rng.gen_range(0.0..inputs.width.max(1.0)),
        rng.gen_range(0.0..inputs.height.max(1.0)),
    );
    let heading = rng.gen_range(0.0..std::f32::consts::TAU);
    let tone = if rng.gen_bool(config::BRIGHT_CHANCE) {
        Tone::Bright
    } else {
        Tone::Dim
    };
    ParticleSpec {
        pos,
        vel: Vec2::from_angle(heading) * (config::BASE_SPEED * scale),
        radius: rng.gen_range(config::RADIUS_MIN..config::RADIUS_MAX) * scale,
        tone,
    }
}

/// A particle launched from the bottom-left corner up and into the canvas.
pub fn energetic<R: Rng>(rng: &mut R, inputs: &FrameInputs) -> ParticleSpec {
    let scale = inputs.device_scale;
    let angle = rng
        .gen_range(config::SPAWN_ANGLE_MIN_DEG..config::SPAWN_ANGLE_MAX_DEG)
        .to_radians();
    // Canvas y grows downwards, so "up" is negative y.
    let dir = Vec2::new(angle.cos(), -angle.sin());
    ParticleSpec {
        pos: Vec2::new(0.0, inputs.height),
        vel: dir * (config::SPAWN_SPEED * scale),
        radius: rng.gen_range(config::SPAWN_RADIUS_MIN..config::SPAWN_RADIUS_MAX) * scale,
        tone: Tone::Bright,
    }
}
