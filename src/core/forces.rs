use rand::Rng;

use crate::{
    config,
    core::cluster::Bond,
    types::{Particle, Vec2},
};

/// Slowly varying flow field driven by the global phase.
pub fn drift_at(pos: Vec2, phase: f32) -> Vec2 {
    Vec2::new(
        (phase + pos.y * config::DRIFT_FREQ).sin(),
        (phase * 0.7 + pos.x * config::DRIFT_FREQ).cos(),
    ) * config::DRIFT_STRENGTH
}

pub fn apply_drift(particles: &mut [Particle], phase: f32, scale: f32) {
    for p in particles {
        p.vel += drift_at(p.pos, phase) * scale;
    }
}

/// Spring magnitude along a bond; positive pulls the pair together.
pub fn spring_force(dist: f32, phase: f32, i: usize, j: usize) -> f32 {
    let oscillation =
        (phase * config::SPRING_OSC_FREQ + (i + j) as f32).sin() * config::SPRING_OSC_AMP;
    (dist - config::REST_LENGTH + oscillation) * config::SPRING_K
}

pub fn apply_springs(particles: &mut [Particle], bonds: &[Bond], phase: f32) {
    for bond in bonds {
        let (i, j) = (bond.a, bond.b);
        if i >= particles.len() || j >= particles.len() {
            continue;
        }
        let delta = particles[j].pos - particles[i].pos;
        let dist = delta.length();
        if dist == 0.0 || dist >= config::CONNECTION_RADIUS {
            continue;
        }
        let dir = delta * (1.0 / dist);
        let force = spring_force(dist, phase, i, j);
        let ri = particles[i].radius.max(f32::EPSILON);
        let rj = particles[j].radius.max(f32::EPSILON);
        particles[i].vel += dir * (force / ri);
        particles[j].vel -= dir * (force / rj);
    }
}

/// Keeps near-still particles moving with a small random nudge per slow axis.
pub fn apply_idle_floor<R: Rng>(particles: &mut [Particle], rng: &mut R, scale: f32) {
    let nudge = config::IDLE_NUDGE * scale;
    for p in particles {
        if p.vel.x.abs() < config::IDLE_SPEED_MIN {
            p.vel.x += rng.gen_range(-nudge..=nudge);
        }
        if p.vel.y.abs() < config::IDLE_SPEED_MIN {
            p.vel.y += rng.gen_range(-nudge..=nudge);
        }
    }
}

pub fn apply_friction(particles: &mut [Particle]) {
    for p in particles {
        p.vel = p.vel * config::FRICTION;
    }
}

/// Occasionally kicks a random share of particles in random directions.
/// Returns how many were kicked.
pub fn inject_energy<R: Rng>(particles: &mut [Particle], rng: &mut R, scale: f32) -> usize {
    if !rng.gen_bool(config::KICK_CHANCE) {
        return 0;
    }
    let mut kicked = 0;
    for p in particles {
        if rng.gen_bool(config::KICK_SHARE) {
            let heading = rng.gen_range(0.0..std::f32::consts::TAU);
            p.vel += Vec2::from_angle(heading) * (config::KICK_SPEED * scale);
            kicked += 1;
        }
    }
    kicked
}
