//! Render handoff: turns simulation state into drawing-surface calls.

use crate::{
    config,
    core::Simulation,
    types::{Rgb, Tone, Vec2},
};

pub const BRIGHT: Rgb = Rgb::new(170, 230, 255);
pub const DIM: Rgb = Rgb::new(80, 110, 150);
pub const BOND: Rgb = Rgb::new(110, 160, 210);
pub const STRAINED: Rgb = Rgb::new(255, 120, 90);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Rgb,
    pub blur: f32,
}

/// The three primitives the host canvas must provide.
pub trait DrawSurface {
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, shadow: Option<Shadow>);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgb, alpha: f32, width: f32);
}

/// Bond opacity: full strength when touching, fading to zero at the connection radius.
pub fn bond_alpha(dist: f32) -> f32 {
    (1.0 - dist / config::CONNECTION_RADIUS).clamp(0.0, 1.0) * config::BOND_ALPHA
}

pub fn bond_color(tension: f32) -> Rgb {
    BOND.lerp(STRAINED, tension / config::TENSION_BREAK)
}

pub fn draw<S: DrawSurface + ?Sized>(sim: &Simulation, width: f32, height: f32, surface: &mut S) {
    surface.clear_rect(0.0, 0.0, width, height);

    let particles = sim.particles();
    for bond in sim.bonds() {
        let (Some(a), Some(b)) = (particles.get(bond.a), particles.get(bond.b)) else {
            continue;
        };
        let alpha = bond_alpha(a.pos.distance(b.pos));
        if alpha <= 0.0 {
            continue;
        }
        let color = bond_color(sim.tension().get(bond.a, bond.b));
        surface.stroke_line(a.pos, b.pos, color, alpha, config::BOND_WIDTH);
    }

    for p in particles {
        match p.tone {
            Tone::Bright => surface.fill_circle(
                p.pos,
                p.radius,
                BRIGHT,
                Some(Shadow {
                    color: BRIGHT,
                    blur: p.radius * config::GLOW_BLUR,
                }),
            ),
            Tone::Dim => surface.fill_circle(p.pos, p.radius, DIM, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Settings, types::FrameInputs};

    #[derive(Debug, PartialEq)]
    enum Op {
        Clear,
        Circle { shadow: bool },
        Line { alpha: f32 },
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl DrawSurface for Recorder {
        fn clear_rect(&mut self, _x: f32, _y: f32, _width: f32, _height: f32) {
            self.ops.push(Op::Clear);
        }

        fn fill_circle(&mut self, _center: Vec2, _radius: f32, _color: Rgb, shadow: Option<Shadow>) {
            self.ops.push(Op::Circle {
                shadow: shadow.is_some(),
            });
        }

        fn stroke_line(&mut self, _from: Vec2, _to: Vec2, _color: Rgb, alpha: f32, _width: f32) {
            self.ops.push(Op::Line { alpha });
        }
    }

    fn sim(particles: usize) -> Simulation {
        let settings = Settings {
            particles,
            seed: Some(17),
            ..Settings::default()
        };
        Simulation::new(&settings, &FrameInputs::new(800.0, 500.0, 1.0))
    }

    mod draw_fn {
        use super::*;

        #[test]
        fn clears_first_then_draws_every_particle() {
            let sim = sim(25);
            let mut rec = Recorder::default();
            draw(&sim, 800.0, 500.0, &mut rec);
            assert_eq!(rec.ops[0], Op::Clear);
            let circles = rec.ops.iter().filter(|op| matches!(op, Op::Circle { .. })).count();
            assert_eq!(circles, 25);
        }

        #[test]
        fn only_bright_particles_glow() {
            let sim = sim(40);
            let mut rec = Recorder::default();
            draw(&sim, 800.0, 500.0, &mut rec);
            let glowing = rec
                .ops
                .iter()
                .filter(|op| **op == Op::Circle { shadow: true })
                .count();
            let bright = sim.particles().iter().filter(|p| p.tone == Tone::Bright).count();
            assert_eq!(glowing, bright);
        }

        #[test]
        fn bonds_are_drawn_after_a_tick() {
            let mut sim = sim(60);
            let inputs = FrameInputs::new(800.0, 500.0, 1.0);
            sim.tick(&inputs);
            let mut rec = Recorder::default();
            draw(&sim, 800.0, 500.0, &mut rec);
            let lines = rec.ops.iter().filter(|op| matches!(op, Op::Line { .. })).count();
            assert!(lines <= sim.bonds().len());
            assert!(rec.ops.iter().all(|op| match op {
                Op::Line { alpha } => *alpha > 0.0 && *alpha <= config::BOND_ALPHA,
                _ => true,
            }));
        }
    }

    mod styling {
        use super::*;

        #[test]
        fn alpha_fades_with_distance() {
            assert_eq!(bond_alpha(0.0), config::BOND_ALPHA);
            assert!(bond_alpha(40.0) > bond_alpha(120.0));
            assert_eq!(bond_alpha(config::CONNECTION_RADIUS), 0.0);
        }

        #[test]
        fn tension_warms_bond_colour() {
            assert_eq!(bond_color(0.0), BOND);
            assert_eq!(bond_color(config::TENSION_BREAK), STRAINED);
        }
    }
}
