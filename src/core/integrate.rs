use crate::types::Particle;

/// Semi-implicit Euler step with elastic walls.
///
/// Velocities already hold this tick's forces; positions follow them, then any
/// particle whose rim crosses an edge is clamped back and its velocity
/// component reversed.
pub fn integrate(particles: &mut [Particle], width: f32, height: f32) {
    for p in particles {
        p.pos += p.vel;

        let (min_x, max_x) = wall_span(p.radius, width);
        if p.pos.x < min_x {
            p.pos.x = min_x;
            p.vel.x = p.vel.x.abs();
        } else if p.pos.x > max_x {
            p.pos.x = max_x;
            p.vel.x = -p.vel.x.abs();
        }

        let (min_y, max_y) = wall_span(p.radius, height);
        if p.pos.y < min_y {
            p.pos.y = min_y;
            p.vel.y = p.vel.y.abs();
        } else if p.pos.y > max_y {
            p.pos.y = max_y;
            p.vel.y = -p.vel.y.abs();
        }
    }
}

/// Allowed centre range along one axis; collapses to the midpoint when the
/// canvas is thinner than the particle.
fn wall_span(radius: f32, extent: f32) -> (f32, f32) {
    if extent <= radius * 2.0 {
        let mid = extent * 0.5;
        (mid, mid)
    } else {
        (radius, extent - radius)
    }
}
