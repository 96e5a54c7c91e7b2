use clap::Parser;

use crate::error::Error;

pub const SIM_HZ: f32 = 60.0;
pub const RENDER_HZ: f32 = 30.0;
pub const DT: f32 = 1.0 / SIM_HZ;

// Terminal cells are mapped onto canvas units at this ratio.
pub const CELL_PX_W: f32 = 8.0;
pub const CELL_PX_H: f32 = 16.0;

pub const NARROW_VIEWPORT_PX: f32 = 768.0;
pub const NARROW_DEVICE_SCALE: f32 = 0.6;

pub const INIT_PARTICLES: usize = 60;
pub const MAX_PARTICLES: usize = 2_000;

pub const CONNECTION_RADIUS: f32 = 160.0;
pub const MAX_CLUSTER_SIZE: usize = 5;
pub const MAX_NEIGHBORS: usize = 5;

pub const BASE_SPEED: f32 = 0.35;
pub const RADIUS_MIN: f32 = 1.5;
pub const RADIUS_MAX: f32 = 3.5;
pub const BRIGHT_CHANCE: f64 = 0.3;

pub const SPAWN_BASE_TICKS: i32 = 90;
pub const SPAWN_JITTER_TICKS: i32 = 30;
pub const SPAWN_ANGLE_MIN_DEG: f32 = 18.0;
pub const SPAWN_ANGLE_MAX_DEG: f32 = 72.0;
pub const SPAWN_SPEED: f32 = 2.2;
pub const SPAWN_RADIUS_MIN: f32 = 2.5;
pub const SPAWN_RADIUS_MAX: f32 = 3.5;

pub const PHASE_STEP: f32 = 0.005;
pub const DRIFT_STRENGTH: f32 = 0.004;
pub const DRIFT_FREQ: f32 = 0.01;

pub const REST_LENGTH: f32 = 80.0;
pub const SPRING_K: f32 = 0.0004;
pub const SPRING_OSC_AMP: f32 = 6.0;
pub const SPRING_OSC_FREQ: f32 = 3.0;

pub const IDLE_SPEED_MIN: f32 = 0.02;
pub const IDLE_NUDGE: f32 = 0.05;
pub const FRICTION: f32 = 0.985;
pub const KICK_CHANCE: f64 = 0.01;
pub const KICK_SHARE: f64 = 0.15;
pub const KICK_SPEED: f32 = 0.8;

pub const STUCK_DISTANCE: f32 = 48.0;
pub const TENSION_DECAY: f32 = 0.96;
pub const TENSION_BREAK: f32 = 120.0;
pub const SNAP_IMPULSE: f32 = 4.0;
pub const COLLISION_IMPULSE: f32 = 6.0;

pub const BOND_ALPHA: f32 = 0.6;
pub const BOND_WIDTH: f32 = 1.0;
pub const GLOW_BLUR: f32 = 4.0;

/// Runtime knobs taken from the command line.
#[derive(Parser, Debug, Clone)]
#[command(name = "meshdrift")]
#[command(version, about = "Drifting particle network in the terminal", long_about = None)]
pub struct Settings {
    /// Number of particles in the initial population
    #[arg(short, long, default_value_t = INIT_PARTICLES)]
    pub particles: usize,

    /// Seed for the simulation RNG (random when omitted)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Write logs to this file; logging is discarded when omitted
    #[arg(long)]
    pub log_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            particles: INIT_PARTICLES,
            seed: None,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.particles == 0 || self.particles > MAX_PARTICLES {
            return Err(Error::InvalidSetting {
                name: "particles",
                value: self.particles.to_string(),
            });
        }
        Ok(())
    }
}

/// Device-scale factor for a canvas of the given width.
pub fn device_scale_for(width: f32) -> f32 {
    if width < NARROW_VIEWPORT_PX {
        NARROW_DEVICE_SCALE
    } else {
        1.0
    }
}
