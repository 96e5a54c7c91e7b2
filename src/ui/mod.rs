use std::{io, time::Duration};

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points},
        Block, Borders, Paragraph,
    },
    Terminal,
};
use tracing::info;

use crate::{
    config::{self, Settings},
    core::{Animator, FrameOutcome, Simulation},
    error::Error,
    render::{self, DrawSurface, Shadow},
    types::{FrameInputs, Rgb, Vec2},
};

const RING_STEP: f32 = 2.0;
const GLOW_INTENSITY: f32 = 0.35;

pub fn run(settings: Settings) -> Result<(), Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &settings);
    shutdown_terminal(&mut terminal)?;
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &Settings,
) -> Result<(), Error> {
    let mut inputs = canvas_inputs(terminal.size()?);
    let mut animator = Animator::new(Simulation::new(settings, &inputs));
    info!(
        particles = settings.particles,
        width = inputs.width,
        height = inputs.height,
        "simulation started"
    );

    let mut accumulator = 0.0_f32;
    let mut last_tick = std::time::Instant::now();
    let mut last_render = std::time::Instant::now();
    let render_interval = Duration::from_secs_f32(1.0 / config::RENDER_HZ);
    let mut sim_counter = 0_u32;
    let mut render_counter = 0_u32;
    let mut last_fps_sample = std::time::Instant::now();
    let mut sim_fps = 0.0_f32;
    let mut render_fps = 0.0_f32;

    loop {
        inputs = canvas_inputs(terminal.size()?);

        let now = std::time::Instant::now();
        accumulator += (now - last_tick).as_secs_f32();
        last_tick = now;

        while accumulator >= config::DT {
            accumulator -= config::DT;
            match animator.on_frame(&inputs) {
                FrameOutcome::Stopped => return Ok(()),
                FrameOutcome::Skipped => {}
                FrameOutcome::Ticked(_) => sim_counter += 1,
            }
        }

        while event::poll(Duration::from_millis(0))? {
            if let CrosstermEvent::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => animator.stop(),
                    KeyCode::Char('r') => animator.restart(&inputs),
                    _ => {}
                }
            }
        }
        if !animator.is_running() {
            return Ok(());
        }

        if last_render.elapsed() >= render_interval {
            if last_fps_sample.elapsed() >= Duration::from_secs(1) {
                let secs = last_fps_sample.elapsed().as_secs_f32();
                sim_fps = sim_counter as f32 / secs;
                render_fps = render_counter as f32 / secs;
                sim_counter = 0;
                render_counter = 0;
                last_fps_sample = std::time::Instant::now();
            }
            let stats = animator.sim().stats();
            let sim = animator.sim();
            terminal.draw(|frame| {
                let chunks = split(frame.size());

                let header = Paragraph::new(format!(
                    "particles: {} | clusters: {} | largest: {} | linked: {} | bonds: {} | spawned: {} | destroyed: {} | merged: {} | snapped: {} | tick fps: {:.1} | render fps: {:.1}",
                    stats.particles,
                    stats.clusters,
                    stats.largest_cluster,
                    stats.linked,
                    stats.bonds,
                    stats.spawned,
                    stats.destroyed,
                    stats.merges,
                    stats.snaps,
                    sim_fps,
                    render_fps
                ))
                .block(Block::default().borders(Borders::ALL).title("meshdrift"));
                frame.render_widget(header, chunks[0]);

                let canvas = Canvas::default()
                    .block(Block::default().borders(Borders::ALL).title("Canvas"))
                    .marker(Marker::Braille)
                    .x_bounds([0.0, inputs.width as f64])
                    .y_bounds([0.0, inputs.height as f64])
                    .paint(|ctx| {
                        let mut surface = TerminalSurface {
                            ctx,
                            height: inputs.height,
                        };
                        render::draw(sim, inputs.width, inputs.height, &mut surface);
                    });
                frame.render_widget(canvas, chunks[1]);

                let footer = Paragraph::new(format!(
                    "ticks: {} | phase: {:.2} | next spawn: {} | repulsed: {} | kicks: {} | skipped: {} | scale: {:.1} | canvas: {:.0}x{:.0} | r: restart | q: quit",
                    stats.ticks,
                    sim.phase(),
                    sim.spawn_cooldown(),
                    stats.repulsions,
                    stats.kicks,
                    stats.skipped,
                    inputs.device_scale,
                    inputs.width,
                    inputs.height
                ))
                .block(Block::default().borders(Borders::ALL).title("Controls"));
                frame.render_widget(footer, chunks[2]);
            })?;

            last_render = std::time::Instant::now();
            render_counter += 1;
        }

        std::thread::sleep(Duration::from_millis(1));
    }
}

fn split(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area)
}

/// Canvas size in canvas units for the viewport panel inside its border.
fn canvas_inputs(area: Rect) -> FrameInputs {
    let viewport = split(area)[1];
    let cols = viewport.width.saturating_sub(2) as f32;
    let rows = viewport.height.saturating_sub(2) as f32;
    let width = cols * config::CELL_PX_W;
    let height = rows * config::CELL_PX_H;
    FrameInputs::new(width, height, config::device_scale_for(width))
}

fn shutdown_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), Error> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Draws onto a ratatui canvas; canvas y grows upwards, so rows are flipped.
struct TerminalSurface<'a, 'b> {
    ctx: &'a mut Context<'b>,
    height: f32,
}

impl TerminalSurface<'_, '_> {
    fn point(&self, p: Vec2) -> (f64, f64) {
        (p.x as f64, (self.height - p.y) as f64)
    }
}

impl DrawSurface for TerminalSurface<'_, '_> {
    fn clear_rect(&mut self, _x: f32, _y: f32, _width: f32, _height: f32) {
        // The canvas widget starts every frame blank.
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, shadow: Option<Shadow>) {
        let (x, y) = self.point(center);
        if let Some(shadow) = shadow {
            self.ctx.draw(&Circle {
                x,
                y,
                radius: (radius + shadow.blur * 0.5) as f64,
                color: to_color(shadow.color.scale(GLOW_INTENSITY)),
            });
            self.ctx.layer();
        }
        let mut ring = radius;
        while ring > 0.0 {
            self.ctx.draw(&Circle {
                x,
                y,
                radius: ring as f64,
                color: to_color(color),
            });
            ring -= RING_STEP;
        }
        self.ctx.draw(&Points {
            coords: &[(x, y)],
            color: to_color(color),
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgb, alpha: f32, _width: f32) {
        let (x1, y1) = self.point(from);
        let (x2, y2) = self.point(to);
        self.ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color: to_color(color.scale(alpha)),
        });
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}
