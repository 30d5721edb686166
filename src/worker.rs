//! Worker-side simulation loop.
//!
//! The whole animation runs on one dedicated thread. Host events arrive
//! over a channel and are applied as plain state mutations between frames;
//! the frame tick then reads the latest state, so there is no locking
//! beyond the shared surface handle. The loop idles (blocking on the
//! channel) until an `Init` binds a surface, then ticks at a fixed pace
//! until the host drops its sender.

use crate::config::{EngineConfig, Theme};
use crate::emitter::PathFollower;
use crate::particles::ParticleEngine;
use crate::surface::{FrameSurface, SharedSurface};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use egui::{Color32, Vec2};
use log::info;
use std::sync::MutexGuard;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const FRAME: Duration = Duration::from_micros(16_667);

/// Inbound host events. Field names follow the host's semantics; the
/// surface handle is passed exactly once, at init.
pub enum WorkerEvent {
    Init {
        surface: SharedSurface,
        width: u32,
        height: u32,
        theme: Theme,
    },
    Resize {
        width: u32,
        height: u32,
    },
    ThemeChange {
        theme: Theme,
    },
    PointerStart {
        pos: Vec2,
    },
    PointerMove {
        points: Vec<Vec2>,
    },
    PointerEnd,
}

/// Explicit simulation state: created once, mutated by events, read by the
/// per-frame tick. Never destroyed until the worker thread exits.
pub struct SimulationContext {
    config: EngineConfig,
    engine: ParticleEngine,
    follower: PathFollower,
    surface: Option<SharedSurface>,
}

impl SimulationContext {
    pub fn new(config: EngineConfig) -> Self {
        let follower = PathFollower::new(config.emitter);
        Self {
            config,
            engine: ParticleEngine::new(0.0, 0.0),
            follower,
            surface: None,
        }
    }

    /// Running once a surface is bound; there is no way back to idle.
    pub fn is_running(&self) -> bool {
        self.surface.is_some()
    }

    pub fn engine(&self) -> &ParticleEngine {
        &self.engine
    }

    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    pub fn handle_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Init {
                surface,
                width,
                height,
                theme,
            } => {
                {
                    let mut frame = lock(&surface);
                    frame.resize(width, height);
                    frame.set_background(rgb(theme.background));
                }
                self.engine.set_bounds(width as f32, height as f32);
                self.engine.update_palette(&theme);
                self.engine.regenerate_stardust(self.config.stardust_count);
                self.surface = Some(surface);
                info!("surface bound at {width}x{height}, theme '{}'", theme.name);
            }
            WorkerEvent::Resize { width, height } => {
                if let Some(surface) = &self.surface {
                    lock(surface).resize(width, height);
                }
                self.engine.set_bounds(width as f32, height as f32);
                self.engine.regenerate_stardust(self.config.stardust_count);
                info!("resized to {width}x{height}");
            }
            WorkerEvent::ThemeChange { theme } => {
                // Colors only; the ambient population stays untouched.
                self.engine.update_palette(&theme);
                if let Some(surface) = &self.surface {
                    lock(surface).set_background(rgb(theme.background));
                }
                info!("theme changed to '{}'", theme.name);
            }
            WorkerEvent::PointerStart { pos } => {
                self.follower.pointer_start(pos);
                self.engine.spawn_at(pos, false, &self.config);
            }
            WorkerEvent::PointerMove { points } => {
                if points.is_empty() || !self.follower.is_tracking() {
                    return;
                }
                let points = if self.config.policies.batched_move_points {
                    points
                } else {
                    points.last().copied().into_iter().collect()
                };
                for p in points {
                    self.follower.pointer_move(p);
                    if self.config.policies.spark_burst_on_move {
                        for _ in 0..self.config.spark_burst_size {
                            self.engine.spawn_at(p, true, &self.config);
                        }
                    }
                }
            }
            WorkerEvent::PointerEnd => self.follower.pointer_end(),
        }
    }

    /// One frame: clear, stardust, emitter step (may spawn), trail update
    /// with single-pass removal, present. Skipped silently before init.
    pub fn tick(&mut self) {
        let Some(shared) = &self.surface else {
            return;
        };
        let mut surface = lock(shared);

        surface.clear();
        self.engine.advance_and_render_stardust(&mut surface);

        for pos in self.follower.step(self.config.policies.idle_hold_reseed) {
            self.engine.spawn_at(pos, false, &self.config);
        }

        self.engine.advance_and_render_particles(&mut surface);
        surface.present();
    }
}

fn lock(surface: &SharedSurface) -> MutexGuard<'_, FrameSurface> {
    // A panicked host blit cannot corrupt a plain pixel buffer.
    surface.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn rgb(c: [u8; 3]) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

/// Spawn the worker thread. Dropping the returned sender shuts it down.
pub fn spawn_worker(config: EngineConfig) -> (Sender<WorkerEvent>, JoinHandle<()>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let handle = thread::spawn(move || run_worker(rx, config));
    (tx, handle)
}

/// Frame loop body. Cooperative single-threaded scheduling: drain pending
/// events, tick once, sleep out the remainder of the frame budget. While no
/// surface is bound the loop blocks on the channel instead of spinning.
pub fn run_worker(events: Receiver<WorkerEvent>, config: EngineConfig) {
    info!("stardust worker started");
    let mut ctx = SimulationContext::new(config);

    loop {
        let frame_start = Instant::now();

        loop {
            match events.try_recv() {
                Ok(event) => ctx.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    info!("host disconnected, stardust worker exiting");
                    return;
                }
            }
        }

        ctx.tick();

        if ctx.is_running() {
            let elapsed = frame_start.elapsed();
            if elapsed < FRAME {
                thread::sleep(FRAME - elapsed);
            }
        } else {
            // Idle: nothing to draw until init arrives.
            match events.recv() {
                Ok(event) => ctx.handle_event(event),
                Err(_) => {
                    info!("host disconnected, stardust worker exiting");
                    return;
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
