//! Pointer path follower.
//!
//! Raw pointer samples arrive sparse and bursty. The follower keeps a FIFO
//! queue of target points and eases toward the head of the queue a fixed
//! fraction of the remaining distance per frame, so the emitter position
//! traces a smooth, lag-compensated version of the gesture regardless of
//! the sampling rate. The distance actually travelled each frame is
//! subdivided at a fixed spacing to yield spawn points, keeping trail
//! density visually uniform under fast and slow strokes alike.

use crate::config::EmitterConfig;
use egui::Vec2;
use std::collections::VecDeque;

pub struct PathFollower {
    pos: Vec2,
    prev: Vec2,
    targets: VecDeque<Vec2>,
    tracking: bool,
    last_pointer: Vec2,
    config: EmitterConfig,
}

impl PathFollower {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            pos: Vec2::ZERO,
            prev: Vec2::ZERO,
            targets: VecDeque::new(),
            tracking: false,
            last_pointer: Vec2::ZERO,
            config,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn pending_targets(&self) -> usize {
        self.targets.len()
    }

    /// Begin a gesture: the queue is reset to exactly the down-point and the
    /// emitter snaps onto it with no interpolation.
    pub fn pointer_start(&mut self, p: Vec2) {
        self.targets.clear();
        self.targets.push_back(p);
        self.pos = p;
        self.prev = p;
        self.last_pointer = p;
        self.tracking = true;
    }

    /// Append a sample to the gesture path. Points are never replaced, so
    /// the full path survives even when samples outpace frames. Ignored
    /// when no gesture is active.
    pub fn pointer_move(&mut self, p: Vec2) {
        if !self.tracking {
            return;
        }
        self.targets.push_back(p);
        self.last_pointer = p;
    }

    /// End the gesture. Queued targets keep draining on later frames so the
    /// trail finishes naturally. Safe to call repeatedly.
    pub fn pointer_end(&mut self) {
        self.tracking = false;
    }

    /// One frame of easing. Returns the points at which trail particles
    /// should spawn, evenly spaced along the segment travelled this frame.
    ///
    /// At most one target is consumed per frame: reaching a target within
    /// epsilon snaps onto it exactly and pops it, and the follower waits for
    /// the next frame before chasing the next one.
    pub fn step(&mut self, idle_hold_reseed: bool) -> Vec<Vec2> {
        if self.targets.is_empty() {
            // Stationary hold keeps the emitter sampling the held position.
            if self.tracking && idle_hold_reseed {
                self.targets.push_back(self.last_pointer);
            } else {
                return Vec::new();
            }
        }

        self.prev = self.pos;
        let target = self.targets[0];
        let delta = target - self.pos;

        if delta.length() < self.config.epsilon {
            self.pos = target;
            self.targets.pop_front();
        } else {
            self.pos += delta * self.config.ease;
        }

        let travelled = (self.pos - self.prev).length();
        if travelled <= self.config.min_travel {
            return Vec::new();
        }

        let steps = ((travelled / self.config.density).floor() as usize).max(1);
        (1..=steps)
            .map(|i| {
                let t = i as f32 / steps as f32;
                self.prev + (self.pos - self.prev) * t
            })
            .collect()
    }
}
