//! Stardust Studio RS
//!
//! Decorative particle animation: ambient drifting stardust plus
//! pointer-driven trail and spark bursts, simulated and rasterized on a
//! dedicated worker thread. The host binds a shared surface once at init,
//! forwards pointer/resize/theme events over a channel and blits the
//! presented frames.

pub mod config;
pub mod emitter;
pub mod particles;
pub mod surface;
pub mod worker;

pub use config::{EmitterConfig, EngineConfig, PolicySet, Theme, VelocityModel};
pub use emitter::PathFollower;
pub use particles::{Particle, ParticleEngine, Stardust, StardustField};
pub use surface::{FrameSurface, SharedSurface};
pub use worker::{run_worker, spawn_worker, SimulationContext, WorkerEvent};
