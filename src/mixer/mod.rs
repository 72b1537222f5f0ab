//! Mixer core: groups audio sessions into programs and keeps them in sync.
//!
//! `Mixer::reconcile` is called once per tick (see `TickScheduler`) and
//! reports what changed as `MixerEvent`s; `set_volume` and `toggle_mute`
//! apply user input between ticks.

pub mod commands;
pub mod engine;
pub mod events;
#[cfg(test)]
pub(crate) mod fake;
pub mod program;
pub mod resolver;
pub mod scheduler;

pub use commands::CommandOutcome;
pub use engine::Mixer;
pub use events::{MixerEvent, MixerListener};
pub use program::{Program, ProgramStore};
pub use resolver::{ProgramResolver, Resolution, ResolverConfig};
pub use scheduler::TickScheduler;
