//! User commands: volume changes and mute toggling.
//!
//! Commands always read the volume back from the session rather than from
//! cached state, so a change made by another application between ticks is
//! respected.

use super::engine::Mixer;
use crate::audio::{AudioError, SessionProvider};

/// Result of a user command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The volume was written; `muted` is the program's mute mark afterwards
    Applied { muted: bool },

    /// No program with that name is shown
    UnknownProgram,

    /// The program's session is gone and the program was removed
    Removed,
}

impl<P: SessionProvider> Mixer<P> {
    /// Set a program's volume from a 0..=100 slider value.
    pub fn set_volume(&mut self, name: &str, percent: u8) -> CommandOutcome {
        let Some(program) = self.store.get_mut(name) else {
            tracing::debug!(program = %name, "set_volume for unknown program");
            return CommandOutcome::UnknownProgram;
        };

        let level = f32::from(percent.min(100)) / 100.0;
        if let Err(e) = program.volume.set_volume(level) {
            return self.drop_stale(name, e);
        }

        if percent > 0 {
            program.muted = false;
        }
        CommandOutcome::Applied {
            muted: program.muted,
        }
    }

    /// Mute a program, or restore the volume it had before it was muted.
    pub fn toggle_mute(&mut self, name: &str) -> CommandOutcome {
        let Some(program) = self.store.get_mut(name) else {
            tracing::debug!(program = %name, "toggle_mute for unknown program");
            return CommandOutcome::UnknownProgram;
        };

        let current = match program.volume.volume() {
            Ok(volume) => volume,
            Err(e) => return self.drop_stale(name, e),
        };

        let written = if current > 0.0 {
            program.last_nonzero_volume = current;
            program.volume.set_volume(0.0).map(|()| true)
        } else {
            program
                .volume
                .set_volume(program.last_nonzero_volume)
                .map(|()| false)
        };

        match written {
            Ok(muted) => {
                program.muted = muted;
                tracing::debug!(program = %name, muted, "toggled mute");
                CommandOutcome::Applied { muted }
            }
            Err(e) => self.drop_stale(name, e),
        }
    }

    fn drop_stale(&mut self, name: &str, error: AudioError) -> CommandOutcome {
        tracing::warn!(program = %name, error = %error, "stale session handle, removing program");
        self.store.remove(name);
        CommandOutcome::Removed
    }
}
