//! Events emitted by the mixer for the UI.

/// Change to the set of displayed programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixerEvent {
    /// A program appeared; build a row with the slider at `volume_pct`
    Created { name: String, volume_pct: u8 },

    /// A program disappeared; drop its row
    Removed { name: String },

    /// Current volume and peak level of a shown program
    Refreshed {
        name: String,
        volume_pct: u8,
        meter_pct: u8,
    },
}

impl MixerEvent {
    /// Display name of the program this event is about.
    pub fn name(&self) -> &str {
        match self {
            MixerEvent::Created { name, .. }
            | MixerEvent::Removed { name }
            | MixerEvent::Refreshed { name, .. } => name,
        }
    }

    /// Deliver this event to the matching listener callback.
    pub fn dispatch<L: MixerListener + ?Sized>(self, listener: &mut L) {
        match self {
            MixerEvent::Created { name, volume_pct } => {
                listener.on_program_created(&name, volume_pct)
            }
            MixerEvent::Removed { name } => listener.on_program_removed(&name),
            MixerEvent::Refreshed {
                name,
                volume_pct,
                meter_pct,
            } => listener.on_program_refreshed(&name, volume_pct, meter_pct),
        }
    }
}

/// Receiver of mixer events, typically the UI row table.
pub trait MixerListener {
    fn on_program_created(&mut self, name: &str, initial_volume_pct: u8);

    fn on_program_removed(&mut self, name: &str);

    fn on_program_refreshed(&mut self, name: &str, volume_pct: u8, meter_pct: u8);
}
