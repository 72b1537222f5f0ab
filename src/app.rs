//! Application state and lifecycle management.
//!
//! Owns the mixer, the tick scheduler and the row table the window renders.
//! The row table is only ever changed by mixer events and command outcomes.

use crate::audio::{level_to_percent, SessionProvider};
use crate::mixer::{CommandOutcome, Mixer, MixerListener, ProgramResolver, TickScheduler};
use crate::platform::Settings;
use std::time::Instant;

/// What the window shows for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramRow {
    /// Program display name
    pub name: String,

    /// Slider position (0-100)
    pub volume_pct: u8,

    /// Level meter fill (0-100)
    pub meter_pct: u8,

    /// Whether the mute button is lit
    pub muted: bool,
}

impl ProgramRow {
    pub fn new(name: String, volume_pct: u8) -> Self {
        Self {
            name,
            volume_pct,
            meter_pct: 0,
            muted: false,
        }
    }
}

/// Rows in the order their programs appeared.
#[derive(Debug, Clone, Default)]
pub struct ProgramRows {
    rows: Vec<ProgramRow>,
}

impl ProgramRows {
    pub fn iter(&self) -> impl Iterator<Item = &ProgramRow> {
        self.rows.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ProgramRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut ProgramRow> {
        self.rows.iter_mut().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl MixerListener for ProgramRows {
    fn on_program_created(&mut self, name: &str, initial_volume_pct: u8) {
        self.on_program_removed(name);
        self.rows
            .push(ProgramRow::new(name.to_string(), initial_volume_pct));
    }

    fn on_program_removed(&mut self, name: &str) {
        self.rows.retain(|r| r.name != name);
    }

    fn on_program_refreshed(&mut self, name: &str, volume_pct: u8, meter_pct: u8) {
        if let Some(row) = self.get_mut(name) {
            row.volume_pct = volume_pct;
            row.meter_pct = meter_pct;
            if volume_pct > 0 {
                row.muted = false;
            }
        }
    }
}

/// Actions triggered from a program row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    /// Slider moved to a 0-100 value
    SetVolume(String, u8),

    /// Mute button clicked
    ToggleMute(String),
}

/// Main application state.
pub struct AppState<P> {
    /// Session reconciliation
    pub mixer: Mixer<P>,

    /// Rows shown in the window
    pub rows: ProgramRows,

    /// User settings
    pub settings: Settings,

    /// When the next reconciliation runs
    pub scheduler: TickScheduler,

    /// Whether the application should exit
    pub should_exit: bool,
}

impl<P: SessionProvider> AppState<P> {
    /// Create the application state over a session provider.
    pub fn new(provider: P, settings: Settings) -> Self {
        let resolver = ProgramResolver::with_config(&settings.resolver);
        let scheduler = TickScheduler::new(settings.tick_interval());

        Self {
            mixer: Mixer::new(provider, resolver),
            rows: ProgramRows::default(),
            settings,
            scheduler,
            should_exit: false,
        }
    }

    /// Run a reconciliation tick if one is due. Returns whether it ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.scheduler.poll(now) {
            return false;
        }

        for event in self.mixer.reconcile() {
            tracing::debug!(?event, "mixer event");
            event.dispatch(&mut self.rows);
        }
        true
    }

    /// Apply a user action from the window.
    pub fn apply_action(&mut self, action: RowAction) {
        match action {
            RowAction::SetVolume(name, percent) => {
                let outcome = self.mixer.set_volume(&name, percent);
                if let CommandOutcome::Applied { .. } = outcome {
                    if let Some(row) = self.rows.get_mut(&name) {
                        row.volume_pct = percent.min(100);
                    }
                }
                self.apply_outcome(&name, outcome);
            }
            RowAction::ToggleMute(name) => {
                let outcome = self.mixer.toggle_mute(&name);
                if let CommandOutcome::Applied { muted } = outcome {
                    let restored = self
                        .mixer
                        .store()
                        .get(&name)
                        .map(|p| level_to_percent(p.last_nonzero_volume));
                    if let Some(row) = self.rows.get_mut(&name) {
                        row.volume_pct = if muted { 0 } else { restored.unwrap_or(100) };
                    }
                }
                self.apply_outcome(&name, outcome);
            }
        }
    }

    fn apply_outcome(&mut self, name: &str, outcome: CommandOutcome) {
        match outcome {
            CommandOutcome::Applied { muted } => {
                if let Some(row) = self.rows.get_mut(name) {
                    row.muted = muted;
                }
            }
            CommandOutcome::UnknownProgram | CommandOutcome::Removed => {
                self.rows.on_program_removed(name);
            }
        }
    }

    /// Tooltip text for the tray icon.
    pub fn tooltip(&self) -> String {
        match self.rows.len() {
            0 => "Volume Mixer".to_string(),
            1 => "Volume Mixer (1 program)".to_string(),
            n => format!("Volume Mixer ({} programs)", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::fake::{FakeProvider, FakeSession};
    use std::time::Duration;

    fn app(provider: &FakeProvider) -> AppState<FakeProvider> {
        AppState::new(provider.clone(), Settings::default())
    }

    #[test]
    fn test_rows_follow_mixer_events() {
        let provider = FakeProvider::new();
        let mut app = app(&provider);
        let start = Instant::now();
        let vlc = FakeSession::new(1, 0.7);
        let discord = FakeSession::new(2, 0.3);

        provider.set_sessions(&[("vlc.exe", &vlc), ("discord.exe", &discord)]);
        assert!(app.tick(start));
        let names: Vec<&str> = app.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Discord", "VLC"]);
        assert_eq!(app.rows.get("VLC").map(|r| r.volume_pct), Some(70));
        assert_eq!(app.tooltip(), "Volume Mixer (2 programs)");

        // Not due yet
        provider.set_sessions(&[("vlc.exe", &vlc)]);
        assert!(!app.tick(start + Duration::from_millis(500)));
        assert_eq!(app.rows.len(), 2);

        vlc.set_peak(0.5);
        assert!(app.tick(start + Duration::from_secs(1)));
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.rows.get("VLC").map(|r| r.meter_pct), Some(50));
    }

    #[test]
    fn test_mute_button_state() {
        let provider = FakeProvider::new();
        let mut app = app(&provider);
        let vlc = FakeSession::new(1, 0.7);

        provider.set_sessions(&[("vlc.exe", &vlc)]);
        app.tick(Instant::now());

        app.apply_action(RowAction::ToggleMute("VLC".to_string()));
        let row = app.rows.get("VLC").cloned().unwrap();
        assert!(row.muted);
        assert_eq!(row.volume_pct, 0);

        app.apply_action(RowAction::SetVolume("VLC".to_string(), 20));
        let row = app.rows.get("VLC").cloned().unwrap();
        assert!(!row.muted);
        assert_eq!(row.volume_pct, 20);
        assert!((vlc.current_volume() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_unmute_restores_slider() {
        let provider = FakeProvider::new();
        let mut app = app(&provider);
        let vlc = FakeSession::new(1, 0.65);

        provider.set_sessions(&[("vlc.exe", &vlc)]);
        app.tick(Instant::now());

        app.apply_action(RowAction::ToggleMute("VLC".to_string()));
        app.apply_action(RowAction::ToggleMute("VLC".to_string()));
        let row = app.rows.get("VLC").cloned().unwrap();
        assert!(!row.muted);
        assert_eq!(row.volume_pct, 65);
    }

    #[test]
    fn test_stale_command_drops_row() {
        let provider = FakeProvider::new();
        let mut app = app(&provider);
        let vlc = FakeSession::new(1, 0.7);

        provider.set_sessions(&[("vlc.exe", &vlc)]);
        app.tick(Instant::now());

        vlc.expire();
        app.apply_action(RowAction::SetVolume("VLC".to_string(), 10));
        assert!(app.rows.is_empty());
        assert!(app.mixer.store().is_empty());
    }

    #[test]
    fn test_settings_feed_resolver() {
        let provider = FakeProvider::new();
        let mut settings = Settings::default();
        settings.resolver.excluded.push("vlc.exe".to_string());
        let mut app = AppState::new(provider.clone(), settings);
        let vlc = FakeSession::new(1, 0.7);

        provider.set_sessions(&[("vlc.exe", &vlc)]);
        app.tick(Instant::now());
        assert!(app.rows.is_empty());
        assert_eq!(app.tooltip(), "Volume Mixer");
    }
}
