#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "volume_mixer_rs=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use eframe::egui;
    use volume_mixer_rs::audio::{ComGuard, SessionEnumerator};
    use volume_mixer_rs::platform::StartupRegistration;
    use volume_mixer_rs::{AppState, MixerWindow, Settings, SettingsFile};

    init_tracing();

    let _com = ComGuard::new().context("COM initialization failed")?;

    let (settings, settings_file) = match SettingsFile::new() {
        Ok(file) => match file.load_or_backup() {
            Ok(settings) => (settings, Some(file)),
            Err(e) => {
                // Leave the existing file untouched
                tracing::warn!(error = %e, "using default settings, changes will not be saved");
                (Settings::default(), None)
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "settings will not be persisted");
            (Settings::default(), None)
        }
    };

    if settings.start_with_windows {
        if let Err(e) = StartupRegistration::new().set_enabled(true) {
            tracing::warn!(error = %e, "failed to register startup entry");
        }
    }

    let enumerator = SessionEnumerator::new().context("audio session enumerator unavailable")?;

    let mut viewport = egui::ViewportBuilder::default()
        .with_title("Volume Mixer")
        .with_decorations(false)
        .with_transparent(true)
        .with_inner_size([470.0, 200.0]);
    if let Some(geometry) = settings.window {
        viewport = viewport
            .with_position([geometry.x, geometry.y])
            .with_inner_size([geometry.width, geometry.height]);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    tracing::info!(interval = ?settings.tick_interval(), "starting volume mixer");
    let app = AppState::new(enumerator, settings);

    eframe::run_native(
        "Volume Mixer",
        options,
        Box::new(move |cc| Ok(Box::new(MixerWindow::new(cc, app, settings_file)))),
    )
    .map_err(|e| anyhow::anyhow!("window loop failed: {e}"))
}

#[cfg(not(windows))]
fn main() -> anyhow::Result<()> {
    init_tracing();
    tracing::error!("volume-mixer-rs requires Windows");
    anyhow::bail!("unsupported platform")
}
