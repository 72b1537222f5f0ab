//! Process name to program name resolution.
//!
//! Maps the executable name behind an audio session to the display name of
//! the program it belongs to. Several executables of one product (helper
//! processes, meeting clients) share a display name through the rename table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Characters that end the meaningful part of a process name.
const NAME_TERMINATORS: &[char] = &['.', ',', '(', ')'];

/// Built-in rename table: lower-cased process name to display name.
const DEFAULT_RENAMES: &[(&str, &str)] = &[
    ("vlc.exe", "VLC"),
    ("wmplayer.exe", "Windows Media Player"),
    ("itunes.exe", "iTunes"),
    ("potplayer.exe", "PotPlayer"),
    ("mpc-hc.exe", "Media Player"),
    ("zoom.exe", "Zoom"),
    ("zoommeeting.exe", "Zoom"),
    ("zwebview2agent", "Zoom"),
    ("microsoftedge.exe", "Edge"),
    ("teams.exe", "Microsoft Teams"),
    ("word.exe", "Microsoft Word"),
    ("excel.exe", "Microsoft Excel"),
    ("powerpoint.exe", "PowerPoint"),
    ("whatsapp.exe", "WhatsApp"),
    ("whatsappvoip.exe", "WhatsApp"),
    ("steamwebhelper.exe", "Steam"),
    ("discord.exe", "Discord"),
    ("opera.exe", "Opera"),
];

/// Built-in exclusion list: processes that never get a row.
const DEFAULT_EXCLUDED: &[&str] = &[
    "audiodg.exe",
    "explorer.exe",
    "sndvol.exe",
    "searchui.exe",
    "svchost.exe",
    "avastui.exe",
    "avgui.exe",
    "onedrive.exe",
    "dropbox.exe",
    "googledrivesync.exe",
    "steelseriessonar.exe",
    "steelseriesengine.exe",
    "steelseriesprism.exe",
];

/// Outcome of resolving a process name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The process belongs to the program with this display name
    Program(String),

    /// The process is on the exclusion list (or has no usable name)
    Excluded,
}

/// Rename and exclusion tables, as stored in the settings file.
///
/// Entries from the file are merged over the built-in tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Process (or cleaned) name to display name
    pub renames: BTreeMap<String, String>,

    /// Process names that never produce a program
    pub excluded: Vec<String>,
}

/// Resolves raw process names to program display names.
#[derive(Debug, Clone)]
pub struct ProgramResolver {
    renames: HashMap<String, String>,
    excluded: HashSet<String>,
}

impl ProgramResolver {
    /// Create a resolver with the built-in tables.
    pub fn new() -> Self {
        Self {
            renames: DEFAULT_RENAMES
                .iter()
                .map(|(raw, display)| (raw.to_string(), display.to_string()))
                .collect(),
            excluded: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a resolver with the built-in tables extended by `config`.
    pub fn with_config(config: &ResolverConfig) -> Self {
        let mut resolver = Self::new();
        for (raw, display) in &config.renames {
            resolver
                .renames
                .insert(raw.to_lowercase(), display.clone());
        }
        resolver
            .excluded
            .extend(config.excluded.iter().map(|s| s.to_lowercase()));
        resolver
    }

    /// Resolve a process name to its program.
    ///
    /// The rename table is consulted twice: first with the raw executable
    /// name, then with the cleaned name when the raw name had no entry.
    pub fn resolve(&self, process_name: &str) -> Resolution {
        let raw = process_name.trim().to_lowercase();

        if self.excluded.contains(&raw) {
            return Resolution::Excluded;
        }

        if let Some(display) = self.renames.get(&raw) {
            return Resolution::Program(display.clone());
        }

        let cleaned = clean_name(&raw);
        if cleaned.is_empty() {
            return Resolution::Excluded;
        }

        match self.renames.get(cleaned) {
            Some(display) => Resolution::Program(display.clone()),
            None => Resolution::Program(cleaned.to_string()),
        }
    }
}

impl Default for ProgramResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip everything from the first `.`, `,` or parenthesis onwards.
pub fn clean_name(name: &str) -> &str {
    name.split(NAME_TERMINATORS).next().unwrap_or_default().trim()
}
