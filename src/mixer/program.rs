//! Program state store.
//!
//! A program is the user-facing aggregate of every audio session whose
//! process resolves to the same display name.

use crate::audio::{PeakMeter, VolumeControl};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Volume restored by unmute when nothing was recorded yet.
pub const DEFAULT_RESTORE_VOLUME: f32 = 1.0;

/// A program with the session handles acquired on the latest tick.
pub struct Program {
    /// Display name (store key)
    pub name: String,

    /// Volume control of the representative session
    pub volume: Box<dyn VolumeControl>,

    /// Peak meter of the representative session
    pub meter: Box<dyn PeakMeter>,

    /// Process backing `volume` and `meter`
    pub representative_pid: u32,

    /// Volume to restore on unmute, recorded right before muting
    pub last_nonzero_volume: f32,

    /// Whether the mixer muted this program
    pub muted: bool,

    /// Live processes resolving to this program
    pub member_pids: BTreeSet<u32>,
}

impl Program {
    /// Create a new Program from one representative session's handles.
    pub fn new(
        name: String,
        volume: Box<dyn VolumeControl>,
        meter: Box<dyn PeakMeter>,
        representative_pid: u32,
        member_pids: BTreeSet<u32>,
    ) -> Self {
        Self {
            name,
            volume,
            meter,
            representative_pid,
            last_nonzero_volume: DEFAULT_RESTORE_VOLUME,
            muted: false,
            member_pids,
        }
    }

    /// Replace the session handles with ones acquired on the current tick.
    pub fn refresh_handles(
        &mut self,
        volume: Box<dyn VolumeControl>,
        meter: Box<dyn PeakMeter>,
        representative_pid: u32,
    ) {
        self.volume = volume;
        self.meter = meter;
        self.representative_pid = representative_pid;
    }

    /// Whether any of the given processes is already a member.
    pub fn shares_member(&self, pids: &BTreeSet<u32>) -> bool {
        !self.member_pids.is_disjoint(pids)
    }
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("name", &self.name)
            .field("representative_pid", &self.representative_pid)
            .field("last_nonzero_volume", &self.last_nonzero_volume)
            .field("muted", &self.muted)
            .field("member_pids", &self.member_pids)
            .finish_non_exhaustive()
    }
}

/// All programs currently shown, keyed by display name.
#[derive(Debug, Default)]
pub struct ProgramStore {
    programs: HashMap<String, Program>,

    /// Process IDs seen on the last committed tick
    live_pids: HashSet<u32>,
}

impl ProgramStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Program> {
        self.programs.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Program> {
        self.programs.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.programs.contains_key(name)
    }

    /// Register a program, replacing any previous one with the same name.
    pub fn insert(&mut self, program: Program) {
        self.programs.insert(program.name.clone(), program);
    }

    /// Remove a program and everything derived from it.
    pub fn remove(&mut self, name: &str) -> Option<Program> {
        self.programs.remove(name)
    }

    /// Display names of all programs, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.programs.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Process IDs seen on the last committed tick.
    pub fn live_pids(&self) -> &HashSet<u32> {
        &self.live_pids
    }

    /// Replace the tracked live process set.
    pub fn set_live_pids(&mut self, pids: HashSet<u32>) {
        self.live_pids = pids;
    }
}
