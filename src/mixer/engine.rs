//! Session reconciliation.
//!
//! Each tick re-reads the live session list, groups sessions into programs,
//! diffs that against the programs already shown and reports the difference
//! as `MixerEvent`s. All session reads of a tick happen before the store is
//! touched, so a tick either commits completely or not at all.

use super::events::MixerEvent;
use super::program::{Program, ProgramStore};
use super::resolver::{ProgramResolver, Resolution};
use crate::audio::{level_to_percent, AudioError, AudioSession, SessionProvider};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Reconciles OS audio sessions with the displayed programs.
pub struct Mixer<P> {
    pub(super) provider: P,
    pub(super) resolver: ProgramResolver,
    pub(super) store: ProgramStore,
}

/// Sessions of one display name seen on the current tick.
struct LiveProgram {
    pids: BTreeSet<u32>,

    /// Candidate representatives as (rank, pid, session), best first
    sessions: Vec<(u8, u32, AudioSession)>,
}

/// The session a program takes its handles from on this tick.
struct Representative {
    pids: BTreeSet<u32>,
    pid: u32,
    session: AudioSession,
}

impl LiveProgram {
    /// Pick the first session, in preference order, that `read` succeeds on.
    ///
    /// Fails only when every session of the program fails.
    fn choose<T>(
        self,
        name: &str,
        read: impl Fn(&AudioSession) -> Result<T, AudioError>,
    ) -> Result<(Representative, T), AudioError> {
        let LiveProgram { pids, sessions } = self;
        let mut last_error = AudioError::SessionExpired;

        for (_, pid, session) in sessions {
            match read(&session) {
                Ok(value) => return Ok((Representative { pids, pid, session }, value)),
                Err(e) => {
                    tracing::debug!(program = %name, pid, error = %e, "session unreadable, trying next");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

/// Store change decided while reading, applied on commit.
enum Step {
    Remove(String),
    Create {
        name: String,
        representative: Representative,
        volume_pct: u8,
    },
    Refresh {
        name: String,
        representative: Representative,
        volume_pct: u8,
        meter_pct: u8,
    },
}

impl<P: SessionProvider> Mixer<P> {
    /// Create a new Mixer with an empty program store.
    pub fn new(provider: P, resolver: ProgramResolver) -> Self {
        Self {
            provider,
            resolver,
            store: ProgramStore::new(),
        }
    }

    /// Programs currently shown.
    pub fn store(&self) -> &ProgramStore {
        &self.store
    }

    /// Run one reconciliation tick and return the resulting events.
    ///
    /// Removals come first, then creations, then refreshes. A program is
    /// not refreshed on the tick that created it.
    pub fn reconcile(&mut self) -> Vec<MixerEvent> {
        let sessions = match self.provider.list_sessions() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(error = %e, "session query failed, skipping tick");
                return Vec::new();
            }
        };

        let live = self.group_sessions(sessions);
        let live_pids: HashSet<u32> = live.values().flat_map(|p| p.pids.iter().copied()).collect();
        let steps = self.plan(live);
        let events = self.commit(steps);
        self.store.set_live_pids(live_pids);

        events
    }

    /// Resolve every session and group them by display name.
    fn group_sessions(&self, sessions: Vec<AudioSession>) -> BTreeMap<String, LiveProgram> {
        let mut live: BTreeMap<String, LiveProgram> = BTreeMap::new();

        for session in sessions {
            let Some(process) = session.process.clone() else {
                continue;
            };

            let name = match self.resolver.resolve(&process.name) {
                Resolution::Program(name) => name,
                Resolution::Excluded => {
                    tracing::trace!(process = %process.name, "excluded process");
                    continue;
                }
            };

            let rank = self.representative_rank(&name, process.id);
            let entry = live.entry(name).or_insert_with(|| LiveProgram {
                pids: BTreeSet::new(),
                sessions: Vec::new(),
            });
            entry.pids.insert(process.id);
            entry.sessions.push((rank, process.id, session));
        }

        // Stable, so equal ranks keep enumeration order
        for entry in live.values_mut() {
            entry.sessions.sort_by_key(|(rank, _, _)| *rank);
        }

        live
    }

    /// Preference for taking a program's handles from this process.
    ///
    /// Lower is better: the previous representative, then any previous
    /// member, then anything else in enumeration order.
    fn representative_rank(&self, name: &str, pid: u32) -> u8 {
        match self.store.get(name) {
            Some(program) if program.representative_pid == pid => 0,
            Some(program) if program.member_pids.contains(&pid) => 1,
            _ => 2,
        }
    }

    /// Decide every store change of this tick, reading session state only.
    fn plan(&self, mut live: BTreeMap<String, LiveProgram>) -> Vec<Step> {
        let mut steps = Vec::new();

        for name in self.store.names() {
            let continuing = match (self.store.get(&name), live.get(&name)) {
                (Some(program), Some(entry)) => program.shares_member(&entry.pids),
                _ => false,
            };

            if !continuing {
                // Either gone, or only new processes now resolve to this
                // name; the latter gets a fresh program below.
                tracing::debug!(program = %name, "program ended");
                steps.push(Step::Remove(name));
                continue;
            }

            let Some(entry) = live.remove(&name) else {
                continue;
            };
            let levels = entry.choose(&name, |session| {
                Ok((session.volume.volume()?, session.meter.peak()?))
            });

            match levels {
                Ok((representative, (volume, peak))) => steps.push(Step::Refresh {
                    name,
                    representative,
                    volume_pct: level_to_percent(volume),
                    meter_pct: level_to_percent(peak),
                }),
                Err(e) => {
                    tracing::warn!(program = %name, error = %e, "stale session handles, removing program");
                    steps.push(Step::Remove(name));
                }
            }
        }

        for (name, entry) in live {
            match entry.choose(&name, |session| session.volume.volume()) {
                Ok((representative, volume)) => steps.push(Step::Create {
                    name,
                    representative,
                    volume_pct: level_to_percent(volume),
                }),
                Err(e) => {
                    tracing::debug!(program = %name, error = %e, "sessions vanished before creation");
                }
            }
        }

        steps
    }

    /// Apply the planned steps to the store, producing events in order.
    fn commit(&mut self, steps: Vec<Step>) -> Vec<MixerEvent> {
        let mut removals = Vec::new();
        let mut creations = Vec::new();
        let mut refreshes = Vec::new();

        for step in steps {
            match step {
                Step::Remove(name) => removals.push(name),
                Step::Create {
                    name,
                    representative,
                    volume_pct,
                } => creations.push((name, representative, volume_pct)),
                Step::Refresh {
                    name,
                    representative,
                    volume_pct,
                    meter_pct,
                } => refreshes.push((name, representative, volume_pct, meter_pct)),
            }
        }

        let mut events = Vec::with_capacity(removals.len() + creations.len() + refreshes.len());

        for name in removals {
            self.store.remove(&name);
            events.push(MixerEvent::Removed { name });
        }

        for (name, representative, volume_pct) in creations {
            tracing::debug!(program = %name, pids = ?representative.pids, "program started");
            let Representative { pids, pid, session } = representative;
            let AudioSession { volume, meter, .. } = session;
            self.store
                .insert(Program::new(name.clone(), volume, meter, pid, pids));
            events.push(MixerEvent::Created { name, volume_pct });
        }

        for (name, representative, volume_pct, meter_pct) in refreshes {
            if let Some(program) = self.store.get_mut(&name) {
                let Representative { pids, pid, session } = representative;
                let AudioSession { volume, meter, .. } = session;
                program.refresh_handles(volume, meter, pid);
                program.member_pids = pids;
                if volume_pct > 0 {
                    program.muted = false;
                }
            }
            events.push(MixerEvent::Refreshed {
                name,
                volume_pct,
                meter_pct,
            });
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::fake::{FakeProvider, FakeSession};

    fn mixer(provider: &FakeProvider) -> Mixer<FakeProvider> {
        Mixer::new(provider.clone(), ProgramResolver::new())
    }

    fn created(name: &str, volume_pct: u8) -> MixerEvent {
        MixerEvent::Created {
            name: name.to_string(),
            volume_pct,
        }
    }

    fn removed(name: &str) -> MixerEvent {
        MixerEvent::Removed {
            name: name.to_string(),
        }
    }

    fn refreshed(name: &str, volume_pct: u8, meter_pct: u8) -> MixerEvent {
        MixerEvent::Refreshed {
            name: name.to_string(),
            volume_pct,
            meter_pct,
        }
    }

    #[test]
    fn test_chrome_lifecycle() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let tab = FakeSession::new(100, 0.5);
        let gpu = FakeSession::new(101, 0.5);

        provider.set_sessions(&[("chrome.exe", &tab), ("chrome.exe", &gpu)]);
        assert_eq!(mixer.reconcile(), vec![created("chrome", 50)]);
        let chrome = mixer.store().get("chrome").expect("chrome is shown");
        assert_eq!(chrome.member_pids, BTreeSet::from([100, 101]));

        gpu.set_peak(0.25);
        provider.set_sessions(&[("chrome.exe", &gpu)]);
        assert_eq!(mixer.reconcile(), vec![refreshed("chrome", 50, 25)]);
        let chrome = mixer.store().get("chrome").expect("chrome still shown");
        assert_eq!(chrome.member_pids, BTreeSet::from([101]));
        assert_eq!(chrome.representative_pid, 101);

        provider.set_sessions(&[]);
        assert_eq!(mixer.reconcile(), vec![removed("chrome")]);
        assert!(mixer.store().is_empty());

        // Nothing left to report
        assert!(mixer.reconcile().is_empty());
    }

    #[test]
    fn test_excluded_sessions_never_create_programs() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let avast = FakeSession::new(10, 1.0);
        let audiodg = FakeSession::new(11, 1.0);

        provider.set_sessions(&[("avastUI.exe", &avast), ("audiodg.exe", &audiodg)]);
        for _ in 0..3 {
            assert!(mixer.reconcile().is_empty());
        }
        assert!(mixer.store().is_empty());
        assert!(mixer.store().live_pids().is_empty());
    }

    #[test]
    fn test_renamed_processes_merge_into_one_program() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let client = FakeSession::new(20, 0.8);
        let meeting = FakeSession::new(21, 0.8);
        let webview = FakeSession::new(22, 0.8);

        provider.set_sessions(&[
            ("Zoom.exe", &client),
            ("zoommeeting.exe", &meeting),
            ("zWebview2Agent.exe", &webview),
        ]);

        assert_eq!(mixer.reconcile(), vec![created("Zoom", 80)]);
        let zoom = mixer.store().get("Zoom").expect("zoom is shown");
        assert_eq!(zoom.member_pids, BTreeSet::from([20, 21, 22]));
        assert_eq!(mixer.store().len(), 1);
    }

    #[test]
    fn test_system_session_is_skipped() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let system = FakeSession::new(0, 1.0);

        provider.add_system_session(&system);
        assert!(mixer.reconcile().is_empty());
        assert!(mixer.store().is_empty());
    }

    #[test]
    fn test_query_failure_commits_nothing() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let vlc = FakeSession::new(30, 0.4);

        provider.set_sessions(&[("vlc.exe", &vlc)]);
        assert_eq!(mixer.reconcile(), vec![created("VLC", 40)]);

        provider.set_sessions(&[]);
        provider.fail_queries(1);
        assert!(mixer.reconcile().is_empty());
        assert!(mixer.store().contains("VLC"));
        assert_eq!(mixer.store().live_pids(), &HashSet::from([30]));

        // The next successful tick catches up
        assert_eq!(mixer.reconcile(), vec![removed("VLC")]);
        assert_eq!(provider.queries(), 3);
    }

    #[test]
    fn test_process_turnover_recreates_program() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let first = FakeSession::new(40, 0.6);
        let second = FakeSession::new(41, 0.9);

        provider.set_sessions(&[("discord.exe", &first)]);
        assert_eq!(mixer.reconcile(), vec![created("Discord", 60)]);

        provider.set_sessions(&[("discord.exe", &second)]);
        assert_eq!(
            mixer.reconcile(),
            vec![removed("Discord"), created("Discord", 90)]
        );
        let discord = mixer.store().get("Discord").expect("recreated");
        assert_eq!(discord.member_pids, BTreeSet::from([41]));
    }

    #[test]
    fn test_stale_handle_removes_program() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let spotify = FakeSession::new(50, 0.7);

        provider.set_sessions(&[("Spotify.exe", &spotify)]);
        assert_eq!(mixer.reconcile(), vec![created("spotify", 70)]);

        spotify.expire();
        assert_eq!(mixer.reconcile(), vec![removed("spotify")]);
        assert!(!mixer.store().contains("spotify"));

        // Still listed but unusable: never created
        assert!(mixer.reconcile().is_empty());
    }

    #[test]
    fn test_stale_representative_falls_back_to_sibling() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let tab = FakeSession::new(100, 0.5);
        let gpu = FakeSession::new(101, 0.5);

        provider.set_sessions(&[("chrome.exe", &tab), ("chrome.exe", &gpu)]);
        assert_eq!(mixer.reconcile(), vec![created("chrome", 50)]);
        assert_eq!(mixer.store().get("chrome").map(|p| p.representative_pid), Some(100));

        // The representative dies while its sibling keeps playing
        tab.expire();
        gpu.set_peak(0.4);
        assert_eq!(mixer.reconcile(), vec![refreshed("chrome", 50, 40)]);
        let chrome = mixer.store().get("chrome").expect("chrome still shown");
        assert_eq!(chrome.representative_pid, 101);
        assert_eq!(chrome.member_pids, BTreeSet::from([100, 101]));

        assert_eq!(mixer.reconcile(), vec![refreshed("chrome", 50, 40)]);
    }

    #[test]
    fn test_creation_skips_unreadable_session() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let dead = FakeSession::new(110, 0.9);
        let alive = FakeSession::new(111, 0.3);

        dead.expire();
        provider.set_sessions(&[("chrome.exe", &dead), ("chrome.exe", &alive)]);
        assert_eq!(mixer.reconcile(), vec![created("chrome", 30)]);
        let chrome = mixer.store().get("chrome").expect("chrome is shown");
        assert_eq!(chrome.representative_pid, 111);
    }

    #[test]
    fn test_all_sessions_stale_removes_program() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let tab = FakeSession::new(120, 0.5);
        let gpu = FakeSession::new(121, 0.5);

        provider.set_sessions(&[("chrome.exe", &tab), ("chrome.exe", &gpu)]);
        mixer.reconcile();

        tab.expire();
        gpu.expire();
        assert_eq!(mixer.reconcile(), vec![removed("chrome")]);
        assert!(mixer.reconcile().is_empty());

        // A fresh process brings it back
        let restarted = FakeSession::new(122, 0.7);
        provider.set_sessions(&[("chrome.exe", &tab), ("chrome.exe", &restarted)]);
        assert_eq!(mixer.reconcile(), vec![created("chrome", 70)]);
    }

    #[test]
    fn test_external_volume_change_is_reported() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let steam = FakeSession::new(60, 1.0);

        provider.set_sessions(&[("steamwebhelper.exe", &steam)]);
        mixer.reconcile();

        steam.set_external_volume(0.33);
        steam.set_peak(0.9);
        assert_eq!(mixer.reconcile(), vec![refreshed("Steam", 33, 90)]);
    }

    #[test]
    fn test_representative_sticks_to_previous_process() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let main = FakeSession::new(70, 0.5);
        let helper = FakeSession::new(71, 0.2);

        provider.set_sessions(&[("opera.exe", &main)]);
        mixer.reconcile();

        // The helper is listed first but the original process is still alive
        provider.set_sessions(&[("opera.exe", &helper), ("opera.exe", &main)]);
        assert_eq!(mixer.reconcile(), vec![refreshed("Opera", 50, 0)]);
        let opera = mixer.store().get("Opera").expect("opera is shown");
        assert_eq!(opera.representative_pid, 70);
        assert_eq!(opera.member_pids, BTreeSet::from([70, 71]));
    }

    #[test]
    fn test_no_refresh_after_removal_without_creation() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let vlc = FakeSession::new(80, 0.5);
        let potplayer = FakeSession::new(81, 0.5);

        let script: Vec<Vec<(&str, &FakeSession)>> = vec![
            vec![("vlc.exe", &vlc), ("potplayer.exe", &potplayer)],
            vec![("potplayer.exe", &potplayer)],
            vec![("potplayer.exe", &potplayer)],
            vec![("vlc.exe", &vlc)],
            vec![],
        ];

        let mut shown: HashSet<String> = HashSet::new();
        for tick in script {
            provider.set_sessions(&tick);
            for event in mixer.reconcile() {
                match &event {
                    MixerEvent::Created { name, .. } => assert!(shown.insert(name.clone())),
                    MixerEvent::Removed { name } => assert!(shown.remove(name)),
                    MixerEvent::Refreshed { name, .. } => assert!(shown.contains(name)),
                }
            }
        }
        assert!(shown.is_empty());
    }

    #[test]
    fn test_external_unmute_clears_mute_mark() {
        let provider = FakeProvider::new();
        let mut mixer = mixer(&provider);
        let teams = FakeSession::new(90, 0.6);

        provider.set_sessions(&[("Teams.exe", &teams)]);
        mixer.reconcile();
        mixer.toggle_mute("Microsoft Teams");
        assert!(mixer.store().get("Microsoft Teams").map_or(false, |p| p.muted));

        teams.set_external_volume(0.4);
        mixer.reconcile();
        assert!(!mixer.store().get("Microsoft Teams").map_or(true, |p| p.muted));
    }
}
