//! Scriptable in-memory session provider for tests.

use crate::audio::{
    AudioError, AudioSession, PeakMeter, SessionProcess, SessionProvider, VolumeControl,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
struct SessionState {
    volume: f32,
    peak: f32,
    expired: bool,
    volume_writes: usize,
}

/// OS-side state of one fake audio session, shared with its handles.
#[derive(Debug, Clone)]
pub struct FakeSession {
    pub pid: u32,
    state: Rc<RefCell<SessionState>>,
}

impl FakeSession {
    pub fn new(pid: u32, volume: f32) -> Self {
        Self {
            pid,
            state: Rc::new(RefCell::new(SessionState {
                volume,
                peak: 0.0,
                expired: false,
                volume_writes: 0,
            })),
        }
    }

    pub fn volume(&self) -> FakeVolume {
        FakeVolume(Rc::clone(&self.state))
    }

    pub fn meter(&self) -> FakeMeter {
        FakeMeter(Rc::clone(&self.state))
    }

    /// Current OS volume.
    pub fn current_volume(&self) -> f32 {
        self.state.borrow().volume
    }

    /// Change the volume as another application would.
    pub fn set_external_volume(&self, volume: f32) {
        self.state.borrow_mut().volume = volume;
    }

    pub fn set_peak(&self, peak: f32) {
        self.state.borrow_mut().peak = peak;
    }

    /// Make every handle of this session fail from now on.
    pub fn expire(&self) {
        self.state.borrow_mut().expired = true;
    }

    /// Number of volume writes made through any handle.
    pub fn volume_writes(&self) -> usize {
        self.state.borrow().volume_writes
    }
}

pub struct FakeVolume(Rc<RefCell<SessionState>>);

impl VolumeControl for FakeVolume {
    fn volume(&self) -> Result<f32, AudioError> {
        let state = self.0.borrow();
        if state.expired {
            return Err(AudioError::SessionExpired);
        }
        Ok(state.volume)
    }

    fn set_volume(&self, level: f32) -> Result<(), AudioError> {
        let mut state = self.0.borrow_mut();
        if state.expired {
            return Err(AudioError::SessionExpired);
        }
        state.volume = level.clamp(0.0, 1.0);
        state.volume_writes += 1;
        Ok(())
    }
}

pub struct FakeMeter(Rc<RefCell<SessionState>>);

impl PeakMeter for FakeMeter {
    fn peak(&self) -> Result<f32, AudioError> {
        let state = self.0.borrow();
        if state.expired {
            return Err(AudioError::SessionExpired);
        }
        Ok(state.peak)
    }
}

#[derive(Debug, Default)]
struct ProviderState {
    sessions: Vec<(Option<String>, FakeSession)>,
    failures: usize,
    queries: usize,
}

/// Session provider whose session list is set by the test between ticks.
#[derive(Debug, Clone, Default)]
pub struct FakeProvider {
    state: Rc<RefCell<ProviderState>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the listed sessions with `(process name, session)` pairs.
    pub fn set_sessions(&self, sessions: &[(&str, &FakeSession)]) {
        self.state.borrow_mut().sessions = sessions
            .iter()
            .map(|(name, session)| (Some(name.to_string()), (*session).clone()))
            .collect();
    }

    /// Add a session with no process binding (system sounds).
    pub fn add_system_session(&self, session: &FakeSession) {
        self.state
            .borrow_mut()
            .sessions
            .push((None, session.clone()));
    }

    /// Make the next `count` queries fail.
    pub fn fail_queries(&self, count: usize) {
        self.state.borrow_mut().failures = count;
    }

    pub fn queries(&self) -> usize {
        self.state.borrow().queries
    }
}

impl SessionProvider for FakeProvider {
    fn list_sessions(&self) -> Result<Vec<AudioSession>, AudioError> {
        let mut state = self.state.borrow_mut();
        state.queries += 1;
        if state.failures > 0 {
            state.failures -= 1;
            return Err(AudioError::NoDefaultDevice);
        }

        Ok(state
            .sessions
            .iter()
            .map(|(name, session)| {
                let process = name.as_ref().map(|name| SessionProcess {
                    name: name.clone(),
                    id: session.pid,
                });
                AudioSession::new(process, Box::new(session.volume()), Box::new(session.meter()))
            })
            .collect())
    }
}
