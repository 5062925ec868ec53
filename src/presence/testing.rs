//! Scripted presence session for tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{PresenceSession, SessionError};
use crate::playback::DisplayActivity;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect(String),
    Disconnect,
    Publish(DisplayActivity),
}

/// Fake session whose calls succeed unless a failure was queued for them.
///
/// Clones share the same call log and scripts, so a test can keep one
/// handle while the publisher owns another.
#[derive(Clone, Default)]
pub struct FakeSession {
    inner: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    connect_results: VecDeque<Result<(), String>>,
    disconnect_results: VecDeque<Result<(), String>>,
    publish_results: VecDeque<Result<(), String>>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_connect(&self, times: usize) -> &Self {
        let mut state = self.inner.lock().unwrap();
        state
            .connect_results
            .extend((0..times).map(|_| Err("connect refused".to_string())));
        self
    }

    pub fn fail_disconnect(&self, times: usize) -> &Self {
        let mut state = self.inner.lock().unwrap();
        state
            .disconnect_results
            .extend((0..times).map(|_| Err("pipe closed".to_string())));
        self
    }

    pub fn fail_publish(&self, times: usize) -> &Self {
        let mut state = self.inner.lock().unwrap();
        state
            .publish_results
            .extend((0..times).map(|_| Err("pipe closed".to_string())));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn published(&self) -> Vec<DisplayActivity> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Publish(activity) => Some(activity),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(*call)).count()
    }
}

impl PresenceSession for FakeSession {
    fn name(&self) -> &'static str {
        "Fake"
    }

    fn connect(&mut self, client_id: &str) -> Result<(), SessionError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(Call::Connect(client_id.to_string()));
        match state.connect_results.pop_front() {
            Some(Err(e)) => Err(SessionError::Unavailable(e)),
            _ => Ok(()),
        }
    }

    fn disconnect(&mut self) -> Result<(), SessionError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(Call::Disconnect);
        match state.disconnect_results.pop_front() {
            Some(Err(e)) => Err(SessionError::Disconnected(e)),
            _ => Ok(()),
        }
    }

    fn publish(&mut self, activity: &DisplayActivity) -> Result<(), SessionError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(Call::Publish(activity.clone()));
        match state.publish_results.pop_front() {
            Some(Err(e)) => Err(SessionError::Publish(e)),
            _ => Ok(()),
        }
    }
}
