//! In-memory session that records every call, for adapter tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::BenchConfig;
use crate::error::{Error, Result};
use crate::model::Model;

use super::Session;

/// A call made against a [`RecordingSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    /// `create`, with the id the record carried on entry.
    Create { id_on_entry: i32 },
    CreateMany { len: usize },
    Updates { id: i32 },
    Take { id: i32 },
    Find { min_id: i32, limit: i64 },
    EnsureTable,
    ResetTable,
    Close,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    next_id: i32,
}

/// Session that stores calls and optionally fails every data call.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSession {
    state: Arc<Mutex<State>>,
    fail: bool,
}

impl RecordingSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A session whose data calls all fail.
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.state.lock().calls.push(call);
        if self.fail {
            return Err(Error::Write("injected failure".into()));
        }
        Ok(())
    }

    fn assign_id(&self) -> i32 {
        let mut state = self.state.lock();
        state.next_id += 1;
        state.next_id
    }
}

impl Session for RecordingSession {
    fn open(_config: &BenchConfig) -> Result<Self> {
        Ok(Self::new())
    }

    fn create(&self, model: &mut Model) -> Result<()> {
        self.record(Call::Create {
            id_on_entry: model.id,
        })?;
        model.id = self.assign_id();
        Ok(())
    }

    fn create_many(&self, models: &mut [Model]) -> Result<()> {
        self.record(Call::CreateMany { len: models.len() })?;
        for m in models.iter_mut() {
            m.id = self.assign_id();
        }
        Ok(())
    }

    fn updates(&self, model: &Model) -> Result<()> {
        self.record(Call::Updates { id: model.id })
    }

    fn take(&self, model: &mut Model) -> Result<()> {
        self.record(Call::Take { id: model.id })
    }

    fn find(&self, min_id: i32, limit: i64) -> Result<Vec<Model>> {
        self.record(Call::Find { min_id, limit })?;
        Ok(Vec::new())
    }

    fn ensure_table(&self) -> Result<()> {
        self.state.lock().calls.push(Call::EnsureTable);
        Ok(())
    }

    fn reset_table(&self) -> Result<()> {
        self.state.lock().calls.push(Call::ResetTable);
        Ok(())
    }

    fn close(self) -> Result<()> {
        self.state.lock().calls.push(Call::Close);
        Ok(())
    }
}
