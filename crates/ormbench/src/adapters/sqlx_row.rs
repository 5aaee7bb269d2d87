//! Row-at-a-time adapter over sqlx.
//!
//! The benchmark loops live here as free functions so other adapters that
//! share the same query shapes can reuse them under their own name.

use crate::backends::{PgSession, Session};
use crate::bencher::Bencher;
use crate::config::BenchConfig;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::orm::{Operation, Orm, BATCH_SIZE, READ_SLICE_LIMIT};

/// Report name.
pub const NAME: &str = "sqlx";

/// Adapter issuing one statement per record.
pub struct SqlxAdapter<S: Session = PgSession> {
    config: BenchConfig,
    conn: Option<S>,
}

impl<S: Session> SqlxAdapter<S> {
    /// Create an unopened adapter.
    pub fn new(config: BenchConfig) -> Self {
        Self { config, conn: None }
    }

    /// Create an adapter around an already-open session.
    pub fn with_session(config: BenchConfig, session: S) -> Self {
        Self {
            config,
            conn: Some(session),
        }
    }

    /// The open session, if any.
    pub fn session(&self) -> Option<&S> {
        self.conn.as_ref()
    }

    pub(crate) fn open(&mut self, orm: &'static str) -> Result<()> {
        let session = S::open(&self.config)?;
        // The table may be missing when resets are turned off.
        if let Err(e) = session.ensure_table() {
            if let Err(close_err) = session.close() {
                tracing::warn!(orm, error = %close_err, "close after failed table setup");
            }
            return Err(e);
        }
        if let Some(previous) = self.conn.replace(session) {
            previous.close()?;
        }
        tracing::info!(orm, source = %redact(&self.config.source), "adapter initialized");
        Ok(())
    }

    pub(crate) fn release(&mut self, orm: &'static str) -> Result<()> {
        match self.conn.take() {
            Some(session) => {
                session.close()?;
                tracing::info!(orm, "adapter closed");
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub(crate) fn reset(&self, orm: &'static str) -> Result<()> {
        require(orm, self.conn.as_ref())?.reset_table()
    }
}

impl<S: Session> Orm for SqlxAdapter<S> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self) -> Result<()> {
        self.open(NAME)
    }

    fn close(&mut self) -> Result<()> {
        self.release(NAME)
    }

    fn reset_table(&mut self) -> Result<()> {
        self.reset(NAME)
    }

    fn insert(&mut self, b: &mut Bencher) {
        insert(NAME, self.conn.as_ref(), b);
    }

    /// No multi-row insert: every batch element is its own statement, so one
    /// iteration costs [`BATCH_SIZE`] round trips.
    fn insert_multi(&mut self, b: &mut Bencher) {
        let conn = self.conn.as_ref();
        let mut ms = Model::batch(BATCH_SIZE);

        b.reset();

        for _ in 0..b.iterations() {
            for m in ms.iter_mut() {
                m.id = 0;
                if let Err(e) = require(NAME, conn).and_then(|s| s.create(m)) {
                    b.report_error(NAME, Operation::InsertMulti, e);
                }
            }
        }
    }

    fn update(&mut self, b: &mut Bencher) {
        update(NAME, self.conn.as_ref(), b);
    }

    fn read(&mut self, b: &mut Bencher) {
        read(NAME, self.conn.as_ref(), b);
    }

    fn read_slice(&mut self, b: &mut Bencher) {
        read_slice(NAME, self.conn.as_ref(), b);
    }
}

pub(crate) fn require<'a, S: Session>(orm: &'static str, conn: Option<&'a S>) -> Result<&'a S> {
    conn.ok_or(Error::NotInitialized(orm))
}

pub(crate) fn insert<S: Session>(orm: &'static str, conn: Option<&S>, b: &mut Bencher) {
    let mut m = Model::new();

    b.reset();

    for _ in 0..b.iterations() {
        m.id = 0;
        if let Err(e) = require(orm, conn).and_then(|s| s.create(&mut m)) {
            b.report_error(orm, Operation::Insert, e);
        }
    }
}

pub(crate) fn update<S: Session>(orm: &'static str, conn: Option<&S>, b: &mut Bencher) {
    let mut m = Model::new();
    if let Err(e) = require(orm, conn).and_then(|s| s.create(&mut m)) {
        b.report_error(orm, Operation::Update, e);
    }

    b.reset();

    for _ in 0..b.iterations() {
        if let Err(e) = require(orm, conn).and_then(|s| s.updates(&m)) {
            b.report_error(orm, Operation::Update, e);
        }
    }
}

pub(crate) fn read<S: Session>(orm: &'static str, conn: Option<&S>, b: &mut Bencher) {
    let mut m = Model::new();
    if let Err(e) = require(orm, conn).and_then(|s| s.create(&mut m)) {
        b.report_error(orm, Operation::Read, e);
    }

    b.reset();

    for _ in 0..b.iterations() {
        if let Err(e) = require(orm, conn).and_then(|s| s.take(&mut m)) {
            b.report_error(orm, Operation::Read, e);
        }
    }
}

pub(crate) fn read_slice<S: Session>(orm: &'static str, conn: Option<&S>, b: &mut Bencher) {
    let mut m = Model::new();
    for _ in 0..BATCH_SIZE {
        m.id = 0;
        if let Err(e) = require(orm, conn).and_then(|s| s.create(&mut m)) {
            b.report_error(orm, Operation::ReadSlice, e);
        }
    }

    b.reset();

    for _ in 0..b.iterations() {
        match require(orm, conn).and_then(|s| s.find(0, READ_SLICE_LIMIT)) {
            Ok(models) => {
                std::hint::black_box(models);
            }
            Err(e) => b.report_error(orm, Operation::ReadSlice, e),
        }
    }
}

/// Strip the password from a data source before logging it.
fn redact(source: &str) -> String {
    let Some((scheme, rest)) = source.split_once("://") else {
        return source.to_string();
    };
    let Some((userinfo, host)) = rest.split_once('@') else {
        return source.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => source.to_string(),
    }
}
