//! sqlx adapter with a native multi-row insert.

use crate::backends::{PgSession, Session};
use crate::bencher::Bencher;
use crate::config::BenchConfig;
use crate::error::Result;
use crate::model::Model;
use crate::orm::{Operation, Orm, BATCH_SIZE};

use super::sqlx_row::{self, require, SqlxAdapter};

/// Report name.
pub const NAME: &str = "sqlx-builder";

/// Like [`SqlxAdapter`], but `InsertMulti` sends the whole batch as one
/// `INSERT ... VALUES (..), (..)` statement built with `QueryBuilder`.
pub struct SqlxBuilderAdapter<S: Session = PgSession> {
    inner: SqlxAdapter<S>,
}

impl<S: Session> SqlxBuilderAdapter<S> {
    /// Create an unopened adapter.
    pub fn new(config: BenchConfig) -> Self {
        Self {
            inner: SqlxAdapter::new(config),
        }
    }

    /// Create an adapter around an already-open session.
    pub fn with_session(config: BenchConfig, session: S) -> Self {
        Self {
            inner: SqlxAdapter::with_session(config, session),
        }
    }
}

impl<S: Session> Orm for SqlxBuilderAdapter<S> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self) -> Result<()> {
        self.inner.open(NAME)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.release(NAME)
    }

    fn reset_table(&mut self) -> Result<()> {
        self.inner.reset(NAME)
    }

    fn insert(&mut self, b: &mut Bencher) {
        sqlx_row::insert(NAME, self.inner.session(), b);
    }

    fn insert_multi(&mut self, b: &mut Bencher) {
        let conn = self.inner.session();
        let mut ms = Model::batch(BATCH_SIZE);

        b.reset();

        for _ in 0..b.iterations() {
            for m in ms.iter_mut() {
                m.id = 0;
            }
            if let Err(e) = require(NAME, conn).and_then(|s| s.create_many(&mut ms)) {
                b.report_error(NAME, Operation::InsertMulti, e);
            }
        }
    }

    fn update(&mut self, b: &mut Bencher) {
        sqlx_row::update(NAME, self.inner.session(), b);
    }

    fn read(&mut self, b: &mut Bencher) {
        sqlx_row::read(NAME, self.inner.session(), b);
    }

    fn read_slice(&mut self, b: &mut Bencher) {
        sqlx_row::read_slice(NAME, self.inner.session(), b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::recording::{Call, RecordingSession};
    use crate::reporter::ErrorReporter;

    #[test]
    fn test_insert_multi_is_one_statement_per_iteration() {
        let session = RecordingSession::new();
        let mut orm = SqlxBuilderAdapter::with_session(BenchConfig::default(), session.clone());
        let mut b = Bencher::new(6, ErrorReporter::new());
        b.start();

        orm.insert_multi(&mut b);

        assert_eq!(session.calls().len(), 6);
        assert_eq!(
            session.count(|c| *c == Call::CreateMany { len: BATCH_SIZE }),
            6
        );
    }

    #[test]
    fn test_errors_carry_builder_name() {
        let session = RecordingSession::failing();
        let mut orm = SqlxBuilderAdapter::with_session(BenchConfig::default(), session);
        let reporter = ErrorReporter::new();
        let mut b = Bencher::new(3, reporter.clone());
        b.start();

        orm.insert_multi(&mut b);
        orm.insert(&mut b);

        assert_eq!(reporter.count_for(NAME, "InsertMulti"), 3);
        assert_eq!(reporter.count_for(NAME, "Insert"), 3);
        assert_eq!(reporter.count_for(sqlx_row::NAME, "Insert"), 0);
    }

    #[test]
    fn test_shared_operations_match_row_adapter() {
        let session = RecordingSession::new();
        let mut orm = SqlxBuilderAdapter::with_session(BenchConfig::default(), session.clone());
        let mut b = Bencher::new(2, ErrorReporter::new());
        b.start();

        orm.read(&mut b);

        assert_eq!(
            session.calls(),
            vec![
                Call::Create { id_on_entry: 0 },
                Call::Take { id: 1 },
                Call::Take { id: 1 },
            ]
        );
    }

    #[test]
    fn test_init_and_close_delegate() {
        let mut orm: SqlxBuilderAdapter<RecordingSession> =
            SqlxBuilderAdapter::new(BenchConfig::default());
        orm.init().unwrap();
        let session = orm.inner.session().unwrap().clone();
        assert_eq!(session.calls(), vec![Call::EnsureTable]);

        orm.close().unwrap();
        orm.close().unwrap();
        assert_eq!(session.calls(), vec![Call::EnsureTable, Call::Close]);
    }
}
