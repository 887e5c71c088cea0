use diesel::pg::PgConnection;
use diesel::Connection;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::{Store, UnitOfWork};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// PostgreSQL-backed store; every unit of work is one database transaction.
#[derive(Clone)]
pub struct DieselStore {
    pool: DbPool,
}

impl DieselStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Store for DieselStore {
    fn transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn UnitOfWork) -> Result<(), DomainError>,
    ) -> Result<(), DomainError> {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;
        conn.transaction::<_, DomainError, _>(|conn| work(&mut DieselUnitOfWork { conn }))
    }
}

/// Repository operations bound to one open transaction.
pub struct DieselUnitOfWork<'c> {
    pub(super) conn: &'c mut PgConnection,
}
