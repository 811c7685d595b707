//! SQLite-backed hologram store.
//!
//! Four tables mirror the domain records: `cartons`, `boxes`, `issues` and
//! `permits`. Children reference their parent with `ON DELETE CASCADE`
//! foreign keys. Every mutating operation runs in one transaction.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError | Scenario |
//! |------------|------------|----------|
//! | Database (unique violation) | `Domain(DuplicateIdentifier)` | Carton/issue number inserted concurrently |
//! | Database (other) | `Database` | Constraint or engine failure |
//! | Zero-row counter update | `Concurrency` | Box counter changed after it was read |
//! | Anything else | `Database` | Pool closed, IO, decode failures |

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::instrument;

use holotrack_core::{CartonId, CartonNo, DomainError, IssueId, IssueNo};
use holotrack_inventory::{Carton, CartonBox, NewCarton, SeriesRange};
use holotrack_issuance::{plan_issue, Issue, IssueRequest, Permit};

use super::r#trait::{HologramStore, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS cartons (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        carton_no    TEXT    NOT NULL UNIQUE,
        start_series INTEGER NOT NULL,
        end_series   INTEGER NOT NULL,
        created_at   TEXT    NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS boxes (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        carton_id    INTEGER NOT NULL REFERENCES cartons(id) ON DELETE CASCADE,
        box_no       INTEGER NOT NULL,
        start_series INTEGER NOT NULL,
        end_series   INTEGER NOT NULL,
        issued_upto  INTEGER NOT NULL DEFAULT 0 CHECK (issued_upto >= 0),
        UNIQUE (carton_id, box_no)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS issues (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        issue_no       TEXT    NOT NULL UNIQUE,
        issue_date     TEXT    NOT NULL,
        total_required INTEGER NOT NULL,
        series_from    INTEGER NOT NULL,
        series_to      INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS permits (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        issue_id    INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
        permit_no   TEXT    NOT NULL,
        permit_date TEXT    NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_issues_date ON issues (issue_date)",
    "CREATE INDEX IF NOT EXISTS idx_permits_issue ON permits (issue_id)",
];

/// SQLite-backed hologram store.
///
/// Box counters are written with compare-and-commit updates guarded by the
/// value read in the same transaction, so a concurrent writer surfaces as
/// `StoreError::Concurrency` instead of a lost update.
#[derive(Debug, Clone)]
pub struct SqliteHologramStore {
    pool: Arc<SqlitePool>,
}

impl SqliteHologramStore {
    /// Connect to `url` (e.g. `sqlite://hologram_management.db` or
    /// `sqlite::memory:`) and create the schema if needed.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| map_sqlx_error("parse_url", e))?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives and dies with its single connection.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            SqlitePoolOptions::new().max_connections(5).connect_with(options).await
        }
        .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Create tables and indexes (idempotent).
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }

    async fn fetch_issues(&self, rows: Vec<SqliteRow>) -> Result<Vec<Issue>, StoreError> {
        let mut issues = Vec::with_capacity(rows.len());
        for row in &rows {
            issues.push(IssueRow::from_row(row).map_err(|e| map_sqlx_error("decode_issue", e))?);
        }
        if issues.is_empty() {
            return Ok(vec![]);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT issue_id, permit_no, permit_date FROM permits WHERE issue_id IN (",
        );
        let mut ids = qb.separated(", ");
        for issue in &issues {
            ids.push_bind(issue.id);
        }
        ids.push_unseparated(") ORDER BY id");

        let permit_rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_permits", e))?;

        let mut permits: HashMap<i64, Vec<Permit>> = HashMap::new();
        for row in &permit_rows {
            let issue_id: i64 = row.try_get("issue_id").map_err(|e| map_sqlx_error("decode_permit", e))?;
            let permit = Permit {
                permit_no: row.try_get("permit_no").map_err(|e| map_sqlx_error("decode_permit", e))?,
                permit_date: row.try_get("permit_date").map_err(|e| map_sqlx_error("decode_permit", e))?,
            };
            permits.entry(issue_id).or_default().push(permit);
        }

        issues
            .into_iter()
            .map(|row| {
                let own = permits.remove(&row.id).unwrap_or_default();
                row.into_issue(own)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl HologramStore for SqliteHologramStore {
    #[instrument(skip(self, carton), fields(carton_no = %carton.carton_no), err)]
    async fn create_carton(
        &self,
        carton: NewCarton,
        created_at: DateTime<Utc>,
    ) -> Result<(Carton, Vec<CartonBox>), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let existing = sqlx::query("SELECT id FROM cartons WHERE carton_no = ?")
            .bind(carton.carton_no.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("find_carton", e))?;
        if existing.is_some() {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(DomainError::duplicate("carton", carton.carton_no.as_str()).into());
        }

        let inserted = sqlx::query(
            "INSERT INTO cartons (carton_no, start_series, end_series, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(carton.carton_no.as_str())
        .bind(to_db(carton.range.start)?)
        .bind(to_db(carton.range.end)?)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::from(DomainError::duplicate("carton", carton.carton_no.as_str()))
            } else {
                map_sqlx_error("insert_carton", e)
            }
        })?;

        let id = CartonId::new(inserted.last_insert_rowid());
        let boxes = carton.boxes(id);

        for b in &boxes {
            sqlx::query(
                r#"
                INSERT INTO boxes (carton_id, box_no, start_series, end_series, issued_upto)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(id.get())
            .bind(i64::from(b.box_no))
            .bind(to_db(b.range.start)?)
            .bind(to_db(b.range.end)?)
            .bind(to_db(b.issued_upto)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_box", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok((carton.into_carton(id, created_at), boxes))
    }

    #[instrument(skip(self), fields(carton_no = %carton_no), err)]
    async fn delete_carton(&self, carton_no: &CartonNo) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query("SELECT id FROM cartons WHERE carton_no = ?")
            .bind(carton_no.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("find_carton", e))?;
        let Some(row) = row else {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(DomainError::NotFound.into());
        };
        let id: i64 = row.try_get("id").map_err(|e| map_sqlx_error("decode_carton", e))?;

        let in_use: i64 = sqlx::query("SELECT COUNT(*) AS n FROM boxes WHERE carton_id = ? AND issued_upto > 0")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .and_then(|r| r.try_get("n"))
            .map_err(|e| map_sqlx_error("check_boxes", e))?;
        if in_use > 0 {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(DomainError::CartonInUse(carton_no.to_string()).into());
        }

        sqlx::query("DELETE FROM boxes WHERE carton_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_boxes", e))?;
        sqlx::query("DELETE FROM cartons WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_carton", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self, request), fields(issue_no = %request.issue_no, total_required = request.total_required), err)]
    async fn record_issue(&self, request: IssueRequest) -> Result<Issue, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let taken = sqlx::query("SELECT id FROM issues WHERE issue_no = ?")
            .bind(request.issue_no.trim())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("find_issue", e))?
            .is_some();

        let rows = sqlx::query(
            r#"
            SELECT carton_id, box_no, start_series, end_series, issued_upto
            FROM boxes
            ORDER BY carton_id ASC, box_no ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("load_boxes", e))?;

        let mut boxes = Vec::with_capacity(rows.len());
        for row in &rows {
            boxes.push(BoxRow::from_row(row).map_err(|e| map_sqlx_error("decode_box", e))?.into_box()?);
        }

        let plan = match plan_issue(&request, taken, &mut boxes) {
            Ok(plan) => plan,
            Err(e) => {
                tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(e.into());
            }
        };

        for seg in &plan.allocation.segments {
            let updated = sqlx::query(
                r#"
                UPDATE boxes SET issued_upto = ?
                WHERE carton_id = ? AND box_no = ? AND issued_upto = ?
                "#,
            )
            .bind(to_db(seg.issued_after())?)
            .bind(seg.carton_id.get())
            .bind(i64::from(seg.box_no))
            .bind(to_db(seg.issued_before)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_box", e))?;

            if updated.rows_affected() != 1 {
                tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(StoreError::Concurrency(format!(
                    "box {} of carton {} changed during allocation",
                    seg.box_no, seg.carton_id
                )));
            }
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO issues (issue_no, issue_date, total_required, series_from, series_to)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(plan.issue_no.as_str())
        .bind(plan.issue_date)
        .bind(to_db(plan.total_required)?)
        .bind(to_db(plan.allocation.series_from)?)
        .bind(to_db(plan.allocation.series_to)?)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::from(DomainError::duplicate("issue", plan.issue_no.as_str()))
            } else {
                map_sqlx_error("insert_issue", e)
            }
        })?;
        let id = IssueId::new(inserted.last_insert_rowid());

        for permit in &plan.permits {
            sqlx::query("INSERT INTO permits (issue_id, permit_no, permit_date) VALUES (?, ?, ?)")
                .bind(id.get())
                .bind(&permit.permit_no)
                .bind(permit.permit_date)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_permit", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(plan.into_issue(id))
    }

    async fn cartons(&self) -> Result<Vec<Carton>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, carton_no, start_series, end_series, created_at FROM cartons ORDER BY id ASC",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_cartons", e))?;

        rows.iter()
            .map(|row| {
                CartonRow::from_row(row)
                    .map_err(|e| map_sqlx_error("decode_carton", e))?
                    .into_carton()
            })
            .collect()
    }

    async fn boxes(&self) -> Result<Vec<CartonBox>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT carton_id, box_no, start_series, end_series, issued_upto
            FROM boxes
            ORDER BY carton_id ASC, box_no ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_boxes", e))?;

        rows.iter()
            .map(|row| {
                BoxRow::from_row(row)
                    .map_err(|e| map_sqlx_error("decode_box", e))?
                    .into_box()
            })
            .collect()
    }

    async fn issues(&self, limit: Option<usize>) -> Result<Vec<Issue>, StoreError> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let rows = sqlx::query(
            r#"
            SELECT id, issue_no, issue_date, total_required, series_from, series_to
            FROM issues
            ORDER BY issue_date DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_issues", e))?;

        self.fetch_issues(rows).await
    }

    async fn issues_between(&self, from: NaiveDate, until: NaiveDate) -> Result<Vec<Issue>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, issue_no, issue_date, total_required, series_from, series_to
            FROM issues
            WHERE issue_date >= ? AND issue_date < ?
            ORDER BY issue_date ASC, id ASC
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_issues", e))?;

        self.fetch_issues(rows).await
    }

    async fn count_cartons(&self) -> Result<u64, StoreError> {
        let n: i64 = sqlx::query("SELECT COUNT(*) AS n FROM cartons")
            .fetch_one(&*self.pool)
            .await
            .and_then(|r| r.try_get("n"))
            .map_err(|e| map_sqlx_error("count_cartons", e))?;
        from_db(n)
    }

    async fn count_issues(&self) -> Result<u64, StoreError> {
        let n: i64 = sqlx::query("SELECT COUNT(*) AS n FROM issues")
            .fetch_one(&*self.pool)
            .await
            .and_then(|r| r.try_get("n"))
            .map_err(|e| map_sqlx_error("count_issues", e))?;
        from_db(n)
    }

    async fn total_available(&self) -> Result<u64, StoreError> {
        let n: i64 = sqlx::query(
            "SELECT COALESCE(SUM(end_series - start_series + 1 - issued_upto), 0) AS n FROM boxes",
        )
        .fetch_one(&*self.pool)
        .await
        .and_then(|r| r.try_get("n"))
        .map_err(|e| map_sqlx_error("total_available", e))?;
        from_db(n)
    }
}

fn to_db(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::database("encode", format!("{value} exceeds INTEGER range")))
}

fn from_db(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::database("decode", format!("unexpected negative value {value}")))
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::database(operation, db_err.message().to_string()),
        sqlx::Error::PoolClosed => StoreError::database(operation, "connection pool closed"),
        other => StoreError::database(operation, other.to_string()),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

// SQLx row types

#[derive(Debug)]
struct CartonRow {
    id: i64,
    carton_no: String,
    start_series: i64,
    end_series: i64,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for CartonRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            carton_no: row.try_get("carton_no")?,
            start_series: row.try_get("start_series")?,
            end_series: row.try_get("end_series")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl CartonRow {
    fn into_carton(self) -> Result<Carton, StoreError> {
        Ok(Carton {
            id: CartonId::new(self.id),
            carton_no: CartonNo::new(&self.carton_no)?,
            range: SeriesRange::new(from_db(self.start_series)?, from_db(self.end_series)?)?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug)]
struct BoxRow {
    carton_id: i64,
    box_no: i64,
    start_series: i64,
    end_series: i64,
    issued_upto: i64,
}

impl<'r> FromRow<'r, SqliteRow> for BoxRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            carton_id: row.try_get("carton_id")?,
            box_no: row.try_get("box_no")?,
            start_series: row.try_get("start_series")?,
            end_series: row.try_get("end_series")?,
            issued_upto: row.try_get("issued_upto")?,
        })
    }
}

impl BoxRow {
    fn into_box(self) -> Result<CartonBox, StoreError> {
        Ok(CartonBox {
            carton_id: CartonId::new(self.carton_id),
            box_no: u32::try_from(self.box_no)
                .map_err(|_| StoreError::database("decode_box", format!("invalid box_no {}", self.box_no)))?,
            range: SeriesRange::new(from_db(self.start_series)?, from_db(self.end_series)?)?,
            issued_upto: from_db(self.issued_upto)?,
        })
    }
}

#[derive(Debug)]
struct IssueRow {
    id: i64,
    issue_no: String,
    issue_date: NaiveDate,
    total_required: i64,
    series_from: i64,
    series_to: i64,
}

impl<'r> FromRow<'r, SqliteRow> for IssueRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            issue_no: row.try_get("issue_no")?,
            issue_date: row.try_get("issue_date")?,
            total_required: row.try_get("total_required")?,
            series_from: row.try_get("series_from")?,
            series_to: row.try_get("series_to")?,
        })
    }
}

impl IssueRow {
    fn into_issue(self, permits: Vec<Permit>) -> Result<Issue, StoreError> {
        Ok(Issue {
            id: IssueId::new(self.id),
            issue_no: IssueNo::new(&self.issue_no)?,
            issue_date: self.issue_date,
            total_required: from_db(self.total_required)?,
            series_from: from_db(self.series_from)?,
            series_to: from_db(self.series_to)?,
            permits,
        })
    }
}
