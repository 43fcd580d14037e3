use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::types::{ArtifactFilter, ArtifactRecord, ArtifactSort};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS artifacts (
    caption     TEXT PRIMARY KEY,
    preview     BLOB NOT NULL,
    full        BLOB NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_artifacts_created ON artifacts(created_at);
"#;

/// Open (or create) the artifact database. Pass `None` for an in-memory database.
pub fn open_database(path: Option<&std::path::Path>) -> Result<Connection> {
    let conn = match path {
        Some(p) => Connection::open(p).context("Failed to open artifact database")?,
        None => Connection::open_in_memory().context("Failed to open in-memory database")?,
    };

    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .context("Failed to set PRAGMA options")?;

    conn.execute_batch(SCHEMA)
        .context("Failed to create artifact schema")?;

    Ok(conn)
}

/// Insert an artifact unless its caption is already present.
///
/// The check-and-insert is a single statement, so two racing saves for the
/// same caption cannot both succeed. Returns `true` if a row was inserted,
/// `false` if the caption already existed (the row is left untouched).
pub fn insert_artifact(
    conn: &Connection,
    caption: &str,
    preview: &[u8],
    full: &[u8],
) -> Result<bool> {
    let now = chrono::Utc::now().to_rfc3339();
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO artifacts (caption, preview, full, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![caption, preview, full, now],
        )
        .context("Failed to insert artifact")?;
    Ok(changed == 1)
}

/// Check whether an artifact with the given caption exists.
pub fn artifact_exists(conn: &Connection, caption: &str) -> Result<bool> {
    let count: u32 = conn
        .query_row(
            "SELECT COUNT(*) FROM artifacts WHERE caption = ?1",
            params![caption],
            |row| row.get(0),
        )
        .context("Failed to check for artifact")?;
    Ok(count > 0)
}

/// Get a single artifact by caption.
pub fn get_artifact(conn: &Connection, caption: &str) -> Result<Option<ArtifactRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT caption, preview, full, created_at
             FROM artifacts WHERE caption = ?1",
        )
        .context("Failed to prepare get_artifact query")?;

    let mut rows = stmt.query(params![caption])?;

    if let Some(row) = rows.next()? {
        Ok(Some(ArtifactRecord {
            caption: row.get(0)?,
            preview: row.get(1)?,
            full: row.get(2)?,
            created_at: row.get(3)?,
        }))
    } else {
        Ok(None)
    }
}

/// Count artifacts matching the filter.
pub fn count_artifacts(conn: &Connection, filter: &ArtifactFilter) -> Result<u32> {
    let count: u32 = match filter {
        ArtifactFilter::All => conn
            .query_row("SELECT COUNT(*) FROM artifacts", [], |row| row.get(0))
            .context("Failed to count artifacts")?,
        ArtifactFilter::CaptionContains(needle) => conn
            .query_row(
                "SELECT COUNT(*) FROM artifacts WHERE instr(caption, ?1) > 0",
                params![needle],
                |row| row.get(0),
            )
            .context("Failed to count filtered artifacts")?,
    };
    Ok(count)
}

fn order_clause(sort: ArtifactSort) -> &'static str {
    // rowid breaks created_at ties so the ordering is stable.
    match sort {
        ArtifactSort::CreatedAsc => "ORDER BY created_at ASC, rowid ASC",
        ArtifactSort::CreatedDesc => "ORDER BY created_at DESC, rowid DESC",
        ArtifactSort::CaptionAsc => "ORDER BY caption ASC",
        ArtifactSort::CaptionDesc => "ORDER BY caption DESC",
    }
}

/// List artifacts matching the filter in the given order.
pub fn list_artifacts(
    conn: &Connection,
    sort: ArtifactSort,
    filter: &ArtifactFilter,
) -> Result<Vec<ArtifactRecord>> {
    let sql = match filter {
        ArtifactFilter::All => format!(
            "SELECT caption, preview, full, created_at FROM artifacts {}",
            order_clause(sort)
        ),
        ArtifactFilter::CaptionContains(_) => format!(
            "SELECT caption, preview, full, created_at FROM artifacts
             WHERE instr(caption, ?1) > 0 {}",
            order_clause(sort)
        ),
    };

    let mut stmt = conn
        .prepare(&sql)
        .context("Failed to prepare list_artifacts query")?;

    let map_row = |row: &rusqlite::Row<'_>| {
        Ok(ArtifactRecord {
            caption: row.get(0)?,
            preview: row.get(1)?,
            full: row.get(2)?,
            created_at: row.get(3)?,
        })
    };

    let rows = match filter {
        ArtifactFilter::All => stmt
            .query_map([], map_row)
            .context("Failed to execute list_artifacts query")?,
        ArtifactFilter::CaptionContains(needle) => stmt
            .query_map(params![needle], map_row)
            .context("Failed to execute list_artifacts query")?,
    };

    let mut records = Vec::new();
    for row in rows {
        records.push(row.context("Failed to read artifact row")?);
    }
    Ok(records)
}
