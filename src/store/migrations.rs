//! Embeds the SQL migration set under `<repo-root>/migrations/` via
//! `refinery`, the way the teacher's `avalanche-report` database module wires
//! `refinery::embed_migrations!` into a nested module and drives it with
//! `runner().run(&mut conn)`.

use crate::error::{IndexError, Result};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("./migrations");
}

/// Runs every migration newer than the schema's current version. Safe to
/// call on a freshly created, empty database (runs everything) or on an
/// already up-to-date one (runs nothing) — both the "copy a template" and
/// "build from scratch" initialization paths described by the schema
/// verification contract end up at the same migration state through this one
/// function.
pub fn run(conn: &mut rusqlite::Connection) -> Result<()> {
    embedded::migrations::runner().run(conn).map_err(|e| {
        IndexError::Store {
            message: format!("schema migration failed: {e}"),
            source: None,
        }
    })?;
    Ok(())
}
