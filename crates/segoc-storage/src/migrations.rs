// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary and applied on
//! every open. Refinery records applied versions in `refinery_schema_history`.

use segoc_core::SegocError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), SegocError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(SegocError::storage)?;
    tracing::debug!(
        applied = report.applied_migrations().len(),
        "database migrations complete"
    );
    Ok(())
}
