//! SQLite persistence for visit records.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use petclinic_core::{format_visit_date, parse_visit_date, NewVisit, Visit};
use rusqlite::{params, types::Type, Connection, Row};
use tracing::info;

/// Initializes the database, creating tables if needed.
pub fn init_db(path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create db directory")?;
    }
    let conn = Connection::open(path).context("failed to open database")?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS visits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pet_id INTEGER NOT NULL,
            visit_date TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS visits_pet_id ON visits (pet_id);"
    ).context("failed to create table")?;
    info!("Database initialized at {}", path);
    Ok(conn)
}

fn visit_from_row(row: &Row<'_>) -> rusqlite::Result<Visit> {
    let id: u32 = row.get(0)?;
    let pet_id: u32 = row.get(1)?;
    let raw_date: String = row.get(2)?;
    let description: String = row.get(3)?;
    let date = parse_visit_date(&raw_date)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(Visit {
        id: Some(id),
        date: Some(date),
        description,
        pet_id: Some(pet_id),
    })
}

/// Lists a pet's visits, oldest first.
pub fn list_visits(conn: &Connection, pet_id: u32) -> Result<Vec<Visit>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, pet_id, visit_date, description FROM visits
             WHERE pet_id = ?1 ORDER BY visit_date, id",
        )
        .context("failed to prepare list query")?;

    let visits = stmt
        .query_map(params![pet_id], visit_from_row)
        .context("failed to query visits")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read visit row")?;

    Ok(visits)
}

/// Stores a visit and returns it with its assigned id.
pub fn insert_visit(conn: &Connection, pet_id: u32, visit: &NewVisit) -> Result<Visit> {
    conn.execute(
        "INSERT INTO visits (pet_id, visit_date, description) VALUES (?1, ?2, ?3)",
        params![pet_id, format_visit_date(visit.date), visit.description],
    )
    .context("failed to insert visit")?;

    let id = u32::try_from(conn.last_insert_rowid()).context("visit id out of range")?;
    info!("Stored visit {} for pet {}", id, pet_id);

    Ok(Visit {
        id: Some(id),
        date: Some(visit.date),
        description: visit.description.clone(),
        pet_id: Some(pet_id),
    })
}

/// Seed the classic sample visits if the table is empty
pub fn seed_examples(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM visits", [], |r| r.get(0))?;
    if count > 0 {
        info!("Database already has {} visits, skipping seed", count);
        return Ok(());
    }

    info!("Seeding example visits...");

    let examples = [
        (7, "2013-01-01", "rabies shot"),
        (8, "2013-01-02", "rabies shot"),
        (8, "2013-01-03", "neutered"),
        (7, "2013-01-04", "spayed"),
    ];

    for (pet_id, date, description) in examples {
        let visit = NewVisit::new(parse_visit_date(date)?, description);
        insert_visit(conn, pet_id, &visit)?;
    }

    Ok(())
}
