use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            username    TEXT NOT NULL,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- A form is the unit of mutation: its field configuration and its
        -- ordered row sequence are stored as JSON documents in-place.
        CREATE TABLE IF NOT EXISTS forms (
            id          TEXT PRIMARY KEY,
            owner_id    TEXT NOT NULL REFERENCES users(id),
            owner_email TEXT NOT NULL,
            title       TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            fields      TEXT NOT NULL,
            rows        TEXT NOT NULL DEFAULT '[]',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_forms_owner
            ON forms(owner_id);

        CREATE TABLE IF NOT EXISTS form_viewers (
            form_id     TEXT NOT NULL REFERENCES forms(id) ON DELETE CASCADE,
            email       TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(form_id, email)
        );

        CREATE INDEX IF NOT EXISTS idx_form_viewers_email
            ON form_viewers(email);

        CREATE TABLE IF NOT EXISTS form_buyers (
            form_id     TEXT NOT NULL REFERENCES forms(id) ON DELETE CASCADE,
            email       TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(form_id, email)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
