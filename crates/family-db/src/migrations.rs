use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

fn schema_version(conn: &Connection) -> Result<i64> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}

/// Schema for the credential store file.
///
/// `(username, family_id)` is indexed but deliberately not UNIQUE: callers
/// check with `lookup` before `create`.
pub fn run_users(conn: &Connection) -> Result<()> {
    if schema_version(conn)? < 1 {
        info!("User DB: running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL,
                family_id   TEXT NOT NULL,
                hash        TEXT NOT NULL,
                salt        TEXT NOT NULL,
                role        TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_users_login ON users(username, family_id);
            CREATE INDEX idx_users_family ON users(family_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    Ok(())
}

/// Schema for the event store file.
pub fn run_events(conn: &Connection) -> Result<()> {
    if schema_version(conn)? < 1 {
        info!("Event DB: running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE events (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                date            TEXT NOT NULL,
                start_time      TEXT NOT NULL,
                end_time        TEXT NOT NULL,
                location        TEXT NOT NULL,
                required_items  TEXT NOT NULL DEFAULT '',
                username        TEXT NOT NULL,
                family_id       TEXT NOT NULL
            );

            CREATE INDEX idx_events_family ON events(family_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_users(&conn).unwrap();
        run_users(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
