use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use family_types::models::User;

use crate::models::{NewUser, UserPatch, UserRow};
use crate::{Database, OptionalExt, migrations};

const USER_COLUMNS: &str = "id, username, family_id, hash, salt, role, created_at";

/// Credential store: one SQLite file holding user records.
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            db: Database::open(path, migrations::run_users)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory(migrations::run_users)?,
        })
    }

    /// Insert a new user. Does not check for an existing `(username, family)`
    /// pair; see [`UserStore::create_if_absent`].
    pub fn create(&self, user: &NewUser) -> Result<UserRow> {
        let row = new_row(user);
        self.db.with_conn(|conn| insert_user(conn, &row))?;

        info!("User {} created in family {}", row.username, row.family_id);
        Ok(row)
    }

    /// Insert a new user unless the `(username, family)` pair is already
    /// taken. The check and the insert hold the same connection lock, so two
    /// concurrent registrations cannot both succeed.
    pub fn create_if_absent(&self, user: &NewUser) -> Result<Option<UserRow>> {
        let row = new_row(user);
        let inserted = self.db.with_conn(|conn| {
            if lookup_in(conn, &row.username, &row.family_id)?.is_some() {
                return Ok(false);
            }
            insert_user(conn, &row)?;
            Ok(true)
        })?;

        if !inserted {
            return Ok(None);
        }
        info!("User {} created in family {}", row.username, row.family_id);
        Ok(Some(row))
    }

    /// First user whose username and family both match.
    pub fn lookup(&self, username: &str, family_id: &str) -> Result<Option<UserRow>> {
        self.db.with_conn(|conn| lookup_in(conn, username, family_id))
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                user_from_row,
            )
            .optional()
        })
    }

    pub fn list_by_family(&self, family_id: &str) -> Result<Vec<UserRow>> {
        self.db.with_conn(|conn| {
            query_users(
                conn,
                &format!("SELECT {USER_COLUMNS} FROM users WHERE family_id = ?1 ORDER BY rowid"),
                [family_id],
            )
        })
    }

    /// Every user in every family, as public records without hash or salt.
    pub fn list_all(&self) -> Result<Vec<User>> {
        let rows = self.db.with_conn(|conn| {
            query_users(
                conn,
                &format!("SELECT {USER_COLUMNS} FROM users ORDER BY rowid"),
                [],
            )
        })?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Apply the supplied fields; returns the number of records modified.
    pub fn update(&self, id: &str, patch: &UserPatch) -> Result<usize> {
        let updated = self.db.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE users SET
                    username  = COALESCE(?2, username),
                    family_id = COALESCE(?3, family_id),
                    hash      = COALESCE(?4, hash),
                    salt      = COALESCE(?5, salt),
                    role      = COALESCE(?6, role)
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    patch.username,
                    patch.family_id,
                    patch.hash,
                    patch.salt,
                    patch.role,
                ],
            )?)
        })?;

        info!("User {} updated, {} records modified", id, updated);
        Ok(updated)
    }

    /// Remove every user with this username, in any family.
    pub fn delete(&self, username: &str) -> Result<usize> {
        let removed = self
            .db
            .with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE username = ?1", [username])?))?;

        info!("User {} deleted, {} records removed", username, removed);
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        self.db.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
            Ok(count as usize)
        })
    }
}

fn new_row(user: &NewUser) -> UserRow {
    UserRow {
        id: Uuid::new_v4().to_string(),
        username: user.username.clone(),
        family_id: user.family_id.clone(),
        hash: user.hash.clone(),
        salt: user.salt.clone(),
        role: user.role.clone(),
        created_at: Utc::now().to_rfc3339(),
    }
}

fn insert_user(conn: &Connection, row: &UserRow) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, username, family_id, hash, salt, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            &row.id,
            &row.username,
            &row.family_id,
            &row.hash,
            &row.salt,
            &row.role,
            &row.created_at,
        ],
    )?;
    Ok(())
}

fn lookup_in(conn: &Connection, username: &str, family_id: &str) -> Result<Option<UserRow>> {
    conn.query_row(
        &format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE username = ?1 AND family_id = ?2
             ORDER BY rowid LIMIT 1"
        ),
        [username, family_id],
        user_from_row,
    )
    .optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        family_id: row.get(2)?,
        hash: row.get(3)?,
        salt: row.get(4)?,
        role: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn query_users<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, user_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, family_id: &str) -> NewUser {
        NewUser {
            username: username.into(),
            family_id: family_id.into(),
            hash: "$argon2id$fake".into(),
            salt: "c2FsdA".into(),
            role: "user".into(),
        }
    }

    #[test]
    fn lookup_requires_both_username_and_family() {
        let store = UserStore::open_in_memory().unwrap();
        store.create(&new_user("alice", "fam1")).unwrap();

        assert!(store.lookup("alice", "fam1").unwrap().is_some());
        assert!(store.lookup("alice", "fam2").unwrap().is_none());
        assert!(store.lookup("bob", "fam1").unwrap().is_none());
    }

    #[test]
    fn duplicate_pairs_are_allowed_and_lookup_returns_the_first() {
        let store = UserStore::open_in_memory().unwrap();
        let first = store.create(&new_user("alice", "fam1")).unwrap();
        store.create(&new_user("alice", "fam1")).unwrap();

        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.lookup("alice", "fam1").unwrap().unwrap().id, first.id);
    }

    #[test]
    fn create_if_absent_refuses_a_taken_pair() {
        let store = UserStore::open_in_memory().unwrap();
        let first = store.create_if_absent(&new_user("alice", "fam1")).unwrap();
        assert!(first.is_some());

        assert!(store.create_if_absent(&new_user("alice", "fam1")).unwrap().is_none());
        assert!(store.create_if_absent(&new_user("alice", "fam2")).unwrap().is_some());
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn concurrent_create_if_absent_inserts_once() {
        let store = std::sync::Arc::new(UserStore::open_in_memory().unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.create_if_absent(&new_user("alice", "fam1")).unwrap())
            })
            .collect();
        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Option::is_some)
            .count();

        assert_eq!(created, 1);
        assert_eq!(store.list_by_family("fam1").unwrap().len(), 1);
    }

    #[test]
    fn update_merges_only_supplied_fields() {
        let store = UserStore::open_in_memory().unwrap();
        let user = store.create(&new_user("alice", "fam1")).unwrap();

        let patch = UserPatch {
            role: Some("administrator".into()),
            ..Default::default()
        };
        assert_eq!(store.update(&user.id, &patch).unwrap(), 1);

        let stored = store.get_by_id(&user.id).unwrap().unwrap();
        assert_eq!(stored.role, "administrator");
        assert_eq!(stored.family_id, "fam1");
        assert_eq!(stored.hash, user.hash);

        assert_eq!(store.update("missing", &patch).unwrap(), 0);
    }

    #[test]
    fn delete_is_keyed_by_username_across_families() {
        let store = UserStore::open_in_memory().unwrap();
        store.create(&new_user("alice", "fam1")).unwrap();
        store.create(&new_user("alice", "fam2")).unwrap();
        store.create(&new_user("bob", "fam1")).unwrap();

        assert_eq!(store.delete("alice").unwrap(), 2);
        assert_eq!(store.delete("alice").unwrap(), 0);
        assert_eq!(store.list_by_family("fam1").unwrap().len(), 1);
    }
}
