//! Reset both stores and load a demo family.

use std::path::Path;

use anyhow::{Result, anyhow};
use tracing::info;

use family_api::password::hash_password;
use family_db::models::NewUser;
use family_db::{EventStore, UserStore};
use family_types::ADMIN_ROLE;
use family_types::models::EventDraft;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin";
pub const ADMIN_FAMILY: &str = "admin_family";

/// (title, date, start, end, location, required items)
const DEMO_EVENTS: [(&str, &str, &str, &str, &str, &str); 4] = [
    ("Swimming Lesson", "2025-12-15", "16:00", "17:00", "Community Pool", "Swimsuit, Towel, Goggles"),
    ("Grocery Shopping", "2025-12-16", "10:00", "11:30", "Supermarket", "Shopping List, Bags"),
    ("Family Dinner", "2025-12-17", "18:00", "20:00", "Home", "Food, Drinks"),
    ("Dentist Appointment", "2025-12-20", "09:00", "10:00", "Dentist Clinic", "Insurance Card"),
];

/// Remove a store file along with its WAL side files.
fn remove_store_file(path: &Path) -> Result<()> {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let file = Path::new(&file);
        if file.exists() {
            std::fs::remove_file(file)?;
            info!("Deleted existing {}", file.display());
        }
    }
    Ok(())
}

pub fn run(users_db: &Path, events_db: &Path) -> Result<()> {
    info!("Starting seed process...");

    remove_store_file(users_db)?;
    remove_store_file(events_db)?;

    let users = UserStore::open(users_db)?;
    let events = EventStore::open(events_db)?;

    if users.lookup(ADMIN_USERNAME, ADMIN_FAMILY)?.is_some() {
        info!("User {} already exists, skipping user creation", ADMIN_USERNAME);
    } else {
        let salted =
            hash_password(ADMIN_PASSWORD).map_err(|e| anyhow!("Password hashing failed: {}", e))?;
        users.create(&NewUser {
            username: ADMIN_USERNAME.into(),
            family_id: ADMIN_FAMILY.into(),
            hash: salted.hash,
            salt: salted.salt,
            role: ADMIN_ROLE.into(),
        })?;
        info!("User created: {} (password: {})", ADMIN_USERNAME, ADMIN_PASSWORD);
    }

    info!("Seeding {} events...", DEMO_EVENTS.len());
    for (title, date, start_time, end_time, location, required_items) in DEMO_EVENTS {
        let draft = EventDraft {
            title: title.into(),
            date: date.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            location: location.into(),
            required_items: required_items.into(),
        }
        .validate()?;
        events.add_event(&draft, ADMIN_USERNAME, ADMIN_FAMILY)?;
    }

    info!("Seeding completed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use family_api::password::verify_password;

    #[test]
    fn seeding_twice_leaves_one_admin_and_four_events() {
        let dir = tempfile::tempdir().unwrap();
        let users_db = dir.path().join("users.db");
        let events_db = dir.path().join("events.db");

        run(&users_db, &events_db).unwrap();
        run(&users_db, &events_db).unwrap();

        let users = UserStore::open(&users_db).unwrap();
        let events = EventStore::open(&events_db).unwrap();

        assert_eq!(users.count().unwrap(), 1);
        let admin = users.lookup(ADMIN_USERNAME, ADMIN_FAMILY).unwrap().unwrap();
        assert_eq!(admin.role, ADMIN_ROLE);
        assert!(verify_password(ADMIN_PASSWORD, &admin.hash, &admin.salt));

        let seeded = events.list_by_family(ADMIN_FAMILY).unwrap();
        assert_eq!(seeded.len(), 4);
        assert_eq!(seeded[0].title, "Swimming Lesson");
        assert_eq!(seeded[3].required_items, "Insurance Card");
    }
}
