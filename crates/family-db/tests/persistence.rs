use family_db::models::NewUser;
use family_db::{EventStore, UserStore};
use family_types::models::{Event, EventDraft};

#[test]
fn records_survive_reopening_the_store_files() {
    let dir = tempfile::tempdir().unwrap();
    let users_path = dir.path().join("data/users.db");
    let events_path = dir.path().join("data/events.db");

    let (user_id, event_id) = {
        let users = UserStore::open(&users_path).unwrap();
        let events = EventStore::open(&events_path).unwrap();

        let user = users
            .create(&NewUser {
                username: "alice".into(),
                family_id: "fam1".into(),
                hash: "hash".into(),
                salt: "salt".into(),
                role: "user".into(),
            })
            .unwrap();
        let event = events
            .add_event(
                &EventDraft {
                    title: "Family Dinner".into(),
                    date: "2025-12-17".into(),
                    start_time: "18:00".into(),
                    end_time: "20:00".into(),
                    location: "Home".into(),
                    required_items: "Food, Drinks".into(),
                },
                "alice",
                "fam1",
            )
            .unwrap();
        (user.id, event.id)
    };

    let users = UserStore::open(&users_path).unwrap();
    let events = EventStore::open(&events_path).unwrap();

    let user = users.lookup("alice", "fam1").unwrap().unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.hash, "hash");
    assert_eq!(user.salt, "salt");

    let event: Event = events.get_by_id(&event_id).unwrap().unwrap().into();
    assert_eq!(event.title, "Family Dinner");
    assert_eq!(event.required_items, "Food, Drinks");
    assert_eq!(event.family_id, "fam1");
}

#[test]
fn listing_all_users_never_exposes_credentials() {
    let users = UserStore::open_in_memory().unwrap();
    for (name, family) in [("alice", "fam1"), ("bob", "fam2")] {
        users
            .create(&NewUser {
                username: name.into(),
                family_id: family.into(),
                hash: "$argon2id$v=19$secret".into(),
                salt: "secret-salt".into(),
                role: "user".into(),
            })
            .unwrap();
    }

    let all = users.list_all().unwrap();
    assert_eq!(all.len(), 2);

    let json = serde_json::to_string(&all).unwrap();
    assert!(!json.contains("secret"));
    assert!(!json.contains("hash"));
    assert!(!json.contains("salt"));
}
