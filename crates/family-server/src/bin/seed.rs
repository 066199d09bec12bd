use family_server::config::store_paths;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    family_server::init_logging();

    // Seeding only touches the stores, so no key material is required.
    let (users_db, events_db) = store_paths(&|key: &str| std::env::var(key).ok());

    family_server::seed::run(&users_db, &events_db)
}
