use aikeys::account;
use aikeys::conf::provider_env;
use aikeys::db::Database;
use aikeys::provider::EXTERNAL_PROVIDER_ENVVARS;
use aikeys::session::{self, Session};
use aikeys::settings::{self, Level};
use aikeys::store;
use std::collections::HashMap;
use std::{env, fs};
use temp_env::with_vars_unset;

// Walks through what a user actually does: sign in, save credentials,
// and hand them to code that calls the providers.

#[test]
fn it_stores_credentials_for_a_signed_in_user() {
    let dir = env::temp_dir().join(format!("aikeys-{}", uuid::Uuid::new_v4()));
    let db = Database::open(dir.join("aikeys.db")).expect("could not open database");
    let conn = db.connection();
    account::add_user(conn, "mipadi", "a-password").unwrap();

    let mut session = Session::new();
    session::login(conn, &mut session, "mipadi", "a-password").unwrap();
    let visitor = session::load_user(conn, &mut session, false).unwrap();

    let form: HashMap<String, String> = [
        ("FOREFRONTAI_API_KEY", "ff-secret"),
        ("REPLICATE_API_TOKEN", " r8-secret "),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let flashes = settings::update_external_providers(conn, &visitor, &form).unwrap();
    assert_eq!(flashes[0].level(), Level::Success);

    let user = visitor.login_required().unwrap();
    let stored = store::get_settings(conn, user.id()).unwrap();
    with_vars_unset(EXTERNAL_PROVIDER_ENVVARS, || {
        let env = provider_env(&stored);
        assert_eq!(
            env,
            vec![
                (String::from("FOREFRONTAI_API_KEY"), String::from("ff-secret")),
                (String::from("REPLICATE_API_TOKEN"), String::from("r8-secret")),
            ]
        );
    });

    drop(db);
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn it_keeps_the_demo_user_read_only() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();
    let mut session = Session::new();
    let visitor = session::load_user(conn, &mut session, true).unwrap();
    assert!(visitor.is_demo_user());

    let form = HashMap::from([(String::from("REPLICATE_API_TOKEN"), String::from("r8"))]);
    let flashes = settings::update_external_providers(conn, &visitor, &form).unwrap();
    assert_eq!(flashes[0].level(), Level::Warning);

    let flashes =
        settings::change_password(conn, &visitor, "", "a-long-password", "a-long-password")
            .unwrap();
    assert_eq!(flashes[0].level(), Level::Warning);
    assert!(store::get_settings(conn, -1).unwrap().is_empty());
}
