use super::{load_settings_from, prepare_public_url, Settings};

use std::{
    env, fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn defaults_without_file_or_env() {
    let settings = load_settings_from(Path::new("/nonexistent/server.toml"), |_| None);
    assert_eq!(settings, Settings::default());
}

#[test]
fn file_then_env_overrides() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("hellobase_server_test_{suffix}.toml"));
    fs::write(
        &path,
        "bind_addr = \"0.0.0.0:8080\"\npublic_url = \"https://file.example\"\n",
    )
    .expect("write");

    let settings = load_settings_from(&path, |name| {
        (name == "APP__PUBLIC_URL").then(|| "https://env.example/".to_string())
    });
    assert_eq!(settings.server_bind, "0.0.0.0:8080");
    assert_eq!(settings.public_url, "https://env.example/");

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn prepared_public_url_drops_trailing_slash() {
    assert_eq!(
        prepare_public_url(" https://hellobase.vercel.app/ ").expect("url"),
        "https://hellobase.vercel.app"
    );
}

#[test]
fn rejects_non_http_public_url() {
    assert!(prepare_public_url("not a url").is_err());
    assert!(prepare_public_url("ipfs://bafy").is_err());
}
