//! End-to-end tests of the credentials facade against real files.

use std::path::Path;

use envcreds_core::env::vars;
use envcreds_integration_tests::{options, random_key, Backend};
use envcreds_secrets::{
    edit, encrypt_file, load, read, Contents, CredentialsError, EncryptFileOptions, Editor,
    Environment, Options, Secrets,
};
use serde_json::json;
use tempfile::TempDir;

fn hex_key() -> String {
    envcreds_secrets::generate_key()
}

#[tokio::test]
async fn test_round_trip_with_hex_key() {
    let tmp = TempDir::new().unwrap();
    let key = hex_key();
    let opts = Options::new()
        .env("development")
        .credentials_dir(tmp.path().join("credentials"))
        .master_key(key.clone());

    let secrets: Secrets = [
        ("KEY1", json!("VALUE1")),
        ("PORT", json!(9090)),
        ("NESTED", json!({"a": [1, 2]})),
    ]
    .into_iter()
    .collect();
    opts.store().unwrap().replace(secrets.clone().into()).await.unwrap();

    let path = tmp.path().join("credentials").join("credentials.dev.json.enc");
    assert!(path.is_file());
    let payload = std::fs::read_to_string(&path).unwrap();
    assert!(payload.contains("--"));
    assert!(!payload.contains("VALUE1"));

    // A second store with the same key sees the same content.
    let again = Options::new()
        .env("development")
        .credentials_dir(tmp.path().join("credentials"))
        .master_key(key);
    assert_eq!(read(&again).await.unwrap(), secrets);
}

#[tokio::test]
async fn test_wrong_key_fails_with_decryption() {
    let tmp = TempDir::new().unwrap();
    let writer = options(&tmp, "production", Backend::Immediate.build(random_key()));
    writer
        .store()
        .unwrap()
        .replace(Contents::from(r#"{"A": "1"}"#))
        .await
        .unwrap();

    let reader = options(&tmp, "production", Backend::Immediate.build(random_key()));
    let err = read(&reader).await.unwrap_err();
    assert!(matches!(err, CredentialsError::Decryption { ref env, .. } if env == "production"));
    assert!(err.to_string().starts_with("Environment(production) - "));
}

#[tokio::test]
async fn test_empty_bootstrap() {
    let tmp = TempDir::new().unwrap();
    let opts = options(&tmp, "test", Backend::Immediate.build(random_key()));

    assert!(read(&opts).await.unwrap().is_empty());
    assert!(!tmp.path().join("credentials").exists());
}

#[tokio::test]
async fn test_invalid_content_leaves_file_untouched() {
    let tmp = TempDir::new().unwrap();
    let opts = options(&tmp, "test", Backend::Immediate.build(random_key()));
    let store = opts.store().unwrap();
    store.replace(Contents::from(r#"{"KEEP": "me"}"#)).await.unwrap();
    let before = std::fs::read(store.path()).unwrap();

    for bad in [r#"{"KEY1": "VALUE1", "V":}"#, "[1, 2, 3]", "42", ""] {
        let err = store.replace(Contents::from(bad)).await.unwrap_err();
        assert!(
            matches!(err, CredentialsError::InvalidFormat { .. }),
            "{bad:?} should be rejected, got {err:?}"
        );
    }

    assert_eq!(std::fs::read(store.path()).unwrap(), before);
}

#[tokio::test]
async fn test_override_precedence() {
    let tmp = TempDir::new().unwrap();
    let backend = Backend::Immediate.build(random_key());
    let base: Secrets = [("ENVCREDS_IT_A", "1"), ("ENVCREDS_IT_B", "2")].into_iter().collect();
    options(&tmp, "test", backend.clone())
        .store()
        .unwrap()
        .replace(base.into())
        .await
        .unwrap();

    let overrides: Secrets = [("ENVCREDS_IT_A", "9"), ("ENVCREDS_IT_C", "3")].into_iter().collect();
    let effective = load(&options(&tmp, "test", backend).overrides(overrides))
        .await
        .unwrap();

    let expected: Secrets = [
        ("ENVCREDS_IT_A", "9"),
        ("ENVCREDS_IT_B", "2"),
        ("ENVCREDS_IT_C", "3"),
    ]
    .into_iter()
    .collect();
    assert_eq!(effective, expected);
    for (key, value) in [("ENVCREDS_IT_A", "9"), ("ENVCREDS_IT_B", "2"), ("ENVCREDS_IT_C", "3")] {
        assert_eq!(std::env::var(key).unwrap(), value);
    }
}

#[test]
fn test_filename_derivation() {
    let cases = [
        ("development", "credentials.dev.json.enc"),
        ("production", "credentials.prod.json.enc"),
        ("test", "credentials.test.json.enc"),
        ("stage", "credentials.stage.json.enc"),
        ("ci-custom", "credentials.ci-custom.json.enc"),
    ];

    for (env, file) in cases {
        assert_eq!(Environment::new(env).default_file_name(), file);

        let store = Options::new()
            .env(env)
            .encryptor(Backend::Immediate.build(random_key()))
            .store()
            .unwrap();
        assert_eq!(store.path(), Path::new("credentials").join(file));
    }
}

#[tokio::test]
async fn test_custom_file_location() {
    let tmp = TempDir::new().unwrap();
    let opts = options(&tmp, "development", Backend::Immediate.build(random_key()))
        .credentials_dir(tmp.path().join("test"))
        .credentials_file("credentials.ci-test.json.enc");

    let store = opts.store().unwrap();
    store.replace(Contents::from("{}")).await.unwrap();

    assert!(tmp.path().join("test").join("credentials.ci-test.json.enc").is_file());
}

#[tokio::test]
async fn test_directory_created_one_level_only() {
    let tmp = TempDir::new().unwrap();
    let opts = options(&tmp, "test", Backend::Immediate.build(random_key()))
        .credentials_dir(tmp.path().join("missing").join("nested"));

    let err = opts
        .store()
        .unwrap()
        .replace(Contents::from("{}"))
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialsError::Io { .. }));
}

#[tokio::test]
async fn test_encrypt_file_round_trip() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("test_credentials.json");
    std::fs::write(&input, r#"{"KEY1": "VALUE1", "PORT": 9090}"#).unwrap();
    let backend = Backend::Immediate.build(random_key());

    let opts = EncryptFileOptions {
        options: options(&tmp, "development", backend.clone()),
        ..EncryptFileOptions::new(&input)
    };
    let output = encrypt_file(&opts).await.unwrap();
    assert_eq!(
        output,
        tmp.path().join("credentials").join("test_credentials.json.enc")
    );

    let secrets = read(
        &options(&tmp, "development", backend).credentials_file("test_credentials.json.enc"),
    )
    .await
    .unwrap();
    assert_eq!(secrets.get("KEY1"), Some(&json!("VALUE1")));
    assert_eq!(secrets.get("PORT"), Some(&json!(9090)));
}

#[tokio::test]
async fn test_encrypt_file_missing_source() {
    let tmp = TempDir::new().unwrap();
    let opts = EncryptFileOptions {
        options: options(&tmp, "development", Backend::Immediate.build(random_key())),
        ..EncryptFileOptions::new(tmp.path().join("absent.json"))
    };

    let err = encrypt_file(&opts).await.unwrap_err();
    assert!(matches!(err, CredentialsError::SourceNotFound { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[tokio::test]
async fn test_key_file_next_to_credentials() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("credentials");
    std::fs::create_dir(&dir).unwrap();
    let key = hex_key();
    std::fs::write(dir.join("ci-keyfile.key"), format!("{key}\n")).unwrap();

    // No test in this binary sets APP_MASTER_KEY; clear any inherited value
    // so the key file is the only source.
    std::env::remove_var(vars::APP_MASTER_KEY);
    let from_file = Options::new().env("ci-keyfile").credentials_dir(&dir);
    from_file
        .store()
        .unwrap()
        .replace(Contents::from(r#"{"A": "1"}"#))
        .await
        .unwrap();

    let explicit = Options::new()
        .env("ci-keyfile")
        .credentials_dir(&dir)
        .master_key(key);
    let expected: Secrets = [("A", "1")].into_iter().collect();
    assert_eq!(read(&explicit).await.unwrap(), expected);
}

#[test]
fn test_invalid_master_key() {
    let err = Options::new()
        .env("test")
        .master_key("abcd")
        .store()
        .unwrap_err();
    assert!(matches!(err, CredentialsError::InvalidKey { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn test_edit_through_facade() {
    let tmp = TempDir::new().unwrap();
    let opts = options(&tmp, "test", Backend::Offload.build(random_key()));
    opts.store()
        .unwrap()
        .replace(Contents::from(r#"{"OLD": "value"}"#))
        .await
        .unwrap();

    let seen = tmp.path().join("seen.json");
    let script = tmp.path().join("editor.sh");
    std::fs::write(
        &script,
        format!(
            "cp \"$1\" '{}'\nprintf '{{\"P\": \"1\"}}' > \"$1\"\n",
            seen.display()
        ),
    )
    .unwrap();
    let editor = Editor::new(&format!("sh {}", script.display()));

    edit(&opts, &editor).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(&seen).unwrap(),
        "{\n    \"OLD\": \"value\"\n}"
    );
    let expected: Secrets = [("P", "1")].into_iter().collect();
    assert_eq!(read(&opts).await.unwrap(), expected);
}
