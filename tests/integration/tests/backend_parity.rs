//! Every backend must give the same results and the same error kinds.

use envcreds_integration_tests::{options, random_key, Backend};
use envcreds_secrets::{read, Contents, CredentialsError, Secrets};
use serde_json::json;
use std::mem::discriminant;
use tempfile::TempDir;

fn sample() -> Secrets {
    [
        ("KEY1", json!("VALUE1")),
        ("PORT", json!(9090)),
        ("DEBUG", json!(false)),
    ]
    .into_iter()
    .collect()
}

#[tokio::test]
async fn test_backends_agree_on_round_trip() {
    for backend in Backend::ALL {
        let tmp = TempDir::new().unwrap();
        let opts = options(&tmp, "test", backend.build(random_key()));

        assert!(read(&opts).await.unwrap().is_empty(), "{backend:?}");
        opts.store().unwrap().replace(sample().into()).await.unwrap();
        assert_eq!(read(&opts).await.unwrap(), sample(), "{backend:?}");
    }
}

#[tokio::test]
async fn test_payloads_are_interchangeable() {
    let key = random_key();

    for writer in Backend::ALL {
        let tmp = TempDir::new().unwrap();
        options(&tmp, "test", writer.build(key))
            .store()
            .unwrap()
            .replace(sample().into())
            .await
            .unwrap();

        for reader in Backend::ALL {
            let secrets = read(&options(&tmp, "test", reader.build(key))).await.unwrap();
            assert_eq!(secrets, sample(), "{writer:?} -> {reader:?}");
        }
    }
}

#[tokio::test]
async fn test_backends_agree_on_errors() {
    let mut kinds = Vec::new();

    for backend in Backend::ALL {
        let tmp = TempDir::new().unwrap();
        let store = options(&tmp, "test", backend.build(random_key())).store().unwrap();
        store.replace(sample().into()).await.unwrap();

        let invalid = store.replace(Contents::from("not json")).await.unwrap_err();
        let wrong_key = read(&options(&tmp, "test", backend.build(random_key())))
            .await
            .unwrap_err();

        std::fs::write(store.path(), "garbage-without-separator").unwrap();
        let corrupt = store.read().await.unwrap_err();

        kinds.push([discriminant(&invalid), discriminant(&wrong_key), discriminant(&corrupt)]);
        assert!(matches!(invalid, CredentialsError::InvalidFormat { .. }), "{backend:?}");
        assert!(matches!(wrong_key, CredentialsError::Decryption { .. }), "{backend:?}");
        assert!(matches!(corrupt, CredentialsError::Decryption { .. }), "{backend:?}");
    }

    assert!(kinds.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_environments() {
    let tmp = TempDir::new().unwrap();
    let key = random_key();

    let mut handles = Vec::new();
    for (i, env) in ["development", "production", "stage"].into_iter().enumerate() {
        let opts = options(&tmp, env, Backend::Delayed.build(key));
        handles.push(tokio::spawn(async move {
            let secrets: Secrets = [("INDEX", json!(i))].into_iter().collect();
            opts.store().unwrap().replace(secrets.clone().into()).await.unwrap();
            assert_eq!(read(&opts).await.unwrap(), secrets);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut files: Vec<_> = std::fs::read_dir(tmp.path().join("credentials"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    files.sort();
    assert_eq!(
        files,
        [
            "credentials.dev.json.enc",
            "credentials.prod.json.enc",
            "credentials.stage.json.enc"
        ]
    );
}
