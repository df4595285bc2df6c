//! Unit tests for the file stores

use tempfile::TempDir;

use inpaint_studio::error::AppError;
use inpaint_studio::storage::{allowed_file, sanitize_filename, FileStore};

#[tokio::test]
async fn test_save_and_read() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("uploads"));

    let path = store.save("cat.png", b"bytes").await.unwrap();
    assert!(path.ends_with("uploads/cat.png"));
    assert_eq!(store.read("cat.png").await.unwrap(), b"bytes");
    assert!(store.exists("cat.png").await);
}

#[tokio::test]
async fn test_save_overwrites() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());

    store.save("out.png", b"first").await.unwrap();
    store.save("out.png", b"second").await.unwrap();
    assert_eq!(store.read("out.png").await.unwrap(), b"second");
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());

    let err = store.read("ghost.png").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref name) if name == "ghost.png"));
    assert!(!store.exists("ghost.png").await);
}

#[tokio::test]
async fn test_unsafe_names_rejected() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("uploads"));

    assert!(store.save("../escape.png", b"x").await.is_err());
    assert!(store.read("..").await.is_err());
    assert!(!dir.path().join("escape.png").exists());
}

#[tokio::test]
async fn test_ensure_dir_creates_nested_path() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("static").join("outputs"));

    store.ensure_dir().await.unwrap();
    assert!(store.root().is_dir());
}

#[test]
fn test_upload_name_rules() {
    let allowed = vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()];

    for name in ["a.png", "b.jpg", "c.JPEG"] {
        assert!(allowed_file(name, &allowed), "{}", name);
    }
    for name in ["a.gif", "b.webp", "noext", ""] {
        assert!(!allowed_file(name, &allowed), "{}", name);
    }

    assert_eq!(sanitize_filename("holiday photo.png"), "holiday_photo.png");
    assert_eq!(sanitize_filename("../../x.png"), "x.png");
}
