use std::io;

use bytes::Bytes;
use futures::stream;

use impresso::application::ports::BlobStore;
use impresso::domain::{JobId, StoragePath};
use impresso::infrastructure::storage::LocalBlobStore;

fn create_test_store() -> (tempfile::TempDir, LocalBlobStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = LocalBlobStore::new(dir.path().to_path_buf()).unwrap();
    (dir, store)
}

#[tokio::test]
async fn given_valid_stream_when_storing_then_size_is_reported() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::for_job(JobId::new(), "jpg");

    let chunks: Vec<Result<Bytes, io::Error>> =
        vec![Ok(Bytes::from("hello ")), Ok(Bytes::from("world"))];
    let byte_stream = Box::pin(stream::iter(chunks));

    let size = store.store(&path, byte_stream).await.unwrap();
    assert_eq!(size, 11);
}

#[tokio::test]
async fn given_stored_file_when_fetching_then_bytes_match_original() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::for_job(JobId::new(), "png");

    let content = b"test content";
    store
        .store_bytes(&path, Bytes::from(&content[..]))
        .await
        .unwrap();

    let fetched = store.fetch(&path).await.unwrap();
    assert_eq!(fetched.as_ref(), content);
}

#[tokio::test]
async fn given_stored_file_when_deleting_then_fetch_returns_not_found() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::for_job(JobId::new(), "jpg");

    store
        .store_bytes(&path, Bytes::from("data"))
        .await
        .unwrap();

    store.delete(&path).await.unwrap();

    let result = store.fetch(&path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn given_stream_error_when_storing_then_returns_error() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::for_job(JobId::new(), "jpg");

    let chunks: Vec<Result<Bytes, io::Error>> = vec![
        Ok(Bytes::from("partial")),
        Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "network drop",
        )),
    ];
    let byte_stream = Box::pin(stream::iter(chunks));

    let result = store.store(&path, byte_stream).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn given_nonexistent_path_when_fetching_then_returns_not_found() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::from_raw("nonexistent.jpg");

    let result = store.fetch(&path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn given_stored_file_when_checking_existence_then_returns_true() {
    let (_dir, store) = create_test_store();
    let path = StoragePath::for_job(JobId::new(), "webp");

    store
        .store_bytes(&path, Bytes::from("payload"))
        .await
        .unwrap();

    assert!(store.exists(&path).await.unwrap());
    assert!(!store.exists(&StoragePath::from_raw("other.webp")).await.unwrap());
}
