use httpmock::prelude::*;
use std::fs;
use tempfile::tempdir;

use voice_cover_core::{download_to, io::net::http_client, CoverError};

#[test]
fn download_writes_body_and_overwrites_existing_file() {
    let tmp = tempdir().unwrap();
    let dest = tmp.path().join("temp_bass.mp3");
    fs::write(&dest, b"stale contents from a previous run").unwrap();

    let body = vec![7u8; 200 * 1024];
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/stems/bass.mp3");
        then.status(200)
            .header("Content-Length", body.len().to_string().as_str())
            .body(body.clone());
    });

    let client = http_client().unwrap();
    let written = download_to(&client, &server.url("/stems/bass.mp3"), &dest).unwrap();

    mock.assert_hits(1);
    assert_eq!(written, dest);
    assert_eq!(fs::read(&dest).unwrap(), body);

    let leftovers = fs::read_dir(tmp.path()).unwrap().count();
    assert_eq!(leftovers, 1, "only the destination should remain");
}

#[test]
fn non_success_status_is_a_download_error() {
    let tmp = tempdir().unwrap();
    let dest = tmp.path().join("temp_drums.mp3");

    let server = MockServer::start();
    let _mock = server.mock(|when, then| {
        when.method(GET).path("/stems/drums.mp3");
        then.status(404).body("not found");
    });

    let url = server.url("/stems/drums.mp3");
    let client = http_client().unwrap();
    match download_to(&client, &url, &dest) {
        Err(CoverError::Download { url: u, status }) => {
            assert_eq!(u, url);
            assert_eq!(status, Some(404));
        }
        other => panic!("expected download error, got {other:?}"),
    }
    assert!(!dest.exists());
}

#[test]
fn unreachable_host_is_a_download_error_without_status() {
    let tmp = tempdir().unwrap();
    let dest = tmp.path().join("temp_other.mp3");

    // Nothing listens on port 9 of localhost.
    let client = http_client().unwrap();
    let err = download_to(&client, "http://127.0.0.1:9/other.mp3", &dest).unwrap_err();
    assert!(matches!(err, CoverError::Download { status: None, .. }));
}
