//! File and archive handling properties: idempotent downloads, zip and
//! tar.gz extraction, archive cleanup.

use std::io::Write;

use driloader::downloader::{download, extract, find_binary};
use driloader::http::{Http, ProxyConfig};

#[tokio::test]
async fn download_skips_when_destination_exists() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("chromedriver_linux64.zip");
    std::fs::write(&dest, b"already downloaded").unwrap();

    let http = Http::new(&ProxyConfig::default()).unwrap();
    // The URL is unroutable; if a request were made this would fail.
    let fetched = download(&http, "http://127.0.0.1:9/never", &dest)
        .await
        .unwrap();

    assert!(!fetched);
    assert_eq!(std::fs::read(&dest).unwrap(), b"already downloaded");
}

#[tokio::test]
async fn zip_extraction_places_the_file_and_deletes_the_archive() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("chromedriver_linux64.zip");
    let dest = dir.path().join("2.46");

    let file = std::fs::File::create(&archive).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("chromedriver", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"driver bytes").unwrap();
    writer.finish().unwrap();

    extract(&archive, &dest, true).await.unwrap();

    assert_eq!(std::fs::read(dest.join("chromedriver")).unwrap(), b"driver bytes");
    assert!(!archive.exists());
}

#[tokio::test]
async fn zip_extraction_can_keep_the_archive() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("driver.zip");
    let dest = dir.path().join("out");

    let file = std::fs::File::create(&archive).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("driver.txt", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"kept").unwrap();
    writer.finish().unwrap();

    extract(&archive, &dest, false).await.unwrap();

    assert!(dest.join("driver.txt").exists());
    assert!(archive.exists());
}

#[tokio::test]
async fn tarball_extraction_unpacks_nested_entries() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("geckodriver-v0.30.0-linux64.tar.gz");
    let dest = dir.path().join("0.30.0");

    let source = dir.path().join("geckodriver");
    std::fs::write(&source, b"gecko bytes").unwrap();

    let file = std::fs::File::create(&archive).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_path_with_name(&source, "geckodriver").unwrap();
    let encoder = builder.into_inner().unwrap();
    encoder.finish().unwrap();

    extract(&archive, &dest, true).await.unwrap();

    assert_eq!(std::fs::read(dest.join("geckodriver")).unwrap(), b"gecko bytes");
    assert!(!archive.exists());

    let found = find_binary(&dest, "geckodriver").unwrap();
    assert_eq!(found, dest.join("geckodriver"));
}
