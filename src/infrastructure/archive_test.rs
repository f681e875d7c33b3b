use anyhow::Result;
use test_utils::javascript_fixture;
use test_utils::zip_fixture;

use super::ArchiveExtractor;
use super::DEFAULT_MAX_SIZE;
use crate::domain::models::FileEntry;
use crate::domain::models::QuizError;

#[test]
fn it_filters_metadata_and_manifests() -> Result<()> {
    let bytes = zip_fixture(&[
        ("__MACOSX/._a", "fork"),
        (".DS_Store", "finder"),
        ("package.json", "{}"),
        ("src/index.js", "console.log(1);"),
    ]);

    let files = ArchiveExtractor::new(DEFAULT_MAX_SIZE).extract(&bytes)?;
    assert_eq!(files, vec![FileEntry::new("src/index.js", "console.log(1);")]);

    return Ok(());
}

#[test]
fn it_extracts_a_project_sorted_by_path() -> Result<()> {
    let bytes = zip_fixture(&javascript_fixture());

    let files = ArchiveExtractor::new(DEFAULT_MAX_SIZE).extract(&bytes)?;
    let paths = files
        .iter()
        .map(|file| return file.path.to_string())
        .collect::<Vec<String>>();

    assert_eq!(paths, vec!["src/index.js", "src/math.js"]);
    assert!(files[1].content.contains("export function sum"));

    return Ok(());
}

#[test]
fn it_ignores_nested_package_manifests() -> Result<()> {
    let bytes = zip_fixture(&[
        ("web/package-lock.json", "{}"),
        ("web/package.json", "{}"),
        ("web/packages.js", "export {};"),
    ]);

    let files = ArchiveExtractor::new(DEFAULT_MAX_SIZE).extract(&bytes)?;
    assert_eq!(files, vec![FileEntry::new("web/packages.js", "export {};")]);

    return Ok(());
}

#[test]
fn it_returns_nothing_for_an_archive_of_metadata() -> Result<()> {
    let bytes = zip_fixture(&[("src/", ""), (".gitignore", "target")]);

    let files = ArchiveExtractor::new(DEFAULT_MAX_SIZE).extract(&bytes)?;
    assert!(files.is_empty());

    return Ok(());
}

#[test]
fn it_fails_on_corrupt_archives() {
    let res = ArchiveExtractor::new(DEFAULT_MAX_SIZE).extract(b"definitely not a zip");
    assert!(matches!(res, Err(QuizError::Extraction { .. })));
}

#[test]
fn it_fails_on_archives_over_the_limit() {
    let bytes = zip_fixture(&javascript_fixture());

    let res = ArchiveExtractor::new(16).extract(&bytes);
    assert_eq!(
        res.unwrap_err(),
        QuizError::Extraction {
            reason: format!("archive is {} bytes, the limit is 16 bytes", bytes.len())
        }
    );
}

#[test]
fn it_fails_when_contents_expand_past_the_limit() {
    let content = "a".repeat(4096);
    let bytes = zip_fixture(&[("big.txt", content.as_str())]);
    assert!((bytes.len() as u64) < 2048);

    let res = ArchiveExtractor::new(2048).extract(&bytes);
    assert!(matches!(res, Err(QuizError::Extraction { .. })));
}

/// Rewrites the uncompressed size recorded in the local and central headers
/// of a single-entry archive.
fn understate_size(mut bytes: Vec<u8>, size: u32) -> Vec<u8> {
    let headers = [(b"PK\x03\x04", 22), (b"PK\x01\x02", 24)];
    for (signature, offset) in headers {
        let start = bytes
            .windows(4)
            .position(|window| return window == signature)
            .unwrap();
        bytes[start + offset..start + offset + 4].copy_from_slice(&size.to_le_bytes());
    }

    return bytes;
}

#[test]
fn it_fails_when_headers_understate_the_size() {
    let content = "a".repeat(4096);
    let bytes = understate_size(zip_fixture(&[("big.txt", content.as_str())]), 10);

    let res = ArchiveExtractor::new(2048).extract(&bytes);
    assert_eq!(
        res.unwrap_err(),
        QuizError::Extraction {
            reason: "archive is 2049 bytes, the limit is 2048 bytes".to_string()
        }
    );
}

#[tokio::test]
async fn it_extracts_from_disk() -> Result<()> {
    let archive_path = std::env::temp_dir().join(format!("codeva-{}.zip", uuid::Uuid::new_v4()));
    tokio::fs::write(&archive_path, zip_fixture(&javascript_fixture())).await?;

    let res = ArchiveExtractor::new(DEFAULT_MAX_SIZE)
        .extract_file(&archive_path)
        .await;
    tokio::fs::remove_file(&archive_path).await?;

    assert_eq!(res?.len(), 2);
    return Ok(());
}
