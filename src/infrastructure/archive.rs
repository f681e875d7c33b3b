#[cfg(test)]
#[path = "archive_test.rs"]
mod tests;

use std::io::Cursor;
use std::io::Read;
use std::path;

use anyhow::Result;
use tokio::fs;
use zip::ZipArchive;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::FileEntry;
use crate::domain::models::QuizError;

pub const DEFAULT_MAX_SIZE: u64 = 50 * 1024 * 1024;

const IGNORED_FILE_NAMES: [&str; 2] = ["package.json", "package-lock.json"];

/// Reads an uploaded ZIP archive into the flat list of files submitted to the
/// quiz.
pub struct ArchiveExtractor {
    max_size: u64,
}

impl Default for ArchiveExtractor {
    fn default() -> ArchiveExtractor {
        let max_size = Config::get(ConfigKey::MaxArchiveSize)
            .parse::<u64>()
            .unwrap_or(DEFAULT_MAX_SIZE);

        return ArchiveExtractor::new(max_size);
    }
}

impl ArchiveExtractor {
    pub fn new(max_size: u64) -> ArchiveExtractor {
        return ArchiveExtractor { max_size };
    }

    pub async fn extract_file(&self, archive_path: &path::Path) -> Result<Vec<FileEntry>> {
        let metadata = fs::metadata(archive_path).await?;
        if metadata.len() > self.max_size {
            return Err(self.too_large(metadata.len()).into());
        }

        let bytes = fs::read(archive_path).await?;
        let files = self.extract(&bytes)?;

        tracing::info!(
            archive = archive_path.to_string_lossy().to_string(),
            files = files.len(),
            "Extracted archive"
        );

        return Ok(files);
    }

    /// Files are sorted by path. Directories, OS metadata, hidden files,
    /// package manifests and files that are not UTF-8 text are left out.
    pub fn extract(&self, bytes: &[u8]) -> Result<Vec<FileEntry>, QuizError> {
        if bytes.len() as u64 > self.max_size {
            return Err(self.too_large(bytes.len() as u64));
        }

        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(QuizError::extraction)?;

        let mut total_size: u64 = 0;
        let mut files = vec![];
        for idx in 0..archive.len() {
            let mut file = archive.by_index(idx).map_err(QuizError::extraction)?;
            let name = file.name().to_string();
            if file.is_dir() || is_ignored(&name) {
                continue;
            }

            let remaining = self.max_size - total_size;
            if file.size() > remaining {
                return Err(self.too_large(total_size + file.size()));
            }

            // Headers can understate the real size, so the read itself is
            // capped one byte past what is left.
            let mut content = vec![];
            (&mut file)
                .take(remaining + 1)
                .read_to_end(&mut content)
                .map_err(QuizError::extraction)?;

            total_size += content.len() as u64;
            if total_size > self.max_size {
                return Err(self.too_large(total_size));
            }

            match String::from_utf8(content) {
                Ok(text) => files.push(FileEntry::new(&name, &text)),
                Err(_) => {
                    tracing::debug!(path = name, "Skipping binary file");
                }
            }
        }

        files.sort_by(|a, b| return a.path.cmp(&b.path));
        return Ok(files);
    }

    fn too_large(&self, size: u64) -> QuizError {
        return QuizError::extraction(format!(
            "archive is {size} bytes, the limit is {} bytes",
            self.max_size
        ));
    }
}

fn is_ignored(name: &str) -> bool {
    if name.starts_with("__MACOSX") || name.starts_with('.') {
        return true;
    }

    let file_name = name.rsplit('/').next().unwrap_or(name);
    return IGNORED_FILE_NAMES.contains(&file_name);
}
