use serde_derive::Deserialize;
use serde_derive::Serialize;

/// A single text file read from an uploaded archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub content: String,
}

impl FileEntry {
    pub fn new(path: &str, content: &str) -> FileEntry {
        return FileEntry {
            path: path.to_string(),
            content: content.to_string(),
        };
    }
}
