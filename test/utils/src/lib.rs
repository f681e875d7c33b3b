use std::io::Cursor;
use std::io::Write;

use zip::write::FileOptions;
use zip::ZipWriter;

/// Builds an in-memory ZIP archive. Entries whose path ends with `/` are
/// written as directories.
pub fn zip_fixture(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    for (path, content) in entries {
        if path.ends_with('/') {
            writer.add_directory(*path, options).unwrap();
            continue;
        }

        writer.start_file(*path, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }

    return writer.finish().unwrap().into_inner();
}

pub fn javascript_fixture() -> Vec<(&'static str, &'static str)> {
    return vec![
        ("src/", ""),
        (
            "src/index.js",
            r#"
import { sum } from "./math.js";

console.log(sum(1, 2));
"#
            .trim(),
        ),
        (
            "src/math.js",
            r#"
export function sum(a, b) {
    return a + b;
}
"#
            .trim(),
        ),
        ("package.json", r#"{ "name": "fixture" }"#),
        ("package-lock.json", r#"{ "lockfileVersion": 3 }"#),
        ("__MACOSX/._index.js", "resource fork"),
        (".DS_Store", "finder"),
    ];
}
