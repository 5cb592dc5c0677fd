use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Best-effort debug dumps of intermediate artifacts. Failures are logged, never raised.
#[derive(Debug, Clone, Default)]
pub struct DebugDumper {
    folder: Option<PathBuf>,
}

impl DebugDumper {
    pub fn new(folder: Option<PathBuf>) -> Self {
        Self { folder }
    }

    pub fn disabled() -> Self {
        Self { folder: None }
    }

    pub fn dump_json<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> Option<PathBuf> {
        let folder = self.folder.as_deref()?;
        let written = serde_json::to_vec_pretty(data)
            .map_err(Into::into)
            .and_then(|bytes| write_dump(folder, name, &bytes));
        report(name, written)
    }

    /// Text is written as-is so Markdown keeps its formatting.
    pub fn dump_text(&self, name: &str, text: &str) -> Option<PathBuf> {
        let folder = self.folder.as_deref()?;
        report(name, write_dump(folder, name, text.as_bytes()))
    }
}

fn write_dump(folder: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(folder)?;
    let file_name = format!(
        "{}_{}",
        Utc::now().format("%Y%m%d-%H%M%S"),
        sanitize(name)
    );
    let path = folder.join(file_name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

fn report(name: &str, written: Result<PathBuf>) -> Option<PathBuf> {
    match written {
        Ok(path) => {
            tracing::debug!("Dumped {} to {}", name, path.display());
            Some(path)
        }
        Err(e) => {
            tracing::warn!("Skipping debug dump {}: {}", name, e);
            None
        }
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dumps_json_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let dumper = DebugDumper::new(Some(dir.path().join("dumps")));

        let json_path = dumper
            .dump_json("BAMA 1.0/issues.json", &json!({"key": "BAMA-1"}))
            .unwrap();
        assert!(json_path.file_name().unwrap().to_str().unwrap().ends_with("_BAMA_1.0_issues.json"));
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(written["key"], "BAMA-1");

        let text_path = dumper.dump_text("notes.md", "# Title\n\n- item\n").unwrap();
        assert_eq!(std::fs::read_to_string(text_path).unwrap(), "# Title\n\n- item\n");
    }

    #[test]
    fn test_disabled_and_unwritable_are_silent() {
        assert!(DebugDumper::disabled().dump_text("notes.md", "x").is_none());

        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        let dumper = DebugDumper::new(Some(blocker.join("nested")));
        assert!(dumper.dump_text("notes.md", "x").is_none());
    }
}
