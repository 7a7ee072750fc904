use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Directory of debug copies of extracted text, one file per source name.
/// Never read back by the pipeline; write failures are logged and ignored.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Deterministic side-file path for `file_name`.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.root.join(format!("{}.txt", scratch_key(file_name)))
    }

    pub fn write(&self, file_name: &str, text: &str) {
        let path = self.path_for(file_name);
        let result = std::fs::create_dir_all(&self.root).and_then(|_| std::fs::write(&path, text));
        match result {
            Ok(()) => debug!("Wrote extracted text to {}", path.display()),
            Err(e) => warn!("Could not write scratch file {}: {e}", path.display()),
        }
    }
}

/// Flattens a file name's stem into a safe single path component.
fn scratch_key(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);

    let key: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let key = key.trim_start_matches('.');
    if key.is_empty() {
        "resume".to_string()
    } else {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic_and_flat() {
        assert_eq!(scratch_key("Jane Roe CV.pdf"), "Jane_Roe_CV");
        assert_eq!(scratch_key("cv.v2.docx"), "cv.v2");
        assert_eq!(scratch_key("../../etc/passwd"), "passwd");
        assert_eq!(scratch_key(".hidden"), "hidden");
        assert_eq!(scratch_key(""), "resume");
    }

    #[test]
    fn test_path_uses_stem() {
        let dir = ScratchDir::new(PathBuf::from("/tmp/scratch"));
        assert_eq!(dir.path_for("uploads/cv.pdf"), PathBuf::from("/tmp/scratch/cv.txt"));
    }

    #[test]
    fn test_write_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ScratchDir::new(tmp.path().join("nested").join("parsed"));
        dir.write("cv.pdf", "text");
        assert_eq!(
            std::fs::read_to_string(dir.path_for("cv.pdf")).unwrap(),
            "text"
        );
    }
}
