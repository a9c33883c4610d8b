use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::Path;

/// Image keys excluded from a run, parsed from the ignore list file.
///
/// Format: one key per line, blank lines ignored, `#` starts a comment line.
#[derive(Debug, Clone, Default)]
pub struct SkipSet {
    entries: BTreeSet<String>,
}

impl SkipSet {
    /// Load the ignore list at `path`.
    ///
    /// A missing file is not an error; it yields an empty set. An I/O error
    /// mid-read is logged and the entries parsed up to that point are kept;
    /// the run continues.
    pub fn load(path: &Path) -> Self {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no ignore list");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot open ignore list");
                return Self::default();
            }
        };

        let mut entries = BTreeSet::new();
        for line in std::io::BufReader::new(file).lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "reading ignore list failed; keeping entries parsed so far"
                    );
                    break;
                }
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            entries.insert(line.to_owned());
        }

        Self { entries }
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_empty_set() {
        let tmp = TempDir::new().unwrap();
        let skip = SkipSet::load(&tmp.path().join(".dwignore"));
        assert!(skip.is_empty());
    }

    #[test]
    fn parses_keys_skipping_blanks_and_comments() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".dwignore");
        std::fs::write(
            &path,
            "# images we never build\n\nexample/image2\n  example/image5  \n#example/image1\n",
        )
        .unwrap();

        let skip = SkipSet::load(&path);
        assert_eq!(skip.len(), 2);
        assert!(skip.contains("example/image2"));
        assert!(skip.contains("example/image5"));
        assert!(!skip.contains("example/image1"));
    }

    #[test]
    fn from_entries_collects() {
        let skip = SkipSet::from_entries(["a/b", "c/d"]);
        assert!(skip.contains("a/b"));
        assert!(skip.contains("c/d"));
        assert!(!skip.contains("e/f"));
    }
}
