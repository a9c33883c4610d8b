use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// Tokens read from the workspace auth file.
///
/// The file is written by an external authorization flow; dockwright only
/// reads it. If the user revokes a token it is their responsibility to
/// delete the stale file.
///
/// ```json
/// { "github-oauth": { "github.com": "ghp_..." } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialStore {
    #[serde(default, rename = "github-oauth")]
    github_oauth: BTreeMap<String, String>,
}

impl CredentialStore {
    /// Load the credential store at `path`. A missing file yields an empty
    /// store; having no token is a normal state, not an error.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no credential store");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(crate::Error::CredentialRead {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        serde_json::from_str(&text).map_err(|e| crate::Error::CredentialParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// The OAuth token for `host`, if one is stored.
    pub fn token_for(&self, host: &str) -> Option<&str> {
        self.github_oauth.get(host).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_an_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = CredentialStore::load(&tmp.path().join("auth.json")).unwrap();
        assert!(store.token_for("github.com").is_none());
    }

    #[test]
    fn reads_token_for_host() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("auth.json");
        std::fs::write(&path, r#"{"github-oauth": {"github.com": "ghp_abc123"}}"#).unwrap();

        let store = CredentialStore::load(&path).unwrap();
        assert_eq!(store.token_for("github.com"), Some("ghp_abc123"));
        assert_eq!(store.token_for("gitlab.com"), None);
    }

    #[test]
    fn malformed_store_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("auth.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(CredentialStore::load(&path).is_err());
    }
}
