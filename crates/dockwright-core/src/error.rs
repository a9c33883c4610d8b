use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("images root {path} not found — run dockwright from your project root")]
    ImagesRootMissing { path: PathBuf },

    #[error("failed to scan images root at {path}")]
    ImagesScan {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read descriptor at {path}")]
    DescriptorRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse descriptor at {path}")]
    DescriptorParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("cyclic image dependency through '{key}': {}", path.join(" -> "))]
    CyclicDependency { key: String, path: Vec<String> },

    #[error("failed to read credential store at {path}")]
    CredentialRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse credential store at {path}")]
    CredentialParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to create workspace directory {path}")]
    WorkspaceSetup {
        path: PathBuf,
        source: std::io::Error,
    },
}
