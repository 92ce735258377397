use thiserror::Error;

#[derive(Error, Debug)]
pub enum JenkinsBtError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown alias '{alias}' referenced by {context}")]
    UnknownAlias { alias: String, context: String },

    #[error("Jenkins API request failed (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No stage info for {job} #{build} after {attempts} attempts")]
    StatusUnavailable {
        job: String,
        build: u64,
        attempts: u32,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, JenkinsBtError>;
