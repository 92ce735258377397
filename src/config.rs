use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{JenkinsBtError, Result};

const DEFAULT_CONFIG_FILE: &str = "jenkins-bt-config.yml";

/// Validated configuration for one run.
///
/// Built once from the configuration document and passed by reference to the
/// components that need it. Aliases keep their declaration order so that
/// phases and tables list jobs the way the user wrote them.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Url,
    pub auth: Auth,
    /// Alias -> Jenkins job name
    pub aliases: IndexMap<String, String>,
    /// (dependent alias, prerequisite alias)
    pub dependencies: Vec<(String, String)>,
    pub polling: PollingConfig,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Auth {
    pub username: String,
    pub api_token: String,
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("username", &self.username)
            .field("api_token", &"***")
            .finish()
    }
}

/// Status polling parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PollingConfig {
    /// Seconds between two polling ticks of a phase
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Maximum stage info lookups per job and tick
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Seconds between two stage info lookups of the same job
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,

    /// Give up on a phase after this many seconds; unbounded when absent
    #[serde(default)]
    pub phase_timeout_secs: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            retry_count: default_retry_count(),
            retry_interval_secs: default_retry_interval_secs(),
            phase_timeout_secs: None,
        }
    }
}

fn default_refresh_interval_secs() -> u64 {
    2
}

fn default_retry_count() -> u32 {
    20
}

fn default_retry_interval_secs() -> u64 {
    2
}

impl PollingConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn phase_timeout(&self) -> Option<Duration> {
        self.phase_timeout_secs.map(Duration::from_secs)
    }
}

/// The configuration document as written on disk.
///
/// `aliases` and `dependencies` are lists of single-entry mappings, e.g.
/// `- B: A` declares that B depends on A.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ConfigFile {
    endpoint: Option<String>,
    auth: Option<Auth>,
    aliases: Option<Vec<IndexMap<String, String>>>,
    dependencies: Option<Vec<IndexMap<String, String>>>,
    #[serde(default)]
    polling: PollingConfig,
}

impl Config {
    /// `~/jenkins-bt-config.yml`, or the bare file name when there is no home directory.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_CONFIG_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load and validate configuration from a file.
    ///
    /// The format is picked from the extension (`yml`/`yaml`, `toml`, `json`);
    /// anything else is parsed as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            JenkinsBtError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension {
            "toml" => Self::from_file(toml::from_str(&contents)?),
            "json" => Self::from_file(serde_json::from_str(&contents)?),
            _ => Self::from_yaml(&contents),
        }
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(contents)?;
        Self::from_file(file)
    }

    fn from_file(file: ConfigFile) -> Result<Self> {
        let endpoint = file
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| JenkinsBtError::Config("Endpoint required".to_string()))?;
        let auth = file
            .auth
            .ok_or_else(|| JenkinsBtError::Config("Authentication required".to_string()))?;

        let endpoint = Url::parse(&endpoint)
            .map_err(|e| JenkinsBtError::Config(format!("Invalid endpoint '{endpoint}': {e}")))?;

        let aliases = file.aliases.into_iter().flatten().flatten().collect();
        let dependencies = file.dependencies.into_iter().flatten().flatten().collect();

        Ok(Self {
            endpoint,
            auth,
            aliases,
            dependencies,
            polling: file.polling,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r"
endpoint: https://jenkins.example.com
auth:
  username: alice
  api-token: secret-token
aliases:
  - A: job-a
  - B: folder/job-b
  - C: job-c
dependencies:
  - B: A
  - C: A
";

    #[test]
    fn test_load_yaml_config() {
        let config = Config::from_yaml(SAMPLE).unwrap();

        assert_eq!(config.endpoint.as_str(), "https://jenkins.example.com/");
        assert_eq!(config.auth.username, "alice");
        assert_eq!(config.auth.api_token, "secret-token");
        assert_eq!(
            config.aliases.keys().collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
        assert_eq!(config.aliases["B"], "folder/job-b");
        assert_eq!(
            config.dependencies,
            vec![
                ("B".to_string(), "A".to_string()),
                ("C".to_string(), "A".to_string())
            ]
        );
        assert_eq!(config.polling, PollingConfig::default());
    }

    #[test]
    fn test_missing_endpoint_is_fatal() {
        let result = Config::from_yaml("auth: { username: a, api-token: b }");

        assert!(matches!(result, Err(JenkinsBtError::Config(ref m)) if m == "Endpoint required"));
    }

    #[test]
    fn test_missing_auth_is_fatal() {
        let result = Config::from_yaml("endpoint: https://jenkins.example.com");

        assert!(
            matches!(result, Err(JenkinsBtError::Config(ref m)) if m == "Authentication required")
        );
    }

    #[test]
    fn test_null_lists_are_empty() {
        let config = Config::from_yaml(
            r"
endpoint: https://jenkins.example.com
auth: { username: a, api-token: b }
aliases:
dependencies:
",
        )
        .unwrap();

        assert!(config.aliases.is_empty());
        assert!(config.dependencies.is_empty());
    }

    #[test]
    fn test_multi_key_entries_are_flattened() {
        let config = Config::from_yaml(
            r"
endpoint: https://jenkins.example.com
auth: { username: a, api-token: b }
aliases:
  - { A: job-a, B: job-b }
dependencies:
  - { B: A }
",
        )
        .unwrap();

        assert_eq!(config.aliases.len(), 2);
        assert_eq!(config.dependencies.len(), 1);
    }

    #[test]
    fn test_polling_overrides() {
        let config = Config::from_yaml(
            r"
endpoint: https://jenkins.example.com
auth: { username: a, api-token: b }
polling:
  refresh-interval-secs: 5
  retry-count: 3
  phase-timeout-secs: 600
",
        )
        .unwrap();

        assert_eq!(config.polling.refresh_interval(), Duration::from_secs(5));
        assert_eq!(config.polling.retry_count, 3);
        assert_eq!(config.polling.retry_interval(), Duration::from_secs(2));
        assert_eq!(config.polling.phase_timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = Config::from_yaml("endpoint: not a url\nauth: { username: a, api-token: b }");

        assert!(matches!(result, Err(JenkinsBtError::Config(_))));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let mut temp_file = NamedTempFile::with_suffix(".yml").unwrap();
        write!(temp_file, "{SAMPLE}").unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.aliases.len(), 3);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
endpoint = "https://jenkins.example.com"
aliases = [{ A = "job-a" }, { B = "job-b" }]
dependencies = [{ B = "A" }]

[auth]
username = "alice"
api-token = "t"
"#;
        write!(temp_file, "{toml_content}").unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.aliases["A"], "job-a");
        assert_eq!(config.dependencies, vec![("B".to_string(), "A".to_string())]);
    }

    #[test]
    fn test_load_from_json_file() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "endpoint": "https://jenkins.json.com",
  "auth": { "username": "bob", "api-token": "t" },
  "aliases": [{ "A": "job-a" }]
}"#;
        write!(temp_file, "{json_content}").unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.auth.username, "bob");
        assert!(config.dependencies.is_empty());
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load(Path::new("definitely-missing-config.yml"));

        assert!(matches!(result, Err(JenkinsBtError::Config(_))));
    }

    #[test]
    fn test_auth_debug_hides_token() {
        let config = Config::from_yaml(SAMPLE).unwrap();

        let debug = format!("{:?}", config.auth);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret-token"));
    }
}
