use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level build configuration loaded from `sdkforge.yaml`.
///
/// Constructed once by the orchestrator and passed by reference to every
/// component that needs it; reloading is an explicit call, there is no
/// process-wide cached copy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Input OpenAPI document.
    pub spec: PathBuf,
    /// Stable output root the scratch trees are reconciled into.
    pub output: PathBuf,
    /// Throwaway root the generators write into.
    pub scratch: PathBuf,
    pub generators: Vec<GeneratorConfig>,
    pub docs: DocsConfig,
    pub watch: WatchConfig,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            spec: PathBuf::from("openapi.json"),
            output: PathBuf::from("sdks"),
            scratch: PathBuf::from(".sdkforge/scratch"),
            generators: Vec::new(),
            docs: DocsConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

/// One external generator invocation target.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Generator name; also names its scratch and output subdirectories.
    pub name: String,
    /// Generator executable.
    #[serde(default = "default_generator_bin")]
    pub bin: PathBuf,
    /// Template directory, also the scribe source directory.
    pub templates: PathBuf,
    /// Generator-specific config file passed through verbatim.
    #[serde(default)]
    pub config_file: Option<PathBuf>,
    /// Schema name remappings passed to the generator.
    #[serde(default)]
    pub schema_mappings: IndexMap<String, String>,
}

fn default_generator_bin() -> PathBuf {
    PathBuf::from("openapi-generator")
}

/// Hosted documentation settings consumed by the scribe transforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Production docs host used in cross-reference links.
    pub host: String,
    /// Local development host substituted unless `production` is set.
    pub dev_host: String,
    pub production: bool,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            host: "https://developers.example.com".to_string(),
            dev_host: "http://localhost:8000".to_string(),
            production: false,
        }
    }
}

/// Watch-mode settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period after a change event before a rebuild starts.
    pub debounce_ms: u64,
    /// Extra roots to watch; the spec's directory and every generator
    /// template directory are always watched.
    pub roots: Vec<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            roots: Vec::new(),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "sdkforge.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ForgeConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ForgeConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# sdkforge configuration
spec: openapi.json
output: sdks
scratch: .sdkforge/scratch

generators:
  - name: php
    bin: openapi-generator
    templates: templates/php
    # config_file: config/php.yaml
    schema_mappings: {}
      # PayloadWidget: Widget

docs:
  host: https://developers.example.com
  dev_host: http://localhost:8000
  production: false

watch:
  debounce_ms: 300
  roots: []
"#
}
