//! Configuration types for `bnd-zig.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Enum item names (after translation) that exist only to force the
    /// enum's backing width and are dropped from the output.
    #[serde(default = "default_sentinel_items")]
    pub sentinel_items: Vec<String>,
    /// Emit a placeholder comment after every extern function where an
    /// idiomatic wrapper would go.
    #[serde(default)]
    pub wrappers: bool,
    #[serde(default)]
    pub module: Vec<ModuleConfig>,
}

fn default_sentinel_items() -> Vec<String> {
    vec!["FORCE_U32".to_string()]
}

/// A single module — one JSON declaration list to one Zig file.
#[derive(Debug, Deserialize)]
pub struct ModuleConfig {
    /// JSON declaration list produced by the header parser.
    pub input: PathBuf,
    /// Output `.zig` path. Defaults to `input` with a `.zig` extension.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Emit the generic `init_with` helper and a per-struct `init` function.
    #[serde(default)]
    pub init_helper: bool,
}

impl ModuleConfig {
    /// Input path resolved against `base_dir` (the TOML file's directory).
    pub fn input_path(&self, base_dir: &Path) -> PathBuf {
        resolve(&self.input, base_dir)
    }

    /// Output path resolved against `base_dir`.
    pub fn output_path(&self, base_dir: &Path) -> PathBuf {
        match &self.output {
            Some(p) => resolve(p, base_dir),
            None => self.input_path(base_dir).with_extension("zig"),
        }
    }

    /// Generation options for this module under the root config.
    pub fn options(&self, cfg: &Config) -> GenOptions {
        GenOptions {
            init_helper: self.init_helper,
            wrappers: cfg.wrappers,
            sentinel_items: cfg.sentinel_items.clone(),
        }
    }
}

fn resolve(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Options that shape the emitted text of one module.
#[derive(Debug, Clone)]
pub struct GenOptions {
    pub init_helper: bool,
    pub wrappers: bool,
    pub sentinel_items: Vec<String>,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            init_helper: false,
            wrappers: false,
            sentinel_items: default_sentinel_items(),
        }
    }
}

impl GenOptions {
    /// Sentinels match case-insensitively, so `FORCE_U32` covers the
    /// translated `Force_U32`.
    pub fn is_sentinel(&self, item_name: &str) -> bool {
        self.sentinel_items
            .iter()
            .any(|s| s.eq_ignore_ascii_case(item_name))
    }
}

/// Load and parse a `bnd-zig.toml` configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))?;
    Ok(config)
}
