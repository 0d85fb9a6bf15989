use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::{InjectorError, Result};

/// Directory under the working directory holding replacement shaders by default.
pub const DEFAULT_SHADER_ROOT: &str = "Data/shadersfx";

/// What the injector does with the shaders it sees.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderMode {
    /// Write every shader to disk and record it in the technique ledger.
    Dump,
    /// Substitute shaders found on disk.
    Replace,
}

/// Logging setup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Log file to append to. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Injector configuration, usually read from a TOML file next to the host executable.
///
/// ```toml
/// shader_dump_path = "D:/dump"
/// insert_debug_markers = true
///
/// [log]
/// level = "trace"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InjectorConfig {
    /// Selects dump mode when set to a non-empty path, which also becomes the shader root.
    pub shader_dump_path: Option<PathBuf>,
    /// Replace-mode shader root. Defaults to [`DEFAULT_SHADER_ROOT`] under the working
    /// directory.
    pub shader_root: Option<PathBuf>,
    /// Name compiled pipelines after their technique.
    pub insert_debug_markers: bool,
    pub log: LogConfig,
}

impl InjectorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|err| InjectorError::Config(err.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    fn dump_path(&self) -> Option<&Path> {
        self.shader_dump_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    pub fn mode(&self) -> ShaderMode {
        match self.dump_path() {
            Some(_) => ShaderMode::Dump,
            None => ShaderMode::Replace,
        }
    }

    /// The directory shaders are dumped to or replaced from.
    pub fn shader_bin_directory(&self) -> PathBuf {
        let directory = match (self.dump_path(), &self.shader_root) {
            (Some(dump), _) => dump.to_path_buf(),
            (None, Some(root)) => root.clone(),
            (None, None) => std::env::current_dir()
                .unwrap_or_default()
                .join(DEFAULT_SHADER_ROOT),
        };

        info!("Shader bin directory: {}", directory.display());
        directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_replaces_from_the_default_root() {
        let config = InjectorConfig::from_toml_str("").unwrap();

        assert_eq!(config, InjectorConfig::default());
        assert_eq!(config.mode(), ShaderMode::Replace);
        assert!(config.shader_bin_directory().ends_with("Data/shadersfx"));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn dump_path_selects_dump_mode() {
        let config = InjectorConfig::from_toml_str(
            r#"
            shader_dump_path = "/tmp/dump"
            shader_root = "/srv/shaders"
            insert_debug_markers = true

            [log]
            level = "trace"
            file = "injector.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.mode(), ShaderMode::Dump);
        assert_eq!(config.shader_bin_directory(), PathBuf::from("/tmp/dump"));
        assert!(config.insert_debug_markers);
        assert_eq!(config.log.file.as_deref(), Some(Path::new("injector.log")));
    }

    #[test]
    fn empty_dump_path_means_replace() {
        let config = InjectorConfig::from_toml_str(
            r#"
            shader_dump_path = ""
            shader_root = "/srv/shaders"
            "#,
        )
        .unwrap();

        assert_eq!(config.mode(), ShaderMode::Replace);
        assert_eq!(config.shader_bin_directory(), PathBuf::from("/srv/shaders"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            InjectorConfig::from_toml_str("shader_dumps = 1"),
            Err(InjectorError::Config(_))
        ));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("injector.toml");
        std::fs::write(&path, "insert_debug_markers = true\n").unwrap();

        assert!(InjectorConfig::load(&path).unwrap().insert_debug_markers);
        assert!(matches!(
            InjectorConfig::load(dir.path().join("missing.toml")),
            Err(InjectorError::Io(_))
        ));
    }
}
