//! Configuration loading.
//!
//! Priority order:
//! 1. Command-line flag (highest priority)
//! 2. Environment variable (`SANAD_DATA`, handled by clap)
//! 3. TOML config file
//! 4. Compiled defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::resolver::ResolverConfig;

pub const DEFAULT_CONFIG_FILE: &str = "sanad.toml";

/// Contents of `sanad.toml`:
///
/// ```toml
/// data = "data/narrators.json"
///
/// [resolver]
/// limit = 8
/// cutoff = 0.7
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dataset file or directory.
    pub data: Option<PathBuf>,
    pub resolver: ResolverConfig,
}

impl Config {
    /// Read an explicitly named file, or `sanad.toml` in the working
    /// directory if it exists. Only a named file is required to exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| Error::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.resolver.validate()?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Layer command-line (or environment) values over the file values.
    pub fn with_overrides(
        mut self,
        data: Option<PathBuf>,
        limit: Option<usize>,
        cutoff: Option<f64>,
    ) -> Result<Self> {
        if data.is_some() {
            self.data = data;
        }
        if let Some(limit) = limit {
            self.resolver.limit = limit;
        }
        if let Some(cutoff) = cutoff {
            self.resolver.cutoff = cutoff;
        }
        self.resolver.validate()?;
        Ok(self)
    }

    pub fn data_path(&self) -> Result<&Path> {
        self.data.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "no dataset given; pass --data, set SANAD_DATA or add `data` to {DEFAULT_CONFIG_FILE}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{DEFAULT_CUTOFF, DEFAULT_LIMIT};

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.resolver.limit, DEFAULT_LIMIT);
        assert_eq!(config.resolver.cutoff, DEFAULT_CUTOFF);
        assert!(matches!(config.data_path(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sanad.toml");
        fs::write(&path, "data = \"narrators.json\"\n\n[resolver]\ncutoff = 0.8\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.data_path().unwrap(), Path::new("narrators.json"));
        assert_eq!(config.resolver.cutoff, 0.8);
        assert_eq!(config.resolver.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(Some(dir.path().join("missing.toml").as_path())),
            Err(Error::Io { .. })
        ));

        let typo = dir.path().join("typo.toml");
        fs::write(&typo, "[resolver]\nlimt = 3\n").unwrap();
        assert!(matches!(Config::from_file(&typo), Err(Error::Toml { .. })));

        let bad_cutoff = dir.path().join("cutoff.toml");
        fs::write(&bad_cutoff, "[resolver]\ncutoff = 2.0\n").unwrap();
        assert!(matches!(Config::from_file(&bad_cutoff), Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides_win() {
        let base = Config {
            data: Some(PathBuf::from("from_file.json")),
            resolver: ResolverConfig { limit: 5, cutoff: 0.6 },
        };
        let config = base
            .clone()
            .with_overrides(Some(PathBuf::from("from_cli.json")), Some(3), None)
            .unwrap();
        assert_eq!(config.data_path().unwrap(), Path::new("from_cli.json"));
        assert_eq!(config.resolver, ResolverConfig { limit: 3, cutoff: 0.6 });

        let kept = base.clone().with_overrides(None, None, None).unwrap();
        assert_eq!(kept, base);

        assert!(base.with_overrides(None, Some(0), None).is_err());
    }
}
