//! XDG-compliant path resolution for glossarion.
//!
//! All persistent state (response cache, fact index, CTS URN index, CDSL
//! index) lives under the per-user data directory; the config file under the
//! config directory. File names are stable so deployments can prebuild and
//! ship the read-only indexes.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(glossarion::paths::no_home),
        help("Set the HOME environment variable or ensure a valid user profile exists.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(glossarion::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG-compliant directories for glossarion.
#[derive(Debug, Clone)]
pub struct GlossarionPaths {
    /// `$XDG_CONFIG_HOME/glossarion/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/glossarion/`
    pub data_dir: PathBuf,
    /// `$XDG_STATE_HOME/glossarion/`
    pub state_dir: PathBuf,
    /// `$XDG_CACHE_HOME/glossarion/`
    pub cache_dir: PathBuf,
}

impl GlossarionPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("glossarion");

        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/share"))
            .join("glossarion");

        let state_dir = std::env::var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/state"))
            .join("glossarion");

        let cache_dir = std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".cache"))
            .join("glossarion");

        Ok(Self {
            config_dir,
            data_dir,
            state_dir,
            cache_dir,
        })
    }

    /// Build a layout rooted at an explicit data directory (`--data-dir`).
    pub fn rooted_at(root: PathBuf) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.clone(),
            state_dir: root.join("state"),
            cache_dir: root.join("cache"),
        }
    }

    /// Create all base directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [
            &self.config_dir,
            &self.data_dir,
            &self.state_dir,
            &self.cache_dir,
        ] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Path to the response cache database.
    pub fn cache_file(&self) -> PathBuf {
        self.data_dir.join("cache.redb")
    }

    /// Path to the fact index database.
    pub fn facts_file(&self) -> PathBuf {
        self.data_dir.join("facts.redb")
    }

    /// Path to the prebuilt CTS URN index.
    pub fn cts_file(&self) -> PathBuf {
        self.data_dir.join("cts.redb")
    }

    /// Path to the locally-built CDSL index.
    pub fn cdsl_file(&self) -> PathBuf {
        self.data_dir.join("cdsl.redb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_paths_contain_app_dir() {
        let paths = GlossarionPaths::resolve().unwrap();
        assert!(paths.config_dir.to_string_lossy().contains("glossarion"));
        assert!(paths.data_dir.to_string_lossy().contains("glossarion"));
    }

    #[test]
    fn data_files_have_stable_names() {
        let paths = GlossarionPaths::rooted_at(PathBuf::from("/tmp/g"));
        assert_eq!(paths.cache_file(), PathBuf::from("/tmp/g/cache.redb"));
        assert_eq!(paths.facts_file(), PathBuf::from("/tmp/g/facts.redb"));
        assert_eq!(paths.cts_file(), PathBuf::from("/tmp/g/cts.redb"));
        assert_eq!(paths.cdsl_file(), PathBuf::from("/tmp/g/cdsl.redb"));
    }
}
