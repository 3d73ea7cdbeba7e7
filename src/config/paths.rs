use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

const APP_DIR: &str = "email-radar";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> AppResult<Self> {
        let config_root = dirs::config_dir()
            .ok_or_else(|| AppError::Config("unable to resolve config directory".to_string()))?;
        let data_root = dirs::data_dir()
            .ok_or_else(|| AppError::Config("unable to resolve data directory".to_string()))?;

        Self::rooted(config_root.join(APP_DIR), data_root.join(APP_DIR))
    }

    pub fn rooted(config_dir: PathBuf, data_dir: PathBuf) -> AppResult<Self> {
        let paths = Self {
            config_dir,
            data_dir,
        };

        for dir in [
            paths.profiles_dir(),
            paths.tokens_dir(),
            paths.cache_dir(),
            paths.notified_dir(),
        ] {
            fs::create_dir_all(dir)?;
        }

        Ok(paths)
    }

    pub fn settings_file(&self, profile: &str) -> PathBuf {
        self.profiles_dir().join(format!("{profile}.json"))
    }

    pub fn token_file(&self, profile: &str) -> PathBuf {
        self.tokens_dir().join(format!("{profile}.json"))
    }

    pub fn cache_file(&self, profile: &str) -> PathBuf {
        self.cache_dir().join(format!("{profile}.json"))
    }

    pub fn notified_file(&self, profile: &str) -> PathBuf {
        self.notified_dir().join(format!("{profile}.json"))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn profiles_dir(&self) -> PathBuf {
        self.config_dir.join("profiles")
    }

    fn tokens_dir(&self) -> PathBuf {
        self.data_dir.join("tokens")
    }

    fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    fn notified_dir(&self) -> PathBuf {
        self.data_dir.join("notified")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_paths_create_every_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::rooted(dir.path().join("config"), dir.path().join("data"))
            .expect("paths");

        assert!(paths.config_dir().join("profiles").is_dir());
        assert!(paths.data_dir().join("cache").is_dir());
        assert!(paths.data_dir().join("notified").is_dir());
        assert_eq!(
            paths.cache_file("work"),
            dir.path().join("data").join("cache").join("work.json")
        );
    }
}
