use crate::config::AppPaths;
use crate::config::files;
use crate::error::AppResult;

use super::TokenSet;

pub trait TokenStore: Send + Sync {
    fn load(&self, profile: &str) -> AppResult<Option<TokenSet>>;
    fn save(&self, profile: &str, token: &TokenSet) -> AppResult<()>;
    fn clear(&self, profile: &str) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    paths: AppPaths,
}

impl FileTokenStore {
    pub fn new(paths: AppPaths) -> Self {
        Self { paths }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, profile: &str) -> AppResult<Option<TokenSet>> {
        files::read_json(&self.paths.token_file(profile))
    }

    fn save(&self, profile: &str, token: &TokenSet) -> AppResult<()> {
        files::write_json_private(&self.paths.token_file(profile), token)
    }

    fn clear(&self, profile: &str) -> AppResult<()> {
        files::remove_if_exists(&self.paths.token_file(profile))
    }
}
