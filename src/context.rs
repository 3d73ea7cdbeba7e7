use std::sync::Arc;

use reqwest::Client;

use crate::api::{GmailClient, GmailMailbox};
use crate::auth::{AuthService, FileTokenStore, OAuthCredentials};
use crate::classifier::OpenAiClassifier;
use crate::config::{self, AppPaths, Settings};
use crate::error::AppResult;
use crate::notify::DesktopNotifier;
use crate::output::Output;
use crate::store::FileStore;
use crate::sync::{InboxSync, SyncOptions};

#[derive(Debug)]
pub struct AppContext {
    pub profile: String,
    pub paths: AppPaths,
    pub settings: Settings,
    pub token_store: FileTokenStore,
    pub auth: AuthService,
    pub http: Client,
    pub output: Output,
}

impl AppContext {
    pub fn bootstrap(profile: String, json: bool) -> AppResult<Self> {
        let profile = config::resolve_profile(&profile)?;
        let paths = AppPaths::discover()?;
        let settings = config::load_settings(&paths, &profile)?;
        let token_store = FileTokenStore::new(paths.clone());
        let http = Client::new();
        let auth = AuthService::new(http.clone());

        tracing::debug!(
            %profile,
            config = %paths.config_dir().display(),
            data = %paths.data_dir().display(),
            "loaded profile"
        );

        Ok(Self {
            profile,
            paths,
            settings,
            token_store,
            auth,
            http,
            output: Output::new(json),
        })
    }

    pub fn inbox_sync(&self) -> InboxSync {
        let credentials = OAuthCredentials::new(
            self.profile.clone(),
            self.settings.clone(),
            self.token_store.clone(),
            self.auth.clone(),
        );
        let mailbox = GmailMailbox::new(GmailClient::new(self.http.clone()), Arc::new(credentials));
        let classifier = OpenAiClassifier::new(
            self.http.clone(),
            self.settings.openai_base_url(),
            self.settings.openai_key().map(ToOwned::to_owned),
            self.settings.openai_model(),
        );
        let store = FileStore::for_profile(&self.paths, &self.profile);

        InboxSync::new(
            Arc::new(mailbox),
            Arc::new(classifier),
            Arc::new(DesktopNotifier),
            Arc::new(store),
            SyncOptions::from_settings(&self.settings),
        )
    }

    pub fn default_count(&self) -> u32 {
        self.settings.batch.count()
    }
}
