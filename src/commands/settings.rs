use serde::Serialize;

use crate::cli::{SettingsCommand, SettingsSetArgs};
use crate::config::{self, BatchSize, Settings, Theme};
use crate::context::AppContext;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsView<'a> {
    profile: &'a str,
    openai_key: Option<String>,
    openai_model: &'a str,
    use_snippet: bool,
    theme: Theme,
    batch: u32,
    default_important_only: bool,
    client_id_set: bool,
}

impl<'a> SettingsView<'a> {
    fn new(profile: &'a str, settings: &'a Settings) -> Self {
        Self {
            profile,
            openai_key: settings.masked_openai_key(),
            openai_model: settings.openai_model(),
            use_snippet: settings.use_snippet,
            theme: settings.theme,
            batch: settings.batch.count(),
            default_important_only: settings.default_important_only,
            client_id_set: settings.client_id().is_ok(),
        }
    }

    fn lines(&self) -> String {
        [
            format!("profile: {}", self.profile),
            format!(
                "openai key: {}",
                self.openai_key.as_deref().unwrap_or("(not set)")
            ),
            format!("model: {}", self.openai_model),
            format!("send snippets: {}", self.use_snippet),
            format!("theme: {}", self.theme),
            format!("batch: {}", self.batch),
            format!("important only by default: {}", self.default_important_only),
            format!("oauth client configured: {}", self.client_id_set),
        ]
        .join("\n")
    }
}

pub fn run(ctx: &AppContext, command: SettingsCommand) -> AppResult<()> {
    match command {
        SettingsCommand::Show => {
            let view = SettingsView::new(&ctx.profile, &ctx.settings);
            ctx.output.emit(&view.lines(), &view)
        }
        SettingsCommand::Set(args) => {
            let updated = apply(ctx.settings.clone(), args)?;
            config::save_settings(&ctx.paths, &ctx.profile, &updated)?;
            tracing::info!(profile = %ctx.profile, "saved settings");

            let view = SettingsView::new(&ctx.profile, &updated);
            ctx.output.emit(&view.lines(), &view)
        }
    }
}

fn apply(mut settings: Settings, args: SettingsSetArgs) -> AppResult<Settings> {
    if let Some(key) = args.openai_key {
        let key = key.trim().to_string();
        settings.openai_key = (!key.is_empty()).then_some(key);
    }
    if let Some(model) = args.model {
        settings.openai_model = Some(model);
    }
    if let Some(use_snippet) = args.use_snippet {
        settings.use_snippet = use_snippet;
    }
    if let Some(theme) = args.theme {
        settings.theme = theme.parse()?;
    }
    if let Some(batch) = args.batch {
        settings.batch = BatchSize::try_from(batch)?;
    }
    if let Some(important_only) = args.default_important_only {
        settings.default_important_only = important_only;
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn no_changes() -> SettingsSetArgs {
        SettingsSetArgs {
            openai_key: None,
            model: None,
            use_snippet: None,
            theme: None,
            batch: None,
            default_important_only: None,
        }
    }

    #[test]
    fn applies_only_given_fields() {
        let settings = apply(
            Settings::default(),
            SettingsSetArgs {
                openai_key: Some("sk-abcdefghijkl".to_string()),
                batch: Some(30),
                theme: Some("dark".to_string()),
                ..no_changes()
            },
        )
        .expect("apply");

        assert_eq!(settings.openai_key(), Some("sk-abcdefghijkl"));
        assert_eq!(settings.batch, BatchSize::Thirty);
        assert_eq!(settings.theme, Theme::Dark);
        assert!(!settings.use_snippet);
    }

    #[test]
    fn empty_key_clears_it() {
        let settings = Settings {
            openai_key: Some("sk-old".to_string()),
            ..Settings::default()
        };
        let settings = apply(
            settings,
            SettingsSetArgs {
                openai_key: Some("  ".to_string()),
                ..no_changes()
            },
        )
        .expect("apply");
        assert_eq!(settings.openai_key, None);
    }

    #[test]
    fn rejects_unsupported_batch() {
        let result = apply(
            Settings::default(),
            SettingsSetArgs {
                batch: Some(25),
                ..no_changes()
            },
        );
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn view_masks_the_key() {
        let settings = Settings {
            openai_key: Some("sk-abcdefghijkl".to_string()),
            ..Settings::default()
        };
        let view = SettingsView::new("default", &settings);
        assert_eq!(view.openai_key.as_deref(), Some("****ijkl"));
        assert!(view.lines().contains("openai key: ****ijkl"));
    }
}
