use serde::Serialize;

use crate::api::ClassifiedMessage;
use crate::cli::InboxArgs;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::output::OutputMode;
use crate::output::text::{self, Palette};

#[derive(Debug, Serialize)]
struct InboxView<'a> {
    profile: &'a str,
    stale: bool,
    important: usize,
    emails: Vec<&'a ClassifiedMessage>,
}

pub async fn run(ctx: &AppContext, args: InboxArgs) -> AppResult<()> {
    let count = args.count.unwrap_or_else(|| ctx.default_count());
    let important_only = args.important_only || (ctx.settings.default_important_only && !args.all);
    let sync = ctx.inbox_sync();

    let (emails, stale) = match sync.refresh(count).await {
        Ok(emails) => (emails, false),
        Err(AppError::MissingCredential(message)) => {
            // still show what was classified before the key went away
            eprintln!("warning: {message}; showing cached messages");
            (sync.cached()?, true)
        }
        Err(err) => return Err(err),
    };

    let view = InboxView {
        profile: &ctx.profile,
        stale,
        important: emails.iter().filter(|email| email.important).count(),
        emails: visible(&emails, important_only),
    };

    if ctx.output.mode() == OutputMode::Json {
        return ctx.output.emit("", &view);
    }

    let palette = ctx.output.palette(ctx.settings.theme);
    for line in render(&view, &palette) {
        text::print_line(&line)?;
    }
    Ok(())
}

fn visible(emails: &[ClassifiedMessage], important_only: bool) -> Vec<&ClassifiedMessage> {
    emails
        .iter()
        .filter(|email| !important_only || email.important)
        .collect()
}

fn render(view: &InboxView<'_>, palette: &Palette) -> Vec<String> {
    let mut lines = Vec::new();

    for email in &view.emails {
        let subject = if email.subject.is_empty() {
            "(no subject)"
        } else {
            email.subject.as_str()
        };
        let marker = if email.important {
            palette.highlight("★")
        } else {
            " ".to_string()
        };

        lines.push(format!("{marker} {subject}"));
        lines.push(format!("  from: {}", email.from));
        if email.important && !email.reason.is_empty() {
            lines.push(format!("  why:  {}", email.reason));
        }
        if !email.snippet.is_empty() {
            lines.push(format!("  {}", palette.dim(&text::preview(&email.snippet))));
        }
        lines.push(palette.dim(&format!("  id: {}", email.id)));
        lines.push(String::new());
    }

    let mut summary = format!(
        "{}: {} shown, {} important",
        view.profile,
        view.emails.len(),
        view.important
    );
    if view.stale {
        summary.push_str(" (cached)");
    }
    lines.push(summary);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MessageSummary;

    fn email(id: &str, important: bool, reason: &str) -> ClassifiedMessage {
        ClassifiedMessage::new(
            MessageSummary {
                id: id.to_string(),
                subject: format!("subject {id}"),
                from: "boss@example.com".to_string(),
                snippet: String::new(),
            },
            important,
            reason.to_string(),
        )
    }

    #[test]
    fn important_only_hides_the_rest() {
        let emails = vec![email("a", true, "deadline"), email("b", false, "")];
        assert_eq!(visible(&emails, true).len(), 1);
        assert_eq!(visible(&emails, false).len(), 2);
    }

    #[test]
    fn renders_marker_and_reason_for_important_mail() {
        let emails = vec![email("a", true, "deadline tomorrow"), email("b", false, "")];
        let view = InboxView {
            profile: "default",
            stale: true,
            important: 1,
            emails: visible(&emails, false),
        };

        let lines = render(&view, &Palette::plain());
        assert_eq!(lines[0], "★ subject a");
        assert_eq!(lines[2], "  why:  deadline tomorrow");
        assert!(lines.contains(&"  subject b".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("default: 2 shown, 1 important (cached)")
        );
    }
}
