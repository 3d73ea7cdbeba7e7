use crate::api::{LabelChange, LabelMutationResult};
use crate::cli::MarkCommand;
use crate::context::AppContext;
use crate::error::AppResult;

pub async fn run(ctx: &AppContext, command: MarkCommand) -> AppResult<()> {
    let (id, change, note) = match command {
        MarkCommand::Read(args) => (args.id, LabelChange::mark_read(), "marked read"),
        MarkCommand::Spam(args) => (args.id, LabelChange::mark_spam(), "moved to spam"),
    };

    ctx.inbox_sync().apply_label_change(&id, &change).await?;

    let result = LabelMutationResult {
        id,
        added: change.add,
        removed: change.remove,
        note: note.to_string(),
    };
    let text = format!("{}: {}", result.id, result.note);
    ctx.output.emit(&text, &result)
}
