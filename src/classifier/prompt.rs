use std::collections::HashMap;
use std::fmt::Write;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

use super::{ClassifyItem, Verdict, Verdicts};

const INSTRUCTIONS: &str = "You decide whether emails are personally important to the reader.
Important means bills, job leads, security alerts, or mail from close contacts.

Reply with a single JSON object keyed by message id, for example:
{\"<id>\": {\"important\": true, \"reason\": \"short reason\"}}
Use an empty reason for messages that are not important.";

pub fn build_prompt(batch: &[ClassifyItem]) -> String {
    let mut prompt = String::from(INSTRUCTIONS);
    prompt.push_str("\n\nEmails:\n");

    for item in batch {
        let _ = writeln!(prompt, "{}) Subject: {}", item.id, item.subject);
        let _ = writeln!(prompt, "From: {}", item.from);
        if let Some(snippet) = &item.snippet {
            let _ = writeln!(prompt, "Snippet: {snippet}");
        }
        prompt.push('\n');
    }

    prompt
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    important: Option<bool>,
    #[serde(default)]
    reason: Option<String>,
}

pub fn parse_verdicts(content: &str) -> AppResult<Verdicts> {
    let json = extract_json_object(content).ok_or_else(|| {
        AppError::ClassifierParse(format!("no json object in reply: {}", preview(content)))
    })?;

    let raw: HashMap<String, RawVerdict> = serde_json::from_str(json)
        .map_err(|err| AppError::ClassifierParse(format!("{err}: {}", preview(json))))?;

    Ok(raw
        .into_iter()
        .map(|(id, verdict)| {
            let important = verdict.important.unwrap_or(false);
            let reason = verdict.reason.unwrap_or_default().trim().to_string();
            (id.trim().to_string(), Verdict { important, reason })
        })
        .collect())
}

// first balanced {...}, ignoring braces inside strings
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

fn preview(text: &str) -> String {
    let compact = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match compact.char_indices().nth(160) {
        Some((end, _)) => format!("{}...", &compact[..end]),
        None => compact,
    }
}
