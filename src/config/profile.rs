use crate::error::{AppError, AppResult};

const DEFAULT_PROFILE: &str = "default";

pub fn resolve_profile(requested: &str) -> AppResult<String> {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_PROFILE.to_string());
    }

    let valid = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid || trimmed.starts_with('.') {
        return Err(AppError::InvalidInput(format!(
            "profile `{trimmed}` may only contain letters, digits, `-`, `_` and `.`"
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_profile_falls_back_to_default() {
        assert_eq!(resolve_profile("  ").expect("resolves"), "default");
    }

    #[test]
    fn rejects_path_like_profiles() {
        assert!(resolve_profile("../evil").is_err());
        assert!(resolve_profile("a/b").is_err());
        assert!(resolve_profile(".hidden").is_err());
    }

    #[test]
    fn keeps_simple_names() {
        assert_eq!(resolve_profile(" work_2 ").expect("resolves"), "work_2");
    }
}
