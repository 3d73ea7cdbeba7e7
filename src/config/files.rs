use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppResult;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

// temp file then rename, so readers never see a torn file
pub fn write_json_private<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = serde_json::to_string_pretty(value)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, payload)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(&staging)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&staging, perms)?;
    }

    fs::rename(&staging, path)?;
    Ok(())
}

pub fn remove_if_exists(path: &Path) -> AppResult<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let value: Option<BTreeMap<String, bool>> =
            read_json(&dir.path().join("absent.json")).expect("read");
        assert!(value.is_none());
    }

    #[test]
    fn writes_then_reads_back_without_leaving_staging_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("flags.json");
        let flags = BTreeMap::from([("abc".to_string(), true)]);

        write_json_private(&path, &flags).expect("write");
        let loaded: Option<BTreeMap<String, bool>> = read_json(&path).expect("read");

        assert_eq!(loaded, Some(flags));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn written_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("secret.json");
        write_json_private(&path, &"key").expect("write");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
