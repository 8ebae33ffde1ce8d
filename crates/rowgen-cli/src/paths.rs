use std::path::Path;

/// Mode for directories the bootstrap creates.
#[cfg(unix)]
pub const DIR_MODE: u32 = 0o775;

/// Create `path` (and its parents) if it does not exist yet. An existing
/// directory is fine; an existing non-directory is an error.
pub fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        anyhow::bail!("{} exists and is not a directory", path.display());
    }

    std::fs::create_dir_all(path)
        .map_err(|e| anyhow::anyhow!("failed to create directory {}: {e}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(DIR_MODE)).map_err(|e| {
            anyhow::anyhow!("failed to set permissions on {}: {e}", path.display())
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b/c");

        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
        ensure_dir(&dir).unwrap();
    }

    #[test]
    fn existing_file_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("taken");
        std::fs::write(&file, b"x").unwrap();

        assert!(ensure_dir(&file).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn created_dir_carries_the_fixed_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("skeleton");
        ensure_dir(&dir).unwrap();

        let mode = std::fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, DIR_MODE);
    }
}
