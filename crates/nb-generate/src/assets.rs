//! Theme asset copying.

use std::fs;
use std::io;
use std::path::Path;

/// Copy the contents of `src` into `dest` recursively, returning the number
/// of files copied. Existing files are overwritten.
pub fn copy_dir(src: &Path, dest: &Path) -> io::Result<usize> {
    fs::create_dir_all(dest)?;
    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        if path.is_dir() {
            copied += copy_dir(&path, &target)?;
        } else {
            fs::copy(&path, &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Copy theme assets into the output directory.
///
/// A theme without assets is allowed and only logged.
pub(crate) fn copy_theme_assets(assets_dir: &Path, out_dir: &Path) -> io::Result<()> {
    if !assets_dir.is_dir() {
        tracing::warn!(path = %assets_dir.display(), "Theme has no assets directory");
        return Ok(());
    }
    let copied = copy_dir(assets_dir, out_dir)?;
    tracing::info!(files = copied, "Copied theme assets");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_copy_dir_recursive() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("assets");
        fs::create_dir_all(src.join("css")).unwrap();
        fs::write(src.join("favicon.ico"), "icon").unwrap();
        fs::write(src.join("css/theme.css"), "body {}").unwrap();

        let dest = temp.path().join("public");
        assert_eq!(copy_dir(&src, &dest).unwrap(), 2);
        assert_eq!(fs::read_to_string(dest.join("css/theme.css")).unwrap(), "body {}");
        assert_eq!(fs::read_to_string(dest.join("favicon.ico")).unwrap(), "icon");
    }

    #[test]
    fn test_missing_assets_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        copy_theme_assets(&temp.path().join("nope"), &temp.path().join("public")).unwrap();
    }
}
