use anyhow::{Context, Result};
use site_deploy_core::FileEntry;
use std::path::Path;
use walkdir::WalkDir;

/// Every regular file under `build_dir`, with its upload metadata.
///
/// Symlinks are not followed and only regular files are returned. Entries
/// come back sorted by path so uploads happen in a stable order.
pub fn plan(build_dir: &Path) -> Result<Vec<FileEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(build_dir).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("Failed to read {}", build_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file = FileEntry::new(build_dir, path)
            .with_context(|| format!("Cannot derive an object key for {}", path.display()))?;
        entries.push(file);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_deploy_core::CachePolicy;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_plan_maps_relative_paths_to_keys() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "hi").unwrap();
        fs::create_dir_all(dir.path().join("assets/img")).unwrap();
        fs::write(dir.path().join("assets/app.abc123.js"), "x").unwrap();
        fs::write(dir.path().join("assets/img/logo.png"), [0u8; 4]).unwrap();

        let entries = plan(dir.path()).unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();

        assert_eq!(
            keys,
            vec!["assets/app.abc123.js", "assets/img/logo.png", "index.html"]
        );
        for entry in &entries {
            assert_eq!(entry.source, dir.path().join(&entry.key));
        }
    }

    #[test]
    fn test_plan_metadata() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "hi").unwrap();
        fs::write(dir.path().join("data.json"), "{}").unwrap();
        fs::write(dir.path().join("blob.bin"), "?").unwrap();

        let entries = plan(dir.path()).unwrap();
        let find = |key: &str| entries.iter().find(|e| e.key == key).unwrap();

        assert_eq!(find("index.html").content_type, "text/html");
        assert_eq!(find("index.html").cache_policy, CachePolicy::Revalidate);
        assert_eq!(find("data.json").content_type, "application/json");
        assert_eq!(find("data.json").cache_policy, CachePolicy::Revalidate);
        assert_eq!(find("blob.bin").content_type, "application/octet-stream");
        assert_eq!(find("blob.bin").cache_policy, CachePolicy::Immutable);
    }

    #[test]
    fn test_plan_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("empty/nested")).unwrap();

        assert!(plan(dir.path()).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_plan_skips_symlinks() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real.css"), "body{}").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.css"), dir.path().join("link.css"))
            .unwrap();

        let entries = plan(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "real.css");
    }

    #[test]
    fn test_plan_missing_directory() {
        let dir = TempDir::new().unwrap();
        assert!(plan(&dir.path().join("dist")).is_err());
    }
}
