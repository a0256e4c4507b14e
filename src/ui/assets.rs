//! Filesystem-based asset source for loading piece SVGs.

use gpui::{AssetSource, SharedString};
use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

/// Looks for assets next to the executable, then in the working directory
pub struct FileAssets {
    search_paths: Vec<PathBuf>,
}

impl FileAssets {
    pub fn new() -> Self {
        let mut search_paths = Vec::new();
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        {
            search_paths.push(dir);
        }
        if let Ok(dir) = std::env::current_dir() {
            search_paths.push(dir);
        }
        Self { search_paths }
    }
}

impl Default for FileAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSource for FileAssets {
    fn load(&self, path: &str) -> gpui::Result<Option<Cow<'static, [u8]>>> {
        let candidates = self
            .search_paths
            .iter()
            .map(|base| base.join(path))
            .chain(std::iter::once(PathBuf::from(path)));

        for candidate in candidates {
            if let Ok(data) = fs::read(&candidate) {
                return Ok(Some(Cow::Owned(data)));
            }
        }
        tracing::debug!(path, "asset not found");
        Ok(None)
    }

    fn list(&self, path: &str) -> gpui::Result<Vec<SharedString>> {
        let mut results = Vec::new();
        for base in &self.search_paths {
            let Ok(entries) = fs::read_dir(base.join(path)) else {
                continue;
            };
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    results.push(SharedString::from(name.to_string()));
                }
            }
            break;
        }
        Ok(results)
    }
}
