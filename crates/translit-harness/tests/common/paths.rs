//! Path helpers for finding project files

#![allow(dead_code)]

/// Get workspace root path
pub fn workspace_root() -> std::path::PathBuf {
    std::env::var("CARGO_MANIFEST_DIR")
        .ok()
        .and_then(|d| {
            std::path::Path::new(&d)
                .parent()
                .and_then(|p| p.parent())
                .map(|p| p.to_path_buf())
        })
        .unwrap_or_else(|| std::path::PathBuf::from("."))
}

/// Path of a bundled suite file
pub fn suite_path(name: &str) -> std::path::PathBuf {
    workspace_root().join("suites").join(name)
}
