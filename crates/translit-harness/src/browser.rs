//! Chrome launching

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Find Chrome for Testing installed by Puppeteer
pub fn find_chrome_for_testing() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let puppeteer_cache = std::path::Path::new(&home).join(".cache/puppeteer/chrome");

    let entries = std::fs::read_dir(&puppeteer_cache).ok()?;
    let mut versions: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    versions.sort_by_key(|v| std::cmp::Reverse(v.path()));

    for version_dir in versions {
        let candidates = [
            // macOS arm64
            "chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
            // macOS x64
            "chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
            // Linux
            "chrome-linux64/chrome",
        ];
        if let Some(found) = candidates
            .iter()
            .map(|c| version_dir.path().join(c))
            .find(|p| p.exists())
        {
            return Some(found);
        }
    }
    None
}

/// A unique user data directory so parallel browsers do not collide
fn unique_user_data_dir() -> PathBuf {
    static BROWSER_ID: AtomicU64 = AtomicU64::new(0);

    let browser_id = BROWSER_ID.fetch_add(1, Ordering::SeqCst);
    let pid = std::process::id();
    let timestamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    std::env::temp_dir().join(format!(
        "translit-harness-{}-{}-{}",
        pid, browser_id, timestamp
    ))
}

/// Chrome profile directory, removed on drop
#[derive(Debug)]
pub struct ProfileDir {
    path: PathBuf,
}

impl ProfileDir {
    fn create() -> Result<Self> {
        let path = unique_user_data_dir();
        if path.exists() {
            let _ = std::fs::remove_dir_all(&path);
        }
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create profile dir: {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("Removed profile dir {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove profile dir {}: {}", self.path.display(), e),
        }
    }
}

/// Event handler task and profile directory of a launched browser
///
/// Keep it alive for as long as the browser is in use.
#[derive(Debug)]
pub struct BrowserTask {
    handle: JoinHandle<()>,
    profile: ProfileDir,
}

impl BrowserTask {
    pub fn profile_dir(&self) -> &Path {
        self.profile.path()
    }

    /// Stop the handler task and remove the profile directory
    ///
    /// Call once the browser process has exited.
    pub fn shutdown(self) {
        self.handle.abort();
        drop(self.profile);
    }
}

/// Launch Chrome with a fresh profile and spawn the task that drives its
/// event handler
pub async fn launch(headless: bool) -> Result<(Browser, BrowserTask)> {
    let mut builder = BrowserConfig::builder();

    if let Some(chrome_path) = find_chrome_for_testing() {
        debug!("Using Chrome for Testing: {}", chrome_path.display());
        builder = builder.chrome_executable(chrome_path);
    }
    if !headless {
        builder = builder.with_head();
    }

    let profile = ProfileDir::create()?;
    builder = builder.user_data_dir(profile.path());

    let config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

    info!("Launching browser (headless: {})", headless);
    let (browser, mut handler) = Browser::launch(config)
        .await
        .context("Failed to launch browser")?;

    let handle = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                warn!("Browser handler error: {:?}", e);
                break;
            }
        }
    });

    Ok((browser, BrowserTask { handle, profile }))
}

/// Close the browser, wait for the process to exit, then clean up its task
pub async fn close(mut browser: Browser, task: BrowserTask) {
    if let Err(e) = browser.close().await {
        warn!("Failed to close browser: {}", e);
    }
    if let Err(e) = browser.wait().await {
        warn!("Failed waiting for browser exit: {}", e);
    }
    task.shutdown();
}
