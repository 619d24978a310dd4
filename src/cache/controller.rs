//! Generation-versioned asset cache with stale-while-revalidate fetch.
//!
//! Cached assets live as JSON entries under one directory per cache
//! generation. Install pre-seeds a fixed manifest into a fresh generation
//! (all-or-nothing), activate purges every superseded generation, and fetch
//! serves a cached copy immediately when one exists while a background task
//! refreshes it from the origin.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::origin::{AssetRequest, FetchedAsset, Origin};
use super::FetchError;

/// Current cache generation. Bumping the version suffix is the only
/// mechanism that invalidates previously cached assets en masse.
pub const CACHE_GENERATION: &str = "checkmate-bundle-v1";

/// Asset paths pre-seeded at install time, in order. The bundle's document
/// root is materialized as `index.html`.
pub const BUNDLE_MANIFEST: &[&str] = &[
    "index.html",
    "styles.css",
    "app.js",
    "manifest.json",
    "icon-192.png",
    "icon-512.png",
    "checklists.json",
];

/// Suffix for the staging directory used during install.
const STAGING_SUFFIX: &str = ".staging";

/// Maximum concurrent origin fetches during install.
/// The manifest is small; 4 keeps seeding quick without hammering the origin.
const MAX_CONCURRENT_SEEDS: usize = 4;

/// One cached asset: the fetched bytes plus when they were stored.
/// `cached_at` only feeds the age display; freshness never expires entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAsset {
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub cached_at: DateTime<Utc>,
}

impl CachedAsset {
    pub fn new(path: &str, fetched: FetchedAsset) -> Self {
        Self {
            path: path.to_string(),
            content_type: fetched.content_type,
            body: fetched.body,
            cached_at: Utc::now(),
        }
    }

}

/// Human-readable age of a cache timestamp, for the status bar.
pub fn format_age(cached_at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - cached_at).num_minutes();
    if minutes < 1 {
        // Covers clock skew as well
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

/// The cache controller. Clone is cheap; clones share the origin and address
/// the same generation directory.
#[derive(Clone)]
pub struct CacheController {
    root: PathBuf,
    generation: String,
    origin: Arc<dyn Origin>,
}

impl CacheController {
    pub fn new(root: PathBuf, origin: Arc<dyn Origin>) -> Result<Self> {
        Self::with_generation(root, CACHE_GENERATION, origin)
    }

    pub fn with_generation(
        root: PathBuf,
        generation: &str,
        origin: Arc<dyn Origin>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache root: {}", root.display()))?;
        Ok(Self {
            root,
            generation: generation.to_string(),
            origin,
        })
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// Whether the current generation has been seeded.
    pub fn is_installed(&self) -> bool {
        self.generation_dir().is_dir()
    }

    fn generation_dir(&self) -> PathBuf {
        self.root.join(&self.generation)
    }

    fn staging_dir(&self) -> PathBuf {
        self.root.join(format!("{}{}", self.generation, STAGING_SUFFIX))
    }

    /// File name for one cached entry. Path separators are flattened so an
    /// entry never escapes the generation directory.
    fn entry_file(path: &str) -> String {
        let sanitized: String = path
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}.json", sanitized)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Pre-seed the manifest into a fresh generation. Any single fetch or
    /// write failure aborts the whole install: the staging directory is
    /// discarded and a previously active generation stays untouched. On
    /// success the new generation becomes current immediately.
    pub async fn install(&self) -> Result<(), FetchError> {
        let staging = self.staging_dir();
        if staging.exists() {
            std::fs::remove_dir_all(&staging)?;
        }
        std::fs::create_dir_all(&staging)?;

        // Owned requests so the seeding futures borrow nothing from this frame
        let requests: Vec<AssetRequest> = BUNDLE_MANIFEST
            .iter()
            .map(|path| AssetRequest::get(*path))
            .collect();
        let results: Vec<Result<CachedAsset, FetchError>> = stream::iter(requests)
            .map(|request| {
                let origin = self.origin.clone();
                async move {
                    origin
                        .fetch(&request)
                        .await
                        .map(|fetched| CachedAsset::new(&request.path, fetched))
                        .map_err(|e| FetchError::Install(format!("{}: {}", request.path, e)))
                }
            })
            .buffer_unordered(MAX_CONCURRENT_SEEDS)
            .collect()
            .await;

        for result in results {
            let asset = match result {
                Ok(asset) => asset,
                Err(e) => {
                    let _ = std::fs::remove_dir_all(&staging);
                    return Err(e);
                }
            };
            if let Err(e) = Self::write_entry(&staging, &asset) {
                let _ = std::fs::remove_dir_all(&staging);
                return Err(FetchError::Install(format!("{}: {}", asset.path, e)));
            }
        }

        let current = self.generation_dir();
        if current.exists() {
            std::fs::remove_dir_all(&current)?;
        }
        std::fs::rename(&staging, &current)?;
        info!(generation = %self.generation, assets = BUNDLE_MANIFEST.len(), "Bundle installed");
        Ok(())
    }

    /// Delete every generation directory except the current one. Lookups
    /// already resolve against the current generation, so the switch needs
    /// no restart. Returns how many generations were purged.
    pub fn activate(&self) -> Result<usize> {
        let mut purged = 0;
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name();
            if name.to_string_lossy() != self.generation {
                std::fs::remove_dir_all(entry.path())
                    .with_context(|| format!("Failed to purge generation: {:?}", name))?;
                debug!(generation = ?name, "Purged superseded cache generation");
                purged += 1;
            }
        }
        if purged > 0 {
            info!(purged, generation = %self.generation, "Cache generations cleaned up");
        }
        Ok(purged)
    }

    // =========================================================================
    // Fetch interception
    // =========================================================================

    /// Resolve one asset request with stale-while-revalidate semantics:
    /// a cached copy, when present, is returned immediately and the origin
    /// fetch only refreshes the cache in the background. With no cached copy
    /// the caller waits on the origin; an origin failure then surfaces as
    /// `FetchError::Offline`.
    pub async fn fetch(&self, request: &AssetRequest) -> Result<CachedAsset, FetchError> {
        // Cache lookup always starts before the origin fetch
        let cached = match self.lookup(&request.path) {
            Ok(cached) => cached,
            Err(e) => {
                debug!(path = %request.path, error = %e, "Cache lookup failed, treating as miss");
                None
            }
        };

        if let Some(cached) = cached {
            let this = self.clone();
            let request = request.clone();
            tokio::spawn(async move {
                this.revalidate(&request).await;
            });
            return Ok(cached);
        }

        match self.origin.fetch(request).await {
            Ok(fetched) => {
                let asset = CachedAsset::new(&request.path, fetched);
                self.store_if_eligible(request, &asset);
                Ok(asset)
            }
            // Only an unusable network means offline; anything else is the
            // caller's error to see
            Err(e) if e.is_network_failure() => {
                warn!(path = %request.path, error = %e, "Fetch failed with no cached fallback");
                Err(FetchError::Offline(request.path.clone()))
            }
            Err(e) => Err(e),
        }
    }

    /// Refresh one entry from the origin. Failures only log: the cached copy
    /// already served the caller.
    pub(crate) async fn revalidate(&self, request: &AssetRequest) {
        match self.origin.fetch(request).await {
            Ok(fetched) => {
                let asset = CachedAsset::new(&request.path, fetched);
                self.store_if_eligible(request, &asset);
            }
            Err(e) => debug!(path = %request.path, error = %e, "Background revalidation failed"),
        }
    }

    /// Store a fresh copy for same-origin GET requests only. Store failures
    /// are logged and otherwise ignored.
    fn store_if_eligible(&self, request: &AssetRequest, asset: &CachedAsset) {
        if !request.is_get() || !self.origin.is_same_origin(&request.path) {
            return;
        }
        if let Err(e) = self.store(asset) {
            debug!(path = %request.path, error = %e, "Failed to store cached copy");
        }
    }

    // =========================================================================
    // Entry I/O
    // =========================================================================

    pub fn lookup(&self, path: &str) -> Result<Option<CachedAsset>> {
        let file = self.generation_dir().join(Self::entry_file(path));
        if !file.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read cache entry: {}", path))?;
        let asset = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry: {}", path))?;
        Ok(Some(asset))
    }

    fn store(&self, asset: &CachedAsset) -> Result<()> {
        Self::write_entry(&self.generation_dir(), asset)
    }

    fn write_entry(dir: &std::path::Path, asset: &CachedAsset) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let contents = serde_json::to_string(asset)?;
        std::fs::write(dir.join(Self::entry_file(&asset.path)), contents)?;
        Ok(())
    }

    /// Timestamp of the cached checklist data, feeding the status bar age
    /// display. Reading the entry is file I/O, so callers resolve this once
    /// per cache event rather than per frame.
    pub fn bundle_cached_at(&self) -> Option<DateTime<Utc>> {
        match self.lookup("checklists.json") {
            Ok(Some(asset)) => Some(asset.cached_at),
            Ok(None) => None,
            Err(e) => {
                debug!(error = %e, "Failed to read bundle timestamp");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
