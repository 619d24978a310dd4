//! Offline bundle cache.
//!
//! This module keeps the published checklist bundle available without a
//! network round trip:
//!
//! - `controller`: generation lifecycle (install/activate) and
//!   stale-while-revalidate fetch
//! - `origin`: the network seam (`Origin` trait, reqwest implementation)
//! - `error`: the fetch error taxonomy, including the offline indication

pub mod controller;
pub mod error;
pub mod origin;

pub use controller::{format_age, CacheController, CachedAsset, BUNDLE_MANIFEST, CACHE_GENERATION};
pub use error::FetchError;
pub use origin::{AssetRequest, FetchedAsset, HttpOrigin, NullOrigin, Origin};
