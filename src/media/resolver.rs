/// Image source resolution
///
/// Turns a raw reference into the concrete source the render host should
/// load. Resolution is total: anything that cannot be used directly
/// becomes the bundled default asset with `is_fallback` set.

use tracing::debug;

use super::assets::StaticAssets;
use super::reference::{classify, ImageReference};

/// Where a resolved source is fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrigin {
    /// Absolute http(s) URL
    Remote,
    /// Shipped with the binary, relative to the assets directory
    Bundled,
    /// Relative to the backend storage root
    Storage,
}

/// A concrete renderable source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub location: String,
    pub origin: SourceOrigin,
    /// True when this is the default asset standing in for the request
    pub is_fallback: bool,
}

/// Soft degradation conditions. Both are recovered internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// The reference could not be used as a source
    UnresolvableReference,
    /// The render host failed to load the resolved source
    LoadFailure,
}

/// Resolves raw references against a fixed asset table
#[derive(Debug, Clone, Default)]
pub struct ImageSourceResolver {
    assets: StaticAssets,
}

impl ImageSourceResolver {
    pub fn new(assets: StaticAssets) -> Self {
        Self { assets }
    }

    /// Resolve a raw reference. Pure: same input, same output.
    pub fn resolve(&self, reference: &str) -> ResolvedSource {
        self.decide(classify(reference, &self.assets))
    }

    /// Rendering decision for an already-classified reference
    pub fn decide(&self, reference: ImageReference<'_>) -> ResolvedSource {
        match reference {
            ImageReference::AbsoluteUrl(url) => ResolvedSource {
                location: url.to_string(),
                origin: SourceOrigin::Remote,
                is_fallback: false,
            },
            ImageReference::KnownStaticAsset { location, .. } => ResolvedSource {
                location: location.to_string(),
                origin: SourceOrigin::Bundled,
                is_fallback: false,
            },
            ImageReference::RemoteStoragePath(path) => ResolvedSource {
                location: path.to_string(),
                origin: SourceOrigin::Storage,
                is_fallback: false,
            },
            ImageReference::Ephemeral(_) | ImageReference::Unrecognized(_) => {
                debug!(
                    reference = reference.raw(),
                    condition = ?Degradation::UnresolvableReference,
                    "Using default image"
                );
                self.default_source()
            }
        }
    }

    /// The default asset, always flagged as a fallback
    pub fn default_source(&self) -> ResolvedSource {
        ResolvedSource {
            location: self.assets.default_location().to_string(),
            origin: SourceOrigin::Bundled,
            is_fallback: true,
        }
    }

    #[cfg(test)]
    pub fn assets(&self) -> &StaticAssets {
        &self.assets
    }
}
