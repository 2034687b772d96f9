/// Classification of raw image reference strings
///
/// A property's image field is an untrusted string that may hold one of
/// several encodings. `classify` maps every possible string to exactly
/// one `ImageReference` variant; the rendering decision lives in the
/// resolver so that fallback policy stays separate from shape detection.

use super::assets::StaticAssets;

/// Scheme prefix of session-local object URLs
pub const EPHEMERAL_PREFIX: &str = "blob:";

/// Accepted absolute URL schemes
pub const HTTP_PREFIXES: [&str; 2] = ["http://", "https://"];

/// The shape of a raw image reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageReference<'a> {
    /// Transient session handle; never dereferenced
    Ephemeral(&'a str),
    /// `http://` or `https://` URL, used verbatim
    AbsoluteUrl(&'a str),
    /// Exact key of the bundled asset table
    KnownStaticAsset {
        key: &'a str,
        location: &'static str,
    },
    /// Backend-storage-relative path, used verbatim
    RemoteStoragePath(&'a str),
    /// Anything else, including the empty string
    Unrecognized(&'a str),
}

impl<'a> ImageReference<'a> {
    /// The raw string this classification was made from
    pub fn raw(&self) -> &'a str {
        match *self {
            ImageReference::Ephemeral(raw)
            | ImageReference::AbsoluteUrl(raw)
            | ImageReference::RemoteStoragePath(raw)
            | ImageReference::Unrecognized(raw) => raw,
            ImageReference::KnownStaticAsset { key, .. } => key,
        }
    }
}

/// Classify a raw reference. First match wins, in this order:
/// ephemeral, absolute URL, bundled key, storage path, unrecognized.
///
/// The storage-path rule (contains `/`, no `\`) also accepts absolute
/// Unix paths such as `/home/me/photo.jpg`. That is kept as-is for
/// compatibility with data already in the catalog.
pub fn classify<'a>(reference: &'a str, assets: &StaticAssets) -> ImageReference<'a> {
    if reference.starts_with(EPHEMERAL_PREFIX) {
        return ImageReference::Ephemeral(reference);
    }

    if HTTP_PREFIXES.iter().any(|scheme| reference.starts_with(scheme)) {
        return ImageReference::AbsoluteUrl(reference);
    }

    if let Some(location) = assets.lookup(reference) {
        return ImageReference::KnownStaticAsset {
            key: reference,
            location,
        };
    }

    if reference.contains('/') && !reference.contains('\\') {
        return ImageReference::RemoteStoragePath(reference);
    }

    ImageReference::Unrecognized(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_bundled(reference: &str) -> ImageReference<'_> {
        classify(reference, &StaticAssets::bundled())
    }

    #[test]
    fn test_ephemeral_wins_over_url_shape() {
        // blob URLs embed the page origin and look like http URLs
        assert_eq!(
            classify_bundled("blob:https://app.local/5c1d"),
            ImageReference::Ephemeral("blob:https://app.local/5c1d")
        );
        assert_eq!(
            classify_bundled("blob:abcd-1234"),
            ImageReference::Ephemeral("blob:abcd-1234")
        );
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            classify_bundled("https://cdn.example.com/a.jpg"),
            ImageReference::AbsoluteUrl("https://cdn.example.com/a.jpg")
        );
        assert_eq!(
            classify_bundled("http://x"),
            ImageReference::AbsoluteUrl("http://x")
        );
        // Scheme match is case-sensitive; falls through to the path rule
        assert_eq!(
            classify_bundled("HTTPS://cdn.example.com/a.jpg"),
            ImageReference::RemoteStoragePath("HTTPS://cdn.example.com/a.jpg")
        );
    }

    #[test]
    fn test_static_asset_key() {
        assert_eq!(
            classify_bundled("property2.jpg"),
            ImageReference::KnownStaticAsset {
                key: "property2.jpg",
                location: "properties/property2.jpg",
            }
        );
    }

    #[test]
    fn test_storage_paths() {
        assert_eq!(
            classify_bundled("listings/123/cover.png"),
            ImageReference::RemoteStoragePath("listings/123/cover.png")
        );
        assert_eq!(
            classify_bundled("/home/me/photo.jpg"),
            ImageReference::RemoteStoragePath("/home/me/photo.jpg")
        );
        assert_eq!(
            classify_bundled("listings\\123/cover.png"),
            ImageReference::Unrecognized("listings\\123/cover.png")
        );
    }

    #[test]
    fn test_unrecognized() {
        for raw in ["", "cover.png", "property9.jpg", "C:\\photos\\a.jpg", "blob"] {
            let classified = classify_bundled(raw);
            assert_eq!(classified, ImageReference::Unrecognized(raw));
            assert_eq!(classified.raw(), raw);
        }
    }
}
