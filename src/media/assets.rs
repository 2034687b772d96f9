/// Bundled image assets
///
/// The client ships a small, closed set of listing photos alongside the
/// binary. They are addressed by logical filename (the value stored in a
/// property's image field) and resolve to a location relative to the
/// configured assets directory.

/// Logical key → bundled location, fixed at build time
const BUNDLED: &[(&str, &str)] = &[
    ("property1.jpg", "properties/property1.jpg"),
    ("property2.jpg", "properties/property2.jpg"),
    ("property3.jpg", "properties/property3.jpg"),
    ("property4.jpg", "properties/property4.jpg"),
];

/// Location of the guaranteed-available default image
const DEFAULT_LOCATION: &str = "properties/default.jpg";

/// Immutable lookup table of bundled assets plus the designated default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAssets {
    entries: &'static [(&'static str, &'static str)],
    default_location: &'static str,
}

impl StaticAssets {
    /// The table compiled into this binary
    pub fn bundled() -> Self {
        Self {
            entries: BUNDLED,
            default_location: DEFAULT_LOCATION,
        }
    }

    /// Bundled location for an exact logical key
    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, location)| *location)
    }

    /// Location of the default asset used for every fallback
    pub fn default_location(&self) -> &'static str {
        self.default_location
    }

    /// All logical keys, in table order
    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl Default for StaticAssets {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_exact() {
        let assets = StaticAssets::bundled();
        assert_eq!(assets.lookup("property2.jpg"), Some("properties/property2.jpg"));
        assert_eq!(assets.lookup("Property2.jpg"), None);
        assert_eq!(assets.lookup(" property2.jpg"), None);
        assert_eq!(assets.lookup(""), None);
    }

    #[test]
    fn test_default_is_not_a_key() {
        let assets = StaticAssets::bundled();
        assert!(assets.keys().all(|k| assets.lookup(k) != Some(assets.default_location())));
        assert_eq!(assets.keys().count(), 4);
    }
}
