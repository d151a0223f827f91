use crate::share_code::ShareCodeConfig;

/// Process-wide settings, read from the environment once at startup and
/// passed down explicitly. Business code never touches the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub share_code: ShareCodeConfig,
    /// Most collections a single user may own.
    pub max_collections: i64,
    /// Most items a single collection may hold.
    pub max_collection_items: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            share_code: ShareCodeConfig::default(),
            max_collections: 20,
            max_collection_items: 200,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let alphabet = std::env::var("WATA_SHARE_ALPHABET")
            .unwrap_or(defaults.share_code.alphabet);
        let min_length = std::env::var("WATA_SHARE_MIN_LENGTH")
            .map(|v| v.parse().expect("WATA_SHARE_MIN_LENGTH must be a number"))
            .unwrap_or(defaults.share_code.min_length);
        let max_collections = std::env::var("WATA_MAX_COLLECTIONS")
            .map(|v| v.parse().expect("WATA_MAX_COLLECTIONS must be a number"))
            .unwrap_or(defaults.max_collections);
        let max_collection_items = std::env::var("WATA_MAX_COLLECTION_ITEMS")
            .map(|v| {
                v.parse()
                    .expect("WATA_MAX_COLLECTION_ITEMS must be a number")
            })
            .unwrap_or(defaults.max_collection_items);

        Self {
            share_code: ShareCodeConfig {
                alphabet,
                min_length,
            },
            max_collections,
            max_collection_items,
        }
    }
}
