/// Id namespace for records persisted by the remote recipe service
pub const REMOTE_ID_PREFIX: &str = "recipe:";

/// Id namespace for records held only in the local fallback store
pub const LOCAL_ID_PREFIX: &str = "user-";

/// Storage key holding the local-only recipe list
pub const LOCAL_RECIPES_KEY: &str = "local-recipes";

/// Where an unreadable local recipe document is copied before it can be
/// overwritten
pub const LOCAL_RECIPES_BACKUP_KEY: &str = "local-recipes.unreadable";

/// Storage key holding the favorites set
pub const FAVORITES_KEY: &str = "favorites";

/// Placeholder written into repaired local records that lost their instructions
pub const DEFAULT_INSTRUCTIONS: &str = "No instructions provided.";

/// Collection path on the remote recipe service
pub const RECIPES_PATH: &str = "/recipes";

/// Length of the random suffix in remote ids
pub const REMOTE_SUFFIX_LEN: usize = 9;

/// Interval between background migration passes
pub const DEFAULT_MIGRATION_INTERVAL_SECS: u64 = 30;

/// Delay between session establishment and the first migration pass
pub const DEFAULT_MIGRATION_DELAY_MS: u64 = 2_000;

/// Per-request timeout for the remote recipe service
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;
