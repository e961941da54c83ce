//! Names that are not configurable through TOML

/// Directory name used under the platform config/data directories
pub const APP_DIR: &str = "bgdl";

pub const CONFIG_FILE: &str = "config.toml";

pub const ENV_USER_AGENT: &str = "BGDL_USER_AGENT";
pub const ENV_TIMEOUT: &str = "BGDL_TIMEOUT";
pub const ENV_RETRIES: &str = "BGDL_RETRIES";
pub const ENV_APP_DATA: &str = "BGDL_APP_DATA";
pub const ENV_URI_MATCHER: &str = "BGDL_URI_MATCHER";
