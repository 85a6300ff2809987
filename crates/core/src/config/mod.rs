//! Engine configuration loaded from TOML.
//!
//! ```toml
//! version = 1
//!
//! [resolve]
//! max_items_depth = 16
//!
//! [render]
//! strict = true
//!
//! [scripting]
//! engine = "lua"
//! memory_limit = 10485760
//!
//! [logging]
//! level = "warn"
//! file = "~/.cache/rendervars/rvars.log"
//! ```

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, default_config_path};
pub use types::{EngineConfig, EngineKind};
