//! Configuration resolution
//!
//! polsync reads `polsync.toml` layers and merges them, later layers
//! overriding earlier ones:
//!
//! 1. **Global defaults** - `<config_dir>/polsync/config.toml`
//! 2. **Source tree** - `<source-dir>/polsync.toml`
//! 3. **Explicit file** - `--config <path>`
//! 4. **Overrides** - command-line flags and `POLSYNC_*` environment variables
//!
//! # Example
//!
//! ```toml
//! [remote]
//! url = "https://policy.example.com/api"
//! organization = "acme"
//!
//! [kinds.cluster-policies]
//! strategy = "bulk"
//! ```

mod manifest;
mod resolver;

pub use manifest::{KindSection, Manifest, RemoteSection, Strategy, SyncSection, ValidateSection};
pub use resolver::{
    CONFIG_FILE, ConfigResolver, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_ENV, Overrides,
    RemoteSettings, ResolvedConfig,
};
