//! Tiered configuration.
//!
//! Tiers, lowest priority first, merged field by field:
//! 1. **Defaults** - built into the binary
//! 2. **Project** - `$CWD/taskscope/config.yaml`
//! 3. **User** - `~/.taskscope/config.yaml`
//! 4. **Environment** - `TASKSCOPE_*` variables
//!
//! ## Environment Variables
//! - `TASKSCOPE_CONFIG_PATH` - Explicit config file (skips tiers 2 and 3)
//! - `TASKSCOPE_DB_PATH` - Database path
//! - `TASKSCOPE_DATE_FORMAT` - Default date format for date filters
//! - `TASKSCOPE_PER_PAGE` - Default page size
//! - `TASKSCOPE_USER_DIR` - User config dir (default: `~/.taskscope`)
//! - `TASKSCOPE_PROJECT_DIR` - Project config dir (default: `./taskscope`)

mod loader;
mod merge;
mod types;

pub use loader::{CONFIG_FILE, ConfigLoader, ConfigPaths, ConfigTier, apply_env_overrides};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
