//! Child-process environment composition.
//!
//! Nothing here touches the process-wide environment. Each command gets
//! its own map, built from:
//!
//! 1. The base environment of the `dotrun` process
//! 2. `.env` then `.env.local` (never overriding a key already set)
//! 3. Extra variables passed by the caller (always override)
//! 4. Python venv activation and the bundler path

pub mod compose;
pub mod dotenv;

pub use compose::{compose_environment, has_virtual_env, ComposedEnvironment, BUNDLE_PATH};
pub use dotenv::{apply_dotenv_files, read_dotenv, DOTENV_FILES};
