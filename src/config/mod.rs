//! Configuration for the dispatch core.
//!
//! ```text
//! dispatch.toml
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, all errors at once)
//!     → DispatchConfig (immutable, cloned into each subsystem)
//! ```
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock tuning: 30 s ticks, 1 h retention, 5 min route cache.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::*;
pub use validation::{validate_config, ValidationError};
