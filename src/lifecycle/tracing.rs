//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter. The
//! filter comes from `RUST_LOG` when set, otherwise from the configured
//! `observability.log_level`.
//!
//! ```bash
//! # lifecycle and state changes
//! RUST_LOG=info cargo run
//!
//! # full payloads (params, fixes, actions) at each actor step
//! RUST_LOG=debug cargo run
//!
//! # only the delivery store
//! RUST_LOG=fleet_dispatch::delivery_actor=debug,actor_framework=debug cargo run
//! ```
//!
//! Actor lines carry `entity_type` instead of a module path, e.g.
//!
//! ```text
//! INFO Actor started entity_type="DeliveryTracking"
//! INFO Stored entity_type="DeliveryTracking" id=D1 size=1
//! INFO Milestone reached delivery_id=D1 milestone=25
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Fails if one is already installed.
pub fn setup_tracing(default_directive: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_directive))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // entity_type identifies the actor
        .compact()
        .try_init()?;
    Ok(())
}
