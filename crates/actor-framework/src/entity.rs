//! # ActorEntity Trait
//!
//! The contract a resource (a delivery, a driver position, a vehicle's telemetry)
//! implements to be owned by a [`ResourceActor`](crate::ResourceActor).
//!
//! Entities are **keyed by the caller**: the id travels with every request, so the
//! same external identifier (`D1`, `drv1`) addresses the record for its whole life.
//! Associated types pin down which payloads each operation accepts, so a vehicle
//! payload can never reach the delivery store.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`] runs whenever a fresh instance enters the store,
//!   through either `Create` or `Put`.
//! - [`ActorEntity::on_delete`] runs right before removal.
//!
//! Both default to `Ok(())`.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by `ResourceActor`.
///
/// # Async & Context
/// Hooks are `async` and receive a shared `Context` injected through
/// [`ResourceActor::run`](crate::ResourceActor::run). Contexts typically carry an
/// event publisher, a clock and tuning settings.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The caller-supplied identifier (e.g. a delivery id).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create (or wholesale replace) an instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g. `Advance`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One enum per actor rather than one per message: callers match on a single
    /// type, at the price of every operation sharing the same variant set.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full entity from the id and payload.
    /// Called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called after the entity is built and before it is stored.
    /// An error here rejects the request and leaves the store untouched.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the system.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
