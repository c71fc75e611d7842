//! # Generic Messages
//!
//! The request envelope exchanged between a `ResourceClient` and its `ResourceActor`.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor to request operations.
///
/// The variants cover the lifecycle of a keyed resource:
///
/// - **Create**: insert a new record; fails with `AlreadyExists` if the id is taken.
/// - **Put**: last-write-wins replacement; builds a fresh instance and overwrites.
/// - **Get** / **List**: read one record or every record.
/// - **Load**: bulk insert of ready-made records, bypassing hooks (restore path).
/// - **Update**: mutate through [`ActorEntity::on_update`].
/// - **Delete**: remove after [`ActorEntity::on_delete`].
/// - **Action**: resource-specific operation through [`ActorEntity::handle_action`].
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        id: T::Id,
        params: T::Create,
        respond_to: Response<T>,
    },
    Put {
        id: T::Id,
        params: T::Create,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Load {
        items: Vec<(T::Id, T)>,
        respond_to: Response<usize>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}
