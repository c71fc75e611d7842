//! # Mock Framework
//!
//! Test doubles for code that talks to a `ResourceClient`, typically the domain
//! client wrappers and the orchestration layer above them.
//!
//! | | MockClient | Real actor |
//! |---|---|---|
//! | **State** | scripted responses | real store and hooks |
//! | **Error injection** | `return_err` | needs a state that fails |
//! | **Use case** | logic around the client | the actor itself, end to end |
//!
//! Two styles are available:
//!
//! - **Fluent**: [`MockClient`] queues expectations; each incoming request pops the
//!   next one, must match its kind (and id), and receives the scripted response.
//!   [`MockClient::verify`] asserts nothing was left unconsumed.
//! - **Raw channel**: [`create_mock_client`] hands back the receiver so a test can
//!   pull requests with [`expect_create`], [`expect_put`], [`expect_get`],
//!   [`expect_update`] or [`expect_action`] and answer them by hand.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Response};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A scripted response for one expected request.
enum Expectation<T: ActorEntity> {
    Create {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Put {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
    Update {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
///
/// ```ignore
/// let mut mock = MockClient::<DriverLocation>::new();
/// mock.expect_get(DriverId::from("drv1")).return_ok(None);
/// let drivers = DriverClient::new(mock.client());
/// assert!(drivers.get(DriverId::from("drv1")).await?.is_none());
/// mock.verify();
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue.lock().unwrap().pop_front();
                answer(request, expectation);
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_create(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Create { id, response })
    }

    pub fn expect_put(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Put { id, response })
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::Get { id, response })
    }

    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(|response| Expectation::List { response })
    }

    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Update { id, response })
    }

    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |response| Expectation::Delete { id, response })
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(move |response| Expectation::Action { id, response })
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }

    fn builder<R>(
        &mut self,
        make: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            make: Box::new(make),
        }
    }
}

/// Pairs an incoming request with the expectation at the head of the queue.
fn answer<T: ActorEntity>(request: ResourceRequest<T>, expectation: Option<Expectation<T>>) {
    match (request, expectation) {
        (ResourceRequest::Create { id, respond_to, .. }, Some(Expectation::Create { id: want, response })) => {
            assert_eq!(id, want, "Create for unexpected id");
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Put { id, respond_to, .. }, Some(Expectation::Put { id: want, response })) => {
            assert_eq!(id, want, "Put for unexpected id");
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: want, response })) => {
            assert_eq!(id, want, "Get for unexpected id");
            let _ = respond_to.send(response);
        }
        (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Update { id, respond_to, .. }, Some(Expectation::Update { id: want, response })) => {
            assert_eq!(id, want, "Update for unexpected id");
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Delete { id, respond_to }, Some(Expectation::Delete { id: want, response })) => {
            assert_eq!(id, want, "Delete for unexpected id");
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Action { id, respond_to, .. }, Some(Expectation::Action { id: want, response })) => {
            assert_eq!(id, want, "Action for unexpected id");
            let _ = respond_to.send(response);
        }
        (request, _) => panic!("Unexpected request or expectation mismatch: {:?}", request_kind(&request)),
    }
}

fn request_kind<T: ActorEntity>(request: &ResourceRequest<T>) -> &'static str {
    match request {
        ResourceRequest::Create { .. } => "Create",
        ResourceRequest::Put { .. } => "Put",
        ResourceRequest::Get { .. } => "Get",
        ResourceRequest::List { .. } => "List",
        ResourceRequest::Load { .. } => "Load",
        ResourceRequest::Update { .. } => "Update",
        ResourceRequest::Delete { .. } => "Delete",
        ResourceRequest::Action { .. } => "Action",
    }
}

/// Queues one scripted response on a [`MockClient`].
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Queue<T>,
    make: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T>>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError>) {
        let expectation = (self.make)(response);
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// Creates a client whose requests land on a receiver owned by the test.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Create, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create {
            id,
            params,
            respond_to,
        }) => Some((id, params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Put request.
pub async fn expect_put<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Create, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Put {
            id,
            params,
            respond_to,
        }) => Some((id, params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request.
pub async fn expect_update<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Update, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update {
            id,
            update,
            respond_to,
        }) => Some((id, update, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Depot {
        id: String,
        bays: u32,
    }

    #[derive(Debug)]
    struct DepotCreate {
        bays: u32,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("Depot error")]
    struct DepotError;

    #[async_trait]
    impl ActorEntity for Depot {
        type Id = String;
        type Create = DepotCreate;
        type Update = ();
        type Action = ();
        type ActionResult = u32;
        type Context = ();
        type Error = DepotError;

        fn from_create_params(id: String, params: DepotCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                bays: params.bays,
            })
        }

        async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<u32, Self::Error> {
            Ok(self.bays)
        }
    }

    #[tokio::test]
    async fn test_raw_channel_create() {
        let (client, mut receiver) = create_mock_client::<Depot>(10);

        let create_task =
            tokio::spawn(async move { client.create("north".into(), DepotCreate { bays: 4 }).await });

        let (id, params, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(id, "north");
        assert_eq!(params.bays, 4);
        responder
            .send(Ok(Depot {
                id: "north".into(),
                bays: 4,
            }))
            .unwrap();

        let depot = create_task.await.unwrap().unwrap();
        assert_eq!(depot.bays, 4);
    }

    #[tokio::test]
    async fn test_fluent_expectations_in_order() {
        let mut mock = MockClient::<Depot>::new();
        mock.expect_put("south".into()).return_ok(Depot {
            id: "south".into(),
            bays: 2,
        });
        mock.expect_list().return_ok(vec![]);
        mock.expect_action("south".into())
            .return_err(FrameworkError::NotFound("south".into()));

        let client = mock.client();
        let stored = client.put("south".into(), DepotCreate { bays: 2 }).await.unwrap();
        assert_eq!(stored.id, "south");
        assert!(client.list().await.unwrap().is_empty());
        let missing = client.perform_action("south".into(), ()).await;
        assert!(matches!(missing, Err(FrameworkError::NotFound(_))));

        mock.verify();
    }
}
