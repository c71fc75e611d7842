use actor_framework::{ActorEntity, FrameworkError, ResourceActor};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Parcel {
    id: String,
    weight_kg: f64,
    scans: u32,
}

#[derive(Debug)]
struct ParcelCreate {
    weight_kg: f64,
}

#[derive(Debug)]
struct ParcelUpdate {
    weight_kg: Option<f64>,
}

#[derive(Debug)]
enum ParcelAction {
    Scan,
}

#[derive(Debug, thiserror::Error)]
enum ParcelError {
    #[error("weight must be positive, got {0}")]
    BadWeight(f64),
}

/// Records hook invocations so ordering can be asserted.
type Journal = Arc<Mutex<Vec<String>>>;

#[async_trait]
impl ActorEntity for Parcel {
    type Id = String;
    type Create = ParcelCreate;
    type Update = ParcelUpdate;
    type Action = ParcelAction;
    type ActionResult = u32;
    type Context = Journal;
    type Error = ParcelError;

    fn from_create_params(id: String, params: ParcelCreate) -> Result<Self, Self::Error> {
        if params.weight_kg <= 0.0 {
            return Err(ParcelError::BadWeight(params.weight_kg));
        }
        Ok(Self {
            id,
            weight_kg: params.weight_kg,
            scans: 0,
        })
    }

    async fn on_create(&mut self, ctx: &Journal) -> Result<(), Self::Error> {
        ctx.lock().unwrap().push(format!("created {}", self.id));
        Ok(())
    }

    async fn on_update(&mut self, update: ParcelUpdate, ctx: &Journal) -> Result<(), Self::Error> {
        if let Some(weight) = update.weight_kg {
            self.weight_kg = weight;
        }
        ctx.lock().unwrap().push(format!("updated {}", self.id));
        Ok(())
    }

    async fn on_delete(&self, ctx: &Journal) -> Result<(), Self::Error> {
        ctx.lock().unwrap().push(format!("deleted {}", self.id));
        Ok(())
    }

    async fn handle_action(&mut self, action: ParcelAction, _ctx: &Journal) -> Result<u32, Self::Error> {
        match action {
            ParcelAction::Scan => {
                self.scans += 1;
                Ok(self.scans)
            }
        }
    }
}

#[tokio::test]
async fn test_keyed_lifecycle() {
    let journal: Journal = Arc::default();
    let (actor, client) = ResourceActor::<Parcel>::new(10);
    let handle = tokio::spawn(actor.run(journal.clone()));

    let parcel = client
        .create("P1".into(), ParcelCreate { weight_kg: 2.5 })
        .await
        .unwrap();
    assert_eq!(parcel.id, "P1");

    // Same id again is rejected and leaves the original untouched.
    let dup = client.create("P1".into(), ParcelCreate { weight_kg: 9.0 }).await;
    assert!(matches!(dup, Err(FrameworkError::AlreadyExists(id)) if id == "P1"));

    assert_eq!(client.perform_action("P1".into(), ParcelAction::Scan).await.unwrap(), 1);
    assert_eq!(client.perform_action("P1".into(), ParcelAction::Scan).await.unwrap(), 2);

    let updated = client
        .update("P1".into(), ParcelUpdate { weight_kg: Some(3.0) })
        .await
        .unwrap();
    assert_eq!(updated.weight_kg, 3.0);
    assert_eq!(updated.scans, 2);

    client.delete("P1".into()).await.unwrap();
    assert!(client.get("P1".into()).await.unwrap().is_none());

    drop(client);
    handle.await.unwrap();

    let entries = journal.lock().unwrap().clone();
    assert_eq!(entries, vec!["created P1", "updated P1", "deleted P1"]);
}

#[tokio::test]
async fn test_put_replaces_and_list_returns_all() {
    let (actor, client) = ResourceActor::<Parcel>::new(10);
    tokio::spawn(actor.run(Journal::default()));

    client.put("P1".into(), ParcelCreate { weight_kg: 1.0 }).await.unwrap();
    client.perform_action("P1".into(), ParcelAction::Scan).await.unwrap();
    let replaced = client.put("P1".into(), ParcelCreate { weight_kg: 4.0 }).await.unwrap();
    assert_eq!(replaced.scans, 0);
    assert_eq!(replaced.weight_kg, 4.0);

    client.put("P2".into(), ParcelCreate { weight_kg: 2.0 }).await.unwrap();
    let mut ids: Vec<String> = client.list().await.unwrap().into_iter().map(|p| p.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["P1", "P2"]);
}

#[tokio::test]
async fn test_failed_create_is_not_stored() {
    let (actor, client) = ResourceActor::<Parcel>::new(10);
    tokio::spawn(actor.run(Journal::default()));

    let err = client
        .create("P9".into(), ParcelCreate { weight_kg: -1.0 })
        .await
        .unwrap_err();
    let entity_err = err.into_entity_error::<ParcelError>().unwrap();
    assert!(matches!(entity_err, ParcelError::BadWeight(w) if w == -1.0));
    assert!(client.get("P9".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_load_bypasses_hooks() {
    let journal: Journal = Arc::default();
    let (actor, client) = ResourceActor::<Parcel>::new(10);
    tokio::spawn(actor.run(journal.clone()));

    let restored = Parcel {
        id: "P5".into(),
        weight_kg: 7.0,
        scans: 3,
    };
    let loaded = client.load(vec![("P5".into(), restored.clone())]).await.unwrap();
    assert_eq!(loaded, 1);
    assert_eq!(client.get("P5".into()).await.unwrap(), Some(restored));
    assert!(journal.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (actor, client) = ResourceActor::<Parcel>::new(10);
    tokio::spawn(actor.run(Journal::default()));

    let result = client.perform_action("nope".into(), ParcelAction::Scan).await;
    assert!(matches!(result, Err(FrameworkError::NotFound(id)) if id == "nope"));
}
