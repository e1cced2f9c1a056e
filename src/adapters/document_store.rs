use crate::adapters::storage::LocalStorage;
use crate::domain::model::{NewVehicle, RecordId, User, VehicleDoc, VehicleStatus, VehicleView};
use crate::domain::ports::{Storage, UserDirectory, VehicleStore};
use crate::domain::validation::{current_year, max_year, MIN_YEAR};
use crate::utils::error::{FleetError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tokio::sync::RwLock;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Collections {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    vehicles: Vec<VehicleDoc>,
}

#[derive(Debug, Default)]
struct State {
    collections: Collections,
    next_seq: u64,
}

impl State {
    fn from_collections(mut collections: Collections) -> Self {
        for (seq, doc) in collections.vehicles.iter_mut().enumerate() {
            doc.seq = seq as u64;
        }
        let next_seq = collections.vehicles.len() as u64;
        Self {
            collections,
            next_seq,
        }
    }

    fn user(&self, id: RecordId) -> Option<User> {
        self.collections.users.iter().find(|u| u.id == id).cloned()
    }

    fn view(&self, doc: &VehicleDoc) -> VehicleView {
        VehicleView {
            id: doc.id,
            mark: doc.mark.clone(),
            model: doc.model.clone(),
            year: doc.year,
            status: doc.status,
            created_by: self.user(doc.created_by),
            updated_by: doc.updated_by.and_then(|id| self.user(id)),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }

    fn new_doc(&mut self, vehicle: NewVehicle, actor: RecordId) -> VehicleDoc {
        let now = Utc::now();
        let seq = self.next_seq;
        self.next_seq += 1;
        VehicleDoc {
            id: RecordId::generate(),
            mark: vehicle.mark,
            model: vehicle.model,
            year: vehicle.year,
            status: vehicle.status,
            created_by: actor,
            updated_by: Some(actor),
            created_at: now,
            updated_at: now,
            seq,
        }
    }
}

/// Field constraints enforced at the storage boundary, reported together.
fn check_schema(doc: &VehicleDoc, current_year: i32) -> Result<()> {
    let mut errors = Vec::new();
    if doc.mark.trim().is_empty() {
        errors.push("Path `mark` is required.".to_string());
    }
    if doc.model.trim().is_empty() {
        errors.push("Path `model` is required.".to_string());
    }
    if doc.year < MIN_YEAR {
        errors.push(format!(
            "Path `year` ({}) is less than minimum allowed value ({}).",
            doc.year, MIN_YEAR
        ));
    }
    let max = max_year(current_year);
    if doc.year > max {
        errors.push(format!(
            "Path `year` ({}) is more than maximum allowed value ({}).",
            doc.year, max
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(FleetError::StoreValidationError { errors })
    }
}

struct Snapshot<S> {
    storage: S,
    file: String,
}

/// Document collection of vehicles and users, held in memory and optionally
/// mirrored to a JSON snapshot after every write.
pub struct DocumentStore<S: Storage = LocalStorage> {
    state: RwLock<State>,
    snapshot: Option<Snapshot<S>>,
}

pub type MemoryStore = DocumentStore<LocalStorage>;

impl<S: Storage> Default for DocumentStore<S> {
    fn default() -> Self {
        Self {
            state: RwLock::new(State::default()),
            snapshot: None,
        }
    }
}

impl<S: Storage> DocumentStore<S> {
    /// A store without snapshot persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the snapshot at `file`, starting empty when it does not exist yet.
    pub async fn open(storage: S, file: impl Into<String>) -> Result<Self> {
        let file = file.into();
        let collections = match storage.read_file(&file).await {
            Ok(bytes) => serde_json::from_slice::<Collections>(&bytes)?,
            Err(FleetError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No snapshot at {}, starting with an empty store", file);
                Collections::default()
            }
            Err(e) => return Err(e),
        };
        tracing::info!(
            "Opened store: {} vehicles, {} users",
            collections.vehicles.len(),
            collections.users.len()
        );

        Ok(Self {
            state: RwLock::new(State::from_collections(collections)),
            snapshot: Some(Snapshot { storage, file }),
        })
    }

    async fn persist(&self, state: &State) -> Result<()> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(());
        };
        let data = serde_json::to_vec_pretty(&state.collections)?;
        snapshot
            .storage
            .write_file(&snapshot.file, &data)
            .await
            .map_err(|e| {
                tracing::error!("Failed to write snapshot {}: {}", snapshot.file, e);
                FleetError::StoreError {
                    message: format!("could not persist snapshot: {}", e),
                }
            })
    }

    pub async fn flush(&self) -> Result<()> {
        let state = self.state.read().await;
        self.persist(&state).await
    }

    /// Final flush before shutdown.
    pub async fn close(&self) -> Result<()> {
        self.flush().await?;
        tracing::info!("Store closed");
        Ok(())
    }
}

#[async_trait]
impl<S: Storage + 'static> VehicleStore for DocumentStore<S> {
    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<VehicleView>> {
        let state = self.state.read().await;
        let mut docs: Vec<&VehicleDoc> = state.collections.vehicles.iter().collect();
        docs.sort_by_key(|doc| Reverse((doc.created_at, doc.seq)));

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(docs
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| state.view(doc))
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.state.read().await.collections.vehicles.len() as u64)
    }

    async fn create(&self, vehicle: NewVehicle, actor: RecordId) -> Result<VehicleView> {
        let mut state = self.state.write().await;
        let doc = state.new_doc(vehicle, actor);
        check_schema(&doc, current_year())?;

        let view = state.view(&doc);
        state.collections.vehicles.push(doc);
        if let Err(e) = self.persist(&state).await {
            state.collections.vehicles.pop();
            return Err(e);
        }
        tracing::debug!("Inserted vehicle {}", view.id);
        Ok(view)
    }

    async fn find_and_update_status(
        &self,
        id: RecordId,
        status: VehicleStatus,
        actor: RecordId,
    ) -> Result<Option<VehicleView>> {
        let mut state = self.state.write().await;
        let Some(index) = state.collections.vehicles.iter().position(|d| d.id == id) else {
            return Ok(None);
        };

        // Only the changed paths are validated, and both are typed.
        let mut updated = state.collections.vehicles[index].clone();
        updated.status = status;
        updated.updated_by = Some(actor);
        updated.updated_at = Utc::now();

        let view = state.view(&updated);
        let previous = std::mem::replace(&mut state.collections.vehicles[index], updated);
        if let Err(e) = self.persist(&state).await {
            state.collections.vehicles[index] = previous;
            return Err(e);
        }
        Ok(Some(view))
    }

    async fn resolve_user(&self, id: RecordId) -> Result<Option<User>> {
        Ok(self.state.read().await.user(id))
    }
}

#[async_trait]
impl<S: Storage + 'static> UserDirectory for DocumentStore<S> {
    async fn insert_user(&self, email: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let mut state = self.state.write().await;
        if state.collections.users.iter().any(|u| u.email == email) {
            return Err(FleetError::StoreValidationError {
                errors: vec![format!("Path `email` ({}) must be unique.", email)],
            });
        }

        let user = User {
            id: RecordId::generate(),
            email,
        };
        state.collections.users.push(user.clone());
        if let Err(e) = self.persist(&state).await {
            state.collections.users.pop();
            return Err(e);
        }
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .collections
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    /// All or nothing: one invalid vehicle rejects the batch.
    async fn insert_many(&self, vehicles: Vec<NewVehicle>, actor: RecordId) -> Result<usize> {
        let mut state = self.state.write().await;
        let year = current_year();
        let mut docs = Vec::with_capacity(vehicles.len());
        for vehicle in vehicles {
            let doc = state.new_doc(vehicle, actor);
            check_schema(&doc, year)?;
            docs.push(doc);
        }

        let inserted = docs.len();
        let before = state.collections.vehicles.len();
        state.collections.vehicles.extend(docs);
        if let Err(e) = self.persist(&state).await {
            state.collections.vehicles.truncate(before);
            return Err(e);
        }
        Ok(inserted)
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.state.write().await;
        let previous = std::mem::take(&mut *state);
        if let Err(e) = self.persist(&state).await {
            *state = previous;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Snapshot storage whose writes fail while `fail` is set.
    #[derive(Clone, Default)]
    struct FlakyStorage {
        fail: Arc<AtomicBool>,
    }

    impl Storage for FlakyStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            Err(FleetError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.to_string(),
            )))
        }

        async fn write_file(&self, _path: &str, _data: &[u8]) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(FleetError::IoError(std::io::Error::other("disk full")));
            }
            Ok(())
        }
    }

    async fn flaky_store() -> (DocumentStore<FlakyStorage>, Arc<AtomicBool>, User, RecordId) {
        let storage = FlakyStorage::default();
        let fail = storage.fail.clone();
        let store = DocumentStore::open(storage, "fleet.json").await.unwrap();
        let admin = store.insert_user("admin@fleet.io").await.unwrap();
        let existing = store.create(vehicle("Volvo", 2019), admin.id).await.unwrap();
        fail.store(true, Ordering::SeqCst);
        (store, fail, admin, existing.id)
    }

    fn vehicle(mark: &str, year: i32) -> NewVehicle {
        NewVehicle {
            mark: mark.to_string(),
            model: "Sedan".to_string(),
            year,
            status: VehicleStatus::Available,
        }
    }

    #[tokio::test]
    async fn test_create_resolves_references() {
        let store = MemoryStore::new();
        let admin = store.insert_user("Admin@Fleet.io").await.unwrap();
        assert_eq!(admin.email, "admin@fleet.io");

        let view = store.create(vehicle("Ford", 2020), admin.id).await.unwrap();
        assert_eq!(view.mark, "Ford");
        assert_eq!(view.created_by.as_ref().map(|u| u.email.as_str()), Some("admin@fleet.io"));
        assert_eq!(view.updated_by, view.created_by);
    }

    #[tokio::test]
    async fn test_unknown_user_resolves_to_none() {
        let store = MemoryStore::new();
        let view = store.create(vehicle("Kia", 2020), RecordId::generate()).await.unwrap();
        assert!(view.created_by.is_none());
        assert!(view.updated_by.is_none());
    }

    #[tokio::test]
    async fn test_schema_rejects_out_of_range_year() {
        let store = MemoryStore::new();
        let err = store
            .create(vehicle("", 1850), RecordId::generate())
            .await
            .unwrap_err();
        match err {
            FleetError::StoreValidationError { errors } => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("mark"));
                assert!(errors[1].contains("minimum"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_page_orders_newest_first() {
        let store = MemoryStore::new();
        let actor = RecordId::generate();
        for i in 0..5 {
            store.create(vehicle(&format!("Mark {i}"), 2020), actor).await.unwrap();
        }

        let page = store.find_page(0, 2).await.unwrap();
        let marks: Vec<_> = page.iter().map(|v| v.mark.as_str()).collect();
        assert_eq!(marks, vec!["Mark 4", "Mark 3"]);

        let tail = store.find_page(4, 10).await.unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].mark, "Mark 0");

        assert!(store.find_page(10, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_missing_record() {
        let store = MemoryStore::new();
        let result = store
            .find_and_update_status(RecordId::generate(), VehicleStatus::Service, RecordId::generate())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let store = MemoryStore::new();
        let actor = RecordId::generate();
        let err = store
            .insert_many(vec![vehicle("Audi", 2020), vehicle("BMW", 1200)], actor)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::StoreValidationError { .. }));
        assert_eq!(store.count().await.unwrap(), 0);

        let inserted = store
            .insert_many(vec![vehicle("Audi", 2020), vehicle("BMW", 2021)], actor)
            .await
            .unwrap();
        assert_eq!(inserted, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.insert_user("a@b.c").await.unwrap();
        assert!(store.insert_user(" A@B.C ").await.is_err());
        assert!(store.find_user_by_email("a@b.c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let id = {
            let store = DocumentStore::open(LocalStorage::new(dir.path()), "fleet.json")
                .await
                .unwrap();
            let admin = store.insert_user("admin@fleet.io").await.unwrap();
            store.create(vehicle("Old", 2018), admin.id).await.unwrap();
            let newer = store.create(vehicle("New", 2019), admin.id).await.unwrap();
            store.close().await.unwrap();
            newer.id
        };

        let reopened = DocumentStore::open(LocalStorage::new(dir.path()), "fleet.json")
            .await
            .unwrap();
        assert_eq!(reopened.count().await.unwrap(), 2);
        let page = reopened.find_page(0, 10).await.unwrap();
        assert_eq!(page[0].id, id);
        assert_eq!(
            page[0].created_by.as_ref().map(|u| u.email.as_str()),
            Some("admin@fleet.io")
        );
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_rolls_back_vehicle_writes() {
        let (store, _fail, admin, existing) = flaky_store().await;

        let err = store.create(vehicle("Saab", 2020), admin.id).await.unwrap_err();
        assert_eq!(err.kind(), "store_error");
        assert_eq!(store.count().await.unwrap(), 1);

        let err = store
            .insert_many(vec![vehicle("Audi", 2020), vehicle("BMW", 2021)], admin.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "store_error");
        assert_eq!(store.count().await.unwrap(), 1);

        let mechanic = RecordId::generate();
        assert!(store
            .find_and_update_status(existing, VehicleStatus::Service, mechanic)
            .await
            .is_err());
        let page = store.find_page(0, 10).await.unwrap();
        assert_eq!(page[0].id, existing);
        assert_eq!(page[0].status, VehicleStatus::Available);
        assert_eq!(page[0].updated_by.as_ref().map(|u| u.id), Some(admin.id));
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_rolls_back_user_writes() {
        let (store, fail, _admin, existing) = flaky_store().await;

        assert!(store.insert_user("mechanic@fleet.io").await.is_err());
        assert!(store.find_user_by_email("mechanic@fleet.io").await.unwrap().is_none());

        assert!(store.clear().await.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.find_user_by_email("admin@fleet.io").await.unwrap().is_some());
        assert_eq!(store.find_page(0, 1).await.unwrap()[0].id, existing);

        fail.store(false, Ordering::SeqCst);
        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_status_update_ignores_unchanged_legacy_fields() {
        let store = MemoryStore::new();
        let actor = RecordId::generate();
        let legacy = store.create(vehicle("Ford", 2020), actor).await.unwrap();
        store.state.write().await.collections.vehicles[0].year = 1850;

        let updated = store
            .find_and_update_status(legacy.id, VehicleStatus::Maintenance, actor)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, VehicleStatus::Maintenance);
        assert_eq!(updated.year, 1850);
    }
}
