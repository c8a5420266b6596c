// libs/patient-cell/src/services/manager.rs
use chrono::{Local, NaiveDateTime};
use sqlx::sqlite::SqlitePool;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use doctor_cell::TriageService;

use crate::models::{Patient, PatientError, PatientStatistics, RegisterPatientRequest};
use crate::services::index::PatientIndex;
use crate::services::store::PatientStore;

const ID_LEN: usize = 8;

/// Owns the patients table and the in-memory index kept over it.
///
/// All index access goes through one `RwLock`. Mutations hold the write
/// half across their table write, so the index and the table see
/// mutations in the same order.
pub struct HospitalManager {
    store: PatientStore,
    index: RwLock<PatientIndex>,
    triage: TriageService,
}

impl HospitalManager {
    /// Wraps an already bootstrapped pool and loads the current rows.
    pub async fn new(pool: SqlitePool) -> Result<Self, PatientError> {
        let store = PatientStore::new(pool);
        let patients = store.fetch_by_registration().await.map_err(|e| {
            error!("Failed to load patients from database: {}", e);
            PatientError::from(e)
        })?;

        info!("Loaded {} patients from database", patients.len());

        Ok(Self {
            store,
            index: RwLock::new(PatientIndex::from_patients(patients)),
            triage: TriageService::new(),
        })
    }

    pub fn store(&self) -> &PatientStore {
        &self.store
    }

    /// Validates the request, assigns a doctor and records the patient.
    ///
    /// The index is updated before the table. If the table write fails the
    /// patient stays in memory and the error is returned; a later
    /// [`sync_to_store`](Self::sync_to_store) persists it, a
    /// [`reload_from_store`](Self::reload_from_store) drops it.
    #[instrument(skip(self, request), fields(phone = %request.phone))]
    pub async fn register(&self, request: RegisterPatientRequest) -> Result<Patient, PatientError> {
        let details = request.validate()?;
        let doctor = self.triage.suggest(&details.symptoms);

        let mut index = self.index.write().await;
        let id = unique_id(&index);
        let patient = Patient::register(id, details, doctor, now());

        index.insert(patient.clone());

        if let Err(e) = self.store.upsert(&patient).await {
            error!(
                "Database write failed for patient {}; record kept in memory until next sync or reload: {}",
                patient.id, e
            );
            return Err(e.into());
        }

        info!("Registered patient {} with {}", patient.id, patient.doctor);
        Ok(patient)
    }

    /// Memory view, arrival order.
    pub async fn list_all(&self) -> Vec<Patient> {
        self.index.read().await.all()
    }

    /// Table view, appointment-time order.
    pub async fn list_all_from_store(&self) -> Result<Vec<Patient>, PatientError> {
        self.store.fetch_by_appointment_time().await.map_err(|e| {
            error!("Failed to list patients from database: {}", e);
            e.into()
        })
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Patient, PatientError> {
        debug!("Looking up patient {} in memory", id);
        self.index
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| PatientError::NotFound(id.to_string()))
    }

    pub async fn get_by_id_from_store(&self, id: &str) -> Result<Patient, PatientError> {
        debug!("Looking up patient {} in database", id);
        self.store
            .fetch_by_id(id)
            .await
            .map_err(|e| {
                error!("Database lookup for patient {} failed: {}", id, e);
                PatientError::from(e)
            })?
            .ok_or_else(|| PatientError::NotFound(id.to_string()))
    }

    pub async fn find_by_phone(&self, phone: &str) -> Vec<Patient> {
        self.index.read().await.by_phone(phone)
    }

    pub async fn filter_by_doctor(&self, doctor: &str) -> Vec<Patient> {
        self.index.read().await.by_doctor(doctor)
    }

    pub async fn filter_by_status(&self, status: &str) -> Vec<Patient> {
        self.index.read().await.by_status(status)
    }

    /// Live patients by appointment time, earliest first.
    pub async fn priority_ordered(&self) -> Vec<Patient> {
        self.index.read().await.priority_ordered()
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: &str, new_status: &str) -> Result<Patient, PatientError> {
        let new_status = new_status.trim();
        if new_status.is_empty() {
            return Err(PatientError::ValidationError("status must not be empty".to_string()));
        }

        let mut index = self.index.write().await;
        let old_status = index
            .update_status(id, new_status)
            .ok_or_else(|| PatientError::NotFound(id.to_string()))?;

        let updated = self.store.update_status(id, new_status).await.map_err(|e| {
            error!("Database status update for patient {} failed: {}", id, e);
            PatientError::from(e)
        })?;

        if !updated {
            warn!("Patient {} is in memory but missing from database; status change not persisted", id);
        }

        info!("Patient {} status changed from '{}' to '{}'", id, old_status, new_status);
        index
            .get(id)
            .cloned()
            .ok_or_else(|| PatientError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Patient, PatientError> {
        let mut index = self.index.write().await;
        let removed = index
            .remove(id)
            .ok_or_else(|| PatientError::NotFound(id.to_string()))?;

        let deleted = self.store.delete(id).await.map_err(|e| {
            error!("Database delete for patient {} failed: {}", id, e);
            PatientError::from(e)
        })?;

        if !deleted {
            warn!("Patient {} was removed from memory but had no database row", id);
        }

        info!("Deleted patient {}", id);
        Ok(removed)
    }

    /// Counts come from the table, so they can differ from the memory view.
    pub async fn statistics(&self) -> Result<PatientStatistics, PatientError> {
        self.store.statistics().await.map_err(|e| {
            error!("Failed to compute statistics: {}", e);
            e.into()
        })
    }

    /// Upserts every in-memory record. Returns how many were written.
    pub async fn sync_to_store(&self) -> Result<usize, PatientError> {
        let index = self.index.read().await;
        let patients = index.all();

        self.store.upsert_all(&patients).await.map_err(|e| {
            error!("Failed to sync patients to database: {}", e);
            e.into()
        })
    }

    /// Replaces the whole index with the table's rows. Returns how many were loaded.
    pub async fn reload_from_store(&self) -> Result<usize, PatientError> {
        let mut index = self.index.write().await;
        let patients = self.store.fetch_by_registration().await.map_err(|e| {
            error!("Failed to reload patients from database: {}", e);
            PatientError::from(e)
        })?;

        let count = patients.len();
        index.rebuild(patients);

        info!("Reloaded {} patients from database", count);
        Ok(count)
    }

    pub async fn shutdown(&self) {
        info!("Closing patient database pool");
        self.store.close().await;
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn unique_id(index: &PatientIndex) -> String {
    loop {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(ID_LEN);
        if !index.contains(&id) {
            return id;
        }
        debug!("Generated id {} collides with a live patient, retrying", id);
    }
}
