// libs/patient-cell/src/services/store.rs
//! The durable `patients` table. This is the source of truth; everything
//! in [`super::index`] can be rebuilt from it.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{FromRow, Row};
use tracing::{debug, info};

use crate::models::{Patient, PatientStatistics, APPOINTMENT_FORMAT, REGISTERED_AT_FORMAT};

const SELECT_COLUMNS: &str = "SELECT id, name, age, gender, phone, address, disease, symptoms, \
     appointment_time, registered_at, doctor, status FROM patients";

const UPSERT: &str = r#"
    INSERT INTO patients (id, name, age, gender, phone, address, disease,
                          symptoms, appointment_time, registered_at, doctor, status)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        age = excluded.age,
        gender = excluded.gender,
        phone = excluded.phone,
        address = excluded.address,
        disease = excluded.disease,
        symptoms = excluded.symptoms,
        appointment_time = excluded.appointment_time,
        registered_at = excluded.registered_at,
        doctor = excluded.doctor,
        status = excluded.status
"#;

impl<'r> FromRow<'r, SqliteRow> for Patient {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let age: i64 = row.try_get("age")?;
        let appointment_time: String = row.try_get("appointment_time")?;
        let registered_at: String = row.try_get("registered_at")?;

        Ok(Patient {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            age: u32::try_from(age).map_err(|e| column_decode("age", e))?,
            gender: row.try_get("gender")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            disease: row.try_get("disease")?,
            symptoms: row.try_get("symptoms")?,
            appointment_time: NaiveDateTime::parse_from_str(&appointment_time, APPOINTMENT_FORMAT)
                .map_err(|e| column_decode("appointment_time", e))?,
            registered_at: NaiveDateTime::parse_from_str(&registered_at, REGISTERED_AT_FORMAT)
                .map_err(|e| column_decode("registered_at", e))?,
            doctor: row.try_get("doctor")?,
            status: row.try_get("status")?,
        })
    }
}

fn column_decode<E>(column: &str, source: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

#[derive(Debug, Clone)]
pub struct PatientStore {
    pool: SqlitePool,
}

impl PatientStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert-or-replace keyed on `id`; the row keeps its original rowid.
    pub async fn upsert(&self, patient: &Patient) -> Result<(), sqlx::Error> {
        bind_patient(sqlx::query(UPSERT), patient)
            .execute(&self.pool)
            .await?;

        debug!("Upserted patient {} into database", patient.id);
        Ok(())
    }

    /// Writes every record in one transaction.
    pub async fn upsert_all(&self, patients: &[Patient]) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for patient in patients {
            bind_patient(sqlx::query(UPSERT), patient)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!("Synced {} patients to database", patients.len());
        Ok(patients.len())
    }

    /// Returns whether a row was changed.
    pub async fn update_status(&self, id: &str, status: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE patients SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn fetch_by_appointment_time(&self) -> Result<Vec<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(&format!("{} ORDER BY appointment_time, rowid", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
    }

    /// Registration order; same-second registrations fall back to insertion order.
    pub async fn fetch_by_registration(&self) -> Result<Vec<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(&format!("{} ORDER BY registered_at, rowid", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
    }

    pub async fn statistics(&self) -> Result<PatientStatistics, sqlx::Error> {
        let total_patients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patients")
            .fetch_one(&self.pool)
            .await?;

        let by_status: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM patients GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let by_doctor: Vec<(String, i64)> = sqlx::query_as(
            "SELECT doctor, COUNT(*) AS count FROM patients GROUP BY doctor ORDER BY count DESC, doctor",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(PatientStatistics {
            total_patients,
            by_status: by_status.into_iter().collect::<BTreeMap<_, _>>(),
            by_doctor,
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn bind_patient<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    patient: &'q Patient,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(&patient.id)
        .bind(&patient.name)
        .bind(i64::from(patient.age))
        .bind(&patient.gender)
        .bind(&patient.phone)
        .bind(&patient.address)
        .bind(&patient.disease)
        .bind(&patient.symptoms)
        .bind(patient.appointment_time.format(APPOINTMENT_FORMAT).to_string())
        .bind(patient.registered_at.format(REGISTERED_AT_FORMAT).to_string())
        .bind(&patient.doctor)
        .bind(&patient.status)
}
