use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use shared_models::error::AppError;

pub const DEFAULT_STATUS: &str = "Pending";
pub const MAX_AGE: u32 = 150;

/// `datetime-local` form value, minute precision.
pub const APPOINTMENT_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const REGISTERED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub address: String,
    pub disease: String,
    pub symptoms: String,
    #[serde(with = "appointment_time")]
    pub appointment_time: NaiveDateTime,
    #[serde(with = "registered_at")]
    pub registered_at: NaiveDateTime,
    pub doctor: String,
    pub status: String,
}

impl Patient {
    /// Builds a fresh record. The doctor is fixed here and never recomputed.
    pub fn register(
        id: String,
        details: NewPatient,
        doctor: &str,
        registered_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            name: details.name,
            age: details.age,
            gender: details.gender,
            phone: details.phone,
            address: details.address,
            disease: details.disease,
            symptoms: details.symptoms,
            appointment_time: details.appointment_time,
            registered_at: registered_at.with_nanosecond(0).unwrap_or(registered_at),
            doctor: doctor.to_string(),
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

/// Body of `POST /add_patient`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPatientRequest {
    pub name: String,
    #[serde(deserialize_with = "age_from_number_or_string")]
    pub age: i64,
    pub gender: String,
    pub phone: String,
    pub address: String,
    pub disease: String,
    pub symptoms: String,
    pub appointment_time: String,
}

/// A registration request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub address: String,
    pub disease: String,
    pub symptoms: String,
    pub appointment_time: NaiveDateTime,
}

impl RegisterPatientRequest {
    pub fn validate(self) -> Result<NewPatient, PatientError> {
        if self.name.trim().is_empty() {
            return Err(PatientError::ValidationError("name must not be empty".to_string()));
        }
        if self.phone.trim().is_empty() {
            return Err(PatientError::ValidationError("phone must not be empty".to_string()));
        }

        let age = u32::try_from(self.age)
            .ok()
            .filter(|age| (1..=MAX_AGE).contains(age))
            .ok_or_else(|| {
                PatientError::ValidationError(format!(
                    "age must be between 1 and {}, got {}",
                    MAX_AGE, self.age
                ))
            })?;

        let appointment_time = parse_appointment_time(&self.appointment_time)?;

        Ok(NewPatient {
            name: self.name.trim().to_string(),
            age,
            gender: self.gender,
            phone: self.phone.trim().to_string(),
            address: self.address,
            disease: self.disease,
            symptoms: self.symptoms,
            appointment_time,
        })
    }
}

/// Accepts `YYYY-MM-DDTHH:MM` and `YYYY-MM-DDTHH:MM:SS`; seconds are dropped.
pub fn parse_appointment_time(raw: &str) -> Result<NaiveDateTime, PatientError> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, APPOINTMENT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map(|at| at.with_second(0).unwrap_or(at))
        .map_err(|_| {
            PatientError::ValidationError(format!(
                "appointment_time '{}' is not in YYYY-MM-DDTHH:MM format",
                raw
            ))
        })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    pub message: String,
    pub id: String,
    pub doctor: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Counts computed by the database, not by the in-memory index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientStatistics {
    pub total_patients: i64,
    pub by_status: BTreeMap<String, i64>,
    /// Highest count first; serialized as an object in this order.
    #[serde(serialize_with = "ordered_counts")]
    pub by_doctor: Vec<(String, i64)>,
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) => AppError::NotFound("Patient not found".to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::DatabaseError(e) => AppError::Database(e.to_string()),
        }
    }
}

fn age_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAge {
        Number(i64),
        Text(String),
    }

    match RawAge::deserialize(deserializer)? {
        RawAge::Number(n) => Ok(n),
        RawAge::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("age '{}' is not a whole number", s))),
    }
}

fn ordered_counts<S>(counts: &[(String, i64)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(counts.iter().map(|(k, v)| (k, v)))
}

mod appointment_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&at.format(super::APPOINTMENT_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_appointment_time(&raw).map_err(serde::de::Error::custom)
    }
}

mod registered_at {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&at.format(super::REGISTERED_AT_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, super::REGISTERED_AT_FORMAT).map_err(serde::de::Error::custom)
    }
}
