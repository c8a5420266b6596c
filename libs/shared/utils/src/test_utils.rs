use serde_json::{json, Value};
use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use shared_config::AppConfig;

/// A throwaway SQLite file with the patients schema already applied.
/// The file is removed when this value is dropped.
pub struct TestDatabase {
    dir: TempDir,
    pub config: AppConfig,
    pub pool: SqlitePool,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir for test database");
        let config = TestConfig::default().with_database_in(&dir);
        let pool = shared_database::connect(&config)
            .await
            .expect("open test database");

        Self { dir, config, pool }
    }

    /// A second, independent pool on the same file.
    pub async fn reopen(&self) -> SqlitePool {
        shared_database::connect(&self.config)
            .await
            .expect("reopen test database")
    }

    pub fn path(&self) -> std::path::PathBuf {
        self.dir.path().join(TestConfig::DATABASE_FILE)
    }
}

pub struct TestConfig {
    pub max_connections: u32,
    pub server_port: u16,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            max_connections: 2,
            server_port: 0,
        }
    }
}

impl TestConfig {
    pub const DATABASE_FILE: &'static str = "hospital-test.db";

    pub fn with_database_in(&self, dir: &TempDir) -> AppConfig {
        AppConfig {
            database_url: format!("sqlite://{}", dir.path().join(Self::DATABASE_FILE).display()),
            database_max_connections: self.max_connections,
            server_host: "127.0.0.1".to_string(),
            server_port: self.server_port,
        }
    }
}

pub struct SamplePatients;

impl SamplePatients {
    /// Body for `POST /add_patient`.
    pub fn request(name: &str, phone: &str, symptoms: &str, appointment_time: &str) -> Value {
        json!({
            "name": name,
            "age": 42,
            "gender": "Female",
            "phone": phone,
            "address": "221B Baker Street",
            "disease": "Checkup",
            "symptoms": symptoms,
            "appointment_time": appointment_time
        })
    }

    pub fn fever(phone: &str, appointment_time: &str) -> Value {
        Self::request("Meera Iyer", phone, "high fever and cough", appointment_time)
    }

    pub fn headache(phone: &str, appointment_time: &str) -> Value {
        Self::request("Rahul Nair", phone, "mild headache", appointment_time)
    }

    pub fn status_update(status: &str) -> Value {
        json!({ "status": status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_points_at_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = TestConfig::default().with_database_in(&dir);

        assert!(config.database_url.starts_with("sqlite://"));
        assert!(config.database_url.ends_with(TestConfig::DATABASE_FILE));
        assert_eq!(config.database_max_connections, 2);
    }

    #[test]
    fn test_sample_request_shape() {
        let body = SamplePatients::fever("555-0100", "2025-05-01T10:00");

        for field in ["name", "age", "gender", "phone", "address", "disease", "symptoms", "appointment_time"] {
            assert!(body.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(body["phone"], "555-0100");
    }

    #[tokio::test]
    async fn test_database_file_is_created() {
        let db = TestDatabase::new().await;
        assert!(db.path().exists());
    }
}
