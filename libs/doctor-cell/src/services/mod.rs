pub mod triage;

pub use triage::{suggest_doctor, TriageService, DEFAULT_DOCTOR, KEYWORD_TABLE};
