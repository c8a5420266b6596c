// libs/doctor-cell/src/services/triage.rs
use tracing::debug;

use crate::models::{DoctorSuggestion, KeywordRule};

/// Declaration order matters: the first keyword found in the symptoms wins.
pub const KEYWORD_TABLE: &[KeywordRule] = &[
    KeywordRule { keyword: "fever", doctor: "Dr. Sharma (General)" },
    KeywordRule { keyword: "cough", doctor: "Dr. Mehta (Chest)" },
    KeywordRule { keyword: "injury", doctor: "Dr. Verma (Ortho)" },
    KeywordRule { keyword: "diabetes", doctor: "Dr. Joshi (Physician)" },
    KeywordRule { keyword: "heart", doctor: "Dr. Singh (Cardiologist)" },
    KeywordRule { keyword: "skin", doctor: "Dr. Batra (Dermatologist)" },
];

pub const DEFAULT_DOCTOR: &str = "Dr. Ahuja (General Practitioner)";

/// Case-insensitive substring scan over [`KEYWORD_TABLE`].
pub fn suggest_doctor(symptoms: &str) -> &'static str {
    TriageService::default().suggest(symptoms)
}

#[derive(Debug, Clone, Copy)]
pub struct TriageService {
    rules: &'static [KeywordRule],
    fallback: &'static str,
}

impl Default for TriageService {
    fn default() -> Self {
        Self::new()
    }
}

impl TriageService {
    pub fn new() -> Self {
        Self {
            rules: KEYWORD_TABLE,
            fallback: DEFAULT_DOCTOR,
        }
    }

    pub fn suggest(&self, symptoms: &str) -> &'static str {
        let haystack = symptoms.to_lowercase();

        match self
            .rules
            .iter()
            .find(|rule| haystack.contains(&rule.keyword.to_lowercase()))
        {
            Some(rule) => {
                debug!("Symptom keyword '{}' matched {}", rule.keyword, rule.doctor);
                rule.doctor
            }
            None => self.fallback,
        }
    }

    pub fn suggestion_for(&self, symptoms: &str) -> DoctorSuggestion {
        DoctorSuggestion {
            name: self.suggest(symptoms).to_string(),
            speciality: symptoms.to_string(),
        }
    }

    pub fn rules(&self) -> &'static [KeywordRule] {
        self.rules
    }
}
