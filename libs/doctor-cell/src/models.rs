use serde::{Deserialize, Serialize};

/// One row of the triage keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeywordRule {
    pub keyword: &'static str,
    pub doctor: &'static str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestDoctorRequest {
    #[serde(default)]
    pub symptoms: Option<String>,
}

/// `speciality` echoes the symptoms the suggestion was made for; the
/// registration form shows it next to the doctor name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSuggestion {
    pub name: String,
    pub speciality: String,
}
