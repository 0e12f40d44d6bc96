//! Patient records as stored by the consultation backend

use serde::{Deserialize, Deserializer, Serialize};

/// Backend identifier of a patient
pub type PatientId = u64;

/// A patient as returned by `GET /patients` and `GET /patient/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub surname: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub birthdate: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub weight: Option<String>,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub medical_history: String,
    /// Date of the last consultation
    #[serde(default)]
    pub record_date: String,
    #[serde(default)]
    pub transcription: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Search match: names compare case-insensitively, dates as typed.
    /// An empty term matches every patient.
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.surname.to_lowercase().contains(&needle)
            || self.birthdate.contains(term)
            || self.record_date.contains(term)
    }
}

/// Patients matching a search term, in their original order
pub fn filter_patients<'a>(patients: &'a [Patient], term: &str) -> Vec<&'a Patient> {
    patients.iter().filter(|p| p.matches(term)).collect()
}

/// The backend stores weight as whatever the form sent, number or string
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
