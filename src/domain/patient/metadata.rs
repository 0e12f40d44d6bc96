//! Patient metadata captured alongside a consultation recording

use serde::{Deserialize, Serialize};

use super::record::Patient;
use crate::domain::error::{InputError, MissingFields};

/// Fields that must be non-empty before a recording can be stopped
pub const REQUIRED_FIELDS: [&str; 7] = [
    "name",
    "surname",
    "day",
    "month",
    "year",
    "sex",
    "medicalHistory",
];

/// Patient form for one consultation.
///
/// Every field is free text as typed by the practitioner; only presence is
/// checked. Serializes with the backend's camelCase field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientMetadata {
    pub name: String,
    pub surname: String,
    pub day: String,
    pub month: String,
    pub year: String,
    #[serde(default)]
    pub weight: String,
    pub sex: String,
    pub medical_history: String,
}

impl PatientMetadata {
    /// Prefill a new consultation from an existing patient record.
    /// The birthdate is expected as `YYYY-MM-DD`; missing parts stay empty.
    pub fn from_patient(patient: &Patient) -> Self {
        let mut parts = patient.birthdate.splitn(3, '-');
        let year = parts.next().unwrap_or_default().to_string();
        let month = parts.next().unwrap_or_default().to_string();
        let day = parts.next().unwrap_or_default().to_string();

        Self {
            name: patient.name.clone(),
            surname: patient.surname.clone(),
            day,
            month,
            year,
            weight: patient.weight.clone().unwrap_or_default(),
            sex: patient.sex.clone(),
            medical_history: patient.medical_history.clone(),
        }
    }

    /// Names of required fields that are empty or whitespace
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let values = [
            &self.name,
            &self.surname,
            &self.day,
            &self.month,
            &self.year,
            &self.sex,
            &self.medical_history,
        ];

        REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn validate(&self) -> Result<(), MissingFields> {
        let fields = self.missing_fields();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(MissingFields { fields })
        }
    }

    /// Birthdate as shown on the summary, `day/month/year`
    pub fn birthdate_display(&self) -> String {
        format!("{}/{}/{}", self.day, self.month, self.year)
    }

    /// Set a field by its form name
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> Result<(), InputError> {
        let slot = match field {
            "name" => &mut self.name,
            "surname" => &mut self.surname,
            "day" => &mut self.day,
            "month" => &mut self.month,
            "year" => &mut self.year,
            "weight" => &mut self.weight,
            "sex" => &mut self.sex,
            "history" | "medicalHistory" | "medical_history" => &mut self.medical_history,
            other => return Err(InputError::UnknownField(other.to_string())),
        };
        *slot = value.into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PatientMetadata {
        PatientMetadata {
            name: "Durand".to_string(),
            surname: "Alice".to_string(),
            day: "04".to_string(),
            month: "07".to_string(),
            year: "1985".to_string(),
            weight: String::new(),
            sex: "Female".to_string(),
            medical_history: "Asthma".to_string(),
        }
    }

    #[test]
    fn complete_metadata_validates() {
        assert!(complete().is_complete());
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn weight_is_optional() {
        let metadata = complete();
        assert!(metadata.weight.is_empty());
        assert!(metadata.is_complete());
    }

    #[test]
    fn empty_metadata_misses_every_required_field() {
        let missing = PatientMetadata::default().missing_fields();
        assert_eq!(missing, REQUIRED_FIELDS.to_vec());
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let mut metadata = complete();
        metadata.sex = "   ".to_string();
        let err = metadata.validate().unwrap_err();
        assert_eq!(err.fields, vec!["sex"]);
    }

    #[test]
    fn prefill_splits_birthdate() {
        let patient = Patient {
            id: 7,
            name: "Martin".to_string(),
            surname: "Paul".to_string(),
            birthdate: "1990-03-21".to_string(),
            weight: Some("72".to_string()),
            sex: "Male".to_string(),
            medical_history: "None".to_string(),
            record_date: "2024-05-01".to_string(),
            transcription: None,
        };

        let metadata = PatientMetadata::from_patient(&patient);
        assert_eq!(metadata.year, "1990");
        assert_eq!(metadata.month, "03");
        assert_eq!(metadata.day, "21");
        assert_eq!(metadata.weight, "72");
        assert!(metadata.is_complete());
    }

    #[test]
    fn prefill_tolerates_malformed_birthdate() {
        let patient = Patient {
            birthdate: "1990".to_string(),
            ..Patient::default()
        };
        let metadata = PatientMetadata::from_patient(&patient);
        assert_eq!(metadata.year, "1990");
        assert!(metadata.month.is_empty());
        assert!(metadata.day.is_empty());
    }

    #[test]
    fn set_field_by_name() {
        let mut metadata = PatientMetadata::default();
        metadata.set_field("history", "Diabetes").unwrap();
        metadata.set_field("name", "Roux").unwrap();
        assert_eq!(metadata.medical_history, "Diabetes");
        assert_eq!(metadata.name, "Roux");
        assert!(matches!(
            metadata.set_field("age", "3"),
            Err(InputError::UnknownField(_))
        ));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(complete()).unwrap();
        assert_eq!(json["medicalHistory"], "Asthma");
        assert!(json.get("medical_history").is_none());
    }

    #[test]
    fn birthdate_display_format() {
        assert_eq!(complete().birthdate_display(), "04/07/1985");
    }
}
