//! Patient domain module

mod metadata;
mod record;

pub use metadata::{PatientMetadata, REQUIRED_FIELDS};
pub use record::{filter_patients, Patient, PatientId};
