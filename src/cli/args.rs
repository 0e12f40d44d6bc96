//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::patient::{PatientId, PatientMetadata};

/// Consult Recorder - record medical consultations and produce PDF summaries
#[derive(Parser, Debug)]
#[command(name = "consult-recorder")]
#[command(version)]
#[command(about = "Record medical consultations, manage patients and download PDF summaries")]
#[command(long_about = None)]
pub struct Cli {
    /// Consultation backend URL (overrides config and CONSULT_BACKEND_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Directory for recordings and downloaded PDFs
    #[arg(long, global = true, value_name = "DIR")]
    pub documents_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a consultation interactively
    Record(RecordOptions),
    /// Log in to the consultation backend
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CONSULT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a practitioner account
    Signup(SignupOptions),
    /// Ask the backend to email a new password
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Browse and manage patients
    Patients {
        #[command(subcommand)]
        action: PatientsAction,
    },
    /// Generate and download a consultation PDF
    Report(ReportOptions),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Patient form fields; each flag overrides a prefilled value
#[derive(Args, Debug, Clone, Default)]
pub struct MetadataArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub surname: Option<String>,
    /// Birth day
    #[arg(long)]
    pub day: Option<String>,
    /// Birth month
    #[arg(long)]
    pub month: Option<String>,
    /// Birth year
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub weight: Option<String>,
    #[arg(long)]
    pub sex: Option<String>,
    /// Medical history
    #[arg(long = "history", value_name = "TEXT")]
    pub medical_history: Option<String>,
}

impl MetadataArgs {
    /// Apply the given flags on top of `base`
    pub fn apply(self, mut base: PatientMetadata) -> PatientMetadata {
        let overrides = [
            (self.name, &mut base.name),
            (self.surname, &mut base.surname),
            (self.day, &mut base.day),
            (self.month, &mut base.month),
            (self.year, &mut base.year),
            (self.weight, &mut base.weight),
            (self.sex, &mut base.sex),
            (self.medical_history, &mut base.medical_history),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }
        base
    }
}

/// Options for `record`
#[derive(Args, Debug, Clone)]
pub struct RecordOptions {
    /// Prefill the form from an existing patient
    #[arg(long, value_name = "ID")]
    pub patient: Option<PatientId>,

    #[command(flatten)]
    pub metadata: MetadataArgs,

    /// Extension of the stored recording
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Sample rate of the stored recording
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,
}

/// Options for `signup`
#[derive(Args, Debug, Clone)]
pub struct SignupOptions {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub surname: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub specialty: String,
    #[arg(long, env = "CONSULT_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Birthdate as YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub birthdate: String,
}

/// Patient subcommands
#[derive(Subcommand, Debug)]
pub enum PatientsAction {
    /// List patients
    List {
        /// Filter by name, surname, birthdate or record date
        #[arg(long, short = 's', value_name = "TERM")]
        search: Option<String>,
    },
    /// Show one patient
    Show { id: PatientId },
    /// Delete a patient
    Delete {
        id: PatientId,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Options for `report`
#[derive(Args, Debug, Clone)]
pub struct ReportOptions {
    /// Start from an existing patient's record and transcription
    #[arg(long, value_name = "ID")]
    pub patient: Option<PatientId>,

    #[command(flatten)]
    pub metadata: MetadataArgs,

    /// Consultation transcription text
    #[arg(long, value_name = "TEXT", conflicts_with = "transcription_file")]
    pub transcription: Option<String>,

    /// Read the transcription from a file
    #[arg(long, value_name = "PATH")]
    pub transcription_file: Option<PathBuf>,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "backend_url",
    "documents_dir",
    "audio_extension",
    "sample_rate",
    "request_timeout_secs",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
