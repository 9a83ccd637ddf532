//! Patient records and the clinical data they own.
//!
//! A patient exclusively owns its alerts and biometric readings: their
//! lifetime is bound to the patient record and they are never shared between
//! patients. Care-team entries are weak references to portal users.

use crate::ids::{PatientId, UserId};
use chrono::{DateTime, Utc};
use portal_types::AdherenceRate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Alerts
// ============================================================================

/// What raised an alert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// A scheduled meal was not logged.
    MissedMeal,
    /// A biometric reading fell outside its normal range.
    AbnormalReading,
    /// The patient's adherence rate dropped below the low-band boundary.
    LowAdherence,
    /// A new message arrived from the patient.
    Message,
}

/// Clinical urgency of an alert.
///
/// Ordered so that `Low < Medium < High`, which lets callers take a `max()`
/// over a patient's alerts to find the most urgent one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Returns the string representation of this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// A system-raised notice about a patient condition requiring attention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    /// The patient this alert belongs to.
    pub patient_id: PatientId,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Whether a clinician has seen this alert. No portal action flips this
    /// yet; it still drives unread counts and widget ordering.
    pub is_read: bool,
}

// ============================================================================
// Biometric readings
// ============================================================================

/// Kind of clinical measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometricKind {
    Weight,
    BloodPressure,
    Glucose,
    HeartRate,
}

impl BiometricKind {
    /// Parses a biometric kind from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weight" => Some(Self::Weight),
            "blood_pressure" => Some(Self::BloodPressure),
            "glucose" => Some(Self::Glucose),
            "heart_rate" => Some(Self::HeartRate),
            _ => None,
        }
    }

    /// Returns the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::BloodPressure => "blood_pressure",
            Self::Glucose => "glucose",
            Self::HeartRate => "heart_rate",
        }
    }
}

/// The measured value of a reading.
///
/// Blood pressure is a systolic/diastolic composite; every other kind is a
/// single number. Modelling the composite explicitly keeps "138/88" from
/// living inside a stringly-typed field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BiometricValue {
    Single(f64),
    BloodPressure { systolic: u16, diastolic: u16 },
}

impl std::fmt::Display for BiometricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BiometricValue::Single(value) => write!(f, "{value}"),
            BiometricValue::BloodPressure {
                systolic,
                diastolic,
            } => write!(f, "{systolic}/{diastolic}"),
        }
    }
}

/// A timestamped clinical measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiometricReading {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BiometricKind,
    pub value: BiometricValue,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
    /// Computed once when the reading is recorded, not re-derived.
    pub is_abnormal: bool,
}

// ============================================================================
// Patients
// ============================================================================

/// A monitored patient and the clinical data the portal holds for them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub email: String,
    pub phone: String,
    /// Condition labels, e.g. "Type 2 Diabetes".
    pub conditions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub adherence_rate: AdherenceRate,
    pub last_activity: DateTime<Utc>,
    /// Alerts owned by this patient, in raise order.
    pub alerts: Vec<Alert>,
    /// Readings owned by this patient, in record order.
    pub biometrics: Vec<BiometricReading>,
    /// Weak references to the users on this patient's care team.
    pub care_team: Vec<UserId>,
}

impl Patient {
    /// Whether the patient carries the given condition label.
    pub fn has_condition(&self, condition: &str) -> bool {
        self.conditions.iter().any(|c| c == condition)
    }

    /// The most urgent severity among this patient's alerts, if any.
    pub fn highest_alert_severity(&self) -> Option<Severity> {
        self.alerts.iter().map(|a| a.severity).max()
    }

    /// This patient's readings of one kind, oldest first.
    pub fn readings_of(&self, kind: BiometricKind) -> Vec<&BiometricReading> {
        let mut readings: Vec<&BiometricReading> =
            self.biometrics.iter().filter(|r| r.kind == kind).collect();
        readings.sort_by_key(|r| r.timestamp);
        readings
    }
}

/// Input for enrolling a new patient.
///
/// The store assigns the id, defaults adherence to 100%, stamps
/// `last_activity` and starts the patient with no alerts or readings.
#[derive(Clone, Debug, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}
