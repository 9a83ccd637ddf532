//! Analytics reports and adherence trend data.
//!
//! Report payloads are tagged variants with concrete fields per report type.
//! A report can only carry the fields its type defines, so consumers never
//! reach into a loosely-typed payload.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Typed payload of an analytics report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportData {
    /// Adherence overview across the patient population.
    Adherence {
        average_adherence: u8,
        patient_count: u32,
        low_adherence_count: u32,
        improvement_rate: u32,
        monthly_trend: Vec<u8>,
    },
    /// Aggregate biometric movement over a reporting period.
    Biometrics {
        weight_loss_average: f64,
        blood_pressure_improvement: f64,
        glucose_level_improvement: f64,
        cholesterol_improvement: f64,
    },
    /// Outcome tracking for condition-management programs.
    Progress {
        hba1c_reduction: f64,
        diabetic_patients: u32,
        significant_improvement: u32,
        minor_improvement: u32,
        no_change: u32,
    },
}

impl ReportData {
    /// The wire tag for this report type.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportData::Adherence { .. } => "adherence",
            ReportData::Biometrics { .. } => "biometrics",
            ReportData::Progress { .. } => "progress",
        }
    }
}

/// A generated analytics report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub id: String,
    pub title: String,
    pub description: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: ReportData,
}

/// One day of the population adherence trend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherencePoint {
    pub date: NaiveDate,
    /// Population average adherence for the day, integer percent.
    pub average: u8,
}
