//! Wire DTOs for the REST boundary.
//!
//! These are the exact shapes serialized to and from API clients. They are
//! kept separate from the core domain types so the wire surface can carry
//! derived display fields (partner names, goal completion, unread counts)
//! without those leaking into the domain model.

use carelink_core::aggregate::{goal_completion_rate, PatientOverview};
use carelink_core::care_plan::{CarePlan, Goal, Meal, MealPlan};
use carelink_core::messaging::{Conversation, Message, User};
use carelink_core::patient::{Alert, BiometricReading, NewPatient, Patient};
use carelink_core::reports::{AdherencePoint, AnalyticsReport, ReportData};
use carelink_core::session::SessionState;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Errors
// ============================================================================

/// Structured error body returned for every non-2xx response.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

impl ErrorRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Login request body.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

/// A portal user as exposed on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRes {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<&User> for UserRes {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().into(),
            avatar: user.avatar.clone(),
        }
    }
}

/// Snapshot of the session state.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionRes {
    pub is_authenticated: bool,
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&SessionState> for SessionRes {
    fn from(state: &SessionState) -> Self {
        Self {
            is_authenticated: state.is_authenticated,
            is_loading: state.is_loading,
            user: state.user.as_ref().map(UserRes::from),
            error: state.error.clone(),
        }
    }
}

// ============================================================================
// Patients
// ============================================================================

/// One row of the patient list.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientSummaryRes {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub conditions: Vec<String>,
    pub adherence_rate: u8,
    pub last_activity: DateTime<Utc>,
    pub alert_count: usize,
    /// The most urgent alert severity, when any alert exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_severity: Option<String>,
}

impl From<&Patient> for PatientSummaryRes {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id.to_string(),
            name: patient.name.clone(),
            age: patient.age,
            gender: patient.gender.clone(),
            conditions: patient.conditions.clone(),
            adherence_rate: patient.adherence_rate.percent(),
            last_activity: patient.last_activity,
            alert_count: patient.alerts.len(),
            highest_severity: patient
                .highest_alert_severity()
                .map(|s| s.as_str().into()),
        }
    }
}

/// The patient list plus the distinct condition labels that drive the
/// condition filter.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientListRes {
    pub patients: Vec<PatientSummaryRes>,
    pub conditions: Vec<String>,
}

/// Request body for enrolling a patient.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NewPatientReq {
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

impl From<NewPatientReq> for NewPatient {
    fn from(req: NewPatientReq) -> Self {
        NewPatient {
            name: req.name,
            age: req.age,
            gender: req.gender,
            email: req.email,
            phone: req.phone,
            conditions: req.conditions,
            avatar: req.avatar,
        }
    }
}

/// An alert as exposed on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AlertRes {
    pub id: String,
    pub patient_id: String,
    /// Resolved for widgets that link to the patient; absent when the
    /// caller did not resolve it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

impl AlertRes {
    /// Builds the wire alert, with an optionally resolved patient name.
    pub fn new(alert: &Alert, patient_name: Option<String>) -> Self {
        Self {
            id: alert.id.clone(),
            patient_id: alert.patient_id.to_string(),
            patient_name,
            kind: match alert.kind {
                carelink_core::patient::AlertKind::MissedMeal => "missed_meal".into(),
                carelink_core::patient::AlertKind::AbnormalReading => "abnormal_reading".into(),
                carelink_core::patient::AlertKind::LowAdherence => "low_adherence".into(),
                carelink_core::patient::AlertKind::Message => "message".into(),
            },
            severity: alert.severity.as_str().into(),
            message: alert.message.clone(),
            timestamp: alert.timestamp,
            is_read: alert.is_read,
        }
    }
}

/// A biometric reading as exposed on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BiometricReadingRes {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Rendered value: a plain number, or `"systolic/diastolic"` for blood
    /// pressure.
    pub value: String,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
    pub is_abnormal: bool,
}

impl From<&BiometricReading> for BiometricReadingRes {
    fn from(reading: &BiometricReading) -> Self {
        Self {
            id: reading.id.clone(),
            kind: reading.kind.as_str().into(),
            value: reading.value.to_string(),
            unit: reading.unit.clone(),
            timestamp: reading.timestamp,
            is_abnormal: reading.is_abnormal,
        }
    }
}

/// A patient's readings of one kind, oldest first.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BiometricListRes {
    pub readings: Vec<BiometricReadingRes>,
}

/// Full patient detail view.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientDetailRes {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub conditions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub adherence_rate: u8,
    pub last_activity: DateTime<Utc>,
    pub alerts: Vec<AlertRes>,
    pub biometrics: Vec<BiometricReadingRes>,
    pub care_team: Vec<UserRes>,
    /// The plans assigned to this patient, in creation order.
    pub care_plans: Vec<CarePlanRes>,
}

impl PatientDetailRes {
    /// Builds the detail view; the caller resolves the care-team users and
    /// the patient's care plans.
    pub fn new(patient: &Patient, care_team: Vec<UserRes>, care_plans: Vec<CarePlanRes>) -> Self {
        Self {
            id: patient.id.to_string(),
            name: patient.name.clone(),
            age: patient.age,
            gender: patient.gender.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            conditions: patient.conditions.clone(),
            avatar: patient.avatar.clone(),
            adherence_rate: patient.adherence_rate.percent(),
            last_activity: patient.last_activity,
            alerts: patient
                .alerts
                .iter()
                .map(|a| AlertRes::new(a, Some(patient.name.clone())))
                .collect(),
            biometrics: patient.biometrics.iter().map(BiometricReadingRes::from).collect(),
            care_team,
            care_plans,
        }
    }
}

// ============================================================================
// Care plans and meal plans
// ============================================================================

/// A goal as exposed on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GoalRes {
    pub id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    pub status: String,
}

impl From<&Goal> for GoalRes {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id.clone(),
            description: goal.description.clone(),
            target_date: goal.target_date,
            status: match goal.status {
                carelink_core::care_plan::GoalStatus::Pending => "pending".into(),
                carelink_core::care_plan::GoalStatus::InProgress => "in_progress".into(),
                carelink_core::care_plan::GoalStatus::Achieved => "achieved".into(),
            },
        }
    }
}

/// A meal as exposed on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MealRes {
    pub id: String,
    pub name: String,
    pub description: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&Meal> for MealRes {
    fn from(meal: &Meal) -> Self {
        Self {
            id: meal.id.clone(),
            name: meal.name.clone(),
            description: meal.description.clone(),
            calories: meal.nutrition.calories,
            protein: meal.nutrition.protein,
            carbs: meal.nutrition.carbs,
            fat: meal.nutrition.fat,
            image: meal.image.clone(),
        }
    }
}

/// A meal plan as exposed on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MealPlanRes {
    pub id: String,
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub meals: Vec<MealRes>,
}

impl From<&MealPlan> for MealPlanRes {
    fn from(plan: &MealPlan) -> Self {
        Self {
            id: plan.id.to_string(),
            name: plan.name.clone(),
            description: plan.description.clone(),
            schedule: match plan.schedule {
                carelink_core::care_plan::MealSchedule::Daily => "daily".into(),
                carelink_core::care_plan::MealSchedule::Weekly => "weekly".into(),
            },
            meals: plan.meals.iter().map(MealRes::from).collect(),
        }
    }
}

/// A care plan as exposed on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CarePlanRes {
    pub id: String,
    pub patient_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Achieved goals over total goals, rounded integer percent.
    pub goal_completion: u8,
    pub goals: Vec<GoalRes>,
    pub meal_plans: Vec<MealPlanRes>,
    pub created_by: String,
}

impl CarePlanRes {
    /// Builds the wire plan; the caller resolves the patient name.
    pub fn new(plan: &CarePlan, patient_name: Option<String>) -> Self {
        Self {
            id: plan.id.to_string(),
            patient_id: plan.patient_id.to_string(),
            patient_name,
            title: plan.title.clone(),
            description: plan.description.clone(),
            status: plan.status.as_str().into(),
            created_at: plan.created_at,
            updated_at: plan.updated_at,
            start_date: plan.start_date,
            end_date: plan.end_date,
            goal_completion: goal_completion_rate(plan),
            goals: plan.goals.iter().map(GoalRes::from).collect(),
            meal_plans: plan.meal_plans.iter().map(MealPlanRes::from).collect(),
            created_by: plan.created_by.to_string(),
        }
    }
}

/// The visible care-plan list.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CarePlanListRes {
    pub care_plans: Vec<CarePlanRes>,
}

/// The global meal-plan set.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MealPlanListRes {
    pub meal_plans: Vec<MealPlanRes>,
}

// ============================================================================
// Messaging
// ============================================================================

/// A message as exposed on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

impl From<&Message> for MessageRes {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            sender_id: message.sender.to_string(),
            recipient_id: message.recipient.to_string(),
            content: message.content.clone(),
            timestamp: message.timestamp,
            is_read: message.is_read,
        }
    }
}

/// One row of the conversation inbox, from the viewer's perspective.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ConversationRes {
    pub id: String,
    pub partner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_name: Option<String>,
    pub last_message: MessageRes,
    /// Unread messages addressed to the viewer, derived at read time.
    pub unread_count: usize,
}

impl ConversationRes {
    /// Builds the inbox row; the caller supplies the resolved partner and
    /// derived unread count.
    pub fn new(
        conversation: &Conversation,
        partner_id: String,
        partner_name: Option<String>,
        unread_count: usize,
    ) -> Self {
        Self {
            id: conversation.id.to_string(),
            partner_id,
            partner_name,
            last_message: MessageRes::from(&conversation.last_message),
            unread_count,
        }
    }
}

/// The viewer's conversation inbox.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ConversationListRes {
    pub conversations: Vec<ConversationRes>,
}

/// Messages inside one conversation, newest first.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageListRes {
    pub messages: Vec<MessageRes>,
}

/// Request body for sending a message.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SendMessageReq {
    pub content: String,
}

// ============================================================================
// Dashboard and analytics
// ============================================================================

/// The dashboard patients-overview block.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OverviewRes {
    pub total_patients: usize,
    pub high_adherence: usize,
    pub medium_adherence: usize,
    pub low_adherence: usize,
    /// Absent when there are no patients at all ("no data").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_adherence: Option<u8>,
    pub patients_with_alerts: usize,
    pub unread_alerts: usize,
}

impl From<&PatientOverview> for OverviewRes {
    fn from(overview: &PatientOverview) -> Self {
        Self {
            total_patients: overview.total,
            high_adherence: overview.buckets.high,
            medium_adherence: overview.buckets.medium,
            low_adherence: overview.buckets.low,
            average_adherence: overview.average_adherence,
            patients_with_alerts: overview.with_alerts,
            unread_alerts: overview.unread_alerts,
        }
    }
}

/// The dashboard payload.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardRes {
    pub overview: OverviewRes,
    pub recent_alerts: Vec<AlertRes>,
    pub recent_care_plans: Vec<CarePlanRes>,
    pub recent_messages: Vec<MessageRes>,
}

/// One day of the population adherence trend.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TrendPointRes {
    pub date: NaiveDate,
    pub average: u8,
}

impl From<&AdherencePoint> for TrendPointRes {
    fn from(point: &AdherencePoint) -> Self {
        Self {
            date: point.date,
            average: point.average,
        }
    }
}

/// Patients sharing one condition label.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ConditionCountRes {
    pub condition: String,
    pub patients: usize,
}

/// Typed report payload on the wire, mirroring the core tagged enum.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportDataRes {
    Adherence {
        average_adherence: u8,
        patient_count: u32,
        low_adherence_count: u32,
        improvement_rate: u32,
        monthly_trend: Vec<u8>,
    },
    Biometrics {
        weight_loss_average: f64,
        blood_pressure_improvement: f64,
        glucose_level_improvement: f64,
        cholesterol_improvement: f64,
    },
    Progress {
        hba1c_reduction: f64,
        diabetic_patients: u32,
        significant_improvement: u32,
        minor_improvement: u32,
        no_change: u32,
    },
}

impl From<&ReportData> for ReportDataRes {
    fn from(data: &ReportData) -> Self {
        match data {
            ReportData::Adherence {
                average_adherence,
                patient_count,
                low_adherence_count,
                improvement_rate,
                monthly_trend,
            } => ReportDataRes::Adherence {
                average_adherence: *average_adherence,
                patient_count: *patient_count,
                low_adherence_count: *low_adherence_count,
                improvement_rate: *improvement_rate,
                monthly_trend: monthly_trend.clone(),
            },
            ReportData::Biometrics {
                weight_loss_average,
                blood_pressure_improvement,
                glucose_level_improvement,
                cholesterol_improvement,
            } => ReportDataRes::Biometrics {
                weight_loss_average: *weight_loss_average,
                blood_pressure_improvement: *blood_pressure_improvement,
                glucose_level_improvement: *glucose_level_improvement,
                cholesterol_improvement: *cholesterol_improvement,
            },
            ReportData::Progress {
                hba1c_reduction,
                diabetic_patients,
                significant_improvement,
                minor_improvement,
                no_change,
            } => ReportDataRes::Progress {
                hba1c_reduction: *hba1c_reduction,
                diabetic_patients: *diabetic_patients,
                significant_improvement: *significant_improvement,
                minor_improvement: *minor_improvement,
                no_change: *no_change,
            },
        }
    }
}

/// An analytics report as exposed on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportRes {
    pub id: String,
    pub title: String,
    pub description: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: ReportDataRes,
}

impl From<&AnalyticsReport> for ReportRes {
    fn from(report: &AnalyticsReport) -> Self {
        Self {
            id: report.id.clone(),
            title: report.title.clone(),
            description: report.description.clone(),
            generated_at: report.generated_at,
            data: ReportDataRes::from(&report.data),
        }
    }
}

/// The analytics page payload.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsRes {
    pub reports: Vec<ReportRes>,
    /// Trend slice for the requested timeframe, oldest first.
    pub adherence_trend: Vec<TrendPointRes>,
    /// Latest trend point minus the one before it.
    pub adherence_change: i32,
    pub conditions: Vec<ConditionCountRes>,
    pub adherence_distribution: OverviewRes,
}
