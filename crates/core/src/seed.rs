//! The seeded demo dataset.
//!
//! Builds the in-memory store the portal ships with: three staff users,
//! four monitored patients with their alerts and latest readings, three
//! care plans, a small message inbox and the analytics reports. Trend
//! series (per-patient biometric histories and the population adherence
//! curve) are generated with bounded random variation around clinically
//! plausible base values.

use crate::care_plan::{
    CarePlan, Goal, GoalStatus, Meal, MealPlan, MealSchedule, NutritionFacts, PlanStatus,
};
use crate::error::{PortalError, PortalResult};
use crate::ids::{
    CarePlanId, ConversationId, MealPlanId, MessageId, ParticipantId, PatientId, UserId,
};
use crate::messaging::{Conversation, Message, User, UserRole};
use crate::patient::{
    Alert, AlertKind, BiometricKind, BiometricReading, BiometricValue, Patient, Severity,
};
use crate::reports::{AdherencePoint, AnalyticsReport, ReportData};
use crate::store::PortalStore;
use chrono::{DateTime, Duration, Utc};
use portal_types::AdherenceRate;
use rand::Rng;

/// Days of generated biometric history per patient and kind.
const HISTORY_DAYS: i64 = 14;

/// Days of generated population adherence trend.
const TREND_DAYS: i64 = 30;

fn ts(value: &str) -> PortalResult<DateTime<Utc>> {
    value
        .parse()
        .map_err(|e| PortalError::InvalidInput(format!("bad seed timestamp {value}: {e}")))
}

fn rate(percent: u16) -> PortalResult<AdherenceRate> {
    AdherenceRate::new(percent)
        .map_err(|e| PortalError::InvalidInput(format!("bad seed adherence rate: {e}")))
}

/// Builds the fully seeded demo store.
///
/// # Errors
///
/// Returns [`PortalError::InvalidInput`] if any literal in the dataset fails
/// to parse; that is a defect in the seed itself, not a runtime condition.
pub fn demo_store() -> PortalResult<PortalStore> {
    let mut store = PortalStore::new();

    seed_users(&mut store);
    seed_patients(&mut store)?;
    seed_care_plans(&mut store)?;
    seed_messaging(&mut store)?;
    seed_reports(&mut store)?;

    let mut rng = rand::thread_rng();
    seed_biometric_histories(&mut store, &mut rng);
    store.set_adherence_history(adherence_trend(TREND_DAYS, &mut rng));

    Ok(store)
}

fn seed_users(store: &mut PortalStore) {
    store.insert_user(User {
        id: UserId::new("u1"),
        name: "Dr. Sarah Johnson".into(),
        email: "sarah.johnson@carelink.health".into(),
        role: UserRole::Clinician,
        avatar: Some("https://images.pexels.com/photos/5452293/pexels-photo-5452293.jpeg".into()),
    });
    store.insert_user(User {
        id: UserId::new("u2"),
        name: "Mark Wilson".into(),
        email: "mark.wilson@carelink.health".into(),
        role: UserRole::CareTeam,
        avatar: Some("https://images.pexels.com/photos/614810/pexels-photo-614810.jpeg".into()),
    });
    store.insert_user(User {
        id: UserId::new("u3"),
        name: "Dr. Emily Chen".into(),
        email: "emily.chen@carelink.health".into(),
        role: UserRole::Clinician,
        avatar: Some("https://images.pexels.com/photos/774909/pexels-photo-774909.jpeg".into()),
    });
}

fn seed_patients(store: &mut PortalStore) -> PortalResult<()> {
    store.insert_patient(Patient {
        id: PatientId::new("p1"),
        name: "John Doe".into(),
        age: 58,
        gender: "Male".into(),
        email: "john.doe@example.com".into(),
        phone: "(555) 123-4567".into(),
        conditions: vec!["Type 2 Diabetes".into(), "Hypertension".into()],
        avatar: Some("https://images.pexels.com/photos/220453/pexels-photo-220453.jpeg".into()),
        adherence_rate: rate(78)?,
        last_activity: ts("2025-06-15T14:30:00Z")?,
        alerts: vec![
            Alert {
                id: "a1".into(),
                patient_id: PatientId::new("p1"),
                kind: AlertKind::AbnormalReading,
                severity: Severity::Medium,
                message: "Elevated blood glucose reading".into(),
                timestamp: ts("2025-06-15T08:45:00Z")?,
                is_read: false,
            },
            Alert {
                id: "a2".into(),
                patient_id: PatientId::new("p1"),
                kind: AlertKind::MissedMeal,
                severity: Severity::Low,
                message: "Missed lunch meal".into(),
                timestamp: ts("2025-06-14T13:00:00Z")?,
                is_read: true,
            },
        ],
        biometrics: vec![
            BiometricReading {
                id: "b1".into(),
                kind: BiometricKind::Glucose,
                value: BiometricValue::Single(182.0),
                unit: "mg/dL".into(),
                timestamp: ts("2025-06-15T08:30:00Z")?,
                is_abnormal: true,
            },
            BiometricReading {
                id: "b2".into(),
                kind: BiometricKind::BloodPressure,
                value: BiometricValue::BloodPressure {
                    systolic: 138,
                    diastolic: 88,
                },
                unit: "mmHg".into(),
                timestamp: ts("2025-06-15T08:35:00Z")?,
                is_abnormal: true,
            },
            BiometricReading {
                id: "b3".into(),
                kind: BiometricKind::Weight,
                value: BiometricValue::Single(192.0),
                unit: "lbs".into(),
                timestamp: ts("2025-06-15T08:40:00Z")?,
                is_abnormal: false,
            },
        ],
        care_team: vec![UserId::new("u1"), UserId::new("u2")],
    });

    store.insert_patient(Patient {
        id: PatientId::new("p2"),
        name: "Jane Smith".into(),
        age: 62,
        gender: "Female".into(),
        email: "jane.smith@example.com".into(),
        phone: "(555) 987-6543".into(),
        conditions: vec!["Coronary Artery Disease".into(), "COPD".into()],
        avatar: Some("https://images.pexels.com/photos/1036623/pexels-photo-1036623.jpeg".into()),
        adherence_rate: rate(92)?,
        last_activity: ts("2025-06-16T09:15:00Z")?,
        alerts: vec![Alert {
            id: "a5".into(),
            patient_id: PatientId::new("p2"),
            kind: AlertKind::AbnormalReading,
            severity: Severity::High,
            message: "Abnormal heart rate detected".into(),
            timestamp: ts("2025-06-15T22:30:00Z")?,
            is_read: false,
        }],
        biometrics: vec![
            BiometricReading {
                id: "b4".into(),
                kind: BiometricKind::HeartRate,
                value: BiometricValue::Single(72.0),
                unit: "bpm".into(),
                timestamp: ts("2025-06-16T09:00:00Z")?,
                is_abnormal: false,
            },
            BiometricReading {
                id: "b5".into(),
                kind: BiometricKind::Weight,
                value: BiometricValue::Single(145.0),
                unit: "lbs".into(),
                timestamp: ts("2025-06-16T09:05:00Z")?,
                is_abnormal: false,
            },
        ],
        care_team: vec![UserId::new("u3")],
    });

    store.insert_patient(Patient {
        id: PatientId::new("p3"),
        name: "Robert Johnson".into(),
        age: 45,
        gender: "Male".into(),
        email: "robert.johnson@example.com".into(),
        phone: "(555) 456-7890".into(),
        conditions: vec!["Obesity".into(), "Pre-diabetes".into()],
        avatar: Some("https://images.pexels.com/photos/1222271/pexels-photo-1222271.jpeg".into()),
        adherence_rate: rate(65)?,
        last_activity: ts("2025-06-14T18:20:00Z")?,
        alerts: vec![Alert {
            id: "a3".into(),
            patient_id: PatientId::new("p3"),
            kind: AlertKind::LowAdherence,
            severity: Severity::High,
            message: "Adherence rate below 70%".into(),
            timestamp: ts("2025-06-14T19:00:00Z")?,
            is_read: false,
        }],
        biometrics: vec![BiometricReading {
            id: "b6".into(),
            kind: BiometricKind::Weight,
            value: BiometricValue::Single(238.0),
            unit: "lbs".into(),
            timestamp: ts("2025-06-14T18:00:00Z")?,
            is_abnormal: true,
        }],
        care_team: vec![UserId::new("u1"), UserId::new("u3")],
    });

    store.insert_patient(Patient {
        id: PatientId::new("p4"),
        name: "Maria Garcia".into(),
        age: 52,
        gender: "Female".into(),
        email: "maria.garcia@example.com".into(),
        phone: "(555) 789-0123".into(),
        conditions: vec!["Type 1 Diabetes".into(), "Celiac Disease".into()],
        avatar: Some("https://images.pexels.com/photos/733872/pexels-photo-733872.jpeg".into()),
        adherence_rate: rate(88)?,
        last_activity: ts("2025-06-16T07:45:00Z")?,
        alerts: vec![Alert {
            id: "a4".into(),
            patient_id: PatientId::new("p4"),
            kind: AlertKind::Message,
            severity: Severity::Low,
            message: "New message from Maria Garcia".into(),
            timestamp: ts("2025-06-16T08:10:00Z")?,
            is_read: false,
        }],
        biometrics: vec![BiometricReading {
            id: "b7".into(),
            kind: BiometricKind::Glucose,
            value: BiometricValue::Single(112.0),
            unit: "mg/dL".into(),
            timestamp: ts("2025-06-16T07:30:00Z")?,
            is_abnormal: false,
        }],
        care_team: vec![UserId::new("u2")],
    });

    Ok(())
}

fn seed_care_plans(store: &mut PortalStore) -> PortalResult<()> {
    store.insert_care_plan(CarePlan {
        id: CarePlanId::new("cp1"),
        patient_id: PatientId::new("p1"),
        title: "Diabetes Management Plan".into(),
        description: "Comprehensive plan to manage Type 2 Diabetes and reduce HbA1c levels".into(),
        created_at: ts("2025-05-10T09:00:00Z")?,
        updated_at: ts("2025-06-12T14:30:00Z")?,
        start_date: None,
        end_date: None,
        status: PlanStatus::Active,
        goals: vec![
            Goal {
                id: "g1".into(),
                description: "Reduce HbA1c to below 7.0%".into(),
                target_date: None,
                status: GoalStatus::InProgress,
            },
            Goal {
                id: "g2".into(),
                description: "Lose 15 pounds".into(),
                target_date: None,
                status: GoalStatus::InProgress,
            },
            Goal {
                id: "g3".into(),
                description: "Walk 7,000 steps daily".into(),
                target_date: None,
                status: GoalStatus::Achieved,
            },
        ],
        meal_plans: vec![MealPlan {
            id: MealPlanId::new("m1"),
            name: "Low-Carb Mediterranean Plan".into(),
            description: "Mediterranean-inspired meals with controlled carbohydrates".into(),
            schedule: MealSchedule::Weekly,
            meals: vec![
                Meal {
                    id: "meal1".into(),
                    name: "Greek Chicken Bowl".into(),
                    description: "Grilled chicken with quinoa, olives, feta, and vegetables".into(),
                    nutrition: NutritionFacts {
                        calories: 420,
                        protein: 38,
                        carbs: 28,
                        fat: 16,
                    },
                    image: Some(
                        "https://images.pexels.com/photos/1640777/pexels-photo-1640777.jpeg".into(),
                    ),
                },
                Meal {
                    id: "meal2".into(),
                    name: "Salmon with Roasted Vegetables".into(),
                    description: "Baked salmon with a variety of season vegetables".into(),
                    nutrition: NutritionFacts {
                        calories: 380,
                        protein: 32,
                        carbs: 18,
                        fat: 20,
                    },
                    image: Some(
                        "https://images.pexels.com/photos/725997/pexels-photo-725997.jpeg".into(),
                    ),
                },
            ],
        }],
        created_by: UserId::new("u1"),
    });

    store.insert_care_plan(CarePlan {
        id: CarePlanId::new("cp2"),
        patient_id: PatientId::new("p2"),
        title: "Heart Health Improvement".into(),
        description: "Dietary and lifestyle plan to improve cardiovascular health".into(),
        created_at: ts("2025-04-20T10:15:00Z")?,
        updated_at: ts("2025-06-10T11:45:00Z")?,
        start_date: None,
        end_date: None,
        status: PlanStatus::Active,
        goals: vec![
            Goal {
                id: "g4".into(),
                description: "Reduce blood pressure to normal range".into(),
                target_date: None,
                status: GoalStatus::InProgress,
            },
            Goal {
                id: "g5".into(),
                description: "Complete cardiac rehabilitation program".into(),
                target_date: None,
                status: GoalStatus::InProgress,
            },
        ],
        meal_plans: vec![MealPlan {
            id: MealPlanId::new("m2"),
            name: "Heart-Healthy DASH Diet".into(),
            description: "Low-sodium meals following DASH diet principles".into(),
            schedule: MealSchedule::Daily,
            meals: vec![Meal {
                id: "meal3".into(),
                name: "Vegetable Grain Bowl".into(),
                description: "Brown rice with roasted vegetables and lean protein".into(),
                nutrition: NutritionFacts {
                    calories: 350,
                    protein: 25,
                    carbs: 45,
                    fat: 10,
                },
                image: Some(
                    "https://images.pexels.com/photos/1095550/pexels-photo-1095550.jpeg".into(),
                ),
            }],
        }],
        created_by: UserId::new("u3"),
    });

    store.insert_care_plan(CarePlan {
        id: CarePlanId::new("cp3"),
        patient_id: PatientId::new("p3"),
        title: "Weight Management Program".into(),
        description: "Calorie-controlled meal plan with physical activity recommendations".into(),
        created_at: ts("2025-06-01T13:30:00Z")?,
        updated_at: ts("2025-06-15T16:20:00Z")?,
        start_date: None,
        end_date: None,
        status: PlanStatus::Active,
        goals: vec![
            Goal {
                id: "g6".into(),
                description: "Lose 30 pounds".into(),
                target_date: None,
                status: GoalStatus::Pending,
            },
            Goal {
                id: "g7".into(),
                description: "Exercise 150 minutes weekly".into(),
                target_date: None,
                status: GoalStatus::InProgress,
            },
        ],
        meal_plans: vec![MealPlan {
            id: MealPlanId::new("m3"),
            name: "Calorie-Controlled Plan".into(),
            description: "Balanced meals with portion control".into(),
            schedule: MealSchedule::Weekly,
            meals: vec![Meal {
                id: "meal4".into(),
                name: "Lean Protein Plate".into(),
                description: "Grilled chicken breast with steamed vegetables and quinoa".into(),
                nutrition: NutritionFacts {
                    calories: 410,
                    protein: 40,
                    carbs: 30,
                    fat: 12,
                },
                image: Some(
                    "https://images.pexels.com/photos/1833336/pexels-photo-1833336.jpeg".into(),
                ),
            }],
        }],
        created_by: UserId::new("u1"),
    });

    Ok(())
}

fn seed_messaging(store: &mut PortalStore) -> PortalResult<()> {
    let messages = vec![
        Message {
            id: MessageId::new("msg1"),
            sender: ParticipantId::new("u1"),
            recipient: ParticipantId::new("p1"),
            content: "How are you feeling after starting the new meal plan?".into(),
            timestamp: ts("2025-06-15T10:15:00Z")?,
            is_read: true,
        },
        Message {
            id: MessageId::new("msg2"),
            sender: ParticipantId::new("p1"),
            recipient: ParticipantId::new("u1"),
            content: "I'm doing well, but I have a question about the dinner portions.".into(),
            timestamp: ts("2025-06-15T10:30:00Z")?,
            is_read: true,
        },
        Message {
            id: MessageId::new("msg3"),
            sender: ParticipantId::new("u1"),
            recipient: ParticipantId::new("p1"),
            content: "What questions do you have? I'm happy to clarify.".into(),
            timestamp: ts("2025-06-15T10:32:00Z")?,
            is_read: false,
        },
        Message {
            id: MessageId::new("msg4"),
            sender: ParticipantId::new("u3"),
            recipient: ParticipantId::new("p2"),
            content: "Your latest readings look good. Keep up the great work!".into(),
            timestamp: ts("2025-06-16T09:45:00Z")?,
            is_read: true,
        },
        Message {
            id: MessageId::new("msg5"),
            sender: ParticipantId::new("u1"),
            recipient: ParticipantId::new("p3"),
            content: "We need to discuss your adherence to the meal plan. Can we schedule a call?"
                .into(),
            timestamp: ts("2025-06-14T19:30:00Z")?,
            is_read: false,
        },
    ];

    let conversations = vec![
        Conversation {
            id: ConversationId::new("conv1"),
            participants: [ParticipantId::new("u1"), ParticipantId::new("p1")],
            last_message: messages[2].clone(),
        },
        Conversation {
            id: ConversationId::new("conv2"),
            participants: [ParticipantId::new("u3"), ParticipantId::new("p2")],
            last_message: messages[3].clone(),
        },
        Conversation {
            id: ConversationId::new("conv3"),
            participants: [ParticipantId::new("u1"), ParticipantId::new("p3")],
            last_message: messages[4].clone(),
        },
    ];

    for message in messages {
        store.insert_message(message);
    }
    for conversation in conversations {
        store.insert_conversation(conversation);
    }

    Ok(())
}

fn seed_reports(store: &mut PortalStore) -> PortalResult<()> {
    store.insert_report(AnalyticsReport {
        id: "ar1".into(),
        title: "Monthly Adherence Report".into(),
        description: "Overview of patient adherence to meal plans and recommendations".into(),
        generated_at: ts("2025-06-01T00:00:00Z")?,
        data: ReportData::Adherence {
            average_adherence: 82,
            patient_count: 24,
            low_adherence_count: 5,
            improvement_rate: 8,
            monthly_trend: vec![78, 80, 81, 82, 83, 82],
        },
    });
    store.insert_report(AnalyticsReport {
        id: "ar2".into(),
        title: "Health Improvements Tracking Quarterly".into(),
        description: "Analysis of patient biometric changes over the last quarter".into(),
        generated_at: ts("2025-06-15T00:00:00Z")?,
        data: ReportData::Biometrics {
            weight_loss_average: 4.2,
            blood_pressure_improvement: 7.5,
            glucose_level_improvement: 12.3,
            cholesterol_improvement: 8.7,
        },
    });
    store.insert_report(AnalyticsReport {
        id: "ar3".into(),
        title: "Predictive Analysis Outcomes".into(),
        description: "Effectiveness of diabetes management plans across all patients".into(),
        generated_at: ts("2025-05-30T00:00:00Z")?,
        data: ReportData::Progress {
            hba1c_reduction: 0.8,
            diabetic_patients: 18,
            significant_improvement: 12,
            minor_improvement: 4,
            no_change: 2,
        },
    });

    Ok(())
}

// ============================================================================
// Generated trend series
// ============================================================================

/// Appends a generated reading history to every seeded patient, for every
/// biometric kind.
fn seed_biometric_histories(store: &mut PortalStore, rng: &mut impl Rng) {
    let kinds = [
        BiometricKind::Glucose,
        BiometricKind::Weight,
        BiometricKind::BloodPressure,
        BiometricKind::HeartRate,
    ];

    let mut generated: Vec<(PatientId, Vec<BiometricReading>)> = Vec::new();
    for patient in store.patients() {
        let mut readings = Vec::new();
        for kind in kinds {
            readings.extend(reading_history(patient, kind, HISTORY_DAYS, rng));
        }
        generated.push((patient.id.clone(), readings));
    }

    for (id, readings) in generated {
        store.extend_biometrics(&id, readings);
    }
}

/// Generates `days + 1` daily readings of one kind for a patient, oldest
/// first, with bounded random variation around a base value.
fn reading_history(
    patient: &Patient,
    kind: BiometricKind,
    days: i64,
    rng: &mut impl Rng,
) -> Vec<BiometricReading> {
    let now = Utc::now();
    let base_weight = if patient.gender == "Male" { 190.0 } else { 150.0 };

    let mut readings = Vec::new();
    for i in (0..=days).rev() {
        let timestamp = now - Duration::days(i);
        let (value, unit, is_abnormal) = match kind {
            BiometricKind::Glucose => {
                let value = (120.0f64 + rng.gen_range(-20.0..20.0)).round();
                (
                    BiometricValue::Single(value),
                    "mg/dL",
                    value > 140.0,
                )
            }
            BiometricKind::Weight => {
                // Slight downward trend over the series.
                let value = (base_weight - i as f64 * 0.2 + rng.gen_range(-1.0..1.0)).round();
                (BiometricValue::Single(value), "lbs", false)
            }
            BiometricKind::BloodPressure => {
                let systolic = (120.0f64 + rng.gen_range(-15.0..15.0)).round() as u16;
                let diastolic = (80.0f64 + rng.gen_range(-10.0..10.0)).round() as u16;
                (
                    BiometricValue::BloodPressure {
                        systolic,
                        diastolic,
                    },
                    "mmHg",
                    systolic > 140 || diastolic > 90,
                )
            }
            BiometricKind::HeartRate => {
                let value = (72.0f64 + rng.gen_range(-5.0..5.0)).round();
                (BiometricValue::Single(value), "bpm", value > 100.0)
            }
        };

        readings.push(BiometricReading {
            id: format!("hist-{}-{}-{}", patient.id, kind.as_str(), i),
            kind,
            value,
            unit: unit.into(),
            timestamp,
            is_abnormal,
        });
    }
    readings
}

/// Generates the population adherence trend: a slowly improving curve with
/// random variation, capped at 95%.
fn adherence_trend(days: i64, rng: &mut impl Rng) -> Vec<AdherencePoint> {
    let now = Utc::now();
    let mut trend: f64 = 75.0;

    let mut points = Vec::new();
    for i in (0..=days).rev() {
        trend = (trend + rng.gen_range(-0.1..0.3)).min(95.0);
        points.push(AdherencePoint {
            date: (now - Duration::days(i)).date_naive(),
            average: trend.round() as u8,
        });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_store_carries_the_full_dataset() {
        let store = demo_store().expect("seed data is valid");
        assert_eq!(store.users().len(), 3);
        assert_eq!(store.patients().len(), 4);
        assert_eq!(store.care_plans().len(), 3);
        assert_eq!(store.conversations().len(), 3);
        assert_eq!(store.reports().len(), 3);
        // a1/a2 on p1, a5 on p2, a3 on p3, a4 on p4.
        assert_eq!(store.alerts().len(), 5);
        assert_eq!(store.adherence_history().len() as i64, TREND_DAYS + 1);
    }

    #[test]
    fn seeded_unread_counts_are_derived_per_viewer() {
        let store = demo_store().expect("seed data is valid");
        let conv = store
            .conversation(&ConversationId::new("conv1"))
            .expect("conv1 exists");

        // msg3 is unread and addressed to the patient; nothing unread is
        // addressed to the clinician.
        assert_eq!(store.unread_count(conv, &ParticipantId::new("p1")), 1);
        assert_eq!(store.unread_count(conv, &ParticipantId::new("u1")), 0);
    }

    #[test]
    fn seeded_histories_cover_every_kind() {
        let store = demo_store().expect("seed data is valid");
        for kind in [
            BiometricKind::Glucose,
            BiometricKind::Weight,
            BiometricKind::BloodPressure,
            BiometricKind::HeartRate,
        ] {
            let history = store
                .biometric_history(&PatientId::new("p1"), kind)
                .expect("p1 exists");
            assert!(history.len() as i64 >= HISTORY_DAYS + 1);
            // Oldest first.
            for pair in history.windows(2) {
                assert!(pair[0].timestamp <= pair[1].timestamp);
            }
        }
    }

    #[test]
    fn seeded_average_adherence_matches_the_roster() {
        let store = demo_store().expect("seed data is valid");
        // (78 + 92 + 65 + 88) / 4 = 80.75 → 81
        assert_eq!(crate::aggregate::average_adherence(store.patients()), Some(81));
    }

    #[test]
    fn seeded_meal_plans_project_to_the_global_set() {
        let store = demo_store().expect("seed data is valid");
        let ids: Vec<&str> = store.all_meal_plans().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn demo_login_works_against_the_seeded_directory() {
        let store = demo_store().expect("seed data is valid");
        let user = crate::session::verify_credentials(
            store.users(),
            "sarah.johnson@carelink.health",
            "password",
        )
        .expect("demo credentials");
        assert_eq!(user.id.as_str(), "u1");
    }
}
