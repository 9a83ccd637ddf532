//! Summary statistics over the domain store.
//!
//! Pure functions only: every aggregate re-scans the collection it is given
//! and never mutates it. Empty collections degrade to defined defaults
//! (`None` or 0), never to a division by zero.

use crate::care_plan::CarePlan;
use crate::constants::{HIGH_ADHERENCE_MIN, MEDIUM_ADHERENCE_MIN};
use crate::patient::{Alert, Patient};
use crate::reports::AdherencePoint;
use serde::Serialize;

/// Adherence band a single rate falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdherenceBand {
    /// Rate ≥ 85.
    High,
    /// 70 ≤ rate < 85.
    Medium,
    /// Rate < 70.
    Low,
}

/// The band for a given integer adherence percentage.
pub fn band_of(rate: u8) -> AdherenceBand {
    if rate >= HIGH_ADHERENCE_MIN {
        AdherenceBand::High
    } else if rate >= MEDIUM_ADHERENCE_MIN {
        AdherenceBand::Medium
    } else {
        AdherenceBand::Low
    }
}

/// Patient counts per adherence band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AdherenceBuckets {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl AdherenceBuckets {
    /// Total patients across all three bands.
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Number of patients sharing one condition label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConditionCount {
    pub condition: String,
    pub patients: usize,
}

/// The dashboard's patients-overview block.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PatientOverview {
    pub total: usize,
    pub buckets: AdherenceBuckets,
    /// `None` when there are no patients: "no data", as opposed to a true
    /// 0% average.
    pub average_adherence: Option<u8>,
    /// Patients with at least one alert ("requiring attention").
    pub with_alerts: usize,
    /// Alerts not yet read, across the whole roster.
    pub unread_alerts: usize,
}

/// Arithmetic mean of adherence rates, rounded to the nearest integer.
///
/// Returns `None` for an empty list so callers can tell "no data" apart
/// from a genuine 0% average.
pub fn average_adherence(patients: &[Patient]) -> Option<u8> {
    if patients.is_empty() {
        return None;
    }
    let sum: u32 = patients
        .iter()
        .map(|p| u32::from(p.adherence_rate.percent()))
        .sum();
    let mean = f64::from(sum) / patients.len() as f64;
    Some(mean.round() as u8)
}

/// Partitions patients into high/medium/low adherence bands.
///
/// Every patient lands in exactly one band; the boundary values are part of
/// the contract (85 is high, 70 is medium).
pub fn adherence_buckets(patients: &[Patient]) -> AdherenceBuckets {
    let mut buckets = AdherenceBuckets::default();
    for patient in patients {
        match band_of(patient.adherence_rate.percent()) {
            AdherenceBand::High => buckets.high += 1,
            AdherenceBand::Medium => buckets.medium += 1,
            AdherenceBand::Low => buckets.low += 1,
        }
    }
    buckets
}

/// Counts distinct patients per condition label.
///
/// Entries come back sorted by descending count; ties keep the order in
/// which a condition was first encountered while walking the patient list.
pub fn condition_histogram(patients: &[Patient]) -> Vec<ConditionCount> {
    let mut counts: Vec<ConditionCount> = Vec::new();
    for patient in patients {
        // A patient with a duplicated label still counts once per condition.
        let mut seen_for_patient: Vec<&str> = Vec::new();
        for condition in &patient.conditions {
            if seen_for_patient.contains(&condition.as_str()) {
                continue;
            }
            seen_for_patient.push(condition);
            match counts.iter_mut().find(|c| &c.condition == condition) {
                Some(entry) => entry.patients += 1,
                None => counts.push(ConditionCount {
                    condition: condition.clone(),
                    patients: 1,
                }),
            }
        }
    }
    counts.sort_by(|a, b| b.patients.cmp(&a.patients));
    counts
}

/// Number of alerts not yet read.
pub fn unread_alert_count<'a, I>(alerts: I) -> usize
where
    I: IntoIterator<Item = &'a Alert>,
{
    alerts.into_iter().filter(|a| !a.is_read).count()
}

/// Number of patients carrying at least one alert.
pub fn patients_with_alerts(patients: &[Patient]) -> usize {
    patients.iter().filter(|p| !p.alerts.is_empty()).count()
}

/// Share of a plan's goals that are achieved, as a rounded integer percent.
///
/// A plan with zero goals is 0% complete, a defined value rather than an error.
pub fn goal_completion_rate(plan: &CarePlan) -> u8 {
    if plan.goals.is_empty() {
        return 0;
    }
    let achieved = plan.achieved_goals() as f64;
    let rate = achieved / plan.goals.len() as f64 * 100.0;
    rate.round() as u8
}

/// The dashboard patients-overview block in one pass.
pub fn patient_overview(patients: &[Patient]) -> PatientOverview {
    PatientOverview {
        total: patients.len(),
        buckets: adherence_buckets(patients),
        average_adherence: average_adherence(patients),
        with_alerts: patients_with_alerts(patients),
        unread_alerts: unread_alert_count(patients.iter().flat_map(|p| p.alerts.iter())),
    }
}

/// Day-over-day movement of the adherence trend: latest point minus the one
/// before it. Zero when fewer than two points exist.
pub fn adherence_change(history: &[AdherencePoint]) -> i32 {
    match history {
        [.., previous, current] => i32::from(current.average) - i32::from(previous.average),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::care_plan::{Goal, GoalStatus, PlanStatus};
    use crate::ids::{CarePlanId, PatientId, UserId};
    use chrono::NaiveDate;
    use portal_types::AdherenceRate;

    fn patient(id: &str, rate: u8, conditions: &[&str]) -> Patient {
        Patient {
            id: PatientId::new(id),
            name: format!("Patient {id}"),
            age: 50,
            gender: "Female".into(),
            email: String::new(),
            phone: String::new(),
            conditions: conditions.iter().map(|c| c.to_string()).collect(),
            avatar: None,
            adherence_rate: AdherenceRate::new(u16::from(rate)).expect("valid rate"),
            last_activity: chrono::Utc::now(),
            alerts: vec![],
            biometrics: vec![],
            care_team: vec![],
        }
    }

    fn plan_with_goals(statuses: &[GoalStatus]) -> CarePlan {
        CarePlan {
            id: CarePlanId::new("cp1"),
            patient_id: PatientId::new("p1"),
            title: "Plan".into(),
            description: String::new(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            start_date: None,
            end_date: None,
            status: PlanStatus::Active,
            goals: statuses
                .iter()
                .enumerate()
                .map(|(i, status)| Goal {
                    id: format!("g{i}"),
                    description: format!("goal {i}"),
                    target_date: None,
                    status: *status,
                })
                .collect(),
            meal_plans: vec![],
            created_by: UserId::new("u1"),
        }
    }

    fn point(date: &str, average: u8) -> AdherencePoint {
        AdherencePoint {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date"),
            average,
        }
    }

    #[test]
    fn average_is_the_exact_rounded_mean() {
        let patients = vec![
            patient("p1", 78, &[]),
            patient("p2", 92, &[]),
            patient("p3", 65, &[]),
            patient("p4", 88, &[]),
        ];
        // mean 80.75 rounds to 81
        assert_eq!(average_adherence(&patients), Some(81));
    }

    #[test]
    fn average_stays_within_min_and_max() {
        let patients = vec![
            patient("p1", 60, &[]),
            patient("p2", 70, &[]),
            patient("p3", 95, &[]),
        ];
        let mean = average_adherence(&patients).expect("non-empty list");
        assert!(mean >= 60 && mean <= 95);
    }

    #[test]
    fn average_of_no_patients_is_no_data() {
        assert_eq!(average_adherence(&[]), None);
    }

    #[test]
    fn buckets_partition_every_patient_exactly_once() {
        let patients = vec![
            patient("p1", 100, &[]),
            patient("p2", 85, &[]),
            patient("p3", 84, &[]),
            patient("p4", 70, &[]),
            patient("p5", 69, &[]),
            patient("p6", 0, &[]),
        ];
        let buckets = adherence_buckets(&patients);
        assert_eq!(buckets.total(), patients.len());
        assert_eq!(buckets.high, 2);
        assert_eq!(buckets.medium, 2);
        assert_eq!(buckets.low, 2);
    }

    #[test]
    fn bucket_boundaries_are_exact() {
        // Exactly 85 is high, exactly 70 is medium; neither falls lower.
        assert_eq!(band_of(85), AdherenceBand::High);
        assert_eq!(band_of(84), AdherenceBand::Medium);
        assert_eq!(band_of(70), AdherenceBand::Medium);
        assert_eq!(band_of(69), AdherenceBand::Low);
    }

    #[test]
    fn histogram_counts_distinct_patients_with_stable_ties() {
        let patients = vec![
            patient("p1", 80, &["A", "B"]),
            patient("p2", 80, &["A"]),
            patient("p3", 80, &["B", "C"]),
        ];
        let histogram = condition_histogram(&patients);
        let entries: Vec<(&str, usize)> = histogram
            .iter()
            .map(|c| (c.condition.as_str(), c.patients))
            .collect();
        // A and B tie at 2 and keep encounter order; C trails with 1.
        assert_eq!(entries, vec![("A", 2), ("B", 2), ("C", 1)]);
    }

    #[test]
    fn histogram_ignores_duplicate_labels_within_one_patient() {
        let patients = vec![patient("p1", 80, &["A", "A"])];
        let histogram = condition_histogram(&patients);
        assert_eq!(histogram.len(), 1);
        assert_eq!(histogram[0].patients, 1);
    }

    #[test]
    fn goal_completion_rounds_and_defines_the_empty_case() {
        let one_of_three = plan_with_goals(&[
            GoalStatus::Achieved,
            GoalStatus::InProgress,
            GoalStatus::Pending,
        ]);
        assert_eq!(goal_completion_rate(&one_of_three), 33);

        let none = plan_with_goals(&[]);
        assert_eq!(goal_completion_rate(&none), 0);

        let all = plan_with_goals(&[GoalStatus::Achieved, GoalStatus::Achieved]);
        assert_eq!(goal_completion_rate(&all), 100);
    }

    #[test]
    fn unread_alert_count_only_counts_unread() {
        let mut p = patient("p1", 80, &[]);
        for (i, read) in [false, true, false].iter().enumerate() {
            p.alerts.push(Alert {
                id: format!("a{i}"),
                patient_id: p.id.clone(),
                kind: crate::patient::AlertKind::Message,
                severity: crate::patient::Severity::Low,
                message: String::new(),
                timestamp: chrono::Utc::now(),
                is_read: *read,
            });
        }
        assert_eq!(unread_alert_count(p.alerts.iter()), 2);
    }

    #[test]
    fn overview_combines_the_dashboard_stats() {
        let mut flagged = patient("p1", 92, &[]);
        flagged.alerts.push(Alert {
            id: "a1".into(),
            patient_id: flagged.id.clone(),
            kind: crate::patient::AlertKind::LowAdherence,
            severity: crate::patient::Severity::High,
            message: String::new(),
            timestamp: chrono::Utc::now(),
            is_read: false,
        });
        let patients = vec![flagged, patient("p2", 65, &[])];

        let overview = patient_overview(&patients);
        assert_eq!(overview.total, 2);
        assert_eq!(overview.average_adherence, Some(79));
        assert_eq!(overview.buckets.high, 1);
        assert_eq!(overview.buckets.low, 1);
        assert_eq!(overview.with_alerts, 1);
        assert_eq!(overview.unread_alerts, 1);
    }

    #[test]
    fn adherence_change_needs_two_points() {
        assert_eq!(adherence_change(&[]), 0);
        assert_eq!(adherence_change(&[point("2025-06-15", 80)]), 0);
        assert_eq!(
            adherence_change(&[point("2025-06-14", 80), point("2025-06-15", 83)]),
            3
        );
        assert_eq!(
            adherence_change(&[
                point("2025-06-13", 90),
                point("2025-06-14", 85),
                point("2025-06-15", 82)
            ]),
            -3
        );
    }
}
