//! Filtered, ordered projections of store collections.
//!
//! These functions compute the visible subset of a list for the current UI
//! filter state. They are pure: inputs are borrowed, outputs are vectors of
//! references, and the underlying collections are never mutated.
//!
//! Ordering rules are deliberately asymmetric, matching the portal's
//! behaviour: the patient list sort is user-controlled (field and direction
//! are independent pieces of state), while care plans and conversations have
//! a fixed ordering the user cannot change.

use crate::care_plan::{CarePlan, PlanStatus};
use crate::ids::{ParticipantId, PatientId};
use crate::messaging::Conversation;
use crate::patient::{Alert, Patient};

/// Direction of a user-toggleable sort.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parses a direction from its query-string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }

    /// Returns the query-string representation of this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Field the patient list can be sorted by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PatientSortField {
    #[default]
    Name,
    Adherence,
}

impl PatientSortField {
    /// Parses a sort field from its query-string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "adherence" => Some(Self::Adherence),
            _ => None,
        }
    }
}

/// Current sort state of the patient list.
///
/// Field and direction are independent: toggling the active field flips the
/// direction, while switching to a new field resets to ascending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatientSort {
    pub field: PatientSortField,
    pub direction: SortDirection,
}

impl PatientSort {
    /// Applies a header click for `field` to this sort state.
    pub fn toggle(&mut self, field: PatientSortField) {
        if self.field == field {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Filter state of the patient list. Both predicates must hold.
#[derive(Clone, Debug, Default)]
pub struct PatientFilter {
    /// Case-insensitive substring match on the patient name.
    pub search: String,
    /// When set, the patient must carry this exact condition label.
    pub condition: Option<String>,
}

/// Filter state of the care-plan list. All three predicates combine with AND.
#[derive(Clone, Debug, Default)]
pub struct CarePlanFilter {
    /// Case-insensitive substring match on title OR description.
    pub search: String,
    /// When set, the plan status must match exactly.
    pub status: Option<PlanStatus>,
    /// When set, the plan must belong to this patient.
    pub patient: Option<PatientId>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// The visible, ordered patient list for the given filter and sort state.
pub fn filter_patients<'a>(
    patients: &'a [Patient],
    filter: &PatientFilter,
    sort: PatientSort,
) -> Vec<&'a Patient> {
    let mut visible: Vec<&Patient> = patients
        .iter()
        .filter(|p| contains_ignore_case(&p.name, &filter.search))
        .filter(|p| match &filter.condition {
            Some(condition) => p.has_condition(condition),
            None => true,
        })
        .collect();

    visible.sort_by(|a, b| {
        let ordering = match sort.field {
            // Case-folded comparison stands in for the browser's
            // locale-aware collation; collections are tiny.
            PatientSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            PatientSortField::Adherence => a
                .adherence_rate
                .percent()
                .cmp(&b.adherence_rate.percent()),
        };
        sort.direction.apply(ordering)
    });
    visible
}

/// The distinct condition labels across all patients, in first-encounter
/// order. Drives the condition filter dropdown.
pub fn unique_conditions(patients: &[Patient]) -> Vec<String> {
    let mut conditions: Vec<String> = Vec::new();
    for patient in patients {
        for condition in &patient.conditions {
            if !conditions.contains(condition) {
                conditions.push(condition.clone());
            }
        }
    }
    conditions
}

/// The visible care-plan list: filtered, then ordered by `updated_at`
/// descending. The ordering is fixed: unlike the patient list, there is no
/// user-selectable sort here.
pub fn filter_care_plans<'a>(plans: &'a [CarePlan], filter: &CarePlanFilter) -> Vec<&'a CarePlan> {
    let mut visible: Vec<&CarePlan> = plans
        .iter()
        .filter(|p| {
            contains_ignore_case(&p.title, &filter.search)
                || contains_ignore_case(&p.description, &filter.search)
        })
        .filter(|p| match filter.status {
            Some(status) => p.status == status,
            None => true,
        })
        .filter(|p| match &filter.patient {
            Some(patient) => &p.patient_id == patient,
            None => true,
        })
        .collect();

    visible.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    visible
}

/// The visible conversation list for `viewer`.
///
/// The search text matches the *other* participant's display name only
/// (never the viewer's own), resolved through `display_name`. Ordering is
/// fixed by the denormalized last-message timestamp, newest first.
pub fn filter_conversations<'a, F>(
    conversations: &'a [Conversation],
    viewer: &ParticipantId,
    search: &str,
    display_name: F,
) -> Vec<&'a Conversation>
where
    F: Fn(&ParticipantId) -> Option<String>,
{
    let mut visible: Vec<&Conversation> = conversations
        .iter()
        .filter(|c| c.involves(viewer))
        .filter(|c| {
            if search.is_empty() {
                return true;
            }
            let Some(other) = c.other_participant(viewer) else {
                return false;
            };
            display_name(other)
                .map(|name| contains_ignore_case(&name, search))
                .unwrap_or(false)
        })
        .collect();

    visible.sort_by(|a, b| b.last_message.timestamp.cmp(&a.last_message.timestamp));
    visible
}

/// Alerts in widget order: a two-key stable sort with unread strictly
/// before read, then timestamp descending within each group.
pub fn order_alerts<'a>(alerts: &[&'a Alert]) -> Vec<&'a Alert> {
    let mut ordered: Vec<&Alert> = alerts.to_vec();
    ordered.sort_by(|a, b| {
        a.is_read
            .cmp(&b.is_read)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
    ordered
}
