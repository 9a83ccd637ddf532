//! Care plans, goals and meal plans.
//!
//! A care plan exclusively owns its goals. Meal plans are different: the
//! same meal plan can be selected into several care plans, so a plan's
//! `meal_plans` list holds references into the global meal-plan set rather
//! than exclusively-owned children (the store derives that global set).
//!
//! Plan status is fixed at creation; there is deliberately no transition
//! function.

use crate::ids::{CarePlanId, MealPlanId, PatientId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Administrative status of a care plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Draft,
    Active,
    Completed,
}

impl PlanStatus {
    /// Parses a status from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// Progress of a single goal inside a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Pending,
    InProgress,
    Achieved,
}

/// A measurable objective owned by exactly one care plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    pub status: GoalStatus,
}

/// Macro-nutrient facts for one meal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

/// A single prepared meal inside a meal plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub description: String,
    pub nutrition: NutritionFacts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Delivery cadence of a meal plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSchedule {
    Daily,
    Weekly,
}

/// A named set of meals shared by reference across care plans.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: MealPlanId,
    pub name: String,
    pub description: String,
    pub schedule: MealSchedule,
    pub meals: Vec<Meal>,
}

/// A goal-and-meal-plan bundle assigned to one patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarePlan {
    pub id: CarePlanId,
    /// The patient this plan is for.
    pub patient_id: PatientId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub status: PlanStatus,
    /// Goals owned exclusively by this plan.
    pub goals: Vec<Goal>,
    /// The meal plans selected for this plan, from the shared set.
    pub meal_plans: Vec<MealPlan>,
    /// The user who created the plan.
    pub created_by: UserId,
}

impl CarePlan {
    /// Number of goals already achieved.
    pub fn achieved_goals(&self) -> usize {
        self.goals
            .iter()
            .filter(|g| g.status == GoalStatus::Achieved)
            .count()
    }
}
