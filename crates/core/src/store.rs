//! The in-memory domain store.
//!
//! `PortalStore` owns every entity collection the portal works with and is
//! the only place they are mutated. Views never touch collections directly:
//! they go through the read operations here and the pure functions in
//! [`crate::aggregate`] and [`crate::query`].
//!
//! Responsibilities:
//! - Own patients, users, care plans, messages, conversations and reports
//! - Resolve lookups by id, with typed not-found errors
//! - Derive the projections the original data kept denormalized
//!   (global meal-plan set, flattened alerts, per-conversation unread counts)
//! - Apply the two in-session mutations: enrolling a patient and appending
//!   a message
//!
//! All operations are synchronous; collections are tiny (single digits to
//! low hundreds of records) and every computation re-scans them.

use crate::care_plan::{CarePlan, MealPlan};
use crate::error::{PortalError, PortalResult};
use crate::ids::{CarePlanId, ConversationId, MessageId, ParticipantId, PatientId, UserId};
use crate::messaging::{Conversation, Message, User};
use crate::patient::{Alert, BiometricKind, BiometricReading, NewPatient, Patient};
use crate::reports::{AdherencePoint, AnalyticsReport};
use chrono::Utc;
use portal_types::{AdherenceRate, NonEmptyText};

/// The portal's in-memory database.
#[derive(Clone, Debug, Default)]
pub struct PortalStore {
    users: Vec<User>,
    patients: Vec<Patient>,
    care_plans: Vec<CarePlan>,
    messages: Vec<Message>,
    conversations: Vec<Conversation>,
    reports: Vec<AnalyticsReport>,
    adherence_history: Vec<AdherencePoint>,
}

impl PortalStore {
    /// Creates an empty store. Use [`crate::seed::demo_store`] for the
    /// seeded demo dataset.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Ingest (seeding only, not part of the view-facing surface)
    // ========================================================================

    pub fn insert_user(&mut self, user: User) {
        self.users.push(user);
    }

    pub fn insert_patient(&mut self, patient: Patient) {
        self.patients.push(patient);
    }

    pub fn insert_care_plan(&mut self, plan: CarePlan) {
        self.care_plans.push(plan);
    }

    /// Appends readings to a patient's owned series. Unknown patients are
    /// skipped with a warning rather than failing the whole seed.
    pub fn extend_biometrics(&mut self, patient: &PatientId, readings: Vec<BiometricReading>) {
        match self.patients.iter_mut().find(|p| &p.id == patient) {
            Some(found) => found.biometrics.extend(readings),
            None => tracing::warn!("dropping readings for unknown patient {patient}"),
        }
    }

    /// Inserts a raw message without touching any conversation. In-session
    /// sends go through [`PortalStore::append_message`] instead.
    pub fn insert_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn insert_conversation(&mut self, conversation: Conversation) {
        self.conversations.push(conversation);
    }

    pub fn insert_report(&mut self, report: AnalyticsReport) {
        self.reports.push(report);
    }

    pub fn set_adherence_history(&mut self, points: Vec<AdherencePoint>) {
        self.adherence_history = points;
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    /// Looks up a user by exact email match.
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// Resolves a patient by id.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::PatientNotFound`] when the id is absent.
    pub fn patient(&self, id: &PatientId) -> PortalResult<&Patient> {
        self.patients
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| PortalError::PatientNotFound(id.clone()))
    }

    pub fn care_plans(&self) -> &[CarePlan] {
        &self.care_plans
    }

    /// Resolves a care plan by id.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::CarePlanNotFound`] when the id is absent.
    pub fn care_plan(&self, id: &CarePlanId) -> PortalResult<&CarePlan> {
        self.care_plans
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| PortalError::CarePlanNotFound(id.clone()))
    }

    /// All care plans assigned to one patient, in insertion order.
    pub fn care_plans_for(&self, patient: &PatientId) -> Vec<&CarePlan> {
        self.care_plans
            .iter()
            .filter(|p| &p.patient_id == patient)
            .collect()
    }

    /// The global meal-plan set: every meal plan referenced by any care
    /// plan, deduplicated by id in first-encounter order. Meal plans belong
    /// to this set, not to a single plan.
    pub fn all_meal_plans(&self) -> Vec<&MealPlan> {
        let mut seen: Vec<&MealPlan> = Vec::new();
        for plan in &self.care_plans {
            for meal_plan in &plan.meal_plans {
                if !seen.iter().any(|m| m.id == meal_plan.id) {
                    seen.push(meal_plan);
                }
            }
        }
        seen
    }

    /// Flattened view over every patient-owned alert, in patient order.
    pub fn alerts(&self) -> Vec<&Alert> {
        self.patients.iter().flat_map(|p| p.alerts.iter()).collect()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Resolves a conversation by id.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::ConversationNotFound`] when the id is absent.
    pub fn conversation(&self, id: &ConversationId) -> PortalResult<&Conversation> {
        self.conversations
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| PortalError::ConversationNotFound(id.clone()))
    }

    /// Messages exchanged inside a conversation, newest first.
    pub fn messages_in(&self, conversation: &Conversation) -> Vec<&Message> {
        let mut messages: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| conversation.involves(&m.sender) && conversation.involves(&m.recipient))
            .collect();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        messages
    }

    /// Unread messages addressed to `viewer` inside a conversation.
    ///
    /// Derived from message read flags on every call rather than kept as a
    /// counter, so it cannot drift out of sync with the message list.
    pub fn unread_count(&self, conversation: &Conversation, viewer: &ParticipantId) -> usize {
        self.messages
            .iter()
            .filter(|m| {
                conversation.involves(&m.sender)
                    && conversation.involves(&m.recipient)
                    && &m.recipient == viewer
                    && !m.is_read
            })
            .count()
    }

    /// Display name of a participant, whoever they are: patients are
    /// checked first, then users.
    pub fn display_name(&self, id: &ParticipantId) -> Option<&str> {
        if let Some(patient) = self.patients.iter().find(|p| id.is_patient(&p.id)) {
            return Some(&patient.name);
        }
        self.users
            .iter()
            .find(|u| id.is_user(&u.id))
            .map(|u| u.name.as_str())
    }

    pub fn reports(&self) -> &[AnalyticsReport] {
        &self.reports
    }

    /// The population adherence trend, oldest first.
    pub fn adherence_history(&self) -> &[AdherencePoint] {
        &self.adherence_history
    }

    /// A patient's readings of one kind, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::PatientNotFound`] when the patient is absent.
    pub fn biometric_history(
        &self,
        patient: &PatientId,
        kind: BiometricKind,
    ) -> PortalResult<Vec<&BiometricReading>> {
        Ok(self.patient(patient)?.readings_of(kind))
    }

    // ========================================================================
    // Appends
    // ========================================================================

    /// Enrolls a new patient.
    ///
    /// The store assigns a fresh id, defaults the adherence rate to 100%,
    /// stamps `last_activity` with the current time and starts the record
    /// with no alerts, readings or care team. Patients are never deleted
    /// in-session.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::InvalidInput`] when the name is blank.
    pub fn add_patient(&mut self, input: NewPatient) -> PortalResult<&Patient> {
        if input.name.trim().is_empty() {
            return Err(PortalError::InvalidInput("patient name is required".into()));
        }

        let patient = Patient {
            id: PatientId::generate(),
            name: input.name,
            age: input.age,
            gender: input.gender,
            email: input.email,
            phone: input.phone,
            conditions: input.conditions,
            avatar: input.avatar,
            adherence_rate: AdherenceRate::FULL,
            last_activity: Utc::now(),
            alerts: Vec::new(),
            biometrics: Vec::new(),
            care_team: Vec::new(),
        };
        tracing::info!(patient = %patient.id, "enrolled new patient");
        let id = patient.id.clone();
        self.patients.push(patient);
        self.patient(&id)
    }

    /// Appends a message to a conversation and refreshes its denormalized
    /// last-message copy. The recipient is always the other participant;
    /// the new message starts unread.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::ConversationNotFound`] for an unknown thread
    /// and [`PortalError::NotAParticipant`] when the sender is not in it.
    pub fn append_message(
        &mut self,
        conversation_id: &ConversationId,
        sender: ParticipantId,
        content: NonEmptyText,
    ) -> PortalResult<&Message> {
        let position = self
            .conversations
            .iter()
            .position(|c| &c.id == conversation_id)
            .ok_or_else(|| PortalError::ConversationNotFound(conversation_id.clone()))?;

        let recipient = self.conversations[position]
            .other_participant(&sender)
            .ok_or_else(|| PortalError::NotAParticipant(sender.clone()))?
            .clone();

        let message = Message {
            id: MessageId::generate(),
            sender,
            recipient,
            content: content.into_string(),
            timestamp: Utc::now(),
            is_read: false,
        };

        self.conversations[position].last_message = message.clone();
        let id = message.id.clone();
        self.messages.push(message);

        self.messages
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| PortalError::InvalidInput("message vanished after append".into()))
    }
}
