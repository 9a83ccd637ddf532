//! # API REST
//!
//! REST API implementation for the Carelink portal.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Session gating: protected routes require an authenticated session
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, redirects)
//!
//! The routing policy mirrors the portal: `/` redirects to the dashboard,
//! unknown paths redirect to `/`, and unauthenticated access to a protected
//! route is refused with a pointer to the login endpoint. The session's
//! `is_authenticated` flag is the only input the gate consumes.
//!
//! Uses `api-shared` for wire DTOs and `carelink-core` for all domain logic.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{
    extract::{Path as AxumPath, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Json, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use api_shared::dto::{
    AlertRes, AnalyticsRes, BiometricListRes, BiometricReadingRes, CarePlanListRes, CarePlanRes,
    ConditionCountRes, ConversationListRes, ConversationRes, DashboardRes, ErrorRes, LoginReq,
    MealPlanListRes, MealPlanRes, MessageListRes, MessageRes, NewPatientReq, OverviewRes,
    PatientDetailRes, PatientListRes, PatientSummaryRes, ReportRes, SendMessageReq, SessionRes,
    TrendPointRes, UserRes,
};
use api_shared::{HealthRes, HealthService};
use carelink_core::aggregate::{adherence_change, patient_overview};
use carelink_core::care_plan::PlanStatus;
use carelink_core::patient::BiometricKind;
use carelink_core::constants::DASHBOARD_RECENT_LIMIT;
use carelink_core::messaging::User;
use carelink_core::query::{
    filter_care_plans, filter_conversations, filter_patients, order_alerts, unique_conditions,
    CarePlanFilter, PatientFilter, PatientSort, PatientSortField, SortDirection,
};
use carelink_core::seed;
use carelink_core::session::{self, SessionAction, SessionFile, SessionState};
use carelink_core::{
    CarePlanId, ConversationId, CoreConfig, NonEmptyText, ParticipantId, PatientId, PortalError,
    PortalResult, PortalStore,
};

/// Simulated transport latency applied to login attempts, matching the
/// original portal's artificial delay.
pub const LOGIN_DELAY: Duration = Duration::from_millis(1000);

/// Application state shared across REST API handlers.
///
/// The store and session sit behind locks because axum handlers run on a
/// multi-threaded runtime; no lock is held across an await point.
#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<PortalStore>>,
    session: Arc<RwLock<SessionState>>,
    session_file: Arc<SessionFile>,
    login_delay: Duration,
}

impl AppState {
    /// Creates state from a prepared store and session marker handle.
    pub fn new(store: PortalStore, session: SessionState, session_file: SessionFile) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            session: Arc::new(RwLock::new(session)),
            session_file: Arc::new(session_file),
            login_delay: LOGIN_DELAY,
        }
    }

    /// Overrides the simulated login latency (used by tests).
    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }
}

/// Seeds the demo store and restores any persisted session marker.
///
/// # Errors
///
/// Returns a [`PortalError`] when the seed dataset fails to build.
pub fn bootstrap(cfg: &CoreConfig) -> PortalResult<AppState> {
    let store = seed::demo_store()?;
    let session_file = SessionFile::new(cfg.session_file());

    let mut state = SessionState::initial();
    if let Some(user) = session_file.load() {
        tracing::info!(user = %user.id, "restored session from persisted marker");
        state = session::reduce(&state, SessionAction::LoginSuccess(user));
    }

    Ok(AppState::new(store, state, session_file))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        current_session,
        login,
        logout,
        dashboard,
        list_patients,
        create_patient,
        patient_detail,
        patient_biometrics,
        list_care_plans,
        care_plan_detail,
        list_meal_plans,
        list_conversations,
        conversation_messages,
        send_message,
        analytics,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        LoginReq,
        SessionRes,
        UserRes,
        DashboardRes,
        OverviewRes,
        AlertRes,
        PatientListRes,
        PatientSummaryRes,
        PatientDetailRes,
        NewPatientReq,
        BiometricListRes,
        BiometricReadingRes,
        CarePlanListRes,
        CarePlanRes,
        MealPlanListRes,
        MealPlanRes,
        ConversationListRes,
        ConversationRes,
        MessageListRes,
        MessageRes,
        SendMessageReq,
        AnalyticsRes,
        ReportRes,
        TrendPointRes,
        ConditionCountRes,
    ))
)]
struct ApiDoc;

/// Builds the portal router over the given state.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/:id", get(patient_detail))
        .route("/patients/:id/biometrics", get(patient_biometrics))
        .route("/care-plans", get(list_care_plans))
        .route("/care-plans/:id", get(care_plan_detail))
        .route("/meal-plans", get(list_meal_plans))
        .route("/conversations", get(list_conversations))
        .route(
            "/conversations/:id/messages",
            get(conversation_messages).post(send_message),
        )
        .route("/analytics", get(analytics))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/", get(index_redirect))
        .route("/health", get(health))
        .route(
            "/session",
            get(current_session).post(login).delete(logout),
        )
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(unknown_redirect)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Error plumbing
// ============================================================================

type ApiError = (StatusCode, Json<ErrorRes>);

fn lock_poisoned() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorRes::new("internal state lock poisoned")),
    )
}

fn map_portal_error(e: PortalError) -> ApiError {
    let status = match &e {
        PortalError::PatientNotFound(_)
        | PortalError::CarePlanNotFound(_)
        | PortalError::ConversationNotFound(_) => StatusCode::NOT_FOUND,
        PortalError::NotAParticipant(_) => StatusCode::FORBIDDEN,
        PortalError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        PortalError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("request failed: {e}");
    }
    (status, Json(ErrorRes::new(e.to_string())))
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorRes::new(message)))
}

// ============================================================================
// Session helpers
// ============================================================================

/// Applies an action to the shared session state and returns the new
/// snapshot.
fn dispatch(state: &AppState, action: SessionAction) -> Result<SessionState, ApiError> {
    let mut guard = state.session.write().map_err(|_| lock_poisoned())?;
    *guard = session::reduce(&guard, action);
    Ok(guard.clone())
}

/// The signed-in user, required by handlers that act on their behalf.
fn current_user(state: &AppState) -> Result<User, ApiError> {
    let guard = state.session.read().map_err(|_| lock_poisoned())?;
    guard.user.clone().ok_or((
        StatusCode::UNAUTHORIZED,
        Json(ErrorRes::new("Not signed in")),
    ))
}

/// Gate for protected routes: the session's `is_authenticated` flag is the
/// sole input. The refusal carries a pointer to the login endpoint, the
/// API analog of redirecting to the login view.
async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authenticated = state
        .session
        .read()
        .map(|s| s.is_authenticated)
        .unwrap_or(false);
    if !authenticated {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorRes::new("Sign in at POST /session to continue")),
        ));
    }
    Ok(next.run(request).await)
}

async fn index_redirect() -> Redirect {
    Redirect::temporary("/dashboard")
}

async fn unknown_redirect() -> Redirect {
    Redirect::temporary("/")
}

// ============================================================================
// Handlers: health and session
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API.
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current session snapshot", body = SessionRes)
    )
)]
/// Returns the current session snapshot, authenticated or not.
async fn current_session(State(state): State<AppState>) -> Result<Json<SessionRes>, ApiError> {
    let guard = state.session.read().map_err(|_| lock_poisoned())?;
    Ok(Json(SessionRes::from(&*guard)))
}

#[utoipa::path(
    post,
    path = "/session",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Authenticated session", body = SessionRes),
        (status = 401, description = "Invalid credentials", body = ErrorRes)
    )
)]
/// Attempts a login with the submitted credentials.
///
/// The check runs after a simulated transport delay; a client that
/// disconnects meanwhile drops this future and cancels the pending
/// resolution. On success the user is persisted as the session marker so a
/// restart restores the session without re-authenticating.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> Result<Json<SessionRes>, ApiError> {
    dispatch(&state, SessionAction::LoginStart)?;

    tokio::time::sleep(state.login_delay).await;

    let verified = {
        let store = state.store.read().map_err(|_| lock_poisoned())?;
        session::verify_credentials(store.users(), &req.email, &req.password).map(User::clone)
    };

    match verified {
        Ok(user) => {
            if let Err(e) = state.session_file.save(&user) {
                // The session itself still works; only restart restore is lost.
                tracing::warn!("failed to persist session marker: {e}");
            }
            let snapshot = dispatch(&state, SessionAction::LoginSuccess(user))?;
            Ok(Json(SessionRes::from(&snapshot)))
        }
        Err(e) => {
            let message = e.to_string();
            dispatch(&state, SessionAction::LoginFailure(message.clone()))?;
            Err((StatusCode::UNAUTHORIZED, Json(ErrorRes::new(message))))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/session",
    responses(
        (status = 200, description = "Session reset to the initial state", body = SessionRes)
    )
)]
/// Logs out unconditionally, discarding any error and deleting the
/// persisted marker.
async fn logout(State(state): State<AppState>) -> Result<Json<SessionRes>, ApiError> {
    if let Err(e) = state.session_file.clear() {
        tracing::warn!("failed to clear session marker: {e}");
    }
    let snapshot = dispatch(&state, SessionAction::Logout)?;
    Ok(Json(SessionRes::from(&snapshot)))
}

// ============================================================================
// Handlers: dashboard
// ============================================================================

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard aggregates and recent activity", body = DashboardRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// The dashboard payload: overview stats plus recent alerts, care plans and
/// messages.
async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardRes>, ApiError> {
    let store = state.store.read().map_err(|_| lock_poisoned())?;

    let overview = patient_overview(store.patients());

    let alerts = store.alerts();
    let recent_alerts: Vec<AlertRes> = order_alerts(&alerts)
        .into_iter()
        .take(DASHBOARD_RECENT_LIMIT)
        .map(|a| {
            let name = store
                .patient(&a.patient_id)
                .ok()
                .map(|p| p.name.clone());
            AlertRes::new(a, name)
        })
        .collect();

    let recent_care_plans: Vec<CarePlanRes> =
        filter_care_plans(store.care_plans(), &CarePlanFilter::default())
            .into_iter()
            .take(DASHBOARD_RECENT_LIMIT)
            .map(|plan| {
                let name = store
                    .patient(&plan.patient_id)
                    .ok()
                    .map(|p| p.name.clone());
                CarePlanRes::new(plan, name)
            })
            .collect();

    // The inbox preview: each conversation's denormalized last message,
    // newest first.
    let mut last_messages: Vec<&carelink_core::messaging::Message> = store
        .conversations()
        .iter()
        .map(|c| &c.last_message)
        .collect();
    last_messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let recent_messages: Vec<MessageRes> = last_messages
        .into_iter()
        .take(DASHBOARD_RECENT_LIMIT)
        .map(MessageRes::from)
        .collect();

    Ok(Json(DashboardRes {
        overview: OverviewRes::from(&overview),
        recent_alerts,
        recent_care_plans,
        recent_messages,
    }))
}

// ============================================================================
// Handlers: patients
// ============================================================================

/// Query parameters of the patient list.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PatientListQuery {
    /// Case-insensitive substring match on the patient name.
    pub search: Option<String>,
    /// Exact condition label the patient must carry.
    pub condition: Option<String>,
    /// Sort field: `name` (default) or `adherence`.
    pub sort: Option<String>,
    /// Sort direction: `asc` (default) or `desc`.
    pub direction: Option<String>,
}

#[utoipa::path(
    get,
    path = "/patients",
    params(PatientListQuery),
    responses(
        (status = 200, description = "Filtered, ordered patient list", body = PatientListRes),
        (status = 400, description = "Invalid sort parameters", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// Lists patients for the current filter and sort state.
async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<PatientListQuery>,
) -> Result<Json<PatientListRes>, ApiError> {
    let field = match query.sort.as_deref() {
        None => PatientSortField::default(),
        Some(raw) => PatientSortField::parse(raw)
            .ok_or_else(|| bad_request(format!("unknown sort field: {raw}")))?,
    };
    let direction = match query.direction.as_deref() {
        None => SortDirection::default(),
        Some(raw) => SortDirection::parse(raw)
            .ok_or_else(|| bad_request(format!("unknown sort direction: {raw}")))?,
    };
    let filter = PatientFilter {
        search: query.search.unwrap_or_default(),
        condition: query.condition,
    };

    let store = state.store.read().map_err(|_| lock_poisoned())?;
    let patients = filter_patients(store.patients(), &filter, PatientSort { field, direction });

    Ok(Json(PatientListRes {
        patients: patients.into_iter().map(PatientSummaryRes::from).collect(),
        conditions: unique_conditions(store.patients()),
    }))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = NewPatientReq,
    responses(
        (status = 201, description = "Patient enrolled", body = PatientDetailRes),
        (status = 400, description = "Invalid enrollment input", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// Enrolls a new patient with defaulted adherence and empty clinical data.
async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<NewPatientReq>,
) -> Result<(StatusCode, Json<PatientDetailRes>), ApiError> {
    let mut store = state.store.write().map_err(|_| lock_poisoned())?;
    let patient = store.add_patient(req.into()).map_err(map_portal_error)?;
    Ok((
        StatusCode::CREATED,
        Json(PatientDetailRes::new(patient, Vec::new(), Vec::new())),
    ))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient detail with clinical data", body = PatientDetailRes),
        (status = 404, description = "Unknown patient", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// Full patient detail, with the care team resolved to user records and the
/// patient's care plans attached.
async fn patient_detail(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<PatientDetailRes>, ApiError> {
    let store = state.store.read().map_err(|_| lock_poisoned())?;
    let patient = store
        .patient(&PatientId::new(id))
        .map_err(map_portal_error)?;
    let care_team: Vec<UserRes> = patient
        .care_team
        .iter()
        .filter_map(|id| store.user(id))
        .map(UserRes::from)
        .collect();
    let care_plans: Vec<CarePlanRes> = store
        .care_plans_for(&patient.id)
        .into_iter()
        .map(|plan| CarePlanRes::new(plan, Some(patient.name.clone())))
        .collect();
    Ok(Json(PatientDetailRes::new(patient, care_team, care_plans)))
}

/// Query parameters of the biometric trend endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BiometricQuery {
    /// Reading kind: `weight`, `blood_pressure`, `glucose` or `heart_rate`.
    #[serde(rename = "type")]
    pub kind: String,
}

#[utoipa::path(
    get,
    path = "/patients/{id}/biometrics",
    params(("id" = String, Path, description = "Patient id"), BiometricQuery),
    responses(
        (status = 200, description = "Readings of one kind, oldest first", body = BiometricListRes),
        (status = 400, description = "Unknown reading kind", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// A patient's trend series for one biometric kind, chart-ready.
async fn patient_biometrics(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Query(query): Query<BiometricQuery>,
) -> Result<Json<BiometricListRes>, ApiError> {
    let kind = BiometricKind::parse(&query.kind)
        .ok_or_else(|| bad_request(format!("unknown reading kind: {}", query.kind)))?;

    let store = state.store.read().map_err(|_| lock_poisoned())?;
    let readings = store
        .biometric_history(&PatientId::new(id), kind)
        .map_err(map_portal_error)?;

    Ok(Json(BiometricListRes {
        readings: readings.into_iter().map(BiometricReadingRes::from).collect(),
    }))
}

// ============================================================================
// Handlers: care plans and meal plans
// ============================================================================

/// Query parameters of the care-plan list.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CarePlanListQuery {
    /// Case-insensitive substring match on title or description.
    pub search: Option<String>,
    /// Status filter: `draft`, `active` or `completed`.
    pub status: Option<String>,
    /// Restrict to one patient's plans.
    pub patient: Option<String>,
}

#[utoipa::path(
    get,
    path = "/care-plans",
    params(CarePlanListQuery),
    responses(
        (status = 200, description = "Filtered care plans, newest update first", body = CarePlanListRes),
        (status = 400, description = "Invalid status filter", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// Lists care plans. Ordering is fixed: `updated_at` descending.
async fn list_care_plans(
    State(state): State<AppState>,
    Query(query): Query<CarePlanListQuery>,
) -> Result<Json<CarePlanListRes>, ApiError> {
    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(
            PlanStatus::parse(raw)
                .ok_or_else(|| bad_request(format!("unknown plan status: {raw}")))?,
        ),
    };
    let filter = CarePlanFilter {
        search: query.search.unwrap_or_default(),
        status,
        patient: query.patient.map(PatientId::new),
    };

    let store = state.store.read().map_err(|_| lock_poisoned())?;
    let care_plans = filter_care_plans(store.care_plans(), &filter)
        .into_iter()
        .map(|plan| {
            let name = store
                .patient(&plan.patient_id)
                .ok()
                .map(|p| p.name.clone());
            CarePlanRes::new(plan, name)
        })
        .collect();

    Ok(Json(CarePlanListRes { care_plans }))
}

#[utoipa::path(
    get,
    path = "/care-plans/{id}",
    params(("id" = String, Path, description = "Care plan id")),
    responses(
        (status = 200, description = "Care plan detail", body = CarePlanRes),
        (status = 404, description = "Unknown care plan", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// One care plan, with its goals, meal plans and completion rate.
async fn care_plan_detail(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<CarePlanRes>, ApiError> {
    let store = state.store.read().map_err(|_| lock_poisoned())?;
    let plan = store
        .care_plan(&CarePlanId::new(id))
        .map_err(map_portal_error)?;
    let name = store
        .patient(&plan.patient_id)
        .ok()
        .map(|p| p.name.clone());
    Ok(Json(CarePlanRes::new(plan, name)))
}

#[utoipa::path(
    get,
    path = "/meal-plans",
    responses(
        (status = 200, description = "The global meal-plan set", body = MealPlanListRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// The deduplicated meal-plan set across every care plan.
async fn list_meal_plans(State(state): State<AppState>) -> Result<Json<MealPlanListRes>, ApiError> {
    let store = state.store.read().map_err(|_| lock_poisoned())?;
    Ok(Json(MealPlanListRes {
        meal_plans: store
            .all_meal_plans()
            .into_iter()
            .map(MealPlanRes::from)
            .collect(),
    }))
}

// ============================================================================
// Handlers: messaging
// ============================================================================

/// Query parameters of the conversation inbox.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ConversationListQuery {
    /// Case-insensitive substring match on the other participant's name.
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/conversations",
    params(ConversationListQuery),
    responses(
        (status = 200, description = "The viewer's inbox, newest activity first", body = ConversationListRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// The signed-in user's conversations.
async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<ConversationListQuery>,
) -> Result<Json<ConversationListRes>, ApiError> {
    let viewer_user = current_user(&state)?;
    let viewer = ParticipantId::from(&viewer_user.id);
    let search = query.search.unwrap_or_default();

    let store = state.store.read().map_err(|_| lock_poisoned())?;
    let visible = filter_conversations(store.conversations(), &viewer, &search, |id| {
        store.display_name(id).map(str::to_owned)
    });

    let conversations = visible
        .into_iter()
        .filter_map(|conversation| {
            let partner = conversation.other_participant(&viewer)?;
            Some(ConversationRes::new(
                conversation,
                partner.to_string(),
                store.display_name(partner).map(str::to_owned),
                store.unread_count(conversation, &viewer),
            ))
        })
        .collect();

    Ok(Json(ConversationListRes { conversations }))
}

#[utoipa::path(
    get,
    path = "/conversations/{id}/messages",
    params(("id" = String, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages in the thread, newest first", body = MessageListRes),
        (status = 404, description = "Unknown conversation", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// Messages inside one conversation.
async fn conversation_messages(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<MessageListRes>, ApiError> {
    let store = state.store.read().map_err(|_| lock_poisoned())?;
    let conversation = store
        .conversation(&ConversationId::new(id))
        .map_err(map_portal_error)?;
    Ok(Json(MessageListRes {
        messages: store
            .messages_in(conversation)
            .into_iter()
            .map(MessageRes::from)
            .collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/conversations/{id}/messages",
    params(("id" = String, Path, description = "Conversation id")),
    request_body = SendMessageReq,
    responses(
        (status = 201, description = "Message appended", body = MessageRes),
        (status = 400, description = "Empty message content", body = ErrorRes),
        (status = 404, description = "Unknown conversation", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// Appends a message from the signed-in user to a conversation.
async fn send_message(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<SendMessageReq>,
) -> Result<(StatusCode, Json<MessageRes>), ApiError> {
    let viewer_user = current_user(&state)?;
    let content =
        NonEmptyText::new(&req.content).map_err(|e| bad_request(e.to_string()))?;

    let mut store = state.store.write().map_err(|_| lock_poisoned())?;
    let message = store
        .append_message(
            &ConversationId::new(id),
            ParticipantId::from(&viewer_user.id),
            content,
        )
        .map_err(map_portal_error)?;

    Ok((StatusCode::CREATED, Json(MessageRes::from(message))))
}

// ============================================================================
// Handlers: analytics
// ============================================================================

/// Query parameters of the analytics page.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AnalyticsQuery {
    /// Trend window: `7d`, `30d` (default) or `90d`.
    pub timeframe: Option<String>,
}

#[utoipa::path(
    get,
    path = "/analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Reports and derived analytics", body = AnalyticsRes),
        (status = 400, description = "Invalid timeframe", body = ErrorRes),
        (status = 401, description = "Not signed in", body = ErrorRes)
    )
)]
/// Analytics payload: generated reports plus derived population statistics.
async fn analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsRes>, ApiError> {
    let days: usize = match query.timeframe.as_deref() {
        None | Some("30d") => 30,
        Some("7d") => 7,
        Some("90d") => 90,
        Some(raw) => return Err(bad_request(format!("unknown timeframe: {raw}"))),
    };

    let store = state.store.read().map_err(|_| lock_poisoned())?;

    let history = store.adherence_history();
    let window = history.len().saturating_sub(days);
    let adherence_trend = history[window..].iter().map(TrendPointRes::from).collect();

    let overview = patient_overview(store.patients());
    let conditions = carelink_core::aggregate::condition_histogram(store.patients())
        .into_iter()
        .map(|c| ConditionCountRes {
            condition: c.condition,
            patients: c.patients,
        })
        .collect();

    Ok(Json(AnalyticsRes {
        reports: store.reports().iter().map(ReportRes::from).collect(),
        adherence_trend,
        adherence_change: adherence_change(history),
        conditions,
        adherence_distribution: OverviewRes::from(&overview),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state(dir: &tempfile::TempDir) -> AppState {
        let cfg = CoreConfig::new(dir.path().to_path_buf()).expect("valid config");
        bootstrap(&cfg)
            .expect("seed data is valid")
            .with_login_delay(Duration::ZERO)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    fn get(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("build request")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request")
    }

    async fn sign_in(state: &AppState) {
        let response = router(state.clone())
            .oneshot(post_json(
                "/session",
                serde_json::json!({
                    "email": "sarah.johnson@carelink.health",
                    "password": "password",
                }),
            ))
            .await
            .expect("login request");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_open() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        let response = router(state)
            .oneshot(get("/health"))
            .await
            .expect("health request");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn protected_routes_refuse_unauthenticated_access() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        for uri in [
            "/dashboard",
            "/patients",
            "/care-plans",
            "/meal-plans",
            "/conversations",
            "/analytics",
        ] {
            let response = router(state.clone())
                .oneshot(get(uri))
                .await
                .expect("request");
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn wrong_password_fails_and_records_the_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);

        let response = router(state.clone())
            .oneshot(post_json(
                "/session",
                serde_json::json!({
                    "email": "sarah.johnson@carelink.health",
                    "password": "hunter2",
                }),
            ))
            .await
            .expect("login request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router(state)
            .oneshot(get("/session"))
            .await
            .expect("session request");
        let json = body_json(response).await;
        assert_eq!(json["is_authenticated"], false);
        assert_eq!(json["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn login_authenticates_and_marker_restores_across_restart() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = CoreConfig::new(dir.path().to_path_buf()).expect("valid config");
        let state = bootstrap(&cfg)
            .expect("seed data is valid")
            .with_login_delay(Duration::ZERO);

        sign_in(&state).await;

        let response = router(state.clone())
            .oneshot(get("/session"))
            .await
            .expect("session request");
        let json = body_json(response).await;
        assert_eq!(json["is_authenticated"], true);
        assert_eq!(json["user"]["email"], "sarah.johnson@carelink.health");

        // A rebuilt server over the same state dir restores the session
        // from the persisted marker without re-authenticating.
        let restarted = bootstrap(&cfg).expect("seed data is valid");
        let response = router(restarted)
            .oneshot(get("/session"))
            .await
            .expect("session request");
        let json = body_json(response).await;
        assert_eq!(json["is_authenticated"], true);
    }

    #[tokio::test]
    async fn logout_resets_and_clears_the_marker() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = CoreConfig::new(dir.path().to_path_buf()).expect("valid config");
        let state = bootstrap(&cfg)
            .expect("seed data is valid")
            .with_login_delay(Duration::ZERO);

        sign_in(&state).await;
        let response = router(state.clone())
            .oneshot(
                HttpRequest::builder()
                    .method("DELETE")
                    .uri("/session")
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("logout request");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["is_authenticated"], false);

        // No marker left: a restart comes up unauthenticated.
        let restarted = bootstrap(&cfg).expect("seed data is valid");
        let response = router(restarted)
            .oneshot(get("/session"))
            .await
            .expect("session request");
        let json = body_json(response).await;
        assert_eq!(json["is_authenticated"], false);
    }

    #[tokio::test]
    async fn patient_list_filters_and_sorts() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        sign_in(&state).await;

        let response = router(state.clone())
            .oneshot(get("/patients?search=john&condition=Hypertension"))
            .await
            .expect("patients request");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["patients"].as_array().expect("array").len(), 1);
        assert_eq!(json["patients"][0]["name"], "John Doe");

        let response = router(state.clone())
            .oneshot(get("/patients?sort=adherence&direction=desc"))
            .await
            .expect("patients request");
        let json = body_json(response).await;
        let rates: Vec<u64> = json["patients"]
            .as_array()
            .expect("array")
            .iter()
            .map(|p| p["adherence_rate"].as_u64().expect("rate"))
            .collect();
        assert_eq!(rates, vec![92, 88, 78, 65]);

        let response = router(state)
            .oneshot(get("/patients?sort=bogus"))
            .await
            .expect("patients request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn enrolling_a_patient_defaults_the_record() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        sign_in(&state).await;

        let response = router(state.clone())
            .oneshot(post_json(
                "/patients",
                serde_json::json!({
                    "name": "Alice Walker",
                    "age": 47,
                    "gender": "Female",
                    "email": "alice@example.com",
                    "phone": "(555) 000-1111",
                    "conditions": ["Hypertension"],
                }),
            ))
            .await
            .expect("enroll request");
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["adherence_rate"], 100);
        assert_eq!(json["alerts"].as_array().expect("array").len(), 0);

        let response = router(state)
            .oneshot(get("/patients"))
            .await
            .expect("patients request");
        let json = body_json(response).await;
        assert_eq!(json["patients"].as_array().expect("array").len(), 5);
    }

    #[tokio::test]
    async fn patient_detail_resolves_team_and_plans() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        sign_in(&state).await;

        let response = router(state)
            .oneshot(get("/patients/p1"))
            .await
            .expect("patient request");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["name"], "John Doe");
        let team: Vec<&str> = json["care_team"]
            .as_array()
            .expect("array")
            .iter()
            .map(|u| u["name"].as_str().expect("name"))
            .collect();
        assert_eq!(team, vec!["Dr. Sarah Johnson", "Mark Wilson"]);
        assert_eq!(json["care_plans"][0]["id"], "cp1");
    }

    #[tokio::test]
    async fn biometric_trend_filters_by_kind() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        sign_in(&state).await;

        let response = router(state.clone())
            .oneshot(get("/patients/p1/biometrics?type=glucose"))
            .await
            .expect("biometrics request");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let readings = json["readings"].as_array().expect("array");
        // 15 generated points plus the seeded latest reading.
        assert!(readings.len() >= 15);
        assert!(readings.iter().all(|r| r["type"] == "glucose"));

        let response = router(state)
            .oneshot(get("/patients/p1/biometrics?type=steps"))
            .await
            .expect("biometrics request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_patient_is_a_structured_404() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        sign_in(&state).await;

        let response = router(state)
            .oneshot(get("/patients/p999"))
            .await
            .expect("patient request");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "patient not found: p999");
    }

    #[tokio::test]
    async fn dashboard_reports_seeded_aggregates() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        sign_in(&state).await;

        let response = router(state)
            .oneshot(get("/dashboard"))
            .await
            .expect("dashboard request");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["overview"]["total_patients"], 4);
        assert_eq!(json["overview"]["average_adherence"], 81);
        assert_eq!(json["overview"]["patients_with_alerts"], 4);
        // a1, a3, a4 and a5 are unread; only a2 has been read.
        assert_eq!(json["overview"]["unread_alerts"], 4);

        // Unread alerts lead the widget regardless of timestamps.
        let alerts = json["recent_alerts"].as_array().expect("array");
        assert!(!alerts.is_empty());
        assert_eq!(alerts[0]["is_read"], false);
    }

    #[tokio::test]
    async fn care_plan_list_honors_status_and_patient_filters() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        sign_in(&state).await;

        let response = router(state.clone())
            .oneshot(get("/care-plans?status=active&patient=p1"))
            .await
            .expect("care plans request");
        let json = body_json(response).await;
        let plans = json["care_plans"].as_array().expect("array");
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0]["id"], "cp1");
        assert_eq!(plans[0]["goal_completion"], 33);

        // Fixed ordering: most recently updated first.
        let response = router(state)
            .oneshot(get("/care-plans"))
            .await
            .expect("care plans request");
        let json = body_json(response).await;
        let ids: Vec<&str> = json["care_plans"]
            .as_array()
            .expect("array")
            .iter()
            .map(|p| p["id"].as_str().expect("id"))
            .collect();
        assert_eq!(ids, vec!["cp3", "cp1", "cp2"]);
    }

    #[tokio::test]
    async fn conversations_are_scoped_to_the_viewer() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        sign_in(&state).await;

        let response = router(state.clone())
            .oneshot(get("/conversations"))
            .await
            .expect("conversations request");
        let json = body_json(response).await;
        let conversations = json["conversations"].as_array().expect("array");
        // Dr. Sarah Johnson is in conv1 and conv3, not conv2.
        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0]["id"], "conv1");
        assert_eq!(conversations[1]["id"], "conv3");

        let response = router(state)
            .oneshot(get("/conversations?search=robert"))
            .await
            .expect("conversations request");
        let json = body_json(response).await;
        let conversations = json["conversations"].as_array().expect("array");
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0]["partner_name"], "Robert Johnson");
    }

    #[tokio::test]
    async fn sending_a_message_updates_the_thread() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        sign_in(&state).await;

        let response = router(state.clone())
            .oneshot(post_json(
                "/conversations/conv1/messages",
                serde_json::json!({ "content": "Let's review your readings tomorrow." }),
            ))
            .await
            .expect("send request");
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["recipient_id"], "p1");
        assert_eq!(json["is_read"], false);

        let response = router(state.clone())
            .oneshot(get("/conversations"))
            .await
            .expect("conversations request");
        let json = body_json(response).await;
        assert_eq!(
            json["conversations"][0]["last_message"]["content"],
            "Let's review your readings tomorrow."
        );

        // Blank content is refused.
        let response = router(state)
            .oneshot(post_json(
                "/conversations/conv1/messages",
                serde_json::json!({ "content": "   " }),
            ))
            .await
            .expect("send request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analytics_slices_the_trend_window() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);
        sign_in(&state).await;

        let response = router(state.clone())
            .oneshot(get("/analytics?timeframe=7d"))
            .await
            .expect("analytics request");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["adherence_trend"].as_array().expect("array").len(), 7);
        assert_eq!(json["reports"].as_array().expect("array").len(), 3);
        // Seeded roster: Type 2 Diabetes et al. appear once each; the
        // histogram lists every label exactly once.
        assert_eq!(json["conditions"].as_array().expect("array").len(), 8);

        let response = router(state)
            .oneshot(get("/analytics?timeframe=1y"))
            .await
            .expect("analytics request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_paths_redirect_to_the_root() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = test_state(&dir);

        let response = router(state.clone())
            .oneshot(get("/no/such/page"))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/")
        );

        let response = router(state).oneshot(get("/")).await.expect("request");
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/dashboard")
        );
    }
}
