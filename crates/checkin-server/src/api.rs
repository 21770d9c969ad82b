use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use checkin_shared::{Clock, ContextId, CurrencyKind, RankPeriod, Reward};
use checkin_store::UserRecord;

use crate::adapter::{InboundEvent, LeaveNotice};
use crate::authz;
use crate::config::SettingsProvider;
use crate::error::ServerError;
use crate::ledger::{Leaderboard, Ledger, RankEntry, RedeemRequest, Redemption};
use crate::render;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub settings: Arc<dyn SettingsProvider>,
    pub clock: Arc<dyn Clock>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/checkin", post(checkin))
        .route("/v1/assets", post(assets))
        .route("/v1/redeem/points", post(redeem_points))
        .route("/v1/redeem/ingots", post(redeem_ingots))
        .route("/v1/rank", post(rank))
        .route("/v1/reset", post(reset))
        .route("/v1/member-left", post(member_left))
        .route("/v1/notice", post(notice))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct CheckinResponse {
    reward: Reward,
    record: UserRecord,
    text: String,
}

#[derive(Serialize)]
struct AssetsResponse {
    record: UserRecord,
    text: String,
}

#[derive(Serialize)]
struct RedeemResponse {
    #[serde(flatten)]
    redemption: Redemption,
    text: String,
}

#[derive(Serialize)]
struct RankResponse {
    period: RankPeriod,
    no_data: bool,
    entries: Vec<RankEntry>,
    text: String,
}

#[derive(Serialize)]
struct ResetResponse {
    user_id: String,
    display_name: String,
    text: String,
}

#[derive(Deserialize)]
struct MemberLeftRequest {
    platform: String,
    #[serde(flatten)]
    notice: LeaveNotice,
}

/// A raw platform notice; `group_id` is used when the notice lacks one.
#[derive(Deserialize)]
struct NoticeRequest {
    platform: String,
    #[serde(default)]
    group_id: Option<String>,
    raw: serde_json::Value,
}

#[derive(Serialize)]
struct CleanupResponse {
    handled: bool,
    reset: bool,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn checkin(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> Result<Json<CheckinResponse>, ServerError> {
    let settings = state.settings.snapshot();
    let context = event.scope.context_id(settings.storage_scope);

    let outcome = state
        .ledger
        .check_in(
            &context,
            event.user_id(),
            &event.display_name,
            state.clock.today(),
            &settings.reward(),
        )
        .await?;

    Ok(Json(CheckinResponse {
        text: render::check_in(&settings.templates, &outcome),
        reward: outcome.reward,
        record: outcome.record,
    }))
}

async fn assets(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> Json<AssetsResponse> {
    let settings = state.settings.snapshot();
    let context = event.scope.context_id(settings.storage_scope);

    let record = state
        .ledger
        .assets(&context, event.user_id(), &event.display_name, state.clock.today())
        .await;

    Json(AssetsResponse {
        text: render::assets(&settings.templates, &record),
        record,
    })
}

async fn redeem_points(
    state: State<AppState>,
    event: Json<InboundEvent>,
) -> Result<Json<RedeemResponse>, ServerError> {
    redeem(state, event, CurrencyKind::Points).await
}

async fn redeem_ingots(
    state: State<AppState>,
    event: Json<InboundEvent>,
) -> Result<Json<RedeemResponse>, ServerError> {
    redeem(state, event, CurrencyKind::Ingots).await
}

async fn redeem(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
    kind: CurrencyKind,
) -> Result<Json<RedeemResponse>, ServerError> {
    let settings = state.settings.snapshot();
    let context = event.scope.context_id(settings.storage_scope);
    let group_context = event.scope.group_context_id();
    let args = event.redeem_args();

    let req = RedeemRequest {
        context: &context,
        group_context: &group_context,
        actor_id: event.user_id(),
        actor_name: &event.display_name,
        target: args.target.as_deref(),
        amount: args.amount,
        is_admin: event.is_admin(),
        role_mode: settings.exchange_roles,
        kind,
    };
    let redemption = state
        .ledger
        .redeem(&req)
        .await
        .map_err(|e| ServerError::from_ledger(e, Some(kind)))?;

    Ok(Json(RedeemResponse {
        text: render::redemption(&settings.templates, &redemption),
        redemption,
    }))
}

async fn rank(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> Json<RankResponse> {
    let settings = state.settings.snapshot();
    let context = event.scope.context_id(settings.storage_scope);
    let period = event.rank_period(&settings.rank_week_keyword);

    let board = state
        .ledger
        .rank(&context, period, settings.rank_limit())
        .await;
    let text = render::leaderboard(&board);

    Json(match board {
        Leaderboard::NoData => RankResponse {
            period,
            no_data: true,
            entries: Vec::new(),
            text,
        },
        Leaderboard::Ranked { period, entries } => RankResponse {
            period,
            no_data: false,
            entries,
            text,
        },
    })
}

async fn reset(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> Result<Json<ResetResponse>, ServerError> {
    let target = authz::reset_target(
        event.user_id(),
        event.first_mention(),
        event.numeric_argument().as_deref(),
    );
    let group_context = event.scope.group_context_id();

    let outcome = state
        .ledger
        .reset(&group_context, &target, event.is_admin())
        .await?;

    Ok(Json(ResetResponse {
        text: render::reset(&outcome.display_name),
        user_id: outcome.user_id,
        display_name: outcome.display_name,
    }))
}

async fn member_left(
    State(state): State<AppState>,
    Json(req): Json<MemberLeftRequest>,
) -> Json<CleanupResponse> {
    let reset = leave_cleanup(&state, &req.platform, &req.notice).await;
    Json(CleanupResponse {
        handled: true,
        reset,
    })
}

async fn notice(
    State(state): State<AppState>,
    Json(req): Json<NoticeRequest>,
) -> Json<CleanupResponse> {
    let Some(notice) = LeaveNotice::from_onebot(&req.raw, req.group_id.as_deref()) else {
        return Json(CleanupResponse {
            handled: false,
            reset: false,
        });
    };
    let reset = leave_cleanup(&state, &req.platform, &notice).await;
    Json(CleanupResponse {
        handled: true,
        reset,
    })
}

/// Best effort: failures are logged and reported as "nothing reset".
async fn leave_cleanup(state: &AppState, platform: &str, notice: &LeaveNotice) -> bool {
    let context = ContextId::group(platform, &notice.group_id);
    match state.ledger.member_left(&context, &notice.user_id).await {
        Ok(reset) => reset,
        Err(e) => {
            warn!(
                context = %context,
                user = %notice.user_id,
                error = %e,
                "leave cleanup failed"
            );
            false
        }
    }
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
