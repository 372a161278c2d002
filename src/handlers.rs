use crate::errors::AppError;
use crate::live::LiveSnapshot;
use crate::models::{AnalyticsResponse, ConnectionStatus, LiveResponse};
use crate::state::AppState;
use crate::stats::build_analytics;
use crate::ui::render_index;
use axum::{extract::State, response::Html, Json};

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let analytics = build_analytics()?;
    let snapshot = state.view.snapshot();
    let status = state.connection_status().await;
    Ok(Html(render_index(&snapshot, status, &analytics)))
}

pub async fn get_live(State(state): State<AppState>) -> Json<LiveResponse> {
    let status = state.connection_status().await;
    Json(to_response(state.view.snapshot(), status))
}

pub async fn get_analytics() -> Result<Json<AnalyticsResponse>, AppError> {
    Ok(Json(build_analytics()?))
}

fn to_response(snapshot: LiveSnapshot, status: ConnectionStatus) -> LiveResponse {
    LiveResponse {
        people_in: snapshot.counters.people_in,
        people_out: snapshot.counters.people_out,
        people_inside: snapshot.counters.people_inside,
        seq: snapshot.seq,
        updated_at: snapshot.updated_at.map(|at| at.to_rfc3339()),
        status,
    }
}

