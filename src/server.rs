//! HTTP server for the dashboard
//!
//! Routes:
//! - `GET /?start=YYYY-MM-DD&end=YYYY-MM-DD`: the dashboard page
//! - `GET /api/report?start=..&end=..`: every aggregate as JSON
//! - `GET /health`: liveness check
//!
//! The dataset is loaded once and shared read-only behind an `Arc`; each
//! request runs its own filter and aggregation.

use crate::dashboard::Dashboard;
use chrono::{Datelike, Local, NaiveDate};
use ecomdash_core::{DashError, Result};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

/// Date range query parameters, as sent by the page form
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateQuery {
    /// Parse both ends; absent or blank values mean "use the dataset bound"
    pub fn parse(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        Ok((parse_param(self.start.as_deref())?, parse_param(self.end.as_deref())?))
    }
}

fn parse_param(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| DashError::InvalidDate(format!("'{raw}', expected YYYY-MM-DD"))),
    }
}

/// Every dashboard route, without transport concerns
pub fn routes(
    dashboard: Arc<Dashboard>,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let with_dashboard = warp::any().map(move || dashboard.clone());

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&json!({"status": "ok"})));

    let page = warp::path::end()
        .and(warp::get())
        .and(warp::query::<DateQuery>())
        .and(with_dashboard.clone())
        .map(render_page);

    let api = warp::path!("api" / "report")
        .and(warp::get())
        .and(warp::query::<DateQuery>())
        .and(with_dashboard)
        .map(api_report);

    health.or(page).or(api)
}

fn render_page(query: DateQuery, dashboard: Arc<Dashboard>) -> Response {
    debug!("Page request: {:?}", query);
    let view = match query.parse() {
        Ok((start, end)) => dashboard.view(start, end),
        Err(e) => {
            warn!("Rejected page query: {e}");
            dashboard.rejected(None, None, e.to_string())
        }
    };

    match dashboard.render(&view, Local::now().year()) {
        Ok(html) => warp::reply::html(html).into_response(),
        Err(e) => {
            error!("Failed to render dashboard: {e}");
            warp::reply::with_status(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        }
    }
}

fn api_report(query: DateQuery, dashboard: Arc<Dashboard>) -> Response {
    debug!("API request: {:?}", query);
    match query
        .parse()
        .and_then(|(start, end)| dashboard.report_for(start, end))
    {
        Ok(report) => warp::reply::json(&report).into_response(),
        Err(e) => {
            let status = if e.is_user_error() {
                warn!("Rejected API query: {e}");
                StatusCode::BAD_REQUEST
            } else {
                error!("API request failed: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            };
            warp::reply::with_status(warp::reply::json(&json!({"error": e.to_string()})), status)
                .into_response()
        }
    }
}

/// Serve the dashboard until the process is stopped
pub async fn run(dashboard: Arc<Dashboard>, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| DashError::Config(format!("Invalid listen address {host}:{port}: {e}")))?;

    let routes = routes(dashboard).with(warp::trace::request());

    info!("Dashboard listening on http://{addr}");
    warp::serve(routes).run(addr).await;

    Ok(())
}
