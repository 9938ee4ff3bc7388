// weather_dash - Server-rendered weather dashboard for the OpenWeatherMap API
//
// Copyright 2026 weather_dash authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::client::{ClientError, OpenWeatherClient, Units};
use crate::forecast::Dashboard;
use crate::metrics::DashboardMetrics;
use crate::render::{render_page, PageModel, ERROR_MESSAGE};
use crate::theme::{DayPeriod, Preferences};
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use prometheus_client::encoding::text::encode;
use prometheus_client::registry::Registry;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Settings that apply to every request.
#[derive(Debug, Clone)]
pub struct Settings {
    pub default_units: Units,
    pub tile_url: String,
    pub api_key: String,
}

/// State shared by all HTTP handlers.
#[derive(Debug)]
pub struct RequestContext {
    client: OpenWeatherClient,
    metrics: DashboardMetrics,
    registry: Registry,
    settings: Settings,
}

impl RequestContext {
    pub fn new(client: OpenWeatherClient, metrics: DashboardMetrics, registry: Registry, settings: Settings) -> Self {
        RequestContext {
            client,
            metrics,
            registry,
            settings,
        }
    }

    /// Fetch the forecast for a city and build its dashboard, recording metrics for the request.
    pub async fn dashboard(&self, city: &str, units: Units) -> Result<Dashboard, ClientError> {
        let start = Instant::now();
        let res = self.client.forecast(city, units).await.and_then(|forecast| {
            Dashboard::build(&forecast, units, &self.settings.tile_url, &self.settings.api_key)
                .ok_or_else(|| ClientError::EmptyForecast(city.to_owned()))
        });

        self.metrics.request(res.as_ref().err(), start.elapsed());
        match &res {
            Ok(dash) => {
                self.metrics.conditions(&dash.current, units);
                tracing::info!(message = "fetched new forecast", city = %city, location = %dash.location, days = dash.days.len());
            }
            Err(ClientError::InvalidCity(c)) => {
                tracing::warn!(message = "city not found", city = %c);
            }
            Err(e) => {
                tracing::error!(message = "failed to fetch forecast", city = %city, error = %e);
            }
        }

        res
    }
}

/// Query string of the dashboard page.
///
/// Values are kept as strings and parsed leniently so that a stale or hand-edited link
/// falls back to defaults instead of failing the whole page.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub city: Option<String>,
    pub units: Option<String>,
    pub day: Option<String>,
    pub dark: Option<String>,
    pub mobile: Option<String>,
}

impl DashboardQuery {
    fn preferences(&self, default_units: Units) -> Preferences {
        Preferences {
            units: parse_units(self.units.as_deref(), default_units),
            dark: parse_flag("dark", self.dark.as_deref()),
            mobile: parse_flag("mobile", self.mobile.as_deref()),
            expanded: parse_day(self.day.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub city: Option<String>,
    pub units: Option<String>,
}

fn parse_units(value: Option<&str>, default: Units) -> Units {
    match value.map(str::parse::<Units>) {
        Some(Ok(units)) => units,
        Some(Err(e)) => {
            tracing::debug!(message = "ignoring invalid units", error = %e);
            default
        }
        None => default,
    }
}

fn parse_day(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(day) => Some(day),
        Err(e) => {
            tracing::debug!(message = "ignoring invalid day", day = %value, error = %e);
            None
        }
    }
}

fn parse_flag(name: &str, value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
        None | Some("") => false,
        Some("true" | "1" | "on" | "yes") => true,
        Some("false" | "0" | "off" | "no") => false,
        Some(other) => {
            tracing::debug!(message = "ignoring invalid flag", flag = %name, value = %other);
            false
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn router(context: Arc<RequestContext>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/api/forecast", get(forecast_json))
        .route("/health", get(health))
        .route("/metrics", get(text_metrics))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

async fn dashboard_page(State(context): State<Arc<RequestContext>>, Query(query): Query<DashboardQuery>) -> Html<String> {
    let city = query.city.as_deref().unwrap_or_default().trim().to_owned();
    let prefs = query.preferences(context.settings.default_units);

    let now = Utc::now();
    let result = if city.is_empty() {
        None
    } else {
        Some(context.dashboard(&city, prefs.units).await)
    };

    let (dashboard, error) = match &result {
        Some(Ok(dash)) => (Some(dash), None),
        Some(Err(_)) => (None, Some(ERROR_MESSAGE)),
        None => (None, None),
    };

    let page = PageModel {
        city: &city,
        prefs,
        dashboard,
        error,
        period: DayPeriod::at(now, dashboard.map(|d| d.offset())),
    };

    Html(render_page(&page).into_string())
}

async fn forecast_json(
    State(context): State<Arc<RequestContext>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<Dashboard>, (StatusCode, Json<ErrorBody>)> {
    let city = query.city.as_deref().unwrap_or_default().trim();
    if city.is_empty() {
        return Err(error_body(StatusCode::BAD_REQUEST, "missing city"));
    }

    let units = parse_units(query.units.as_deref(), context.settings.default_units);
    match context.dashboard(city, units).await {
        Ok(dash) => Ok(Json(dash)),
        Err(ClientError::InvalidCity(c)) => Err(error_body(StatusCode::NOT_FOUND, &format!("city not found: {}", c))),
        Err(e) => Err(error_body(StatusCode::BAD_GATEWAY, &e.to_string())),
    }
}

fn error_body(status: StatusCode, msg: &str) -> (StatusCode, Json<ErrorBody>) {
    (status, Json(ErrorBody { error: msg.to_owned() }))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn text_metrics(State(context): State<Arc<RequestContext>>) -> Response {
    let mut buf = String::new();

    match encode(&mut buf, &context.registry) {
        Ok(_) => {
            tracing::debug!(message = "encoded prometheus metrics to text format", num_bytes = buf.len());
            (StatusCode::OK, [(CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)], buf).into_response()
        }
        Err(e) => {
            tracing::error!(message = "error encoding metrics", error = %e);
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
