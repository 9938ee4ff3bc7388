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

use clap::Parser;
use prometheus_client::registry::Registry;
use reqwest::Client;
use std::error::Error;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{self, SignalKind};
use tracing::Level;
use weather_dash::client::{OpenWeatherClient, Units};
use weather_dash::http::{RequestContext, Settings};
use weather_dash::metrics::DashboardMetrics;

const DEFAULT_LOG_LEVEL: Level = Level::INFO;
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 9783);
const DEFAULT_TIMEOUT_MILLIS: u64 = 5000;
const DEFAULT_API_URL: &str = "https://api.openweathermap.org/data/2.5/";
const DEFAULT_TILE_URL: &str = "https://tile.openweathermap.org/";
const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Parser)]
#[clap(name = "weather_dash", version = clap::crate_version!())]
struct WeatherDashApplication {
    /// OpenWeatherMap API key used for forecasts and map tiles
    #[clap(long, env = "OWM_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Base URL for the OpenWeatherMap data API
    #[clap(long, default_value_t = DEFAULT_API_URL.into())]
    api_url: String,

    /// Base URL for OpenWeatherMap map tiles
    #[clap(long, default_value_t = DEFAULT_TILE_URL.into())]
    tile_url: String,

    /// Units used when a request doesn't pick any. Allowed values are 'metric' and 'imperial'
    #[clap(long, default_value_t = Units::Metric)]
    units: Units,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[clap(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,

    /// Timeout for fetching forecasts from the OpenWeatherMap API, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_MILLIS)]
    timeout_millis: u64,

    /// Directory to serve stylesheets and background images from
    #[clap(long, default_value = DEFAULT_STATIC_DIR)]
    static_dir: PathBuf,

    /// Address to bind to. By default, weather_dash only listens on localhost.
    #[clap(long, default_value_t = DEFAULT_BIND_ADDR.into())]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let opts = WeatherDashApplication::parse();
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(opts.log_level)
            .finish(),
    )?;

    if opts.api_key.trim().is_empty() {
        tracing::error!("an OpenWeatherMap API key is required");
        process::exit(1)
    }

    let timeout = Duration::from_millis(opts.timeout_millis);
    let http_client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        tracing::error!(message = "unable to initialize HTTP client", error = %e);
        process::exit(1)
    });

    let client = OpenWeatherClient::new(http_client, &opts.api_url, &opts.api_key).unwrap_or_else(|e| {
        tracing::error!(message = "unable to initialize forecast client", error = %e);
        process::exit(1)
    });

    if !opts.static_dir.is_dir() {
        tracing::warn!(message = "static directory not found, backgrounds will be missing", path = %opts.static_dir.display());
    }

    let mut registry = Registry::default();
    let metrics = DashboardMetrics::new(&mut registry);
    let settings = Settings {
        default_units: opts.units,
        tile_url: opts.tile_url.clone(),
        api_key: opts.api_key.clone(),
    };

    let context = Arc::new(RequestContext::new(client, metrics, registry, settings));
    let app = weather_dash::http::router(context, &opts.static_dir);

    let server = axum::Server::try_bind(&opts.bind).unwrap_or_else(|e| {
        tracing::error!(message = "error binding to address", address = %opts.bind, error = %e);
        process::exit(1)
    });

    tracing::info!(message = "server started", address = %opts.bind, api_url = %opts.api_url);
    server
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            // Wait for either SIGTERM or SIGINT to shutdown
            tokio::select! {
                _ = sigterm() => {}
                _ = sigint() => {}
            }
        })
        .await?;

    tracing::info!("server shutdown");
    Ok(())
}

/// Return after the first SIGTERM signal received by this process
async fn sigterm() -> io::Result<()> {
    unix::signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

/// Return after the first SIGINT signal received by this process
async fn sigint() -> io::Result<()> {
    unix::signal(SignalKind::interrupt())?.recv().await;
    Ok(())
}
