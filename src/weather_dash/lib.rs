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

//! Server-rendered weather dashboard for the OpenWeatherMap forecast API
//!
//! ## Features
//!
//! `weather_dash` looks up a city using the [OpenWeatherMap 5 day / 3 hour forecast] API and
//! renders a dashboard page for it. The page shows:
//!
//! * Current conditions: temperature, feels-like temperature, description, humidity and wind.
//! * One card per day of the forecast with the low and high temperature. Selecting a card
//!   expands the three-hourly detail for that day.
//! * A map centred on the city with switchable cloud, temperature and precipitation layers.
//! * Dark mode, a mobile layout, metric or imperial units and a background that follows the
//!   time of day in the city.
//!
//! The same data is available as JSON from `/api/forecast?city=$CITY` and request metrics are
//! exposed in Prometheus format at `/metrics`.
//!
//! [OpenWeatherMap 5 day / 3 hour forecast]: https://openweathermap.org/forecast5
//!
//! ## Build
//!
//! `weather_dash` is a Rust program and must be built from source using a [Rust toolchain](https://rustup.rs/).
//!
//! ```text
//! cargo build --release
//! ```
//!
//! ## Usage
//!
//! An OpenWeatherMap API key is required. It can be passed with `--api-key` or set in the
//! `OWM_API_KEY` environment variable.
//!
//! ```text
//! OWM_API_KEY=... ./weather_dash --static-dir static
//! ```
//!
//! The dashboard is then available at `http://localhost:9783/`. Background images for the
//! time of day are loaded from `photos/{morning,afternoon,evening,night}.jpg` and the fallback
//! condition background from `images/default.jpg`, both relative to the static directory.
//!

pub mod client;
pub mod forecast;
pub mod http;
pub mod map;
pub mod metrics;
pub mod render;
pub mod theme;

#[cfg(test)]
mod testdata;
