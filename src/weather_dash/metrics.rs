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

use crate::client::{ClientError, Units};
use crate::forecast::CurrentConditions;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use std::collections::HashSet;
use std::sync::atomic::AtomicU64;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Outcome {
    Success,
    InvalidCity,
    Error,
}

impl Outcome {
    fn of(err: Option<&ClientError>) -> Self {
        match err {
            None => Self::Success,
            Some(ClientError::InvalidCity(_)) => Self::InvalidCity,
            Some(_) => Self::Error,
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OutcomeLabels {
    pub outcome: Outcome,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CityLabels {
    pub city: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CityUnitLabels {
    pub city: String,
    pub units: String,
}

/// Holder for metrics about forecast requests and the conditions they returned.
///
/// All metrics are created and registered upon call to `DashboardMetrics::new()`. Metrics
/// all share the prefix "weather_dash_". Condition gauges have a "city" label set to the
/// name of the city as returned by the API, so they reflect the most recent lookup of
/// each city. Label sets are never removed, so only the first `max_cities` distinct cities
/// get condition gauges. Lookups of any further city still count towards request metrics.
#[derive(Debug)]
pub struct DashboardMetrics {
    requests: Family<OutcomeLabels, Counter>,
    duration: Histogram,
    temperature: Family<CityUnitLabels, Gauge<f64, AtomicU64>>,
    relative_humidity: Family<CityLabels, Gauge<f64, AtomicU64>>,
    wind_speed: Family<CityUnitLabels, Gauge<f64, AtomicU64>>,
    tracked_cities: Mutex<HashSet<String>>,
    max_cities: usize,
}

impl DashboardMetrics {
    pub const DEFAULT_MAX_CITIES: usize = 256;

    /// Create a new `DashboardMetrics` and register each metric with the provided `Registry`.
    pub fn new(reg: &mut Registry) -> Self {
        Self::with_city_limit(reg, Self::DEFAULT_MAX_CITIES)
    }

    /// Like `new()`, tracking condition gauges for at most `max_cities` distinct cities.
    pub fn with_city_limit(reg: &mut Registry, max_cities: usize) -> Self {
        let registry = reg.sub_registry_with_prefix("weather_dash");

        let requests = Family::<OutcomeLabels, Counter>::default();
        let duration = Histogram::new(exponential_buckets(0.05, 2.0, 8));
        let temperature = Family::<CityUnitLabels, Gauge<f64, AtomicU64>>::default();
        let relative_humidity = Family::<CityLabels, Gauge<f64, AtomicU64>>::default();
        let wind_speed = Family::<CityUnitLabels, Gauge<f64, AtomicU64>>::default();

        registry.register(
            "forecast_requests",
            "Forecast API requests by outcome",
            requests.clone(),
        );
        registry.register(
            "forecast_duration_seconds",
            "Time taken by forecast API requests",
            duration.clone(),
        );
        registry.register(
            "temperature_degrees",
            "Current temperature in the requested units",
            temperature.clone(),
        );
        registry.register(
            "relative_humidity",
            "Current relative humidity (0-100)",
            relative_humidity.clone(),
        );
        registry.register(
            "wind_speed",
            "Current wind speed, m/s for metric and mph for imperial",
            wind_speed.clone(),
        );

        Self {
            requests,
            duration,
            temperature,
            relative_humidity,
            wind_speed,
            tracked_cities: Mutex::new(HashSet::new()),
            max_cities,
        }
    }

    /// Record the outcome and duration of a forecast request, `None` meaning success.
    pub fn request(&self, err: Option<&ClientError>, elapsed: Duration) {
        let outcome = Outcome::of(err);
        self.requests.get_or_create(&OutcomeLabels { outcome }).inc();
        self.duration.observe(elapsed.as_secs_f64());
    }

    /// Set condition gauges from the current conditions of a forecast.
    pub fn conditions(&self, current: &CurrentConditions, units: Units) {
        if !self.track_city(&current.location) {
            tracing::debug!(message = "city limit reached, skipping condition gauges", city = %current.location);
            return;
        }

        let with_units = CityUnitLabels {
            city: current.location.clone(),
            units: units.to_string(),
        };
        let city = CityLabels {
            city: current.location.clone(),
        };

        self.temperature.get_or_create(&with_units).set(current.temperature);
        self.wind_speed.get_or_create(&with_units).set(current.wind_speed);
        self.relative_humidity
            .get_or_create(&city)
            .set(f64::from(current.humidity));
    }

    /// True if the city already has gauges or there is room to add it.
    fn track_city(&self, city: &str) -> bool {
        let mut tracked = self.tracked_cities.lock().unwrap_or_else(|e| e.into_inner());
        if tracked.contains(city) {
            return true;
        }
        if tracked.len() >= self.max_cities {
            return false;
        }

        tracked.insert(city.to_owned());
        true
    }
}
