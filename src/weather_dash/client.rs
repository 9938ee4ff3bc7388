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

use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::error;
use std::fmt;
use std::str::FromStr;

#[derive(Debug)]
pub enum ClientError {
    /// Transport or decoding failure. The request URL is stripped since it contains the API key.
    Internal(reqwest::Error),
    InvalidBaseUrl(String),
    InvalidCity(String),
    EmptyForecast(String),
    Unexpected(StatusCode, Url),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(e) => write!(f, "{}", e),
            Self::InvalidBaseUrl(u) => write!(f, "invalid base URL {}", u),
            Self::InvalidCity(c) => write!(f, "invalid city {}", c),
            Self::EmptyForecast(c) => write!(f, "empty forecast for city {}", c),
            Self::Unexpected(status, url) => write!(f, "unexpected status {} for {}", status, url),
        }
    }
}

impl error::Error for ClientError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Internal(e) => Some(e),
            _ => None,
        }
    }
}

/// Measurement system requested from the API and used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the `units` query parameter for the forecast API.
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            other => Err(format!("unknown units '{}', expected 'metric' or 'imperial'", other)),
        }
    }
}

/// Client for the OpenWeatherMap 5 day / 3 hour forecast API.
#[derive(Debug)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl TryFrom<String> for Units {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl ClientError {
    fn internal(e: reqwest::Error) -> Self {
        Self::Internal(e.without_url())
    }
}

impl OpenWeatherClient {
    const USER_AGENT: &'static str = concat!("weather_dash/", env!("CARGO_PKG_VERSION"));
    const JSON_RESPONSE: &'static str = "application/json";
    const API_KEY_PARAM: &'static str = "appid";

    pub fn new(client: Client, base_url: &str, api_key: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(OpenWeatherClient {
            client,
            base_url,
            api_key: api_key.to_owned(),
        })
    }

    /// Fetch the forecast for a city by name, in the given units.
    ///
    /// A successful response without any forecast entries is treated as an error since
    /// current conditions are derived from the first entry.
    pub async fn forecast(&self, city: &str, units: Units) -> Result<Forecast, ClientError> {
        let request_url = self.forecast_url(city, units);
        tracing::debug!(message = "making forecast request", url = %redact(&request_url));

        let res = self.make_request(city, request_url).await?;
        let forecast = res.json::<Forecast>().await.map_err(ClientError::internal)?;
        if forecast.list.is_empty() {
            return Err(ClientError::EmptyForecast(city.to_owned()));
        }

        Ok(forecast)
    }

    async fn make_request<S: Into<String>>(&self, city: S, url: Url) -> Result<Response, ClientError> {
        let res = self
            .client
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, Self::USER_AGENT)
            .header(reqwest::header::ACCEPT, Self::JSON_RESPONSE)
            .send()
            .await
            .map_err(ClientError::internal)?;

        let status = res.status();
        if status == StatusCode::OK {
            Ok(res)
        } else if status == StatusCode::NOT_FOUND {
            Err(ClientError::InvalidCity(city.into()))
        } else {
            Err(ClientError::Unexpected(status, redact(&url)))
        }
    }

    fn forecast_url(&self, city: &str, units: Units) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut p) = url.path_segments_mut() {
            p.pop_if_empty().push("forecast");
        }

        url.query_pairs_mut()
            .append_pair("q", city)
            .append_pair(Self::API_KEY_PARAM, &self.api_key)
            .append_pair("units", units.as_query());
        url
    }
}

/// Copy of the URL with the API key replaced so that it can be logged or displayed.
fn redact(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == OpenWeatherClient::API_KEY_PARAM {
                (k.into_owned(), "REDACTED".to_owned())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    let mut out = url.clone();
    out.query_pairs_mut().clear().extend_pairs(pairs);
    out
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Forecast {
    pub list: Vec<ForecastEntry>,
    pub city: City,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ForecastEntry {
    /// Unix timestamp, in seconds, of the forecast period
    pub dt: i64,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub wind: Wind,
    /// Probability of precipitation (0-1)
    #[serde(default)]
    pub pop: Option<f64>,
}

impl ForecastEntry {
    /// The primary weather condition for this entry, if the API returned any.
    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Condition {
    #[serde(default)]
    pub id: Option<u32>,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<f64>,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct City {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    pub coord: Coord,
    #[serde(default)]
    pub country: Option<String>,
    /// Offset from UTC in seconds
    #[serde(default)]
    pub timezone: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}
