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

//! Turn a raw forecast response into the values shown on the dashboard.

use crate::client::{Condition, Forecast, ForecastEntry, Units};
use crate::map::MapOverlay;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::Serialize;

/// Maximum number of day cards built from a forecast
pub const MAX_FORECAST_DAYS: usize = 8;

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn/";

/// Round to the nearest integer with exact halves going toward positive infinity.
pub fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// Upper-case the first character of each space separated word.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_temperature(v: f64, units: Units) -> String {
    format!("{}{}", round_half_up(v), units.temperature_suffix())
}

/// Format a wind speed as reported by the API: m/s for metric (shown as km/h) and
/// mph for imperial.
pub fn format_wind(speed: f64, units: Units) -> String {
    match units {
        Units::Metric => format!("{} km/h", round_half_up(speed * 3.6)),
        Units::Imperial => format!("{} mph", round_half_up(speed)),
    }
}

pub fn icon_url(icon: &str, large: bool) -> String {
    if large {
        format!("{}{}@2x.png", ICON_BASE_URL, icon)
    } else {
        format!("{}{}.png", ICON_BASE_URL, icon)
    }
}

/// Fixed offset for a city from the `timezone` field of the response. Offsets chrono
/// can't represent fall back to UTC.
pub fn city_offset(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| {
        tracing::warn!(message = "invalid UTC offset for city, using UTC", offset_secs = seconds);
        Utc.fix()
    })
}

fn local_time(dt: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    offset.timestamp_opt(dt, 0).single()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrentConditions {
    pub location: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u32,
    pub wind_speed: f64,
    /// Title cased description, e.g. "Light Rain"
    pub description: String,
    pub icon: String,
    /// Condition group such as "Rain" or "Clouds"
    pub main: String,
}

impl CurrentConditions {
    /// Current conditions are the first entry of the forecast. Returns `None` for an
    /// empty forecast.
    pub fn from_forecast(forecast: &Forecast) -> Option<Self> {
        let first = forecast.list.first()?;
        let condition = first.condition().cloned().unwrap_or_default();

        Some(CurrentConditions {
            location: forecast.city.name.clone(),
            temperature: first.main.temp,
            feels_like: first.main.feels_like,
            humidity: first.main.humidity,
            wind_speed: first.wind.speed,
            description: title_case(&condition.description),
            icon: condition.icon,
            main: condition.main,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HourlyEntry {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub description: String,
    pub icon: String,
}

impl HourlyEntry {
    /// Time of day in the style "3:00 PM"
    pub fn label(&self) -> String {
        self.time.format("%-I:%M %p").to_string()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub min_temp: f64,
    pub max_temp: f64,
    pub description: String,
    pub icon: String,
    pub hours: Vec<HourlyEntry>,
}

impl DailySummary {
    fn start(date: NaiveDate, entry: &ForecastEntry, condition: &Condition) -> Self {
        DailySummary {
            date,
            min_temp: entry.main.temp_min,
            max_temp: entry.main.temp_max,
            description: condition.description.clone(),
            icon: condition.icon.clone(),
            hours: Vec::new(),
        }
    }

    /// Full weekday name, e.g. "Tuesday"
    pub fn weekday(&self) -> String {
        self.date.format("%A").to_string()
    }
}

/// Group forecast entries into local calendar days, in the order they first appear.
///
/// Minimum and maximum temperatures are taken across all entries of a day while the
/// description and icon come from the first entry of the day. No more than
/// `MAX_FORECAST_DAYS` days are returned.
pub fn group_by_day(entries: &[ForecastEntry], offset: FixedOffset) -> Vec<DailySummary> {
    let mut days: Vec<DailySummary> = Vec::new();

    for entry in entries {
        let local = match local_time(entry.dt, offset) {
            Some(t) => t.naive_local(),
            None => {
                tracing::warn!(message = "skipping forecast entry with invalid timestamp", dt = entry.dt);
                continue;
            }
        };

        let date = local.date();
        let condition = entry.condition().cloned().unwrap_or_default();

        let idx = match days.iter().position(|d| d.date == date) {
            Some(idx) => idx,
            None if days.len() < MAX_FORECAST_DAYS => {
                days.push(DailySummary::start(date, entry, &condition));
                days.len() - 1
            }
            None => continue,
        };

        let day = &mut days[idx];
        day.min_temp = day.min_temp.min(entry.main.temp_min);
        day.max_temp = day.max_temp.max(entry.main.temp_max);

        day.hours.push(HourlyEntry {
            time: local,
            temperature: entry.main.temp,
            description: condition.description,
            icon: condition.icon,
        });
    }

    days
}

/// Everything displayed for a single city.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dashboard {
    pub location: String,
    pub units: Units,
    pub utc_offset_secs: i32,
    pub current: CurrentConditions,
    pub days: Vec<DailySummary>,
    pub map: MapOverlay,
}

impl Dashboard {
    /// Build the dashboard from a forecast. Returns `None` when the forecast has no entries.
    pub fn build(forecast: &Forecast, units: Units, tile_base: &str, api_key: &str) -> Option<Self> {
        let current = CurrentConditions::from_forecast(forecast)?;
        let offset = city_offset(forecast.city.timezone);

        Some(Dashboard {
            location: forecast.city.name.clone(),
            units,
            utc_offset_secs: offset.local_minus_utc(),
            current,
            days: group_by_day(&forecast.list, offset),
            map: MapOverlay::new(forecast.city.coord, tile_base, api_key),
        })
    }

    /// Offset of the city's local time from UTC
    pub fn offset(&self) -> FixedOffset {
        city_offset(self.utc_offset_secs)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DailySummary> {
        self.days.iter().find(|d| d.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(3, round_half_up(2.5));
        assert_eq!(-2, round_half_up(-2.5));
        assert_eq!(2, round_half_up(2.49));
        assert_eq!(-3, round_half_up(-2.51));
        assert_eq!(0, round_half_up(-0.4));
    }

    #[test]
    fn test_title_case() {
        assert_eq!("Light Rain", title_case("light rain"));
        assert_eq!("Overcast Clouds", title_case("overcast clouds"));
        assert_eq!("A  B", title_case("a  b"));
        assert_eq!("", title_case(""));
        assert_eq!("ÉClair", title_case("éClair"));
    }

    #[test]
    fn test_format_temperature_and_wind() {
        assert_eq!("21°C", format_temperature(20.5, Units::Metric));
        assert_eq!("-3°F", format_temperature(-3.2, Units::Imperial));
        assert_eq!("9 km/h", format_wind(2.5, Units::Metric));
        assert_eq!("6 mph", format_wind(5.5, Units::Imperial));
    }

    #[test]
    fn test_icon_url() {
        assert_eq!("https://openweathermap.org/img/wn/10d@2x.png", icon_url("10d", true));
        assert_eq!("https://openweathermap.org/img/wn/10d.png", icon_url("10d", false));
    }

    #[test]
    fn test_current_conditions() {
        let current = CurrentConditions::from_forecast(&testdata::forecast()).unwrap();

        assert_eq!("Zocca", current.location);
        assert_eq!(10.0, current.temperature);
        assert_eq!(8.5, current.feels_like);
        assert_eq!(60, current.humidity);
        assert_eq!(2.5, current.wind_speed);
        assert_eq!("Light Rain", current.description);
        assert_eq!("10d", current.icon);
        assert_eq!("Rain", current.main);
    }

    #[test]
    fn test_current_conditions_empty() {
        let mut forecast = testdata::forecast();
        forecast.list.clear();
        assert!(CurrentConditions::from_forecast(&forecast).is_none());
    }

    #[test]
    fn test_group_by_day_local_dates() {
        let forecast = testdata::forecast();
        let days = group_by_day(&forecast.list, city_offset(forecast.city.timezone));

        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(
            vec![
                date(2022, 8, 30),
                date(2022, 8, 31),
                date(2022, 9, 1),
                date(2022, 9, 2),
                date(2022, 9, 3),
                date(2022, 9, 4),
            ],
            dates
        );

        let counts: Vec<usize> = days.iter().map(|d| d.hours.len()).collect();
        assert_eq!(vec![3, 8, 8, 8, 8, 5], counts);
        assert_eq!(testdata::ENTRY_COUNT, counts.iter().sum::<usize>());
    }

    #[test]
    fn test_group_by_day_min_max_and_first_condition() {
        let forecast = testdata::forecast();
        let days = group_by_day(&forecast.list, city_offset(forecast.city.timezone));

        let first = &days[0];
        assert_eq!("Tuesday", first.weekday());
        assert_eq!(9.5, first.min_temp);
        assert_eq!(12.5, first.max_temp);
        assert_eq!("light rain", first.description);
        assert_eq!("10d", first.icon);

        let second = &days[1];
        assert_eq!("Wednesday", second.weekday());
        assert_eq!(9.5, second.min_temp);
        assert_eq!(17.5, second.max_temp);
        assert_eq!("broken clouds", second.description);
        assert_eq!("04n", second.icon);
    }

    #[test]
    fn test_group_by_day_hours_are_local() {
        let forecast = testdata::forecast();
        let days = group_by_day(&forecast.list, city_offset(forecast.city.timezone));

        let labels: Vec<String> = days[0].hours.iter().map(|h| h.label()).collect();
        assert_eq!(vec!["5:00 PM", "8:00 PM", "11:00 PM"], labels);
        assert_eq!("2:00 AM", days[1].hours[0].label());
    }

    #[test]
    fn test_group_by_day_utc() {
        let forecast = testdata::forecast();
        let days = group_by_day(&forecast.list, city_offset(0));

        // 15:00, 18:00, 21:00 UTC on the first day
        assert_eq!(3, days[0].hours.len());
        assert_eq!("3:00 PM", days[0].hours[0].label());
        assert_eq!(date(2022, 9, 4), days.last().unwrap().date);
    }

    #[test]
    fn test_group_by_day_limit() {
        let forecast = testdata::forecast();
        // Repeat each day's worth of entries well past the limit by spreading them a day apart
        let entries: Vec<ForecastEntry> = (0..12)
            .map(|i| {
                let mut e = forecast.list[0].clone();
                e.dt = testdata::START + i * 86_400;
                e
            })
            .collect();

        let days = group_by_day(&entries, city_offset(0));
        assert_eq!(MAX_FORECAST_DAYS, days.len());
        assert_eq!(date(2022, 9, 6), days.last().unwrap().date);
    }

    #[test]
    fn test_group_by_day_missing_condition() {
        let mut forecast = testdata::forecast();
        forecast.list.truncate(1);
        forecast.list[0].weather.clear();

        let days = group_by_day(&forecast.list, city_offset(0));
        assert_eq!(1, days.len());
        assert_eq!("", days[0].description);
    }

    #[test]
    fn test_city_offset_invalid() {
        assert_eq!(0, city_offset(200_000).local_minus_utc());
        assert_eq!(-18_000, city_offset(-18_000).local_minus_utc());
    }

    #[test]
    fn test_dashboard_build() {
        let dash = Dashboard::build(&testdata::forecast(), Units::Imperial, "https://tile.example.com", "k").unwrap();

        assert_eq!("Zocca", dash.location);
        assert_eq!(Units::Imperial, dash.units);
        assert_eq!(7200, dash.utc_offset_secs);
        assert_eq!(6, dash.days.len());
        assert_eq!(44.34, dash.map.center.lat);
        assert!(dash.day(date(2022, 9, 1)).is_some());
        assert!(dash.day(date(2022, 9, 30)).is_none());
    }
}
