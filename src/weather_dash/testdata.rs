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

//! Forecast fixtures shared by unit tests.
//!
//! The fixture covers 40 three-hour periods starting at 2022-08-30 15:00 UTC for a city
//! two hours ahead of UTC, so local days run Tuesday 30 August to Sunday 4 September.

use crate::client::Forecast;
use serde_json::{json, Value};

pub const START: i64 = 1_661_871_600;
pub const STEP: i64 = 10_800;
pub const ENTRY_COUNT: usize = 40;

fn entry(i: usize) -> Value {
    let temp = 10.0 + (i % 8) as f64;
    let (main, description, icon) = if i == 0 {
        ("Rain", "light rain", "10d")
    } else if i % 2 == 0 {
        ("Clear", "clear sky", "01d")
    } else {
        ("Clouds", "broken clouds", "04n")
    };

    json!({
        "dt": START + STEP * i as i64,
        "main": {
            "temp": temp,
            "feels_like": temp - 1.5,
            "temp_min": temp - 0.5,
            "temp_max": temp + 0.5,
            "pressure": 1015,
            "humidity": 60 + i,
            "temp_kf": 0.0
        },
        "weather": [{"id": 500, "main": main, "description": description, "icon": icon}],
        "clouds": {"all": 40},
        "wind": {"speed": 2.5, "deg": 349, "gust": 3.1},
        "visibility": 10000,
        "pop": 0.2,
        "sys": {"pod": "d"},
        "dt_txt": "ignored"
    })
}

pub fn forecast_json() -> Value {
    let list: Vec<Value> = (0..ENTRY_COUNT).map(entry).collect();
    json!({
        "cod": "200",
        "message": 0,
        "cnt": ENTRY_COUNT,
        "list": list,
        "city": {
            "id": 3163858,
            "name": "Zocca",
            "coord": {"lat": 44.34, "lon": 10.99},
            "country": "IT",
            "population": 4593,
            "timezone": 7200,
            "sunrise": 1661834187,
            "sunset": 1661882248
        }
    })
}

pub fn forecast() -> Forecast {
    serde_json::from_value(forecast_json()).unwrap()
}
