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

//! Cosmetic state of the dashboard: backgrounds, dark and mobile modes, units and the
//! expanded forecast day.
//!
//! The page is rendered on the server so every toggle lives in the query string. Each
//! toggle produces the link for the opposite state.

use crate::client::Units;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Timelike, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

const DEFAULT_CONDITION_BACKGROUND: &str = "images/default.jpg";

/// Part of the day used to pick the page background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    /// Period at `now` in the given offset, or in server local time without one.
    pub fn at(now: DateTime<Utc>, offset: Option<FixedOffset>) -> Self {
        let hour = match offset {
            Some(o) => now.with_timezone(&o).hour(),
            None => now.with_timezone(&Local).hour(),
        };

        Self::from_hour(hour)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }

    pub fn background(&self) -> String {
        format!("photos/{}.jpg", self.name())
    }
}

/// Background image for the current conditions panel, by condition group (e.g. "Rain").
pub fn condition_background(main: &str) -> &'static str {
    match main.to_lowercase().as_str() {
        "clear" => "https://i.pinimg.com/originals/5a/40/37/5a4037c5df4438f2e087eadb3eee03f2.gif",
        "clouds" => "https://i.pinimg.com/originals/3e/4e/01/3e4e010869c36e5c1c47a5b203fb74ee.gif",
        "rain" => "https://i.pinimg.com/originals/fd/56/f3/fd56f3d41d32e49c1467e3feec899d91.gif",
        "snow" => "https://i.pinimg.com/originals/91/a9/b6/91a9b6cbae1175d06e70a07fc1e955f8.gif",
        "thunderstorm" => "https://i.pinimg.com/originals/dd/c4/db/ddc4dbaac7d7792927d96167f72473eb.gif",
        _ => DEFAULT_CONDITION_BACKGROUND,
    }
}

/// Viewer choices carried between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub units: Units,
    pub dark: bool,
    pub mobile: bool,
    pub expanded: Option<NaiveDate>,
}

impl Preferences {
    pub fn dark_mode_label(&self) -> &'static str {
        if self.dark {
            "Light Mode"
        } else {
            "Dark Mode"
        }
    }

    pub fn mobile_label(&self) -> &'static str {
        if self.mobile {
            "Desktop View"
        } else {
            "Mobile View"
        }
    }

    /// Label for switching to the other unit system
    pub fn units_label(&self) -> String {
        format!("Show {}", self.units.toggled().temperature_suffix())
    }

    pub fn body_classes(&self) -> String {
        let mut classes = Vec::new();
        if self.dark {
            classes.push("dark-mode");
        }
        if self.mobile {
            classes.push("mobile-mode");
        }
        classes.join(" ")
    }

    pub fn with_dark_toggled(&self) -> Self {
        Self { dark: !self.dark, ..*self }
    }

    pub fn with_mobile_toggled(&self) -> Self {
        Self {
            mobile: !self.mobile,
            ..*self
        }
    }

    pub fn with_units_toggled(&self) -> Self {
        Self {
            units: self.units.toggled(),
            ..*self
        }
    }

    /// Expand `date`, collapsing whichever day was open. Toggling the open day collapses it.
    pub fn with_day_toggled(&self, date: NaiveDate) -> Self {
        let expanded = if self.expanded == Some(date) { None } else { Some(date) };
        Self { expanded, ..*self }
    }

    /// Link to the dashboard for `city` with these preferences.
    pub fn href(&self, city: &str) -> String {
        let mut params = Vec::new();
        if !city.is_empty() {
            params.push(format!("city={}", utf8_percent_encode(city, NON_ALPHANUMERIC)));
        }
        params.push(format!("units={}", self.units));
        if let Some(day) = self.expanded {
            params.push(format!("day={}", day.format("%Y-%m-%d")));
        }
        if self.dark {
            params.push("dark=true".to_owned());
        }
        if self.mobile {
            params.push("mobile=true".to_owned());
        }

        format!("/?{}", params.join("&"))
    }
}
