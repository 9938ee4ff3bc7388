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

//! Server side HTML rendering of the dashboard page.

use crate::forecast::{format_temperature, format_wind, icon_url, round_half_up, Dashboard, DailySummary};
use crate::theme::{condition_background, DayPeriod, Preferences};
use maud::{html, Markup, PreEscaped, DOCTYPE};

pub const ERROR_MESSAGE: &str = "City not found or API error!";

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

const MAP_BOOTSTRAP: &str = r#"(function () {
  var cfg = JSON.parse(document.getElementById('map-config').textContent);
  var map = L.map('map').setView([cfg.center.lat, cfg.center.lon], cfg.zoom);
  L.tileLayer(cfg.base.url, { attribution: cfg.base.attribution }).addTo(map);
  L.marker([cfg.marker.lat, cfg.marker.lon]).addTo(map);
  var overlays = {};
  cfg.overlays.forEach(function (l) {
    overlays[l.name] = L.tileLayer(l.url, { attribution: l.attribution, maxZoom: l.max_zoom });
  });
  L.control.layers(null, overlays).addTo(map);
})();"#;

// Footer slides in while scrolling down and out while scrolling up
const FOOTER_SCRIPT: &str = r#"(function () {
  var last = 0;
  var footer = document.querySelector('.footer');
  window.addEventListener('scroll', function () {
    footer.style.bottom = window.scrollY > last ? '0' : '-50px';
    last = window.scrollY;
  });
})();"#;

/// Inputs for a single page render.
#[derive(Debug)]
pub struct PageModel<'a> {
    pub city: &'a str,
    pub prefs: Preferences,
    pub dashboard: Option<&'a Dashboard>,
    pub error: Option<&'a str>,
    pub period: DayPeriod,
}


pub fn render_page(page: &PageModel<'_>) -> Markup {
    let prefs = &page.prefs;

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (page_title(page)) }
                link rel="stylesheet" href="/style.css";
                @if page.dashboard.is_some() {
                    link rel="stylesheet" href=(LEAFLET_CSS);
                }
            }
            body class=(prefs.body_classes())
                style={
                    "background-image: url('" (page.period.background()) "'); background-repeat: no-repeat; "
                    "background-size: cover; transition: background-image 1s ease-in-out;"
                } {
                (render_controls(page))
                p.error-message {
                    @if let Some(error) = page.error {
                        (error)
                    }
                }
                @if let Some(dash) = page.dashboard {
                    (render_current(dash))
                    (render_forecast(dash, page.city, prefs))
                    (render_map(dash))
                }
                footer.footer {
                    p { "Weather data from OpenWeatherMap" }
                }
                script { (PreEscaped(FOOTER_SCRIPT)) }
            }
        }
    }
}

fn page_title(page: &PageModel<'_>) -> String {
    match page.dashboard {
        Some(dash) => format!("Weather: {}", dash.location),
        None => "Weather".to_owned(),
    }
}

fn render_controls(page: &PageModel<'_>) -> Markup {
    let prefs = &page.prefs;

    html! {
        header.controls {
            form method="get" action="/" {
                input #city name="city" type="text" placeholder="Enter city" value=(page.city);
                input type="hidden" name="units" value=(prefs.units.to_string());
                @if prefs.dark {
                    input type="hidden" name="dark" value="true";
                }
                @if prefs.mobile {
                    input type="hidden" name="mobile" value="true";
                }
                button type="submit" { "Search" }
            }
            a #"unit-toggle" href=(prefs.with_units_toggled().href(page.city)) { (prefs.units_label()) }
            a #"dark-mode-toggle" href=(prefs.with_dark_toggled().href(page.city)) { (prefs.dark_mode_label()) }
            a.toggle-mobile-mode href=(prefs.with_mobile_toggled().href(page.city)) { (prefs.mobile_label()) }
        }
    }
}

fn render_current(dash: &Dashboard) -> Markup {
    let current = &dash.current;
    let units = dash.units;

    html! {
        section.current-weather style={ "background-image: url('" (condition_background(&current.main)) "');" } {
            h2.location { (current.location) }
            p.weather-temp { (format_temperature(current.temperature, units)) }
            p.feels-like-temp { "Feels Like: " (format_temperature(current.feels_like, units)) }
            p.weather-desc { (current.description) }
            div.weather-icon {
                img src=(icon_url(&current.icon, true)) alt=(current.description);
            }
            div.humidity {
                h4 { "Humidity" }
                p { (current.humidity) "%" }
            }
            div.wind-speed {
                h4 { "Wind Speed" }
                p { (format_wind(current.wind_speed, units)) }
            }
        }
    }
}

fn render_forecast(dash: &Dashboard, city: &str, prefs: &Preferences) -> Markup {
    html! {
        section.forecast {
            div.forecast-container {
                @for day in &dash.days {
                    (render_day(dash, day, city, prefs))
                }
            }
        }
    }
}

fn render_day(dash: &Dashboard, day: &DailySummary, city: &str, prefs: &Preferences) -> Markup {
    let unit = dash.units.temperature_suffix();
    let active = prefs.expanded == Some(day.date);

    html! {
        a.day-card.active[active] href=(prefs.with_day_toggled(day.date).href(city)) {
            h3.day-name { (day.weekday()) }
            p.day-temp { (round_half_up(day.min_temp)) (unit) " / " (round_half_up(day.max_temp)) (unit) }
            img.day-icon src=(icon_url(&day.icon, true)) alt=(day.description);
            p.day-description { (day.description) }
            @if active {
                div.hourly-forecast {
                    @for hour in &day.hours {
                        div.hour-card {
                            span { (hour.label()) }
                            img src=(icon_url(&hour.icon, false)) alt=(hour.description);
                            span { (format_temperature(hour.temperature, dash.units)) }
                        }
                    }
                }
            }
        }
    }
}

fn render_map(dash: &Dashboard) -> Markup {
    let config = match dash.map.to_json() {
        // A literal "</" would end the script element early
        Ok(json) => Some(json.replace("</", "<\\/")),
        Err(e) => {
            tracing::error!(message = "unable to encode map configuration", error = %e);
            None
        }
    };

    html! {
        section.map-section {
            div #map {}
            noscript {
                img.map-preview src=(dash.map.preview_url()) alt={ "Map of " (dash.location) };
            }
            @if let Some(json) = config {
                script #"map-config" type="application/json" { (PreEscaped(json)) }
                script src=(LEAFLET_JS) {}
                script { (PreEscaped(MAP_BOOTSTRAP)) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Units;
    use crate::testdata;
    use chrono::NaiveDate;

    fn dashboard(units: Units) -> Dashboard {
        Dashboard::build(&testdata::forecast(), units, "https://tile.example.com", "k").unwrap()
    }

    fn page<'a>(dash: Option<&'a Dashboard>, prefs: Preferences, error: Option<&'a str>) -> PageModel<'a> {
        PageModel {
            city: "Zocca",
            prefs,
            dashboard: dash,
            error,
            period: DayPeriod::Evening,
        }
    }

    fn render(page: &PageModel<'_>) -> String {
        render_page(page).into_string()
    }

    #[test]
    fn test_render_current_conditions() {
        let dash = dashboard(Units::Metric);
        let html = render(&page(Some(&dash), Preferences::default(), None));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h2 class=\"location\">Zocca</h2>"));
        assert!(html.contains("<p class=\"weather-temp\">10°C</p>"));
        assert!(html.contains("Feels Like: 9°C"));
        assert!(html.contains("<p class=\"weather-desc\">Light Rain</p>"));
        assert!(html.contains("https://openweathermap.org/img/wn/10d@2x.png"));
        assert!(html.contains("<p>60%</p>"));
        assert!(html.contains("<p>9 km/h</p>"));
        assert!(html.contains("fd56f3d41d32e49c1467e3feec899d91.gif"));
        assert!(html.contains("photos/evening.jpg"));
        assert!(html.contains("<p class=\"error-message\"></p>"));
    }

    #[test]
    fn test_render_imperial_units() {
        let dash = dashboard(Units::Imperial);
        let prefs = Preferences {
            units: Units::Imperial,
            ..Preferences::default()
        };
        let html = render(&page(Some(&dash), prefs, None));

        assert!(html.contains("<p class=\"weather-temp\">10°F</p>"));
        assert!(html.contains("<p>3 mph</p>"));
        assert!(html.contains("Show °C"));
    }

    #[test]
    fn test_render_day_cards_collapsed() {
        let dash = dashboard(Units::Metric);
        let html = render(&page(Some(&dash), Preferences::default(), None));

        assert_eq!(6, html.matches("class=\"day-card").count());
        assert_eq!(0, html.matches("day-card active").count());
        assert!(!html.contains("hourly-forecast"));
        assert!(html.contains("<h3 class=\"day-name\">Tuesday</h3>"));
        assert!(html.contains("<p class=\"day-temp\">10°C / 13°C</p>"));
        assert!(html.contains("<p class=\"day-description\">light rain</p>"));
        assert!(html.contains("href=\"/?city=Zocca&amp;units=metric&amp;day=2022-08-30\""));
    }

    #[test]
    fn test_render_expanded_day() {
        let dash = dashboard(Units::Metric);
        let tuesday = NaiveDate::from_ymd_opt(2022, 8, 30).unwrap();
        let prefs = Preferences::default().with_day_toggled(tuesday);
        let html = render(&page(Some(&dash), prefs, None));

        assert_eq!(1, html.matches("day-card active").count());
        assert_eq!(3, html.matches("class=\"hour-card\"").count());
        assert!(html.contains("<span>5:00 PM</span>"));
        assert!(html.contains("https://openweathermap.org/img/wn/10d.png"));
        assert!(html.contains("<span>12°C</span>"));
        // Clicking the open card collapses it
        assert!(html.contains("<a class=\"day-card active\" href=\"/?city=Zocca&amp;units=metric\">"));
    }

    #[test]
    fn test_render_error_without_dashboard() {
        let html = render(&page(None, Preferences::default(), Some(ERROR_MESSAGE)));

        assert!(html.contains("<p class=\"error-message\">City not found or API error!</p>"));
        assert!(!html.contains("current-weather"));
        assert!(!html.contains("id=\"map\""));
        assert!(!html.contains("leaflet"));
        assert!(html.contains("class=\"footer\""));
        assert!(html.contains("-50px"));
    }

    #[test]
    fn test_render_toggles() {
        let prefs = Preferences {
            dark: true,
            ..Preferences::default()
        };
        let html = render(&page(None, prefs, None));

        assert!(html.contains("<body class=\"dark-mode\""));
        assert!(html.contains(">Light Mode</a>"));
        assert!(html.contains(">Mobile View</a>"));
        assert!(html.contains("<input type=\"hidden\" name=\"dark\" value=\"true\">"));
        assert!(html.contains("href=\"/?city=Zocca&amp;units=metric&amp;dark=true&amp;mobile=true\""));
    }

    #[test]
    fn test_render_escapes_city() {
        let mut model = page(None, Preferences::default(), None);
        model.city = "<script>alert(1)</script>";
        let html = render(&model);

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("value=\"&lt;script&gt;alert(1)&lt;/script&gt;\""));
    }

    #[test]
    fn test_render_escapes_descriptions() {
        let mut dash = dashboard(Units::Metric);
        dash.current.description = "Clear \"Sky\" & <Sun>".to_owned();
        let html = render(&page(Some(&dash), Preferences::default(), None));

        assert!(html.contains("<p class=\"weather-desc\">Clear &quot;Sky&quot; &amp; &lt;Sun&gt;</p>"));
        assert!(html.contains("alt=\"Clear &quot;Sky&quot; &amp; &lt;Sun&gt;\""));
    }

    #[test]
    fn test_render_map_config() {
        let dash = dashboard(Units::Metric);
        let html = render(&page(Some(&dash), Preferences::default(), None));

        assert!(html.contains("<div id=\"map\"></div>"));
        assert!(html.contains("<script id=\"map-config\" type=\"application/json\">"));
        assert!(html.contains("clouds_new"));
        assert!(html.contains("OpenStreetMap<\\/a>"));
        assert!(!html.contains("OpenStreetMap</a>"));
        assert!(html.contains(LEAFLET_JS));
        assert!(html.contains("L.control.layers"));
    }
}
