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

//! Description of the interactive map shown next to a forecast.
//!
//! Rendering is left to Leaflet in the browser. This module only decides which tile
//! layers exist, where they come from, and where the view is centred. The result is
//! serialized to JSON and handed to the page's map bootstrap.

use crate::client::Coord;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Serialize;
use std::f64::consts::PI;

pub const DEFAULT_ZOOM: u8 = 10;
pub const OVERLAY_MAX_ZOOM: u8 = 18;

/// Deepest zoom level any common tile server publishes
pub const MAX_TILE_ZOOM: u8 = 24;

/// Largest latitude representable in Web Mercator
const MAX_LATITUDE: f64 = 85.0511;

const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str =
    "Map data © <a href=\"https://www.openstreetmap.org/\">OpenStreetMap</a> contributors";
const OWM_ATTRIBUTION: &str = "Weather data © <a href=\"https://openweathermap.org/\">OpenWeatherMap</a>";

/// Weather overlays available from the OpenWeatherMap tile server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherLayer {
    Clouds,
    Temperature,
    Precipitation,
}

impl WeatherLayer {
    pub const ALL: [WeatherLayer; 3] = [Self::Clouds, Self::Temperature, Self::Precipitation];

    /// Name shown in the layer switcher
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clouds => "Clouds",
            Self::Temperature => "Temperature",
            Self::Precipitation => "Precipitation",
        }
    }

    /// Layer identifier used in tile URLs
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Clouds => "clouds_new",
            Self::Temperature => "temp_new",
            Self::Precipitation => "precipitation_new",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<u8>,
}

impl TileLayer {
    fn base() -> Self {
        TileLayer {
            name: "OpenStreetMap".to_owned(),
            url: OSM_TILE_URL.to_owned(),
            attribution: OSM_ATTRIBUTION.to_owned(),
            max_zoom: None,
        }
    }

    fn weather(layer: WeatherLayer, tile_base: &str, api_key: &str) -> Self {
        let key = utf8_percent_encode(api_key, NON_ALPHANUMERIC);
        TileLayer {
            name: layer.name().to_owned(),
            url: format!(
                "{}/map/{}/{{z}}/{{x}}/{{y}}.png?appid={}",
                tile_base.trim_end_matches('/'),
                layer.slug(),
                key
            ),
            attribution: OWM_ATTRIBUTION.to_owned(),
            max_zoom: Some(OVERLAY_MAX_ZOOM),
        }
    }

    /// Concrete URL of a single tile of this layer. Subdomain templates use `a`.
    pub fn tile_url(&self, tile: TileCoord) -> String {
        self.url
            .replace("{s}", "a")
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

/// Web Mercator ("slippy map") tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    /// Tile at zoom `z` containing the given point. Latitudes beyond the projection
    /// limit are clamped to the edge rows and zoom is capped at `MAX_TILE_ZOOM`.
    pub fn from_lat_lon(lat: f64, lon: f64, z: u8) -> Self {
        let z = z.min(MAX_TILE_ZOOM);
        let n = f64::from(1u32 << z);
        let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let lon = lon.clamp(-180.0, 180.0);

        let x = ((lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

        let max = n - 1.0;
        TileCoord {
            x: x.clamp(0.0, max) as u32,
            y: y.clamp(0.0, max) as u32,
            z,
        }
    }
}

/// Everything the page needs to draw the map for a city.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapOverlay {
    pub center: Coord,
    pub zoom: u8,
    pub marker: Coord,
    pub base: TileLayer,
    pub overlays: Vec<TileLayer>,
    pub preview: TileCoord,
}

impl MapOverlay {
    pub fn new(center: Coord, tile_base: &str, api_key: &str) -> Self {
        let overlays = WeatherLayer::ALL
            .iter()
            .map(|l| TileLayer::weather(*l, tile_base, api_key))
            .collect();

        MapOverlay {
            center,
            zoom: DEFAULT_ZOOM,
            marker: center,
            base: TileLayer::base(),
            overlays,
            preview: TileCoord::from_lat_lon(center.lat, center.lon, DEFAULT_ZOOM),
        }
    }

    /// Base layer tile under the map centre, for clients without scripting.
    pub fn preview_url(&self) -> String {
        self.base.tile_url(self.preview)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: Coord = Coord {
        lat: 51.5074,
        lon: -0.1278,
    };

    #[test]
    fn test_tile_coord_origin() {
        assert_eq!(TileCoord { x: 0, y: 0, z: 0 }, TileCoord::from_lat_lon(0.0, 0.0, 0));
        assert_eq!(TileCoord { x: 1, y: 1, z: 1 }, TileCoord::from_lat_lon(0.0, 0.0, 1));
    }

    #[test]
    fn test_tile_coord_known_cities() {
        assert_eq!(TileCoord { x: 511, y: 340, z: 10 }, TileCoord::from_lat_lon(51.5074, -0.1278, 10));
        assert_eq!(TileCoord { x: 942, y: 614, z: 10 }, TileCoord::from_lat_lon(-33.8688, 151.2093, 10));
    }

    #[test]
    fn test_tile_coord_clamps_extremes() {
        assert_eq!(TileCoord { x: 4, y: 0, z: 3 }, TileCoord::from_lat_lon(90.0, 0.0, 3));
        assert_eq!(TileCoord { x: 7, y: 7, z: 3 }, TileCoord::from_lat_lon(-90.0, 180.0, 3));
    }

    #[test]
    fn test_tile_coord_caps_zoom() {
        let tile = TileCoord::from_lat_lon(51.5074, -0.1278, 40);
        assert_eq!(MAX_TILE_ZOOM, tile.z);
        assert_eq!(TileCoord::from_lat_lon(51.5074, -0.1278, MAX_TILE_ZOOM), tile);

        let tile = TileCoord::from_lat_lon(-90.0, 180.0, u8::MAX);
        assert_eq!((1u32 << MAX_TILE_ZOOM) - 1, tile.x);
        assert_eq!((1u32 << MAX_TILE_ZOOM) - 1, tile.y);
    }

    #[test]
    fn test_overlay_layers() {
        let overlay = MapOverlay::new(LONDON, "https://tile.example.com/", "abc 123");

        assert_eq!(DEFAULT_ZOOM, overlay.zoom);
        assert_eq!(LONDON, overlay.marker);
        let names: Vec<&str> = overlay.overlays.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(vec!["Clouds", "Temperature", "Precipitation"], names);

        let clouds = &overlay.overlays[0];
        assert_eq!(
            "https://tile.example.com/map/clouds_new/{z}/{x}/{y}.png?appid=abc%20123",
            clouds.url
        );
        assert_eq!(Some(OVERLAY_MAX_ZOOM), clouds.max_zoom);
        assert_eq!(None, overlay.base.max_zoom);
    }

    #[test]
    fn test_preview_url() {
        let overlay = MapOverlay::new(LONDON, "https://tile.example.com", "k");
        assert_eq!("https://a.tile.openstreetmap.org/10/511/340.png", overlay.preview_url());
    }

    #[test]
    fn test_json_shape() {
        let overlay = MapOverlay::new(LONDON, "https://tile.example.com", "k");
        let value: serde_json::Value = serde_json::from_str(&overlay.to_json().unwrap()).unwrap();

        assert_eq!(10, value["zoom"]);
        assert_eq!(51.5074, value["center"]["lat"]);
        assert_eq!(3, value["overlays"].as_array().unwrap().len());
        assert!(value["base"].get("max_zoom").is_none());
    }
}
