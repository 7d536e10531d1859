//! Locality map view state.

use std::path::Path;

use serde::Serialize;

use crate::error::{QrMagicError, QrResult};
use crate::localities::model::{load_localities, Bounds, Locality, LocalityMap};

/// Tile source for the map background.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Basemap {
    #[default]
    Osm,
    Terrain,
}

impl Basemap {
    /// Leaflet-style tile URL template.
    pub fn tile_url(&self) -> &'static str {
        match self {
            Basemap::Osm => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            Basemap::Terrain => {
                "https://stamen-tiles-{s}.a.ssl.fastly.net/terrain-background/{z}/{x}/{y}{r}.png"
            }
        }
    }

    pub fn subdomains(&self) -> &'static str {
        match self {
            Basemap::Osm => "abc",
            Basemap::Terrain => "abcd",
        }
    }

    pub fn max_zoom(&self) -> u8 {
        match self {
            Basemap::Osm => 19,
            Basemap::Terrain => 18,
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            Basemap::Osm => "© OpenStreetMap contributors",
            Basemap::Terrain => "Map tiles by Stamen Design, CC BY 3.0. Map data © OpenStreetMap contributors",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Basemap::Osm => Basemap::Terrain,
            Basemap::Terrain => Basemap::Osm,
        }
    }
}

/// How the screen is split between the map and the locality table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelLayout {
    #[default]
    Full,
    Half,
    None,
}

impl PanelLayout {
    /// Map height as a percentage of the viewport; `None` when hidden.
    pub fn map_height(&self) -> Option<u8> {
        match self {
            PanelLayout::Full => Some(90),
            PanelLayout::Half => Some(60),
            PanelLayout::None => None,
        }
    }

    /// Maximum table height as a percentage of the viewport.
    pub fn table_height(&self) -> u8 {
        100 - self.map_height().unwrap_or(0)
    }
}

/// Map viewer state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MapView {
    localities: LocalityMap,
    pub basemap: Basemap,
    pub panel: PanelLayout,
    current: Option<String>,
}

impl MapView {
    pub fn new(localities: LocalityMap) -> Self {
        Self {
            localities,
            ..Default::default()
        }
    }

    pub fn from_file(path: &Path) -> QrResult<Self> {
        Ok(Self::new(load_localities(path)?))
    }

    pub fn localities(&self) -> impl Iterator<Item = &Locality> {
        self.localities.values()
    }

    pub fn len(&self) -> usize {
        self.localities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.localities.is_empty()
    }

    /// Area to fit the map to, covering every locality.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(self.localities.values().map(Locality::position))
    }

    /// Make `name` the current locality and shrink the map to show its details.
    pub fn select(&mut self, name: &str) -> QrResult<&Locality> {
        let locality = self
            .localities
            .get(name)
            .ok_or_else(|| QrMagicError::UnknownLocality(name.to_string()))?;
        self.current = Some(name.to_string());
        self.panel = PanelLayout::Half;
        Ok(locality)
    }

    pub fn current(&self) -> Option<&Locality> {
        self.current.as_deref().and_then(|name| self.localities.get(name))
    }

    pub fn toggle_basemap(&mut self) -> Basemap {
        self.basemap = self.basemap.toggled();
        self.basemap
    }

    pub fn set_panel(&mut self, panel: PanelLayout) {
        self.panel = panel;
    }
}
