//! Locality map viewer model.

pub mod model;
pub mod view;

pub use model::{load_localities, parse_localities, Bounds, ImageSet, Individual, Locality, LocalityMap};
pub use view::{Basemap, MapView, PanelLayout};
