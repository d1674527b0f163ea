//! Navigation mesh places as consumed by the map control engine.
//!
//! Parsing the mesh file is done elsewhere, this only needs the areas with their corners and
//! the place they belong to.

use crate::source::Vector3;

/// Hammer units are inches.
const METERS_PER_UNIT: f32 = 0.0254;

#[derive(Debug, Clone, PartialEq)]
pub struct NavArea {
    pub id: u32,
    pub place: Option<String>,
    pub south_west: Vector3,
    pub north_east: Vector3,
}

impl NavArea {
    /// Footprint in squared game units, slopes are not accounted for.
    pub fn rough_units(&self) -> f32 {
        ((self.north_east.x - self.south_west.x) * (self.north_east.y - self.south_west.y)).abs()
    }

    pub fn center(&self) -> Vector3 {
        Vector3::new(
            (self.south_west.x + self.north_east.x) / 2.0,
            (self.south_west.y + self.north_east.y) / 2.0,
            (self.south_west.z + self.north_east.z) / 2.0,
        )
    }

    fn contains_2d(&self, point: &Vector3) -> bool {
        let (min_x, max_x) = min_max(self.south_west.x, self.north_east.x);
        let (min_y, max_y) = min_max(self.south_west.y, self.north_east.y);
        (min_x..=max_x).contains(&point.x) && (min_y..=max_y).contains(&point.y)
    }
}

fn min_max(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub trait PlaceGraph {
    fn place_names(&self) -> Vec<&str>;

    fn areas(&self, place: &str) -> Option<&[NavArea]>;

    /// The place of the area containing `point`, falling back to the nearest area.
    fn place_at(&self, point: &Vector3) -> Option<&str>;
}

#[derive(Debug, Clone, Default)]
pub struct NavMesh {
    areas: Vec<NavArea>,
    places: std::collections::BTreeMap<String, Vec<NavArea>>,
}

impl NavMesh {
    pub fn new(areas: Vec<NavArea>) -> Self {
        let mut places: std::collections::BTreeMap<String, Vec<NavArea>> =
            std::collections::BTreeMap::new();
        for area in areas.iter() {
            if let Some(place) = area.place.as_ref().filter(|p| !p.is_empty()) {
                places.entry(place.clone()).or_default().push(area.clone());
            }
        }

        Self { areas, places }
    }

    fn area_at(&self, point: &Vector3) -> Option<&NavArea> {
        let contained = self
            .areas
            .iter()
            .filter(|a| a.contains_2d(point))
            .min_by(|a, b| {
                let da = (a.center().z - point.z).abs();
                let db = (b.center().z - point.z).abs();
                da.total_cmp(&db)
            });
        if contained.is_some() {
            return contained;
        }

        self.areas.iter().min_by(|a, b| {
            let da = a.center().distance(point);
            let db = b.center().distance(point);
            da.total_cmp(&db)
        })
    }
}

impl PlaceGraph for NavMesh {
    fn place_names(&self) -> Vec<&str> {
        self.places.keys().map(|k| k.as_str()).collect()
    }

    fn areas(&self, place: &str) -> Option<&[NavArea]> {
        self.places.get(place).map(|a| a.as_slice())
    }

    fn place_at(&self, point: &Vector3) -> Option<&str> {
        self.area_at(point)
            .and_then(|a| a.place.as_deref())
            .filter(|p| !p.is_empty())
    }
}

/// Geometry of a place derived from its areas.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    /// Square meters
    pub area: f32,
    pub center: Vector3,
    /// Players further than this from the center do not claim the place
    pub diameter: f32,
}

impl Place {
    pub fn from_areas(name: &str, areas: &[NavArea]) -> Option<Self> {
        let first = areas.first()?;

        let mut units = 0.0;
        let mut weighted = Vector3::default();
        let mut west = first.south_west.x;
        let mut east = first.north_east.x;
        let mut south = first.south_west.y;
        let mut north = first.north_east.y;
        let mut south_z = first.south_west.z;
        let mut north_z = first.north_east.z;

        for nav_area in areas {
            let rough = nav_area.rough_units();
            let center = nav_area.center();
            units += rough;
            weighted.x += center.x * rough;
            weighted.y += center.y * rough;
            weighted.z += center.z * rough;

            west = west.min(nav_area.south_west.x);
            east = east.max(nav_area.north_east.x);
            if nav_area.south_west.y < south {
                south = nav_area.south_west.y;
                south_z = nav_area.south_west.z;
            }
            if nav_area.north_east.y > north {
                north = nav_area.north_east.y;
                north_z = nav_area.north_east.z;
            }
        }

        let center = if units > 0.0 {
            Vector3::new(weighted.x / units, weighted.y / units, weighted.z / units)
        } else {
            first.center()
        };

        let width = east - west;
        let height = north - south;
        let mut diameter = (width / 2.0).min(height / 2.0);

        // Slopes look shorter from above than they are
        let slope = Vector3::new(0.0, height, north_z - south_z).length();
        let cos = height / slope;
        if cos != 0.0 && cos.is_finite() {
            diameter /= cos;
        }

        Some(Self {
            name: name.to_owned(),
            area: units * METERS_PER_UNIT * METERS_PER_UNIT,
            center,
            diameter,
        })
    }
}
