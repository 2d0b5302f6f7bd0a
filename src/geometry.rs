//! Boundary containment and synthetic stop placement.

use anyhow::{Context, Result, anyhow, bail};
use geo::{Centroid, Contains, LineString, MultiPolygon, Point};
use geojson::GeoJson;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// City boundary used as a strict point-in-polygon predicate.
#[derive(Debug, Clone)]
pub struct CityBoundary {
    polygon: MultiPolygon<f64>,
}

impl CityBoundary {
    pub fn new(polygon: MultiPolygon<f64>) -> Self {
        Self { polygon }
    }

    /// Loads the geometry of the first feature of a GeoJSON FeatureCollection.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a FeatureCollection,
    /// or its first feature is not a polygon.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read boundary file {}", path.display()))?;
        Self::from_geojson_str(&content)
            .with_context(|| format!("Invalid boundary file {}", path.display()))
    }

    pub fn from_geojson_str(content: &str) -> Result<Self> {
        let geojson: GeoJson = content.parse()?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            bail!("boundary must be a FeatureCollection");
        };

        let geometry = collection
            .features
            .into_iter()
            .next()
            .and_then(|feature| feature.geometry)
            .ok_or_else(|| anyhow!("boundary has no feature geometry"))?;

        let geometry: geo::Geometry<f64> = geometry.try_into()?;
        let polygon = match geometry {
            geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
            geo::Geometry::MultiPolygon(mp) => mp,
            _ => bail!("boundary geometry is not a polygon"),
        };

        Ok(Self::new(polygon))
    }

    /// True if the point lies in the interior. Points on the edge are outside.
    pub fn contains_point(&self, point: &Point<f64>) -> bool {
        self.polygon.contains(point)
    }

    /// Tests only the line's centroid, so segments straddling the edge may
    /// land either way.
    pub fn contains_centroid(&self, line: &LineString<f64>) -> bool {
        line.centroid()
            .is_some_and(|center| self.contains_point(&center))
    }
}

/// Bounding box for synthetic stop positions.
///
/// Stop tables carry no coordinates, so stops are scattered uniformly within
/// `center ± jitter` until real geocoding exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticArea {
    pub center_lng: f64,
    pub center_lat: f64,
    pub lng_jitter: f64,
    pub lat_jitter: f64,
}

impl Default for SyntheticArea {
    fn default() -> Self {
        Self {
            center_lng: -111.89,
            center_lat: 40.76,
            lng_jitter: 0.03,
            lat_jitter: 0.04,
        }
    }
}

impl SyntheticArea {
    /// Draws a `[lng, lat]` position inside the box.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> [f64; 2] {
        let lat = self.center_lat + jitter(rng, self.lat_jitter);
        let lng = self.center_lng + jitter(rng, self.lng_jitter);
        [lng, lat]
    }

    pub fn contains(&self, [lng, lat]: [f64; 2]) -> bool {
        (lng - self.center_lng).abs() <= self.lng_jitter
            && (lat - self.center_lat).abs() <= self.lat_jitter
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, range: f64) -> f64 {
    if range > 0.0 {
        rng.gen_range(-range..=range)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn square() -> CityBoundary {
        CityBoundary::new(MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ]]))
    }

    #[test]
    fn test_centroid_inside() {
        let line = LineString(vec![coord! { x: 2.0, y: 2.0 }, coord! { x: 4.0, y: 4.0 }]);
        assert!(square().contains_centroid(&line));
    }

    #[test]
    fn test_centroid_on_edge_is_excluded() {
        let line = LineString(vec![coord! { x: 10.0, y: 2.0 }, coord! { x: 10.0, y: 4.0 }]);
        assert!(!square().contains_centroid(&line));
    }

    #[test]
    fn test_centroid_outside_even_if_line_crosses() {
        let line = LineString(vec![coord! { x: 5.0, y: 5.0 }, coord! { x: 25.0, y: 5.0 }]);
        assert!(!square().contains_centroid(&line));
    }

    #[test]
    fn test_single_coordinate_line_uses_that_point() {
        let line = LineString(vec![coord! { x: 3.0, y: 3.0 }]);
        assert!(square().contains_centroid(&line));
    }

    #[test]
    fn test_empty_line_is_excluded() {
        assert!(!square().contains_centroid(&LineString(vec![])));
    }

    #[test]
    fn test_from_geojson_uses_first_feature() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon",
                    "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
                {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon",
                    "coordinates": [[[5,5],[6,5],[6,6],[5,6],[5,5]]]}}
            ]
        }"#;
        let boundary = CityBoundary::from_geojson_str(json).unwrap();

        assert!(boundary.contains_point(&Point::new(0.5, 0.5)));
        assert!(!boundary.contains_point(&Point::new(5.5, 5.5)));
    }

    #[test]
    fn test_from_geojson_rejects_non_polygon() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [0, 0]}}
        ]}"#;
        assert!(CityBoundary::from_geojson_str(json).is_err());
    }

    #[test]
    fn test_from_geojson_rejects_empty_collection() {
        let json = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(CityBoundary::from_geojson_str(json).is_err());
    }

    #[test]
    fn test_synthetic_positions_stay_in_box() {
        let area = SyntheticArea::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let position = area.sample(&mut rng);
            assert!(area.contains(position), "{position:?} escaped the box");
        }
    }

    #[test]
    fn test_synthetic_positions_repeat_with_seed() {
        let area = SyntheticArea::default();
        let a = area.sample(&mut StdRng::seed_from_u64(42));
        let b = area.sample(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_jitter_returns_center() {
        let area = SyntheticArea {
            lng_jitter: 0.0,
            lat_jitter: 0.0,
            ..SyntheticArea::default()
        };
        let position = area.sample(&mut StdRng::seed_from_u64(1));
        assert_eq!(position, [-111.89, 40.76]);
    }
}
