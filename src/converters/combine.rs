use geojson::FeatureCollection;
use tracing::info;

use crate::stats::ConversionStats;

/// Concatenates two collections, `first`'s features ahead of `second`'s.
///
/// Features are moved as-is: no dedup and no schema check.
pub fn combine_collections(
    first: FeatureCollection,
    second: FeatureCollection,
) -> (FeatureCollection, ConversionStats) {
    let mut stats = ConversionStats::new("combined");
    stats.rows_read = first.features.len() + second.features.len();

    let mut features = first.features;
    features.extend(second.features);
    stats.features_written = features.len();

    info!(features = stats.features_written, "Collections combined");

    let combined = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    (combined, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Feature, JsonObject};

    fn collection(tag: &str, count: usize) -> FeatureCollection {
        let features = (0..count)
            .map(|i| {
                let mut properties = JsonObject::new();
                properties.insert("NAME".into(), format!("{tag}-{i}").into());
                Feature {
                    bbox: None,
                    geometry: None,
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    fn names(collection: &FeatureCollection) -> Vec<String> {
        collection
            .features
            .iter()
            .map(|f| f.property("NAME").unwrap().as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_count_is_sum_and_order_is_first_then_second() {
        let (combined, stats) = combine_collections(collection("rail", 2), collection("bus", 3));

        assert_eq!(combined.features.len(), 5);
        assert_eq!(stats.features_written, 5);
        assert_eq!(
            names(&combined),
            vec!["rail-0", "rail-1", "bus-0", "bus-1", "bus-2"]
        );
    }

    #[test]
    fn test_combine_with_empty() {
        let (combined, _) = combine_collections(collection("rail", 0), collection("bus", 2));
        assert_eq!(names(&combined), vec!["bus-0", "bus-1"]);

        let (combined, _) = combine_collections(collection("rail", 0), collection("bus", 0));
        assert!(combined.features.is_empty());
    }

    #[test]
    fn test_mixed_property_shapes_pass_through() {
        let mut road = collection("road", 1);
        let props = road.features[0].properties.as_mut().unwrap();
        props.insert("ROUTE_NAME".into(), "0089".into());

        let (combined, _) = combine_collections(collection("rail", 1), road);
        assert_eq!(combined.features[1].property("ROUTE_NAME").unwrap(), "0089");
        assert!(combined.features[0].property("ROUTE_NAME").is_none());
    }
}
