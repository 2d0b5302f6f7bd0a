//! Reading and writing GeoJSON collections, plus the CSV run ledger.

use anyhow::{Context, Result, bail};
use geojson::{FeatureCollection, GeoJson};
use tracing::{debug, info};

use crate::stats::ConversionStats;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Writes a collection as pretty-printed (2-space) GeoJSON, replacing `path`.
pub fn write_feature_collection(path: &str, collection: &FeatureCollection) -> Result<()> {
    let json = serde_json::to_string_pretty(collection)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {path}"))?;

    debug!(path, features = collection.features.len(), "GeoJSON written");
    Ok(())
}

/// Reads a GeoJSON file that must hold a FeatureCollection.
pub fn read_feature_collection(path: &str) -> Result<FeatureCollection> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("Failed to parse GeoJSON in {path}"))?;

    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => bail!("{path} is not a FeatureCollection"),
    }
}

/// Logs run statistics as pretty-printed JSON.
pub fn print_json(stats: &ConversionStats) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}

/// Per-dataset ledger file next to `base`: `runs.csv` + `bus` -> `runs_bus.csv`.
pub fn ledger_path(base: &str, dataset: &str) -> PathBuf {
    let base = Path::new(base);
    let stem = base
        .file_stem()
        .map_or_else(|| "ledger".into(), |s| s.to_string_lossy());
    let file_name = match base.extension() {
        Some(ext) => format!("{stem}_{dataset}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{dataset}"),
    };
    base.with_file_name(file_name)
}

/// Appends `stats` as a CSV row to the ledger for its dataset.
///
/// Each dataset gets its own file so a ledger holds one run history; the
/// header is written only when the file is first created. Returns the path
/// written to.
pub fn append_record(base: &str, stats: &ConversionStats) -> Result<PathBuf> {
    let path = ledger_path(base, &stats.dataset);
    let new_file = !path.exists();
    debug!(path = %path.display(), new_file, "Appending run to ledger");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .with_context(|| format!("Failed to open ledger {}", path.display()))?;

    let mut writer = WriterBuilder::new().has_headers(new_file).from_writer(file);
    writer.serialize(stats)?;
    writer.flush()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Feature, Geometry, Value};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_collection() -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: vec![Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![-111.89, 40.76]))),
                id: None,
                properties: Some(geojson::JsonObject::new()),
                foreign_members: None,
            }],
            foreign_members: None,
        }
    }

    #[test]
    fn test_write_is_pretty_with_two_space_indent() {
        let path = temp_path("ridership_geojson_test_pretty.geojson");
        write_feature_collection(&path, &sample_collection()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n  \""));
        assert!(content.contains("\"FeatureCollection\""));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_then_read_keeps_features() {
        let path = temp_path("ridership_geojson_test_read.geojson");
        write_feature_collection(&path, &sample_collection()).unwrap();

        let collection = read_feature_collection(&path).unwrap();
        assert_eq!(collection.features.len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_missing_file_fails() {
        assert!(read_feature_collection("/nonexistent/ridership.geojson").is_err());
    }

    #[test]
    fn test_read_rejects_non_collection() {
        let path = temp_path("ridership_geojson_test_point.geojson");
        fs::write(&path, r#"{"type": "Point", "coordinates": [0, 0]}"#).unwrap();

        assert!(read_feature_collection(&path).is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&ConversionStats::new("bus")).unwrap();
    }

    #[test]
    fn test_ledger_path_adds_dataset() {
        assert_eq!(
            ledger_path("logs/runs.csv", "bus"),
            PathBuf::from("logs/runs_bus.csv")
        );
        assert_eq!(ledger_path("runs", "road"), PathBuf::from("runs_road"));
    }

    #[test]
    fn test_append_record_writes_header_once_per_dataset() {
        let base = temp_path("ridership_geojson_test_ledger.csv");
        let rail_path = ledger_path(&base, "rail");
        let road_path = ledger_path(&base, "road");
        let _ = fs::remove_file(&rail_path);
        let _ = fs::remove_file(&road_path);

        let rail = ConversionStats::new("rail");
        assert_eq!(append_record(&base, &rail).unwrap(), rail_path);
        append_record(&base, &rail).unwrap();
        append_record(&base, &ConversionStats::new("road")).unwrap();

        let content = fs::read_to_string(&rail_path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 data rows
        assert_eq!(content.lines().count(), 3);

        let mut rdr = csv::Reader::from_path(&rail_path).unwrap();
        let rows: Vec<ConversionStats> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
        assert!(rows.iter().all(|r| r.dataset == "rail"));

        assert_eq!(fs::read_to_string(&road_path).unwrap().lines().count(), 2);

        fs::remove_file(rail_path).unwrap();
        fs::remove_file(road_path).unwrap();
    }
}
