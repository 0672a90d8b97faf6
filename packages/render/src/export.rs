//! File exports: the table as CSV, the choropleth as `GeoJSON`, and the
//! summary as JSON.

use std::io::Write;

use accident_map_analytics::ActiveSubset;
use accident_map_analytics_models::DashboardSummary;
use accident_map_geography::JoinedSubdivision;
use accident_map_geography_models::{JoinReport, SubdivisionRow};
use chrono::{DateTime, Utc};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use serde::Serialize;

use crate::RenderError;
use crate::color::ColorScale;

/// File name of the table export.
pub const TABLE_FILE: &str = "subdivisions.csv";
/// File name of the choropleth export.
pub const MAP_FILE: &str = "choropleth.geojson";
/// File name of the summary export.
pub const SUMMARY_FILE: &str = "summary.json";

/// Writes the rows as CSV with a header row.
///
/// # Errors
///
/// Returns [`RenderError::Csv`] if a row cannot be written.
pub fn write_table_csv<W: Write>(writer: W, rows: &[&SubdivisionRow]) -> Result<(), RenderError> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Builds the choropleth feature collection.
///
/// Each feature carries the row's fields plus a continuous `fill` colour
/// scaled over the given subdivisions and the fixed `tierColor`.
///
/// # Errors
///
/// Returns [`RenderError::Map`] if a centroid is not finite.
pub fn choropleth(subdivisions: &[&JoinedSubdivision]) -> Result<FeatureCollection, RenderError> {
    let scale = ColorScale::from_counts(subdivisions.iter().map(|s| s.row.count));

    let features = subdivisions
        .iter()
        .map(|s| {
            let row = &s.row;
            if !row.longitude.is_finite() || !row.latitude.is_finite() {
                return Err(RenderError::Map {
                    message: format!("subdivision '{}' has no finite centroid", row.name),
                });
            }

            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), JsonValue::from(row.name.clone()));
            properties.insert("count".to_string(), JsonValue::from(row.count));
            properties.insert("cluster".to_string(), JsonValue::from(row.cluster));
            properties.insert("tier".to_string(), JsonValue::from(row.tier.label()));
            properties.insert("longitude".to_string(), JsonValue::from(row.longitude));
            properties.insert("latitude".to_string(), JsonValue::from(row.latitude));
            properties.insert("fill".to_string(), JsonValue::from(scale.color(row.count)));
            properties.insert("tierColor".to_string(), JsonValue::from(row.tier.color()));

            Ok(Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&s.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Writes the choropleth as `GeoJSON`.
///
/// # Errors
///
/// Returns [`RenderError`] if the collection cannot be built, written, or
/// flushed.
pub fn write_choropleth<W: Write>(
    mut writer: W,
    subdivisions: &[&JoinedSubdivision],
) -> Result<(), RenderError> {
    let collection = choropleth(subdivisions)?;
    serde_json::to_writer(&mut writer, &collection)?;
    writer.flush()?;
    Ok(())
}

/// Contents of the summary export.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryExport<'a> {
    /// When the export was written.
    pub generated_at: DateTime<Utc>,
    /// Config the dataset was built with.
    pub config_id: &'a str,
    /// Subset the summary covers.
    pub subset: &'a ActiveSubset,
    /// Headline numbers.
    pub summary: &'a DashboardSummary,
    /// Join mismatches.
    pub join_report: &'a JoinReport,
}

/// Writes the summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`RenderError`] if serialization or the final flush fails.
pub fn write_summary_json<W: Write>(
    mut writer: W,
    export: &SummaryExport<'_>,
) -> Result<(), RenderError> {
    serde_json::to_writer_pretty(&mut writer, export)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use accident_map_accident_models::RiskTier;
    use geo::{MultiPolygon, polygon};

    use super::*;

    fn joined(name: &str, count: u64, tier: RiskTier) -> JoinedSubdivision {
        JoinedSubdivision {
            row: SubdivisionRow {
                name: name.to_string(),
                count,
                cluster: 0,
                tier,
                longitude: 0.5,
                latitude: 0.5,
            },
            geometry: MultiPolygon(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
                (x: 0.0, y: 1.0),
            ]]),
        }
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let a = joined("Gubeng", 5, RiskTier::HighRisk);
        let b = joined("Wonokromo", 2, RiskTier::Safe);
        let mut buf = Vec::new();
        write_table_csv(&mut buf, &[&a.row, &b.row]).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,count,cluster,tier,longitude,latitude");
        assert_eq!(lines[1], "Gubeng,5,0,HIGH_RISK,0.5,0.5");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn choropleth_properties() {
        let a = joined("Gubeng", 5, RiskTier::HighRisk);
        let b = joined("Wonokromo", 2, RiskTier::Safe);
        let collection = choropleth(&[&a, &b]).unwrap();

        assert_eq!(collection.features.len(), 2);
        let gubeng = &collection.features[0];
        assert_eq!(gubeng.property("name").and_then(JsonValue::as_str), Some("Gubeng"));
        assert_eq!(gubeng.property("count").and_then(JsonValue::as_u64), Some(5));
        assert_eq!(gubeng.property("fill").and_then(JsonValue::as_str), Some("#a50026"));
        assert_eq!(
            gubeng.property("tierColor").and_then(JsonValue::as_str),
            Some("#e74c3c")
        );
        let wonokromo = &collection.features[1];
        assert_eq!(
            wonokromo.property("fill").and_then(JsonValue::as_str),
            Some("#006837")
        );
        assert!(gubeng.geometry.is_some());
    }

    #[test]
    fn non_finite_centroid_fails_the_map_only() {
        let mut broken = joined("Broken", 1, RiskTier::Safe);
        broken.row.longitude = f64::NAN;
        assert!(matches!(
            choropleth(&[&broken]),
            Err(RenderError::Map { .. })
        ));
    }

    /// Accepts writes, fails on flush, like a file on a full disk.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("no space left on device"))
        }
    }

    #[test]
    fn flush_failures_are_reported() {
        let gubeng = joined("Gubeng", 5, RiskTier::HighRisk);
        assert!(matches!(
            write_choropleth(FullDisk, &[&gubeng]),
            Err(RenderError::Write(_))
        ));

        let summary = DashboardSummary::default();
        let export = SummaryExport {
            generated_at: Utc::now(),
            config_id: "surabaya",
            subset: &ActiveSubset::All,
            summary: &summary,
            join_report: &JoinReport::default(),
        };
        assert!(matches!(
            write_summary_json(FullDisk, &export),
            Err(RenderError::Write(_))
        ));
        assert!(write_table_csv(FullDisk, &[&gubeng.row]).is_err());
    }

    #[test]
    fn buffered_file_errors_surface() {
        let Ok(file) = std::fs::OpenOptions::new().write(true).open("/dev/full") else {
            return;
        };
        let gubeng = joined("Gubeng", 5, RiskTier::HighRisk);
        let result = write_choropleth(std::io::BufWriter::new(file), &[&gubeng]);
        assert!(result.is_err());
    }

    #[test]
    fn summary_json_has_timestamp_and_tiers() {
        let summary = DashboardSummary::default();
        let export = SummaryExport {
            generated_at: Utc::now(),
            config_id: "surabaya",
            subset: &ActiveSubset::All,
            summary: &summary,
            join_report: &JoinReport::default(),
        };
        let mut buf = Vec::new();
        write_summary_json(&mut buf, &export).unwrap();

        let value: JsonValue = serde_json::from_slice(&buf).unwrap();
        assert!(value["generatedAt"].is_string());
        assert_eq!(value["configId"], "surabaya");
        assert_eq!(value["summary"]["tiers"].as_array().unwrap().len(), 3);
    }
}
