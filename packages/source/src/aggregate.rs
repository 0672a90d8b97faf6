//! Per-subdivision accident counting.

use std::collections::BTreeMap;

use accident_map_accident_models::{AccidentRecord, SubdivisionCount};
use accident_map_normalize::Normalizer;

/// Counts occurrences of each canonical name.
///
/// Blank names are skipped. Rows are ordered by count descending, then by
/// name, so every name appears exactly once.
#[must_use]
pub fn count_by_subdivision<I, S>(names: I) -> Vec<SubdivisionCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut skipped = 0u64;

    for name in names {
        let name = name.as_ref();
        if name.is_empty() {
            skipped += 1;
            continue;
        }
        *counts.entry(name.to_owned()).or_default() += 1;
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} record(s) with a blank location");
    }

    let mut rows: Vec<SubdivisionCount> = counts
        .into_iter()
        .map(|(name, count)| SubdivisionCount { name, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Normalizes every record's location and counts the results.
#[must_use]
pub fn aggregate_records(
    records: &[AccidentRecord],
    normalizer: &Normalizer,
) -> Vec<SubdivisionCount> {
    let names = normalizer.normalize_all(records.iter().map(|r| r.location.as_str()));
    let rows = count_by_subdivision(&names);

    log::info!(
        "Aggregated {} accident records into {} subdivisions",
        records.len(),
        rows.len()
    );

    rows
}

#[cfg(test)]
mod tests {
    use accident_map_normalize::LocationFormat;

    use super::*;

    fn record(location: &str) -> AccidentRecord {
        AccidentRecord {
            location: location.to_string(),
        }
    }

    #[test]
    fn counts_distinct_names() {
        let rows = count_by_subdivision(["b", "a", "b", "c", "b", "a"]);
        assert_eq!(
            rows,
            vec![
                SubdivisionCount {
                    name: "b".to_string(),
                    count: 3
                },
                SubdivisionCount {
                    name: "a".to_string(),
                    count: 2
                },
                SubdivisionCount {
                    name: "c".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn skips_blank_names() {
        let rows = count_by_subdivision(["", "a", ""]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 1);
    }

    #[test]
    fn total_matches_non_blank_inputs() {
        let names = ["x", "y", "x", "", "z", "x", "y"];
        let rows = count_by_subdivision(names);
        let total: u64 = rows.iter().map(|r| r.count).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn aggregates_gubeng_and_wonokromo() {
        let normalizer = Normalizer::new(LocationFormat {
            prefix: "KEC. ".to_string(),
            suffix: ", KOTA SURABAYA".to_string(),
            corrections: BTreeMap::new(),
        })
        .unwrap();

        let mut records = vec![record("KEC. GUBENG, KOTA SURABAYA"); 5];
        records.extend(vec![record("KEC. WONOKROMO, KOTA SURABAYA"); 2]);

        let rows = aggregate_records(&records, &normalizer);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Gubeng");
        assert_eq!(rows[0].count, 5);
        assert_eq!(rows[1].name, "Wonokromo");
        assert_eq!(rows[1].count, 2);
    }
}
