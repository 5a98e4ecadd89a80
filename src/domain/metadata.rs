//! Randomized per-sample metadata records.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use tracing::debug;

use crate::domain::labels::{CladeMap, CLADE_LABELS, LINEAGE_BASES};

/// City and its country.
pub const CITIES: [(&str, &str); 10] = [
    ("Seattle", "USA"),
    ("Boston", "USA"),
    ("London", "UK"),
    ("Berlin", "Germany"),
    ("Nairobi", "Kenya"),
    ("Sao Paulo", "Brazil"),
    ("Mumbai", "India"),
    ("Sydney", "Australia"),
    ("Tokyo", "Japan"),
    ("Cape Town", "South Africa"),
];
pub const SAMPLE_TYPES: [&str; 4] = ["blood", "feces", "swab", "environmental"];
pub const RESISTANCE_LEVELS: [&str; 4] = ["none", "low", "moderate", "high"];
pub const HOSTS: [&str; 4] = ["human", "livestock", "wildlife", "environment"];

/// First collection date (inclusive).
pub const COLLECTION_START: NaiveDate = match NaiveDate::from_ymd_opt(2018, 1, 1) {
    Some(date) => date,
    None => panic!("invalid collection start"),
};
/// Last collection date (inclusive).
pub const COLLECTION_END: NaiveDate = match NaiveDate::from_ymd_opt(2024, 12, 31) {
    Some(date) => date,
    None => panic!("invalid collection end"),
};

/// Column names, in output order.
pub const METADATA_COLUMNS: [&str; 10] = [
    "sample_id",
    "collection_date",
    "city",
    "country",
    "sample_type",
    "antimicrobial_resistance",
    "strain",
    "host",
    "lineage",
    "clade",
];

/// One generated metadata row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub sample_id: String,
    pub collection_date: NaiveDate,
    pub city: &'static str,
    pub country: &'static str,
    pub sample_type: &'static str,
    pub antimicrobial_resistance: &'static str,
    /// `ST01` .. `ST99`
    pub strain: String,
    pub host: &'static str,
    pub lineage: String,
    pub clade: String,
}

impl MetadataRecord {
    /// Field values in `METADATA_COLUMNS` order.
    pub fn fields(&self) -> [String; 10] {
        [
            self.sample_id.clone(),
            self.collection_date.format("%Y-%m-%d").to_string(),
            self.city.to_string(),
            self.country.to_string(),
            self.sample_type.to_string(),
            self.antimicrobial_resistance.to_string(),
            self.strain.clone(),
            self.host.to_string(),
            self.lineage.clone(),
            self.clade.clone(),
        ]
    }
}

/// Sample identifiers `S001`..`S<count>`.
pub fn sample_ids(count: usize) -> Vec<String> {
    (1..=count).map(|idx| format!("S{idx:03}")).collect()
}

fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

/// One record per sample id, in the given order.
///
/// Clade and lineage come from `clade_map`; fallback labels are drawn for
/// every row and only used for samples missing from the map.
pub fn generate_metadata<R: Rng + ?Sized>(
    sample_ids: &[String],
    rng: &mut R,
    clade_map: &CladeMap,
) -> Vec<MetadataRecord> {
    let span_days = (COLLECTION_END - COLLECTION_START).num_days();

    let mut records = Vec::with_capacity(sample_ids.len());
    for sample_id in sample_ids {
        let (city, country) = *pick(rng, &CITIES);
        let collection_date = COLLECTION_START + Duration::days(rng.random_range(0..=span_days));
        let sample_type = *pick(rng, &SAMPLE_TYPES);
        let antimicrobial_resistance = *pick(rng, &RESISTANCE_LEVELS);
        let strain = format!("ST{:02}", rng.random_range(1..=99u32));
        let host = *pick(rng, &HOSTS);
        let fallback_lineage = *pick(rng, &LINEAGE_BASES);
        let fallback_clade = *pick(rng, &CLADE_LABELS);

        let (lineage, clade) = match clade_map.get(sample_id) {
            Some(assignment) => (assignment.lineage.clone(), assignment.clade.clone()),
            None => (fallback_lineage.to_string(), fallback_clade.to_string()),
        };

        records.push(MetadataRecord {
            sample_id: sample_id.clone(),
            collection_date,
            city,
            country,
            sample_type,
            antimicrobial_resistance,
            strain,
            host,
            lineage,
            clade,
        });
    }

    debug!(rows = records.len(), "generated metadata");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::labels::CladeAssignment;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_ids() {
        assert_eq!(sample_ids(3), vec!["S001", "S002", "S003"]);
        assert_eq!(sample_ids(1000).last().map(String::as_str), Some("S1000"));
        assert!(sample_ids(0).is_empty());
    }

    #[test]
    fn given_ids_when_generating_then_fields_come_from_enumerations() {
        let ids = sample_ids(200);
        let mut rng = StdRng::seed_from_u64(5);
        let rows = generate_metadata(&ids, &mut rng, &CladeMap::new());

        assert_eq!(rows.len(), ids.len());
        for (row, id) in rows.iter().zip(&ids) {
            assert_eq!(&row.sample_id, id);
            assert!(row.collection_date >= COLLECTION_START);
            assert!(row.collection_date <= COLLECTION_END);
            assert!(CITIES.contains(&(row.city, row.country)));
            assert!(SAMPLE_TYPES.contains(&row.sample_type));
            assert!(RESISTANCE_LEVELS.contains(&row.antimicrobial_resistance));
            assert!(HOSTS.contains(&row.host));
            assert!(LINEAGE_BASES.contains(&row.lineage.as_str()));
            assert!(CLADE_LABELS.contains(&row.clade.as_str()));

            assert_eq!(row.strain.len(), 4);
            let number: u32 = row.strain[2..].parse().unwrap();
            assert!(row.strain.starts_with("ST") && (1..=99).contains(&number));
        }
    }

    #[test]
    fn given_clade_map_when_generating_then_mapped_labels_win() {
        let ids = sample_ids(2);
        let mut map = CladeMap::new();
        map.insert(
            "S001".to_string(),
            CladeAssignment {
                clade: "C".to_string(),
                lineage: "L3.2".to_string(),
            },
        );
        let mut rng = StdRng::seed_from_u64(8);
        let rows = generate_metadata(&ids, &mut rng, &map);

        assert_eq!(rows[0].clade, "C");
        assert_eq!(rows[0].lineage, "L3.2");
        assert!(LINEAGE_BASES.contains(&rows[1].lineage.as_str()));
    }

    #[test]
    fn given_record_when_listing_fields_then_date_is_iso() {
        let record = MetadataRecord {
            sample_id: "S001".to_string(),
            collection_date: COLLECTION_START,
            city: "Cape Town",
            country: "South Africa",
            sample_type: "swab",
            antimicrobial_resistance: "low",
            strain: "ST07".to_string(),
            host: "human",
            lineage: "L2.1".to_string(),
            clade: "B".to_string(),
        };
        let fields = record.fields();
        assert_eq!(fields[1], "2018-01-01");
        assert_eq!(fields.len(), METADATA_COLUMNS.len());
    }
}
