// tests/advertiser.rs
use std::fs;

use fam8_progress::specs::advertiser::{AdvertiserRow, find_data_start, parse_advertiser_text, read_advertiser_csv};

fn row(fields: &[&str]) -> AdvertiserRow {
    AdvertiserRow::new(fields.iter().map(|s| s.to_string()).collect())
}

#[test]
fn agency_name_tiers() {
    assert_eq!(row(&["1", "Acme", "", "", "AgencyX"]).agency_name(), "AgencyX");
    assert_eq!(row(&["1", "Acme", "AgencyY"]).agency_name(), "AgencyY");
    assert_eq!(row(&["1", "Acme", "", "AgencyZ"]).agency_name(), "AgencyZ");
    assert_eq!(row(&["1", "Acme", " ", "", "Agency", "", "Two"]).agency_name(), "Agency Two");
    assert_eq!(row(&["1", "Acme", ""]).agency_name(), "");
    assert_eq!(row(&["1", "Acme", "", " "]).agency_name(), "");
}

#[test]
fn metrics_map_fields_3_to_10_and_skip_blanks() {
    let r = row(&["1", "Acme", "Ag", "10%", "", "300", "4", "5", "6", "7", "8", "overflow"]);
    let m: Vec<(usize, &str)> = r.metrics().collect();
    assert_eq!(m, vec![(0, "10%"), (2, "300"), (3, "4"), (4, "5"), (5, "6"), (6, "7"), (7, "8")]);
}

#[test]
fn data_starts_after_last_header_row() {
    let text = "期間,2025-05-12\n\
                ID,広告主,代理店名\n\
                note,ignored\n\
                広告管理ID,広告主名,代理店名,表示率\n\
                \n\
                1,Acme,AgencyY,10%\n\
                2,Beta,,AgencyZ\n";
    let sheet = parse_advertiser_text(text).unwrap();
    assert_eq!(sheet.all_rows.len(), 6);
    assert_eq!(sheet.data_start, 4);
    let data: Vec<_> = sheet.data_rows().map(|(_, r)| r.agency_name()).collect();
    assert_eq!(data, vec!["AgencyY", "AgencyZ"]);
}

#[test]
fn no_header_means_everything_is_data() {
    let rows = vec![vec!["1".to_string(), "Acme".to_string()], vec!["2".to_string(), "Beta".to_string()]];
    assert_eq!(find_data_start(&rows), 0);
}

#[test]
fn quoted_fields_and_ragged_rows_parse() {
    let text = "ID,広告主\n\"1\",\"Acme, Inc.\",\"Ag\"\n2,Beta\n,,\n";
    let sheet = parse_advertiser_text(text).unwrap();
    let rows: Vec<_> = sheet.data_rows().map(|(_, r)| r).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name(), "Acme, Inc.");
    assert!(rows[0].is_complete());
    assert!(!rows[1].is_complete());
}

#[test]
fn reads_cp932_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("advertiser.csv");
    let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode("ID,広告主,代理店名\r\n1,①商事,代理店A\r\n");
    fs::write(&path, &bytes).unwrap();

    let sheet = read_advertiser_csv(&path).unwrap();
    let rows: Vec<_> = sheet.data_rows().map(|(_, r)| r).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name(), "①商事");
    assert_eq!(rows[0].agency_name(), "代理店A");
}
