// tests/totals.rs
use std::fs;

use fam8_progress::specs::totals::{CampaignKind, extract_totals, round_half_away, totals_from_text};
use fam8_progress::Error;

const HEADER: &str = "日付,ID,キャンペーン,表示,クリック,CTR,CV,CVR,単価,費用,売上,利益,率,GROSS,NET";

fn total_line(gross: &str, net: &str) -> String {
    format!("[total],,,100,10,10%,1,10%,0,0,0,0,0,{gross},{net}")
}

#[test]
fn picks_gross_and_net_from_total_row() {
    let text = format!(
        "{HEADER}\r\n2025-05-12,1,a,50,5,10%,0,0%,0,0,0,0,0,400,200\r\n{}\r\n",
        total_line("\"1000\"", "\"500.6\"")
    );
    let t = totals_from_text(&text, CampaignKind::General).unwrap();
    assert_eq!((t.gross, t.net), (1000, 501));
}

#[test]
fn last_total_row_wins() {
    let text = format!("{HEADER}\n{}\n{}\n", total_line("1", "1"), total_line("7", "8"));
    let t = totals_from_text(&text, CampaignKind::Adult).unwrap();
    assert_eq!((t.gross, t.net), (7, 8));
}

#[test]
fn halves_round_away_from_zero() {
    assert_eq!(round_half_away(500.5), 501);
    assert_eq!(round_half_away(500.4), 500);
    assert_eq!(round_half_away(2.5), 3);
    assert_eq!(round_half_away(-0.5), -1);

    let text = format!("{HEADER}\n{}\n", total_line("500.5", "0.5"));
    let t = totals_from_text(&text, CampaignKind::General).unwrap();
    assert_eq!((t.gross, t.net), (501, 1));
}

#[test]
fn missing_total_row_is_parse_error() {
    let text = format!("{HEADER}\n1,2,3,4,5,6,7,8,9,10,11,12,13,14,15\n");
    assert!(matches!(totals_from_text(&text, CampaignKind::General), Err(Error::Parse { .. })));
}

#[test]
fn short_total_row_is_parse_error() {
    let text = format!("{HEADER}\n[total],1,2,3\n");
    assert!(matches!(totals_from_text(&text, CampaignKind::General), Err(Error::Parse { .. })));
}

#[test]
fn non_numeric_amount_is_parse_error() {
    let text = format!("{HEADER}\n{}\n", total_line("-", "12"));
    assert!(matches!(totals_from_text(&text, CampaignKind::Adult), Err(Error::Parse { .. })));
}

#[test]
fn narrow_export_fails_layout_guard() {
    let text = format!("日付,ID,表示,GROSS,NET\n{}\n", total_line("1", "2"));
    assert!(matches!(totals_from_text(&text, CampaignKind::General), Err(Error::Layout(_))));
}

#[test]
fn reads_shift_jis_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("general_campane.csv");
    let text = format!("{HEADER}\r\n{}\r\n", total_line("\"123456.7\"", "\"98765.2\""));
    let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(&text);
    fs::write(&path, &bytes).unwrap();

    let t = extract_totals(&path, CampaignKind::General).unwrap();
    assert_eq!((t.gross, t.net), (123457, 98765));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = extract_totals(&dir.path().join("nope.csv"), CampaignKind::General).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
