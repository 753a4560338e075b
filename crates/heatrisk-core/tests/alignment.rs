use anyhow::Result;
use heatrisk_core::{Alignment, ByFid, ByPosition, HeatError, RowAlignment, Table};
use polars::prelude::*;

fn anchor() -> Table {
    Table::new("anchor.csv", df!("FID" => &[10i64, 20, 30]).unwrap())
}

#[test]
fn by_fid_reorders_rows_to_anchor_order() -> Result<()> {
    let other = Table::new(
        "other.csv",
        df!(
            "FID" => &[30i64, 10, 20],
            "value" => &[3.0f64, 1.0, 2.0],
        )?,
    );

    let aligned = ByFid.align(&anchor(), &other)?;
    let fid = aligned.frame().column("FID")?.i64()?;
    let value = aligned.frame().column("value")?.f64()?;
    assert_eq!(fid.get(0), Some(10));
    assert_eq!(value.get(0), Some(1.0));
    assert_eq!(value.get(2), Some(3.0));
    assert_eq!(aligned.name(), "other.csv");
    Ok(())
}

#[test]
fn by_fid_ignores_extra_rows_in_other_table() -> Result<()> {
    let other = Table::new(
        "other.csv",
        df!(
            "FID" => &[40i64, 30, 20, 10],
            "value" => &[4.0f64, 3.0, 2.0, 1.0],
        )?,
    );
    let aligned = ByFid.align(&anchor(), &other)?;
    assert_eq!(aligned.height(), 3);
    Ok(())
}

#[test]
fn by_fid_reports_missing_cell() {
    let other = Table::new(
        "other.csv",
        df!("FID" => &[10i64, 20], "value" => &[1.0f64, 2.0]).unwrap(),
    );
    let err = ByFid.align(&anchor(), &other).unwrap_err();
    assert!(matches!(err, HeatError::UnmatchedKey { fid, .. } if fid == "30"));
}

#[test]
fn by_fid_reports_duplicate_cell() {
    let other = Table::new(
        "other.csv",
        df!("FID" => &[10i64, 10, 20, 30], "value" => &[1.0f64, 1.5, 2.0, 3.0]).unwrap(),
    );
    let err = ByFid.align(&anchor(), &other).unwrap_err();
    assert!(matches!(err, HeatError::DuplicateKey { fid, .. } if fid == "10"));
}

#[test]
fn by_position_checks_only_row_counts() -> Result<()> {
    let reversed = Table::new(
        "other.csv",
        df!("FID" => &[30i64, 20, 10], "value" => &[3.0f64, 2.0, 1.0])?,
    );
    let aligned = ByPosition.align(&anchor(), &reversed)?;
    assert_eq!(aligned.frame().column("FID")?.i64()?.get(0), Some(30));

    let short = Table::new("short.csv", df!("FID" => &[10i64])?);
    let err = ByPosition.align(&anchor(), &short).unwrap_err();
    assert!(matches!(err, HeatError::RowCountMismatch { .. }));
    Ok(())
}

#[test]
fn alignment_selector_picks_strategy() {
    assert_eq!(Alignment::default(), Alignment::Position);
    assert_eq!(Alignment::Position.strategy().name(), "position");
    assert_eq!(Alignment::Fid.strategy().name(), "fid");
}

#[test]
fn by_fid_rejects_null_anchor_cell() {
    let anchor = Table::new("anchor.csv", df!("FID" => &[Some("a"), None]).unwrap());
    let other = Table::new(
        "other.csv",
        df!(
            "FID" => &["a", "null"],
            "value" => &[1.0f64, 2.0],
        )
        .unwrap(),
    );
    let err = ByFid.align(&anchor, &other).unwrap_err();
    match err {
        HeatError::UnmatchedKey { table, .. } => assert_eq!(table, "other.csv"),
        other => panic!("unexpected error: {other}"),
    }
}
