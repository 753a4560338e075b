use std::fs;

use anyhow::Result;
use heatrisk_core::excess_deaths::{calculate_excess_deaths, excess_deaths};
use heatrisk_core::{ByFid, ByPosition, HeatError, Table};
use polars::prelude::*;

fn er_table() -> Table {
    Table::new(
        "ER.csv",
        df!(
            "FID" => &[1i64, 2],
            "ER_rcp85_2050" => &[2.0f64, 0.0],
            "ER_rcp85_2100" => &[0.5f64, 1.5],
        )
        .unwrap(),
    )
}

fn mortality_table() -> Table {
    Table::new(
        "mortality.csv",
        df!(
            "FID" => &[1i64, 2],
            "Deaths-2050" => &[10.0f64, 5.0],
            "Deaths-2100" => &[4.0f64, 8.0],
        )
        .unwrap(),
    )
}

#[test]
fn excess_deaths_multiply_ratio_by_mean_daily_deaths() -> Result<()> {
    let output = excess_deaths(&er_table(), &mortality_table(), &ByPosition)?;

    let ed_2050 = output.frame().column("ED_2050")?.f64()?;
    assert_eq!(ed_2050.get(0), Some(20.0));
    assert_eq!(ed_2050.get(1), Some(0.0));

    let ed_2100 = output.frame().column("ED_2100")?.f64()?;
    assert_eq!(ed_2100.get(0), Some(2.0));
    assert_eq!(ed_2100.get(1), Some(12.0));

    let fid = output.frame().column("FID")?.i64()?;
    assert_eq!(fid.get(1), Some(2));
    assert_eq!(output.width(), 3);
    Ok(())
}

#[test]
fn missing_mortality_year_is_reported() {
    let er = Table::new(
        "ER.csv",
        df!("FID" => &[1i64, 2], "ER_rcp85_2075" => &[1.0f64, 1.0]).unwrap(),
    );
    let err = excess_deaths(&er, &mortality_table(), &ByPosition).unwrap_err();
    match err {
        HeatError::MissingColumn { table, column } => {
            assert_eq!(table, "mortality.csv");
            assert_eq!(column, "Deaths-2075");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn row_count_mismatch_is_reported() {
    let mortality = Table::new(
        "mortality.csv",
        df!(
            "FID" => &[1i64, 2, 3],
            "Deaths-2050" => &[10.0f64, 5.0, 1.0],
            "Deaths-2100" => &[4.0f64, 8.0, 1.0],
        )
        .unwrap(),
    );
    let err = excess_deaths(&er_table(), &mortality, &ByPosition).unwrap_err();
    assert!(matches!(
        err,
        HeatError::RowCountMismatch {
            left_rows: 2,
            right_rows: 3,
            ..
        }
    ));
}

// Equal-length tables in a different FID order pass positional alignment
// unnoticed. This pins that behaviour so a change to it is deliberate.
#[test]
fn reordered_rows_are_silently_misaligned_by_position() -> Result<()> {
    let reordered = Table::new(
        "mortality.csv",
        df!(
            "FID" => &[2i64, 1],
            "Deaths-2050" => &[5.0f64, 10.0],
            "Deaths-2100" => &[8.0f64, 4.0],
        )?,
    );

    let positional = excess_deaths(&er_table(), &reordered, &ByPosition)?;
    let ed = positional.frame().column("ED_2050")?.f64()?;
    assert_eq!(ed.get(0), Some(10.0));
    assert_eq!(ed.get(1), Some(0.0));

    let keyed = excess_deaths(&er_table(), &reordered, &ByFid)?;
    let ed = keyed.frame().column("ED_2050")?.f64()?;
    assert_eq!(ed.get(0), Some(20.0));
    assert_eq!(ed.get(1), Some(0.0));
    Ok(())
}

#[test]
fn file_round_trip_writes_fid_and_year_columns() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let er = tmp.path().join("ER.csv");
    let mortality = tmp.path().join("mortality.csv");
    let output = tmp.path().join("excess_deaths.csv");
    fs::write(&er, "FID,ER_rcp85_2050\n1,2\n2,0\n")?;
    fs::write(&mortality, "FID,Deaths-2050\n1,10\n2,5\n")?;

    calculate_excess_deaths(&er, &mortality, &output)?;

    let written = Table::read_csv(&output)?;
    let names: Vec<String> = written
        .frame()
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["FID", "ED_2050"]);
    let ed = written.float_column("ED_2050")?;
    assert_eq!(ed.get(0), Some(20.0));
    assert_eq!(ed.get(1), Some(0.0));

    let first = fs::read(&output)?;
    calculate_excess_deaths(&er, &mortality, &output)?;
    assert_eq!(first, fs::read(&output)?);
    Ok(())
}

#[test]
fn decimal_deaths_after_long_integer_prefix_keep_their_fraction() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let er_path = tmp.path().join("ER.csv");
    let mortality_path = tmp.path().join("mortality.csv");
    let output = tmp.path().join("ED.csv");

    let mut er = String::from("FID,ER_rcp85_2050\n");
    let mut mortality = String::from("FID,Deaths-2050\n");
    for fid in 0..200 {
        er.push_str(&format!("{fid},2\n"));
        let deaths = if fid == 150 { "2.5" } else { "2" };
        mortality.push_str(&format!("{fid},{deaths}\n"));
    }
    fs::write(&er_path, er)?;
    fs::write(&mortality_path, mortality)?;

    calculate_excess_deaths(&er_path, &mortality_path, &output)?;

    let written = Table::read_csv(&output)?;
    let ed = written.float_column("ED_2050")?;
    assert_eq!(ed.get(150), Some(5.0));
    assert_eq!(ed.get(149), Some(4.0));
    Ok(())
}
