use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use chrono::NaiveDate;
use rent_sale_paths::app::pipeline::{Dataset, RenderRequest, SourceConfig, run_paths};
use rent_sale_paths::domain::{DateRange, DuplicatePolicy, PairKind, RegionFilter};
use rent_sale_paths::error::{CoreError, SourceFormatError};
use rent_sale_paths::io::{SourceCache, write_outcome_json};
use rent_sale_paths::render::{LandmarkKind, RenderOutcome};

// Workbook export layout: title row, header, unit row, spacer row, then data.
const SALE: &str = "\
Weekly sale index,,,
구분,North,South,West
(2024-01-01=100),,,
,,,
2024-01-01,100,100,100
2024-01-08,101,99.5,
2024-01-15,102,99,101
";

const RENT: &str = "\
Weekly rent index,,,
구분,North,South,West
(2024-01-01=100),,,
,,,
2024-01-01,100,100,100
2024-01-08,100.5,100.2,100.1
2024-01-15,101,100.4,100.3
";

const RENT_SPARSE: &str = "\
Weekly rent index,,,
구분,North,South,West
(2024-01-01=100),,,
,,,
2024-01-01,100,100,100
2024-01-15,101,100.4,100.3
";

const SALE_CHANGE: &str = "\
Weekly sale change,,,
구분,North,South,West
(%),,,
,,,
2024-01-08,1.0,-0.5,0
2024-01-15,0.99,-0.5,0.2
";

const RENT_CHANGE: &str = "\
Weekly rent change,,,
구분,North,South,West
(%),,,
,,,
2024-01-08,0.5,0.2,0.1
2024-01-15,0.49,0.2,0.2
";

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn config(dir: &Path, rent: &str) -> SourceConfig {
    SourceConfig {
        sale: write(dir, "sale.csv", SALE),
        rent: write(dir, "rent.csv", rent),
        sale_change: None,
        rent_change: None,
        skip_rows: vec![0, 2, 3],
        id_column: "구분".to_string(),
    }
}

fn request(regions: &[&str], range: DateRange) -> RenderRequest {
    RenderRequest {
        kind: PairKind::Index,
        range,
        regions: RegionFilter::new(regions.iter().copied()),
        colors: HashMap::new(),
        duplicates: DuplicatePolicy::Keep,
    }
}

#[test]
fn workbook_layout_loads_into_joined_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = SourceCache::new();
    let dataset = Dataset::load(&mut cache, &config(dir.path(), RENT)).unwrap();

    assert_eq!(dataset.regions(), ["North", "South", "West"]);
    assert_eq!(dataset.date_span(), Some(DateRange::new(d(1), d(15)).unwrap()));
    assert_eq!(dataset.indices.len(), 9);
    assert!(dataset.changes.is_none());
}

#[test]
fn north_and_south_paths_with_landmarks() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = SourceCache::new();
    let dataset = Dataset::load(&mut cache, &config(dir.path(), RENT)).unwrap();
    let run = run_paths(&dataset, &request(&["North", "South"], DateRange::new(d(1), d(15)).unwrap())).unwrap();

    let north = &run.trajectories["North"];
    assert_eq!(north.len(), 3);
    assert_eq!(north.first.date, d(1));
    assert_eq!(north.last.date, d(15));
    assert_relative_eq!(north.last.sale, 102.0);
    assert_relative_eq!(north.last.rent, 101.0);
    let prev = north.second_to_last.unwrap();
    assert_relative_eq!(prev.sale, 101.0);
    assert_relative_eq!(prev.rent, 100.5);

    let paths = run.outcome.paths();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].region, "North");
    assert_eq!(paths[1].region, "South");
    assert_eq!(paths[0].current.kind, LandmarkKind::Current);
    assert_eq!(paths[0].current.label.as_deref(), Some("North"));
    let dir_seg = paths[0].direction.unwrap();
    assert_relative_eq!(dir_seg.from.x, 101.0);
    assert_relative_eq!(dir_seg.to.y, 101.0);
    assert_ne!(paths[0].color, paths[1].color);
    assert_eq!(run.outcome.title(), "Sale/rent index path (2024-01-01 ~ 2024-01-15)");
}

#[test]
fn north_only_window_from_second_week() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = SourceCache::new();
    let dataset = Dataset::load(&mut cache, &config(dir.path(), RENT)).unwrap();
    let run = run_paths(&dataset, &request(&["North"], DateRange::new(d(8), d(15)).unwrap())).unwrap();

    assert_eq!(run.trajectories.len(), 1);
    assert!(!run.trajectories.contains_key("South"));
    let north = &run.trajectories["North"];
    assert_eq!(north.len(), 2);
    assert_relative_eq!(north.points[0].sale, 101.0);
    assert_relative_eq!(north.points[0].rent, 100.5);
    assert_relative_eq!(north.points[1].sale, 102.0);
    assert_relative_eq!(north.points[1].rent, 101.0);
    let prev = north.second_to_last.unwrap();
    assert_eq!(prev.date, d(8));
    assert_relative_eq!(prev.sale, 101.0);
    assert_relative_eq!(prev.rent, 100.5);
    assert_eq!(north.last.date, d(15));
    assert_relative_eq!(north.last.sale, 102.0);
    assert_relative_eq!(north.last.rent, 101.0);

    let paths = run.outcome.paths();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].region, "North");
    assert_eq!(run.outcome.title(), "Sale/rent index path (2024-01-08 ~ 2024-01-15)");
}

#[test]
fn missing_sale_cell_becomes_zero() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = SourceCache::new();
    let dataset = Dataset::load(&mut cache, &config(dir.path(), RENT)).unwrap();
    let run = run_paths(&dataset, &request(&["West"], DateRange::new(d(1), d(15)).unwrap())).unwrap();

    let west = &run.trajectories["West"];
    assert_eq!(west.len(), 3);
    assert_eq!(west.points[1].date, d(8));
    assert_relative_eq!(west.points[1].sale, 0.0);
    assert_relative_eq!(west.points[1].rent, 100.1);
}

#[test]
fn inner_join_keeps_only_shared_dates() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = SourceCache::new();
    let dataset = Dataset::load(&mut cache, &config(dir.path(), RENT_SPARSE)).unwrap();
    assert_eq!(dataset.indices.len(), 6);

    let run = run_paths(&dataset, &request(&["North"], DateRange::new(d(1), d(15)).unwrap())).unwrap();
    let north = &run.trajectories["North"];
    let dates: Vec<_> = north.points.iter().map(|p| p.date).collect();
    assert_eq!(dates, [d(1), d(15)]);
    assert_eq!(north.second_to_last.map(|p| p.date), Some(d(1)));
}

#[test]
fn window_outside_data_is_an_empty_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = SourceCache::new();
    let dataset = Dataset::load(&mut cache, &config(dir.path(), RENT)).unwrap();
    let june = |day| NaiveDate::from_ymd_opt(2023, 6, day).unwrap();
    let range = DateRange::new(june(1), june(30)).unwrap();
    let run = run_paths(&dataset, &request(&["North"], range)).unwrap();

    assert!(matches!(run.outcome, RenderOutcome::Empty { .. }));
    assert_eq!(run.outcome.title(), "Sale/rent index path (2023-06-01 ~ 2023-06-30)");
}

#[test]
fn change_tables_feed_latest_change_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), RENT);
    cfg.sale_change = Some(write(dir.path(), "sale_change.csv", SALE_CHANGE));
    cfg.rent_change = Some(write(dir.path(), "rent_change.csv", RENT_CHANGE));

    let mut cache = SourceCache::new();
    let dataset = Dataset::load(&mut cache, &cfg).unwrap();
    let changes = dataset.table(PairKind::Change).unwrap();
    assert_eq!(changes.kind, PairKind::Change);
    assert_eq!(changes.len(), 6);

    let run = run_paths(&dataset, &request(&["North"], DateRange::new(d(1), d(15)).unwrap())).unwrap();
    let latest = run.changes.as_ref().unwrap()["North"].last;
    assert_relative_eq!(latest.sale, 0.99);
    assert_relative_eq!(latest.rent, 0.49);

    let out = dir.path().join("paths.json");
    write_outcome_json(&out, &run.outcome).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["status"], "paths");
    assert_eq!(json["axes"]["x"], "sale index");
    assert_eq!(json["paths"][0]["region"], "North");
    assert_eq!(json["paths"][0]["color"], "#636efa");
    assert_eq!(json["paths"][0]["vertices"].as_array().unwrap().len(), 3);
}

#[test]
fn only_one_change_sheet_disables_change_space() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), RENT);
    cfg.sale_change = Some(write(dir.path(), "sale_change.csv", SALE_CHANGE));

    let mut cache = SourceCache::new();
    let dataset = Dataset::load(&mut cache, &cfg).unwrap();
    assert!(dataset.changes.is_none());

    let mut req = RenderRequest::defaults_for(&dataset).unwrap();
    req.kind = PairKind::Change;
    assert!(matches!(run_paths(&dataset, &req), Err(CoreError::ChangeTablesUnavailable)));
}

#[test]
fn wrong_id_column_names_the_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), RENT);
    cfg.id_column = "date".to_string();

    let mut cache = SourceCache::new();
    let err = Dataset::load(&mut cache, &cfg).unwrap_err();
    match &err {
        CoreError::SourceFormat(SourceFormatError::MissingColumn { sheet, column }) => {
            assert_eq!(sheet, "sale index");
            assert_eq!(column, "date");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("sale index"));
}

#[test]
fn reloading_unchanged_sources_hits_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), RENT);

    let mut cache = SourceCache::new();
    let first = Dataset::load(&mut cache, &cfg).unwrap();
    let second = Dataset::load(&mut cache, &cfg).unwrap();

    assert_eq!(cache.stats(), (2, 2));
    assert_eq!(first.indices, second.indices);
}
