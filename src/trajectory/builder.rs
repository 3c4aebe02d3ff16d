//! Per-region trajectory construction.
//!
//! Steps:
//! 1) keep records whose region is selected and whose date is in the window
//! 2) group by region, then stable-sort each group by date
//! 3) derive landmarks (first, last, second-to-last)
//!
//! No resampling happens: each trajectory passes through the raw sample
//! points only, so regions may end up with different point counts.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::domain::{DateRange, DuplicatePolicy, JointTable, RegionFilter, Trajectory, TrajectoryPoint};
use crate::error::{CoreError, CoreResult};

/// Trajectories keyed by region, in the region filter's order.
pub type Trajectories = IndexMap<String, Trajectory>;

/// Build one trajectory per selected region that has data in `range`.
///
/// Regions without any point in the window get no entry at all.
pub fn build(
    table: &JointTable,
    regions: &RegionFilter,
    range: DateRange,
    duplicates: DuplicatePolicy,
) -> CoreResult<Trajectories> {
    let mut grouped: HashMap<&str, Vec<TrajectoryPoint>> = HashMap::new();
    let mut kept = 0usize;

    for rec in &table.records {
        if !regions.contains(&rec.region) || !range.contains(rec.date) {
            continue;
        }
        grouped.entry(rec.region.as_str()).or_default().push(TrajectoryPoint {
            date: rec.date,
            sale: rec.sale,
            rent: rec.rent,
        });
        kept += 1;
    }

    let mut out = Trajectories::with_capacity(grouped.len());
    for region in regions.iter() {
        let Some(mut points) = grouped.remove(region) else {
            trace!(region, "no points in window");
            continue;
        };

        // `sort_by_key` is stable: equal dates keep their input order.
        points.sort_by_key(|p| p.date);

        if duplicates == DuplicatePolicy::Reject {
            if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
                return Err(CoreError::DuplicateDate {
                    region: region.to_string(),
                    date: pair[0].date,
                });
            }
        }

        if let Some(trajectory) = Trajectory::from_sorted(region, points) {
            out.insert(region.to_string(), trajectory);
        }
    }

    debug!(
        kind = table.kind.display_name(),
        selected = regions.len(),
        regions_with_data = out.len(),
        points = kept,
        range = %range,
        "built trajectories"
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JointRecord, PairKind};
    use chrono::NaiveDate;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn rec(date: NaiveDate, region: &str, sale: f64, rent: f64) -> JointRecord {
        JointRecord {
            date,
            region: region.to_string(),
            sale,
            rent,
        }
    }

    fn north_south() -> JointTable {
        JointTable {
            kind: PairKind::Index,
            records: vec![
                rec(d(1, 15), "North", 102.0, 101.0),
                rec(d(1, 1), "North", 100.0, 100.0),
                rec(d(1, 8), "North", 101.0, 100.5),
                rec(d(1, 1), "South", 100.0, 100.0),
                rec(d(1, 8), "South", 99.0, 100.0),
                rec(d(1, 15), "South", 98.0, 99.5),
            ],
        }
    }

    #[test]
    fn sorts_by_date_and_derives_landmarks() {
        let range = DateRange::new(d(1, 1), d(1, 31)).unwrap();
        let out = build(&north_south(), &RegionFilter::new(["North"]), range, DuplicatePolicy::Keep).unwrap();

        let north = &out["North"];
        let dates: Vec<NaiveDate> = north.points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(1, 1), d(1, 8), d(1, 15)]);
        assert_eq!(north.first.sale, 100.0);
        assert_eq!(north.last.sale, 102.0);
        assert_eq!(north.second_to_last.map(|p| p.date), Some(d(1, 8)));
        assert!(!out.contains_key("South"));
    }

    #[test]
    fn north_window_from_second_week_has_two_points() {
        let range = DateRange::new(d(1, 8), d(1, 15)).unwrap();
        let out = build(&north_south(), &RegionFilter::new(["North"]), range, DuplicatePolicy::Keep).unwrap();

        assert_eq!(out.len(), 1);
        assert!(!out.contains_key("South"));
        let north = &out["North"];
        let pairs: Vec<(f64, f64)> = north.points.iter().map(|p| (p.sale, p.rent)).collect();
        assert_eq!(pairs, vec![(101.0, 100.5), (102.0, 101.0)]);
        let prev = north.second_to_last.unwrap();
        assert_eq!((prev.sale, prev.rent), (101.0, 100.5));
        assert_eq!((north.last.sale, north.last.rent), (102.0, 101.0));
        assert_eq!(north.first.date, d(1, 8));
    }

    #[test]
    fn output_follows_selection_order_and_skips_empty_regions() {
        let range = DateRange::new(d(1, 1), d(1, 31)).unwrap();
        let filter = RegionFilter::new(["South", "East", "North"]);
        let out = build(&north_south(), &filter, range, DuplicatePolicy::Keep).unwrap();
        assert_eq!(out.keys().collect::<Vec<_>>(), ["South", "North"]);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let range = DateRange::new(d(1, 8), d(1, 8)).unwrap();
        let out = build(&north_south(), &RegionFilter::new(["North"]), range, DuplicatePolicy::Keep).unwrap();
        let north = &out["North"];
        assert_eq!(north.len(), 1);
        assert!(north.second_to_last.is_none());
    }

    #[test]
    fn duplicate_dates_keep_input_order_by_default() {
        let table = JointTable {
            kind: PairKind::Index,
            records: vec![
                rec(d(1, 8), "North", 2.0, 2.0),
                rec(d(1, 1), "North", 1.0, 1.0),
                rec(d(1, 8), "North", 3.0, 3.0),
            ],
        };
        let range = DateRange::new(d(1, 1), d(1, 31)).unwrap();
        let out = build(&table, &RegionFilter::new(["North"]), range, DuplicatePolicy::Keep).unwrap();
        let sales: Vec<f64> = out["North"].points.iter().map(|p| p.sale).collect();
        assert_eq!(sales, vec![1.0, 2.0, 3.0]);
        assert_eq!(out["North"].second_to_last.map(|p| p.sale), Some(2.0));
    }

    #[test]
    fn duplicate_dates_can_be_rejected() {
        let table = JointTable {
            kind: PairKind::Index,
            records: vec![rec(d(1, 8), "North", 2.0, 2.0), rec(d(1, 8), "North", 3.0, 3.0)],
        };
        let range = DateRange::new(d(1, 1), d(1, 31)).unwrap();
        let err = build(&table, &RegionFilter::new(["North"]), range, DuplicatePolicy::Reject).unwrap_err();
        match err {
            CoreError::DuplicateDate { region, date } => {
                assert_eq!(region, "North");
                assert_eq!(date, d(1, 8));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicates_outside_the_window_do_not_trip_reject() {
        let table = JointTable {
            kind: PairKind::Index,
            records: vec![
                rec(d(1, 1), "North", 1.0, 1.0),
                rec(d(1, 1), "North", 1.5, 1.5),
                rec(d(1, 8), "North", 2.0, 2.0),
            ],
        };
        let range = DateRange::new(d(1, 8), d(1, 31)).unwrap();
        let out = build(&table, &RegionFilter::new(["North"]), range, DuplicatePolicy::Reject).unwrap();
        assert_eq!(out["North"].len(), 1);
    }

    #[test]
    fn empty_table_or_filter_gives_empty_map() {
        let range = DateRange::new(d(1, 1), d(1, 31)).unwrap();
        let out = build(&JointTable::empty(PairKind::Index), &RegionFilter::new(["North"]), range, DuplicatePolicy::Keep)
            .unwrap();
        assert!(out.is_empty());

        let out = build(&north_south(), &RegionFilter::default(), range, DuplicatePolicy::Keep).unwrap();
        assert!(out.is_empty());
    }
}
