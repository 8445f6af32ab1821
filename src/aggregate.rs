use std::collections::BTreeSet;

use crate::models::{Totals, WeeklyRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeekSelection {
    #[default]
    All,
    Week(i64),
}

impl From<Option<i64>> for WeekSelection {
    fn from(week: Option<i64>) -> Self {
        week.map_or(WeekSelection::All, WeekSelection::Week)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub week: WeekSelection,
    pub search: String,
}

impl RecordFilter {
    pub fn matches(&self, record: &WeeklyRecord) -> bool {
        let matches_week = match self.week {
            WeekSelection::All => true,
            WeekSelection::Week(week) => record.week_number == week,
        };
        let term = self.search.to_lowercase();
        let matches_search = record.material_type.to_lowercase().contains(&term)
            || record.week_number.to_string().contains(&term);
        matches_week && matches_search
    }

    pub fn apply(&self, records: &[WeeklyRecord]) -> Vec<WeeklyRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

pub fn unique_weeks(records: &[WeeklyRecord]) -> Vec<i64> {
    let weeks: BTreeSet<i64> = records.iter().map(|record| record.week_number).collect();
    weeks.into_iter().collect()
}

/// Sums the additive fields. `excess_hours_per_person` is a per-head ratio
/// and is left out.
pub fn totals(records: &[WeeklyRecord]) -> Totals {
    records.iter().fold(Totals::default(), |acc, record| Totals {
        production_volume: acc.production_volume + record.production_volume,
        hours_need: acc.hours_need + record.hours_need,
        mod_count: acc.mod_count + record.mod_count,
        hours_person_available: acc.hours_person_available + record.hours_person_available,
        excess_person_hours: acc.excess_person_hours + record.excess_person_hours,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) fn record(
        week: i64,
        material: &str,
        volume: i64,
        hours_need: f64,
        mod_count: i64,
        available: f64,
        excess: f64,
    ) -> WeeklyRecord {
        WeeklyRecord {
            id: week * 10,
            week_number: week,
            material_type: material.to_string(),
            productivity_target: 5.2,
            production_volume: volume,
            hours_need,
            mod_count,
            hours_person_available: available,
            excess_person_hours: excess,
            excess_hours_per_person: if mod_count == 0 {
                0.0
            } else {
                excess / mod_count as f64
            },
        }
    }

    pub(crate) fn sample_records() -> Vec<WeeklyRecord> {
        vec![
            record(46, "CU", 40000, 7692.0, 311, 14461.0, 6769.0),
            record(46, "AL", 7000, 1346.0, 70, 3255.0, 1909.0),
            record(47, "CU", 45000, 8182.0, 330, 15000.0, 6818.0),
        ]
    }

    #[test]
    fn empty_list_sums_to_zero() {
        assert_eq!(totals(&[]), Totals::default());
    }

    #[test]
    fn week_46_totals_match_the_dashboard() {
        let filter = RecordFilter {
            week: WeekSelection::Week(46),
            search: String::new(),
        };
        let filtered = filter.apply(&sample_records());
        assert_eq!(filtered.len(), 2);

        let sum = totals(&filtered);
        assert_eq!(
            sum,
            Totals {
                production_volume: 47000,
                hours_need: 9038.0,
                mod_count: 381,
                hours_person_available: 17716.0,
                excess_person_hours: 8678.0,
            }
        );
    }

    #[test]
    fn search_matches_material_case_insensitively() {
        let filter = RecordFilter {
            week: WeekSelection::All,
            search: "cu".to_string(),
        };
        let filtered = filter.apply(&sample_records());
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|record| record.material_type == "CU"));
    }

    #[test]
    fn search_matches_week_digits() {
        let filter = RecordFilter {
            week: WeekSelection::All,
            search: "7".to_string(),
        };
        let filtered = filter.apply(&sample_records());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].week_number, 47);
    }

    #[test]
    fn search_term_is_not_trimmed() {
        let filter = RecordFilter {
            week: WeekSelection::All,
            search: " cu".to_string(),
        };
        assert!(filter.apply(&sample_records()).is_empty());
    }

    #[test]
    fn week_and_search_must_both_match() {
        let filter = RecordFilter {
            week: WeekSelection::Week(47),
            search: "al".to_string(),
        };
        assert!(filter.apply(&sample_records()).is_empty());
    }

    #[test]
    fn unique_weeks_sort_numerically() {
        let records = vec![
            record(10, "CU", 1, 1.0, 1, 1.0, 1.0),
            record(9, "CU", 1, 1.0, 1, 1.0, 1.0),
            record(10, "AL", 1, 1.0, 1, 1.0, 1.0),
            record(2, "AL", 1, 1.0, 1, 1.0, 1.0),
        ];
        assert_eq!(unique_weeks(&records), vec![2, 9, 10]);
    }

    fn record_strategy() -> impl Strategy<Value = WeeklyRecord> {
        (
            1i64..=53,
            prop_oneof![Just("CU"), Just("AL")],
            0i64..1_000_000,
            0i32..100_000,
            0i64..5_000,
            0i32..100_000,
            -50_000i32..50_000,
        )
            .prop_map(|(week, material, volume, need, mod_count, available, excess)| {
                record(
                    week,
                    material,
                    volume,
                    f64::from(need),
                    mod_count,
                    f64::from(available),
                    f64::from(excess),
                )
            })
    }

    proptest! {
        #[test]
        fn totals_ignore_record_order(
            (records, shuffled) in proptest::collection::vec(record_strategy(), 0..40)
                .prop_flat_map(|records| {
                    let shuffled = Just(records.clone()).prop_shuffle();
                    (Just(records), shuffled)
                })
        ) {
            prop_assert_eq!(totals(&records), totals(&shuffled));
        }

        #[test]
        fn totals_split_and_combine(
            records in proptest::collection::vec(record_strategy(), 0..40),
            split in any::<prop::sample::Index>()
        ) {
            let at = split.index(records.len() + 1);
            let (left, right) = records.split_at(at);
            let (left, right) = (totals(left), totals(right));
            let whole = totals(&records);

            prop_assert_eq!(whole.production_volume, left.production_volume + right.production_volume);
            prop_assert_eq!(whole.mod_count, left.mod_count + right.mod_count);
            prop_assert_eq!(whole.hours_need, left.hours_need + right.hours_need);
            prop_assert_eq!(whole.hours_person_available, left.hours_person_available + right.hours_person_available);
            prop_assert_eq!(whole.excess_person_hours, left.excess_person_hours + right.excess_person_hours);
        }
    }
}
