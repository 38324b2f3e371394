use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::metrics::extract::MetricFragment;
use crate::models::daily_metric::{
    BloodPressureUpdate, DailyHealthMetric, DailyMetricPatch, NutritionUpdate, WeightUpdate,
};

/// Group fragments by their local calendar day. BTreeMap keeps the days in
/// ascending order, which fixes the upsert order downstream.
pub fn group_by_day(fragments: Vec<MetricFragment>) -> BTreeMap<NaiveDate, Vec<MetricFragment>> {
    let mut by_day: BTreeMap<NaiveDate, Vec<MetricFragment>> = BTreeMap::new();
    for fragment in fragments {
        if let Some(day) = fragment.day() {
            by_day.entry(day).or_default().push(fragment);
        }
    }
    by_day
}

/// Fold one day's fragments onto the stored record (or an empty shell) and
/// return the patch to apply, or `None` when no family changed.
///
/// Freshness policy, per metric family: an incoming sample wins when the
/// record holds nothing for that family yet, or when its provenance
/// nanoseconds are earlier than the stored watermark. Nutrition has one
/// extra trigger: a numerically different calorie reading always wins, so
/// corrections propagate even when the provenance ordering would not.
pub fn merge_day(
    existing: Option<&DailyHealthMetric>,
    fragments: &[MetricFragment],
    fetched_at: DateTime<Utc>,
) -> Option<DailyMetricPatch> {
    let mut patch = DailyMetricPatch {
        weight: None,
        blood_pressure: None,
        nutrition: None,
        last_fetched_at: fetched_at,
    };

    let mut weight_nanos = existing.and_then(|r| r.weight_source_nanos);
    let mut bp_nanos = existing.and_then(|r| r.blood_pressure_source_nanos);
    let mut nutrition_nanos = existing.and_then(|r| r.nutrition_source_nanos);
    let mut calories = existing.and_then(|r| r.calories);

    for fragment in fragments {
        match fragment {
            MetricFragment::Weight(incoming) => {
                if fresher(incoming.source_nanos, weight_nanos) {
                    patch.weight = Some(WeightUpdate {
                        weight: incoming.weight,
                        source_nanos: incoming.source_nanos,
                    });
                    weight_nanos = Some(incoming.source_nanos);
                }
            }
            MetricFragment::BloodPressure(incoming) => {
                if fresher(incoming.source_nanos, bp_nanos) {
                    patch.blood_pressure = Some(BloodPressureUpdate {
                        systolic: incoming.systolic,
                        diastolic: incoming.diastolic,
                        source_nanos: incoming.source_nanos,
                    });
                    bp_nanos = Some(incoming.source_nanos);
                }
            }
            MetricFragment::Nutrition(incoming) => {
                if fresher(incoming.source_nanos, nutrition_nanos) || incoming.calories != calories
                {
                    patch.nutrition = Some(NutritionUpdate {
                        calories: incoming.calories,
                        sodium: incoming.sodium,
                        protein: incoming.protein,
                        fat: incoming.fat,
                        source_nanos: incoming.source_nanos,
                    });
                    nutrition_nanos = Some(incoming.source_nanos);
                    calories = incoming.calories;
                }
            }
            MetricFragment::Unrecognized { .. } => {}
        }
    }

    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

/// Earliest provenance wins: write when nothing is stored for the family
/// yet, or when the incoming sample predates the stored watermark.
fn fresher(incoming_nanos: i64, stored_nanos: Option<i64>) -> bool {
    match stored_nanos {
        None => true,
        Some(stored) => incoming_nanos < stored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::extract::{NutritionFragment, WeightFragment};
    use uuid::Uuid;

    const N1: i64 = 1_700_000_000_000_000_000;
    const N2: i64 = N1 - 1_000_000_000_000_000; // earlier in absolute terms

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, 15).unwrap()
    }

    fn weight_fragment(source_nanos: i64, weight: f64) -> MetricFragment {
        MetricFragment::Weight(WeightFragment {
            day: day(),
            source_nanos,
            weight: Some(weight),
        })
    }

    fn nutrition_fragment(source_nanos: i64, calories: f64) -> MetricFragment {
        MetricFragment::Nutrition(NutritionFragment {
            day: day(),
            source_nanos,
            calories: Some(calories),
            sodium: None,
            protein: None,
            fat: None,
        })
    }

    fn stored(apply: &DailyMetricPatch) -> DailyHealthMetric {
        let mut record = DailyHealthMetric::empty(Uuid::new_v4(), day(), Utc::now());
        apply.apply_to(&mut record);
        record
    }

    #[test]
    fn no_fragments_means_no_patch() {
        let record = DailyHealthMetric::empty(Uuid::new_v4(), day(), Utc::now());
        assert!(merge_day(Some(&record), &[], Utc::now()).is_none());
    }

    #[test]
    fn earliest_weight_wins_in_either_order() {
        let fetched_at = Utc::now();
        for fragments in [
            vec![weight_fragment(N1, 70.5), weight_fragment(N2, 69.0)],
            vec![weight_fragment(N2, 69.0), weight_fragment(N1, 70.5)],
        ] {
            let patch = merge_day(None, &fragments, fetched_at).expect("patch expected");
            let update = patch.weight.as_ref().expect("weight update expected");
            assert_eq!(update.weight, Some(69.0));
            assert_eq!(update.source_nanos, N2);
        }
    }

    #[test]
    fn stored_earlier_weight_is_not_overwritten() {
        let fetched_at = Utc::now();
        let first = merge_day(None, &[weight_fragment(N2, 69.0)], fetched_at).unwrap();
        let record = stored(&first);

        // A later-provenance sample for the same day must not win.
        let second = merge_day(Some(&record), &[weight_fragment(N1, 70.5)], fetched_at);
        assert!(second.is_none());
    }

    #[test]
    fn replaying_identical_data_is_a_noop() {
        let fetched_at = Utc::now();
        let fragments = vec![weight_fragment(N1, 70.5), nutrition_fragment(N1, 2000.0)];
        let first = merge_day(None, &fragments, fetched_at).unwrap();
        let record = stored(&first);

        assert!(merge_day(Some(&record), &fragments, fetched_at).is_none());
    }

    #[test]
    fn calorie_change_forces_nutrition_write() {
        let fetched_at = Utc::now();
        let first = merge_day(None, &[nutrition_fragment(N2, 2000.0)], fetched_at).unwrap();
        let record = stored(&first);

        // Not earlier than the stored watermark, but calories differ.
        let second =
            merge_day(Some(&record), &[nutrition_fragment(N1, 1800.0)], fetched_at).unwrap();
        let update = second.nutrition.as_ref().expect("nutrition update expected");
        assert_eq!(update.calories, Some(1800.0));
        assert_eq!(update.source_nanos, N1);
    }

    #[test]
    fn same_calories_with_later_provenance_is_a_noop() {
        let fetched_at = Utc::now();
        let first = merge_day(None, &[nutrition_fragment(N2, 2000.0)], fetched_at).unwrap();
        let record = stored(&first);

        let second = merge_day(Some(&record), &[nutrition_fragment(N1, 2000.0)], fetched_at);
        assert!(second.is_none());
    }

    #[test]
    fn families_merge_independently() {
        let fetched_at = Utc::now();
        let first = merge_day(None, &[weight_fragment(N2, 69.0)], fetched_at).unwrap();
        let record = stored(&first);

        // Weight loses on provenance, nutrition is new; only nutrition lands.
        let fragments = vec![weight_fragment(N1, 70.5), nutrition_fragment(N1, 2000.0)];
        let patch = merge_day(Some(&record), &fragments, fetched_at).unwrap();
        assert!(patch.weight.is_none());
        assert!(patch.nutrition.is_some());
    }

    #[test]
    fn grouping_is_ascending_by_day() {
        let d1 = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2023, 11, 15).unwrap();
        let fragments = vec![
            MetricFragment::Weight(WeightFragment {
                day: d2,
                source_nanos: N1,
                weight: Some(70.0),
            }),
            MetricFragment::Weight(WeightFragment {
                day: d1,
                source_nanos: N2,
                weight: Some(69.5),
            }),
            MetricFragment::Unrecognized {
                data_type: "com.google.step_count.delta".to_string(),
            },
        ];
        let grouped = group_by_day(fragments);
        let days: Vec<NaiveDate> = grouped.keys().copied().collect();
        assert_eq!(days, vec![d1, d2]);
        // Unrecognized fragments carry no day and are not grouped.
        assert_eq!(grouped.values().map(Vec::len).sum::<usize>(), 2);
    }
}
