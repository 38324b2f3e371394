use chrono::NaiveDate;

use crate::metrics::local_day::{local_day, parse_source_nanos, InvalidPoint};
use crate::models::google_fit::DataPoint;

pub const WEIGHT_SUMMARY: &str = "com.google.weight.summary";
pub const BLOOD_PRESSURE_SUMMARY: &str = "com.google.blood_pressure.summary";
pub const NUTRITION_SUMMARY: &str = "com.google.nutrition.summary";

/// One typed sample, tagged by metric family and stamped with the local
/// calendar day and its provenance nanoseconds.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricFragment {
    Weight(WeightFragment),
    BloodPressure(BloodPressureFragment),
    Nutrition(NutritionFragment),
    Unrecognized { data_type: String },
}

impl MetricFragment {
    pub fn day(&self) -> Option<NaiveDate> {
        match self {
            MetricFragment::Weight(f) => Some(f.day),
            MetricFragment::BloodPressure(f) => Some(f.day),
            MetricFragment::Nutrition(f) => Some(f.day),
            MetricFragment::Unrecognized { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightFragment {
    pub day: NaiveDate,
    pub source_nanos: i64,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BloodPressureFragment {
    pub day: NaiveDate,
    pub source_nanos: i64,
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutritionFragment {
    pub day: NaiveDate,
    pub source_nanos: i64,
    pub calories: Option<f64>,
    pub sodium: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
}

/// Parse one provider point into a typed fragment. Timestamp problems are
/// errors (the caller drops the point); an unknown data type is a fragment
/// variant so the caller can count it separately.
pub fn extract_fragment(point: &DataPoint) -> Result<MetricFragment, InvalidPoint> {
    let source_nanos = parse_source_nanos(point.start_time_nanos.as_deref())?;
    let day = local_day(source_nanos)?;

    let fragment = match point.data_type_name.as_str() {
        WEIGHT_SUMMARY => MetricFragment::Weight(WeightFragment {
            day,
            source_nanos,
            weight: scalar_at(point, 0),
        }),
        // Positional contract from the provider's summary schema:
        // index 0 is systolic, index 3 is diastolic.
        BLOOD_PRESSURE_SUMMARY => MetricFragment::BloodPressure(BloodPressureFragment {
            day,
            source_nanos,
            systolic: scalar_at(point, 0),
            diastolic: scalar_at(point, 3),
        }),
        NUTRITION_SUMMARY => {
            let mut fragment = NutritionFragment {
                day,
                source_nanos,
                calories: None,
                sodium: None,
                protein: None,
                fat: None,
            };
            if let Some(map) = point.value.first() {
                for entry in &map.map_val {
                    match entry.key.as_str() {
                        "calories" => fragment.calories = entry.value.fp_val,
                        "sodium" => fragment.sodium = entry.value.fp_val,
                        "protein" => fragment.protein = entry.value.fp_val,
                        "fat.total" => fragment.fat = entry.value.fp_val,
                        _ => {}
                    }
                }
            }
            MetricFragment::Nutrition(fragment)
        }
        other => MetricFragment::Unrecognized {
            data_type: other.to_string(),
        },
    };

    Ok(fragment)
}

fn scalar_at(point: &DataPoint, index: usize) -> Option<f64> {
    point.value.get(index).and_then(|v| v.fp_val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::google_fit::{MapFieldValue, MapValEntry, PointValue};

    const NANOS: i64 = 1_700_000_000_000_000_000;

    fn point(data_type: &str, values: Vec<PointValue>) -> DataPoint {
        DataPoint {
            data_type_name: data_type.to_string(),
            start_time_nanos: Some(NANOS.to_string()),
            value: values,
        }
    }

    fn scalar(fp_val: f64) -> PointValue {
        PointValue {
            fp_val: Some(fp_val),
            map_val: vec![],
        }
    }

    fn map_entry(key: &str, fp_val: f64) -> MapValEntry {
        MapValEntry {
            key: key.to_string(),
            value: MapFieldValue { fp_val: Some(fp_val) },
        }
    }

    #[test]
    fn weight_point_uses_first_scalar() {
        let fragment = extract_fragment(&point(WEIGHT_SUMMARY, vec![scalar(70.5)])).unwrap();
        match fragment {
            MetricFragment::Weight(w) => {
                assert_eq!(w.weight, Some(70.5));
                assert_eq!(w.source_nanos, NANOS);
            }
            other => panic!("expected weight fragment, got {:?}", other),
        }
    }

    #[test]
    fn weight_point_without_scalar_is_none() {
        let fragment = extract_fragment(&point(WEIGHT_SUMMARY, vec![])).unwrap();
        match fragment {
            MetricFragment::Weight(w) => assert_eq!(w.weight, None),
            other => panic!("expected weight fragment, got {:?}", other),
        }
    }

    #[test]
    fn blood_pressure_reads_indices_zero_and_three() {
        let values = vec![scalar(120.0), scalar(115.0), scalar(118.0), scalar(80.0)];
        let fragment = extract_fragment(&point(BLOOD_PRESSURE_SUMMARY, values)).unwrap();
        match fragment {
            MetricFragment::BloodPressure(bp) => {
                assert_eq!(bp.systolic, Some(120.0));
                assert_eq!(bp.diastolic, Some(80.0));
            }
            other => panic!("expected blood pressure fragment, got {:?}", other),
        }
    }

    #[test]
    fn short_blood_pressure_values_leave_diastolic_empty() {
        let values = vec![scalar(120.0), scalar(115.0)];
        let fragment = extract_fragment(&point(BLOOD_PRESSURE_SUMMARY, values)).unwrap();
        match fragment {
            MetricFragment::BloodPressure(bp) => {
                assert_eq!(bp.systolic, Some(120.0));
                assert_eq!(bp.diastolic, None);
            }
            other => panic!("expected blood pressure fragment, got {:?}", other),
        }
    }

    #[test]
    fn nutrition_scans_named_map_entries() {
        let map = PointValue {
            fp_val: None,
            map_val: vec![
                map_entry("calories", 2000.0),
                map_entry("sodium", 2.3),
                map_entry("protein", 80.0),
                map_entry("fat.total", 60.0),
                map_entry("carbs.total", 250.0), // not tracked, ignored
            ],
        };
        let fragment = extract_fragment(&point(NUTRITION_SUMMARY, vec![map])).unwrap();
        match fragment {
            MetricFragment::Nutrition(n) => {
                assert_eq!(n.calories, Some(2000.0));
                assert_eq!(n.sodium, Some(2.3));
                assert_eq!(n.protein, Some(80.0));
                assert_eq!(n.fat, Some(60.0));
            }
            other => panic!("expected nutrition fragment, got {:?}", other),
        }
    }

    #[test]
    fn nutrition_with_missing_keys_leaves_fields_empty() {
        let map = PointValue {
            fp_val: None,
            map_val: vec![map_entry("calories", 1800.0)],
        };
        let fragment = extract_fragment(&point(NUTRITION_SUMMARY, vec![map])).unwrap();
        match fragment {
            MetricFragment::Nutrition(n) => {
                assert_eq!(n.calories, Some(1800.0));
                assert_eq!(n.sodium, None);
                assert_eq!(n.protein, None);
                assert_eq!(n.fat, None);
            }
            other => panic!("expected nutrition fragment, got {:?}", other),
        }
    }

    #[test]
    fn unknown_data_type_is_unrecognized() {
        let fragment = extract_fragment(&point("com.google.step_count.delta", vec![])).unwrap();
        assert_eq!(
            fragment,
            MetricFragment::Unrecognized {
                data_type: "com.google.step_count.delta".to_string()
            }
        );
    }

    #[test]
    fn point_without_start_time_is_rejected() {
        let mut p = point(WEIGHT_SUMMARY, vec![scalar(70.0)]);
        p.start_time_nanos = None;
        assert_eq!(extract_fragment(&p), Err(InvalidPoint::MissingStartTime));
    }
}
