use crate::models::daily_metric::{DailyHealthMetric, WeightTrendPoint};

/// Window for the dashboard's moving weight average
/// This can be easily changed to make the trailing period configurable
pub const MOVING_AVERAGE_WINDOW_DAYS: usize = 7;

/// Rolling 7-entry weight average over date-ascending records. Days with no
/// weight reading contribute nothing to the window; a window with no
/// readings at all yields `None`. Values are rounded to two decimals.
pub fn weight_trend_series(records: &[DailyHealthMetric]) -> Vec<WeightTrendPoint> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let start = index.saturating_sub(MOVING_AVERAGE_WINDOW_DAYS - 1);
            let weights: Vec<f64> = records[start..=index]
                .iter()
                .filter_map(|r| r.weight)
                .collect();
            let average = if weights.is_empty() {
                None
            } else {
                Some(round2(weights.iter().sum::<f64>() / weights.len() as f64))
            };
            WeightTrendPoint {
                date: record.calendar_date,
                weight: record.weight.map(round2),
                moving_avg_weight: average,
            }
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn record(day: u32, weight: Option<f64>) -> DailyHealthMetric {
        let date = NaiveDate::from_ymd_opt(2023, 11, day).unwrap();
        let mut record = DailyHealthMetric::empty(Uuid::nil(), date, Utc::now());
        record.weight = weight;
        record
    }

    #[test]
    fn empty_input_yields_empty_series() {
        assert!(weight_trend_series(&[]).is_empty());
    }

    #[test]
    fn average_grows_with_the_window() {
        let records = vec![record(1, Some(70.0)), record(2, Some(71.0)), record(3, Some(72.0))];
        let series = weight_trend_series(&records);
        assert_eq!(series[0].moving_avg_weight, Some(70.0));
        assert_eq!(series[1].moving_avg_weight, Some(70.5));
        assert_eq!(series[2].moving_avg_weight, Some(71.0));
    }

    #[test]
    fn missing_weights_are_skipped_not_zeroed() {
        let records = vec![record(1, Some(70.0)), record(2, None), record(3, Some(72.0))];
        let series = weight_trend_series(&records);
        assert_eq!(series[1].weight, None);
        assert_eq!(series[1].moving_avg_weight, Some(70.0));
        assert_eq!(series[2].moving_avg_weight, Some(71.0));
    }

    #[test]
    fn window_only_covers_the_last_seven_entries() {
        let records: Vec<DailyHealthMetric> =
            (1..=9).map(|d| record(d, Some(d as f64))).collect();
        let series = weight_trend_series(&records);
        // Entry 9 averages days 3..=9.
        assert_eq!(series[8].moving_avg_weight, Some(6.0));
    }

    #[test]
    fn values_round_to_two_decimals() {
        let records = vec![record(1, Some(70.123)), record(2, Some(70.456))];
        let series = weight_trend_series(&records);
        assert_eq!(series[0].weight, Some(70.12));
        assert_eq!(series[1].moving_avg_weight, Some(70.29));
    }

    #[test]
    fn all_missing_weights_yield_no_average() {
        let records = vec![record(1, None), record(2, None)];
        let series = weight_trend_series(&records);
        assert_eq!(series[0].moving_avg_weight, None);
        assert_eq!(series[1].moving_avg_weight, None);
    }
}
