use time::{
    format_description::{well_known::Rfc3339, BorrowedFormatItem},
    macros::format_description,
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
};
use tracing::{debug, warn};

use super::dates;
use super::dto::{NutritionSummary, PredictionView};
use super::repo::NutritionStore;
use super::repo_types::PredictionRow;
use crate::error::ApiError;

const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[month padding:none]/[day padding:none]/[year], [hour repr:12 padding:none]:[minute]:[second] [period]"
);
const NAIVE_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub async fn fetch_nutrition_summary(
    store: &dyn NutritionStore,
    payload: &str,
    display_offset: UtcOffset,
) -> Result<NutritionSummary, ApiError> {
    let range = dates::parse_range_payload(payload)?;
    let utc = dates::normalize(range.start, range.end)?;
    debug!(start = %utc.start, end = %utc.end, "normalized date range");

    let sums = store.sum_macros(&utc).await.map_err(ApiError::database)?;
    let days = dates::num_days(range.start, range.end);
    let totals = sums.map(round2);
    let averages = sums.map(|v| round2(v / f64::from(days)));

    let rows = store
        .list_predictions(&utc)
        .await
        .map_err(ApiError::database)?;
    let predictions = present_predictions(rows, display_offset);

    Ok(NutritionSummary {
        message: "Nutrition data retrieved from the document store.".into(),
        totals,
        averages,
        predictions,
        start_date: range.start_display,
        end_date: range.end_display,
        num_days: days,
    })
}

/// Drops rows without a classifier label and localizes the rest.
pub fn present_predictions(rows: Vec<PredictionRow>, offset: UtcOffset) -> Vec<PredictionView> {
    rows.into_iter()
        .filter_map(|row| {
            let prediction = row.prediction.filter(|p| !p.trim().is_empty())?;
            Some(PredictionView {
                timestamp: localize_timestamp(&row.timestamp, offset),
                prediction,
                probability: row.probability,
            })
        })
        .collect()
}

/// Renders a stored timestamp as `M/D/YYYY, h:mm:ss AM` in `offset`.
/// Timestamps without an offset are read as UTC; unparseable ones pass through.
pub fn localize_timestamp(raw: &str, offset: UtcOffset) -> String {
    let parsed = OffsetDateTime::parse(raw, &Rfc3339).ok().or_else(|| {
        raw.get(..19)
            .and_then(|head| PrimitiveDateTime::parse(head, NAIVE_TIMESTAMP_FORMAT).ok())
            .map(PrimitiveDateTime::assume_utc)
    });

    match parsed.and_then(|ts| ts.to_offset(offset).format(DISPLAY_FORMAT).ok()) {
        Some(rendered) => rendered,
        None => {
            warn!(timestamp = %raw, "unparseable stored timestamp; returning as stored");
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::repo_types::MacroSums;
    use crate::state::fakes::FakeNutritionStore;
    use serde_json::json;
    use time::macros::offset;

    fn three_day_store() -> FakeNutritionStore {
        FakeNutritionStore::new(vec![
            json!({"id": "a", "timestamp": "2023-01-01T08:00:00Z", "Calories": 500.0, "Protein": 20.5}),
            json!({"id": "b", "timestamp": "2023-01-02T12:30:00Z", "Calories": 600.0, "Protein": 10.25}),
            json!({"id": "c", "timestamp": "2023-01-03T23:59:59Z", "Calories": 700.0}),
            json!({"id": "d", "timestamp": "2023-01-04T00:00:00Z", "Calories": 9999.0}),
            json!({"id": "e", "timestamp": "2022-12-31T23:59:59Z", "Calories": 9999.0}),
        ])
    }

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(1800.0), 1800.0);
    }

    #[tokio::test]
    async fn totals_and_averages_over_range() {
        let store = three_day_store();
        let summary = fetch_nutrition_summary(&store, "2023-01-01 to 2023-01-03", UtcOffset::UTC)
            .await
            .unwrap();

        assert_eq!(summary.num_days, 3);
        assert_eq!(summary.totals.calories, Some(1800.0));
        assert_eq!(summary.averages.calories, Some(600.0));
        assert_eq!(summary.totals.protein, Some(30.75));
        assert_eq!(summary.averages.protein, Some(10.25));
        assert_eq!(summary.totals.sodium, None);
        assert_eq!(summary.start_date, "2023-01-01");
        assert_eq!(summary.end_date, "2023-01-03");
    }

    #[tokio::test]
    async fn queries_with_normalized_boundaries() {
        let store = three_day_store();
        fetch_nutrition_summary(&store, "2023-01-01 to 2023-01-03", UtcOffset::UTC)
            .await
            .unwrap();
        let seen = store.ranges_seen();
        assert_eq!(seen.len(), 2);
        for r in seen {
            assert_eq!(r.start, "2023-01-01T00:00:00Z");
            assert_eq!(r.end, "2023-01-04T00:00:00Z");
        }
    }

    #[tokio::test]
    async fn empty_range_yields_absent_values() {
        let store = FakeNutritionStore::new(vec![]);
        let summary = fetch_nutrition_summary(&store, "2023-05-01 to 2023-05-07", UtcOffset::UTC)
            .await
            .unwrap();
        assert_eq!(summary.totals, MacroSums::default());
        assert_eq!(summary.averages, MacroSums::default());
        assert!(summary.predictions.is_empty());
        assert_eq!(summary.num_days, 7);
    }

    #[tokio::test]
    async fn repeated_requests_are_identical() {
        let store = three_day_store();
        let a = fetch_nutrition_summary(&store, "2023-01-01 to 2023-01-03", UtcOffset::UTC)
            .await
            .unwrap();
        let b = fetch_nutrition_summary(&store, "2023-01-01 to 2023-01-03", UtcOffset::UTC)
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn malformed_payload_never_reaches_the_store() {
        let store = three_day_store();
        let err = fetch_nutrition_summary(&store, "2023-13-01 to 2023-01-03", UtcOffset::UTC)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidDateRange(_)));
        assert!(store.ranges_seen().is_empty());
    }

    #[tokio::test]
    async fn store_failure_surfaces_message() {
        let store = FakeNutritionStore::failing("database unavailable");
        let err = fetch_nutrition_summary(&store, "2023-01-01 to 2023-01-03", UtcOffset::UTC)
            .await
            .unwrap_err();
        match err {
            ApiError::Database(msg) => assert!(msg.contains("database unavailable")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn drops_rows_without_prediction() {
        let rows = vec![
            PredictionRow {
                timestamp: "2023-01-02T15:04:05Z".into(),
                prediction: None,
                probability: None,
            },
            PredictionRow {
                timestamp: "2023-01-02T16:00:00Z".into(),
                prediction: Some("   ".into()),
                probability: Some(0.4),
            },
            PredictionRow {
                timestamp: "2023-01-02T15:04:05Z".into(),
                prediction: Some("pizza".into()),
                probability: Some(0.91),
            },
        ];
        let views = present_predictions(rows, UtcOffset::UTC);
        assert_eq!(
            views,
            vec![PredictionView {
                timestamp: "1/2/2023, 3:04:05 PM".into(),
                prediction: "pizza".into(),
                probability: Some(0.91),
            }]
        );
    }

    #[test]
    fn localizes_into_display_offset() {
        assert_eq!(
            localize_timestamp("2023-01-02T03:04:05Z", offset!(-5)),
            "1/1/2023, 10:04:05 PM"
        );
        assert_eq!(
            localize_timestamp("2023-01-02T00:15:00.123456Z", UtcOffset::UTC),
            "1/2/2023, 12:15:00 AM"
        );
        assert_eq!(
            localize_timestamp("2023-07-04T12:00:00", UtcOffset::UTC),
            "7/4/2023, 12:00:00 PM"
        );
        assert_eq!(localize_timestamp("not a time", UtcOffset::UTC), "not a time");
    }
}
