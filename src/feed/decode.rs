use crate::error::{Result, SpotSyncError};
use crate::feed::types::{FeedResponse, PricePoint};
use crate::time_window::parse_feed_time;

/// Decode a feed response body into price points, preserving series order.
///
/// `error: true` in the envelope yields [`SpotSyncError::FeedReported`]; a
/// malformed body or any unparseable `startDate` yields
/// [`SpotSyncError::Decode`] and discards the entries decoded so far.
pub fn decode_response(body: &[u8]) -> Result<Vec<PricePoint>> {
    let response: FeedResponse = serde_json::from_slice(body)
        .map_err(|e| SpotSyncError::decode(format!("malformed price feed response: {}", e)))?;

    if response.error {
        return Err(SpotSyncError::feed_reported(
            "price feed response contains error",
        ));
    }

    response
        .series
        .into_iter()
        .map(|entry| -> Result<PricePoint> {
            Ok(PricePoint {
                start_date: parse_feed_time(&entry.start_date)?,
                value: entry.value,
                unit: entry.unit,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn decodes_series_in_order() {
        let body = br#"{
            "error": false,
            "series": [
                {"startDate": "2024-02-25T13:00", "value": 4.25, "unit": "c/kWh"},
                {"startDate": "2024-02-25T12:00", "value": 3.5, "unit": "c/kWh"}
            ]
        }"#;
        let points = decode_response(body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(
            points[0].start_date,
            Utc.with_ymd_and_hms(2024, 2, 25, 13, 0, 0).unwrap()
        );
        assert_eq!(points[0].value, 4.25);
        assert_eq!(points[0].unit, "c/kWh");
        assert_eq!(
            points[1].start_date,
            Utc.with_ymd_and_hms(2024, 2, 25, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn feed_error_flag_is_distinct() {
        let err = decode_response(br#"{"error": true, "series": []}"#).unwrap_err();
        assert!(matches!(err, SpotSyncError::FeedReported { .. }));
    }

    #[test]
    fn one_bad_timestamp_fails_everything() {
        let body = br#"{"error": false, "series": [
            {"startDate": "2024-02-25T13:00", "value": 1.0, "unit": "c/kWh"},
            {"startDate": "25.02.2024 14:00", "value": 2.0, "unit": "c/kWh"}
        ]}"#;
        let err = decode_response(body).unwrap_err();
        assert!(matches!(err, SpotSyncError::Decode { .. }));
        assert!(err.to_string().contains("25.02.2024 14:00"));
    }

    #[test]
    fn lenient_separators_are_rejected() {
        for start in ["2024-02-25 14:00", "2024-02-25t14:00"] {
            let body = format!(
                r#"{{"error": false, "series": [
                    {{"startDate": "2024-02-25T13:00", "value": 1.0, "unit": "c/kWh"}},
                    {{"startDate": "{}", "value": 2.0, "unit": "c/kWh"}}
                ]}}"#,
                start
            );
            let err = decode_response(body.as_bytes()).unwrap_err();
            assert!(matches!(err, SpotSyncError::Decode { .. }));
        }
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let err = decode_response(b"<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, SpotSyncError::Decode { .. }));
    }

    #[test]
    fn missing_series_is_empty() {
        assert!(decode_response(br#"{"error": false}"#).unwrap().is_empty());
    }
}
