use radar_core::{ForecastSeries, PlotPoint, RadarError, RadarResult, Segment};

/// Label prefix for historical points; the backend sends no historical dates.
pub const HISTORICAL_LABEL_PREFIX: &str = "Hist-";

/// Bridge label used when the forecast carries no dates.
pub const BRIDGE_FALLBACK_LABEL: &str = "Forecast-0";

/// Merge historical closes and the forecast band into one continuous series.
///
/// Output order is `Historical..., Bridge, Forecast...` with length
/// `historical.len() + 1 + forecast.len()`. The bridge point repeats the last
/// historical close in every price field so the historical line, the forecast
/// line and the band all meet at one coordinate.
pub fn stitch(series: &ForecastSeries) -> RadarResult<Vec<PlotPoint>> {
    let last_close = validate(series)?;

    let mut points = Vec::with_capacity(series.historical.len() + 1 + series.forecast.len());

    points.extend(series.historical.iter().enumerate().map(|(idx, &price)| PlotPoint {
        label: format!("{}{}", HISTORICAL_LABEL_PREFIX, idx),
        historical_price: Some(price),
        forecast_value: None,
        lower_bound: None,
        upper_bound: None,
        segment: Segment::Historical,
    }));

    points.push(PlotPoint {
        label: series
            .forecast_dates
            .first()
            .cloned()
            .unwrap_or_else(|| BRIDGE_FALLBACK_LABEL.to_string()),
        historical_price: Some(last_close),
        forecast_value: Some(last_close),
        lower_bound: Some(last_close),
        upper_bound: Some(last_close),
        segment: Segment::Bridge,
    });

    points.extend(
        series
            .forecast_dates
            .iter()
            .zip(&series.forecast)
            .zip(series.lower_bound.iter().zip(&series.upper_bound))
            .map(|((date, &value), (&lower, &upper))| PlotPoint {
                label: date.clone(),
                historical_price: None,
                forecast_value: Some(value),
                lower_bound: Some(lower),
                upper_bound: Some(upper),
                segment: Segment::Forecast,
            }),
    );

    Ok(points)
}

/// Shape check; returns the last historical close.
fn validate(series: &ForecastSeries) -> RadarResult<f64> {
    let expected = series.forecast_dates.len();
    let lengths = [
        ("forecast", series.forecast.len()),
        ("lower_bound", series.lower_bound.len()),
        ("upper_bound", series.upper_bound.len()),
    ];

    if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != expected) {
        return Err(RadarError::Validation(format!(
            "Forecast length mismatch: {} dates but {} has {} values",
            expected, name, len
        )));
    }

    series
        .historical
        .last()
        .copied()
        .ok_or_else(|| RadarError::Validation("Forecast has no historical prices".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn aapl_series() -> ForecastSeries {
        ForecastSeries {
            historical: vec![100.0, 102.0, 101.0],
            forecast_dates: vec!["d1".to_string(), "d2".to_string()],
            forecast: vec![105.0, 110.0],
            lower_bound: vec![100.0, 104.0],
            upper_bound: vec![110.0, 116.0],
        }
    }

    #[test]
    fn test_stitch_aapl_scenario() {
        let points = stitch(&aapl_series()).unwrap();

        assert_eq!(points.len(), 6);
        let bridge = &points[3];
        assert_eq!(bridge.segment, Segment::Bridge);
        assert_eq!(bridge.label, "d1");
        for field in [
            bridge.historical_price,
            bridge.forecast_value,
            bridge.lower_bound,
            bridge.upper_bound,
        ] {
            assert_relative_eq!(field.unwrap(), 101.0);
        }
        assert_relative_eq!(points[5].forecast_value.unwrap(), 110.0);
        assert_relative_eq!(points[5].upper_bound.unwrap(), 116.0);
    }

    #[test]
    fn test_point_at_index_two_is_last_historical() {
        // The last historical close and the bridge share the value 101.
        let points = stitch(&aapl_series()).unwrap();
        assert_eq!(points[2].segment, Segment::Historical);
        assert_relative_eq!(points[2].historical_price.unwrap(), 101.0);
        assert!(points[2].forecast_value.is_none());
    }

    #[test]
    fn test_segments_are_ordered() {
        let segments: Vec<Segment> = stitch(&aapl_series())
            .unwrap()
            .into_iter()
            .map(|p| p.segment)
            .collect();

        assert_eq!(
            segments,
            vec![
                Segment::Historical,
                Segment::Historical,
                Segment::Historical,
                Segment::Bridge,
                Segment::Forecast,
                Segment::Forecast,
            ]
        );
    }

    #[test]
    fn test_historical_labels_are_ordinals() {
        let points = stitch(&aapl_series()).unwrap();
        let labels: Vec<&str> = points.iter().take(3).map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Hist-0", "Hist-1", "Hist-2"]);
        assert!(points[4].historical_price.is_none());
    }

    #[test]
    fn test_stitch_is_deterministic() {
        let series = aapl_series();
        assert_eq!(stitch(&series).unwrap(), stitch(&series).unwrap());
    }

    #[test]
    fn test_empty_forecast_still_gets_bridge() {
        let series = ForecastSeries {
            historical: vec![50.0, 51.5],
            ..ForecastSeries::default()
        };
        let points = stitch(&series).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[2].label, BRIDGE_FALLBACK_LABEL);
        assert_relative_eq!(points[2].upper_bound.unwrap(), 51.5);
    }

    #[test]
    fn test_mismatched_bounds_rejected() {
        let mut series = aapl_series();
        series.lower_bound.pop();
        assert!(matches!(stitch(&series), Err(RadarError::Validation(_))));

        let mut series = aapl_series();
        series.upper_bound.push(120.0);
        assert!(matches!(stitch(&series), Err(RadarError::Validation(_))));
    }

    #[test]
    fn test_mismatched_forecast_and_dates_rejected() {
        let mut series = aapl_series();
        series.forecast_dates.push("d3".to_string());
        let err = stitch(&series).unwrap_err();
        assert!(err.to_string().contains("3 dates"));
    }

    #[test]
    fn test_missing_historical_rejected() {
        let mut series = aapl_series();
        series.historical.clear();
        assert!(matches!(stitch(&series), Err(RadarError::Validation(_))));
    }
}
