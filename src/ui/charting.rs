use clackr::time_series::DataPoint;
use itertools::Itertools;

/// Compute X (seconds) and Y (wpm / accuracy) bounds for the results chart
pub fn compute_chart_params(series: &[DataPoint]) -> (f64, f64) {
    let highest = series
        .iter()
        .map(|p| p.wpm.max(p.accuracy))
        .max()
        .unwrap_or(0) as f64;

    let overall_duration = series
        .last()
        .map(|p| p.elapsed_secs as f64)
        .unwrap_or(1.0)
        .max(1.0);

    // round the ceiling up to the next multiple of ten
    let y_max = ((highest / 10.0).ceil() * 10.0).max(10.0);

    (overall_duration, y_max)
}

pub fn wpm_points(series: &[DataPoint]) -> Vec<(f64, f64)> {
    series.iter().map(|&p| p.into()).collect()
}

pub fn accuracy_points(series: &[DataPoint]) -> Vec<(f64, f64)> {
    series
        .iter()
        .map(|p| (p.elapsed_secs as f64, p.accuracy as f64))
        .collect()
}

/// Points on the wpm line where the error count went up.
pub fn error_markers(series: &[DataPoint]) -> Vec<(f64, f64)> {
    let first = series.first().filter(|p| p.errors > 0);

    first
        .into_iter()
        .chain(
            series
                .iter()
                .tuple_windows()
                .filter(|(prev, next)| next.errors > prev.errors)
                .map(|(_, next)| next),
        )
        .map(|&p| p.into())
        .collect()
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Vec<DataPoint> {
        vec![
            DataPoint::new(1, 30, 100, 0),
            DataPoint::new(2, 42, 95, 1),
            DataPoint::new(3, 47, 96, 1),
            DataPoint::new(4, 112, 90, 3),
        ]
    }

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[]);
        assert_eq!(x, 1.0);
        assert_eq!(y, 10.0);
    }

    #[test]
    fn test_compute_chart_params() {
        let (x, y) = compute_chart_params(&series());
        assert_eq!(x, 4.0);
        assert_eq!(y, 120.0);
    }

    #[test]
    fn test_error_markers_follow_increases() {
        assert_eq!(error_markers(&series()), vec![(2.0, 42.0), (4.0, 112.0)]);

        let from_start = vec![DataPoint::new(1, 20, 50, 2), DataPoint::new(2, 25, 60, 2)];
        assert_eq!(error_markers(&from_start), vec![(1.0, 20.0)]);
    }

    #[test]
    fn test_chart_lines() {
        let s = series();
        assert_eq!(wpm_points(&s)[1], (2.0, 42.0));
        assert_eq!(accuracy_points(&s)[3], (4.0, 90.0));
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
