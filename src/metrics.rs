//! Pure conversions from raw counts and time into the figures shown to the user.

/// Words per minute, where a word is five characters.
///
/// Rounds half away from zero. Zero (or non-finite) elapsed time yields `0`
/// instead of leaking `NaN`/`inf` into the UI.
pub fn compute_wpm(characters_typed: usize, elapsed_secs: f64) -> u32 {
    let wpm = (characters_typed as f64 / 5.0) / (elapsed_secs / 60.0);
    if !wpm.is_finite() || wpm <= 0.0 {
        return 0;
    }
    wpm.round() as u32
}

/// Percentage of scored characters that were correct, `0..=100`.
///
/// No attempts yet counts as perfect accuracy.
pub fn compute_accuracy(correct_chars: usize, error_chars: usize) -> u32 {
    let attempted = correct_chars + error_chars;
    if attempted == 0 {
        return 100;
    }
    ((correct_chars as f64 / attempted as f64) * 100.0).round() as u32
}

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    match (mean(data), data.len()) {
        (Some(data_mean), count) if count > 0 => {
            let variance = data
                .iter()
                .map(|value| {
                    let diff = data_mean - *value;

                    diff * diff
                })
                .sum::<f64>()
                / count as f64;

            Some(variance.sqrt())
        }
        _ => None,
    }
}
