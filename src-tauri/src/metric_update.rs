use crate::errors::{AppError, AppResult};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

static FORMAT_MARKERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[$,%]").expect("valid regex"));

/// Display family of a metric value. Preserved across every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFormat {
    Currency,
    Percentage,
    Count,
}

impl MetricFormat {
    pub fn detect(value: &str) -> Self {
        if value.contains('$') {
            Self::Currency
        } else if value.contains('%') {
            Self::Percentage
        } else {
            Self::Count
        }
    }

    pub fn render(self, value: f64) -> String {
        match self {
            Self::Currency => format!("${}", group_thousands(value.floor() as i64)),
            Self::Percentage => format!("{:.1}%", value),
            Self::Count => group_thousands(value.floor() as i64),
        }
    }
}

/// Strips `$`, `,` and `%` before parsing, whichever of them are present.
pub fn parse_metric_value(value: &str) -> AppResult<f64> {
    let stripped = FORMAT_MARKERS.replace_all(value.trim(), "");
    let parsed = stripped
        .parse::<f64>()
        .map_err(|_| AppError::InvalidMetricValue(value.to_string()))?;
    if !parsed.is_finite() {
        return Err(AppError::InvalidMetricValue(value.to_string()));
    }
    Ok(parsed)
}

/// Grows `current` by `growth` (0.05 means +5%) and re-renders it in the same format family.
pub fn update_metric_value(current: &str, growth: f64) -> AppResult<String> {
    if !(growth >= 0.0) {
        return Err(AppError::InvalidInput(format!(
            "growth must be non-negative, got {}",
            growth
        )));
    }
    let numeric = parse_metric_value(current)?;
    let format = MetricFormat::detect(current);
    Ok(format.render(numeric * (1.0 + growth)))
}

pub fn random_growth<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(0.01..0.06)
}

pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
