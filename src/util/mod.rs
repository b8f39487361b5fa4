pub mod display;
pub mod time_series;

pub use display::print_analysis_summary;
pub use time_series::ActivitySeries;

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
