//! Per-file quality harvesters: complexity, maintainability, line counts.

pub mod complexity;
pub mod loc;
pub mod maintainability;
pub mod source;

/// Arithmetic mean. An empty series averages to zero rather than failing,
/// so a report over an empty tree still renders.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
