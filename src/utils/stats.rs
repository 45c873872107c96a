//! Descriptive statistics over balance vectors.

/// Arithmetic mean of the data.
pub fn mean(data: &[i64]) -> f64 {
    debug_assert!(!data.is_empty());
    data.iter().sum::<i64>() as f64 / data.len() as f64
}

/// Population variance of the data.
pub fn variance(data: &[i64]) -> f64 {
    let mean = mean(data);
    data.iter()
        .map(|&point| {
            let deviation = point as f64 - mean;
            deviation * deviation
        })
        .sum::<f64>()
        / data.len() as f64
}

/// Population standard deviation of the data.
pub fn std_deviation(data: &[i64]) -> f64 {
    variance(data).sqrt()
}
