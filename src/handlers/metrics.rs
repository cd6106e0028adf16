use prometheus::{Encoder, TextEncoder};

use crate::error::{GuardError, Result};

pub async fn metrics_handler() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| GuardError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| GuardError::Metrics(e.to_string()))
}
