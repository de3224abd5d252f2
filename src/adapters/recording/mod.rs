//! Recording adapters that capture interactions to cassettes.

pub mod photo_source;
pub mod quote_source;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::warn;

use crate::cassette::recorder::CassetteRecorder;

/// Record a `Result<T, E>` interaction using the Ok/Err JSON convention.
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    let encoded = serde_json::to_value(input).and_then(|input_json| {
        let output_json = match result {
            Ok(v) => serde_json::json!({ "Ok": serde_json::to_value(v)? }),
            Err(e) => serde_json::json!({ "Err": e.to_string() }),
        };
        Ok((input_json, output_json))
    });

    match (encoded, recorder.lock()) {
        (Ok((input_json, output_json)), Ok(mut guard)) => {
            guard.record(port, method, input_json, output_json);
        }
        (Err(e), _) => warn!(port, method, "skipping unserializable interaction: {e}"),
        (_, Err(e)) => warn!(port, method, "recorder lock poisoned: {e}"),
    }
}
