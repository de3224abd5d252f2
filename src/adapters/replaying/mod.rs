//! Replaying adapters that serve recorded interactions from cassettes.

pub mod photo_source;
pub mod quote_source;

use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::error::CardError;

/// Shared replayer handle; both adapters draw from one cassette.
pub type SharedReplayer = Arc<Mutex<CassetteReplayer>>;

/// Take the next recorded result for `port`/`method` and decode it.
///
/// Recorded errors, a used-up cassette and undecodable payloads all come back
/// as `CardError::Api` with status 0, the way a failed request would.
pub(crate) fn replay<T: DeserializeOwned>(
    replayer: &SharedReplayer,
    port: &str,
    method: &str,
) -> Result<T, CardError> {
    let interaction = replayer
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .next_interaction(port, method)
        .map_err(replay_error)?;
    decode_output(interaction.output)
}

/// Decode an `{"Ok": …}` / `{"Err": "…"}` output, or a bare value.
fn decode_output<T: DeserializeOwned>(output: serde_json::Value) -> Result<T, CardError> {
    if let Some(message) = output.get("Err") {
        return Err(replay_error(message.as_str().unwrap_or("replayed error")));
    }
    let value = match output {
        serde_json::Value::Object(mut map) if map.contains_key("Ok") => {
            map.remove("Ok").unwrap_or_default()
        }
        other => other,
    };
    serde_json::from_value(value).map_err(|e| replay_error(format!("Bad cassette payload: {e}")))
}

fn replay_error(message: impl Into<String>) -> CardError {
    CardError::Api { status: 0, message: message.into() }
}
