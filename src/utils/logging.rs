use serde::Serialize;
use tracing::{Level, debug};

/// Logs `value` as pretty JSON at DEBUG, labelled with `what`.
/// Serialization is skipped entirely when DEBUG is filtered out.
pub(crate) fn debug_json<T>(what: &str, value: &T)
where
    T: Serialize + ?Sized,
{
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    match serde_json::to_string_pretty(value) {
        Ok(json) => debug!("{what}:\n{json}"),
        Err(error) => debug!(%error, "{what}: <pretty serialize failed>"),
    }
}
