//! Staleness policy

use super::CacheEnvelope;
use super::FreshnessWindow;

/// Returns `true` if `envelope` may be served without a network call.
///
/// Absent envelopes are never fresh. An envelope is fresh iff its age at
/// `now_millis` is strictly below the window, so an age equal to the window
/// is stale. Envelopes stamped in the future count as age zero.
pub fn is_fresh<T>(
    envelope: Option<&CacheEnvelope<T>>,
    window: FreshnessWindow,
    now_millis: i64,
) -> bool {
    match envelope {
        Some(envelope) => envelope.age_millis(now_millis) < window.as_millis(),
        None => false,
    }
}
