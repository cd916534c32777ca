//! Timed store access

use std::future::Future;
use std::time::Duration;

use metrics::counter;

use syncstyle_db::DbResult;

use crate::EntitlementError;

pub(crate) const SUBSCRIPTIONS: &str = "subscriptions";
pub(crate) const TIERS: &str = "tiers";
pub(crate) const USAGE: &str = "usage";

/// Run one store call under its own timeout.
///
/// Failures are counted per store before being returned.
pub(crate) async fn timed<V>(
    store: &'static str,
    timeout: Duration,
    call: impl Future<Output = DbResult<V>>,
) -> Result<V, EntitlementError> {
    let result = match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(EntitlementError::from),
        Err(_) => Err(EntitlementError::Timeout { store }),
    };

    if result.is_err() {
        counter!("entitlement_store_failures_total", "store" => store).increment(1);
    }

    result
}
