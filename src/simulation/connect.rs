//! Simulator connection with bounded exponential backoff

use std::time::Duration;

use crate::core::config::RetryPolicy;
use crate::core::error::{BrainError, Result};
use crate::gateway::SensorGateway;

/// Keep calling `connect` until it succeeds or the policy runs out of attempts.
///
/// `sleep` is called with each backoff delay; pass `std::thread::sleep` in
/// production. Returns the number of attempts it took.
pub fn connect_with_retry<G, F>(
    gateway: &mut G,
    host: &str,
    port: u16,
    policy: &RetryPolicy,
    mut sleep: F,
) -> Result<u32>
where
    G: SensorGateway + ?Sized,
    F: FnMut(Duration),
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match gateway.connect(host, port) {
            Ok(()) => {
                tracing::info!("Connected to simulator at {}:{} after {} attempt(s)", host, port, attempt);
                return Ok(attempt);
            }
            Err(e) => {
                if policy.max_attempts.is_some_and(|max| attempt >= max) {
                    tracing::error!("Giving up on {}:{} after {} attempts: {}", host, port, attempt, e);
                    return Err(BrainError::ConnectionExhausted { attempts: attempt });
                }

                let delay = policy.backoff_for(attempt);
                tracing::warn!(
                    "Trying to connect to simulator at {}:{} (attempt {} failed: {}), retrying in {:?}",
                    host,
                    port,
                    attempt,
                    e,
                    delay
                );
                sleep(delay);
            }
        }
    }
}
