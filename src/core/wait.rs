use crate::config::toml_config::WaitPolicy;
use crate::domain::ports::{BrowserSession, ElementRef, Locator};
use crate::utils::error::{Result, ScrapeError};
use std::future::Future;
use tokio::time::Instant;

/// Polls `probe` until it yields a value or the policy's timeout passes.
/// The probe always runs at least once.
pub async fn wait_until<T, F, Fut>(policy: &WaitPolicy, what: &str, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + policy.timeout;
    loop {
        if let Some(found) = probe().await? {
            return Ok(found);
        }
        if Instant::now() >= deadline {
            return Err(ScrapeError::Timeout {
                what: what.to_string(),
                after: policy.timeout,
            });
        }
        tokio::time::sleep(policy.poll_interval).await;
    }
}

pub async fn wait_for_element<B>(
    session: &B,
    locator: &Locator,
    policy: &WaitPolicy,
) -> Result<ElementRef>
where
    B: BrowserSession + ?Sized,
{
    wait_until(policy, &locator.to_string(), move || session.find_element(locator)).await
}
