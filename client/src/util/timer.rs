//! Event-loop timer for the gate's verification bound.
//!
//! Browser builds sleep on `setTimeout` via `gloo-timers`. Server builds never
//! run verification, so the SSR timer simply never fires.

use std::time::Duration;

use async_trait::async_trait;
use gate::Timer;

pub struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        #[cfg(feature = "hydrate")]
        {
            gloo_timers::future::sleep(duration).await;
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = duration;
            std::future::pending::<()>().await;
        }
    }
}
