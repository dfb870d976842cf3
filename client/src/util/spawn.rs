//! Executor seam for the gate's background verification.
//!
//! Browser builds run tasks on the Leptos local executor. Server builds never
//! verify, so spawning there reports a shut-down executor.

use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};

pub struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        #[cfg(feature = "hydrate")]
        {
            leptos::task::spawn_local(future);
            Ok(())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            drop(future);
            Err(SpawnError::shutdown())
        }
    }
}
