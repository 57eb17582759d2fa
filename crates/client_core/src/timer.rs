use std::time::Duration;

use tokio::runtime::Handle;
use tracing::debug;

/// Spawns `task` to run after `delay` on the current tokio runtime.
///
/// Hands the task back when there is no runtime to spawn on.
pub(crate) fn spawn_after<F>(delay: Duration, task: F) -> Result<(), F>
where
    F: FnOnce() + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                task();
            });
            Ok(())
        }
        Err(_) => Err(task),
    }
}

/// Runs `task` after `delay`, or right away when the delay is zero or no
/// runtime is available. Only for cosmetic delays, where finishing early is
/// better than never finishing.
pub(crate) fn schedule<F>(delay: Duration, task: F)
where
    F: FnOnce() + Send + 'static,
{
    if delay.is_zero() {
        task();
        return;
    }
    if let Err(task) = spawn_after(delay, task) {
        debug!(
            delay_ms = delay.as_millis() as u64,
            "no runtime for timer; running now"
        );
        task();
    }
}
