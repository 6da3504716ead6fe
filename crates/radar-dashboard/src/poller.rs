use std::future::Future;
use tokio::task::JoinHandle;

/// Owned handle to a background poll loop.
///
/// The loop is aborted when the handle is dropped, so replacing or dropping the
/// handle is enough to guarantee the timer stops on every exit path.
#[derive(Debug)]
pub struct PollHandle {
    epoch: u64,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn spawn<F>(epoch: u64, poll_loop: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            epoch,
            task: tokio::spawn(poll_loop),
        }
    }

    /// Epoch the loop was started under
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// False once the loop has returned or been aborted.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_loop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = PollHandle::spawn(3, async move {
            loop {
                tokio::time::sleep(Duration::from_millis(100)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert_eq!(handle.epoch(), 3);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        drop(handle);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_loop_is_inactive() {
        let handle = PollHandle::spawn(1, async {});
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!handle.is_active());
    }
}
