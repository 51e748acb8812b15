//! Cancellable background timers.
//!
//! Every periodic or delayed job the App runs (poll loop, monitor,
//! availability retry, phase timer, gallery refresh, reload) lives in a
//! `ScheduledTask`.  Each job sits in a single `Option<ScheduledTask>` slot,
//! so starting a job again replaces (and thereby cancels) the previous one.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub struct ScheduledTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `job` every `period`, first after one full period.  The next tick
    /// is not awaited until the previous job has finished, so runs never
    /// overlap; ticks that fall behind are skipped.
    pub fn interval<F, Fut>(period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        // tokio panics on a zero period.
        let period = period.max(Duration::from_millis(1));
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = job() => {}
                }
            }
        });
        Self { token, handle }
    }

    /// Run `job` once after `delay`.
    pub fn after<Fut>(delay: Duration, job: Fut) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = job => {}
            }
        });
        Self { token, handle }
    }

    /// Run `job` until it returns or the task is cancelled.
    pub fn spawn<Fut>(job: Fut) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::after(Duration::ZERO, job)
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> std::future::Ready<()> + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_waits_one_period_before_first_run() {
        let (count, job) = counter();
        let _task = ScheduledTask::interval(Duration::from_millis(100), job);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_interval() {
        let (count, job) = counter();
        let task = ScheduledTask::interval(Duration::from_millis(100), job);
        tokio::time::sleep(Duration::from_millis(250)).await;
        task.cancel();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_slot_cancels_previous() {
        let (first, job) = counter();
        let mut slot = Some(ScheduledTask::interval(Duration::from_millis(100), job));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(slot.as_ref().is_some_and(|t| !t.is_finished()));

        let (second, job) = counter();
        slot = Some(ScheduledTask::interval(Duration::from_millis(100), job));
        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 4);
        drop(slot);
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_runs_once_unless_cancelled() {
        let fired = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        let _fired_task = ScheduledTask::after(Duration::from_secs(2), async move {
            f.fetch_add(1, Ordering::SeqCst);
        });
        let s = skipped.clone();
        let cancelled = ScheduledTask::after(Duration::from_secs(2), async move {
            s.fetch_add(1, Ordering::SeqCst);
        });
        cancelled.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(skipped.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_job_never_overlaps() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (r, p) = (running.clone(), peak.clone());
        let _task = ScheduledTask::interval(Duration::from_millis(100), move || {
            let (r, p) = (r.clone(), p.clone());
            async move {
                let now = r.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(350)).await;
                r.fetch_sub(1, Ordering::SeqCst);
            }
        });
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
