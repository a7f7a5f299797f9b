//! Background loop model shared by outbox drain, inbox GC, LSA flood, and
//! replication-listener tasks (spec §5, SPEC_FULL §4.4 expansion): each is
//! an independent `tokio::spawn`ed future holding a
//! `tokio_util::sync::CancellationToken` child of the mesh's root token,
//! polling at a jittered interval, observing cancellation at the top of
//! every loop turn. The `[0.9, 1.1)` jitter avoids every task on the same
//! node waking in lockstep, and the loop always wakes early on
//! cancellation rather than waiting out the full sleep.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn jittered(interval: Duration) -> Duration {
    let jitter = 0.9 + rand::random::<f64>() * 0.2;
    interval.mul_f64(jitter)
}

/// Runs `tick` repeatedly at a jittered `interval`, stopping as soon as
/// `cancel` fires — whether that happens between ticks or while a tick is
/// still awaiting I/O, since `tick` itself is expected to select against
/// `cancel` for any long-running work (spec §5: "observes cancellation
/// before every await on I/O").
pub async fn run_jittered<F, Fut>(name: &str, interval: Duration, cancel: CancellationToken, mut tick: F)
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        if cancel.is_cancelled() {
            tracing::debug!(task = name, "dispatcher loop stopping");
            return;
        }
        tick(cancel.clone()).await;
        if cancel.is_cancelled() {
            return;
        }
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(jittered(interval)) => {}
        }
    }
}

/// Spawns `run_jittered` as its own task and returns a handle that, when
/// cancelled, stops the loop; mirrors
/// [`crate::outbox::run_outbox_dispatcher`]'s/
/// `anchor::replication::ReplicationHandle`'s explicit-stop contract.
pub fn spawn_jittered<F, Fut>(
    name: &'static str,
    interval: Duration,
    cancel: CancellationToken,
    tick: F,
) -> tokio::task::JoinHandle<()>
where
    F: FnMut(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(run_jittered(name, interval, cancel, tick))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn cancelling_stops_future_ticks() {
        let cancel = CancellationToken::new();
        let ticks = Arc::new(AtomicUsize::new(0));

        let ticks_clone = ticks.clone();
        let cancel_clone = cancel.clone();
        let handle = spawn_jittered("test", Duration::from_millis(5), cancel.clone(), move |_| {
            let ticks = ticks_clone.clone();
            let cancel = cancel_clone.clone();
            async move {
                let n = ticks.fetch_add(1, Ordering::SeqCst) + 1;
                if n >= 3 {
                    cancel.cancel();
                }
            }
        });

        tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
        assert!(ticks.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn a_pre_cancelled_token_runs_zero_ticks() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_clone = ticks.clone();

        run_jittered("test", Duration::from_secs(60), cancel, move |_| {
            let ticks = ticks_clone.clone();
            async move {
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
        .await;

        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
