//! 实时快照推送
//!
//! 以独立于采样率的频率读取最新快照，只推送有变化的值。

use std::time::Duration;

use contracts::LiveSnapshot;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// 推送频率上下限 (Hz)
const MIN_PUSH_RATE_HZ: f64 = 0.1;
const MAX_PUSH_RATE_HZ: f64 = 1_000.0;

/// 最新快照的后台消费者
pub struct SnapshotPublisher;

impl SnapshotPublisher {
    /// 启动推送任务，发送端关闭后退出
    pub fn spawn<F>(
        mut rx: watch::Receiver<LiveSnapshot>,
        push_rate_hz: f64,
        mut sink: F,
    ) -> JoinHandle<u64>
    where
        F: FnMut(&LiveSnapshot) + Send + 'static,
    {
        let rate = if push_rate_hz.is_nan() {
            MIN_PUSH_RATE_HZ
        } else {
            push_rate_hz.clamp(MIN_PUSH_RATE_HZ, MAX_PUSH_RATE_HZ)
        };
        let period = Duration::from_secs_f64(1.0 / rate);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut pushed = 0u64;

            loop {
                interval.tick().await;
                match rx.has_changed() {
                    Ok(true) => {
                        let snapshot = rx.borrow_and_update().clone();
                        sink(&snapshot);
                        pushed += 1;
                    }
                    Ok(false) => {}
                    Err(_) => break,
                }
            }

            debug!(pushed, "Snapshot publisher stopped");
            pushed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_publishes_latest_only() {
        let (tx, rx) = watch::channel(LiveSnapshot::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let task = SnapshotPublisher::spawn(rx, 50.0, move |snap| {
            seen_clone.lock().unwrap().push(snap.samples_collected);
        });

        for i in 1..=5 {
            tx.send_replace(LiveSnapshot {
                samples_collected: i,
                ..Default::default()
            });
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(tx);

        let pushed = task.await.unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(pushed, 1);
        assert_eq!(*seen, vec![5]);
    }

    #[tokio::test]
    async fn test_extreme_push_rates_are_clamped() {
        for rate in [f64::NAN, 0.0, 1e300] {
            let (tx, rx) = watch::channel(LiveSnapshot::default());
            let task = SnapshotPublisher::spawn(rx, rate, |_| {});
            drop(tx);
            assert_eq!(task.await.unwrap(), 0, "rate {rate}");
        }
    }
}
