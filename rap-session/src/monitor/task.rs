use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info};

use rap_model::random::RandomSource;
use rap_model::security;

use super::{PollOutcome, ThreatMonitor};
use crate::config::MonitorConfig;
use crate::store::SessionState;

/// Armed threat monitor running on the tokio runtime.
///
/// Dropping the handle aborts the task; [`MonitorHandle::disarm`] stops it
/// cleanly and waits for it.
pub struct MonitorHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Arm the monitor. The first poll fires one interval from now.
    pub fn spawn(
        state: Arc<RwLock<SessionState>>,
        rng: Arc<dyn RandomSource>,
        config: MonitorConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let start = Instant::now() + config.poll_interval();

        info!(
            poll_secs = config.poll_interval().as_secs(),
            dwell_secs = config.reactive_dwell().as_secs(),
            "Threat monitor armed"
        );

        let task = tokio::spawn(run(state, rng, config, start, shutdown_rx));

        Self {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Whether the task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop polling and cancel any pending revert.
    pub async fn disarm(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("Threat monitor disarmed");
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    state: Arc<RwLock<SessionState>>,
    rng: Arc<dyn RandomSource>,
    config: MonitorConfig,
    start: Instant,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut monitor = ThreatMonitor::new();
    let mut ticker = interval_at(start, config.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Deadline and epoch of the outstanding revert
    let mut revert: Option<(Instant, u64)> = None;

    loop {
        let deadline = revert.map(|(at, _)| at).unwrap_or(start);

        tokio::select! {
            _ = &mut shutdown => {
                monitor.cancel();
                debug!("Threat monitor received shutdown");
                break;
            }
            _ = ticker.tick() => {
                let detected = security::monitor_threats(rng.as_ref());
                let mut guard = state.write().await;
                if let PollOutcome::Reactive { epoch, .. } = monitor.poll(guard.metrics_mut(), detected) {
                    revert = Some((Instant::now() + config.reactive_dwell(), epoch));
                }
            }
            _ = sleep_until(deadline), if revert.is_some() => {
                if let Some((_, epoch)) = revert.take() {
                    let mut guard = state.write().await;
                    monitor.revert(guard.metrics_mut(), epoch);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReputationConfig;
    use rap_model::{DefenseStatus, ScriptedRandom};
    use std::time::Duration;
    use tokio::time::{advance, sleep};

    fn shared_state() -> Arc<RwLock<SessionState>> {
        Arc::new(RwLock::new(SessionState::new(ReputationConfig::default())))
    }

    async fn status(state: &Arc<RwLock<SessionState>>) -> (DefenseStatus, u64) {
        let guard = state.read().await;
        let metrics = guard.metrics();
        (metrics.neural_defense_status, metrics.intrusion_attempts)
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_polls_on_timer() {
        let state = shared_state();
        let rng = Arc::new(ScriptedRandom::new(vec![0, 3, 0, 2]));
        let handle = MonitorHandle::spawn(state.clone(), rng, MonitorConfig::default());

        sleep(Duration::from_secs(16)).await;
        assert_eq!(status(&state).await, (DefenseStatus::Optimal, 0));

        sleep(Duration::from_secs(15)).await; // t=31
        assert_eq!(status(&state).await, (DefenseStatus::Reactive, 3));

        sleep(Duration::from_secs(5)).await; // t=36
        assert_eq!(status(&state).await, (DefenseStatus::Optimal, 3));

        sleep(Duration::from_secs(25)).await; // t=61
        assert_eq!(status(&state).await, (DefenseStatus::Reactive, 5));

        sleep(Duration::from_secs(5)).await; // t=66
        assert_eq!(status(&state).await, (DefenseStatus::Optimal, 5));

        handle.disarm().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_detection_inside_dwell_extends_window() {
        let state = shared_state();
        let rng = Arc::new(ScriptedRandom::new(vec![1, 1, 0, 0, 0, 0, 0, 0]));
        let config = MonitorConfig {
            poll_interval_secs: 3,
            reactive_dwell_secs: 5,
        };
        let handle = MonitorHandle::spawn(state.clone(), rng, config);

        // Detections at t=3 and t=6; the first revert would have landed at t=8
        sleep(Duration::from_millis(8_500)).await;
        assert_eq!(status(&state).await, (DefenseStatus::Reactive, 2));

        // Second revert due at t=11
        sleep(Duration::from_millis(2_000)).await; // t=10.5
        assert_eq!(status(&state).await, (DefenseStatus::Reactive, 2));

        sleep(Duration::from_millis(1_000)).await; // t=11.5
        assert_eq!(status(&state).await, (DefenseStatus::Optimal, 2));

        handle.disarm().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_cancels_pending_revert() {
        let state = shared_state();
        let rng = Arc::new(ScriptedRandom::new(vec![4]));
        let handle = MonitorHandle::spawn(state.clone(), rng, MonitorConfig::default());

        sleep(Duration::from_secs(16)).await;
        assert_eq!(status(&state).await, (DefenseStatus::Reactive, 4));

        handle.disarm().await;
        advance(Duration::from_secs(60)).await;

        assert_eq!(status(&state).await, (DefenseStatus::Reactive, 4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_stops_task() {
        let state = shared_state();
        let handle = MonitorHandle::spawn(
            state.clone(),
            Arc::new(ScriptedRandom::new(vec![1])),
            MonitorConfig::default(),
        );
        assert!(handle.is_running());

        handle.disarm().await;
        sleep(Duration::from_secs(120)).await;

        assert_eq!(status(&state).await, (DefenseStatus::Optimal, 0));
    }
}
