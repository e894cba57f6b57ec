use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub type ReminderId = u64;

/// Time source, injected so scheduling can be tested against a fixed instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Caller-supplied delivery action, invoked exactly once when a reminder
/// comes due. The scheduler never interprets the destination; the Discord
/// layer implements this by sending a channel message.
#[async_trait]
pub trait Deliver: Send + Sync {
    async fn deliver(&self, reminder: &ReminderView) -> anyhow::Result<()>;
}

/// Invoked when a delivery callback fails. Delivery is fire-and-report: the
/// reminder is not retried.
pub type ErrorHook = Arc<dyn Fn(ReminderId, &anyhow::Error) + Send + Sync>;

/// Read-only projection of a pending reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderView {
    pub id: ReminderId,
    pub fire_time: DateTime<Utc>,
    pub owner_id: u64,
    pub channel_id: u64,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("reminder time {fire_time} is not in the future")]
    PastFireTime { fire_time: DateTime<Utc> },
    #[error("reminder time {fire_time} is more than {max_days} days ahead")]
    TooFarAhead {
        fire_time: DateTime<Utc>,
        max_days: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CancelOutcome {
    Canceled,
    NotFound,
    NotOwner,
}

struct PendingTask {
    view: ReminderView,
    deliver: Arc<dyn Deliver>,
    timer: Option<JoinHandle<()>>,
}

struct Registry {
    tasks: HashMap<ReminderId, PendingTask>,
    next_id: ReminderId,
}

/// In-memory one-shot reminder scheduler.
///
/// The registry only ever holds PENDING tasks: firing and cancellation both
/// remove the entry under the lock, so whichever is observed first wins and
/// the other becomes a no-op. The lock is never held across the delivery
/// await. Pending reminders do not survive a process restart.
pub struct ReminderScheduler {
    registry: Arc<Mutex<Registry>>,
    clock: Arc<dyn Clock>,
    max_lead: Option<Duration>,
    error_hook: ErrorHook,
}

impl ReminderScheduler {
    pub fn new(clock: Arc<dyn Clock>, max_lead_days: Option<i64>, error_hook: ErrorHook) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                tasks: HashMap::new(),
                next_id: 1,
            })),
            clock,
            max_lead: max_lead_days.and_then(Duration::try_days),
            error_hook,
        }
    }

    /// Register a reminder and arrange a wake-up at `fire_time`.
    ///
    /// The fire time is re-validated here even though the parser already
    /// rejects past times; other callers (e.g. the LLM tool layer) hand in
    /// timestamps this component cannot trust.
    pub fn schedule(
        &self,
        fire_time: DateTime<Utc>,
        owner_id: u64,
        channel_id: u64,
        text: String,
        deliver: Arc<dyn Deliver>,
    ) -> Result<ReminderId, ScheduleError> {
        let now = self.clock.now();
        if fire_time <= now {
            return Err(ScheduleError::PastFireTime { fire_time });
        }
        if let Some(max_lead) = self.max_lead {
            if fire_time - now > max_lead {
                return Err(ScheduleError::TooFarAhead {
                    fire_time,
                    max_days: max_lead.num_days(),
                });
            }
        }

        let id = {
            let mut registry = self.registry.lock().unwrap();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.tasks.insert(
                id,
                PendingTask {
                    view: ReminderView {
                        id,
                        fire_time,
                        owner_id,
                        channel_id,
                        text,
                    },
                    deliver,
                    timer: None,
                },
            );
            id
        };

        let delay = (fire_time - now).to_std().unwrap_or_default();
        let registry = self.registry.clone();
        let hook = self.error_hook.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Removing the entry is the PENDING -> FIRED transition; a task
            // canceled in the meantime is simply gone.
            let task = { registry.lock().unwrap().tasks.remove(&id) };
            let Some(task) = task else {
                return;
            };
            debug!("Firing reminder {} for user {}", id, task.view.owner_id);
            if let Err(e) = task.deliver.deliver(&task.view).await {
                error!("Reminder {} delivery failed: {}", id, e);
                (hook)(id, &e);
            }
        });

        // Store the abort handle unless the timer already fired (possible
        // only for near-zero delays).
        if let Some(task) = self.registry.lock().unwrap().tasks.get_mut(&id) {
            task.timer = Some(timer);
        }

        info!(
            "Scheduled reminder {} for user {} at {}",
            id, owner_id, fire_time
        );
        Ok(id)
    }

    /// Cancel a pending reminder. Returns true only if the task was still
    /// pending and belongs to the requester. The not-found and wrong-owner
    /// cases are deliberately indistinguishable to the caller.
    pub fn cancel(&self, id: ReminderId, requesting_owner: u64) -> bool {
        let outcome = {
            let mut registry = self.registry.lock().unwrap();
            match registry.tasks.remove(&id) {
                None => CancelOutcome::NotFound,
                Some(task) if task.view.owner_id != requesting_owner => {
                    registry.tasks.insert(id, task);
                    CancelOutcome::NotOwner
                }
                Some(task) => {
                    if let Some(timer) = &task.timer {
                        timer.abort();
                    }
                    CancelOutcome::Canceled
                }
            }
        };

        match outcome {
            CancelOutcome::Canceled => {
                info!("Canceled reminder {} for user {}", id, requesting_owner);
                true
            }
            CancelOutcome::NotFound => {
                debug!("Cancel of unknown reminder {} by user {}", id, requesting_owner);
                false
            }
            CancelOutcome::NotOwner => {
                debug!(
                    "User {} tried to cancel reminder {} they don't own",
                    requesting_owner, id
                );
                false
            }
        }
    }

    /// Snapshot of pending reminders, soonest first. With an owner, only that
    /// user's reminders; without, the global view.
    pub fn list_pending(&self, owner: Option<u64>) -> Vec<ReminderView> {
        let mut views: Vec<ReminderView> = {
            let registry = self.registry.lock().unwrap();
            registry
                .tasks
                .values()
                .filter(|task| owner.map_or(true, |o| task.view.owner_id == o))
                .map(|task| task.view.clone())
                .collect()
        };
        views.sort_by_key(|view| view.fire_time);
        views
    }

    pub fn pending_count(&self) -> usize {
        self.registry.lock().unwrap().tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct RecordingDeliver {
        delivered: Mutex<Vec<String>>,
        fail: bool,
        attempts: AtomicUsize,
    }

    impl RecordingDeliver {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                delivered: Mutex::new(Vec::new()),
                fail,
                attempts: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Deliver for RecordingDeliver {
        async fn deliver(&self, reminder: &ReminderView) -> anyhow::Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("channel unavailable");
            }
            self.delivered.lock().unwrap().push(reminder.text.clone());
            Ok(())
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap()
    }

    fn scheduler_at(now: DateTime<Utc>, max_lead_days: Option<i64>) -> ReminderScheduler {
        ReminderScheduler::new(Arc::new(FixedClock(now)), max_lead_days, Arc::new(|_, _| {}))
    }

    #[tokio::test]
    async fn rejects_past_fire_times() {
        let scheduler = scheduler_at(t0(), None);
        let deliver = RecordingDeliver::new(false);
        let result = scheduler.schedule(
            t0() - Duration::minutes(5),
            1,
            100,
            "late".into(),
            deliver,
        );
        assert!(matches!(result, Err(ScheduleError::PastFireTime { .. })));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test]
    async fn rejects_fire_times_beyond_the_lead_cap() {
        let scheduler = scheduler_at(t0(), Some(30));
        let deliver = RecordingDeliver::new(false);
        let result = scheduler.schedule(
            t0() + Duration::days(31),
            1,
            100,
            "far".into(),
            deliver,
        );
        assert!(matches!(result, Err(ScheduleError::TooFarAhead { .. })));
    }

    #[tokio::test]
    async fn cancel_by_owner_removes_the_task() {
        let scheduler = scheduler_at(t0(), None);
        let deliver = RecordingDeliver::new(false);
        let id = scheduler
            .schedule(t0() + Duration::hours(1), 1, 100, "x".into(), deliver)
            .unwrap();
        assert!(scheduler.cancel(id, 1));
        assert!(scheduler.list_pending(None).is_empty());
    }

    #[tokio::test]
    async fn cancel_by_another_user_is_refused() {
        let scheduler = scheduler_at(t0(), None);
        let deliver = RecordingDeliver::new(false);
        let id = scheduler
            .schedule(t0() + Duration::hours(1), 1, 100, "x".into(), deliver)
            .unwrap();
        assert!(!scheduler.cancel(id, 2));
        let pending = scheduler.list_pending(None);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id);
    }

    #[tokio::test]
    async fn cancel_of_unknown_id_is_refused() {
        let scheduler = scheduler_at(t0(), None);
        assert!(!scheduler.cancel(999, 1));
    }

    #[tokio::test]
    async fn list_pending_is_sorted_by_fire_time() {
        let scheduler = scheduler_at(t0(), None);
        let deliver = RecordingDeliver::new(false);
        for hours in [3i64, 1, 2] {
            scheduler
                .schedule(
                    t0() + Duration::hours(hours),
                    1,
                    100,
                    format!("in {hours}h"),
                    deliver.clone(),
                )
                .unwrap();
        }
        let pending = scheduler.list_pending(None);
        let times: Vec<_> = pending.iter().map(|view| view.fire_time).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
        assert_eq!(pending.len(), 3);
    }

    #[tokio::test]
    async fn list_pending_filters_by_owner() {
        let scheduler = scheduler_at(t0(), None);
        let deliver = RecordingDeliver::new(false);
        scheduler
            .schedule(t0() + Duration::hours(1), 1, 100, "a".into(), deliver.clone())
            .unwrap();
        scheduler
            .schedule(t0() + Duration::hours(2), 2, 100, "b".into(), deliver)
            .unwrap();
        assert_eq!(scheduler.list_pending(Some(1)).len(), 1);
        assert_eq!(scheduler.list_pending(Some(2)).len(), 1);
        assert_eq!(scheduler.list_pending(None).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_exactly_once_and_then_cannot_be_canceled() {
        let scheduler = scheduler_at(t0(), None);
        let deliver = RecordingDeliver::new(false);
        let id = scheduler
            .schedule(
                t0() + Duration::minutes(30),
                1,
                100,
                "check the oven".into(),
                deliver.clone(),
            )
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_secs(31 * 60)).await;

        let delivered = deliver.delivered.lock().unwrap().clone();
        assert_eq!(delivered, vec!["check the oven".to_string()]);
        assert_eq!(deliver.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending_count(), 0);
        assert!(!scheduler.cancel(id, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn canceled_task_never_fires() {
        let scheduler = scheduler_at(t0(), None);
        let deliver = RecordingDeliver::new(false);
        let id = scheduler
            .schedule(
                t0() + Duration::minutes(10),
                1,
                100,
                "never".into(),
                deliver.clone(),
            )
            .unwrap();
        assert!(scheduler.cancel(id, 1));

        tokio::time::sleep(std::time::Duration::from_secs(20 * 60)).await;

        assert!(deliver.delivered.lock().unwrap().is_empty());
        assert_eq!(deliver.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn delivery_failure_is_reported_and_not_retried() {
        let failures = Arc::new(AtomicUsize::new(0));
        let hook_failures = failures.clone();
        let scheduler = ReminderScheduler::new(
            Arc::new(FixedClock(t0())),
            None,
            Arc::new(move |_, _| {
                hook_failures.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let deliver = RecordingDeliver::new(true);
        scheduler
            .schedule(
                t0() + Duration::minutes(5),
                1,
                100,
                "doomed".into(),
                deliver.clone(),
            )
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_secs(30 * 60)).await;

        assert_eq!(deliver.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(failures.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_listing_does_not_disturb_firing() {
        let scheduler = Arc::new(scheduler_at(t0(), None));
        let deliver = RecordingDeliver::new(false);
        scheduler
            .schedule(
                t0() + Duration::minutes(1),
                1,
                100,
                "tick".into(),
                deliver.clone(),
            )
            .unwrap();

        let lister = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move {
                for _ in 0..10 {
                    let _ = scheduler.list_pending(None);
                    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                }
            })
        };

        tokio::time::sleep(std::time::Duration::from_secs(10 * 60)).await;
        lister.await.unwrap();

        assert_eq!(deliver.attempts.load(Ordering::SeqCst), 1);
    }
}
