//! Drives a [`SessionTracker`] on a fixed interval.
//!
//! The loop and the external calls (`set_auth_token`, `current_status`,
//! `stop`) share one async mutex, so an external call waits for an
//! in-progress tick instead of interleaving with it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::lister::ProcessLister;
use crate::sink::SessionSink;
use crate::tracker::{ActiveGame, CurrentStatus, SessionEvent, SessionTracker};

pub struct TrackerHandle<L, S> {
    tracker: Arc<Mutex<SessionTracker<L, S>>>,
    shutdown: watch::Sender<bool>,
    active: watch::Sender<Option<ActiveGame>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<L, S> TrackerHandle<L, S>
where
    L: ProcessLister + 'static,
    S: SessionSink + 'static,
{
    /// Spawn the poll loop. The first tick fires immediately.
    pub fn start(tracker: SessionTracker<L, S>, interval: Duration) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let (active, _) = watch::channel(tracker.active_game());
        let tracker = Arc::new(Mutex::new(tracker));

        let task = tokio::spawn(run_loop(
            Arc::clone(&tracker),
            interval,
            shutdown_rx,
            active.clone(),
        ));
        info!("Tracker started (interval {}ms)", interval.as_millis());

        Self {
            tracker,
            shutdown,
            active,
            task: Mutex::new(Some(task)),
        }
    }

    /// Watch the tracked game; updated after every tick that changes it.
    pub fn subscribe(&self) -> watch::Receiver<Option<ActiveGame>> {
        self.active.subscribe()
    }

    pub async fn set_auth_token(&self, token: Option<String>) {
        self.tracker.lock().await.set_auth_token(token);
    }

    pub async fn current_status(&self) -> Option<CurrentStatus> {
        self.tracker.lock().await.current_status()
    }

    pub async fn register_game(
        &self,
        name: &str,
        aliases: &[String],
    ) -> Result<(), playtime_core::CatalogError> {
        self.tracker.lock().await.register_game(name, aliases)
    }

    /// Cancel the loop, wait for any in-flight tick, then close the open
    /// session. Later calls find nothing to close.
    pub async fn stop(&self) -> Option<SessionEvent> {
        let _ = self.shutdown.send(true);
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            let _ = task.await;
            info!("Tracker loop stopped");
        }

        let mut tracker = self.tracker.lock().await;
        let event = tracker.stop().await;
        publish(&self.active, tracker.active_game());
        event
    }
}

async fn run_loop<L, S>(
    tracker: Arc<Mutex<SessionTracker<L, S>>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    active: watch::Sender<Option<ActiveGame>>,
) where
    L: ProcessLister,
    S: SessionSink,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut tracker = tracker.lock().await;
                let events = tracker.tick().await;
                if !events.is_empty() {
                    debug!("Tick produced {} event(s)", events.len());
                }
                publish(&active, tracker.active_game());
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

fn publish(tx: &watch::Sender<Option<ActiveGame>>, game: Option<ActiveGame>) {
    tx.send_if_modified(|current| {
        if *current == game {
            return false;
        }
        *current = game;
        true
    });
}
