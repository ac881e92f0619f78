//! Process enumeration capability.
//!
//! The tracker only sees [`ProcessLister`]; the sysinfo-backed poller can be
//! swapped for an event-driven source without touching the state machine.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use playtime_core::ProcessSnapshot;
use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;

use crate::error::ListError;

pub trait ProcessLister: Send + Sync {
    /// Names of the processes running right now.
    fn list(&self) -> impl Future<Output = Result<ProcessSnapshot, ListError>> + Send;
}

/// Polls the OS process table through `sysinfo`.
///
/// The refresh is synchronous, so it runs on the blocking pool. The
/// `System` is kept between calls to avoid re-allocating the process map.
#[derive(Clone)]
pub struct SysinfoLister {
    system: Arc<Mutex<System>>,
}

impl SysinfoLister {
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
        }
    }
}

impl Default for SysinfoLister {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLister for SysinfoLister {
    async fn list(&self) -> Result<ProcessSnapshot, ListError> {
        let system = Arc::clone(&self.system);
        let snapshot = tokio::task::spawn_blocking(move || {
            let mut sys = system.lock().unwrap_or_else(PoisonError::into_inner);
            sys.refresh_processes(ProcessesToUpdate::All, true);
            sys.processes()
                .values()
                .map(|process| process.name().to_string_lossy().into_owned())
                .collect::<ProcessSnapshot>()
        })
        .await?;
        debug!("Process snapshot: {} names", snapshot.len());
        Ok(snapshot)
    }
}
