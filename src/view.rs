use crate::connection::{ConnectionLease, ConnectionManager, ListenerId, UPDATE_EVENT};
use crate::errors::StreamError;
use crate::live::{LiveCounter, LiveSnapshot};
use std::sync::Arc;
use tracing::info;

/// The dashboard's live side: counter state plus the means to attach it to
/// the shared event stream.
#[derive(Debug)]
pub struct DashboardView {
    live: Arc<LiveCounter>,
}

/// An active subscription of a view. Unmounting detaches the listener and
/// returns the lease; the connection itself is left to the manager.
#[derive(Debug)]
pub struct MountedView {
    lease: ConnectionLease,
    listener: ListenerId,
}

impl DashboardView {
    pub fn new(enforce_order: bool) -> Self {
        Self {
            live: Arc::new(LiveCounter::new(enforce_order)),
        }
    }

    pub fn snapshot(&self) -> LiveSnapshot {
        self.live.current()
    }

    pub async fn mount(&self, manager: &ConnectionManager) -> Result<MountedView, StreamError> {
        let lease = manager.acquire().await?;
        let live = Arc::clone(&self.live);
        let listener = lease
            .connection()
            .on(UPDATE_EVENT, move |payload| live.handle_event(payload));
        info!("dashboard listening for {UPDATE_EVENT}");
        Ok(MountedView { lease, listener })
    }
}

impl MountedView {
    pub async fn unmount(self, manager: &ConnectionManager) {
        self.lease.connection().remove_listener(self.listener);
        manager.release(self.lease).await;
        info!("dashboard stopped listening for {UPDATE_EVENT}");
    }
}
