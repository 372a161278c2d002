use crate::connection::ConnectionManager;
use crate::models::ConnectionStatus;
use crate::view::DashboardView;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub view: Arc<DashboardView>,
    pub manager: Arc<ConnectionManager>,
}

impl AppState {
    pub fn new(view: Arc<DashboardView>, manager: Arc<ConnectionManager>) -> Self {
        Self { view, manager }
    }

    /// Asks the manager on every call, so a replaced connection is picked up.
    pub async fn connection_status(&self) -> ConnectionStatus {
        self.manager.status().await
    }
}
