pub mod app;
pub mod config;
pub mod connection;
pub mod datasets;
pub mod errors;
pub mod handlers;
pub mod live;
pub mod models;
pub mod protocol;
pub mod stats;
pub mod state;
pub mod transport;
pub mod ui;
pub mod view;

pub use app::router;
pub use config::Config;
pub use connection::ConnectionManager;
pub use state::AppState;
pub use transport::WebSocketTransport;
pub use view::DashboardView;
