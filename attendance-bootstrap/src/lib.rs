pub mod context;
pub mod desk;
pub mod lifecycle;
pub mod telemetry;

pub use context::AppContext;
pub use lifecycle::{run_server, shutdown_signal};
