pub mod attendance_handlers;
pub mod credential_handlers;
pub mod ops_handlers;

pub use attendance_handlers::*;
pub use credential_handlers::*;
pub use ops_handlers::*;
