pub mod attendance_commands;
pub mod credential_commands;

pub use attendance_commands::*;
pub use credential_commands::*;
