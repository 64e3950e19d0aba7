pub mod credential_files;
pub mod memory_attendance;
pub mod postgrest_attendance;

pub use credential_files::*;
pub use memory_attendance::*;
pub use postgrest_attendance::*;
