pub mod connectivity;
pub mod scan_session;
pub mod scanner_desk;

pub use connectivity::*;
pub use scan_session::*;
pub use scanner_desk::*;
