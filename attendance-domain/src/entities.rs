// Domain entities

pub mod attendance_record;
pub mod capture;
pub mod connectivity;
pub mod identity_payload;
pub mod model;
pub mod user_identity;

pub use attendance_record::*;
pub use capture::*;
pub use connectivity::*;
pub use identity_payload::*;
pub use model::*;
pub use user_identity::*;
