pub mod credential_codec;

pub use credential_codec::*;
