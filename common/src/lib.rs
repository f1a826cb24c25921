pub mod identity;
pub mod metrics;
pub mod tracer;

pub use identity::{EntityCode, EntityIdentity, IdentityCodeError};

pub type Real = f64;
pub type SampleIndex = usize;
pub type SampleRate = f64;
