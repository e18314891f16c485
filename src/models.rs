pub mod profile;
pub mod profile_api;

pub use profile::{NewProfile, PreferredMode, Profile, RiskTolerance, DEFAULT_CURRENCY};
pub use profile_api::ProfileApi;
