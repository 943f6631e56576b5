//! Data hooks: one type per backend resource, binding its REST paths to cache keys

pub mod auth;
pub mod incidents;
pub mod personnel;
pub mod sos;

pub use auth::{AuthApi, AuthResponse, LoginRequest, SignupRequest, SignupRole};
pub use incidents::IncidentsApi;
pub use personnel::PersonnelApi;
pub use sos::SosApi;

use std::time::Duration;

use crate::cache::CachePolicy;

pub(crate) const fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

pub(crate) const fn seconds(n: u64) -> Duration {
    Duration::from_secs(n)
}

pub(crate) const LIST_POLICY: CachePolicy = CachePolicy::new(minutes(1), minutes(5));
pub(crate) const DETAIL_POLICY: CachePolicy = CachePolicy::new(minutes(2), minutes(10));
pub(crate) const SOS_LIST_POLICY: CachePolicy = CachePolicy::new(seconds(30), minutes(5));
pub(crate) const SOS_DETAIL_POLICY: CachePolicy = CachePolicy::new(seconds(30), minutes(10));
pub(crate) const PERSONNEL_POLICY: CachePolicy = CachePolicy::new(minutes(5), minutes(10));
