//! The filtering pipeline: canonical pull requests in, named buckets out.
//!
//! Bucketing and status filtering are pure functions over read-only
//! configuration snapshots. The engine never mutates shared configuration;
//! callers owning mutable settings are expected to hand in a stable snapshot
//! for the duration of one pass.

pub mod buckets;
pub mod mute;
pub mod status;

pub use buckets::{Bucket, Buckets, bucket};
pub use mute::{MuteConfiguration, MuteUntil, MutedPullRequest, is_bot_login};
pub use status::{StatusFilter, apply_status_filter};
