//! Pull request synchronisation and filtering engine.
//!
//! The library discovers every pull request relevant to a user with a
//! minimal number of remote calls, hydrates them in batches under a
//! rate-limit governor, normalises the records into a canonical shape, and
//! partitions them into actionable buckets (incoming, muted, reviewed,
//! mine, ignored) driven by externally owned mute configuration.
//!
//! Presentation, persistence, and scheduling stay outside the crate; the
//! caller runs [`refresh::RefreshEngine::refresh`] followed by
//! [`filtering::bucket`] and renders the result however it likes.

pub mod config;
pub mod filtering;
pub mod github;
pub mod model;
pub mod refresh;

pub use config::RadarConfig;
pub use filtering::{
    Buckets, MuteConfiguration, StatusFilter, apply_status_filter, bucket,
};
pub use github::{
    GitHubGateway, OctocrabGateway, PersonalAccessToken, RefreshError, RetryPolicy,
    ThrottledGateway,
};
pub use model::{PullRequest, UserLogin};
pub use refresh::RefreshEngine;
