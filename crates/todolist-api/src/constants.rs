//! API constants

use std::time::Duration;

/// Prefix of the todo resource routes
pub const API_PREFIX: &str = "/api";

/// Requests and operations slower than this get an extra warning log record
pub const SLOW_THRESHOLD: Duration = Duration::from_millis(100);

/// Interval between sweeps of expired rate limit buckets
pub const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);
