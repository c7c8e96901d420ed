//! Adapters around the lock domain: the out-of-band stale-lock reaper.

pub mod reaper;
