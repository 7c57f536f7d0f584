//! Disk-backed TTL caches for price history and exchange rates.
//!
//! Both caches share the 24h TTL but not the freshness comparison: the price
//! cache uses a strict `fetched_at + TTL > now` while the FX cache uses an
//! inclusive `fetched_at >= now - TTL`. The asymmetry is long-standing
//! observable behavior and is kept as-is.

pub mod fx_rate;
pub mod price_series;

pub use fx_rate::FxRateCache;
pub use price_series::PriceSeriesCache;

/// Time-to-live for both caches.
pub const CACHE_TTL_SECS: i64 = 86_400;
