//! Origami recommendation service.
//!
//! A small HTTP service that:
//! - Serves an origami of the day, a status endpoint and a home page
//! - Instruments every request with Prometheus counters and latency histograms
//! - Exposes its own metrics registry on a scrape endpoint

pub mod config;
pub mod metrics;
pub mod recommend;
pub mod routes;
pub mod server;
pub mod state;
pub mod sysinfo;
pub mod template;
pub mod util;

pub use config::Config;
pub use state::AppState;
