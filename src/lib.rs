//! Bike-to-kit compatibility for the Reebike storefront.
//!
//! Free text such as "Trek Domane SL 2023" is parsed into a brand and model,
//! resolved against measured frame geometry or the reference table, and
//! turned into a result panel.

pub mod api;
pub mod bike;
pub mod catalog;
pub mod config;
pub mod error;
pub mod geometry;
pub mod kits;
pub mod messages;
pub mod render;
pub mod resolver;
pub mod rule_evaluator;
pub mod verdict;
pub mod widget;

pub use bike::{AxleType, BikeQuery, BikeSpec};
pub use catalog::{lookup, StaticTable, Suggestion};
pub use config::Config;
pub use error::{CompatError, Result};
pub use geometry::{ExternalData, GeometryClient, GeometrySource};
pub use kits::KitName;
pub use render::{HtmlRenderer, Panel, Renderer, TextRenderer};
pub use resolver::{analyze, resolve};
pub use rule_evaluator::evaluate;
pub use verdict::{CompatibilityVerdict, VerdictSource, VerdictStatus};
pub use widget::analyze_text;

/// Install the `tracing` subscriber used by the binaries. `RUST_LOG` wins
/// over the configured default level.
///
/// Logs go to stderr: stdout carries only the CLI's panel or `--json` output.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
