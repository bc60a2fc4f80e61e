pub mod api;
pub mod catalog;
pub mod compile;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use catalog::{CatalogError, SourceCatalog, StaticCatalog};
pub use compile::{Compiler, InputFingerprint, PortfolioInput, PortfolioOutput};
pub use config::Config;
pub use domain::{
    ComputedPortfolio, Cutoff, EntityRelation, FeedSourceId, PortfolioSource, ProjectId,
    SourceOverrides, Share, Usd,
};
pub use engine::{Evidence, ExposureError, PercentageBasis, PortfolioAggregator};
pub use error::AppError;
pub use orchestration::Orchestrator;
