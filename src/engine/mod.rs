//! Pluggable recommender tools.
//!
//! Tools are resolved by lookup: a recommender names its tool, the
//! [`FactoryRegistry`] maps that name to a [`RecommendationEngineFactory`], and
//! the factory builds a [`RecommendationEngine`] for the recommender's settings.

mod registry;
mod traits;

pub use registry::FactoryRegistry;
pub use traits::{RecommendationEngine, RecommendationEngineFactory};
