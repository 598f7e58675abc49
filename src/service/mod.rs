//! Collaborators of the selection stage.
//!
//! Traits for the services a selection run consumes, in-memory implementations
//! of them, and the store of activation decisions it produces.

mod activation;
mod documents;
mod events;
mod repository;

pub use activation::ActiveRecommenders;
pub use documents::{AccessMode, DocumentSource, InMemoryDocumentSource, UpgradeMode};
pub use events::{ChannelEventPublisher, EventPublisher, TracingEventPublisher};
pub use repository::{InMemoryRecommenderRepository, RecommenderRepository};
