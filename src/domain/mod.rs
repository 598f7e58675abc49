//! Domain types for recsel
//!
//! This module contains all core domain types:
//! - Project, User, AnnotationLayer, documents: the schema and corpus a selection runs over
//! - Recommender: configured suggestion tool bound to a layer/feature
//! - EvaluationResult: outcome of evaluating a recommender on held-out data
//! - EvaluatedRecommender: activation decision with its justification
//! - LogMessage / RecommenderEvent: narrative and notifications

pub mod evaluated;
pub mod evaluation;
pub mod event;
pub mod log_message;
pub mod project;
pub mod recommender;

pub use evaluated::EvaluatedRecommender;
pub use evaluation::{EvaluationResult, LabelPair};
pub use event::{RecommenderEvent, TaskNotification, event_types};
pub use log_message::{LogLevel, LogMessage};
pub use project::{AnnotatedDocument, Annotation, AnnotationLayer, DocumentRef, LayerType, Project, User};
pub use recommender::Recommender;
