//! Recsel - recommender selection for annotation projects
//!
//! Recsel decides which recommenders of a project are worth running. Each
//! configured recommender is evaluated on a train/test split of the user's
//! annotated corpus, compared against its score threshold and marked active
//! or inactive. Active recommenders are then handed to training, and the
//! suggestions they produce are kept in generation-based prediction stores.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod id;
pub mod predictions;
pub mod service;
pub mod split;
pub mod suggestion;
pub mod task;

pub use error::{RecselError, Result};
