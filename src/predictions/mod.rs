//! Prediction store.
//!
//! A [`Predictions`] instance holds one generation of suggestions for a user's
//! view of a project. [`PredictionSessions`] tracks which generation is shown
//! and which is being computed.

mod session;
mod store;

pub use session::{PredictionSessions, SessionKey};
pub use store::Predictions;
