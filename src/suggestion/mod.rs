//! Suggestions and their index identity.

mod group;
mod identity;
mod types;

pub use group::SuggestionGroup;
pub use identity::{ExtendedId, SuggestionPosition, Vid};
pub use types::{NEW_ID, Offset, RelationSuggestion, SpanSuggestion, Suggestion, SuggestionCore, SuggestionType};
