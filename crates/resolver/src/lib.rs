mod error;
mod matcher;
mod resolver;

pub use error::{ResolverError, Result};
pub use matcher::{KeywordMatcher, Match, MatchKind};
pub use resolver::{EnvironmentSource, KeywordResolver, Outcome, Resolution};
