use log::debug;
use vulnlab_catalog::{CatalogError, CatalogStore, Environment};

use crate::{KeywordMatcher, Match, MatchKind, Result};

/// Where the resolver gets its catalog from. Implemented by the on-disk
/// store and by plain vectors for tests.
pub trait EnvironmentSource {
    fn environments(&self) -> std::result::Result<Vec<Environment>, CatalogError>;
}

impl EnvironmentSource for CatalogStore {
    fn environments(&self) -> std::result::Result<Vec<Environment>, CatalogError> {
        Ok(self.load_environments()?.environments)
    }
}

impl EnvironmentSource for Vec<Environment> {
    fn environments(&self) -> std::result::Result<Vec<Environment>, CatalogError> {
        Ok(self.clone())
    }
}

/// Result of resolving one keyword against the catalog.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub keyword: String,
    pub outcome: Outcome,
}

/// Exactly one of these holds per resolution.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Nothing in the catalog matched.
    NoMatches,
    /// Exactly one environment matched. `exact` marks a CVE/path hit that
    /// short-circuited candidate ranking entirely.
    Resolved {
        environment: Environment,
        kind: MatchKind,
        exact: bool,
    },
    /// Several candidates, ranked; the caller has to disambiguate. This is
    /// an answer, not a failure.
    Ambiguous { candidates: Vec<Match> },
}

impl Resolution {
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self.outcome, Outcome::Ambiguous { .. })
    }

    #[must_use]
    pub fn environment(&self) -> Option<&Environment> {
        match &self.outcome {
            Outcome::Resolved { environment, .. } => Some(environment),
            _ => None,
        }
    }

    /// All environments this resolution could refer to, in rank order.
    #[must_use]
    pub fn matched_environments(&self) -> Vec<Environment> {
        match &self.outcome {
            Outcome::NoMatches => Vec::new(),
            Outcome::Resolved { environment, .. } => vec![environment.clone()],
            Outcome::Ambiguous { candidates } => candidates
                .iter()
                .map(|m| m.environment.clone())
                .collect(),
        }
    }
}

/// Resolves user keywords to environments. Stateless: every call loads a
/// fresh catalog snapshot and nothing is cached between calls.
pub struct KeywordResolver<S> {
    source: S,
}

impl<S: EnvironmentSource> KeywordResolver<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn resolve(&self, keyword: &str) -> Result<Resolution> {
        let environments = self.source.environments()?;

        if let Some((env, kind)) = KeywordMatcher::find_exact_match(keyword, &environments) {
            debug!("keyword {keyword:?} resolved exactly to {}", env.path);
            return Ok(Resolution {
                keyword: keyword.to_string(),
                outcome: Outcome::Resolved {
                    environment: env.clone(),
                    kind,
                    exact: true,
                },
            });
        }

        let mut matches = KeywordMatcher::find_matches(keyword, &environments);
        debug!("keyword {keyword:?} produced {} candidates", matches.len());

        let outcome = match matches.len() {
            0 => Outcome::NoMatches,
            1 => {
                let m = matches.remove(0);
                Outcome::Resolved {
                    environment: m.environment,
                    kind: m.kind,
                    exact: false,
                }
            }
            _ => Outcome::Ambiguous { candidates: matches },
        };

        Ok(Resolution {
            keyword: keyword.to_string(),
            outcome,
        })
    }
}
