use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use vulnlab_catalog::Environment;

// CVE pattern: CVE-YYYY-XXXXX (4 digit year, 4-7 digit number).
static CVE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)CVE-\d{4}-\d{4,7}$").expect("valid CVE pattern"));

const SCORE_EXACT: u32 = 100;
const SCORE_APP_NAME: u32 = 80;

const WEIGHT_PATH: u32 = 50;
const WEIGHT_CVE: u32 = 45;
const WEIGHT_NAME: u32 = 40;
const WEIGHT_APP: u32 = 35;
const WEIGHT_TAG: u32 = 30;

/// Priority class of a keyword/environment pairing. Lower variants rank
/// first; the derived `Ord` is the ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    ExactCve,
    ExactPath,
    AppName,
    Partial,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchKind::ExactCve => "exact CVE",
            MatchKind::ExactPath => "exact path",
            MatchKind::AppName => "application name",
            MatchKind::Partial => "partial",
        };
        f.write_str(label)
    }
}

/// One environment paired with how well it matched a keyword. The score
/// only breaks ties between matches of the same kind.
#[derive(Debug, Clone)]
pub struct Match {
    pub environment: Environment,
    pub kind: MatchKind,
    pub score: u32,
}

/// Classifies keywords against catalog environments.
pub struct KeywordMatcher;

impl KeywordMatcher {
    #[must_use]
    pub fn is_cve_format(keyword: &str) -> bool {
        CVE_PATTERN.is_match(keyword)
    }

    #[must_use]
    pub fn is_path_format(keyword: &str) -> bool {
        keyword.contains('/')
    }

    /// Classify one environment against a keyword. Tiers are evaluated in
    /// strict order; the first one that applies wins.
    #[must_use]
    pub fn classify(keyword: &str, env: &Environment) -> Option<Match> {
        if Self::is_cve_format(keyword) && env.cve.iter().any(|c| c.eq_ignore_ascii_case(keyword))
        {
            return Some(Match {
                environment: env.clone(),
                kind: MatchKind::ExactCve,
                score: SCORE_EXACT,
            });
        }

        if env.path.eq_ignore_ascii_case(keyword) {
            return Some(Match {
                environment: env.clone(),
                kind: MatchKind::ExactPath,
                score: SCORE_EXACT,
            });
        }

        if env.app.eq_ignore_ascii_case(keyword) && !env.app.is_empty() {
            return Some(Match {
                environment: env.clone(),
                kind: MatchKind::AppName,
                score: SCORE_APP_NAME,
            });
        }

        let score = Self::partial_score(&keyword.to_lowercase(), env);
        if score > 0 {
            return Some(Match {
                environment: env.clone(),
                kind: MatchKind::Partial,
                score,
            });
        }

        None
    }

    fn partial_score(keyword_lower: &str, env: &Environment) -> u32 {
        let mut score = 0;

        if env.path.to_lowercase().contains(keyword_lower) {
            score += WEIGHT_PATH;
        }
        if env.name.to_lowercase().contains(keyword_lower) {
            score += WEIGHT_NAME;
        }
        if env.app.to_lowercase().contains(keyword_lower) {
            score += WEIGHT_APP;
        }
        // CVE and tag hits count once no matter how many entries contain
        // the keyword.
        if env
            .cve
            .iter()
            .any(|c| c.to_lowercase().contains(keyword_lower))
        {
            score += WEIGHT_CVE;
        }
        if env
            .tags
            .iter()
            .any(|t| t.to_lowercase().contains(keyword_lower))
        {
            score += WEIGHT_TAG;
        }

        score
    }

    /// Classify every environment and rank the hits: kind first, higher
    /// score within a kind, catalog order on full ties (the sort is
    /// stable). Returns an empty vector for a blank keyword.
    #[must_use]
    pub fn find_matches(keyword: &str, environments: &[Environment]) -> Vec<Match> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<Match> = environments
            .iter()
            .filter_map(|env| Self::classify(keyword, env))
            .collect();

        matches.sort_by(|a, b| a.kind.cmp(&b.kind).then(b.score.cmp(&a.score)));
        matches
    }

    /// An exact CVE or path hit. An exact match always wins outright and
    /// suppresses every partial candidate.
    #[must_use]
    pub fn find_exact_match<'a>(
        keyword: &str,
        environments: &'a [Environment],
    ) -> Option<(&'a Environment, MatchKind)> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return None;
        }

        if Self::is_cve_format(keyword) {
            if let Some(env) = environments
                .iter()
                .find(|env| env.cve.iter().any(|c| c.eq_ignore_ascii_case(keyword)))
            {
                return Some((env, MatchKind::ExactCve));
            }
        }

        environments
            .iter()
            .find(|env| env.path.eq_ignore_ascii_case(keyword))
            .map(|env| (env, MatchKind::ExactPath))
    }
}
