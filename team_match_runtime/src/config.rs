//! Configuration loading: scoring constants and bundled archetypes.
//!
//! Both ship as JSON next to the crate and are compiled in. The scoring
//! constants can be overridden at runtime by pointing
//! `TEAM_MATCH_SCORING_CONFIG` at a file; a broken override is logged and
//! the built-in constants are used instead.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use team_match_engine::domain::{ArchetypeProfile, ScoringConstants};
use team_match_engine::invariants::{validate_archetype, validate_constants};
use team_match_engine::EngineError;
use thiserror::Error;

/// Environment variable naming an override file for the scoring constants.
pub const SCORING_CONFIG_ENV: &str = "TEAM_MATCH_SCORING_CONFIG";

const BUILTIN_SCORING_CONSTANTS: &str = include_str!("../data/scoring_constants.json");
const BUILTIN_ARCHETYPES: &str = include_str!("../data/archetypes.json");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config rejected: {0}")]
    Invalid(#[from] EngineError),
}

/// Parse and validate scoring constants. Missing fields take defaults;
/// unknown fields are rejected.
pub fn read_scoring_constants_from_str(data: &str) -> Result<ScoringConstants, ConfigError> {
    let constants: ScoringConstants = serde_json::from_str(data)?;
    validate_constants(&constants)?;
    Ok(constants)
}

pub fn read_scoring_constants_from_file(path: &Path) -> Result<ScoringConstants, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_scoring_constants_from_str(&data)
}

/// The compiled-in scoring constants.
pub fn builtin_scoring_constants() -> ScoringConstants {
    read_scoring_constants_from_str(BUILTIN_SCORING_CONSTANTS).unwrap_or_else(|err| {
        tracing::error!(
            target: "team_match::config",
            error = %err,
            "scoring_config.builtin_invalid"
        );
        ScoringConstants::default()
    })
}

/// Scoring constants from `TEAM_MATCH_SCORING_CONFIG` if set and valid,
/// otherwise the built-in constants.
pub fn load_scoring_constants_from_env() -> ScoringConstants {
    let Some(path) = env::var_os(SCORING_CONFIG_ENV).map(PathBuf::from) else {
        return builtin_scoring_constants();
    };
    match read_scoring_constants_from_file(&path) {
        Ok(constants) => {
            tracing::info!(
                target: "team_match::config",
                path = %path.display(),
                "scoring_config.loaded"
            );
            constants
        }
        Err(err) => {
            tracing::warn!(
                target: "team_match::config",
                path = %path.display(),
                error = %err,
                "scoring_config.load_failed"
            );
            builtin_scoring_constants()
        }
    }
}

/// Parse and validate a JSON array of archetype profiles.
pub fn read_archetypes_from_str(data: &str) -> Result<Vec<ArchetypeProfile>, ConfigError> {
    let archetypes: Vec<ArchetypeProfile> = serde_json::from_str(data)?;
    for archetype in &archetypes {
        validate_archetype(archetype)?;
    }
    Ok(archetypes)
}

/// The compiled-in archetype catalog.
pub fn builtin_archetypes() -> Result<Vec<ArchetypeProfile>, ConfigError> {
    read_archetypes_from_str(BUILTIN_ARCHETYPES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use team_match_engine::domain::{Domain, RankDecay};

    #[test]
    fn builtin_constants_match_defaults() {
        assert_eq!(builtin_scoring_constants(), ScoringConstants::default());
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let constants = read_scoring_constants_from_str(
            r#"{ "top_k": 3, "rank_decay": { "kind": "table", "weights": [10000, 8000, 6000] } }"#,
        )
        .unwrap();
        assert_eq!(constants.top_k, 3);
        assert_eq!(
            constants.rank_decay,
            RankDecay::Table { weights: vec![10_000, 8_000, 6_000] }
        );
        assert_eq!(constants.covered_threshold, ScoringConstants::default().covered_threshold);
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = read_scoring_constants_from_str(r#"{ "top_kay": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unbalanced_weights_are_rejected() {
        let err = read_scoring_constants_from_str(
            r#"{ "weights": { "strength_coverage": 9000, "domain_balance": 2000,
                 "culture_fit": 2000, "team_size": 2000, "redundancy_penalty": 1500 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(EngineError::InvalidInput(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = read_scoring_constants_from_file(Path::new("/nonexistent/scoring.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn builtin_archetypes_are_valid() {
        let archetypes = builtin_archetypes().unwrap();
        let ids: Vec<&str> = archetypes.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["product_launch", "research_lab", "turnaround"]);
        assert!(archetypes[1].critical_domains.contains(&Domain::Thinking));
    }
}
