//! Outgoing query construction from the toggle registry and generation settings.

use crate::core::toggles::{HYBRID_SEARCH, ToggleRegistry, VECTOR_SEARCH};
use docdeck_api_models::{GenerationConfig, GenerationConfigError, QueryRequest, SearchSettings};
use thiserror::Error;

/// Reasons a query cannot be sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Query text was blank.
    #[error("query must not be empty")]
    EmptyQuery,
    /// Generation parameters failed validation.
    #[error(transparent)]
    Generation(#[from] GenerationConfigError),
}

/// Search settings as currently toggled.
#[must_use]
pub fn search_settings(toggles: &ToggleRegistry, search_limit: u32) -> SearchSettings {
    SearchSettings {
        vector_search_enabled: toggles.is_checked(VECTOR_SEARCH),
        hybrid_search_enabled: toggles.is_checked(HYBRID_SEARCH),
        search_limit,
    }
}

/// Build the request sent to the query endpoint.
///
/// # Errors
///
/// Returns [`RequestError::EmptyQuery`] for blank text and
/// [`RequestError::Generation`] when a parameter is out of range.
pub fn build_query_request(
    query: &str,
    toggles: &ToggleRegistry,
    generation: &GenerationConfig,
    search_limit: u32,
) -> Result<QueryRequest, RequestError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(RequestError::EmptyQuery);
    }
    generation.validate()?;
    Ok(QueryRequest {
        query: query.to_string(),
        search_settings: search_settings(toggles, search_limit),
        generation_config: generation.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::toggles::register_search_toggles;
    use docdeck_api_models::DEFAULT_SEARCH_LIMIT;

    fn registry() -> ToggleRegistry {
        let mut registry = ToggleRegistry::default();
        register_search_toggles(&mut registry);
        registry
    }

    #[test]
    fn request_reflects_toggles() -> Result<(), Box<dyn std::error::Error>> {
        let mut toggles = registry();
        let request = build_query_request(
            "  what changed?  ",
            &toggles,
            &GenerationConfig::default(),
            DEFAULT_SEARCH_LIMIT,
        )?;
        assert_eq!(request.query, "what changed?");
        assert!(request.search_settings.vector_search_enabled);
        assert!(!request.search_settings.hybrid_search_enabled);
        assert_eq!(request.search_settings.search_limit, 10);

        toggles.update(HYBRID_SEARCH, true)?;
        let request = build_query_request("q", &toggles, &GenerationConfig::default(), 25)?;
        assert!(request.search_settings.hybrid_search_enabled);
        assert_eq!(request.search_settings.search_limit, 25);
        Ok(())
    }

    #[test]
    fn blank_query_is_rejected() {
        assert_eq!(
            build_query_request(" ", &registry(), &GenerationConfig::default(), 10),
            Err(RequestError::EmptyQuery)
        );
    }

    #[test]
    fn invalid_generation_is_rejected() {
        let generation = GenerationConfig {
            top_p: 1.5,
            ..GenerationConfig::default()
        };
        let err = build_query_request("q", &registry(), &generation, 10)
            .expect_err("top_p out of range");
        assert!(matches!(
            err,
            RequestError::Generation(GenerationConfigError::OutOfRange { field: "top_p", .. })
        ));
    }

    #[test]
    fn missing_toggles_read_as_disabled() {
        let settings = search_settings(&ToggleRegistry::default(), 10);
        assert!(!settings.vector_search_enabled);
        assert!(!settings.hybrid_search_enabled);
    }
}
