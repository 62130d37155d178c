//! `query`: build the outgoing query payload from toggles and generation flags.

use docdeck_api_models::QueryRequest;
use docdeck_ui::core::config::ViewConfig;
use docdeck_ui::core::toggles::{HYBRID_SEARCH, VECTOR_SEARCH};

use crate::cli::QueryArgs;
use crate::client::{CliError, CliResult};
use crate::commands::new_view;
use crate::output::render_query;

pub(crate) fn handle_query(config: ViewConfig, args: &QueryArgs) -> CliResult<()> {
    let request = build_request(config, args)?;
    render_query(&request)
}

fn build_request(config: ViewConfig, args: &QueryArgs) -> CliResult<QueryRequest> {
    let view = new_view(config);
    if args.hybrid {
        view.set_toggle(HYBRID_SEARCH, true).map_err(CliError::failure)?;
    }
    if args.no_vector {
        view.set_toggle(VECTOR_SEARCH, false).map_err(CliError::failure)?;
    }
    view.query_request(&args.query, &args.generation())
        .map_err(|err| CliError::validation(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdeck_api_models::DEFAULT_SEARCH_LIMIT;

    fn args(query: &str) -> QueryArgs {
        QueryArgs {
            query: query.to_string(),
            hybrid: false,
            no_vector: false,
            model: None,
            temperature: 0.1,
            top_p: 1.0,
            top_k: 100,
            max_tokens: 1024,
        }
    }

    #[test]
    fn toggles_flow_into_search_settings() -> Result<(), String> {
        let mut args = args("latest filings");
        args.hybrid = true;
        args.no_vector = true;
        let request =
            build_request(ViewConfig::default(), &args).map_err(|err| err.display_message())?;
        assert!(request.search_settings.hybrid_search_enabled);
        assert!(!request.search_settings.vector_search_enabled);
        assert_eq!(request.search_settings.search_limit, DEFAULT_SEARCH_LIMIT);
        assert_eq!(request.generation_config.top_k, 100);
        Ok(())
    }

    #[test]
    fn out_of_range_generation_is_a_validation_error() {
        let mut args = args("q");
        args.temperature = 3.0;
        let err = build_request(ViewConfig::default(), &args).expect_err("temperature too high");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("temperature"));
    }

    #[test]
    fn blank_query_is_rejected() {
        let err = build_request(ViewConfig::default(), &args("   ")).expect_err("blank query");
        assert_eq!(err.exit_code(), 2);
    }
}
