use crate::{
    error::FetchError,
    types::{GraphQLError, GraphQLPullRequest, GraphQLResponse, Page, PullRequest, Repo},
};

/// Open pull requests, newest first, each with up to 100 label names.
pub const OPEN_PRS_QUERY: &str = r#"
    query($owner: String!, $name: String!, $after: String) {
        repository(owner: $owner, name: $name) {
            open_prs: pullRequests(
                after: $after,
                first: 100,
                states: OPEN,
                orderBy: {field: CREATED_AT, direction: DESC}
            ) {
                nodes {
                    number
                    labels(first: 100, orderBy: {field: CREATED_AT, direction: DESC}) {
                        nodes {
                            name
                        }
                    }
                }
                pageInfo {
                    endCursor
                    hasNextPage
                }
            }
        }
    }
"#;

pub fn create_graphql_query(repo: &Repo, after: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "query": OPEN_PRS_QUERY,
        "variables": {
            "owner": repo.owner,
            "name": repo.name,
            "after": after,
        }
    })
}

pub fn convert_graphql_pr(graphql_pr: GraphQLPullRequest) -> PullRequest {
    PullRequest {
        number: graphql_pr.number,
        labels: graphql_pr
            .labels
            .nodes
            .into_iter()
            .map(|label| label.name)
            .collect(),
    }
}

// GitHub reports rate limiting and scope problems in the `errors` array of
// an HTTP 200 response, tagged with an uppercase `type`.
pub fn map_graphql_errors(errors: &[GraphQLError]) -> FetchError {
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    let has_type = |wanted: &str| {
        errors
            .iter()
            .any(|e| e.error_type.as_deref() == Some(wanted))
    };

    if has_type("RATE_LIMITED") {
        FetchError::RateLimited { message }
    } else if has_type("FORBIDDEN") || has_type("UNAUTHORIZED") {
        FetchError::Authentication { message }
    } else {
        FetchError::Api { message }
    }
}

/// Turns a decoded GraphQL response into a page.
///
/// A response carrying any error is treated as failed even when partial
/// data is present, so a page is never silently short.
pub fn convert_graphql_response(response: GraphQLResponse) -> Result<Page, FetchError> {
    if let Some(errors) = response.errors.as_deref().filter(|e| !e.is_empty()) {
        return Err(map_graphql_errors(errors));
    }

    let repository = response
        .data
        .and_then(|data| data.repository)
        .ok_or_else(|| FetchError::Api {
            message: "response contained no repository data".to_string(),
        })?;

    let connection = repository.open_prs;
    Ok(Page {
        pull_requests: connection
            .nodes
            .into_iter()
            .map(convert_graphql_pr)
            .collect(),
        end_cursor: connection.page_info.end_cursor,
        has_next_page: connection.page_info.has_next_page,
    })
}
