use crate::{
    error::ApiError,
    session::{AuthenticatedTransport, TokenStore},
    types::{SearchCategory, SearchResults},
};

/// How many items per entity kind a single search request asks for.
pub const SEARCH_PAGE_LIMIT: u32 = 20;

/// Searches the catalog for tracks, artists, albums, or playlists.
///
/// Goes through the authenticated transport, so a rejected token is
/// transparently refreshed and the request retried once.
pub async fn search<S: TokenStore>(
    transport: &AuthenticatedTransport<S>,
    query: &str,
    category: SearchCategory,
    limit: u32,
) -> Result<SearchResults, ApiError> {
    let limit = limit.to_string();
    transport
        .get_json(
            "/search",
            &[
                ("q", query),
                ("type", category.type_param()),
                ("limit", &limit),
            ],
        )
        .await
}
