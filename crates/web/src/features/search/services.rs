use storage::{
    ClubStore,
    dto::search::{SearchQuery, SearchResults},
    error::Result,
    services,
};

pub async fn search(store: &dyn ClubStore, query: &SearchQuery) -> Result<SearchResults> {
    services::search(store, &query.q, query.kind).await
}
