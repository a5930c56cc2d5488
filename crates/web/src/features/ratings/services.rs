use storage::{ClubStore, dto::ranking::RatingSheetRow, error::Result, services::ranking};

/// Enrolled, non-volunteer players in ratings sheet order
pub async fn rating_sheet(store: &dyn ClubStore) -> Result<Vec<RatingSheetRow>> {
    ranking::load_rating_sheet(store).await
}
