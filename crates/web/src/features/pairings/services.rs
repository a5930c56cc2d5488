use storage::{
    ClubStore,
    dto::pairing::{PairingRequest, PairingResponse},
    error::Result,
    services::{PairingOptions, pairing},
};

pub async fn propose_pairings(
    store: &dyn ClubStore,
    request: &PairingRequest,
    options: &PairingOptions,
) -> Result<PairingResponse> {
    pairing::propose_pairings(store, request, options).await
}
