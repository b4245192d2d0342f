use shared::protocol::AssetMetadata;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) metadata: AssetMetadata,
}

impl AppState {
    pub(crate) fn new(public_url: &str) -> Self {
        Self {
            metadata: AssetMetadata::early_supporter(public_url),
        }
    }
}
