use std::path::PathBuf;

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub(crate) output_dir: PathBuf,
    pub(crate) public_url: String,
    pub(crate) retained_requests: usize,
}
