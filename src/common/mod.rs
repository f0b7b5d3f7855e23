mod extract;
mod state;

pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use state::AppState;
