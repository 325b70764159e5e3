pub mod browse;
pub mod preferences;
pub mod session;

pub use browse::{BrowsePlan, BrowseReport};
pub use preferences::PreferenceService;
pub use session::Session;
