pub mod actor;
pub mod handlers;
pub mod types;

pub use actor::ClientActor;
pub use handlers::{handle_frame, process_request, SUPPORTED_API_VERSIONS};
