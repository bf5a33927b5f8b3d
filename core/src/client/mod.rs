mod http;
mod traits;

pub use http::{error_message, ApiClient, RequestOptions, API_KEY_HEADER};
pub use traits::MissionApi;
