mod progress_stream;
mod provider_client;

pub use progress_stream::percent;
pub use provider_client::{DownloadedObject, ProviderClient};
