use async_trait::async_trait;
use std::fmt::Debug;

/// Observer for every prompt/response exchange made during generation.
///
/// Failures are reported to the caller but never abort generation.
#[async_trait]
pub trait Interceptor: Send + Sync + Debug {
    async fn save(&self, topic: &str, prompt: &str, response: &str) -> std::io::Result<()>;
}

pub mod file;
pub use file::FileInterceptor;
