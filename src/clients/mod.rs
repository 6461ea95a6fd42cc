#[cfg(feature = "anthropic")]
pub mod claude;
#[cfg(feature = "deepseek")]
pub mod deepseek;
pub mod flexible;
pub mod mock;

#[cfg(feature = "anthropic")]
pub use claude::*;
#[cfg(feature = "deepseek")]
pub use deepseek::*;
pub use flexible::*;
pub use mock::*;
