pub mod dispatcher;
pub mod metrics;
pub mod prompts;
pub mod providers;

pub use dispatcher::{AdvisoryDispatcher, GenerationSource};
pub use metrics::{get_metrics, init_metrics};
pub use providers::{GeminiConfig, GeminiTextProvider, MockTextProvider, ProviderError, TextProvider};
