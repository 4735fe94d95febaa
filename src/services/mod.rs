pub mod answer_extractor;
pub mod data_collector;
pub mod llm_service;
pub mod page_fetcher;
pub mod prompt;
pub mod submission_client;

pub use data_collector::{ContentDecoder, DataCollector, DataSource, Decoder, HttpDataSource};
pub use llm_service::{LlmService, ReasoningBackend};
pub use page_fetcher::{BrowserPageFetcher, PageFetcher, PageSnapshot, RawAnchor};
pub use submission_client::{SubmissionClient, Submitter};
