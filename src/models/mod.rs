pub mod answer;
pub mod chain;
pub mod datum;
pub mod page;
pub mod verdict;

pub use answer::{AnswerCandidate, ExtractionMethod, ANSWER_PLACEHOLDER};
pub use chain::{ChainReport, ChainSession, ChainState, ChainStatus};
pub use datum::{CollectedData, CollectedDatum, DataKind, DatumContent};
pub use page::{LinkMap, QuizPage};
pub use verdict::{SubmissionPayload, SubmissionVerdict};
