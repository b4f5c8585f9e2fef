pub mod agent_service;
pub mod retrieval;
pub mod sync_service;

pub use agent_service::{AgentService, AgentSettings, DEFAULT_QUERY};
pub use retrieval::{KeywordRetriever, RetrievedLesson, Retriever};
pub use sync_service::{
    RecordOutcome, SyncError, SyncOptions, SyncPolicy, SyncReport, SyncService, SyncStats,
};
