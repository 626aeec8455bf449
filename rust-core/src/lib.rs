pub mod agent;
pub mod collaborators;
pub mod config;
pub mod deck;
pub mod dispatch;
pub mod error;
pub mod observability;
pub mod operations;
pub mod security;
pub mod stream;

pub use agent::AgentTranscript;
pub use collaborators::Collaborators;
pub use config::Settings;
pub use dispatch::{Dispatcher, ToolRequest, ToolResponseEnvelope, ToolResult};
pub use error::{Result, ToolError};
pub use stream::{AggregateState, StreamAggregator, StreamEvent};
