//! The three tool functions the agent can call.

pub mod create_pptx;
pub mod search_web;
pub mod send_email;

pub use create_pptx::CreatePptx;
pub use search_web::SearchWeb;
pub use send_email::SendEmail;

use crate::dispatch::{Parameters, Payload};
use crate::error::Result;
use async_trait::async_trait;

pub const SEARCH_WEB: &str = "search-web";
pub const CREATE_PPTX: &str = "create-pptx";
pub const SEND_EMAIL: &str = "send-email";

/// A named tool function. Operations check their required settings before
/// touching any collaborator.
#[async_trait]
pub trait Operation: Send + Sync {
    fn name(&self) -> &'static str;

    async fn invoke(&self, params: &Parameters) -> Result<Payload>;
}
