//! Kriralabs SDK: ask a configured chatbot a question over the public API.
//!
//! ```no_run
//! # async fn run() -> Result<(), kriralabs_sdk::SdkError> {
//! use kriralabs_sdk::{AskOptions, ClientConfig, Kriralabs};
//!
//! let client = Kriralabs::new(ClientConfig::new("kl_live_123", "employee3"))?;
//! let reply = client
//!     .ask("How many vacation days do I get?", AskOptions::new().conversation_id("conv-1"))
//!     .await?;
//! println!("{}", reply.answer);
//! client.close();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;

pub use client::{
    AskOptions, ChatResponse, ClientConfig, KriraChatbot, Kriralabs, KriralabsClient,
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, USER_AGENT,
};
pub use error::SdkError;
