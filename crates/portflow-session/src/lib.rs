//! # portflow-session
//!
//! Tokio driver for the [`portflow_core::PortRuntime`].
//!
//! One consumer loop per session owns the runtime. Callers talk to it
//! through a cloneable [`SessionHandle`]; every command is applied in
//! arrival order and answered over a oneshot channel, so a value emitted
//! with a realtime binding is readable downstream as soon as
//! [`SessionHandle::emit`] returns.
//!
//! The loop also performs the effects the runtime asks for:
//!
//! - debounce windows become sleeping tasks that report back when they close
//! - `llm` requests go to an [`LlmClient`] with per-attempt timeouts and
//!   exponential backoff from the runtime's `RetryPolicy`
//! - cancelled tickets abort their in-flight tasks
//! - subscriber notifications are forwarded to per-subscription channels
//!
//! ```text
//! SessionHandle ──Command──▶ ┌──────────────┐ ──▶ PortRuntime
//!                            │ session loop │
//! timer / llm tasks ─Event─▶ └──────────────┘ ──▶ subscriber channels
//! ```

mod driver;
mod error;
mod llm;

pub use driver::{DEFAULT_COMMAND_BUFFER, Session, SessionHandle, Subscription};
pub use error::SessionError;
pub use llm::{LlmClient, LlmError, ScriptedLlm};
