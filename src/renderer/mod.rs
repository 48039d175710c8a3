//! Renderer for token streams
//!
//! This module consumes the tokenizer's output under a resolver and a
//! missing-key policy and produces either a finished string or a
//! [`CompositeTemplate`] for a later formatting pass.

pub mod config;
pub mod engine;
pub mod format;

pub use config::{MissingKeyPolicy, RenderConfig, UnknownPolicy};
pub use engine::{render_tokens, render_tokens_deferred, CompositeTemplate};
pub use format::{StandardFormatter, ValueFormatter};
