//! Meeting transcript summarization relay.
//!
//! Accepts a transcript (inline text or a plain-text upload), asks an
//! OpenAI-compatible LLM for a structured summary, and can email the result
//! over SMTP. The HTTP surface lives in [`api`]; the LLM and SMTP gateways sit
//! behind the [`llm::Summarizer`] and [`mail::Mailer`] traits.

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod mail;
pub mod services;
pub mod transcript;
