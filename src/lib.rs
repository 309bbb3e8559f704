//! llm-comp: send one prompt to several LLMs and compare the answers
//!
//! This library provides:
//! - A static catalog of OpenAI, Claude and Gemini models
//! - Provider clients with per-provider model fallback
//! - An interactive model selector and a tabbed side-by-side comparison view
//! - JSON output for scripts and pipes
//! - TOML configuration, `.env` loading and result persistence

pub mod catalog;
pub mod cli;
pub mod config;
pub mod env;
pub mod init;
pub mod llm;
pub mod persistence;
pub mod tui;

pub use config::Config;
pub use llm::{ProviderOutcome, ReqwestTransport};
