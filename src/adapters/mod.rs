//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the action pipeline to external systems:
//! - `ai` - OpenAI completion client and a mock
//! - `evaluator` - Remote script evaluator over HTTP and a mock
//! - `storage` - Action catalogs and secret vaults (in-memory, YAML file)
//! - `audit` - Execution log sinks (in-memory, JSON lines)
//! - `vector` - In-memory vector collections
//! - `http_client` - Outbound HTTP for HTTP actions
//! - `email` - Outbox email sender
//! - `integrations` - Third-party integration client
//! - `training` - Training examples for fallback suggestions
//! - `http` - The axum webhook

pub mod ai;
pub mod audit;
pub mod email;
pub mod evaluator;
pub mod http;
pub mod http_client;
pub mod integrations;
pub mod storage;
pub mod training;
pub mod vector;
