//! Kairon Action Server - custom action execution for conversational bots
//!
//! The dialogue manager names an action; this crate loads its stored
//! configuration, performs the side effect (HTTP call, vector search, LLM
//! completion, slot assignment, third-party API), renders the response
//! against live conversation context and reports slot events plus at most one
//! utterance back, logging every run.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
