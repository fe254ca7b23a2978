//! Integration Tests Module
//!
//! End-to-end tests for the form copilot intake engine. Tests cover reply
//! parsing across encodings, full conversational flows against a scripted
//! collaborator, failure handling, and configuration loading.

// Collaborator reply parsing and normalization tests
mod response_parser_test;

// Multi-turn intake flow tests
mod intake_flow_test;

// Collaborator failure, timeout and stale-turn tests
mod collaborator_failure_test;

// Config file and state initialization tests
mod config_test;
