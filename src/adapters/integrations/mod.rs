//! Integration Adapters
//!
//! - `MockIntegrationClient` - Configured results for Google, Jira, Zendesk,
//!   Pipedrive, Hubspot, and Razorpay calls

mod mock_integration_client;

pub use mock_integration_client::MockIntegrationClient;
