//! Integration Client Port - third-party SaaS calls made by integration actions.
//!
//! Vendor SDK details stay behind this port; handlers only build the typed
//! requests below and read back the fields they dispatch.

use async_trait::async_trait;
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[async_trait]
pub trait IntegrationClient: Send + Sync {
    async fn google_search(&self, request: GoogleSearchRequest) -> Result<Vec<SearchResult>, IntegrationError>;

    async fn create_jira_issue(&self, request: JiraIssueRequest) -> Result<Value, IntegrationError>;

    async fn create_zendesk_ticket(&self, request: ZendeskTicketRequest) -> Result<Value, IntegrationError>;

    async fn create_pipedrive_lead(&self, request: PipedriveLeadRequest) -> Result<Value, IntegrationError>;

    async fn submit_hubspot_form(&self, request: HubspotFormRequest) -> Result<Value, IntegrationError>;

    async fn create_payment_link(&self, request: PaymentLinkRequest) -> Result<PaymentLink, IntegrationError>;
}

#[derive(Debug, Clone)]
pub struct GoogleSearchRequest {
    pub api_key: Secret<String>,
    pub search_engine_id: String,
    pub query: String,
    pub num_results: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Clone)]
pub struct JiraIssueRequest {
    pub url: String,
    pub user_name: String,
    pub api_token: Secret<String>,
    pub project_key: String,
    pub issue_type: String,
    pub parent_key: Option<String>,
    pub summary: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ZendeskTicketRequest {
    pub subdomain: String,
    pub user_name: String,
    pub api_token: Secret<String>,
    pub subject: String,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct PipedriveLeadRequest {
    pub domain: String,
    pub api_token: Secret<String>,
    pub title: String,
    /// Person details keyed by Pipedrive field (`name`, `org_name`, `email`, `phone`).
    pub person: Map<String, Value>,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct HubspotFormRequest {
    pub portal_id: String,
    pub form_guid: String,
    pub fields: Vec<(String, Value)>,
}

#[derive(Debug, Clone)]
pub struct PaymentLinkRequest {
    pub api_key: Secret<String>,
    pub api_secret: Secret<String>,
    pub amount: f64,
    pub currency: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLink {
    pub id: String,
    pub short_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrationError {
    #[error("{service} integration is not configured")]
    NotConfigured { service: &'static str },

    #[error("{service} API error: {message}")]
    Api { service: &'static str, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

impl IntegrationError {
    pub fn api(service: &'static str, message: impl Into<String>) -> Self {
        IntegrationError::Api {
            service,
            message: message.into(),
        }
    }
}
