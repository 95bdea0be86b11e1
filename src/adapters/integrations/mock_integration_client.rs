//! Mock Integration Client
//!
//! Answers integration calls with configured results and records what was
//! sent. Services without a configured result report `NotConfigured`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::ports::{
    GoogleSearchRequest, HubspotFormRequest, IntegrationClient, IntegrationError, JiraIssueRequest,
    PaymentLink, PaymentLinkRequest, PipedriveLeadRequest, SearchResult, ZendeskTicketRequest,
};

#[derive(Debug, Clone, Default)]
struct Configured {
    search_results: Option<Vec<SearchResult>>,
    jira_issue: Option<Value>,
    zendesk_ticket: Option<Value>,
    pipedrive_lead: Option<Value>,
    hubspot_submission: Option<Value>,
    payment_link: Option<PaymentLink>,
    error: Option<IntegrationError>,
}

/// Clones share configuration and call history.
#[derive(Debug, Clone, Default)]
pub struct MockIntegrationClient {
    configured: Arc<Mutex<Configured>>,
    calls: Arc<Mutex<Vec<(&'static str, Value)>>>,
}

impl MockIntegrationClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_results(self, results: Vec<SearchResult>) -> Self {
        self.configured.lock().unwrap().search_results = Some(results);
        self
    }

    pub fn with_jira_issue(self, issue: Value) -> Self {
        self.configured.lock().unwrap().jira_issue = Some(issue);
        self
    }

    pub fn with_zendesk_ticket(self, ticket: Value) -> Self {
        self.configured.lock().unwrap().zendesk_ticket = Some(ticket);
        self
    }

    pub fn with_pipedrive_lead(self, lead: Value) -> Self {
        self.configured.lock().unwrap().pipedrive_lead = Some(lead);
        self
    }

    pub fn with_hubspot_submission(self, submission: Value) -> Self {
        self.configured.lock().unwrap().hubspot_submission = Some(submission);
        self
    }

    pub fn with_payment_link(self, link: PaymentLink) -> Self {
        self.configured.lock().unwrap().payment_link = Some(link);
        self
    }

    /// Fails every call with `error`.
    pub fn with_error(self, error: IntegrationError) -> Self {
        self.configured.lock().unwrap().error = Some(error);
        self
    }

    /// Recorded `(service, request summary)` pairs; secrets are never recorded.
    pub fn calls(&self) -> Vec<(&'static str, Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn record<T: Clone>(
        &self,
        service: &'static str,
        summary: Value,
        pick: impl FnOnce(&Configured) -> Option<T>,
    ) -> Result<T, IntegrationError> {
        self.calls.lock().unwrap().push((service, summary));
        let configured = self.configured.lock().unwrap();
        if let Some(error) = &configured.error {
            return Err(error.clone());
        }
        pick(&*configured).ok_or(IntegrationError::NotConfigured { service })
    }
}

#[async_trait]
impl IntegrationClient for MockIntegrationClient {
    async fn google_search(&self, request: GoogleSearchRequest) -> Result<Vec<SearchResult>, IntegrationError> {
        let summary = json!({
            "search_engine_id": request.search_engine_id,
            "query": request.query,
            "num_results": request.num_results,
        });
        let limit = request.num_results as usize;
        self.record("google", summary, |c| c.search_results.clone())
            .map(|results| results.into_iter().take(limit).collect())
    }

    async fn create_jira_issue(&self, request: JiraIssueRequest) -> Result<Value, IntegrationError> {
        let summary = json!({
            "url": request.url,
            "project_key": request.project_key,
            "issue_type": request.issue_type,
            "parent_key": request.parent_key,
            "summary": request.summary,
            "description": request.description,
        });
        self.record("jira", summary, |c| c.jira_issue.clone())
    }

    async fn create_zendesk_ticket(&self, request: ZendeskTicketRequest) -> Result<Value, IntegrationError> {
        let summary = json!({
            "subdomain": request.subdomain,
            "subject": request.subject,
            "comment": request.comment,
        });
        self.record("zendesk", summary, |c| c.zendesk_ticket.clone())
    }

    async fn create_pipedrive_lead(&self, request: PipedriveLeadRequest) -> Result<Value, IntegrationError> {
        let summary = json!({
            "domain": request.domain,
            "title": request.title,
            "person": request.person,
            "note": request.note,
        });
        self.record("pipedrive", summary, |c| c.pipedrive_lead.clone())
    }

    async fn submit_hubspot_form(&self, request: HubspotFormRequest) -> Result<Value, IntegrationError> {
        let fields: Vec<Value> = request
            .fields
            .iter()
            .map(|(name, value)| json!({"name": name, "value": value}))
            .collect();
        let summary = json!({
            "portal_id": request.portal_id,
            "form_guid": request.form_guid,
            "fields": fields,
        });
        self.record("hubspot", summary, |c| c.hubspot_submission.clone())
    }

    async fn create_payment_link(&self, request: PaymentLinkRequest) -> Result<PaymentLink, IntegrationError> {
        let summary = json!({
            "amount": request.amount,
            "currency": request.currency,
            "customer_name": request.customer_name,
            "customer_email": request.customer_email,
            "customer_contact": request.customer_contact,
        });
        self.record("razorpay", summary, |c| c.payment_link.clone())
    }
}
