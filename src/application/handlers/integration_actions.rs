//! Third-party integrations: search, ticketing, CRM, forms and payments.
//!
//! Each action resolves its credentials as parameters, makes one typed call
//! through [`IntegrationClient`](crate::ports::IntegrationClient), and renders
//! its configured response against the context.

use serde_json::{json, Map, Value};

use super::parameters::{parameter_text, resolve_parameters, resolve_secret};
use super::{render_text, ActionCommand, ActionError, ActionOutcome, ActionServices, ExecutionTrace};
use crate::domain::action::{
    BotUtterance, CustomParameter, GoogleSearchConfig, HubspotFormsConfig, JiraActionConfig, PipedriveLeadsConfig,
    RazorpayActionConfig, ZendeskActionConfig,
};
use crate::ports::{
    GoogleSearchRequest, HubspotFormRequest, JiraIssueRequest, PaymentLinkRequest, PipedriveLeadRequest,
    SearchResult, ZendeskTicketRequest,
};

/// Renders one search hit the way the web widget displays it.
pub fn format_search_result(result: &SearchResult) -> String {
    format!(
        "{}\nTo know more, please visit: <a href = \"{}\" target=\"_blank\" >{}</a>",
        result.snippet, result.link, result.title
    )
}

/// Handler for the integration action types.
#[derive(Clone)]
pub struct IntegrationActionHandler {
    services: ActionServices,
}

impl IntegrationActionHandler {
    pub fn new(services: ActionServices) -> Self {
        Self { services }
    }

    /// Searches the web for the user's question.
    pub async fn google_search(
        &self,
        cmd: ActionCommand<'_, GoogleSearchConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { context, config, .. } = cmd;
        let query = context.question().to_string();
        trace.request = Some(json!({
            "search_engine_id": config.search_engine_id,
            "query": query,
            "num_results": config.num_results,
        }));

        let results = self
            .services
            .integrations
            .google_search(GoogleSearchRequest {
                api_key: resolve_secret(&config.api_key, context)?,
                search_engine_id: config.search_engine_id.clone(),
                query,
                num_results: config.num_results,
            })
            .await?;
        trace.api_response = Some(json!(results));

        let answer = if results.is_empty() {
            trace.messages.push("No search results found, using failure response");
            config.failure_response.clone()
        } else {
            results.iter().map(format_search_result).collect::<Vec<_>>().join("\n\n")
        };
        let bot_response = Value::String(answer);

        let mut filled_slots = Map::new();
        if let Some(slot) = config.set_slot.as_deref().filter(|slot| !slot.is_empty()) {
            filled_slots.insert(slot.to_string(), bot_response.clone());
        }

        Ok(ActionOutcome {
            filled_slots,
            dispatch: if config.dispatch_response {
                BotUtterance::from_rendered(&bot_response)
            } else {
                None
            },
            bot_response,
        })
    }

    pub async fn jira(
        &self,
        cmd: ActionCommand<'_, JiraActionConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { context, config, .. } = cmd;
        let tree = context.to_value();
        let summary = render_text(&config.summary, &tree, &mut trace.messages)?;
        trace.request = Some(json!({
            "url": config.url,
            "project_key": config.project_key,
            "issue_type": config.issue_type,
            "parent_key": config.parent_key,
            "summary": summary,
        }));

        let issue = self
            .services
            .integrations
            .create_jira_issue(JiraIssueRequest {
                url: config.url.clone(),
                user_name: config.user_name.clone(),
                api_token: resolve_secret(&config.api_token, context)?,
                project_key: config.project_key.clone(),
                issue_type: config.issue_type.clone(),
                parent_key: config.parent_key.clone(),
                summary,
                description: context.transcript(),
            })
            .await?;
        trace.api_response = Some(issue);

        respond(&config.response, &tree, trace)
    }

    pub async fn zendesk(
        &self,
        cmd: ActionCommand<'_, ZendeskActionConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { context, config, .. } = cmd;
        let tree = context.to_value();
        let subject = render_text(&config.subject, &tree, &mut trace.messages)?;
        trace.request = Some(json!({"subdomain": config.subdomain, "subject": subject}));

        let ticket = self
            .services
            .integrations
            .create_zendesk_ticket(ZendeskTicketRequest {
                subdomain: config.subdomain.clone(),
                user_name: config.user_name.clone(),
                api_token: resolve_secret(&config.api_token, context)?,
                subject,
                comment: context.transcript(),
            })
            .await?;
        trace.api_response = Some(ticket);

        respond(&config.response, &tree, trace)
    }

    pub async fn pipedrive(
        &self,
        cmd: ActionCommand<'_, PipedriveLeadsConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { context, config, .. } = cmd;
        let tree = context.to_value();
        let person: Map<String, Value> = config
            .metadata
            .iter()
            .map(|(field, slot)| {
                let value = slot
                    .as_str()
                    .and_then(|slot| context.slot.get(slot))
                    .cloned()
                    .unwrap_or(Value::Null);
                (field.clone(), value)
            })
            .collect();
        if person.get("name").map_or(true, Value::is_null) {
            return Err(ActionError::MissingParameter("name".to_string()));
        }

        let title = render_text(&config.title, &tree, &mut trace.messages)?;
        trace.request = Some(json!({"domain": config.domain, "title": title, "person": person}));

        let lead = self
            .services
            .integrations
            .create_pipedrive_lead(PipedriveLeadRequest {
                domain: config.domain.clone(),
                api_token: resolve_secret(&config.api_token, context)?,
                title,
                person,
                note: context.transcript(),
            })
            .await?;
        trace.api_response = Some(lead);

        respond(&config.response, &tree, trace)
    }

    pub async fn hubspot(
        &self,
        cmd: ActionCommand<'_, HubspotFormsConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { context, config, .. } = cmd;
        let fields = resolve_parameters(&config.fields, context);
        trace.request = Some(json!({
            "portal_id": config.portal_id,
            "form_guid": config.form_guid,
            "fields": fields,
        }));

        let submission = self
            .services
            .integrations
            .submit_hubspot_form(HubspotFormRequest {
                portal_id: config.portal_id.clone(),
                form_guid: config.form_guid.clone(),
                fields: fields.into_iter().collect(),
            })
            .await?;
        trace.api_response = Some(submission);

        respond(&config.response, &context.to_value(), trace)
    }

    /// Creates a Razorpay payment link and dispatches it.
    pub async fn razorpay(
        &self,
        cmd: ActionCommand<'_, RazorpayActionConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { context, config, .. } = cmd;
        let amount_text =
            parameter_text(&config.amount, context).ok_or_else(|| ActionError::MissingParameter("amount".to_string()))?;
        let amount: f64 = amount_text
            .trim()
            .parse()
            .map_err(|_| ActionError::InvalidRequest(format!("amount '{}' is not a number", amount_text)))?;
        let currency = parameter_text(&config.currency, context)
            .filter(|currency| !currency.is_empty())
            .ok_or_else(|| ActionError::MissingParameter("currency".to_string()))?;
        let optional = |parameter: &Option<CustomParameter>| parameter.as_ref().and_then(|parameter| parameter_text(parameter, context));

        let request = PaymentLinkRequest {
            api_key: resolve_secret(&config.api_key, context)?,
            api_secret: resolve_secret(&config.api_secret, context)?,
            amount,
            currency,
            customer_name: optional(&config.username),
            customer_email: optional(&config.email),
            customer_contact: optional(&config.contact),
        };
        trace.request = Some(json!({
            "amount": request.amount,
            "currency": request.currency,
            "customer_name": request.customer_name,
            "customer_email": request.customer_email,
            "customer_contact": request.customer_contact,
        }));

        let link = self.services.integrations.create_payment_link(request).await?;
        trace.api_response = Some(json!(link));

        let bot_response = Value::String(link.short_url);
        Ok(ActionOutcome {
            dispatch: BotUtterance::from_rendered(&bot_response),
            bot_response,
            ..ActionOutcome::default()
        })
    }
}

fn respond(template: &str, tree: &Value, trace: &mut ExecutionTrace) -> Result<ActionOutcome, ActionError> {
    let bot_response = Value::String(render_text(template, tree, &mut trace.messages)?);
    Ok(ActionOutcome {
        dispatch: BotUtterance::from_rendered(&bot_response),
        bot_response,
        ..ActionOutcome::default()
    })
}
