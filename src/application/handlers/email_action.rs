//! Email action - hands a message to the SMTP sender.

use serde_json::{json, Value};

use super::parameters::{parameter_text, resolve_secret};
use super::{render_text, ActionCommand, ActionError, ActionOutcome, ActionServices, ExecutionTrace};
use crate::domain::action::{BotUtterance, EmailActionConfig};
use crate::ports::EmailMessage;

/// Handler for `email_action`.
#[derive(Clone)]
pub struct EmailActionHandler {
    services: ActionServices,
}

impl EmailActionHandler {
    pub fn new(services: ActionServices) -> Self {
        Self { services }
    }

    pub async fn handle(
        &self,
        cmd: ActionCommand<'_, EmailActionConfig>,
        trace: &mut ExecutionTrace,
    ) -> Result<ActionOutcome, ActionError> {
        let ActionCommand { invocation, context, config } = cmd;

        // 1. Resolve credentials and body
        let tree = context.to_value();
        let smtp_password = resolve_secret(&config.smtp_password, context)?;
        let smtp_userid = config
            .smtp_userid
            .as_ref()
            .and_then(|userid| parameter_text(userid, context));

        let body = match config.custom_text.as_deref().filter(|text| !text.is_empty()) {
            Some(template) => render_text(template, &tree, &mut trace.messages)?,
            None => context.transcript(),
        };

        trace.request = Some(json!({
            "smtp_url": config.smtp_url,
            "smtp_port": config.smtp_port,
            "from_email": config.from_email,
            "to_email": config.to_email,
            "subject": config.subject,
        }));

        // 2. Hand the message to the sender
        tracing::debug!(action = %invocation.action_name, recipients = config.to_email.len(), "Sending email");
        self
            .services
            .email
            .send(EmailMessage {
                smtp_url: config.smtp_url.clone(),
                smtp_port: config.smtp_port,
                tls: config.tls,
                smtp_userid,
                smtp_password,
                from_email: config.from_email.clone(),
                to_email: config.to_email.clone(),
                subject: config.subject.clone(),
                body,
            })
            .await?;

        let bot_response = Value::String(render_text(&config.response, &tree, &mut trace.messages)?);
        Ok(ActionOutcome {
            dispatch: BotUtterance::from_rendered(&bot_response),
            bot_response,
            ..ActionOutcome::default()
        })
    }
}
