use std::io::{BufRead, Write};

use async_trait::async_trait;
use clap::Subcommand;
use focusbuddy_core::billing::{
    checkout, find_plan, CheckoutOutcome, CheckoutRequest, PaymentOutcome, PaymentRequest,
    PaymentVerifier, PaymentWidget, PlanId, StubVerifier,
};
use focusbuddy_core::{Config, ConfigError};
use serde_json::json;

use super::{entitlement_gate, CliResult};

#[derive(Subcommand)]
pub enum SubscriptionAction {
    /// Show whether premium features are unlocked
    Status,
    /// Subscribe to a plan (basic, premium, pro)
    Subscribe {
        plan: PlanId,
        /// Record an already-completed payment instead of opening checkout
        #[arg(long)]
        reference: Option<String>,
        /// Billing email (overrides config)
        #[arg(long)]
        email: Option<String>,
    },
    /// Remove the stored subscription
    Clear,
}

pub async fn run(action: SubscriptionAction) -> CliResult {
    let gate = entitlement_gate()?;

    match action {
        SubscriptionAction::Status => {
            let out = json!({
                "premium": gate.has_premium_access(),
                "subscription": gate.current_subscription(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        SubscriptionAction::Subscribe {
            plan,
            reference: Some(reference),
            ..
        } => {
            let verification = StubVerifier.verify_payment(&reference).await?;
            let record = gate.save_subscription(plan, verification.reference)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        SubscriptionAction::Subscribe {
            plan,
            reference: None,
            email,
        } => {
            let config = Config::load_or_default();
            let public_key = match config.billing.public_key.clone() {
                Some(key) => key,
                None if find_plan(plan).is_free() => String::new(),
                None => return Err(ConfigError::MissingKey("billing.public_key".into()).into()),
            };
            let request = CheckoutRequest {
                plan_id: plan,
                email: email.unwrap_or_else(|| config.billing.email.clone()),
                public_key,
                policy: config.billing.retry_policy(),
            };

            let outcome = checkout(&gate, &TerminalWidget, request).await?;
            match outcome {
                CheckoutOutcome::FreePlan => println!("basic plan is free; nothing to pay"),
                CheckoutOutcome::Subscribed(record) => {
                    println!("{}", serde_json::to_string_pretty(&record)?)
                }
            }
        }
        SubscriptionAction::Clear => {
            gate.clear_subscription()?;
            println!("subscription cleared");
        }
    }
    Ok(())
}

/// Checkout in the terminal: show the charge and ask for confirmation.
struct TerminalWidget;

#[async_trait]
impl PaymentWidget for TerminalWidget {
    fn is_ready(&self) -> bool {
        true
    }

    async fn open(&self, request: PaymentRequest) -> PaymentOutcome {
        let prompt = format!(
            "Charge {} {}.{:02} to {} (reference {}). Type 'paid' once payment completes: ",
            request.currency,
            request.amount_minor / 100,
            request.amount_minor % 100,
            request.email,
            request.reference,
        );
        let answer = tokio::task::spawn_blocking(move || {
            let mut stderr = std::io::stderr();
            let _ = write!(stderr, "{prompt}");
            let _ = stderr.flush();
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) if line.trim().eq_ignore_ascii_case("paid") => PaymentOutcome::Paid {
                reference: request.reference,
            },
            _ => PaymentOutcome::Closed,
        }
    }
}
