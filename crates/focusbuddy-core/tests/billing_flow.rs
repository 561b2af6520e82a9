//! Checkout through to premium access, with the record kept on disk.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use focusbuddy_core::billing::webhook::{handle_webhook, sign};
use focusbuddy_core::billing::{
    checkout, CheckoutOutcome, CheckoutRequest, PaymentOutcome, PaymentRequest, PaymentWidget,
    PlanId, RetryPolicy, WebhookEvent,
};
use focusbuddy_core::{
    CoreError, EntitlementGate, FileSubscriptionStore, ManualClock, SignatureError,
};

struct AlwaysPays;

#[async_trait]
impl PaymentWidget for AlwaysPays {
    fn is_ready(&self) -> bool {
        true
    }

    async fn open(&self, request: PaymentRequest) -> PaymentOutcome {
        PaymentOutcome::Paid {
            reference: request.reference,
        }
    }
}

fn request(plan_id: PlanId) -> CheckoutRequest {
    CheckoutRequest {
        plan_id,
        email: "user@example.com".into(),
        public_key: "pk_test_123".into(),
        policy: RetryPolicy::default(),
    }
}

#[tokio::test]
async fn paid_checkout_grants_premium_until_expiry() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::default());
    let gate = EntitlementGate::with_clock(FileSubscriptionStore::in_dir(dir.path()), clock.clone());
    assert!(!gate.has_premium_access());

    let outcome = checkout(&gate, &AlwaysPays, request(PlanId::Premium))
        .await
        .unwrap();
    let CheckoutOutcome::Subscribed(record) = outcome else {
        panic!("expected a subscription");
    };
    assert!(record.reference.starts_with("FB_"));
    assert!(gate.has_premium_access());

    // A fresh gate over the same file sees the same record.
    let reopened =
        EntitlementGate::with_clock(FileSubscriptionStore::in_dir(dir.path()), clock.clone());
    assert_eq!(reopened.current_subscription(), Some(record));

    clock.advance(Duration::days(30) + Duration::milliseconds(1));
    assert!(!reopened.has_premium_access());
}

#[tokio::test]
async fn free_plan_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let gate = EntitlementGate::new(FileSubscriptionStore::in_dir(dir.path()));
    let outcome = checkout(&gate, &AlwaysPays, request(PlanId::Basic))
        .await
        .unwrap();
    assert_eq!(outcome, CheckoutOutcome::FreePlan);
    assert!(gate.current_subscription().is_none());
}

#[test]
fn signed_webhook_is_accepted_and_tampered_one_is_not() {
    let secret = b"whsec_test";
    let body = br#"{"event":"charge.success","data":{"reference":"FB_1_ABC","amount":150000,"customer":{"email":"user@example.com"}}}"#;
    let signature = sign(secret, body).unwrap();

    let event = handle_webhook(secret, body, Some(&signature)).unwrap();
    assert!(matches!(event, WebhookEvent::ChargeSuccess(_)));

    let mut tampered = body.to_vec();
    tampered.extend_from_slice(b" ");
    let err = handle_webhook(secret, &tampered, Some(&signature)).unwrap_err();
    assert!(matches!(err, CoreError::Signature(SignatureError::Mismatch)));
}
