//! CreatePaymentHandler - Command handler for starting a subscription payment.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::warn;

use crate::domain::foundation::{DomainError, Money, PaymentId, Timestamp, UserId};
use crate::domain::payment::{PaymentMethod, PaymentTransaction};
use crate::ports::{counters, timers, EventPublisher, Metrics, PaymentGateway, PaymentStore};

/// Monthly premium price: 25000.00 IDR.
const MONTHLY_PRICE_CENTS: i64 = 2_500_000;

/// Currency for all subscription payments.
const CURRENCY: &str = "IDR";

/// Hours the customer has to complete the checkout.
const PAYMENT_WINDOW_HOURS: i64 = 24;

/// Command to create a subscription payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentCommand {
    pub user_id: UserId,
    /// Customer email forwarded to the gateway checkout page.
    pub email: Option<String>,
    /// Client-supplied deduplication key. A retry carrying the same key
    /// returns the original transaction, settled ones included.
    pub idempotency_key: Option<String>,
}

/// Result of payment creation.
#[derive(Debug, Clone)]
pub enum CreatePaymentResult {
    /// A new checkout was created at the gateway.
    Created(PaymentTransaction),
    /// The user already has an open pending payment; reuse its checkout.
    Existing(PaymentTransaction),
}

impl CreatePaymentResult {
    /// The payment transaction regardless of outcome.
    pub fn payment(&self) -> &PaymentTransaction {
        match self {
            CreatePaymentResult::Created(p) | CreatePaymentResult::Existing(p) => p,
        }
    }
}

/// Handler for creating subscription payments.
///
/// Creation is idempotent per user: while a pending payment's window is
/// open, repeated requests return the same checkout instead of creating a
/// new gateway transaction.
pub struct CreatePaymentHandler {
    payments: Arc<dyn PaymentStore>,
    gateway: Arc<dyn PaymentGateway>,
    events: Arc<dyn EventPublisher>,
    metrics: Arc<dyn Metrics>,
}

impl CreatePaymentHandler {
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        gateway: Arc<dyn PaymentGateway>,
        events: Arc<dyn EventPublisher>,
        metrics: Arc<dyn Metrics>,
    ) -> Self {
        Self {
            payments,
            gateway,
            events,
            metrics,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePaymentCommand,
    ) -> Result<CreatePaymentResult, DomainError> {
        let started = Instant::now();
        let result = self.execute(cmd).await;
        let outcome = if result.is_ok() { "success" } else { "error" };
        self.metrics
            .record_duration(timers::PAYMENT_CREATE_DURATION, outcome, started.elapsed());
        result
    }

    async fn execute(&self, cmd: CreatePaymentCommand) -> Result<CreatePaymentResult, DomainError> {
        // 1. Idempotency: a retry carrying a known key gets the original
        //    transaction back whatever its status, so a settled payment is
        //    never charged twice.
        if let Some(key) = cmd.idempotency_key.as_deref() {
            if let Some(existing) = self
                .payments
                .find_by_idempotency_key(&cmd.user_id, key)
                .await?
            {
                return Ok(CreatePaymentResult::Existing(existing));
            }
        }

        // 2. Keyless fallback: reuse an open pending payment
        if let Some(existing) = self.payments.find_open_pending_by_user(&cmd.user_id).await? {
            return Ok(CreatePaymentResult::Existing(existing));
        }

        // 3. Build and persist the pending transaction
        let now = Timestamp::now();
        let order_id = PaymentTransaction::build_order_id(&cmd.user_id, &now);
        let mut payment = PaymentTransaction::create(
            PaymentId::new(),
            cmd.user_id,
            order_id,
            Money::from_cents(MONTHLY_PRICE_CENTS),
            CURRENCY,
            PaymentMethod::Other,
            now.add_hours(PAYMENT_WINDOW_HOURS),
        )?
        .with_idempotency_key(cmd.idempotency_key);
        self.payments.insert(&payment).await?;

        // 4. Create the checkout at the gateway; a gateway failure closes
        //    the payment so the user can retry with a fresh order id.
        let session = match self
            .gateway
            .create_checkout_session(&payment, cmd.email.as_deref())
            .await
        {
            Ok(session) => session,
            Err(gateway_err) => {
                payment.mark_failed()?;
                self.payments.update(&payment).await?;
                return Err(gateway_err);
            }
        };

        payment.attach_checkout_session(session.token, session.redirect_url);
        self.payments.update(&payment).await?;

        self.publish_created(&payment).await;
        self.metrics.increment(counters::PAYMENT_CREATED_TOTAL);

        Ok(CreatePaymentResult::Created(payment))
    }

    async fn publish_created(&self, payment: &PaymentTransaction) {
        let event = crate::ports::BusinessEvent::new(
            "payment.created",
            json!({
                "payment_id": payment.id.to_string(),
                "user_id": payment.user_id.to_string(),
                "order_id": payment.order_id,
                "amount": payment.amount.gross_amount(),
                "currency": payment.currency,
            }),
        );
        if let Err(e) = self.events.publish(event).await {
            warn!(order_id = %payment.order_id, error = %e, "failed to publish payment.created");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentStatus;
    use crate::ports::{BusinessEvent, CheckoutSession, WebhookTxn};
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockPaymentStore {
        payments: Mutex<Vec<PaymentTransaction>>,
    }

    impl MockPaymentStore {
        fn new() -> Self {
            Self {
                payments: Mutex::new(Vec::new()),
            }
        }

        fn with_payment(payment: PaymentTransaction) -> Self {
            Self {
                payments: Mutex::new(vec![payment]),
            }
        }

        fn get_payments(&self) -> Vec<PaymentTransaction> {
            self.payments.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentStore for MockPaymentStore {
        async fn insert(&self, payment: &PaymentTransaction) -> Result<(), DomainError> {
            self.payments.lock().unwrap().push(payment.clone());
            Ok(())
        }

        async fn update(&self, payment: &PaymentTransaction) -> Result<(), DomainError> {
            let mut payments = self.payments.lock().unwrap();
            if let Some(p) = payments.iter_mut().find(|p| p.id == payment.id) {
                *p = payment.clone();
            }
            Ok(())
        }

        async fn find_by_order_id(
            &self,
            order_id: &str,
        ) -> Result<Option<PaymentTransaction>, DomainError> {
            let payments = self.payments.lock().unwrap();
            Ok(payments.iter().find(|p| p.order_id == order_id).cloned())
        }

        async fn find_by_idempotency_key(
            &self,
            user_id: &UserId,
            key: &str,
        ) -> Result<Option<PaymentTransaction>, DomainError> {
            let payments = self.payments.lock().unwrap();
            Ok(payments
                .iter()
                .find(|p| &p.user_id == user_id && p.idempotency_key.as_deref() == Some(key))
                .cloned())
        }

        async fn find_open_pending_by_user(
            &self,
            user_id: &UserId,
        ) -> Result<Option<PaymentTransaction>, DomainError> {
            let now = Timestamp::now();
            let payments = self.payments.lock().unwrap();
            Ok(payments
                .iter()
                .find(|p| &p.user_id == user_id && p.is_payment_window_open(&now))
                .cloned())
        }

        async fn has_successful_payment(&self, user_id: &UserId) -> Result<bool, DomainError> {
            let payments = self.payments.lock().unwrap();
            Ok(payments
                .iter()
                .any(|p| &p.user_id == user_id && p.is_successful()))
        }

        async fn begin_webhook(
            &self,
            _order_id: &str,
        ) -> Result<Option<Box<dyn WebhookTxn>>, DomainError> {
            unimplemented!("not used by CreatePaymentHandler")
        }
    }

    struct MockGateway {
        fail: bool,
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn create_checkout_session(
            &self,
            _payment: &PaymentTransaction,
            _customer_email: Option<&str>,
        ) -> Result<CheckoutSession, DomainError> {
            if self.fail {
                return Err(DomainError::gateway("gateway unavailable"));
            }
            Ok(CheckoutSession {
                token: "snap-token-1".to_string(),
                redirect_url: "https://app.sandbox.midtrans.com/snap/v2/vtweb/snap-token-1"
                    .to_string(),
            })
        }
    }

    struct MockEventPublisher {
        published: Mutex<Vec<BusinessEvent>>,
    }

    impl MockEventPublisher {
        fn new() -> Self {
            Self {
                published: Mutex::new(Vec::new()),
            }
        }

        fn published(&self) -> Vec<BusinessEvent> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventPublisher for MockEventPublisher {
        async fn publish(&self, event: BusinessEvent) -> Result<(), DomainError> {
            self.published.lock().unwrap().push(event);
            Ok(())
        }
    }

    struct MockMetrics {
        counts: Mutex<Vec<String>>,
        durations: Mutex<Vec<(String, String)>>,
    }

    impl MockMetrics {
        fn new() -> Self {
            Self {
                counts: Mutex::new(Vec::new()),
                durations: Mutex::new(Vec::new()),
            }
        }

        fn counts(&self) -> Vec<String> {
            self.counts.lock().unwrap().clone()
        }

        fn durations(&self) -> Vec<(String, String)> {
            self.durations.lock().unwrap().clone()
        }
    }

    impl Metrics for MockMetrics {
        fn increment(&self, counter: &str) {
            self.counts.lock().unwrap().push(counter.to_string());
        }

        fn record_duration(&self, timer: &str, outcome: &str, _elapsed: std::time::Duration) {
            self.durations
                .lock()
                .unwrap()
                .push((timer.to_string(), outcome.to_string()));
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn test_user_id() -> UserId {
        "550e8400-e29b-41d4-a716-446655440000".parse().unwrap()
    }

    fn open_pending_payment(user_id: UserId) -> PaymentTransaction {
        let now = Timestamp::now();
        let mut payment = PaymentTransaction::create(
            PaymentId::new(),
            user_id,
            PaymentTransaction::build_order_id(&user_id, &now),
            Money::from_cents(MONTHLY_PRICE_CENTS),
            CURRENCY,
            PaymentMethod::Other,
            now.add_hours(24),
        )
        .unwrap();
        payment.attach_checkout_session("existing-token".to_string(), "url".to_string());
        payment
    }

    fn handler(
        store: Arc<MockPaymentStore>,
        gateway: MockGateway,
        events: Arc<MockEventPublisher>,
        metrics: Arc<MockMetrics>,
    ) -> CreatePaymentHandler {
        CreatePaymentHandler::new(store, Arc::new(gateway), events, metrics)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn creates_pending_payment_with_checkout_session() {
        let store = Arc::new(MockPaymentStore::new());
        let events = Arc::new(MockEventPublisher::new());
        let metrics = Arc::new(MockMetrics::new());
        let handler = handler(store.clone(), MockGateway { fail: false }, events, metrics);

        let result = handler
            .handle(CreatePaymentCommand {
                user_id: test_user_id(),
                email: Some("user@example.com".to_string()),
                idempotency_key: None,
            })
            .await
            .unwrap();

        let payment = match result {
            CreatePaymentResult::Created(p) => p,
            other => panic!("Expected Created, got {:?}", other),
        };
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount.as_cents(), MONTHLY_PRICE_CENTS);
        assert_eq!(payment.snap_token.as_deref(), Some("snap-token-1"));
        assert!(payment.order_id.starts_with("ORDER-550e8400-"));

        let stored = store.get_payments();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].snap_token.as_deref(), Some("snap-token-1"));
    }

    #[tokio::test]
    async fn reuses_open_pending_payment() {
        let user_id = test_user_id();
        let existing = open_pending_payment(user_id);
        let existing_id = existing.id;
        let store = Arc::new(MockPaymentStore::with_payment(existing));
        let events = Arc::new(MockEventPublisher::new());
        let metrics = Arc::new(MockMetrics::new());
        let handler = handler(
            store.clone(),
            MockGateway { fail: false },
            events.clone(),
            metrics,
        );

        let result = handler
            .handle(CreatePaymentCommand {
                user_id,
                email: None,
                idempotency_key: None,
            })
            .await
            .unwrap();

        match result {
            CreatePaymentResult::Existing(p) => assert_eq!(p.id, existing_id),
            other => panic!("Expected Existing, got {:?}", other),
        }
        // No new row, no new event
        assert_eq!(store.get_payments().len(), 1);
        assert!(events.published().is_empty());
    }

    #[tokio::test]
    async fn retry_with_same_key_returns_settled_payment_without_new_charge() {
        let user_id = test_user_id();
        let store = Arc::new(MockPaymentStore::new());
        let events = Arc::new(MockEventPublisher::new());
        let metrics = Arc::new(MockMetrics::new());
        let handler = handler(
            store.clone(),
            MockGateway { fail: false },
            events,
            metrics,
        );
        let cmd = CreatePaymentCommand {
            user_id,
            email: None,
            idempotency_key: Some("checkout-attempt-1".to_string()),
        };

        let first = handler.handle(cmd.clone()).await.unwrap();
        let order_id = first.payment().order_id.clone();

        // The payment settles, then the client retries the same request.
        {
            let mut payments = store.payments.lock().unwrap();
            payments[0]
                .mark_success(Timestamp::now(), Some("gw-txn-9".to_string()))
                .unwrap();
        }

        let retry = handler.handle(cmd).await.unwrap();
        match retry {
            CreatePaymentResult::Existing(p) => {
                assert_eq!(p.order_id, order_id);
                assert!(p.is_successful());
            }
            other => panic!("Expected Existing, got {:?}", other),
        }
        // Exactly one row: no second charge was opened.
        assert_eq!(store.get_payments().len(), 1);
    }

    #[tokio::test]
    async fn distinct_keys_create_distinct_payments() {
        let user_id = test_user_id();
        let store = Arc::new(MockPaymentStore::new());
        let events = Arc::new(MockEventPublisher::new());
        let metrics = Arc::new(MockMetrics::new());
        let handler = handler(
            store.clone(),
            MockGateway { fail: false },
            events,
            metrics,
        );

        handler
            .handle(CreatePaymentCommand {
                user_id,
                email: None,
                idempotency_key: Some("attempt-1".to_string()),
            })
            .await
            .unwrap();
        // Close the first window so the keyless-reuse fallback stays out
        // of the way.
        {
            let mut payments = store.payments.lock().unwrap();
            payments[0].mark_cancelled().unwrap();
        }

        let second = handler
            .handle(CreatePaymentCommand {
                user_id,
                email: None,
                idempotency_key: Some("attempt-2".to_string()),
            })
            .await
            .unwrap();

        assert!(matches!(second, CreatePaymentResult::Created(_)));
        assert_eq!(store.get_payments().len(), 2);
    }

    #[tokio::test]
    async fn expired_pending_payment_is_not_reused() {
        let user_id = test_user_id();
        let mut stale = open_pending_payment(user_id);
        stale.expires_at = Timestamp::now().add_hours(-1);
        let store = Arc::new(MockPaymentStore::with_payment(stale));
        let events = Arc::new(MockEventPublisher::new());
        let metrics = Arc::new(MockMetrics::new());
        let handler = handler(store.clone(), MockGateway { fail: false }, events, metrics);

        let result = handler
            .handle(CreatePaymentCommand {
                user_id,
                email: None,
                idempotency_key: None,
            })
            .await
            .unwrap();

        assert!(matches!(result, CreatePaymentResult::Created(_)));
        assert_eq!(store.get_payments().len(), 2);
    }

    #[tokio::test]
    async fn gateway_failure_marks_payment_failed() {
        let store = Arc::new(MockPaymentStore::new());
        let events = Arc::new(MockEventPublisher::new());
        let metrics = Arc::new(MockMetrics::new());
        let handler = handler(
            store.clone(),
            MockGateway { fail: true },
            events.clone(),
            metrics,
        );

        let result = handler
            .handle(CreatePaymentCommand {
                user_id: test_user_id(),
                email: None,
                idempotency_key: None,
            })
            .await;

        assert!(result.is_err());
        let stored = store.get_payments();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, PaymentStatus::Failed);
        assert!(events.published().is_empty());
    }

    #[tokio::test]
    async fn publishes_event_and_counts_on_success() {
        let store = Arc::new(MockPaymentStore::new());
        let events = Arc::new(MockEventPublisher::new());
        let metrics = Arc::new(MockMetrics::new());
        let handler = handler(
            store,
            MockGateway { fail: false },
            events.clone(),
            metrics.clone(),
        );

        handler
            .handle(CreatePaymentCommand {
                user_id: test_user_id(),
                email: None,
                idempotency_key: None,
            })
            .await
            .unwrap();

        let published = events.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].name, "payment.created");
        assert_eq!(published[0].payload["amount"], "25000.00");

        assert_eq!(metrics.counts(), vec!["payment.created.total"]);
        assert_eq!(
            metrics.durations(),
            vec![("payment.create.duration".to_string(), "success".to_string())]
        );
    }

    #[tokio::test]
    async fn gateway_failure_records_error_duration() {
        let store = Arc::new(MockPaymentStore::new());
        let events = Arc::new(MockEventPublisher::new());
        let metrics = Arc::new(MockMetrics::new());
        let handler = handler(store, MockGateway { fail: true }, events, metrics.clone());

        let result = handler
            .handle(CreatePaymentCommand {
                user_id: test_user_id(),
                email: None,
                idempotency_key: None,
            })
            .await;

        assert!(result.is_err());
        assert_eq!(
            metrics.durations(),
            vec![("payment.create.duration".to_string(), "error".to_string())]
        );
    }
}
