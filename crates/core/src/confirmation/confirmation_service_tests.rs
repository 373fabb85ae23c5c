#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::checkout::{CheckoutRequest, CheckoutService, Frequency, OrderStatus, PaymentMode};
    use crate::confirmation::{ConfirmOrderRequest, ConfirmationService, ReceiptStatus};
    use crate::donations::{DonationSource, DonationStatus, RecurringStatus};
    use crate::errors::Error;
    use crate::gateway::{IntentStatus, SubscriptionStatus};
    use crate::test_support::{
        at, cart_item, day, donor_profile, InMemoryStore, MockGateway, RecordingNotifier,
    };

    struct Harness {
        store: Arc<InMemoryStore>,
        gateway: Arc<MockGateway>,
        notifier: Arc<RecordingNotifier>,
        checkout: CheckoutService,
        confirmation: ConfirmationService,
    }

    fn harness_with(notifier: Arc<RecordingNotifier>) -> Harness {
        let store = InMemoryStore::at(at(2025, 1, 10, 9));
        let gateway = MockGateway::new();
        let checkout = CheckoutService::new(
            store.clone(),
            store.clone(),
            store.number_service(),
            gateway.clone(),
            "gbp",
        );
        let confirmation = ConfirmationService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            gateway.clone(),
            notifier.clone(),
        );
        Harness {
            store,
            gateway,
            notifier,
            checkout,
            confirmation,
        }
    }

    fn harness() -> Harness {
        harness_with(RecordingNotifier::new())
    }

    async fn place(h: &Harness, items: Vec<crate::checkout::CartItem>) -> String {
        let subtotal_pence = items.iter().map(|i| i.amount_pence).sum();
        let response = h
            .checkout
            .checkout_on(
                CheckoutRequest {
                    items,
                    donor: donor_profile("fatima@example.org"),
                    subtotal_pence,
                    fees_pence: 0,
                    total_pence: subtotal_pence,
                    gift_aid: true,
                    order_number: None,
                },
                day(2025, 1, 10),
            )
            .await
            .unwrap();
        response.order_number
    }

    fn confirm_request(order_number: &str) -> ConfirmOrderRequest {
        ConfirmOrderRequest {
            order_number: order_number.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_confirm_twice_materializes_once() {
        let h = harness();
        let order_number = place(&h, vec![cart_item(Frequency::OneOff, 2500)]).await;

        let first = h
            .confirmation
            .confirm_at(confirm_request(&order_number), at(2025, 1, 10, 10))
            .await
            .unwrap();
        let second = h
            .confirmation
            .confirm_at(confirm_request(&order_number), at(2025, 1, 10, 11))
            .await
            .unwrap();

        assert_eq!(first.ack, second.ack);
        assert_eq!(first.ack.status, OrderStatus::Confirmed);
        assert_eq!(first.receipt, ReceiptStatus::Sent);
        assert_eq!(second.receipt, ReceiptStatus::NotSent);
        assert_eq!(h.store.donations().len(), 1);
        assert_eq!(h.notifier.sent().len(), 1);
        assert_eq!(first.ack.donation_numbers, vec!["DON-100002".to_string()]);
    }

    #[tokio::test]
    async fn test_immediate_donation_is_completed_with_gift_aid() {
        let h = harness();
        let order_number = place(&h, vec![cart_item(Frequency::OneOff, 2500)]).await;

        h.confirmation
            .confirm_at(confirm_request(&order_number), at(2025, 1, 10, 10))
            .await
            .unwrap();

        let donation = &h.store.donations()[0];
        assert_eq!(donation.status, DonationStatus::Completed);
        assert_eq!(donation.source, DonationSource::Checkout);
        assert_eq!(donation.completed_at, Some(at(2025, 1, 10, 10)));
        assert!(donation.gift_aid);
        assert!(!donation.gift_aid_claimed);
        assert_eq!(donation.amount_pence, 2500);
    }

    #[tokio::test]
    async fn test_mixed_order_materializes_donation_and_recurring() {
        let h = harness();
        let mut later = cart_item(Frequency::OneOff, 700);
        later.start_date = Some(day(2025, 2, 1));
        let order_number = place(
            &h,
            vec![
                cart_item(Frequency::OneOff, 2500),
                later,
                cart_item(Frequency::Monthly, 1000),
            ],
        )
        .await;

        let outcome = h
            .confirmation
            .confirm_at(confirm_request(&order_number), at(2025, 1, 10, 10))
            .await
            .unwrap();

        assert_eq!(outcome.ack.mode, PaymentMode::Mixed);
        assert_eq!(outcome.ack.donation_numbers.len(), 2);
        assert_eq!(outcome.ack.recurring_numbers.len(), 1);
        assert!(outcome.ack.recurring_numbers[0].starts_with("REC-"));

        let donations = h.store.donations();
        assert_eq!(donations[0].status, DonationStatus::Completed);
        assert_eq!(donations[1].status, DonationStatus::Scheduled);
        assert_eq!(donations[1].scheduled_for, Some(day(2025, 2, 1)));
        assert_eq!(donations[1].completed_at, None);

        let recurring = &h.store.recurring()[0];
        assert_eq!(recurring.status, RecurringStatus::Active);
        assert_eq!(recurring.amount_pence, 1000);
        assert_eq!(recurring.start_date, day(2025, 1, 10));
        assert_eq!(recurring.subscription_id.as_deref(), Some("sub_1"));

        let receipt = &h.notifier.sent()[0];
        assert_eq!(receipt.lines.len(), 3);
        assert_eq!(receipt.donor_email, "fatima@example.org");
    }

    #[tokio::test]
    async fn test_failing_notifier_still_confirms() {
        let h = harness_with(RecordingNotifier::failing());
        let order_number = place(&h, vec![cart_item(Frequency::OneOff, 2500)]).await;

        let outcome = h
            .confirmation
            .confirm_at(confirm_request(&order_number), at(2025, 1, 10, 10))
            .await
            .unwrap();

        assert_eq!(outcome.ack.status, OrderStatus::Confirmed);
        assert!(matches!(outcome.receipt, ReceiptStatus::Failed(_)));
        assert!(outcome.receipt_warning().is_some());
        assert_eq!(h.store.orders()[0].status, OrderStatus::Confirmed);
        assert_eq!(h.store.donations().len(), 1);
    }

    #[tokio::test]
    async fn test_canceled_payment_marks_order_failed() {
        let h = harness();
        let order_number = place(&h, vec![cart_item(Frequency::OneOff, 2500)]).await;
        h.gateway.set_intent_status(IntentStatus::Canceled);

        let first = h
            .confirmation
            .confirm_at(confirm_request(&order_number), at(2025, 1, 10, 10))
            .await
            .unwrap();
        let second = h
            .confirmation
            .confirm_at(confirm_request(&order_number), at(2025, 1, 10, 11))
            .await
            .unwrap();

        assert_eq!(first.ack.status, OrderStatus::Failed);
        assert_eq!(first.ack, second.ack);
        assert!(h.store.donations().is_empty());
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_payment_requiring_action_is_not_confirmed() {
        let h = harness();
        let order_number = place(&h, vec![cart_item(Frequency::OneOff, 2500)]).await;
        h.gateway.set_intent_status(IntentStatus::RequiresAction);

        let err = h
            .confirmation
            .confirm_at(confirm_request(&order_number), at(2025, 1, 10, 10))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(h.store.orders()[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_incomplete_subscription_holds_mixed_order() {
        let h = harness();
        let order_number = place(
            &h,
            vec![
                cart_item(Frequency::OneOff, 2500),
                cart_item(Frequency::Monthly, 1000),
            ],
        )
        .await;
        h.gateway.set_subscription_status(SubscriptionStatus::Incomplete);

        let result = h
            .confirmation
            .confirm_at(confirm_request(&order_number), at(2025, 1, 10, 10))
            .await;
        assert!(result.is_err());
        assert_eq!(h.gateway.status_lookups(), 2);
    }

    #[tokio::test]
    async fn test_mismatched_identifier_is_rejected() {
        let h = harness();
        let order_number = place(&h, vec![cart_item(Frequency::OneOff, 2500)]).await;

        let mut request = confirm_request(&order_number);
        request.payment_intent_id = Some("pi_other".to_string());
        let err = h
            .confirmation
            .confirm_at(request, at(2025, 1, 10, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let mut request = confirm_request(&order_number);
        request.payment_intent_id = Some("pi_1".to_string());
        assert!(h
            .confirmation
            .confirm_at(request, at(2025, 1, 10, 10))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let h = harness();
        let err = h
            .confirmation
            .confirm_at(confirm_request("ORD-424242"), at(2025, 1, 10, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_setup_order_schedules_everything() {
        let h = harness();
        let mut monthly = cart_item(Frequency::Monthly, 1000);
        monthly.start_date = Some(day(2025, 2, 1));
        let mut later = cart_item(Frequency::OneOff, 300);
        later.start_date = Some(day(2025, 2, 1));
        let order_number = place(&h, vec![later, monthly]).await;

        let outcome = h
            .confirmation
            .confirm_at(confirm_request(&order_number), at(2025, 1, 10, 10))
            .await
            .unwrap();

        assert_eq!(outcome.ack.mode, PaymentMode::Setup);
        assert_eq!(h.store.donations()[0].status, DonationStatus::Scheduled);
        let recurring = &h.store.recurring()[0];
        assert_eq!(recurring.status, RecurringStatus::Scheduled);
        assert_eq!(recurring.start_date, day(2025, 2, 1));
        assert_eq!(recurring.subscription_id, None);
    }
}
