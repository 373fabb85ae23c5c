#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::errors::Error;
    use crate::giftaid::{GiftAidBucketKind, GiftAidService, GiftAidServiceTrait};
    use crate::test_support::{at, day, InMemoryStore};
    use crate::utils::DateRange;

    fn service(store: &Arc<InMemoryStore>) -> GiftAidService {
        GiftAidService::new(store.clone(), store.clone())
    }

    fn april() -> DateRange {
        DateRange::new(Some(day(2025, 4, 1)), Some(day(2025, 4, 30))).unwrap()
    }

    #[test]
    fn test_schedule_partitions_by_consent() {
        let store = InMemoryStore::at(at(2025, 5, 1, 9));
        let donor = store.seed_donor("fatima@example.org");
        store.seed_completed(&donor.id, 10000, true, at(2025, 4, 1, 0));
        store.seed_completed(&donor.id, 333, true, at(2025, 4, 30, 23));
        store.seed_completed(&donor.id, 500, false, at(2025, 4, 15, 12));
        store.seed_completed(&donor.id, 9999, true, at(2025, 5, 1, 0));

        let schedule = service(&store).get_schedule(april()).unwrap();

        assert_eq!(schedule.eligible.summary.total_count, 2);
        assert_eq!(schedule.eligible.summary.total_amount_pence, 10333);
        assert_eq!(schedule.eligible.summary.claimable_pence, 2583);
        assert_eq!(schedule.ineligible.summary.total_count, 1);
        assert_eq!(schedule.ineligible.summary.total_amount_pence, 500);

        let first = &schedule.eligible.rows[0];
        assert_eq!(first.item, 1);
        assert_eq!(first.title, "Mrs");
        assert_eq!(first.house_name_or_number, "42");
        assert_eq!(first.postcode, "E1 6RA");
        assert_eq!(first.donation_date, "01/04/25");
        assert_eq!(first.amount, "100.00");
        assert_eq!(schedule.eligible.rows[1].item, 2);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let store = InMemoryStore::at(at(2025, 5, 1, 9));
        let range = DateRange {
            start: Some(day(2025, 5, 1)),
            end: Some(day(2025, 4, 1)),
        };
        let err = service(&store).get_schedule(range).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_mark_claimed_twice_is_idempotent() {
        let store = InMemoryStore::at(at(2025, 5, 1, 9));
        let donor = store.seed_donor("fatima@example.org");
        store.seed_completed(&donor.id, 1000, true, at(2025, 4, 2, 10));
        store.seed_completed(&donor.id, 2000, false, at(2025, 4, 3, 10));
        let giftaid = service(&store);

        assert_eq!(giftaid.mark_claimed(april()).await.unwrap(), 1);
        let after_first = store.donations();
        assert_eq!(giftaid.mark_claimed(april()).await.unwrap(), 0);
        assert_eq!(store.donations(), after_first);

        assert!(after_first[0].gift_aid_claimed);
        assert!(!after_first[1].gift_aid_claimed);
        assert!(after_first.iter().all(|d| !d.gift_aid_claimed || d.gift_aid));
    }

    #[tokio::test]
    async fn test_mark_eligible_overrides_consent_for_donor() {
        let store = InMemoryStore::at(at(2025, 5, 1, 9));
        let donor = store.seed_donor("fatima@example.org");
        let other = store.seed_donor("someone@example.org");
        store.seed_completed(&donor.id, 1000, false, at(2025, 4, 2, 10));
        store.seed_completed(&other.id, 1000, false, at(2025, 4, 2, 10));
        let giftaid = service(&store);

        assert_eq!(giftaid.mark_eligible(&donor.id, april()).await.unwrap(), 1);
        let schedule = giftaid.get_schedule(april()).unwrap();
        assert_eq!(schedule.eligible.summary.total_count, 1);
        assert_eq!(schedule.eligible.rows[0].donor_id, donor.id);
        assert_eq!(schedule.ineligible.summary.total_count, 1);

        let err = giftaid.mark_eligible("nobody", april()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_eligible_export_skips_claimed_unless_asked() {
        let store = InMemoryStore::at(at(2025, 5, 1, 9));
        let donor = store.seed_donor("fatima@example.org");
        store.seed_completed(&donor.id, 1000, true, at(2025, 4, 2, 10));
        let giftaid = service(&store);
        giftaid.mark_claimed(april()).await.unwrap();
        store.seed_completed(&donor.id, 2500, true, at(2025, 4, 5, 10));

        let export = giftaid
            .export_csv(april(), GiftAidBucketKind::Eligible, false)
            .unwrap();
        assert_eq!(export.row_count, 1);
        assert_eq!(export.file_name, "gift-aid-eligible-20250401-20250430.csv");
        let lines: Vec<&str> = export.content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "1,Mrs,Fatima,Begum,42,E1 6RA,,,05/04/25,25.00");

        let with_claimed = giftaid
            .export_csv(april(), GiftAidBucketKind::Eligible, true)
            .unwrap();
        assert_eq!(with_claimed.row_count, 2);

        let ineligible = giftaid
            .export_csv(DateRange::unbounded(), GiftAidBucketKind::Ineligible, false)
            .unwrap();
        assert_eq!(ineligible.row_count, 0);
        assert_eq!(ineligible.file_name, "gift-aid-ineligible-all-all.csv");
    }
}
