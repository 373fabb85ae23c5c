use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::warn;

use donatio_core::constants::MAX_NUMBER_ALLOCATION_ATTEMPTS;
use donatio_core::donation_numbers::{DonationNumber, DonationNumberRepositoryTrait, NumberKind};
use donatio_core::errors::{DatabaseError, Error, Result};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{donation_number_sequence, donation_numbers};

const SEQUENCE_NAME: &str = "donation_number";

/// Advances the shared counter and registers the resulting number.
///
/// Must run inside a write transaction. Numbers that are already registered
/// (for example imported by hand) are skipped; if every attempt collides the
/// uniqueness violation is returned so the caller can retry.
pub fn allocate_number(conn: &mut SqliteConnection, kind: NumberKind) -> Result<DonationNumber> {
    let mut last_error = None;
    for _ in 0..MAX_NUMBER_ALLOCATION_ATTEMPTS {
        let value: i64 = diesel::update(donation_number_sequence::table.find(SEQUENCE_NAME))
            .set(donation_number_sequence::value.eq(donation_number_sequence::value + 1))
            .returning(donation_number_sequence::value)
            .get_result(conn)
            .into_core()?;
        let number = DonationNumber::from_sequence(kind, value);

        let inserted = diesel::insert_into(donation_numbers::table)
            .values((
                donation_numbers::number.eq(number.as_str()),
                donation_numbers::kind.eq(kind.as_str()),
                donation_numbers::issued_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)
            .into_core();

        match inserted {
            Ok(_) => return Ok(number),
            Err(e) if e.is_unique_violation() => {
                warn!("Number {} is already registered, skipping", number);
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        Error::Database(DatabaseError::UniqueViolation(
            "donation_numbers.number".to_string(),
        ))
    }))
}

pub struct DonationNumberRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DonationNumberRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        DonationNumberRepository { pool, writer }
    }
}

#[async_trait]
impl DonationNumberRepositoryTrait for DonationNumberRepository {
    async fn allocate(&self, kind: NumberKind) -> Result<DonationNumber> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| allocate_number(conn, kind))
            .await
    }

    fn is_issued(&self, number: &DonationNumber) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let count: i64 = donation_numbers::table
            .filter(donation_numbers::number.eq(number.as_str()))
            .count()
            .get_result(&mut conn)
            .into_core()?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use donatio_core::donation_numbers::{DonationNumberService, DonationNumberServiceTrait};
    use std::collections::HashSet;
    use tempfile::tempdir;

    async fn create_test_repository() -> (DonationNumberRepository, Arc<DbPool>, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        (DonationNumberRepository::new(Arc::clone(&pool), writer), pool, temp_dir)
    }

    #[tokio::test]
    async fn test_first_number_and_shared_counter() {
        let (repo, _pool, _dir) = create_test_repository().await;

        let order = repo.allocate(NumberKind::Order).await.unwrap();
        let donation = repo.allocate(NumberKind::Donation).await.unwrap();

        assert_eq!(order.as_str(), "ORD-100001");
        assert_eq!(donation.as_str(), "DON-100002");
        assert!(repo.is_issued(&order).unwrap());
        assert!(!repo.is_issued(&DonationNumber::from_sequence(NumberKind::Order, 100002)).unwrap());
    }

    #[tokio::test]
    async fn test_registered_numbers_are_skipped() {
        let (repo, pool, _dir) = create_test_repository().await;
        let mut conn = get_connection(&pool).unwrap();
        diesel::insert_into(donation_numbers::table)
            .values((
                donation_numbers::number.eq("DON-100001"),
                donation_numbers::kind.eq("DONATION"),
                donation_numbers::issued_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .unwrap();

        let number = repo.allocate(NumberKind::Donation).await.unwrap();
        assert_eq!(number.as_str(), "DON-100002");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_allocations_are_distinct() {
        let (repo, _pool, _dir) = create_test_repository().await;
        let service = Arc::new(DonationNumberService::new(Arc::new(repo)));

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.allocate(NumberKind::Donation).await })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in futures::future::join_all(handles).await {
            let number = handle.unwrap().unwrap();
            assert!(seen.insert(number.into_string()));
        }
        assert_eq!(seen.len(), 50);
    }
}
