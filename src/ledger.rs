//! The ledger store: the authoritative, newest-first list of transactions and its persistence.
//!
//! The whole list lives in one storage slot as a JSON array. There is no coordination between two
//! stores that share a slot: each `save` overwrites the slot with its own in-memory list, so the
//! last writer wins and the other writer's additions are lost.

use crate::error::LedgerError;
use crate::model::{sort_newest_first, NewTransaction, Transaction};
use crate::present::Locale;
use crate::session::CurrentUserProvider;
use crate::storage::{Storage, TRANSACTIONS};
use crate::utils::generate_id;
use tracing::{debug, error, trace};

pub struct LedgerStore {
    storage: Box<dyn Storage>,
    users: Box<dyn CurrentUserProvider + Send + Sync>,
    locale: Locale,
    transactions: Vec<Transaction>,
}

impl LedgerStore {
    /// Creates an empty store that reads amounts in the default locale. Call `load` to read what
    /// is already persisted.
    pub fn new(
        storage: impl Storage + 'static,
        users: impl CurrentUserProvider + Send + Sync + 'static,
    ) -> Self {
        Self {
            storage: Box::new(storage),
            users: Box::new(users),
            locale: Locale::default(),
            transactions: Vec::new(),
        }
    }

    /// Reads submitted amounts in the conventions of `locale`.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Replaces the in-memory ledger with the persisted one, sorted newest first, and returns the
    /// number of transactions loaded.
    ///
    /// An absent slot is an empty ledger. If the slot cannot be read or parsed, the error is logged,
    /// the in-memory ledger is left empty and `LedgerError::Persistence` is returned.
    pub async fn load(&mut self) -> Result<usize, LedgerError> {
        self.transactions.clear();
        let raw = match self.storage.get(TRANSACTIONS).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No saved transactions found");
                return Ok(0);
            }
            Err(e) => {
                error!("Unable to read saved transactions: {e}");
                return Err(LedgerError::persistence("load", e));
            }
        };
        let mut transactions: Vec<Transaction> = match serde_json::from_str(&raw) {
            Ok(transactions) => transactions,
            Err(e) => {
                error!("Saved transactions are malformed, starting with an empty ledger: {e}");
                return Err(LedgerError::persistence("load", e));
            }
        };
        sort_newest_first(&mut transactions);
        self.transactions = transactions;
        debug!("Loaded {} transactions", self.transactions.len());
        Ok(self.transactions.len())
    }

    /// Writes the whole in-memory ledger to storage.
    pub async fn save(&self) -> Result<(), LedgerError> {
        let json = serde_json::to_string(&self.transactions)
            .map_err(|e| LedgerError::persistence("save", e))?;
        self.storage
            .set(TRANSACTIONS, &json)
            .await
            .map_err(|e| {
                error!("Unable to save transactions: {e}");
                LedgerError::persistence("save", e)
            })?;
        trace!("Saved {} transactions", self.transactions.len());
        Ok(())
    }

    /// Validates `input`, records it at the front of the ledger and persists the ledger.
    ///
    /// Invalid input is rejected with `LedgerError::Validation` and nothing changes. The new
    /// transaction is placed first without re-sorting, so a back-dated entry stays at the front
    /// until the next `load`. If persisting fails, the transaction remains in memory and
    /// `LedgerError::Persistence` is returned.
    pub async fn add(&mut self, input: &NewTransaction) -> Result<Transaction, LedgerError> {
        let owner = self.users.current_user_id();
        let transaction = Transaction::create(input, self.locale, generate_id(), owner)?;
        debug!(
            "Adding {} transaction {} for {}",
            transaction.kind(),
            transaction.id(),
            transaction.amount()
        );
        self.transactions.insert(0, transaction.clone());
        self.save().await?;
        Ok(transaction)
    }

    /// The transactions in ledger order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::totals;
    use crate::model::{Amount, TransactionType};
    use crate::session::{Guest, SignedIn};
    use crate::storage::MemoryStorage;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn expense(description: &str, amount: &str, date: &str) -> NewTransaction {
        NewTransaction::new(description, amount, "expense", date, "seeds")
    }

    async fn stored(storage: &MemoryStorage) -> Option<String> {
        storage.get(TRANSACTIONS).await.unwrap()
    }

    #[tokio::test]
    async fn test_load_absent_is_empty() {
        let mut ledger = LedgerStore::new(MemoryStorage::new(), Guest);
        assert_eq!(ledger.load().await.unwrap(), 0);
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_add_persists_and_reflects_in_totals() {
        let storage = MemoryStorage::new();
        let mut ledger = LedgerStore::new(storage.clone(), Guest);
        let t = ledger
            .add(&expense("Sementes", "150.00", "2024-03-01"))
            .await
            .unwrap();
        assert_eq!(t.owner_id(), "guest");
        assert_eq!(ledger.len(), 1);
        assert!(stored(&storage).await.unwrap().contains(t.id()));

        let totals = totals(ledger.transactions());
        assert_eq!(totals.income, Decimal::ZERO);
        assert_eq!(totals.expenses, dec("150.00"));
        assert_eq!(totals.balance, dec("-150.00"));
    }

    #[tokio::test]
    async fn test_add_records_signed_in_owner() {
        let mut ledger = LedgerStore::new(MemoryStorage::new(), SignedIn::new("1700000000000"));
        let t = ledger
            .add(&expense("Adubo", "80", "2024-03-01"))
            .await
            .unwrap();
        assert_eq!(t.owner_id(), "1700000000000");
    }

    #[tokio::test]
    async fn test_rejected_add_changes_nothing() {
        let storage = MemoryStorage::new();
        let mut ledger = LedgerStore::new(storage.clone(), Guest);
        ledger
            .add(&expense("Sementes", "10", "2024-03-01"))
            .await
            .unwrap();
        let before = stored(&storage).await;

        for amount in ["0", "-5", "0.00"] {
            let err = ledger
                .add(&expense("Sementes", amount, "2024-03-02"))
                .await
                .unwrap_err();
            assert!(err.is_validation(), "{amount}: {err}");
        }
        let err = ledger
            .add(&NewTransaction::new("", "10", "expense", "2024-03-02", "seeds"))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        assert_eq!(ledger.len(), 1);
        assert_eq!(stored(&storage).await, before);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let mut ledger = LedgerStore::new(MemoryStorage::new(), Guest);
        for _ in 0..50 {
            ledger
                .add(&expense("x", "1", "2024-03-01"))
                .await
                .unwrap();
        }
        let mut ids: Vec<&str> = ledger.transactions().iter().map(|t| t.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[tokio::test]
    async fn test_save_load_round_trip_sorts_newest_first() {
        let storage = MemoryStorage::new();
        let mut ledger = LedgerStore::new(storage.clone(), Guest);
        ledger
            .add(&expense("March", "10.10", "2024-03-01"))
            .await
            .unwrap();
        ledger
            .add(&NewTransaction::new(
                "January \"sale\"",
                "1,000.55",
                "income",
                "2024-01-15T08:30:00.000Z",
                "sales",
            ))
            .await
            .unwrap();
        ledger
            .add(&expense("February", "20", "2024-02-01"))
            .await
            .unwrap();
        let saved = ledger.transactions().to_vec();

        let mut reloaded = LedgerStore::new(storage, Guest);
        assert_eq!(reloaded.load().await.unwrap(), 3);
        let descriptions: Vec<&str> = reloaded
            .transactions()
            .iter()
            .map(|t| t.description())
            .collect();
        assert_eq!(descriptions, vec!["March", "February", "January \"sale\""]);

        for t in reloaded.transactions() {
            let original = saved.iter().find(|s| s.id() == t.id()).unwrap();
            assert_eq!(t, original);
        }
    }

    #[tokio::test]
    async fn test_extreme_amounts_survive_reload() {
        let storage = MemoryStorage::new();
        let mut ledger = LedgerStore::new(storage.clone(), Guest);
        for amount in ["999.999.999.999,99", "0,01", "123456789012.34", "0.07"] {
            ledger
                .add(&expense("limit", amount, "2024-03-01"))
                .await
                .unwrap();
        }
        let saved = ledger.transactions().to_vec();

        let mut reloaded = LedgerStore::new(storage, Guest);
        assert_eq!(reloaded.load().await.unwrap(), 4);
        assert_eq!(reloaded.transactions(), saved.as_slice());
        assert_eq!(
            reloaded.transactions()[3].amount().value(),
            crate::model::max_amount()
        );
    }

    #[tokio::test]
    async fn test_oversized_amount_is_rejected_before_it_reaches_storage() {
        let storage = MemoryStorage::new();
        let mut ledger = LedgerStore::new(storage.clone(), Guest);
        ledger.add(&expense("old", "10", "2024-03-01")).await.unwrap();
        for amount in ["79228162514264337593543950335", "0.1234567890123456789"] {
            let err = ledger
                .add(&expense("huge", amount, "2024-03-01"))
                .await
                .unwrap_err();
            assert!(err.is_validation());
        }

        let mut reloaded = LedgerStore::new(storage, Guest);
        assert_eq!(reloaded.load().await.unwrap(), 1);
        assert_eq!(reloaded.transactions()[0].description(), "old");
    }

    #[tokio::test]
    async fn test_back_dated_add_is_not_resorted_until_load() {
        let storage = MemoryStorage::new();
        let mut ledger = LedgerStore::new(storage.clone(), Guest);
        ledger
            .add(&expense("recent", "1", "2024-03-01"))
            .await
            .unwrap();
        ledger
            .add(&expense("back-dated", "1", "2023-01-01"))
            .await
            .unwrap();
        assert_eq!(ledger.transactions()[0].description(), "back-dated");

        ledger.load().await.unwrap();
        assert_eq!(ledger.transactions()[0].description(), "recent");
    }

    #[tokio::test]
    async fn test_malformed_storage_resets_to_empty() {
        let storage = MemoryStorage::new();
        let mut ledger = LedgerStore::new(storage.clone(), Guest);
        ledger
            .add(&expense("kept in memory", "1", "2024-03-01"))
            .await
            .unwrap();

        storage.set(TRANSACTIONS, "[{\"id\": ").await.unwrap();
        let err = ledger.load().await.unwrap_err();
        assert!(err.is_persistence());
        assert!(ledger.is_empty());

        // A single bad record discards the whole array rather than leaving a partial ledger.
        storage
            .set(
                TRANSACTIONS,
                r#"[{"id":"1","description":"ok","amount":1,"type":"income",
                    "date":"2024-03-01","category":"sales"},
                   {"id":"2","description":"bad","amount":1,"type":"income",
                    "date":"not a date","category":"sales"}]"#,
            )
            .await
            .unwrap();
        assert!(ledger.load().await.is_err());
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_load_accepts_legacy_records() {
        let storage = MemoryStorage::new();
        storage
            .set(
                TRANSACTIONS,
                r#"[
                    {"id":"1","description":"old","amount":1000,"type":"income",
                     "date":1704067200000,"category":"sales"},
                    {"id":"2","description":"new","amount":200.5,"type":"expense",
                     "date":"2024-03-01T00:00:00.000Z","category":"labor","userId":"7"}
                ]"#,
            )
            .await
            .unwrap();
        let mut ledger = LedgerStore::new(storage, Guest);
        assert_eq!(ledger.load().await.unwrap(), 2);
        let first = &ledger.transactions()[0];
        assert_eq!(first.id(), "2");
        assert_eq!(first.amount(), Amount::from_str("200.50").unwrap());
        assert_eq!(ledger.transactions()[1].kind(), TransactionType::Income);
        assert_eq!(ledger.transactions()[1].owner_id(), "guest");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_in_memory_add() {
        let storage = MemoryStorage::with_quota(64);
        let mut ledger = LedgerStore::new(storage.clone(), Guest);
        let err = ledger
            .add(&expense("does not fit in the quota", "99", "2024-03-01"))
            .await
            .unwrap_err();
        assert!(err.is_persistence());

        // Not rolled back: memory and storage now disagree.
        assert_eq!(ledger.len(), 1);
        assert_eq!(stored(&storage).await, None);
        let mut reloaded = LedgerStore::new(storage, Guest);
        assert_eq!(reloaded.load().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_last_save_wins_across_stores() {
        let storage = MemoryStorage::new();
        let mut tab_a = LedgerStore::new(storage.clone(), Guest);
        let mut tab_b = LedgerStore::new(storage.clone(), Guest);
        tab_a.load().await.unwrap();
        tab_b.load().await.unwrap();

        tab_a
            .add(&expense("from tab a", "1", "2024-03-01"))
            .await
            .unwrap();
        tab_b
            .add(&expense("from tab b", "2", "2024-03-01"))
            .await
            .unwrap();

        let mut fresh = LedgerStore::new(storage, Guest);
        assert_eq!(fresh.load().await.unwrap(), 1);
        assert_eq!(fresh.transactions()[0].description(), "from tab b");
    }
}
