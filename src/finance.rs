//! The finance facade: a ledger, its derived figures and the notifications that go with them.
//!
//! Every operation that can fail reports its outcome twice: as a notification for the user and as
//! a typed result for the caller.

use crate::aggregate::{self, CategoryBreakdown, ChartData, Totals};
use crate::error::LedgerError;
use crate::export::{ExportArtifact, Exporter};
use crate::ledger::LedgerStore;
use crate::model::{NewTransaction, Transaction};
use crate::notify::{Notification, Notifier};
use crate::present::{self, Locale, RecentView};
use chrono::{DateTime, Utc};

pub struct Finance<N: Notifier> {
    ledger: LedgerStore,
    notifier: N,
    locale: Locale,
    history_limit: usize,
}

impl<N: Notifier> Finance<N> {
    /// Wraps `ledger`, which from then on reads submitted amounts in `locale` as well.
    pub fn new(ledger: LedgerStore, notifier: N, locale: Locale, history_limit: usize) -> Self {
        Self {
            ledger: ledger.with_locale(locale),
            notifier,
            locale,
            history_limit,
        }
    }

    /// Loads the persisted ledger. A failure is reported to the user and the ledger starts empty.
    pub async fn load(&mut self) -> Result<usize, LedgerError> {
        let result = self.ledger.load().await;
        if let Err(e) = &result {
            self.notifier
                .notify(&Notification::new(e.to_string(), e.severity()));
        }
        result
    }

    /// Records a new transaction and tells the user how it went.
    pub async fn add(&mut self, input: &NewTransaction) -> Result<Transaction, LedgerError> {
        let result = self.ledger.add(input).await;
        let notification = match &result {
            Ok(_) => Notification::success("Transaction recorded"),
            Err(LedgerError::Validation(e)) => {
                Notification::warning(format!("Please fill in every field correctly: {e}"))
            }
            Err(e) => Notification::new(e.to_string(), e.severity()),
        };
        self.notifier.notify(&notification);
        result
    }

    /// Persists the ledger, reporting only failures.
    pub async fn save(&self) -> Result<(), LedgerError> {
        let result = self.ledger.save().await;
        if let Err(e) = &result {
            self.notifier
                .notify(&Notification::new(e.to_string(), e.severity()));
        }
        result
    }

    /// Exports the ledger as CSV named after `now`.
    pub fn export(&self, now: DateTime<Utc>) -> Result<ExportArtifact, LedgerError> {
        let result = Exporter::new(self.locale).export(self.ledger.transactions(), now);
        let notification = match &result {
            Ok(_) => Notification::success("Financial data exported"),
            Err(LedgerError::EmptyExport) => Notification::warning("There are no transactions to export"),
            Err(e) => Notification::new(e.to_string(), e.severity()),
        };
        self.notifier.notify(&notification);
        result
    }

    pub fn totals(&self) -> Totals {
        aggregate::totals(self.ledger.transactions())
    }

    pub fn by_category(&self) -> CategoryBreakdown {
        aggregate::by_category(self.ledger.transactions())
    }

    pub fn chart_data(&self) -> ChartData {
        aggregate::chart_data(self.ledger.transactions())
    }

    /// The configured number of most recent transactions, formatted for display.
    pub fn recent(&self) -> RecentView {
        self.recent_with_limit(self.history_limit)
    }

    pub fn recent_with_limit(&self, limit: usize) -> RecentView {
        present::recent(self.ledger.transactions(), limit, self.locale)
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}
