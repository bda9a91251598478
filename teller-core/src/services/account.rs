//! Account query service - balance and transaction history
//!
//! Each slice is a `watch` channel holding a [`SliceSnapshot`]. Starting a
//! fetch bumps the snapshot's cycle; a result is only written back if the
//! cycle still matches, so a fetch that was superseded or invalidated while
//! in flight is discarded instead of overwriting newer state.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::domain::api::{
    BalanceResponse, TransactionsResponse, BALANCE_ENDPOINT, TRANSACTIONS_ENDPOINT,
};
use crate::domain::result::Result;
use crate::domain::{FetchFailure, SliceSnapshot, SliceState, TransactionPage};
use crate::services::gateway::{ApiRequest, Gateway};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One independently loading piece of account data
pub struct Slice<T> {
    tx: watch::Sender<SliceSnapshot<T>>,
}

pub type BalanceSlice = Slice<Decimal>;
pub type TransactionsSlice = Slice<TransactionPage>;

impl<T: Clone> Slice<T> {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(SliceSnapshot::default());
        Self { tx }
    }

    /// Mark a new fetch as started, returning its cycle
    fn begin(&self) -> u64 {
        let mut cycle = 0;
        self.tx.send_modify(|snapshot| {
            snapshot.cycle += 1;
            snapshot.state = SliceState::Loading;
            cycle = snapshot.cycle;
        });
        cycle
    }

    /// Record a fetch result. Returns false if the fetch was superseded.
    fn finish(&self, cycle: u64, state: SliceState<T>) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.cycle != cycle {
                return false;
            }
            snapshot.state = state;
            true
        })
    }

    /// Drop loaded data and orphan any fetch in flight
    fn invalidate(&self) {
        self.tx.send_modify(|snapshot| {
            snapshot.cycle += 1;
            snapshot.state = SliceState::Idle;
        });
    }

    pub fn state(&self) -> SliceState<T> {
        self.tx.borrow().state.clone()
    }

    pub fn snapshot(&self) -> SliceSnapshot<T> {
        self.tx.borrow().clone()
    }

    pub fn cycle(&self) -> u64 {
        self.tx.borrow().cycle
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<SliceSnapshot<T>> {
        self.tx.subscribe()
    }

    async fn load<F>(&self, name: &str, fetch: F) -> SliceState<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        let cycle = self.begin();

        let state = match fetch.await {
            Ok(value) => SliceState::Loaded(value),
            Err(e) => {
                tracing::warn!(slice = name, error = %e, "fetch failed");
                SliceState::Failed(FetchFailure::from(&e))
            }
        };

        if !self.finish(cycle, state.clone()) {
            tracing::debug!(slice = name, cycle, "discarding stale result");
        }
        state
    }
}

/// Loads balance and transaction history independently of each other
pub struct AccountService {
    gateway: Arc<Gateway>,
    balance: BalanceSlice,
    transactions: TransactionsSlice,
    /// Last requested (page, limit)
    page: Mutex<(u32, u32)>,
    page_size: u32,
}

impl AccountService {
    pub fn new(gateway: Arc<Gateway>, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        Self {
            gateway,
            balance: Slice::new(),
            transactions: Slice::new(),
            page: Mutex::new((1, page_size)),
            page_size,
        }
    }

    pub fn balance(&self) -> &BalanceSlice {
        &self.balance
    }

    pub fn transactions(&self) -> &TransactionsSlice {
        &self.transactions
    }

    /// Page and limit used by the next refresh
    pub fn current_page(&self) -> (u32, u32) {
        *self.page.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fetch the current balance into the balance slice
    ///
    /// The returned state is what this call observed; the slice itself may
    /// already hold something newer if the fetch was superseded.
    pub async fn fetch_balance(&self) -> SliceState<Decimal> {
        self.balance
            .load("balance", async {
                let body: BalanceResponse = self
                    .gateway
                    .call_as(
                        ApiRequest::get(BALANCE_ENDPOINT)
                            .authenticated()
                            .with_fallback("Failed to fetch balance"),
                    )
                    .await?;
                Ok(body.balance)
            })
            .await
    }

    /// Fetch one page of transaction history (1-based) into the transactions slice
    pub async fn fetch_transactions(&self, page: u32, limit: u32) -> SliceState<TransactionPage> {
        let page = page.max(1);
        let limit = limit.max(1);
        *self.page.lock().unwrap_or_else(|e| e.into_inner()) = (page, limit);

        self.transactions
            .load("transactions", async {
                let body: TransactionsResponse = self
                    .gateway
                    .call_as(
                        ApiRequest::get(TRANSACTIONS_ENDPOINT)
                            .authenticated()
                            .with_query(vec![
                                ("page".to_string(), page.to_string()),
                                ("limit".to_string(), limit.to_string()),
                            ])
                            .with_fallback("Failed to fetch transactions"),
                    )
                    .await?;
                Ok(TransactionPage {
                    page,
                    limit,
                    transactions: body.into_transactions(),
                })
            })
            .await
    }

    /// Refresh both slices concurrently; a failure in one leaves the other alone
    pub async fn refresh_all(&self) {
        let (page, limit) = self.current_page();
        tokio::join!(self.fetch_balance(), self.fetch_transactions(page, limit));
    }

    /// Invalidate both slices and go back to the first page
    ///
    /// Called whenever the credential changes so nothing loaded for a
    /// previous session stays visible.
    pub fn reset(&self) {
        self.balance.invalidate();
        self.transactions.invalidate();
        *self.page.lock().unwrap_or_else(|e| e.into_inner()) = (1, self.page_size);
    }
}
