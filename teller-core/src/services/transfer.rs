//! Transfer workflow
//!
//! Drives one peer-to-peer transfer at a time through
//! Idle -> Editing -> Validating -> Submitting -> Succeeded/Failed -> Idle.
//! The phase lives in a `watch` channel so front ends can follow it, and the
//! in-flight claim is a single `send_if_modified`, which makes a second
//! concurrent submit fail fast without reaching the network. The claim is
//! held until the submission returns the phase to Idle, including the
//! post-transfer refresh.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::domain::api::{TransferResponse, TRANSFER_ENDPOINT};
use crate::domain::result::{Error, Result};
use crate::domain::{TransferForm, TransferOutcome, TransferPhase, TransferReceipt, TransferRequest};
use crate::services::account::AccountService;
use crate::services::gateway::{ApiRequest, Gateway};

const DEFAULT_SUCCESS_MESSAGE: &str = "Transfer successful";

pub struct TransferWorkflow {
    gateway: Arc<Gateway>,
    accounts: Arc<AccountService>,
    phase: watch::Sender<TransferPhase>,
    form: Mutex<TransferForm>,
    last_outcome: Mutex<Option<TransferOutcome>>,
}

impl TransferWorkflow {
    pub fn new(gateway: Arc<Gateway>, accounts: Arc<AccountService>) -> Self {
        let (phase, _rx) = watch::channel(TransferPhase::Idle);
        Self {
            gateway,
            accounts,
            phase,
            form: Mutex::new(TransferForm::default()),
            last_outcome: Mutex::new(None),
        }
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TransferPhase> {
        self.phase.subscribe()
    }

    pub fn form(&self) -> TransferForm {
        self.form.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Outcome of the most recent completed submission
    pub fn last_outcome(&self) -> Option<TransferOutcome> {
        self.last_outcome
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Open an empty form. Ignored while a submission is in flight.
    pub fn open(&self) {
        let opened = self.phase.send_if_modified(|phase| {
            if phase.is_in_flight() {
                return false;
            }
            *phase = TransferPhase::Editing;
            true
        });
        if opened {
            self.form.lock().unwrap_or_else(|e| e.into_inner()).clear();
        }
    }

    /// Discard the form; the phase returns to Idle unless a submission is in flight
    pub fn close(&self) {
        self.form.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.phase.send_if_modified(|phase| {
            if phase.is_in_flight() || *phase == TransferPhase::Idle {
                return false;
            }
            *phase = TransferPhase::Idle;
            true
        });
    }

    pub fn set_recipient(&self, recipient: impl Into<String>) {
        self.form.lock().unwrap_or_else(|e| e.into_inner()).recipient = recipient.into();
    }

    pub fn set_amount(&self, amount: impl Into<String>) {
        self.form.lock().unwrap_or_else(|e| e.into_inner()).amount = amount.into();
    }

    /// Submit whatever is currently in the form
    pub async fn submit_form(&self) -> Result<TransferReceipt> {
        let form = self.form();
        self.submit(&form.recipient, &form.amount).await
    }

    /// Validate and submit a transfer
    ///
    /// On success both account slices are refreshed once before this returns.
    pub async fn submit(&self, recipient: &str, amount_text: &str) -> Result<TransferReceipt> {
        let mut resume = TransferPhase::Idle;
        let claimed = self.phase.send_if_modified(|phase| {
            if phase.is_in_flight() {
                return false;
            }
            if *phase == TransferPhase::Editing {
                resume = TransferPhase::Editing;
            }
            *phase = TransferPhase::Validating;
            true
        });
        if !claimed {
            tracing::warn!("transfer rejected: another submission is in flight");
            return Err(Error::TransferInFlight);
        }

        let request = match TransferRequest::parse(recipient, amount_text) {
            Ok(request) => request,
            Err(e) => {
                // Keep the form so the user can correct it
                self.phase.send_replace(resume);
                return Err(e.into());
            }
        };

        self.phase.send_replace(TransferPhase::Submitting);
        tracing::debug!("submitting transfer");

        let result = self
            .gateway
            .call_as::<TransferResponse>(
                ApiRequest::post(TRANSFER_ENDPOINT)
                    .authenticated()
                    .with_query(request.query_params())
                    .with_fallback("Transfer failed"),
            )
            .await;

        match result {
            Ok(body) => {
                self.phase.send_replace(TransferPhase::Succeeded);
                self.accounts.refresh_all().await;

                let receipt = TransferReceipt {
                    recipient_username: request.recipient_username,
                    amount: request.amount,
                    message: body
                        .message
                        .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
                };
                self.complete(TransferOutcome::Succeeded(receipt.clone()));
                Ok(receipt)
            }
            Err(e) => {
                let reason = e.user_message();
                tracing::warn!(error = %e, "transfer failed");
                self.phase.send_replace(TransferPhase::Failed(reason.clone()));
                self.complete(TransferOutcome::Failed {
                    kind: e.kind(),
                    reason,
                });
                Err(e)
            }
        }
    }

    /// Release the claim taken by `submit`
    fn complete(&self, outcome: TransferOutcome) {
        *self.last_outcome.lock().unwrap_or_else(|e| e.into_inner()) = Some(outcome);
        self.phase.send_if_modified(|phase| {
            if !phase.is_terminal() {
                return false;
            }
            self.form.lock().unwrap_or_else(|e| e.into_inner()).clear();
            *phase = TransferPhase::Idle;
            true
        });
    }
}
