//! Caller-side coordinator for the current account.
//!
//! The coordinator keeps the account most recently read from or written to a
//! tag and the reload amount the holder picked, turns them into engine
//! requests, and reports outcomes to an [`AccountObserver`].

use std::sync::{Arc, Mutex, MutexGuard};

use account_record::{AccountRecord, ReloadAmount};
use thiserror::Error;
use tracing::debug;

use crate::domain::ports::AccountObserver;
use crate::domain::{
    StartError, SuccessKind, TransactionEngine, TransactionErrorKind, TransactionOutcome,
    TransactionReport, TransactionRequest,
};

/// Errors raised by [`AccountCoordinator`] before or after a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// A reload needs an account read from a tag first.
    #[error("no account has been read from a tag yet")]
    NoCurrentRecord,
    /// A reload needs a selected amount.
    #[error("no reload amount selected")]
    NoReloadAmountSelected,
    /// The engine refused to start the transaction.
    #[error(transparent)]
    Start(#[from] StartError),
    /// The coordinator's state could not be locked.
    #[error("coordinator state unavailable: {message}")]
    StateUnavailable {
        /// Lock failure detail.
        message: String,
    },
}

#[derive(Debug, Default)]
struct CoordinatorState {
    current: Option<AccountRecord>,
    selected: Option<ReloadAmount>,
}

/// Presentation-facing wrapper around a [`TransactionEngine`].
pub struct AccountCoordinator {
    engine: Arc<TransactionEngine>,
    observer: Arc<dyn AccountObserver>,
    state: Mutex<CoordinatorState>,
}

impl AccountCoordinator {
    /// Build a coordinator with no current account and no selection.
    #[must_use]
    pub fn new(engine: Arc<TransactionEngine>, observer: Arc<dyn AccountObserver>) -> Self {
        Self {
            engine,
            observer,
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    /// Account most recently read from or written to a tag.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::StateUnavailable`] if the state lock is
    /// poisoned.
    pub fn current_record(&self) -> Result<Option<AccountRecord>, CoordinatorError> {
        Ok(self.lock_state()?.current.clone())
    }

    /// Reload amount currently selected.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::StateUnavailable`] if the state lock is
    /// poisoned.
    pub fn selected_amount(&self) -> Result<Option<ReloadAmount>, CoordinatorError> {
        Ok(self.lock_state()?.selected)
    }

    /// Select, or clear, the amount used by the next [`Self::reload`].
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::StateUnavailable`] if the state lock is
    /// poisoned.
    pub fn select_amount(&self, amount: Option<ReloadAmount>) -> Result<(), CoordinatorError> {
        self.lock_state()?.selected = amount;
        Ok(())
    }

    /// Write the demo account to the next tag presented.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Start`] when the engine is busy.
    pub async fn create_demo_user(&self) -> Result<TransactionReport, CoordinatorError> {
        self.run(&TransactionRequest::CreateUser {
            record: AccountRecord::demo(),
        })
        .await
    }

    /// Read the account stored on the next tag presented.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Start`] when the engine is busy.
    pub async fn read_user(&self) -> Result<TransactionReport, CoordinatorError> {
        self.run(&TransactionRequest::ReadUser).await
    }

    /// Credit the selected amount to the current account's tag.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NoCurrentRecord`] or
    /// [`CoordinatorError::NoReloadAmountSelected`] without opening a session
    /// when either input is missing, and [`CoordinatorError::Start`] when the
    /// engine is busy.
    pub async fn reload(&self) -> Result<TransactionReport, CoordinatorError> {
        let request = {
            let state = self.lock_state()?;
            let record = state
                .current
                .clone()
                .ok_or(CoordinatorError::NoCurrentRecord)?;
            let amount = state
                .selected
                .ok_or(CoordinatorError::NoReloadAmountSelected)?;
            TransactionRequest::ReloadUser { record, amount }
        };
        self.run(&request).await
    }

    async fn run(&self, request: &TransactionRequest) -> Result<TransactionReport, CoordinatorError> {
        let report = self.engine.execute(request).await?;
        self.apply(&report)?;
        Ok(report)
    }

    fn apply(&self, report: &TransactionReport) -> Result<(), CoordinatorError> {
        match &report.outcome {
            TransactionOutcome::Succeeded(success) => {
                {
                    let mut state = self.lock_state()?;
                    state.current = Some(success.record.clone());
                    if success.kind == SuccessKind::ReloadCompleted {
                        state.selected = None;
                    }
                }
                if success.kind == SuccessKind::ReloadCompleted {
                    self.observer.payment_success(&success.record);
                } else {
                    self.observer.user_updated(&success.record);
                }
            }
            TransactionOutcome::Failed(error)
                if matches!(error.kind(), TransactionErrorKind::UserNotFound) =>
            {
                self.observer.no_user_found();
            }
            TransactionOutcome::Failed(error) => {
                debug!(code = error.code().as_str(), "coordinator ignoring failure");
            }
            TransactionOutcome::Cancelled => {}
        }
        Ok(())
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, CoordinatorState>, CoordinatorError> {
        self.state
            .lock()
            .map_err(|err| CoordinatorError::StateUnavailable {
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the account coordinator.

    use super::*;
    use rstest::{fixture, rstest};
    use rust_decimal::Decimal;

    use crate::domain::ports::{MockAccountObserver, NoOpTransactionNotifier};
    use crate::domain::{TransactionEngineConfig, TransactionEnginePorts};
    use crate::outbound::{SimulatedTag, SimulatedTagField};
    use crate::test_support::{ObserverEvent, RecordingObserver};

    struct Setup {
        field: SimulatedTagField,
        observer: Arc<RecordingObserver>,
        coordinator: AccountCoordinator,
    }

    fn engine_over(field: &SimulatedTagField) -> Arc<TransactionEngine> {
        Arc::new(TransactionEngine::new(
            TransactionEnginePorts::new(
                Arc::new(field.clone()),
                Arc::new(NoOpTransactionNotifier),
            ),
            TransactionEngineConfig::default(),
        ))
    }

    fn coordinator_over(tag: SimulatedTag) -> Setup {
        let field = SimulatedTagField::new();
        field.place(tag);
        let observer = Arc::new(RecordingObserver::default());
        let coordinator = AccountCoordinator::new(engine_over(&field), observer.clone());
        Setup {
            field,
            observer,
            coordinator,
        }
    }

    fn amount(value: i64) -> ReloadAmount {
        ReloadAmount::new(Decimal::from(value)).expect("non-negative amount")
    }

    #[fixture]
    fn stored() -> AccountRecord {
        AccountRecord::new("Amanda", "Gonzalez", Decimal::from(10), 1)
    }

    #[rstest]
    #[tokio::test]
    async fn reload_without_a_current_account_never_opens_a_session() {
        let setup = coordinator_over(SimulatedTag::blank());
        setup
            .coordinator
            .select_amount(Some(amount(25)))
            .expect("selection stored");

        let result = setup.coordinator.reload().await;

        assert_eq!(result, Err(CoordinatorError::NoCurrentRecord));
        assert!(setup.field.journal().prompts.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn reload_without_a_selected_amount_never_opens_a_session(stored: AccountRecord) {
        let setup = coordinator_over(SimulatedTag::holding(&stored).expect("record encodes"));
        setup.coordinator.read_user().await.expect("read starts");

        let result = setup.coordinator.reload().await;

        assert_eq!(result, Err(CoordinatorError::NoReloadAmountSelected));
        assert_eq!(setup.field.journal().prompts.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn reading_an_account_makes_it_current(stored: AccountRecord) {
        let setup = coordinator_over(SimulatedTag::holding(&stored).expect("record encodes"));

        let report = setup.coordinator.read_user().await.expect("read starts");

        assert!(report.success().is_some());
        assert_eq!(
            setup.coordinator.current_record().expect("state readable"),
            Some(stored.clone())
        );
        assert_eq!(
            setup.observer.events(),
            vec![ObserverEvent::UserUpdated(stored)]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn a_completed_reload_clears_the_selection(stored: AccountRecord) {
        let setup = coordinator_over(SimulatedTag::holding(&stored).expect("record encodes"));
        setup.coordinator.read_user().await.expect("read starts");
        setup
            .coordinator
            .select_amount(Some(amount(25)))
            .expect("selection stored");

        let report = setup.coordinator.reload().await.expect("reload starts");

        let credited = AccountRecord::new("Amanda", "Gonzalez", Decimal::from(35), 1);
        assert_eq!(
            report.success().map(|success| &success.record),
            Some(&credited)
        );
        assert_eq!(
            setup.coordinator.selected_amount().expect("state readable"),
            None
        );
        assert_eq!(
            setup.coordinator.current_record().expect("state readable"),
            Some(credited.clone())
        );
        assert_eq!(
            setup.observer.events().last(),
            Some(&ObserverEvent::PaymentSuccess(credited))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn a_blank_tag_reports_no_user_found() {
        let setup = coordinator_over(SimulatedTag::blank());

        let report = setup.coordinator.read_user().await.expect("read starts");

        assert!(report.error().is_some());
        assert_eq!(setup.observer.events(), vec![ObserverEvent::NoUserFound]);
        assert_eq!(
            setup.coordinator.current_record().expect("state readable"),
            None
        );
    }

    #[rstest]
    #[tokio::test]
    async fn creating_the_demo_account_makes_it_current() {
        let setup = coordinator_over(SimulatedTag::blank());

        setup
            .coordinator
            .create_demo_user()
            .await
            .expect("create starts");

        assert_eq!(
            setup.coordinator.current_record().expect("state readable"),
            Some(AccountRecord::demo())
        );
        assert_eq!(
            setup.observer.events(),
            vec![ObserverEvent::UserUpdated(AccountRecord::demo())]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn cancelled_transactions_leave_the_observer_alone() {
        let field = SimulatedTagField::new();
        field.dismiss();
        let mut observer = MockAccountObserver::new();
        observer.expect_user_updated().times(0);
        observer.expect_payment_success().times(0);
        observer.expect_no_user_found().times(0);
        let coordinator = AccountCoordinator::new(engine_over(&field), Arc::new(observer));

        let report = coordinator.read_user().await.expect("read starts");

        assert!(report.is_cancelled());
        assert_eq!(coordinator.current_record().expect("state readable"), None);
    }
}
