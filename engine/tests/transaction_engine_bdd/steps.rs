//! Step definitions for tag transaction BDD tests.

use std::str::FromStr;
use std::time::Duration;

use account_record::{AccountRecord, ReloadAmount};
use rstest_bdd_macros::{given, then, when};
use rust_decimal::Decimal;
use tag_engine::domain::ports::TagStatus;
use tag_engine::domain::transaction_engine::MULTIPLE_TAGS_ALERT;
use tag_engine::domain::{TransactionOutcome, TransactionRequest};
use tag_engine::outbound::TagOperation;
use tag_engine::test_support::NotifierEvent;

use super::*;

fn decimal(raw: &str) -> Decimal {
    Decimal::from_str(raw.trim_matches('"')).expect("value should be a decimal")
}

fn account(id: i64, balance: &str) -> AccountRecord {
    AccountRecord::new("Amanda", "Gonzalez", decimal(balance), id)
}

fn holding(id: i64, balance: &str) -> SimulatedTag {
    SimulatedTag::holding(&account(id, balance)).expect("account should encode")
}

fn run(world: &TransactionWorld, request: &TransactionRequest) {
    let engine = world.engine();
    let result = world.runtime().block_on(engine.execute(request));
    world.last_result.set(result);
}

// ============================================================================
// Given steps
// ============================================================================

#[given("an empty field")]
fn an_empty_field(world: &TransactionWorld) {
    world.field.set(SimulatedTagField::new());
}

#[given("a blank tag in the field")]
fn a_blank_tag_in_the_field(world: &TransactionWorld) {
    world.place_primary(SimulatedTag::blank());
}

#[given("a tag holding account {id} with balance {balance}")]
fn a_tag_holding_account(world: &TransactionWorld, id: i64, balance: String) {
    world.place_primary(holding(id, &balance));
}

#[given("a read-only tag holding account {id} with balance {balance}")]
fn a_read_only_tag_holding_account(world: &TransactionWorld, id: i64, balance: String) {
    world.place_primary(holding(id, &balance).with_status(TagStatus::ReadOnly));
}

#[given("the next discovery reports no tags")]
fn the_next_discovery_reports_no_tags(world: &TransactionWorld) {
    world.field().report_empty_discovery();
}

#[given("the next discovery fails with {message}")]
fn the_next_discovery_fails(world: &TransactionWorld, message: String) {
    world.field().fail_discovery(message.trim_matches('"'));
}

#[given("a second tag that leaves while the reader backs off")]
fn a_second_tag_that_leaves(world: &TransactionWorld) {
    let extra = world.field().place(SimulatedTag::blank());
    world.extra.set(extra);
}

// ============================================================================
// When steps
// ============================================================================

#[when("a create transaction runs for the demo account")]
fn a_create_transaction_runs(world: &TransactionWorld) {
    run(
        world,
        &TransactionRequest::CreateUser {
            record: AccountRecord::demo(),
        },
    );
}

#[when("a read transaction runs")]
fn a_read_transaction_runs(world: &TransactionWorld) {
    run(world, &TransactionRequest::ReadUser);
}

#[when("a reload of {amount} runs for account {id}")]
fn a_reload_runs(world: &TransactionWorld, amount: String, id: i64) {
    let amount = ReloadAmount::new(decimal(&amount)).expect("amount should be non-negative");
    run(
        world,
        &TransactionRequest::ReloadUser {
            record: account(id, "0"),
            amount,
        },
    );
}

#[when("a read transaction waits for a tag")]
fn a_read_transaction_waits(world: &TransactionWorld) {
    let engine = world.engine();
    let runtime = world.runtime();
    let field = world.field();
    let handle = runtime.spawn(async move {
        let request = TransactionRequest::ReadUser;
        engine.execute(&request).await
    });
    runtime.block_on(field.wait_for_discoveries(1));
    world.waiting.set(WaitingTransaction::new(handle));
}

#[when("another read transaction is requested")]
fn another_read_transaction_is_requested(world: &TransactionWorld) {
    let engine = world.engine();
    let result = world
        .runtime()
        .block_on(engine.execute(&TransactionRequest::ReadUser));
    world.rejected.set(result);
}

#[when("the waiting transaction is cancelled")]
fn the_waiting_transaction_is_cancelled(world: &TransactionWorld) {
    assert!(world.engine().cancel(), "a transaction should be active");
    let waiting = world
        .waiting
        .get()
        .expect("a transaction should be waiting")
        .take();
    let result = world
        .runtime()
        .block_on(waiting)
        .expect("waiting transaction should join");
    world.last_result.set(result);
}

// ============================================================================
// Then steps
// ============================================================================

#[then("the transaction succeeds with message {message}")]
fn the_transaction_succeeds(world: &TransactionWorld, message: String) {
    let report = world.report();
    let success = report.success().expect("transaction should succeed");
    assert_eq!(success.message, message.trim_matches('"'));
}

#[then("the transaction fails with code {code}")]
fn the_transaction_fails(world: &TransactionWorld, code: String) {
    let report = world.report();
    let error = report.error().expect("transaction should fail");
    assert_eq!(error.code().as_str(), code.trim_matches('"'));
}

#[then("the tag holds an account with balance {balance}")]
fn the_tag_holds_an_account(world: &TransactionWorld, balance: String) {
    let primary = world.primary.get().expect("primary tag should be placed");
    let record = world
        .field()
        .tag(primary)
        .and_then(|tag| tag.record())
        .expect("tag should hold an account");
    assert_eq!(record.account_value, decimal(&balance));
}

#[then("the notifier saw the account read")]
fn the_notifier_saw_the_account_read(world: &TransactionWorld) {
    let report = world.report();
    let success = report.success().expect("transaction should succeed");
    let notifier = world.notifier.get().expect("notifier should be set");
    assert_eq!(
        notifier.events(),
        vec![NotifierEvent::RecordRead(success.record.clone())]
    );
}

#[then("the notifier reported that no account was found")]
fn the_notifier_reported_no_account(world: &TransactionWorld) {
    let notifier = world.notifier.get().expect("notifier should be set");
    assert_eq!(notifier.events().last(), Some(&NotifierEvent::NoRecordFound));
}

#[then("the reader prompt was {prompt}")]
fn the_reader_prompt_was(world: &TransactionWorld, prompt: String) {
    assert_eq!(
        world.field().journal().prompts,
        vec![prompt.trim_matches('"').to_owned()]
    );
}

#[then("the holder was asked once to remove extra tags")]
fn the_holder_was_asked_to_remove_tags(world: &TransactionWorld) {
    let journal = world.field().journal();
    assert_eq!(journal.alerts, vec![MULTIPLE_TAGS_ALERT.to_owned()]);
    assert_eq!(journal.restarts, 1);
}

#[then("the reader backed off for {millis} milliseconds")]
fn the_reader_backed_off(world: &TransactionWorld, millis: u64) {
    let sleeper = world.sleeper.get().expect("sleeper should be set");
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(millis)]);
}

#[then("the tag was neither read nor written")]
fn the_tag_was_neither_read_nor_written(world: &TransactionWorld) {
    let journal = world.field().journal();
    assert!(!journal.attempted(TagOperation::Read));
    assert!(!journal.attempted(TagOperation::Write));
}

#[then("the second request is rejected as in progress")]
fn the_second_request_is_rejected(world: &TransactionWorld) {
    let rejected = world.rejected.get().expect("second request should have run");
    assert_eq!(rejected, Err(StartError::TransactionInProgress));
    assert_eq!(world.field().journal().prompts.len(), 1);
}

#[then("the waiting transaction settles as cancelled")]
fn the_waiting_transaction_settles_as_cancelled(world: &TransactionWorld) {
    let report = world.report();
    assert_eq!(report.outcome, TransactionOutcome::Cancelled);
    let notifier = world.notifier.get().expect("notifier should be set");
    assert!(notifier.events().is_empty());
}

#[then("the session was invalidated once")]
fn the_session_was_invalidated_once(world: &TransactionWorld) {
    assert_eq!(world.field().journal().invalidations.len(), 1);
}

#[then("the engine is idle")]
fn the_engine_is_idle(world: &TransactionWorld) {
    assert!(!world.engine().is_busy());
}
