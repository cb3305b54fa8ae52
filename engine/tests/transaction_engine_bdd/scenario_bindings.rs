//! Scenario bindings for tag transaction BDD tests.

use super::*;
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/transaction_engine.feature",
    name = "Creating the demo account on a blank tag"
)]
fn creating_the_demo_account(world: TransactionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/transaction_engine.feature",
    name = "Reading a stored account"
)]
fn reading_a_stored_account(world: TransactionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/transaction_engine.feature",
    name = "Reading a blank tag"
)]
fn reading_a_blank_tag(world: TransactionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/transaction_engine.feature",
    name = "Reloading a stored account"
)]
fn reloading_a_stored_account(world: TransactionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/transaction_engine.feature",
    name = "Reloading a tag that holds another account"
)]
fn reloading_a_tag_that_holds_another_account(world: TransactionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/transaction_engine.feature",
    name = "Two tags in the field"
)]
fn two_tags_in_the_field(world: TransactionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/transaction_engine.feature",
    name = "A read-only tag"
)]
fn a_read_only_tag(world: TransactionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/transaction_engine.feature",
    name = "A second transaction while one is waiting"
)]
fn a_second_transaction_while_one_is_waiting(world: TransactionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/transaction_engine.feature",
    name = "A discovery event without tags"
)]
fn a_discovery_event_without_tags(world: TransactionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/transaction_engine.feature",
    name = "The reader fails while polling"
)]
fn the_reader_fails_while_polling(world: TransactionWorld) {
    drop(world);
}
