//! Step sequences run once a read-write tag is connected.
//!
//! Steps never invalidate the session; they only classify what happened and
//! hand the result back to the controller for finalizing.

use account_record::{AccountRecord, NdefMessage, ReloadAmount, decode_message, encode};
use tracing::{debug, warn};

use crate::domain::ports::{ReaderSession, TagHandle};
use crate::domain::verifier::verify;
use crate::domain::{SuccessKind, TransactionErrorKind, TransactionRequest, TransactionSuccess};

use super::cancellation::{CancelSignal, Interrupt};

/// Session message after a failed create.
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create user";
/// Session message when the tag holds no readable account.
pub const USER_NOT_FOUND_MESSAGE: &str = "No user found, follow next steps to write a demo user";
/// Session message when the tag holds another account.
pub const VERIFY_FAILED_MESSAGE: &str = "Failed to verify user";
/// Session message after a failed reload write.
pub const RELOAD_WRITE_FAILED_MESSAGE: &str = "Failed to write updated record";
/// Session message after a completed reload.
pub const RELOAD_COMPLETED_MESSAGE: &str = "Processed payment!";

pub(super) async fn execute(
    session: &dyn ReaderSession,
    tag: TagHandle,
    request: &TransactionRequest,
    cancel: &mut CancelSignal,
) -> Result<TransactionSuccess, Interrupt> {
    match request {
        TransactionRequest::CreateUser { record } => {
            create_user(session, tag, record, cancel).await
        }
        TransactionRequest::ReadUser => read_user(session, tag, cancel).await,
        TransactionRequest::ReloadUser { record, amount } => {
            reload_user(session, tag, record, *amount, cancel).await
        }
    }
}

async fn create_user(
    session: &dyn ReaderSession,
    tag: TagHandle,
    record: &AccountRecord,
    cancel: &mut CancelSignal,
) -> Result<TransactionSuccess, Interrupt> {
    let message = encode(record).map_err(|err| {
        Interrupt::failed(TransactionErrorKind::Internal(err.to_string()), CREATE_FAILED_MESSAGE)
    })?;
    write(session, tag, &message, CREATE_FAILED_MESSAGE, cancel).await?;
    Ok(TransactionSuccess {
        kind: SuccessKind::RecordWritten,
        record: record.clone(),
        message: format!("Created new user: {}!", record.display_name()),
    })
}

async fn read_user(
    session: &dyn ReaderSession,
    tag: TagHandle,
    cancel: &mut CancelSignal,
) -> Result<TransactionSuccess, Interrupt> {
    let stored = read_stored(session, tag, cancel).await?;
    let record = decode_message(&stored).ok_or_else(|| {
        debug!("tag payload is not an account record");
        user_not_found()
    })?;
    let message = format!("Hello {}!", record.display_name());
    Ok(TransactionSuccess {
        kind: SuccessKind::RecordRead,
        record,
        message,
    })
}

async fn reload_user(
    session: &dyn ReaderSession,
    tag: TagHandle,
    expected: &AccountRecord,
    amount: ReloadAmount,
    cancel: &mut CancelSignal,
) -> Result<TransactionSuccess, Interrupt> {
    let stored = read_stored(session, tag, cancel).await?;
    let on_tag = decode_message(&stored).ok_or_else(|| {
        debug!("tag payload is not an account record");
        verify_failed()
    })?;
    if !verify(expected, &on_tag) {
        warn!(
            expected_id = expected.id,
            tag_id = on_tag.id,
            "tag holds a different account"
        );
        return Err(verify_failed());
    }

    let updated = on_tag.credited(amount.value()).ok_or_else(|| {
        Interrupt::failed(
            TransactionErrorKind::Internal(format!(
                "balance {} plus {} overflows",
                on_tag.account_value,
                amount.value()
            )),
            RELOAD_WRITE_FAILED_MESSAGE,
        )
    })?;
    let message = encode(&updated).map_err(|err| {
        Interrupt::failed(
            TransactionErrorKind::Internal(err.to_string()),
            RELOAD_WRITE_FAILED_MESSAGE,
        )
    })?;
    write(session, tag, &message, RELOAD_WRITE_FAILED_MESSAGE, cancel).await?;
    Ok(TransactionSuccess {
        kind: SuccessKind::ReloadCompleted,
        record: updated,
        message: RELOAD_COMPLETED_MESSAGE.to_owned(),
    })
}

/// Read the tag's message; transport errors and blank tags mean no account.
async fn read_stored(
    session: &dyn ReaderSession,
    tag: TagHandle,
    cancel: &mut CancelSignal,
) -> Result<NdefMessage, Interrupt> {
    match cancel.guard(session.read(tag)).await? {
        Ok(Some(message)) if !message.is_empty() => Ok(message),
        Ok(_) => {
            debug!("tag holds no records");
            Err(user_not_found())
        }
        Err(err) => {
            debug!(error = %err, "tag read failed");
            Err(user_not_found())
        }
    }
}

async fn write(
    session: &dyn ReaderSession,
    tag: TagHandle,
    message: &NdefMessage,
    failure_message: &str,
    cancel: &mut CancelSignal,
) -> Result<(), Interrupt> {
    cancel
        .guard(session.write(tag, message))
        .await?
        .map_err(|err| Interrupt::failed(TransactionErrorKind::TagFault(err), failure_message))
}

fn user_not_found() -> Interrupt {
    Interrupt::failed(TransactionErrorKind::UserNotFound, USER_NOT_FOUND_MESSAGE)
}

fn verify_failed() -> Interrupt {
    Interrupt::failed(TransactionErrorKind::VerifyUser, VERIFY_FAILED_MESSAGE)
}
