use log::warn;

use crate::{
    imap::{SendCommand, SeqNum, Session},
    report::SkipReason,
    retry::RetryPolicy,
};

/// Fetches message `id`, retrying failures as `policy` allows.
///
/// Running out of attempts is not an error: the caller gets the reason to skip the message.
pub async fn fetch_with_retry<T: SendCommand>(
    session: &mut Session<T>,
    id: SeqNum,
    policy: &RetryPolicy,
) -> Result<Vec<u8>, SkipReason> {
    let mut attempt = 1;
    loop {
        match session.fetch_raw(id).await {
            Ok(raw) => return Ok(raw),
            Err(e) => {
                let Some(delay) = policy.delay_after(attempt) else {
                    return Err(SkipReason::FetchExhausted {
                        attempts: attempt,
                        error: e.to_string(),
                    });
                };
                let mailbox = session
                    .selected()
                    .map_or("mailbox", |mailbox| mailbox.name().as_str());
                warn!(
                    "attempt {attempt}: failed to fetch message {id} of {mailbox}: {e}. Retrying \
                     in {delay:?}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
