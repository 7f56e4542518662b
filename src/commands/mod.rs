//! Command handler for sign operations.
//!
//! This module runs the request/response protocol with the sign: write one
//! command, wait for the sign to settle, drain its reply and compare it to
//! the expected literal. The transport stays locked for the whole exchange,
//! so at most one command is ever in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::protocol::frame::{BROADCAST_ADDRESS, hex_dump};
use crate::protocol::Command;
use crate::transport::Transport;

/// Default wait between writing a command and reading the reply.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Default pause around the batch brackets.
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_millis(100);

/// Command handler for sign operations.
pub struct CommandHandler<T> {
    transport: Arc<Mutex<T>>,
    address: u8,
    settle_delay: Duration,
    batch_pause: Duration,
}

impl<T: Transport> CommandHandler<T> {
    /// Creates a new command handler for the sign at `address`.
    #[must_use]
    pub const fn new(transport: Arc<Mutex<T>>, address: u8) -> Self {
        Self {
            transport,
            address,
            settle_delay: DEFAULT_SETTLE_DELAY,
            batch_pause: DEFAULT_BATCH_PAUSE,
        }
    }

    /// Sets the wait between a write and reading the reply.
    pub const fn set_settle_delay(&mut self, delay: Duration) {
        self.settle_delay = delay;
    }

    /// Sets the pause used around batch brackets.
    pub const fn set_batch_pause(&mut self, pause: Duration) {
        self.batch_pause = pause;
    }

    /// Returns the batch pause.
    #[must_use]
    pub const fn batch_pause(&self) -> Duration {
        self.batch_pause
    }

    /// Returns the sign address commands are framed for.
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Returns the shared transport.
    #[must_use]
    pub const fn transport(&self) -> &Arc<Mutex<T>> {
        &self.transport
    }

    /// Sends a command and checks the sign's reply.
    ///
    /// Signs never reply to the broadcast address, so those commands succeed
    /// once written. Otherwise commands without a checked reply are followed
    /// by the batch pause, after which any reply is drained and discarded.
    pub async fn execute(&self, command: &Command) -> Result<()> {
        let data = command.encode(self.address);
        let mut transport = self.transport.lock().await;

        tracing::debug!(
            "sending {}: {}",
            command.name(),
            String::from_utf8_lossy(&data)
        );
        tracing::trace!("send bytes: {}", hex_dump(&data));
        transport.send(data).await?;

        if self.address == BROADCAST_ADDRESS {
            return Ok(());
        }

        let Some(expected) = command.expected_response() else {
            tokio::time::sleep(self.batch_pause).await;
            let discarded = transport.read_available().await?;
            if !discarded.is_empty() {
                tracing::trace!("discarded reply to {}: {:?}", command.name(), discarded);
            }
            return Ok(());
        };

        tokio::time::sleep(self.settle_delay).await;
        let reply = transport.read_available().await?;
        let reply = String::from_utf8_lossy(&reply).into_owned();
        tracing::debug!("response: {:?}", reply);

        if reply.is_empty() {
            Err(Error::NoResponse)
        } else if reply == expected {
            Ok(())
        } else {
            Err(Error::Nack {
                expected,
                received: reply,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    async fn handler(address: u8) -> (CommandHandler<MockTransport>, MockTransport) {
        let mock = MockTransport::new();
        let mut transport = mock.clone();
        transport.connect().await.unwrap();
        let handler = CommandHandler::new(Arc::new(Mutex::new(transport)), address);
        (handler, mock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ack_succeeds() {
        let (handler, mock) = handler(0x01).await;
        handler.execute(&Command::Reset).await.unwrap();
        assert_eq!(mock.writes().len(), 1);
        assert!(mock.writes()[0].starts_with(b"<ID01><D*>"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_reply_is_nack() {
        let (handler, mock) = handler(0x01).await;
        mock.reply(b"NACK");
        let err = handler.execute(&Command::Reset).await.unwrap_err();
        assert!(matches!(err, Error::Nack { received, .. } if received == "NACK"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silence_is_no_response() {
        let (handler, mock) = handler(0x01).await;
        mock.reply(b"");
        assert!(matches!(
            handler.execute(&Command::Reset).await,
            Err(Error::NoResponse)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_does_not_wait() {
        let (handler, mock) = handler(BROADCAST_ADDRESS).await;
        mock.default_reply(b"");
        let before = tokio::time::Instant::now();
        handler.execute(&Command::Reset).await.unwrap();
        assert_eq!(mock.reads(), 0);
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_brackets_never_read() {
        let (handler, mock) = handler(BROADCAST_ADDRESS).await;
        let before = tokio::time::Instant::now();
        handler.execute(&Command::BeginBatch).await.unwrap();
        handler.execute(&Command::EndBatch).await.unwrap();
        assert_eq!(mock.reads(), 0);
        assert_eq!(before.elapsed(), Duration::ZERO);
        assert_eq!(mock.writes().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_before_read() {
        let (mut handler, _mock) = handler(0x01).await;
        handler.set_settle_delay(Duration::from_millis(250));
        let before = tokio::time::Instant::now();
        handler.execute(&Command::Reset).await.unwrap();
        assert_eq!(before.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_address_expects_new_id() {
        let (handler, mock) = handler(0x01).await;
        mock.reply(b"05");
        handler
            .execute(&Command::set_address(5).unwrap())
            .await
            .unwrap();
        assert_eq!(mock.writes()[0].as_ref(), b"<ID><05><E>");
    }

    #[tokio::test(start_paused = true)]
    async fn test_bracket_reply_is_drained() {
        let (handler, mock) = handler(0x01).await;
        mock.reply(b"ACK");
        mock.reply(b"ACK");
        handler.execute(&Command::BeginBatch).await.unwrap();
        assert_eq!(mock.reads(), 1);
        handler.execute(&Command::Reset).await.unwrap();
        assert_eq!(mock.writes()[0].as_ref(), b"<BE>");
    }

    #[tokio::test]
    async fn test_disconnected_transport_fails() {
        let mock = MockTransport::new();
        let handler = CommandHandler::new(Arc::new(Mutex::new(mock)), 0x01);
        assert!(matches!(
            handler.execute(&Command::Reset).await,
            Err(Error::NotConnected)
        ));
    }
}
