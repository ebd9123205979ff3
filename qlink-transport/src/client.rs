//! Actor-side connection helper
//!
//! Actors use this to stream experience frames to the learner and pick
//! up snapshot replies. The learner never uses it outside tests.

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use qlink_core::{ExperienceCodec, ExperienceRecord, LearnerError, Result};

use crate::frame::{read_frame, write_frame};

/// One actor's connection to the learner endpoint
pub struct ActorClient {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
}

impl ActorClient {
    /// Connect to the learner endpoint
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        Ok(Self { reader, writer })
    }

    /// Encode and send one experience record
    pub async fn send_experience(
        &mut self,
        codec: &ExperienceCodec,
        record: &ExperienceRecord,
    ) -> Result<()> {
        let payload = codec.encode(record)?;
        self.send_raw(payload).await
    }

    /// Send a pre-encoded payload
    pub async fn send_raw(&mut self, payload: Vec<u8>) -> Result<()> {
        write_frame(&mut self.writer, &payload).await?;
        Ok(())
    }

    /// Await the next snapshot blob from the learner
    pub async fn recv_snapshot(&mut self) -> Result<Vec<u8>> {
        read_frame(&mut self.reader)
            .await?
            .ok_or(LearnerError::ChannelClosed)
    }
}
