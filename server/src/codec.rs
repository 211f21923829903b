//! Length-prefixed packet framing over byte streams.
//!
//! A frame is a big-endian `u32` payload length followed by the bincode
//! encoding of one [`Packet`].

use crate::error::CodecError;
use bincode::{deserialize, serialize};
use shared::Packet;
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A fully encoded frame, shareable between every outbound queue.
pub type Frame = Arc<[u8]>;

pub fn encode(packet: &Packet) -> Result<Frame, CodecError> {
    let payload = serialize(packet)?;
    let len = u32::try_from(payload.len()).map_err(|_| CodecError::FrameTooLarge {
        len: payload.len(),
        max: u32::MAX as usize,
    })?;

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame.into())
}

pub async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode(packet)?;
    write_frame(writer, &frame).await
}

/// Reads one packet. A clean end of stream before the length prefix is
/// reported as [`CodecError::ConnectionClosed`].
pub async fn read_packet<R>(reader: &mut R, max_len: usize) -> Result<Packet, CodecError>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(CodecError::ConnectionClosed),
        Err(e) => return Err(e.into()),
    };

    if len > max_len {
        return Err(CodecError::FrameTooLarge { len, max: max_len });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(deserialize(&payload)?)
}
