//! Best-effort fan-out of the per-tick snapshot.

use crate::codec::{self, Frame};
use crate::error::CodecError;
use crate::session_manager::{deliver, Delivery};
use log::{debug, warn};
use shared::{Packet, Snapshot};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Sessions whose queue was full; they miss this snapshot.
    pub lagging: Vec<u32>,
    /// Sessions whose writer is gone; their handler will reap them.
    pub closed: Vec<u32>,
}

/// Encodes `snapshot` once and queues the same frame for every recipient.
///
/// Never waits on a recipient. A full or closed queue only affects that
/// recipient and is reported back, not raised.
pub fn publish(
    snapshot: &Snapshot,
    recipients: &[(u32, mpsc::Sender<Frame>)],
) -> Result<BroadcastReport, CodecError> {
    let frame = codec::encode(&Packet::Snapshot(snapshot.clone()))?;
    Ok(publish_frame(&frame, recipients))
}

pub fn publish_frame(frame: &Frame, recipients: &[(u32, mpsc::Sender<Frame>)]) -> BroadcastReport {
    let mut report = BroadcastReport::default();

    for (id, sender) in recipients {
        match deliver(sender, Frame::clone(frame)) {
            Delivery::Queued => report.delivered += 1,
            Delivery::Lagging => {
                warn!("Player {} is lagging, dropped a snapshot", id);
                report.lagging.push(*id);
            }
            Delivery::Closed => {
                debug!("Player {} outbound queue closed", id);
                report.closed.push(*id);
            }
        }
    }

    report
}
