use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::trace;

use crate::models::Rect;

/// Receives the visible highlight set whenever it changes
///
/// Called synchronously on the thread that caused the change (the frame
/// thread for updates, the sweep worker for expiry). The tracker lock is not
/// held during the call, so implementations may read the tracker again.
pub trait FrameObserver: Send + Sync {
    /// The set of highlighted rectangles changed to `rects`
    fn frames_changed(&self, rects: &[Rect]);
}

impl<F> FrameObserver for F
where
    F: Fn(&[Rect]) + Send + Sync,
{
    fn frames_changed(&self, rects: &[Rect]) {
        self(rects)
    }
}

/// Observer that forwards every change into a channel
///
/// Lets a renderer poll or block on highlight updates instead of being
/// called back.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<Vec<Rect>>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel
    pub fn new() -> (Self, Receiver<Vec<Rect>>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl FrameObserver for ChannelObserver {
    fn frames_changed(&self, rects: &[Rect]) {
        if self.tx.send(rects.to_vec()).is_err() {
            trace!("Highlight receiver dropped; discarding update");
        }
    }
}
