//! FIFO queue for outbound signal frames accumulated while disconnected.

use std::collections::VecDeque;

/// Holds serialized signal frames until the connection opens.
///
/// The buffer itself is not synchronized; it lives inside the link's mutex,
/// which is what makes a flush atomic with respect to concurrent enqueues —
/// a frame raced against a flush is either drained by it or sent directly
/// through the writer installed right after, never dropped and never
/// duplicated. Call frames are deliberately not buffered (see
/// [`Link::send_call`](super::Link::send_call)).
#[derive(Debug, Default)]
pub struct OutboundBuffer {
    frames: VecDeque<String>,
}

impl OutboundBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a serialized frame to the tail.
    pub fn enqueue(&mut self, frame: String) {
        self.frames.push_back(frame);
    }

    /// Drains every buffered frame into `sink` in FIFO order.
    ///
    /// Returns the number of frames flushed. The buffer is empty afterwards
    /// unless the sink fails: the failed frame is put back at the head and
    /// the remainder stays queued for the next flush.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `sink`.
    pub fn flush<E>(&mut self, mut sink: impl FnMut(&str) -> Result<(), E>) -> Result<usize, E> {
        let mut flushed = 0;
        while let Some(frame) = self.frames.pop_front() {
            if let Err(err) = sink(&frame) {
                self.frames.push_front(frame);
                return Err(err);
            }
            flushed += 1;
        }
        Ok(flushed)
    }

    /// Number of frames currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn flush_preserves_fifo_order_and_empties() {
        let mut buffer = OutboundBuffer::new();
        buffer.enqueue("f1".to_string());
        buffer.enqueue("f2".to_string());
        buffer.enqueue("f3".to_string());

        let mut sent = Vec::new();
        let Ok(flushed) = buffer.flush(|frame| -> Result<(), ()> {
            sent.push(frame.to_string());
            Ok(())
        }) else {
            panic!("flush should succeed");
        };

        assert_eq!(flushed, 3);
        assert_eq!(sent, vec!["f1", "f2", "f3"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn failed_sink_keeps_the_remainder() {
        let mut buffer = OutboundBuffer::new();
        buffer.enqueue("f1".to_string());
        buffer.enqueue("f2".to_string());
        buffer.enqueue("f3".to_string());

        let mut attempts = 0;
        let outcome = buffer.flush(|_frame| {
            attempts += 1;
            if attempts == 2 { Err("sink closed") } else { Ok(()) }
        });

        assert!(outcome.is_err());
        assert_eq!(buffer.len(), 2);

        let mut sent = Vec::new();
        let Ok(_) = buffer.flush(|frame| -> Result<(), ()> {
            sent.push(frame.to_string());
            Ok(())
        }) else {
            panic!("second flush should succeed");
        };
        assert_eq!(sent, vec!["f2", "f3"]);
    }

    #[test]
    fn flush_of_empty_buffer_is_a_noop() {
        let mut buffer = OutboundBuffer::new();
        let Ok(flushed) = buffer.flush(|_| -> Result<(), ()> { Ok(()) }) else {
            panic!("flush should succeed");
        };
        assert_eq!(flushed, 0);
    }
}
