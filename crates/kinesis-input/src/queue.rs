//! Raw sample queues shared between platform threads and the frame thread.

use std::sync::Arc;

use parking_lot::Mutex;

/// Multi-producer queue of raw samples, drained once per frame.
///
/// Producers (OS callbacks, sensor threads) append under a short lock. The
/// frame thread swaps the whole buffer out with its own cleared scratch
/// vector, so after warm-up neither side allocates.
#[derive(Debug)]
pub struct RawQueue<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for RawQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for RawQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RawQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append one sample.
    pub fn push(&self, sample: T) {
        self.inner.lock().push(sample);
    }

    /// Append several samples under a single lock.
    pub fn extend(&self, samples: impl IntoIterator<Item = T>) {
        self.inner.lock().extend(samples);
    }

    /// Move every pending sample into `out`, replacing its previous contents.
    pub fn drain_into(&self, out: &mut Vec<T>) {
        out.clear();
        std::mem::swap(&mut *self.inner.lock(), out);
    }

    /// Number of pending samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn drain_swaps_buffers() {
        let queue = RawQueue::new();
        queue.extend([1, 2, 3]);

        let mut out = vec![99];
        queue.drain_into(&mut out);
        assert_eq!(out, vec![1, 2, 3]);
        assert!(queue.is_empty());

        queue.drain_into(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn producers_on_other_threads() {
        let queue = RawQueue::new();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let producer = queue.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        producer.push(t * 100 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut out = Vec::new();
        queue.drain_into(&mut out);
        assert_eq!(out.len(), 400);
    }
}
