//! Bounded PCM ring shared by the feed thread and the render thread.
//!
//! Single producer, single consumer. Both sides take the same short lock, held only for the
//! copy in or out, so neither can stall the other for longer than a `memcpy`. The store is
//! allocated once at construction; `push` and `pull` never allocate.

use parking_lot::Mutex;

/// What `push` does when the ring cannot hold everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverrunPolicy {
    /// Discard the oldest buffered samples to make room. Playback stays close to real time.
    #[default]
    DropOldest,
    /// Keep what is buffered and discard the excess of the incoming batch.
    DropNewest,
}

/// Ring counters, in samples.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RingStats {
    pub pushed: u64,
    pub pulled: u64,
    pub dropped: u64,
}

#[derive(Debug)]
struct RingState {
    buf: Box<[f32]>,
    /// Index of the oldest sample.
    head: usize,
    len: usize,
    stats: RingStats,
}

impl RingState {
    fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn write_at(&mut self, start: usize, src: &[f32]) {
        let cap = self.capacity();
        let first = src.len().min(cap - start);
        self.buf[start..start + first].copy_from_slice(&src[..first]);
        self.buf[..src.len() - first].copy_from_slice(&src[first..]);
    }

    fn skip(&mut self, n: usize) {
        self.head = (self.head + n) % self.capacity();
        self.len -= n;
    }
}

/// Fixed-capacity FIFO of interleaved `f32` samples.
#[derive(Debug)]
pub struct RingBuffer {
    state: Mutex<RingState>,
    policy: OverrunPolicy,
}

impl RingBuffer {
    /// Create a ring holding at most `capacity` samples (at least one).
    pub fn new(capacity: usize, policy: OverrunPolicy) -> Self {
        Self {
            state: Mutex::new(RingState {
                buf: vec![0.0; capacity.max(1)].into_boxed_slice(),
                head: 0,
                len: 0,
                stats: RingStats::default(),
            }),
            policy,
        }
    }

    /// Append samples. Returns how many of `samples` were stored.
    pub fn push(&self, samples: &[f32]) -> usize {
        if samples.is_empty() {
            return 0;
        }
        let mut st = self.state.lock();
        let cap = st.capacity();
        st.stats.pushed += samples.len() as u64;

        let src = match self.policy {
            OverrunPolicy::DropOldest => {
                // Only the newest `cap` samples of the batch can survive.
                let src = &samples[samples.len().saturating_sub(cap)..];
                let overflow = (st.len + src.len()).saturating_sub(cap);
                st.skip(overflow);
                st.stats.dropped += (overflow + samples.len() - src.len()) as u64;
                src
            }
            OverrunPolicy::DropNewest => {
                let room = cap - st.len;
                let src = &samples[..samples.len().min(room)];
                st.stats.dropped += (samples.len() - src.len()) as u64;
                src
            }
        };

        let tail = (st.head + st.len) % cap;
        st.write_at(tail, src);
        st.len += src.len();
        src.len()
    }

    /// Move up to `out.len()` of the oldest samples into `out`. Returns how many were written.
    pub fn pull(&self, out: &mut [f32]) -> usize {
        let mut st = self.state.lock();
        let n = out.len().min(st.len);
        if n == 0 {
            return 0;
        }
        let cap = st.capacity();
        let first = n.min(cap - st.head);
        out[..first].copy_from_slice(&st.buf[st.head..st.head + first]);
        out[first..n].copy_from_slice(&st.buf[..n - first]);
        st.skip(n);
        st.stats.pulled += n as u64;
        n
    }

    pub fn len(&self) -> usize {
        self.state.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().capacity()
    }

    pub fn policy(&self) -> OverrunPolicy {
        self.policy
    }

    /// Discard everything buffered. Counts as dropped.
    pub fn clear(&self) {
        let mut st = self.state.lock();
        st.stats.dropped += st.len as u64;
        st.head = 0;
        st.len = 0;
    }

    pub fn stats(&self) -> RingStats {
        self.state.lock().stats
    }
}
