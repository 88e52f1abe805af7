//! Double-buffered DMX frame storage
//!
//! The receiver fills the back bank while the MPX generator reads the
//! front bank. A bank only becomes visible to the generator once a frame
//! completes, so the analog output never mixes two frames. Aborted
//! attempts leave the front bank untouched and the generator keeps
//! emitting the last complete frame.

use crate::config::MAX_CHANNELS;

/// One captured frame: the start code (slot 0) and the channel levels
/// (slots `1..=MAX_CHANNELS`)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameBank {
    start_code: u8,
    levels: [u8; MAX_CHANNELS],
}

impl Default for FrameBank {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBank {
    /// Create a bank with every slot at zero
    pub const fn new() -> Self {
        Self {
            start_code: 0,
            levels: [0; MAX_CHANNELS],
        }
    }

    /// Read a slot (0 = start code). `None` past the last channel.
    pub fn slot(&self, index: usize) -> Option<u8> {
        match index {
            0 => Some(self.start_code),
            i => self.levels.get(i - 1).copied(),
        }
    }

    /// Write a slot (0 = start code). Returns `false` if out of range.
    pub fn set_slot(&mut self, index: usize, value: u8) -> bool {
        match index {
            0 => {
                self.start_code = value;
                true
            }
            i => match self.levels.get_mut(i - 1) {
                Some(level) => {
                    *level = value;
                    true
                }
                None => false,
            },
        }
    }

    /// Start code of the captured frame
    pub fn start_code(&self) -> u8 {
        self.start_code
    }

    /// Channel levels, channel 1 first
    pub fn levels(&self) -> &[u8; MAX_CHANNELS] {
        &self.levels
    }

    /// Zero every channel above `channel_count`
    pub fn clear_above(&mut self, channel_count: usize) {
        if let Some(tail) = self.levels.get_mut(channel_count..) {
            tail.fill(0);
        }
    }
}

/// Front/back bank pair with swap-on-complete
#[derive(Debug, Clone)]
pub struct FrameStore {
    banks: [FrameBank; 2],
    front: usize,
    published: u32,
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStore {
    /// Create a store with both banks zeroed
    pub const fn new() -> Self {
        Self {
            banks: [FrameBank::new(), FrameBank::new()],
            front: 0,
            published: 0,
        }
    }

    /// Last complete frame (read side)
    pub fn front(&self) -> &FrameBank {
        &self.banks[self.front]
    }

    /// Bank being filled by the receiver (write side)
    pub fn back(&self) -> &FrameBank {
        &self.banks[self.front ^ 1]
    }

    /// Mutable access to the bank being filled
    pub fn back_mut(&mut self) -> &mut FrameBank {
        &mut self.banks[self.front ^ 1]
    }

    /// Make the back bank visible to the generator
    ///
    /// The old front bank becomes the next write target.
    pub fn publish(&mut self) {
        self.front ^= 1;
        self.published = self.published.wrapping_add(1);
    }

    /// Number of frames published so far (wraps)
    pub fn published(&self) -> u32 {
        self.published
    }
}
