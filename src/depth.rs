#[allow(unused_imports)]
use crate::Llrb;

/// Depth records how deep every empty slot hangs in the [`Llrb`] tree,
/// gathered by [`Llrb::validate`]. The deepest slot gives the height.
#[derive(Clone, Debug)]
pub struct Depth {
    samples: usize,
    min: usize,
    max: usize,
    total: usize,
    histogram: [u64; 256], // slots per depth
}

impl Depth {
    pub(crate) fn new() -> Depth {
        Default::default()
    }

    pub(crate) fn sample(&mut self, depth: usize) {
        if self.samples == 0 || depth < self.min {
            self.min = depth
        }
        self.max = self.max.max(depth);
        self.samples += 1;
        self.total += depth;
        self.histogram[depth] += 1;
    }

    /// Return number of empty slots sampled, one more than the nodes.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Return depth of the shallowest empty slot.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Return number of nodes on the longest path from root, the height
    /// of the tree.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Average depth of empty slots, rounded down.
    pub fn mean(&self) -> usize {
        self.total.checked_div(self.samples).unwrap_or(0)
    }

    /// Return (percentile, depth) pairs at or above the 90th percentile,
    /// one pair for each depth where the cumulative share crosses a new
    /// percentile.
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut percentiles = vec![];
        let (mut acc, mut floor) = (0_u64, 90_u8);
        for (depth, &n) in self.histogram.iter().enumerate() {
            if n == 0 {
                continue;
            }
            acc += n;
            let perc = (acc * 100 / self.samples as u64) as u8;
            if perc >= floor {
                percentiles.push((perc, depth));
                floor = perc;
            }
        }
        percentiles
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth {
            samples: 0,
            min: 0,
            max: 0,
            total: 0,
            histogram: [0; 256],
        }
    }
}
