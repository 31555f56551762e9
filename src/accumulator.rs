//The board's pulse register counts pulses since the last bus read and then
//clears itself. Reading it again returns only what arrived in between, so
//the running total has to be kept on the host.
//
//Known limitation: every delta is trusted as-is. If something else reads
//the board between two of our refreshes, those pulses are lost to us.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PulseAccumulator {
    total: u64,
}

impl PulseAccumulator {
    pub fn new() -> Self {
        PulseAccumulator { total: 0 }
    }

    /// Fold one refresh worth of pulses into the total.
    pub fn accumulate(&mut self, delta: u16) -> u64 {
        self.total = self.total.saturating_add(delta as u64);
        self.total
    }

    pub fn reset(&mut self) {
        self.total = 0;
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}
