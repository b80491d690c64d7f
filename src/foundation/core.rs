use std::time::Duration;

/// Maximum number of elements a single reveal step may contain.
pub const MAX_STEP_ELEMENTS: usize = 2;

/// Maximum number of steps in a step sequence. Adds beyond this are no-ops.
pub const MAX_SEQUENCE_STEPS: usize = 10;

/// Default delay between auto-play step advances.
pub const AUTO_ADVANCE_INTERVAL: Duration = Duration::from_secs(3);

/// Mints fresh element ids unique within one composition.
///
/// Ids are `{prefix}-{n}` with a monotonically increasing counter. Callers
/// that load pre-existing ids (wire compositions) must keep minting until an
/// unused id comes out; see [`IdMinter::mint_unused`].
#[derive(Debug, Clone, Default)]
pub struct IdMinter {
    next: u64,
}

impl IdMinter {
    /// Mint the next id with the given prefix.
    pub fn mint(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}-{}", self.next)
    }

    /// Mint ids until one is not claimed by `taken`.
    pub fn mint_unused(&mut self, prefix: &str, mut taken: impl FnMut(&str) -> bool) -> String {
        loop {
            let id = self.mint(prefix);
            if !taken(&id) {
                return id;
            }
        }
    }
}
