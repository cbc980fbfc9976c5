/// Counters accumulated over one search invocation.
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    /// Deepest fully completed iteration.
    pub depth: u32,
    pub nodes_searched: u64,
    pub quiescence_nodes: u64,
    pub beta_cutoffs: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }
}
