use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub searches: usize,
    pub expanded_nodes: usize,
    pub discarded_nodes: usize,
    pub pushed_nodes: usize,
    pub time_us: u128,
}

impl SearchStats {
    pub fn print(&self) {
        info!(
            "Searches {:?} Time(microseconds) {:?} Expanded nodes: {:?} Discarded by budget: {:?} Frontier pushes: {:?}",
            self.searches, self.time_us, self.expanded_nodes, self.discarded_nodes, self.pushed_nodes
        );
    }
}
