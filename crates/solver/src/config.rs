/// Configuration of a [`Solver`](crate::Solver).
///
/// # Example
///
/// ```
/// # use dpsat_solver::SolverConfig;
/// let config = SolverConfig::default()
///     .with_threads(4)
///     .with_edge_capacity(1024);
/// assert_eq!(config.num_threads(), Some(4));
/// assert_eq!(config.edge_capacity(), Some(1024));
/// ```
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    num_threads: Option<usize>,
    edge_capacity: Option<usize>,
}

impl SolverConfig {
    /// Sets the number of worker threads.
    ///
    /// Without this the global rayon thread pool is used.
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Sets the capacity of the dependency edge list.
    ///
    /// Without this the capacity is the maximum number of edges the clause
    /// store can produce so that building the edge list never overflows.
    pub fn with_edge_capacity(mut self, edge_capacity: usize) -> Self {
        self.edge_capacity = Some(edge_capacity);
        self
    }

    /// Returns the configured number of worker threads.
    pub fn num_threads(&self) -> Option<usize> {
        self.num_threads
    }

    /// Returns the configured capacity of the dependency edge list.
    pub fn edge_capacity(&self) -> Option<usize> {
        self.edge_capacity
    }
}
