use solver::{
    ClauseStore,
    Error,
    Solution,
    Solver,
    SolverConfig,
};
use std::{
    fs,
    path::PathBuf,
    process,
};
use structopt::StructOpt;
use tracing::{
    error,
    info,
    warn,
};
use tracing_subscriber::EnvFilter;

#[derive(StructOpt, Debug)]
#[structopt(about = "Solves DIMACS CNF instances component by component in parallel.")]
struct Opt {
    #[structopt(name = "input .cnf file", parse(from_os_str))]
    input: PathBuf,
    /// Number of worker threads. Defaults to one per logical core.
    #[structopt(short, long)]
    threads: Option<usize>,
    /// Capacity of the dependency edge list. Defaults to the worst case.
    #[structopt(long)]
    edge_capacity: Option<usize>,
    /// Re-checks every clause against the model of a satisfiable instance.
    #[structopt(long)]
    verify: bool,
}

impl Opt {
    fn config(&self) -> SolverConfig {
        let mut config = SolverConfig::default();
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        if let Some(edge_capacity) = self.edge_capacity {
            config = config.with_edge_capacity(edge_capacity);
        }
        config
    }
}

/// Solves the store and retries once with the reported edge capacity on overflow.
fn solve(config: SolverConfig, store: &ClauseStore) -> Result<Solution, Error> {
    match Solver::new(config)?.solve(store) {
        Err(Error::EdgeCapacityExceeded { required, capacity }) => {
            warn!(required, capacity, "edge capacity exceeded, retrying");
            Solver::new(config.with_edge_capacity(required))?.solve(store)
        }
        result => result,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let opt = Opt::from_args();
    let cnf_contents = match fs::read(&opt.input) {
        Ok(contents) => contents,
        Err(err) => {
            error!(input = ?opt.input, %err, "couldn't read provided input .cnf file");
            process::exit(1)
        }
    };
    let store = match ClauseStore::from_cnf(&mut &cnf_contents[..]) {
        Ok(store) => store,
        Err(err) => {
            error!(?err, "couldn't properly decode provided input .cnf file");
            process::exit(1)
        }
    };
    info!(
        variables = store.len_variables(),
        clauses = store.len_clauses(),
        "start solving"
    );
    let solution = match solve(opt.config(), &store) {
        Ok(solution) => solution,
        Err(err) => {
            error!(%err, "encountered errors during solving");
            process::exit(1)
        }
    };
    let stats = solution.stats();
    info!(
        components = stats.components,
        decisions = stats.decisions,
        conflicts = stats.conflicts,
        forced = stats.forced,
        "finished solving"
    );
    if solution.is_sat() {
        if opt.verify && !store.is_satisfied_by(solution.model()) {
            error!("model does not satisfy all clauses");
            process::exit(2)
        }
        println!("SAT\nmodel = {}", solution.model());
    } else {
        println!("UNSAT ({} of {} components)", solution.unsat_count(), stats.components);
    }
}
