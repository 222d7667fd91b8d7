use super::*;
use rand::{
    rngs::SmallRng,
    Rng,
    SeedableRng,
};

fn store(len_variables: usize, clauses: &[Vec<i32>]) -> ClauseStore {
    let mut builder = ClauseStoreBuilder::new(len_variables).unwrap();
    for clause in clauses {
        builder
            .add_clause(clause.iter().copied().map(Literal::from))
            .unwrap();
    }
    builder.finalize().unwrap()
}

fn solve(store: &ClauseStore) -> Solution {
    Solver::default().solve(store).unwrap()
}

fn solve_with_threads(store: &ClauseStore, num_threads: usize) -> Solution {
    Solver::new(SolverConfig::default().with_threads(num_threads))
        .unwrap()
        .solve(store)
        .unwrap()
}

fn x(index: usize) -> Variable {
    Variable::from_index(index).unwrap()
}

/// Generates random clauses of one to `max_len` distinct variables.
fn random_clauses(
    rng: &mut SmallRng,
    len_variables: usize,
    len_clauses: usize,
    max_len: usize,
) -> Vec<Vec<i32>> {
    (0..len_clauses)
        .map(|_| {
            let len = rng.gen_range(1, max_len.min(len_variables) + 1);
            let mut clause = Vec::<i32>::with_capacity(len);
            while clause.len() < len {
                let variable = rng.gen_range(1, len_variables as i32 + 1);
                if clause.iter().any(|literal| literal.abs() == variable) {
                    continue
                }
                clause.push(if rng.gen::<bool>() { variable } else { -variable });
            }
            clause
        })
        .collect()
}

/// Partitions the variables into groups connected by shared clauses.
fn connected_groups(len_variables: usize, clauses: &[Vec<i32>]) -> Vec<Vec<usize>> {
    fn find(parents: &mut [usize], index: usize) -> usize {
        let mut root = index;
        while parents[root] != root {
            root = parents[root];
        }
        parents[index] = root;
        root
    }
    let mut parents = (0..len_variables).collect::<Vec<_>>();
    for clause in clauses {
        let first = clause[0].unsigned_abs() as usize - 1;
        for literal in &clause[1..] {
            let lhs = find(&mut parents, first);
            let rhs = find(&mut parents, literal.unsigned_abs() as usize - 1);
            parents[lhs.max(rhs)] = lhs.min(rhs);
        }
    }
    let mut groups = vec![Vec::new(); len_variables];
    for index in 0..len_variables {
        let root = find(&mut parents, index);
        groups[root].push(index);
    }
    groups.into_iter().filter(|group| !group.is_empty()).collect()
}

fn is_clause_satisfied(clause: &[i32], value_of: impl Fn(usize) -> Option<bool>) -> bool {
    clause.iter().any(|&literal| {
        let value = value_of(literal.unsigned_abs() as usize - 1);
        value == Some(literal > 0)
    })
}

/// Decides the satisfiability of the clauses over the group by enumeration.
fn brute_force(group: &[usize], clauses: &[Vec<i32>]) -> bool {
    let mut positions = vec![usize::MAX; 1 + group.iter().max().copied().unwrap_or(0)];
    for (position, &member) in group.iter().enumerate() {
        positions[member] = position;
    }
    let clauses = clauses
        .iter()
        .filter(|clause| group.contains(&(clause[0].unsigned_abs() as usize - 1)))
        .collect::<Vec<_>>();
    (0..1_u32 << group.len()).any(|bits| {
        clauses.iter().all(|clause| {
            is_clause_satisfied(clause, |variable| {
                Some(bits & (1 << positions[variable]) != 0)
            })
        })
    })
}

#[test]
fn solve_empty_store_works() {
    let solution = solve(&ClauseStore::default());
    assert!(solution.is_sat());
    assert!(solution.model().is_empty());
    assert_eq!(solution.stats().components, 0);
}

#[test]
fn solve_single_binary_clause() {
    let store = store(2, &[vec![1, 2]]);
    let solution = solve(&store);
    assert!(solution.is_sat());
    assert_eq!(solution.unsat_count(), 0);
    assert!(store.is_satisfied_by(solution.model()));
    assert_eq!(solution.stats().components, 1);
}

#[test]
fn solve_contradicting_unit_clauses() {
    let store = store(1, &[vec![1], vec![-1]]);
    let solution = solve(&store);
    assert!(!solution.is_sat());
    assert_eq!(solution.unsat_count(), 1);
}

#[test]
fn unsat_component_does_not_spoil_others() {
    // {x0}, {-x0} is unsatisfiable while {x1 | x2}, {-x1} is not.
    let store = store(3, &[vec![1], vec![-1], vec![2, 3], vec![-2]]);
    let solution = solve(&store);
    assert_eq!(solution.unsat_count(), 1);
    assert_eq!(solution.stats().components, 2);
    let model = solution.model();
    assert_eq!(model.get(x(1)), Some(false));
    assert_eq!(model.get(x(2)), Some(true));
}

#[test]
fn forcing_chain_assigns_all_true() {
    let len = 50;
    let mut clauses = (1..len as i32)
        .map(|variable| vec![variable, -(variable + 1)])
        .collect::<Vec<_>>();
    clauses.push(vec![len as i32]);
    let store = store(len, &clauses);
    let solution = solve(&store);
    assert!(solution.is_sat());
    assert_eq!(solution.stats().components, 1);
    assert_eq!(solution.stats().decisions, 0);
    for index in 0..len {
        assert_eq!(solution.model().get(x(index)), Some(true));
    }
}

#[test]
fn pigeon_hole_is_unsat() {
    // Three pigeons, two holes: DIMACS variable 2 * p + h puts pigeon p into hole h.
    let mut clauses = (0..3).map(|p| vec![2 * p + 1, 2 * p + 2]).collect::<Vec<_>>();
    for h in 1..=2 {
        for p in 0..3 {
            for q in (p + 1)..3 {
                clauses.push(vec![-(2 * p + h), -(2 * q + h)]);
            }
        }
    }
    let solution = solve(&store(6, &clauses));
    assert_eq!(solution.unsat_count(), 1);
    assert!(solution.stats().conflicts > 0);
}

#[test]
fn unconstrained_variables_stay_unassigned() {
    let store = store(4, &[vec![1, 2]]);
    let solution = solve(&store);
    assert!(solution.is_sat());
    assert_eq!(solution.stats().components, 3);
    assert_eq!(solution.model().get(x(2)), None);
    assert_eq!(solution.model().get(x(3)), None);
}

#[test]
fn solve_raw_store() {
    const S: u32 = u32::MAX;
    // x0 owns (x0 | x1) and (-x0 | x1), x1 owns (-x1 | x2).
    let literals = [0, 2, S, 1, 2, S, 3, 4, S, S, S, S, S, S, S, S, S, S];
    let store = ClauseStore::new(
        3,
        6,
        literals.iter().copied().map(Literal::from_raw).collect(),
        vec![6, 3, 0],
    )
    .unwrap();
    let solution = solve(&store);
    assert!(solution.is_sat());
    assert!(store.is_satisfied_by(solution.model()));
    assert_eq!(solution.model().get(x(1)), Some(true));
    assert_eq!(solution.model().get(x(2)), Some(true));
}

#[test]
fn edge_capacity_overflow_is_reported() {
    let store = store(4, &[vec![1, 2, 3], vec![-3, 4]]);
    let solver = Solver::new(SolverConfig::default().with_edge_capacity(2)).unwrap();
    let required = match solver.solve(&store) {
        Err(Error::EdgeCapacityExceeded { required, capacity }) => {
            assert_eq!(capacity, 2);
            required
        }
        result => panic!("expected edge capacity overflow but found {:?}", result),
    };
    assert_eq!(required, 6);
    let solver =
        Solver::new(SolverConfig::default().with_edge_capacity(required)).unwrap();
    assert!(solver.solve(&store).unwrap().is_sat());
}

#[test]
fn generous_edge_capacity_is_accepted() {
    let store = store(2, &[vec![1, 2]]);
    let solver =
        Solver::new(SolverConfig::default().with_edge_capacity(usize::MAX / 2)).unwrap();
    let solution = solver.solve(&store).unwrap();
    assert!(solution.is_sat());
    assert!(store.is_satisfied_by(solution.model()));
}

#[test]
fn solve_from_cnf_works() {
    let cnf = b"\
        c two independent groups\n\
        p cnf 4 4\n\
        1 -2 0\n\
        2 0\n\
        3 4 0\n\
        -3 -4 0\n\
    ";
    let store = ClauseStore::from_cnf(&mut &cnf[..]).unwrap();
    let solution = solve(&store);
    assert!(solution.is_sat());
    assert_eq!(solution.stats().components, 2);
    assert!(store.is_satisfied_by(solution.model()));
    assert_eq!(solution.model().get(x(0)), Some(true));
    assert_eq!(solution.model().get(x(1)), Some(true));
}

#[test]
fn verdicts_match_brute_force() {
    let mut rng = SmallRng::seed_from_u64(0x5EED);
    for _ in 0..300 {
        let len_variables = rng.gen_range(1, 13);
        let len_clauses = rng.gen_range(0, 4 * len_variables + 1);
        let clauses = random_clauses(&mut rng, len_variables, len_clauses, 3);
        let store = store(len_variables, &clauses);
        let solution = solve(&store);
        let groups = connected_groups(len_variables, &clauses);
        let expected_unsat = groups
            .iter()
            .filter(|group| !brute_force(group, &clauses))
            .count();
        assert_eq!(solution.stats().components, groups.len(), "{:?}", clauses);
        assert_eq!(solution.unsat_count(), expected_unsat, "{:?}", clauses);
    }
}

#[test]
fn verdicts_match_brute_force_for_larger_components() {
    let mut rng = SmallRng::seed_from_u64(20);
    for _ in 0..8 {
        let clauses = random_clauses(&mut rng, 16, 60, 3);
        let store = store(16, &clauses);
        let solution = solve(&store);
        let groups = connected_groups(16, &clauses);
        let expected_unsat = groups
            .iter()
            .filter(|group| !brute_force(group, &clauses))
            .count();
        assert_eq!(solution.unsat_count(), expected_unsat, "{:?}", clauses);
    }
}

#[test]
fn models_of_sat_components_are_sound() {
    let mut rng = SmallRng::seed_from_u64(42);
    for _ in 0..200 {
        let len_variables = rng.gen_range(1, 40);
        let len_clauses = rng.gen_range(0, 3 * len_variables + 1);
        let clauses = random_clauses(&mut rng, len_variables, len_clauses, 4);
        let store = store(len_variables, &clauses);
        let solution = solve(&store);
        let model = solution.model();
        let value_of = |index: usize| model.get(x(index));
        let mut unsat_groups = 0;
        for group in connected_groups(len_variables, &clauses) {
            let mut group_clauses = clauses
                .iter()
                .filter(|clause| group.contains(&(clause[0].unsigned_abs() as usize - 1)));
            let satisfied = group_clauses.all(|clause| is_clause_satisfied(clause, value_of));
            if !satisfied {
                unsat_groups += 1;
                // Unsatisfiable components are fully unwound.
                assert!(group.iter().all(|&index| value_of(index).is_none()));
            }
        }
        assert_eq!(solution.unsat_count(), unsat_groups, "{:?}", clauses);
        if solution.is_sat() {
            assert!(store.is_satisfied_by(model));
        }
    }
}

#[test]
fn solving_is_deterministic_across_thread_counts() {
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..20 {
        let clauses = random_clauses(&mut rng, 300, 700, 3);
        let store = store(300, &clauses);
        let single = solve_with_threads(&store, 1);
        let multi = solve_with_threads(&store, 4);
        assert_eq!(single, multi);
    }
}

#[test]
fn resolving_yields_identical_solutions() {
    let mut rng = SmallRng::seed_from_u64(99);
    let clauses = random_clauses(&mut rng, 100, 250, 3);
    let store = store(100, &clauses);
    let solver = Solver::default();
    let first = solver.solve(&store).unwrap();
    let second = solver.solve(&store).unwrap();
    assert_eq!(first, second);
}

#[test]
fn components_are_solved_independently() {
    let mut rng = SmallRng::seed_from_u64(3);
    for _ in 0..20 {
        let lhs = random_clauses(&mut rng, 10, 30, 3);
        let rhs = random_clauses(&mut rng, 12, 40, 3);
        let shifted = rhs
            .iter()
            .map(|clause| {
                clause
                    .iter()
                    .map(|&literal| literal + literal.signum() * 10)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let combined = lhs.iter().chain(&shifted).cloned().collect::<Vec<_>>();
        let lhs_solution = solve(&store(10, &lhs));
        let rhs_solution = solve(&store(12, &rhs));
        let combined_solution = solve(&store(22, &combined));
        assert_eq!(
            combined_solution.unsat_count(),
            lhs_solution.unsat_count() + rhs_solution.unsat_count()
        );
        let combined_model = combined_solution.model().as_slice();
        assert_eq!(&combined_model[..10], lhs_solution.model().as_slice());
        assert_eq!(&combined_model[10..], rhs_solution.model().as_slice());
    }
}
