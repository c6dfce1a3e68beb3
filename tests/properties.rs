//! Brute-force cross-validation on small random formulas.

use proptest::prelude::*;
use watchsat::{
    config::{Heuristic, Phase, Restart, SolverConfig},
    solver::{self, Assignment, Solver},
    Formula, Literal, Solution,
};

const MAX_VAR: usize = 8;

fn formula_strategy() -> impl Strategy<Value = Formula> {
    let lit = (1..=MAX_VAR, any::<bool>()).prop_map(|(var, negated)| Literal::new(var, negated));
    let clause = prop::collection::vec(lit, 1..=3);
    prop::collection::vec(clause, 1..30).prop_map(Formula::new)
}

fn brute_force(formula: &Formula) -> bool {
    let vars: Vec<_> = formula.variables.iter().copied().collect();
    (0u32..1 << vars.len()).any(|bits| {
        let value = |lit: &Literal| {
            let i = vars.iter().position(|&var| var == lit.var).unwrap_or(0);
            (bits >> i & 1 == 1) != lit.negated
        };
        formula
            .clauses
            .iter()
            .all(|clause| clause.iter().any(&value))
    })
}

fn config_strategy() -> impl Strategy<Value = SolverConfig> {
    (any::<bool>(), 0..3u8, prop::option::of(1..8usize), any::<bool>()).prop_map(
        |(ordered, phase, restart, minimize)| SolverConfig {
            heuristic: if ordered {
                Heuristic::Ordered
            } else {
                Heuristic::Evsids
            },
            phase: match phase {
                0 => Phase::Negative,
                1 => Phase::Positive,
                _ => Phase::Saved,
            },
            restart: restart.map_or(Restart::Never, |base| Restart::Luby { base }),
            conflict_limit: None,
            minimize,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn agrees_with_brute_force(formula in formula_strategy(), config in config_strategy()) {
        let expected = brute_force(&formula);
        let solution = Solver::with_config(formula.clone(), config).solve().unwrap();

        prop_assert_ne!(&solution, &Solution::Unknown);
        prop_assert!(solver::verify(&formula, expected, &solution));

        if let Solution::Sat { model } = &solution {
            let vars: Vec<_> = model.iter().map(|lit| lit.var).collect();
            let expected_vars: Vec<_> = formula.variables.iter().copied().collect();
            prop_assert_eq!(vars, expected_vars);
        }
    }

    #[test]
    fn rollback_keeps_lower_levels(
        steps in prop::collection::vec((any::<bool>(), any::<bool>()), 1..MAX_VAR),
        target in 0..MAX_VAR,
    ) {
        let mut assignment = Assignment::new(MAX_VAR);
        for (var, &(decide, value)) in (1..).zip(&steps) {
            if decide {
                assignment.increment_level();
                assignment.assign(var, value, None).unwrap();
            } else {
                assignment.assign(var, value, Some(0)).unwrap();
            }
        }
        let before: Vec<_> = assignment.trail().to_vec();

        assignment.backtrack(target);

        prop_assert!(assignment.last_level() <= target);
        let kept = assignment.trail();
        prop_assert_eq!(kept, &before[..kept.len()]);
        for lit in kept {
            prop_assert!(assignment.level(lit.var).unwrap() <= target);
        }
        for lit in &before[kept.len()..] {
            prop_assert!(!assignment.is_assigned(lit.var));
            prop_assert!(assignment.reason(lit.var).is_none());
        }
    }
}
