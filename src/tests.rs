use paste::paste;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    codec,
    formula::{Assignment, Clause, Formula, FormulaError, Literal, Variable, VariableParseError},
    generator::{generate, GenerateError, GeneratorParams},
    parser::{self, parse_file, parse_str},
    puzzle::{Guess, Puzzle},
    report::Report,
    render::{self, render, render_assignment, render_clause},
    solver::{solve, Backend, BacktrackingSolver, IterativeSolver, Solver},
};

fn clause(literals: &[i64]) -> Clause {
    Clause::new(
        literals
            .iter()
            .map(|&num| Literal::from_dimacs(num).unwrap())
            .collect(),
    )
}

fn formula(clauses: &[&[i64]]) -> Formula {
    Formula::new(clauses.iter().map(|literals| clause(literals)).collect()).unwrap()
}

fn var(id: usize) -> Variable {
    Variable::new(id).unwrap()
}

/// Test oracle: the first satisfying complete assignment, trying all 2^N.
fn brute_force(formula: &Formula) -> Option<Assignment> {
    let num_variables = formula.cardinality();
    (0..1u64 << num_variables)
        .map(|bits| {
            Assignment::from_values(
                (0..num_variables)
                    .map(|index| Some(bits & (1 << index) != 0))
                    .collect(),
            )
        })
        .find(|assignment| formula.is_satisfied(assignment))
}

/// Random small formulas with seeded, reproducible shapes.
fn random_formulas(count: u64) -> impl Iterator<Item = Formula> {
    (0..count).filter_map(|seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        let params = GeneratorParams::new(
            rng.gen_range(1..=6),
            rng.gen_range(1..=3),
            rng.gen_range(1..=12),
        );
        params.validate().ok()?;
        Some(params.generate(&mut rng).unwrap())
    })
}

macro_rules! sat_testcase_with_solver {
    ($solver:ident, $dir:ident, $name: ident) => {
        paste! {
            #[test]
            fn [< $solver:snake _ $dir _ $name >]() {
                let formula = parse_file(
                    concat!("testcases/", stringify!($dir), "/", stringify!($name), ".cnf")
                ).unwrap();
                let model = $solver::new(&formula).solve().unwrap();
                assert!(formula.is_satisfied(&model));
            }
        }
    };
}

macro_rules! unsat_testcase_with_solver {
    ($solver:ident, $dir:ident, $name:ident) => {
        paste! {
            #[test]
            fn [< $solver:snake _ $dir _ $name >]() {
                let formula = parse_file(
                    concat!("testcases/", stringify!($dir), "/", stringify!($name), ".cnf")
                ).unwrap();
                assert!($solver::new(&formula).solve().is_none());
            }
        }
    };
}

macro_rules! sat_testcase {
    ($dir:ident, $name:ident) => {
        sat_testcase_with_solver!(BacktrackingSolver, $dir, $name);
        sat_testcase_with_solver!(IterativeSolver, $dir, $name);
    };
}

macro_rules! unsat_testcase {
    ($dir:ident, $name:ident) => {
        unsat_testcase_with_solver!(BacktrackingSolver, $dir, $name);
        unsat_testcase_with_solver!(IterativeSolver, $dir, $name);
    };
}

sat_testcase!(small, single_clause);
sat_testcase!(small, tautology);
sat_testcase!(small, unit);
sat_testcase!(small, three_sat);

unsat_testcase!(small, contradiction);
unsat_testcase!(small, full2);
unsat_testcase!(small, ph3);

mod formula_model {
    use super::*;

    #[test]
    fn evaluate_partial_assignment() {
        let assignment = Assignment::from_values(vec![Some(true), Some(false), None]);

        assert_eq!(Literal::from_dimacs(1).unwrap().evaluate(&assignment), Some(true));
        assert_eq!(Literal::from_dimacs(-1).unwrap().evaluate(&assignment), Some(false));
        assert_eq!(Literal::from_dimacs(2).unwrap().evaluate(&assignment), Some(false));
        assert_eq!(Literal::from_dimacs(-2).unwrap().evaluate(&assignment), Some(true));
        assert_eq!(Literal::from_dimacs(3).unwrap().evaluate(&assignment), None);
        assert_eq!(Literal::from_dimacs(-3).unwrap().evaluate(&assignment), None);
    }

    #[test]
    fn zero_literal_is_rejected() {
        assert!(Literal::from_dimacs(0).is_none());
        assert!(matches!(
            "0".parse::<Literal>(),
            Err(VariableParseError::RangeError { num: 0 })
        ));
        assert!(matches!(
            "x".parse::<Literal>(),
            Err(VariableParseError::ParseIntError { .. })
        ));
    }

    #[test]
    fn satisfied_requires_a_witness() {
        let clause = clause(&[1, -2, 3]);

        let undecided = Assignment::from_values(vec![Some(false), None, None]);
        assert!(!clause.is_satisfied(&undecided));
        assert!(!clause.is_unsatisfied(&undecided));

        let falsified = Assignment::from_values(vec![Some(false), Some(true), Some(false)]);
        assert!(!clause.is_satisfied(&falsified));
        assert!(clause.is_unsatisfied(&falsified));

        let satisfied = Assignment::from_values(vec![Some(false), Some(false), None]);
        assert!(clause.is_satisfied(&satisfied));
        assert!(!clause.is_unsatisfied(&satisfied));
    }

    #[test]
    fn cardinality_is_highest_variable() {
        let formula = formula(&[&[1, -2], &[-3, 2], &[3, 1]]);
        assert_eq!(formula.cardinality(), 3);
        assert_eq!(formula.arity(), 2);
        assert_eq!(formula.variables().collect::<Vec<_>>(), vec![var(1), var(2), var(3)]);
    }

    #[test]
    fn numbering_gap_is_rejected() {
        let result = Formula::new(vec![clause(&[1, 3]), clause(&[-1, 3])]);
        assert!(matches!(
            result,
            Err(FormulaError::NumberingGap {
                missing: 2,
                cardinality: 3
            })
        ));
    }

    #[test]
    fn ragged_clause_is_rejected() {
        let result = Formula::new(vec![clause(&[1, 2, 3]), clause(&[-1, 2])]);
        assert!(matches!(
            result,
            Err(FormulaError::RaggedClause {
                index: 1,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn degenerate_formula_is_rejected() {
        assert!(matches!(
            Formula::new(Vec::new()),
            Err(FormulaError::NoVariables)
        ));
        assert!(matches!(
            Formula::new(vec![Clause::new(Vec::new())]),
            Err(FormulaError::NoVariables)
        ));
    }

    #[test]
    fn first_unassigned_in_index_order() {
        let mut assignment = Assignment::new(3);
        assert_eq!(assignment.first_unassigned(), Some(var(1)));

        assignment.assign(var(1), false);
        assignment.assign(var(3), true);
        assert_eq!(assignment.first_unassigned(), Some(var(2)));
        assert!(!assignment.is_complete());

        assignment.assign(var(2), true);
        assert_eq!(assignment.first_unassigned(), None);
        assert!(assignment.is_complete());

        assignment.unassign(var(3));
        assert_eq!(assignment.get(var(3)), None);
    }
}

mod solver {
    use super::*;

    #[test]
    fn single_positive_clause() {
        let formula = formula(&[&[1, 2, 3]]);
        let model = solve(&formula).unwrap();

        assert!(formula.is_satisfied(&model));
        // x1 = true already satisfies the clause, the rest is left open.
        assert_eq!(model, Assignment::from_values(vec![Some(true), None, None]));
    }

    #[test]
    fn contradicting_units() {
        let formula = formula(&[&[1], &[-1]]);
        assert_eq!(solve(&formula), None);
        assert_eq!(IterativeSolver::new(&formula).solve(), None);
    }

    #[test]
    fn clause_with_both_polarities() {
        let formula = formula(&[&[1, -1, 2]]);
        let model = solve(&formula).unwrap();
        assert!(formula.is_satisfied(&model));
    }

    #[test]
    fn backtracks_to_false_branch() {
        let formula = formula(&[&[-1, 2], &[-1, -2], &[1, 2]]);
        let model = solve(&formula).unwrap();
        assert_eq!(model, Assignment::from_values(vec![Some(false), Some(true)]));
    }

    #[test]
    fn sound_and_complete_against_brute_force() {
        for formula in random_formulas(300) {
            let expected = brute_force(&formula);
            match solve(&formula) {
                Some(model) => {
                    assert!(formula.is_satisfied(&model), "unsound on {}", formula);
                    assert_eq!(model.num_variables(), formula.cardinality());
                }
                None => assert!(expected.is_none(), "incomplete on {}", formula),
            }
            assert_eq!(solve(&formula).is_some(), expected.is_some());
        }
    }

    #[test]
    fn deterministic_witness() {
        for formula in random_formulas(100) {
            assert_eq!(solve(&formula), solve(&formula));
        }
    }

    #[test]
    fn backends_agree_on_witness() {
        for formula in random_formulas(300) {
            assert_eq!(
                BacktrackingSolver::new(&formula).solve(),
                IterativeSolver::new(&formula).solve(),
                "backends disagree on {}",
                formula
            );
        }
    }

    #[test]
    fn backend_by_name() {
        assert_eq!(Backend::from_name("backtrack"), Some(Backend::Backtracking));
        assert_eq!(Backend::from_name("iterative"), Some(Backend::Iterative));
        assert_eq!(Backend::from_name("z3"), None);

        let formula = formula(&[&[1, 2], &[-1, 2], &[1, -2]]);
        for name in Backend::NAMES {
            let model = Backend::from_name(name).unwrap().solve(&formula).unwrap();
            assert!(formula.is_satisfied(&model));
        }
    }

    #[test]
    fn implication_chain() {
        // x1 -> x2 -> ... -> x100 and !x100, so only the all-false assignment works.
        let num_variables: i64 = 100;
        let mut clauses = (1..num_variables)
            .map(|i| clause(&[-i, i + 1]))
            .collect::<Vec<_>>();
        clauses.push(clause(&[-num_variables, -num_variables]));
        let formula = Formula::new(clauses).unwrap();

        let model = IterativeSolver::new(&formula).solve().unwrap();
        assert!(formula.is_satisfied(&model));
        assert!(model.iter().all(|(_, value)| value == Some(false)));
        assert_eq!(BacktrackingSolver::new(&formula).solve(), Some(model));
    }
}

mod generator {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn game_sized_instance() {
        let mut rng = StdRng::seed_from_u64(42);
        let formula = generate(3, 3, 6, &mut rng).unwrap();

        assert_eq!(formula.clauses().len(), 6);
        assert!(formula.cardinality() <= 3);
        assert!(formula.clauses().iter().all(|c| c.num_literals() == 3));

        let distinct = formula.clauses().iter().collect::<HashSet<_>>();
        assert_eq!(distinct.len(), 6);

        let again = generate(3, 3, 6, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(formula, again);
        assert_eq!(solve(&formula), solve(&again));
    }

    #[test]
    fn default_params_match_the_game() {
        let params = GeneratorParams::default();
        assert_eq!(
            (params.num_variables, params.clause_arity, params.num_clauses),
            (3, 3, 6)
        );
    }

    #[test]
    fn invariants_hold_for_random_shapes() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let params = GeneratorParams::new(
                rng.gen_range(1..=8),
                rng.gen_range(1..=4),
                rng.gen_range(1..=20),
            );
            if params.validate().is_err() {
                continue;
            }

            let formula = params.generate(&mut rng).unwrap();
            assert!(formula.cardinality() <= params.num_variables);
            assert_eq!(formula.clauses().len(), params.num_clauses);
            assert!(formula
                .clauses()
                .iter()
                .all(|c| c.num_literals() == params.clause_arity));
            let distinct = formula.clauses().iter().collect::<HashSet<_>>();
            assert_eq!(distinct.len(), params.num_clauses);
        }
    }

    #[test]
    fn every_clause_drawn_when_exhaustive() {
        // (2 * 1)^2 = 4 distinct clauses exist over one variable.
        let mut rng = StdRng::seed_from_u64(7);
        let formula = generate(1, 2, 4, &mut rng).unwrap();
        let distinct = formula.clauses().iter().collect::<HashSet<_>>();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn impossible_parameters_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            generate(0, 3, 6, &mut rng),
            Err(GenerateError::EmptyParameter { .. })
        ));
        assert!(matches!(
            generate(1, 1, 3, &mut rng),
            Err(GenerateError::TooManyClauses { available: 2, .. })
        ));
        assert!(matches!(
            GeneratorParams::new(2, 3, 1)
                .with_distinct_variables(true)
                .generate(&mut rng),
            Err(GenerateError::ArityExceedsVariables {
                num_variables: 2,
                clause_arity: 3
            })
        ));
        // 2 * 1 orderings of two variables, 2^2 sign patterns each.
        assert!(matches!(
            GeneratorParams::new(2, 2, 9)
                .with_distinct_variables(true)
                .generate(&mut rng),
            Err(GenerateError::TooManyClauses { available: 8, .. })
        ));
    }

    #[test]
    fn sparse_draws_are_renumbered() {
        for &(num_variables, clause_arity, num_clauses) in &[(26, 3, 6), (12, 2, 5), (20, 3, 10)] {
            for seed in 0..50 {
                let mut rng = StdRng::seed_from_u64(seed);
                let formula = generate(num_variables, clause_arity, num_clauses, &mut rng).unwrap();

                assert!(formula.cardinality() <= num_variables);
                assert_eq!(formula.clauses().len(), num_clauses);
                assert!(formula
                    .clauses()
                    .iter()
                    .all(|c| c.num_literals() == clause_arity));
                let distinct = formula.clauses().iter().collect::<HashSet<_>>();
                assert_eq!(distinct.len(), num_clauses);

                let decoded = codec::parse_formula(&codec::encode_formula(&formula)).unwrap();
                assert_eq!(decoded, formula);
                let model = solve(&formula);
                assert_eq!(model, solve(&decoded));
                if let Some(model) = model {
                    assert!(formula.is_satisfied(&model));
                }
            }
        }
    }

    #[test]
    fn single_clause_is_renumbered_densely() {
        // One clause of 3 distinct variables out of 26 becomes a clause over x1..=x3.
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let formula = GeneratorParams::new(26, 3, 1)
                .with_distinct_variables(true)
                .generate(&mut rng)
                .unwrap();

            assert_eq!(formula.cardinality(), 3);
            let clause = &formula.clauses()[0];
            let ids = clause.iter().map(|l| l.variable().id()).collect::<HashSet<_>>();
            assert_eq!(ids, (1..=3).collect::<HashSet<_>>());
        }
    }

    #[test]
    fn distinct_variables_within_a_clause() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let formula = GeneratorParams::new(5, 3, 10)
                .with_distinct_variables(true)
                .generate(&mut rng)
                .unwrap();

            assert_eq!(formula.clauses().len(), 10);
            for clause in formula.clauses() {
                let variables = clause.iter().map(|l| l.variable()).collect::<HashSet<_>>();
                assert_eq!(variables.len(), 3);
            }
        }

        // Every ordered, signed pair over two variables.
        let mut rng = StdRng::seed_from_u64(3);
        let formula = GeneratorParams::new(2, 2, 8)
            .with_distinct_variables(true)
            .generate(&mut rng)
            .unwrap();
        assert_eq!(formula.cardinality(), 2);
        assert!(solve(&formula).is_none());
    }
}

mod render_and_codec {
    use super::*;

    #[test]
    fn render_clause_with_names() {
        assert_eq!(
            render_clause(&clause(&[1, -2, 3]), "|").unwrap(),
            "(a | !b | c)"
        );
    }

    #[test]
    fn render_formula() {
        let formula = formula(&[&[1, -2], &[2, 1]]);
        assert_eq!(
            render(&formula, render::OR_SYMBOL, render::AND_SYMBOL).unwrap(),
            "(a ∨ !b) ∧ (b ∨ a)"
        );
        assert_eq!(render(&formula, "|", "&").unwrap(), "(a | !b) & (b | a)");
    }

    #[test]
    fn render_beyond_alphabet() {
        assert_eq!(render::variable_name(var(26)).unwrap(), 'z');
        assert!(matches!(
            render_clause(&clause(&[1, -27]), "|"),
            Err(render::RenderError::Unnamed { .. })
        ));
    }

    #[test]
    fn render_partial_witness() {
        let assignment = Assignment::from_values(vec![Some(true), Some(false), None]);
        assert_eq!(
            render_assignment(&assignment).unwrap(),
            "a = true, b = false, c = ?"
        );
    }

    #[test]
    fn encode_formula_text() {
        let formula = formula(&[&[1, -2, 3], &[-1, 2, 2]]);
        assert_eq!(codec::encode_formula(&formula), "1.-2.3,-1.2.2");
        assert_eq!(codec::encode_clause(&formula.clauses()[1]), "-1.2.2");
    }

    #[test]
    fn formula_round_trip() {
        for formula in random_formulas(100) {
            let encoded = codec::encode_formula(&formula);
            assert_eq!(codec::parse_formula(&encoded).unwrap(), formula);

            let per_clause = formula
                .clauses()
                .iter()
                .map(codec::encode_clause)
                .collect::<Vec<_>>();
            assert_eq!(
                codec::parse_clauses(per_clause.iter().map(String::as_str)).unwrap(),
                formula
            );
        }
    }

    #[test]
    fn assignment_round_trip() {
        let assignment = Assignment::from_values(vec![Some(true), None, Some(false), None]);
        assert_eq!(codec::encode_assignment(&assignment), "T_F_");
        assert_eq!(codec::parse_assignment("T_F_").unwrap(), assignment);

        for formula in random_formulas(50) {
            if let Some(model) = solve(&formula) {
                let encoded = codec::encode_assignment(&model);
                assert_eq!(codec::parse_assignment(&encoded).unwrap(), model);
            }
        }
    }

    #[test]
    fn malformed_encodings() {
        assert!(matches!(
            codec::parse_formula("1.0.2"),
            Err(codec::Error::MalformedLiteral { .. })
        ));
        assert!(matches!(
            codec::parse_formula("1.2,"),
            Err(codec::Error::MalformedLiteral { .. })
        ));
        assert!(matches!(
            codec::parse_formula("1.3"),
            Err(codec::Error::InvalidFormula { .. })
        ));
        assert!(matches!(
            codec::parse_assignment("TX"),
            Err(codec::Error::MalformedValue { found: 'X' })
        ));
    }
}

mod dimacs {
    use super::*;

    #[test]
    fn parse_with_comments() {
        let formula = parse_str("c comment\np cnf 3 2\n1 -2 3 0\n\nc another\n-1 2 -3 0\n").unwrap();
        assert_eq!(formula, super::formula(&[&[1, -2, 3], &[-1, 2, -3]]));
    }

    #[test]
    fn malformed_inputs() {
        assert!(matches!(
            parse_str("1 2 0\n"),
            Err(parser::Error::MalformedProblemDefinition)
        ));
        assert!(matches!(
            parse_str("p cnf 2 2\n1 2 0\n"),
            Err(parser::Error::ClauseCountMismatch {
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            parse_str("p cnf 2 1\n1 3 0\n"),
            Err(parser::Error::UndeclaredVariable { literal: 3, .. })
        ));
        assert!(matches!(
            parse_str("p cnf 2 1\n1 2\n"),
            Err(parser::Error::MalformedClause { .. })
        ));
        assert!(matches!(
            parse_str("p cnf 3 1\n1 3 0\n"),
            Err(parser::Error::InvalidFormula { .. })
        ));
        assert!(matches!(
            parse_file("testcases/small/missing.cnf"),
            Err(parser::Error::OpenError { .. })
        ));
    }
}

mod puzzle {
    use super::*;

    #[test]
    fn parse_guess() {
        assert_eq!("sat".parse::<Guess>().unwrap(), Guess::Sat);
        assert_eq!("UNSAT".parse::<Guess>().unwrap(), Guess::NotSat);
        assert_eq!("not-sat".parse::<Guess>().unwrap(), Guess::NotSat);
        assert!("maybe".parse::<Guess>().is_err());
    }

    #[test]
    fn grade_guesses() {
        let sat = Puzzle::from_formula(formula(&[&[1, 2, 3]]));
        let verdict = sat.check(Guess::Sat);
        assert!(verdict.correct);
        assert_eq!(verdict.answer(), Guess::Sat);
        assert!(!sat.check(Guess::NotSat).correct);

        let unsat = Puzzle::from_formula(formula(&[&[1], &[-1]]));
        let verdict = unsat.check_with(Backend::Iterative, Guess::NotSat);
        assert!(verdict.correct);
        assert_eq!(verdict.witness, None);
        assert!(!unsat.check(Guess::Sat).correct);
    }

    #[test]
    fn generated_round() {
        let mut rng = StdRng::seed_from_u64(2024);
        let puzzle = Puzzle::generate(&GeneratorParams::default(), &mut rng).unwrap();
        let truth = brute_force(puzzle.formula()).is_some();

        let verdict = puzzle.check(Guess::Sat);
        assert_eq!(verdict.correct, truth);
        assert_eq!(puzzle.check(Guess::NotSat).correct, !truth);
    }
}

mod report {
    use super::*;

    #[test]
    fn report_lists_causes() {
        let report = Report::from(parse_str("p cnf 3 1\n1 3 0\n").unwrap_err());

        assert_eq!(report.message(), "CNF input is not a valid formula");
        assert_eq!(
            report.causes(),
            &["Variable x2 never appears although the formula has 3 variables".to_owned()]
        );
        assert_eq!(
            report.to_string(),
            "CNF input is not a valid formula: \
             Variable x2 never appears although the formula has 3 variables"
        );

        let printed = format!("{:?}", report);
        assert!(printed.starts_with("CNF input is not a valid formula\n"));
        assert!(printed.contains("\nCaused by:\n  0: Variable x2 never appears"));
    }

    #[test]
    fn report_without_causes() {
        let report = Report::from("Unknown solver 'dpll'");

        assert_eq!(report.message(), "Unknown solver 'dpll'");
        assert!(report.causes().is_empty());
        assert_eq!(format!("{:?}", report), "Unknown solver 'dpll'\n");
    }
}
