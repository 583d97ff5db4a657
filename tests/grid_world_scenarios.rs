extern crate float_eq;
extern crate gridmdp;
extern crate rstest;

use float_eq::*;
use gridmdp::*;
use rstest::*;

const GAMMA: Continous = 0.99;
const EPS: Continous = 1e-6;

fn manhattan(a: Position, b: Position) -> i32 {
    (a.row - b.row).abs() + (a.col - b.col).abs()
}

#[test]
fn cells_next_to_the_big_reward_are_worth_more() {
    let gw = GridWorld::standard(100.);
    let (u, _) = value_iteration(gw.states(), gw.actions(), &gw, GAMMA, EPS);

    // (1, 0) sits under the 100 terminal, (1, 2) under the 10 terminal
    assert!(u[3] > u[5]);
    assert!(u[1] > u[5]);
}

#[test]
fn optimal_moves_head_for_the_big_reward() {
    let gw = GridWorld::standard(100.);
    let (u, _) = value_iteration(gw.states(), gw.actions(), &gw, GAMMA, EPS);
    let policy = policy_extraction(gw.states(), gw.actions(), &gw, &u, GAMMA);
    let goal = Position::new(0, 0);
    let small = &gw.states()[2];

    for s in gw.states().iter().filter(|s| !s.terminal) {
        let a = &policy[s.id];
        let intended = s.position + a.direction;
        if s.id == 5 {
            // next to the 10 terminal the agent backs off rather than risk a slip into it
            assert_eq!(gw.probability(s, small, a), 0.);
        } else {
            assert_eq!(
                manhattan(intended, goal),
                manhattan(s.position, goal) - 1,
                "state {} picks {}",
                s.id,
                a.name
            );
        }
    }
}

#[test]
fn deterministic_moves_follow_shortest_paths() {
    let gw = GridWorld::from_rewards(
        vec![
            vec![100., -1., 10.],
            vec![-1., -1., -1.],
            vec![-1., -1., -1.],
        ],
        &[(0, 0), (0, 2)],
        SlipModel::new(1., 0.).unwrap(),
    )
    .unwrap();

    let (u, _) = value_iteration(gw.states(), gw.actions(), &gw, GAMMA, EPS);

    let one = -1. + GAMMA * 100.;
    let two = -1. + GAMMA * one;
    let three = -1. + GAMMA * two;
    assert_float_eq!(
        u,
        vec![100., one, 10., one, two, three, two, three, -1. + GAMMA * three],
        abs_all <= 1e-5
    );
}

#[test]
fn harsh_board_converges_to_bounded_values() {
    let gw = GridWorld::from_rewards(
        vec![
            vec![-3., -3., 10.],
            vec![-3., -3., -3.],
            vec![-3., -3., -3.],
        ],
        &[(0, 0), (0, 2)],
        SlipModel::default(),
    )
    .unwrap();

    let (u, iterations) = value_iteration(gw.states(), gw.actions(), &gw, GAMMA, EPS);
    let bound = 10. / (1. - GAMMA);

    assert!(iterations < 10_000);
    assert!(u.iter().all(|v| v.is_finite() && v.abs() <= bound));
    assert_float_eq!(u[0], -3., abs <= 1e-12);
    assert_float_eq!(u[2], 10., abs <= 1e-12);
}

#[rstest]
#[case(100.)]
#[case(3.)]
#[case(0.)]
#[case(-3.)]
fn extraction_is_idempotent(#[case] r: Continous) {
    let gw = GridWorld::standard(r);
    let (u, _) = value_iteration(gw.states(), gw.actions(), &gw, GAMMA, EPS);

    let first = policy_extraction(gw.states(), gw.actions(), &gw, &u, GAMMA);
    let second = policy_extraction(gw.states(), gw.actions(), &gw, &u, GAMMA);

    assert_eq!(first, second);
}

#[rstest]
#[case(100.)]
#[case(3.)]
#[case(0.)]
#[case(-3.)]
fn solvers_are_deterministic(#[case] r: Continous) {
    let gw = GridWorld::standard(r);

    let a = value_iteration(gw.states(), gw.actions(), &gw, GAMMA, EPS);
    let b = value_iteration(gw.states(), gw.actions(), &gw, GAMMA, EPS);
    let c = policy_iteration(gw.states(), gw.actions(), &gw, GAMMA, EPS);
    let d = policy_iteration(gw.states(), gw.actions(), &gw, GAMMA, EPS);

    assert_eq!(a, b);
    assert_eq!(c, d);
}

#[test]
fn policy_evaluation_of_the_optimal_policy_matches_value_iteration() {
    let gw = GridWorld::standard(100.);
    let (u, _) = value_iteration(gw.states(), gw.actions(), &gw, GAMMA, EPS);
    let (policy, _) = policy_iteration(gw.states(), gw.actions(), &gw, GAMMA, EPS);

    let u_pi = policy_evaluation(gw.states(), &policy, &gw, GAMMA, EPS);

    assert_float_eq!(u_pi, u, abs_all <= 1e-3);
}

#[test]
fn rectangular_grids_solve_consistently() {
    let gw = GridWorld::from_rewards(
        vec![
            vec![-0.04, -0.04, -0.04, 1.],
            vec![-0.04, -0.04, -0.04, -1.],
            vec![-0.04, -0.04, -0.04, -0.04],
        ],
        &[(0, 3), (1, 3)],
        SlipModel::default(),
    )
    .unwrap();
    let (states, actions) = (gw.states(), gw.actions());

    let (u, _) = value_iteration(states, actions, &gw, GAMMA, EPS);
    let vi_policy = policy_extraction(states, actions, &gw, &u, GAMMA);
    let (pi_policy, _) = policy_iteration(states, actions, &gw, GAMMA, EPS);

    for s in states {
        assert_float_eq!(
            q_value(states, &gw, &u, s, &vi_policy[s.id], GAMMA),
            q_value(states, &gw, &u, s, &pi_policy[s.id], GAMMA),
            abs <= 1e-4
        );
    }
    // the cell left of the +1 terminal moves into it
    assert_eq!(vi_policy[2].name, "East");
}
