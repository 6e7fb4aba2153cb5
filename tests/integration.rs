//! End-to-end tests for the akh-bdi agent.
//!
//! These exercise the whole path from trigger submission through candidate
//! selection, context instantiation and body execution to the observable
//! effects on beliefs, queued triggers and plan statistics.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use akh_bdi::agent::{Agent, AgentBuilder, AgentError};
use akh_bdi::config::AgentConfig;
use akh_bdi::execution::{
    ArithmeticOp, CompareOp, Declaration, Execution, ExecutionError, Expression, FnAction,
};
use akh_bdi::fuzzy::{DefuzzificationKind, FuzzyValue};
use akh_bdi::path::Path;
use akh_bdi::plan::{PLAN_RUNS, Plan};
use akh_bdi::rule::Rule;
use akh_bdi::term::{Literal, Term};
use akh_bdi::trigger::{EventType, Trigger};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn goal(functor: &str, args: Vec<Term>) -> Literal {
    Literal::new(functor, args)
}

/// Action that counts its calls and reports a fixed outcome.
fn counter(name: &str, calls: &Arc<AtomicUsize>, succeed: bool) -> FnAction {
    let calls = Arc::clone(calls);
    FnAction::new(name, 0, move |_, ctx, _, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        let fuzzy = ctx.agent().fuzzy();
        Ok(if succeed { fuzzy.success() } else { fuzzy.fail() })
    })
}

fn pending(agent: &Agent) -> Vec<String> {
    agent
        .pending_triggers()
        .iter()
        .map(ToString::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Candidate selection
// ---------------------------------------------------------------------------

fn guarded_agent(config: AgentConfig, first: &Arc<AtomicUsize>, second: &Arc<AtomicUsize>) -> Agent {
    let pattern = Trigger::add_goal(goal("goal", vec![Term::var("X")]));
    AgentBuilder::with_config(config)
        .action(counter("first", first, true))
        .action(counter("second", second, true))
        .plan(
            Plan::new(pattern.clone(), vec![Execution::action("first", vec![])]).with_guard(
                Expression::compare(CompareOp::Eq, Expression::var("X"), Expression::constant(2)),
            ),
        )
        .plan(
            Plan::new(pattern, vec![Execution::action("second", vec![])]).with_guard(
                Expression::compare(CompareOp::Eq, Expression::var("X"), Expression::constant(1)),
            ),
        )
        .build()
        .unwrap()
}

#[test]
fn guard_selects_second_candidate() {
    init_tracing();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let agent = guarded_agent(AgentConfig::default(), &first, &second);

    let result = agent
        .trigger(Trigger::add_goal(goal("goal", vec![Term::from(1)])), true)
        .unwrap();

    assert!(agent.fuzzy().is_success(&result));
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert!(agent.pending_triggers().is_empty());
}

#[test]
fn guard_selection_with_parallel_candidates() {
    init_tracing();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let config = AgentConfig {
        parallel_candidates: true,
        worker_threads: Some(2),
        ..AgentConfig::default()
    };
    let agent = guarded_agent(config, &first, &second);

    let result = agent
        .trigger(Trigger::add_goal(goal("goal", vec![Term::from(1)])), true)
        .unwrap();

    assert!(agent.fuzzy().is_success(&result));
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn first_successful_candidate_short_circuits() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pattern = Trigger::add_goal(goal("goal", vec![Term::var("X")]));
    let agent = AgentBuilder::new()
        .action(counter("work", &calls, true))
        .plan(Plan::new(pattern.clone(), vec![Execution::action("work", vec![])]))
        .plan(Plan::new(pattern, vec![Execution::action("work", vec![])]))
        .build()
        .unwrap();

    let result = agent
        .trigger(Trigger::add_goal(goal("goal", vec![Term::from(3)])), true)
        .unwrap();
    assert!(agent.fuzzy().is_success(&result));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_candidate_falls_through_to_next() {
    let bad = Arc::new(AtomicUsize::new(0));
    let good = Arc::new(AtomicUsize::new(0));
    let pattern = Trigger::add_goal(goal("goal", vec![Term::var("X")]));
    let agent = AgentBuilder::new()
        .action(counter("bad", &bad, false))
        .action(counter("good", &good, true))
        .plan(Plan::new(pattern.clone(), vec![Execution::action("bad", vec![])]))
        .plan(Plan::new(pattern, vec![Execution::action("good", vec![])]))
        .build()
        .unwrap();

    let result = agent
        .trigger(Trigger::add_goal(goal("goal", vec![Term::from(3)])), true)
        .unwrap();
    assert!(agent.fuzzy().is_success(&result));
    assert_eq!(bad.load(Ordering::SeqCst), 1);
    assert_eq!(good.load(Ordering::SeqCst), 1);
    assert!(agent.pending_triggers().is_empty());
}

#[test]
fn suffix_fallback_finds_unscoped_plan() {
    let agent = AgentBuilder::new()
        .plan(Plan::new(
            Trigger::add_goal(goal("goal", vec![Term::var("X")])),
            vec![Execution::add_belief(goal("done", vec![Term::var("X")]))],
        ))
        .build()
        .unwrap();

    let scoped = Literal::new(Path::parse("sub/goal"), vec![Term::from(4)]);
    let result = agent.trigger(Trigger::add_goal(scoped), true).unwrap();
    assert!(agent.fuzzy().is_success(&result));
    assert!(agent.beliefbase().contains(&goal("done", vec![Term::from(4)])));
}

#[test]
fn trigger_without_plan_fails_quietly() {
    let agent = AgentBuilder::new().build().unwrap();
    let result = agent
        .trigger(Trigger::add_goal(Literal::atom("unknown")), true)
        .unwrap();
    assert!(!agent.fuzzy().is_success(&result));
    assert!(agent.pending_triggers().is_empty());
}

#[test]
fn non_ground_trigger_is_rejected() {
    let agent = AgentBuilder::new().build().unwrap();
    let err = agent
        .trigger(Trigger::add_goal(goal("goal", vec![Term::var("X")])), false)
        .unwrap_err();
    assert!(matches!(err, AgentError::NonGroundTrigger { .. }));
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[test]
fn atomic_body_reports_success_and_runs_everything() {
    let failing = Arc::new(AtomicUsize::new(0));
    let succeeding = Arc::new(AtomicUsize::new(0));
    let agent = AgentBuilder::new()
        .action(counter("failing", &failing, false))
        .action(counter("succeeding", &succeeding, true))
        .plan(
            Plan::new(
                Trigger::add_goal(Literal::atom("atomic")),
                vec![
                    Execution::action("failing", vec![]),
                    Execution::action("succeeding", vec![]),
                ],
            )
            .with_declaration(Declaration::new().atomic()),
        )
        .build()
        .unwrap();

    let result = agent
        .trigger(Trigger::add_goal(Literal::atom("atomic")), true)
        .unwrap();
    assert!(agent.fuzzy().is_success(&result));
    assert_eq!(failing.load(Ordering::SeqCst), 1);
    assert_eq!(succeeding.load(Ordering::SeqCst), 1);
    assert!(agent.pending_triggers().is_empty());
}

#[test]
fn sequential_body_stops_at_first_failure() {
    let failing = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let agent = AgentBuilder::new()
        .action(counter("failing", &failing, false))
        .action(counter("after", &after, true))
        .plan(Plan::new(
            Trigger::add_goal(Literal::atom("plain")),
            vec![
                Execution::action("failing", vec![]),
                Execution::action("after", vec![]),
            ],
        ))
        .build()
        .unwrap();

    let result = agent
        .trigger(Trigger::add_goal(Literal::atom("plain")), true)
        .unwrap();
    assert!(!agent.fuzzy().is_success(&result));
    assert_eq!(failing.load(Ordering::SeqCst), 1);
    assert_eq!(after.load(Ordering::SeqCst), 0);
}

#[test]
fn sequential_body_sees_earlier_bindings() {
    let agent = AgentBuilder::new()
        .plan(Plan::new(
            Trigger::add_goal(goal("square", vec![Term::var("N")])),
            vec![
                Execution::assign(
                    "S",
                    Expression::arithmetic(ArithmeticOp::Mul, Expression::var("N"), Expression::var("N")),
                ),
                Execution::add_belief(goal("square_of", vec![Term::var("N"), Term::var("S")])),
            ],
        ))
        .build()
        .unwrap();

    agent
        .trigger(Trigger::add_goal(goal("square", vec![Term::from(7)])), true)
        .unwrap();
    assert!(
        agent
            .beliefbase()
            .contains(&goal("square_of", vec![Term::from(7), Term::from(49)]))
    );
}

#[test]
fn parallel_body_hides_sibling_bindings() {
    let peek = FnAction::new("peek", 0, |_, ctx, _, _| {
        let seen = ctx.is_bound(&Path::parse("X"));
        ctx.agent().store("peek_saw_x", seen);
        Ok(ctx.agent().fuzzy().success())
    });
    let agent = AgentBuilder::with_config(AgentConfig {
        worker_threads: Some(2),
        ..AgentConfig::default()
    })
    .action(peek)
    .plan(
        Plan::new(
            Trigger::add_goal(Literal::atom("fan")),
            vec![
                Execution::assign("X", Expression::constant(1)),
                Execution::action("peek", vec![]),
            ],
        )
        .with_declaration(Declaration::new().parallel()),
    )
    .build()
    .unwrap();

    let result = agent
        .trigger(Trigger::add_goal(Literal::atom("fan")), true)
        .unwrap();
    assert!(agent.fuzzy().is_success(&result));
    assert_eq!(agent.fetch::<bool>("peek_saw_x").as_deref(), Some(&false));
}

#[test]
fn graded_action_results_drive_the_decision() {
    let graded = |name: &str, degree: f64| {
        FnAction::new(name, 0, move |_, _, _, _| Ok(vec![FuzzyValue::new(true, degree)]))
    };
    let agent = AgentBuilder::new()
        .action(graded("high", 0.8))
        .action(graded("low", 0.3))
        .plan(Plan::new(
            Trigger::add_goal(Literal::atom("strong")),
            vec![Execution::action("high", vec![])],
        ))
        .plan(Plan::new(
            Trigger::add_goal(Literal::atom("weak")),
            vec![Execution::action("low", vec![])],
        ))
        .build()
        .unwrap();

    let strong = agent
        .trigger(Trigger::add_goal(Literal::atom("strong")), true)
        .unwrap();
    assert!((agent.fuzzy().level(&strong) - 0.8).abs() < 1e-12);
    let weak = agent
        .trigger(Trigger::add_goal(Literal::atom("weak")), true)
        .unwrap();
    assert!(!agent.fuzzy().is_success(&weak));
}

#[test]
fn action_return_values_bind_variables() {
    let add = FnAction::new("math/add", 2, |_, ctx, args, returns| {
        let sum = args
            .iter()
            .map(|arg| match arg {
                Term::Atom(atom) => atom.as_f64(),
                _ => None,
            })
            .sum::<Option<f64>>();
        match sum {
            Some(sum) => {
                returns.push(Term::from(sum as i64));
                Ok(ctx.agent().fuzzy().success())
            }
            None => Err(ExecutionError::ActionFault {
                action: "math/add".to_string(),
                message: "non-numeric argument".to_string(),
                context: ctx.dump(),
            }),
        }
    });
    let agent = AgentBuilder::new()
        .action(add)
        .plan(Plan::new(
            Trigger::add_goal(goal("sum", vec![Term::var("A"), Term::var("B")])),
            vec![
                Execution::action_returning(
                    "math/add",
                    vec![Term::var("A"), Term::var("B")],
                    vec![Path::parse("S")],
                ),
                Execution::add_belief(goal("total", vec![Term::var("S")])),
            ],
        ))
        .build()
        .unwrap();

    agent
        .trigger(Trigger::add_goal(goal("sum", vec![Term::from(2), Term::from(3)])), true)
        .unwrap();
    assert!(agent.beliefbase().contains(&goal("total", vec![Term::from(5)])));

    let result = agent
        .trigger(Trigger::add_goal(goal("sum", vec![Term::from("x"), Term::from(3)])), true)
        .unwrap();
    assert!(!agent.fuzzy().is_success(&result));
}

#[test]
fn unknown_action_fails_the_plan() {
    let agent = AgentBuilder::new()
        .plan(Plan::new(
            Trigger::add_goal(Literal::atom("go")),
            vec![Execution::action("missing", vec![])],
        ))
        .build()
        .unwrap();
    let result = agent.trigger(Trigger::add_goal(Literal::atom("go")), true).unwrap();
    assert!(!agent.fuzzy().is_success(&result));
    assert_eq!(pending(&agent), vec!["-!go"]);
}

#[test]
fn repair_chain_takes_first_succeeding_alternative() {
    let bad = Arc::new(AtomicUsize::new(0));
    let half = FnAction::new("half", 0, |_, ctx, _, returns| {
        returns.push(Term::from(1));
        Ok(ctx.agent().fuzzy().fail())
    });
    let agent = AgentBuilder::new()
        .action(counter("bad", &bad, false))
        .action(half)
        .plan(Plan::new(
            Trigger::add_goal(Literal::atom("fix")),
            vec![
                Execution::repair(vec![
                    Execution::action("missing", vec![]),
                    Execution::action("bad", vec![]),
                    Execution::action_returning("half", vec![], vec![Path::parse("Y")]),
                    Execution::assign("Y", Expression::constant(5)),
                    Execution::action("bad", vec![]),
                ]),
                Execution::add_belief(goal("fixed", vec![Term::var("Y")])),
            ],
        ))
        .build()
        .unwrap();

    let result = agent.trigger(Trigger::add_goal(Literal::atom("fix")), true).unwrap();
    assert!(agent.fuzzy().is_success(&result));
    // the failed `half` alternative left Y unbound
    assert!(agent.beliefbase().contains(&goal("fixed", vec![Term::from(5)])));
    assert_eq!(bad.load(Ordering::SeqCst), 1);
    assert!(!pending(&agent).contains(&"-!fix".to_string()));
}

#[test]
fn repair_chain_without_success_fails_the_body() {
    let bad = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let agent = AgentBuilder::new()
        .action(counter("bad", &bad, false))
        .action(counter("after", &after, true))
        .plan(Plan::new(
            Trigger::add_goal(Literal::atom("fix")),
            vec![
                Execution::repair(vec![
                    Execution::action("bad", vec![]),
                    Execution::action("bad", vec![]),
                ]),
                Execution::action("after", vec![]),
            ],
        ))
        .build()
        .unwrap();

    let result = agent.trigger(Trigger::add_goal(Literal::atom("fix")), true).unwrap();
    assert!(!agent.fuzzy().is_success(&result));
    assert_eq!(bad.load(Ordering::SeqCst), 2);
    assert_eq!(after.load(Ordering::SeqCst), 0);
    assert_eq!(pending(&agent), vec!["-!fix"]);
}

#[test]
fn ternary_picks_branch_by_condition() {
    let agent = AgentBuilder::new()
        .plan(Plan::new(
            Trigger::add_goal(goal("pick", vec![Term::var("X")])),
            vec![Execution::ternary(
                Expression::compare(CompareOp::Gt, Expression::var("X"), Expression::constant(0)),
                Execution::add_belief(goal("sign", vec![Term::var("X"), Term::from("positive")])),
                Execution::add_belief(goal("sign", vec![Term::var("X"), Term::from("other")])),
            )],
        ))
        .build()
        .unwrap();

    for n in [3, -2] {
        let result = agent
            .trigger(Trigger::add_goal(goal("pick", vec![Term::from(n)])), true)
            .unwrap();
        assert!(agent.fuzzy().is_success(&result));
    }
    assert!(agent.beliefbase().contains(&goal("sign", vec![Term::from(3), Term::from("positive")])));
    assert!(agent.beliefbase().contains(&goal("sign", vec![Term::from(-2), Term::from("other")])));
    assert_eq!(agent.beliefbase().len(), 2);
}

#[test]
fn belief_query_takes_first_accepted_candidate() {
    let agent = AgentBuilder::new()
        .belief(goal("at", vec![Term::from("home")]))
        .belief(goal("at", vec![Term::from("work")]))
        .plan(Plan::new(
            Trigger::add_goal(Literal::atom("choose")),
            vec![
                Execution::unify(
                    goal("at", vec![Term::var("P")]),
                    Some(Expression::compare(
                        CompareOp::Ne,
                        Expression::var("P"),
                        Expression::constant("home"),
                    )),
                ),
                Execution::add_belief(goal("chosen", vec![Term::var("P")])),
            ],
        ))
        .build()
        .unwrap();

    let result = agent
        .trigger(Trigger::add_goal(Literal::atom("choose")), true)
        .unwrap();
    assert!(agent.fuzzy().is_success(&result));
    assert!(agent.beliefbase().contains(&goal("chosen", vec![Term::from("work")])));
}

// ---------------------------------------------------------------------------
// Failure propagation
// ---------------------------------------------------------------------------

#[test]
fn failed_goal_raises_one_delete_goal() {
    let pattern = Trigger::add_goal(goal("goal", vec![Term::var("X")]));
    let fail = || Execution::Test(Expression::constant(false));
    let agent = AgentBuilder::new()
        .plan(Plan::new(pattern.clone(), vec![fail()]))
        .plan(Plan::new(pattern, vec![fail()]))
        .build()
        .unwrap();

    let result = agent
        .trigger(Trigger::add_goal(goal("goal", vec![Term::from(1)])), true)
        .unwrap();
    assert!(!agent.fuzzy().is_success(&result));
    assert_eq!(pending(&agent), vec!["-!goal(1)"]);
}

#[test]
fn delete_goal_plan_failure_does_not_cascade() {
    let agent = AgentBuilder::new()
        .plan(Plan::new(
            Trigger::delete_goal(goal("goal", vec![Term::var("X")])),
            vec![Execution::Test(Expression::constant(false))],
        ))
        .build()
        .unwrap();
    agent
        .trigger(Trigger::delete_goal(goal("goal", vec![Term::from(1)])), true)
        .unwrap();
    assert!(agent.pending_triggers().is_empty());
}

#[test]
fn guard_rejection_alone_raises_no_delete_goal() {
    let agent = AgentBuilder::new()
        .plan(
            Plan::new(Trigger::add_goal(Literal::atom("go")), vec![])
                .with_guard(Expression::constant(false)),
        )
        .build()
        .unwrap();
    let result = agent.trigger(Trigger::add_goal(Literal::atom("go")), true).unwrap();
    assert!(!agent.fuzzy().is_success(&result));
    assert!(agent.pending_triggers().is_empty());
}

#[test]
fn runaway_recursion_is_bounded() {
    let agent = AgentBuilder::with_config(AgentConfig {
        max_dispatch_depth: 8,
        ..AgentConfig::default()
    })
    .plan(Plan::new(
        Trigger::add_goal(Literal::atom("loop")),
        vec![Execution::achieve_immediately(Literal::atom("loop"))],
    ))
    .build()
    .unwrap();

    let result = agent.trigger(Trigger::add_goal(Literal::atom("loop")), true).unwrap();
    assert!(!agent.fuzzy().is_success(&result));
    assert_eq!(pending(&agent), vec!["-!loop"]);
}

#[test]
fn action_triggering_its_own_goal_is_bounded() {
    let calls = Arc::new(AtomicUsize::new(0));
    let refused = Arc::new(AtomicUsize::new(0));
    let again = {
        let calls = Arc::clone(&calls);
        let refused = Arc::clone(&refused);
        FnAction::new("again", 0, move |_, ctx, _, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            let agent = ctx.agent();
            match agent.trigger(Trigger::add_goal(Literal::atom("loop")), true) {
                Ok(result) => Ok(result),
                Err(AgentError::Execution(ExecutionError::DispatchDepth { depth })) => {
                    assert_eq!(depth, 9);
                    refused.fetch_add(1, Ordering::SeqCst);
                    Ok(agent.fuzzy().fail())
                }
                Err(other) => Err(ExecutionError::ActionFault {
                    action: "again".to_string(),
                    message: other.to_string(),
                    context: String::new(),
                }),
            }
        })
    };
    let agent = AgentBuilder::with_config(AgentConfig {
        max_dispatch_depth: 8,
        ..AgentConfig::default()
    })
    .action(again)
    .plan(Plan::new(
        Trigger::add_goal(Literal::atom("loop")),
        vec![Execution::action("again", vec![])],
    ))
    .build()
    .unwrap();

    let result = agent.trigger(Trigger::add_goal(Literal::atom("loop")), true).unwrap();
    assert!(!agent.fuzzy().is_success(&result));
    assert_eq!(calls.load(Ordering::SeqCst), 9);
    assert_eq!(refused.load(Ordering::SeqCst), 1);
    assert_eq!(pending(&agent), vec!["-!loop"]);

    // outside any action the count starts over
    let result = agent.trigger(Trigger::add_goal(Literal::atom("loop")), true).unwrap();
    assert!(!agent.fuzzy().is_success(&result));
    assert_eq!(calls.load(Ordering::SeqCst), 18);
}

// ---------------------------------------------------------------------------
// Rules and relocation
// ---------------------------------------------------------------------------

fn double_rule() -> Rule {
    Rule::new(
        goal("double", vec![Term::var("N"), Term::var("R")]),
        vec![
            Execution::assign(
                "Tmp",
                Expression::arithmetic(ArithmeticOp::Add, Expression::var("N"), Expression::var("N")),
            ),
            Execution::assign("R", Expression::var("Tmp")),
        ],
    )
}

#[test]
fn rule_call_relocates_only_caller_variables() {
    let snapshot = FnAction::new("snapshot", 0, |_, ctx, _, _| {
        let bound: Vec<String> = ctx
            .variables()
            .filter(|v| v.is_bound())
            .map(|v| v.name().to_string())
            .collect();
        ctx.agent().store("bound", bound);
        Ok(ctx.agent().fuzzy().success())
    });
    let agent = AgentBuilder::new()
        .rule(double_rule())
        .action(snapshot)
        .plan(Plan::new(
            Trigger::add_goal(goal("compute", vec![Term::var("X")])),
            vec![
                Execution::rule(goal("double", vec![Term::var("X"), Term::var("Y")])),
                Execution::action("snapshot", vec![]),
                Execution::add_belief(goal("result", vec![Term::var("Y")])),
            ],
        ))
        .build()
        .unwrap();

    let result = agent
        .trigger(Trigger::add_goal(goal("compute", vec![Term::from(5)])), true)
        .unwrap();
    assert!(agent.fuzzy().is_success(&result));
    assert!(agent.beliefbase().contains(&goal("result", vec![Term::from(10)])));

    let bound = agent.fetch::<Vec<String>>("bound").unwrap();
    assert!(bound.contains(&"X".to_string()));
    assert!(bound.contains(&"Y".to_string()));
    assert!(!bound.contains(&"Tmp".to_string()));
    assert!(!bound.contains(&"N".to_string()));
    assert!(!bound.contains(&"R".to_string()));
}

#[test]
fn rule_call_without_success_is_plain_failure() {
    let agent = AgentBuilder::new()
        .rule(Rule::new(
            goal("positive", vec![Term::var("N")]),
            vec![Execution::Test(Expression::compare(
                CompareOp::Gt,
                Expression::var("N"),
                Expression::constant(0),
            ))],
        ))
        .plan(Plan::new(
            Trigger::add_goal(goal("check", vec![Term::var("N")])),
            vec![Execution::rule(goal("positive", vec![Term::var("N")]))],
        ))
        .build()
        .unwrap();

    let ok = agent
        .trigger(Trigger::add_goal(goal("check", vec![Term::from(3)])), true)
        .unwrap();
    assert!(agent.fuzzy().is_success(&ok));
    let bad = agent
        .trigger(Trigger::add_goal(goal("check", vec![Term::from(-3)])), true)
        .unwrap();
    assert!(!agent.fuzzy().is_success(&bad));
}

#[test]
fn recursive_rules_resolve_through_the_table() {
    // fact(0, 1).  fact(N, F) :- N > 0, M = N - 1, fact(M, G), F = N * G.
    let base = Rule::new(
        goal("fact", vec![Term::from(0), Term::var("F")]),
        vec![Execution::assign("F", Expression::constant(1))],
    );
    let step = Rule::new(
        goal("fact", vec![Term::var("N"), Term::var("F")]),
        vec![
            Execution::Test(Expression::compare(
                CompareOp::Gt,
                Expression::var("N"),
                Expression::constant(0),
            )),
            Execution::assign(
                "M",
                Expression::arithmetic(ArithmeticOp::Sub, Expression::var("N"), Expression::constant(1)),
            ),
            Execution::rule(goal("fact", vec![Term::var("M"), Term::var("G")])),
            Execution::assign(
                "F",
                Expression::arithmetic(ArithmeticOp::Mul, Expression::var("N"), Expression::var("G")),
            ),
        ],
    );
    let agent = AgentBuilder::new()
        .rule(base)
        .rule(step)
        .plan(Plan::new(
            Trigger::add_goal(goal("factorial", vec![Term::var("N")])),
            vec![
                Execution::rule(goal("fact", vec![Term::var("N"), Term::var("F")])),
                Execution::add_belief(goal("factorial_of", vec![Term::var("N"), Term::var("F")])),
            ],
        ))
        .build()
        .unwrap();

    agent
        .trigger(Trigger::add_goal(goal("factorial", vec![Term::from(5)])), true)
        .unwrap();
    assert!(
        agent
            .beliefbase()
            .contains(&goal("factorial_of", vec![Term::from(5), Term::from(120)]))
    );
}

#[test]
fn immediate_goal_hands_bindings_back() {
    let agent = AgentBuilder::new()
        .plan(Plan::new(
            Trigger::add_goal(goal("find", vec![Term::var("W")])),
            vec![Execution::assign("W", Expression::constant(7))],
        ))
        .plan(Plan::new(
            Trigger::add_goal(Literal::atom("outer")),
            vec![
                Execution::achieve_immediately(goal("find", vec![Term::var("Z")])),
                Execution::add_belief(goal("found", vec![Term::var("Z")])),
            ],
        ))
        .build()
        .unwrap();

    let result = agent.trigger(Trigger::add_goal(Literal::atom("outer")), true).unwrap();
    assert!(agent.fuzzy().is_success(&result));
    assert!(agent.beliefbase().contains(&goal("found", vec![Term::from(7)])));
}

// ---------------------------------------------------------------------------
// Cycle, sleep, statistics
// ---------------------------------------------------------------------------

#[test]
fn cycle_dispatches_belief_triggers() {
    let agent = AgentBuilder::new()
        .plan(Plan::new(
            Trigger::add_belief(goal("at", vec![Term::var("P")])),
            vec![Execution::add_belief(goal("visited", vec![Term::var("P")]))],
        ))
        .build()
        .unwrap();

    agent.add_belief(goal("at", vec![Term::from("home")]));
    let summary = agent.cycle();
    assert_eq!(summary.cycle, 1);
    assert_eq!(summary.dispatched, 1);
    assert_eq!(summary.succeeded, 1);
    assert!(agent.beliefbase().contains(&goal("visited", vec![Term::from("home")])));

    // +visited("home") has no plan
    let summary = agent.cycle();
    assert_eq!(summary.dispatched, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(agent.cycle_count(), 2);
}

#[test]
fn queued_goals_run_in_the_next_cycle() {
    let calls = Arc::new(AtomicUsize::new(0));
    let agent = AgentBuilder::new()
        .action(counter("work", &calls, true))
        .plan(Plan::new(
            Trigger::add_goal(Literal::atom("later")),
            vec![Execution::action("work", vec![])],
        ))
        .initial_goal(Literal::atom("later"))
        .build()
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    agent.cycle();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(agent.running_plans().is_empty());
}

#[test]
fn sleeping_agent_rejects_triggers_and_wakes_up() {
    let agent = AgentBuilder::new()
        .plan(Plan::new(
            Trigger::add_goal(Literal::atom("wakeup")),
            vec![Execution::add_belief(Literal::atom("awake"))],
        ))
        .build()
        .unwrap();

    agent.sleep(2, Vec::new());
    let result = agent
        .trigger(Trigger::add_goal(Literal::atom("anything")), false)
        .unwrap();
    assert!(!agent.fuzzy().is_success(&result));

    // the second cycle wakes the agent and runs the wakeup goal
    assert!(agent.cycle().sleeping);
    let summary = agent.cycle();
    assert!(!summary.sleeping);
    assert_eq!(summary.succeeded, 1);
    assert!(agent.beliefbase().contains(&Literal::atom("awake")));
}

#[test]
fn plan_statistics_are_visible_as_constants() {
    let pattern = Trigger::add_goal(Literal::atom("count"));
    let agent = AgentBuilder::new()
        .plan(Plan::new(
            pattern.clone(),
            vec![Execution::add_belief(goal("runs", vec![Term::var(PLAN_RUNS)]))],
        ))
        .build()
        .unwrap();

    for _ in 0..2 {
        agent.trigger(pattern.clone(), true).unwrap();
    }
    assert!(agent.beliefbase().contains(&goal("runs", vec![Term::from(0)])));
    assert!(agent.beliefbase().contains(&goal("runs", vec![Term::from(1)])));
    let plan = &agent.plans_by_trigger(&pattern)[0];
    assert_eq!(plan.statistic().successful(), 2);
    assert_eq!(plan.statistic().fail(), 0);
}

#[test]
fn first_of_maxima_agent_from_config() {
    let config = AgentConfig::from_toml_str(
        r#"
        name = "fom"
        defuzzification = "first-of-maxima"
        "#,
    )
    .unwrap();
    assert_eq!(config.defuzzification, DefuzzificationKind::FirstOfMaxima);
    let agent = AgentBuilder::with_config(config)
        .plan(Plan::new(Trigger::add_goal(Literal::atom("noop")), vec![]))
        .build()
        .unwrap();
    let result = agent.trigger(Trigger::add_goal(Literal::atom("noop")), true).unwrap();
    assert!(agent.fuzzy().is_success(&result));
    assert_eq!(agent.name(), "fom");
}

#[test]
fn event_types_of_belief_changes() {
    let agent = AgentBuilder::new().build().unwrap();
    agent.add_belief(Literal::atom("sunny"));
    agent.delete_belief(&Literal::atom("sunny"));
    let events: Vec<EventType> = agent
        .pending_triggers()
        .iter()
        .map(Trigger::event)
        .collect();
    assert_eq!(events, vec![EventType::AddBelief, EventType::DeleteBelief]);
}
