//! Property-based tests for the generational collector.
//!
//! Uses proptest to run random mutator sequences and verify the collector's
//! invariants after every step.

use std::collections::HashSet;

use hybrid::{Config, Generation, Generational, ObjectRef};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Allocate,
    AllocateChild(usize),
    AddRoot(usize),
    EndLifetime(usize),
    Trigger,
    Minor,
    Major,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Allocate),
        4 => any::<usize>().prop_map(Op::AllocateChild),
        1 => any::<usize>().prop_map(Op::AddRoot),
        2 => any::<usize>().prop_map(Op::EndLifetime),
        2 => Just(Op::Trigger),
        1 => Just(Op::Minor),
        1 => Just(Op::Major),
    ]
}

fn config() -> impl Strategy<Value = Config> {
    (1usize..24, 1usize..24, 1u32..5).prop_map(|(tenured, young, threshold)| {
        Config::new(tenured, young, threshold)
    })
}

fn pick(handles: &[ObjectRef], index: usize) -> Option<ObjectRef> {
    if handles.is_empty() {
        None
    } else {
        Some(handles[index % handles.len()])
    }
}

fn descriptions(heap: &Generational, chain: &[ObjectRef]) -> Vec<String> {
    chain
        .iter()
        .map(|o| heap.object(*o).unwrap().description().to_string())
        .collect()
}

fn tenured_reachable(heap: &Generational) -> HashSet<ObjectRef> {
    heap.tenured_roots()
        .iter()
        .flat_map(|root| heap.chain(*root))
        .collect()
}

fn check_structure(heap: &Generational) -> Result<(), TestCaseError> {
    let usage = heap.memory_usage();
    let config = heap.config();
    prop_assert!(usage.young.used <= config.young_capacity);
    prop_assert!(usage.tenured.used <= config.tenured_capacity);
    prop_assert_eq!(usage.total.used + usage.total.free, config.young_capacity + config.tenured_capacity);

    let tenured = heap.tenured_objects();
    prop_assert_eq!(tenured.len(), heap.tenured().len());
    prop_assert_eq!(heap.tenured().last(), tenured.last().copied());
    prop_assert_eq!(heap.young().arena_len(), heap.young_objects().len());

    for object in heap.young_objects().iter().chain(tenured.iter()) {
        let body = heap.object(*object);
        prop_assert!(body.is_some());
        prop_assert!(!body.map_or(true, |o| o.is_marked()));
    }
    for root in heap.young_roots() {
        prop_assert_eq!(root.generation(), Generation::Young);
        prop_assert!(heap.is_live(*root));
    }
    for root in heap.tenured_roots() {
        prop_assert_eq!(root.generation(), Generation::Tenured);
        prop_assert!(heap.is_live(*root));
    }
    Ok(())
}

/// Checks copy soundness and promotion correctness around one young cycle.
fn checked_minor(heap: &mut Generational) -> Result<(), TestCaseError> {
    let threshold = heap.config().promotion_threshold;
    let before: Vec<_> = heap
        .young_roots()
        .iter()
        .map(|root| {
            let chain = heap.chain(*root);
            (*root, heap.age(*root).unwrap(), descriptions(heap, &chain), chain)
        })
        .collect();

    heap.minor_collection();

    let young: HashSet<_> = heap.young_objects().iter().copied().collect();
    for (root, age, content, chain) in before {
        if age < threshold {
            // stays young: whole chain survives with the same content
            prop_assert!(heap.young_roots().contains(&root));
            prop_assert_eq!(heap.age(root), Some(age + 1));
            for member in &chain {
                prop_assert!(young.contains(member));
            }
            prop_assert_eq!(descriptions(heap, &chain), content);
        } else if !heap.is_young(root) {
            // promoted: same length and order of descendants
            prop_assert!(!heap.young_roots().contains(&root));
            let promoted = heap.chain(root);
            prop_assert!(heap.tenured_roots().contains(&promoted[0]));
            prop_assert_eq!(promoted.len(), chain.len());
            prop_assert_eq!(&descriptions(heap, &promoted)[1..], &content[1..]);
        }
    }
    Ok(())
}

fn checked_major(heap: &mut Generational) -> Result<(), TestCaseError> {
    let reachable = tenured_reachable(heap);
    let cycle = heap.major_collection();
    let remaining: HashSet<_> = heap.tenured_objects().into_iter().collect();
    prop_assert_eq!(&remaining, &reachable);
    prop_assert_eq!(cycle.live, remaining.len());
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_for_random_mutators(
        config in config(),
        ops in prop::collection::vec(op(), 1..120),
    ) {
        let mut heap = Generational::new(config).unwrap();
        let mut handles: Vec<ObjectRef> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate => match heap.allocate("root") {
                    Ok(object) => handles.push(object),
                    Err(err) => prop_assert!(err.is_out_of_memory()),
                },
                Op::AllocateChild(i) => {
                    if let Some(parent) = pick(&handles, i) {
                        match heap.allocate_child("child", parent) {
                            Ok(object) => {
                                prop_assert_eq!(heap.child(parent), Some(object));
                                handles.push(object);
                            }
                            Err(err) => {
                                // stale parents are rejected, full spaces reported
                                let parent_gone = heap.resolve(parent).is_err();
                                prop_assert!(err.is_out_of_memory() || parent_gone);
                            }
                        }
                    }
                }
                Op::AddRoot(i) => {
                    if let Some(object) = pick(&handles, i) {
                        let _ = heap.add_root(object);
                    }
                }
                Op::EndLifetime(i) => {
                    if let Some(object) = pick(&handles, i) {
                        heap.end_lifetime(object);
                    }
                }
                Op::Trigger => heap.trigger_collection(),
                Op::Minor => checked_minor(&mut heap)?,
                Op::Major => checked_major(&mut heap)?,
            }
            check_structure(&heap)?;
        }
    }

    #[test]
    fn full_young_space_runs_threshold_cycles(threshold in 1u32..6, capacity in 1usize..30) {
        let t = threshold as usize;
        let mut heap = Generational::new(Config::new(1, capacity, threshold)).unwrap();
        let mut parent = heap.allocate("root").unwrap();
        for _ in 1..capacity {
            parent = heap.allocate_child("link", parent).unwrap();
        }

        // the root reaches the threshold but never exceeds it
        prop_assert!(heap.allocate("extra").unwrap_err().is_out_of_memory());
        prop_assert_eq!(heap.statistics().young_collections, t);

        // now it is old enough; it only leaves if its chain fits the tenured space
        let result = heap.allocate("extra");
        let stats = heap.statistics();
        if capacity == 1 {
            prop_assert!(result.is_ok());
            prop_assert_eq!(stats.young_collections, t + 1);
            prop_assert_eq!(stats.promoted_roots, 1);
        } else {
            prop_assert!(result.unwrap_err().is_out_of_memory());
            prop_assert_eq!(stats.young_collections, 2 * t);
            prop_assert_eq!(stats.promotion_failures, t);
        }
        prop_assert!(heap.memory_usage().young.used <= capacity);
    }
}
