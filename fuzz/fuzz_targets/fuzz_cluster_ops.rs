//! Fuzz target for cluster add/remove sequences.
//!
//! Replays arbitrary add/remove operations on a data-tracking cluster and
//! checks that cardinality and tracked data stay in step.

#![no_main]

use arbitrary::Arbitrary;
use bmx_core::{Cluster, Hierarchy, LapNigHierarchy};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Add(i16),
    Remove(i16),
}

fuzz_target!(|ops: Vec<Op>| {
    let hierarchy = LapNigHierarchy::default();
    let hypers = hierarchy.initialize_hypers();
    let mut cluster = Cluster::new(&hierarchy, &hypers);

    for op in ops {
        let _ = match op {
            Op::Add(x) => cluster.add_datum(&hierarchy, f64::from(x) / 16.0),
            Op::Remove(x) => cluster.remove_datum(&hierarchy, f64::from(x) / 16.0),
        };
        assert_eq!(cluster.cardinality(), cluster.data().len());
        if cluster.is_empty() {
            assert_eq!(cluster.stats().current_sum_abs_dev, 0.0);
        }
    }
});
