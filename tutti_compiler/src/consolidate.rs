use std::collections::{HashMap, HashSet};

use log::debug;
use tutti_schema::Instance;

use crate::ast::{Node, ResolvedCall};

/// All events of one instance, in score order.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceEvents {
    pub instance: Instance,
    pub events: Vec<Node>,
}

/// Folds resolved calls into one event sequence per instance. Entries are
/// ordered by the instance's first appearance in the score.
///
/// A call's instances play in parallel, so an instance listed twice in the
/// same call still receives that call's events once.
pub fn consolidate(calls: &[ResolvedCall]) -> Vec<InstanceEvents> {
    let mut out: Vec<InstanceEvents> = Vec::new();
    let mut index: HashMap<&Instance, usize> = HashMap::new();

    for call in calls {
        let mut seen: HashSet<&Instance> = HashSet::new();
        for instance in &call.instances {
            if !seen.insert(instance) {
                continue;
            }
            let slot = *index.entry(instance).or_insert_with(|| {
                out.push(InstanceEvents {
                    instance: instance.clone(),
                    events: Vec::new(),
                });
                out.len() - 1
            });
            out[slot].events.extend(call.music.0.iter().cloned());
        }
    }

    debug!(
        "consolidated {} call(s) into {} instance(s)",
        calls.len(),
        out.len()
    );
    out
}
