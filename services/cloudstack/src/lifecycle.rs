//! Lifecycle transition planning for virtual machines.
//!
//! Tearing a machine down from an arbitrary state means walking the
//! lifecycle graph to the target state and issuing one operation per edge.
//! The graph is small and static, so this is a plain breadth-first search
//! rather than anything provider-specific.

use once_cell::sync::Lazy;
use std::collections::{HashMap, VecDeque};

/// The lifecycle states a virtual machine moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualMachineState {
    /// Being started; settles into Running or Error.
    Starting,
    /// Serving.
    Running,
    /// Being stopped; settles into Stopped or Error.
    Stopping,
    /// Halted but still allocated.
    Stopped,
    /// Destroyed, waiting for cleanup.
    Destroyed,
    /// Being reclaimed; terminal.
    Expunging,
    /// Failed; terminal.
    Error,
}

static TRANSITIONS: Lazy<HashMap<VirtualMachineState, Vec<VirtualMachineState>>> =
    Lazy::new(|| {
        use VirtualMachineState::*;
        HashMap::from([
            (Starting, vec![Running, Error]),
            (Running, vec![Stopping]),
            (Stopping, vec![Stopped, Error]),
            (Stopped, vec![Starting, Destroyed]),
            (Destroyed, vec![Expunging]),
            (Expunging, vec![]),
            (Error, vec![]),
        ])
    });

/// Find the first shortest path from `from` to `to` through the lifecycle
/// graph, both endpoints included.
///
/// Returns `None` when the target is unreachable.
pub fn shortest_transition_path(
    from: VirtualMachineState,
    to: VirtualMachineState,
) -> Option<Vec<VirtualMachineState>> {
    if from == to {
        return Some(vec![from]);
    }

    let mut parent: HashMap<VirtualMachineState, VirtualMachineState> = HashMap::new();
    let mut queue = VecDeque::from([from]);

    while let Some(state) = queue.pop_front() {
        let next_states = TRANSITIONS
            .get(&state)
            .map(|v| v.as_slice())
            .unwrap_or_default();
        for &next in next_states {
            if next == from || parent.contains_key(&next) {
                continue;
            }
            parent.insert(next, state);

            if next == to {
                let mut path = vec![to];
                let mut current = to;
                while current != from {
                    current = parent[&current];
                    path.push(current);
                }
                path.reverse();
                return Some(path);
            }

            queue.push_back(next);
        }
    }

    None
}
