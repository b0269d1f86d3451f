// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-owner mutation queue.
//!
//! Each owner gets a ticket lane: callers take a ticket on entry and are
//! admitted strictly in ticket order, one at a time. Lanes for different
//! owners never wait on each other. A lane is dropped once its last
//! ticket has been served.

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct LaneState {
    next_ticket: u64,
    serving: u64,
}

#[derive(Default)]
struct Lane {
    state: Mutex<LaneState>,
    turn: Condvar,
}

type Lanes = Arc<Mutex<HashMap<String, Arc<Lane>>>>;

#[derive(Default)]
pub struct MutationQueue {
    lanes: Lanes,
}

/// Held while a mutation runs; the next ticket is admitted on drop.
pub struct QueueTurn {
    lanes: Lanes,
    owner: String,
    lane: Arc<Lane>,
    ticket: u64,
}

impl QueueTurn {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl MutationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until every earlier submission for `owner` has finished.
    pub fn enter(&self, owner: &str) -> QueueTurn {
        // The ticket is taken under the map lock so an idle lane cannot be
        // pruned between lookup and ticketing.
        let (lane, ticket) = {
            let mut lanes = self.lanes.lock();
            let lane = lanes.entry(owner.to_string()).or_default().clone();
            let mut state = lane.state.lock();
            let ticket = state.next_ticket;
            state.next_ticket += 1;
            drop(state);
            (lane, ticket)
        };
        {
            let mut state = lane.state.lock();
            while state.serving != ticket {
                lane.turn.wait(&mut state);
            }
        }
        QueueTurn {
            lanes: self.lanes.clone(),
            owner: owner.to_string(),
            lane,
            ticket,
        }
    }

    /// Owners with a running or waiting mutation.
    pub fn active_owners(&self) -> usize {
        self.lanes.lock().len()
    }
}

impl Drop for QueueTurn {
    fn drop(&mut self) {
        let mut lanes = self.lanes.lock();
        let mut state = self.lane.state.lock();
        state.serving += 1;
        if state.serving == state.next_ticket {
            lanes.remove(&self.owner);
        }
        self.lane.turn.notify_all();
    }
}
