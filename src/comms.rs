//! In-process collective communication
//!
//! A communicator group connects `n` participants (usually one thread each).
//! Every collective is a rendezvous: each participant deposits its
//! contribution tagged with `(session, tag)`, the last one to arrive publishes
//! the gathered set, and everybody leaves with a copy. Sessions are counted
//! per participant, so ranks that issue the same sequence of collectives agree
//! on every session id. A participant that issues a different collective is
//! detected by comparing the gathered tags and fails on every rank with
//! `InvalidInput`.

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct Contribution {
    session: u64,
    tag: &'static str,
    payload: Box<dyn Any + Send + Sync>,
}

#[derive(Default)]
struct Exchange {
    slots: Vec<Option<Contribution>>,
    arrived: usize,
    /// Participants that still have to pick up the published round
    pending: usize,
    round: u64,
    published: Option<Arc<Vec<Contribution>>>,
}

struct Shared {
    size: usize,
    exchange: Mutex<Exchange>,
    cv: Condvar,
}

/// One participant of a communicator group
pub struct Communicator {
    rank: usize,
    shared: Arc<Shared>,
    next_session: AtomicU64,
}

impl std::fmt::Debug for Communicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Communicator")
            .field("rank", &self.rank)
            .field("size", &self.shared.size)
            .finish_non_exhaustive()
    }
}

/// Create `size` connected communicators, ordered by rank
///
/// # Errors
///
/// `InvalidValue` for an empty group
pub fn create_comm_group(size: usize) -> Result<Vec<Communicator>> {
    if size == 0 {
        return Err(Error::invalid_value("communicator group needs at least one rank"));
    }
    let shared = Arc::new(Shared {
        size,
        exchange: Mutex::new(Exchange {
            slots: (0..size).map(|_| None).collect(),
            ..Exchange::default()
        }),
        cv: Condvar::new(),
    });
    Ok((0..size)
        .map(|rank| Communicator {
            rank,
            shared: Arc::clone(&shared),
            next_session: AtomicU64::new(0),
        })
        .collect())
}

impl Communicator {
    /// Rank of this participant
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Number of participants in the group
    #[must_use]
    pub fn size(&self) -> usize {
        self.shared.size
    }

    /// Gather one value from every rank, ordered by rank
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the ranks did not all issue the same collective
    pub fn all_gather<T>(&self, tag: &'static str, value: T) -> Result<Vec<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let session = self.next_session.fetch_add(1, Ordering::Relaxed);
        if self.shared.size == 1 {
            return Ok(vec![value]);
        }

        let gathered = self.rendezvous(Contribution {
            session,
            tag,
            payload: Box::new(value),
        });

        if let Some(odd) = gathered
            .iter()
            .position(|c| c.session != session || c.tag != tag)
        {
            let theirs = &gathered[odd];
            return Err(Error::invalid_input(format!(
                "collective mismatch: rank {} issued {}#{} while rank {} issued {}#{}",
                self.rank, tag, session, odd, theirs.tag, theirs.session
            )));
        }

        gathered
            .iter()
            .enumerate()
            .map(|(rank, c)| {
                c.payload.downcast_ref::<T>().cloned().ok_or_else(|| {
                    Error::invalid_input(format!("rank {rank} contributed a different payload type to {tag}"))
                })
            })
            .collect()
    }

    /// Gather a vector from every rank and concatenate in rank order
    ///
    /// # Errors
    ///
    /// Same as [`all_gather`](Self::all_gather)
    pub fn all_gather_concat<T>(&self, tag: &'static str, values: Vec<T>) -> Result<Vec<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        Ok(self.all_gather(tag, values)?.into_iter().flatten().collect())
    }

    /// Block until every rank reaches the same barrier
    ///
    /// # Errors
    ///
    /// Same as [`all_gather`](Self::all_gather)
    pub fn barrier(&self, tag: &'static str) -> Result<()> {
        self.all_gather(tag, ()).map(drop)
    }

    fn rendezvous(&self, contribution: Contribution) -> Arc<Vec<Contribution>> {
        let shared = &*self.shared;
        let mut ex = shared.exchange.lock();

        // A previous round may still be draining.
        while ex.published.is_some() {
            shared.cv.wait(&mut ex);
        }

        ex.slots[self.rank] = Some(contribution);
        ex.arrived += 1;
        let round = ex.round;

        if ex.arrived == shared.size {
            let gathered: Vec<Contribution> = ex.slots.iter_mut().filter_map(Option::take).collect();
            ex.published = Some(Arc::new(gathered));
            ex.arrived = 0;
            ex.pending = shared.size;
            ex.round += 1;
            shared.cv.notify_all();
        } else {
            while ex.round == round {
                shared.cv.wait(&mut ex);
            }
        }

        let gathered = ex.published.as_ref().map_or_else(|| Arc::new(Vec::new()), Arc::clone);
        ex.pending -= 1;
        if ex.pending == 0 {
            ex.published = None;
            shared.cv.notify_all();
        }
        gathered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn run<F, R>(size: usize, f: F) -> Vec<R>
    where
        F: Fn(Communicator) -> R + Send + Sync + Copy + 'static,
        R: Send + 'static,
    {
        let handles: Vec<_> = create_comm_group(size)
            .unwrap()
            .into_iter()
            .map(|comm| thread::spawn(move || f(comm)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    }

    #[test]
    fn test_all_gather_orders_by_rank() {
        let results = run(3, |comm| comm.all_gather("rank", comm.rank() * 10).unwrap());
        for gathered in results {
            assert_eq!(gathered, vec![0, 10, 20]);
        }
    }

    #[test]
    fn test_repeated_rounds() {
        let results = run(4, |comm| {
            let mut sums = Vec::new();
            for round in 0..50 {
                let values = comm.all_gather("round", comm.rank() + round).unwrap();
                sums.push(values.iter().sum::<usize>());
            }
            sums
        });
        let expected: Vec<usize> = (0..50).map(|round| 6 + 4 * round).collect();
        for sums in results {
            assert_eq!(sums, expected);
        }
    }

    #[test]
    fn test_concat() {
        let results = run(2, |comm| {
            let local = vec![comm.rank(); comm.rank() + 1];
            comm.all_gather_concat("concat", local).unwrap()
        });
        assert_eq!(results[0], vec![0, 1, 1]);
        assert_eq!(results[1], vec![0, 1, 1]);
    }

    #[test]
    fn test_mismatched_collective_fails_everywhere() {
        let results = run(2, |comm| {
            let tag = if comm.rank() == 0 { "bfs" } else { "pagerank" };
            comm.all_gather(tag, 1_u8)
        });
        for result in results {
            assert_eq!(result.unwrap_err().code(), crate::StatusCode::InvalidInput);
        }
    }

    #[test]
    fn test_single_rank_fast_path() {
        let comms = create_comm_group(1).unwrap();
        assert_eq!(comms[0].all_gather("solo", 7).unwrap(), vec![7]);
        comms[0].barrier("solo").unwrap();
    }

    #[test]
    fn test_empty_group_rejected() {
        assert!(create_comm_group(0).is_err());
    }
}
