//! Offline search for magic multipliers.
//!
//! This is a build-time tool: it discovers the constants that
//! [`crate::magic`] embeds, and is never invoked by runtime lookups. For
//! one (square, slider, shift) job it races a fixed pool of worker
//! threads, each drawing sparse random candidates and testing them for
//! collision freedom. Two occupancy subsets may share a slot only when
//! they produce the identical attack set (a benign collision); any other
//! collision disqualifies the candidate. The first worker to succeed sets
//! a shared atomic stop flag; a coordinating loop polls the workers and
//! force-stops the pool when a wall-clock timeout elapses. "No magic
//! found within budget" is an expected outcome reported as `0`, never an
//! error.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use itertools::Itertools;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::magic::{all_subsets, relevant_mask, slow_attacks, Slider};

/// How often the coordinator samples worker state while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// One search job: a square, a slider and a target shift, with the
/// occupancy subsets and reference attack sets precomputed.
pub struct SearchJob {
    pub square: u8,
    pub slider: Slider,
    pub mask: u64,
    /// Right-shift applied to the hash; the table holds `2^(64 - shift)`
    /// entries.
    pub shift: u32,
    /// Every subset of `mask`.
    occupancies: Vec<u64>,
    /// Ray-cast attack set per subset, index-aligned with `occupancies`.
    attacks: Vec<u64>,
    /// Scan order: subsets whose attack set is shared by many others
    /// first. Only those can collide benignly.
    order: Vec<u32>,
    /// Index into `order` past which every attack set is unique.
    checkpoint: usize,
    /// Benign collisions forced by the pigeonhole principle when there
    /// are more subsets than table slots. A candidate that has not
    /// produced this many by `checkpoint` can be rejected early.
    required_collisions: usize,
}

impl SearchJob {
    /// Precompute the subsets, reference attacks and scan order for one
    /// square. `extra_shift` tightens the table below the natural
    /// `64 - popcount(mask)` (0 reproduces the standard table size).
    pub fn prepare(square: u8, slider: Slider, extra_shift: u32) -> SearchJob {
        let mask = relevant_mask(square, slider);
        let natural = 64 - mask.count_ones();
        let shift = natural + extra_shift;

        let occupancies: Vec<u64> = all_subsets(mask).collect();
        let attacks: Vec<u64> = occupancies
            .iter()
            .map(|&occ| slow_attacks(square, slider, occ))
            .collect();

        // Group subsets by attack set so the shareable ones are scanned
        // first and the early-exit checkpoint is meaningful.
        let share_counts = attacks.iter().copied().counts();
        let order: Vec<u32> = (0..occupancies.len() as u32)
            .sorted_by_key(|&i| std::cmp::Reverse(share_counts[&attacks[i as usize]]))
            .collect();
        let checkpoint = order
            .iter()
            .position(|&i| share_counts[&attacks[i as usize]] == 1)
            .unwrap_or(order.len());

        let table_size = 1usize << (64 - shift);
        let required_collisions = occupancies.len().saturating_sub(table_size);

        SearchJob {
            square,
            slider,
            mask,
            shift,
            occupancies,
            attacks,
            order,
            checkpoint,
            required_collisions,
        }
    }

    pub fn subset_count(&self) -> usize {
        self.occupancies.len()
    }

    pub fn table_size(&self) -> usize {
        1usize << (64 - self.shift)
    }

    /// Distinct attack sets; if this exceeds the table size no magic can
    /// exist for the job.
    pub fn distinct_attacks(&self) -> usize {
        self.attacks.iter().unique().count()
    }
}

/// Worker-pool parameters for one search.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub threads: usize,
    /// Candidate budget per worker; workers stop on their own once spent.
    pub attempts_per_worker: u64,
    /// Wall-clock bound for the whole pool.
    pub timeout: Duration,
    pub seed: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            threads: 4,
            attempts_per_worker: 1_000_000,
            timeout: Duration::from_secs(10),
            seed: 0x5EED,
        }
    }
}

/// Candidate magics are sparse: AND-ing several independent draws biases
/// toward few set bits, which empirically hash better.
#[inline]
fn sparse_candidate(rng: &mut SmallRng) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

/// Race the worker pool on `job`. Returns the first collision-free magic
/// found, or `0` if every worker exhausted its budget or the timeout hit.
pub fn find_magic(job: &SearchJob, params: &SearchParams) -> u64 {
    let stop = AtomicBool::new(false);
    let found = AtomicU64::new(0);
    let deadline = Instant::now() + params.timeout;

    thread::scope(|scope| {
        let workers: Vec<_> = (0..params.threads.max(1))
            .map(|w| {
                let stop = &stop;
                let found = &found;
                scope.spawn(move || {
                    search_worker(
                        job,
                        params.seed.wrapping_add(w as u64),
                        params.attempts_per_worker,
                        stop,
                        found,
                    )
                })
            })
            .collect();

        // Coordinator: poll until the pool drains, force-stopping
        // everyone once the deadline passes or a result lands.
        loop {
            if workers.iter().all(|h| h.is_finished()) {
                break;
            }
            if found.load(Ordering::Acquire) != 0 || Instant::now() >= deadline {
                stop.store(true, Ordering::Release);
            }
            thread::sleep(POLL_INTERVAL);
        }
    });

    found.load(Ordering::Acquire)
}

fn search_worker(job: &SearchJob, seed: u64, budget: u64, stop: &AtomicBool, found: &AtomicU64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let size = job.table_size();

    // Slot table with generation stamps so it need not be cleared between
    // candidates.
    let mut slots = vec![0u64; size];
    let mut stamps = vec![0u64; size];
    let mut generation = 0u64;

    for _ in 0..budget {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let magic = sparse_candidate(&mut rng);
        // Candidates that park too few mask bits in the top byte collide
        // almost surely; skip them without scanning.
        if (job.mask.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }

        generation += 1;
        let mut benign = 0usize;
        let mut valid = true;

        for (scanned, &i) in job.order.iter().enumerate() {
            let occ = job.occupancies[i as usize];
            let attack = job.attacks[i as usize];
            let index = (occ.wrapping_mul(magic) >> job.shift) as usize;

            if stamps[index] != generation {
                stamps[index] = generation;
                slots[index] = attack;
            } else if slots[index] == attack {
                benign += 1;
            } else {
                valid = false;
                break;
            }

            // Past the checkpoint only unique attack sets remain, so the
            // benign-collision quota can no longer be met.
            if scanned + 1 == job.checkpoint && benign < job.required_collisions {
                valid = false;
                break;
            }
        }

        if valid {
            let _ = found.compare_exchange(0, magic, Ordering::AcqRel, Ordering::Relaxed);
            stop.store(true, Ordering::Release);
            return;
        }
    }
}

/// Re-validate a magic against a job, the simple way. Used by the search
/// tool before printing and by tests; the worker keeps its own faster
/// stamped scan.
pub fn validate_magic(job: &SearchJob, magic: u64) -> bool {
    if magic == 0 {
        return false;
    }
    let mut slots: Vec<Option<u64>> = vec![None; job.table_size()];
    for (i, &occ) in job.occupancies.iter().enumerate() {
        let index = (occ.wrapping_mul(magic) >> job.shift) as usize;
        match slots[index] {
            None => slots[index] = Some(job.attacks[i]),
            Some(existing) if existing == job.attacks[i] => {}
            Some(_) => return false,
        }
    }
    true
}
