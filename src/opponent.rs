//! Seat-filling opponents: the trait, the hunt/target AI and a relay
//! adapter that sources decisions from an external feed.

use std::collections::{HashSet, VecDeque};
use std::sync::mpsc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::FleetLayout;
use crate::config::Rules;
use crate::grid::Coord;

/// Anything that can occupy a seat without a human attached: it lays out a
/// fleet, names the next target and absorbs shot feedback.
pub trait Opponent: Send {
    /// Produce a complete fleet layout for the given rules.
    fn place_ships(&mut self, rules: &Rules) -> FleetLayout;

    /// Choose the next cell to fire at. Never repeats a coordinate within
    /// one match.
    fn calculate_next_shot(&mut self) -> Coord;

    /// Feedback for the most recent shot; `hit` covers sinking hits too.
    fn process_last_shot_result(&mut self, hit: bool);
}

/// Hunt-then-target AI. Hunts on a checkerboard parity until something is
/// hit, then works through the hit's orthogonal neighbors until the trail
/// goes cold.
pub struct AiOpponent {
    width: u8,
    height: u8,
    rng: SmallRng,
    targeted: HashSet<Coord>,
    follow_ups: VecDeque<Coord>,
    last_shot: Option<Coord>,
}

impl AiOpponent {
    pub fn new(rules: &Rules) -> Self {
        Self::with_rng(rules, SmallRng::from_rng(&mut rand::rng()))
    }

    /// Deterministic variant for replayable matches.
    pub fn seeded(rules: &Rules, seed: u64) -> Self {
        Self::with_rng(rules, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rules: &Rules, rng: SmallRng) -> Self {
        Self {
            width: rules.width,
            height: rules.height,
            rng,
            targeted: HashSet::new(),
            follow_ups: VecDeque::new(),
            last_shot: None,
        }
    }

    fn untargeted(&self) -> Vec<Coord> {
        let mut pool = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let coord = Coord::new(row, col);
                if !self.targeted.contains(&coord) {
                    pool.push(coord);
                }
            }
        }
        pool
    }

    fn hunt(&mut self) -> Coord {
        let pool = self.untargeted();
        // every ship spans two parity classes, so hunting one class still
        // finds every ship of length >= 2
        let parity: Vec<Coord> = pool
            .iter()
            .copied()
            .filter(|c| (c.row as usize + c.col as usize) % 2 == 0)
            .collect();
        let candidates = if parity.is_empty() { pool } else { parity };
        if candidates.is_empty() {
            // the grid is spent, which no match survives; saturate on the
            // final shot
            return self.last_shot.unwrap_or(Coord::new(0, 0));
        }
        candidates[self.rng.random_range(0..candidates.len())]
    }

    fn push_neighbors(&mut self, coord: Coord) {
        let mut neighbors = Vec::with_capacity(4);
        if let Some(row) = coord.row.checked_sub(1) {
            neighbors.push(Coord::new(row, coord.col));
        }
        if coord.row + 1 < self.height {
            neighbors.push(Coord::new(coord.row + 1, coord.col));
        }
        if let Some(col) = coord.col.checked_sub(1) {
            neighbors.push(Coord::new(coord.row, col));
        }
        if coord.col + 1 < self.width {
            neighbors.push(Coord::new(coord.row, coord.col + 1));
        }
        for n in neighbors {
            if !self.targeted.contains(&n) && !self.follow_ups.contains(&n) {
                self.follow_ups.push_back(n);
            }
        }
    }
}

impl Opponent for AiOpponent {
    fn place_ships(&mut self, rules: &Rules) -> FleetLayout {
        FleetLayout::random(rules, &mut self.rng)
    }

    fn calculate_next_shot(&mut self) -> Coord {
        let coord = loop {
            match self.follow_ups.pop_front() {
                // queued neighbors may have been consumed since queueing
                Some(c) if self.targeted.contains(&c) => continue,
                Some(c) => break c,
                None => break self.hunt(),
            }
        };
        self.targeted.insert(coord);
        self.last_shot = Some(coord);
        coord
    }

    fn process_last_shot_result(&mut self, hit: bool) {
        if !hit {
            return;
        }
        if let Some(coord) = self.last_shot {
            self.push_neighbors(coord);
        }
    }
}

/// Feeder side of a [`RelayOpponent`]: whatever drives the seat from
/// outside (another process, a test script) queues decisions here and
/// reads shot feedback back out.
pub struct RelayHandle {
    pub layouts: mpsc::Sender<FleetLayout>,
    pub shots: mpsc::Sender<Coord>,
    pub results: mpsc::Receiver<bool>,
}

/// Fills a seat with decisions relayed from an external source, so a
/// remote human satisfies the same contract as the AI. Each trait call
/// blocks until the feed has an answer queued, so answers must come from
/// outside the session that is asking.
pub struct RelayOpponent {
    layouts: mpsc::Receiver<FleetLayout>,
    shots: mpsc::Receiver<Coord>,
    results: mpsc::Sender<bool>,
}

impl RelayOpponent {
    pub fn channel() -> (RelayOpponent, RelayHandle) {
        let (layout_tx, layout_rx) = mpsc::channel();
        let (shot_tx, shot_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();
        let opponent = RelayOpponent {
            layouts: layout_rx,
            shots: shot_rx,
            results: result_tx,
        };
        let handle = RelayHandle {
            layouts: layout_tx,
            shots: shot_tx,
            results: result_rx,
        };
        (opponent, handle)
    }
}

impl Opponent for RelayOpponent {
    fn place_ships(&mut self, _rules: &Rules) -> FleetLayout {
        // a hung-up feed yields the empty layout, which the placement
        // validator rejects upstream
        self.layouts.recv().unwrap_or_default()
    }

    fn calculate_next_shot(&mut self) -> Coord {
        self.shots.recv().unwrap_or_else(|_| Coord::new(0, 0))
    }

    fn process_last_shot_result(&mut self, hit: bool) {
        // the feed may have hung up; feedback is then dropped
        let _ = self.results.send(hit);
    }
}
