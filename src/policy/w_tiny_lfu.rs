//! W-TinyLFU: windowed TinyLFU with an adaptive window.
//!
//! Composition of a small recency window (plain LRU) in front of an SLRU
//! main cache, with a door-keeper + Count-Min sketch deciding which window
//! victims deserve a main-cache slot.
//!
//! ```text
//!              ┌─ admit ──► [ window LRU ] ─victims─► admit_from_window
//!   request ──►│                                          │
//!              └─ first sighting: door-keeper only        ▼
//!                                            [ SLRU: probationary │ protected ]
//! ```
//!
//! A hill climber re-divides capacity between window and main every
//! `capacity` requests: if the running hit ratio improved, the window grows
//! a rung on the {0, 1, 5, 10, ..., 80} percent ladder and main-cache tail
//! objects migrate into the window; if it worsened, the window shrinks a
//! rung and window tails migrate back. The asymmetric low rungs are
//! deliberate: for small caches a 1% window behaves very differently from a
//! 5% one.

use crate::policy::lru::LruCache;
use crate::policy::slru::SlruCache;
use crate::traits::{Cache, Request, rejected_param};

/// The hill climber fires every `HILL_CLIMBER_FACTOR * capacity` requests.
const HILL_CLIMBER_FACTOR: u64 = 1;

const DEFAULT_WINDOW_PCT: u64 = 1;
const MAX_WINDOW_PCT: u64 = 80;

/// Windowed TinyLFU over a byte budget.
#[derive(Debug)]
pub struct WTinyLfuCache {
    window: LruCache,
    main: SlruCache,
    capacity: u64,
    window_pct: u64,
    total_requests: u64,
    total_hits: u64,
    prev_hit_ratio: f64,
    hill_climber: bool,
}

impl Default for WTinyLfuCache {
    fn default() -> Self {
        Self::new(LruCache::default().capacity())
    }
}

impl WTinyLfuCache {
    /// Creates a W-TinyLFU cache with the given total byte capacity and a
    /// 1% window.
    pub fn new(capacity: u64) -> Self {
        let mut cache = Self {
            window: LruCache::new(0),
            main: SlruCache::new(0),
            capacity,
            window_pct: DEFAULT_WINDOW_PCT,
            total_requests: 0,
            total_hits: 0,
            prev_hit_ratio: 0.0,
            hill_climber: true,
        };
        cache.apply_split();
        cache
    }

    /// Enables or disables the adaptive window (enabled by default).
    pub fn set_hill_climber(&mut self, enabled: bool) {
        self.hill_climber = enabled;
    }

    /// Returns the window's share of capacity in percent.
    pub fn window_pct(&self) -> u64 {
        self.window_pct
    }

    /// Returns the window's byte budget.
    pub fn window_capacity(&self) -> u64 {
        self.window.capacity()
    }

    /// Returns the main cache's byte budget.
    pub fn main_capacity(&self) -> u64 {
        self.main.capacity()
    }

    /// Returns `true` if an object with the id is resident in the window
    /// or the main cache.
    pub fn contains(&self, id: u64) -> bool {
        self.window.contains(id) || self.main.contains(id)
    }

    fn window_budget(&self) -> u64 {
        (self.capacity as f64 * self.window_pct as f64 / 100.0) as u64
    }

    fn main_budget(&self) -> u64 {
        (self.capacity as f64 * (1.0 - self.window_pct as f64 / 100.0)) as u64
    }

    /// Re-derives both sub-cache budgets and the sketches from the current
    /// window percentage.
    fn apply_split(&mut self) {
        self.main.set_capacity(self.main_budget());
        self.main.init_sketches(self.capacity);
        self.window.set_capacity(self.window_budget());
    }

    fn hill_climb(&mut self) {
        let interval = HILL_CLIMBER_FACTOR * self.capacity;
        if interval == 0 || self.total_requests % interval != 0 {
            return;
        }
        let hit_ratio = self.total_hits as f64 / self.total_requests as f64;

        if hit_ratio > self.prev_hit_ratio {
            self.window_pct = match self.window_pct {
                0 => 1,
                1 => 5,
                pct => (pct + 5).min(MAX_WINDOW_PCT),
            };
            self.prev_hit_ratio = hit_ratio;
            self.window.set_capacity(self.window_budget());
            self.increase_window();
        } else if hit_ratio < self.prev_hit_ratio {
            self.window_pct = match self.window_pct {
                0 => 0,
                1 => 0,
                5 => 1,
                pct => pct.saturating_sub(5),
            };
            self.prev_hit_ratio = hit_ratio;
            self.main.set_capacity(self.main_budget());
            self.increase_main_cache();
        }
    }

    /// Moves main-cache tail objects into the window until main fits its
    /// reduced budget, then records that budget.
    fn increase_window(&mut self) {
        while self.main_budget() < self.main.current_size() {
            let victim = if self.main.segment_current_size(0) == 0 {
                self.main.evict_return_from(1)
            } else {
                self.main.evict_return_from(0)
            };
            match victim {
                Some(victim) => self.window.admit(&victim),
                None => break,
            }
        }
        self.main.set_capacity(self.main_budget());
    }

    /// Moves window tail objects into the main cache until the window fits
    /// its reduced budget, then records that budget.
    fn increase_main_cache(&mut self) {
        while self.window_budget() < self.window.current_size() {
            let victim = match self.window.evict_return() {
                Some(victim) => victim,
                None => break,
            };
            if self.main.segment_current_size(0) >= self.main.segment_capacity(0) {
                self.main.segment_admit(1, &victim);
            } else {
                self.main.segment_admit(0, &victim);
            }
        }
        self.window.set_capacity(self.window_budget());
    }
}

impl Cache for WTinyLfuCache {
    fn lookup(&mut self, req: &Request) -> bool {
        self.total_requests += 1;
        if self.main.door_keeper_contains(req.id) {
            self.main.update_count_min(req.id);
        }
        let hit = self.window.lookup(req) || self.main.lookup(req);
        if hit {
            self.main.update_door_keeper(req.id);
            self.total_hits += 1;
        }
        if self.hill_climber {
            self.hill_climb();
        }
        hit
    }

    fn admit(&mut self, req: &Request) {
        if !self.main.door_keeper_contains(req.id) {
            // first appearance: only remember it
            self.main.update_door_keeper(req.id);
            return;
        }
        if self.window.capacity() == 0 {
            self.main.admit_from_window(req);
            return;
        }
        let victims = self.window.admit_with_return(req);
        for victim in &victims {
            self.main.admit_from_window(victim);
        }
    }

    fn evict(&mut self) {
        self.window.evict();
    }

    fn evict_request(&mut self, req: &Request) {
        self.window.evict_request(req);
        self.main.evict_request(req);
    }

    fn set_capacity(&mut self, bytes: u64) {
        self.capacity = bytes;
        self.apply_split();
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn current_size(&self) -> u64 {
        self.window.current_size() + self.main.current_size()
    }

    /// Trace drivers pass the window percentage under whatever parameter
    /// name they were configured with, so only the value is inspected.
    fn set_param(&mut self, _name: &str, value: &str) {
        match value.parse::<u64>() {
            Ok(pct) if pct <= 100 => {
                self.window_pct = pct;
                self.apply_split();
            },
            _ => rejected_param("window", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(cache: &mut WTinyLfuCache, req: &Request) {
        if !cache.lookup(req) {
            cache.admit(req);
        }
    }

    #[test]
    fn window_percentage_splits_the_budget() {
        let mut cache = WTinyLfuCache::new(100);
        cache.set_param("window", "10");
        assert_eq!(cache.window_capacity(), 10);
        assert_eq!(cache.main_capacity(), 90);
        assert_eq!(cache.window_pct(), 10);
    }

    #[test]
    fn first_sighting_only_marks_the_door_keeper() {
        // capacity 100, 10% window, X offered twice
        let mut cache = WTinyLfuCache::new(100);
        cache.set_param("window", "10");
        cache.set_hill_climber(false);

        let x = Request::new(1, 5);
        drive(&mut cache, &x);
        assert!(!cache.contains(1));

        drive(&mut cache, &x);
        assert!(cache.window.contains(1));
    }

    #[test]
    fn zero_window_admits_straight_to_main() {
        let mut cache = WTinyLfuCache::new(100);
        cache.set_param("window", "0");
        cache.set_hill_climber(false);
        assert_eq!(cache.window_capacity(), 0);

        let x = Request::new(1, 5);
        drive(&mut cache, &x);
        drive(&mut cache, &x);
        assert!(cache.main.contains(1));
    }

    #[test]
    fn window_overflow_offers_victims_to_main() {
        let mut cache = WTinyLfuCache::new(100);
        cache.set_param("window", "10");
        cache.set_hill_climber(false);

        // two 6-byte objects cannot share the 10-byte window
        let (a, b) = (Request::new(1, 6), Request::new(2, 6));
        drive(&mut cache, &a);
        drive(&mut cache, &a);
        assert!(cache.window.contains(1));

        drive(&mut cache, &b);
        drive(&mut cache, &b);
        assert!(cache.window.contains(2));
        // a was expelled from the window and accepted by main
        assert!(cache.main.contains(1));
    }

    #[test]
    fn ladder_stays_on_known_rungs() {
        let mut cache = WTinyLfuCache::new(50);
        cache.set_param("window", "0");

        let rungs: &[u64] = &[0, 1, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80];
        let mut id = 0u64;
        for step in 0..2_000u64 {
            // alternate hot phases and cold sweeps so the hit ratio moves
            let req = if step % 3 == 0 {
                Request::new(7, 1)
            } else {
                id += 1;
                Request::new(1000 + id, 1)
            };
            drive(&mut cache, &req);
            assert!(rungs.contains(&cache.window_pct()), "pct {}", cache.window_pct());
            assert!(cache.window.current_size() <= cache.window.capacity().max(cache.window_budget()));
        }
    }

    #[test]
    fn resizes_keep_sub_caches_within_their_budgets() {
        let mut cache = WTinyLfuCache::new(40);
        cache.set_param("window", "20");
        cache.set_hill_climber(false);

        // populate window and main
        for id in 0..20u64 {
            let req = Request::new(id, 2);
            drive(&mut cache, &req);
            drive(&mut cache, &req);
        }

        // grow the window a rung by hand and rebalance
        cache.window_pct = 25;
        cache.window.set_capacity(cache.window_budget());
        cache.increase_window();
        assert!(cache.main.current_size() <= cache.main.capacity());
        assert!(cache.window.current_size() <= cache.window.capacity());

        // now shrink it two rungs and rebalance the other way
        cache.window_pct = 15;
        cache.main.set_capacity(cache.main_budget());
        cache.increase_main_cache();
        assert!(cache.main.current_size() <= cache.main.capacity());
        assert!(cache.window.current_size() <= cache.window.capacity());
    }

    #[test]
    fn lookup_counts_requests_and_hits() {
        let mut cache = WTinyLfuCache::new(100);
        cache.set_param("window", "10");
        cache.set_hill_climber(false);

        let x = Request::new(1, 5);
        drive(&mut cache, &x);
        drive(&mut cache, &x);
        assert!(cache.lookup(&x));
        assert_eq!(cache.total_requests, 3);
        assert_eq!(cache.total_hits, 1);
    }
}
