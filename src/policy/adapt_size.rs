//! AdaptSize: self-tuning size-aware cache admission.
//!
//! An LRU whose admission probability is `exp(-size / c)`, with `c` retuned
//! periodically from observed traffic. The tuner models the expected hit
//! ratio as a function of `c` under Poisson arrivals with size-biased
//! admission, then golden-section searches `log2(c)` for the maximum.
//!
//! ## Tuning pipeline
//!
//! ```text
//!   per lookup              every `t` requests
//!   ───────────             ─────────────────────────────────────────
//!   interval stats   ──►    EWMA fold into long-term stats
//!   (id → count,size)       prune request_count < 0.1
//!                           rebuild aligned arrays (count, size, prob)
//!                           coarse scan log2c = 2, 6, 10, ...
//!                           golden-section search on [0, log2(capacity)]
//!                           c ← 2^argmax of the model
//! ```
//!
//! The model keeps three numerical guards the search relies on: counters
//! saturate the per-object hit probability once `count · T > 150`, the
//! characteristic-time fixed point stops after exactly ten iterations (or
//! when `T` overflows 1e70), and the closed-form hit ratio is clamped to
//! `[0, 1]`. A NaN anywhere aborts the search and leaves `c` untouched.
//!
//! Reconfiguration waits until enough distinct bytes have been observed
//! (`stat_size > 3 · capacity`), postponing in 10_000-request steps.

use std::collections::hash_map::Entry;

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::policy::lru::LruCache;
use crate::rng;
use crate::traits::{Cache, Request, rejected_param, unrecognized_param};

const DEFAULT_C_PARAM: f64 = (1u64 << 15) as f64;
const DEFAULT_RECONFIGURATION_INTERVAL: u64 = 500_000;
const DEFAULT_MAX_ITERATIONS: u64 = 15;
const POSTPONE_INTERVAL: i64 = 10_000;

/// EWMA smoothing factor for folding interval stats into long-term stats.
const EWMA_DECAY: f64 = 0.3;

/// Golden ratio conjugate and its complement, per Numerical Recipes.
const GSS_R: f64 = 0.618_033_988_749_895;
const GSS_V: f64 = 1.0 - GSS_R;

/// Bracket tolerance for terminating the golden-section search.
const TOL: f64 = 1e-4;

#[derive(Debug, Clone, Copy)]
struct ObjectStats {
    request_count: f64,
    obj_size: u64,
}

/// Size-aware LRU with a periodically retuned admission parameter.
#[derive(Debug)]
pub struct AdaptSizeCache {
    inner: LruCache,
    c_param: f64,
    /// Approximate byte sum of every object ever observed and not pruned.
    stat_size: u64,
    max_iterations: u64,
    reconfiguration_interval: u64,
    next_reconfiguration: i64,
    interval_stats: FxHashMap<u64, ObjectStats>,
    long_term_stats: FxHashMap<u64, ObjectStats>,
    aligned_req_count: Vec<f64>,
    aligned_obj_size: Vec<f64>,
    aligned_adm_prob: Vec<f64>,
}

impl Default for AdaptSizeCache {
    fn default() -> Self {
        Self::new(LruCache::default().capacity())
    }
}

impl AdaptSizeCache {
    /// Creates an AdaptSize cache with the given byte capacity.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: LruCache::new(capacity),
            c_param: DEFAULT_C_PARAM,
            stat_size: 0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            reconfiguration_interval: DEFAULT_RECONFIGURATION_INTERVAL,
            next_reconfiguration: DEFAULT_RECONFIGURATION_INTERVAL as i64,
            interval_stats: FxHashMap::default(),
            long_term_stats: FxHashMap::default(),
            aligned_req_count: Vec::new(),
            aligned_obj_size: Vec::new(),
            aligned_adm_prob: Vec::new(),
        }
    }

    /// Returns the current admission scale `c`.
    pub fn c_param(&self) -> f64 {
        self.c_param
    }

    /// Returns `true` if an object with the id is resident.
    pub fn contains(&self, id: u64) -> bool {
        self.inner.contains(id)
    }

    fn reconfigure(&mut self) {
        self.next_reconfiguration -= 1;
        if self.next_reconfiguration > 0 {
            return;
        }
        if self.stat_size <= self.inner.capacity().saturating_mul(3) {
            // not enough data gathered yet
            self.next_reconfiguration += POSTPONE_INTERVAL;
            return;
        }
        self.next_reconfiguration = self.reconfiguration_interval as i64;

        // smooth long-term stats, then fold the finished interval in
        for stats in self.long_term_stats.values_mut() {
            stats.request_count *= EWMA_DECAY;
        }
        for (id, interval) in self.interval_stats.drain() {
            match self.long_term_stats.entry(id) {
                Entry::Occupied(mut occupied) => {
                    let stats = occupied.get_mut();
                    stats.request_count += (1.0 - EWMA_DECAY) * interval.request_count;
                    stats.obj_size = interval.obj_size;
                },
                Entry::Vacant(vacant) => {
                    vacant.insert(interval);
                },
            }
        }

        // copy stats into aligned arrays, pruning entries too cold to matter
        self.aligned_req_count.clear();
        self.aligned_obj_size.clear();
        let mut stat_size = self.stat_size;
        let mut total_obj_size = 0u64;
        let aligned_req_count = &mut self.aligned_req_count;
        let aligned_obj_size = &mut self.aligned_obj_size;
        self.long_term_stats.retain(|_, stats| {
            if stats.request_count < 0.1 {
                stat_size = stat_size.saturating_sub(stats.obj_size);
                false
            } else {
                aligned_req_count.push(stats.request_count);
                aligned_obj_size.push(stats.obj_size as f64);
                total_obj_size += stats.obj_size;
                true
            }
        });
        self.stat_size = stat_size;

        tracing::debug!(
            objects = self.long_term_stats.len(),
            log2_total_size = (total_obj_size as f64).log2(),
            log2_stat_size = (self.stat_size as f64).log2(),
            "reconfiguring admission parameter"
        );

        // search for the best parameter on the log2 scale of c, bracketed
        // |x0 -- x1 -- x2 -- x3|
        let mut x0 = 0.0f64;
        let mut x1 = (self.inner.capacity() as f64).log2();
        let mut x2 = x1;
        let mut x3 = x1;

        // coarse grid scan to seed x1
        let mut best_hit_rate = 0.0f64;
        let mut probe = 2u64;
        while (probe as f64) < x3 {
            let hit_rate = self.model_hit_rate(probe as f64);
            if hit_rate > best_hit_rate {
                best_hit_rate = hit_rate;
                x1 = probe as f64;
            }
            probe += 4;
        }

        // refine into the larger bracket half
        let mut h1 = best_hit_rate;
        let mut h2;
        if x3 - x1 > x1 - x0 {
            x2 = x1 + GSS_V * (x3 - x1);
            h2 = self.model_hit_rate(x2);
        } else {
            x2 = x1;
            h2 = h1;
            x1 = x0 + GSS_V * (x1 - x0);
            h1 = self.model_hit_rate(x1);
        }

        // termination condition from Numerical Recipes
        let mut iterations = 0u64;
        while iterations < self.max_iterations && (x3 - x0).abs() > TOL * (x1.abs() + x2.abs()) {
            iterations += 1;
            if h1.is_nan() || h2.is_nan() {
                break;
            }
            if h2 > h1 {
                x0 = x1;
                x1 = x2;
                x2 = GSS_R * x1 + GSS_V * x3;
                h1 = h2;
                h2 = self.model_hit_rate(x2);
            } else {
                x3 = x2;
                x2 = x1;
                x1 = GSS_R * x2 + GSS_V * x0;
                h2 = h1;
                h1 = self.model_hit_rate(x1);
            }
        }

        if h1.is_nan() || h2.is_nan() {
            tracing::warn!(h1, h2, "numerical failure in hit-rate model, keeping parameter");
        } else if h1 > h2 {
            self.c_param = f64::powf(2.0, x1);
            tracing::debug!(c = self.c_param, log2c = x1, "chose admission parameter");
        } else {
            self.c_param = f64::powf(2.0, x2);
            tracing::debug!(c = self.c_param, log2c = x2, "chose admission parameter");
        }
    }

    /// Models the expected hit ratio for admission scale `2^log2c` over the
    /// aligned long-term stats.
    fn model_hit_rate(&mut self, log2c: f64) -> f64 {
        let c = f64::powf(2.0, log2c);
        let capacity = self.inner.capacity() as f64;

        let mut sum_val = 0.0;
        for i in 0..self.aligned_req_count.len() {
            sum_val += self.aligned_req_count[i]
                * f64::exp(-self.aligned_obj_size[i] / c)
                * self.aligned_obj_size[i];
        }
        if sum_val <= 0.0 {
            return 0.0;
        }
        let mut the_t = capacity / sum_val;

        self.aligned_adm_prob.clear();
        for i in 0..self.aligned_req_count.len() {
            self.aligned_adm_prob
                .push(f64::exp(-self.aligned_obj_size[i] / c));
        }

        // fixed-point iteration for the characteristic time T
        for _ in 0..10 {
            if the_t > 1e70 {
                break;
            }
            let mut the_c = 0.0;
            for i in 0..self.aligned_req_count.len() {
                let req_t_prod = self.aligned_req_count[i] * the_t;
                if req_t_prod > 150.0 {
                    // hit probability is 1, but numerically unstable to compute
                    the_c += self.aligned_obj_size[i];
                } else {
                    let exp_term = f64::exp(req_t_prod) - 1.0;
                    let exp_adm_prod = self.aligned_adm_prob[i] * exp_term;
                    the_c += self.aligned_obj_size[i] * (exp_adm_prod / (1.0 + exp_adm_prod));
                }
            }
            the_t = capacity * the_t / the_c;
        }

        let mut weighted_hit_ratio_sum = 0.0;
        for i in 0..self.aligned_req_count.len() {
            let p1 = o_p1(the_t, self.aligned_req_count[i], self.aligned_adm_prob[i]);
            let p2 = o_p2(the_t, self.aligned_req_count[i], self.aligned_adm_prob[i]);
            let mut ratio = if p1 != 0.0 && p2 == 0.0 { 0.0 } else { p1 / p2 };
            if ratio < 0.0 {
                ratio = 0.0;
            } else if ratio > 1.0 {
                ratio = 1.0;
            }
            weighted_hit_ratio_sum += self.aligned_req_count[i] * ratio;
        }
        weighted_hit_ratio_sum
    }
}

/// Numerator of the closed-form per-object hit probability (fourth-order
/// Taylor approximation under Poisson arrivals).
fn o_p1(t: f64, l: f64, p: f64) -> f64 {
    l * p * t * (840.0 + 60.0 * l * t + 20.0 * l * l * t * t + l * l * l * t * t * t)
}

/// Denominator of the closed-form per-object hit probability.
fn o_p2(t: f64, l: f64, p: f64) -> f64 {
    840.0 + 120.0 * l * (-3.0 + 7.0 * p) * t
        + 60.0 * l * l * (1.0 + p) * t * t
        + 4.0 * l * l * l * (-1.0 + 5.0 * p) * t * t * t
        + l * l * l * l * p * t * t * t * t
}

impl Cache for AdaptSizeCache {
    fn lookup(&mut self, req: &Request) -> bool {
        self.reconfigure();

        if !self.interval_stats.contains_key(&req.id)
            && !self.long_term_stats.contains_key(&req.id)
        {
            // first sighting of this object
            self.stat_size += req.size;
        }
        let stats = self.interval_stats.entry(req.id).or_insert(ObjectStats {
            request_count: 0.0,
            obj_size: req.size,
        });
        stats.request_count += 1.0;
        stats.obj_size = req.size;

        self.inner.lookup(req)
    }

    fn admit(&mut self, req: &Request) {
        let roll: f64 = rng::with(|r| r.gen());
        let admit_prob = f64::exp(-(req.size as f64) / self.c_param);
        if roll < admit_prob {
            self.inner.admit(req);
        }
    }

    fn evict(&mut self) {
        self.inner.evict();
    }

    fn evict_request(&mut self, req: &Request) {
        self.inner.evict_request(req);
    }

    fn set_capacity(&mut self, bytes: u64) {
        self.inner.set_capacity(bytes);
    }

    fn capacity(&self) -> u64 {
        self.inner.capacity()
    }

    fn current_size(&self) -> u64 {
        self.inner.current_size()
    }

    fn set_param(&mut self, name: &str, value: &str) {
        match name {
            "t" => match value.parse::<u64>() {
                Ok(t) if t > 1 => self.reconfiguration_interval = t,
                _ => rejected_param(name, value),
            },
            "i" => match value.parse::<u64>() {
                Ok(i) if i > 1 => self.max_iterations = i,
                _ => rejected_param(name, value),
            },
            _ => unrecognized_param(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng;

    #[test]
    fn defaults() {
        let cache = AdaptSizeCache::new(1000);
        assert_eq!(cache.c_param(), 32768.0);
        assert_eq!(cache.reconfiguration_interval, 500_000);
        assert_eq!(cache.max_iterations, 15);
    }

    #[test]
    fn parameters_are_validated() {
        let mut cache = AdaptSizeCache::new(1000);
        cache.set_param("t", "1");
        cache.set_param("i", "0");
        cache.set_param("x", "5");
        assert_eq!(cache.reconfiguration_interval, 500_000);
        assert_eq!(cache.max_iterations, 15);

        cache.set_param("t", "20000");
        cache.set_param("i", "25");
        assert_eq!(cache.reconfiguration_interval, 20_000);
        assert_eq!(cache.max_iterations, 25);
    }

    #[test]
    fn lookup_records_stats() {
        let mut cache = AdaptSizeCache::new(1_000_000);
        let a = Request::new(1, 100);
        cache.lookup(&a);
        cache.lookup(&a);
        cache.lookup(&Request::new(2, 50));

        assert_eq!(cache.stat_size, 150);
        assert_eq!(cache.interval_stats[&1].request_count, 2.0);
        assert_eq!(cache.interval_stats[&2].request_count, 1.0);
    }

    #[test]
    fn tiny_objects_are_admitted_with_near_certainty() {
        rng::reseed(5);
        let mut cache = AdaptSizeCache::new(1_000_000);
        for id in 0..100u64 {
            cache.admit(&Request::new(id, 1));
        }
        assert!(cache.current_size() >= 99);
    }

    #[test]
    fn huge_objects_are_almost_never_admitted() {
        rng::reseed(5);
        let mut cache = AdaptSizeCache::new(u64::MAX / 2);
        // exp(-1_000_000/32768) ≈ 5e-14
        for id in 0..100u64 {
            cache.admit(&Request::new(id, 1_000_000));
        }
        assert_eq!(cache.current_size(), 0);
    }

    #[test]
    fn model_returns_zero_without_stats() {
        let mut cache = AdaptSizeCache::new(1000);
        assert_eq!(cache.model_hit_rate(5.0), 0.0);
    }

    #[test]
    fn model_prefers_generous_admission_for_uniform_objects() {
        let mut cache = AdaptSizeCache::new(1000);
        for _ in 0..200 {
            cache.aligned_req_count.push(2.5);
            cache.aligned_obj_size.push(50.0);
        }
        let restrictive = cache.model_hit_rate(2.0);
        let generous = cache.model_hit_rate(9.0);
        assert!(generous > restrictive);
    }

    #[test]
    fn reconfiguration_postpones_without_enough_data() {
        let mut cache = AdaptSizeCache::new(1_000_000);
        cache.next_reconfiguration = 1;
        cache.lookup(&Request::new(1, 10));
        // stat_size (10) <= 3 * capacity: postponed, parameter untouched
        assert_eq!(cache.next_reconfiguration, POSTPONE_INTERVAL);
        assert_eq!(cache.c_param(), 32768.0);
    }

    #[test]
    fn tuned_parameter_stays_in_range_and_converges() {
        rng::reseed(23);
        let mut cache = AdaptSizeCache::new(1000);
        cache.set_param("t", "1000");

        // uniform-size traffic over 200 objects. The first tuning window is
        // the constructor default (500_000), later windows the configured
        // interval, so reconfigurations land at fixed request counts.
        let run = |cache: &mut AdaptSizeCache, requests: u64, from: u64| {
            for i in 0..requests {
                let req = Request::new((from + i) % 200, 50);
                if !cache.lookup(&req) {
                    cache.admit(&req);
                }
            }
        };

        run(&mut cache, 500_000, 0);
        for round in 0..3u64 {
            run(&mut cache, 1_000, round);
            let prob = f64::exp(-50.0 / cache.c_param());
            assert!(cache.c_param() >= 1.0);
            assert!(cache.c_param() <= 1000.0 + 1e-6);
            assert!(prob > 0.1 && prob < 0.99, "prob {prob} in round {round}");
        }
    }
}
