//! Opt-in statistics counters.
//!
//! Enabled with the `stats` feature. Each worker thread writes to its own
//! counter set; aggregation happens on the reader side. With the feature
//! disabled every hook is an empty inline function and compiles out.

#[cfg(feature = "stats")]
pub use enabled::*;

#[cfg(not(feature = "stats"))]
pub use disabled::*;

/// Timestamp type threaded through the hooks. `None` when stats are off.
pub type FilterTimer = Option<std::time::Instant>;

#[cfg(feature = "stats")]
mod enabled {
    use super::FilterTimer;
    use std::cell::RefCell;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Counters gathered by one worker thread.
    #[derive(Clone, Default, Debug)]
    pub struct StatsCounters {
        pub ray_casts: u64,
        pub ray_cast_hits: u64,
        pub shadow_ray_casts: u64,
        pub ray_cast_time: Duration,
        pub ray_nodes_visited: u64,

        pub cone_casts: u64,
        pub cone_cast_hits: u64,
        pub shadow_cone_casts: u64,
        pub cone_cast_time: Duration,
        pub cone_internal_nodes: u64,
        pub cone_leaf_nodes: u64,

        pub ray_aabb_8w_tests: u64,

        pub bitmap_filters: u64,
        pub bitmap_filter_taps: u64,
        pub bitmap_filter_time: Duration,
    }

    impl StatsCounters {
        fn merge(&mut self, o: &StatsCounters) {
            self.ray_casts += o.ray_casts;
            self.ray_cast_hits += o.ray_cast_hits;
            self.shadow_ray_casts += o.shadow_ray_casts;
            self.ray_cast_time += o.ray_cast_time;
            self.ray_nodes_visited += o.ray_nodes_visited;
            self.cone_casts += o.cone_casts;
            self.cone_cast_hits += o.cone_cast_hits;
            self.shadow_cone_casts += o.shadow_cone_casts;
            self.cone_cast_time += o.cone_cast_time;
            self.cone_internal_nodes += o.cone_internal_nodes;
            self.cone_leaf_nodes += o.cone_leaf_nodes;
            self.ray_aabb_8w_tests += o.ray_aabb_8w_tests;
            self.bitmap_filters += o.bitmap_filters;
            self.bitmap_filter_taps += o.bitmap_filter_taps;
            self.bitmap_filter_time += o.bitmap_filter_time;
        }
    }

    thread_local! {
        static LOCAL: RefCell<StatsCounters> = RefCell::new(StatsCounters::default());
    }

    static AGGREGATED: Mutex<Option<StatsCounters>> = Mutex::new(None);

    /// Folds this thread's counters into the global aggregate and resets
    /// them. Workers call this when a job batch completes.
    pub fn flush_thread_counters() {
        LOCAL.with(|l| {
            let mut c = l.borrow_mut();
            let mut agg = AGGREGATED.lock().unwrap();
            agg.get_or_insert_with(StatsCounters::default).merge(&c);
            *c = StatsCounters::default();
        });
    }

    /// Reader-side aggregate across all flushed workers.
    pub fn aggregate() -> StatsCounters {
        AGGREGATED.lock().unwrap().clone().unwrap_or_default()
    }

    /// Clears the global aggregate.
    pub fn reset() {
        *AGGREGATED.lock().unwrap() = None;
    }

    #[inline]
    pub fn filter_timer_start() -> FilterTimer {
        Some(Instant::now())
    }

    #[inline]
    pub fn on_bitmap_filter(taps: u32, start: FilterTimer) {
        LOCAL.with(|l| {
            let mut c = l.borrow_mut();
            c.bitmap_filters += 1;
            c.bitmap_filter_taps += taps as u64;
            if let Some(s) = start {
                c.bitmap_filter_time += s.elapsed();
            }
        });
    }

    #[inline]
    pub fn on_ray_cast(hit: bool, shadow: bool, start: FilterTimer, nodes: u32) {
        LOCAL.with(|l| {
            let mut c = l.borrow_mut();
            c.ray_casts += 1;
            if hit {
                c.ray_cast_hits += 1;
            }
            if shadow {
                c.shadow_ray_casts += 1;
            }
            c.ray_nodes_visited += nodes as u64;
            if let Some(s) = start {
                c.ray_cast_time += s.elapsed();
            }
        });
    }

    #[inline]
    pub fn on_cone_cast(hit: bool, start: FilterTimer, internal: u32, leaf: u32) {
        LOCAL.with(|l| {
            let mut c = l.borrow_mut();
            c.cone_casts += 1;
            if hit {
                c.cone_cast_hits += 1;
            }
            c.cone_internal_nodes += internal as u64;
            c.cone_leaf_nodes += leaf as u64;
            if let Some(s) = start {
                c.cone_cast_time += s.elapsed();
            }
        });
    }

    #[inline]
    pub fn on_shadow_cone_cast(hit: bool, start: FilterTimer, internal: u32, leaf: u32) {
        LOCAL.with(|l| {
            let mut c = l.borrow_mut();
            c.shadow_cone_casts += 1;
            if hit {
                c.cone_cast_hits += 1;
            }
            c.cone_internal_nodes += internal as u64;
            c.cone_leaf_nodes += leaf as u64;
            if let Some(s) = start {
                c.cone_cast_time += s.elapsed();
            }
        });
    }

    #[inline]
    pub fn on_ray_aabb_8w_test() {
        LOCAL.with(|l| l.borrow_mut().ray_aabb_8w_tests += 1);
    }
}

#[cfg(not(feature = "stats"))]
mod disabled {
    use super::FilterTimer;

    #[inline(always)]
    pub fn filter_timer_start() -> FilterTimer {
        None
    }

    #[inline(always)]
    pub fn on_bitmap_filter(_taps: u32, _start: FilterTimer) {}

    #[inline(always)]
    pub fn on_ray_cast(_hit: bool, _shadow: bool, _start: FilterTimer, _nodes: u32) {}

    #[inline(always)]
    pub fn on_cone_cast(_hit: bool, _start: FilterTimer, _internal: u32, _leaf: u32) {}

    #[inline(always)]
    pub fn on_shadow_cone_cast(_hit: bool, _start: FilterTimer, _internal: u32, _leaf: u32) {}

    #[inline(always)]
    pub fn on_ray_aabb_8w_test() {}

    #[inline(always)]
    pub fn flush_thread_counters() {}
}
