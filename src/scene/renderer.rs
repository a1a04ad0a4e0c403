//! The render scheduler.
//!
//! Partitions each sensor's film into blocks, dispatches block jobs to the
//! worker pool, integrates adaptively to the requested sample budget,
//! honours pause/resume/terminate/capture interrupts, and develops final
//! and partial films.

use super::{
    CaptureCallback, DevelopedFilms, DevelopedPolarimetricFilmPair, DevelopedScalarFilmPair,
    Interrupt, RenderResult, Scene, SensorRenderResult,
};
use crate::ads::Bvh8w;
use crate::integrator::{IntegratorContext, IntegratorOpts};
use crate::math::Float;
use crate::sampler::UniformSampler;
use crate::sensor::{
    BlockHandle, DevelopedPolarimetricFilm, DevelopedScalarFilm, FilmStorage, Sensor, Tonemap,
};
use crate::util::{JobHandle, ThreadPool};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Renderer tuning knobs and the worker pool.
pub struct Context {
    pub thread_pool: Arc<ThreadPool>,
    /// Edge length of the film blocks.
    pub renderer_block_size: u32,
    /// Samples per element integrated per block job.
    pub renderer_samples_per_block: u32,
    /// Scheduler condvar timeout while paused.
    pub paused_wait: Duration,
    /// Scheduler condvar timeout while rendering.
    pub active_wait: Duration,
    /// Options forwarded to integrators.
    pub integrator_opts: IntegratorOpts,
}

impl Context {
    pub fn new(thread_pool: Arc<ThreadPool>) -> Self {
        Self {
            thread_pool,
            renderer_block_size: 32,
            renderer_samples_per_block: 16,
            paused_wait: Duration::from_millis(1),
            active_wait: Duration::from_micros(50),
            integrator_opts: IntegratorOpts::default(),
        }
    }
}

/// Progress callbacks invoked from the scheduler thread.
pub struct ProgressCallbacks {
    /// Per-sensor progress in `[0, 1]`.
    pub progress_update: Box<dyn Fn(&str, Float) + Send>,
    /// Fired when a sensor completes, with total elapsed time.
    pub on_complete: Box<dyn Fn(&str, Duration) + Send>,
    /// Fired for sensors left incomplete on termination.
    pub on_terminate: Box<dyn Fn(&str) + Send>,
}

/// Receives lossy preview snapshots during rendering.
pub trait PreviewInterface: Send + Sync {
    fn update_scalar(
        &self,
        sensor_id: &str,
        film: &DevelopedScalarFilm<2>,
        fractional_spe: Float,
        tonemap: Option<&Tonemap>,
    );

    fn update_polarimetric(
        &self,
        sensor_id: &str,
        film: &DevelopedPolarimetricFilm<2>,
        fractional_spe: Float,
        tonemap: Option<&Tonemap>,
    );
}

/// Scene renderer options.
#[derive(Default)]
pub struct RenderOpts {
    pub progress_callback: Option<ProgressCallbacks>,
    pub previewer: Option<Arc<dyn PreviewInterface>>,
}

/// Terminal and transient scheduler states.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RenderingState {
    CompletedSuccessfully,
    Terminated,
    Rendering,
    Pausing,
    Paused,
}

/// A point-in-time description of the rendering. Thread safe; may be
/// slightly stale.
#[derive(Copy, Clone, Debug)]
pub struct RenderingStatus {
    pub state: RenderingState,
    pub elapsed_rendering_time: Duration,
    pub total_jobs: usize,
    pub completed_jobs: usize,
    pub jobs_in_flight: usize,
}

impl RenderingStatus {
    pub fn progress(&self) -> Float {
        if self.total_jobs > 0 {
            self.completed_jobs as Float / self.total_jobs as Float
        } else {
            0.0
        }
    }

    pub fn estimated_remaining_rendering_time(&self) -> Duration {
        let p = self.progress();
        if p <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.elapsed_rendering_time.as_secs_f64() * (1.0 - p as f64) / p as f64)
    }
}

// multiplicative factor of desired parallelism for enqueueing jobs
const PARALLEL_JOBS_FACTOR: Float = 1.5;

struct CompletionSignal {
    m: Mutex<()>,
    cv: Condvar,
}

impl CompletionSignal {
    fn new() -> Self {
        Self {
            m: Mutex::new(()),
            cv: Condvar::new(),
        }
    }

    fn notify(&self) {
        self.cv.notify_one();
    }

    fn wait_timeout(&self, d: Duration) {
        let guard = self.m.lock().unwrap();
        let _ = self.cv.wait_timeout(guard, d).unwrap();
    }
}

struct SchedulerState {
    paused: bool,
    saved_paused_state: bool,
    terminated: bool,
    completed: bool,

    total_jobs: usize,
    jobs_enqueued: usize,
    jobs_completed: usize,

    start_time: Instant,
    last_checkpoint: Instant,
    elapsed_till_last_checkpoint: Duration,

    pending_captures: Vec<CaptureCallback>,
}

impl SchedulerState {
    fn elapsed_time(&self) -> Duration {
        let mut ret = self.elapsed_till_last_checkpoint;
        if !self.paused && !self.completed && !self.terminated {
            ret += self.last_checkpoint.elapsed();
        }
        ret
    }

    // advances the elapsed-time accounting; a checkpoint taken while
    // transitioning out of a pause does not accumulate the paused interval
    fn checkpoint(&mut self, was_paused: bool) {
        let now = Instant::now();
        if !was_paused {
            self.elapsed_till_last_checkpoint += now - self.last_checkpoint;
        }
        self.last_checkpoint = now;
    }
}

// per-sensor rendering context
struct RenderContext {
    sensor: Arc<Sensor>,
    film: Arc<FilmStorage>,
    ictx: Arc<IntegratorContext>,

    total_jobs: usize,
    enqueued_jobs: usize,
    jobs_completed: usize,

    samples_per_block: u32,
    samples_per_element: u32,

    futures: Vec<JobHandle<BlockHandle>>,
    failed: bool,
    sensor_index: usize,
}

impl RenderContext {
    fn enqueue_next(&mut self, scene: &Arc<Scene>, pool: &ThreadPool, signal: &Arc<CompletionSignal>) {
        let blocks = self.sensor.total_sensor_blocks();
        let enqueued_samples = (self.enqueued_jobs / blocks) as u32 * self.samples_per_block;
        let spb = self
            .samples_per_block
            .min(self.samples_per_element - enqueued_samples);

        let mut block = self
            .sensor
            .acquire_sensor_block(&self.film, self.enqueued_jobs % blocks);

        // deterministic per-job sampler seed: interrupt timing cannot
        // perturb the integrated result
        let seed = (self.sensor_index as u64) << 40 ^ self.enqueued_jobs as u64;

        let integrator = scene.integrator().clone();
        let ictx = self.ictx.clone();
        let signal = signal.clone();
        let f = pool.enqueue(move || {
            let mut sampler = UniformSampler::new(seed);
            for y in 0..block.size.1 {
                for x in 0..block.size.0 {
                    let pos = (block.position.0 + x, block.position.1 + y);
                    integrator.integrate(&ictx, &mut block, pos, spb, &mut sampler);
                }
            }
            block.spe = spb;
            crate::stats::flush_thread_counters();
            signal.notify();
            block
        });

        self.futures.push(f);
        self.enqueued_jobs += 1;
    }

    /// Enqueues up to `jobs` jobs; returns the enqueued count.
    fn enqueue_jobs(
        &mut self,
        jobs: usize,
        scene: &Arc<Scene>,
        pool: &ThreadPool,
        signal: &Arc<CompletionSignal>,
    ) -> usize {
        debug_assert!(self.enqueued_jobs <= self.total_jobs);
        let mut j = 0;
        while j < jobs && self.enqueued_jobs < self.total_jobs && !self.failed {
            self.enqueue_next(scene, pool, signal);
            j += 1;
        }
        j
    }

    /// Enqueues jobs until every block has received the same spe count.
    fn enqueue_jobs_for_intermediate_render(
        &mut self,
        scene: &Arc<Scene>,
        pool: &ThreadPool,
        signal: &Arc<CompletionSignal>,
    ) -> usize {
        let blocks = self.sensor.total_sensor_blocks();
        let mut j = 0;
        while self.enqueued_jobs % blocks != 0 && self.enqueued_jobs < self.total_jobs && !self.failed
        {
            self.enqueue_next(scene, pool, signal);
            j += 1;
        }
        j
    }

    /// Completes any finished jobs without blocking; returns the count.
    fn complete_jobs(&mut self) -> usize {
        let mut done = 0usize;
        let film = self.film.clone();
        let sensor = self.sensor.clone();
        let mut failed = self.failed;
        self.futures.retain_mut(|f| match f.try_take() {
            None => true,
            Some(Ok(block)) => {
                film.write_block(&block);
                sensor.release_sensor_block(&film, block);
                done += 1;
                false
            }
            Some(Err(_)) => {
                log::error!("(scene_renderer) worker panicked; sensor <{}> terminated", sensor.id());
                failed = true;
                done += 1;
                false
            }
        });
        self.failed = failed;
        self.jobs_completed += done;
        done
    }

    /// Blocks until all in-flight jobs complete.
    fn wait_and_complete_jobs(&mut self) -> usize {
        let mut done = 0usize;
        for f in self.futures.drain(..) {
            match f.wait() {
                Ok(block) => {
                    self.film.write_block(&block);
                    self.sensor.release_sensor_block(&self.film, block);
                }
                Err(_) => {
                    self.failed = true;
                }
            }
            done += 1;
        }
        self.jobs_completed += done;
        done
    }

    fn is_complete(&self) -> bool {
        !self.failed && self.jobs_completed == self.total_jobs
    }

    // finished sensors take no further jobs: complete or failed
    fn is_finished(&self) -> bool {
        self.failed || self.jobs_completed == self.total_jobs
    }

    fn progress(&self) -> Float {
        self.jobs_completed as Float / self.total_jobs as Float
    }

    fn fractional_spe_complete(&self) -> Float {
        self.progress() * self.samples_per_element as Float
    }

    fn spe_complete(&self) -> usize {
        (self.fractional_spe_complete().round() + 0.5) as usize
    }

    fn develop(&self, render_elapsed_time: Duration) -> (String, SensorRenderResult) {
        let spe_completed = self.spe_complete();
        let tonemapped_film_colour_encoding =
            self.film.colour_encoding_of_developed_tonemapped_film();

        let developed_films = if self.film.is_polarimetric() {
            DevelopedFilms::Polarimetric2(DevelopedPolarimetricFilmPair {
                developed_tonemapped: self
                    .film
                    .get_tonemap()
                    .map(|_| self.film.develop_stokes_d2(spe_completed)),
                tonemapped_film_colour_encoding,
                developed: self.film.develop_lin_stokes_d2(spe_completed),
            })
        } else {
            DevelopedFilms::Scalar2(DevelopedScalarFilmPair {
                developed_tonemapped: self
                    .film
                    .get_tonemap()
                    .map(|_| self.film.develop_d2(spe_completed)),
                tonemapped_film_colour_encoding,
                developed: self.film.develop_lin_d2(spe_completed),
            })
        };

        log::info!(
            "(scene_renderer) developed film for <{}>: {}{}×{} @ {}spe",
            self.sensor.id(),
            if self.film.is_polarimetric() {
                "polarimetric (Stokes) "
            } else {
                ""
            },
            self.film.film_size().0,
            self.film.film_size().1,
            spe_completed
        );

        (
            self.sensor.id().to_string(),
            SensorRenderResult {
                sensor_id: self.sensor.id().to_string(),
                render_elapsed_time,
                developed_films,
                spe_written: spe_completed,
                fractional_spe: if self.is_complete() {
                    None
                } else {
                    Some(self.fractional_spe_complete())
                },
            },
        )
    }

    fn preview(&self, previewer: &dyn PreviewInterface) {
        let frac = self.film.fractional_spe();
        let spe = (frac.round() as usize).max(1);
        if self.film.is_polarimetric() {
            let film = self.film.develop_lin_stokes_d2(spe);
            previewer.update_polarimetric(self.sensor.id(), &film, frac, self.sensor.get_tonemap());
        } else {
            let film = self.film.develop_lin_d2(spe);
            previewer.update_scalar(self.sensor.id(), &film, frac, self.sensor.get_tonemap());
        }
    }
}

struct RendererShared {
    interrupt_flag: AtomicBool,
    interrupts_queue: Mutex<VecDeque<Interrupt>>,
    status: Mutex<RenderingStatus>,
}

/// Handles the rendering loop of a scene. Construction spawns the
/// scheduler thread; results are collected with `get`.
pub struct SceneRenderer {
    shared: Arc<RendererShared>,
    handle: Option<thread::JoinHandle<RenderResult>>,
}

impl SceneRenderer {
    /// Starts rendering asynchronously.
    pub fn new(scene: Arc<Scene>, ads: Arc<Bvh8w>, ctx: Arc<Context>, opts: RenderOpts) -> Self {
        let shared = Arc::new(RendererShared {
            interrupt_flag: AtomicBool::new(false),
            interrupts_queue: Mutex::new(VecDeque::new()),
            status: Mutex::new(RenderingStatus {
                state: RenderingState::Rendering,
                elapsed_rendering_time: Duration::ZERO,
                total_jobs: 0,
                completed_jobs: 0,
                jobs_in_flight: 0,
            }),
        });

        let thread_shared = shared.clone();
        let handle = thread::Builder::new()
            .name("wt-scheduler".into())
            .spawn(move || render(scene, ads, ctx, opts, thread_shared))
            .expect("failed to spawn scheduler thread");

        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Queues an interrupt. Thread safe.
    pub fn interrupt(&self, intr: Interrupt) {
        self.shared.interrupts_queue.lock().unwrap().push_back(intr);
        self.shared.interrupt_flag.store(true, Ordering::Release);
    }

    /// Waits for rendering to finish and retrieves the results. Blocking.
    pub fn get(mut self) -> RenderResult {
        self.handle
            .take()
            .expect("renderer already joined")
            .join()
            .expect("scheduler thread panicked")
    }

    /// Queries the rendering status. Thread safe; results may be stale.
    pub fn rendering_status(&self) -> RenderingStatus {
        *self.shared.status.lock().unwrap()
    }
}

impl Drop for SceneRenderer {
    fn drop(&mut self) {
        if let Some(h) = self.handle.take() {
            self.interrupt(Interrupt::Terminate);
            let _ = h.join();
        }
    }
}

fn render(
    scene: Arc<Scene>,
    ads: Arc<Bvh8w>,
    ctx: Arc<Context>,
    opts: RenderOpts,
    shared: Arc<RendererShared>,
) -> RenderResult {
    let pool = ctx.thread_pool.clone();
    let signal = Arc::new(CompletionSignal::new());

    // build per-sensor render contexts
    let mut render_ctxs: Vec<RenderContext> = Vec::new();
    let mut total_jobs = 0usize;
    for (sensor_index, scs) in scene.sensors().iter().enumerate() {
        let sensor = scs.get_sensor().clone();
        let samples_per_element = sensor.requested_samples_per_element();
        // 0spe sensors are skipped (useful to selectively turn off sensors)
        if samples_per_element == 0 {
            continue;
        }

        let film = sensor.create_sensor_film();
        let samples_per_block = ctx.renderer_samples_per_block.min(samples_per_element);
        let total_blocks = sensor.total_sensor_blocks();
        let blocks_to_queue = samples_per_element.div_ceil(samples_per_block) as usize;
        let sensor_total_jobs = total_blocks * blocks_to_queue;

        log::info!(
            "(scene_renderer) sensor <{}> {}×{} px @ {} spe{}",
            sensor.id(),
            sensor.film_dimensions().0,
            sensor.film_dimensions().1,
            samples_per_element,
            if sensor.is_polarimetric() { "  Stokes" } else { "" },
        );

        let ictx = Arc::new(IntegratorContext {
            scene: scene.clone(),
            ads: ads.clone(),
            sensor: sensor.clone(),
            film: film.clone(),
            opts: ctx.integrator_opts,
        });

        render_ctxs.push(RenderContext {
            sensor,
            film,
            ictx,
            total_jobs: sensor_total_jobs,
            enqueued_jobs: 0,
            jobs_completed: 0,
            samples_per_block,
            samples_per_element,
            futures: Vec::new(),
            failed: false,
            sensor_index,
        });
        total_jobs += sensor_total_jobs;
    }

    log::info!("(scene_renderer) starting render...");

    let now = Instant::now();
    let mut state = SchedulerState {
        paused: false,
        saved_paused_state: false,
        terminated: false,
        completed: false,
        total_jobs,
        jobs_enqueued: 0,
        jobs_completed: 0,
        start_time: now,
        last_checkpoint: now,
        elapsed_till_last_checkpoint: Duration::ZERO,
        pending_captures: Vec::new(),
    };

    let parallel_jobs_to_enqueue =
        (PARALLEL_JOBS_FACTOR * pool.thread_count() as Float).ceil() as usize;

    let mut incomplete: Vec<usize> = (0..render_ctxs.len()).collect();

    // round-robin refill of the in-flight window
    let refill = |state: &mut SchedulerState,
                  render_ctxs: &mut Vec<RenderContext>,
                  incomplete: &[usize]| {
        while state.jobs_enqueued < parallel_jobs_to_enqueue {
            let mut any = false;
            for &i in incomplete {
                if state.jobs_enqueued >= parallel_jobs_to_enqueue {
                    break;
                }
                let e = render_ctxs[i].enqueue_jobs(1, &scene, &pool, &signal);
                state.jobs_enqueued += e;
                any |= e > 0;
            }
            if !any {
                break;
            }
        }
    };

    // initial window
    refill(&mut state, &mut render_ctxs, &incomplete);

    // initial empty previews
    if let Some(previewer) = &opts.previewer {
        for rctx in &render_ctxs {
            rctx.preview(previewer.as_ref());
        }
    }

    // process render jobs
    loop {
        signal.wait_timeout(if state.paused {
            ctx.paused_wait
        } else {
            ctx.active_wait
        });

        // finalize any completed jobs
        let mut completed_jobs = false;
        for &i in &incomplete {
            let done = render_ctxs[i].complete_jobs();
            if done > 0 {
                state.jobs_enqueued -= done;
                state.jobs_completed += done;
                completed_jobs = true;

                if let Some(cb) = &opts.progress_callback {
                    (cb.progress_update)(render_ctxs[i].sensor.id(), render_ctxs[i].progress());
                }
            }
        }
        if completed_jobs {
            state.checkpoint(false);
        }
        let fully_paused = state.paused && state.jobs_enqueued == 0;

        // pending intermediate captures require a drained pipeline
        if !state.pending_captures.is_empty() && state.jobs_enqueued == 0 {
            let mut results = RenderResult {
                sensors: Default::default(),
                render_elapsed_time: state.elapsed_time(),
            };
            for rctx in &render_ctxs {
                let (id, r) = rctx.develop(results.render_elapsed_time);
                results.sensors.insert(id, r);
            }
            for (n, cb) in state.pending_captures.drain(..).enumerate() {
                if n == 0 {
                    cb(results);
                    results = RenderResult::default();
                } else {
                    // subsequent captures of the same batch see an empty set
                    cb(RenderResult::default());
                }
            }
            state.paused = state.saved_paused_state;
        }

        // only take new interrupts once the pending ones are done
        if state.pending_captures.is_empty() {
            process_interrupts(
                &shared,
                &mut state,
                &mut render_ctxs,
                &incomplete,
                &scene,
                &pool,
                &signal,
            );
        }

        // enqueue additional jobs if needed
        if !state.terminated && !state.paused {
            if fully_paused {
                // resuming: restart the checkpoint clock without counting
                // the paused interval
                state.checkpoint(true);
            }
            refill(&mut state, &mut render_ctxs, &incomplete);
        }

        update_status(&shared, &state);

        if state.terminated {
            break;
        }
        if !completed_jobs {
            continue;
        }

        // drop finished sensors
        incomplete.retain(|&i| !render_ctxs[i].is_finished());
        if incomplete.is_empty() {
            state.completed = true;
            break;
        }

        // lossy preview snapshots
        if let Some(previewer) = &opts.previewer {
            for &i in &incomplete {
                render_ctxs[i].preview(previewer.as_ref());
            }
        }
    }

    // wait for any remaining jobs (e.g. on early termination)
    for rctx in render_ctxs.iter_mut() {
        let done = rctx.wait_and_complete_jobs();
        state.jobs_enqueued -= done.min(state.jobs_enqueued);
        state.jobs_completed += done;
        if !rctx.is_complete() {
            log::info!(
                "(scene_renderer) sensor <{}> has incomplete rendering.",
                rctx.sensor.id()
            );
            if let Some(cb) = &opts.progress_callback {
                (cb.on_terminate)(rctx.sensor.id());
            }
        }
    }

    if state.terminated {
        log::info!("(scene_renderer) rendering terminated.");
    }
    if state.completed {
        log::info!("(scene_renderer) rendering completed successfully.");
    }

    // final preview with the finished films
    if let Some(previewer) = &opts.previewer {
        for rctx in &render_ctxs {
            rctx.preview(previewer.as_ref());
        }
    }

    // write out films for completed renders only
    let mut ret = RenderResult {
        sensors: Default::default(),
        render_elapsed_time: state.elapsed_time(),
    };
    for rctx in &render_ctxs {
        if !rctx.is_complete() {
            continue;
        }
        if let Some(cb) = &opts.progress_callback {
            (cb.on_complete)(rctx.sensor.id(), ret.render_elapsed_time);
        }
        let (id, r) = rctx.develop(ret.render_elapsed_time);
        debug_assert_eq!(r.spe_written, rctx.samples_per_element as usize);
        ret.sensors.insert(id, r);
    }

    update_status(&shared, &state);
    log::info!(
        "(scene_renderer) done. Elapsed: {:?}",
        ret.render_elapsed_time
    );

    ret
}

#[allow(clippy::too_many_arguments)]
fn process_interrupts(
    shared: &RendererShared,
    state: &mut SchedulerState,
    render_ctxs: &mut [RenderContext],
    incomplete: &[usize],
    scene: &Arc<Scene>,
    pool: &Arc<ThreadPool>,
    signal: &Arc<CompletionSignal>,
) {
    if !shared.interrupt_flag.swap(false, Ordering::AcqRel) {
        return;
    }

    let mut queue = shared.interrupts_queue.lock().unwrap();
    while let Some(interrupt) = queue.pop_front() {
        match interrupt {
            Interrupt::Pause => {
                log::info!("(scene_renderer) pause interrupt.");
                state.paused = true;
            }
            Interrupt::Resume => {
                log::info!("(scene_renderer) resume interrupt.");
                state.paused = false;
            }
            Interrupt::Terminate => {
                log::info!("(scene_renderer) terminate interrupt.");
                state.terminated = true;
            }
            Interrupt::CaptureIntermediate(cb) => {
                log::info!("(scene_renderer) capture intermediate interrupt.");
                // queue all remaining jobs of the current block row so
                // every block carries identical spe, then pause
                state.saved_paused_state = state.paused;
                for &i in incomplete {
                    let enqueued =
                        render_ctxs[i].enqueue_jobs_for_intermediate_render(scene, pool, signal);
                    state.jobs_enqueued += enqueued;
                }
                state.pending_captures.push(cb);
                state.paused = true;
            }
        }
    }
}

fn update_status(shared: &RendererShared, state: &SchedulerState) {
    let mut status = shared.status.lock().unwrap();
    status.total_jobs = state.total_jobs;
    status.completed_jobs = state.jobs_completed;
    status.jobs_in_flight = state.jobs_enqueued;
    status.elapsed_rendering_time = state.elapsed_time();
    status.state = if state.completed {
        RenderingState::CompletedSuccessfully
    } else if state.terminated {
        RenderingState::Terminated
    } else if state.paused && state.jobs_enqueued == 0 {
        RenderingState::Paused
    } else if state.paused {
        RenderingState::Pausing
    } else {
        RenderingState::Rendering
    };
}
