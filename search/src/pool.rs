//! Persistent worker pool for partitioned per-item workloads.
//!
//! # Design
//!
//! - Threads are spawned once, on the first non-empty dispatch, and reused
//!   for every batch until the pool is dropped.
//! - Each worker owns a private state `W` (e.g. a scorer with scratch
//!   buffers), handed over at spawn and indexed by worker id.
//! - Work is claimed one index at a time from a shared atomic cursor, so
//!   items of very different cost balance themselves across workers.
//! - Coordination uses one mutex and two condition variables:
//!   `work_available` (caller to workers) and `batch_complete` (workers to
//!   caller). A generation counter keeps a worker from re-running a batch it
//!   already finished.
//!
//! A panic inside a job aborts the process. There is no per-item recovery.

use crate::error::Result;
use parking_lot::{Condvar, Mutex};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

/// Type-erased job for the current batch: `(worker state, item index)`.
type Job<'a, W> = dyn Fn(&mut W, usize) + Sync + 'a;

struct BatchState<W: 'static> {
    job: Option<&'static Job<'static, W>>,
    len: usize,
    generation: u64,
    completed: usize,
    shutdown: bool,
}

struct Shared<W: 'static> {
    state: Mutex<BatchState<W>>,
    cursor: AtomicUsize,
    threads: usize,
    work_available: Condvar,
    batch_complete: Condvar,
}

pub struct WorkerPool<W: Send + 'static> {
    shared: Arc<Shared<W>>,
    /// Worker states waiting to be moved into their threads.
    pending: Vec<W>,
    handles: Vec<JoinHandle<()>>,
    thread_count: usize,
    /// Set when spawning failed; the pool refuses further work.
    broken: bool,
}

/// Create operations.
impl<W: Send + 'static> WorkerPool<W> {
    /// Creates a pool with one worker per state. At least one state is required.
    pub fn new(states: Vec<W>) -> Self {
        assert!(!states.is_empty(), "worker pool needs at least one worker");

        let thread_count = states.len();
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(BatchState {
                    job: None,
                    len: 0,
                    generation: 0,
                    completed: 0,
                    shutdown: false,
                }),
                cursor: AtomicUsize::new(0),
                threads: thread_count,
                work_available: Condvar::new(),
                batch_complete: Condvar::new(),
            }),
            pending: states,
            handles: Vec::with_capacity(thread_count),
            thread_count,
            broken: false,
        }
    }

    /// Creates a pool of `threads` workers, building each state from its worker id.
    pub fn with_workers(threads: usize, mut make_state: impl FnMut(usize) -> W) -> Self {
        Self::new((0..threads.max(1)).map(&mut make_state).collect())
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Returns true once the worker threads have been spawned.
    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    fn spawn_workers(&mut self) -> Result<()> {
        if self.broken {
            return Err(io::Error::other("search workers failed to start").into());
        }

        for (id, state) in std::mem::take(&mut self.pending).into_iter().enumerate() {
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(format!("search-worker-{id}"))
                .spawn(move || worker_loop(id, state, shared));
            match spawned {
                Ok(handle) => self.handles.push(handle),
                Err(err) => {
                    tracing::error!(worker = id, error = %err, "failed to spawn search worker");
                    self.broken = true;
                    self.shutdown();
                    return Err(err.into());
                }
            }
        }
        tracing::debug!(threads = self.thread_count, "spawned search workers");
        Ok(())
    }

    /// Signals exit and joins every spawned worker.
    fn shutdown(&mut self) {
        if self.handles.is_empty() {
            return;
        }

        self.shared.state.lock().shutdown = true;
        self.shared.work_available.notify_all();

        for handle in self.handles.drain(..) {
            // Workers abort on panic, so join only fails if the thread was killed.
            let _ = handle.join();
        }
    }
}

/// Dispatch operations.
impl<W: Send + 'static> WorkerPool<W> {
    /// Runs `job` once for every item, spread over the workers, and returns
    /// when all items have been processed.
    ///
    /// Each item is handed to exactly one worker, together with that worker's
    /// private state. An empty slice returns immediately without waking (or
    /// spawning) any thread.
    pub fn execute<T, F>(&mut self, items: &mut [T], job: F) -> Result<()>
    where
        T: Send,
        F: Fn(&mut W, &mut T) + Sync,
    {
        if items.is_empty() {
            return Ok(());
        }
        if self.handles.is_empty() {
            self.spawn_workers()?;
        }

        let len = items.len();
        let items = ItemsPtr::new(items);
        let run = move |state: &mut W, index: usize| {
            // SAFETY: `index < len` and the cursor hands out every index at most
            // once per batch, so no two workers alias the same item. The slice
            // outlives the batch because `execute` blocks until it completes.
            let item = unsafe { items.get_mut(index) };
            job(state, item);
        };
        let run: &Job<'_, W> = &run;
        // SAFETY: the reference is published to the workers only between `map`
        // and `block_until_done`, and `block_until_done` clears it before
        // `run` goes out of scope.
        let run = unsafe { std::mem::transmute::<&Job<'_, W>, &'static Job<'static, W>>(run) };

        self.map(run, len);
        self.block_until_done();
        Ok(())
    }

    /// Publishes a new batch and wakes every worker.
    fn map(&self, job: &'static Job<'static, W>, len: usize) {
        let mut state = self.shared.state.lock();
        state.job = Some(job);
        state.len = len;
        state.completed = 0;
        state.generation = state.generation.wrapping_add(1);
        self.shared.cursor.store(0, Ordering::Relaxed);
        drop(state);

        self.shared.work_available.notify_all();
    }

    /// Blocks until every worker has reported completion of the current batch.
    fn block_until_done(&self) {
        let mut state = self.shared.state.lock();
        while state.completed < self.thread_count {
            self.shared.batch_complete.wait(&mut state);
        }
        state.job = None;
    }
}

impl<W: Send + 'static> Drop for WorkerPool<W> {
    fn drop(&mut self) {
        if self.is_running() {
            self.shutdown();
            tracing::debug!(threads = self.thread_count, "search workers stopped");
        }
    }
}

fn worker_loop<W: 'static>(id: usize, mut worker_state: W, shared: Arc<Shared<W>>) {
    let mut seen_generation = 0;

    loop {
        let (job, len) = {
            let mut state = shared.state.lock();
            while state.generation == seen_generation && !state.shutdown {
                shared.work_available.wait(&mut state);
            }
            if state.shutdown {
                return;
            }
            seen_generation = state.generation;
            match state.job {
                Some(job) => (job, state.len),
                None => continue,
            }
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            loop {
                let index = shared.cursor.fetch_add(1, Ordering::Relaxed);
                if index >= len {
                    break;
                }
                job(&mut worker_state, index);
            }
        }));
        if outcome.is_err() {
            tracing::error!(worker = id, "search worker panicked, aborting");
            std::process::abort();
        }

        let mut state = shared.state.lock();
        state.completed += 1;
        let all_done = state.completed == shared.threads;
        drop(state);
        if all_done {
            shared.batch_complete.notify_one();
        }
    }
}

/// Raw view of the batch's item slice, shareable across workers.
struct ItemsPtr<T> {
    ptr: *mut T,
    len: usize,
}

impl<T> ItemsPtr<T> {
    fn new(items: &mut [T]) -> Self {
        Self {
            ptr: items.as_mut_ptr(),
            len: items.len(),
        }
    }

    /// # Safety
    ///
    /// `index` must be in bounds, no other reference to that item may be live,
    /// and the slice must outlive the returned reference.
    unsafe fn get_mut<'a>(&self, index: usize) -> &'a mut T {
        debug_assert!(index < self.len);
        unsafe { &mut *self.ptr.add(index) }
    }
}

// SAFETY: workers only reach disjoint items through `get_mut`, so sharing the
// pointer is equivalent to sending each `&mut T` to one thread.
unsafe impl<T: Send> Send for ItemsPtr<T> {}
unsafe impl<T: Send> Sync for ItemsPtr<T> {}
