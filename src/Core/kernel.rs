// Discrete-event kernel: one OS thread per task, one baton.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::clock::SimTime;
use super::task::{self, TaskContext};
use crate::error::{Error, Result};

/// Index of a task inside its kernel.
pub type TaskId = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum WakeReason {
    Started,
    Notified,
    TimedOut,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TaskStatus {
    Ready,
    Running,
    Waiting,
    Done,
}

pub(crate) struct TaskSlot {
    pub(crate) name: Arc<str>,
    pub(crate) status: TaskStatus,
    /// Bumped on every suspension; wake-ups carrying an older token are stale.
    token: u64,
    woken_by: Option<WakeReason>,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct TimedWake {
    at: SimTime,
    seq: u64,
    task: TaskId,
    token: u64,
}

/// Why a call to [`Kernel::run`] or [`Kernel::run_for`] returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The requested logical time window was exhausted.
    TimeLimit,
    /// Some tasks are still suspended but nothing can ever wake them.
    Starved,
    /// Every task ran to completion.
    Finished,
    /// A [`StopHandle`] asked the kernel to stop.
    Stopped,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub now: SimTime,
    pub delta_cycles: u64,
    pub activations: u64,
    pub reason: StopReason,
}

pub(crate) struct State {
    pub(crate) now: SimTime,
    pub(crate) running: Option<TaskId>,
    runnable: VecDeque<TaskId>,
    next_delta: VecDeque<TaskId>,
    timed: BinaryHeap<Reverse<TimedWake>>,
    seq: u64,
    pub(crate) tasks: Vec<TaskSlot>,
    pub(crate) stopped: bool,
    panicked: Vec<Arc<str>>,
    pub(crate) delta_cycles: u64,
    pub(crate) activations: u64,
}

impl State {
    fn new() -> Self {
        Self {
            now: SimTime::ZERO,
            running: None,
            runnable: VecDeque::new(),
            next_delta: VecDeque::new(),
            timed: BinaryHeap::new(),
            seq: 0,
            tasks: Vec::new(),
            stopped: false,
            panicked: Vec::new(),
            delta_cycles: 0,
            activations: 0,
        }
    }

    /// Marks `task` as suspended and returns the token its wake-up must carry.
    pub(crate) fn begin_wait(&mut self, task: TaskId) -> u64 {
        let slot = &mut self.tasks[task];
        slot.status = TaskStatus::Waiting;
        slot.token += 1;
        slot.woken_by = None;
        slot.token
    }

    pub(crate) fn schedule_wake(&mut self, task: TaskId, token: u64, delay: Duration) {
        let at = self.now.saturating_add(delay);
        self.seq += 1;
        self.timed.push(Reverse(TimedWake {
            at,
            seq: self.seq,
            task,
            token,
        }));
    }

    /// Makes a suspended task runnable. Event wake-ups land in the next delta
    /// cycle, timer wake-ups in the current one. Returns false for stale tokens.
    pub(crate) fn wake(&mut self, task: TaskId, token: u64, reason: WakeReason) -> bool {
        let Some(slot) = self.tasks.get_mut(task) else {
            return false;
        };
        if slot.status != TaskStatus::Waiting || slot.token != token {
            return false;
        }
        slot.status = TaskStatus::Ready;
        slot.woken_by = Some(reason);
        match reason {
            WakeReason::Notified => self.next_delta.push_back(task),
            WakeReason::Started | WakeReason::TimedOut => self.runnable.push_back(task),
        }
        true
    }

    pub(crate) fn release_turn(&mut self, task: TaskId) {
        debug_assert_eq!(self.running, Some(task));
        self.running = None;
    }

    pub(crate) fn take_wake_reason(&mut self, task: TaskId) -> WakeReason {
        self.tasks[task].woken_by.take().unwrap_or(WakeReason::Started)
    }

    fn finish(&mut self, task: TaskId) {
        self.tasks[task].status = TaskStatus::Done;
        if self.running == Some(task) {
            self.running = None;
        }
    }

    fn discard_stale_timers(&mut self) {
        while let Some(Reverse(next)) = self.timed.peek() {
            let slot = &self.tasks[next.task];
            if slot.status == TaskStatus::Waiting && slot.token == next.token {
                break;
            }
            self.timed.pop();
        }
    }

    pub(crate) fn live_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|slot| slot.status != TaskStatus::Done)
            .count()
    }
}

pub(crate) struct Shared {
    pub(crate) state: Mutex<State>,
    pub(crate) turn: Condvar,
    stop_requested: AtomicBool,
}

impl Shared {
    /// Parks the calling task thread until the kernel hands it the baton.
    pub(crate) fn await_turn(&self, state: &mut MutexGuard<'_, State>, task: TaskId) -> Result<()> {
        loop {
            if state.stopped {
                return Err(Error::Stopped);
            }
            if state.running == Some(task) {
                return Ok(());
            }
            self.turn.wait(state);
        }
    }
}

/// Cloneable handle that asks a running kernel to return at its next
/// scheduling point. Safe to use from signal handlers and other threads.
///
/// A stop only affects the run in progress. Calling [`StopHandle::stop`]
/// while the kernel is idle has no effect on the next `run`/`run_for`.
#[derive(Clone)]
pub struct StopHandle {
    shared: Arc<Shared>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.shared.stop_requested.store(true, Ordering::Release);
    }
}

/// A cooperative discrete-event scheduler.
///
/// Every task runs on its own OS thread, but the kernel hands a single baton
/// around so at most one task executes at any moment. A task keeps the baton
/// until it reaches a suspension point in [`crate::Core::task`]. The logical
/// clock only advances when no task is runnable.
pub struct Kernel {
    pub(crate) shared: Arc<Shared>,
    threads: Vec<(Arc<str>, JoinHandle<()>)>,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::new()),
                turn: Condvar::new(),
                stop_requested: AtomicBool::new(false),
            }),
            threads: Vec::new(),
        }
    }

    /// Registers a task. It becomes runnable at the current logical time and
    /// first executes on the next call to `run`/`run_for`.
    pub fn spawn<F>(&mut self, name: impl Into<String>, body: F) -> Result<TaskId>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let name: Arc<str> = Arc::from(name.into());
        let id = {
            let mut state = self.shared.state.lock();
            if state.stopped {
                return Err(Error::Stopped);
            }
            let id = state.tasks.len();
            state.tasks.push(TaskSlot {
                name: Arc::clone(&name),
                status: TaskStatus::Waiting,
                token: 0,
                woken_by: None,
            });
            state.wake(id, 0, WakeReason::Started);
            id
        };

        let shared = Arc::clone(&self.shared);
        let thread_name = Arc::clone(&name);
        let spawned = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || task_main(shared, id, thread_name, body));

        match spawned {
            Ok(handle) => {
                log::debug!("spawned task `{name}` as #{id}");
                self.threads.push((name, handle));
                Ok(id)
            }
            Err(e) => {
                let mut state = self.shared.state.lock();
                state.runnable.retain(|&queued| queued != id);
                state.finish(id);
                Err(Error::Spawn(e))
            }
        }
    }

    /// Current logical time.
    pub fn now(&self) -> SimTime {
        self.shared.state.lock().now
    }

    /// Number of tasks that have not finished yet.
    pub fn live_tasks(&self) -> usize {
        self.shared.state.lock().live_tasks()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Runs every activation with a timestamp strictly before `now + window`,
    /// then leaves the clock at `now + window`. Can be called repeatedly.
    pub fn run_for(&mut self, window: Duration) -> Result<RunSummary> {
        let limit = self.now().saturating_add(window);
        self.run_until(Some(limit))
    }

    /// Runs until no task can make progress or a stop is requested.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.run_until(None)
    }

    fn run_until(&mut self, limit: Option<SimTime>) -> Result<RunSummary> {
        let shared = Arc::clone(&self.shared);
        let mut state = shared.state.lock();
        if state.stopped {
            return Err(Error::Stopped);
        }
        // Only a stop raised during this run counts.
        shared.stop_requested.store(false, Ordering::Release);
        let start_deltas = state.delta_cycles;
        let start_activations = state.activations;
        log::debug!("run: starting at @{} (limit {limit:?})", state.now);

        let reason = loop {
            if shared.stop_requested.swap(false, Ordering::AcqRel) {
                break StopReason::Stopped;
            }
            // Anything still queued at `now` belongs to the next window.
            if limit.is_some_and(|limit| state.now >= limit) {
                break StopReason::TimeLimit;
            }

            if let Some(id) = state.runnable.pop_front() {
                if state.tasks[id].status == TaskStatus::Ready {
                    Self::dispatch(&shared, &mut state, id);
                }
                continue;
            }

            if !state.next_delta.is_empty() {
                let woken = std::mem::take(&mut state.next_delta);
                state.runnable = woken;
                state.delta_cycles += 1;
                continue;
            }

            state.discard_stale_timers();
            let Some(Reverse(next)) = state.timed.peek() else {
                break if state.live_tasks() == 0 {
                    StopReason::Finished
                } else {
                    log::debug!(
                        "run: starved at @{} with {} suspended task(s)",
                        state.now,
                        state.live_tasks()
                    );
                    StopReason::Starved
                };
            };
            let at = next.at;
            if limit.is_some_and(|limit| at >= limit) {
                break StopReason::TimeLimit;
            }

            state.now = at;
            while state.timed.peek().is_some_and(|Reverse(due)| due.at == at) {
                if let Some(Reverse(due)) = state.timed.pop() {
                    state.wake(due.task, due.token, WakeReason::TimedOut);
                }
            }
        };

        // A bounded run consumes its whole window unless it was interrupted.
        if reason != StopReason::Stopped {
            if let Some(limit) = limit {
                state.now = state.now.max(limit);
            }
        }

        let summary = RunSummary {
            now: state.now,
            delta_cycles: state.delta_cycles - start_deltas,
            activations: state.activations - start_activations,
            reason,
        };
        log::debug!("run: returned {summary:?}");

        if !state.panicked.is_empty() {
            let name = state.panicked.remove(0);
            return Err(Error::TaskPanicked(name.to_string()));
        }
        Ok(summary)
    }

    fn dispatch(shared: &Shared, state: &mut MutexGuard<'_, State>, id: TaskId) {
        state.running = Some(id);
        state.tasks[id].status = TaskStatus::Running;
        state.activations += 1;
        log::trace!("@{} dispatch `{}`", state.now, state.tasks[id].name);
        shared.turn.notify_all();
        while state.running.is_some() {
            shared.turn.wait(state);
        }
    }

    /// Wakes every suspended task with [`Error::Stopped`] and joins the task threads.
    pub fn shutdown(mut self) {
        self.stop_all();
    }

    fn stop_all(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.stopped = true;
            state.runnable.clear();
            state.next_delta.clear();
            state.timed.clear();
            self.shared.turn.notify_all();
        }
        for (name, handle) in self.threads.drain(..) {
            if handle.join().is_err() {
                log::warn!("task thread `{name}` could not be joined cleanly");
            }
        }
    }
}

impl Drop for Kernel {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn task_main<F>(shared: Arc<Shared>, id: TaskId, name: Arc<str>, body: F)
where
    F: FnOnce() -> Result<()>,
{
    {
        let mut state = shared.state.lock();
        if shared.await_turn(&mut state, id).is_err() {
            state.finish(id);
            return;
        }
    }

    task::enter(TaskContext {
        shared: Arc::clone(&shared),
        id,
    });
    let outcome = panic::catch_unwind(AssertUnwindSafe(body));
    task::leave();

    let mut state = shared.state.lock();
    match outcome {
        Ok(Ok(())) => log::debug!("task `{name}` finished at @{}", state.now),
        Ok(Err(Error::Stopped)) => log::trace!("task `{name}` unwound on shutdown"),
        Ok(Err(e)) => log::error!("task `{name}` failed: {e}"),
        Err(_) => {
            log::error!("task `{name}` panicked at @{}", state.now);
            state.panicked.push(Arc::clone(&name));
        }
    }
    state.finish(id);
    shared.turn.notify_all();
}
