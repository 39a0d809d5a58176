use dmxp_simfifo::Core::{self, Event, Kernel, SimTime, StopReason, WaitOutcome};
use dmxp_simfifo::Error;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

fn ns(n: u64) -> Duration {
    Duration::from_nanos(n)
}

type Log = Arc<Mutex<Vec<(u64, &'static str)>>>;

fn record(log: &Log, label: &'static str) -> dmxp_simfifo::Result<()> {
    log.lock().push((Core::now()?.as_nanos(), label));
    Ok(())
}

#[test_log::test]
fn timed_waits_resume_in_timestamp_order() {
    let log: Log = Arc::default();
    let mut kernel = Kernel::new();

    for (label, delay) in [("late", 7), ("early", 2), ("middle", 5)] {
        let log = Arc::clone(&log);
        kernel
            .spawn(label, move || {
                Core::wait_for(ns(delay))?;
                record(&log, label)
            })
            .unwrap();
    }

    let summary = kernel.run().unwrap();
    assert_eq!(summary.reason, StopReason::Finished);
    assert_eq!(summary.now, SimTime::from_nanos(7));
    assert_eq!(
        *log.lock(),
        vec![(2, "early"), (5, "middle"), (7, "late")]
    );
}

#[test]
fn simultaneous_wakes_follow_registration_order() {
    let log: Log = Arc::default();
    let mut kernel = Kernel::new();

    for label in ["first", "second", "third"] {
        let log = Arc::clone(&log);
        kernel
            .spawn(label, move || {
                Core::wait_for(ns(4))?;
                record(&log, label)
            })
            .unwrap();
    }

    kernel.run().unwrap();
    assert_eq!(
        *log.lock(),
        vec![(4, "first"), (4, "second"), (4, "third")]
    );
}

#[test_log::test]
fn notify_releases_waiters_in_next_delta() {
    let log: Log = Arc::default();
    let event = Event::new("go");
    let mut kernel = Kernel::new();

    {
        let (log, event) = (Arc::clone(&log), event.clone());
        kernel
            .spawn("waiter", move || {
                Core::wait(&event)?;
                record(&log, "woken")
            })
            .unwrap();
    }
    {
        let (log, event) = (Arc::clone(&log), event.clone());
        kernel
            .spawn("notifier", move || {
                Core::wait_for(ns(3))?;
                assert_eq!(event.notify(), 1);
                // Still our turn: the waiter runs only once we suspend or finish.
                record(&log, "notified")
            })
            .unwrap();
    }

    let summary = kernel.run().unwrap();
    assert_eq!(summary.reason, StopReason::Finished);
    assert_eq!(*log.lock(), vec![(3, "notified"), (3, "woken")]);
    assert_eq!(summary.delta_cycles, 1);
}

#[test]
fn notify_without_waiters_is_lost() {
    let event = Event::new("nobody");
    assert_eq!(event.notify(), 0);

    let mut kernel = Kernel::new();
    {
        let event = event.clone();
        kernel
            .spawn("late waiter", move || Core::wait(&event))
            .unwrap();
    }

    let summary = kernel.run().unwrap();
    assert_eq!(summary.reason, StopReason::Starved);
    assert_eq!(kernel.live_tasks(), 1);
    assert_eq!(event.registered_waiters(), 1);
}

#[test]
fn run_for_uses_a_half_open_window_and_can_resume() {
    let log: Log = Arc::default();
    let mut kernel = Kernel::new();
    {
        let log = Arc::clone(&log);
        kernel
            .spawn("ticker", move || loop {
                Core::wait_for(ns(10))?;
                record(&log, "tick")?;
            })
            .unwrap();
    }

    // An empty window runs nothing, not even activations already due at `now`.
    let empty = kernel.run_for(Duration::ZERO).unwrap();
    assert_eq!(empty.reason, StopReason::TimeLimit);
    assert_eq!(empty.activations, 0);
    assert_eq!(empty.now, SimTime::ZERO);
    assert!(log.lock().is_empty());

    let first = kernel.run_for(ns(30)).unwrap();
    assert_eq!(first.reason, StopReason::TimeLimit);
    assert_eq!(first.now, SimTime::from_nanos(30));
    assert_eq!(log.lock().len(), 2);

    let second = kernel.run_for(ns(15)).unwrap();
    assert_eq!(second.now, SimTime::from_nanos(45));
    assert_eq!(
        log.lock().iter().map(|(t, _)| *t).collect::<Vec<_>>(),
        vec![10, 20, 30, 40]
    );
}

#[test]
fn stop_handle_ends_the_run_early() {
    let mut kernel = Kernel::new();
    let stop = kernel.stop_handle();
    kernel
        .spawn("spinner", move || {
            for _ in 0..5 {
                Core::wait_for(ns(1))?;
            }
            stop.stop();
            loop {
                Core::wait_for(ns(1))?;
            }
        })
        .unwrap();

    let summary = kernel.run().unwrap();
    assert_eq!(summary.reason, StopReason::Stopped);
    assert_eq!(summary.now, SimTime::from_nanos(5));
}

#[test]
fn stop_requested_while_idle_does_not_cancel_the_next_run() {
    let log: Log = Arc::default();
    let mut kernel = Kernel::new();
    {
        let log = Arc::clone(&log);
        kernel
            .spawn("worker", move || {
                Core::wait_for(ns(2))?;
                record(&log, "done")
            })
            .unwrap();
    }

    kernel.stop_handle().stop();
    let summary = kernel.run().unwrap();
    assert_eq!(summary.reason, StopReason::Finished);
    assert_eq!(*log.lock(), vec![(2, "done")]);
}

#[test]
fn tasks_can_ask_for_their_own_id_and_name() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut kernel = Kernel::new();
    let mut ids = Vec::new();
    for name in ["alpha", "beta"] {
        let seen = Arc::clone(&seen);
        let id = kernel
            .spawn(name, move || {
                Core::wait_for(ns(1))?;
                seen.lock()
                    .push((Core::current_task()?, Core::current_task_name()?.to_string()));
                Ok(())
            })
            .unwrap();
        ids.push(id);
    }

    kernel.run().unwrap();
    assert_eq!(
        *seen.lock(),
        vec![(ids[0], "alpha".to_string()), (ids[1], "beta".to_string())]
    );
    assert_ne!(ids[0], ids[1]);

    assert!(matches!(Core::current_task(), Err(Error::NoTask)));
    assert!(matches!(Core::current_task_name(), Err(Error::NoTask)));
}

#[test]
fn panicking_task_is_reported() {
    let mut kernel = Kernel::new();
    kernel
        .spawn("boom", || -> dmxp_simfifo::Result<()> {
            Core::wait_for(ns(1))?;
            panic!("task blew up");
        })
        .unwrap();

    match kernel.run() {
        Err(Error::TaskPanicked(name)) => assert_eq!(name, "boom"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(kernel.live_tasks(), 0);
}

#[test]
fn suspension_outside_a_task_is_refused() {
    assert!(matches!(Core::wait_for(ns(1)), Err(Error::NoTask)));
    assert!(matches!(Core::wait(&Event::new("e")), Err(Error::NoTask)));
    assert!(matches!(Core::now(), Err(Error::NoTask)));
}

#[test]
fn shutdown_unblocks_suspended_tasks_with_stopped() {
    let stopped = Arc::new(Mutex::new(false));
    let event = Event::new("never");
    let mut kernel = Kernel::new();
    {
        let (stopped, event) = (Arc::clone(&stopped), event.clone());
        kernel
            .spawn("parked", move || {
                let result = Core::wait(&event);
                *stopped.lock() = matches!(result, Err(Error::Stopped));
                result
            })
            .unwrap();
    }

    assert_eq!(kernel.run().unwrap().reason, StopReason::Starved);
    kernel.shutdown();
    assert!(*stopped.lock());
}

#[test]
fn spawning_after_run_starts_at_current_time() {
    let log: Log = Arc::default();
    let mut kernel = Kernel::new();
    kernel.run_for(ns(12)).unwrap();

    let task_log = Arc::clone(&log);
    kernel
        .spawn("late", move || {
            record(&task_log, "start")?;
            Core::wait_for(ns(3))?;
            record(&task_log, "end")
        })
        .unwrap();

    kernel.run().unwrap();
    assert_eq!(*log.lock(), vec![(12, "start"), (15, "end")]);
}

#[test]
fn wait_timeout_reports_which_came_first() {
    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let event = Event::new("maybe");
    let mut kernel = Kernel::new();
    {
        let (outcomes, event) = (Arc::clone(&outcomes), event.clone());
        kernel
            .spawn("waiter", move || {
                let first = Core::wait_timeout(&event, ns(5))?;
                outcomes.lock().push((Core::now()?.as_nanos(), first));
                let second = Core::wait_timeout(&event, ns(5))?;
                outcomes.lock().push((Core::now()?.as_nanos(), second));
                Ok(())
            })
            .unwrap();
    }
    {
        let event = event.clone();
        kernel
            .spawn("notifier", move || {
                Core::wait_for(ns(7))?;
                event.notify();
                Ok(())
            })
            .unwrap();
    }

    kernel.run().unwrap();
    assert_eq!(
        *outcomes.lock(),
        vec![(5, WaitOutcome::TimedOut), (7, WaitOutcome::Notified)]
    );
}

#[test]
fn kernel_debug_is_a_summary() {
    let mut kernel = Kernel::new();
    kernel.spawn("idle", || Ok(())).unwrap();
    kernel.run().unwrap();
    let rendered = format!("{kernel:?}");
    assert!(rendered.contains("tasks: 1"));
    assert!(rendered.contains("live_tasks: 0"));
}
