use jobgraph::{Scheduler, SchedulerConfig, WorkerCount, GENERIC};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn manual_scheduler() -> Scheduler {
    Scheduler::start(SchedulerConfig {
        workers: WorkerCount::Exact(0),
        ..SchedulerConfig::default()
    })
    .unwrap()
}

fn pump_until_empty(scheduler: &Scheduler) {
    while scheduler.process_category(GENERIC).unwrap() {}
}

/// Records the order jobs ran in, for checking dependency ordering.
fn tracking_job(
    scheduler: &Scheduler,
    log: &Arc<Mutex<Vec<&'static str>>>,
    name: &'static str,
) -> jobgraph::Job {
    let log = log.clone();
    scheduler
        .create_job(
            GENERIC,
            jobgraph::work(name, move || {
                log.lock().unwrap().push(name);
            }),
        )
        .unwrap()
}

#[test]
fn test_end_to_end_fan_out() {
    // Spec scenario: B and C depend on A; dispatch all; pump until empty.
    let scheduler = manual_scheduler();
    let log = Arc::new(Mutex::new(Vec::new()));

    let a = tracking_job(&scheduler, &log, "A");
    let b = tracking_job(&scheduler, &log, "B");
    let c = tracking_job(&scheduler, &log, "C");

    b.add_predecessor(&a).unwrap();
    c.add_predecessor(&a).unwrap();
    b.dispatch().unwrap();
    c.dispatch().unwrap();
    a.dispatch().unwrap();

    pump_until_empty(&scheduler);

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 3, "each job runs exactly once");
    assert_eq!(log[0], "A");
    assert!(log[1..].contains(&"B"));
    assert!(log[1..].contains(&"C"));
    drop(log);
    scheduler.shutdown().unwrap();
}

#[test]
fn test_diamond_runs_sink_once_after_both_branches() {
    // A -> B, A -> C, B -> D, C -> D.
    let scheduler = manual_scheduler();
    let log = Arc::new(Mutex::new(Vec::new()));

    let a = tracking_job(&scheduler, &log, "A");
    let b = tracking_job(&scheduler, &log, "B");
    let c = tracking_job(&scheduler, &log, "C");
    let d = tracking_job(&scheduler, &log, "D");

    b.add_predecessor(&a).unwrap();
    c.add_predecessor(&a).unwrap();
    d.add_predecessor(&b).unwrap();
    d.add_predecessor(&c).unwrap();

    for job in [&b, &c, &d, &a] {
        job.dispatch().unwrap();
    }
    pump_until_empty(&scheduler);

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 4);
    assert_eq!(log[0], "A");
    assert_eq!(log[3], "D", "sink runs only after both branches");
    drop(log);
    scheduler.shutdown().unwrap();
}

#[test]
fn test_chain_orders_strictly() {
    let scheduler = manual_scheduler();
    let log = Arc::new(Mutex::new(Vec::new()));

    let a = tracking_job(&scheduler, &log, "A");
    let b = tracking_job(&scheduler, &log, "B");
    let c = tracking_job(&scheduler, &log, "C");

    a.add_successor(&b).unwrap();
    b.add_successor(&c).unwrap();
    c.dispatch().unwrap();
    b.dispatch().unwrap();
    a.dispatch().unwrap();

    pump_until_empty(&scheduler);
    assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C"]);
    scheduler.shutdown().unwrap();
}

#[test]
fn test_independent_jobs_keep_fifo_order() {
    // Single producer, no concurrent draining: strict FIFO.
    let scheduler = manual_scheduler();
    let log = Arc::new(Mutex::new(Vec::new()));

    for name in ["A", "B", "C"] {
        tracking_job(&scheduler, &log, name).dispatch().unwrap();
    }
    pump_until_empty(&scheduler);

    assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C"]);
    scheduler.shutdown().unwrap();
}

#[test]
fn test_diamond_on_worker_pool() {
    // Same diamond, but raced across real workers many times over.
    let scheduler = Scheduler::start(SchedulerConfig {
        workers: WorkerCount::Exact(4),
        ..SchedulerConfig::default()
    })
    .unwrap();

    for _ in 0..100 {
        let sink_runs = Arc::new(AtomicUsize::new(0));
        let branches_done = Arc::new(AtomicUsize::new(0));

        let a = scheduler.spawn(GENERIC, "A", || {}).unwrap();

        let make_branch = |name| {
            let branches_done = branches_done.clone();
            let job = scheduler
                .create_job(
                    GENERIC,
                    jobgraph::work(name, move || {
                        branches_done.fetch_add(1, Ordering::SeqCst);
                    }),
                )
                .unwrap();
            job.add_predecessor(&a).unwrap();
            job
        };
        let b = make_branch("B");
        let c = make_branch("C");

        let sink_runs_clone = sink_runs.clone();
        let branches_done_clone = branches_done.clone();
        let d = scheduler
            .create_job(
                GENERIC,
                jobgraph::work("D", move || {
                    assert_eq!(
                        branches_done_clone.load(Ordering::SeqCst),
                        2,
                        "sink ran before both branches finished"
                    );
                    sink_runs_clone.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        d.add_predecessor(&b).unwrap();
        d.add_predecessor(&c).unwrap();

        for job in [&b, &c, &d] {
            job.dispatch().unwrap();
        }

        while !d.is_complete() {
            std::thread::yield_now();
        }
        assert_eq!(sink_runs.load(Ordering::SeqCst), 1);
    }

    scheduler.shutdown().unwrap();
}

#[test]
fn test_deep_cascade_completes() {
    let scheduler = Scheduler::start(SchedulerConfig {
        workers: WorkerCount::Exact(2),
        ..SchedulerConfig::default()
    })
    .unwrap();

    let depth = 200;
    let steps = Arc::new(AtomicUsize::new(0));

    let mut jobs = Vec::with_capacity(depth);
    for _ in 0..depth {
        let steps = steps.clone();
        let job = scheduler
            .create_job(
                GENERIC,
                jobgraph::work("link", move || {
                    steps.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        if let Some(prev) = jobs.last() {
            job.add_predecessor(prev).unwrap();
        }
        jobs.push(job);
    }
    for job in &jobs {
        job.dispatch().unwrap();
    }

    let tail = jobs.last().unwrap();
    while !tail.is_complete() {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(steps.load(Ordering::SeqCst), depth);
    scheduler.shutdown().unwrap();
}
