use jobgraph::{CategoryId, Scheduler, SchedulerConfig, WorkerCount, GENERIC};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const IMAGE: CategoryId = CategoryId::new(1);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("jobgraph - Task-Graph Scheduler\n");

    let scheduler = Scheduler::start(SchedulerConfig {
        workers: WorkerCount::AllExcept(1),
        categories: 2,
        ..SchedulerConfig::default()
    })
    .expect("scheduler startup failed");
    println!(
        "Started scheduler with {} worker threads, {} categories\n",
        scheduler.worker_count(),
        scheduler.category_count()
    );

    // Example 1: a dependency chain pumped by the worker pool.
    println!("Example 1: dependency chain");
    let order = Arc::new(AtomicUsize::new(0));

    let order_a = order.clone();
    let load = scheduler
        .spawn(GENERIC, "load", move || {
            println!("  load   (step {})", order_a.fetch_add(1, Ordering::SeqCst));
        })
        .expect("spawn failed");

    let order_b = order.clone();
    let cook = scheduler
        .create_job(
            GENERIC,
            jobgraph::work("cook", move || {
                println!("  cook   (step {})", order_b.fetch_add(1, Ordering::SeqCst));
            }),
        )
        .expect("create failed");
    cook.add_predecessor(&load).expect("wiring failed");
    cook.dispatch().expect("dispatch failed");

    while !cook.is_complete() {
        std::thread::yield_now();
    }
    println!("  chain completed\n");

    // Example 2: fan-out across the pool.
    println!("Example 2: parallel fan-out");
    let sum = Arc::new(AtomicUsize::new(0));
    let num_jobs = 100;

    let start = Instant::now();
    let jobs: Vec<_> = (0..num_jobs)
        .map(|i| {
            let sum = sum.clone();
            scheduler
                .spawn(GENERIC, "accumulate", move || {
                    sum.fetch_add(i, Ordering::SeqCst);
                })
                .expect("spawn failed")
        })
        .collect();

    while jobs.iter().any(|job| !job.is_complete()) {
        std::thread::yield_now();
    }
    let expected: usize = (0..num_jobs).sum();
    println!(
        "  {} jobs in {:?}, sum = {} (expected {})\n",
        num_jobs,
        start.elapsed(),
        sum.load(Ordering::SeqCst),
        expected
    );

    // Example 3: a dedicated category whose callbacks run on this thread,
    // the way a render thread applies finished image copies once per frame.
    println!("Example 3: main-thread completion callbacks");
    let applied = Arc::new(AtomicUsize::new(0));
    let applied_clone = applied.clone();
    let screenshot = scheduler
        .create_job_with_callback(
            IMAGE,
            jobgraph::work("screenshot", || {
                println!("  rendering screenshot on the pumping thread");
            }),
            move || {
                applied_clone.fetch_add(1, Ordering::SeqCst);
                println!("  applying result on the main thread");
            },
        )
        .expect("create failed");
    screenshot.dispatch().expect("dispatch failed");

    // Per-frame pump: run ready image jobs, then drain their callbacks.
    while applied.load(Ordering::SeqCst) == 0 {
        scheduler
            .process_category_for(IMAGE, Duration::from_millis(5))
            .expect("pump failed");
        scheduler.process_finished(IMAGE).expect("drain failed");
    }
    println!("  callback drained\n");

    println!("Shutting down...");
    match scheduler.shutdown() {
        Ok(()) => println!("Done!"),
        Err(err) => eprintln!("Shutdown error: {err}"),
    }
}
