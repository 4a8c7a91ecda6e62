use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tickloop::prelude::*;
use tokio::time;

/// Builds a tick-callback factory whose calls are counted in `calls` and
/// which faults whenever `should_fault` says so for the current call number.
fn faulty_factory(
    calls: &Arc<AtomicU32>,
    should_fault: fn(u32) -> bool,
) -> impl FnMut() -> TickFn + Send + 'static {
    let calls = Arc::clone(calls);
    move || {
        let calls = Arc::clone(&calls);
        Box::new(move |_now| {
            let call = calls.fetch_add(1, Ordering::Relaxed) + 1;
            if should_fault(call) {
                anyhow::bail!("injected fault on call {call}");
            }
            Ok(())
        })
    }
}

#[tokio::test(start_paused = true)]
async fn fault_restarts_and_ticking_continues() {
    let engine = TickerEngine::new(EngineConfig::default());
    let mut events = engine.subscribe();
    let calls = Arc::new(AtomicU32::new(0));

    let handle = engine
        .spawn_supervised(
            TickerSpec::new("flaky", Duration::from_secs(1)),
            StopCondition::timeout(Duration::from_secs(10)),
            faulty_factory(&calls, |call| call == 3),
        )
        .await;

    let reason = handle.join().await.expect("supervised task failed");
    assert_eq!(
        reason,
        StopReason::TimedOut,
        "a fault must never end the run early"
    );

    let total = calls.load(Ordering::Relaxed);
    assert!(
        (9..=10).contains(&total),
        "ticking should continue after the restart, got {total} calls"
    );

    let mut faults = 0;
    let mut restarts = 0;
    let mut seqs = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            TickerEvent::Faulted { .. } => faults += 1,
            TickerEvent::Restarted { .. } => restarts += 1,
            TickerEvent::Tick { seq, .. } => seqs.push(seq),
            _ => {}
        }
    }
    assert_eq!(faults, 1);
    assert_eq!(restarts, 1, "exactly one restart per fault");

    // The tick sequence keeps counting across the restart.
    let expected: Vec<u64> = (1..=seqs.len() as u64).collect();
    assert_eq!(seqs, expected);
}

#[tokio::test(start_paused = true)]
async fn each_fault_produces_exactly_one_restart() {
    let engine = TickerEngine::new(EngineConfig::default());
    let mut events = engine.subscribe();
    let calls = Arc::new(AtomicU32::new(0));

    let handle = engine
        .spawn_supervised(
            TickerSpec::new("flaky", Duration::from_secs(1)),
            StopCondition::timeout(Duration::from_secs(10)),
            faulty_factory(&calls, |call| call % 3 == 0),
        )
        .await;

    let reason = handle.join().await.expect("supervised task failed");
    assert_eq!(reason, StopReason::TimedOut);

    let (mut faults, mut restarts) = (0, 0);
    while let Ok(event) = events.try_recv() {
        match event {
            TickerEvent::Faulted { .. } => faults += 1,
            TickerEvent::Restarted { .. } => restarts += 1,
            _ => {}
        }
    }
    assert_eq!(faults, 3, "one fault every third call over ten seconds");
    assert_eq!(restarts, faults, "every fault is followed by one restart");
}

#[tokio::test(start_paused = true)]
async fn stop_condition_survives_restarts() {
    let engine = TickerEngine::new(EngineConfig::default());
    let mut events = engine.subscribe();
    let calls = Arc::new(AtomicU32::new(0));

    let (stop, cancel) = StopCondition::manual();
    tokio::spawn(async move {
        time::sleep(Duration::from_millis(4500)).await;
        cancel.cancel();
    });

    let handle = engine
        .spawn_supervised(
            TickerSpec::new("flaky", Duration::from_secs(1)),
            stop,
            faulty_factory(&calls, |call| call == 2),
        )
        .await;

    let reason = handle.join().await.expect("supervised task failed");
    assert_eq!(
        reason,
        StopReason::Cancelled,
        "the manual stop must still apply to the restarted instance"
    );
    assert_eq!(calls.load(Ordering::Relaxed), 4);

    let mut restarts = 0;
    while let Ok(event) = events.try_recv() {
        if let TickerEvent::Restarted { .. } = event {
            restarts += 1;
        }
    }
    assert_eq!(restarts, 1);
}
