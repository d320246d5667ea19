use std::time::Duration;

use tokio::time::sleep;

use super::*;
use crate::intervention::{InterventionKind, InterventionPolicy};
use crate::session::{SessionLifecyclePayload, SessionLifecyclePhase};

#[tokio::test(start_paused = true)]
async fn one_minute_session_ticks_every_second_then_expires() {
    let supervisor = supervisor();
    let mut events = supervisor.subscribe_events();
    let mut lifecycle = supervisor.subscribe_lifecycle();

    supervisor
        .start_session_runtime(spec("s-1", 1))
        .await
        .expect("start runtime");
    sleep(Duration::from_secs(90)).await;

    let received = drain_events(&mut events);
    assert!(received
        .iter()
        .all(|event| event.event_type() == "time_remaining" && event.session_id == "s-1"));
    assert_eq!(
        remaining_seconds(&received),
        (0..=60).rev().collect::<Vec<u64>>()
    );

    let phases: Vec<_> = drain_lifecycle(&mut lifecycle)
        .into_iter()
        .map(|update| update.phase)
        .collect();
    assert_eq!(
        phases,
        vec![SessionLifecyclePhase::Started, SessionLifecyclePhase::Expired]
    );

    assert!(supervisor.is_active("s-1").await);
    assert!(!supervisor.is_ticking("s-1").await);
    let report = supervisor.report("s-1").await.expect("report");
    assert!(report.expired);
    assert_eq!(report.remaining_seconds, 0);
}

#[tokio::test(start_paused = true)]
async fn zero_length_session_expires_on_first_tick() {
    let supervisor = supervisor();
    let mut events = supervisor.subscribe_events();

    supervisor
        .start_session_runtime(spec("s-0", 0))
        .await
        .expect("start runtime");
    sleep(Duration::from_secs(5)).await;

    assert_eq!(remaining_seconds(&drain_events(&mut events)), vec![0]);
    assert!(!supervisor.is_ticking("s-0").await);
}

#[tokio::test(start_paused = true)]
async fn pause_freezes_the_clock_until_resumed() {
    let supervisor = supervisor();
    let mut events = supervisor.subscribe_events();
    let mut lifecycle = supervisor.subscribe_lifecycle();

    supervisor
        .start_session_runtime(spec("s-2", 2))
        .await
        .expect("start runtime");
    sleep(Duration::from_millis(10_500)).await;
    supervisor
        .pause_session_runtime("s-2")
        .await
        .expect("pause runtime");

    assert_eq!(
        remaining_seconds(&drain_events(&mut events)),
        (110..=120).rev().collect::<Vec<u64>>()
    );

    sleep(Duration::from_secs(100)).await;
    assert!(drain_events(&mut events).is_empty());
    assert!(supervisor.is_ticking("s-2").await);

    supervisor
        .resume_session_runtime("s-2")
        .await
        .expect("resume runtime");
    sleep(Duration::from_secs(1)).await;
    assert_eq!(remaining_seconds(&drain_events(&mut events)), vec![109]);

    let updates = drain_lifecycle(&mut lifecycle);
    let phases: Vec<_> = updates.iter().map(|update| update.phase).collect();
    assert_eq!(
        phases,
        vec![
            SessionLifecyclePhase::Started,
            SessionLifecyclePhase::Paused,
            SessionLifecyclePhase::Resumed,
        ]
    );
    match &updates[2].payload {
        SessionLifecyclePayload::Progress(progress) => {
            assert_eq!(progress.elapsed_seconds, 10);
            assert_eq!(progress.remaining_seconds, 109);
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn tick_emits_time_then_balance_then_intervention() {
    let supervisor = supervisor();
    let mut events = supervisor.subscribe_events();

    let mut session = spec("s-3", 10);
    session.facilitator.policy = InterventionPolicy {
        quiet_period_secs: 0,
        tension_duration_secs: 2,
        ..InterventionPolicy::default()
    };
    supervisor
        .start_session_runtime(session)
        .await
        .expect("start runtime");
    supervisor
        .record_speaker_activity("s-3", "speaker_0", true)
        .await
        .expect("speaker activity");
    supervisor
        .record_speaker_activity("s-3", "speaker_1", false)
        .await
        .expect("speaker activity");
    supervisor
        .record_tension("s-3", 0.9)
        .await
        .expect("tension");

    sleep(Duration::from_millis(5_500)).await;
    let received = drain_events(&mut events);
    let types: Vec<&str> = received.iter().map(SessionEvent::event_type).collect();

    let position = types
        .iter()
        .position(|kind| *kind == "intervention")
        .expect("escalation fired");
    assert_eq!(&types[position - 2..=position], ["time_remaining", "balance_update", "intervention"]);
    for (index, kind) in types.iter().enumerate() {
        if *kind == "balance_update" {
            assert_eq!(types[index - 1], "time_remaining");
        }
    }

    match &received[position].payload {
        EventPayload::Intervention(record) => {
            assert_eq!(record.kind, InterventionKind::Escalation);
        }
        other => panic!("unexpected payload: {other:?}"),
    }
    assert_eq!(types.iter().filter(|kind| **kind == "intervention").count(), 1);
}

#[tokio::test(start_paused = true)]
async fn one_sided_conversation_draws_a_balance_nudge() {
    let supervisor = supervisor();
    let mut events = supervisor.subscribe_events();

    supervisor
        .start_session_runtime(spec("s-4", 30))
        .await
        .expect("start runtime");
    supervisor
        .record_speaker_activity("s-4", "speaker_0", true)
        .await
        .expect("speaker activity");
    supervisor
        .record_speaker_activity("s-4", "speaker_1", false)
        .await
        .expect("speaker activity");

    sleep(Duration::from_secs(200)).await;
    let interventions: Vec<_> = drain_events(&mut events)
        .into_iter()
        .filter_map(|event| match event.payload {
            EventPayload::Intervention(record) => Some(record),
            _ => None,
        })
        .collect();

    assert_eq!(interventions.len(), 1);
    let nudge = &interventions[0];
    assert_eq!(nudge.kind, InterventionKind::Balance);
    assert_eq!(nudge.target_participant.as_deref(), Some("p-b"));
    assert_eq!(nudge.message, "Blair hasn't shared their perspective yet");

    let report = supervisor.report("s-4").await.expect("report");
    assert_eq!(report.history.len(), 1);
    assert_eq!(report.balance.quiet_speaker.as_deref(), Some("p-b"));
}

#[tokio::test(start_paused = true)]
async fn silence_detection_can_be_enabled_mid_session() {
    let supervisor = supervisor();
    let mut events = supervisor.subscribe_events();

    supervisor
        .start_session_runtime(spec("s-5", 30))
        .await
        .expect("start runtime");
    supervisor
        .update_facilitator_config(
            "s-5",
            FacilitatorConfig {
                silence_detection: true,
                ..FacilitatorConfig::default()
            },
        )
        .await
        .expect("update settings");

    sleep(Duration::from_secs(185)).await;
    let interventions: Vec<_> = drain_events(&mut events)
        .into_iter()
        .filter_map(|event| match event.payload {
            EventPayload::Intervention(record) => Some(record),
            _ => None,
        })
        .collect();

    assert_eq!(interventions.len(), 1);
    assert_eq!(interventions[0].kind, InterventionKind::Silence);
}

#[tokio::test(start_paused = true)]
async fn failing_and_stalled_listeners_do_not_stop_the_tick() {
    let supervisor = supervisor();
    let mut lifecycle = supervisor.subscribe_lifecycle();

    supervisor
        .start_session_runtime(spec("s-6", 1))
        .await
        .expect("start runtime");

    let (collector, collector_dyn) = shared(CollectingListener::default());
    let (failing, failing_dyn) = shared(FailingListener::default());
    let (_, stalled_dyn) = shared(StalledListener {
        delay: Duration::from_secs(10),
    });
    for listener in [failing_dyn, stalled_dyn, collector_dyn] {
        supervisor
            .add_listener("s-6", listener)
            .await
            .expect("add listener");
    }

    sleep(Duration::from_secs(200)).await;

    let delivered = collector.events();
    let remaining = remaining_seconds(&delivered);
    assert!(!remaining.is_empty());
    assert_eq!(remaining.last(), Some(&0));
    assert!(remaining.windows(2).all(|pair| pair[0] > pair[1]));
    assert_eq!(
        *failing.attempts.lock().expect("attempts lock poisoned"),
        delivered.len()
    );

    let phases: Vec<_> = drain_lifecycle(&mut lifecycle)
        .into_iter()
        .map(|update| update.phase)
        .collect();
    assert_eq!(phases.last(), Some(&SessionLifecyclePhase::Expired));
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_scheduler_and_discards_state() {
    let supervisor = supervisor();
    let mut events = supervisor.subscribe_events();
    let mut lifecycle = supervisor.subscribe_lifecycle();

    supervisor
        .start_session_runtime(spec("s-7", 10))
        .await
        .expect("start runtime");
    sleep(Duration::from_millis(5_500)).await;

    let report = supervisor
        .stop_session_runtime("s-7")
        .await
        .expect("stop runtime");
    assert_eq!(report.session_id, "s-7");
    assert_eq!(report.elapsed_seconds, 5);
    assert!(report.history.is_empty());
    assert!(!report.expired);

    drain_events(&mut events);
    sleep(Duration::from_secs(30)).await;
    assert!(drain_events(&mut events).is_empty());
    assert!(!supervisor.is_active("s-7").await);

    let updates = drain_lifecycle(&mut lifecycle);
    match &updates.last().expect("stop update").payload {
        SessionLifecyclePayload::Stopped(stop) => {
            assert_eq!(stop.interventions, 0);
            assert_eq!(stop.elapsed_seconds, 5);
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}
