use local_notifier_core::{
    BridgeConfig, CompletionHandler, NotificationBridge, NotificationEventKind,
    NotificationRequest, PlatformCallback, QueuedEventSink, StubNotifier, StubNotifierProbe,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn bridge_with(notifier: StubNotifier) -> (NotificationBridge, StubNotifierProbe, QueuedEventSink) {
    let probe = notifier.probe();
    let sink = QueuedEventSink::new();
    let bridge = NotificationBridge::new(
        BridgeConfig::default(),
        Box::new(notifier),
        Box::new(sink.clone()),
    );
    (bridge, probe, sink)
}

fn methods(sink: &QueuedEventSink) -> Vec<String> {
    sink.drain().into_iter().map(|message| message.method).collect()
}

#[test]
fn legacy_delivery_emits_shown() {
    let (mut bridge, _, sink) = bridge_with(StubNotifier::legacy().with_auto_confirm(true));
    bridge
        .notify(&NotificationRequest::new("n1", "T", "B"))
        .expect("notify");

    let events = bridge.pump_callbacks();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NotificationEventKind::Shown);
    assert_eq!(events[0].identifier, "n1");
    assert_eq!(methods(&sink), vec!["onLocalNotificationShow".to_string()]);
}

#[test]
fn modern_delivery_has_no_shown_milestone() {
    let (mut bridge, _, sink) = bridge_with(StubNotifier::modern().with_auto_confirm(true));
    bridge
        .notify(&NotificationRequest::new("n1", "T", "B"))
        .expect("notify");

    assert!(bridge.pump_callbacks().is_empty());
    assert!(sink.is_empty());
}

#[test]
fn modern_delivery_confirmation_is_not_relayed_as_shown() {
    let (mut bridge, probe, sink) = bridge_with(StubNotifier::modern());
    bridge
        .notify(&NotificationRequest::new("n1", "T", "B"))
        .expect("notify");

    probe.confirm_delivery("n1");
    assert!(bridge.pump_callbacks().is_empty());
    assert!(sink.is_empty());
    assert!(bridge.index().contains("n1"));
}

#[test]
fn legacy_action_button_and_body_clicks_are_distinguished() {
    let (mut bridge, probe, sink) = bridge_with(StubNotifier::legacy());
    bridge
        .notify(&NotificationRequest::new("n1", "T", "B").with_action("Reply"))
        .expect("notify");
    let delivery = probe.last_delivery().expect("delivered");
    assert_eq!(delivery.action_button_title.as_deref(), Some("Reply"));

    probe.click_action_button("n1");
    let events = bridge.pump_callbacks();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NotificationEventKind::ActionClicked);
    assert_eq!(events[0].identifier, "n1");

    probe.click("n1");
    let events = bridge.pump_callbacks();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NotificationEventKind::Clicked);

    assert_eq!(
        methods(&sink),
        vec![
            "onLocalNotificationClickAction".to_string(),
            "onLocalNotificationClick".to_string()
        ]
    );
}

#[test]
fn modern_single_action_surface_yields_one_action_click() {
    let (mut bridge, probe, sink) = bridge_with(StubNotifier::modern());
    bridge
        .notify(&NotificationRequest::new("n1", "T", "B").with_action("Reply"))
        .expect("notify");

    let categories = probe.categories();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].actions.len(), 1);
    assert_eq!(categories[0].actions[0].title, "Reply");

    probe.respond_with_action("n1");
    let events = bridge.pump_callbacks();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NotificationEventKind::ActionClicked);
    assert_eq!(events[0].identifier, "n1");
    assert_eq!(
        methods(&sink),
        vec!["onLocalNotificationClickAction".to_string()]
    );
    assert_eq!(probe.acknowledged_count(), 1);
}

#[test]
fn modern_default_response_is_ignored_but_acknowledged() {
    let (mut bridge, probe, sink) = bridge_with(StubNotifier::modern());
    bridge
        .notify(&NotificationRequest::new("n1", "T", "B").with_action("Reply"))
        .expect("notify");

    probe.respond("n1", "com.apple.UNNotificationDefaultActionIdentifier");
    assert!(bridge.pump_callbacks().is_empty());
    assert!(sink.is_empty());
    assert_eq!(probe.acknowledged_count(), 1);
}

#[test]
fn no_actions_means_no_category_and_no_action_click() {
    let (mut modern, modern_probe, modern_sink) = bridge_with(StubNotifier::modern());
    modern
        .notify(&NotificationRequest::new("n1", "T", "B"))
        .expect("notify");
    assert!(modern_probe.categories().is_empty());
    modern_probe.respond_with_action("n1");
    assert!(modern.pump_callbacks().is_empty());
    assert!(modern_sink.is_empty());
    assert_eq!(modern_probe.acknowledged_count(), 1);

    let (mut legacy, legacy_probe, legacy_sink) = bridge_with(StubNotifier::legacy());
    legacy
        .notify(&NotificationRequest::new("n2", "T", "B"))
        .expect("notify");
    assert_eq!(
        legacy_probe
            .last_delivery()
            .and_then(|delivery| delivery.action_button_title),
        None
    );
    legacy_probe.click_action_button("n2");
    let events = legacy.pump_callbacks();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NotificationEventKind::Clicked);
    assert_eq!(methods(&legacy_sink), vec!["onLocalNotificationClick".to_string()]);
}

#[test]
fn response_completion_runs_on_every_branch() {
    let (mut bridge, _, _) = bridge_with(StubNotifier::modern());
    let calls = Arc::new(AtomicUsize::new(0));

    for action in ["action_identifier", "something_else"] {
        let counter = Arc::clone(&calls);
        bridge.handle_callback(PlatformCallback::Response {
            identifier: "n1".to_string(),
            action_identifier: action.to_string(),
            completion: CompletionHandler::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        });
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn expired_callback_drops_tracking_without_event() {
    let (mut bridge, probe, sink) = bridge_with(StubNotifier::legacy());
    bridge
        .notify(&NotificationRequest::new("n1", "T", "B"))
        .expect("notify");

    probe.expire("n1");
    assert!(bridge.pump_callbacks().is_empty());
    assert!(bridge.index().is_empty());
    assert!(sink.is_empty());
}

#[test]
fn foreground_presentation_follows_config() {
    let (bridge, _, _) = bridge_with(StubNotifier::legacy());
    assert!(bridge.should_present("n1"));

    let quiet = NotificationBridge::new(
        BridgeConfig {
            present_in_foreground: false,
            ..BridgeConfig::default()
        },
        Box::new(StubNotifier::legacy()),
        Box::new(QueuedEventSink::new()),
    );
    assert!(!quiet.should_present("n1"));
}
