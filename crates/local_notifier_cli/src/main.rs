//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `local_notifier_core` linkage without a Flutter runtime.
//! - Drive one notify/click/close cycle through the stub notifier and print
//!   the outbound channel traffic in a deterministic order.

use local_notifier_core::{
    dispatch, BridgeConfig, MethodCall, NotificationBridge, QueuedEventSink, StubNotifier,
};
use serde_json::json;

fn main() {
    println!("local_notifier_core ping={}", local_notifier_core::ping());
    println!(
        "local_notifier_core version={}",
        local_notifier_core::core_version()
    );

    let config = match BridgeConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            std::process::exit(2);
        }
    };

    let notifier = StubNotifier::legacy().with_auto_confirm(true);
    let probe = notifier.probe();
    let events = QueuedEventSink::new();
    let mut bridge = NotificationBridge::new(config, Box::new(notifier), Box::new(events.clone()));
    println!(
        "bridge backend={} path={}",
        bridge.notifier_name(),
        bridge.path().as_str()
    );

    let calls = [
        MethodCall::new(
            "notify",
            json!({
                "identifier": "smoke-1",
                "title": "Smoke test",
                "body": "local_notifier is wired",
                "actions": [{"text": "Open"}],
            }),
        ),
        MethodCall::new("close", json!({"identifier": "smoke-1"})),
        MethodCall::new("bogus", json!({})),
    ];

    for (step, call) in calls.iter().enumerate() {
        let response = dispatch(&mut bridge, call);
        println!("call method={} response={response:?}", call.method);
        if step == 0 {
            probe.click_action_button("smoke-1");
        }
        bridge.pump_callbacks();
        for message in events.drain() {
            println!("event method={} arguments={}", message.method, message.arguments);
        }
    }
}
