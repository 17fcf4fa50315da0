//! 运动序列与绘图流程集成测试

use kortex_client::{ClientConfig, DrawingRoutine, MotionSequenceRunner};
use kortex_driver::mock::{ActionBehavior, MockDevice};
use kortex_protocol::{Action, ActionDescriptor, ActionType, CartesianPose, ServoingMode};
use proptest::prelude::*;
use std::time::Duration;

fn steps(n: usize) -> Vec<ActionDescriptor> {
    (0..n)
        .map(|i| {
            let x = 0.3 + i as f32 * 0.01;
            Action::reach_pose(format!("step-{}", i), CartesianPose::new([x, 0.0, 0.3], [0.0; 3]))
                .into()
        })
        .collect()
}

#[test]
fn test_all_steps_complete() {
    let device = MockDevice::new();
    let runner = MotionSequenceRunner::new(&device, Duration::from_secs(2));

    assert!(runner.run(&steps(4)).unwrap());
    assert_eq!(device.sent_actions(), steps(4));
    assert_eq!(device.servoing_modes(), vec![ServoingMode::SingleLevel]);
    assert_eq!(device.active_subscriptions(), 0);
}

#[test]
fn test_transport_error_stops_sequence() {
    let device = MockDevice::new();
    device.script_actions([ActionBehavior::Complete, ActionBehavior::TransportFailure]);
    let runner = MotionSequenceRunner::new(&device, Duration::from_secs(2));

    let err = runner.run(&steps(4)).unwrap_err();
    assert!(err.is_transport());
    assert_eq!(device.sent_actions().len(), 1);
    assert_eq!(device.active_subscriptions(), 0);
}

#[test]
fn test_servoing_error_sends_no_action() {
    let device = MockDevice::new();
    device.set_disconnected(true);
    let runner = MotionSequenceRunner::new(&device, Duration::from_secs(2));

    assert!(runner.run(&steps(2)).is_err());
    assert!(device.sent_actions().is_empty());
}

#[test]
fn test_from_config_uses_timeout_and_mode() {
    let device = MockDevice::new();
    let config = ClientConfig {
        action_timeout_ms: 1234,
        servoing_mode: ServoingMode::Bypass,
        ..ClientConfig::default()
    };
    let runner = MotionSequenceRunner::from_config(&device, &config);

    assert_eq!(runner.timeout(), Duration::from_millis(1234));
    runner.ensure_servoing_mode().unwrap();
    assert_eq!(device.servoing_modes(), vec![ServoingMode::Bypass]);
}

#[test]
fn test_move_to_home() {
    let device = MockDevice::new();
    let runner = MotionSequenceRunner::new(&device, Duration::from_secs(2));

    assert!(
        runner
            .move_to_stored("Home", ActionType::ReachJointAngles)
            .unwrap()
    );
    assert_eq!(device.sent_actions().len(), 1);
}

#[test]
fn test_drawing_routine_visits_every_corner() {
    let device = MockDevice::new();
    let config = ClientConfig::default();
    let routine = DrawingRoutine::new(&device, &config);

    assert!(routine.run().unwrap());

    // Home + 接近 + 4 个顶点
    assert_eq!(device.sent_actions().len(), 6);
    let [x, y, z] = device.tool_pose().position();
    assert!((x - 0.726).abs() < 1e-5);
    assert!((y - 0.0513).abs() < 1e-5);
    assert!((z - 0.064).abs() < 1e-5);
}

#[test]
fn test_drawing_routine_without_home() {
    let device = MockDevice::new();
    device.clear_stored_actions();
    let routine = DrawingRoutine::new(&device, &ClientConfig::default());

    assert!(!routine.run().unwrap());
    assert!(device.sent_actions().is_empty());
}

#[test]
fn test_drawing_routine_stops_on_approach_timeout() {
    let device = MockDevice::new();
    device.script_actions([ActionBehavior::Complete, ActionBehavior::Silent]);
    let config = ClientConfig {
        action_timeout_ms: 50,
        ..ClientConfig::default()
    };
    let routine = DrawingRoutine::new(&device, &config);

    assert!(!routine.run().unwrap());
    assert_eq!(device.sent_actions().len(), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// 前 K 步完成、第 K+1 步超时时，恰好下发 K+1 个动作
    #[test]
    fn fail_fast_after_first_timeout((n, k) in (1usize..6).prop_flat_map(|n| (Just(n), 0..n))) {
        let device = MockDevice::new();
        device.script_actions(
            std::iter::repeat_n(ActionBehavior::Complete, k).chain([ActionBehavior::Silent]),
        );
        let runner = MotionSequenceRunner::new(&device, Duration::from_millis(20));

        prop_assert!(!runner.run(&steps(n)).unwrap());
        prop_assert_eq!(device.sent_actions().len(), k + 1);
        prop_assert_eq!(device.active_subscriptions(), 0);
    }
}
