use std::thread;
use std::time::{Duration, Instant};

use driver::{DriverOptions, UniformDriver, FALLBACK_COLOR};

fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

fn threaded_driver() -> UniformDriver {
    UniformDriver::new(DriverOptions {
        tick_interval: Some(Duration::from_millis(2)),
        ..DriverOptions::default()
    })
}

#[test]
fn ticker_advances_time_until_stopped() {
    let mut driver = threaded_driver();
    driver.start().expect("start driver");
    assert!(wait_for(|| driver.current_uniforms().time > 0.0));

    driver.stop();
    let frozen = driver.current_uniforms().time;
    thread::sleep(Duration::from_millis(30));
    assert_eq!(driver.current_uniforms().time, frozen);
    assert!(!driver.is_running());
}

#[test]
fn start_while_running_restarts_from_zero() {
    let mut driver = threaded_driver();
    driver.start().expect("start driver");
    assert!(wait_for(|| driver.current_uniforms().time > 4.0));
    let before = driver.current_uniforms().time;

    driver.start().expect("restart driver");
    assert!(driver.current_uniforms().time < before);
    driver.stop();
}

#[test]
fn setters_apply_while_the_clock_runs() {
    let mut driver = threaded_driver();
    driver.start().expect("start driver");

    driver.report_viewport_size(1170.0, 2532.0);
    driver.set_speed(0.1);
    driver.set_color("not-a-color");

    let bundle = driver.current_uniforms();
    assert_eq!(bundle.resolution, [1170.0, 2532.0]);
    assert_eq!(bundle.speed, 0.1);
    assert_eq!(bundle.main_color, FALLBACK_COLOR);
    driver.stop();
}

#[test]
fn dropping_a_running_driver_stops_the_ticker() {
    let mut driver = threaded_driver();
    driver.start().expect("start driver");
    drop(driver);
}
