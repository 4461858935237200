// RateLimiter tests: one accepted request per key per window

use insights::rate_limit::RateLimiter;
use std::time::Duration;

#[test]
fn second_request_inside_window_rejected() {
    let limiter = RateLimiter::new(Duration::from_secs(60)).unwrap();
    assert!(limiter.check("1.2.3.4"));
    assert!(!limiter.check("1.2.3.4"));
    assert!(limiter.check("5.6.7.8"));
}

#[test]
fn request_after_window_accepted() {
    let limiter = RateLimiter::new(Duration::from_millis(200)).unwrap();
    assert!(limiter.check("1.2.3.4"));
    assert!(!limiter.check("1.2.3.4"));
    std::thread::sleep(Duration::from_millis(300));
    assert!(limiter.check("1.2.3.4"));
}

#[test]
fn zero_window_rejected() {
    assert!(RateLimiter::new(Duration::ZERO).is_err());
}
