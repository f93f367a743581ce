use attempt_session::{AttemptTimer, TimerStatus};
use std::time::Duration;

fn timer(secs: u64) -> AttemptTimer {
    AttemptTimer::new(Duration::from_secs(secs), Duration::from_secs(300))
}

#[test]
fn test_countdown() {
    for (d, n) in [(10, 0), (10, 3), (10, 9), (3600, 1800)] {
        let mut t = timer(d);
        for _ in 0..n {
            t.tick();
        }
        assert_eq!(t.remaining(), d - n, "{} ticks from {}", n, d);
        assert!(!t.is_expired());
    }
}

#[test]
fn test_stays_at_zero() {
    for (d, n) in [(5, 5), (5, 6), (5, 100), (0, 1)] {
        let mut t = timer(d);
        for _ in 0..n {
            t.tick();
        }
        assert_eq!(t.remaining(), 0, "{} ticks from {}", n, d);
        assert_eq!(t.status(), TimerStatus::Expired);
    }
}

#[test]
fn test_expiry_reported_by_tick() {
    let mut t = timer(2);
    assert_eq!(t.tick(), TimerStatus::Running(1));
    assert_eq!(t.tick(), TimerStatus::Expired);
    assert_eq!(t.tick(), TimerStatus::Expired);
    assert_eq!(t.to_string(), "00:00");
}
