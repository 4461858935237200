// Statistics tests

use insights::stats::calc_stats;

#[test]
fn stats_of_one_to_four() {
    let s = calc_stats(&[4, 1, 3, 2]).unwrap();
    assert_eq!(s.min, 1);
    assert_eq!(s.max, 4);
    assert!((s.mean - 2.5).abs() < 1e-9);
    assert!((s.median - 2.5).abs() < 1e-9);
    assert!((s.std_dev - 1.25f64.sqrt()).abs() < 1e-9);
}

#[test]
fn stats_odd_count_median_is_middle() {
    let s = calc_stats(&[10, 1, 7]).unwrap();
    assert_eq!(s.median, 7.0);
    assert_eq!(s.std_dev, calc_stats(&[1, 7, 10]).unwrap().std_dev);
}

#[test]
fn stats_single_value() {
    let s = calc_stats(&[42]).unwrap();
    assert_eq!((s.min, s.max), (42, 42));
    assert_eq!(s.mean, 42.0);
    assert_eq!(s.std_dev, 0.0);
}

#[test]
fn stats_empty_is_absent() {
    assert!(calc_stats(&[]).is_none());
}
