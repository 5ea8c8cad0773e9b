use crate::ScheduleConfig;

#[test]
fn test_builder_defaults_match_default() {
    assert_eq!(ScheduleConfig::builder().build(), ScheduleConfig::default());
}

#[test]
fn test_builder_overrides() {
    let config = ScheduleConfig::builder().noopt(true).parallel_min(16).cuda_threads(256).vectorize(false).build();
    assert!(config.noopt);
    assert_eq!(config.parallel_min, 16);
    assert_eq!(config.cuda_threads, Some(256));
    assert!(!config.vectorize);
}

#[test]
fn test_global_is_stable() {
    let a = ScheduleConfig::global() as *const _;
    let b = ScheduleConfig::global() as *const _;
    assert_eq!(a, b);
}
