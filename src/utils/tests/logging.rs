use crate::utils::init_logging;

#[test]
fn test_init_logging_twice() {
    // 同一进程内只能安装一次全局订阅者；第二次必然失败但不 panic
    let _ = init_logging(false);
    let err = init_logging(true).unwrap_err();
    assert!(!err.to_string().is_empty());
}
