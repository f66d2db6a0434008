use crate::nn::NnError;
use crate::train::TrainError;
use crate::{assert_err, assert_panic};

#[test]
fn test_assert_panic_macro() {
    assert_panic!(panic!("test panic"));
    assert_panic!(panic!("custom test panic msg"), "custom test panic msg");
    let n = 3;
    assert_panic!(panic!("formatted {n}"), "formatted 3");
}

#[test]
#[should_panic(expected = "panic消息与预期不符")]
fn test_assert_panic_macro_wrong_message() {
    assert_panic!(panic!("actual"), "expected");
}

#[test]
#[should_panic(expected = "没有触发panic")]
fn test_assert_panic_macro_no_panic() {
    assert_panic!(1 + 1);
}

#[test]
fn test_assert_err_macro() {
    let result: Result<(), TrainError> =
        Err(TrainError::InvalidConfig("batch_size 必须大于 0".to_string()));
    assert_err!(result);
    assert_err!(result, TrainError::InvalidConfig(_));
    assert_err!(result, TrainError::InvalidConfig(msg) if msg.contains("batch_size"));

    let result: Result<(), NnError> = Err(NnError::ShapeMismatch {
        expected: vec![2, 2],
        got: vec![3, 2],
        message: "消息".to_string(),
    });
    assert_err!(result, NnError::ShapeMismatch { got, .. } if got == &[3, 2]);
}

#[test]
#[should_panic(expected = "预期错误匹配")]
fn test_assert_err_macro_wrong_variant() {
    let result: Result<(), NnError> = Err(NnError::MissingCache("relu0".to_string()));
    assert_err!(result, NnError::ShapeMismatch { .. });
}
