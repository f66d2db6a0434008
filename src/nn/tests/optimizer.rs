use crate::nn::{Adam, Optimizer, Parameter};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_adam_defaults() {
    let adam = Adam::new_default(1e-3);
    assert_abs_diff_eq!(adam.learning_rate(), 1e-3);
    assert_eq!(adam.steps(), 0);
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    let mut adam = Adam::new_default(0.1);
    let mut p = Parameter::new("p", Tensor::new(&[1.0, 1.0, 1.0], &[3]));
    p.accumulate_grad(&Tensor::new(&[0.5, -20.0, 0.0], &[3])).unwrap();

    adam.step(vec![&mut p]).unwrap();
    // 偏差修正后首步的位移约为 lr * sign(g)
    let value = p.value();
    assert_abs_diff_eq!(value[[0]], 0.9, epsilon = 1e-5);
    assert_abs_diff_eq!(value[[1]], 1.1, epsilon = 1e-5);
    assert_abs_diff_eq!(value[[2]], 1.0);
    assert_eq!(adam.steps(), 1);
}

#[test]
fn test_adam_skips_parameters_without_grad() {
    let mut adam = Adam::new_default(0.1);
    let mut p = Parameter::new("p", Tensor::new(&[3.0], &[1]));
    adam.step(vec![&mut p]).unwrap();
    assert_eq!(p.value(), &Tensor::new(&[3.0], &[1]));
}

#[test]
fn test_adam_minimizes_quadratic() {
    // f(θ) = sum((θ - c)^2)
    let target = Tensor::new(&[1.0, -2.0, 0.5], &[3]);
    let mut p = Parameter::new("theta", Tensor::zeros(&[3]));
    let mut adam = Adam::new_default(0.05);
    for _ in 0..500 {
        p.zero_grad();
        let grad = &(p.value() - &target) * 2.0;
        p.accumulate_grad(&grad).unwrap();
        adam.step(vec![&mut p]).unwrap();
    }
    for (v, c) in p.value().as_slice().iter().zip(target.as_slice()) {
        assert_abs_diff_eq!(v, c, epsilon = 1e-2);
    }
}

#[test]
fn test_adam_reset_and_learning_rate() {
    let mut adam = Adam::new_default(0.1);
    let mut p = Parameter::new("p", Tensor::new(&[1.0], &[1]));
    p.accumulate_grad(&Tensor::new(&[1.0], &[1])).unwrap();
    adam.step(vec![&mut p]).unwrap();
    adam.reset();
    assert_eq!(adam.steps(), 0);

    adam.set_learning_rate(0.01);
    assert_abs_diff_eq!(adam.learning_rate(), 0.01);
}

#[test]
fn test_parameter_accumulate_grad_shape_check() {
    let mut p = Parameter::new("p", Tensor::zeros(&[2, 2]));
    assert!(p.accumulate_grad(&Tensor::zeros(&[4])).is_err());
    p.accumulate_grad(&Tensor::full(1.0, &[2, 2])).unwrap();
    p.accumulate_grad(&Tensor::full(2.0, &[2, 2])).unwrap();
    assert_eq!(p.grad(), Some(&Tensor::full(3.0, &[2, 2])));
    p.zero_grad();
    assert!(p.grad().is_none());
}
