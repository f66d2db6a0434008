use crate::assert_err;
use super::check_gradients;
use crate::nn::layer::Linear;
use crate::nn::{Layer, NnError, TraitLayer};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn linear(in_features: usize, out_features: usize) -> Linear {
    Linear::new(in_features, out_features, "fc", &mut StdRng::seed_from_u64(0))
}

#[test]
fn test_linear_init_bounds() {
    let layer = linear(64, 2);
    assert_eq!(layer.weights().value().shape(), &[64, 2]);
    assert_eq!(layer.bias().value().shape(), &[2]);
    let bound = 1.0 / 8.0;
    for &v in layer
        .weights()
        .value()
        .as_slice()
        .iter()
        .chain(layer.bias().value().as_slice())
    {
        assert!((-bound..=bound).contains(&v));
    }
}

#[test]
fn test_linear_forward_known_values() {
    let mut layer = Layer::from(linear(3, 2));
    {
        let mut params = layer.parameters_mut();
        *params[0].value_mut() = Tensor::new(&[1.0, 0.0, 0.0, 1.0, 1.0, -1.0], &[3, 2]);
        *params[1].value_mut() = Tensor::new(&[0.5, -0.5], &[2]);
    }
    let input = Tensor::new(&[1.0, 2.0, 3.0, 0.0, 0.0, 1.0], &[2, 3]);
    let output = layer.forward(&input).unwrap();
    assert_eq!(output, Tensor::new(&[4.5, -1.5, 1.5, -1.5], &[2, 2]));
}

#[test]
fn test_linear_backward_known_values() {
    let mut layer = Layer::from(linear(2, 1));
    *layer.parameters_mut()[0].value_mut() = Tensor::new(&[2.0, -3.0], &[2, 1]);
    let input = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    layer.forward(&input).unwrap();
    let grad_input = layer.backward(&Tensor::new(&[1.0, 0.5], &[2, 1])).unwrap();

    assert_eq!(grad_input, Tensor::new(&[2.0, -3.0, 1.0, -1.5], &[2, 2]));
    let params = layer.parameters();
    let grad_w = params[0].grad().unwrap();
    assert_abs_diff_eq!(grad_w[[0, 0]], 2.5);
    assert_abs_diff_eq!(grad_w[[1, 0]], 4.0);
    assert_abs_diff_eq!(params[1].grad().unwrap()[[0]], 1.5);
}

#[test]
fn test_linear_gradients() {
    let input = Tensor::new_uniform_seeded(-1.0, 1.0, &[4, 5], 9);
    check_gradients(Layer::from(linear(5, 3)), &input, 1e-2);
}

#[test]
fn test_linear_errors() {
    let mut layer = linear(4, 2);
    assert_err!(layer.backward(&Tensor::zeros(&[1, 2])), NnError::MissingCache(_));
    assert_err!(layer.forward(&Tensor::zeros(&[1, 3])), NnError::ShapeMismatch { .. });
    assert_err!(layer.forward(&Tensor::zeros(&[4])), NnError::ShapeMismatch { .. });
    layer.forward(&Tensor::zeros(&[3, 4])).unwrap();
    assert_err!(layer.backward(&Tensor::zeros(&[2, 2])), NnError::ShapeMismatch { .. });
}
