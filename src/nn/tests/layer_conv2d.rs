use crate::assert_err;
use super::check_gradients;
use crate::nn::layer::Conv2d;
use crate::nn::{Layer, NnError, TraitLayer};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn conv(
    in_c: usize,
    out_c: usize,
    kernel: usize,
    stride: usize,
    padding: usize,
) -> Conv2d {
    Conv2d::new(
        in_c,
        out_c,
        (kernel, kernel),
        (stride, stride),
        (padding, padding),
        "conv",
        &mut StdRng::seed_from_u64(42),
    )
}

#[test]
fn test_conv2d_output_shape() {
    let mut layer = conv(3, 16, 5, 4, 2);
    assert_eq!(layer.output_size(224, 224), Some((56, 56)));
    let output = layer.forward(&Tensor::zeros(&[2, 3, 17, 17])).unwrap();
    assert_eq!(output.shape(), &[2, 16, 5, 5]);

    let mut layer = conv(16, 32, 3, 2, 1);
    assert_eq!(layer.output_size(56, 56), Some((28, 28)));
    let output = layer.forward(&Tensor::zeros(&[1, 16, 8, 7])).unwrap();
    assert_eq!(output.shape(), &[1, 32, 4, 4]);
}

#[test]
fn test_conv2d_init() {
    let layer = conv(3, 8, 3, 1, 1);
    assert_eq!(layer.kernel().value().shape(), &[8, 3, 3, 3]);
    assert_eq!(layer.bias().value(), &Tensor::zeros(&[8]));
    assert!(layer.kernel().value().as_slice().iter().any(|&v| v != 0.0));
}

#[test]
fn test_conv2d_forward_known_values() {
    // 全 1 的 3x3 核、padding 1 作用在全 1 的 3x3 输入上：输出即每个位置的有效邻居数
    let mut layer = Layer::from(conv(1, 1, 3, 1, 1));
    {
        let mut params = layer.parameters_mut();
        *params[0].value_mut() = Tensor::full(1.0, &[1, 1, 3, 3]);
        *params[1].value_mut() = Tensor::new(&[0.5], &[1]);
    }
    let output = layer.forward(&Tensor::full(1.0, &[1, 1, 3, 3])).unwrap();
    let expected = Tensor::new(&[4.5, 6.5, 4.5, 6.5, 9.5, 6.5, 4.5, 6.5, 4.5], &[1, 1, 3, 3]);
    assert_eq!(output, expected);
}

#[test]
fn test_conv2d_stride_picks_positions() {
    let mut layer = Layer::from(conv(1, 1, 1, 2, 0));
    *layer.parameters_mut()[0].value_mut() = Tensor::full(2.0, &[1, 1, 1, 1]);
    let input = Tensor::new(&(0..16).map(|v| v as f32).collect::<Vec<_>>(), &[1, 1, 4, 4]);
    let output = layer.forward(&input).unwrap();
    assert_eq!(output, Tensor::new(&[0.0, 4.0, 16.0, 20.0], &[1, 1, 2, 2]));
}

#[test]
fn test_conv2d_gradients() {
    let input = Tensor::new_uniform_seeded(-1.0, 1.0, &[2, 2, 5, 5], 3);
    check_gradients(Layer::from(conv(2, 3, 3, 2, 1)), &input, 1e-2);

    let input = Tensor::new_uniform_seeded(-1.0, 1.0, &[1, 3, 9, 9], 4);
    check_gradients(Layer::from(conv(3, 2, 5, 4, 2)), &input, 1e-2);
}

#[test]
fn test_conv2d_gradients_accumulate() {
    let mut layer = Layer::from(conv(1, 2, 3, 1, 1));
    let input = Tensor::new_uniform_seeded(-1.0, 1.0, &[1, 1, 4, 4], 5);
    let output = layer.forward(&input).unwrap();
    let grad = Tensor::full(1.0, output.shape());

    layer.backward(&grad).unwrap();
    let once = layer.parameters()[0].grad().unwrap().clone();
    layer.backward(&grad).unwrap();
    let twice = layer.parameters()[0].grad().unwrap().clone();
    for (a, b) in once.as_slice().iter().zip(twice.as_slice()) {
        assert_abs_diff_eq!(2.0 * a, *b, epsilon = 1e-5);
    }
}

#[test]
fn test_conv2d_errors() {
    let mut layer = conv(3, 4, 3, 1, 1);
    assert_err!(layer.backward(&Tensor::zeros(&[1, 4, 2, 2])), NnError::MissingCache(_));
    assert_err!(layer.forward(&Tensor::zeros(&[1, 2, 4, 4])), NnError::ShapeMismatch { .. });
    assert_err!(layer.forward(&Tensor::zeros(&[3, 4, 4])), NnError::ShapeMismatch { .. });

    let mut layer = conv(1, 1, 5, 1, 0);
    assert_err!(layer.forward(&Tensor::zeros(&[1, 1, 3, 3])), NnError::ShapeMismatch { .. });

    let mut layer = conv(1, 1, 3, 1, 1);
    layer.forward(&Tensor::zeros(&[1, 1, 4, 4])).unwrap();
    assert_err!(layer.backward(&Tensor::zeros(&[1, 1, 3, 3])), NnError::ShapeMismatch { .. });
}
