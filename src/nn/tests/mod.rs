mod layer_conv2d;
mod layer_linear;
mod optimizer;

use crate::nn::{Layer, TraitLayer};
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// 用于数值梯度检验的标量函数：L = sum(layer(x) ⊙ r)，r 为固定的随机权重
fn weighted_sum(layer: &mut Layer, input: &Tensor, weights: &Tensor) -> f32 {
    let output = layer.forward(input).unwrap();
    output
        .as_slice()
        .iter()
        .zip(weights.as_slice())
        .map(|(y, r)| y * r)
        .sum()
}

/// 以中心差分检验`layer`对输入和全部参数的解析梯度
pub(super) fn check_gradients(mut layer: Layer, input: &Tensor, tolerance: f32) {
    let eps = 1e-2;
    let output = layer.forward(input).unwrap();
    let weights = Tensor::new_uniform_with_rng(
        -1.0,
        1.0,
        output.shape(),
        &mut StdRng::seed_from_u64(7),
    );

    for p in layer.parameters_mut() {
        p.zero_grad();
    }
    layer.forward(input).unwrap();
    let grad_input = layer.backward(&weights).unwrap();
    let analytic_params: Vec<Tensor> = layer
        .parameters()
        .iter()
        .map(|p| p.grad().expect("参数应有梯度").clone())
        .collect();

    // 对输入
    for i in 0..input.size() {
        let mut plus = input.clone();
        plus.as_slice_mut()[i] += eps;
        let mut minus = input.clone();
        minus.as_slice_mut()[i] -= eps;
        let numeric = (weighted_sum(&mut layer, &plus, &weights)
            - weighted_sum(&mut layer, &minus, &weights))
            / (2.0 * eps);
        let analytic = grad_input.as_slice()[i];
        assert!(
            (numeric - analytic).abs() <= tolerance * (1.0 + numeric.abs()),
            "输入梯度[{i}]: 数值{numeric} vs 解析{analytic}"
        );
    }

    // 对参数
    for (p_index, analytic) in analytic_params.iter().enumerate() {
        for i in 0..analytic.size() {
            let original = layer.parameters()[p_index].value().as_slice()[i];
            layer.parameters_mut()[p_index].value_mut().as_slice_mut()[i] = original + eps;
            let plus = weighted_sum(&mut layer, input, &weights);
            layer.parameters_mut()[p_index].value_mut().as_slice_mut()[i] = original - eps;
            let minus = weighted_sum(&mut layer, input, &weights);
            layer.parameters_mut()[p_index].value_mut().as_slice_mut()[i] = original;

            let numeric = (plus - minus) / (2.0 * eps);
            let analytic = analytic.as_slice()[i];
            assert!(
                (numeric - analytic).abs() <= tolerance * (1.0 + numeric.abs()),
                "参数{p_index}梯度[{i}]: 数值{numeric} vs 解析{analytic}"
            );
        }
    }
}
