/*
 * @Description  : Conv2d (2D 卷积) 层
 *
 * 输入/输出形状：
 * - 输入：[batch_size, in_channels, H, W]
 * - 输出：[batch_size, out_channels, H', W']
 *
 * 输出尺寸计算：
 * H' = (H + 2*padding_h - kernel_h) / stride_h + 1
 * W' = (W + 2*padding_w - kernel_w) / stride_w + 1
 *
 * 计算：output = conv2d(x, K) + b
 * 填充区域视为 0，不实际构造填充后的张量；前向与反向均按 batch 样本用 Rayon 并行。
 */

use super::{Parameter, TraitLayer, expect_rank};
use crate::nn::NnError;
use crate::tensor::Tensor;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conv2d {
    name: String,
    /// 卷积核参数 [out_channels, in_channels, kernel_h, kernel_w]
    kernel: Parameter,
    /// 偏置参数 [out_channels]
    bias: Parameter,
    in_channels: usize,
    out_channels: usize,
    kernel_size: (usize, usize),
    stride: (usize, usize),
    padding: (usize, usize),
    #[serde(skip)]
    input: Option<Tensor>,
}

/// 单个样本卷积所需的尺寸信息
#[derive(Clone, Copy)]
struct Geometry {
    in_c: usize,
    in_h: usize,
    in_w: usize,
    out_c: usize,
    out_h: usize,
    out_w: usize,
    k_h: usize,
    k_w: usize,
    stride: (usize, usize),
    padding: (usize, usize),
}

impl Geometry {
    /// 输出位置(oh, ow)与核位置(kh, kw)对应的输入坐标；落在填充区时返回 None
    #[inline]
    fn source(&self, oh: usize, ow: usize, kh: usize, kw: usize) -> Option<(usize, usize)> {
        let h = (oh * self.stride.0 + kh) as isize - self.padding.0 as isize;
        let w = (ow * self.stride.1 + kw) as isize - self.padding.1 as isize;
        if h < 0 || w < 0 || h >= self.in_h as isize || w >= self.in_w as isize {
            None
        } else {
            Some((h as usize, w as usize))
        }
    }
}

impl Conv2d {
    /// 创建新的 Conv2d 层，卷积核按 Kaiming 正态分布初始化，偏置为 0
    ///
    /// # 参数
    /// - `in_channels`: 输入通道数
    /// - `out_channels`: 输出通道数
    /// - `kernel_size`: 卷积核大小 (kH, kW)
    /// - `stride`: 步长 (sH, sW)
    /// - `padding`: 填充 (pH, pW)
    /// - `name`: 层名称
    /// - `rng`: 初始化用随机数生成器
    pub fn new<R: Rng + ?Sized>(
        in_channels: usize,
        out_channels: usize,
        kernel_size: (usize, usize),
        stride: (usize, usize),
        padding: (usize, usize),
        name: &str,
        rng: &mut R,
    ) -> Self {
        assert!(stride.0 > 0 && stride.1 > 0, "Conv2d: 步长必须大于 0");
        let fan_in = (in_channels * kernel_size.0 * kernel_size.1) as f32;
        let std = (2.0 / fan_in).sqrt();
        let kernel = Tensor::new_normal_with_rng(
            0.0,
            std,
            &[out_channels, in_channels, kernel_size.0, kernel_size.1],
            rng,
        );
        Self {
            name: name.to_string(),
            kernel: Parameter::new(&format!("{name}.kernel"), kernel),
            bias: Parameter::new(&format!("{name}.bias"), Tensor::zeros(&[out_channels])),
            in_channels,
            out_channels,
            kernel_size,
            stride,
            padding,
            input: None,
        }
    }

    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub fn out_channels(&self) -> usize {
        self.out_channels
    }

    pub fn kernel(&self) -> &Parameter {
        &self.kernel
    }

    pub fn bias(&self) -> &Parameter {
        &self.bias
    }

    /// 给定输入空间尺寸，计算输出空间尺寸
    pub fn output_size(&self, in_h: usize, in_w: usize) -> Option<(usize, usize)> {
        let (k_h, k_w) = self.kernel_size;
        let padded_h = in_h + 2 * self.padding.0;
        let padded_w = in_w + 2 * self.padding.1;
        if padded_h < k_h || padded_w < k_w {
            return None;
        }
        Some((
            (padded_h - k_h) / self.stride.0 + 1,
            (padded_w - k_w) / self.stride.1 + 1,
        ))
    }

    fn geometry(&self, input_shape: &[usize]) -> Result<Geometry, NnError> {
        let (in_h, in_w) = (input_shape[2], input_shape[3]);
        if input_shape[1] != self.in_channels {
            return Err(NnError::ShapeMismatch {
                expected: vec![input_shape[0], self.in_channels, in_h, in_w],
                got: input_shape.to_vec(),
                message: format!("{}的输入通道数不符", self.name),
            });
        }
        let (out_h, out_w) = self.output_size(in_h, in_w).ok_or_else(|| NnError::ShapeMismatch {
            expected: vec![input_shape[0], self.in_channels, self.kernel_size.0, self.kernel_size.1],
            got: input_shape.to_vec(),
            message: format!("{}的输入空间尺寸小于卷积核", self.name),
        })?;
        Ok(Geometry {
            in_c: self.in_channels,
            in_h,
            in_w,
            out_c: self.out_channels,
            out_h,
            out_w,
            k_h: self.kernel_size.0,
            k_w: self.kernel_size.1,
            stride: self.stride,
            padding: self.padding,
        })
    }
}

impl TraitLayer for Conv2d {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, NnError> {
        expect_rank(&self.name, input, 4)?;
        let g = self.geometry(input.shape())?;
        let batch_size = input.shape()[0];

        let x = input.as_slice();
        let k = self.kernel.value().as_slice();
        let b = self.bias.value().as_slice();
        let in_sample = g.in_c * g.in_h * g.in_w;
        let out_sample = g.out_c * g.out_h * g.out_w;

        // Rayon 并行计算每个 batch 样本
        let batch_results: Vec<Vec<f32>> = (0..batch_size)
            .into_par_iter()
            .map(|n| {
                let xs = &x[n * in_sample..(n + 1) * in_sample];
                let mut out = vec![0.0f32; out_sample];
                for oc in 0..g.out_c {
                    for oh in 0..g.out_h {
                        for ow in 0..g.out_w {
                            let mut sum = b[oc];
                            for ic in 0..g.in_c {
                                for kh in 0..g.k_h {
                                    for kw in 0..g.k_w {
                                        if let Some((h, w)) = g.source(oh, ow, kh, kw) {
                                            sum += xs[(ic * g.in_h + h) * g.in_w + w]
                                                * k[((oc * g.in_c + ic) * g.k_h + kh) * g.k_w + kw];
                                        }
                                    }
                                }
                            }
                            out[(oc * g.out_h + oh) * g.out_w + ow] = sum;
                        }
                    }
                }
                out
            })
            .collect();

        self.input = Some(input.clone());
        let all_data: Vec<f32> = batch_results.into_iter().flatten().collect();
        Ok(Tensor::from_vec(all_data, &[batch_size, g.out_c, g.out_h, g.out_w]))
    }

    /// 对于 Y = conv(X, K) + b:
    /// - dL/dX: 转置卷积
    /// - dL/dK: 输入与上游梯度的相关运算，跨 batch 累加
    /// - dL/db: 上游梯度在 batch 与空间维度上求和
    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, NnError> {
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| NnError::MissingCache(self.name.clone()))?;
        let g = self.geometry(input.shape())?;
        let batch_size = input.shape()[0];
        let expected = [batch_size, g.out_c, g.out_h, g.out_w];
        if grad_output.shape() != &expected[..] {
            return Err(NnError::ShapeMismatch {
                expected: expected.to_vec(),
                got: grad_output.shape().to_vec(),
                message: format!("{}的输出梯度形状须与前向输出一致", self.name),
            });
        }

        let x = input.as_slice();
        let dy = grad_output.as_slice();
        let k = self.kernel.value().as_slice();
        let in_sample = g.in_c * g.in_h * g.in_w;
        let out_sample = g.out_c * g.out_h * g.out_w;
        let kernel_len = k.len();

        // 每个样本各自得到 (dX, dK, db)
        let per_sample: Vec<(Vec<f32>, Vec<f32>, Vec<f32>)> = (0..batch_size)
            .into_par_iter()
            .map(|n| {
                let xs = &x[n * in_sample..(n + 1) * in_sample];
                let dys = &dy[n * out_sample..(n + 1) * out_sample];
                let mut dx = vec![0.0f32; in_sample];
                let mut dk = vec![0.0f32; kernel_len];
                let mut db = vec![0.0f32; g.out_c];
                for oc in 0..g.out_c {
                    for oh in 0..g.out_h {
                        for ow in 0..g.out_w {
                            let grad_val = dys[(oc * g.out_h + oh) * g.out_w + ow];
                            if grad_val == 0.0 {
                                continue;
                            }
                            db[oc] += grad_val;
                            for ic in 0..g.in_c {
                                for kh in 0..g.k_h {
                                    for kw in 0..g.k_w {
                                        if let Some((h, w)) = g.source(oh, ow, kh, kw) {
                                            let xi = (ic * g.in_h + h) * g.in_w + w;
                                            let ki = ((oc * g.in_c + ic) * g.k_h + kh) * g.k_w + kw;
                                            dx[xi] += grad_val * k[ki];
                                            dk[ki] += grad_val * xs[xi];
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                (dx, dk, db)
            })
            .collect();

        let mut grad_input = Vec::with_capacity(batch_size * in_sample);
        let mut grad_kernel = vec![0.0f32; kernel_len];
        let mut grad_bias = vec![0.0f32; g.out_c];
        for (dx, dk, db) in per_sample {
            grad_input.extend(dx);
            grad_kernel.iter_mut().zip(dk).for_each(|(a, v)| *a += v);
            grad_bias.iter_mut().zip(db).for_each(|(a, v)| *a += v);
        }

        let kernel_shape = self.kernel.value().shape().to_vec();
        self.kernel
            .accumulate_grad(&Tensor::from_vec(grad_kernel, &kernel_shape))?;
        self.bias
            .accumulate_grad(&Tensor::from_vec(grad_bias, &[g.out_c]))?;
        Ok(Tensor::from_vec(grad_input, input.shape()))
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.kernel, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.kernel, &mut self.bias]
    }
}
