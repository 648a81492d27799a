use margin_ai::backprop::{hinge_loss, matmul, relu, sgd};
use margin_ai::tensor;
use margin_ai::tensors::{Tensor, WithGrad};

#[test]
fn test_tensor_shape_mismatch_panics() {
    let result = std::panic::catch_unwind(|| {
        Tensor::new(vec![2, 2], vec![1.0, 2.0, 3.0]);
    });
    assert!(result.is_err());
}

#[test]
fn test_tensor_macro() {
    let t = tensor!([[1.0, 2.0], [3.0, 4.0]]);
    assert_eq!(t.shape, vec![2, 2]);
    assert_eq!(t.data, vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_tensor_zeros_and_update() {
    let mut t = Tensor::<f64>::zeros(vec![2, 3]);
    assert_eq!(t.shape, vec![2, 3]);
    assert_eq!(t.data, vec![0.0; 6]);

    t.update(Tensor::new(vec![2, 3], vec![1.0; 6]));
    assert_eq!(t.data, vec![1.0; 6]);
}

#[test]
fn test_matmul_backprop() {
    let a = WithGrad::new(tensor!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]));
    let b = WithGrad::new(tensor!([[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]));

    let (out, back) = matmul(&a, &b);
    assert_eq!(out.shape, vec![2, 2]);
    assert_eq!(out.data, vec![58.0, 64.0, 139.0, 154.0]);

    let (da, db) = back(&tensor!([[1.0, 1.0], [1.0, 1.0]]));
    assert_eq!(da.shape, vec![2, 3]);
    assert_eq!(da.data, vec![15.0, 19.0, 23.0, 15.0, 19.0, 23.0]);
    assert_eq!(db.shape, vec![3, 2]);
    assert_eq!(db.data, vec![5.0, 5.0, 7.0, 7.0, 9.0, 9.0]);
}

#[test]
fn test_relu_backprop() {
    let input = WithGrad::new(Tensor::new(vec![3], vec![-1.0, 0.0, 2.0]));
    let (out, back) = relu(&input);
    assert_eq!(out.data, vec![0.0, 0.0, 2.0]);

    let grad_in = back(&Tensor::new(vec![3], vec![1.0, 1.0, 1.0]));
    assert_eq!(grad_in.data, vec![0.0, 0.0, 1.0]);
}

#[test]
fn test_sgd() {
    let mut w = WithGrad {
        value: Tensor::new(vec![2], vec![1.0, 2.0]),
        grad: Tensor::new(vec![2], vec![0.1, 0.2]),
    };
    sgd(&mut w, 0.5);
    assert_eq!(w.value.data, vec![0.95, 1.9]);
    assert_eq!(w.grad.data, vec![0.0, 0.0]);
}

#[test]
fn test_hinge_loss_zero_weights() {
    // all-zero weights: every incorrect margin is exactly 1, so each row
    // contributes C - 1 and the gradient is a pure function of X
    let w = WithGrad::new(Tensor::zeros(vec![2, 3]));
    let x = tensor!([[1.0, 2.0], [-1.0, 0.0]]);
    let y = Tensor::new(vec![2], vec![0usize, 1]);

    let (loss, back) = hinge_loss(&w, &x, &y, 0.0);
    assert_eq!(loss, 2.0);

    let dw = back(1.0);
    assert_eq!(dw.shape, vec![2, 3]);
    assert_eq!(dw.data, vec![-1.5, 1.5, 0.0, -2.0, 1.0, 1.0]);
}

#[test]
fn test_hinge_loss_backward_scales_with_upstream_gradient() {
    let w = WithGrad::new(Tensor::zeros(vec![2, 3]));
    let x = tensor!([[1.0, 2.0]]);
    let y = Tensor::new(vec![1], vec![0usize]);

    let (_, back) = hinge_loss(&w, &x, &y, 0.0);
    assert_eq!(back(1.0).data, vec![-2.0, 1.0, 1.0, -4.0, 2.0, 2.0]);
    assert_eq!(back(0.5).data, vec![-1.0, 0.5, 0.5, -2.0, 1.0, 1.0]);
}

#[test]
fn test_hinge_loss_rejects_feature_mismatch() {
    let result = std::panic::catch_unwind(|| {
        let w = WithGrad::new(Tensor::zeros(vec![3, 4]));
        let x = tensor!([[1.0, 2.0]]);
        let y = Tensor::new(vec![1], vec![0usize]);
        hinge_loss(&w, &x, &y, 0.0);
    });
    assert!(result.is_err());
}

#[test]
fn test_hinge_loss_rejects_label_count_mismatch() {
    let result = std::panic::catch_unwind(|| {
        let w = WithGrad::new(Tensor::zeros(vec![2, 4]));
        let x = tensor!([[1.0, 2.0], [3.0, 4.0]]);
        let y = Tensor::new(vec![1], vec![0usize]);
        hinge_loss(&w, &x, &y, 0.0);
    });
    assert!(result.is_err());
}

#[test]
fn test_hinge_loss_rejects_out_of_range_label() {
    let result = std::panic::catch_unwind(|| {
        let w = WithGrad::new(Tensor::zeros(vec![2, 4]));
        let x = tensor!([[1.0, 2.0]]);
        let y = Tensor::new(vec![1], vec![4usize]);
        hinge_loss(&w, &x, &y, 0.0);
    });
    assert!(result.is_err());
}

#[test]
fn test_matmul_rejects_inner_dimension_mismatch() {
    let result = std::panic::catch_unwind(|| {
        let a = WithGrad::new(tensor!([[1.0, 2.0]]));
        let b = WithGrad::new(tensor!([[1.0, 2.0]]));
        matmul(&a, &b);
    });
    assert!(result.is_err());
}
