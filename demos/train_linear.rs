//! Trains a linear classifier on synthetic blobs with the hinge loss.

use margin_ai::backprop::{hinge_loss, matmul, sgd};
use margin_ai::tensors::{Ten64, Tensor, WithGrad};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CLASSES: usize = 3;
const FEATURES: usize = 2;
const PER_CLASS: usize = 30;
const EPOCHS: usize = 200;

fn main() {
    let mut rng = StdRng::seed_from_u64(42);

    // one noisy blob per class, centered on a ring of radius 2
    let mut xs = Vec::with_capacity(CLASSES * PER_CLASS * FEATURES);
    let mut ys = Vec::with_capacity(CLASSES * PER_CLASS);
    for k in 0..CLASSES {
        let angle = k as f64 * std::f64::consts::TAU / CLASSES as f64;
        let (cx, cy) = (2.0 * angle.cos(), 2.0 * angle.sin());
        for _ in 0..PER_CLASS {
            xs.push(cx + rng.random_range(-0.6..0.6));
            xs.push(cy + rng.random_range(-0.6..0.6));
            ys.push(k);
        }
    }
    let n = ys.len();
    let x = Tensor::new(vec![n, FEATURES], xs);
    let y = Tensor::new(vec![n], ys);

    let mut w = WithGrad::new(Tensor::new(
        vec![FEATURES, CLASSES],
        (0..FEATURES * CLASSES)
            .map(|_| rng.random_range(-0.01..0.01))
            .collect::<Vec<f64>>(),
    ));

    println!("Beginning training...");

    for epoch in 0..EPOCHS {
        let (loss, back) = hinge_loss(&w, &x, &y, 1e-3);
        w.grad = back(1.0);
        sgd(&mut w, 0.05);

        if epoch % 20 == 0 {
            println!(
                "epoch {epoch:>3}: loss={loss:.4}, acc={:.1}%",
                accuracy(&w, &x, &y) * 100.0
            );
        }
    }

    println!("final: acc={:.1}%", accuracy(&w, &x, &y) * 100.0);
}

fn accuracy(w: &WithGrad<Ten64>, x: &Ten64, y: &Tensor<usize>) -> f64 {
    let xg = WithGrad::new(x.clone());
    let (scores, _back) = matmul(&xg, w);

    let correct = scores
        .data
        .chunks(CLASSES)
        .zip(&y.data)
        .filter(|&(ref row, &label)| {
            let best = row
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(j, _)| j)
                .unwrap();
            best == label
        })
        .count();

    correct as f64 / y.data.len() as f64
}
