//! Minimizes the Rosenbrock function `(x - 1)^2 + 100 (y - x^2)^2` with
//! plain gradient descent, printing one `x y` line per iteration.
//!
//! Run with `cargo run --example minimize [iterations]`.

use vecgrad::{Node, Result};

const ALPHA: f64 = 0.002;
const DEFAULT_ITERS: usize = 10_000;

fn rosenbrock(x: &Node, y: &Node) -> Result<Node> {
    let dx = x - 1.0;
    let r = y.try_sub(&x.try_mul(x)?)?;
    dx.try_mul(&dx)?.try_add(&(100.0 * &r.try_mul(&r)?))
}

fn step(p: &Node) -> Result<Node> {
    let grad = p.get_grad()?;
    let next = p.try_sub(&Node::constant(grad.scale(ALPHA)))?;
    next.zero_grad();
    Ok(next)
}

fn main() -> Result<()> {
    env_logger::init();

    let iters = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ITERS);

    let mut x = Node::scalar(-0.5);
    let mut y = Node::scalar(1.2);
    println!("{} {}", x.get_value()[0], y.get_value()[0]);

    for i in 0..iters {
        let f = rosenbrock(&x, &y)?;
        f.backward()?;
        if i % 1000 == 0 {
            eprintln!("iter {i}: f = {}", f.get_value()[0]);
        }

        x = step(&x)?;
        y = step(&y)?;
        println!("{} {}", x.get_value()[0], y.get_value()[0]);
    }

    eprintln!("minimum near ({}, {})", x.get_value()[0], y.get_value()[0]);
    Ok(())
}
