use vecgrad::approx::close;
use vecgrad::{GradError, Node, Vector, vector};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_add_then_sum_gives_ones() {
    init();
    let a = Node::tracked(vector![1.0, 2.0, 3.0, 4.0]);
    let b = Node::tracked(vector![0.5, 0.5, 0.5, 0.5]);
    (&a + &b).sum().backward().unwrap();
    assert_eq!(a.get_grad().unwrap(), Vector::ones(4));
    assert_eq!(b.get_grad().unwrap(), Vector::ones(4));
}

#[test]
fn test_mul_scales_seed_by_other_operand() {
    init();
    let a = Node::tracked(vector![1.0, 2.0, 3.0]);
    let b = Node::tracked(vector![2.0, 2.0, 2.0]);
    let r = &a * &b;
    assert_eq!(r, vector![2.0, 4.0, 6.0]);

    r.backward_with(vector![-1.0, 1.0, 2.0]).unwrap();
    assert_eq!(a.get_grad().unwrap(), vector![-2.0, 2.0, 4.0]);
    assert_eq!(b.get_grad().unwrap(), vector![-1.0, 2.0, 6.0]);
}

#[test]
fn test_sum_default_seed() {
    let v = Node::tracked(Vector::filled(10, 2.0));
    let s = v.sum();
    assert_eq!(s, Vector::scalar(20.0));
    s.backward().unwrap();
    assert_eq!(v.get_grad().unwrap(), Vector::ones(10));

    let g = Node::tracked(vector![5.0, 2.0, 3.0, 0.0]);
    let s = g.sum();
    assert_eq!(s, Vector::scalar(10.0));
    s.backward_with(vector![2.0]).unwrap();
    assert_eq!(g.get_grad().unwrap(), vector![2.0, 2.0, 2.0, 2.0]);
}

#[test]
fn test_chained_adds_accumulate_along_every_path() {
    let g1 = Node::tracked(vector![1.0]);
    let g2 = Node::tracked(vector![2.0]);

    let r1 = &g1 + &g2;
    assert_eq!(r1, vector![3.0]);
    let r2 = &r1 + &g2;
    assert_eq!(r2, vector![5.0]);
    let r3 = &r2 + &g1;
    assert_eq!(r3, vector![6.0]);

    r3.backward_with(vector![1.0]).unwrap();
    assert_eq!(r1.get_grad().unwrap(), vector![1.0]);
    assert_eq!(r2.get_grad().unwrap(), vector![1.0]);
    assert_eq!(g1.get_grad().unwrap(), vector![2.0]);
    assert_eq!(g2.get_grad().unwrap(), vector![2.0]);
}

#[test]
fn test_zero_grad_then_backward_matches_fresh_node() {
    init();
    let seed = vector![0.5, -1.0, 3.0];
    let forward = |a: &Node, b: &Node| (&(a * b) + &a.sin()) / b;

    let a = Node::tracked(vector![1.0, 2.0, 3.0]);
    let b = Node::tracked(vector![4.0, 5.0, 6.0]);

    // a first pass that leaves stale gradients behind
    let out = forward(&a, &b);
    out.backward_with(vector![9.0, 9.0, 9.0]).unwrap();
    out.backward().unwrap();
    a.zero_grad();
    b.zero_grad();

    let out = forward(&a, &b);
    out.backward_with(seed.clone()).unwrap();

    let fresh_a = Node::tracked(vector![1.0, 2.0, 3.0]);
    let fresh_b = Node::tracked(vector![4.0, 5.0, 6.0]);
    forward(&fresh_a, &fresh_b).backward_with(seed).unwrap();

    assert_eq!(a.get_grad().unwrap(), fresh_a.get_grad().unwrap());
    assert_eq!(b.get_grad().unwrap(), fresh_b.get_grad().unwrap());
}

#[test]
fn test_zero_grad_on_output_resets_it_to_a_leaf() {
    let x = Node::tracked(vector![1.0, 2.0]);
    let y = &x * 3.0;
    y.backward().unwrap();
    y.zero_grad();
    assert!(y.is_leaf());

    y.backward_with(vector![1.0, 1.0]).unwrap();
    let fresh = Node::tracked(vector![3.0, 6.0]);
    fresh.backward_with(vector![1.0, 1.0]).unwrap();
    assert_eq!(y.get_grad().unwrap(), fresh.get_grad().unwrap());
}

#[test]
fn test_log_tan_exp_chain_rule() {
    let v = vector![10.0, 20.0];
    let x = Node::tracked(v.clone());
    let f = x.exp().tan().log();
    assert_eq!(f, v.exp().tan().ln());

    f.backward().unwrap();
    let e = v.exp();
    let expected = &e / &(&e.sin() * &e.cos());
    assert!(close(&x.get_grad().unwrap(), &expected, 1e-4));
}

#[test]
fn test_math_funcs_on_ones() {
    let ones = Vector::ones(10);

    let t1 = Node::tracked(ones.clone());
    let t2 = t1.sin();
    assert_eq!(t2, ones.sin());
    t2.backward().unwrap();
    assert_eq!(t1.get_grad().unwrap(), ones.cos());

    let t1 = Node::tracked(ones.clone());
    let t2 = t1.log();
    assert_eq!(t2, ones.ln());
    t2.backward().unwrap();
    assert_eq!(t1.get_grad().unwrap(), 1.0 / &ones);

    let t1 = Node::tracked(ones.clone());
    let t2 = t1.cos();
    t2.backward().unwrap();
    assert_eq!(t1.get_grad().unwrap(), -ones.sin());
}

#[test]
fn test_gradient_descent_on_sum_of_squares() {
    init();
    let mut x = Node::tracked(vector![2.0, -2.0]);
    for _ in 0..100 {
        let loss = (&x * &x).sum();
        loss.backward().unwrap();
        let step = Node::constant(x.get_grad().unwrap() * 0.1);
        x = &x - &step;
        x.zero_grad();
    }
    assert!(close(x.get_value(), &Vector::zeros(2), 1e-3));
    assert!(x.is_leaf());
}

#[test]
fn test_gradient_descent_on_rosenbrock() {
    let mut x = Node::scalar(-0.5);
    let mut y = Node::scalar(1.2);
    let alpha = 0.002;

    for _ in 0..10_000 {
        let dx = &x - 1.0;
        let r = &y - &(&x * &x);
        let f = &(&dx * &dx) + &(100.0 * &(&r * &r));
        f.backward().unwrap();

        x = &x - &Node::constant(x.get_grad().unwrap() * alpha);
        y = &y - &Node::constant(y.get_grad().unwrap() * alpha);
        x.zero_grad();
        y.zero_grad();
    }

    assert!(close(x.get_value(), &vector![1.0], 1e-3));
    assert!(close(y.get_value(), &vector![1.0], 1e-3));
}

#[test]
fn test_errors_are_reported_not_panicked() {
    let a = Node::tracked(vector![1.0, 2.0, 3.0]);
    let b = Node::tracked(vector![1.0, 2.0]);
    assert_eq!(
        a.try_add(&b).unwrap_err(),
        GradError::ShapeMismatch {
            op: "add",
            lhs: 3,
            rhs: 2
        }
    );

    let c = Node::constant(vector![1.0]);
    assert!(matches!(
        c.backward(),
        Err(GradError::InvalidOperation { .. })
    ));
    assert!(matches!(
        a.get_grad(),
        Err(GradError::InvalidOperation { .. })
    ));
}

#[test]
#[should_panic(expected = "shape mismatch")]
fn test_operator_panics_on_mismatch() {
    let a = Node::tracked(vector![1.0, 2.0, 3.0]);
    let b = Node::tracked(vector![1.0, 2.0]);
    let _ = &a * &b;
}

#[test]
fn test_division_by_zero_propagates_infinity() {
    let a = Node::tracked(vector![1.0]);
    let b = Node::tracked(vector![0.0]);
    let q = &a / &b;
    assert!(q.get_value()[0].is_infinite());
    q.backward().unwrap();
    assert!(a.get_grad().unwrap()[0].is_infinite());
    assert!(b.get_grad().unwrap()[0].is_infinite());
}
