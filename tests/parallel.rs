use vecgrad::approx::close;
use vecgrad::backend::{
    DEFAULT_PARALLEL_THRESHOLD, Backend, get_backend, parallel_threshold, set_backend,
    set_parallel_threshold,
};
use vecgrad::{Node, Vector};

fn gradients(len: usize) -> (Vector, Vector, Vector) {
    let a = Node::tracked((0..len).map(|i| (i % 7) as f64 + 1.0).collect::<Vector>());
    let b = Node::tracked((0..len).map(|i| (i % 5) as f64 - 2.0).collect::<Vector>());
    let k = Node::scalar(3.0);

    let shared = &a * &b;
    let out = &(&(&shared + &a) * &k) + &(&shared * &shared).sum();
    out.backward().unwrap();

    (a.get_grad().unwrap(), b.get_grad().unwrap(), k.get_grad().unwrap())
}

fn transcendental(len: usize) -> Vector {
    let x = Node::tracked((0..len).map(|i| 0.5 + (i % 11) as f64 / 10.0).collect::<Vector>());
    x.exp().sin().log().sum().backward().unwrap();
    x.get_grad().unwrap()
}

// A single test keeps the global backend switch from racing other tests
// in this binary.
#[test]
fn test_rayon_backend_matches_serial() {
    let _ = env_logger::builder().is_test(true).try_init();
    assert_eq!(get_backend(), Backend::Serial);
    assert_eq!(parallel_threshold(), DEFAULT_PARALLEL_THRESHOLD);

    let len = 5000;
    let serial = gradients(len);
    let serial_t = transcendental(len);

    set_backend(Backend::Rayon);
    set_parallel_threshold(1);
    let parallel = gradients(len);
    let parallel_t = transcendental(len);
    // short vectors take the serial path even under rayon
    set_parallel_threshold(DEFAULT_PARALLEL_THRESHOLD);
    let mixed = gradients(len);
    set_backend(Backend::Serial);

    // integer-valued data, so reordered sums are exact
    assert_eq!(serial.0, parallel.0);
    assert_eq!(serial.1, parallel.1);
    assert_eq!(serial.2, parallel.2);
    assert_eq!(serial, mixed);
    assert!(close(&serial_t, &parallel_t, 1e-9));
}
