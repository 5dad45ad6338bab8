use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use json_error_sink::init::init_tracing;
use json_error_sink::noop::NoopTracker;

fn main() {
    let writer = init_tracing(Arc::new(NoopTracker)).expect("install subscriber");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        if i % 10 == 0 {
            error!(iteration = i, error = "simulated failure", "default load test error");
        } else {
            info!(iteration = i, "default load test info");
        }
    }

    let elapsed = start.elapsed();
    println!("default config: wrote {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    writer.close().expect("close writer");
}
