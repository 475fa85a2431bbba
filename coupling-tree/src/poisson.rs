use std::time::Duration;

use rand::Rng;

/// Inverts the Poisson(`mean`) CDF at `uniform`, which must lie in `[0, 1)`.
///
/// Walks the CDF one term at a time (`p_{k+1} = p_k * mean / (k + 1)`) and
/// returns the first `k` whose cumulative probability reaches `uniform`. Stops
/// early if the terms underflow to zero, which only happens for very large
/// means or a `uniform` within rounding error of 1.
pub fn poisson_from_uniform(mean: f64, uniform: f64) -> u32 {
    let mut k = 0;
    let mut p = (-mean).exp();
    let mut cumulative = p;
    while uniform > cumulative {
        p *= mean / f64::from(k + 1);
        cumulative += p;
        k += 1;
        if p == 0.0 {
            break;
        }
    }
    k
}

/// Poisson-distributed inter-arrival delays: each wait is `tick` times a
/// Poisson(`mean`) count.
#[derive(Debug)]
pub struct PoissonArrivals<R> {
    rng: R,
    mean: f64,
    tick: Duration,
}

impl<R: Rng> PoissonArrivals<R> {
    pub fn new(rng: R, mean: f64, tick: Duration) -> Self {
        PoissonArrivals { rng, mean, tick }
    }

    pub fn next_count(&mut self) -> u32 {
        let uniform: f64 = self.rng.random();
        poisson_from_uniform(self.mean, uniform)
    }

    pub fn next_delay(&mut self) -> Duration {
        self.tick * self.next_count()
    }

    /// Sleeps for the next delay. A zero tick never sleeps but still draws, so
    /// the random stream stays in step with a ticking run.
    pub fn wait(&mut self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
