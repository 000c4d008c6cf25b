/// Default EWMA weight given to the newest sample.
pub const DEFAULT_ALPHA: f64 = 0.3;

/// Exponentially weighted moving average.
///
/// The first sample after construction or `reset` seeds the average
/// directly, so a zero-valued first sample is smoothed like any other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ewma {
    alpha: f64,
    value: Option<f64>,
}

impl Default for Ewma {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl Ewma {
    /// `alpha` is clamped into (0, 1].
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_finite() && alpha > 0.0 {
            alpha.min(1.0)
        } else {
            DEFAULT_ALPHA
        };
        Self { alpha, value: None }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn update(&mut self, sample: f64) -> f64 {
        let next = match self.value {
            Some(prev) => self.alpha * sample + (1.0 - self.alpha) * prev,
            None => sample,
        };
        self.value = Some(next);
        next
    }

    /// Current average, 0.0 before the first sample.
    pub fn value(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }

    pub fn is_seeded(&self) -> bool {
        self.value.is_some()
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Smoothed tx/rx rates (Mbit/s) and, optionally, signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSmoother {
    pub tx: Ewma,
    pub rx: Ewma,
    pub signal: Ewma,
    smooth_signal: bool,
}

impl RateSmoother {
    pub fn new(alpha: f64, smooth_signal: bool) -> Self {
        Self {
            tx: Ewma::new(alpha),
            rx: Ewma::new(alpha),
            signal: Ewma::new(alpha),
            smooth_signal,
        }
    }

    pub fn update(&mut self, tx_mbps: f64, rx_mbps: f64, signal_dbm: i32) {
        self.tx.update(tx_mbps);
        self.rx.update(rx_mbps);
        if self.smooth_signal {
            self.signal.update(f64::from(signal_dbm));
        }
    }

    pub fn smooths_signal(&self) -> bool {
        self.smooth_signal
    }

    pub fn reset(&mut self) {
        self.tx.reset();
        self.rx.reset();
        self.signal.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_sample_seeds() {
        let mut ewma = Ewma::default();
        assert!(!ewma.is_seeded());
        assert!(close(ewma.update(100.0), 100.0));
    }

    #[test]
    fn test_seed_then_zero() {
        let mut ewma = Ewma::new(0.3);
        ewma.update(100.0);
        assert!(close(ewma.update(0.0), 70.0));
    }

    #[test]
    fn test_zero_first_sample_still_seeds() {
        let mut ewma = Ewma::new(0.3);
        ewma.update(0.0);
        assert!(ewma.is_seeded());
        assert!(close(ewma.update(100.0), 30.0));
    }

    #[test]
    fn test_reset_reseeds() {
        let mut ewma = Ewma::new(0.3);
        ewma.update(50.0);
        ewma.reset();
        assert_eq!(ewma.value(), 0.0);
        assert!(close(ewma.update(80.0), 80.0));
    }

    #[test]
    fn test_alpha_sanitized() {
        assert!(close(Ewma::new(-1.0).alpha(), DEFAULT_ALPHA));
        assert!(close(Ewma::new(f64::NAN).alpha(), DEFAULT_ALPHA));
        assert!(close(Ewma::new(4.0).alpha(), 1.0));
    }

    #[test]
    fn test_signal_smoothing_optional() {
        let mut off = RateSmoother::new(0.3, false);
        off.update(10.0, 20.0, -60);
        assert!(!off.signal.is_seeded());

        let mut on = RateSmoother::new(0.3, true);
        on.update(10.0, 20.0, -60);
        on.update(10.0, 20.0, -50);
        assert!(close(on.signal.value(), -57.0));
    }
}
