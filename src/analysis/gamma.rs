use std::f64::consts::PI;

/// Standard normal density φ(x).
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black–Scholes `d1`.
pub fn d1(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt())
}

/// Black–Scholes gamma `φ(d1) / (S·σ·√T)`, identical for calls and puts.
///
/// At or past expiry (`t <= 0`) no time value remains and gamma is 0.
/// Callers guarantee `s > 0`, `k > 0` and `sigma > 0`.
pub fn gamma(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    let sqrt_t = t.sqrt();
    norm_pdf(d1(s, k, t, r, sigma)) / (s * sigma * sqrt_t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_pdf_peak() {
        assert!((norm_pdf(0.0) - 0.398_942_280_401_432_7).abs() < 1e-15);
        assert!((norm_pdf(1.0) - norm_pdf(-1.0)).abs() < 1e-15);
    }

    #[test]
    fn test_gamma_known_value() {
        // S=K=100, T=1, r=0.05, σ=0.2: d1 = 0.35, gamma ≈ 0.018762
        let g = gamma(100.0, 100.0, 1.0, 0.05, 0.2);
        assert!((g - 0.018_762).abs() < 1e-6, "gamma = {g}");
    }

    #[test]
    fn test_gamma_positive_before_expiry() {
        for &k in &[5.0, 5.5, 5.7, 6.0, 6.5] {
            for &t in &[1.0 / 252.0, 3.0 / 252.0, 0.5, 2.0] {
                let g = gamma(5.7, k, t, 0.1175, 0.15);
                assert!(g > 0.0 && g.is_finite(), "K={k} T={t} gamma={g}");
            }
        }
    }

    #[test]
    fn test_gamma_zero_at_or_after_expiry() {
        assert_eq!(gamma(100.0, 100.0, 0.0, 0.05, 0.2), 0.0);
        assert_eq!(gamma(100.0, 90.0, -0.1, 0.05, 0.2), 0.0);
    }

    #[test]
    fn test_gamma_peaks_near_the_money() {
        let atm = gamma(100.0, 100.0, 0.1, 0.0, 0.2);
        let otm = gamma(100.0, 130.0, 0.1, 0.0, 0.2);
        let itm = gamma(100.0, 70.0, 0.1, 0.0, 0.2);
        assert!(atm > otm && atm > itm);
    }
}
