use super::reference::select_model;
use crate::domain::config::TemperatureLaw;
use crate::domain::StellarParameters;

/// Hopf function q(tau), fitted to the exact solution to better than 0.3%.
pub fn hopf(tau: f64) -> f64 {
    0.710_4 - 0.133_1 * (-3.448_8 * tau).exp()
}

/// Gray-atmosphere T(tau) with the Hopf function.
pub fn gray_temperature(teff: f64, tau: f64) -> f64 {
    teff * (0.75 * (tau + hopf(tau))).powf(0.25)
}

/// T at every depth of the Rosseland grid `ln_tau` under `law`.
pub fn temperature_structure(law: TemperatureLaw, stellar: &StellarParameters, ln_tau: &[f64]) -> Vec<f64> {
    match law {
        TemperatureLaw::GrayHopf => ln_tau
            .iter()
            .map(|ln_tau| gray_temperature(stellar.teff, ln_tau.exp()))
            .collect(),
        TemperatureLaw::ReferenceScaled => {
            select_model(stellar.teff, stellar.log_g).temperature(stellar.teff, ln_tau)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{gray_temperature, hopf, temperature_structure};
    use crate::domain::config::TemperatureLaw;
    use crate::domain::StellarInput;

    #[test]
    fn hopf_function_spans_its_known_limits() {
        assert!((hopf(0.0) - 0.577_3).abs() < 1.0e-3);
        assert!((hopf(50.0) - 0.710_4).abs() < 1.0e-9);
        // T(tau = 2/3) is within a couple of percent of Teff.
        let t = gray_temperature(5_780.0, 2.0 / 3.0);
        assert!((t / 5_780.0 - 1.0).abs() < 0.02, "T = {t}");
    }

    #[test]
    fn both_laws_increase_inward_and_bracket_teff() {
        let (stellar, _) = StellarInput::default().validate().expect("sun");
        let ln_tau: Vec<f64> = (0..48)
            .map(|index| (-6.0 + 8.0 * index as f64 / 47.0) * std::f64::consts::LN_10)
            .collect();
        for law in [TemperatureLaw::GrayHopf, TemperatureLaw::ReferenceScaled] {
            let temperature = temperature_structure(law, &stellar, &ln_tau);
            assert!(temperature.windows(2).all(|pair| pair[1] >= pair[0]), "{law:?}");
            assert!(temperature[0] < stellar.teff);
            assert!(temperature[47] > stellar.teff);
        }
    }
}
