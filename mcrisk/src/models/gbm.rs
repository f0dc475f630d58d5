//! Zero-drift geometric Brownian motion.
//!
//! Each step applies the exact lognormal update
//! **S<sub>t+1</sub> = S<sub>t</sub> · exp(-½σ²dt + σ√dt · Z)**, so
//! **E[S<sub>t+1</sub> | S<sub>t</sub>] = S<sub>t</sub>** and the expected
//! price is flat over the horizon.
//!
//! Prices are floored at `f64::MIN_POSITIVE`: with very large volatility the
//! drift term alone can underflow `exp` to zero.

use crate::{
    core::request::SimulationRequest,
    math::randomnumbers::RandomNormalSource,
    models::{path::Path, pathgenerator::PathGenerator},
    time::daycounter::Business252,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricBrownianMotion {
    dt: f64,
}

impl Default for GeometricBrownianMotion {
    fn default() -> Self {
        Self {
            dt: Business252::step(),
        }
    }
}

impl GeometricBrownianMotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the year fraction of one step.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }
}

impl PathGenerator for GeometricBrownianMotion {
    fn generate_path<R: RandomNormalSource>(
        &self,
        request: &SimulationRequest,
        source: &mut R,
    ) -> Path {
        let sigma = request.volatility();
        let drift = -0.5 * sigma * sigma * self.dt;
        let diffusion = sigma * self.dt.sqrt();

        let mut prices = Vec::with_capacity(request.path_len());
        let mut price = request.current_price();
        prices.push(price);
        for _ in 0..request.num_days() {
            let z = source.next();
            price = (price * (drift + diffusion * z).exp()).max(f64::MIN_POSITIVE);
            prices.push(price);
        }
        Path::new(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::randomnumbers::{NormalMethod, NormalStream};
    use crate::utils::errors::Result;
    use approx::assert_relative_eq;

    struct Fixed(f64);

    impl RandomNormalSource for Fixed {
        fn next(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_path_shape_and_start() -> Result<()> {
        let request = SimulationRequest::new(100.0, 0.3, 30, 1)?;
        let mut source = NormalStream::new(NormalMethod::Ziggurat, 1);
        let path = GeometricBrownianMotion::new().generate_path(&request, &mut source);
        assert_eq!(path.len(), 31);
        assert_eq!(path.initial(), Some(100.0));
        assert!(path.prices().iter().all(|p| *p > 0.0));
        Ok(())
    }

    #[test]
    fn test_zero_volatility_is_constant() -> Result<()> {
        let request = SimulationRequest::new(123.45, 0.0, 50, 1)?;
        let mut source = NormalStream::new(NormalMethod::BoxMuller, 9);
        let path = GeometricBrownianMotion::new().generate_path(&request, &mut source);
        assert!(path.prices().iter().all(|p| *p == 123.45));
        Ok(())
    }

    #[test]
    fn test_step_update() -> Result<()> {
        let sigma = 0.2;
        let dt = 1.0 / 252.0;
        let request = SimulationRequest::new(100.0, sigma, 2, 1)?;
        let path = GeometricBrownianMotion::new().generate_path(&request, &mut Fixed(1.0));
        let step = (-0.5 * sigma * sigma * dt + sigma * dt.sqrt()).exp();
        assert_relative_eq!(path.prices()[1], 100.0 * step, epsilon = 1e-12);
        assert_relative_eq!(path.prices()[2], 100.0 * step * step, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_extreme_volatility_stays_positive() -> Result<()> {
        let request = SimulationRequest::new(100.0, 200.0, 252, 1)?;
        let mut source = NormalStream::new(NormalMethod::Ziggurat, 42);
        let path = GeometricBrownianMotion::new().generate_path(&request, &mut source);
        assert!(path.prices().iter().all(|p| *p > 0.0 && p.is_finite()));
        Ok(())
    }

    #[test]
    fn test_custom_dt() -> Result<()> {
        let model = GeometricBrownianMotion::new().with_dt(1.0);
        assert_eq!(model.dt(), 1.0);
        let request = SimulationRequest::new(10.0, 0.5, 1, 1)?;
        let path = model.generate_path(&request, &mut Fixed(0.0));
        assert_relative_eq!(path.prices()[1], 10.0 * (-0.125_f64).exp(), epsilon = 1e-12);
        Ok(())
    }
}
