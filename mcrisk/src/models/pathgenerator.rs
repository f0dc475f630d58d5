use crate::{
    core::request::SimulationRequest,
    math::randomnumbers::{NormalMethod, NormalStream, RandomNormalSource},
    models::path::Path,
};

/// Diffusion model able to produce one path from a dedicated normal stream.
pub trait PathGenerator: Sync + Send {
    fn generate_path<R: RandomNormalSource>(
        &self,
        request: &SimulationRequest,
        source: &mut R,
    ) -> Path;

    /// Sequential reference implementation: simulation `i` draws from the
    /// stream seeded by `(run_seed, i)`.
    fn generate_paths(
        &self,
        request: &SimulationRequest,
        method: NormalMethod,
        run_seed: u64,
    ) -> Vec<Path> {
        (0..request.num_simulations())
            .map(|i| {
                let mut source = NormalStream::for_simulation(method, run_seed, i);
                self.generate_path(request, &mut source)
            })
            .collect()
    }
}
