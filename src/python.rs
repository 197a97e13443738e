use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::{ContainerParameters, InitialConditions, SimulationConfig};
use crate::core::particle::DIM;
use crate::core::{BoundaryMode, Container, Trajectory};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn to_array(rows: Vec<[f64; DIM]>) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((rows.len(), DIM));
    for (i, row) in rows.iter().enumerate() {
        for k in 0..DIM {
            arr[[i, k]] = row[k];
        }
    }
    arr
}

fn trajectory_dict<'py>(py: Python<'py>, trajectory: &Trajectory) -> PyResult<Bound<'py, PyDict>> {
    let out = PyDict::new(py);
    for (i, path) in trajectory {
        let points: Vec<(i64, i64)> = path.iter().map(|&[x, y]| (x, y)).collect();
        out.set_item(*i, points)?;
    }
    Ok(out)
}

/// Python-facing wrapper around the Rust `Container`.
///
/// API:
/// - __new__(num_particles, bounds, quantum, temperature, proportionality_factor, seed=None, clamp=False)
/// - run(total_time) -> dict[int, list[tuple[int, int]]]
/// - run_json(total_time) -> str
/// - get_positions() / get_velocities() -> np.ndarray, shape (N, 2)
#[pyclass]
pub struct ParticleBox {
    sim: Container,
}

#[pymethods]
impl ParticleBox {
    /// Create a container of randomly placed particles.
    ///
    /// Parameters
    /// - num_particles: number of particles (int, > 0)
    /// - bounds: iterable of 2 positive ints [width, height]
    /// - quantum: time step (float, > 0)
    /// - temperature: float >= 0; speed scale is proportionality_factor * sqrt(temperature)
    /// - proportionality_factor: float
    /// - seed: RNG seed (int) for reproducibility; None for nondeterministic
    /// - clamp: snap reflected particles back onto the wall margin
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (num_particles, bounds, quantum, temperature, proportionality_factor, seed=None, clamp=false))]
    fn new(
        num_particles: usize,
        bounds: Vec<u32>,
        quantum: f64,
        temperature: f64,
        proportionality_factor: f64,
        seed: Option<u64>,
        clamp: bool,
    ) -> PyResult<Self> {
        if bounds.len() != DIM {
            return Err(py_err(format!("bounds must have length {DIM}")));
        }
        let config = SimulationConfig {
            container: ContainerParameters {
                num_particles,
                quantum,
                bounds: [bounds[0], bounds[1]],
            },
            initial: InitialConditions {
                temperature,
                proportionality_factor,
                ..InitialConditions::default()
            },
            seed,
            boundary: if clamp {
                BoundaryMode::ReflectAndClamp
            } else {
                BoundaryMode::Reflect
            },
            ..SimulationConfig::default()
        };
        let sim = Container::seeded(&config).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Simulate for `total_time` (releases the GIL) and return {index: [(x, y), ...]}.
    fn run<'py>(&mut self, py: Python<'py>, total_time: f64) -> PyResult<Bound<'py, PyDict>> {
        let trajectory = py.detach(|| self.sim.run(total_time)).map_err(py_err)?;
        trajectory_dict(py, &trajectory)
    }

    /// Simulate for `total_time` and return the trajectory as pretty JSON text.
    fn run_json(&mut self, py: Python<'_>, total_time: f64) -> PyResult<String> {
        py.detach(|| self.sim.run(total_time).and_then(|t| t.to_json_pretty()))
            .map_err(py_err)
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        to_array(self.sim.positions()).into_pyarray(py)
    }

    /// Return velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        to_array(self.sim.velocities()).into_pyarray(py)
    }

    fn get_kinetic_energy(&self) -> f64 {
        self.sim.kinetic_energy()
    }

    fn get_momentum(&self) -> (f64, f64) {
        let [px, py] = self.sim.momentum();
        (px, py)
    }

    fn get_time(&self) -> f64 {
        self.sim.time()
    }
}

/// The particlebox Python module entry point.
#[pymodule]
fn particlebox(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ParticleBox>()?;
    Ok(())
}
