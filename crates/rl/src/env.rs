use crate::error::EnvError;
use physics::Observation;

/// Reinforcement learning environment trait.
///
/// Inspired by classic frameworks like OpenAI Gym, this trait defines the core
/// interface an environment must provide. Each call to [`step`] applies one
/// control vector and returns the new observation, a reward signal, and
/// whether the episode has terminated.
///
/// [`step`]: Env::step
pub trait Env {
    /// Advance the environment by one action.
    ///
    /// Returns `(obs, reward, done)`.
    ///
    /// # Errors
    ///
    /// Fails when `action` does not fit the action space.
    fn step(&mut self, action: &[f64]) -> Result<(Observation, f64, bool), EnvError>;

    /// Reset the environment to its starting state and return the initial
    /// observation.
    fn reset(&mut self) -> Observation;

    /// Number of scene points in a full observation.
    fn obs_size(&self) -> usize;

    /// Size of the action space.
    fn action_size(&self) -> usize;
}
