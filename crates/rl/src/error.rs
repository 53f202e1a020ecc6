use physics::PhysicsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("cannot sample {requested} transitions, only {available} stored")]
    Underfilled { requested: usize, available: usize },
}

#[derive(Error, Debug)]
pub enum EnvError {
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error("no pose with the end effector above the floor after {attempts} attempts")]
    PoseSampling { attempts: usize },
}
