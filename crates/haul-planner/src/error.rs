use haul_grid::GridError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("planner configuration error: {0}")]
    Config(String),

    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    #[error("failed to spawn planner thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("planner thread panicked")]
    WorkerPanicked,
}

pub type PlannerResult<T> = Result<T, PlannerError>;
