//! # Reach Application Logic
//!
//! The two runs behind the binary. [`run_episodes`] drives the live step
//! engine under PD control and feeds every transition into the replay memory.
//! [`run_plan`] builds the episode's obstacle table once and grows an RRT over
//! it with bounded replay rollouts.

use anyhow::Result;
use physics::{ControlMode, SimConfig, Termination};
use planning::{Rrt, RrtConfig, Tree, VertexId};
use rl::{ArmEnv, Env, EnvError, EnvOptions, Transition};

#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSettings {
    pub obstacles: usize,
    pub episodes: usize,
    pub batch: usize,
    /// Skip scene geometry in observations
    pub eval: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub total_reward: f64,
    pub steps: usize,
    pub termination: Option<Termination>,
    /// Size of the batch drawn at the end, `None` if memory was underfilled
    pub sampled: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlanSummary {
    pub vertices: usize,
    pub edges: usize,
    pub path: Option<Vec<VertexId>>,
}

fn options(obstacles: usize, batch_size: usize, seed: u64) -> EnvOptions {
    EnvOptions {
        has_objects: obstacles > 0,
        num_obj: obstacles,
        batch_size,
        seed,
        ..EnvOptions::default()
    }
}

/// Run PD-controlled episodes from the environment's start pose.
///
/// # Errors
///
/// Returns configuration and pose sampling errors from the environment.
pub fn run_episodes(
    config: SimConfig,
    seed: u64,
    settings: &EpisodeSettings,
) -> Result<Vec<EpisodeSummary>> {
    let mut env = ArmEnv::new(config, options(settings.obstacles, settings.batch, seed))?;
    let mut summaries = Vec::with_capacity(settings.episodes);

    for episode in 0..settings.episodes {
        let mut state = Env::reset(&mut env);
        let mut total_reward = 0.0;
        let termination = loop {
            let t_step = env.sim().state().t;
            let outcome = env.step(None, ControlMode::Pid, settings.eval)?;
            total_reward += outcome.reward;
            env.store_transition(Transition {
                state,
                action: outcome.info.action,
                reward: outcome.reward,
                next_state: outcome.observation.clone(),
                done: outcome.done,
                t_step,
            });
            state = outcome.observation;
            if outcome.done {
                break outcome.info.termination;
            }
        };

        let sampled = match env.sample_memory() {
            Ok(batch) => Some(batch.len()),
            Err(EnvError::Buffer(err)) => {
                tracing::warn!(episode, %err, "no training batch");
                None
            }
            Err(err) => return Err(err.into()),
        };

        let summary = EpisodeSummary {
            episode,
            total_reward,
            steps: env.sim().state().t,
            termination,
            sampled,
        };
        tracing::info!(
            episode,
            reward = summary.total_reward,
            steps = summary.steps,
            termination = ?summary.termination,
            "episode finished"
        );
        summaries.push(summary);
    }
    Ok(summaries)
}

/// Grow an RRT from the start pose toward the goal.
///
/// # Errors
///
/// Returns environment construction errors and tree errors.
pub fn run_plan(
    config: SimConfig,
    seed: u64,
    obstacles: usize,
    rrt_config: RrtConfig,
) -> Result<PlanSummary> {
    let mut env = ArmEnv::new(config, options(obstacles, 1, seed))?;
    let table = env.obstacle_table();
    let oracle = env.sim().oracle().clone();
    let start = env.sim().start().to_vec();
    let goal = env.sim().goal().to_vec();

    let mut tree = Tree::new(env.action_size());
    let mut rrt = Rrt::new(oracle.as_ref(), env.config(), &table, goal, rrt_config);
    rrt.root(&mut tree, start)?;
    let path = rrt.plan(&mut tree, env.rng())?;

    match &path {
        Some(path) => {
            let cost: f64 = path
                .windows(2)
                .filter_map(|pair| tree.parent_of(pair[1]))
                .map(|(_, cost)| cost)
                .sum();
            tracing::info!(
                vertices = tree.count(),
                hops = path.len() - 1,
                cost,
                "path found"
            );
        }
        None => tracing::info!(vertices = tree.count(), "no path within the iteration budget"),
    }

    Ok(PlanSummary {
        vertices: tree.count(),
        edges: tree.edge_count(),
        path,
    })
}
