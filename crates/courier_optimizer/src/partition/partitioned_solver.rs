use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use tracing::{Level, info, instrument};

use crate::{
    error::ProblemError,
    partition::kmeans::{ClusterIdx, KMeans},
    problem::{courier::CourierIdx, delivery_problem::DeliveryProblem, job::JobIdx},
    solver::{
        solution::solution::{Solution, UnassignedJob},
        solver::{in_thread_pool, solve_problem},
        solver_params::SolverParams,
    },
    utils::enumerate_idx::EnumerateIdx,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionParams {
    pub clusters: usize,
    pub seed: u64,
    pub max_iterations: usize,
}

impl Default for PartitionParams {
    fn default() -> Self {
        PartitionParams {
            clusters: 8,
            seed: 42,
            max_iterations: 300,
        }
    }
}

/// Jobs and couriers of one cluster, as indices of the full problem.
#[derive(Debug, Default)]
struct Partition {
    couriers: Vec<CourierIdx>,
    jobs: Vec<JobIdx>,
}

/// Splits the problem by clustering delivery locations and solves every
/// cluster independently, couriers being dealt round-robin to clusters.
pub struct PartitionedSolver {
    problem: DeliveryProblem,
    params: SolverParams,
    partition_params: PartitionParams,
}

impl PartitionedSolver {
    pub fn new(
        problem: DeliveryProblem,
        params: SolverParams,
        partition_params: PartitionParams,
    ) -> Result<Self, ProblemError> {
        params.validate()?;

        if partition_params.clusters == 0 {
            return Err(ProblemError::InvalidParameter {
                name: "clusters",
                reason: "must be at least 1",
            });
        }

        Ok(PartitionedSolver {
            problem,
            params,
            partition_params,
        })
    }

    /// The problem with the cluster of every job stop filled in, once solved.
    pub fn problem(&self) -> &DeliveryProblem {
        &self.problem
    }

    pub fn solve(&mut self) -> Result<Solution, ProblemError> {
        let partitions = self.partition()?;
        let problem = &self.problem;
        let params = &self.params;

        Ok(in_thread_pool(&params.threads, || {
            let solutions: Vec<(Solution, &Partition)> = partitions
                .par_iter()
                .map(|partition| {
                    let sub_problem = problem.restrict(&partition.couriers, &partition.jobs);
                    (solve_problem(&sub_problem, params), partition)
                })
                .collect();

            merge(problem, solutions)
        }))
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    fn partition(&mut self) -> Result<Vec<Partition>, ProblemError> {
        let points: Vec<geo::Point> = self
            .problem
            .jobs()
            .iter()
            .map(|job| self.problem.stop(job.delivery()).location().into())
            .collect();

        let result = KMeans::new(self.partition_params.clusters, self.partition_params.seed)
            .with_max_iterations(self.partition_params.max_iterations)
            .fit(&points)?;

        let mut partitions: Vec<Partition> = result
            .centroids
            .iter()
            .map(|_| Partition::default())
            .collect();

        for (job_id, &cluster) in result.labels.iter().enumerate_idx::<JobIdx>() {
            let job = *self.problem.job(job_id);
            for stop in job.stop_ids() {
                self.problem.set_cluster_id(stop, cluster);
            }
            partitions[cluster.get()].jobs.push(job_id);
        }

        let clusters = partitions.len().max(1);
        if partitions.is_empty() {
            partitions.push(Partition::default());
        }

        for courier in 0..self.problem.couriers().len() {
            partitions[courier % clusters]
                .couriers
                .push(CourierIdx::new(courier));
        }

        for (cluster, partition) in partitions.iter().enumerate_idx::<ClusterIdx>() {
            info!(
                %cluster,
                jobs = partition.jobs.len(),
                couriers = partition.couriers.len(),
                "cluster"
            );
        }

        Ok(partitions)
    }
}

/// Maps sub-problem indices back to the full problem and orders routes by courier.
fn merge(problem: &DeliveryProblem, solutions: Vec<(Solution, &Partition)>) -> Solution {
    let mut routes = Vec::with_capacity(problem.couriers().len());
    let mut unassigned = Vec::new();

    for (solution, partition) in solutions {
        let (sub_routes, sub_unassigned) = solution.into_parts();

        for mut route in sub_routes {
            route.set_courier_id(partition.couriers[route.courier_id().get()]);
            routes.push(route);
        }

        unassigned.extend(sub_unassigned.into_iter().map(|job| UnassignedJob {
            job: partition.jobs[job.job.get()],
            reason: job.reason,
        }));
    }

    routes.sort_by_key(|route| route.courier_id());
    unassigned.sort_by_key(|job| job.job);

    info!(
        total_time = routes.iter().map(|route| route.total_time()).sum::<f64>(),
        unassigned = unassigned.len(),
        "partitioned solution"
    );

    Solution::new(routes, unassigned)
}
