//! A* scheduler over partial schedules.

use std::rc::Rc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::config::SearchConfig;
use crate::graph::{GraphError, TaskGraph};
use crate::interner::TaskIdx;
use crate::models::{Schedule, SearchStats, Task, Time};
use crate::{log_debug, log_expansions, log_progress};

use super::extraction::extract_timelines;
use super::frontier::Frontier;
use super::heuristic::{self, Heuristic};
use super::state::{ScheduleState, Slot, StateKey};

/// Errors that can occur while scheduling.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("No schedule found: frontier exhausted")]
    NoScheduleFound,
    #[error("Search budget exceeded after {expansions} expansions")]
    SearchBudgetExceeded {
        expansions: u64,
        /// Deepest partial schedule reached before giving up.
        partial: Box<Schedule>,
    },
}

/// A* search for a minimum-makespan assignment of tasks to processors.
///
/// States are partial schedules; each expansion places one eligible task on
/// one processor at the earliest time its predecessors and that processor
/// allow. See [`heuristic`](super::heuristic) for the optimality caveat.
pub struct AStarScheduler {
    graph: TaskGraph,
    config: SearchConfig,
    heuristic: Box<dyn Heuristic>,
    critical_path: Vec<String>,
}

impl std::fmt::Debug for AStarScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AStarScheduler")
            .field("tasks", &self.graph.len())
            .field("config", &self.config)
            .field("heuristic", &self.heuristic.name())
            .field("critical_path", &self.critical_path)
            .finish()
    }
}

impl AStarScheduler {
    /// Create a scheduler using the heuristic named in `config`.
    ///
    /// Builds successors if the graph has not done so yet, then computes the
    /// critical path. The graph is read-only from here on.
    pub fn new(graph: TaskGraph, config: SearchConfig) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        let (graph, critical_path) = Self::prepare(graph)?;
        let heuristic = heuristic::by_name(&config.heuristic, &graph)
            .ok_or_else(|| SchedulerError::InvalidConfig(config.heuristic.clone()))?;
        Ok(Self {
            graph,
            config,
            heuristic,
            critical_path,
        })
    }

    /// Create a scheduler with a caller-supplied heuristic.
    ///
    /// `config.heuristic` is ignored.
    pub fn with_heuristic<H>(
        graph: TaskGraph,
        config: SearchConfig,
        heuristic: H,
    ) -> Result<Self, SchedulerError>
    where
        H: Heuristic + 'static,
    {
        config
            .validate_processors()
            .map_err(SchedulerError::InvalidConfig)?;
        let (graph, critical_path) = Self::prepare(graph)?;
        Ok(Self {
            graph,
            config,
            heuristic: Box::new(heuristic),
            critical_path,
        })
    }

    /// Build the graph from a task list and create a scheduler.
    pub fn from_tasks<I>(tasks: I, config: SearchConfig) -> Result<Self, SchedulerError>
    where
        I: IntoIterator<Item = Task>,
    {
        Self::new(TaskGraph::from_tasks(tasks)?, config)
    }

    fn prepare(mut graph: TaskGraph) -> Result<(TaskGraph, Vec<String>), GraphError> {
        if !graph.successors_built() {
            graph.build_successors()?;
        }
        let critical_path = graph.compute_critical_path()?;
        Ok((graph, critical_path))
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn critical_path(&self) -> &[String] {
        &self.critical_path
    }

    fn estimate(&self, scheduled: &[Option<Slot>]) -> Time {
        self.heuristic.estimate(&self.graph, scheduled)
    }

    /// The empty schedule every search starts from.
    pub fn initial_state(&self) -> ScheduleState {
        let unplaced: Vec<Option<Slot>> = vec![None; self.graph.len()];
        let h = self.estimate(&unplaced);
        ScheduleState::root(self.graph.len(), self.config.num_processors, h)
    }

    /// Unplaced tasks whose predecessors are all placed, in index order.
    pub fn eligible_tasks(&self, state: &ScheduleState) -> Vec<TaskIdx> {
        (0..self.graph.len() as TaskIdx)
            .filter(|&task| {
                !state.is_scheduled(task)
                    && self
                        .graph
                        .predecessors(task)
                        .iter()
                        .all(|&p| state.is_scheduled(p))
            })
            .collect()
    }

    /// Every (eligible task, processor) placement reachable from `state`.
    pub fn get_successors(&self, state: &Rc<ScheduleState>) -> Vec<ScheduleState> {
        let eligible = self.eligible_tasks(state);
        let num_processors = self.config.num_processors;
        let mut successors = Vec::with_capacity(eligible.len() * num_processors);

        for task in eligible {
            let ready = self
                .graph
                .predecessors(task)
                .iter()
                .filter_map(|&p| state.slot(p))
                .map(|slot| slot.end)
                .max()
                .unwrap_or(0);
            let duration = self.graph.duration(task);

            for (processor, &available) in state.proc_times().iter().enumerate() {
                let start = ready.max(available);
                let slot = Slot {
                    start,
                    end: start + duration,
                    processor,
                };
                successors.push(ScheduleState::successor(state, task, slot, |scheduled| {
                    self.estimate(scheduled)
                }));
            }
        }

        successors
    }

    fn budget_exhausted(&self, expansions: u64, deadline: Option<Instant>) -> bool {
        if let Some(max) = self.config.max_expansions {
            if expansions >= max {
                return true;
            }
        }
        deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Run the search.
    ///
    /// Returns the first complete schedule popped from the frontier. Fails
    /// with `NoScheduleFound` for an empty graph or an exhausted frontier,
    /// and with `SearchBudgetExceeded` (carrying the deepest partial
    /// schedule) when a configured budget runs out.
    pub fn schedule(&self) -> Result<Schedule, SchedulerError> {
        let verbosity = self.config.verbosity;
        if self.graph.is_empty() {
            return Err(SchedulerError::NoScheduleFound);
        }

        let deadline = self
            .config
            .time_limit_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        let mut stats = SearchStats::default();
        let mut frontier = Frontier::new();
        let mut visited: FxHashSet<StateKey> = FxHashSet::default();
        let mut best: Option<Rc<ScheduleState>> = None;

        let initial = Rc::new(self.initial_state());
        log_progress!(
            verbosity,
            "search start: {} tasks, {} processors, heuristic={}, h0={}",
            self.graph.len(),
            self.config.num_processors,
            self.heuristic.name(),
            initial.heuristic()
        );
        frontier.push(initial);

        while let Some(current) = frontier.pop() {
            if current.is_complete() {
                stats.frontier_peak = frontier.peak();
                log_progress!(
                    verbosity,
                    "goal found: makespan={} after {} expansions ({} generated)",
                    current.makespan(),
                    stats.expansions,
                    stats.generated
                );
                return Ok(self.build_schedule(&current, stats, true));
            }

            if !visited.insert(current.key()) {
                stats.duplicates_skipped += 1;
                continue;
            }

            let deeper = best.as_ref().map_or(true, |b| {
                current.scheduled_count() > b.scheduled_count()
                    || (current.scheduled_count() == b.scheduled_count()
                        && current.total_cost() < b.total_cost())
            });
            if deeper {
                best = Some(Rc::clone(&current));
            }

            if self.budget_exhausted(stats.expansions, deadline) {
                stats.frontier_peak = frontier.peak();
                let expansions = stats.expansions;
                log_progress!(
                    verbosity,
                    "budget exhausted after {} expansions; returning partial schedule",
                    expansions
                );
                let partial = best.as_deref().unwrap_or(&*current);
                return Err(SchedulerError::SearchBudgetExceeded {
                    expansions,
                    partial: Box::new(self.build_schedule(partial, stats, false)),
                });
            }

            stats.expansions += 1;
            log_expansions!(
                verbosity,
                "expand #{}: placed={}/{} g={} h={} f={} frontier={}",
                stats.expansions,
                current.scheduled_count(),
                self.graph.len(),
                current.makespan(),
                current.heuristic(),
                current.total_cost(),
                frontier.len()
            );

            for successor in self.get_successors(&current) {
                log_debug!(
                    verbosity,
                    "push f={} g={} h={} procs={:?}",
                    successor.total_cost(),
                    successor.makespan(),
                    successor.heuristic(),
                    successor.proc_times()
                );
                stats.generated += 1;
                frontier.push(Rc::new(successor));
            }
        }

        log_progress!(verbosity, "frontier exhausted without a complete schedule");
        Err(SchedulerError::NoScheduleFound)
    }

    fn build_schedule(
        &self,
        state: &ScheduleState,
        stats: SearchStats,
        complete: bool,
    ) -> Schedule {
        let (timelines, makespan) = extract_timelines(&self.graph, state);
        debug_assert_eq!(makespan, state.makespan());
        Schedule {
            timelines,
            makespan,
            complete,
            critical_path: self.critical_path.clone(),
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HEURISTIC_ZERO;
    use crate::search::ZeroHeuristic;
    use crate::test_support::{assert_valid_schedule, reference_tasks};

    fn run(tasks: Vec<Task>, processors: usize) -> Schedule {
        AStarScheduler::from_tasks(tasks, SearchConfig::with_processors(processors))
            .unwrap()
            .schedule()
            .unwrap()
    }

    fn slots(schedule: &Schedule, processor: usize) -> Vec<(String, Time, Time)> {
        schedule.timelines[&processor]
            .iter()
            .map(|e| (e.task_id.clone(), e.start, e.end))
            .collect()
    }

    #[test]
    fn test_single_task() {
        let schedule = run(vec![Task::new("t1", 5, &[])], 1);
        assert_eq!(schedule.makespan, 5);
        assert!(schedule.complete);
        assert_eq!(schedule.timelines.len(), 1);
        assert_eq!(slots(&schedule, 0), vec![("t1".to_string(), 0, 5)]);
    }

    #[test]
    fn test_independent_tasks_run_in_parallel() {
        let tasks = vec![Task::new("a", 3, &[]), Task::new("b", 4, &[])];
        let schedule = run(tasks.clone(), 2);
        assert_eq!(schedule.makespan, 4);
        assert_eq!(schedule.timelines.len(), 2);
        let a = schedule.get("a").unwrap();
        let b = schedule.get("b").unwrap();
        assert_eq!((a.start, b.start), (0, 0));
        assert_ne!(a.processor, b.processor);
        assert_valid_schedule(&schedule, &tasks, 2);
    }

    #[test]
    fn test_chain_is_sequential() {
        let tasks = vec![
            Task::new("t1", 5, &[]),
            Task::new("t2", 3, &["t1"]),
            Task::new("t3", 4, &["t2"]),
        ];
        let schedule = run(tasks, 1);
        assert_eq!(schedule.makespan, 12);
        assert_eq!(
            slots(&schedule, 0),
            vec![
                ("t1".to_string(), 0, 5),
                ("t2".to_string(), 5, 8),
                ("t3".to_string(), 8, 12),
            ]
        );
    }

    #[test]
    fn test_reference_graph_two_processors() {
        let tasks = reference_tasks();
        let serial = TaskGraph::from_tasks(tasks.clone()).unwrap().total_work();
        assert_eq!(serial, 37);
        let schedule = run(tasks.clone(), 2);
        assert_valid_schedule(&schedule, &tasks, 2);
        // Critical path length is a lower bound, serial execution an upper one.
        assert!(schedule.makespan >= 26, "makespan {}", schedule.makespan);
        assert!(schedule.makespan <= serial, "makespan {}", schedule.makespan);
        assert_eq!(schedule.critical_path, vec!["t1", "t3", "t5", "t6", "t8", "t10"]);
        assert!(schedule.stats.expansions > 0);
        assert!(schedule.stats.generated >= schedule.stats.expansions);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let first = run(reference_tasks(), 2);
        let second = run(reference_tasks(), 2);
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_zero_heuristic_finds_optimum() {
        // a -> {b, c} -> d on two processors: b and c overlap, optimum is 1 + 7 + 1
        let tasks = vec![
            Task::new("a", 1, &[]),
            Task::new("b", 2, &["a"]),
            Task::new("c", 7, &["a"]),
            Task::new("d", 1, &["b", "c"]),
        ];
        let config = SearchConfig {
            heuristic: HEURISTIC_ZERO.to_string(),
            ..SearchConfig::with_processors(2)
        };
        let schedule = AStarScheduler::from_tasks(tasks.clone(), config)
            .unwrap()
            .schedule()
            .unwrap();
        assert_eq!(schedule.makespan, 9);
        assert_valid_schedule(&schedule, &tasks, 2);
    }

    #[test]
    fn test_more_processors_than_tasks() {
        let tasks = vec![Task::new("a", 2, &[]), Task::new("b", 2, &["a"])];
        let schedule = run(tasks.clone(), 4);
        assert_eq!(schedule.makespan, 4);
        assert_valid_schedule(&schedule, &tasks, 4);
    }

    #[test]
    fn test_zero_duration_virtual_root() {
        let tasks = vec![
            Task::new("root", 0, &[]),
            Task::new("x", 3, &["root"]),
            Task::new("y", 2, &["root"]),
        ];
        let schedule = run(tasks.clone(), 2);
        assert_eq!(schedule.makespan, 3);
        assert_valid_schedule(&schedule, &tasks, 2);
    }

    #[test]
    fn test_zero_duration_task_listed_before_its_successor() {
        // Index order puts "x" first, but it cannot start before "r" is placed.
        let tasks = vec![Task::new("x", 3, &["r"]), Task::new("r", 0, &[])];
        let schedule = run(tasks.clone(), 1);
        assert_valid_schedule(&schedule, &tasks, 1);

        let order: Vec<(&str, Time, Time)> = schedule.timelines[&0]
            .iter()
            .map(|e| (e.task_id.as_str(), e.start, e.end))
            .collect();
        assert_eq!(order, vec![("r", 0, 0), ("x", 0, 3)]);
        assert!(schedule
            .to_string()
            .ends_with("Task r: 00-00 (Duration: 0)\n  Task x: 00-03 (Duration: 3)"));
    }

    #[test]
    fn test_custom_heuristic() {
        let graph = TaskGraph::from_tasks(reference_tasks()).unwrap();
        let scheduler = AStarScheduler::with_heuristic(
            graph,
            SearchConfig::with_processors(2),
            |g: &TaskGraph, s: &[Option<Slot>]| -> Time {
                let unplaced = (0..g.len() as TaskIdx).filter(|&t| s[t as usize].is_none());
                unplaced.map(|t| g.duration(t)).max().unwrap_or(0)
            },
        )
        .unwrap();
        let schedule = scheduler.schedule().unwrap();
        assert_valid_schedule(&schedule, &reference_tasks(), 2);
    }

    #[test]
    fn test_with_zero_heuristic_struct() {
        let graph = TaskGraph::from_tasks(vec![Task::new("a", 2, &[]), Task::new("b", 3, &[])])
            .unwrap();
        let scheduler =
            AStarScheduler::with_heuristic(graph, SearchConfig::with_processors(1), ZeroHeuristic)
                .unwrap();
        assert_eq!(scheduler.schedule().unwrap().makespan, 5);
    }

    #[test]
    fn test_successor_expansion_is_cartesian() {
        let scheduler = AStarScheduler::from_tasks(
            vec![
                Task::new("a", 3, &[]),
                Task::new("b", 4, &[]),
                Task::new("c", 1, &["a"]),
            ],
            SearchConfig::with_processors(3),
        )
        .unwrap();
        let root = Rc::new(scheduler.initial_state());
        assert_eq!(scheduler.eligible_tasks(&root), vec![0, 1]);
        let successors = scheduler.get_successors(&root);
        assert_eq!(successors.len(), 2 * 3);

        let after_a = Rc::new(
            successors
                .into_iter()
                .find(|s| s.slot(0).map(|slot| slot.processor) == Some(2))
                .unwrap(),
        );
        assert_eq!(scheduler.eligible_tasks(&after_a), vec![1, 2]);
        let c_placements: Vec<Slot> = scheduler
            .get_successors(&after_a)
            .iter()
            .filter_map(|s| s.slot(2))
            .collect();
        // c waits for a wherever it goes
        assert_eq!(c_placements.len(), 3);
        assert!(c_placements.iter().all(|slot| slot.start == 3 && slot.end == 4));
    }

    #[test]
    fn test_initial_heuristic_is_critical_path_length() {
        let scheduler =
            AStarScheduler::from_tasks(reference_tasks(), SearchConfig::with_processors(2))
                .unwrap();
        let root = scheduler.initial_state();
        assert_eq!(root.heuristic(), 26);
        assert_eq!(root.total_cost(), 26);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let err = AStarScheduler::from_tasks(
            vec![Task::new("t1", 1, &["t2"]), Task::new("t2", 1, &["t1"])],
            SearchConfig::with_processors(1),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::Graph(GraphError::CyclicDependency(_))
        ));
    }

    #[test]
    fn test_unknown_predecessor_is_rejected() {
        let err = AStarScheduler::from_tasks(
            vec![Task::new("t1", 1, &["ghost"])],
            SearchConfig::with_processors(1),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::Graph(GraphError::UnknownPredecessor { .. })
        ));
    }

    #[test]
    fn test_unbuilt_graph_is_prepared() {
        let mut graph = TaskGraph::new();
        graph.add_task(Task::new("a", 2, &[])).unwrap();
        graph.add_task(Task::new("b", 1, &["a"])).unwrap();
        let scheduler = AStarScheduler::new(graph, SearchConfig::default()).unwrap();
        assert_eq!(scheduler.critical_path(), &["a".to_string(), "b".to_string()]);
        assert_eq!(scheduler.schedule().unwrap().makespan, 3);
    }

    #[test]
    fn test_empty_graph_has_no_schedule() {
        let scheduler =
            AStarScheduler::from_tasks(Vec::new(), SearchConfig::with_processors(2)).unwrap();
        assert!(matches!(
            scheduler.schedule(),
            Err(SchedulerError::NoScheduleFound)
        ));
    }

    #[test]
    fn test_invalid_config() {
        let err = AStarScheduler::from_tasks(reference_tasks(), SearchConfig::with_processors(0))
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidConfig(_)));

        let config = SearchConfig {
            heuristic: "oracle".to_string(),
            ..SearchConfig::with_processors(2)
        };
        let err = AStarScheduler::from_tasks(reference_tasks(), config).unwrap_err();
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn test_expansion_budget_returns_partial() {
        let config = SearchConfig {
            max_expansions: Some(2),
            ..SearchConfig::with_processors(2)
        };
        let scheduler = AStarScheduler::from_tasks(reference_tasks(), config).unwrap();
        match scheduler.schedule() {
            Err(SchedulerError::SearchBudgetExceeded {
                expansions,
                partial,
            }) => {
                assert_eq!(expansions, 2);
                assert!(!partial.complete);
                assert!(partial.task_count() >= 1);
                assert!(partial.task_count() < 10);
                assert!(partial.get("t1").is_some());
                assert!(partial.to_string().starts_with("Partial schedule"));
            }
            other => panic!("expected budget error, got {:?}", other),
        }
    }

    #[test]
    fn test_time_budget() {
        let config = SearchConfig {
            time_limit_ms: Some(0),
            ..SearchConfig::with_processors(2)
        };
        let scheduler = AStarScheduler::from_tasks(reference_tasks(), config).unwrap();
        match scheduler.schedule() {
            Err(SchedulerError::SearchBudgetExceeded { expansions, partial }) => {
                assert_eq!(expansions, 0);
                assert_eq!(partial.task_count(), 0);
                assert_eq!(partial.makespan, 0);
            }
            other => panic!("expected budget error, got {:?}", other),
        }
    }

    #[test]
    fn test_generated_dags_produce_valid_schedules() {
        for seed in 0..12 {
            let tasks = crate::test_support::generated_dag(seed, 6);
            for processors in 1..=2 {
                let schedule = run(tasks.clone(), processors);
                assert_valid_schedule(&schedule, &tasks, processors);
            }
        }
    }
}
