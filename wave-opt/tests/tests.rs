#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::path::Path;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use anyhow::{Result, bail};
    use float_cmp::approx_eq;
    use test_case::test_case;

    use wave_core::entities::{Aisle, ItemQtys, Order, ProblemInstance, WaveBounds};
    use wave_core::eval::{self, CatalogEntry};
    use wave_core::index::DemandSupplyIndex;
    use wave_core::io::export::{read_solution, write_solution};
    use wave_core::io::import::read_instance;
    use wave_opt::config::WaveConfig;
    use wave_opt::io;
    use wave_opt::mip::{
        LiveModel, MicrolpBackend, MipBackend, MipSolution, Sense, SolveStatus, create_backend,
    };
    use wave_opt::opt::{
        AISLE_FLOOR_CONSTRAINT, CandidateOutcome, ExitReason, ModelBuildError, RefinementPolicy,
        SolveReport, SurrogateWeights, WAVE_SIZE_CONSTRAINT, WaveError, WaveOptimizer,
        aisle_var_name, build_model, order_var_name,
    };
    use wave_opt::time::{TimeBudget, TimeSource};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn instance(orders: &[&[(usize, u64)]], aisles: &[&[(usize, u64)]], n_items: usize, lb: u64, ub: u64) -> ProblemInstance {
        let orders = orders
            .iter()
            .enumerate()
            .map(|(id, d)| Order::new(id, ItemQtys::new(d.iter().copied())))
            .collect();
        let aisles = aisles
            .iter()
            .enumerate()
            .map(|(id, s)| Aisle::new(id, ItemQtys::new(s.iter().copied())))
            .collect();
        ProblemInstance::new(orders, aisles, n_items, WaveBounds::new(lb, ub))
    }

    /// Orders of 4, 3 and 5 units, the first aisle covers the first two orders, the second the last
    fn three_orders() -> ProblemInstance {
        instance(
            &[&[(0, 4)], &[(1, 3)], &[(2, 5)]],
            &[&[(0, 10), (1, 10)], &[(2, 10)]],
            3,
            5,
            8,
        )
    }

    /// Order `i` demands a single item stocked only in aisle `i`
    fn diagonal() -> ProblemInstance {
        instance(
            &[&[(0, 2)], &[(1, 10)], &[(2, 10)], &[(3, 1)]],
            &[&[(0, 10)], &[(1, 10)], &[(2, 10)], &[(3, 10)]],
            4,
            1,
            100,
        )
    }

    /// Overwrites the ids of the public catalogs, bypassing the checks of `ProblemInstance::new`
    fn relabeled(mut instance: ProblemInstance, order_ids: &[usize], aisle_ids: &[usize]) -> ProblemInstance {
        for (order, &id) in instance.orders.iter_mut().zip(order_ids) {
            order.id = id;
        }
        for (aisle, &id) in instance.aisles.iter_mut().zip(aisle_ids) {
            aisle.id = id;
        }
        instance
    }

    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<Duration>>);

    impl ManualClock {
        fn advance(&self, by: Duration) {
            self.0.set(self.0.get() + by);
        }
    }

    impl TimeSource for ManualClock {
        fn elapsed(&self) -> Duration {
            self.0.get()
        }
    }

    enum Step {
        Solved(SolveStatus, Vec<usize>, Vec<usize>),
        Empty(SolveStatus),
        Fail,
    }

    /// What the scripted backend observed at every call
    #[derive(Default)]
    struct SolveLog {
        time_limits: Vec<Duration>,
        aisle_penalties: Vec<f64>,
        first_pick_coefs: Vec<f64>,
        min_aisles: Vec<Option<f64>>,
        n_constraints: Vec<usize>,
        workers: Vec<usize>,
    }

    impl SolveLog {
        fn n_calls(&self) -> usize {
            self.n_constraints.len()
        }
    }

    /// Backend replaying predetermined outcomes, every call consumes `cost` of the manual clock
    struct ScriptedBackend {
        steps: VecDeque<Step>,
        clock: ManualClock,
        cost: Duration,
        log: Rc<RefCell<SolveLog>>,
    }

    fn objective_coef(model: &LiveModel, var_name: &str) -> f64 {
        let var = model.find_var(var_name).expect("variable should exist");
        model
            .objective()
            .terms
            .iter()
            .find(|(v, _)| *v == var)
            .map_or(0.0, |(_, c)| *c)
    }

    impl MipBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn solve(&mut self, model: &LiveModel) -> Result<MipSolution> {
            {
                let mut log = self.log.borrow_mut();
                log.time_limits
                    .push(model.params().time_limit.expect("every solve should have a time limit"));
                log.aisle_penalties.push(objective_coef(model, &aisle_var_name(0)));
                log.first_pick_coefs.push(objective_coef(model, &order_var_name(0)));
                log.min_aisles.push(
                    model
                        .find_constraint(AISLE_FLOOR_CONSTRAINT)
                        .map(|id| model.constraint(id).lb),
                );
                log.n_constraints.push(model.constraints().len());
                log.workers.push(model.params().workers);
            }
            self.clock.advance(self.cost);

            match self.steps.pop_front() {
                Some(Step::Solved(status, orders, aisles)) => {
                    let mut values = vec![0.0; model.n_vars()];
                    let names = orders
                        .iter()
                        .map(|&o| order_var_name(o))
                        .chain(aisles.iter().map(|&a| aisle_var_name(a)));
                    for name in names {
                        let var = model.find_var(&name).expect("variable should exist");
                        values[var.index()] = 1.0;
                    }
                    Ok(MipSolution::new(status, values))
                }
                Some(Step::Empty(status)) => Ok(MipSolution::without_solution(status)),
                Some(Step::Fail) => bail!("scripted failure"),
                None => bail!("script exhausted"),
            }
        }
    }

    struct Harness {
        clock: ManualClock,
        log: Rc<RefCell<SolveLog>>,
        optimizer: WaveOptimizer,
    }

    impl Harness {
        fn new(config: WaveConfig, steps: Vec<Step>, cost: Duration) -> Self {
            init_logging();
            let clock = ManualClock::default();
            let log = Rc::new(RefCell::new(SolveLog::default()));
            let backend = ScriptedBackend {
                steps: steps.into(),
                clock: clock.clone(),
                cost,
                log: log.clone(),
            };
            Self {
                clock,
                log,
                optimizer: WaveOptimizer::with_backend(config, Box::new(backend)),
            }
        }

        fn scripted(steps: Vec<Step>) -> Self {
            Self::new(WaveConfig::default(), steps, Duration::from_secs(1))
        }

        fn run(&mut self, instance: &ProblemInstance) -> SolveReport {
            self.optimizer
                .solve_timed(instance, &self.clock)
                .expect("instance should be accepted")
        }
    }

    fn solved(status: SolveStatus, orders: &[usize], aisles: &[usize]) -> Step {
        Step::Solved(status, orders.to_vec(), aisles.to_vec())
    }

    fn best_ratio(report: &SolveReport) -> f64 {
        report.best.as_ref().expect("a best solution should exist").ratio
    }

    fn microlp_report(instance: &ProblemInstance) -> SolveReport {
        init_logging();
        let mut optimizer = WaveOptimizer::new(WaveConfig::default()).expect("microlp should be available");
        optimizer.solve_with_report(instance).expect("instance should be accepted")
    }

    #[test]
    fn optimal_start_escalates_until_stalled() {
        let instance = three_orders();
        let report = microlp_report(&instance);

        let best = report.best.as_ref().expect("a wave should be found");
        assert_eq!(best.assignment.orders, vec![0, 1]);
        assert_eq!(best.assignment.aisles, vec![0]);
        assert!(approx_eq!(f64, best.ratio, 7.0, ulps = 4));
        assert!(eval::is_feasible(&instance, &best.assignment));

        //forcing both aisles open yields at most 8 units, worse than 7 units from one aisle
        assert_eq!(report.exit, ExitReason::Stalled);
        assert_eq!(report.n_solves(), 2);
        assert_eq!(report.iterations[0].policy, None);
        assert_eq!(report.iterations[0].status, SolveStatus::Optimal);
        assert_eq!(report.iterations[1].policy, Some(RefinementPolicy::EscalateAisles));
        assert_eq!(report.iterations[1].min_aisles, Some(2));
        assert_eq!(report.iterations[1].outcome, CandidateOutcome::Accepted { improved: false });
    }

    #[test]
    fn unservable_order_yields_no_wave() {
        let instance = instance(&[&[(0, 10)]], &[&[(0, 5)]], 1, 1, 20);
        let report = microlp_report(&instance);

        assert!(report.best.is_none());
        assert_eq!(report.exit, ExitReason::NoSolution);
        assert_eq!(report.n_solves(), 2);
        assert_eq!(report.iterations[1].policy, Some(RefinementPolicy::Retry));

        let mut optimizer = WaveOptimizer::new(WaveConfig::default()).expect("microlp should be available");
        assert_eq!(optimizer.solve(&instance).expect("instance should be accepted"), None);
    }

    #[test_case(0; "lower bound zero")]
    #[test_case(1; "lower bound one")]
    fn escalation_reaches_all_aisles(lb: u64) {
        let instance = instance(&[&[(0, 1)], &[(0, 1), (1, 10)]], &[&[(0, 2)], &[(1, 10)]], 2, lb, 20);
        let report = microlp_report(&instance);

        let best = report.best.as_ref().expect("a wave should be found");
        assert_eq!(best.assignment.orders, vec![0, 1]);
        assert_eq!(best.assignment.aisles, vec![0, 1]);
        assert!(approx_eq!(f64, best.ratio, 6.0, ulps = 4));
        assert_eq!(report.exit, ExitReason::AislesExhausted);

        //the floor of one unit keeps every candidate non-empty
        for record in &report.iterations {
            assert!(record.units.is_some_and(|u| u >= 1));
        }
    }

    #[test]
    fn end_to_end_from_files() {
        init_logging();
        let instance = read_instance(Path::new("../assets/small_wave.txt")).expect("asset should parse");
        let config = io::read_config(Path::new("../assets/config.json")).expect("config should parse");
        assert_eq!(config.time_budget_s, 60);
        assert_eq!(config.stall_limit, 2);
        assert_eq!(config.aisle_penalty, WaveConfig::default().aisle_penalty);

        let mut optimizer = WaveOptimizer::new(config).expect("microlp should be available");
        let assignment = optimizer
            .solve(&instance)
            .expect("instance should be accepted")
            .expect("a wave should be found");

        let path = std::env::temp_dir().join("wave_opt_end_to_end_solution.txt");
        write_solution(&assignment, &path).expect("solution should be written");
        let read_back = read_solution(&path).expect("solution should be read back");
        assert_eq!(read_back, assignment);
        assert!(eval::is_feasible(&instance, &read_back));
        assert!(approx_eq!(f64, eval::score(&instance, &read_back), 7.0, ulps = 4));
    }

    #[test_case(solved(SolveStatus::Feasible, &[0, 1], &[0]), 7.0; "follow-up improves")]
    #[test_case(solved(SolveStatus::Feasible, &[0, 1], &[0, 1]), 4.0; "follow-up is worse")]
    #[test_case(Step::Empty(SolveStatus::Unknown), 4.0; "follow-up finds nothing")]
    fn feasible_start_reweights_once(follow_up: Step, expected_ratio: f64) {
        let instance = three_orders();
        let mut harness = Harness::scripted(vec![
            solved(SolveStatus::Feasible, &[1, 2], &[0, 1]),
            follow_up,
            solved(SolveStatus::Feasible, &[0, 1], &[0]),
        ]);
        let report = harness.run(&instance);

        assert_eq!(report.exit, ExitReason::SinglePassComplete);
        assert_eq!(report.n_solves(), 2);
        assert_eq!(report.iterations[1].policy, Some(RefinementPolicy::ReweightPenalty));
        assert!(best_ratio(&report) >= 4.0);
        assert!(approx_eq!(f64, best_ratio(&report), expected_ratio, ulps = 4));

        //aisles are re-priced at 1.15 times the initial ratio of 8 units over 2 aisles
        let log = harness.log.borrow();
        assert!(approx_eq!(f64, log.aisle_penalties[0], 100_000.0, ulps = 4));
        assert!(approx_eq!(f64, log.aisle_penalties[1], 4.0 * 1.15, epsilon = 1e-9));
        assert!(approx_eq!(f64, log.first_pick_coefs[1], -4.0, ulps = 4));
    }

    #[test]
    fn reweighting_without_valid_candidate_keeps_objective() {
        let instance = three_orders();
        let mut harness = Harness::scripted(vec![
            solved(SolveStatus::Feasible, &[0, 1, 2], &[0, 1]),
            solved(SolveStatus::Feasible, &[0, 1], &[0]),
        ]);
        let report = harness.run(&instance);

        assert!(matches!(report.iterations[0].outcome, CandidateOutcome::Rejected { .. }));
        assert_eq!(report.exit, ExitReason::SinglePassComplete);
        assert!(approx_eq!(f64, best_ratio(&report), 7.0, ulps = 4));

        let log = harness.log.borrow();
        assert_eq!(log.aisle_penalties, vec![100_000.0, 100_000.0]);
    }

    #[test_case(1, 3, ExitReason::Stalled; "stall limit 1")]
    #[test_case(2, 4, ExitReason::Stalled; "stall limit 2")]
    #[test_case(3, 4, ExitReason::AislesExhausted; "stall limit 3")]
    fn escalation_respects_stall_limit(stall_limit: usize, n_solves: usize, exit: ExitReason) {
        let instance = diagonal();
        let config = WaveConfig {
            stall_limit,
            ..WaveConfig::default()
        };
        let mut harness = Harness::new(
            config,
            vec![
                solved(SolveStatus::Optimal, &[0], &[0]),
                solved(SolveStatus::Optimal, &[1, 2], &[1, 2]),
                solved(SolveStatus::Optimal, &[0, 1, 2], &[0, 1, 2]),
                solved(SolveStatus::Optimal, &[0, 1, 2, 3], &[0, 1, 2, 3]),
            ],
            Duration::from_secs(1),
        );
        let report = harness.run(&instance);

        assert_eq!(report.exit, exit);
        assert_eq!(report.n_solves(), n_solves);
        assert!(approx_eq!(f64, best_ratio(&report), 10.0, ulps = 4));

        let expected_floors = [None, Some(2), Some(3), Some(4)];
        let floors = report.iterations.iter().map(|r| r.min_aisles).collect::<Vec<_>>();
        assert_eq!(floors, expected_floors[..n_solves].to_vec());

        //the running best never decreases
        let improvements = report
            .iterations
            .iter()
            .filter(|r| r.outcome == CandidateOutcome::Accepted { improved: true })
            .filter_map(|r| r.ratio)
            .collect::<Vec<_>>();
        assert!(improvements.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn aisle_floor_skips_past_opened_aisles() {
        let instance = diagonal();
        let mut harness = Harness::scripted(vec![
            solved(SolveStatus::Optimal, &[0], &[0]),
            solved(SolveStatus::Optimal, &[1, 2], &[1, 2, 3]),
            solved(SolveStatus::Optimal, &[0, 1, 2, 3], &[0, 1, 2, 3]),
        ]);
        let report = harness.run(&instance);

        assert_eq!(report.exit, ExitReason::Stalled);
        let log = harness.log.borrow();
        assert_eq!(log.min_aisles, vec![None, Some(2.0), Some(4.0)]);
        //the floor constraint is added once and tightened in place afterwards
        assert_eq!(log.n_constraints, vec![5, 6, 6]);
        assert_eq!(log.workers, vec![8, 8, 8]);
        assert!(approx_eq!(f64, best_ratio(&report), 20.0 / 3.0, epsilon = 1e-9));
    }

    #[test]
    fn escalation_stops_without_solution() {
        let instance = diagonal();
        let mut harness = Harness::scripted(vec![
            solved(SolveStatus::Optimal, &[0], &[0]),
            Step::Empty(SolveStatus::Infeasible),
        ]);
        let report = harness.run(&instance);

        assert_eq!(report.exit, ExitReason::NoSolution);
        assert_eq!(report.n_solves(), 2);
        assert!(approx_eq!(f64, best_ratio(&report), 2.0, ulps = 4));
    }

    #[test]
    fn invalid_candidate_is_discarded() {
        let instance = three_orders();
        //12 units exceed the wave upper bound of 8
        let mut harness = Harness::scripted(vec![solved(SolveStatus::Optimal, &[0, 1, 2], &[0, 1])]);
        let report = harness.run(&instance);

        assert!(report.best.is_none());
        assert_eq!(report.exit, ExitReason::AislesExhausted);
        assert_eq!(report.iterations[0].units, Some(12));
        assert_eq!(report.iterations[0].ratio, None);
        assert!(matches!(report.iterations[0].outcome, CandidateOutcome::Rejected { .. }));
    }

    #[test]
    fn backend_failure_is_absorbed() {
        let instance = three_orders();
        let mut harness = Harness::scripted(vec![Step::Fail, solved(SolveStatus::Optimal, &[0, 1], &[0])]);
        let report = harness.run(&instance);

        assert_eq!(report.iterations[0].status, SolveStatus::Unknown);
        assert_eq!(report.iterations[0].outcome, CandidateOutcome::NoSolution);
        assert_eq!(report.iterations[1].policy, Some(RefinementPolicy::Retry));
        assert_eq!(report.exit, ExitReason::SinglePassComplete);
        assert!(approx_eq!(f64, best_ratio(&report), 7.0, ulps = 4));
    }

    #[test]
    fn retry_without_solution_gives_up() {
        let instance = three_orders();
        let mut harness = Harness::scripted(vec![
            Step::Empty(SolveStatus::Infeasible),
            Step::Empty(SolveStatus::Unknown),
            solved(SolveStatus::Optimal, &[0, 1], &[0]),
        ]);
        let report = harness.run(&instance);

        assert!(report.best.is_none());
        assert_eq!(report.exit, ExitReason::NoSolution);
        assert_eq!(harness.log.borrow().n_calls(), 2);
    }

    #[test]
    fn budget_runs_out_between_solves() {
        let instance = diagonal();
        let config = WaveConfig {
            time_budget_s: 100,
            safety_margin_s: 5,
            ..WaveConfig::default()
        };
        let mut harness = Harness::new(
            config,
            vec![
                solved(SolveStatus::Optimal, &[0], &[0]),
                solved(SolveStatus::Optimal, &[1, 2], &[1, 2]),
                solved(SolveStatus::Optimal, &[0, 1, 2], &[0, 1, 2]),
            ],
            Duration::from_secs(60),
        );
        let report = harness.run(&instance);

        assert_eq!(report.exit, ExitReason::BudgetExhausted);
        assert_eq!(report.n_solves(), 2);
        assert!(approx_eq!(f64, best_ratio(&report), 10.0, ulps = 4));

        let log = harness.log.borrow();
        assert_eq!(log.time_limits, vec![Duration::from_secs(95), Duration::from_secs(35)]);
        let limits_ms = report.iterations.iter().map(|r| r.time_limit_ms).collect::<Vec<_>>();
        assert_eq!(limits_ms, vec![95_000, 35_000]);
    }

    #[test_case(5, 5; "budget equals margin")]
    #[test_case(4, 5; "budget below margin")]
    #[test_case(0, 5; "no budget")]
    fn no_solve_without_budget(time_budget_s: u64, safety_margin_s: u64) {
        let config = WaveConfig {
            time_budget_s,
            safety_margin_s,
            ..WaveConfig::default()
        };
        let mut harness = Harness::new(
            config,
            vec![solved(SolveStatus::Optimal, &[0, 1], &[0])],
            Duration::from_secs(1),
        );
        let report = harness.run(&three_orders());

        assert!(report.best.is_none());
        assert!(report.iterations.is_empty());
        assert_eq!(report.exit, ExitReason::BudgetExhausted);
        assert_eq!(harness.log.borrow().n_calls(), 0);
    }

    #[test_case(instance(&[], &[&[(0, 5)]], 1, 1, 10); "no orders")]
    #[test_case(instance(&[&[(0, 5)]], &[], 1, 1, 10); "no aisles")]
    #[test_case(instance(&[], &[], 0, 0, 0); "nothing at all")]
    fn empty_instance_is_not_solved(instance: ProblemInstance) {
        let mut harness = Harness::scripted(vec![]);
        let report = harness.run(&instance);

        assert!(report.best.is_none());
        assert_eq!(report.exit, ExitReason::EmptyInstance);
        assert_eq!(harness.log.borrow().n_calls(), 0);
    }

    #[test_case(
        instance(&[&[(0, 1)]], &[&[(0, 1)]], 1, 10, 5),
        ModelBuildError::InvertedWaveBounds { lb: 10, ub: 5 };
        "inverted wave bounds"
    )]
    #[test_case(
        instance(&[&[(3, 1)]], &[&[(0, 1)]], 1, 1, 5),
        ModelBuildError::ItemOutOfRange { entry: CatalogEntry::Order(0), item: 3, n_items: 1 };
        "order item out of range"
    )]
    #[test_case(
        instance(&[&[(0, 1)]], &[&[(0, 1), (2, 1)]], 2, 1, 5),
        ModelBuildError::ItemOutOfRange { entry: CatalogEntry::Aisle(0), item: 2, n_items: 2 };
        "aisle item out of range"
    )]
    #[test_case(
        relabeled(three_orders(), &[5, 1, 2], &[0, 1]),
        ModelBuildError::IdMismatch { entry: CatalogEntry::Order(0), id: 5 };
        "order id outside the catalog"
    )]
    #[test_case(
        relabeled(three_orders(), &[0, 1, 2], &[1, 0]),
        ModelBuildError::IdMismatch { entry: CatalogEntry::Aisle(0), id: 1 };
        "permuted aisle ids"
    )]
    fn malformed_instance_is_rejected(instance: ProblemInstance, expected: ModelBuildError) {
        let mut harness = Harness::scripted(vec![]);
        let result = harness.optimizer.solve_timed(&instance, &harness.clock);

        assert!(matches!(result, Err(WaveError::ModelBuild(e)) if e == expected));
        assert_eq!(harness.log.borrow().n_calls(), 0);
    }

    #[test]
    fn unknown_backend_is_unavailable() {
        let config = WaveConfig {
            backend: "gurobi".to_string(),
            ..WaveConfig::default()
        };
        let err = WaveOptimizer::new(config).err();
        assert!(matches!(err, Some(WaveError::SolverUnavailable(name)) if name == "gurobi"));
        assert!(create_backend(MicrolpBackend::NAME).is_ok());
    }

    #[cfg(not(feature = "highs"))]
    #[test]
    fn highs_requires_feature() {
        assert!(matches!(create_backend("highs").err(), Some(WaveError::SolverUnavailable(_))));
    }

    /// Random instance large enough that no backend proves optimality within a few seconds
    fn hard_instance(n_orders: usize, n_aisles: usize, n_items: usize) -> ProblemInstance {
        let mut state = 0x2545_f491_4f6c_dd1d_u64;
        let mut next = move |bound: u64| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state % bound
        };
        let mut bag = |n_entries: u64, max_qty: u64| {
            let entries = (0..=n_entries)
                .map(|_| (next(n_items as u64) as usize, 1 + next(max_qty)))
                .collect::<Vec<_>>();
            ItemQtys::new(entries)
        };
        let orders = (0..n_orders).map(|id| Order::new(id, bag(2, 5))).collect::<Vec<_>>();
        let aisles = (0..n_aisles).map(|id| Aisle::new(id, bag(5, 10))).collect::<Vec<_>>();
        ProblemInstance::new(orders, aisles, n_items, WaveBounds::new(60, 120))
    }

    fn assert_deadline_holds(backend: &str) {
        init_logging();
        let config = WaveConfig {
            time_budget_s: 3,
            safety_margin_s: 1,
            backend: backend.to_string(),
            ..WaveConfig::default()
        };
        let deadline = config.time_budget() + config.safety_margin();
        let instance = hard_instance(150, 120, 40);

        let start = Instant::now();
        let mut optimizer = WaveOptimizer::new(config).expect("backend should be available");
        let report = optimizer.solve_with_report(&instance).expect("instance should be accepted");
        let wall = start.elapsed();

        assert!(wall <= deadline, "run took {wall:?}, deadline plus margin is {deadline:?}");
        assert!(report.elapsed_ms <= deadline.as_millis() as u64);
        assert!(report.n_solves() >= 1);
        assert!(report.iterations.iter().all(|r| r.time_limit_ms <= 2_000));
        if let Some(best) = &report.best {
            assert!(eval::is_feasible(&instance, &best.assignment));
        }
    }

    #[test]
    fn microlp_respects_deadline() {
        assert_deadline_holds(MicrolpBackend::NAME);
    }

    #[test]
    fn microlp_abandons_solve_at_time_limit() {
        let instance = hard_instance(150, 120, 40);
        let index = DemandSupplyIndex::new(&instance);
        let mut model = build_model(&instance, &index).expect("model should build");
        WaveConfig::default().weights().apply(&mut model);
        model.live.set_time_limit(Duration::from_millis(300));

        let start = Instant::now();
        let solution = MicrolpBackend::new().solve(&model.live).expect("microlp should report");
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(matches!(solution.status, SolveStatus::Optimal | SolveStatus::Unknown));
    }

    #[cfg(feature = "highs")]
    #[test]
    fn highs_respects_deadline() {
        assert_deadline_holds(wave_opt::mip::HighsBackend::NAME);
    }

    #[cfg(feature = "highs")]
    #[test]
    fn highs_solves_small_instance() {
        init_logging();
        let config = WaveConfig {
            backend: wave_opt::mip::HighsBackend::NAME.to_string(),
            ..WaveConfig::default()
        };
        let mut optimizer = WaveOptimizer::new(config).expect("highs should be available");
        let report = optimizer.solve_with_report(&three_orders()).expect("instance should be accepted");

        let best = report.best.as_ref().expect("a wave should be found");
        assert_eq!(best.assignment.orders, vec![0, 1]);
        assert_eq!(best.assignment.aisles, vec![0]);
        assert_eq!(report.exit, ExitReason::Stalled);
    }

    #[test]
    fn model_layout() {
        let instance = three_orders();
        let index = DemandSupplyIndex::new(&instance);
        let model = build_model(&instance, &index).expect("model should build");

        assert_eq!(model.live.n_vars(), 5);
        assert_eq!(model.n_item_constraints, 3);
        assert_eq!(model.live.constraints().len(), 4);
        assert!(model.live.find_var("pick_2").is_some());
        assert!(model.live.find_var("open_1").is_some());
        assert_eq!(model.min_aisles(), None);

        let wave = model.live.constraint(model.wave_size);
        assert_eq!(wave.name, WAVE_SIZE_CONSTRAINT);
        assert_eq!((wave.lb, wave.ub), (5.0, 8.0));
    }

    #[test]
    fn model_floors_wave_and_skips_undemanded_items() {
        //item 3 is stocked but never demanded
        let instance = instance(&[&[(0, 2)], &[(1, 1)]], &[&[(0, 5), (3, 5)], &[(1, 5), (2, 1)]], 4, 0, 10);
        let index = DemandSupplyIndex::new(&instance);
        let mut model = build_model(&instance, &index).expect("model should build");

        assert_eq!(model.live.constraint(model.wave_size).lb, 1.0);
        assert_eq!(model.n_item_constraints, 2);
        assert!(model.live.find_constraint("item_0").is_some());
        assert!(model.live.find_constraint("item_2").is_none());
        assert!(model.live.find_constraint("item_3").is_none());

        let n_constraints = model.live.constraints().len();
        model.require_min_aisles(1);
        model.require_min_aisles(2);
        assert_eq!(model.live.constraints().len(), n_constraints + 1);
        assert_eq!(model.min_aisles(), Some(2));
    }

    #[test]
    fn surrogate_objective() {
        let instance = three_orders();
        let index = DemandSupplyIndex::new(&instance);
        let mut model = build_model(&instance, &index).expect("model should build");

        let weights = SurrogateWeights::new(100_000.0, 2.0);
        weights.apply(&mut model);
        assert_eq!(model.live.objective().sense, Sense::Minimize);
        assert_eq!(objective_coef(&model.live, "open_1"), 100_000.0);
        assert_eq!(objective_coef(&model.live, "pick_2"), -10.0);

        let reweighted = weights.reweighted(4.0, 1.15);
        assert!(approx_eq!(f64, reweighted.aisle_penalty, 4.6, epsilon = 1e-9));
        assert_eq!(reweighted.unit_reward, 2.0);
    }

    #[test_case(SolveStatus::Optimal, RefinementPolicy::EscalateAisles)]
    #[test_case(SolveStatus::Feasible, RefinementPolicy::ReweightPenalty)]
    #[test_case(SolveStatus::Infeasible, RefinementPolicy::Retry)]
    #[test_case(SolveStatus::Unknown, RefinementPolicy::Retry)]
    fn policy_follows_status(status: SolveStatus, expected: RefinementPolicy) {
        assert_eq!(RefinementPolicy::after(status), expected);
    }

    #[test]
    fn microlp_solves_live_model() {
        let mut model = LiveModel::new();
        let x = model.add_bool_var("x");
        let y = model.add_bool_var("y");
        model.add_constraint("choose_one", f64::NEG_INFINITY, 1.0, vec![(x, 1.0), (y, 1.0)]);
        model.set_objective(vec![(x, 2.0), (y, 3.0)], Sense::Maximize);

        let mut backend = MicrolpBackend::new();
        let solution = backend.solve(&model).expect("microlp should solve");
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!(!solution.is_set(x));
        assert!(solution.is_set(y));

        let forced = model.add_constraint("both", 2.0, f64::INFINITY, vec![(x, 1.0), (y, 1.0)]);
        let solution = backend.solve(&model).expect("microlp should solve");
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(!solution.status.has_solution());
        assert_eq!(model.constraint(forced).name, "both");
    }

    #[test]
    fn microlp_rejects_unsatisfiable_empty_constraint() {
        let mut model = LiveModel::new();
        model.add_bool_var("x");
        model.add_constraint("empty", 1.0, f64::INFINITY, vec![]);

        let solution = MicrolpBackend::new().solve(&model).expect("microlp should solve");
        assert_eq!(solution.status, SolveStatus::Infeasible);
    }

    #[test_case(0, Some(8); "start")]
    #[test_case(7, Some(1); "one second left")]
    #[test_case(8, None; "margin reached")]
    #[test_case(12, None; "deadline passed")]
    fn budget_solve_limit(elapsed_s: u64, expected_s: Option<u64>) {
        let clock = ManualClock::default();
        clock.advance(Duration::from_secs(elapsed_s));
        let budget = TimeBudget::new(&clock, Duration::from_secs(10), Duration::from_secs(2));

        assert_eq!(budget.solve_limit(), expected_s.map(Duration::from_secs));
        assert!(budget.remaining() <= Duration::from_secs(10));
    }

    #[test_case(|c: &mut WaveConfig| c.aisle_penalty = 0.0; "zero aisle penalty")]
    #[test_case(|c: &mut WaveConfig| c.unit_reward = -1.0; "negative unit reward")]
    #[test_case(|c: &mut WaveConfig| c.reweight_factor = 0.0; "zero reweight factor")]
    #[test_case(|c: &mut WaveConfig| c.stall_limit = 0; "zero stall limit")]
    fn invalid_config_is_rejected(tamper: fn(&mut WaveConfig)) {
        let mut config = WaveConfig::default();
        assert!(config.validate().is_ok());
        tamper(&mut config);
        assert!(config.validate().is_err());
    }
}
