use std::time::Duration;

/// Handle to a boolean variable of a [`LiveModel`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Handle to a linear constraint of a [`LiveModel`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstrId(usize);

impl ConstrId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Coefficient of a variable in a linear expression
pub type Term = (VarId, f64);

#[derive(Clone, Debug)]
pub struct BoolVar {
    pub name: String,
}

/// `lb <= Σ coef·var <= ub`, infinite bounds denote an open side
#[derive(Clone, Debug)]
pub struct LinearConstraint {
    pub name: String,
    pub lb: f64,
    pub ub: f64,
    pub terms: Vec<Term>,
}

impl LinearConstraint {
    /// Whether the constraint holds for the given variable values
    pub fn is_satisfied_by(&self, values: &[f64]) -> bool {
        let activity: f64 = self.terms.iter().map(|(v, c)| c * values[v.index()]).sum();
        const TOL: f64 = 1e-6;
        activity >= self.lb - TOL && activity <= self.ub + TOL
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Clone, Debug)]
pub struct Objective {
    pub terms: Vec<Term>,
    pub sense: Sense,
}

/// Parameters handed to the backend with every solve
#[derive(Clone, Copy, Debug)]
pub struct SolveParams {
    pub time_limit: Option<Duration>,
    pub workers: usize,
}

/// Boolean linear model which stays alive across consecutive solves.
///
/// Mutation contract: variables and constraints are append-only. Between two solves only the lower
/// bound of existing constraints ([`LiveModel::set_lower_bound`]), the objective
/// ([`LiveModel::set_objective`]) and the solve parameters may change. Every structural or bound
/// change increments [`LiveModel::revision`], backends can compare revisions to reuse earlier work.
#[derive(Clone, Debug)]
pub struct LiveModel {
    vars: Vec<BoolVar>,
    constraints: Vec<LinearConstraint>,
    objective: Objective,
    params: SolveParams,
    revision: u64,
}

impl LiveModel {
    pub fn new() -> Self {
        Self {
            vars: vec![],
            constraints: vec![],
            objective: Objective {
                terms: vec![],
                sense: Sense::Minimize,
            },
            params: SolveParams {
                time_limit: None,
                workers: 1,
            },
            revision: 0,
        }
    }

    pub fn add_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.vars.push(BoolVar { name: name.into() });
        self.revision += 1;
        VarId(self.vars.len() - 1)
    }

    /// Adds `lb <= Σ terms <= ub`. Use `f64::NEG_INFINITY`/`f64::INFINITY` for an open side.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        lb: f64,
        ub: f64,
        terms: Vec<Term>,
    ) -> ConstrId {
        debug_assert!(terms.iter().all(|(v, _)| v.index() < self.vars.len()));
        self.constraints.push(LinearConstraint {
            name: name.into(),
            lb,
            ub,
            terms,
        });
        self.revision += 1;
        ConstrId(self.constraints.len() - 1)
    }

    pub fn set_lower_bound(&mut self, id: ConstrId, lb: f64) {
        self.constraints[id.0].lb = lb;
        self.revision += 1;
    }

    /// Replaces the objective
    pub fn set_objective(&mut self, terms: Vec<Term>, sense: Sense) {
        debug_assert!(terms.iter().all(|(v, _)| v.index() < self.vars.len()));
        self.objective = Objective { terms, sense };
        self.revision += 1;
    }

    pub fn set_time_limit(&mut self, limit: Duration) {
        self.params.time_limit = Some(limit);
    }

    pub fn set_workers(&mut self, n: usize) {
        self.params.workers = n.max(1);
    }

    pub fn vars(&self) -> &[BoolVar] {
        &self.vars
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn constraint(&self, id: ConstrId) -> &LinearConstraint {
        &self.constraints[id.0]
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn params(&self) -> SolveParams {
        self.params
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn n_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn find_var(&self, name: &str) -> Option<VarId> {
        self.vars.iter().position(|v| v.name == name).map(VarId)
    }

    pub fn find_constraint(&self, name: &str) -> Option<ConstrId> {
        self.constraints.iter().position(|c| c.name == name).map(ConstrId)
    }
}

impl Default for LiveModel {
    fn default() -> Self {
        Self::new()
    }
}
