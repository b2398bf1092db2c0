//! Transition rules: classic Life thresholds and Problife probabilities

use super::grid::{CellState, Grid};
use crate::error::{EngineError, Result};
use itertools::Itertools;
use rand::Rng;
use std::fmt;

/// Largest possible live-neighbor count in a Moore neighborhood
pub const MAX_NEIGHBORS: u8 = 8;

/// Decides the next state of one cell.
///
/// Deterministic rules ignore `rng`; probabilistic rules take exactly one
/// draw from it per call.
pub trait TransitionRule {
    fn next_state<R: Rng + ?Sized>(&self, current: CellState, neighbors: u8, rng: &mut R) -> CellState;
}

/// A set of neighbor counts in `0..=8`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NeighborSet(u16);

impl NeighborSet {
    pub fn new(counts: &[u8]) -> Result<Self> {
        counts.iter().try_fold(Self::default(), |set, &k| {
            if k > MAX_NEIGHBORS {
                return Err(EngineError::invalid(format!(
                    "Neighbor count {} outside 0..={}",
                    k, MAX_NEIGHBORS
                )));
            }
            Ok(Self(set.0 | 1 << k))
        })
    }

    #[inline]
    pub fn contains(self, k: u8) -> bool {
        k <= MAX_NEIGHBORS && self.0 & (1 << k) != 0
    }

    pub fn counts(self) -> impl Iterator<Item = u8> {
        (0..=MAX_NEIGHBORS).filter(move |&k| self.contains(k))
    }
}

/// Threshold rule in B/S notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifeRule {
    pub survive: NeighborSet,
    pub birth: NeighborSet,
}

impl LifeRule {
    pub fn new(survive: &[u8], birth: &[u8]) -> Result<Self> {
        Ok(Self {
            survive: NeighborSet::new(survive)?,
            birth: NeighborSet::new(birth)?,
        })
    }

    /// Conway's B3/S23
    pub fn conway() -> Self {
        Self {
            survive: NeighborSet(1 << 2 | 1 << 3),
            birth: NeighborSet(1 << 3),
        }
    }

    /// Parse a rulestring such as `B3/S23` (parts in any order, case-insensitive)
    pub fn parse(text: &str) -> Result<Self> {
        let mut birth = None;
        let mut survive = None;

        for part in text.trim().split('/') {
            let part = part.trim();
            let mut chars = part.chars();
            let slot = match chars.next() {
                Some('B' | 'b') => &mut birth,
                Some('S' | 's') => &mut survive,
                _ => {
                    return Err(EngineError::invalid(format!(
                        "Rule part '{}' in '{}' must start with B or S",
                        part, text
                    )))
                }
            };
            if slot.is_some() {
                return Err(EngineError::invalid(format!("Repeated rule part in '{}'", text)));
            }

            let counts = chars
                .map(|c| match c.to_digit(10) {
                    Some(d) if d <= MAX_NEIGHBORS as u32 => Ok(d as u8),
                    _ => Err(EngineError::invalid(format!(
                        "Invalid neighbor count '{}' in rule '{}'",
                        c, text
                    ))),
                })
                .collect::<Result<Vec<u8>>>()?;
            *slot = Some(NeighborSet::new(&counts)?);
        }

        Ok(Self {
            survive: survive.unwrap_or_default(),
            birth: birth.unwrap_or_default(),
        })
    }
}

impl TransitionRule for LifeRule {
    #[inline]
    fn next_state<R: Rng + ?Sized>(&self, current: CellState, neighbors: u8, _rng: &mut R) -> CellState {
        let alive = match current {
            CellState::Alive => self.survive.contains(neighbors),
            CellState::Dead => self.birth.contains(neighbors),
        };
        alive.into()
    }
}

impl fmt::Display for LifeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "B{}/S{}",
            self.birth.counts().join(""),
            self.survive.counts().join("")
        )
    }
}

/// Which transition a probability applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Survival,
    Birth,
}

impl Condition {
    fn symbol(self) -> char {
        match self {
            Condition::Survival => 's',
            Condition::Birth => 'b',
        }
    }
}

/// Problife probability tables indexed by live-neighbor count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbRule {
    survival: [f64; 9],
    birth: [f64; 9],
}

impl Default for ProbRule {
    /// Every transition has probability zero
    fn default() -> Self {
        Self {
            survival: [0.0; 9],
            birth: [0.0; 9],
        }
    }
}

impl ProbRule {
    pub fn new(survival: [f64; 9], birth: [f64; 9]) -> Result<Self> {
        for (k, &p) in survival.iter().chain(birth.iter()).enumerate() {
            check_probability(p, (k % 9) as u8)?;
        }
        Ok(Self { survival, birth })
    }

    /// Ps(2)=0.9, Ps(3)=0.9, Pb(3)=0.8
    pub fn problife() -> Self {
        let mut rule = Self::default();
        rule.survival[2] = 0.9;
        rule.survival[3] = 0.9;
        rule.birth[3] = 0.8;
        rule
    }

    /// Classic thresholds expressed as certainties
    pub fn from_life(rule: &LifeRule) -> Self {
        let mut prob = Self::default();
        for k in 0..=MAX_NEIGHBORS as usize {
            prob.survival[k] = if rule.survive.contains(k as u8) { 1.0 } else { 0.0 };
            prob.birth[k] = if rule.birth.contains(k as u8) { 1.0 } else { 0.0 };
        }
        prob
    }

    /// Set one entry of the table
    pub fn set(&mut self, condition: Condition, neighbors: u8, probability: f64) -> Result<()> {
        if neighbors > MAX_NEIGHBORS {
            return Err(EngineError::invalid(format!(
                "Neighbor count {} outside 0..={}",
                neighbors, MAX_NEIGHBORS
            )));
        }
        check_probability(probability, neighbors)?;
        let table = match condition {
            Condition::Survival => &mut self.survival,
            Condition::Birth => &mut self.birth,
        };
        table[neighbors as usize] = probability;
        Ok(())
    }

    pub fn survival_probability(&self, neighbors: u8) -> f64 {
        self.survival.get(neighbors as usize).copied().unwrap_or(0.0)
    }

    pub fn birth_probability(&self, neighbors: u8) -> f64 {
        self.birth.get(neighbors as usize).copied().unwrap_or(0.0)
    }

    /// Parse a single `Pc(N)=x` entry, e.g. `Ps(2)=0.9`
    pub fn parse_expr(expr: &str) -> Result<(Condition, u8, f64)> {
        let malformed = || {
            EngineError::invalid(format!(
                "Expression '{}' must have the form Pc(N)=x with c in {{s, b}}",
                expr
            ))
        };

        let rest = expr.trim().strip_prefix('P').ok_or_else(malformed)?;
        let mut chars = rest.chars();
        let condition = match chars.next() {
            Some('s') => Condition::Survival,
            Some('b') => Condition::Birth,
            _ => return Err(malformed()),
        };
        let (count, probability) = chars
            .as_str()
            .strip_prefix('(')
            .and_then(|s| s.split_once(")="))
            .ok_or_else(malformed)?;

        let neighbors: u8 = count.parse().map_err(|_| malformed())?;
        if neighbors > MAX_NEIGHBORS {
            return Err(EngineError::invalid(format!(
                "Neighbor count {} in '{}' outside 0..={}",
                neighbors, expr, MAX_NEIGHBORS
            )));
        }
        let probability: f64 = probability.trim().parse().map_err(|_| malformed())?;
        check_probability(probability, neighbors)?;

        Ok((condition, neighbors, probability))
    }

    /// Build a table from `Pc(N)=x` entries; unlisted counts have probability 0
    /// and a later entry for the same transition replaces an earlier one.
    pub fn from_exprs<S: AsRef<str>>(exprs: &[S]) -> Result<Self> {
        let mut rule = Self::default();
        for expr in exprs {
            let (condition, neighbors, probability) = Self::parse_expr(expr.as_ref())?;
            rule.set(condition, neighbors, probability)?;
        }
        Ok(rule)
    }

    /// Non-zero entries in `Pc(N)=x` form, survival first
    pub fn to_exprs(&self) -> Vec<String> {
        [(Condition::Survival, &self.survival), (Condition::Birth, &self.birth)]
            .into_iter()
            .flat_map(|(condition, table)| {
                table
                    .iter()
                    .enumerate()
                    .filter(|&(_, &p)| p > 0.0)
                    .map(move |(k, p)| format!("P{}({})={}", condition.symbol(), k, p))
            })
            .collect()
    }
}

fn check_probability(p: f64, neighbors: u8) -> Result<()> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(EngineError::invalid(format!(
            "Probability {} for {} neighbors must lie in [0, 1]",
            p, neighbors
        )))
    }
}

impl TransitionRule for ProbRule {
    #[inline]
    fn next_state<R: Rng + ?Sized>(&self, current: CellState, neighbors: u8, rng: &mut R) -> CellState {
        let r: f64 = rng.gen();
        let p = match current {
            CellState::Alive => self.survival_probability(neighbors),
            CellState::Dead => self.birth_probability(neighbors),
        };
        (r < p).into()
    }
}

impl fmt::Display for ProbRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exprs = self.to_exprs();
        if exprs.is_empty() {
            write!(f, "(all transitions 0)")
        } else {
            write!(f, "{}", exprs.join(", "))
        }
    }
}

/// The rule family active for a simulation, fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub enum RuleSet {
    Life(LifeRule),
    Problife(ProbRule),
}

impl RuleSet {
    pub fn conway() -> Self {
        RuleSet::Life(LifeRule::conway())
    }

    /// B13/S23
    pub fn custom_life() -> Self {
        RuleSet::Life(LifeRule {
            survive: NeighborSet(1 << 2 | 1 << 3),
            birth: NeighborSet(1 << 1 | 1 << 3),
        })
    }

    pub fn problife() -> Self {
        RuleSet::Problife(ProbRule::problife())
    }

    pub fn is_probabilistic(&self) -> bool {
        matches!(self, RuleSet::Problife(_))
    }

    pub fn next_state<R: Rng + ?Sized>(&self, current: CellState, neighbors: u8, rng: &mut R) -> CellState {
        match self {
            RuleSet::Life(rule) => rule.next_state(current, neighbors, rng),
            RuleSet::Problife(rule) => rule.next_state(current, neighbors, rng),
        }
    }

    /// Compute the next generation of `current`
    pub fn evolve<R: Rng + ?Sized>(&self, current: &Grid, rng: &mut R) -> Grid {
        // Dispatch once, not per cell
        match self {
            RuleSet::Life(rule) => evolve_with(rule, current, rng),
            RuleSet::Problife(rule) => evolve_with(rule, current, rng),
        }
    }
}

fn evolve_with<T, R>(rule: &T, current: &Grid, rng: &mut R) -> Grid
where
    T: TransitionRule,
    R: Rng + ?Sized,
{
    current.successor(|state, neighbors| rule.next_state(state, neighbors, &mut *rng))
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSet::Life(rule) => write!(f, "Life {}", rule),
            RuleSet::Problife(rule) => write!(f, "Problife {}", rule),
        }
    }
}
