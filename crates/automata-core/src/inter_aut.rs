//! Intermediate representation at the parser boundary.
//!
//! An external parser turns a textual automaton description into a graph of
//! formula nodes; construction code folds that graph into an [`Nfa`] through
//! the ordinary `add` calls. The textual grammar itself lives outside this
//! crate.

use thiserror::Error;

use crate::nfa::Nfa;
use crate::{State, Symbol};

/// How states, symbols, or sub-formula nodes are named in a description:
/// automatically numbered, tagged by a marker prefix, or enumerated up
/// front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    Auto,
    Marker,
    Enumerated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphabetType {
    Explicit,
    BitVector,
    Class,
    Intervals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomatonType {
    Nfa,
    Afa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Neg,
    And,
    Or,
}

/// What an operand node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Symbol,
    State,
    Node,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Operator(Operator),
    Operand(OperandKind),
}

/// One node of a transition formula: the raw token from the description and
/// the parsed name (markers stripped), tagged by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaNode {
    pub raw: String,
    pub name: String,
    pub kind: NodeKind,
}

impl FormulaNode {
    pub fn operand(kind: OperandKind, name: impl Into<String>) -> Self {
        let name = name.into();
        FormulaNode {
            raw: name.clone(),
            name,
            kind: NodeKind::Operand(kind),
        }
    }

    pub fn operator(operator: Operator, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        FormulaNode {
            raw: raw.clone(),
            name: raw,
            kind: NodeKind::Operator(operator),
        }
    }

    pub fn is_operand(&self) -> bool {
        matches!(self.kind, NodeKind::Operand(_))
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.kind, NodeKind::Operator(_))
    }
}

/// A formula as a node with sub-formula children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaGraph {
    pub node: FormulaNode,
    pub children: Vec<FormulaGraph>,
}

impl FormulaGraph {
    pub fn leaf(node: FormulaNode) -> Self {
        FormulaGraph {
            node,
            children: Vec::new(),
        }
    }
}

/// A parsed automaton description before construction: naming modes, name
/// enumerations, and the transition formulas `(source, formula)`.
#[derive(Debug, Clone)]
pub struct InterAutomaton {
    pub automaton_type: AutomatonType,
    pub state_naming: Naming,
    pub symbol_naming: Naming,
    pub node_naming: Naming,
    pub alphabet_type: AlphabetType,

    /// Name enumerations; a name's position is its ID.
    pub state_names: Vec<String>,
    pub symbol_names: Vec<String>,
    pub node_names: Vec<String>,

    pub initial_states: Vec<FormulaNode>,
    pub final_states: Vec<FormulaNode>,
    pub transitions: Vec<(FormulaNode, FormulaGraph)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterAutError {
    #[error("description is not a plain NFA")]
    NotNfa,
    #[error("only enumerated state and symbol naming can be folded")]
    UnsupportedNaming,
    #[error("unknown state name `{0}`")]
    UnknownState(String),
    #[error("`{0}` is not a state operand")]
    NotAState(String),
    #[error("unknown symbol name `{0}`")]
    UnknownSymbol(String),
    #[error("transition formula is not `symbol & target-state`")]
    MalformedTransition,
}

impl InterAutomaton {
    /// Fold an explicit-enumeration NFA description into an automaton.
    ///
    /// Each transition formula must be the conjunction of one symbol operand
    /// and one target-state operand, the plain-NFA shape.
    pub fn plain_nfa(&self) -> Result<Nfa, InterAutError> {
        if self.automaton_type != AutomatonType::Nfa {
            return Err(InterAutError::NotNfa);
        }
        if self.state_naming != Naming::Enumerated || self.symbol_naming != Naming::Enumerated {
            return Err(InterAutError::UnsupportedNaming);
        }

        let mut nfa = Nfa::new();
        for node in &self.initial_states {
            nfa.add_initial_state(self.state_id(node)?);
        }
        for node in &self.final_states {
            nfa.add_final_state(self.state_id(node)?);
        }
        for (source, formula) in &self.transitions {
            let (symbol, target) = self.plain_transition(formula)?;
            nfa.delta.add(self.state_id(source)?, symbol, target);
        }
        Ok(nfa)
    }

    fn state_id(&self, node: &FormulaNode) -> Result<State, InterAutError> {
        if node.kind != NodeKind::Operand(OperandKind::State) {
            return Err(InterAutError::NotAState(node.raw.clone()));
        }
        self.state_names
            .iter()
            .position(|name| *name == node.name)
            .map(|idx| idx as State)
            .ok_or_else(|| InterAutError::UnknownState(node.name.clone()))
    }

    fn symbol_id(&self, node: &FormulaNode) -> Result<Symbol, InterAutError> {
        self.symbol_names
            .iter()
            .position(|name| *name == node.name)
            .map(|idx| idx as Symbol)
            .ok_or_else(|| InterAutError::UnknownSymbol(node.name.clone()))
    }

    fn plain_transition(&self, formula: &FormulaGraph) -> Result<(Symbol, State), InterAutError> {
        if formula.node.kind != NodeKind::Operator(Operator::And) || formula.children.len() != 2 {
            return Err(InterAutError::MalformedTransition);
        }
        let mut symbol = None;
        let mut target = None;
        for child in &formula.children {
            if !child.children.is_empty() {
                return Err(InterAutError::MalformedTransition);
            }
            match child.node.kind {
                NodeKind::Operand(OperandKind::Symbol) => {
                    symbol = Some(self.symbol_id(&child.node)?);
                }
                NodeKind::Operand(OperandKind::State) => {
                    target = Some(self.state_id(&child.node)?);
                }
                _ => return Err(InterAutError::MalformedTransition),
            }
        }
        match (symbol, target) {
            (Some(symbol), Some(target)) => Ok((symbol, target)),
            _ => Err(InterAutError::MalformedTransition),
        }
    }
}
