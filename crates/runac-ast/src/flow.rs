//! Control-flow graph: basic blocks, steps, and binding-origin metadata.
//!
//! The CFG builder (a front-end collaborator) produces one [`FlowGraph`]
//! per function. Blocks are kept in ascending-id order; block 0 is the
//! entry. Each block records, per variable, where its first assignment is
//! (`assigns`) and which blocks may supply a binding at each use point
//! (`origin`). Predecessor edges (`redges`) drive scope chaining in the
//! checker and phi-arm ordering in the code generator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::expr::Expr;
use runac_common::{Span, TypeId};

pub type BlockId = u32;

/// Where a binding may come from: the function entry scope (arguments and
/// module-level names) or a specific basic block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OriginSource {
    Entry,
    Block(BlockId),
}

/// One `origin` record: at step `step`, name `name` may be supplied by any
/// of `sources`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OriginEntry {
    pub name: String,
    pub step: usize,
    pub sources: SmallVec<[OriginSource; 2]>,
}

/// A statement-level node in a basic block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Step {
    /// A bare expression evaluated for effect (typically a call).
    Expr(Expr),
    Assign {
        left: Expr,
        right: Expr,
    },
    Return {
        span: Span,
        value: Option<Expr>,
    },
    Yield {
        span: Span,
        value: Expr,
    },
    Branch {
        target: BlockId,
    },
    CondBranch {
        cond: Expr,
        then_target: BlockId,
        else_target: BlockId,
    },
    /// Desugared `for` loop setup: evaluate the iterator source into a
    /// synthetic binding. The checker rewrites `source` to an `__iter__`
    /// call when it does not already yield an iterator, and annotates `ty`
    /// with the generator context type.
    LoopSetup {
        name: String,
        source: Expr,
        span: Span,
        #[serde(default)]
        ty: Option<TypeId>,
    },
    /// Desugared `for` loop header: advance the iterator bound at `ctx`,
    /// binding the loop variable and branching to the body or the exit.
    LoopHeader {
        ctx: String,
        lvar: String,
        span: Span,
        body: BlockId,
        exit: BlockId,
        #[serde(default)]
        ty: Option<TypeId>,
    },
}

/// A basic block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Pretty-printer annotation (`while-head`, `ternary-join`, ...).
    #[serde(default)]
    pub anno: Option<String>,
    pub steps: Vec<Step>,
    /// First assignment step index per variable assigned in this block.
    #[serde(default)]
    pub assigns: Vec<(String, usize)>,
    #[serde(default)]
    pub origin: Vec<OriginEntry>,
}

impl Block {
    /// The step index of the first assignment to `name` in this block.
    pub fn first_assign(&self, name: &str) -> Option<usize> {
        self.assigns
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, i)| i)
    }

    /// The blocks that may supply a binding for `name` at `step`.
    pub fn origin_of(&self, name: &str, step: usize) -> Option<&[OriginSource]> {
        self.origin
            .iter()
            .find(|e| e.name == name && e.step == step)
            .map(|e| e.sources.as_slice())
    }
}

/// A function body as a graph of basic blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowGraph {
    /// Blocks by ascending id; id 0 is the entry.
    pub blocks: BTreeMap<BlockId, Block>,
    /// Predecessor edges, in the order phi arms must be listed.
    #[serde(default)]
    pub redges: BTreeMap<BlockId, SmallVec<[BlockId; 2]>>,
    /// Whether the body contains any `Yield` step.
    #[serde(default)]
    pub yields: bool,
}

impl FlowGraph {
    pub fn entry(&self) -> Option<&Block> {
        self.blocks.get(&0)
    }

    pub fn preds(&self, id: BlockId) -> &[BlockId] {
        self.redges.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
