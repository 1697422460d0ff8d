//! # Structural Rules
//!
//! After every apply the document may need corrective edits to keep its
//! structural invariants. Rules inspect the document and queue operations
//! on a corrective transaction; the editor applies it as a nested apply.
//!
//! Rules are:
//! - **Deterministic**: the same document always yields the same corrections
//! - **Minimal**: nothing is queued when the invariant already holds
//! - **Bounded**: nested corrections stop at the engine's depth limit, even
//!   if a rule keeps re-triggering itself

use crate::{Selection, Transaction};
use folio_document::{Document, Node, Path};

/// A structural invariant with a corrective action
pub trait Rule: std::fmt::Debug + Send {
    fn name(&self) -> &'static str;

    /// Queue operations on `transaction` if `document` breaks the invariant
    fn check(&self, document: &Document, transaction: &mut Transaction);
}

/// The document must end with an editable text node so there is always
/// somewhere to put the caret after the last block
#[derive(Debug)]
pub struct EnsureTrailingText;

impl Rule for EnsureTrailingText {
    fn name(&self) -> &'static str {
        "ensure_trailing_text"
    }

    fn check(&self, document: &Document, transaction: &mut Transaction) {
        let children = document.children();
        let satisfied = children.last().is_some_and(Node::is_editable_text);
        if !satisfied {
            transaction.insert_node(Path::from([children.len()]), Node::empty_text());
        }
    }
}

/// Runs registered rules and enforces the nesting limit
#[derive(Debug)]
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
    enabled: bool,
    max_depth: usize,
}

impl RuleEngine {
    /// Engine with the default rules
    pub fn new(max_depth: usize) -> Self {
        let mut engine = Self::empty(max_depth);
        engine.register(EnsureTrailingText);
        engine
    }

    /// Engine with no rules registered
    pub fn empty(max_depth: usize) -> Self {
        Self {
            rules: Vec::new(),
            enabled: true,
            max_depth,
        }
    }

    pub fn register(&mut self, rule: impl Rule + 'static) -> &mut Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Collect the corrections every rule wants for `document`.
    /// The transaction keeps `selection` on both ends.
    pub fn corrections(&self, document: &Document, selection: Option<Selection>) -> Transaction {
        let mut transaction = Transaction::new(selection.clone());
        transaction.after_selection = selection;

        for rule in &self.rules {
            let before = transaction.len();
            rule.check(document, &mut transaction);
            if transaction.len() > before {
                tracing::debug!(
                    rule = rule.name(),
                    ops = transaction.len() - before,
                    "rule queued corrections"
                );
            }
        }

        transaction
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(5)
    }
}
