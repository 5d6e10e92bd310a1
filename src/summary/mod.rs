//! Monthly flow summary.
//!
//! Turns the transactions of one reporting period into income, expense and
//! savings totals plus a two-level flow graph: a single `income` source
//! feeding one node per expense category and, when money is left over, a
//! `savings` node. The graph is plain data; drawing it is the caller's job.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{CategoryId, Transaction, TransactionType};

pub(crate) const INCOME_NODE: &str = "income";
pub(crate) const SAVINGS_NODE: &str = "savings";
pub(crate) const UNCATEGORIZED_NODE: &str = "uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Income,
    Expense,
    Savings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    pub id: String,
    pub display_name: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
    pub weight: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Sum of the weights of every edge leaving `id`.
    pub fn outgoing_weight(&self, id: &str) -> Decimal {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .map(|e| e.weight)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// `total_income - total_expenses`; negative when the period overspent.
    pub total_savings: Decimal,
    pub flow_graph: FlowGraph,
}

impl Summary {
    /// How far expenses exceeded income, zero otherwise.
    pub fn overspend(&self) -> Decimal {
        (-self.total_savings).max(Decimal::ZERO)
    }
}

/// Display names for the nodes that do not come from the category table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLabels {
    pub income: String,
    pub savings: String,
    pub uncategorized: String,
}

impl Default for FlowLabels {
    fn default() -> Self {
        Self {
            income: "Income".into(),
            savings: "Savings".into(),
            uncategorized: "Uncategorized".into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("invalid amount {amount} on transaction {transaction}: amounts must be non-negative")]
    InvalidAmount { transaction: String, amount: Decimal },
    #[error("{total} overflowed at transaction {transaction}")]
    AmountOverflow {
        total: &'static str,
        transaction: String,
    },
}

/// Summarize with the default English labels.
pub fn summarize(
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
) -> Result<Summary, SummarizeError> {
    summarize_with_labels(transactions, category_names, &FlowLabels::default())
}

pub fn summarize_with_labels(
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
    labels: &FlowLabels,
) -> Result<Summary, SummarizeError> {
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    let mut has_flow = false;

    // Expense groups in first-seen order; `index` maps a key to its slot.
    let mut groups: Vec<(Option<&CategoryId>, Decimal)> = Vec::new();
    let mut index: HashMap<Option<&CategoryId>, usize> = HashMap::new();

    for txn in transactions {
        match txn.transaction_type {
            TransactionType::Income => {
                check_amount(txn)?;
                total_income = add(total_income, txn, "total income")?;
                has_flow = true;
            }
            TransactionType::Expense => {
                check_amount(txn)?;
                total_expenses = add(total_expenses, txn, "total expenses")?;
                has_flow = true;
                let key = txn.category_id.as_ref();
                match index.get(&key) {
                    Some(&slot) => groups[slot].1 = add(groups[slot].1, txn, "category total")?,
                    None => {
                        index.insert(key, groups.len());
                        groups.push((key, txn.amount));
                    }
                }
            }
            TransactionType::Other(_) => {}
        }
    }

    // Both totals are non-negative, so the difference cannot overflow.
    let total_savings = total_income - total_expenses;

    // Stable: equal sums keep their first-seen order.
    groups.sort_by(|a, b| b.1.cmp(&a.1));

    let mut graph = FlowGraph::default();
    if has_flow {
        let mut taken: HashSet<String> =
            [INCOME_NODE, SAVINGS_NODE].iter().map(|s| s.to_string()).collect();

        graph.nodes.push(FlowNode {
            id: INCOME_NODE.into(),
            display_name: labels.income.clone(),
            kind: NodeKind::Income,
        });

        for (category, amount) in groups.into_iter().filter(|(_, amt)| *amt > Decimal::ZERO) {
            let id = unique_id(category_node_id(category), &mut taken);
            let display_name = category
                .and_then(|c| category_names.get(c))
                .cloned()
                .unwrap_or_else(|| labels.uncategorized.clone());
            graph.nodes.push(FlowNode {
                id: id.clone(),
                display_name,
                kind: NodeKind::Expense,
            });
            graph.edges.push(FlowEdge {
                source: INCOME_NODE.into(),
                target: id,
                weight: amount,
            });
        }

        if total_savings > Decimal::ZERO {
            graph.nodes.push(FlowNode {
                id: SAVINGS_NODE.into(),
                display_name: labels.savings.clone(),
                kind: NodeKind::Savings,
            });
            graph.edges.push(FlowEdge {
                source: INCOME_NODE.into(),
                target: SAVINGS_NODE.into(),
                weight: total_savings,
            });
        }
    }

    tracing::debug!(
        transactions = transactions.len(),
        %total_income,
        %total_expenses,
        nodes = graph.nodes.len(),
        "summarized period"
    );

    Ok(Summary {
        total_income,
        total_expenses,
        total_savings,
        flow_graph: graph,
    })
}

fn check_amount(txn: &Transaction) -> Result<(), SummarizeError> {
    if txn.amount < Decimal::ZERO {
        return Err(SummarizeError::InvalidAmount {
            transaction: describe(txn),
            amount: txn.amount,
        });
    }
    Ok(())
}

fn add(sum: Decimal, txn: &Transaction, total: &'static str) -> Result<Decimal, SummarizeError> {
    sum.checked_add(txn.amount)
        .ok_or_else(|| SummarizeError::AmountOverflow {
            total,
            transaction: describe(txn),
        })
}

fn describe(txn: &Transaction) -> String {
    match txn.id {
        Some(id) => format!("#{id}"),
        None => format!("'{}'", txn.description),
    }
}

fn category_node_id(category: Option<&CategoryId>) -> String {
    category
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|| UNCATEGORIZED_NODE.to_string())
}

/// Category ids are opaque, so one may collide with `income`, `savings`
/// or the uncategorized key. Suffix until free.
fn unique_id(candidate: String, taken: &mut HashSet<String>) -> String {
    let mut id = candidate.clone();
    let mut n = 2;
    while taken.contains(&id) {
        id = format!("{candidate}#{n}");
        n += 1;
    }
    taken.insert(id.clone());
    id
}
