//! Splicing assignment/check pairs into composite statements.

use crate::classify::{classify, TriState};
use crate::oracle::{BindingConflict, BindingOracle};
use errside_ast::node::{AssignIfErrStmt, AssignStmt, ExprStmt, IfStmt, NodeData, SourceFile, Stmt};
use errside_ast::types::{NodeIdAllocator, SymbolId};
use errside_ast::visitor::walk_stmt_lists_mut;
use errside_ast::SyntaxKind;
use errside_core::{FxMap, TextRange};
use tracing::{debug, enabled, trace, Level};

/// The lines covered by one composite statement, 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrRange {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl ErrRange {
    pub fn includes(&self, line: u32) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// Merge every adjacent assignment/check pair of one statement list.
///
/// Returns the number of composites created; the list shrinks by as much.
/// Statements already nested inside the list are not visited.
pub fn merge_block(
    stmts: &mut Vec<Stmt>,
    oracle: &dyn BindingOracle,
    ids: &mut NodeIdAllocator,
) -> Result<usize, BindingConflict> {
    merge_list(stmts, oracle, ids).map(|merged| merged.len())
}

/// Merge every statement list of a file, innermost lists first.
pub fn merge_file(
    file: &mut SourceFile,
    oracle: &dyn BindingOracle,
    ids: &mut NodeIdAllocator,
) -> Result<Vec<ErrRange>, BindingConflict> {
    let mut merged = Vec::new();
    let result = walk_stmt_lists_mut::<BindingConflict, _>(file, &mut |stmts: &mut Vec<Stmt>| {
        merged.extend(merge_list(stmts, oracle, ids)?);
        Ok(())
    });
    if let Err(conflict) = result {
        return Err(conflict.locate(file));
    }

    merged.sort_by_key(|range| range.pos);
    let ranges: Vec<ErrRange> = merged
        .into_iter()
        .map(|range| ErrRange {
            file: file.file_name.clone(),
            start_line: file.line_map.line_of(range.pos) + 1,
            end_line: file.line_map.line_of(range.end) + 1,
        })
        .collect();
    debug!(file = %file.file_name, merged = ranges.len(), "merged error checks");
    Ok(ranges)
}

/// The index of the last assignment to each binding in a statement list.
///
/// Fails on the first identifier target whose def and use disagree.
pub fn last_assignments(
    stmts: &[Stmt],
    oracle: &dyn BindingOracle,
) -> Result<FxMap<SymbolId, usize>, BindingConflict> {
    let mut last = FxMap::default();
    for (index, stmt) in stmts.iter().enumerate() {
        let Stmt::Assign(assign) = stmt else {
            continue;
        };
        for ident in assign.lhs.iter().filter_map(|lhs| lhs.as_ident()) {
            if let Some(sym) = oracle.binding_of(ident)? {
                last.insert(sym, index);
            }
        }
    }
    Ok(last)
}

fn merge_list(
    stmts: &mut Vec<Stmt>,
    oracle: &dyn BindingOracle,
    ids: &mut NodeIdAllocator,
) -> Result<Vec<TextRange>, BindingConflict> {
    let mut merged = Vec::new();
    // Every assignment target is resolved, merged or not, so a def/use
    // conflict anywhere in the list is fatal.
    let mut last_set = Some(last_assignments(stmts, oracle)?);
    let mut i = 1;
    while i < stmts.len() {
        let Stmt::If(check) = &stmts[i] else {
            i += 1;
            continue;
        };
        let verdict = classify(&check.cond, oracle);
        let (TriState::True, Some(err_var)) = (verdict.result, verdict.binding) else {
            i += 1;
            continue;
        };

        if !assigns_last(&stmts[i - 1], err_var, oracle)? {
            if enabled!(Level::DEBUG) {
                if last_set.is_none() {
                    last_set = Some(last_assignments(stmts, oracle)?);
                }
                let assigned_at = last_set.as_ref().and_then(|last| last.get(&err_var)).copied();
                debug!(%err_var, check = i, ?assigned_at, "error check not adjacent to its assignment");
            }
            i += 1;
            continue;
        }

        let Some((assign, check)) = take_pair(stmts, i) else {
            i += 1;
            continue;
        };
        let composite = fuse(*assign, *check, err_var, ids);
        trace!(%err_var, pos = composite.data.range.pos, "fused assignment and error check");
        merged.push(composite.data.range);
        stmts.insert(i - 1, Stmt::AssignIfErr(Box::new(composite)));
        // The statement after the check now sits at `i`, behind a composite.
        last_set = None;
    }
    Ok(merged)
}

/// Whether `stmt` is a mergeable assignment whose last target is `err_var`.
fn assigns_last(
    stmt: &Stmt,
    err_var: SymbolId,
    oracle: &dyn BindingOracle,
) -> Result<bool, BindingConflict> {
    let Stmt::Assign(assign) = stmt else {
        return Ok(false);
    };
    if !is_mergeable(assign) {
        return Ok(false);
    }
    let Some(target) = assign.lhs.last().and_then(|lhs| lhs.as_ident()) else {
        return Ok(false);
    };
    if target.is_blank() {
        return Ok(false);
    }
    Ok(oracle.binding_of(target)? == Some(err_var))
}

/// One value expression under `:=` or `=`.
fn is_mergeable(assign: &AssignStmt) -> bool {
    matches!(assign.tok, SyntaxKind::ColonEqualsToken | SyntaxKind::EqualsToken) && assign.rhs.len() == 1
}

/// Remove the assignment at `i - 1` and the check at `i`.
fn take_pair(stmts: &mut Vec<Stmt>, i: usize) -> Option<(Box<AssignStmt>, Box<IfStmt>)> {
    if !matches!((&stmts[i - 1], &stmts[i]), (Stmt::Assign(_), Stmt::If(_))) {
        return None;
    }
    let mut pair = stmts.drain(i - 1..=i);
    match (pair.next(), pair.next()) {
        (Some(Stmt::Assign(assign)), Some(Stmt::If(check))) => Some((assign, check)),
        _ => None,
    }
}

fn fuse(
    mut assign: AssignStmt,
    check: IfStmt,
    err_var: SymbolId,
    ids: &mut NodeIdAllocator,
) -> AssignIfErrStmt {
    let short_form = assign.is_define();
    let start = assign.data.range.pos;
    let leading = if assign.lhs.len() >= 2 {
        assign.lhs.pop();
        Stmt::Assign(Box::new(assign))
    } else {
        let mut rhs = assign.rhs;
        let value = rhs.remove(0);
        let end = value.range().end;
        Stmt::Expr(Box::new(ExprStmt {
            data: NodeData::new(ids.next_id(), start, end),
            x: value,
        }))
    };
    AssignIfErrStmt {
        data: NodeData::new(ids.next_id(), start, check.data.range.end),
        leading,
        cond: check,
        err_var,
        short_form,
    }
}
