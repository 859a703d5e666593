//! Rendering of statements and expressions into a [`SqlWriter`].
//!
//! Everything is written strictly left to right, so parameters are bound in
//! the order their placeholders appear in the text.

use super::writer::SqlWriter;
use crate::builder::clause::SelectItem;
use crate::builder::insert::{row_columns, InsertSource};
use crate::builder::value::SqlValue;
use crate::builder::{BinaryOp, Delete, Expr, ExprKind, Insert, Order, Select, UnaryOp, Update};
use crate::error::{Error, Result};
use crate::from::{Cte, FromItem, Source, Table};

impl SqlWriter<'_> {
    pub(crate) fn write_select(&mut self, select: &Select) -> Result<()> {
        self.write_with(&select.with)?;

        let sources = select.from.root().map(FromItem::leaves).unwrap_or_default();
        self.enter_scope(sources);

        self.push_str("SELECT");
        if select.distinct {
            self.push_str(" DISTINCT");
        }
        if !select.items.is_empty() {
            self.push_str(" ");
            self.write_select_items(&select.items)?;
        }
        if let Some(root) = select.from.root() {
            self.push_str(" FROM ");
            self.write_from_item(root)?;
        }
        if let Some(filter) = select.filter.get() {
            self.push_str(" WHERE ");
            self.write_expr(filter)?;
        }
        if !select.group_by.is_empty() {
            self.push_str(" GROUP BY ");
            self.push_list(&select.group_by, ", ", Self::write_expr)?;
        }
        if let Some(having) = select.having.get() {
            self.push_str(" HAVING ");
            self.write_expr(having)?;
        }
        if !select.order_by.is_empty() {
            self.push_str(" ORDER BY ");
            self.push_list(&select.order_by, ", ", |w, item| {
                w.write_expr(&item.expr)?;
                if item.order == Order::Desc {
                    w.push_str(" DESC");
                }
                Ok(())
            })?;
        }
        if let Some(limit) = &select.limit {
            self.push_str(" LIMIT ");
            self.write_expr(limit)?;
        }
        if let Some(offset) = &select.offset {
            self.push_str(" OFFSET ");
            self.write_expr(offset)?;
        }

        self.exit_scope();
        Ok(())
    }

    pub(crate) fn write_insert(&mut self, insert: &Insert) -> Result<()> {
        self.write_with(&insert.with)?;
        self.enter_scope([&Source::Table(insert.target.clone())]);

        self.push_str("INSERT INTO ");
        self.write_table(&insert.target);
        match &insert.source {
            InsertSource::Rows(rows) if !row_columns(rows).is_empty() => {
                let columns = row_columns(rows);
                self.push_str(" (");
                self.push_list(&columns, ", ", |w, name| {
                    w.push_identifier(name);
                    Ok(())
                })?;
                self.push_str(") VALUES ");
                self.push_list(rows, ", ", |w, row| {
                    w.push_str("(");
                    w.push_list(&columns, ", ", |w, name| {
                        match row.iter().find(|(n, _)| n == name) {
                            Some((_, value)) => w.write_expr(value)?,
                            None => w.push_str("DEFAULT"),
                        }
                        Ok(())
                    })?;
                    w.push_str(")");
                    Ok(())
                })?;
            }
            InsertSource::DefaultValues | InsertSource::Rows(_) => {
                self.push_str(" DEFAULT VALUES");
            }
            InsertSource::Query { columns, query } => {
                self.push_str(" (");
                self.push_list(columns, ", ", |w, name| {
                    w.push_identifier(name);
                    Ok(())
                })?;
                self.push_str(") ");
                self.write_select(query)?;
            }
        }
        self.write_returning(&insert.returning)?;

        self.exit_scope();
        Ok(())
    }

    pub(crate) fn write_update(&mut self, update: &Update) -> Result<()> {
        if update.assignments.is_empty() {
            return Err(Error::EmptyUpdate);
        }
        let filter = update.filter.get().ok_or(Error::MissingWhere("UPDATE"))?;

        self.write_with(&update.with)?;
        let target = Source::Table(update.target.clone());
        let mut sources = vec![&target];
        if let Some(root) = update.from.root() {
            sources.extend(root.leaves());
        }
        self.enter_scope(sources);

        self.push_str("UPDATE ");
        self.write_table(&update.target);
        self.push_str(" SET ");
        self.push_list(&update.assignments, ", ", |w, (name, value)| {
            w.push_identifier(name);
            w.push_str(" = ");
            w.write_expr(value)
        })?;
        if let Some(root) = update.from.root() {
            self.push_str(" FROM ");
            self.write_from_item(root)?;
        }
        self.push_str(" WHERE ");
        self.write_expr(filter)?;
        self.write_returning(&update.returning)?;

        self.exit_scope();
        Ok(())
    }

    pub(crate) fn write_delete(&mut self, delete: &Delete) -> Result<()> {
        let filter = delete.filter.get().ok_or(Error::MissingWhere("DELETE"))?;
        if delete.using.root().is_some() && !self.dialect().supports_delete_using() {
            return Err(Error::Unsupported {
                feature: "DELETE ... USING",
                dialect: self.dialect().name(),
            });
        }

        self.write_with(&delete.with)?;
        let target = Source::Table(delete.target.clone());
        let mut sources = vec![&target];
        if let Some(root) = delete.using.root() {
            sources.extend(root.leaves());
        }
        self.enter_scope(sources);

        self.push_str("DELETE FROM ");
        self.write_table(&delete.target);
        if let Some(root) = delete.using.root() {
            self.push_str(" USING ");
            self.write_from_item(root)?;
        }
        self.push_str(" WHERE ");
        self.write_expr(filter)?;
        self.write_returning(&delete.returning)?;

        self.exit_scope();
        Ok(())
    }

    fn write_with(&mut self, ctes: &[Cte]) -> Result<()> {
        if ctes.is_empty() {
            return Ok(());
        }
        self.push_str("WITH ");
        self.push_list(ctes, ", ", |w, cte| {
            w.push_identifier(cte.name());
            w.push_str(" AS (");
            w.write_select(cte.query())?;
            w.push_str(")");
            Ok(())
        })?;
        self.push_str(" ");
        Ok(())
    }

    fn write_returning(&mut self, items: &[SelectItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        if !self.dialect().supports_returning() {
            return Err(Error::Unsupported {
                feature: "RETURNING",
                dialect: self.dialect().name(),
            });
        }
        self.push_str(" RETURNING ");
        self.write_select_items(items)
    }

    /// Writes a SELECT or RETURNING list, expanding `node.*` entries.
    fn write_select_items(&mut self, items: &[SelectItem]) -> Result<()> {
        let mut first = true;
        for item in items {
            let entries: Vec<(String, Expr)> = match item {
                SelectItem::Named(named) => {
                    vec![(String::from(named.name()), named.expr().clone())]
                }
                SelectItem::All(all) => all.columns(),
            };
            for (name, expr) in entries {
                if !first {
                    self.push_str(", ");
                }
                first = false;
                self.write_expr(&expr)?;
                if !matches!(expr.as_column(), Some(c) if c.name == name) {
                    self.push_str(" AS ");
                    self.push_identifier(&name);
                }
            }
        }
        Ok(())
    }

    fn write_table(&mut self, table: &Table) {
        if let Some(schema) = table.schema() {
            self.push_identifier(schema);
            self.push_str(".");
        }
        self.push_identifier(table.name());
        if let Some(alias) = table.alias() {
            self.push_str(" AS ");
            self.push_identifier(alias);
        }
    }

    fn write_from_item(&mut self, item: &FromItem) -> Result<()> {
        match item {
            FromItem::Source(source) => self.write_source(source),
            FromItem::Join(join) => {
                self.write_from_item(join.left())?;
                self.push_str(" ");
                self.push_str(join.kind().keyword());
                self.push_str(" ");
                if matches!(join.right(), FromItem::Join(_)) {
                    self.push_str("(");
                    self.write_from_item(join.right())?;
                    self.push_str(")");
                } else {
                    self.write_from_item(join.right())?;
                }
                if let Some(on) = join.on() {
                    self.push_str(" ON ");
                    self.write_expr(on)?;
                }
                Ok(())
            }
        }
    }

    fn write_source(&mut self, source: &Source) -> Result<()> {
        match source {
            Source::Table(table) => self.write_table(table),
            Source::Derived(derived) => {
                self.push_str("(");
                self.write_select(derived.query())?;
                self.push_str(") AS ");
                self.push_identifier(derived.alias());
                if derived.has_explicit_columns() {
                    self.push_str("(");
                    self.push_list(derived.columns(), ", ", |w, column| {
                        w.push_identifier(&column.name);
                        Ok(())
                    })?;
                    self.push_str(")");
                }
            }
            Source::Cte(cte) => self.push_identifier(cte.name()),
        }
        Ok(())
    }

    /// Writes an expression in a context that needs no parentheses.
    pub(crate) fn write_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr.kind() {
            ExprKind::Value { value, inline } => {
                let wire = expr.sql_type().serialize(value)?;
                if *inline {
                    self.write_literal(&wire)?;
                } else {
                    self.push_param(wire);
                }
            }
            ExprKind::Column(column) => self.push_column(column)?,
            ExprKind::Binary { left, op, right } => {
                self.write_binary_operand(left, *op, op.is_comparison())?;
                self.push_str(" ");
                self.push_str(op.as_str());
                self.push_str(" ");
                let same_associative = op.is_associative()
                    && matches!(right.kind(), ExprKind::Binary { op: inner, .. } if inner == op);
                self.write_binary_operand(right, *op, !same_associative)?;
            }
            ExprKind::Unary { op, operand } => {
                let level = op.precedence();
                let wrap_equal = *op != UnaryOp::Not;
                match op {
                    UnaryOp::Not => {
                        self.push_str("NOT ");
                        self.write_operand(operand, level, wrap_equal)?;
                    }
                    UnaryOp::Neg => {
                        self.push_str("-");
                        // An inline literal may start with `-`, and `--` opens a comment.
                        if matches!(operand.kind(), ExprKind::Value { inline: true, .. }) {
                            self.push_str("(");
                            self.write_expr(operand)?;
                            self.push_str(")");
                        } else {
                            self.write_operand(operand, level, wrap_equal)?;
                        }
                    }
                    UnaryOp::IsNull => {
                        self.write_operand(operand, level, wrap_equal)?;
                        self.push_str(" IS NULL");
                    }
                    UnaryOp::IsNotNull => {
                        self.write_operand(operand, level, wrap_equal)?;
                        self.push_str(" IS NOT NULL");
                    }
                }
            }
            ExprKind::Function(call) => {
                self.push_str(&call.name);
                self.push_str("(");
                if call.wildcard {
                    self.push_str("*");
                } else {
                    if call.distinct {
                        self.push_str("DISTINCT ");
                    }
                    self.push_list(&call.args, ", ", Self::write_expr)?;
                }
                self.push_str(")");
            }
            ExprKind::Cast(inner) => {
                self.push_str("CAST(");
                self.write_expr(inner)?;
                self.push_str(" AS ");
                let name = self.dialect().type_name(expr.sql_type());
                self.push_str(name);
                self.push_str(")");
            }
            ExprKind::InList {
                expr: tested,
                list,
                negated,
            } => {
                if list.is_empty() {
                    let literal = self.dialect().boolean_literal(*negated);
                    self.push_str(literal);
                } else {
                    self.write_operand(tested, expr.precedence(), true)?;
                    self.push_str(if *negated { " NOT IN (" } else { " IN (" });
                    self.push_list(list, ", ", Self::write_expr)?;
                    self.push_str(")");
                }
            }
            ExprKind::InQuery {
                expr: tested,
                query,
                negated,
            } => {
                self.write_operand(tested, expr.precedence(), true)?;
                self.push_str(if *negated { " NOT IN (" } else { " IN (" });
                self.write_select(query)?;
                self.push_str(")");
            }
            ExprKind::Exists { query, negated } => {
                self.push_str(if *negated { "NOT EXISTS (" } else { "EXISTS (" });
                self.write_select(query)?;
                self.push_str(")");
            }
            ExprKind::Subquery(query) => {
                self.push_str("(");
                self.write_select(query)?;
                self.push_str(")");
            }
            ExprKind::Between {
                expr: tested,
                low,
                high,
                negated,
            } => {
                let level = expr.precedence();
                self.write_operand(tested, level, true)?;
                self.push_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.write_operand(low, level, true)?;
                self.push_str(" AND ");
                self.write_operand(high, level, true)?;
            }
            ExprKind::SelectedRef(name) => self.push_identifier(name),
            ExprKind::Default => self.push_str("DEFAULT"),
        }
        Ok(())
    }

    /// Writes a child expression, parenthesized when it binds looser than
    /// its parent, or equally loose and `wrap_equal` is set.
    fn write_operand(&mut self, child: &Expr, parent: u8, wrap_equal: bool) -> Result<()> {
        let level = child.precedence();
        if level > parent || (level == parent && wrap_equal && level > 0) {
            self.push_str("(");
            self.write_expr(child)?;
            self.push_str(")");
            Ok(())
        } else {
            self.write_expr(child)
        }
    }

    /// Writes an operand of a binary operator. Arithmetic nested in `||`, or
    /// `||` nested in arithmetic, is always parenthesized.
    fn write_binary_operand(&mut self, child: &Expr, parent: BinaryOp, wrap_equal: bool) -> Result<()> {
        let mixed = matches!(child.kind(), ExprKind::Binary { op, .. } if parent.mixes_with(*op));
        if mixed {
            self.push_str("(");
            self.write_expr(child)?;
            self.push_str(")");
            Ok(())
        } else {
            self.write_operand(child, parent.precedence(), wrap_equal)
        }
    }

    fn write_literal(&mut self, value: &SqlValue) -> Result<()> {
        let dialect = self.dialect();
        let literal = match value {
            SqlValue::Null => String::from("NULL"),
            SqlValue::Bool(b) => String::from(dialect.boolean_literal(*b)),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(x) if !x.is_finite() => {
                return Err(Error::Type(format!(
                    "cannot inline the non-finite float {x}; bind it as a parameter"
                )));
            }
            SqlValue::Float(x) => x.to_string(),
            SqlValue::Text(s) => dialect.escape_string_literal(s),
            SqlValue::Blob(bytes) => dialect.blob_literal(bytes),
            SqlValue::Json(json) => dialect.escape_string_literal(&json.to_string()),
            SqlValue::Timestamp(ts) => dialect.escape_string_literal(&ts.to_rfc3339()),
        };
        self.push_str(&literal);
        Ok(())
    }
}
