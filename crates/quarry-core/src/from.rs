//! The from-graph: tables, aliases, derived tables and joins.
//!
//! Every leaf node gets a [`SourceId`] when it is created. Column expressions
//! point back at their node through that id; the compiler maps ids to the
//! names visible in the statement being compiled.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::builder::expr::Expr;
use crate::builder::select::Select;
use crate::error::{Error, Result};
use crate::types::SqlType;

/// Identity of a leaf node of the from-graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A column name with its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Column type.
    pub sql_type: SqlType,
}

impl ColumnSpec {
    /// Creates a column spec.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

#[derive(Debug)]
struct TableDef {
    schema: Option<String>,
    name: String,
    columns: Vec<ColumnSpec>,
    required: Vec<bool>,
}

/// A table declaration. Cheap to clone; clones are the same node.
#[derive(Debug, Clone)]
pub struct Table {
    id: SourceId,
    def: Arc<TableDef>,
    alias: Option<Arc<str>>,
}

impl Table {
    /// Declares a table. The column map is the union of both groups, in
    /// order; a name listed twice keeps its first declaration.
    pub fn new<R, O>(name: impl Into<String>, required: R, optional: O) -> Self
    where
        R: IntoIterator<Item = ColumnSpec>,
        O: IntoIterator<Item = ColumnSpec>,
    {
        let mut builder = Self::builder(name);
        for spec in required {
            builder = builder.column(spec, true);
        }
        for spec in optional {
            builder = builder.column(spec, false);
        }
        builder.build()
    }

    /// Starts a table declaration.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            schema: None,
            name: name.into(),
            columns: vec![],
            required: vec![],
        }
    }

    /// Returns the node id.
    #[must_use]
    pub const fn id(&self) -> SourceId {
        self.id
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Returns the schema, if any.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.def.schema.as_deref()
    }

    /// Returns the alias, if this node was created by [`Table::aliased`].
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns the name columns are qualified with: the alias, else the table name.
    #[must_use]
    pub fn qualifier(&self) -> &str {
        self.alias().unwrap_or_else(|| self.name())
    }

    /// Returns the declared columns in order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.def.columns
    }

    /// Returns the spec of a column.
    #[must_use]
    pub fn column_spec(&self, name: &str) -> Option<&ColumnSpec> {
        self.def.columns.iter().find(|c| c.name == name)
    }

    /// Returns true if the column was declared in the required group.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.def
            .columns
            .iter()
            .zip(&self.def.required)
            .any(|(c, required)| *required && c.name == name)
    }

    /// Returns the names of the required columns.
    pub fn required_columns(&self) -> impl Iterator<Item = &str> {
        self.def
            .columns
            .iter()
            .zip(&self.def.required)
            .filter(|(_, required)| **required)
            .map(|(c, _)| c.name.as_str())
    }

    /// Returns a column expression bound to this node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if the table has no such column.
    pub fn col(&self, name: &str) -> Result<Expr> {
        let spec = self.column_spec(name).ok_or_else(|| Error::UnknownColumn {
            column: String::from(name),
            relation: String::from(self.qualifier()),
        })?;
        Ok(Expr::column(self.id, name, spec.sql_type.clone()))
    }

    /// Returns `table.*`.
    #[must_use]
    pub fn all(&self) -> AllColumns {
        AllColumns::new(self.clone())
    }

    /// Returns a new node with the same columns, rendered as `name AS alias`.
    /// Expressions built from it compile against the alias.
    #[must_use]
    pub fn aliased(&self, alias: impl Into<String>) -> Self {
        let alias: String = alias.into();
        Self {
            id: SourceId::next(),
            def: Arc::clone(&self.def),
            alias: Some(Arc::from(alias)),
        }
    }

    /// Marks the node as the nullable side of an outer join.
    ///
    /// This only documents intent; it changes nothing.
    #[must_use]
    pub fn as_nullable(&self) -> Self {
        self.clone()
    }
}

/// Builder for [`Table`].
#[derive(Debug)]
pub struct TableBuilder {
    schema: Option<String>,
    name: String,
    columns: Vec<ColumnSpec>,
    required: Vec<bool>,
}

impl TableBuilder {
    /// Sets the schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Adds a column that INSERT rows must provide.
    #[must_use]
    pub fn required(self, name: impl Into<String>, sql_type: SqlType) -> Self {
        self.column(ColumnSpec::new(name, sql_type), true)
    }

    /// Adds a column that INSERT rows may omit.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, sql_type: SqlType) -> Self {
        self.column(ColumnSpec::new(name, sql_type), false)
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, spec: ColumnSpec, required: bool) -> Self {
        if !self.columns.iter().any(|c| c.name == spec.name) {
            self.columns.push(spec);
            self.required.push(required);
        }
        self
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(self) -> Table {
        Table {
            id: SourceId::next(),
            def: Arc::new(TableDef {
                schema: self.schema,
                name: self.name,
                columns: self.columns,
                required: self.required,
            }),
            alias: None,
        }
    }
}

#[derive(Debug)]
struct DerivedDef {
    alias: String,
    query: Select,
    columns: Vec<ColumnSpec>,
    explicit_columns: bool,
}

/// A sub-statement in the FROM clause: `(SELECT ...) AS alias`.
#[derive(Debug, Clone)]
pub struct DerivedTable {
    id: SourceId,
    def: Arc<DerivedDef>,
}

impl DerivedTable {
    /// Wraps a query under an alias. Columns are the query's output names.
    #[must_use]
    pub fn new(query: Select, alias: impl Into<String>) -> Self {
        let columns = query.output_columns();
        Self {
            id: SourceId::next(),
            def: Arc::new(DerivedDef {
                alias: alias.into(),
                query,
                columns,
                explicit_columns: false,
            }),
        }
    }

    /// Wraps a query under an alias with an explicit column list, rendered
    /// as `AS alias(a, b, ...)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnListMismatch`] if the list length differs from
    /// the number of columns the query produces.
    pub fn with_columns(
        query: Select,
        alias: impl Into<String>,
        columns: Vec<ColumnSpec>,
    ) -> Result<Self> {
        let produced = query.output_columns().len();
        if produced != columns.len() {
            return Err(Error::ColumnListMismatch {
                expected: produced,
                found: columns.len(),
            });
        }
        Ok(Self {
            id: SourceId::next(),
            def: Arc::new(DerivedDef {
                alias: alias.into(),
                query,
                columns,
                explicit_columns: true,
            }),
        })
    }

    /// Returns the node id.
    #[must_use]
    pub const fn id(&self) -> SourceId {
        self.id
    }

    /// Returns the alias.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.def.alias
    }

    /// Returns the wrapped query.
    #[must_use]
    pub fn query(&self) -> &Select {
        &self.def.query
    }

    /// Returns the columns in order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.def.columns
    }

    /// Returns true if the column list must be rendered after the alias.
    #[must_use]
    pub fn has_explicit_columns(&self) -> bool {
        self.def.explicit_columns
    }

    /// Returns a column expression bound to this node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if the query produces no such column.
    pub fn col(&self, name: &str) -> Result<Expr> {
        Source::Derived(self.clone()).col(name)
    }

    /// Returns `alias.*`.
    #[must_use]
    pub fn all(&self) -> AllColumns {
        AllColumns::new(self.clone())
    }
}

#[derive(Debug)]
struct CteDef {
    name: String,
    query: Select,
    columns: Vec<ColumnSpec>,
}

/// A named `WITH` item. Attach it to a statement with `with(...)` and use it
/// as a FROM item like a table.
#[derive(Debug, Clone)]
pub struct Cte {
    id: SourceId,
    def: Arc<CteDef>,
}

impl Cte {
    /// Names a query.
    #[must_use]
    pub fn new(name: impl Into<String>, query: Select) -> Self {
        let columns = query.output_columns();
        Self {
            id: SourceId::next(),
            def: Arc::new(CteDef {
                name: name.into(),
                query,
                columns,
            }),
        }
    }

    /// Returns the node id.
    #[must_use]
    pub const fn id(&self) -> SourceId {
        self.id
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Returns the named query.
    #[must_use]
    pub fn query(&self) -> &Select {
        &self.def.query
    }

    /// Returns the columns in order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.def.columns
    }

    /// Returns a column expression bound to this node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if the query produces no such column.
    pub fn col(&self, name: &str) -> Result<Expr> {
        Source::Cte(self.clone()).col(name)
    }

    /// Returns `name.*`.
    #[must_use]
    pub fn all(&self) -> AllColumns {
        AllColumns::new(self.clone())
    }
}

/// A leaf of the from-graph.
#[derive(Debug, Clone)]
pub enum Source {
    /// A table or aliased table.
    Table(Table),
    /// A sub-statement under an alias.
    Derived(DerivedTable),
    /// A reference to a WITH item.
    Cte(Cte),
}

impl Source {
    /// Returns the node id.
    #[must_use]
    pub const fn id(&self) -> SourceId {
        match self {
            Self::Table(t) => t.id(),
            Self::Derived(d) => d.id(),
            Self::Cte(c) => c.id(),
        }
    }

    /// Returns the name columns are qualified with.
    #[must_use]
    pub fn qualifier(&self) -> &str {
        match self {
            Self::Table(t) => t.qualifier(),
            Self::Derived(d) => d.alias(),
            Self::Cte(c) => c.name(),
        }
    }

    /// Returns the columns in order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        match self {
            Self::Table(t) => t.columns(),
            Self::Derived(d) => d.columns(),
            Self::Cte(c) => c.columns(),
        }
    }

    /// Returns a column expression bound to this node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if there is no such column.
    pub fn col(&self, name: &str) -> Result<Expr> {
        let spec = self
            .columns()
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnknownColumn {
                column: String::from(name),
                relation: String::from(self.qualifier()),
            })?;
        Ok(Expr::column(self.id(), name, spec.sql_type.clone()))
    }

    /// Returns the ordered column map.
    #[must_use]
    pub fn column_exprs(&self) -> Vec<(String, Expr)> {
        self.columns()
            .iter()
            .map(|c| {
                (
                    c.name.clone(),
                    Expr::column(self.id(), c.name.clone(), c.sql_type.clone()),
                )
            })
            .collect()
    }
}

/// Join kinds.
///
/// Row semantics:
/// - `Inner`: for each left row, one row per matching right row.
/// - `Left`: the inner rows, plus every left row without a match, with the
///   right columns null.
/// - `Full`: the left join rows, plus every right row without a match, with
///   the left columns null.
/// - `Cross`: the full Cartesian product; no condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `JOIN ... ON`.
    Inner,
    /// `LEFT JOIN ... ON`.
    Left,
    /// `FULL JOIN ... ON`.
    Full,
    /// `CROSS JOIN`.
    Cross,
}

impl JoinKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }

    /// Returns true if the kind takes an ON condition.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        !matches!(self, Self::Cross)
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner => f.write_str("INNER JOIN"),
            other => f.write_str(other.keyword()),
        }
    }
}

/// A binary join of two from-graph nodes.
#[derive(Debug)]
pub struct Join {
    left: FromItem,
    right: FromItem,
    kind: JoinKind,
    on: Option<Expr>,
}

impl Join {
    /// Joins two nodes.
    ///
    /// # Errors
    ///
    /// A condition is required for inner, left and full joins and forbidden
    /// for cross joins; it must be boolean.
    pub fn new(left: FromItem, right: FromItem, kind: JoinKind, on: Option<Expr>) -> Result<Self> {
        match (&on, kind.is_conditional()) {
            (None, true) => return Err(Error::MissingJoinCondition(kind)),
            (Some(_), false) => return Err(Error::UnexpectedJoinCondition),
            (Some(cond), true) if !cond.sql_type().is_boolean() => {
                return Err(Error::NotBoolean {
                    context: "join condition",
                    found: cond.sql_type().to_string(),
                });
            }
            _ => {}
        }
        Ok(Self {
            left,
            right,
            kind,
            on,
        })
    }

    /// Returns the left node.
    #[must_use]
    pub const fn left(&self) -> &FromItem {
        &self.left
    }

    /// Returns the right node.
    #[must_use]
    pub const fn right(&self) -> &FromItem {
        &self.right
    }

    /// Returns the join kind.
    #[must_use]
    pub const fn kind(&self) -> JoinKind {
        self.kind
    }

    /// Returns the condition.
    #[must_use]
    pub const fn on(&self) -> Option<&Expr> {
        self.on.as_ref()
    }
}

/// A node of the from-graph.
#[derive(Debug, Clone)]
pub enum FromItem {
    /// A leaf.
    Source(Source),
    /// A join; the left subtree is rendered first.
    Join(Arc<Join>),
}

impl FromItem {
    /// Returns the leaves, left to right.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Source> {
        let mut out = vec![];
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Source>) {
        match self {
            Self::Source(s) => out.push(s),
            Self::Join(j) => {
                j.left.collect_leaves(out);
                j.right.collect_leaves(out);
            }
        }
    }

    /// Returns the most recently introduced leaf.
    #[must_use]
    pub fn rightmost(&self) -> &Source {
        match self {
            Self::Source(s) => s,
            Self::Join(j) => j.right.rightmost(),
        }
    }

    /// Returns the ordered column map over every leaf.
    #[must_use]
    pub fn column_exprs(&self) -> Vec<(String, Expr)> {
        self.leaves()
            .into_iter()
            .flat_map(Source::column_exprs)
            .collect()
    }

    /// Joins another node onto this one.
    ///
    /// # Errors
    ///
    /// See [`Join::new`].
    pub fn join(
        self,
        right: impl Into<Self>,
        kind: JoinKind,
        on: Option<Expr>,
    ) -> Result<Self> {
        Ok(Self::Join(Arc::new(Join::new(self, right.into(), kind, on)?)))
    }

    /// `self JOIN right ON on`.
    ///
    /// # Errors
    ///
    /// See [`Join::new`].
    pub fn inner_join(self, right: impl Into<Self>, on: Expr) -> Result<Self> {
        self.join(right, JoinKind::Inner, Some(on))
    }

    /// `self LEFT JOIN right ON on`.
    ///
    /// # Errors
    ///
    /// See [`Join::new`].
    pub fn left_join(self, right: impl Into<Self>, on: Expr) -> Result<Self> {
        self.join(right, JoinKind::Left, Some(on))
    }

    /// `self FULL JOIN right ON on`.
    ///
    /// # Errors
    ///
    /// See [`Join::new`].
    pub fn full_join(self, right: impl Into<Self>, on: Expr) -> Result<Self> {
        self.join(right, JoinKind::Full, Some(on))
    }

    /// `self CROSS JOIN right`.
    ///
    /// # Errors
    ///
    /// See [`Join::new`].
    pub fn cross_join(self, right: impl Into<Self>) -> Result<Self> {
        self.join(right, JoinKind::Cross, None)
    }

    /// Returns `*` over every column of the node.
    #[must_use]
    pub fn all(&self) -> AllColumns {
        AllColumns::new(self.clone())
    }
}

impl From<Table> for FromItem {
    fn from(table: Table) -> Self {
        Self::Source(Source::Table(table))
    }
}

impl From<&Table> for FromItem {
    fn from(table: &Table) -> Self {
        Self::Source(Source::Table(table.clone()))
    }
}

impl From<DerivedTable> for FromItem {
    fn from(derived: DerivedTable) -> Self {
        Self::Source(Source::Derived(derived))
    }
}

impl From<&DerivedTable> for FromItem {
    fn from(derived: &DerivedTable) -> Self {
        Self::Source(Source::Derived(derived.clone()))
    }
}

impl From<Cte> for FromItem {
    fn from(cte: Cte) -> Self {
        Self::Source(Source::Cte(cte))
    }
}

impl From<&Cte> for FromItem {
    fn from(cte: &Cte) -> Self {
        Self::Source(Source::Cte(cte.clone()))
    }
}

impl From<Source> for FromItem {
    fn from(source: Source) -> Self {
        Self::Source(source)
    }
}

impl From<Join> for FromItem {
    fn from(join: Join) -> Self {
        Self::Join(Arc::new(join))
    }
}

/// `node.*`: every column of a from-graph node, expanded when compiled.
#[derive(Debug, Clone)]
pub struct AllColumns {
    item: FromItem,
}

impl AllColumns {
    /// Selects every column of `item`.
    #[must_use]
    pub fn new(item: impl Into<FromItem>) -> Self {
        Self { item: item.into() }
    }

    /// Returns the node.
    #[must_use]
    pub const fn item(&self) -> &FromItem {
        &self.item
    }

    /// Returns the node's current column map.
    #[must_use]
    pub fn columns(&self) -> Vec<(String, Expr)> {
        self.item.column_exprs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::expr::ExprKind;

    fn contacts() -> Table {
        Table::builder("contacts")
            .required("firstname", SqlType::Text)
            .required("lastname", SqlType::Text)
            .optional("nickname", SqlType::Text.nullable())
            .build()
    }

    #[test]
    fn test_column_map_is_union_of_groups() {
        let t = Table::new(
            "contacts",
            vec![ColumnSpec::new("firstname", SqlType::Text)],
            vec![ColumnSpec::new("age", SqlType::Integer.nullable())],
        );
        let names: Vec<&str> = t.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["firstname", "age"]);
        assert!(t.is_required("firstname"));
        assert!(!t.is_required("age"));
        assert_eq!(t.required_columns().collect::<Vec<_>>(), ["firstname"]);
    }

    #[test]
    fn test_unknown_column_is_reference_error() {
        let err = contacts().col("email").unwrap_err();
        assert_eq!(err.to_string(), "unknown column 'email' on 'contacts'");
    }

    #[test]
    fn test_alias_rebinds_columns() {
        let t = contacts();
        let c = t.aliased("c");
        assert_ne!(t.id(), c.id());
        assert_eq!(c.qualifier(), "c");
        assert_eq!(c.columns(), t.columns());
        let col = c.col("firstname").unwrap();
        assert!(matches!(col.kind(), ExprKind::Column(r) if r.source == c.id()));
    }

    #[test]
    fn test_as_nullable_is_noop() {
        let t = contacts();
        let n = t.as_nullable();
        assert_eq!(t.id(), n.id());
        assert_eq!(t.columns(), n.columns());
        assert_eq!(n.alias(), None);
    }

    #[test]
    fn test_join_condition_rules() {
        let t = contacts();
        let c = t.aliased("c");
        let on = t.col("firstname").unwrap().eq(c.col("firstname").unwrap());

        let err = Join::new((&t).into(), (&c).into(), JoinKind::Inner, None).unwrap_err();
        assert!(matches!(err, Error::MissingJoinCondition(JoinKind::Inner)));

        let err = Join::new((&t).into(), (&c).into(), JoinKind::Cross, Some(on.clone()))
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedJoinCondition));

        let not_bool = t.col("firstname").unwrap();
        let err = Join::new((&t).into(), (&c).into(), JoinKind::Left, Some(not_bool))
            .unwrap_err();
        assert!(matches!(err, Error::NotBoolean { .. }));

        assert!(Join::new((&t).into(), (&c).into(), JoinKind::Full, Some(on)).is_ok());
        assert!(Join::new((&t).into(), (&c).into(), JoinKind::Cross, None).is_ok());
    }

    #[test]
    fn test_join_leaves_and_rightmost() {
        let t = contacts();
        let a = t.aliased("a");
        let b = t.aliased("b");
        let item = FromItem::from(&t)
            .cross_join(&a)
            .unwrap()
            .cross_join(&b)
            .unwrap();
        let ids: Vec<SourceId> = item.leaves().iter().map(|s| s.id()).collect();
        assert_eq!(ids, [t.id(), a.id(), b.id()]);
        assert_eq!(item.rightmost().id(), b.id());
        assert_eq!(item.column_exprs().len(), 9);
    }

    #[test]
    fn test_join_kind_display() {
        assert_eq!(JoinKind::Inner.to_string(), "INNER JOIN");
        assert_eq!(JoinKind::Left.to_string(), "LEFT JOIN");
        assert_eq!(JoinKind::Inner.keyword(), "JOIN");
    }
}
