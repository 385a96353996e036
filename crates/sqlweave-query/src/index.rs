//! Index descriptions for index DDL.

/// Index flavours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexKind {
    #[default]
    Index,
    Unique,
    FullText,
    Spatial,
    Primary,
}

impl IndexKind {
    /// Prefix of generated index names.
    fn prefix(self) -> &'static str {
        match self {
            IndexKind::Index => "IX",
            IndexKind::Unique => "UX",
            IndexKind::FullText => "FTX",
            IndexKind::Spatial => "SPX",
            IndexKind::Primary => "PRIMARY",
        }
    }
}

/// Column direction inside an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    pub name: String,
    pub direction: Direction,
}

impl IndexColumn {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Descending,
        }
    }
}

/// One index over one or more columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: Option<String>,
    pub kind: IndexKind,
    pub columns: Vec<IndexColumn>,
    pub comment: Option<String>,
}

impl IndexSpec {
    pub fn new(kind: IndexKind, columns: impl IntoIterator<Item = IndexColumn>) -> Self {
        Self {
            name: None,
            kind,
            columns: columns.into_iter().collect(),
            comment: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Explicit name, or one derived from the columns:
    /// `IX_SID_ASC-IX_Bool_DESC`.
    pub fn name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        if self.kind == IndexKind::Primary {
            return IndexKind::Primary.prefix().to_string();
        }
        self.columns
            .iter()
            .map(|c| format!("{}_{}_{}", self.kind.prefix(), c.name, c.direction.as_str()))
            .collect::<Vec<_>>()
            .join("-")
    }
}
