use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    /// Applies the direction to an ascending ordering.
    #[inline]
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    }
}

/// Sorted column and its direction. `Option<SortSpec>::None` is the unsorted state, so at most
/// one column is ever sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub col: usize,
    pub dir: SortDir,
}

impl SortSpec {
    pub fn asc(col: usize) -> Self {
        Self { col, dir: SortDir::Asc }
    }

    pub fn desc(col: usize) -> Self {
        Self { col, dir: SortDir::Desc }
    }

    /// Next sort state after the header of `clicked` is activated.
    ///
    /// Same column: `Asc -> Desc -> unsorted`. Any other column (or nothing sorted yet) starts at
    /// `Asc` on the clicked column.
    pub fn cycle(current: Option<SortSpec>, clicked: usize) -> Option<SortSpec> {
        match current {
            Some(SortSpec { col, dir: SortDir::Asc }) if col == clicked => Some(Self::desc(col)),
            Some(SortSpec { col, dir: SortDir::Desc }) if col == clicked => None,
            _ => Some(Self::asc(clicked)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_same_column() {
        let s = SortSpec::cycle(None, 2);
        assert_eq!(s, Some(SortSpec::asc(2)));
        let s = SortSpec::cycle(s, 2);
        assert_eq!(s, Some(SortSpec::desc(2)));
        let s = SortSpec::cycle(s, 2);
        assert_eq!(s, None);
        let s = SortSpec::cycle(s, 2);
        assert_eq!(s, Some(SortSpec::asc(2)));
    }

    #[test]
    fn test_cycle_other_column_resets() {
        assert_eq!(SortSpec::cycle(Some(SortSpec::asc(0)), 1), Some(SortSpec::asc(1)));
        assert_eq!(SortSpec::cycle(Some(SortSpec::desc(0)), 1), Some(SortSpec::asc(1)));
    }

    #[test]
    fn test_apply() {
        assert_eq!(SortDir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortDir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortDir::Desc.apply(Ordering::Equal), Ordering::Equal);
    }
}
