use crate::Match;

/// One round of the bracket, in display order (top to bottom).
pub type Column<'a> = Vec<&'a Match>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("a bracket needs 2^n - 1 matches, got {count}")]
    InvalidMatchCount { count: usize },
    #[error("match index {index} is out of range or repeated")]
    InvalidIndex { index: usize },
    #[error("match {index} has an invalid parent reference ({})", describe_parent(.parent))]
    InvalidParentReference { index: usize, parent: Option<usize> },
}

fn describe_parent(parent: &Option<usize>) -> String {
    parent.map_or_else(|| "none".to_string(), |p| p.to_string())
}

/// Round depth of a match index: 0 for the final, 1 for the semifinals, ...
pub fn round_of(index: usize) -> usize {
    (index + 1).ilog2() as usize
}

/// Arrange matches into columns, first round first and the final last.
///
/// Matches are taken in descending `index` order and split into runs of
/// `2^power, 2^(power-1), .., 1` where `power = log2(len + 1) - 1`. A list
/// whose length is not `2^n - 1` still goes through the same arithmetic with
/// a fractional `power`: each take is truncated and whatever is left once
/// `power` drops below zero is not placed. Use [`try_build_grid`] to reject
/// such lists instead.
pub fn build_grid(matches: &[Match]) -> Vec<Column<'_>> {
    let mut ordered: Vec<&Match> = matches.iter().collect();
    ordered.sort_by(|a, b| b.index.cmp(&a.index));
    let mut remaining = ordered.into_iter();

    let mut power = ((matches.len() + 1) as f64).log2() - 1.0;
    let mut grid = Vec::new();
    while power >= 0.0 {
        let take = 2f64.powf(power) as usize;
        grid.push(remaining.by_ref().take(take).collect());
        power -= 1.0;
    }
    grid
}

/// [`validate`] followed by [`build_grid`].
pub fn try_build_grid(matches: &[Match]) -> Result<Vec<Column<'_>>, LayoutError> {
    validate(matches)?;
    Ok(build_grid(matches))
}

/// Check that `matches` forms a complete binary bracket and return its round
/// count. An empty list is valid and has no rounds.
pub fn validate(matches: &[Match]) -> Result<usize, LayoutError> {
    let count = matches.len();
    if count == 0 {
        return Ok(0);
    }
    if !(count + 1).is_power_of_two() {
        return Err(LayoutError::InvalidMatchCount { count });
    }

    let mut seen = vec![false; count];
    for m in matches {
        if m.index >= count || std::mem::replace(&mut seen[m.index], true) {
            return Err(LayoutError::InvalidIndex { index: m.index });
        }
    }

    // Dense indices plus "parent is one round closer, at most two feeders"
    // pins every parent to exactly two feeders.
    let mut feeders = vec![0u8; count];
    for m in matches {
        let invalid = LayoutError::InvalidParentReference {
            index: m.index,
            parent: m.parent_index,
        };
        match m.parent_index {
            None if m.is_root() => {}
            Some(parent)
                if !m.is_root() && parent < count && round_of(parent) + 1 == round_of(m.index) =>
            {
                feeders[parent] += 1;
                if feeders[parent] > 2 {
                    return Err(invalid);
                }
            }
            _ => return Err(invalid),
        }
    }

    Ok((count + 1).ilog2() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchId;

    /// Heap-shaped bracket: the parent of `i` is `(i - 1) / 2`.
    fn bracket(rounds: u32) -> Vec<Match> {
        let count = 2usize.pow(rounds) - 1;
        (0..count)
            .map(|i| {
                let parent = (i > 0).then(|| (i - 1) / 2);
                Match::new(i, parent, format!("m{i}"))
            })
            .collect()
    }

    fn indices(grid: &[Column<'_>]) -> Vec<Vec<usize>> {
        grid.iter()
            .map(|col| col.iter().map(|m| m.index).collect())
            .collect()
    }

    #[test]
    fn three_matches_make_two_columns() {
        let matches = bracket(2);
        let grid = build_grid(&matches);
        assert_eq!(indices(&grid), vec![vec![2, 1], vec![0]]);
    }

    #[test]
    fn seven_matches_make_three_columns() {
        let matches = bracket(3);
        let grid = build_grid(&matches);
        assert_eq!(
            indices(&grid),
            vec![vec![6, 5, 4, 3], vec![2, 1], vec![0]]
        );
    }

    #[test]
    fn single_match_is_just_the_final() {
        let matches = bracket(1);
        assert_eq!(indices(&build_grid(&matches)), vec![vec![0]]);
    }

    #[test]
    fn empty_list_has_no_columns() {
        assert!(build_grid(&[]).is_empty());
    }

    #[test]
    fn columns_follow_index_not_input_order() {
        let mut matches = bracket(2);
        matches.swap(0, 2);
        let grid = build_grid(&matches);
        assert_eq!(indices(&grid), vec![vec![2, 1], vec![0]]);
    }

    #[test]
    fn grid_keeps_payload_untouched() {
        let matches = vec![
            Match::new(0, None, 100i64).with_field("home", "Gonzaga"),
            Match::new(1, Some(0), 101i64),
            Match::new(2, Some(0), 102i64),
        ];
        let grid = build_grid(&matches);
        assert_eq!(grid[1][0].payload["home"], "Gonzaga");
        assert_eq!(grid[0][0].match_id, MatchId::Number(102));
    }

    #[test]
    fn malformed_length_is_truncated() {
        // log2(5) - 1 = 1.32: takes floor(2.5) = 2, then floor(1.25) = 1,
        // and the last match (index 0) is never placed.
        let matches: Vec<Match> = (0..4).map(|i| Match::new(i, None, i as i64)).collect();
        let grid = build_grid(&matches);
        assert_eq!(indices(&grid), vec![vec![3, 2], vec![1]]);
    }

    #[test]
    fn round_of_index() {
        assert_eq!(round_of(0), 0);
        assert_eq!(round_of(1), 1);
        assert_eq!(round_of(2), 1);
        assert_eq!(round_of(3), 2);
        assert_eq!(round_of(6), 2);
        assert_eq!(round_of(7), 3);
        assert_eq!(round_of(14), 3);
    }

    #[test]
    fn validate_counts_rounds() {
        assert_eq!(validate(&[]), Ok(0));
        assert_eq!(validate(&bracket(1)), Ok(1));
        assert_eq!(validate(&bracket(4)), Ok(4));
    }

    #[test]
    fn validate_rejects_bad_count() {
        let mut matches = bracket(3);
        matches.pop();
        assert_eq!(
            validate(&matches),
            Err(LayoutError::InvalidMatchCount { count: 6 })
        );
    }

    #[test]
    fn validate_rejects_repeated_index() {
        let mut matches = bracket(2);
        matches[2].index = 1;
        assert_eq!(validate(&matches), Err(LayoutError::InvalidIndex { index: 1 }));
    }

    #[test]
    fn validate_rejects_out_of_range_index() {
        let mut matches = bracket(2);
        matches[2].index = 7;
        assert_eq!(validate(&matches), Err(LayoutError::InvalidIndex { index: 7 }));
    }

    #[test]
    fn validate_rejects_missing_parent() {
        let mut matches = bracket(2);
        matches[1].parent_index = None;
        assert_eq!(
            validate(&matches),
            Err(LayoutError::InvalidParentReference { index: 1, parent: None })
        );
    }

    #[test]
    fn validate_rejects_unknown_parent() {
        let mut matches = bracket(2);
        matches[1].parent_index = Some(9);
        assert_eq!(
            validate(&matches),
            Err(LayoutError::InvalidParentReference { index: 1, parent: Some(9) })
        );
    }

    #[test]
    fn validate_rejects_root_with_parent() {
        let mut matches = bracket(2);
        matches[0].parent_index = Some(1);
        assert_eq!(
            validate(&matches),
            Err(LayoutError::InvalidParentReference { index: 0, parent: Some(1) })
        );
    }

    #[test]
    fn validate_rejects_parent_in_same_round() {
        let mut matches = bracket(3);
        matches[4].parent_index = Some(3);
        assert_eq!(
            validate(&matches),
            Err(LayoutError::InvalidParentReference { index: 4, parent: Some(3) })
        );
    }

    #[test]
    fn validate_rejects_three_feeders() {
        let mut matches = bracket(3);
        // 3 and 4 already feed 1.
        matches[5].parent_index = Some(1);
        assert_eq!(
            validate(&matches),
            Err(LayoutError::InvalidParentReference { index: 5, parent: Some(1) })
        );
    }

    #[test]
    fn try_build_grid_surfaces_validation() {
        let matches: Vec<Match> = (0..4).map(|i| Match::new(i, None, i as i64)).collect();
        assert!(matches!(
            try_build_grid(&matches),
            Err(LayoutError::InvalidMatchCount { count: 4 })
        ));
        assert_eq!(try_build_grid(&bracket(2)).map(|g| g.len()), Ok(2));
    }

    #[test]
    fn error_messages() {
        let err = LayoutError::InvalidParentReference { index: 4, parent: None };
        assert_eq!(err.to_string(), "match 4 has an invalid parent reference (none)");
        let err = LayoutError::InvalidMatchCount { count: 6 };
        assert_eq!(err.to_string(), "a bracket needs 2^n - 1 matches, got 6");
    }
}
