//! Partitioning of a source snapshot into creates and updates.

use crate::{Issue, MirrorIndex, Operation, PageId};

/// Result of reconciling one issue snapshot against a [`MirrorIndex`].
///
/// Both sequences keep the relative order of the input issues.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    /// Issues with no mirrored row.
    pub to_create: Vec<Issue>,
    /// Issues already mirrored, paired with their row.
    pub to_update: Vec<(PageId, Issue)>,
}

impl Reconciliation {
    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty()
    }

    /// Create operations, in input order.
    pub fn creates(&self) -> impl Iterator<Item = Operation> + '_ {
        self.to_create.iter().cloned().map(Operation::Create)
    }

    /// Update operations, in input order.
    pub fn updates(&self) -> impl Iterator<Item = Operation> + '_ {
        self.to_update
            .iter()
            .cloned()
            .map(|(page_id, issue)| Operation::Update { page_id, issue })
    }
}

/// Decides, for every issue, whether its row must be created or updated.
///
/// Issues found in `index` are updated with their full current data (no
/// diffing); all others are created. `index` is only read, so reconciling the
/// same inputs twice yields the same partition.
pub fn reconcile(issues: impl IntoIterator<Item = Issue>, index: &MirrorIndex) -> Reconciliation {
    let mut plan = Reconciliation::default();
    for issue in issues {
        match index.get(issue.number) {
            Some(page_id) => plan.to_update.push((page_id.clone(), issue)),
            None => plan.to_create.push(issue),
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IssueNumber, IssueState, OperationKind};

    fn issue(number: u64, title: &str, state: IssueState, comments: u64) -> Issue {
        Issue {
            number: IssueNumber::new(number),
            title: title.to_string(),
            state,
            comment_count: comments,
            url: format!("https://x/{number}"),
        }
    }

    fn page(id: &str) -> PageId {
        PageId::new(id).unwrap()
    }

    #[test]
    fn known_issue_is_updated_and_new_issue_is_created() {
        let index = MirrorIndex::from([(IssueNumber::new(42), page("row_abc"))]);
        let bug = issue(42, "Fix bug", IssueState::Open, 3);
        let feature = issue(7, "New feature", IssueState::Closed, 0);

        let plan = reconcile(vec![bug.clone(), feature.clone()], &index);

        assert_eq!(plan.to_create, vec![feature]);
        assert_eq!(plan.to_update, vec![(page("row_abc"), bug)]);
    }

    #[test]
    fn partition_is_complete_and_disjoint() {
        let index = MirrorIndex::from([
            (IssueNumber::new(2), page("p2")),
            (IssueNumber::new(4), page("p4")),
            (IssueNumber::new(99), page("orphan")),
        ]);
        let issues: Vec<Issue> = (1..=6)
            .map(|n| issue(n, "t", IssueState::Open, 0))
            .collect();

        let plan = reconcile(issues.clone(), &index);

        assert_eq!(plan.len(), issues.len());
        let created: Vec<u64> = plan.to_create.iter().map(|i| i.number.as_u64()).collect();
        let updated: Vec<u64> = plan.to_update.iter().map(|(_, i)| i.number.as_u64()).collect();
        assert_eq!(created, vec![1, 3, 5, 6]);
        assert_eq!(updated, vec![2, 4]);
        for (page_id, issue) in &plan.to_update {
            assert_eq!(index.get(issue.number), Some(page_id));
        }
    }

    #[test]
    fn input_order_is_preserved() {
        let index = MirrorIndex::from([
            (IssueNumber::new(10), page("a")),
            (IssueNumber::new(3), page("b")),
        ]);
        let issues = vec![
            issue(10, "t", IssueState::Open, 0),
            issue(8, "t", IssueState::Open, 0),
            issue(3, "t", IssueState::Open, 0),
            issue(1, "t", IssueState::Open, 0),
        ];

        let plan = reconcile(issues, &index);

        let updated: Vec<&str> = plan.to_update.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(updated, vec!["a", "b"]);
        let created: Vec<u64> = plan.to_create.iter().map(|i| i.number.as_u64()).collect();
        assert_eq!(created, vec![8, 1]);
    }

    #[test]
    fn reconcile_is_repeatable_against_unchanged_inputs() {
        let index = MirrorIndex::from([(IssueNumber::new(1), page("p1"))]);
        let issues = vec![
            issue(1, "a", IssueState::Open, 1),
            issue(2, "b", IssueState::Closed, 2),
        ];
        assert_eq!(reconcile(issues.clone(), &index), reconcile(issues, &index));
    }

    #[test]
    fn empty_inputs_produce_empty_plan() {
        let plan = reconcile(Vec::new(), &MirrorIndex::new());
        assert!(plan.is_empty());
        assert_eq!(plan.creates().count(), 0);
    }

    #[test]
    fn operations_carry_kind_and_row() {
        let index = MirrorIndex::from([(IssueNumber::new(5), page("p5"))]);
        let plan = reconcile(
            vec![issue(5, "x", IssueState::Open, 0), issue(6, "y", IssueState::Open, 0)],
            &index,
        );
        let creates: Vec<Operation> = plan.creates().collect();
        let updates: Vec<Operation> = plan.updates().collect();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].kind(), OperationKind::Create);
        assert_eq!(creates[0].issue().number, IssueNumber::new(6));
        assert!(matches!(
            &updates[0],
            Operation::Update { page_id, .. } if page_id.as_str() == "p5"
        ));
    }
}
