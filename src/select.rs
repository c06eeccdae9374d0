use crate::types::PullRequest;

/// Returns the pull requests carrying `label`, in input order.
pub fn pulls_with_label(pulls: &[PullRequest], label: &str) -> Vec<PullRequest> {
    pulls
        .iter()
        .filter(|pr| pr.has_label(label))
        .cloned()
        .collect()
}

pub fn pr_numbers(pulls: &[PullRequest]) -> Vec<u64> {
    pulls.iter().map(|pr| pr.number).collect()
}
