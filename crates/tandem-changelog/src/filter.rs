//! Removal of reverted commits

use std::collections::HashSet;

use tracing::debug;

use crate::types::ParsedCommit;

/// Drop commits that were reverted together with the commits reverting them.
///
/// A revert whose target is not part of `commits` is kept.
pub fn filter_reverted(commits: Vec<ParsedCommit>) -> Vec<ParsedCommit> {
    let mut dropped = HashSet::new();

    for (i, commit) in commits.iter().enumerate() {
        let Some(revert) = &commit.revert else {
            continue;
        };

        let target = commits.iter().enumerate().find(|(j, candidate)| {
            *j != i
                && !dropped.contains(j)
                && match &revert.hash {
                    Some(hash) => candidate.hash.starts_with(hash.as_str()),
                    None => candidate.header == revert.header,
                }
        });

        if let Some((j, reverted)) = target {
            debug!(revert = %commit.short_hash, reverted = %reverted.short_hash, "dropping reverted commit");
            dropped.insert(i);
            dropped.insert(j);
        }
    }

    commits
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !dropped.contains(i))
        .map(|(_, c)| c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::parsed;
    use crate::types::Revert;

    fn revert_of(hash: &str, target: &ParsedCommit) -> ParsedCommit {
        let mut commit = parsed(hash, "revert", &target.header);
        commit.commit_type = None;
        commit.revert = Some(Revert {
            header: target.header.clone(),
            hash: Some(target.hash.clone()),
        });
        commit
    }

    #[test]
    fn test_revert_cancels_commit() {
        let feat = parsed("1111111aaaa", "feat", "add widget");
        let fix = parsed("2222222bbbb", "fix", "repair gadget");
        let revert = revert_of("3333333cccc", &feat);

        let kept = filter_reverted(vec![revert, fix, feat]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].hash, "2222222bbbb");
    }

    #[test]
    fn test_revert_of_older_commit_kept() {
        let old = parsed("9999999dddd", "feat", "from a previous release");
        let revert = revert_of("3333333cccc", &old);

        let kept = filter_reverted(vec![revert]);
        assert_eq!(kept.len(), 1);
    }
}
