//! Composition of discovered and explicit repository lists

use crate::overrides::AddRepositoriesOp;
use depctx_model::RemoteRepository;

/// Combine `discovered` repositories with `explicit` ones according to `op`.
///
/// - `Replace`: only `explicit`, unless it is empty, in which case
///   `discovered` is kept. A later explicit entry replaces an earlier one
///   with the same id.
/// - `Append`: `discovered` then `explicit`
/// - `Prepend`: `explicit` then `discovered`
///
/// For `Append` and `Prepend` the first occurrence of an id is kept. A later
/// duplicate that routes through a mirror contributes its mirrored
/// repositories to the kept entry and is otherwise skipped.
pub fn compose(
    discovered: &[RemoteRepository],
    explicit: &[RemoteRepository],
    op: AddRepositoriesOp,
) -> Vec<RemoteRepository> {
    match op {
        AddRepositoriesOp::Replace if explicit.is_empty() => dedup_keep_first(discovered.iter()),
        AddRepositoriesOp::Replace => dedup_keep_last(explicit),
        AddRepositoriesOp::Append => dedup_keep_first(discovered.iter().chain(explicit)),
        AddRepositoriesOp::Prepend => dedup_keep_first(explicit.iter().chain(discovered)),
    }
}

fn dedup_keep_first<'a>(
    repositories: impl Iterator<Item = &'a RemoteRepository>,
) -> Vec<RemoteRepository> {
    let mut result: Vec<RemoteRepository> = Vec::new();
    for repository in repositories {
        match result.iter_mut().find(|r| r.id == repository.id) {
            Some(existing) if !repository.mirrored.is_empty() => {
                for mirrored in &repository.mirrored {
                    if !existing.mirrored.iter().any(|m| m.id == mirrored.id) {
                        existing.mirrored.push(mirrored.clone());
                    }
                }
            }
            Some(_) => {
                tracing::debug!(id = %repository.id, "Skipping repository with duplicate id");
            }
            None => result.push(repository.clone()),
        }
    }
    result
}

// Position of the first occurrence, contents of the last.
fn dedup_keep_last(repositories: &[RemoteRepository]) -> Vec<RemoteRepository> {
    let mut result: Vec<RemoteRepository> = Vec::new();
    for repository in repositories {
        match result.iter_mut().find(|r| r.id == repository.id) {
            Some(existing) => *existing = repository.clone(),
            None => result.push(repository.clone()),
        }
    }
    result
}
