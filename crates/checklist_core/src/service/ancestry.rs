//! Iterative parent-pointer walks over the category forest.
//!
//! # Invariants
//! - Walks never recurse; each visited id is recorded, so a walk takes at
//!   most N lookups for N categories even over corrupted data.
//! - A parent pointer that no longer resolves ends the walk without error.

use crate::model::category::{Category, CategoryId};
use crate::service::error::{ServiceError, ServiceResult};
use std::collections::HashSet;

/// Resolves the chain `[start, parent, grandparent, ..]`.
///
/// # Errors
/// - `ServiceError::Cycle` when a node is met twice.
/// - Lookup errors are returned unchanged.
pub fn resolve_chain<F>(start: Category, mut lookup: F) -> ServiceResult<Vec<Category>>
where
    F: FnMut(CategoryId) -> ServiceResult<Option<Category>>,
{
    let mut visited = HashSet::from([start.id]);
    let mut current_id = start.id;
    let mut cursor = start.parent_id;
    let mut chain = vec![start];

    while let Some(parent_id) = cursor {
        if !visited.insert(parent_id) {
            return Err(ServiceError::Cycle {
                category_id: current_id,
                parent_id,
            });
        }

        match lookup(parent_id)? {
            Some(parent) => {
                current_id = parent.id;
                cursor = parent.parent_id;
                chain.push(parent);
            }
            None => break,
        }
    }

    Ok(chain)
}

/// Returns whether hanging `node_id` under `candidate_parent_id` closes a loop.
///
/// A loop already present above the candidate also counts as a cycle.
pub fn would_create_cycle<F>(
    node_id: CategoryId,
    candidate_parent_id: CategoryId,
    mut lookup: F,
) -> ServiceResult<bool>
where
    F: FnMut(CategoryId) -> ServiceResult<Option<Category>>,
{
    let mut visited = HashSet::new();
    let mut cursor = Some(candidate_parent_id);
    while let Some(current) = cursor {
        if current == node_id {
            return Ok(true);
        }
        if !visited.insert(current) {
            return Ok(true);
        }
        cursor = lookup(current)?.and_then(|node| node.parent_id);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{resolve_chain, would_create_cycle};
    use crate::model::category::{Category, CategoryId};
    use crate::service::error::{ServiceError, ServiceResult};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn node(name: &str, parent_id: Option<CategoryId>) -> Category {
        Category::new(name, None, parent_id).unwrap()
    }

    fn lookup_in(
        nodes: &HashMap<CategoryId, Category>,
    ) -> impl FnMut(CategoryId) -> ServiceResult<Option<Category>> + '_ {
        move |id| Ok(nodes.get(&id).cloned())
    }

    fn index(nodes: &[&Category]) -> HashMap<CategoryId, Category> {
        nodes.iter().map(|node| (node.id, (*node).clone())).collect()
    }

    #[test]
    fn chain_is_nearest_first() {
        let root = node("Weapons", None);
        let mid = node("Swords", Some(root.id));
        let leaf = node("Long Swords", Some(mid.id));
        let nodes = index(&[&root, &mid, &leaf]);

        let chain = resolve_chain(leaf.clone(), lookup_in(&nodes)).unwrap();
        let names: Vec<_> = chain.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Long Swords", "Swords", "Weapons"]);
    }

    #[test]
    fn chain_stops_at_dangling_parent() {
        let orphan = node("Swords", Some(Uuid::new_v4()));
        let nodes = index(&[&orphan]);

        let chain = resolve_chain(orphan.clone(), lookup_in(&nodes)).unwrap();
        assert_eq!(chain, vec![orphan]);
    }

    #[test]
    fn chain_reports_stored_cycle_instead_of_looping() {
        let mut a = node("A", None);
        let b = node("B", Some(a.id));
        a.parent_id = Some(b.id);
        let nodes = index(&[&a, &b]);

        let err = resolve_chain(a.clone(), lookup_in(&nodes)).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Cycle { category_id, parent_id } if category_id == b.id && parent_id == a.id
        ));
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let mut a = node("A", None);
        a.parent_id = Some(a.id);
        let nodes = index(&[&a]);

        assert!(resolve_chain(a.clone(), lookup_in(&nodes)).is_err());
        assert!(would_create_cycle(a.id, a.id, lookup_in(&nodes)).unwrap());
    }

    #[test]
    fn descendant_parent_would_create_cycle() {
        let root = node("Weapons", None);
        let child = node("Swords", Some(root.id));
        let other = node("Armor", None);
        let nodes = index(&[&root, &child, &other]);

        assert!(would_create_cycle(root.id, child.id, lookup_in(&nodes)).unwrap());
        assert!(!would_create_cycle(child.id, other.id, lookup_in(&nodes)).unwrap());
    }
}
