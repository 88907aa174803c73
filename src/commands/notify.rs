//! `notify`: mention everyone holding a lock.

use crate::error::Result;
use crate::locker::LockManager;
use crate::messages::{Messages, render};
use crate::store::VersionedStore;
use std::collections::BTreeMap;

pub(super) fn cmd_notify<S: VersionedStore>(
    manager: &LockManager<S>,
    messages: &Messages,
) -> Result<String> {
    let locks = manager.status()?;

    let mut by_owner: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for lock in &locks {
        if let Some(owner) = lock.owner() {
            by_owner.entry(owner).or_default().push(lock.name.as_str());
        }
    }

    if by_owner.is_empty() {
        return render(&messages.notify.none_claimed, &[]);
    }

    let mentions = by_owner
        .iter()
        .map(|(owner, names)| format!("@{}: {}", owner, names.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    render(&messages.notify.success, &[("mentions", &mentions)])
}
