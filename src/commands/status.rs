//! `status`: every lock, split by who holds it.

use crate::error::Result;
use crate::locker::LockManager;
use crate::messages::{Messages, render};
use crate::store::VersionedStore;

pub(super) fn cmd_status<S: VersionedStore>(
    manager: &LockManager<S>,
    messages: &Messages,
    user: &str,
) -> Result<String> {
    let mut own = Vec::new();
    let mut others = Vec::new();
    let mut unclaimed = Vec::new();

    // Already sorted by display name.
    let locks = manager.status()?;
    for lock in &locks {
        match lock.owner() {
            Some(owner) if owner == user => own.push(lock.name.as_str()),
            Some(_) => others.push(lock.name.as_str()),
            None => unclaimed.push(lock.name.as_str()),
        }
    }

    render(
        &messages.status.success,
        &[
            ("own", &own.join(", ")),
            ("others", &others.join(", ")),
            ("unclaimed", &unclaimed.join(", ")),
        ],
    )
}
