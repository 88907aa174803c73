//! Default value functions used by the Config struct.

pub(crate) fn default_remote() -> String {
    "origin".to_string()
}
pub(crate) fn default_branch() -> String {
    "main".to_string()
}
pub(crate) fn default_committer_name() -> String {
    "Claimer".to_string()
}
pub(crate) fn default_committer_email() -> String {
    "claimer@localhost".to_string()
}
pub(crate) fn default_stale_lock_minutes() -> u32 {
    30
}
