//! Owner and group name lookup.

use std::cell::RefCell;
use std::collections::HashMap;

/// Resolves numeric user and group ids to names.
///
/// A lookup that fails for any reason returns `None`; callers store an
/// empty name and keep the numeric id.
pub trait IdentityResolver {
    /// Name of the user with id `uid`.
    fn user_name(&self, uid: u32) -> Option<String>;

    /// Name of the group with id `gid`.
    fn group_name(&self, gid: u32) -> Option<String>;
}

/// Looks names up in the operating system's user and group databases.
///
/// Results, including misses, are cached for the lifetime of the resolver
/// since a backup typically touches few distinct owners.
#[derive(Debug, Default)]
pub struct SystemIdentity {
    users: RefCell<HashMap<u32, Option<String>>>,
    groups: RefCell<HashMap<u32, Option<String>>>,
}

impl SystemIdentity {
    /// Creates a resolver with empty caches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityResolver for SystemIdentity {
    fn user_name(&self, uid: u32) -> Option<String> {
        self.users
            .borrow_mut()
            .entry(uid)
            .or_insert_with(|| lookup_user(uid))
            .clone()
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        self.groups
            .borrow_mut()
            .entry(gid)
            .or_insert_with(|| lookup_group(gid))
            .clone()
    }
}

#[cfg(unix)]
fn lookup_user(uid: u32) -> Option<String> {
    use nix::unistd::Uid;
    use nix::unistd::User;

    match User::from_uid(Uid::from_raw(uid)) {
        Ok(user) => user.map(|u| u.name),
        Err(e) => {
            tracing::debug!(uid, error = %e, "user lookup failed");
            None
        }
    }
}

#[cfg(unix)]
fn lookup_group(gid: u32) -> Option<String> {
    use nix::unistd::Gid;
    use nix::unistd::Group;

    match Group::from_gid(Gid::from_raw(gid)) {
        Ok(group) => group.map(|g| g.name),
        Err(e) => {
            tracing::debug!(gid, error = %e, "group lookup failed");
            None
        }
    }
}

#[cfg(not(unix))]
fn lookup_user(_uid: u32) -> Option<String> {
    None
}

#[cfg(not(unix))]
fn lookup_group(_gid: u32) -> Option<String> {
    None
}

/// Fixed in-memory resolver.
///
/// # Examples
///
/// ```
/// use backup_core::metadata::IdentityResolver;
/// use backup_core::metadata::MapIdentity;
///
/// let ids = MapIdentity::new().with_user(1000, "alice").with_group(100, "users");
/// assert_eq!(ids.user_name(1000).as_deref(), Some("alice"));
/// assert_eq!(ids.group_name(5), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapIdentity {
    users: HashMap<u32, String>,
    groups: HashMap<u32, String>,
}

impl MapIdentity {
    /// Creates a resolver that knows nobody.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user.
    #[must_use]
    pub fn with_user(mut self, uid: u32, name: impl Into<String>) -> Self {
        self.users.insert(uid, name.into());
        self
    }

    /// Adds a group.
    #[must_use]
    pub fn with_group(mut self, gid: u32, name: impl Into<String>) -> Self {
        self.groups.insert(gid, name.into());
        self
    }
}

impl IdentityResolver for MapIdentity {
    fn user_name(&self, uid: u32) -> Option<String> {
        self.users.get(&uid).cloned()
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        self.groups.get(&gid).cloned()
    }
}
