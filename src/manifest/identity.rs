//! User and group name resolution
//!
//! Group names come from a [`GroupIndex`] snapshot taken once per build; user
//! names are looked up per entry. Any id without a name fails the build.

use crate::error::ManifestError;
use crate::manifest::entry::Ownership;
use nix::unistd::{Uid, User};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

/// Default location of the group database
pub const DEFAULT_GROUP_FILE: &str = "/etc/group";

/// Source of uid and gid names
pub trait IdentityDatabase {
    /// Name for `uid`, `Ok(None)` when the database has no such user
    fn user_name(&self, uid: u32) -> Result<Option<String>, ManifestError>;

    /// Snapshot of all group names
    fn group_index(&self) -> Result<GroupIndex, ManifestError>;
}

/// gid to group name snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndex {
    by_gid: HashMap<u32, String>,
}

impl GroupIndex {
    /// Parse `group(5)` formatted text: `name:password:gid:members`.
    ///
    /// Comments and blank lines are ignored; malformed lines are skipped with
    /// a warning. When a gid appears twice the first name wins, as with
    /// `getgrgid(3)`.
    pub fn parse(contents: &str) -> Self {
        let mut by_gid = HashMap::new();
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split(':');
            let name = fields.next().unwrap_or_default();
            let gid = fields.nth(1).and_then(|gid| gid.trim().parse::<u32>().ok());
            match gid {
                Some(gid) if !name.is_empty() => {
                    by_gid.entry(gid).or_insert_with(|| name.to_string());
                }
                _ => warn!(line = lineno + 1, "Skipping malformed group entry"),
            }
        }
        Self { by_gid }
    }

    pub fn name(&self, gid: u32) -> Option<&str> {
        self.by_gid.get(&gid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_gid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_gid.is_empty()
    }
}

impl FromIterator<(u32, String)> for GroupIndex {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            by_gid: iter.into_iter().collect(),
        }
    }
}

/// The host's identity database: `getpwuid_r` for users, the group file for
/// groups.
#[derive(Debug, Clone)]
pub struct SystemIdentities {
    group_file: PathBuf,
}

impl SystemIdentities {
    pub fn new() -> Self {
        Self::with_group_file(PathBuf::from(DEFAULT_GROUP_FILE))
    }

    pub fn with_group_file(group_file: PathBuf) -> Self {
        Self { group_file }
    }
}

impl Default for SystemIdentities {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityDatabase for SystemIdentities {
    fn user_name(&self, uid: u32) -> Result<Option<String>, ManifestError> {
        User::from_uid(Uid::from_raw(uid))
            .map(|user| user.map(|u| u.name))
            .map_err(|source| ManifestError::UserLookup { uid, source })
    }

    fn group_index(&self) -> Result<GroupIndex, ManifestError> {
        let contents = std::fs::read_to_string(&self.group_file).map_err(|source| {
            ManifestError::GroupDatabase {
                path: self.group_file.clone(),
                source,
            }
        })?;
        Ok(GroupIndex::parse(&contents))
    }
}

/// Fixed in-memory identity table
#[derive(Debug, Clone, Default)]
pub struct StaticIdentities {
    users: HashMap<u32, String>,
    groups: HashMap<u32, String>,
}

impl StaticIdentities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, uid: u32, name: impl Into<String>) -> Self {
        self.users.insert(uid, name.into());
        self
    }

    pub fn with_group(mut self, gid: u32, name: impl Into<String>) -> Self {
        self.groups.insert(gid, name.into());
        self
    }
}

impl IdentityDatabase for StaticIdentities {
    fn user_name(&self, uid: u32) -> Result<Option<String>, ManifestError> {
        Ok(self.users.get(&uid).cloned())
    }

    fn group_index(&self) -> Result<GroupIndex, ManifestError> {
        Ok(self.groups.iter().map(|(gid, name)| (*gid, name.clone())).collect())
    }
}

/// Per-build resolver owning the group snapshot
pub struct IdentityResolver<'a> {
    database: &'a dyn IdentityDatabase,
    groups: GroupIndex,
}

impl<'a> IdentityResolver<'a> {
    /// Take the group snapshot for one build
    pub fn new(database: &'a dyn IdentityDatabase) -> Result<Self, ManifestError> {
        let groups = database.group_index()?;
        Ok(Self { database, groups })
    }

    pub fn groups(&self) -> &GroupIndex {
        &self.groups
    }

    /// Resolve both names for a node's numeric ids
    pub fn resolve(&self, uid: u32, gid: u32) -> Result<Ownership, ManifestError> {
        let user = self
            .database
            .user_name(uid)?
            .ok_or(ManifestError::UnknownUser(uid))?;
        let group = self
            .groups
            .name(gid)
            .ok_or(ManifestError::UnknownGroup(gid))?
            .to_string();
        Ok(Ownership {
            user,
            uid,
            group,
            gid,
        })
    }
}
