//! # Member Manager
//!
//! CRUD over registered store members and their loyalty point balances.
//!
//! Members are keyed by an alphanumeric identifier. Newly registered members
//! start with the `-1` points sentinel; checkout converts that into a concrete
//! balance the first time they transact.

use std::io;
use std::path::Path;

use tracing::debug;

use campus_core::{Member, Record};

use crate::error::MemberError;
use crate::record_store::RecordStore;

/// File name of the member collection.
const MEMBER_FILE: &str = "Member.dat";

/// Manages the member collection.
#[derive(Debug)]
pub struct MemberManager {
    members: RecordStore<Member>,
}

impl MemberManager {
    /// Opens the member store under `data_dir`.
    pub fn open(data_dir: &Path) -> io::Result<Self> {
        Ok(MemberManager {
            members: RecordStore::open(data_dir.join(MEMBER_FILE))?,
        })
    }

    /// Lists every registered member.
    pub fn all_members(&self) -> Result<Vec<Member>, MemberError> {
        Ok(self.members.get_all()?)
    }

    /// Looks a member up by identifier.
    pub fn find_member(&self, member_id: &str) -> Result<Option<Member>, MemberError> {
        let members = self.members.get_all()?;
        Ok(members.into_iter().find(|member| member.id == member_id))
    }

    /// Registers a new member.
    ///
    /// The identifier must be unique; the stored balance starts at the
    /// never-transacted sentinel regardless of what the caller passes.
    pub fn add_member(&self, member: &Member) -> Result<(), MemberError> {
        campus_core::validation::validate_member_id(&member.id)?;
        campus_core::validation::validate_name(&member.name)?;
        if self.find_member(&member.id)?.is_some() {
            return Err(MemberError::IdentifierAlreadyPresent(member.id.clone()));
        }
        let fresh = Member::new(member.id.clone(), member.name.clone());
        self.members.add(&fresh)?;
        debug!(member_id = %member.id, "Registered member");
        Ok(())
    }

    /// Updates a member's name or loyalty balance in place.
    pub fn update_member(&self, member: &Member) -> Result<(), MemberError> {
        campus_core::validation::validate_name(&member.name)?;
        let existing = self
            .find_member(&member.id)?
            .ok_or_else(|| MemberError::NotPresent(member.id.clone()))?;
        self.members.replace(&existing.encode(), member)?;
        debug!(member_id = %member.id, "Updated member");
        Ok(())
    }

    /// Removes a member.
    pub fn delete_member(&self, member_id: &str) -> Result<(), MemberError> {
        let existing = self
            .find_member(member_id)?
            .ok_or_else(|| MemberError::NotPresent(member_id.to_string()))?;
        self.members.delete(&existing.encode())?;
        debug!(member_id, "Deleted member");
        Ok(())
    }

    /// Direct store access for tests that inject write failures.
    #[cfg(test)]
    pub(crate) fn store(&self) -> &RecordStore<Member> {
        &self.members
    }

    /// Raw image of the member file, for checkout rollback.
    pub(crate) fn snapshot(&self) -> io::Result<Vec<String>> {
        self.members.snapshot()
    }

    /// Restores a raw image captured by [`snapshot`](Self::snapshot).
    pub(crate) fn restore(&self, image: &[String]) -> io::Result<()> {
        self.members.restore(image)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::LoyaltyPoints;
    use tempfile::TempDir;

    fn open_manager(dir: &TempDir) -> MemberManager {
        MemberManager::open(dir.path()).unwrap()
    }

    #[test]
    fn test_add_and_find_member() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);

        manager
            .add_member(&Member::new("ABZW123KL", "Abzsde Klaoel"))
            .unwrap();

        let member = manager.find_member("ABZW123KL").unwrap().unwrap();
        assert_eq!(member.name, "Abzsde Klaoel");
        assert_eq!(member.loyalty_points, LoyaltyPoints::New);
        assert!(manager.find_member("NOBODY").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager
            .add_member(&Member::new("ABZW123KL", "Abzsde Klaoel"))
            .unwrap();

        let result = manager.add_member(&Member::new("ABZW123KL", "Someone Else"));
        assert!(matches!(result, Err(MemberError::IdentifierAlreadyPresent(_))));
        assert_eq!(manager.all_members().unwrap().len(), 1);
    }

    #[test]
    fn test_new_member_ignores_caller_balance() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);

        let mut member = Member::new("F42563E", "John");
        member.loyalty_points = LoyaltyPoints::Balance(500);
        manager.add_member(&member).unwrap();

        let stored = manager.find_member("F42563E").unwrap().unwrap();
        assert_eq!(stored.loyalty_points, LoyaltyPoints::New);
    }

    #[test]
    fn test_update_member_balance() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_member(&Member::new("F42563E", "John")).unwrap();

        let mut member = manager.find_member("F42563E").unwrap().unwrap();
        member.loyalty_points = LoyaltyPoints::Balance(50);
        manager.update_member(&member).unwrap();

        let stored = manager.find_member("F42563E").unwrap().unwrap();
        assert_eq!(stored.loyalty_points, LoyaltyPoints::Balance(50));
    }

    #[test]
    fn test_update_missing_member_fails() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);

        let result = manager.update_member(&Member::new("GHOST1", "Ghost"));
        assert!(matches!(result, Err(MemberError::NotPresent(_))));
    }

    #[test]
    fn test_delete_member() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);
        manager.add_member(&Member::new("F42563E", "John")).unwrap();

        manager.delete_member("F42563E").unwrap();
        assert!(manager.find_member("F42563E").unwrap().is_none());
        assert!(matches!(
            manager.delete_member("F42563E"),
            Err(MemberError::NotPresent(_))
        ));
    }

    #[test]
    fn test_invalid_identifier_rejected() {
        let dir = TempDir::new().unwrap();
        let manager = open_manager(&dir);

        let result = manager.add_member(&Member::new("bad id!", "John"));
        assert!(matches!(result, Err(MemberError::Invalid(_))));
    }
}
