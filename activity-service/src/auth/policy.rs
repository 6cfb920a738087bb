//! Who may do what. The table is flat: a role gets an operation only if it is
//! listed for it, so there is no implied ordering between roles.

use crate::models::{Account, Role};

use super::AuthRejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ReadActivities,
    CreateActivity,
    UpdateActivity,
    DeleteActivity,
    ReadLocations,
    ManageLocations,
    ReadDashboard,
    ReadOwnProfile,
    SelfRegister,
    ListAccounts,
    CreateAccount,
    UpdateAccount,
    DeactivateAccount,
    DeleteAccount,
}

impl Operation {
    pub const ALL: [Operation; 14] = [
        Operation::ReadActivities,
        Operation::CreateActivity,
        Operation::UpdateActivity,
        Operation::DeleteActivity,
        Operation::ReadLocations,
        Operation::ManageLocations,
        Operation::ReadDashboard,
        Operation::ReadOwnProfile,
        Operation::SelfRegister,
        Operation::ListAccounts,
        Operation::CreateAccount,
        Operation::UpdateAccount,
        Operation::DeactivateAccount,
        Operation::DeleteAccount,
    ];
}

const EVERYONE: &[Role] = &[Role::Guest, Role::User, Role::Admin, Role::SuperAdmin];
const STAFF: &[Role] = &[Role::Admin, Role::SuperAdmin];
const SUPER_ADMIN_ONLY: &[Role] = &[Role::SuperAdmin];
const GUEST_ONLY: &[Role] = &[Role::Guest];

pub fn allowed_roles(operation: Operation) -> &'static [Role] {
    use Operation::*;
    match operation {
        ReadActivities | ReadLocations | ReadDashboard | ReadOwnProfile => EVERYONE,
        CreateActivity | UpdateActivity | DeleteActivity | ManageLocations => STAFF,
        ListAccounts | CreateAccount | UpdateAccount | DeactivateAccount | DeleteAccount => {
            SUPER_ADMIN_ONLY
        }
        SelfRegister => GUEST_ONLY,
    }
}

pub fn is_allowed(role: Role, operation: Operation) -> bool {
    allowed_roles(operation).contains(&role)
}

/// super_admin accounts cannot be modified, deactivated or deleted through
/// the API, not even by themselves.
pub fn ensure_mutable_target(target: &Account) -> Result<(), AuthRejection> {
    if target.role == Role::SuperAdmin {
        return Err(AuthRejection::ProtectedAccount);
    }
    Ok(())
}
