// src/services/rbac.rs

//! The role hierarchy. Every "may X act on Y" decision in the crate goes
//! through these two tables.

use crate::{common::error::AppError, models::user::Role};

use Role::*;

/// Roles a caller may create or update.
pub fn manageable_roles(caller: Role) -> &'static [Role] {
    match caller {
        Owner => &[Admin, Owner, OperationsLead, OperationsExecutive, FieldLead, FieldExecutive],
        Admin => &[Admin, OperationsLead, FieldLead, FieldExecutive, OperationsExecutive],
        OperationsLead => &[OperationsLead, FieldLead, FieldExecutive, OperationsExecutive],
        OperationsExecutive => &[FieldLead, FieldExecutive, OperationsExecutive],
        FieldLead | FieldExecutive => &[],
    }
}

/// Roles whose password a caller may set.
pub fn password_roles(caller: Role) -> &'static [Role] {
    match caller {
        Owner | Admin => &[Admin, OperationsLead],
        OperationsLead => &[OperationsLead, FieldLead, FieldExecutive, OperationsExecutive],
        OperationsExecutive | FieldLead | FieldExecutive => &[],
    }
}

pub fn can_manage(caller: Role, target: Role) -> bool {
    manageable_roles(caller).contains(&target)
}

pub fn can_set_password(caller: Role, target: Role) -> bool {
    password_roles(caller).contains(&target)
}

pub fn ensure_can_manage(caller: Role, target: Role) -> Result<(), AppError> {
    if can_manage(caller, target) {
        Ok(())
    } else {
        tracing::warn!(caller = %caller, target = %target, "role management denied");
        Err(AppError::Forbidden(format!("{caller} cannot manage {target} users")))
    }
}

pub fn ensure_can_set_password(caller: Role, target: Role) -> Result<(), AppError> {
    if can_set_password(caller, target) {
        Ok(())
    } else {
        tracing::warn!(caller = %caller, target = %target, "password change denied");
        Err(AppError::Forbidden(format!(
            "{caller} cannot set the password of {target} users"
        )))
    }
}
