// src/common/audit.rs

use std::fmt::Display;

use crate::models::{
    prospect::{EmploymentType, Prospect, ProspectPayload, ProspectStatus},
    user::{Role, UpdateUserPayload, User, UserStatus},
};

/// Whether an incoming value counts as "provided". A change to a value that
/// is not provided (empty string, zero, empty list, `None`) is applied but
/// not recorded.
pub trait Provided {
    fn is_provided(&self) -> bool;
}

impl Provided for String {
    fn is_provided(&self) -> bool {
        !self.is_empty()
    }
}

impl Provided for i32 {
    fn is_provided(&self) -> bool {
        *self != 0
    }
}

impl Provided for f64 {
    fn is_provided(&self) -> bool {
        *self != 0.0
    }
}

impl Provided for bool {
    fn is_provided(&self) -> bool {
        true
    }
}

impl<T> Provided for Vec<T> {
    fn is_provided(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Provided for Option<T> {
    fn is_provided(&self) -> bool {
        self.is_some()
    }
}

macro_rules! always_provided {
    ($($ty:ty),+) => {
        $(impl Provided for $ty {
            fn is_provided(&self) -> bool {
                true
            }
        })+
    };
}

always_provided!(Role, UserStatus, ProspectStatus, EmploymentType);

/// Accumulates the human-readable descriptions of one update.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChangeLog {
    entries: Vec<String>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `"<label> updated"`.
    pub fn field<T>(&mut self, label: &str, old: &T, new: &T) -> &mut Self
    where
        T: PartialEq + Provided + ?Sized,
    {
        if old != new && new.is_provided() {
            self.entries.push(format!("{label} updated"));
        }
        self
    }

    /// Records `"<label> changed from 'X' to 'Y'"`.
    pub fn field_from_to<T>(&mut self, label: &str, old: &T, new: &T) -> &mut Self
    where
        T: PartialEq + Provided + Display + ?Sized,
    {
        if old != new && new.is_provided() {
            self.entries.push(format!("{label} changed from '{old}' to '{new}'"));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The comment stored in the history entry.
    pub fn summary(&self) -> String {
        self.entries.join(", ")
    }
}

/// Diffs a stored prospect against the replacement payload.
pub fn prospect_changes(old: &Prospect, new: &ProspectPayload) -> ChangeLog {
    let mut log = ChangeLog::new();
    log.field("ProspectId", &old.prospect_id, &new.prospect_id)
        .field("ApplicantName", &old.applicant_name, &new.applicant_name)
        .field("MobileNumber", &old.mobile_number, &new.mobile_number)
        .field("Gender", &old.gender, &new.gender)
        .field("Age", &old.age, &new.age)
        .field("ResidentialAddress", &old.residential_address, &new.residential_address)
        .field("YearsOfStay", &old.years_of_stay, &new.years_of_stay)
        .field(
            "NumberOfFamilyMembers",
            &old.number_of_family_members,
            &new.number_of_family_members,
        )
        .field("ReferenceName", &old.reference_name, &new.reference_name)
        .field("ReferenceRelation", &old.reference_relation, &new.reference_relation)
        .field("ReferenceMobile", &old.reference_mobile, &new.reference_mobile)
        .field("EmploymentType", &old.employment_type, &new.employment_type)
        .field("OfficeAddress", &old.office_address, &new.office_address)
        .field(
            "YearsInCurrentOffice",
            &old.years_in_current_office,
            &new.years_in_current_office,
        )
        .field("Role", &old.role, &new.role)
        .field("EmpId", &old.emp_id, &new.emp_id)
        .field("Status", &Some(old.status), &new.status)
        .field("PreviousExperience", &old.previous_experience, &new.previous_experience)
        .field("GrossSalary", &old.gross_salary, &new.gross_salary)
        .field("NetSalary", &old.net_salary, &new.net_salary)
        .field("ColleagueName", &old.colleague_name, &new.colleague_name)
        .field("ColleagueDesignation", &old.colleague_designation, &new.colleague_designation)
        .field("ColleagueMobile", &old.colleague_mobile, &new.colleague_mobile)
        .field("UploadedImages", &old.uploaded_images, &new.uploaded_images)
        .field("Remarks", &old.remarks, &new.remarks)
        // Verification flags carry the labels the field team reads on screen.
        .field("NameVerified", &old.name_verified, &new.name_verified)
        .field("MobileVerified", &old.mobile_verified, &new.mobile_verified)
        .field("Residential Address", &old.res_address_verified, &new.res_address_verified)
        .field("Office Address", &old.off_address_verified, &new.off_address_verified)
        .field("Role / Business", &old.role_verified, &new.role_verified)
        .field("Employee Id / Business Id", &old.emp_id_verified, &new.emp_id_verified);
    log
}

/// Diffs a stored user against the replacement payload.
pub fn user_changes(old: &User, new: &UpdateUserPayload) -> ChangeLog {
    let mut log = ChangeLog::new();
    log.field_from_to("user id", &old.user_id, &new.user_id)
        .field_from_to("user name", &old.username, &new.username)
        .field_from_to("role", &old.role, &new.role)
        .field_from_to("status", &old.status, &new.status)
        .field_from_to("remarks", &old.remarks, &new.remarks)
        .field_from_to("mobile number", &old.mobile_number, &new.mobile_number);
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{history::now, organisation::OrganisationStatus};
    use uuid::Uuid;

    fn prospect(applicant_name: &str) -> Prospect {
        Prospect::from_payload(
            ProspectPayload {
                prospect_id: "P1".into(),
                applicant_name: applicant_name.into(),
                age: 30,
                ..Default::default()
            },
            "alice",
        )
    }

    fn same_as(p: &Prospect) -> ProspectPayload {
        ProspectPayload {
            prospect_id: p.prospect_id.clone(),
            applicant_name: p.applicant_name.clone(),
            age: p.age,
            status: Some(p.status),
            ..Default::default()
        }
    }

    fn user() -> User {
        User {
            uid: Uuid::new_v4(),
            user_id: "112345".into(),
            username: "bob".into(),
            password_hash: String::new(),
            role: Role::FieldLead,
            status: UserStatus::Active,
            mobile_number: "9876543210".into(),
            org_uuid: Uuid::new_v4(),
            org_status: OrganisationStatus::Active,
            remarks: String::new(),
            created_time: now(),
            updated_time: now(),
            update_history: vec![],
        }
    }

    fn unchanged(u: &User) -> UpdateUserPayload {
        UpdateUserPayload {
            user_id: u.user_id.clone(),
            username: u.username.clone(),
            role: u.role,
            status: u.status,
            mobile_number: u.mobile_number.clone(),
            remarks: u.remarks.clone(),
        }
    }

    #[test]
    fn identical_payload_records_nothing() {
        let old = prospect("A");
        let log = prospect_changes(&old, &same_as(&old));
        assert!(log.is_empty(), "{:?}", log.entries());
        assert_eq!(log.summary(), "");
    }

    #[test]
    fn changed_name_is_recorded() {
        let old = prospect("A");
        let new = ProspectPayload { applicant_name: "B".into(), ..same_as(&old) };
        assert_eq!(prospect_changes(&old, &new).summary(), "ApplicantName updated");
    }

    #[test]
    fn clearing_a_field_is_silent() {
        let old = prospect("A");
        let new = ProspectPayload { applicant_name: String::new(), age: 0, ..same_as(&old) };
        assert!(prospect_changes(&old, &new).is_empty());
    }

    #[test]
    fn omitted_status_is_not_a_change() {
        let old = prospect("A");
        let new = ProspectPayload { status: None, ..same_as(&old) };
        assert!(prospect_changes(&old, &new).is_empty());

        let new = ProspectPayload { status: Some(ProspectStatus::OnVisit), ..same_as(&old) };
        assert_eq!(prospect_changes(&old, &new).summary(), "Status updated");
    }

    #[test]
    fn flag_changes_record_both_directions() {
        let mut old = prospect("A");
        let set = ProspectPayload { emp_id_verified: true, name_verified: true, ..same_as(&old) };
        assert_eq!(
            prospect_changes(&old, &set).summary(),
            "NameVerified updated, Employee Id / Business Id updated"
        );

        old.res_address_verified = true;
        assert_eq!(
            prospect_changes(&old, &same_as(&old)).summary(),
            "Residential Address updated"
        );
    }

    #[test]
    fn entries_follow_field_order() {
        let old = prospect("A");
        let new = ProspectPayload {
            applicant_name: "B".into(),
            gross_salary: 1200.5,
            uploaded_images: vec!["a.jpg".into()],
            employment_type: Some(EmploymentType::Business),
            ..same_as(&old)
        };
        assert_eq!(
            prospect_changes(&old, &new).entries(),
            [
                "ApplicantName updated",
                "EmploymentType updated",
                "GrossSalary updated",
                "UploadedImages updated",
            ]
        );
    }

    #[test]
    fn user_changes_describe_old_and_new() {
        let old = user();
        let new = UpdateUserPayload { role: Role::OperationsLead, remarks: "promoted".into(), ..unchanged(&old) };
        assert_eq!(
            user_changes(&old, &new).summary(),
            "role changed from 'Field Lead' to 'Operations Lead', remarks changed from '' to 'promoted'"
        );
    }

    #[test]
    fn unchanged_user_records_nothing() {
        let old = user();
        assert!(user_changes(&old, &unchanged(&old)).is_empty());
    }
}
