// src/models/prospect.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{history::UpdateHistory, text_enum};

text_enum! {
    pub enum EmploymentType {
        Employee => "Employee",
        Business => "Business",
    }
}

text_enum! {
    pub enum ProspectStatus {
        Pending => "Pending",
        OnVisit => "OnVisit",
        Progress => "Progress",
        Approved => "Approved",
        Rejected => "Rejected",
        UnderReview => "UnderReview",
        Completed => "Completed",
        Submitted => "Submitted",
        Cancelled => "Cancelled",
        RePending => "RePending",
        Postponed => "Postponed",
    }
}

/// An applicant undergoing field verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Prospect {
    pub uid: Uuid,

    #[schema(example = "P12345")]
    pub prospect_id: String,

    #[schema(example = "John Doe")]
    pub applicant_name: String,
    pub name_verified: bool,

    #[schema(example = "9876543210")]
    pub mobile_number: String,
    pub mobile_verified: bool,

    #[schema(example = "Male")]
    pub gender: String,

    #[schema(example = 30)]
    pub age: i32,

    #[schema(example = "123 Main Street")]
    pub residential_address: String,
    pub res_address_verified: bool,

    pub years_of_stay: i32,
    pub number_of_family_members: i32,

    pub reference_name: String,
    pub reference_relation: String,
    pub reference_mobile: String,

    pub employment_type: Option<EmploymentType>,

    pub office_address: String,
    pub off_address_verified: bool,
    pub years_in_current_office: i32,

    // Applicant's role at their employer, not an operator Role.
    #[schema(example = "Manager")]
    pub role: String,
    pub role_verified: bool,

    pub emp_id: String,
    pub emp_id_verified: bool,

    pub status: ProspectStatus,

    pub previous_experience: String,

    #[schema(example = 50000.0)]
    pub gross_salary: f64,

    #[schema(example = 40000.0)]
    pub net_salary: f64,

    pub colleague_name: String,
    pub colleague_designation: String,
    pub colleague_mobile: String,

    #[schema(example = json!(["image1.jpg", "image2.jpg"]))]
    pub uploaded_images: Vec<String>,

    pub remarks: String,

    pub created_by: String,
    pub created_time: DateTime<Utc>,
    pub updated_by: String,
    pub updated_time: DateTime<Utc>,
    pub update_history: Vec<UpdateHistory>,
}

/// Body of both create and update. On update this replaces every field of
/// the stored prospect except `status` when omitted.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ProspectPayload {
    #[schema(example = "P12345")]
    pub prospect_id: String,
    pub applicant_name: String,
    pub name_verified: bool,
    pub mobile_number: String,
    pub mobile_verified: bool,
    pub gender: String,

    #[validate(range(min = 0, message = "age cannot be negative"))]
    pub age: i32,

    pub residential_address: String,
    pub res_address_verified: bool,

    #[validate(range(min = 0, message = "years_of_stay cannot be negative"))]
    pub years_of_stay: i32,

    #[validate(range(min = 0, message = "number_of_family_members cannot be negative"))]
    pub number_of_family_members: i32,

    pub reference_name: String,
    pub reference_relation: String,
    pub reference_mobile: String,
    pub employment_type: Option<EmploymentType>,
    pub office_address: String,
    pub off_address_verified: bool,

    #[validate(range(min = 0, message = "years_in_current_office cannot be negative"))]
    pub years_in_current_office: i32,

    pub role: String,
    pub role_verified: bool,
    pub emp_id: String,
    pub emp_id_verified: bool,
    pub status: Option<ProspectStatus>,
    pub previous_experience: String,

    #[validate(range(min = 0.0, message = "gross_salary cannot be negative"))]
    pub gross_salary: f64,

    #[validate(range(min = 0.0, message = "net_salary cannot be negative"))]
    pub net_salary: f64,

    pub colleague_name: String,
    pub colleague_designation: String,
    pub colleague_mobile: String,
    pub uploaded_images: Vec<String>,
    pub remarks: String,
}

impl Prospect {
    /// Builds a new prospect; verification flags always start unset.
    pub fn from_payload(payload: ProspectPayload, actor: &str) -> Self {
        let created = UpdateHistory::new("Prospect created", actor);
        let now = created.timestamp;

        let mut prospect = Prospect {
            uid: Uuid::new_v4(),
            prospect_id: String::new(),
            applicant_name: String::new(),
            name_verified: false,
            mobile_number: String::new(),
            mobile_verified: false,
            gender: String::new(),
            age: 0,
            residential_address: String::new(),
            res_address_verified: false,
            years_of_stay: 0,
            number_of_family_members: 0,
            reference_name: String::new(),
            reference_relation: String::new(),
            reference_mobile: String::new(),
            employment_type: None,
            office_address: String::new(),
            off_address_verified: false,
            years_in_current_office: 0,
            role: String::new(),
            role_verified: false,
            emp_id: String::new(),
            emp_id_verified: false,
            status: payload.status.unwrap_or(ProspectStatus::Pending),
            previous_experience: String::new(),
            gross_salary: 0.0,
            net_salary: 0.0,
            colleague_name: String::new(),
            colleague_designation: String::new(),
            colleague_mobile: String::new(),
            uploaded_images: Vec::new(),
            remarks: String::new(),
            created_by: actor.to_string(),
            created_time: now,
            updated_by: actor.to_string(),
            updated_time: now,
            update_history: vec![created],
        };
        prospect.apply_details(payload);
        prospect
    }

    /// Overwrites every descriptive field, verification flags included.
    pub fn apply(&mut self, payload: ProspectPayload) {
        self.name_verified = payload.name_verified;
        self.mobile_verified = payload.mobile_verified;
        self.res_address_verified = payload.res_address_verified;
        self.off_address_verified = payload.off_address_verified;
        self.role_verified = payload.role_verified;
        self.emp_id_verified = payload.emp_id_verified;
        if let Some(status) = payload.status {
            self.status = status;
        }
        self.apply_details(payload);
    }

    fn apply_details(&mut self, payload: ProspectPayload) {
        self.prospect_id = payload.prospect_id;
        self.applicant_name = payload.applicant_name;
        self.mobile_number = payload.mobile_number;
        self.gender = payload.gender;
        self.age = payload.age;
        self.residential_address = payload.residential_address;
        self.years_of_stay = payload.years_of_stay;
        self.number_of_family_members = payload.number_of_family_members;
        self.reference_name = payload.reference_name;
        self.reference_relation = payload.reference_relation;
        self.reference_mobile = payload.reference_mobile;
        self.employment_type = payload.employment_type;
        self.office_address = payload.office_address;
        self.years_in_current_office = payload.years_in_current_office;
        self.role = payload.role;
        self.emp_id = payload.emp_id;
        self.previous_experience = payload.previous_experience;
        self.gross_salary = payload.gross_salary;
        self.net_salary = payload.net_salary;
        self.colleague_name = payload.colleague_name;
        self.colleague_designation = payload.colleague_designation;
        self.colleague_mobile = payload.colleague_mobile;
        self.uploaded_images = payload.uploaded_images;
        self.remarks = payload.remarks;
    }
}

/// `GET /prospects/count` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProspectCount {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_prospect_ignores_incoming_verification_flags() {
        let payload = ProspectPayload {
            prospect_id: "P1".into(),
            applicant_name: "Jane".into(),
            name_verified: true,
            emp_id_verified: true,
            ..Default::default()
        };
        let prospect = Prospect::from_payload(payload, "alice");

        assert!(!prospect.name_verified);
        assert!(!prospect.emp_id_verified);
        assert_eq!(prospect.status, ProspectStatus::Pending);
        assert_eq!(prospect.applicant_name, "Jane");
        assert_eq!(prospect.created_by, "alice");
        assert_eq!(prospect.update_history.len(), 1);
        assert_eq!(prospect.update_history[0].comment, "Prospect created");
    }

    #[test]
    fn apply_keeps_status_when_omitted() {
        let mut prospect = Prospect::from_payload(
            ProspectPayload { status: Some(ProspectStatus::OnVisit), ..Default::default() },
            "alice",
        );
        prospect.apply(ProspectPayload { applicant_name: "B".into(), ..Default::default() });
        assert_eq!(prospect.status, ProspectStatus::OnVisit);
        assert_eq!(prospect.applicant_name, "B");
    }

    #[test]
    fn payload_fields_all_default() {
        let payload: ProspectPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.status.is_none());
        assert!(payload.uploaded_images.is_empty());
    }
}
