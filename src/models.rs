use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

// Canonical record model shared by every source connector. Serialized
// field order is the CSV column order of each output file, so field
// layout here is a compatibility surface — append, don't reorder.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Self::Male,
            "f" | "female" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaritalStatus {
    #[default]
    Unknown,
    Single,
    Married,
    Divorced,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Single => "Single",
            Self::Married => "Married",
            Self::Divorced => "Divorced",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "s" | "single" => Self::Single,
            "m" | "married" => Self::Married,
            "d" | "divorced" => Self::Divorced,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "inactive" | "false" | "no" | "0" => Self::Inactive,
            _ => Self::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FamilyRole {
    #[default]
    Adult,
    Child,
}

impl FamilyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adult => "Adult",
            Self::Child => "Child",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "child" | "c" => Self::Child,
            _ => Self::Adult,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailPreference {
    #[default]
    EmailAllowed,
    NoMassEmails,
    DoNotEmail,
}

impl EmailPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailAllowed => "EmailAllowed",
            Self::NoMassEmails => "NoMassEmails",
            Self::DoNotEmail => "DoNotEmail",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "no mass emails" | "nomassemails" => Self::NoMassEmails,
            "do not email" | "donotemail" | "none" => Self::DoNotEmail,
            _ => Self::EmailAllowed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressType {
    #[default]
    Home,
    Work,
    Previous,
    Other,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Work => "Work",
            Self::Previous => "Previous",
            Self::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "work" | "business" => Self::Work,
            "previous" | "prior" => Self::Previous,
            "other" => Self::Other,
            _ => Self::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchStatus {
    Open,
    #[default]
    Closed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "open" => Self::Open,
            _ => Self::Closed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionType {
    #[default]
    Contribution,
    EventRegistration,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contribution => "Contribution",
            Self::EventRegistration => "EventRegistration",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "event registration" | "eventregistration" | "registration" => Self::EventRegistration,
            _ => Self::Contribution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionSource {
    #[default]
    Unknown,
    Website,
    OnsiteCollection,
    BankChecks,
    Kiosk,
    MobileApplication,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Website => "Website",
            Self::OnsiteCollection => "OnsiteCollection",
            Self::BankChecks => "BankChecks",
            Self::Kiosk => "Kiosk",
            Self::MobileApplication => "MobileApplication",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "website" | "web" | "online" => Self::Website,
            "onsite" | "onsite collection" | "onsitecollection" | "offering" => {
                Self::OnsiteCollection
            }
            "bank checks" | "bankchecks" | "bank" => Self::BankChecks,
            "kiosk" => Self::Kiosk,
            "mobile" | "mobile application" | "mobileapplication" | "app" => {
                Self::MobileApplication
            }
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrencyType {
    #[default]
    Unknown,
    Cash,
    Check,
    CreditCard,
    Ach,
    NonCash,
}

impl CurrencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Cash => "Cash",
            Self::Check => "Check",
            Self::CreditCard => "CreditCard",
            Self::Ach => "ACH",
            Self::NonCash => "NonCash",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "cash" => Self::Cash,
            "check" | "chk" | "cheque" => Self::Check,
            "credit" | "credit card" | "creditcard" | "card" | "visa" | "mastercard" => {
                Self::CreditCard
            }
            "ach" | "eft" | "bank draft" | "electronic" => Self::Ach,
            "noncash" | "non-cash" | "non cash" | "in kind" | "in-kind" => Self::NonCash,
            _ => Self::Unknown,
        }
    }
}

/// Enums serialize as their `as_str` spelling, which is what the
/// destination importer expects in the CSV cells.
macro_rules! serialize_as_str {
    ($($ty:ty),+ $(,)?) => {$(
        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    )+};
}

serialize_as_str!(
    Gender,
    MaritalStatus,
    RecordStatus,
    FamilyRole,
    EmailPreference,
    AddressType,
    BatchStatus,
    TransactionType,
    TransactionSource,
    CurrencyType,
);

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    pub id: i64,
    pub family_id: Option<i64>,
    pub family_role: FamilyRole,
    pub first_name: String,
    pub nick_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub salutation: Option<String>,
    pub suffix: Option<String>,
    pub email: Option<String>,
    pub email_preference: EmailPreference,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub birthdate: Option<NaiveDate>,
    pub anniversary_date: Option<NaiveDate>,
    pub record_status: RecordStatus,
    pub inactive_reason: Option<String>,
    pub connection_status: Option<String>,
    pub give_individually: bool,
    pub campus_id: Option<i64>,
    pub campus_name: Option<String>,
    pub created_date_time: Option<NaiveDateTime>,
    pub modified_date_time: Option<NaiveDateTime>,
    pub note: Option<String>,
    #[serde(skip_serializing)]
    pub phones: Vec<PersonPhone>,
    #[serde(skip_serializing)]
    pub addresses: Vec<PersonAddress>,
    #[serde(skip_serializing)]
    pub attributes: Vec<PersonAttributeValue>,
}

impl Person {
    /// Append a line to the free-text note, used for source values that
    /// have no mapped column.
    pub fn append_note(&mut self, line: &str) {
        match &mut self.note {
            Some(n) => {
                n.push_str("; ");
                n.push_str(line);
            }
            None => self.note = Some(line.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PersonPhone {
    pub person_id: i64,
    pub phone_type: String,
    pub phone_number: String,
    pub is_messaging_enabled: bool,
    pub is_unlisted: bool,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PersonAddress {
    pub person_id: i64,
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: Option<String>,
    pub address_type: AddressType,
    pub is_mailing: bool,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PersonAttribute {
    pub key: String,
    pub name: String,
    pub category: Option<String>,
    pub field_type: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PersonAttributeValue {
    pub person_id: i64,
    pub attribute_key: String,
    pub attribute_value: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PersonNote {
    pub id: i64,
    pub person_id: i64,
    pub note_type: String,
    pub text: String,
    pub date_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct FamilyNote {
    pub id: i64,
    pub family_id: i64,
    pub note_type: String,
    pub text: String,
    pub date_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct GroupType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub group_type_id: i64,
    pub parent_group_id: Option<i64>,
    pub campus_id: Option<i64>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<String>,
    pub is_active: bool,
    pub is_public: bool,
    pub description: Option<String>,
    #[serde(skip_serializing)]
    pub members: Vec<GroupMember>,
    #[serde(skip_serializing)]
    pub addresses: Vec<GroupAddress>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct GroupMember {
    pub group_id: i64,
    pub person_id: i64,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct GroupAddress {
    pub group_id: i64,
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: Option<String>,
    pub address_type: AddressType,
    pub is_mailing: bool,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct FinancialAccount {
    pub id: i64,
    pub name: String,
    pub parent_account_id: Option<i64>,
    pub is_tax_deductible: bool,
    pub campus_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct FinancialBatch {
    pub id: i64,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: BatchStatus,
    pub created_by_person_id: Option<i64>,
    pub created_date_time: Option<NaiveDateTime>,
    pub modified_by_person_id: Option<i64>,
    pub modified_date_time: Option<NaiveDateTime>,
    #[serde(skip_serializing)]
    pub transactions: Vec<FinancialTransaction>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct FinancialTransaction {
    pub id: i64,
    pub batch_id: i64,
    pub authorized_person_id: Option<i64>,
    pub transaction_date: Option<NaiveDate>,
    pub transaction_type: TransactionType,
    pub transaction_source: TransactionSource,
    pub currency_type: CurrencyType,
    pub summary: Option<String>,
    pub transaction_code: Option<String>,
    #[serde(skip_serializing)]
    pub details: Vec<FinancialTransactionDetail>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct FinancialTransactionDetail {
    pub id: i64,
    pub transaction_id: i64,
    pub account_id: i64,
    pub amount: f64,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Attendance {
    pub attendance_id: i64,
    pub person_id: i64,
    pub group_id: Option<i64>,
    pub schedule_id: Option<i64>,
    pub location_id: Option<i64>,
    pub start_date_time: Option<NaiveDateTime>,
    pub end_date_time: Option<NaiveDateTime>,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_parse_is_case_insensitive_with_defaults() {
        assert_eq!(Gender::parse("FEMALE"), Gender::Female);
        assert_eq!(Gender::parse("m"), Gender::Male);
        assert_eq!(Gender::parse("?"), Gender::Unknown);
        assert_eq!(MaritalStatus::parse("Married"), MaritalStatus::Married);
        assert_eq!(MaritalStatus::parse("widowed"), MaritalStatus::Unknown);
        assert_eq!(FamilyRole::parse("Child"), FamilyRole::Child);
        assert_eq!(FamilyRole::parse("head of household"), FamilyRole::Adult);
        assert_eq!(RecordStatus::parse("Inactive"), RecordStatus::Inactive);
        assert_eq!(RecordStatus::parse(""), RecordStatus::Active);
    }

    #[test]
    fn transaction_source_defaults_to_unknown() {
        assert_eq!(
            TransactionSource::parse("Bogus Value"),
            TransactionSource::Unknown
        );
        assert_eq!(TransactionSource::parse("ONLINE"), TransactionSource::Website);
        assert_eq!(
            TransactionSource::parse("offering"),
            TransactionSource::OnsiteCollection
        );
    }

    #[test]
    fn currency_type_aliases() {
        assert_eq!(CurrencyType::parse("CHK"), CurrencyType::Check);
        assert_eq!(CurrencyType::parse("Visa"), CurrencyType::CreditCard);
        assert_eq!(CurrencyType::parse("EFT"), CurrencyType::Ach);
        assert_eq!(CurrencyType::parse("gold bars"), CurrencyType::Unknown);
        assert_eq!(CurrencyType::Ach.as_str(), "ACH");
    }

    #[test]
    fn append_note_accumulates() {
        let mut p = Person::default();
        p.append_note("Member since 1998");
        p.append_note("Choir");
        assert_eq!(p.note.as_deref(), Some("Member since 1998; Choir"));
    }
}
