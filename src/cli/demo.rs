use std::path::PathBuf;

use chrono::NaiveDate;
use colored::Colorize;

use crate::error::Result;
use crate::fmt;
use crate::keygen::synthesize_id;
use crate::models::{
    BatchStatus, CurrencyType, FamilyRole, FinancialAccount, FinancialBatch, FinancialTransaction,
    FinancialTransactionDetail, Gender, Group, GroupMember, GroupType, Person, PersonAddress,
    PersonPhone, TransactionSource, TransactionType,
};
use crate::package::{PackageWriter, Record};

struct DemoPerson {
    id: i64,
    family: i64,
    role: FamilyRole,
    first: &'static str,
    last: &'static str,
    gender: Gender,
    email: &'static str,
    mobile: &'static str,
}

const PEOPLE: &[DemoPerson] = &[
    DemoPerson { id: 1, family: 10, role: FamilyRole::Adult, first: "Ted", last: "Decker", gender: Gender::Male, email: "ted@example.com", mobile: "(555) 867-5309" },
    DemoPerson { id: 2, family: 10, role: FamilyRole::Adult, first: "Cindy", last: "Decker", gender: Gender::Female, email: "cindy@example.com", mobile: "(555) 867-5310" },
    DemoPerson { id: 3, family: 10, role: FamilyRole::Child, first: "Noah", last: "Decker", gender: Gender::Male, email: "", mobile: "" },
    DemoPerson { id: 4, family: 11, role: FamilyRole::Adult, first: "Sarah", last: "Simmons", gender: Gender::Female, email: "sarah@example.com", mobile: "(555) 867-5320" },
];

// (person, date, amount, fund, method)
const GIVING: &[(i64, (i32, u32, u32), f64, &str, &str)] = &[
    (1, (2025, 1, 5), 250.00, "General Fund", "Check"),
    (2, (2025, 1, 5), 100.00, "Building Fund", "Cash"),
    (4, (2025, 1, 12), 75.00, "General Fund", "Credit Card"),
    (1, (2025, 1, 12), 250.00, "General Fund", "Check"),
];

const TAGS: &[(&str, i64)] = &[
    ("Young Adults", 4),
    ("Choir", 2),
    ("Choir", 4),
];

pub fn run(output: Option<&str>) -> Result<()> {
    let output_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("demo.slingshot"));
    let work_dir = crate::settings::get_data_dir().join("demo-work");
    let mut writer = PackageWriter::create(&work_dir)?;

    for p in PEOPLE {
        let mut person = Person {
            id: p.id,
            family_id: Some(p.family),
            family_role: p.role,
            first_name: p.first.to_string(),
            last_name: p.last.to_string(),
            gender: p.gender,
            email: if p.email.is_empty() {
                None
            } else {
                Some(p.email.to_string())
            },
            ..Person::default()
        };
        if !p.mobile.is_empty() {
            person.phones.push(PersonPhone {
                person_id: p.id,
                phone_type: "Mobile".to_string(),
                phone_number: p.mobile.to_string(),
                is_messaging_enabled: true,
                is_unlisted: false,
            });
        }
        person.addresses.push(PersonAddress {
            person_id: p.id,
            street1: "11624 N 31st Dr".to_string(),
            city: "Phoenix".to_string(),
            state: "AZ".to_string(),
            postal_code: "85029".to_string(),
            is_mailing: true,
            ..PersonAddress::default()
        });
        writer.write(&person.into())?;
    }

    let mut funds: Vec<&str> = GIVING.iter().map(|g| g.3).collect();
    funds.sort();
    funds.dedup();
    for fund in &funds {
        if let Some(id) = synthesize_id(["demo-fund", *fund]) {
            writer.write(&Record::FinancialAccount(FinancialAccount {
                id,
                name: fund.to_string(),
                is_tax_deductible: true,
                ..FinancialAccount::default()
            }))?;
        }
    }

    let mut batch = FinancialBatch {
        id: 1,
        name: "Demo Contributions".to_string(),
        status: BatchStatus::Closed,
        ..FinancialBatch::default()
    };
    let mut total = 0.0;
    for (idx, (person, (y, m, d), amount, fund, method)) in GIVING.iter().enumerate() {
        let txn_id = 100 + idx as i64;
        let date = NaiveDate::from_ymd_opt(*y, *m, *d);
        batch.start_date = batch.start_date.min(date).or(date);
        batch.end_date = batch.end_date.max(date);
        total += amount;
        batch.transactions.push(FinancialTransaction {
            id: txn_id,
            batch_id: batch.id,
            authorized_person_id: Some(*person),
            transaction_date: date,
            transaction_type: TransactionType::Contribution,
            transaction_source: TransactionSource::OnsiteCollection,
            currency_type: CurrencyType::parse(method),
            details: vec![FinancialTransactionDetail {
                id: txn_id,
                transaction_id: txn_id,
                account_id: synthesize_id(["demo-fund", *fund]).unwrap_or_default(),
                amount: *amount,
                summary: None,
            }],
            ..FinancialTransaction::default()
        });
    }
    writer.write(&batch.into())?;

    writer.write(&Record::GroupType(GroupType {
        id: 9999,
        name: "Tags".to_string(),
    }))?;
    let mut tags: Vec<&str> = TAGS.iter().map(|t| t.0).collect();
    tags.sort();
    tags.dedup();
    for tag in tags {
        let Some(group_id) = synthesize_id(["demo-tag", tag]) else {
            continue;
        };
        let mut group = Group {
            id: group_id,
            name: tag.to_string(),
            group_type_id: 9999,
            is_active: true,
            ..Group::default()
        };
        for (_, person) in TAGS.iter().filter(|(name, _)| *name == tag) {
            group.members.push(GroupMember {
                group_id,
                person_id: *person,
                role: "Member".to_string(),
            });
        }
        writer.write(&group.into())?;
    }

    let summary = writer.finalize(&output_path)?;
    println!(
        "{} {} ({} files, {} sample contributions totaling {})",
        "Wrote".green(),
        summary.package_path.display(),
        summary.entries.len(),
        GIVING.len(),
        fmt::money(total)
    );
    Ok(())
}
