use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;

use crate::coerce::RawRecord;
use crate::error::Result;
use crate::keygen::synthesize_id;
use crate::models::{
    Attendance, BatchStatus, CurrencyType, EmailPreference, FamilyRole, FinancialAccount,
    FinancialBatch, FinancialTransaction, FinancialTransactionDetail, Gender, Group, GroupMember,
    GroupType, MaritalStatus, Person, PersonAddress, PersonAttribute, PersonAttributeValue,
    PersonPhone, RecordStatus, TransactionSource, TransactionType,
};
use crate::package::Record;
use crate::progress::{LoopGuard, PhaseResult};

use super::{run_dir_phase, run_phase, ExportContext};

/// Tag-derived groups all hang off one well-known group type.
const TAGS_GROUP_TYPE_ID: i64 = 9999;

/// people.csv columns with a dedicated mapping; everything else becomes a
/// person attribute.
const MAPPED_PERSON_COLUMNS: &[&str] = &[
    "breeze id",
    "first name",
    "last name",
    "middle name",
    "nickname",
    "gender",
    "status",
    "marital status",
    "birthdate",
    "anniversary",
    "family",
    "family id",
    "family role",
    "email",
    "email preference",
    "opt out",
    "mobile",
    "home",
    "work",
    "street address",
    "city",
    "state",
    "zip",
    "campus",
    "added date",
];

pub fn export(input_dir: &Path, ctx: &mut ExportContext) -> Result<Vec<PhaseResult>> {
    let mut results = Vec::new();

    let people = input_dir.join("people.csv");
    run_phase(&mut results, "Individuals", &people, ctx, |ctx, result| {
        export_people(&people, ctx, result)
    })?;

    let giving = input_dir.join("giving.csv");
    run_phase(&mut results, "Financial", &giving, ctx, |ctx, result| {
        export_giving(&giving, ctx, result)
    })?;

    let tags = input_dir.join("tags.csv");
    run_phase(&mut results, "Groups", &tags, ctx, |ctx, result| {
        export_tags(&tags, ctx, result)
    })?;

    // Attendance exports are rare enough that a missing file is not
    // worth a failed phase in the summary.
    let attendance = input_dir.join("attendance.csv");
    if attendance.is_file() {
        run_phase(&mut results, "Attendance", &attendance, ctx, |ctx, result| {
            export_attendance(&attendance, ctx, result)
        })?;
    }

    let photos = input_dir.join("photos");
    if ctx.include_images && photos.is_dir() {
        run_dir_phase(&mut results, "Photos", "photos/", ctx, |ctx, result| {
            export_photos(&photos, ctx, result)
        })?;
    }

    Ok(results)
}

/// Profile photos ride next to the CSV exports as photos/<Breeze ID>.jpg;
/// they land in the sibling image archives keyed by the same person id.
fn export_photos(dir: &Path, ctx: &mut ExportContext, result: &mut PhaseResult) -> Result<()> {
    let mut files: Vec<std::path::PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map_or(false, |e| e.eq_ignore_ascii_case("jpg"))
        })
        .collect();
    files.sort();

    let mut guard = LoopGuard::new(ctx.loop_threshold);
    for path in files {
        ctx.cancel.check()?;
        guard.tick()?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        match stem.parse::<i64>() {
            Ok(person_id) => {
                let bytes = std::fs::read(&path)?;
                ctx.writer.write_image(person_id, &bytes)?;
                result.written += 1;
            }
            Err(_) => result.skip(&stem, "photo filename is not a Breeze ID"),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Individuals
// ---------------------------------------------------------------------------

fn export_people(path: &Path, ctx: &mut ExportContext, result: &mut PhaseResult) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    // The attribute schema falls out of the header row alone, so it can
    // be written before any values that reference it.
    for column in unmapped_columns(&headers) {
        ctx.writer.write(&Record::PersonAttribute(PersonAttribute {
            key: slug(&column),
            name: column.clone(),
            category: Some("Breeze".to_string()),
            field_type: "Text".to_string(),
        }))?;
    }

    let mut guard = LoopGuard::new(ctx.loop_threshold);
    for (idx, row) in reader.records().enumerate() {
        ctx.cancel.check()?;
        guard.tick()?;
        let line = idx + 2;
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                result.skip(&format!("line {line}"), &e.to_string());
                continue;
            }
        };
        let rec = RawRecord::from_csv(&headers, &row);
        match translate_person(&rec) {
            Some(person) => {
                ctx.writer.write(&person.into())?;
                result.written += 1;
            }
            None => result.skip(&format!("line {line}"), "missing or unparsable Breeze ID"),
        }
        if (idx + 1) % 100 == 0 {
            ctx.progress.records("Individuals", (idx + 1) as u64);
        }
    }
    Ok(())
}

/// Map one people.csv row to a Person. Returns None when the row has no
/// usable Breeze ID.
pub fn translate_person(rec: &RawRecord) -> Option<Person> {
    let id = rec.opt_i64("breeze id")?;

    let family_id = rec
        .opt_i64("family id")
        .or_else(|| {
            rec.opt_string("family")
                .and_then(|name| synthesize_id(["breeze-family", name.as_str()]))
        })
        // Unparented individuals get a generated single-person family.
        .or_else(|| synthesize_id(["breeze-family", id.to_string().as_str()]));

    let status = rec.opt_string("status");
    let campus_name = rec.opt_string("campus");
    let campus_id = campus_name
        .as_deref()
        .and_then(|name| synthesize_id(["breeze-campus", name]));

    let mut person = Person {
        id,
        family_id,
        family_role: FamilyRole::parse(&rec.string("family role")),
        first_name: rec.string("first name"),
        nick_name: rec.opt_string("nickname"),
        middle_name: rec.opt_string("middle name"),
        last_name: rec.string("last name"),
        email: rec.opt_string("email"),
        email_preference: match rec.opt_string("email preference") {
            Some(pref) => EmailPreference::parse(&pref),
            None if rec.bool_or("opt out", false) => EmailPreference::NoMassEmails,
            None => EmailPreference::EmailAllowed,
        },
        gender: Gender::parse(&rec.string("gender")),
        marital_status: MaritalStatus::parse(&rec.string("marital status")),
        birthdate: rec.date("birthdate"),
        anniversary_date: rec.date("anniversary"),
        record_status: RecordStatus::parse(&rec.string("status")),
        connection_status: status,
        campus_id,
        campus_name,
        created_date_time: rec
            .datetime("added date")
            .or_else(|| rec.date("added date").and_then(|d| d.and_hms_opt(0, 0, 0))),
        ..Person::default()
    };

    for (column, phone_type, messaging) in
        [("mobile", "Mobile", true), ("home", "Home", false), ("work", "Work", false)]
    {
        if let Some(number) = rec.opt_string(column) {
            person.phones.push(PersonPhone {
                person_id: id,
                phone_type: phone_type.to_string(),
                phone_number: number,
                is_messaging_enabled: messaging,
                is_unlisted: false,
            });
        }
    }

    let street = rec.string("street address");
    if !street.is_empty() || !rec.string("city").is_empty() || !rec.string("zip").is_empty() {
        person.addresses.push(PersonAddress {
            person_id: id,
            street1: street,
            city: rec.string("city"),
            state: rec.string("state"),
            postal_code: rec.string("zip"),
            is_mailing: true,
            ..PersonAddress::default()
        });
    }

    let mut extras: Vec<(String, String)> = rec
        .keys()
        .filter(|k| !MAPPED_PERSON_COLUMNS.contains(k))
        .filter_map(|k| rec.opt_string(k).map(|v| (k.to_string(), v)))
        .collect();
    extras.sort();
    for (key, value) in extras {
        person.attributes.push(PersonAttributeValue {
            person_id: id,
            attribute_key: slug(&key),
            attribute_value: value,
        });
    }

    Some(person)
}

fn unmapped_columns(headers: &csv::StringRecord) -> Vec<String> {
    headers
        .iter()
        .map(str::trim)
        .filter(|h| !h.is_empty() && !MAPPED_PERSON_COLUMNS.contains(&h.to_lowercase().as_str()))
        .map(String::from)
        .collect()
}

fn slug(header: &str) -> String {
    let re = Regex::new("[^a-z0-9]+").unwrap();
    re.replace_all(&header.to_lowercase(), "_")
        .trim_matches('_')
        .to_string()
}

// ---------------------------------------------------------------------------
// Financial
// ---------------------------------------------------------------------------

/// Cross-row state for the giving phase: funds and batches are discovered
/// while streaming rows and flushed once the file is done, so the writer
/// always sees fully populated batches.
#[derive(Default)]
pub struct GivingAccumulator {
    pub accounts: BTreeMap<String, FinancialAccount>,
    pub batches: BTreeMap<i64, FinancialBatch>,
}

fn export_giving(path: &Path, ctx: &mut ExportContext, result: &mut PhaseResult) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let mut acc = GivingAccumulator::default();

    let mut guard = LoopGuard::new(ctx.loop_threshold);
    for (idx, row) in reader.records().enumerate() {
        ctx.cancel.check()?;
        guard.tick()?;
        let line = idx + 2;
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                result.skip(&format!("line {line}"), &e.to_string());
                continue;
            }
        };
        let rec = RawRecord::from_csv(&headers, &row);
        match translate_contribution(&rec, &mut acc) {
            Some(_) => result.written += 1,
            None => result.skip(&format!("line {line}"), "missing date or amount"),
        }
        if (idx + 1) % 100 == 0 {
            ctx.progress.records("Financial", (idx + 1) as u64);
        }
    }

    for account in acc.accounts.values() {
        ctx.writer.write(&Record::FinancialAccount(account.clone()))?;
    }
    for batch in acc.batches.values() {
        result.amount += batch
            .transactions
            .iter()
            .flat_map(|t| &t.details)
            .map(|d| d.amount)
            .sum::<f64>();
        ctx.writer.write(&Record::FinancialBatch(batch.clone()))?;
    }
    Ok(())
}

/// Fold one giving.csv row into the accumulator. Returns the synthesized
/// transaction id, or None when the row lacks a date or an amount.
pub fn translate_contribution(rec: &RawRecord, acc: &mut GivingAccumulator) -> Option<i64> {
    let date = rec.date("date")?;
    let amount = rec.opt_amount("amount")?;
    let person_id = rec.opt_i64("person id");

    let fund = rec
        .opt_string("fund(s)")
        .or_else(|| rec.opt_string("fund"))
        .unwrap_or_else(|| "General Fund".to_string());
    let account_id = synthesize_id(["breeze-fund", fund.as_str()])?;
    acc.accounts
        .entry(fund.clone())
        .or_insert_with(|| FinancialAccount {
            id: account_id,
            name: fund.clone(),
            parent_account_id: None,
            is_tax_deductible: true,
            campus_id: None,
        });

    let date_str = date.to_string();
    let batch_label = rec
        .opt_string("batch")
        .unwrap_or_else(|| format!("Contributions {date_str}"));
    let batch_id = synthesize_id(["breeze-batch", batch_label.as_str()])?;
    let batch = acc.batches.entry(batch_id).or_insert_with(|| FinancialBatch {
        id: batch_id,
        name: batch_label,
        status: BatchStatus::Closed,
        ..FinancialBatch::default()
    });
    batch.start_date = Some(batch.start_date.map_or(date, |d| d.min(date)));
    batch.end_date = Some(batch.end_date.map_or(date, |d| d.max(date)));

    let currency = CurrencyType::parse(&rec.string("method of payment"));
    // An explicit Source column wins; otherwise card/ACH gifts came in
    // through online giving and everything else through the plate.
    let source = match rec.opt_string("source") {
        Some(s) => TransactionSource::parse(&s),
        None => match currency {
            CurrencyType::CreditCard | CurrencyType::Ach => TransactionSource::Website,
            _ => TransactionSource::OnsiteCollection,
        },
    };
    let check_no = rec.opt_string("check number");
    let person_part = person_id.map(|p| p.to_string()).unwrap_or_default();
    let amount_part = format!("{amount:.2}");
    let txn_id = synthesize_id([
        "breeze-txn",
        person_part.as_str(),
        date_str.as_str(),
        amount_part.as_str(),
        check_no.as_deref().unwrap_or(""),
        fund.as_str(),
    ])?;

    batch.transactions.push(FinancialTransaction {
        id: txn_id,
        batch_id,
        authorized_person_id: person_id,
        transaction_date: Some(date),
        transaction_type: TransactionType::parse(&rec.string("type")),
        transaction_source: source,
        currency_type: currency,
        summary: rec.opt_string("note"),
        transaction_code: check_no,
        details: vec![FinancialTransactionDetail {
            id: txn_id,
            transaction_id: txn_id,
            account_id,
            amount,
            summary: None,
        }],
    });
    Some(txn_id)
}

// ---------------------------------------------------------------------------
// Groups (tags)
// ---------------------------------------------------------------------------

fn export_tags(path: &Path, ctx: &mut ExportContext, result: &mut PhaseResult) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    ctx.writer.write(&Record::GroupType(GroupType {
        id: TAGS_GROUP_TYPE_ID,
        name: "Tags".to_string(),
    }))?;

    let mut groups: BTreeMap<i64, Group> = BTreeMap::new();
    let mut guard = LoopGuard::new(ctx.loop_threshold);
    for (idx, row) in reader.records().enumerate() {
        ctx.cancel.check()?;
        guard.tick()?;
        let line = idx + 2;
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                result.skip(&format!("line {line}"), &e.to_string());
                continue;
            }
        };
        let rec = RawRecord::from_csv(&headers, &row);
        match translate_tag(&rec, &mut groups) {
            Some(_) => result.written += 1,
            None => result.skip(&format!("line {line}"), "missing tag name or person id"),
        }
    }

    for group in groups.values() {
        ctx.writer.write(&Record::Group(group.clone()))?;
    }
    Ok(())
}

/// Fold one tags.csv row into the group accumulator. A tag name becomes a
/// group with a content-derived id, so the same tag always maps to the
/// same group across runs.
pub fn translate_tag(rec: &RawRecord, groups: &mut BTreeMap<i64, Group>) -> Option<i64> {
    let tag = rec.opt_string("tag")?;
    let person_id = rec.opt_i64("person id")?;
    let group_id = synthesize_id(["breeze-tag", tag.as_str()])?;
    let group = groups.entry(group_id).or_insert_with(|| Group {
        id: group_id,
        name: tag,
        group_type_id: TAGS_GROUP_TYPE_ID,
        is_active: true,
        is_public: false,
        ..Group::default()
    });
    group.members.push(GroupMember {
        group_id,
        person_id,
        role: "Member".to_string(),
    });
    Some(group_id)
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

fn export_attendance(path: &Path, ctx: &mut ExportContext, result: &mut PhaseResult) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut guard = LoopGuard::new(ctx.loop_threshold);
    for (idx, row) in reader.records().enumerate() {
        ctx.cancel.check()?;
        guard.tick()?;
        let line = idx + 2;
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                result.skip(&format!("line {line}"), &e.to_string());
                continue;
            }
        };
        let rec = RawRecord::from_csv(&headers, &row);
        match translate_attendance(&rec) {
            Some(attendance) => {
                ctx.writer.write(&Record::Attendance(attendance))?;
                result.written += 1;
            }
            None => result.skip(&format!("line {line}"), "missing date or person id"),
        }
    }
    Ok(())
}

/// Check-ins reference the tag-derived group of the event they belong to,
/// so the synthesized group id must use the same derivation as the tags
/// phase.
pub fn translate_attendance(rec: &RawRecord) -> Option<Attendance> {
    let person_id = rec.opt_i64("person id")?;
    let date = rec.date("date")?;
    let event = rec.opt_string("event");
    let group_id = event
        .as_deref()
        .and_then(|name| synthesize_id(["breeze-tag", name]));

    let date_str = date.to_string();
    let attendance_id = synthesize_id([
        "breeze-attendance",
        person_id.to_string().as_str(),
        date_str.as_str(),
        event.as_deref().unwrap_or(""),
    ])?;

    Some(Attendance {
        attendance_id,
        person_id,
        group_id,
        start_date_time: rec
            .datetime("date")
            .or_else(|| date.and_hms_opt(0, 0, 0)),
        note: event,
        ..Attendance::default()
    })
}
