use std::collections::BTreeMap;
use std::path::Path;

use calamine::{Data, Reader};

use crate::coerce::RawRecord;
use crate::error::{Result, ShepherdError};
use crate::keygen::synthesize_id;
use crate::models::{
    EmailPreference, FamilyRole, Gender, Group, GroupMember, GroupType, MaritalStatus, Person,
    PersonAddress, PersonPhone, RecordStatus,
};
use crate::package::Record;
use crate::progress::{LoopGuard, PhaseResult};

use super::{run_phase, ExportContext};

/// Department-derived groups all hang off one well-known group type.
const DEPARTMENTS_GROUP_TYPE_ID: i64 = 9998;

pub fn export(input_dir: &Path, ctx: &mut ExportContext) -> Result<Vec<PhaseResult>> {
    let mut results = Vec::new();
    let people = input_dir.join("people.xlsx");

    // Departments are discovered while streaming people, then flushed as
    // their own phase so the writer sees fully populated groups.
    let mut groups: BTreeMap<i64, Group> = BTreeMap::new();

    run_phase(&mut results, "Individuals", &people, ctx, |ctx, result| {
        export_people(&people, ctx, result, &mut groups)
    })?;
    run_phase(&mut results, "Groups", &people, ctx, |ctx, result| {
        export_groups(ctx, result, &groups)
    })?;

    Ok(results)
}

fn export_people(
    path: &Path,
    ctx: &mut ExportContext,
    result: &mut PhaseResult,
    groups: &mut BTreeMap<i64, Group>,
) -> Result<()> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| ShepherdError::Other(format!("failed to open XLSX: {e}")))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ShepherdError::Other("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ShepherdError::Other(format!("failed to read sheet {sheet}: {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(cell_to_string).collect())
        .unwrap_or_default();

    let mut guard = LoopGuard::new(ctx.loop_threshold);
    for (idx, row) in rows.enumerate() {
        ctx.cancel.check()?;
        guard.tick()?;
        let mut rec = RawRecord::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            rec.insert(header, &cell_to_string(cell));
        }
        match translate_person(&rec) {
            Some(person) => {
                for dept in departments(&rec) {
                    let Some(group_id) = synthesize_id(["elvanto-dept", dept.as_str()]) else {
                        continue;
                    };
                    let group = groups.entry(group_id).or_insert_with(|| Group {
                        id: group_id,
                        name: dept,
                        group_type_id: DEPARTMENTS_GROUP_TYPE_ID,
                        is_active: true,
                        ..Group::default()
                    });
                    group.members.push(GroupMember {
                        group_id,
                        person_id: person.id,
                        role: "Member".to_string(),
                    });
                }
                ctx.writer.write(&person.into())?;
                result.written += 1;
            }
            None => result.skip(&format!("row {}", idx + 2), "missing person ID"),
        }
        if (idx + 1) % 100 == 0 {
            ctx.progress.records("Individuals", (idx + 1) as u64);
        }
    }
    Ok(())
}

fn export_groups(
    ctx: &mut ExportContext,
    result: &mut PhaseResult,
    groups: &BTreeMap<i64, Group>,
) -> Result<()> {
    if groups.is_empty() {
        return Ok(());
    }
    ctx.writer.write(&Record::GroupType(GroupType {
        id: DEPARTMENTS_GROUP_TYPE_ID,
        name: "Departments".to_string(),
    }))?;
    for group in groups.values() {
        ctx.writer.write(&Record::Group(group.clone()))?;
        result.written += 1;
    }
    Ok(())
}

/// Elvanto person IDs are GUID strings, so the canonical integer id is
/// synthesized from the GUID — the same person maps to the same id on
/// every run.
pub fn translate_person(rec: &RawRecord) -> Option<Person> {
    let guid = rec.opt_string("id")?;
    let id = synthesize_id([guid.as_str()])?;
    let family_id = rec
        .opt_string("family id")
        .and_then(|f| synthesize_id([f.as_str()]))
        .or_else(|| synthesize_id(["elvanto-family", guid.as_str()]));

    let mut person = Person {
        id,
        family_id,
        family_role: FamilyRole::parse(&rec.string("family relationship")),
        first_name: rec.string("firstname"),
        nick_name: rec.opt_string("preferred name"),
        middle_name: rec.opt_string("middle name"),
        last_name: rec.string("lastname"),
        email: rec.opt_string("email"),
        email_preference: if rec.bool_or("unsubscribed", false) {
            EmailPreference::DoNotEmail
        } else {
            EmailPreference::EmailAllowed
        },
        gender: Gender::parse(&rec.string("gender")),
        marital_status: MaritalStatus::parse(&rec.string("marital status")),
        birthdate: rec.date("birthday"),
        anniversary_date: rec.date("anniversary"),
        record_status: RecordStatus::parse(&rec.string("status")),
        connection_status: rec.opt_string("status"),
        created_date_time: rec
            .datetime("date added")
            .or_else(|| rec.date("date added").and_then(|d| d.and_hms_opt(0, 0, 0))),
        ..Person::default()
    };

    for (column, phone_type, messaging) in
        [("mobile", "Mobile", true), ("phone", "Home", false)]
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

    let street = rec.string("address");
    if !street.is_empty() || !rec.string("city").is_empty() || !rec.string("postcode").is_empty() {
        person.addresses.push(PersonAddress {
            person_id: id,
            street1: street,
            street2: rec.opt_string("address 2"),
            city: rec.string("city"),
            state: rec.string("state"),
            postal_code: rec.string("postcode"),
            country: rec.opt_string("country"),
            is_mailing: true,
            ..PersonAddress::default()
        });
    }

    Some(person)
}

/// Departments arrive as one delimited cell: "Worship; Youth".
pub fn departments(rec: &RawRecord) -> Vec<String> {
    rec.string("departments")
        .split([';', ','])
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()),
        _ => String::new(),
    }
}

fn excel_serial_to_date(serial: f64) -> String {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30);
    match base {
        Some(base) => {
            let date = base + chrono::Duration::days(serial as i64);
            date.format("%Y-%m-%d").to_string()
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        let mut rec = RawRecord::new();
        for (k, v) in pairs {
            rec.insert(k, v);
        }
        rec
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), "2025-01-10");
    }

    #[test]
    fn cell_to_string_trims_whole_floats() {
        assert_eq!(cell_to_string(&Data::Float(123.0)), "123");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::String("  x  ".into())), "x");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn guid_ids_synthesize_deterministically() {
        let row = [
            ("ID", "a1b2c3d4-0000-1111-2222-333344445555"),
            ("Firstname", "Alex"),
            ("Lastname", "Greene"),
        ];
        let a = translate_person(&record(&row)).unwrap();
        let b = translate_person(&record(&row)).unwrap();
        assert_eq!(a.id, b.id);
        assert!(a.id > 0);
        assert!(a.family_id.is_some());
    }

    #[test]
    fn person_without_guid_is_skipped() {
        assert!(translate_person(&record(&[("Firstname", "Ghost")])).is_none());
    }

    #[test]
    fn family_relationship_maps_to_role() {
        let child = translate_person(&record(&[
            ("ID", "g1"),
            ("Family Relationship", "Child"),
        ]))
        .unwrap();
        assert_eq!(child.family_role, FamilyRole::Child);
        let head = translate_person(&record(&[
            ("ID", "g2"),
            ("Family Relationship", "Head"),
        ]))
        .unwrap();
        assert_eq!(head.family_role, FamilyRole::Adult);
    }

    #[test]
    fn departments_split_on_delimiters() {
        let rec = record(&[("Departments", "Worship; Youth, Kids Ministry")]);
        assert_eq!(departments(&rec), vec!["Worship", "Youth", "Kids Ministry"]);
        assert!(departments(&record(&[])).is_empty());
    }
}
