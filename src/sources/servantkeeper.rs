use std::collections::BTreeMap;
use std::path::Path;

use crate::coerce::RawRecord;
use crate::error::Result;
use crate::keygen::synthesize_id;
use crate::models::{
    AddressType, BatchStatus, CurrencyType, FamilyNote, FamilyRole, FinancialAccount,
    FinancialBatch, FinancialTransaction, FinancialTransactionDetail, Gender, MaritalStatus,
    Person, PersonAddress, PersonAttribute, PersonAttributeValue, PersonNote, PersonPhone,
    RecordStatus, TransactionSource, TransactionType,
};
use crate::package::Record;
use crate::progress::{LoopGuard, PhaseResult};

use super::{run_phase, ExportContext};

/// Servant Keeper contribution exports obfuscate the amount column with a
/// fixed single-character substitution. The table is a compatibility
/// contract with the source format and must not change.
const ENCODED_DIGITS: &[(char, char)] = &[
    ('h', '0'),
    ('i', '1'),
    ('j', '2'),
    ('k', '3'),
    ('l', '4'),
    ('m', '5'),
    ('n', '6'),
    ('o', '7'),
    ('p', '8'),
    ('q', '9'),
    ('u', '.'),
    ('w', '-'),
];

/// Decode an obfuscated amount character by character, then parse it as a
/// decimal. Plain digits pass through so partially encoded exports still
/// work; characters outside the table are dropped.
pub fn decode_amount(encoded: &str) -> Option<f64> {
    let mut plain = String::with_capacity(encoded.len());
    for c in encoded.trim().chars() {
        if c.is_ascii_digit() || c == '.' || c == '-' {
            plain.push(c);
        } else if let Some((_, d)) = ENCODED_DIGITS
            .iter()
            .find(|(e, _)| *e == c.to_ascii_lowercase())
        {
            plain.push(*d);
        }
    }
    plain.parse().ok()
}

pub fn export(input_dir: &Path, ctx: &mut ExportContext) -> Result<Vec<PhaseResult>> {
    let mut results = Vec::new();

    let individuals = input_dir.join("individuals.csv");
    run_phase(&mut results, "Individuals", &individuals, ctx, |ctx, result| {
        export_individuals(&individuals, ctx, result)
    })?;

    let contributions = input_dir.join("contributions.csv");
    run_phase(&mut results, "Financial", &contributions, ctx, |ctx, result| {
        export_contributions(&contributions, ctx, result)
    })?;

    let notes = input_dir.join("notes.csv");
    if notes.is_file() {
        run_phase(&mut results, "Notes", &notes, ctx, |ctx, result| {
            export_notes(&notes, ctx, result)
        })?;
    }

    Ok(results)
}

// ---------------------------------------------------------------------------
// Individuals
// ---------------------------------------------------------------------------

fn export_individuals(path: &Path, ctx: &mut ExportContext, result: &mut PhaseResult) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    ctx.writer.write(&Record::PersonAttribute(PersonAttribute {
        key: "envelope_number".to_string(),
        name: "Envelope Number".to_string(),
        category: Some("Servant Keeper".to_string()),
        field_type: "Number".to_string(),
    }))?;

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
            None => result.skip(&format!("line {line}"), "missing or unparsable Ind ID"),
        }
        if (idx + 1) % 100 == 0 {
            ctx.progress.records("Individuals", (idx + 1) as u64);
        }
    }
    Ok(())
}

/// Map one individuals.csv row to a Person. Returns None when the row has
/// no usable Ind ID.
pub fn translate_person(rec: &RawRecord) -> Option<Person> {
    let id = rec.opt_i64("ind id")?;
    let family_id = rec
        .opt_i64("family id")
        .or_else(|| synthesize_id(["sk-family", id.to_string().as_str()]));

    let active = rec.bool_or("active", true);
    let unlisted = rec.bool_or("unlisted", false);
    let marital_raw = rec.string("marital code");
    let marital_status = MaritalStatus::parse(&marital_raw);

    let mut person = Person {
        id,
        family_id,
        family_role: FamilyRole::parse(&rec.string("relationship")),
        first_name: rec.string("first name"),
        nick_name: rec.opt_string("preferred name"),
        middle_name: rec.opt_string("mid name"),
        last_name: rec.string("last name"),
        salutation: rec.opt_string("title"),
        suffix: rec.opt_string("suffix"),
        email: rec.opt_string("email"),
        gender: Gender::parse(&rec.string("sex")),
        marital_status,
        birthdate: rec.date("birth dt"),
        anniversary_date: rec.date("wedding dt"),
        record_status: if active {
            RecordStatus::Active
        } else {
            RecordStatus::Inactive
        },
        connection_status: rec.opt_string("member status"),
        created_date_time: rec
            .date("date joined")
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
        ..Person::default()
    };

    // Codes the table doesn't map still make it into the export, just as
    // free text instead of silently vanishing.
    if marital_status == MaritalStatus::Unknown && !marital_raw.is_empty() {
        person.append_note(&format!("Marital code: {marital_raw}"));
    }

    for (column, phone_type, messaging) in [
        ("cell phone", "Mobile", true),
        ("home phone", "Home", false),
        ("wrk phone", "Work", false),
    ] {
        if let Some(number) = rec.opt_string(column) {
            person.phones.push(PersonPhone {
                person_id: id,
                phone_type: phone_type.to_string(),
                phone_number: number,
                is_messaging_enabled: messaging,
                is_unlisted: unlisted,
            });
        }
    }

    let street = rec.string("addr 1");
    if !street.is_empty() || !rec.string("city").is_empty() || !rec.string("zip").is_empty() {
        person.addresses.push(PersonAddress {
            person_id: id,
            street1: street,
            street2: rec.opt_string("addr 2"),
            city: rec.string("city"),
            state: rec.string("state"),
            postal_code: rec.string("zip"),
            country: rec.opt_string("country"),
            address_type: AddressType::parse(&rec.string("addr type")),
            is_mailing: true,
            ..PersonAddress::default()
        });
    }

    if let Some(envelope) = rec.opt_string("env no") {
        person.attributes.push(PersonAttributeValue {
            person_id: id,
            attribute_key: "envelope_number".to_string(),
            attribute_value: envelope,
        });
    }

    Some(person)
}

// ---------------------------------------------------------------------------
// Financial
// ---------------------------------------------------------------------------

/// Cross-row state for the contributions phase. Batch numbers are real
/// source keys here; only funds and transactions need synthesized ids.
#[derive(Default)]
pub struct ContributionAccumulator {
    pub accounts: BTreeMap<String, FinancialAccount>,
    pub batches: BTreeMap<i64, FinancialBatch>,
}

fn export_contributions(
    path: &Path,
    ctx: &mut ExportContext,
    result: &mut PhaseResult,
) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let mut acc = ContributionAccumulator::default();

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
            None => result.skip(
                &format!("line {line}"),
                "missing batch, date or decodable amount",
            ),
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

/// Fold one contributions.csv row into the accumulator. Returns the
/// synthesized transaction id, or None when the row lacks a batch number,
/// a post date or a decodable amount.
pub fn translate_contribution(
    rec: &RawRecord,
    acc: &mut ContributionAccumulator,
) -> Option<i64> {
    let batch_no = rec.opt_i64("batch no")?;
    let date = rec.date("post date")?;
    let amount = decode_amount(&rec.string("amount"))?;
    let person_id = rec.opt_i64("ind id");

    let fund = rec
        .opt_string("fund")
        .unwrap_or_else(|| "General Fund".to_string());
    let account_id = synthesize_id(["sk-fund", fund.as_str()])?;
    acc.accounts
        .entry(fund.clone())
        .or_insert_with(|| FinancialAccount {
            id: account_id,
            name: fund.clone(),
            parent_account_id: None,
            is_tax_deductible: true,
            campus_id: None,
        });

    let batch = acc.batches.entry(batch_no).or_insert_with(|| FinancialBatch {
        id: batch_no,
        name: format!("Batch {batch_no}"),
        status: BatchStatus::parse(&rec.string("batch status")),
        ..FinancialBatch::default()
    });
    batch.start_date = Some(batch.start_date.map_or(date, |d| d.min(date)));
    batch.end_date = Some(batch.end_date.map_or(date, |d| d.max(date)));

    let check_no = rec.opt_string("check no");
    let person_part = person_id.map(|p| p.to_string()).unwrap_or_default();
    let date_str = date.to_string();
    let amount_part = format!("{amount:.2}");
    let txn_id = synthesize_id([
        "sk-txn",
        batch_no.to_string().as_str(),
        person_part.as_str(),
        date_str.as_str(),
        check_no.as_deref().unwrap_or(""),
        amount_part.as_str(),
        fund.as_str(),
    ])?;

    batch.transactions.push(FinancialTransaction {
        id: txn_id,
        batch_id: batch_no,
        authorized_person_id: person_id,
        transaction_date: Some(date),
        transaction_type: TransactionType::Contribution,
        transaction_source: TransactionSource::OnsiteCollection,
        currency_type: CurrencyType::parse(&rec.string("pay type")),
        summary: None,
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
// Notes
// ---------------------------------------------------------------------------

fn export_notes(path: &Path, ctx: &mut ExportContext, result: &mut PhaseResult) -> Result<()> {
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
        if let Some(note) = translate_note(&rec) {
            ctx.writer.write(&Record::PersonNote(note))?;
            result.written += 1;
        } else if let Some(note) = translate_family_note(&rec) {
            ctx.writer.write(&Record::FamilyNote(note))?;
            result.written += 1;
        } else {
            result.skip(&format!("line {line}"), "missing person/family id or comment");
        }
    }
    Ok(())
}

/// Notes have no key in the source, so the id is synthesized from the
/// identity-defining content of the note itself.
pub fn translate_note(rec: &RawRecord) -> Option<PersonNote> {
    let person_id = rec.opt_i64("ind id")?;
    let text = rec.opt_string("comment")?;
    let date = rec.date("note date");
    let date_part = date.map(|d| d.to_string()).unwrap_or_default();
    let id = synthesize_id([
        "sk-note",
        person_id.to_string().as_str(),
        date_part.as_str(),
        text.as_str(),
    ])?;
    Some(PersonNote {
        id,
        person_id,
        note_type: rec
            .opt_string("note type")
            .unwrap_or_else(|| "Note".to_string()),
        text,
        date_time: date.and_then(|d| d.and_hms_opt(0, 0, 0)),
    })
}

/// Household-level comments carry a Family ID but no Ind ID.
pub fn translate_family_note(rec: &RawRecord) -> Option<FamilyNote> {
    let family_id = rec.opt_i64("family id")?;
    let text = rec.opt_string("comment")?;
    let date = rec.date("note date");
    let date_part = date.map(|d| d.to_string()).unwrap_or_default();
    let id = synthesize_id([
        "sk-family-note",
        family_id.to_string().as_str(),
        date_part.as_str(),
        text.as_str(),
    ])?;
    Some(FamilyNote {
        id,
        family_id,
        note_type: rec
            .opt_string("note type")
            .unwrap_or_else(|| "Note".to_string()),
        text,
        date_time: date.and_then(|d| d.and_hms_opt(0, 0, 0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{CancelToken, ProgressSink};

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        let mut rec = RawRecord::new();
        for (k, v) in pairs {
            rec.insert(k, v);
        }
        rec
    }

    #[test]
    fn decode_amount_applies_the_substitution_table() {
        assert_eq!(decode_amount("ijumh"), Some(12.50));
        assert_eq!(decode_amount("imhuhh"), Some(150.00));
        assert_eq!(decode_amount("wmuhh"), Some(-5.00));
    }

    #[test]
    fn decode_amount_passes_plain_digits_through() {
        assert_eq!(decode_amount("125.00"), Some(125.0));
        assert_eq!(decode_amount("1j5.h0"), Some(125.0));
    }

    #[test]
    fn decode_amount_drops_unknown_characters() {
        assert_eq!(decode_amount(" i$j "), Some(12.0));
        assert_eq!(decode_amount("zzz"), None);
        assert_eq!(decode_amount(""), None);
    }

    #[test]
    fn person_row_maps_servant_keeper_fields() {
        let rec = record(&[
            ("Ind ID", "5501"),
            ("Family ID", "550"),
            ("Title", "Mr."),
            ("First Name", "Noah"),
            ("Mid Name", "T"),
            ("Last Name", "Decker"),
            ("Preferred Name", "No"),
            ("Sex", "M"),
            ("Marital Code", "M"),
            ("Birth Dt", "03/05/2008"),
            ("Wedding Dt", ""),
            ("Home Phone", "555-0100"),
            ("Unlisted", "Yes"),
            ("Active", "No"),
            ("Member Status", "Regular Attender"),
            ("Env No", "114"),
            ("Addr 1", "11624 N 31st Dr"),
            ("City", "Phoenix"),
            ("State", "AZ"),
            ("Zip", "85029"),
        ]);
        let person = translate_person(&rec).unwrap();
        assert_eq!(person.id, 5501);
        assert_eq!(person.family_id, Some(550));
        assert_eq!(person.salutation.as_deref(), Some("Mr."));
        assert_eq!(person.gender, Gender::Male);
        assert_eq!(person.marital_status, MaritalStatus::Married);
        assert_eq!(person.record_status, RecordStatus::Inactive);
        assert_eq!(person.phones.len(), 1);
        assert!(person.phones[0].is_unlisted);
        assert_eq!(person.attributes.len(), 1);
        assert_eq!(person.attributes[0].attribute_key, "envelope_number");
        assert_eq!(person.attributes[0].attribute_value, "114");
    }

    #[test]
    fn person_without_ind_id_is_skipped() {
        assert!(translate_person(&record(&[("First Name", "Ghost")])).is_none());
    }

    #[test]
    fn unmapped_marital_code_lands_in_the_note() {
        let person = translate_person(&record(&[
            ("Ind ID", "5501"),
            ("Marital Code", "W"),
        ]))
        .unwrap();
        assert_eq!(person.marital_status, MaritalStatus::Unknown);
        assert_eq!(person.note.as_deref(), Some("Marital code: W"));
    }

    #[test]
    fn generated_family_id_is_stable() {
        let a = translate_person(&record(&[("Ind ID", "7")])).unwrap();
        let b = translate_person(&record(&[("Ind ID", "7")])).unwrap();
        assert_eq!(a.family_id, b.family_id);
        assert!(a.family_id.is_some());
    }

    #[test]
    fn contribution_uses_the_real_batch_number_and_decodes_the_amount() {
        let mut acc = ContributionAccumulator::default();
        let txn = translate_contribution(
            &record(&[
                ("Batch No", "310"),
                ("Ind ID", "5501"),
                ("Post Date", "01/05/2025"),
                ("Check No", "1042"),
                ("Pay Type", "Check"),
                ("Amount", "ijmuhh"),
                ("Fund", "Building Fund"),
            ]),
            &mut acc,
        );
        assert!(txn.is_some());
        let batch = acc.batches.get(&310).unwrap();
        assert_eq!(batch.name, "Batch 310");
        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.transactions[0].details[0].amount, 125.0);
        assert_eq!(batch.transactions[0].currency_type, CurrencyType::Check);
        assert_eq!(acc.accounts.len(), 1);
    }

    #[test]
    fn contribution_with_undecodable_amount_is_skipped() {
        let mut acc = ContributionAccumulator::default();
        let r = translate_contribution(
            &record(&[
                ("Batch No", "310"),
                ("Post Date", "01/05/2025"),
                ("Amount", "zzz"),
            ]),
            &mut acc,
        );
        assert!(r.is_none());
        assert!(acc.batches.is_empty());
    }

    #[test]
    fn family_comment_without_ind_id_becomes_a_family_note() {
        let rec = record(&[
            ("Family ID", "550"),
            ("Note Date", "02/01/2025"),
            ("Comment", "New to the area, wants a home group"),
        ]);
        assert!(translate_note(&rec).is_none());
        let note = translate_family_note(&rec).unwrap();
        assert_eq!(note.family_id, 550);
        assert!(note.id > 0);
        assert_eq!(translate_family_note(&rec).unwrap().id, note.id);
    }

    #[test]
    fn note_ids_are_synthesized_and_idempotent() {
        let row = [
            ("Ind ID", "5501"),
            ("Note Date", "01/05/2025"),
            ("Comment", "Prayed with family after service"),
        ];
        let a = translate_note(&record(&row)).unwrap();
        let b = translate_note(&record(&row)).unwrap();
        assert_eq!(a.id, b.id);
        assert!(a.id > 0);
        assert_eq!(a.note_type, "Note");
        assert!(a.date_time.is_some());
    }

    #[test]
    fn export_runs_all_phases() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("individuals.csv"),
            "Ind ID,Family ID,First Name,Last Name,Sex\n5501,550,Noah,Decker,M\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("contributions.csv"),
            "Batch No,Ind ID,Post Date,Pay Type,Amount,Fund\n310,5501,01/05/2025,Check,ijumh,General\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("notes.csv"),
            "Ind ID,Note Date,Comment\n5501,01/06/2025,Visited in hospital\n",
        )
        .unwrap();

        let mut writer = crate::package::PackageWriter::create(&dir.path().join("work")).unwrap();
        let mut ctx = ExportContext {
            writer: &mut writer,
            progress: ProgressSink::discard(),
            cancel: CancelToken::new(),
            loop_threshold: 1000,
            include_images: true,
        };
        let results = export(dir.path(), &mut ctx).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.ok()));

        use crate::package::OutputFile;
        assert_eq!(writer.rows_written(OutputFile::Person), 1);
        assert_eq!(writer.rows_written(OutputFile::PersonNote), 1);
        assert_eq!(writer.rows_written(OutputFile::FinancialTransaction), 1);
        assert_eq!(writer.rows_written(OutputFile::PersonAttribute), 1);
    }
}
