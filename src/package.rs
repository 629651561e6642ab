use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use zip::write::FileOptions;
use zip::CompressionMethod;

use crate::error::{Result, ShepherdError};
use crate::models::{
    Attendance, FamilyNote, FinancialAccount, FinancialBatch, Group, GroupType, Person,
    PersonAttribute, PersonNote,
};

const DEFAULT_IMAGE_ARCHIVE_LIMIT: u64 = 100 * 1024 * 1024;

/// Every CSV file a package can contain. The filename and header list of
/// each entry is the destination importer's contract — preserved verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFile {
    Person,
    PersonPhone,
    PersonAddress,
    PersonAttribute,
    PersonAttributeValue,
    PersonNote,
    FamilyNote,
    GroupType,
    Group,
    GroupMember,
    GroupAddress,
    FinancialAccount,
    FinancialBatch,
    FinancialTransaction,
    FinancialTransactionDetail,
    Attendance,
}

impl OutputFile {
    pub fn filename(&self) -> &'static str {
        match self {
            Self::Person => "person.csv",
            Self::PersonPhone => "person-phone.csv",
            Self::PersonAddress => "person-address.csv",
            Self::PersonAttribute => "person-attribute.csv",
            Self::PersonAttributeValue => "person-attributevalue.csv",
            Self::PersonNote => "person-note.csv",
            Self::FamilyNote => "family-note.csv",
            Self::GroupType => "grouptype.csv",
            Self::Group => "group.csv",
            Self::GroupMember => "groupmember.csv",
            Self::GroupAddress => "group-address.csv",
            Self::FinancialAccount => "financial-account.csv",
            Self::FinancialBatch => "financial-batch.csv",
            Self::FinancialTransaction => "financial-transaction.csv",
            Self::FinancialTransactionDetail => "financial-transactiondetail.csv",
            Self::Attendance => "attendance.csv",
        }
    }

    /// Child files opened alongside a parent so that owned collections can
    /// be written in the same pass without the caller managing handles.
    fn children(&self) -> &'static [OutputFile] {
        match self {
            Self::Person => &[
                Self::PersonPhone,
                Self::PersonAddress,
                Self::PersonAttributeValue,
            ],
            Self::FinancialBatch => &[Self::FinancialTransaction, Self::FinancialTransactionDetail],
            Self::Group => &[Self::GroupMember, Self::GroupAddress],
            _ => &[],
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::Person => &[
                "Id",
                "FamilyId",
                "FamilyRole",
                "FirstName",
                "NickName",
                "MiddleName",
                "LastName",
                "Salutation",
                "Suffix",
                "Email",
                "EmailPreference",
                "Gender",
                "MaritalStatus",
                "Birthdate",
                "AnniversaryDate",
                "RecordStatus",
                "InactiveReason",
                "ConnectionStatus",
                "GiveIndividually",
                "CampusId",
                "CampusName",
                "CreatedDateTime",
                "ModifiedDateTime",
                "Note",
            ],
            Self::PersonPhone => &[
                "PersonId",
                "PhoneType",
                "PhoneNumber",
                "IsMessagingEnabled",
                "IsUnlisted",
            ],
            Self::PersonAddress => &[
                "PersonId",
                "Street1",
                "Street2",
                "City",
                "State",
                "PostalCode",
                "Country",
                "AddressType",
                "IsMailing",
            ],
            Self::PersonAttribute => &["Key", "Name", "Category", "FieldType"],
            Self::PersonAttributeValue => &["PersonId", "AttributeKey", "AttributeValue"],
            Self::PersonNote => &["Id", "PersonId", "NoteType", "Text", "DateTime"],
            Self::FamilyNote => &["Id", "FamilyId", "NoteType", "Text", "DateTime"],
            Self::GroupType => &["Id", "Name"],
            Self::Group => &[
                "Id",
                "Name",
                "GroupTypeId",
                "ParentGroupId",
                "CampusId",
                "MeetingDay",
                "MeetingTime",
                "IsActive",
                "IsPublic",
                "Description",
            ],
            Self::GroupMember => &["GroupId", "PersonId", "Role"],
            Self::GroupAddress => &[
                "GroupId",
                "Street1",
                "Street2",
                "City",
                "State",
                "PostalCode",
                "Country",
                "AddressType",
                "IsMailing",
            ],
            Self::FinancialAccount => &[
                "Id",
                "Name",
                "ParentAccountId",
                "IsTaxDeductible",
                "CampusId",
            ],
            Self::FinancialBatch => &[
                "Id",
                "Name",
                "StartDate",
                "EndDate",
                "Status",
                "CreatedByPersonId",
                "CreatedDateTime",
                "ModifiedByPersonId",
                "ModifiedDateTime",
            ],
            Self::FinancialTransaction => &[
                "Id",
                "BatchId",
                "AuthorizedPersonId",
                "TransactionDate",
                "TransactionType",
                "TransactionSource",
                "CurrencyType",
                "Summary",
                "TransactionCode",
            ],
            Self::FinancialTransactionDetail => {
                &["Id", "TransactionId", "AccountId", "Amount", "Summary"]
            }
            Self::Attendance => &[
                "AttendanceId",
                "PersonId",
                "GroupId",
                "ScheduleId",
                "LocationId",
                "StartDateTime",
                "EndDateTime",
                "Note",
            ],
        }
    }
}

/// A top-level entity handed to the writer. Child rows (phones, details,
/// members, …) ride along inside their parent and are fanned out by the
/// writer, never written through a separate top-level call.
#[derive(Debug, Clone)]
pub enum Record {
    Person(Person),
    PersonNote(PersonNote),
    FamilyNote(FamilyNote),
    GroupType(GroupType),
    Group(Group),
    FinancialAccount(FinancialAccount),
    FinancialBatch(FinancialBatch),
    PersonAttribute(PersonAttribute),
    Attendance(Attendance),
}

impl From<Person> for Record {
    fn from(v: Person) -> Self {
        Self::Person(v)
    }
}

impl From<Group> for Record {
    fn from(v: Group) -> Self {
        Self::Group(v)
    }
}

impl From<FinancialBatch> for Record {
    fn from(v: FinancialBatch) -> Self {
        Self::FinancialBatch(v)
    }
}

/// What `finalize` produced: the package path, its CSV entries with data
/// row counts, and any image archives.
#[derive(Debug)]
pub struct PackageSummary {
    pub package_path: PathBuf,
    pub entries: Vec<(String, u64)>,
    pub image_archives: Vec<PathBuf>,
}

/// An export session owning the scratch directories and the per-file CSV
/// writer registry. Create one per export; `finalize` consumes it.
pub struct PackageWriter {
    csv_dir: PathBuf,
    image_dir: PathBuf,
    image_archive_limit: u64,
    writers: HashMap<OutputFile, csv::Writer<BufWriter<File>>>,
    row_counts: HashMap<OutputFile, u64>,
}

impl PackageWriter {
    /// Clear and recreate the scratch directories under `work_dir`.
    /// Idempotent before any writes; a locked directory is fatal.
    pub fn create(work_dir: &Path) -> Result<Self> {
        let csv_dir = work_dir.join("csv");
        let image_dir = work_dir.join("images");
        for dir in [&csv_dir, &image_dir] {
            if dir.exists() {
                fs::remove_dir_all(dir)?;
            }
            fs::create_dir_all(dir)?;
        }
        Ok(Self {
            csv_dir,
            image_dir,
            image_archive_limit: DEFAULT_IMAGE_ARCHIVE_LIMIT,
            writers: HashMap::new(),
            row_counts: HashMap::new(),
        })
    }

    pub fn with_image_archive_limit(mut self, bytes: u64) -> Self {
        self.image_archive_limit = bytes;
        self
    }

    /// Write one top-level entity and fan out its owned children.
    pub fn write(&mut self, record: &Record) -> Result<()> {
        match record {
            Record::Person(p) => {
                self.append(OutputFile::Person, p)?;
                for phone in &p.phones {
                    self.append(OutputFile::PersonPhone, phone)?;
                }
                for address in &p.addresses {
                    self.append(OutputFile::PersonAddress, address)?;
                }
                for value in &p.attributes {
                    self.append(OutputFile::PersonAttributeValue, value)?;
                }
            }
            Record::PersonNote(n) => self.append(OutputFile::PersonNote, n)?,
            Record::FamilyNote(n) => self.append(OutputFile::FamilyNote, n)?,
            Record::GroupType(t) => self.append(OutputFile::GroupType, t)?,
            Record::Group(g) => {
                self.append(OutputFile::Group, g)?;
                for member in &g.members {
                    self.append(OutputFile::GroupMember, member)?;
                }
                for address in &g.addresses {
                    self.append(OutputFile::GroupAddress, address)?;
                }
            }
            Record::FinancialAccount(a) => self.append(OutputFile::FinancialAccount, a)?,
            Record::FinancialBatch(b) => {
                self.append(OutputFile::FinancialBatch, b)?;
                for txn in &b.transactions {
                    self.append(OutputFile::FinancialTransaction, txn)?;
                    for detail in &txn.details {
                        self.append(OutputFile::FinancialTransactionDetail, detail)?;
                    }
                }
            }
            Record::PersonAttribute(a) => self.append(OutputFile::PersonAttribute, a)?,
            Record::Attendance(a) => self.append(OutputFile::Attendance, a)?,
        }
        Ok(())
    }

    /// Store a profile image; it lands in the image archives at finalize.
    pub fn write_image(&mut self, person_id: i64, bytes: &[u8]) -> Result<()> {
        let path = self.image_dir.join(format!("Person_{person_id}.jpg"));
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn rows_written(&self, file: OutputFile) -> u64 {
        self.row_counts.get(&file).copied().unwrap_or(0)
    }

    fn append<T: Serialize>(&mut self, file: OutputFile, row: &T) -> Result<()> {
        self.ensure_open(file)?;
        let writer = self
            .writers
            .get_mut(&file)
            .ok_or_else(|| ShepherdError::Other("writer registry out of sync".into()))?;
        writer.serialize(row)?;
        *self.row_counts.entry(file).or_insert(0) += 1;
        Ok(())
    }

    /// Open the CSV file for `file` on first sight, header row included,
    /// along with every child file of that type.
    fn ensure_open(&mut self, file: OutputFile) -> Result<()> {
        if !self.writers.contains_key(&file) {
            let path = self.csv_dir.join(file.filename());
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(BufWriter::new(File::create(path)?));
            writer.write_record(file.headers())?;
            self.writers.insert(file, writer);
            self.row_counts.entry(file).or_insert(0);
        }
        for child in file.children() {
            if !self.writers.contains_key(child) {
                self.ensure_open(*child)?;
            }
        }
        Ok(())
    }

    /// Close every writer, zip the CSV directory into `<output>.slingshot`
    /// (replacing any existing file), archive images, and delete the
    /// scratch directories. Consumes the session.
    pub fn finalize(mut self, output: &Path) -> Result<PackageSummary> {
        for (_, writer) in self.writers.drain() {
            writer.into_inner().map_err(|e| ShepherdError::Other(e.to_string()))?.flush()?;
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if output.exists() {
            fs::remove_file(output)?;
        }

        let mut names: Vec<String> = fs::read_dir(&self.csv_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();

        let mut zip = zip::ZipWriter::new(File::create(output)?);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut entries = Vec::new();
        for name in &names {
            let bytes = fs::read(self.csv_dir.join(name))?;
            zip.start_file(name.as_str(), options)?;
            zip.write_all(&bytes)?;
            let rows = self
                .row_counts
                .iter()
                .find(|(f, _)| f.filename() == name)
                .map(|(_, n)| *n)
                .unwrap_or(0);
            entries.push((name.clone(), rows));
        }
        zip.finish()?;

        let image_archives = self.archive_images(output)?;

        fs::remove_dir_all(&self.csv_dir)?;
        fs::remove_dir_all(&self.image_dir)?;

        Ok(PackageSummary {
            package_path: output.to_path_buf(),
            entries,
            image_archives,
        })
    }

    /// Zip images into `<stem>_<N>.Images.slingshot` archives. The running
    /// sum of file lengths is compared before each add, so an archive can
    /// exceed the limit by at most one file.
    fn archive_images(&self, output: &Path) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.image_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "package".to_string());
        let parent = output.parent().map(Path::to_path_buf).unwrap_or_default();

        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut archives = Vec::new();
        let mut index = 1u32;
        let mut accumulated = 0u64;
        let mut current: Option<zip::ZipWriter<File>> = None;

        for file in &files {
            if accumulated >= self.image_archive_limit && current.is_some() {
                if let Some(zip) = current.take() {
                    finish_zip(zip)?;
                }
                accumulated = 0;
                index += 1;
            }
            if current.is_none() {
                let path = parent.join(format!("{stem}_{index}.Images.slingshot"));
                if path.exists() {
                    fs::remove_file(&path)?;
                }
                archives.push(path.clone());
                current = Some(zip::ZipWriter::new(File::create(&path)?));
            }
            let zip = current
                .as_mut()
                .ok_or_else(|| ShepherdError::Other("image archive writer missing".into()))?;
            let bytes = fs::read(file)?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            zip.start_file(name, options)?;
            zip.write_all(&bytes)?;
            accumulated += bytes.len() as u64;
        }
        if let Some(zip) = current.take() {
            finish_zip(zip)?;
        }
        Ok(archives)
    }
}

fn finish_zip(mut zip: zip::ZipWriter<File>) -> Result<()> {
    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;
    use std::io::Read;

    fn sample_person() -> Person {
        let mut p = Person {
            id: 42,
            first_name: "Ted".into(),
            last_name: "Decker".into(),
            gender: Gender::Male,
            give_individually: false,
            ..Person::default()
        };
        p.phones.push(PersonPhone {
            person_id: 42,
            phone_type: "Mobile".into(),
            phone_number: "(555) 867-5309".into(),
            is_messaging_enabled: true,
            is_unlisted: false,
        });
        p.phones.push(PersonPhone {
            person_id: 42,
            phone_type: "Home".into(),
            phone_number: "555-0100".into(),
            ..PersonPhone::default()
        });
        p.addresses.push(PersonAddress {
            person_id: 42,
            street1: "11624 N 31st Dr".into(),
            city: "Phoenix".into(),
            state: "AZ".into(),
            postal_code: "85029".into(),
            is_mailing: true,
            ..PersonAddress::default()
        });
        for (key, value) in [("school", "Central High"), ("allergy", "peanuts"), ("er", "2")] {
            p.attributes.push(PersonAttributeValue {
                person_id: 42,
                attribute_key: key.into(),
                attribute_value: value.into(),
            });
        }
        p
    }

    fn read_entry(archive_path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    fn entry_names(archive_path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
        archive.file_names().map(String::from).collect()
    }

    #[test]
    fn person_write_fans_out_to_child_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = PackageWriter::create(&dir.path().join("work")).unwrap();
        writer.write(&sample_person().into()).unwrap();

        assert_eq!(writer.rows_written(OutputFile::Person), 1);
        assert_eq!(writer.rows_written(OutputFile::PersonPhone), 2);
        assert_eq!(writer.rows_written(OutputFile::PersonAddress), 1);
        assert_eq!(writer.rows_written(OutputFile::PersonAttributeValue), 3);

        let out = dir.path().join("test.slingshot");
        writer.finalize(&out).unwrap();

        let phones = read_entry(&out, "person-phone.csv");
        let lines: Vec<&str> = phones.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], OutputFile::PersonPhone.headers().join(","));
        for line in &lines[1..] {
            assert!(line.starts_with("42,"), "row should carry the person id: {line}");
        }
        let values = read_entry(&out, "person-attributevalue.csv");
        assert_eq!(values.lines().count(), 4);
    }

    #[test]
    fn batch_write_fans_out_transactions_and_details() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = PackageWriter::create(&dir.path().join("work")).unwrap();

        let mut batch = FinancialBatch {
            id: 7,
            name: "Week of 2025-01-05".into(),
            status: BatchStatus::Closed,
            ..FinancialBatch::default()
        };
        for txn_id in [70, 71] {
            let mut txn = FinancialTransaction {
                id: txn_id,
                batch_id: 7,
                currency_type: CurrencyType::Check,
                ..FinancialTransaction::default()
            };
            txn.details.push(FinancialTransactionDetail {
                id: txn_id * 10,
                transaction_id: txn_id,
                account_id: 1,
                amount: 25.0,
                summary: None,
            });
            batch.transactions.push(txn);
        }
        writer.write(&batch.into()).unwrap();

        let out = dir.path().join("giving.slingshot");
        let summary = writer.finalize(&out).unwrap();

        let txns = read_entry(&out, "financial-transaction.csv");
        assert_eq!(txns.lines().count(), 3);
        let details = read_entry(&out, "financial-transactiondetail.csv");
        assert_eq!(details.lines().count(), 3);
        assert!(summary
            .entries
            .iter()
            .any(|(name, rows)| name == "financial-batch.csv" && *rows == 1));
    }

    #[test]
    fn group_write_fans_out_members_and_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = PackageWriter::create(&dir.path().join("work")).unwrap();

        let mut group = Group {
            id: 300,
            name: "North Campus Young Adults".into(),
            group_type_id: 25,
            is_active: true,
            is_public: true,
            ..Group::default()
        };
        for person_id in [1, 2, 3] {
            group.members.push(GroupMember {
                group_id: 300,
                person_id,
                role: if person_id == 1 { "Leader" } else { "Member" }.into(),
            });
        }
        group.addresses.push(GroupAddress {
            group_id: 300,
            street1: "100 Main St".into(),
            city: "Phoenix".into(),
            state: "AZ".into(),
            postal_code: "85004".into(),
            ..GroupAddress::default()
        });
        writer.write(&group.into()).unwrap();

        assert_eq!(writer.rows_written(OutputFile::Group), 1);
        assert_eq!(writer.rows_written(OutputFile::GroupMember), 3);
        assert_eq!(writer.rows_written(OutputFile::GroupAddress), 1);

        let out = dir.path().join("groups.slingshot");
        writer.finalize(&out).unwrap();
        let members = read_entry(&out, "groupmember.csv");
        assert_eq!(members.lines().count(), 4);
        assert!(members.lines().any(|l| l == "300,1,Leader"));
    }

    #[test]
    fn package_contains_exactly_the_touched_files_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        let mut writer = PackageWriter::create(&work).unwrap();
        writer.write(&sample_person().into()).unwrap();
        writer
            .write(&Record::GroupType(GroupType {
                id: 1,
                name: "Small Groups".into(),
            }))
            .unwrap();

        let out = dir.path().join("test.slingshot");
        writer.finalize(&out).unwrap();

        let mut names = entry_names(&out);
        names.sort();
        assert_eq!(
            names,
            vec![
                "grouptype.csv",
                "person-address.csv",
                "person-attributevalue.csv",
                "person-phone.csv",
                "person.csv",
            ]
        );
        for name in &names {
            let content = read_entry(&out, name);
            let first = content.lines().next().unwrap();
            assert!(first.contains(','), "header row expected in {name}: {first}");
        }
        assert!(!work.join("csv").exists());
        assert!(!work.join("images").exists());
    }

    #[test]
    fn finalize_replaces_an_existing_package() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("test.slingshot");
        std::fs::write(&out, b"stale").unwrap();

        let mut writer = PackageWriter::create(&dir.path().join("work")).unwrap();
        writer
            .write(&Record::GroupType(GroupType {
                id: 1,
                name: "Serving Teams".into(),
            }))
            .unwrap();
        writer.finalize(&out).unwrap();
        assert_eq!(entry_names(&out), vec!["grouptype.csv"]);
    }

    #[test]
    fn image_archives_split_when_the_running_sum_crosses_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = PackageWriter::create(&dir.path().join("work"))
            .unwrap()
            .with_image_archive_limit(10);
        // Six bytes each: after two images the sum (12) has crossed the
        // limit, so the third image starts a second archive.
        writer.write_image(1, b"aaaaaa").unwrap();
        writer.write_image(2, b"bbbbbb").unwrap();
        writer.write_image(3, b"cccccc").unwrap();
        writer
            .write(&Record::GroupType(GroupType {
                id: 1,
                name: "x".into(),
            }))
            .unwrap();

        let out = dir.path().join("test.slingshot");
        let summary = writer.finalize(&out).unwrap();
        assert_eq!(summary.image_archives.len(), 2);
        assert!(summary.image_archives[0]
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("test_1.Images.slingshot"));

        let first = entry_names(&summary.image_archives[0]);
        let second = entry_names(&summary.image_archives[1]);
        assert_eq!(first.len(), 2);
        assert_eq!(second, vec!["Person_3.jpg"]);
    }

    #[test]
    fn no_images_means_no_image_archives() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = PackageWriter::create(&dir.path().join("work")).unwrap();
        writer
            .write(&Record::GroupType(GroupType {
                id: 1,
                name: "x".into(),
            }))
            .unwrap();
        let summary = writer.finalize(&dir.path().join("test.slingshot")).unwrap();
        assert!(summary.image_archives.is_empty());
    }

    #[test]
    fn headers_match_the_serialized_field_order() {
        fn header_row<T: Serialize>(value: &T) -> String {
            let mut w = csv::WriterBuilder::new().from_writer(Vec::new());
            w.serialize(value).unwrap();
            let bytes = w.into_inner().unwrap();
            String::from_utf8(bytes).unwrap().lines().next().unwrap().to_string()
        }

        assert_eq!(
            header_row(&Person::default()),
            OutputFile::Person.headers().join(",")
        );
        assert_eq!(
            header_row(&PersonPhone::default()),
            OutputFile::PersonPhone.headers().join(",")
        );
        assert_eq!(
            header_row(&PersonAddress::default()),
            OutputFile::PersonAddress.headers().join(",")
        );
        assert_eq!(
            header_row(&PersonAttribute::default()),
            OutputFile::PersonAttribute.headers().join(",")
        );
        assert_eq!(
            header_row(&PersonAttributeValue::default()),
            OutputFile::PersonAttributeValue.headers().join(",")
        );
        assert_eq!(
            header_row(&PersonNote::default()),
            OutputFile::PersonNote.headers().join(",")
        );
        assert_eq!(
            header_row(&FamilyNote::default()),
            OutputFile::FamilyNote.headers().join(",")
        );
        assert_eq!(
            header_row(&GroupType::default()),
            OutputFile::GroupType.headers().join(",")
        );
        assert_eq!(
            header_row(&Group::default()),
            OutputFile::Group.headers().join(",")
        );
        assert_eq!(
            header_row(&GroupMember::default()),
            OutputFile::GroupMember.headers().join(",")
        );
        assert_eq!(
            header_row(&GroupAddress::default()),
            OutputFile::GroupAddress.headers().join(",")
        );
        assert_eq!(
            header_row(&FinancialAccount::default()),
            OutputFile::FinancialAccount.headers().join(",")
        );
        assert_eq!(
            header_row(&FinancialBatch::default()),
            OutputFile::FinancialBatch.headers().join(",")
        );
        assert_eq!(
            header_row(&FinancialTransaction::default()),
            OutputFile::FinancialTransaction.headers().join(",")
        );
        assert_eq!(
            header_row(&FinancialTransactionDetail::default()),
            OutputFile::FinancialTransactionDetail.headers().join(",")
        );
        assert_eq!(
            header_row(&Attendance::default()),
            OutputFile::Attendance.headers().join(",")
        );
    }
}
