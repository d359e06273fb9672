//! spendwise-storage-json
//!
//! Single-file JSON persistence for recurring patterns and expenses.
//! Transactions stage a copy of the store and publish it with one atomic rename.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use spendwise_core::{CoreError, RecurringStore};
use spendwise_domain::{find_by_id, Expense, NewExpense, RecurringPattern};

pub const STORE_SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "spendwise.json";
const BACKUP_PREFIX: &str = "spendwise";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    schema_version: u32,
    #[serde(default)]
    patterns: Vec<RecurringPattern>,
    #[serde(default)]
    expenses: Vec<Expense>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            patterns: Vec::new(),
            expenses: Vec::new(),
        }
    }
}

/// Describes a backup copy of the store file.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// Filesystem-backed [`RecurringStore`].
#[derive(Debug)]
pub struct JsonRecurringStore {
    path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    data: StoreData,
    staged: Option<StoreData>,
}

impl JsonRecurringStore {
    /// Opens (or prepares) `spendwise.json` inside `data_dir`, with backups next to it.
    pub fn open(data_dir: &Path) -> Result<Self, CoreError> {
        Self::open_with_retention(data_dir, DEFAULT_RETENTION)
    }

    pub fn open_with_retention(data_dir: &Path, retention: usize) -> Result<Self, CoreError> {
        Self::open_at(
            data_dir.join(STORE_FILE_NAME),
            data_dir.join("backups"),
            retention,
        )
    }

    pub fn open_at(
        path: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir_all(&backups_dir)?;
        let data = load_store(&path)?;
        Ok(Self {
            path,
            backups_dir,
            retention: retention.max(1),
            data,
            staged: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Re-reads the file, discarding any open transaction.
    pub fn reload(&mut self) -> Result<(), CoreError> {
        self.data = load_store(&self.path)?;
        self.staged = None;
        Ok(())
    }

    pub fn patterns(&self) -> &[RecurringPattern] {
        &self.view().patterns
    }

    pub fn pattern(&self, id: Uuid) -> Option<&RecurringPattern> {
        find_by_id(&self.view().patterns, id)
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.view().expenses
    }

    pub fn expenses_for(&self, pattern_id: Uuid) -> Vec<&Expense> {
        self.view()
            .expenses
            .iter()
            .filter(|expense| expense.recurring_pattern_id == Some(pattern_id))
            .collect()
    }

    pub fn insert_pattern(&mut self, pattern: RecurringPattern) -> Result<Uuid, CoreError> {
        if let Some(issue) = pattern.configuration_issue() {
            return Err(CoreError::Validation(issue));
        }
        let id = pattern.id;
        self.write(|data| {
            if data.patterns.iter().any(|existing| existing.id == id) {
                return Err(CoreError::InvalidOperation(format!(
                    "pattern {} already exists",
                    id
                )));
            }
            data.patterns.push(pattern);
            Ok(())
        })?;
        Ok(id)
    }

    /// Removes the pattern only; expenses it generated stay in the history.
    pub fn remove_pattern(&mut self, id: Uuid) -> Result<RecurringPattern, CoreError> {
        self.write(|data| {
            let index = data
                .patterns
                .iter()
                .position(|pattern| pattern.id == id)
                .ok_or(CoreError::PatternNotFound(id))?;
            Ok(data.patterns.remove(index))
        })
    }

    pub fn set_active(&mut self, id: Uuid, active: bool) -> Result<(), CoreError> {
        self.write(|data| {
            let pattern = find_pattern_mut(data, id)?;
            pattern.is_active = active;
            Ok(())
        })
    }

    /// Copies the committed store file into the backups directory.
    pub fn backup(&self, note: Option<&str>) -> Result<BackupInfo, CoreError> {
        fs::create_dir_all(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", BACKUP_PREFIX, timestamp);
        let label = sanitize_backup_note(note);
        if let Some(label) = &label {
            stem.push('_');
            stem.push_str(label);
        }
        let file_name = self.unused_backup_name(&stem, label.is_some());
        let path = self.backups_dir.join(&file_name);
        let json = serialize_store(&self.data)?;
        write_atomic(&path, &json)?;
        self.prune_backups()?;
        Ok(BackupInfo {
            created_at: parse_backup_timestamp(&file_name),
            id: file_name,
            size_bytes: json.len() as u64,
            path,
        })
    }

    /// Backups taken within the same second get a `-2`, `-3`, ... suffix.
    fn unused_backup_name(&self, stem: &str, has_note: bool) -> String {
        let separator = if has_note { '-' } else { '_' };
        let mut file_name = format!("{}.{}", stem, BACKUP_EXTENSION);
        let mut counter = 2;
        while self.backups_dir.join(&file_name).exists() {
            file_name = format!("{}{}{}.{}", stem, separator, counter, BACKUP_EXTENSION);
            counter += 1;
        }
        file_name
    }

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let size_bytes = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
            entries.push(BackupInfo {
                id: file_name.to_string(),
                created_at: parse_backup_timestamp(file_name),
                size_bytes,
                path: path.clone(),
            });
        }
        entries.sort_by_key(|info| {
            Reverse((info.created_at, backup_sequence(&info.id), info.id.clone()))
        });
        Ok(entries)
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        for entry in self.list_backups()?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.id, error = %err, "failed to prune old backup");
            }
        }
        Ok(())
    }

    fn view(&self) -> &StoreData {
        self.staged.as_ref().unwrap_or(&self.data)
    }

    /// Applies `op` to the open transaction, or to a copy that is persisted right away.
    fn write<T, F>(&mut self, op: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut StoreData) -> Result<T, CoreError>,
    {
        if let Some(staged) = self.staged.as_mut() {
            return op(staged);
        }
        let mut next = self.data.clone();
        let value = op(&mut next)?;
        save_store(&self.path, &next)?;
        self.data = next;
        Ok(value)
    }
}

impl RecurringStore for JsonRecurringStore {
    fn list_active_patterns(&self) -> Result<Vec<RecurringPattern>, CoreError> {
        Ok(self
            .view()
            .patterns
            .iter()
            .filter(|pattern| pattern.is_active)
            .cloned()
            .collect())
    }

    fn create_expense(&mut self, expense: NewExpense) -> Result<Expense, CoreError> {
        let expense = expense.into_expense(Utc::now());
        let stored = expense.clone();
        self.write(move |data| {
            data.expenses.push(stored);
            Ok(())
        })?;
        Ok(expense)
    }

    fn set_checkpoint(&mut self, pattern_id: Uuid, date: NaiveDate) -> Result<(), CoreError> {
        self.write(|data| {
            let pattern = find_pattern_mut(data, pattern_id)?;
            pattern.last_generated_date = Some(date);
            Ok(())
        })
    }

    fn begin(&mut self) -> Result<(), CoreError> {
        if self.staged.is_some() {
            return Err(CoreError::InvalidOperation(
                "transaction already in progress".into(),
            ));
        }
        self.staged = Some(self.data.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), CoreError> {
        let staged = self
            .staged
            .as_ref()
            .ok_or_else(|| CoreError::InvalidOperation("no transaction in progress".into()))?;
        save_store(&self.path, staged)?;
        if let Some(staged) = self.staged.take() {
            self.data = staged;
        }
        Ok(())
    }

    fn rollback(&mut self) {
        self.staged = None;
    }
}

fn find_pattern_mut(data: &mut StoreData, id: Uuid) -> Result<&mut RecurringPattern, CoreError> {
    data.patterns
        .iter_mut()
        .find(|pattern| pattern.id == id)
        .ok_or(CoreError::PatternNotFound(id))
}

fn load_store(path: &Path) -> Result<StoreData, CoreError> {
    if !path.exists() {
        return Ok(StoreData::default());
    }
    let raw = fs::read_to_string(path)?;
    let data: StoreData =
        serde_json::from_str(&raw).map_err(|err| CoreError::Serde(err.to_string()))?;
    if data.schema_version > STORE_SCHEMA_VERSION {
        return Err(CoreError::Persistence(format!(
            "store `{}` is from a newer schema version ({})",
            path.display(),
            data.schema_version
        )));
    }
    Ok(data)
}

fn save_store(path: &Path, data: &StoreData) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_store(data)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn serialize_store(data: &StoreData) -> Result<String, CoreError> {
    serde_json::to_string_pretty(data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Backup names look like `spendwise_YYYYMMDD_HHMMSS[_note].json`.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let trimmed = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let mut segments = trimmed.split('_');
    if segments.next()? != BACKUP_PREFIX {
        return None;
    }
    let date = segments.next()?;
    let time = segments.next()?;
    if !is_digits(date, 8) || !is_digits(time, 6) {
        return None;
    }
    let raw = format!("{}{}", date, time);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Same-second collision counter carried after the timestamp; 1 when absent.
fn backup_sequence(name: &str) -> u32 {
    let Some(stem) = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION)) else {
        return 1;
    };
    match stem.split('_').nth(3) {
        Some(tail) => tail
            .rsplit_once('-')
            .map_or(tail, |(_, counter)| counter)
            .parse()
            .unwrap_or(1),
        None => 1,
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_names_parse_with_and_without_notes() {
        let plain = parse_backup_timestamp("spendwise_20240315_081500.json").expect("plain");
        assert_eq!(plain.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-15 08:15:00");
        assert!(parse_backup_timestamp("spendwise_20240315_081500_before-run.json").is_some());
        assert!(parse_backup_timestamp("ledger_20240315_081500.json").is_none());
        assert!(parse_backup_timestamp("spendwise_2024_0815.json").is_none());
    }

    #[test]
    fn collision_counter_is_read_back() {
        assert_eq!(backup_sequence("spendwise_20240315_081500.json"), 1);
        assert_eq!(backup_sequence("spendwise_20240315_081500_3.json"), 3);
        assert_eq!(backup_sequence("spendwise_20240315_081500_before-run.json"), 1);
        assert_eq!(backup_sequence("spendwise_20240315_081500_before-run-2.json"), 2);
    }

    #[test]
    fn notes_are_slugged() {
        assert_eq!(
            sanitize_backup_note(Some(" Before startup_run ")).as_deref(),
            Some("before-startup-run")
        );
        assert_eq!(sanitize_backup_note(Some("***")), None);
    }

    #[test]
    fn tmp_path_keeps_original_extension() {
        let tmp = tmp_path(Path::new("/data/spendwise.json"));
        assert_eq!(tmp, PathBuf::from("/data/spendwise.json.tmp"));
    }
}
