use crate::core_ftpcommand::command::Command;
use chrono::{DateTime, Local};
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A value captured while handling a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedValue {
    Text(String),
    Bytes(Vec<u8>),
}

impl From<&str> for RecordedValue {
    fn from(value: &str) -> Self {
        RecordedValue::Text(value.to_string())
    }
}

impl From<String> for RecordedValue {
    fn from(value: String) -> Self {
        RecordedValue::Text(value)
    }
}

impl From<Vec<u8>> for RecordedValue {
    fn from(value: Vec<u8>) -> Self {
        RecordedValue::Bytes(value)
    }
}

/// Data captured for one handler invocation.
///
/// Keys keep insertion order; setting an existing key replaces its value in
/// place.
#[derive(Debug, Clone)]
pub struct InvocationRecord {
    command: Command,
    client_host: Option<IpAddr>,
    time: DateTime<Local>,
    data: Vec<(String, RecordedValue)>,
}

impl InvocationRecord {
    pub fn new(command: &Command, client_host: Option<IpAddr>) -> Self {
        Self {
            command: command.clone(),
            client_host,
            time: Local::now(),
            data: Vec::new(),
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<RecordedValue>) {
        let value = value.into();
        match self.data.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.data.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RecordedValue> {
        self.data.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(RecordedValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        match self.get(key) {
            Some(RecordedValue::Bytes(bytes)) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|(k, _)| k.as_str())
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn client_host(&self) -> Option<IpAddr> {
        self.client_host
    }

    pub fn time(&self) -> DateTime<Local> {
        self.time
    }
}

/// Append-only list of records kept by one handler.
///
/// Recording is best-effort: a poisoned lock is recovered rather than
/// reported, so recording never fails the handler.
#[derive(Debug, Default)]
pub struct InvocationHistory {
    records: Mutex<Vec<InvocationRecord>>,
}

impl InvocationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn records_guard(&self) -> MutexGuard<'_, Vec<InvocationRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, record: InvocationRecord) {
        self.records_guard().push(record);
    }

    pub fn len(&self) -> usize {
        self.records_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<InvocationRecord> {
        self.records_guard().get(index).cloned()
    }

    pub fn last(&self) -> Option<InvocationRecord> {
        self.records_guard().last().cloned()
    }

    pub fn records(&self) -> Vec<InvocationRecord> {
        self.records_guard().clone()
    }

    pub fn clear(&self) {
        self.records_guard().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_insertion_order() {
        let command = Command::new("STOR", &["a.txt"]).unwrap();
        let mut record = InvocationRecord::new(&command, None);
        record.set("pathname", "a.txt");
        record.set("file_contents", b"abc".to_vec());
        record.set("pathname", "b.txt");

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["pathname", "file_contents"]);
        assert_eq!(record.get_text("pathname"), Some("b.txt"));
        assert_eq!(record.get_bytes("file_contents"), Some(&b"abc"[..]));
        assert_eq!(record.get_text("file_contents"), None);
        assert!(!record.contains_key("missing"));
        assert_eq!(record.command().verb(), "STOR");
    }

    #[test]
    fn test_history_append_and_clear() {
        let history = InvocationHistory::new();
        let command = Command::new("NOOP", &[]).unwrap();
        history.push(InvocationRecord::new(&command, None));
        history.push(InvocationRecord::new(&command, None));
        assert_eq!(history.len(), 2);
        assert!(history.get(1).is_some());
        assert!(history.get(2).is_none());

        history.clear();
        assert!(history.is_empty());
        assert!(history.last().is_none());
    }
}
