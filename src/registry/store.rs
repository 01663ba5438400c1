use crate::error::RegistryError;
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use dbprov_schema::DatabaseMetadata;
use serde::{Deserialize, Serialize};

/// Metadata the manager keeps for a database it provisioned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseRecord {
    pub name: String,
    pub engine: String,
    pub size: String,
    pub replicas: u32,
    pub identity: String,
    pub created_at: DateTime<Utc>,
}

impl From<DatabaseRecord> for DatabaseMetadata {
    fn from(r: DatabaseRecord) -> Self {
        DatabaseMetadata {
            name: r.name,
            engine: r.engine,
            size: r.size,
            replicas: r.replicas,
            identity: r.identity,
            created_at: r.created_at,
        }
    }
}

/// Case-folded key used for every name comparison ("DB1" and "db1" are the same database).
///
/// Simple case folding: each char maps to exactly one char, so `ſ`/`S` and `ς`/`Σ` match
/// while `ß` never expands to `ss`.
pub fn fold_name(name: &str) -> String {
    name.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    // Dotless i only folds under Turkic rules.
    if c == '\u{131}' {
        return c;
    }
    let upper = single(c.to_uppercase()).unwrap_or(c);
    single(upper.to_lowercase()).unwrap_or(upper)
}

fn single(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    Create,
    Delete,
}

/// Token identifying one reservation, so a stale release cannot clear a newer one.
pub type ReservationToken = u64;

/// Insertion-ordered records plus the names with a create/delete in flight.
#[derive(Debug, Default)]
pub struct Registry {
    records: Vec<DatabaseRecord>,
    pending: AHashMap<String, (PendingOp, ReservationToken)>,
    next_token: ReservationToken,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the record matching `name`, ignoring case.
    pub fn find(&self, name: &str) -> Option<usize> {
        let key = fold_name(name);
        self.records.iter().position(|r| fold_name(&r.name) == key)
    }

    pub fn get(&self, name: &str) -> Option<&DatabaseRecord> {
        self.find(name).and_then(|idx| self.records.get(idx))
    }

    /// Appends `record`. A name that is registered or claimed by a reservation is taken.
    pub fn insert(&mut self, record: DatabaseRecord) -> Result<(), RegistryError> {
        let claimed = self.pending.contains_key(&fold_name(&record.name));
        if claimed || self.find(&record.name).is_some() {
            return Err(RegistryError::AlreadyExists(record.name));
        }
        self.records.push(record);
        Ok(())
    }

    /// Removes the matching record, keeping the relative order of the rest.
    pub fn remove(&mut self, name: &str) -> Result<DatabaseRecord, RegistryError> {
        let idx = self
            .find(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        Ok(self.records.remove(idx))
    }

    /// Consumes the create claim identified by `token` and registers `record`.
    pub fn commit_insert(
        &mut self,
        record: DatabaseRecord,
        token: ReservationToken,
    ) -> Result<(), RegistryError> {
        self.take_claim(&record.name, token)?;
        self.insert(record)
    }

    /// Consumes the delete claim identified by `token` and removes the record.
    pub fn commit_remove(
        &mut self,
        name: &str,
        token: ReservationToken,
    ) -> Result<DatabaseRecord, RegistryError> {
        self.take_claim(name, token)?;
        self.remove(name)
    }

    pub fn list(&self) -> Vec<DatabaseRecord> {
        self.records.clone()
    }

    pub fn records(&self) -> &[DatabaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Claims `name` for a create. Fails if it is registered or already claimed.
    pub fn reserve_create(&mut self, name: &str) -> Result<ReservationToken, RegistryError> {
        let key = fold_name(name);
        if self.find(name).is_some() || self.pending.contains_key(&key) {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }
        Ok(self.claim(key, PendingOp::Create))
    }

    /// Claims a registered `name` for a delete and returns a copy of its record.
    pub fn reserve_delete(
        &mut self,
        name: &str,
    ) -> Result<(DatabaseRecord, ReservationToken), RegistryError> {
        let record = self
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let key = fold_name(name);
        if self.pending.contains_key(&key) {
            return Err(RegistryError::InProgress(name.to_string()));
        }
        let token = self.claim(key, PendingOp::Delete);
        Ok((record, token))
    }

    /// Drops the claim on `name` if `token` still owns it.
    pub fn release(&mut self, name: &str, token: ReservationToken) -> Option<PendingOp> {
        let key = fold_name(name);
        match self.pending.get(&key) {
            Some((op, held)) if *held == token => {
                let op = *op;
                self.pending.remove(&key);
                Some(op)
            }
            _ => None,
        }
    }

    fn take_claim(&mut self, name: &str, token: ReservationToken) -> Result<(), RegistryError> {
        self.release(name, token)
            .map(|_| ())
            .ok_or_else(|| RegistryError::ReservationLost(name.to_string()))
    }

    fn claim(&mut self, key: String, op: PendingOp) -> ReservationToken {
        self.next_token += 1;
        let token = self.next_token;
        self.pending.insert(key, (op, token));
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> DatabaseRecord {
        DatabaseRecord {
            name: name.to_string(),
            engine: "mysql".to_string(),
            size: "20MB".to_string(),
            replicas: 2,
            identity: format!("id-{name}"),
            created_at: Utc::now(),
        }
    }

    fn names(reg: &Registry) -> Vec<String> {
        reg.list().into_iter().map(|r| r.name).collect()
    }

    #[test]
    fn find_ignores_case() {
        let mut reg = Registry::new();
        reg.insert(record("dbName1")).unwrap();
        assert_eq!(reg.find("DBNAME1"), Some(0));
        assert_eq!(reg.find("dbname1"), Some(0));
        assert_eq!(reg.find("dbName2"), None);
    }

    #[test]
    fn find_folds_non_ascii() {
        let mut reg = Registry::new();
        reg.insert(record("ÄRGER")).unwrap();
        assert_eq!(reg.find("ärger"), Some(0));
    }

    #[test]
    fn long_s_and_final_sigma_fold_to_their_capitals() {
        let mut reg = Registry::new();
        reg.insert(record("ſdb")).unwrap();
        reg.insert(record("dbς")).unwrap();
        reg.insert(record("\u{212a}db")).unwrap();

        assert_eq!(reg.find("SDB"), Some(0));
        assert_eq!(reg.find("DBΣ"), Some(1));
        assert_eq!(reg.find("dbσ"), Some(1));
        assert_eq!(reg.find("kdb"), Some(2));
        for dup in ["SDB", "DBΣ", "Kdb"] {
            assert!(matches!(
                reg.insert(record(dup)),
                Err(RegistryError::AlreadyExists(_))
            ));
        }
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn folding_never_expands_or_applies_turkic_rules() {
        assert_eq!(fold_name("ẞ"), fold_name("ß"));
        assert_ne!(fold_name("ß"), fold_name("ss"));
        assert_ne!(fold_name("ı"), fold_name("I"));
        assert_eq!(fold_name("İ"), "İ");
    }

    #[test]
    fn insert_rejects_case_folded_duplicate() {
        let mut reg = Registry::new();
        reg.insert(record("DB1")).unwrap();
        assert_eq!(
            reg.insert(record("db1")),
            Err(RegistryError::AlreadyExists("db1".to_string()))
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_keeps_insertion_order() {
        let mut reg = Registry::new();
        for name in ["a", "b", "c", "d"] {
            reg.insert(record(name)).unwrap();
        }
        let removed = reg.remove("B").unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(names(&reg), vec!["a", "c", "d"]);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut reg = Registry::new();
        assert_eq!(
            reg.remove("ghost"),
            Err(RegistryError::NotFound("ghost".to_string()))
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn create_reservation_blocks_second_create() {
        let mut reg = Registry::new();
        let token = reg.reserve_create("alpha").unwrap();
        assert!(matches!(
            reg.reserve_create("ALPHA"),
            Err(RegistryError::AlreadyExists(_))
        ));

        assert_eq!(reg.release("alpha", token), Some(PendingOp::Create));
        assert!(reg.reserve_create("ALPHA").is_ok());
    }

    #[test]
    fn commit_insert_consumes_create_reservation() {
        let mut reg = Registry::new();
        let token = reg.reserve_create("alpha").unwrap();
        reg.commit_insert(record("alpha"), token).unwrap();
        assert_eq!(reg.pending_len(), 0);
        assert_eq!(names(&reg), vec!["alpha"]);
    }

    #[test]
    fn plain_insert_cannot_take_a_claimed_name() {
        let mut reg = Registry::new();
        let token = reg.reserve_create("alpha").unwrap();
        assert!(matches!(
            reg.insert(record("ALPHA")),
            Err(RegistryError::AlreadyExists(_))
        ));
        assert_eq!(reg.pending_len(), 1);

        reg.commit_insert(record("alpha"), token).unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn commit_with_stale_token_is_rejected() {
        let mut reg = Registry::new();
        let old = reg.reserve_create("alpha").unwrap();
        reg.release("alpha", old);
        let _new = reg.reserve_create("alpha").unwrap();
        assert_eq!(
            reg.commit_insert(record("alpha"), old),
            Err(RegistryError::ReservationLost("alpha".to_string()))
        );
        assert!(reg.is_empty());
        assert_eq!(reg.pending_len(), 1);
    }

    #[test]
    fn delete_reservation_requires_record_and_is_exclusive() {
        let mut reg = Registry::new();
        assert!(matches!(
            reg.reserve_delete("alpha"),
            Err(RegistryError::NotFound(_))
        ));

        reg.insert(record("alpha")).unwrap();
        let (rec, token) = reg.reserve_delete("Alpha").unwrap();
        assert_eq!(rec.name, "alpha");
        assert!(matches!(
            reg.reserve_delete("alpha"),
            Err(RegistryError::InProgress(_))
        ));
        assert!(matches!(
            reg.reserve_create("alpha"),
            Err(RegistryError::AlreadyExists(_))
        ));

        reg.commit_remove("alpha", token).unwrap();
        assert_eq!(reg.pending_len(), 0);
        assert!(reg.is_empty());
        assert_eq!(reg.release("alpha", token), None);
    }

    #[test]
    fn delete_during_pending_create_is_not_found() {
        let mut reg = Registry::new();
        reg.reserve_create("alpha").unwrap();
        assert!(matches!(
            reg.reserve_delete("ALPHA"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn stale_release_does_not_clear_newer_claim() {
        let mut reg = Registry::new();
        let old = reg.reserve_create("alpha").unwrap();
        reg.release("alpha", old);
        let _new = reg.reserve_create("alpha").unwrap();
        assert_eq!(reg.release("alpha", old), None);
        assert_eq!(reg.pending_len(), 1);
    }
}
