// libs/patient-cell/src/services/index.rs
//! In-memory read-through cache over the `patients` table.
//!
//! Staleness rules: every mutation made through [`super::HospitalManager`]
//! updates this index before the table. A failed table write therefore
//! leaves the index ahead of the table until the next sync or reload.
//! Writes made to the table by anything else are invisible here until
//! [`PatientIndex::rebuild`] runs.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::Patient;
use crate::services::schedule::AppointmentQueue;

#[derive(Debug)]
struct Entry {
    seq: u64,
    patient: Patient,
}

#[derive(Debug, Default)]
pub struct PatientIndex {
    entries: HashMap<String, Entry>,
    arrival: BTreeMap<u64, String>,
    by_phone: HashMap<String, HashSet<String>>,
    by_doctor: HashMap<String, HashSet<String>>,
    by_status: HashMap<String, HashSet<String>>,
    schedule: AppointmentQueue,
    next_seq: u64,
}

impl PatientIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index whose arrival order is the iteration order.
    pub fn from_patients(patients: impl IntoIterator<Item = Patient>) -> Self {
        let mut index = Self::new();
        index.rebuild(patients);
        index
    }

    pub fn rebuild(&mut self, patients: impl IntoIterator<Item = Patient>) {
        self.clear();
        for patient in patients {
            self.insert(patient);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.arrival.clear();
        self.by_phone.clear();
        self.by_doctor.clear();
        self.by_status.clear();
        self.schedule.clear();
        self.next_seq = 0;
    }

    /// Adds the record to every structure. A record with an id that is
    /// already present replaces the old one.
    pub fn insert(&mut self, patient: Patient) {
        if self.entries.contains_key(&patient.id) {
            self.remove(&patient.id);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let id = patient.id.clone();

        self.arrival.insert(seq, id.clone());
        bucket_insert(&mut self.by_phone, patient.phone.clone(), &id);
        bucket_insert(&mut self.by_doctor, patient.doctor.to_lowercase(), &id);
        bucket_insert(&mut self.by_status, patient.status.to_lowercase(), &id);
        self.schedule.push(patient.appointment_time, seq, id.clone());
        self.entries.insert(id, Entry { seq, patient });
    }

    pub fn remove(&mut self, id: &str) -> Option<Patient> {
        let Entry { seq, patient } = self.entries.remove(id)?;

        self.arrival.remove(&seq);
        bucket_remove(&mut self.by_phone, &patient.phone, id);
        bucket_remove(&mut self.by_doctor, &patient.doctor.to_lowercase(), id);
        bucket_remove(&mut self.by_status, &patient.status.to_lowercase(), id);
        self.schedule.remove(seq);

        Some(patient)
    }

    /// Moves the id to the new status bucket and returns the old status.
    pub fn update_status(&mut self, id: &str, new_status: &str) -> Option<String> {
        let entry = self.entries.get_mut(id)?;
        let old_status = std::mem::replace(&mut entry.patient.status, new_status.to_string());

        bucket_remove(&mut self.by_status, &old_status.to_lowercase(), id);
        bucket_insert(&mut self.by_status, new_status.to_lowercase(), id);

        Some(old_status)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.entries.get(id).map(|entry| &entry.patient)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all(&self) -> Vec<Patient> {
        self.arrival
            .values()
            .filter_map(|id| self.get(id))
            .cloned()
            .collect()
    }

    pub fn by_phone(&self, phone: &str) -> Vec<Patient> {
        self.collect_bucket(self.by_phone.get(phone))
    }

    pub fn by_doctor(&self, doctor: &str) -> Vec<Patient> {
        self.collect_bucket(self.by_doctor.get(&doctor.to_lowercase()))
    }

    pub fn by_status(&self, status: &str) -> Vec<Patient> {
        self.collect_bucket(self.by_status.get(&status.to_lowercase()))
    }

    pub fn priority_ordered(&self) -> Vec<Patient> {
        self.schedule
            .ordered()
            .into_iter()
            .filter_map(|slot| self.get(&slot.id))
            .cloned()
            .collect()
    }

    /// Bucket members in arrival order.
    fn collect_bucket(&self, ids: Option<&HashSet<String>>) -> Vec<Patient> {
        let Some(ids) = ids else {
            return Vec::new();
        };

        let mut entries: Vec<&Entry> = ids.iter().filter_map(|id| self.entries.get(id)).collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.patient.clone()).collect()
    }
}

fn bucket_insert(buckets: &mut HashMap<String, HashSet<String>>, key: String, id: &str) {
    buckets.entry(key).or_default().insert(id.to_string());
}

fn bucket_remove(buckets: &mut HashMap<String, HashSet<String>>, key: &str, id: &str) {
    if let Some(ids) = buckets.get_mut(key) {
        ids.remove(id);
        if ids.is_empty() {
            buckets.remove(key);
        }
    }
}
