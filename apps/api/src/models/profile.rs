use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One employment record. The id is minted at creation, never derived from
/// field content, and never reused after deletion, so edits never change
/// identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEntry {
    pub id: Uuid,
    pub position: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

impl ProfileEntry {
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            position: String::new(),
            company: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            description: String::new(),
        }
    }

    pub fn set(&mut self, field: EntryField, value: String) {
        let slot = match field {
            EntryField::Position => &mut self.position,
            EntryField::Company => &mut self.company,
            EntryField::StartDate => &mut self.start_date,
            EntryField::EndDate => &mut self.end_date,
            EntryField::Description => &mut self.description,
        };
        if *slot != value {
            *slot = value;
        }
    }
}

/// Opaque photo reference. Never sent to the engine, never touched by any
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub mime_type: String,
    /// Standard base64 of the image bytes.
    pub data: String,
}

/// The candidate profile. Always fully populated and renderable: absent data
/// is an empty string or a `None` photo, never a missing key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub full_name: String,
    pub photo: Option<Photo>,
    pub birth_date: String,
    /// Insertion order = display/export order; preserved by every pipeline.
    pub entries: Vec<ProfileEntry>,
}

/// Addressable top-level text fields for single-field updates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    FullName,
    BirthDate,
}

/// Addressable entry fields for single-field updates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryField {
    Position,
    Company,
    StartDate,
    EndDate,
    Description,
}

impl Profile {
    /// Placeholder data shown at process start, before any extraction.
    pub fn sample() -> Self {
        Self {
            full_name: "Jan Kowalski".to_string(),
            photo: None,
            birth_date: "16/10/1985".to_string(),
            entries: vec![ProfileEntry {
                id: Uuid::new_v4(),
                position: "Pracownik magazynu".to_string(),
                company: "Amazon".to_string(),
                start_date: "2020-01".to_string(),
                end_date: "2022-12".to_string(),
                description: "Kompletowanie zamówień, obsługa skanera, dbanie o porządek."
                    .to_string(),
            }],
        }
    }

    pub fn set(&mut self, field: ProfileField, value: String) {
        let slot = match field {
            ProfileField::FullName => &mut self.full_name,
            ProfileField::BirthDate => &mut self.birth_date,
        };
        if *slot != value {
            *slot = value;
        }
    }

    pub fn entry_mut(&mut self, id: Uuid) -> Option<&mut ProfileEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Appends an empty entry at the end of the sequence and returns its id.
    pub fn append_entry(&mut self) -> Uuid {
        let entry = ProfileEntry::empty();
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Removes the entry with the given id. Silent no-op if absent; remaining
    /// entries keep their ids and order.
    pub fn remove_entry(&mut self, id: Uuid) {
        self.entries.retain(|e| e.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_fully_populated() {
        let profile = Profile::sample();
        assert_eq!(profile.full_name, "Jan Kowalski");
        assert_eq!(profile.birth_date, "16/10/1985");
        assert!(profile.photo.is_none());
        assert_eq!(profile.entries.len(), 1);
        assert_eq!(profile.entries[0].company, "Amazon");
    }

    #[test]
    fn test_append_entry_is_empty_and_last() {
        let mut profile = Profile::sample();
        let id = profile.append_entry();
        let last = profile.entries.last().unwrap();
        assert_eq!(last.id, id);
        assert!(last.position.is_empty());
        assert!(last.description.is_empty());
        assert_eq!(profile.entries.len(), 2);
    }

    #[test]
    fn test_appended_ids_are_unique() {
        let mut profile = Profile::sample();
        let a = profile.append_entry();
        let b = profile.append_entry();
        assert_ne!(a, b);
        assert_ne!(a, profile.entries[0].id);
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let mut profile = Profile::sample();
        let before = profile.clone();
        profile.remove_entry(Uuid::new_v4());
        assert_eq!(profile, before);
    }

    #[test]
    fn test_remove_preserves_order_and_ids() {
        let mut profile = Profile::sample();
        let a = profile.append_entry();
        let b = profile.append_entry();
        profile.remove_entry(a);
        let ids: Vec<Uuid> = profile.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1], b);
    }

    #[test]
    fn test_set_entry_field_keeps_id() {
        let mut profile = Profile::sample();
        let id = profile.entries[0].id;
        profile
            .entry_mut(id)
            .unwrap()
            .set(EntryField::Position, "Forklift Operator".to_string());
        assert_eq!(profile.entries[0].id, id);
        assert_eq!(profile.entries[0].position, "Forklift Operator");
    }

    #[test]
    fn test_set_same_value_is_idempotent() {
        let mut profile = Profile::sample();
        let before = profile.clone();
        profile.set(ProfileField::FullName, "Jan Kowalski".to_string());
        assert_eq!(profile, before);
    }

    #[test]
    fn test_entry_mut_unknown_id_is_none() {
        let mut profile = Profile::sample();
        assert!(profile.entry_mut(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let profile = Profile::sample();
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("fullName").is_some());
        assert!(value.get("birthDate").is_some());
        assert!(value["entries"][0].get("startDate").is_some());
    }
}
