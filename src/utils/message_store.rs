#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::errors::Errors;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Ids are handed out starting here and never reused.
pub const FIRST_MESSAGE_ID : i64 = 1;

// Field name of the identity key in message records.
const ID_FIELD : &str = "id";

// ***************************************************************************
//                               Message Record
// ***************************************************************************
// ---------------------------------------------------------------------------
// Message:
// ---------------------------------------------------------------------------
/// The stored resource.  The id always equals the key the record is stored
/// under.
#[derive(Object, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub content: String,
}

impl Message {
    pub fn new(id: i64, content: String) -> Self {
        Self { id, content }
    }
}

// ***************************************************************************
//                               Message Store
// ***************************************************************************
// ---------------------------------------------------------------------------
// StoreState:
// ---------------------------------------------------------------------------
// Ids are assigned in increasing order, so iterating the map by key is the
// same as iterating in insertion order.
#[derive(Debug)]
struct StoreState {
    messages: BTreeMap<i64, Message>,
    next_id: i64,
}

// ---------------------------------------------------------------------------
// MessageStore:
// ---------------------------------------------------------------------------
/** In-memory collection of messages.  A single lock guards both the records
 * and the id counter, and every operation holds it from start to finish, so
 * readers never observe a half-applied write and no two creates can be handed
 * the same id.
 *
 * The store is constructed once at startup and shared with the request
 * handlers through an `Arc`.
 */
#[derive(Debug)]
pub struct MessageStore {
    state: Mutex<StoreState>,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    /// Create an empty store whose first assigned id is 1.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                messages: BTreeMap::new(),
                next_id: FIRST_MESSAGE_ID,
            }),
        }
    }

    #[cfg(test)]
    fn with_next_id(next_id: i64) -> Self {
        Self {
            state: Mutex::new(StoreState {
                messages: BTreeMap::new(),
                next_id,
            }),
        }
    }

    // A panic while holding the lock cannot leave a record half written since
    // each mutation is a single map call, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All current messages in id order.
    pub fn list(&self) -> Vec<Message> {
        self.lock().messages.values().cloned().collect()
    }

    pub fn get(&self, id: i64) -> Result<Message, Errors> {
        self.lock()
            .messages
            .get(&id)
            .cloned()
            .ok_or(Errors::MessageNotFound(id))
    }

    /// Store a new message under the next id from the counter.  Fails only
    /// when the counter can't advance past the id it would hand out.
    pub fn create(&self, content: String) -> Result<Message, Errors> {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id = id.checked_add(1).ok_or(Errors::IdsExhausted)?;

        let message = Message::new(id, content);
        state.messages.insert(id, message.clone());
        Ok(message)
    }

    /// Full replace: the new content becomes the record, the id is kept.
    pub fn replace(&self, id: i64, content: String) -> Result<Message, Errors> {
        let mut state = self.lock();
        match state.messages.get_mut(&id) {
            Some(existing) => {
                *existing = Message::new(id, content);
                Ok(existing.clone())
            }
            None => Err(Errors::MessageNotFound(id)),
        }
    }

    /** Override the fields of an existing message with the keys present in
     * the patch.  Keys that are absent leave the stored values alone, and
     * keys that are not message fields are ignored.  The merged result must
     * still be a valid message.
     *
     * An id in the patch is only accepted when it matches the stored id; any
     * other value is rejected and the record is left untouched.
     */
    pub fn merge_patch(&self, id: i64, patch: &Map<String, Value>) -> Result<Message, Errors> {
        let mut state = self.lock();
        let existing = state.messages.get(&id).ok_or(Errors::MessageNotFound(id))?;

        if let Some(patch_id) = patch.get(ID_FIELD) {
            if !same_id(patch_id, id) {
                return Err(Errors::IdentityChange(id, patch_id.to_string()));
            }
        }

        let mut merged = match serde_json::to_value(existing) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                return Err(Errors::InvalidMessage(format!("stored record is not an object: {}", other)))
            }
            Err(e) => return Err(Errors::InvalidMessage(e.to_string())),
        };
        // A matching id may be spelled as a float, so the stored one is kept.
        for (key, value) in patch.iter().filter(|(key, _)| key.as_str() != ID_FIELD) {
            merged.insert(key.clone(), value.clone());
        }

        let updated: Message = serde_json::from_value(Value::Object(merged))
            .map_err(|e| Errors::InvalidMessage(e.to_string()))?;
        state.messages.insert(id, updated.clone());
        Ok(updated)
    }

    /// Remove a message.  Deleting an id that is not present is an error,
    /// including a second delete of the same id.
    pub fn delete(&self, id: i64) -> Result<(), Errors> {
        match self.lock().messages.remove(&id) {
            Some(_) => Ok(()),
            None => Err(Errors::MessageNotFound(id)),
        }
    }
}

// ***************************************************************************
//                            Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// same_id:
// ---------------------------------------------------------------------------
// True when a JSON number denotes the given id.  1 and 1.0 both match id 1;
// strings, nulls and fractional numbers never match.
fn same_id(value: &Value, id: i64) -> bool {
    match value.as_i64() {
        Some(v) => v == id,
        None => value.as_f64().is_some_and(|f| f.fract() == 0.0 && f == id as f64),
    }
}
