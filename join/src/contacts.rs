//! The address book, stored under `contacts/<id>`.
//!
//! Editing a contact also rewrites the places that copied its name: the
//! assignee snapshots inside tasks and the matching user account.

use std::sync::Arc;

use join_core::ValidationError;
use join_core::contact::{Contact, ContactDraft, ContactEntry, ContactId, random_color, sort_by_name};
use join_core::user::UserRecord;
use serde_json::json;

use crate::store::{DocumentStore, StoreError, decode_collection};
use crate::tasks::{TaskError, TaskRepository};

const COLLECTION: &str = "contacts";
const USERS: &str = "user";

/// Errors from contact operations.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// The store request failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The form did not validate.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// No contact has this id.
    #[error("no contact with id {0}")]
    NotFound(ContactId),

    /// Propagating a rename into tasks failed.
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// What an edit changed besides the contact itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactUpdate {
    /// The record before the edit.
    pub previous: Contact,
    /// The record after the edit.
    pub updated: Contact,
    /// Tasks whose assignee snapshot was rewritten.
    pub tasks_renamed: usize,
    /// Key of the user account that was rewritten, if any matched.
    pub user: Option<String>,
}

/// Reads and writes contacts.
#[derive(Debug)]
pub struct ContactRepository<S> {
    store: Arc<S>,
    tasks: TaskRepository<S>,
}

impl<S> Clone for ContactRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tasks: self.tasks.clone(),
        }
    }
}

fn contact_path(id: &ContactId) -> String {
    format!("{COLLECTION}/{id}")
}

impl<S: DocumentStore> ContactRepository<S> {
    /// Repository over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            tasks: TaskRepository::new(Arc::clone(&store)),
            store,
        }
    }

    /// All contacts sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::Store`] if the read fails.
    pub async fn list(&self) -> Result<Vec<ContactEntry>, ContactError> {
        let value = self.store.get(COLLECTION).await?;
        let mut entries: Vec<ContactEntry> = decode_collection::<Contact>(COLLECTION, value)?
            .into_iter()
            .map(|(key, contact)| ContactEntry {
                id: ContactId::new(key),
                contact,
            })
            .collect();
        sort_by_name(&mut entries);
        Ok(entries)
    }

    /// One contact.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::NotFound`] for unknown ids.
    pub async fn get(&self, id: &ContactId) -> Result<Contact, ContactError> {
        let value = self.store.get(&contact_path(id)).await?;
        if value.is_null() {
            return Err(ContactError::NotFound(id.clone()));
        }
        Ok(serde_json::from_value(value).map_err(StoreError::from)?)
    }

    /// Validates `draft`, picks a badge colour and stores the contact.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::Invalid`] before any request if a field is
    /// invalid.
    pub async fn create(&self, draft: ContactDraft) -> Result<ContactEntry, ContactError> {
        let contact = draft.into_contact(random_color())?;
        self.insert(contact).await
    }

    /// Stores an already-built contact.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::Store`] if the write fails.
    pub async fn insert(&self, contact: Contact) -> Result<ContactEntry, ContactError> {
        let body = serde_json::to_value(&contact).map_err(StoreError::from)?;
        let key = self.store.post(COLLECTION, &body).await?;
        tracing::info!(contact = %key, "contact created");
        Ok(ContactEntry {
            id: ContactId::new(key),
            contact,
        })
    }

    /// Applies an edit and carries a changed name or email to the tasks and
    /// user account that copied it.
    ///
    /// The badge colour is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::NotFound`] for unknown ids and
    /// [`ContactError::Invalid`] before any write if a field is invalid.
    pub async fn update(&self, id: &ContactId, draft: ContactDraft) -> Result<ContactUpdate, ContactError> {
        let previous = self.get(id).await?;
        let updated = draft.into_contact(previous.color.clone())?;

        let body = json!({
            "name": updated.name,
            "eMail": updated.email,
            "phoneNumber": updated.phone,
            "initial": updated.initial,
        });
        self.store.patch(&contact_path(id), &body).await?;
        tracing::info!(contact = %id, "contact updated");

        let tasks_renamed = if previous.name == updated.name {
            0
        } else {
            self.tasks.rename_assignee(id, &updated.name).await?
        };

        let user = if previous.name == updated.name && previous.email == updated.email {
            None
        } else {
            self.sync_user(&previous, &updated).await?
        };

        Ok(ContactUpdate {
            previous,
            updated,
            tasks_renamed,
            user,
        })
    }

    /// Deletes a contact. Task assignments pointing at it are pruned on the
    /// next board load.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::Store`] if the delete fails.
    pub async fn delete(&self, id: &ContactId) -> Result<(), ContactError> {
        self.store.delete(&contact_path(id)).await?;
        tracing::info!(contact = %id, "contact deleted");
        Ok(())
    }

    /// Rewrites the account whose email or name matched the old contact.
    async fn sync_user(&self, previous: &Contact, updated: &Contact) -> Result<Option<String>, ContactError> {
        let users = decode_collection::<UserRecord>(USERS, self.store.get(USERS).await?)?;
        let Some((key, _)) = users
            .into_iter()
            .find(|(_, user)| user.email == previous.email || user.name == previous.name)
        else {
            return Ok(None);
        };
        let body = json!({
            "eMail": updated.email,
            "name": updated.name,
            "initial": updated.initial,
        });
        self.store.patch(&format!("{USERS}/{key}"), &body).await?;
        tracing::info!(user = %key, "user account follows contact edit");
        Ok(Some(key))
    }
}
