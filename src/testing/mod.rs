//! Fixtures for unit tests running against the in-memory store.

use crate::database::models::{Account, NewAccount, NewTutor, Role, Tutor, TutorFields};
use crate::database::{MemoryStore, Store};

pub fn store() -> MemoryStore {
    MemoryStore::new()
}

pub fn tutor_fields(name: &str, subject: &str) -> TutorFields {
    TutorFields {
        name: name.to_string(),
        subject: subject.to_string(),
        description: Some(format!("{} teaches {}", name, subject)),
        contact_email: format!("{}@example.com", name.to_lowercase()),
    }
}

/// Account with an unusable password hash; these fixtures never log in.
pub async fn account(store: &dyn Store, username: &str, role: Role) -> Account {
    let (account, _) = store
        .create_account(
            NewAccount {
                username: username.to_string(),
                password_hash: "!".to_string(),
                role,
            },
            None,
        )
        .await
        .expect("seed account");
    account
}

/// Tutor account together with its linked tutor profile.
pub async fn tutor_account(store: &dyn Store, username: &str, name: &str, subject: &str) -> (Account, Tutor) {
    let (account, tutor) = store
        .create_account(
            NewAccount {
                username: username.to_string(),
                password_hash: "!".to_string(),
                role: Role::Tutor,
            },
            Some(tutor_fields(name, subject)),
        )
        .await
        .expect("seed tutor account");
    (account, tutor.expect("tutor profile"))
}

/// Tutor created by an admin, not linked to any account.
pub async fn unlinked_tutor(store: &dyn Store, name: &str, subject: &str) -> Tutor {
    store
        .insert_tutor(NewTutor {
            account_id: None,
            fields: tutor_fields(name, subject),
        })
        .await
        .expect("seed tutor")
}
