//! Sample data and test accounts.

use qd_auth::{AuthError, AuthProvider, DEMO_ACCOUNTS};
use qd_core::enums::{Collection, Role};
use qd_core::identity::AuthIdentity;
use qd_store::timestamp::{server_timestamp, timestamp_value};
use qd_store::{DocumentStore, Fields, StoreError};
use serde_json::{Value, json};
use tracing::info;

const SAMPLE_CATEGORIES: [(&str, &str); 5] = [
    ("Technical Support", "Hardware and software issues"),
    ("Account Issues", "Login and account related problems"),
    ("Billing", "Payment and subscription questions"),
    ("Feature Request", "Suggestions for new features"),
    ("General Inquiry", "General questions and information"),
];

/// What [`initialize_sample_data`] wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub tickets: usize,
}

fn object(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

fn sample_tickets() -> Vec<Fields> {
    let now = chrono::Utc::now();
    vec![
        object(json!({
            "title": "Login Issues",
            "description": "I cannot log into my account. Getting authentication error.",
            "status": "open",
            "category": "Account Issues",
            "priority": "high",
            "createdBy": "sample-user-1",
            "createdAt": server_timestamp(),
            "updatedAt": server_timestamp(),
            "replies": [],
            "votes": 0,
            "votedBy": []
        })),
        object(json!({
            "title": "Feature Request: Dark Mode",
            "description": "Would love to have a dark mode option for better user experience.",
            "status": "in_progress",
            "category": "Feature Request",
            "priority": "medium",
            "createdBy": "sample-user-2",
            "createdAt": server_timestamp(),
            "updatedAt": server_timestamp(),
            "replies": [],
            "votes": 0,
            "votedBy": []
        })),
        object(json!({
            "title": "Billing Question",
            "description": "I was charged twice this month. Can someone help me understand why?",
            "status": "resolved",
            "category": "Billing",
            "priority": "medium",
            "createdBy": "sample-user-3",
            "createdAt": server_timestamp(),
            "updatedAt": server_timestamp(),
            "replies": [{
                "id": "1",
                "message": "We have reviewed your account and issued a refund for the duplicate charge.",
                "authorId": "support-agent-1",
                "authorName": "Support Team",
                "timestamp": timestamp_value(now)
            }],
            "votes": 0,
            "votedBy": []
        })),
    ]
}

/// Write the default categories and sample tickets, each set only if its
/// collection is empty.
///
/// # Errors
///
/// Returns the first store error; documents written before it remain.
pub async fn initialize_sample_data(store: &dyn DocumentStore) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    if store
        .list_documents(Collection::Categories)
        .await?
        .is_empty()
    {
        for (name, description) in SAMPLE_CATEGORIES {
            store
                .add_document(
                    Collection::Categories,
                    object(json!({ "name": name, "description": description })),
                )
                .await?;
            report.categories += 1;
        }
        info!(count = report.categories, "sample categories created");
    }

    if store.list_documents(Collection::Tickets).await?.is_empty() {
        for ticket in sample_tickets() {
            store.add_document(Collection::Tickets, ticket).await?;
            report.tickets += 1;
        }
        info!(count = report.tickets, "sample tickets created");
    }

    Ok(report)
}

/// Write (or overwrite) the profile document `users/{uid}`.
///
/// # Errors
///
/// Returns the store's error if the write fails.
pub async fn create_user_profile(
    store: &dyn DocumentStore,
    uid: &str,
    email: &str,
    name: &str,
    role: Role,
    language: Option<&str>,
) -> Result<(), StoreError> {
    let mut fields = object(json!({
        "email": email,
        "name": name,
        "role": role,
        "createdAt": server_timestamp(),
        "updatedAt": server_timestamp()
    }));
    if let Some(language) = language {
        fields.insert("language".into(), json!(language));
    }
    store.set_document(Collection::Users, uid, fields).await?;
    info!(user = %uid, %role, "user profile created");
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct TestAccount {
    pub email: &'static str,
    pub password: &'static str,
    pub name: &'static str,
    pub role: Role,
}

pub const TEST_USER: TestAccount = TestAccount {
    email: "test@quickdesk.com",
    password: "testpassword123",
    name: "Test User",
    role: Role::EndUser,
};

pub const TEST_AGENT: TestAccount = TestAccount {
    email: "agent@quickdesk.com",
    password: "agentpassword123",
    name: "Support Agent",
    role: Role::SupportAgent,
};

pub const TEST_ADMIN: TestAccount = TestAccount {
    email: "admin@quickdesk.com",
    password: "adminpassword123",
    name: "System Admin",
    role: Role::Admin,
};

pub const TEST_ACCOUNTS: [TestAccount; 3] = [TEST_USER, TEST_AGENT, TEST_ADMIN];

/// Register `account` and write its profile. If the email is already
/// registered, sign in instead and leave the existing profile alone.
///
/// Either way the provider ends up signed in as `account`.
///
/// # Errors
///
/// Returns `AuthError` if both creation and the fallback sign-in fail, or
/// the profile cannot be written.
pub async fn create_test_account(
    provider: &dyn AuthProvider,
    store: &dyn DocumentStore,
    account: &TestAccount,
    language: Option<&str>,
) -> Result<AuthIdentity, AuthError> {
    match provider
        .create_user(account.email, account.password, Some(account.name))
        .await
    {
        Ok(identity) => {
            create_user_profile(
                store,
                &identity.uid,
                account.email,
                account.name,
                account.role,
                language,
            )
            .await?;
            info!(email = %account.email, uid = %identity.uid, "test account created");
            Ok(identity)
        }
        Err(AuthError::EmailAlreadyInUse(_)) => {
            info!(email = %account.email, "test account exists, signing in");
            provider.sign_in(account.email, account.password).await
        }
        Err(error) => Err(error),
    }
}

/// [`create_test_account`] for the user, agent and admin accounts in turn.
///
/// # Errors
///
/// Stops at the first account that fails.
pub async fn create_test_accounts(
    provider: &dyn AuthProvider,
    store: &dyn DocumentStore,
    language: Option<&str>,
) -> Result<Vec<AuthIdentity>, AuthError> {
    let mut identities = Vec::with_capacity(TEST_ACCOUNTS.len());
    for account in &TEST_ACCOUNTS {
        identities.push(create_test_account(provider, store, account, language).await?);
    }
    Ok(identities)
}

/// Write profiles for the built-in demo accounts so their roles resolve.
///
/// # Errors
///
/// Returns the store's error if a write fails.
pub async fn seed_demo_profiles(store: &dyn DocumentStore, language: Option<&str>) -> Result<(), StoreError> {
    for demo in DEMO_ACCOUNTS {
        create_user_profile(store, demo.uid, demo.email, demo.name, demo.role, language).await?;
    }
    Ok(())
}
