//! Read-only credential and cookie lookups used when describing requests.
//!
//! # Design
//! Both stores are injected into the [`Describer`](crate::describe::Describer)
//! as trait objects instead of being process-wide singletons. Lookups return
//! owned snapshots, so a store can change while a description is rendered.
//! The in-memory implementations cover tests and the demo; a poisoned lock
//! reads as an empty store.

use std::sync::RwLock;

use ureq::http::Uri;

use crate::http::Credential;

/// Where a stored credential applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionSpace {
    pub host: String,
    pub scheme: String,
    pub realm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub space: ProtectionSpace,
    pub credential: Credential,
}

pub trait CredentialStore: Send + Sync {
    fn credentials(&self) -> Vec<StoredCredential>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: path.into(),
        }
    }
}

pub trait CookieStore: Send + Sync {
    fn cookies_for(&self, url: &str) -> Vec<Cookie>;
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<Vec<StoredCredential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, space: ProtectionSpace, credential: Credential) {
        if let Ok(mut entries) = self.entries.write() {
            entries.push(StoredCredential { space, credential });
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn credentials(&self) -> Vec<StoredCredential> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: RwLock<Vec<Cookie>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a cookie, replacing one with the same name, domain and path.
    pub fn insert(&self, cookie: Cookie) {
        if let Ok(mut cookies) = self.cookies.write() {
            cookies.retain(|c| !(c.name == cookie.name && c.domain == cookie.domain && c.path == cookie.path));
            cookies.push(cookie);
        }
    }
}

impl CookieStore for MemoryCookieStore {
    fn cookies_for(&self, url: &str) -> Vec<Cookie> {
        let Ok(uri) = url.parse::<Uri>() else {
            return Vec::new();
        };
        let Some(host) = uri.host() else {
            return Vec::new();
        };
        let path = uri.path();
        self.cookies
            .read()
            .map(|cookies| {
                cookies
                    .iter()
                    .filter(|c| domain_matches(host, &c.domain) && path.starts_with(c.path.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn domain_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim_start_matches('.');
    host.eq_ignore_ascii_case(domain)
        || host
            .to_ascii_lowercase()
            .ends_with(&format!(".{}", domain.to_ascii_lowercase()))
}
