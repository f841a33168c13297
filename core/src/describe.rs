//! Render a request as an equivalent `curl` command for debug logging.
//!
//! # Design
//! Rendering is a pure function of the request and two read-only lookups
//! (stored credentials, cookies) injected as trait objects, so identical
//! inputs always produce identical text. Each optional part is emitted only
//! when it applies; nothing here can fail. The executor logs the masked form,
//! which hides passwords.

use std::fmt::Write as _;
use std::sync::Arc;

use ureq::http::Uri;

use crate::http::{Credential, HttpMethod, HttpRequest};
use crate::store::{CookieStore, CredentialStore, MemoryCookieStore, MemoryCredentialStore};

#[derive(Clone)]
pub struct Describer {
    credentials: Arc<dyn CredentialStore>,
    cookies: Arc<dyn CookieStore>,
}

impl std::fmt::Debug for Describer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Describer").finish_non_exhaustive()
    }
}

impl Default for Describer {
    fn default() -> Self {
        Self::new(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryCookieStore::new()),
        )
    }
}

impl Describer {
    pub fn new(credentials: Arc<dyn CredentialStore>, cookies: Arc<dyn CookieStore>) -> Self {
        Self { credentials, cookies }
    }

    pub fn describe(&self, request: &HttpRequest) -> String {
        self.render(request, false)
    }

    /// Like [`Describer::describe`], with the password replaced by `***`.
    pub fn describe_masked(&self, request: &HttpRequest) -> String {
        self.render(request, true)
    }

    fn render(&self, request: &HttpRequest, mask_password: bool) -> String {
        let mut s = String::from("\u{1F340} curl -i \\\n");

        if let Some(credential) = self.credential_for(request) {
            let password = if mask_password { "***" } else { credential.password.as_str() };
            let _ = writeln!(s, "-u {}:{password} \\", credential.user);
        }

        if request.method() != HttpMethod::Get {
            let _ = writeln!(s, "-X {} \\", request.method().as_str());
        }

        for (name, value) in request.headers() {
            let _ = writeln!(s, "-H \"{}: {}\" \\", escape(name), escape(value));
        }

        let cookies = self.cookies.cookies_for(request.url());
        if !cookies.is_empty() {
            let header = cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = writeln!(s, "-H \"Cookie: {header}\" \\");
        }

        if let Some(body) = request.body().and_then(|b| std::str::from_utf8(b).ok()) {
            let _ = writeln!(s, "-d \"{}\" \\", escape(body));
        }

        let _ = writeln!(s, "\"{}\"", request.url());
        s
    }

    /// The request's own credential, else the stored credential with the most
    /// specific host suffix for the URL's scheme. Realms are not considered.
    fn credential_for(&self, request: &HttpRequest) -> Option<Credential> {
        if let Some(credential) = request.credential() {
            return Some(credential.clone());
        }
        let uri = request.url().parse::<Uri>().ok()?;
        let host = uri.host()?;
        let scheme = uri.scheme_str()?;
        self.credentials
            .credentials()
            .into_iter()
            .filter(|stored| stored.space.scheme.eq_ignore_ascii_case(scheme) && host.ends_with(stored.space.host.as_str()))
            .max_by_key(|stored| stored.space.host.len())
            .map(|stored| stored.credential)
    }
}

fn escape(s: &str) -> String {
    s.replace('"', "\\\"")
}
