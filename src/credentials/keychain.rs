use std::process::Command;

/// Read-only access to the OS secret store.
///
/// Injected into [`super::CredentialLocator`] so discovery can be
/// exercised without touching the real Keychain.
pub trait SecretStore {
    /// Raw secret bytes stored under a (service, account) pair, or `None`.
    fn lookup(&self, service: &str, account: &str) -> Option<Vec<u8>>;
}

/// macOS Keychain access via the `security` CLI.
///
/// The first lookup per process may prompt the user to allow access.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keychain;

impl SecretStore for Keychain {
    fn lookup(&self, service: &str, account: &str) -> Option<Vec<u8>> {
        let output = Command::new("security")
            .args(["find-generic-password", "-s", service, "-a", account, "-w"])
            .output()
            .ok()?;

        if !output.status.success() {
            log::trace!("No keychain item for service {service}");
            return None;
        }

        let secret = String::from_utf8(output.stdout).ok()?;
        let secret = secret.trim_end();
        if secret.is_empty() {
            None
        } else {
            Some(secret.as_bytes().to_vec())
        }
    }
}
