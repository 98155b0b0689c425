use std::collections::HashMap;
use std::sync::Mutex;

/// Somewhere to keep the SMTP password outside the config file.
#[allow(async_fn_in_trait)]
pub trait SecretStore {
    async fn get_secret(&self, service: &str, user: &str) -> Result<Option<String>, String>;
    async fn set_secret(&self, service: &str, user: &str, secret: &str) -> Result<(), String>;
    async fn delete_secret(&self, service: &str, user: &str) -> Result<(), String>;
}

/// The desktop keyring via Secret Service.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecretServiceStore;

async fn connect() -> Result<oo7::Keyring, String> {
    oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))
}

fn attributes<'a>(service: &'a str, user: &'a str) -> HashMap<&'a str, &'a str> {
    let mut attrs = HashMap::new();
    attrs.insert("service", service);
    attrs.insert("user", user);
    attrs
}

impl SecretStore for SecretServiceStore {
    async fn get_secret(&self, service: &str, user: &str) -> Result<Option<String>, String> {
        let keyring = connect().await?;
        let items = keyring
            .search_items(&attributes(service, user))
            .await
            .map_err(|e| format!("Failed to search keyring: {}", e))?;

        let Some(item) = items.first() else {
            return Ok(None);
        };
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| format!("Failed to read secret: {}", e))?;
        let secret = String::from_utf8(secret_bytes.to_vec())
            .map_err(|e| format!("Invalid UTF-8 in secret: {}", e))?;
        Ok(Some(secret))
    }

    async fn set_secret(&self, service: &str, user: &str, secret: &str) -> Result<(), String> {
        let keyring = connect().await?;
        keyring
            .create_item(
                &format!("Schedule Maker SMTP ({})", user),
                &attributes(service, user),
                secret.as_bytes(),
                true, // replace existing
            )
            .await
            .map_err(|e| format!("Failed to store password: {}", e))?;
        log::info!("SMTP password for {} stored in keyring", user);
        Ok(())
    }

    async fn delete_secret(&self, service: &str, user: &str) -> Result<(), String> {
        let keyring = connect().await?;
        let items = keyring
            .search_items(&attributes(service, user))
            .await
            .map_err(|e| format!("Failed to search keyring: {}", e))?;
        for item in items {
            item.delete()
                .await
                .map_err(|e| format!("Failed to delete password: {}", e))?;
        }
        Ok(())
    }
}

/// Process-local store, for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<(String, String), String>>,
}

impl MemorySecretStore {
    fn key(service: &str, user: &str) -> (String, String) {
        (service.to_string(), user.to_string())
    }
}

impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, service: &str, user: &str) -> Result<Option<String>, String> {
        let secrets = self.secrets.lock().map_err(|e| e.to_string())?;
        Ok(secrets.get(&Self::key(service, user)).cloned())
    }

    async fn set_secret(&self, service: &str, user: &str, secret: &str) -> Result<(), String> {
        let mut secrets = self.secrets.lock().map_err(|e| e.to_string())?;
        secrets.insert(Self::key(service, user), secret.to_string());
        Ok(())
    }

    async fn delete_secret(&self, service: &str, user: &str) -> Result<(), String> {
        let mut secrets = self.secrets.lock().map_err(|e| e.to_string())?;
        secrets.remove(&Self::key(service, user));
        Ok(())
    }
}
