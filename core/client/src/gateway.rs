//! HTTP gateway to the vault-management backend.

use async_trait::async_trait;
use reqwest::{header, Client, Method};
use tracing::debug;
use url::Url;

use vaultdeck_common::{Error, Result, SecretString, VaultState};

use crate::api::VaultApi;
use crate::token::TokenResolver;
use crate::wire::{
    decode_envelope, AppConfig, AppConfigItem, AppOptionsPatch, Envelope, MasterkeyItem,
    StateChange, SubPathListing, VaultCredential, VaultItem, VaultList, VaultOptionsPatch,
    VaultRecord,
};

/// Single-attempt HTTP request/response boundary to the backend.
///
/// Attaches the bearer token when available, serializes bodies as JSON and
/// validates the response envelope. Holds no vault state of its own; all
/// mutation happens in the store on top of the typed results.
pub struct HttpGateway {
    http: Client,
    base_url: Url,
    token: TokenResolver,
}

impl HttpGateway {
    /// Create a gateway for the given endpoint.
    ///
    /// The endpoint may carry the session token in its fragment
    /// (`http://127.0.0.1:9763/#token=...`); the fragment is stripped off
    /// here and handed to the resolver so it never shows up in request URLs.
    pub fn new(endpoint: Url) -> Result<Self> {
        let mut base_url = endpoint;
        let token = TokenResolver::from_url(&mut base_url);

        let http = Client::builder()
            .user_agent("VaultDeck/0.1")
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Build the URL for an `api/...` resource.
    fn endpoint(&self, resource: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::InvalidInput("Endpoint URL cannot be a base".to_string()))?;
            segments.pop_if_empty().push("api");
            for segment in resource.split('/') {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    /// Issue a single request and decode the envelope.
    ///
    /// The envelope is parsed regardless of the HTTP status line; only a
    /// failure to reach the backend or to read the body is a network error.
    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        resource: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let url = self.endpoint(resource)?;
        debug!(%method, resource, "backend request");

        let mut request = self.http.request(method, url);

        let token = self.token.resolve();
        if !token.is_empty() {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        decode_envelope(&text)
    }
}

#[async_trait]
impl VaultApi for HttpGateway {
    async fn list_vaults(&self) -> Result<Vec<VaultRecord>> {
        let list: VaultList = self.call(Method::GET, "vaults", None).await?;
        Ok(list.items)
    }

    async fn add_vault(&self, path: &str) -> Result<VaultRecord> {
        let body = serde_json::json!({"op": "add", "path": path});
        let item: VaultItem = self.call(Method::POST, "vaults", Some(body)).await?;
        Ok(item.item)
    }

    async fn create_vault(
        &self,
        name: &str,
        path: &str,
        password: &SecretString,
    ) -> Result<VaultRecord> {
        let body = serde_json::json!({
            "op": "create",
            "name": name,
            "path": path,
            "password": password.expose(),
        });
        let item: VaultItem = self.call(Method::POST, "vaults", Some(body)).await?;
        Ok(item.item)
    }

    async fn remove_vault(&self, vault_id: &str) -> Result<()> {
        let _: Envelope = self
            .call(Method::DELETE, &format!("vault/{}", vault_id), None)
            .await?;
        Ok(())
    }

    async fn lock_vault(&self, vault_id: &str) -> Result<VaultState> {
        let body = serde_json::json!({"op": "lock"});
        let change: StateChange = self
            .call(Method::POST, &format!("vault/{}", vault_id), Some(body))
            .await?;
        Ok(change.state)
    }

    async fn unlock_vault(&self, vault_id: &str, password: &SecretString) -> Result<VaultState> {
        let body = serde_json::json!({"op": "unlock", "password": password.expose()});
        let change: StateChange = self
            .call(Method::POST, &format!("vault/{}", vault_id), Some(body))
            .await?;
        Ok(change.state)
    }

    async fn reveal_mountpoint(&self, vault_id: &str) -> Result<()> {
        let body = serde_json::json!({"op": "reveal_mountpoint"});
        let _: Envelope = self
            .call(Method::POST, &format!("vault/{}", vault_id), Some(body))
            .await?;
        Ok(())
    }

    async fn reveal_vault(&self, vault_id: &str) -> Result<()> {
        let body = serde_json::json!({"op": "reveal_vault"});
        let _: Envelope = self
            .call(Method::POST, &format!("vault/{}", vault_id), Some(body))
            .await?;
        Ok(())
    }

    async fn update_vault_options(
        &self,
        vault_id: &str,
        patch: &VaultOptionsPatch,
    ) -> Result<VaultRecord> {
        let body = serde_json::to_value(patch)
            .map_err(|e| Error::InvalidInput(format!("Failed to serialize patch: {}", e)))?;
        let item: VaultItem = self
            .call(
                Method::POST,
                &format!("vault/{}/options", vault_id),
                Some(body),
            )
            .await?;
        Ok(item.item)
    }

    async fn change_vault_password(
        &self,
        vault_id: &str,
        credential: &VaultCredential,
        new_password: &SecretString,
    ) -> Result<String> {
        let mut body = serde_json::Map::new();
        body.insert(
            credential.field().to_string(),
            serde_json::Value::String(credential.secret().expose().to_string()),
        );
        body.insert(
            "newpassword".to_string(),
            serde_json::Value::String(new_password.expose().to_string()),
        );
        let envelope: Envelope = self
            .call(
                Method::POST,
                &format!("vault/{}/password", vault_id),
                Some(serde_json::Value::Object(body)),
            )
            .await?;
        Ok(envelope.msg)
    }

    async fn reveal_masterkey(
        &self,
        vault_id: &str,
        password: &SecretString,
    ) -> Result<SecretString> {
        let body = serde_json::json!({"password": password.expose()});
        let item: MasterkeyItem = self
            .call(
                Method::POST,
                &format!("vault/{}/masterkey", vault_id),
                Some(body),
            )
            .await?;
        Ok(SecretString::new(item.item))
    }

    async fn app_config(&self) -> Result<AppConfig> {
        let config: AppConfigItem = self.call(Method::GET, "options", None).await?;
        Ok(config.item)
    }

    async fn set_app_options(&self, patch: &AppOptionsPatch) -> Result<()> {
        let body = serde_json::to_value(patch)
            .map_err(|e| Error::InvalidInput(format!("Failed to serialize patch: {}", e)))?;
        let _: Envelope = self.call(Method::POST, "options", Some(body)).await?;
        Ok(())
    }

    async fn list_sub_paths(&self, pwd: &str) -> Result<SubPathListing> {
        let body = serde_json::json!({"pwd": pwd});
        self.call(Method::POST, "subpaths", Some(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_building() {
        let url = Url::parse("http://127.0.0.1:9763/").unwrap();
        let gateway = HttpGateway::new(url).unwrap();

        assert_eq!(
            gateway.endpoint("vaults").unwrap().as_str(),
            "http://127.0.0.1:9763/api/vaults"
        );
        assert_eq!(
            gateway.endpoint("vault/v1/options").unwrap().as_str(),
            "http://127.0.0.1:9763/api/vault/v1/options"
        );
    }

    #[test]
    fn test_new_strips_token_fragment() {
        let url = Url::parse("http://127.0.0.1:9763/#token=abc").unwrap();
        let gateway = HttpGateway::new(url).unwrap();

        assert_eq!(gateway.base_url.fragment(), None);
        assert_eq!(gateway.token.resolve(), "abc");
    }
}
