use serde::{Deserialize, Serialize};

use crate::domain::{Address, Fid, Identity, Wei};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyOptions {
    pub disable_native_gestures: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostUser {
    pub fid: Fid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl HostUser {
    pub fn to_identity(&self) -> Identity {
        Identity::resolve(
            self.fid,
            self.username.as_deref(),
            self.display_name.as_deref(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<HostUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAppResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
}

/// `embeds: None` is the explicit "no embeds" marker the host expects instead of an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeCastRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorInfo {
    pub name: String,
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTransactionRequest {
    pub to: Address,
    pub value: Wei,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteContractRequest {
    pub address: Address,
    pub abi: serde_json::Value,
    pub function_name: String,
}

/// One notification from a receipt watcher. Watchers may repeat any of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReceiptUpdate {
    Pending,
    Confirming { confirmations: u32 },
    Confirmed,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAttribute {
    pub trait_type: String,
    pub value: String,
}

impl AssetAttribute {
    pub fn new(trait_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub external_url: String,
    pub attributes: Vec<AssetAttribute>,
}

impl AssetMetadata {
    /// The collectible minted by the mint action, rooted at `public_url`.
    pub fn early_supporter(public_url: &str) -> Self {
        let base = public_url.trim_end_matches('/');
        Self {
            name: "HelloBase Early Supporter".to_string(),
            description: "The first NFT collection minted on the HelloBase Mini App.".to_string(),
            image: format!("{base}/nft-image.png"),
            external_url: base.to_string(),
            attributes: vec![
                AssetAttribute::new("Platform", "Baseapp"),
                AssetAttribute::new("Network", "Base Sepolia"),
                AssetAttribute::new("Type", "Early Adopter"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_request_omits_missing_embeds() {
        let request = ComposeCastRequest {
            text: "gm".to_string(),
            embeds: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "gm" }));
    }

    #[test]
    fn host_context_accepts_camel_case_user() {
        let context: HostContext = serde_json::from_value(serde_json::json!({
            "user": { "fid": 7, "username": "bob", "displayName": "Bob" }
        }))
        .unwrap();
        let identity = context.user.unwrap().to_identity();
        assert_eq!(identity.display_name, "Bob");
        assert_eq!(identity.fid, Fid(7));
    }

    #[test]
    fn receipt_update_is_tagged_by_status() {
        let update: ReceiptUpdate =
            serde_json::from_str(r#"{"status":"confirming","confirmations":2}"#).unwrap();
        assert_eq!(update, ReceiptUpdate::Confirming { confirmations: 2 });
    }

    #[test]
    fn metadata_urls_are_rooted_at_public_url() {
        let metadata = AssetMetadata::early_supporter("https://hellobase.vercel.app/");
        assert_eq!(metadata.image, "https://hellobase.vercel.app/nft-image.png");
        assert_eq!(metadata.external_url, "https://hellobase.vercel.app");
        assert_eq!(metadata.attributes.len(), 3);
    }
}
