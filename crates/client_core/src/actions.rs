use serde_json::json;
use shared::{
    domain::{ActionKind, Address, NetworkId, TxHash, Wei},
    protocol::{SendTransactionRequest, WriteContractRequest},
};

const TX_URL_PLACEHOLDER: &str = "{tx_url}";

#[derive(Debug, Clone, PartialEq)]
pub enum ActionRequest {
    Contract(WriteContractRequest),
    Transfer(SendTransactionRequest),
}

impl ActionRequest {
    /// Zero-argument, nonpayable contract call.
    pub fn contract_call(address: Address, function_name: &str) -> Self {
        ActionRequest::Contract(WriteContractRequest {
            address,
            abi: json!([{
                "type": "function",
                "name": function_name,
                "stateMutability": "nonpayable",
                "inputs": [],
                "outputs": [],
            }]),
            function_name: function_name.to_string(),
        })
    }

    pub fn transfer(to: Address, value: Wei) -> Self {
        ActionRequest::Transfer(SendTransactionRequest { to, value })
    }
}

/// Cast composed after a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoCast {
    pub text: String,
    pub embeds: Vec<String>,
}

/// Everything needed to run one action kind: where, what, and what to post afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTarget {
    pub kind: ActionKind,
    pub network_id: NetworkId,
    pub request: ActionRequest,
    pub explorer_url: String,
    pub cast_template: String,
}

impl ActionTarget {
    pub fn tx_url(&self, hash: &TxHash) -> String {
        format!("{}/tx/{hash}", self.explorer_url.trim_end_matches('/'))
    }

    pub fn render_cast(&self, hash: &TxHash) -> AutoCast {
        let tx_url = self.tx_url(hash);
        let text = if self.cast_template.contains(TX_URL_PLACEHOLDER) {
            self.cast_template.replace(TX_URL_PLACEHOLDER, &tx_url)
        } else {
            format!("{} {tx_url}", self.cast_template.trim_end())
        };

        AutoCast {
            text,
            embeds: vec![tx_url],
        }
    }
}
