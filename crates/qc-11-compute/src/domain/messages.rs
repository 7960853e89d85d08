//! # Messages
//!
//! Inbound message variants of the compute module and their typed responses.
//! Messages are immutable once decoded and owned by the runtime.

use crate::domain::value_objects::{AccAddress, Binary, CodeId, Coins};
use crate::errors::DecodeError;
use serde::{Deserialize, Serialize};

/// Type URLs used as the `@type` tag on the wire.
pub mod type_urls {
    /// Store bytecode.
    pub const MSG_STORE_CODE: &str = "/secret.compute.v1beta1.MsgStoreCode";
    /// Instantiate a contract from stored code.
    pub const MSG_INSTANTIATE_CONTRACT: &str = "/secret.compute.v1beta1.MsgInstantiateContract";
    /// Call an instantiated contract.
    pub const MSG_EXECUTE_CONTRACT: &str = "/secret.compute.v1beta1.MsgExecuteContract";
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Upload contract bytecode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgStoreCode {
    /// Uploader.
    pub sender: AccAddress,
    /// Raw WASM bytecode.
    pub wasm_byte_code: Binary,
    /// Optional URL of the contract source.
    #[serde(default)]
    pub source: String,
    /// Optional docker tag of the reproducible builder.
    #[serde(default)]
    pub builder: String,
}

/// Instantiate a contract from a stored code id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgInstantiateContract {
    /// Creator.
    pub sender: AccAddress,
    /// Code to instantiate.
    pub code_id: CodeId,
    /// Unique human-readable label.
    pub label: String,
    /// Contract init message.
    pub init_msg: Binary,
    /// Funds moved from the creator to the new contract.
    #[serde(default)]
    pub init_funds: Coins,
    /// Signature authorizing a contract-originated callback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_sig: Option<Binary>,
}

/// Call an instantiated contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgExecuteContract {
    /// Caller.
    pub sender: AccAddress,
    /// Target contract.
    pub contract: AccAddress,
    /// Contract handle message.
    pub msg: Binary,
    /// Funds moved from the caller to the contract.
    #[serde(default)]
    pub sent_funds: Coins,
    /// Signature authorizing a contract-originated callback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_sig: Option<Binary>,
}

/// Any message accepted by the compute module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum Msg {
    /// See [`MsgStoreCode`].
    #[serde(rename = "/secret.compute.v1beta1.MsgStoreCode")]
    StoreCode(MsgStoreCode),
    /// See [`MsgInstantiateContract`].
    #[serde(rename = "/secret.compute.v1beta1.MsgInstantiateContract")]
    InstantiateContract(MsgInstantiateContract),
    /// See [`MsgExecuteContract`].
    #[serde(rename = "/secret.compute.v1beta1.MsgExecuteContract")]
    ExecuteContract(MsgExecuteContract),
}

impl Msg {
    /// Signer of the message.
    #[must_use]
    pub fn sender(&self) -> &AccAddress {
        match self {
            Self::StoreCode(m) => &m.sender,
            Self::InstantiateContract(m) => &m.sender,
            Self::ExecuteContract(m) => &m.sender,
        }
    }

    /// Wire type URL.
    #[must_use]
    pub fn type_url(&self) -> &'static str {
        match self {
            Self::StoreCode(_) => type_urls::MSG_STORE_CODE,
            Self::InstantiateContract(_) => type_urls::MSG_INSTANTIATE_CONTRACT,
            Self::ExecuteContract(_) => type_urls::MSG_EXECUTE_CONTRACT,
        }
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StoreCode(_) => "store_code",
            Self::InstantiateContract(_) => "instantiate",
            Self::ExecuteContract(_) => "execute",
        }
    }
}

impl From<MsgStoreCode> for Msg {
    fn from(msg: MsgStoreCode) -> Self {
        Self::StoreCode(msg)
    }
}

impl From<MsgInstantiateContract> for Msg {
    fn from(msg: MsgInstantiateContract) -> Self {
        Self::InstantiateContract(msg)
    }
}

impl From<MsgExecuteContract> for Msg {
    fn from(msg: MsgExecuteContract) -> Self {
        Self::ExecuteContract(msg)
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Response to [`MsgStoreCode`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgStoreCodeResponse {
    /// Assigned code id (the sentinel `0` when nothing was stored).
    pub code_id: CodeId,
}

/// Response to [`MsgInstantiateContract`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgInstantiateContractResponse {
    /// Rendered contract address; `""` when the backend produced none.
    pub address: String,
    /// Raw contract response data, kept even on failure.
    pub data: Binary,
}

/// Response to [`MsgExecuteContract`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgExecuteContractResponse {
    /// Raw contract response data, kept even on failure.
    pub data: Binary,
}

/// Response of any handled message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum MsgResponse {
    /// See [`MsgStoreCodeResponse`].
    #[serde(rename = "/secret.compute.v1beta1.MsgStoreCodeResponse")]
    StoreCode(MsgStoreCodeResponse),
    /// See [`MsgInstantiateContractResponse`].
    #[serde(rename = "/secret.compute.v1beta1.MsgInstantiateContractResponse")]
    InstantiateContract(MsgInstantiateContractResponse),
    /// See [`MsgExecuteContractResponse`].
    #[serde(rename = "/secret.compute.v1beta1.MsgExecuteContractResponse")]
    ExecuteContract(MsgExecuteContractResponse),
}

impl MsgResponse {
    /// Contract response data carried by the response (empty for store code).
    #[must_use]
    pub fn data(&self) -> &[u8] {
        match self {
            Self::StoreCode(_) => &[],
            Self::InstantiateContract(r) => r.data.as_slice(),
            Self::ExecuteContract(r) => r.data.as_slice(),
        }
    }
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// An atomic, ordered batch of messages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    /// Messages applied in order.
    pub msgs: Vec<Msg>,
    /// Free-form memo.
    #[serde(default)]
    pub memo: String,
}

impl Tx {
    /// Creates a transaction from messages.
    #[must_use]
    pub fn new(msgs: Vec<Msg>) -> Self {
        Self {
            msgs,
            memo: String::new(),
        }
    }

    /// Decodes JSON transaction bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let tx: Self = serde_json::from_slice(bytes).map_err(|e| DecodeError::Tx(e.to_string()))?;
        if tx.msgs.is_empty() {
            return Err(DecodeError::Tx("must contain at least one message".to_string()));
        }
        Ok(tx)
    }

    /// Encodes to JSON bytes.
    pub fn encode(&self) -> Result<Vec<u8>, DecodeError> {
        serde_json::to_vec(self).map_err(|e| DecodeError::Tx(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Coin;

    fn sender() -> AccAddress {
        AccAddress::new([1u8; 20])
    }

    #[test]
    fn test_msg_wire_tag() {
        let msg = Msg::from(MsgStoreCode {
            sender: sender(),
            wasm_byte_code: Binary::from_slice(b"\0asm"),
            source: String::new(),
            builder: String::new(),
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["@type"], type_urls::MSG_STORE_CODE);
        assert_eq!(json["wasm_byte_code"], "AGFzbQ==");
        assert_eq!(msg.type_url(), type_urls::MSG_STORE_CODE);
    }

    #[test]
    fn test_decode_instantiate_with_defaults() {
        let raw = format!(
            r#"{{"msgs":[{{"@type":"{}","sender":"{}","code_id":1,"label":"x","init_msg":"e30="}}]}}"#,
            type_urls::MSG_INSTANTIATE_CONTRACT,
            sender()
        );

        let tx = Tx::decode(raw.as_bytes()).unwrap();
        match &tx.msgs[0] {
            Msg::InstantiateContract(m) => {
                assert_eq!(m.code_id, CodeId::new(1));
                assert_eq!(m.init_msg.as_slice(), b"{}");
                assert!(m.init_funds.is_empty());
                assert!(m.callback_sig.is_none());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let raw = br#"{"msgs":[{"@type":"/bank.MsgSend","sender":""}]}"#;
        assert!(matches!(Tx::decode(raw), Err(DecodeError::Tx(_))));
    }

    #[test]
    fn test_decode_rejects_empty_tx() {
        assert!(matches!(Tx::decode(br#"{"msgs":[]}"#), Err(DecodeError::Tx(_))));
        assert!(matches!(Tx::decode(b"not json"), Err(DecodeError::Tx(_))));
    }

    #[test]
    fn test_tx_encode_decode() {
        let tx = Tx::new(vec![Msg::from(MsgExecuteContract {
            sender: sender(),
            contract: AccAddress::new([2u8; 20]),
            msg: Binary::from_slice(br#"{"nop":{}}"#),
            sent_funds: Coins(vec![Coin::new(5u64, "uscrt")]),
            callback_sig: Some(Binary::from_slice(&[9u8; 4])),
        })]);

        let bytes = tx.encode().unwrap();
        assert_eq!(Tx::decode(&bytes).unwrap(), tx);
    }

    #[test]
    fn test_response_data_accessor() {
        let response = MsgResponse::ExecuteContract(MsgExecuteContractResponse {
            data: Binary::from_slice(b"partial"),
        });
        assert_eq!(response.data(), b"partial");
        assert!(MsgResponse::StoreCode(MsgStoreCodeResponse::default())
            .data()
            .is_empty());
    }
}
