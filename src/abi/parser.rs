//! Contract ABI JSON Parser
//!
//! Accepts the Solidity JSON ABI array and the TRON node form
//! (`{"entrys": [...]}` with capitalized `type` values). Parameter types are
//! resolved into [`AbiType`] once, at load time.

use serde::Deserialize;

use super::decoder::AbiDecoder;
use super::encoder::AbiEncoder;
use super::selector::{event_topic, function_selector};
use super::types::{
    AbiError, AbiEvent, AbiEventParam, AbiFunction, AbiParam, AbiType, AbiValue, FunctionType,
    StateMutability,
};

/// Parsed contract ABI
#[derive(Debug, Clone, Default)]
pub struct ContractAbi {
    pub functions: Vec<AbiFunction>,
    pub events: Vec<AbiEvent>,
    pub constructor: Option<AbiFunction>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Entries(Vec<RawItem>),
    Node {
        #[serde(alias = "entries")]
        entrys: Vec<RawItem>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    #[serde(rename = "type", default)]
    item_type: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(default)]
    state_mutability: Option<String>,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    param_type: String,
    #[serde(default)]
    components: Vec<RawParam>,
    #[serde(default)]
    indexed: bool,
}

impl RawParam {
    /// `tuple`, `tuple[]`, `tuple[2][]` take their shape from `components`
    fn resolve(&self) -> Result<AbiType, AbiError> {
        match self.param_type.strip_prefix("tuple") {
            Some(suffix) => {
                let components = self
                    .components
                    .iter()
                    .map(|c| c.resolve())
                    .collect::<Result<Vec<_>, _>>()?;
                let base = AbiType::Tuple(components).canonical_type();
                AbiType::parse(&format!("{}{}", base, suffix))
            }
            None => AbiType::parse(&self.param_type),
        }
    }

    fn to_param(&self) -> Result<AbiParam, AbiError> {
        Ok(AbiParam {
            name: self.name.clone(),
            param_type: self.resolve()?,
        })
    }
}

fn parse_mutability(raw: Option<&str>) -> StateMutability {
    match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("view") => StateMutability::View,
        Some("pure") => StateMutability::Pure,
        Some("payable") => StateMutability::Payable,
        _ => StateMutability::Nonpayable,
    }
}

impl ContractAbi {
    /// Parse ABI from JSON string
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let document: RawDocument = serde_json::from_str(json)
            .map_err(|e| AbiError::InvalidAbi(format!("Failed to parse ABI JSON: {}", e)))?;
        let items = match document {
            RawDocument::Entries(items) => items,
            RawDocument::Node { entrys } => entrys,
        };

        let mut abi = ContractAbi::default();
        for item in items {
            let kind = item
                .item_type
                .as_deref()
                .unwrap_or("function")
                .to_ascii_lowercase();
            match kind.as_str() {
                "function" | "constructor" | "fallback" | "receive" => {
                    let function_type = match kind.as_str() {
                        "constructor" => FunctionType::Constructor,
                        "fallback" => FunctionType::Fallback,
                        "receive" => FunctionType::Receive,
                        _ => FunctionType::Function,
                    };
                    let function = AbiFunction {
                        name: item.name.clone(),
                        inputs: item.inputs.iter().map(RawParam::to_param).collect::<Result<_, _>>()?,
                        outputs: item.outputs.iter().map(RawParam::to_param).collect::<Result<_, _>>()?,
                        state_mutability: parse_mutability(item.state_mutability.as_deref()),
                        function_type,
                    };
                    match function_type {
                        FunctionType::Constructor => abi.constructor = Some(function),
                        FunctionType::Function => abi.functions.push(function),
                        FunctionType::Fallback | FunctionType::Receive => {}
                    }
                }
                "event" => {
                    let inputs = item
                        .inputs
                        .iter()
                        .map(|p| {
                            Ok(AbiEventParam {
                                param: p.to_param()?,
                                indexed: p.indexed,
                            })
                        })
                        .collect::<Result<Vec<_>, AbiError>>()?;
                    abi.events.push(AbiEvent {
                        name: item.name,
                        inputs,
                        anonymous: item.anonymous,
                    });
                }
                // Custom errors carry no call data we encode
                "error" => {}
                other => {
                    return Err(AbiError::InvalidAbi(format!("Unknown ABI item type: {}", other)));
                }
            }
        }

        Ok(abi)
    }

    /// Find function by name (first overload)
    pub fn function(&self, name: &str) -> Result<&AbiFunction, AbiError> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| AbiError::FunctionNotFound(name.to_string()))
    }

    /// Find function by 4-byte selector
    pub fn function_by_selector(&self, selector: &[u8]) -> Result<&AbiFunction, AbiError> {
        for function in &self.functions {
            if function_selector(&function.signature())?.as_slice() == selector {
                return Ok(function);
            }
        }
        Err(AbiError::FunctionNotFound(hex::encode(selector)))
    }

    /// Find event by name
    pub fn event(&self, name: &str) -> Result<&AbiEvent, AbiError> {
        self.events
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| AbiError::EventNotFound(name.to_string()))
    }

    /// Find event by its first topic
    pub fn event_by_topic(&self, topic: &[u8; 32]) -> Result<&AbiEvent, AbiError> {
        for event in self.events.iter().filter(|e| !e.anonymous) {
            if event_topic(&event.signature())? == *topic {
                return Ok(event);
            }
        }
        Err(AbiError::EventNotFound(hex::encode(topic)))
    }

    /// Call data for `name` with `values`
    pub fn encode_call(&self, name: &str, values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let function = self.function(name)?;
        let mut data = function_selector(&function.signature())?.to_vec();
        data.extend(AbiEncoder::encode(values, &function.input_types())?);
        Ok(data)
    }

    /// Decode the return data of `name`
    pub fn decode_output(&self, name: &str, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        AbiDecoder::decode_function_result(data, self.function(name)?)
    }

    /// Decode call data, identifying the function from its selector
    pub fn decode_input(&self, data: &[u8]) -> Result<(&AbiFunction, Vec<AbiValue>), AbiError> {
        let selector = data
            .get(..4)
            .ok_or_else(|| AbiError::DecodingError("Call data shorter than a selector".to_string()))?;
        let function = self.function_by_selector(selector)?;
        Ok((function, AbiDecoder::decode_function_input(data, function)?))
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Pre-defined ABIs
pub struct KnownAbis;

impl KnownAbis {
    /// Standard TRC-20 token interface
    pub fn trc20() -> Result<ContractAbi, AbiError> {
        ContractAbi::from_json(TRC20_ABI)
    }
}

const TRC20_ABI: &str = r#"[
    {"type":"function","name":"name","inputs":[],"outputs":[{"name":"","type":"string"}],"stateMutability":"view"},
    {"type":"function","name":"symbol","inputs":[],"outputs":[{"name":"","type":"string"}],"stateMutability":"view"},
    {"type":"function","name":"decimals","inputs":[],"outputs":[{"name":"","type":"uint8"}],"stateMutability":"view"},
    {"type":"function","name":"totalSupply","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
    {"type":"function","name":"balanceOf","inputs":[{"name":"owner","type":"address"}],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
    {"type":"function","name":"transfer","inputs":[{"name":"to","type":"address"},{"name":"value","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
    {"type":"function","name":"approve","inputs":[{"name":"spender","type":"address"},{"name":"value","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
    {"type":"function","name":"allowance","inputs":[{"name":"owner","type":"address"},{"name":"spender","type":"address"}],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
    {"type":"function","name":"transferFrom","inputs":[{"name":"from","type":"address"},{"name":"to","type":"address"},{"name":"value","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
    {"type":"event","name":"Transfer","anonymous":false,"inputs":[{"name":"from","type":"address","indexed":true},{"name":"to","type":"address","indexed":true},{"name":"value","type":"uint256","indexed":false}]},
    {"type":"event","name":"Approval","anonymous":false,"inputs":[{"name":"owner","type":"address","indexed":true},{"name":"spender","type":"address","indexed":true},{"name":"value","type":"uint256","indexed":false}]}
]"#;
