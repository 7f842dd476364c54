//! In-process EVM node for tests: answers `eth_getBalance`, `eth_getCode`
//! and `eth_call` from canned state, and can host a collector contract.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use chainbalances_core::{codec_for, normalize, CodecVariant, LookupFailure, RawBalance};
use serde_json::Value;

use crate::abi;
use crate::error::TransportError;
use crate::revert::ERROR_STRING_SELECTOR;
use crate::transport::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcTransport};

enum MockToken {
    Erc20(HashMap<Address, U256>),
    Reverts(String),
    Raw(Vec<u8>),
}

#[derive(Default)]
pub(crate) struct MockChain {
    native: HashMap<Address, U256>,
    native_fails: bool,
    tokens: HashMap<Address, MockToken>,
    unreachable: HashSet<Address>,
    collectors: HashMap<Address, CodecVariant>,
    requests: Mutex<Vec<JsonRpcRequest>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_native(&mut self, account: Address, amount: U256) {
        self.native.insert(account, amount);
    }

    pub fn fail_native(&mut self) {
        self.native_fails = true;
    }

    pub fn set_balance(&mut self, token: Address, account: Address, amount: U256) {
        match self.tokens.entry(token).or_insert_with(|| MockToken::Erc20(HashMap::new())) {
            MockToken::Erc20(balances) => {
                balances.insert(account, amount);
            }
            other => *other = MockToken::Erc20(HashMap::from([(account, amount)])),
        }
    }

    pub fn set_reverting(&mut self, token: Address, reason: &str) {
        self.tokens.insert(token, MockToken::Reverts(reason.to_string()));
    }

    pub fn set_raw_return(&mut self, token: Address, data: Vec<u8>) {
        self.tokens.insert(token, MockToken::Raw(data));
    }

    /// Every request touching `token` fails at the HTTP layer.
    pub fn set_unreachable(&mut self, token: Address) {
        self.unreachable.insert(token);
    }

    /// Deploy a collector contract at `address`.
    pub fn deploy_collector(&mut self, address: Address, variant: CodecVariant) {
        self.collectors.insert(address, variant);
    }

    pub fn requests(&self) -> Vec<JsonRpcRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn has_code(&self, address: &Address) -> bool {
        self.tokens.contains_key(address) || self.collectors.contains_key(address)
    }

    /// Balance as the collector contract sees it from inside the EVM.
    fn token_balance(&self, token: &Address, account: &Address) -> RawBalance {
        match self.tokens.get(token) {
            None => Err(LookupFailure::NoCode),
            Some(MockToken::Erc20(balances)) => Ok(balances.get(account).copied().unwrap_or_default()),
            Some(MockToken::Reverts(reason)) => Err(LookupFailure::Reverted {
                reason: Some(reason.clone()),
                data: vec![],
            }),
            Some(MockToken::Raw(data)) => {
                abi::decode_balance(data).ok_or(LookupFailure::MalformedReturn { len: data.len() })
            }
        }
    }

    fn run_collector(&self, variant: CodecVariant, calldata: &[u8]) -> Result<Vec<u8>, String> {
        let selector = abi::selector(abi::GET_BALANCES_SIGNATURE);
        if calldata.len() < 4 || calldata[..4] != selector {
            return Err("unknown selector".into());
        }
        let ty = DynSolType::Tuple(vec![
            DynSolType::Address,
            DynSolType::Array(Box::new(DynSolType::Address)),
        ]);
        let args = match ty.abi_decode_params(&calldata[4..]) {
            Ok(DynSolValue::Tuple(args)) => args,
            _ => return Err("bad calldata".into()),
        };
        let (account, tokens) = match args.as_slice() {
            [DynSolValue::Address(account), DynSolValue::Array(tokens)] => (*account, tokens),
            _ => return Err("bad arguments".into()),
        };

        let native = Ok(self.native.get(&account).copied().unwrap_or_default());
        let mut values = vec![normalize(&native, variant)];
        for token in tokens {
            let DynSolValue::Address(token) = token else {
                return Err("bad token".into());
            };
            values.push(normalize(&self.token_balance(token, &account), variant));
        }
        let wire = codec_for(variant).compress(&values);
        Ok(abi::encode_word_array(wire.words()))
    }

    fn eth_call(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let call = req.params.first().cloned().unwrap_or(Value::Null);
        let to = parse_address(call.get("to"))?;
        let data = call
            .get("data")
            .and_then(Value::as_str)
            .and_then(|s| hex::decode(s.trim_start_matches("0x")).ok())
            .unwrap_or_default();

        if self.unreachable.contains(&to) {
            return Err(TransportError::Http("connection reset".into()));
        }
        if let Some(variant) = self.collectors.get(&to) {
            return Ok(match self.run_collector(*variant, &data) {
                Ok(out) => ok_hex(req, &out),
                Err(reason) => revert_response(req, &reason),
            });
        }

        let account = match data.len() {
            n if n >= 20 => Address::from_slice(&data[n - 20..]),
            _ => Address::ZERO,
        };
        Ok(match self.tokens.get(&to) {
            None => ok_hex(req, &[]),
            Some(MockToken::Erc20(balances)) => {
                let balance = balances.get(&account).copied().unwrap_or_default();
                ok_hex(req, &balance.to_be_bytes::<32>())
            }
            Some(MockToken::Reverts(reason)) => revert_response(req, reason),
            Some(MockToken::Raw(out)) => ok_hex(req, out),
        })
    }
}

fn parse_address(value: Option<&Value>) -> Result<Address, TransportError> {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| TransportError::UnexpectedResponse("mock: bad address param".into()))
}

fn ok_hex(req: &JsonRpcRequest, data: &[u8]) -> JsonRpcResponse {
    JsonRpcResponse::ok(req.id.clone(), Value::String(format!("0x{}", hex::encode(data))))
}

fn revert_response(req: &JsonRpcRequest, reason: &str) -> JsonRpcResponse {
    let mut data = ERROR_STRING_SELECTOR.to_vec();
    data.extend_from_slice(&DynSolValue::String(reason.to_string()).abi_encode());
    JsonRpcResponse::err(
        req.id.clone(),
        JsonRpcError {
            code: 3,
            message: format!("execution reverted: {reason}"),
            data: Some(Value::String(format!("0x{}", hex::encode(data)))),
        },
    )
}

#[async_trait]
impl RpcTransport for MockChain {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(req.clone());
        }

        match req.method.as_str() {
            "eth_getBalance" => {
                if self.native_fails {
                    return Err(TransportError::Http("connection refused".into()));
                }
                let account = parse_address(req.params.first())?;
                let balance = self.native.get(&account).copied().unwrap_or_default();
                Ok(JsonRpcResponse::ok(req.id, Value::String(format!("0x{balance:x}"))))
            }
            "eth_getCode" => {
                let address = parse_address(req.params.first())?;
                if self.unreachable.contains(&address) {
                    return Err(TransportError::Http("connection reset".into()));
                }
                let code: &[u8] = if self.has_code(&address) { &[0x60, 0x80, 0x60, 0x40] } else { &[] };
                Ok(ok_hex(&req, code))
            }
            "eth_call" => self.eth_call(&req),
            other => Ok(JsonRpcResponse::err(
                req.id,
                JsonRpcError {
                    code: -32601,
                    message: format!("method {other} not found"),
                    data: None,
                },
            )),
        }
    }

    fn url(&self) -> &str {
        "mock://chain"
    }
}
