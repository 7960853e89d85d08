//! # Message Server (Dispatcher)
//!
//! Maps each message variant to exactly one keeper call. Every handler has
//! the same shape:
//!
//! 1. emit the `message` audit event (unconditional)
//! 2. call the keeper
//! 3. shape a structurally valid response, even on failure
//! 4. return the keeper error untouched alongside it
//!
//! The server never retries, never interprets keeper errors and never
//! touches storage itself.

use crate::domain::context::Context;
use crate::domain::events::Event;
use crate::domain::messages::{
    MsgExecuteContract, MsgExecuteContractResponse, MsgInstantiateContract,
    MsgInstantiateContractResponse, MsgStoreCode, MsgStoreCodeResponse,
};
use crate::domain::outcome::Outcome;
use crate::domain::value_objects::AccAddress;
use crate::metrics;
use crate::ports::inbound::ComputeMsgServer;
use crate::ports::outbound::Keeper;
use crate::MODULE_NAME;
use tracing::{debug, warn};

/// Dispatcher over a keeper.
#[derive(Debug)]
pub struct MsgServer<K> {
    keeper: K,
}

impl<K: Keeper> MsgServer<K> {
    /// Wrap a keeper.
    pub fn new(keeper: K) -> Self {
        Self { keeper }
    }

    /// Shared access to the keeper.
    pub fn keeper(&self) -> &K {
        &self.keeper
    }

    /// Exclusive access to the keeper, for the runtime's checkpointing.
    pub fn keeper_mut(&mut self) -> &mut K {
        &mut self.keeper
    }
}

fn emit_message_event(ctx: &mut Context, sender: &AccAddress) {
    ctx.emit_event(Event::message(MODULE_NAME, sender));
}

fn record<T>(ctx: &Context, kind: &'static str, outcome: &Outcome<T>) {
    metrics::record_message(kind);
    if let Some(err) = &outcome.error {
        metrics::record_message_failed(kind);
        warn!(
            tx_index = ctx.tx_index(),
            msg_type = kind,
            error_kind = err.kind(),
            code = err.code(),
            error = %err,
            "keeper call failed"
        );
    }
}

impl<K: Keeper> ComputeMsgServer for MsgServer<K> {
    fn store_code(&mut self, ctx: &mut Context, msg: &MsgStoreCode) -> Outcome<MsgStoreCodeResponse> {
        emit_message_event(ctx, &msg.sender);

        let outcome = self
            .keeper
            .create_code(
                ctx,
                &msg.sender,
                msg.wasm_byte_code.as_slice(),
                &msg.source,
                &msg.builder,
            )
            .map(|code_id| MsgStoreCodeResponse { code_id });

        record(ctx, "store_code", &outcome);
        debug!(code_id = %outcome.value.code_id, "store code handled");
        outcome
    }

    fn instantiate_contract(
        &mut self,
        ctx: &mut Context,
        msg: &MsgInstantiateContract,
    ) -> Outcome<MsgInstantiateContractResponse> {
        emit_message_event(ctx, &msg.sender);

        // Data is always returned; reply handling inspects it on failure too.
        let outcome = self
            .keeper
            .instantiate(
                ctx,
                msg.code_id,
                &msg.sender,
                msg.init_msg.as_slice(),
                &msg.label,
                &msg.init_funds,
                msg.callback_sig.as_ref().map(|sig| sig.as_slice()),
            )
            .map(|result| MsgInstantiateContractResponse {
                address: AccAddress::render(result.address.as_ref()),
                data: result.data,
            });

        record(ctx, "instantiate", &outcome);
        debug!(
            code_id = %msg.code_id,
            address = %outcome.value.address,
            data_len = outcome.value.data.len(),
            "instantiate handled"
        );
        outcome
    }

    fn execute_contract(
        &mut self,
        ctx: &mut Context,
        msg: &MsgExecuteContract,
    ) -> Outcome<MsgExecuteContractResponse> {
        emit_message_event(ctx, &msg.sender);

        let outcome = self
            .keeper
            .execute(
                ctx,
                &msg.contract,
                &msg.sender,
                msg.msg.as_slice(),
                &msg.sent_funds,
                msg.callback_sig.as_ref().map(|sig| sig.as_slice()),
            )
            .map(|result| MsgExecuteContractResponse { data: result.data });

        record(ctx, "execute", &outcome);
        debug!(
            contract = %msg.contract,
            data_len = outcome.value.data.len(),
            "execute handled"
        );
        outcome
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::BlockInfo;
    use crate::domain::events::EVENT_TYPE_MESSAGE;
    use crate::domain::messages::{Msg, MsgResponse};
    use crate::domain::outcome::{ContractResult, InstantiateResult};
    use crate::domain::value_objects::{Binary, CodeId, Coins};
    use crate::errors::KeeperError;

    /// Keeper returning canned outcomes and recording what it saw.
    #[derive(Default)]
    struct MockKeeper {
        create: Option<Outcome<CodeId>>,
        instantiate: Option<Outcome<InstantiateResult>>,
        execute: Option<Outcome<ContractResult>>,
        events_seen_at_call: Vec<usize>,
        callback_sigs: Vec<Option<Vec<u8>>>,
    }

    impl Keeper for MockKeeper {
        fn create_code(
            &mut self,
            ctx: &mut Context,
            _creator: &AccAddress,
            _wasm_code: &[u8],
            _source: &str,
            _builder: &str,
        ) -> Outcome<CodeId> {
            self.events_seen_at_call.push(ctx.event_manager().len());
            self.create.take().unwrap_or_else(|| Outcome::ok(CodeId::new(1)))
        }

        fn instantiate(
            &mut self,
            ctx: &mut Context,
            _code_id: CodeId,
            _creator: &AccAddress,
            _init_msg: &[u8],
            _label: &str,
            _funds: &Coins,
            callback_sig: Option<&[u8]>,
        ) -> Outcome<InstantiateResult> {
            self.events_seen_at_call.push(ctx.event_manager().len());
            self.callback_sigs.push(callback_sig.map(<[u8]>::to_vec));
            self.instantiate
                .take()
                .unwrap_or_else(|| Outcome::ok(InstantiateResult::default()))
        }

        fn execute(
            &mut self,
            ctx: &mut Context,
            _contract: &AccAddress,
            _caller: &AccAddress,
            _msg: &[u8],
            _funds: &Coins,
            callback_sig: Option<&[u8]>,
        ) -> Outcome<ContractResult> {
            self.events_seen_at_call.push(ctx.event_manager().len());
            self.callback_sigs.push(callback_sig.map(<[u8]>::to_vec));
            self.execute
                .take()
                .unwrap_or_else(|| Outcome::ok(ContractResult::default()))
        }
    }

    fn ctx() -> Context {
        Context::new(BlockInfo::default(), 0)
    }

    fn sender() -> AccAddress {
        AccAddress::new([1u8; 20])
    }

    fn store_msg() -> MsgStoreCode {
        MsgStoreCode {
            sender: sender(),
            wasm_byte_code: Binary::from_slice(b"\0asm\x01\0\0\0"),
            source: String::new(),
            builder: String::new(),
        }
    }

    fn instantiate_msg() -> MsgInstantiateContract {
        MsgInstantiateContract {
            sender: sender(),
            code_id: CodeId::new(1),
            label: "x".to_string(),
            init_msg: Binary::from_slice(b"{}"),
            init_funds: Coins::empty(),
            callback_sig: Some(Binary::from_slice(&[0xAB; 8])),
        }
    }

    fn execute_msg() -> MsgExecuteContract {
        MsgExecuteContract {
            sender: sender(),
            contract: AccAddress::new([2u8; 20]),
            msg: Binary::from_slice(br#"{"nop":{}}"#),
            sent_funds: Coins::empty(),
            callback_sig: None,
        }
    }

    #[test]
    fn test_event_emitted_before_keeper_call() {
        let mut server = MsgServer::new(MockKeeper::default());
        let mut ctx = ctx();

        let _ = server.store_code(&mut ctx, &store_msg());
        let _ = server.instantiate_contract(&mut ctx, &instantiate_msg());
        let _ = server.execute_contract(&mut ctx, &execute_msg());

        // Each keeper call observed its own message event already in the log
        assert_eq!(server.keeper().events_seen_at_call, vec![1, 2, 3]);

        let events = ctx.into_events();
        assert_eq!(events.len(), 3);
        for event in &events {
            assert_eq!(event.ty, "message");
            assert_eq!(event.attribute("module"), Some("compute"));
            assert_eq!(event.attribute("sender"), Some(sender().to_string().as_str()));
        }
    }

    #[test]
    fn test_event_emitted_even_when_keeper_fails() {
        let keeper = MockKeeper {
            create: Some(Outcome::empty_failure(KeeperError::Validation(
                "not wasm".into(),
            ))),
            ..MockKeeper::default()
        };
        let mut server = MsgServer::new(keeper);
        let mut ctx = ctx();

        let outcome = server.store_code(&mut ctx, &store_msg());

        assert_eq!(outcome.value.code_id, CodeId::NONE);
        assert_eq!(
            outcome.error,
            Some(KeeperError::Validation("not wasm".into()))
        );
        assert_eq!(ctx.event_manager().len(), 1);
    }

    #[test]
    fn test_instantiate_without_address_renders_placeholder() {
        let keeper = MockKeeper {
            instantiate: Some(Outcome::failed(
                InstantiateResult {
                    address: None,
                    data: Binary::from_slice(b"init-partial"),
                },
                KeeperError::Execution("init failed".into()),
            )),
            ..MockKeeper::default()
        };
        let mut server = MsgServer::new(keeper);
        let mut ctx = ctx();

        let outcome = server.instantiate_contract(&mut ctx, &instantiate_msg());

        assert_eq!(outcome.value.address, "");
        assert_eq!(outcome.value.data.as_slice(), b"init-partial");
        assert!(matches!(outcome.error, Some(KeeperError::Execution(_))));
        assert_eq!(ctx.event_manager().len(), 1);
        assert_eq!(ctx.event_manager().events()[0].ty, EVENT_TYPE_MESSAGE);
    }

    #[test]
    fn test_instantiate_success_renders_bech32() {
        let address = AccAddress::new([9u8; 20]);
        let keeper = MockKeeper {
            instantiate: Some(Outcome::ok(InstantiateResult {
                address: Some(address.clone()),
                data: Binary::new(),
            })),
            ..MockKeeper::default()
        };
        let mut server = MsgServer::new(keeper);

        let outcome = server.instantiate_contract(&mut ctx(), &instantiate_msg());

        assert!(outcome.is_ok());
        assert_eq!(outcome.value.address, address.to_string());
        assert_eq!(
            server.keeper().callback_sigs,
            vec![Some(vec![0xAB; 8])],
            "callback signature must reach the keeper"
        );
    }

    #[test]
    fn test_execute_failure_preserves_partial_data_exactly() {
        let partial = vec![0u8, 1, 2, 255, 254];
        let keeper = MockKeeper {
            execute: Some(Outcome::failed(
                ContractResult {
                    data: Binary(partial.clone()),
                },
                KeeperError::Execution("out of luck".into()),
            )),
            ..MockKeeper::default()
        };
        let mut server = MsgServer::new(keeper);
        let mut ctx = ctx();

        let outcome = server.execute_contract(&mut ctx, &execute_msg());

        assert_eq!(outcome.value.data.as_slice(), partial.as_slice());
        assert_eq!(
            outcome.error,
            Some(KeeperError::Execution("out of luck".into()))
        );
        assert_eq!(ctx.event_manager().len(), 1);
        assert_eq!(ctx.event_manager().events()[0].ty, EVENT_TYPE_MESSAGE);
    }

    #[test]
    fn test_dispatch_routes_by_variant() {
        let mut server = MsgServer::new(MockKeeper::default());
        let mut ctx = ctx();

        let outcome = server.dispatch(&mut ctx, &Msg::from(store_msg()));
        assert!(matches!(outcome.value, MsgResponse::StoreCode(_)));

        let outcome = server.dispatch(&mut ctx, &Msg::from(instantiate_msg()));
        assert!(matches!(outcome.value, MsgResponse::InstantiateContract(_)));

        let outcome = server.dispatch(&mut ctx, &Msg::from(execute_msg()));
        assert!(matches!(outcome.value, MsgResponse::ExecuteContract(_)));
    }
}
