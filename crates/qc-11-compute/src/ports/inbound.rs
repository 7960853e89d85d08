//! # Driving Ports (API - Inbound)
//!
//! The message-server API exposed by the compute module. The transaction
//! runtime calls these, one message at a time, with an exclusively-owned
//! context.

use crate::domain::context::Context;
use crate::domain::messages::{
    Msg, MsgExecuteContract, MsgExecuteContractResponse, MsgInstantiateContract,
    MsgInstantiateContractResponse, MsgResponse, MsgStoreCode, MsgStoreCodeResponse,
};
use crate::domain::outcome::Outcome;

/// One handler per message variant.
///
/// Every handler emits its audit event before touching the backend and
/// returns a structurally valid response together with the backend error,
/// if any. Commit or rollback is decided by the caller.
pub trait ComputeMsgServer {
    /// Handle [`MsgStoreCode`].
    fn store_code(&mut self, ctx: &mut Context, msg: &MsgStoreCode) -> Outcome<MsgStoreCodeResponse>;

    /// Handle [`MsgInstantiateContract`].
    fn instantiate_contract(
        &mut self,
        ctx: &mut Context,
        msg: &MsgInstantiateContract,
    ) -> Outcome<MsgInstantiateContractResponse>;

    /// Handle [`MsgExecuteContract`].
    fn execute_contract(
        &mut self,
        ctx: &mut Context,
        msg: &MsgExecuteContract,
    ) -> Outcome<MsgExecuteContractResponse>;

    /// Route a message to its handler.
    fn dispatch(&mut self, ctx: &mut Context, msg: &Msg) -> Outcome<MsgResponse> {
        match msg {
            Msg::StoreCode(m) => self.store_code(ctx, m).map(MsgResponse::StoreCode),
            Msg::InstantiateContract(m) => self
                .instantiate_contract(ctx, m)
                .map(MsgResponse::InstantiateContract),
            Msg::ExecuteContract(m) => self
                .execute_contract(ctx, m)
                .map(MsgResponse::ExecuteContract),
        }
    }
}
