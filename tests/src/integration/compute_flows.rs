//! # Compute Integration Flows
//!
//! Drives the compute service end to end: encoded transactions in,
//! receipts out, with the in-memory keeper and JSON command engine behind
//! the dispatcher.
//!
//! ## Flows Tested:
//!
//! 1. **Store → Instantiate → Execute**: ids, addresses and no-op data
//! 2. **Atomicity**: a failing message discards state and events of its tx
//! 3. **Failure transparency**: partial data survives a failed call
//! 4. **Request loop**: receipts published in order with correlation ids

#[cfg(test)]
mod tests {
    use qc_11_compute::prelude::*;
    use tokio::sync::mpsc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Minimal valid module header plus an arbitrary body.
    const VALID_WASM: &[u8] = b"\0asm\x01\0\0\0compute-contract";

    fn sender_a() -> AccAddress {
        AccAddress::new([0xAA; 20])
    }

    fn store_code(sender: AccAddress) -> Msg {
        MsgStoreCode {
            sender,
            wasm_byte_code: Binary::from_slice(VALID_WASM),
            source: "https://example.invalid/contract.tar.gz".to_string(),
            builder: "enigmampc/secret-contract-optimizer:1.0.10".to_string(),
        }
        .into()
    }

    fn instantiate(code_id: CodeId, label: &str, init_msg: &[u8]) -> Msg {
        MsgInstantiateContract {
            sender: sender_a(),
            code_id,
            label: label.to_string(),
            init_msg: Binary::from_slice(init_msg),
            init_funds: Coins::empty(),
            callback_sig: None,
        }
        .into()
    }

    fn execute(contract: &AccAddress, msg: &[u8], funds: Coins) -> Msg {
        MsgExecuteContract {
            sender: sender_a(),
            contract: contract.clone(),
            msg: Binary::from_slice(msg),
            sent_funds: funds,
            callback_sig: None,
        }
        .into()
    }

    fn block(height: u64) -> BlockInfo {
        BlockInfo {
            height,
            ..BlockInfo::default()
        }
    }

    fn single(
        service: &mut ComputeService<InMemoryKeeper<JsonCommandEngine>>,
        msg: Msg,
    ) -> TxResult {
        service.deliver_tx(&block(1), 0, &Tx::new(vec![msg]))
    }

    fn deploy(service: &mut ComputeService<InMemoryKeeper<JsonCommandEngine>>) -> AccAddress {
        single(service, store_code(sender_a()));
        let result = single(service, instantiate(CodeId::new(1), "deployed", b"{}"));
        match &result.responses[0] {
            MsgResponse::InstantiateContract(r) => r.address.parse().unwrap(),
            other => panic!("unexpected response {other:?}"),
        }
    }

    // =============================================================================
    // END-TO-END
    // =============================================================================

    #[test]
    fn test_store_instantiate_execute() {
        let mut service = create_test_service();

        let stored = single(&mut service, store_code(sender_a()));
        assert!(stored.is_ok());
        assert_eq!(
            stored.responses[0],
            MsgResponse::StoreCode(MsgStoreCodeResponse {
                code_id: CodeId::new(1)
            })
        );

        let instantiated = single(&mut service, instantiate(CodeId::new(1), "x", b"{}"));
        let address = match &instantiated.responses[0] {
            MsgResponse::InstantiateContract(r) => {
                assert!(!r.address.is_empty());
                assert!(r.address.starts_with("secret1"));
                assert_eq!(r.data.as_slice(), b"");
                r.address.clone()
            }
            other => panic!("unexpected response {other:?}"),
        };
        let contract: AccAddress = address.parse().unwrap();

        let executed = single(
            &mut service,
            execute(&contract, br#"{"op":"noop"}"#, Coins::empty()),
        );
        assert!(executed.is_ok());
        assert_eq!(executed.responses[0].data(), b"");
    }

    #[test]
    fn test_code_ids_never_reused_across_blocks() {
        let mut service = create_test_service();
        let txs: Vec<Tx> = (0..3).map(|_| Tx::new(vec![store_code(sender_a())])).collect();

        let first = service.execute_block(&block(1), &txs);
        let second = service.execute_block(&block(2), &txs);

        let ids: Vec<CodeId> = first
            .txs
            .iter()
            .chain(second.txs.iter())
            .map(|tx| match &tx.responses[0] {
                MsgResponse::StoreCode(r) => r.code_id,
                other => panic!("unexpected response {other:?}"),
            })
            .collect();
        let expected: Vec<CodeId> = (1..=6).map(CodeId::new).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_invalid_bytecode_assigns_nothing() {
        let mut service = create_test_service();
        let bad = MsgStoreCode {
            sender: sender_a(),
            wasm_byte_code: Binary::from_slice(b"\x7fELF not a module"),
            source: String::new(),
            builder: String::new(),
        };

        let result = single(&mut service, bad.into());

        let failure = result.failure.unwrap();
        assert_eq!(failure.code, 2);
        assert_eq!(
            failure.response,
            Some(MsgResponse::StoreCode(MsgStoreCodeResponse {
                code_id: CodeId::NONE
            }))
        );
        assert_eq!(service.keeper().code_count(), 0);
    }

    // =============================================================================
    // AUDIT EVENTS
    // =============================================================================

    #[test]
    fn test_message_events_have_identical_shape() {
        let mut service = create_test_service();

        let first = single(&mut service, store_code(sender_a()));
        let second = single(&mut service, store_code(sender_a()));

        let message_event = |result: &TxResult| {
            result
                .events
                .iter()
                .find(|e| e.ty == "message")
                .cloned()
                .unwrap()
        };
        assert_eq!(message_event(&first), message_event(&second));
        assert_eq!(
            message_event(&first),
            Event::new("message")
                .add_attribute("module", "compute")
                .add_attribute("sender", sender_a().to_string())
        );

        // Content tied to the new identifiers differs
        assert_ne!(first.events, second.events);
    }

    #[test]
    fn test_events_ordered_by_message() {
        let mut service = create_test_service();
        let tx = Tx::new(vec![
            store_code(sender_a()),
            instantiate(CodeId::new(1), "ordered", b"{}"),
        ]);

        let result = service.deliver_tx(&block(1), 0, &tx);

        let types: Vec<&str> = result.events.iter().map(|e| e.ty.as_str()).collect();
        assert_eq!(types, vec!["message", "store_code", "message", "instantiate"]);
    }

    // =============================================================================
    // ATOMICITY AND FAILURE TRANSPARENCY
    // =============================================================================

    #[test]
    fn test_failed_message_rolls_back_whole_tx() {
        let mut service = create_test_service();
        let contract = deploy(&mut service);
        service
            .keeper_mut()
            .set_balance(&sender_a(), "uscrt", U256::from(1_000u64));

        let tx = Tx::new(vec![
            execute(
                &contract,
                br#"{"nop":{}}"#,
                Coins(vec![Coin::new(250u64, "uscrt")]),
            ),
            execute(&contract, br#"{"fail":{"error":"halt"}}"#, Coins::empty()),
        ]);
        let result = service.deliver_tx(&block(2), 0, &tx);

        assert_eq!(result.failure.as_ref().map(|f| f.msg_index), Some(1));
        assert!(result.events.is_empty());
        assert_eq!(
            service.keeper().balance(&sender_a(), "uscrt"),
            U256::from(1_000u64)
        );
        assert_eq!(service.keeper().balance(&contract, "uscrt"), U256::zero());
    }

    #[test]
    fn test_contract_paying_itself_mints_nothing() {
        let mut service = create_test_service();
        single(&mut service, store_code(sender_a()));
        service
            .keeper_mut()
            .set_balance(&sender_a(), "uscrt", U256::from(100u64));

        let init = MsgInstantiateContract {
            sender: sender_a(),
            code_id: CodeId::new(1),
            label: "self-pay".to_string(),
            init_msg: Binary::from_slice(b"{}"),
            init_funds: Coins(vec![Coin::new(40u64, "uscrt")]),
            callback_sig: None,
        };
        let result = single(&mut service, init.into());
        let contract: AccAddress = match &result.responses[0] {
            MsgResponse::InstantiateContract(r) => r.address.parse().unwrap(),
            other => panic!("unexpected response {other:?}"),
        };

        let self_send = MsgExecuteContract {
            sender: contract.clone(),
            contract: contract.clone(),
            msg: Binary::from_slice(br#"{"nop":{}}"#),
            sent_funds: Coins(vec![Coin::new(40u64, "uscrt")]),
            callback_sig: None,
        };
        let result = single(&mut service, self_send.into());
        assert!(result.is_ok());

        let keeper = service.keeper();
        let supply = keeper.balance(&sender_a(), "uscrt") + keeper.balance(&contract, "uscrt");
        assert_eq!(supply, U256::from(100u64));
        assert_eq!(keeper.balance(&contract, "uscrt"), U256::from(40u64));
    }

    #[test]
    fn test_execute_failure_keeps_partial_data() {
        let mut service = create_test_service();
        let contract = deploy(&mut service);

        // "3q2+7w==" is base64 for DE AD BE EF
        let result = single(
            &mut service,
            execute(
                &contract,
                br#"{"fail":{"error":"out of gas","data":"3q2+7w=="}}"#,
                Coins::empty(),
            ),
        );

        let failure = result.failure.unwrap();
        assert_eq!(failure.code, 4);
        assert_eq!(failure.error, "execution error: out of gas");
        assert_eq!(
            failure.response.map(|r| r.data().to_vec()),
            Some(vec![0xDE, 0xAD, 0xBE, 0xEF])
        );
        assert_eq!(result.replies[0].data.as_slice(), &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_instantiate_failure_renders_empty_address() {
        let mut service = create_test_service();
        single(&mut service, store_code(sender_a()));

        let result = single(
            &mut service,
            instantiate(CodeId::new(1), "x", br#"{"fail":{"error":"bad init"}}"#),
        );

        match result.failure.and_then(|f| f.response) {
            Some(MsgResponse::InstantiateContract(r)) => {
                assert_eq!(r.address, "");
                assert!(r.data.is_empty());
            }
            other => panic!("unexpected response {other:?}"),
        }
        assert_eq!(service.keeper().contract_count(), 0);
    }

    #[test]
    fn test_insufficient_funds_reported() {
        let mut service = create_test_service();
        let contract = deploy(&mut service);

        let result = single(
            &mut service,
            execute(
                &contract,
                br#"{"nop":{}}"#,
                Coins(vec![Coin::new(1u64, "uscrt")]),
            ),
        );

        assert_eq!(result.failure.map(|f| f.code), Some(5));
    }

    // =============================================================================
    // REQUEST LOOP
    // =============================================================================

    #[tokio::test]
    async fn test_request_loop_end_to_end() {
        let mut service = create_test_service();
        let (requests, rx) = mpsc::channel(16);
        let (publisher, mut receipts) = ChannelPublisher::channel(16);

        let store_tx = Tx::new(vec![store_code(sender_a())]).encode().unwrap();
        let init_tx = Tx::new(vec![instantiate(CodeId::new(1), "loop", b"{}")])
            .encode()
            .unwrap();
        let sent = vec![
            DeliverTxRequest::new(block(1), 0, store_tx),
            DeliverTxRequest::new(block(1), 1, b"garbage".to_vec()),
            DeliverTxRequest::new(block(1), 2, init_tx),
        ];
        let ids: Vec<_> = sent.iter().map(|r| r.correlation_id).collect();
        for request in sent {
            requests.send(request).await.unwrap();
        }
        drop(requests);

        service.run(rx, &publisher).await.unwrap();

        let mut got = Vec::new();
        while let Ok(receipt) = receipts.try_recv() {
            got.push(receipt);
        }
        assert_eq!(got.len(), 3);
        assert_eq!(got.iter().map(|r| r.correlation_id).collect::<Vec<_>>(), ids);
        assert!(got[0].is_ok());
        assert_eq!(got[1].code, 1);
        assert!(got[2].is_ok());

        let json = serde_json::to_value(&got[2]).unwrap();
        assert_eq!(
            json["responses"][0]["@type"],
            "/secret.compute.v1beta1.MsgInstantiateContractResponse"
        );
        assert_eq!(service.stats().txs_delivered, 3);
        assert_eq!(service.stats().txs_rejected, 1);
    }
}
