//! Raw log decoding.
//!
//! Converts `(address, topics, data)` logs into [`IndexerEvent`]s. Which
//! contract a log came from is not checked here, see [`crate::LogRouter`].

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::SolEvent;
use indexer_types::{BroadcastPayload, IndexerEvent, IntentPayload, TokenOption};
use serde::{Deserialize, Serialize};

use crate::abi::{
	IIntent, IIntentBroadcaster, IIntentFactory, IntentParams, TokenAmount, IERC20,
};
use crate::DiscoveryError;

/// A log as delivered by the chain-event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
	pub address: Address,
	pub topics: Vec<B256>,
	#[serde(default)]
	pub data: Bytes,
}

impl From<TokenAmount> for TokenOption {
	fn from(value: TokenAmount) -> Self {
		TokenOption {
			token: value.token,
			amount: value.amount,
		}
	}
}

impl From<IntentParams> for IntentPayload {
	fn from(params: IntentParams) -> Self {
		IntentPayload {
			source_chain: params.sourceChain,
			destination_chain: params.destinationChain,
			destination_recipient: params.destinationRecipient,
			coordinator: params.coordinator,
			bridger: params.bridger,
			refund_address: params.refundAddress,
			nonce: params.nonce,
			expiration_timestamp: params.expirationTimestamp,
			needs_relay: params.needsRelay,
			metadata: params.metadata,
			bridge_token_out_options: params
				.bridgeTokenOutOptions
				.into_iter()
				.map(TokenOption::from)
				.collect(),
		}
	}
}

fn decode<E: SolEvent>(log: &RawLog) -> Result<E, DiscoveryError> {
	E::decode_raw_log(log.topics.iter().copied(), &log.data)
		.map_err(|e| DiscoveryError::Decode(format!("{}: {}", E::SIGNATURE, e)))
}

/// Decodes a log into an event.
///
/// Returns `Ok(None)` for logs whose signature is not one the indexer
/// consumes, and an error for a known signature with a malformed body.
pub fn decode_log(log: &RawLog) -> Result<Option<IndexerEvent>, DiscoveryError> {
	let Some(topic0) = log.topics.first().copied() else {
		return Ok(None);
	};

	let event = if topic0 == IIntentFactory::IntentDeclared::SIGNATURE_HASH {
		let e = decode::<IIntentFactory::IntentDeclared>(log)?;
		IndexerEvent::IntentDeclared {
			intent_address: e.intentAddress,
			declarer: e.declarer,
			intent: e.intent.into(),
		}
	} else if topic0 == IIntentFactory::IntentCreated::SIGNATURE_HASH {
		let e = decode::<IIntentFactory::IntentCreated>(log)?;
		IndexerEvent::IntentCreated {
			intent_address: e.intentAddress,
			creator: e.creator,
			intent: e.intent.into(),
		}
	} else if topic0 == IIntentFactory::IntentStarted::SIGNATURE_HASH {
		let e = decode::<IIntentFactory::IntentStarted>(log)?;
		IndexerEvent::IntentStarted {
			intent_address: e.intentAddr,
		}
	} else if topic0 == IERC20::Transfer::SIGNATURE_HASH {
		let e = decode::<IERC20::Transfer>(log)?;
		IndexerEvent::Erc20Transfer {
			token: log.address,
			from: e.from,
			to: e.to,
			value: e.value,
		}
	} else if topic0 == IIntent::NativeTransfer::SIGNATURE_HASH {
		let e = decode::<IIntent::NativeTransfer>(log)?;
		IndexerEvent::NativeTransfer {
			intent_address: log.address,
			from: e.from,
			to: e.to,
			amount: e.amount,
		}
	} else if topic0 == IIntentBroadcaster::IntentBroadcasted::SIGNATURE_HASH {
		let e = decode::<IIntentBroadcaster::IntentBroadcasted>(log)?;
		IndexerEvent::IntentBroadcasted(BroadcastPayload {
			broadcast_id: e.broadcastId,
			sender: e.sender,
			source_chain: e.sourceChain,
			destination_chain: e.destinationChain,
			recipient: e.recipient,
			refund_address: e.refundAddress,
			broadcaster: e.broadcaster,
			broadcasting_contract: e.broadcastingContract,
			is_live: e.isLive,
			deposits: e.deposits.into_iter().map(TokenOption::from).collect(),
			bridge_token_out_options: e
				.bridgeTokenOutOptions
				.into_iter()
				.map(TokenOption::from)
				.collect(),
		})
	} else if topic0 == IIntentBroadcaster::BroadcastExecuted::SIGNATURE_HASH {
		let e = decode::<IIntentBroadcaster::BroadcastExecuted>(log)?;
		IndexerEvent::BroadcastExecuted {
			broadcast_id: e.broadcastId,
		}
	} else if topic0 == IIntentBroadcaster::BroadcastCancelled::SIGNATURE_HASH {
		let e = decode::<IIntentBroadcaster::BroadcastCancelled>(log)?;
		IndexerEvent::BroadcastCancelled {
			broadcast_id: e.broadcastId,
		}
	} else {
		return Ok(None);
	};

	Ok(Some(event))
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use alloy_primitives::{address, U256};

	pub(crate) fn raw(address: Address, event: &impl SolEvent) -> RawLog {
		let data = event.encode_log_data();
		RawLog {
			address,
			topics: data.topics().to_vec(),
			data: data.data.clone(),
		}
	}

	const USDC: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
	const INTENT: Address = address!("00000000000000000000000000000000000000aa");

	#[test]
	fn test_decodes_erc20_transfer_with_emitting_token() {
		let transfer = IERC20::Transfer {
			from: Address::repeat_byte(0x01),
			to: INTENT,
			value: U256::from(60_000_000u64),
		};

		let event = decode_log(&raw(USDC, &transfer)).unwrap().unwrap();
		assert_eq!(
			event,
			IndexerEvent::Erc20Transfer {
				token: USDC,
				from: Address::repeat_byte(0x01),
				to: INTENT,
				value: U256::from(60_000_000u64),
			}
		);
	}

	#[test]
	fn test_native_transfer_is_keyed_by_emitting_account() {
		let transfer = IIntent::NativeTransfer {
			from: Address::repeat_byte(0x02),
			to: Address::repeat_byte(0x03),
			amount: U256::from(1u64),
		};

		match decode_log(&raw(INTENT, &transfer)).unwrap() {
			Some(IndexerEvent::NativeTransfer { intent_address, .. }) => {
				assert_eq!(intent_address, INTENT)
			}
			other => panic!("unexpected decode result: {:?}", other),
		}
	}

	#[test]
	fn test_decodes_declaration_options_in_order() {
		let declared = IIntentFactory::IntentDeclared {
			intentAddress: INTENT,
			declarer: Address::repeat_byte(0x04),
			intent: IntentParams {
				sourceChain: U256::from(8453u64),
				destinationChain: U256::from(42161u64),
				destinationRecipient: Address::repeat_byte(0x05),
				coordinator: Address::repeat_byte(0x06),
				bridger: Address::repeat_byte(0x07),
				refundAddress: Address::repeat_byte(0x08),
				nonce: U256::from(3u64),
				expirationTimestamp: U256::from(1_700_000_000u64),
				needsRelay: true,
				metadata: Bytes::from_static(b"meta"),
				bridgeTokenOutOptions: vec![
					TokenAmount {
						token: USDC,
						amount: U256::from(100u64),
					},
					TokenAmount {
						token: Address::ZERO,
						amount: U256::from(5u64),
					},
				],
			},
		};

		let Some(IndexerEvent::IntentDeclared {
			intent_address,
			declarer,
			intent,
		}) = decode_log(&raw(Address::repeat_byte(0xfa), &declared)).unwrap()
		else {
			panic!("expected IntentDeclared");
		};
		assert_eq!(intent_address, INTENT);
		assert_eq!(declarer, Address::repeat_byte(0x04));
		assert!(intent.needs_relay);
		assert_eq!(intent.bridge_token_out_options.len(), 2);
		assert_eq!(intent.bridge_token_out_options[0].token, USDC);
		assert_eq!(intent.bridge_token_out_options[1].amount, U256::from(5u64));
	}

	#[test]
	fn test_unknown_signature_is_ignored() {
		let log = RawLog {
			address: USDC,
			topics: vec![B256::repeat_byte(0xee)],
			data: Bytes::new(),
		};
		assert!(decode_log(&log).unwrap().is_none());

		let empty = RawLog {
			address: USDC,
			topics: vec![],
			data: Bytes::new(),
		};
		assert!(decode_log(&empty).unwrap().is_none());
	}

	#[test]
	fn test_malformed_known_event_is_an_error() {
		// Transfer signature without its indexed topics
		let log = RawLog {
			address: USDC,
			topics: vec![IERC20::Transfer::SIGNATURE_HASH],
			data: Bytes::new(),
		};
		assert!(matches!(decode_log(&log), Err(DiscoveryError::Decode(_))));
	}
}
