//! Contract ABIs of the event sources.
//!
//! These types match the on-chain contract ABIs for event decoding.

use alloy_sol_types::sol;

sol! {
	/// Accepted (token, amount) pair.
	#[derive(Debug, PartialEq, Eq)]
	struct TokenAmount {
		address token;
		uint256 amount;
	}

	/// Intent parameters committed by the factory.
	#[derive(Debug, PartialEq, Eq)]
	struct IntentParams {
		uint256 sourceChain;
		uint256 destinationChain;
		address destinationRecipient;
		address coordinator;
		address bridger;
		address refundAddress;
		uint256 nonce;
		uint256 expirationTimestamp;
		bool needsRelay;
		bytes metadata;
		TokenAmount[] bridgeTokenOutOptions;
	}

	interface IIntentFactory {
		#[derive(Debug)]
		event IntentDeclared(address indexed intentAddress, address indexed declarer, IntentParams intent);

		#[derive(Debug)]
		event IntentCreated(address indexed intentAddress, address indexed creator, IntentParams intent);

		#[derive(Debug)]
		event IntentStarted(address indexed intentAddr);
	}

	/// Emitted by each deployed intent account when it receives the native asset.
	interface IIntent {
		#[derive(Debug)]
		event NativeTransfer(address indexed from, address indexed to, uint256 amount);
	}

	interface IERC20 {
		#[derive(Debug)]
		event Transfer(address indexed from, address indexed to, uint256 value);
	}

	interface IIntentBroadcaster {
		#[derive(Debug)]
		event IntentBroadcasted(
			bytes32 indexed broadcastId,
			address indexed sender,
			uint256 sourceChain,
			uint256 destinationChain,
			address recipient,
			address refundAddress,
			address broadcaster,
			address broadcastingContract,
			bool isLive,
			TokenAmount[] deposits,
			TokenAmount[] bridgeTokenOutOptions
		);

		#[derive(Debug)]
		event BroadcastExecuted(bytes32 indexed broadcastId);

		#[derive(Debug)]
		event BroadcastCancelled(bytes32 indexed broadcastId);
	}
}
