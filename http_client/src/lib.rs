mod rpc;

pub use rpc::EthRpcClient;
