use alloc::vec::Vec;
use alloy_sol_types::{Revert, SolError};

// 带有可读原因字符串的合约错误
pub trait RevertReason {
    // 返回给调用方的原因字符串
    fn reason(&self) -> &'static str;

    // 按 Solidity 的 Error(string) 格式编码回滚数据
    fn encode(&self) -> Vec<u8> {
        Revert {
            reason: self.reason().into(),
        }
        .abi_encode()
    }
}
